//! Frame lists - `5`, `3-33`, `1-10x2`, and comma-separated combinations

use super::error::FrameListError;
use std::fmt;
use std::str::FromStr;

/// Most frames a single range clause may expand to
pub const MAX_RANGE_FRAMES: u64 = 1_000_000;

/// One clause of a frame list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameRange {
    Single(i64),
    Range { start: i64, end: i64, step: i64 },
}

/// Ordered list of frames to evaluate a task over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameList {
    ranges: Vec<FrameRange>,
}

impl FrameList {
    pub fn parse(text: &str) -> Result<Self, FrameListError> {
        let ranges = text
            .split(',')
            .map(|clause| parse_clause(clause.trim(), text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// All frames in declaration order
    pub fn as_list(&self) -> Vec<i64> {
        let mut frames = Vec::new();
        for range in &self.ranges {
            match *range {
                FrameRange::Single(frame) => frames.push(frame),
                FrameRange::Range { start, end, step } => {
                    let mut cursor = Some(start);
                    while let Some(frame) = cursor.filter(|&f| f <= end) {
                        frames.push(frame);
                        cursor = frame.checked_add(step);
                    }
                }
            }
        }
        frames
    }
}

/// Parses a frame number, allowing a leading minus sign
fn parse_frame(text: &str, whole: &str) -> Result<i64, FrameListError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| FrameListError::Invalid(whole.to_string()))
}

fn parse_clause(clause: &str, whole: &str) -> Result<FrameRange, FrameListError> {
    if clause.is_empty() {
        return Err(FrameListError::Invalid(whole.to_string()));
    }

    let (range, step) = match clause.split_once('x') {
        Some((range, step)) => (range, Some(parse_frame(step, whole)?)),
        None => (clause, None),
    };

    // Skip index 0 so a negative start frame is not taken as the separator
    let separator = range
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i);

    let Some(at) = separator else {
        if step.is_some() {
            return Err(FrameListError::Invalid(whole.to_string()));
        }
        return Ok(FrameRange::Single(parse_frame(range, whole)?));
    };

    let start = parse_frame(&range[..at], whole)?;
    let end = parse_frame(&range[at + 1..], whole)?;
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(FrameListError::ZeroStep(clause.to_string()));
    }
    if step < 0 || end < start {
        return Err(FrameListError::Invalid(whole.to_string()));
    }
    let count = (end as i128 - start as i128) / step as i128 + 1;
    if count > MAX_RANGE_FRAMES as i128 {
        return Err(FrameListError::TooLarge {
            clause: clause.to_string(),
            limit: MAX_RANGE_FRAMES,
        });
    }
    Ok(FrameRange::Range { start, end, step })
}

impl FromStr for FrameList {
    type Err = FrameListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FrameList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self
            .ranges
            .iter()
            .map(|r| match *r {
                FrameRange::Single(frame) => frame.to_string(),
                FrameRange::Range { start, end, step: 1 } => format!("{}-{}", start, end),
                FrameRange::Range { start, end, step } => format!("{}-{}x{}", start, end, step),
            })
            .collect();
        write!(f, "{}", clauses.join(","))
    }
}
