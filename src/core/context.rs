//! Substitution context - resolves `${var}`, `$var`, `####` and `~` in strings

use super::error::SubstitutionError;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Anything that can turn a raw declared string into a concrete one
pub trait SubstitutionContext {
    type Error;

    fn substitute(&self, raw: &str) -> Result<String, Self::Error>;
}

impl<C: SubstitutionContext + ?Sized> SubstitutionContext for &C {
    type Error = C::Error;

    fn substitute(&self, raw: &str) -> Result<String, Self::Error> {
        (**self).substitute(raw)
    }
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\\(.)|\$\{(\w*)\}|\$(\w+)|(#+)").unwrap())
}

/// Frame number plus variable bindings
///
/// In lenient mode (the default) an undefined variable expands to an empty
/// string. In strict mode it is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    frame: f64,
    variables: BTreeMap<String, String>,
    strict: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            frame: 1.0,
            variables: BTreeMap::new(),
            strict: false,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, frame: f64) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn frame(&self) -> f64 {
        self.frame
    }

    pub fn set_frame(&mut self, frame: f64) {
        self.frame = frame;
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    /// Variable lookup; `frame` is always defined
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        (name == "frame").then(|| {
            if self.frame.fract() == 0.0 {
                format!("{}", self.frame as i64)
            } else {
                format!("{}", self.frame)
            }
        })
    }

    fn padded_frame(&self, width: usize) -> String {
        let frame = self.frame.round() as i64;
        let sign = if frame < 0 { "-" } else { "" };
        format!("{}{:0width$}", sign, frame.unsigned_abs(), width = width)
    }

    fn expand_home(text: &str) -> String {
        let rest = match text.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return text.to_string(),
        };
        match dirs::home_dir() {
            Some(home) => format!("{}{}", home.display(), rest),
            None => text.to_string(),
        }
    }

    fn variable(&self, name: &str, text: &str) -> Result<String, SubstitutionError> {
        match self.get(name) {
            Some(value) => Ok(value),
            None if self.strict => Err(SubstitutionError::UndefinedVariable {
                variable: name.to_string(),
                text: text.to_string(),
            }),
            None => Ok(String::new()),
        }
    }

    fn expand(&self, caps: &Captures, text: &str) -> Result<String, SubstitutionError> {
        if let Some(escaped) = caps.get(1) {
            Ok(escaped.as_str().to_string())
        } else if let Some(name) = caps.get(2).or_else(|| caps.get(3)) {
            self.variable(name.as_str(), text)
        } else {
            let hashes = caps.get(4).map_or(0, |m| m.as_str().len());
            Ok(self.padded_frame(hashes))
        }
    }
}

impl SubstitutionContext for Context {
    type Error = SubstitutionError;

    fn substitute(&self, raw: &str) -> Result<String, SubstitutionError> {
        let text = Self::expand_home(raw);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in token_re().captures_iter(&text) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            out.push_str(&text[last..whole.start]);
            out.push_str(&self.expand(&caps, raw)?);
            last = whole.end;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braced_and_bare_variables() {
        let ctx = Context::new().with_variable("x", "5").with_variable("shot", "sh010");
        assert_eq!(ctx.substitute("out_${x}.txt").unwrap(), "out_5.txt");
        assert_eq!(ctx.substitute("$shot/out_$x.txt").unwrap(), "sh010/out_5.txt");
    }

    #[test]
    fn test_frame_padding() {
        let ctx = Context::new().with_frame(3.0);
        assert_eq!(ctx.substitute("source_####.txt").unwrap(), "source_0003.txt");
        assert_eq!(ctx.substitute("f#.exr").unwrap(), "f3.exr");
        assert_eq!(ctx.substitute("f${frame}.exr").unwrap(), "f3.exr");

        let ctx = Context::new().with_frame(-12.0);
        assert_eq!(ctx.substitute("f####").unwrap(), "f-0012");
    }

    #[test]
    fn test_escapes_are_literal() {
        let ctx = Context::new().with_frame(7.0).with_variable("x", "5");
        assert_eq!(ctx.substitute(r"cost\$x_\##").unwrap(), "cost$x_#7");
    }

    #[test]
    fn test_undefined_variable_lenient_and_strict() {
        let lenient = Context::new();
        assert_eq!(lenient.substitute("a_${missing}.txt").unwrap(), "a_.txt");

        let strict = Context::new().strict(true);
        let err = strict.substitute("a_${missing}.txt").unwrap_err();
        assert_eq!(
            err,
            SubstitutionError::UndefinedVariable {
                variable: "missing".to_string(),
                text: "a_${missing}.txt".to_string(),
            }
        );
    }

    #[test]
    fn test_home_expansion_only_at_start() {
        let ctx = Context::new();
        assert_eq!(ctx.substitute("a~b").unwrap(), "a~b");
        assert_eq!(ctx.substitute("~user/x").unwrap(), "~user/x");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                ctx.substitute("~/renders").unwrap(),
                format!("{}/renders", home.display())
            );
        }
    }
}
