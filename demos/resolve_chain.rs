//! Build a small task graph in code and list its source files per frame
//!
//! Run with: cargo run --example resolve_chain

use anyhow::Result;
use taskdeps::core::{Context, Direction, FrameList, Graph, PlugOwner};
use taskdeps::TaskAlgo;

fn writer(graph: &mut Graph, name: &str, file: &str) -> Result<()> {
    let node = graph.add_node(name, None)?;
    graph.set_node_type(node, "TextWriter");
    let file_plug = graph.add_plug(PlugOwner::Node(node), "fileName", Direction::In)?;
    graph.set_value(file_plug, file);
    graph.add_plug(PlugOwner::Node(node), "task", Direction::Out)?;
    let pre = graph.add_plug(PlugOwner::Node(node), "preTasks", Direction::In)?;
    graph.add_plug(PlugOwner::Plug(pre), "preTask0", Direction::In)?;
    graph.add_plug(PlugOwner::Plug(pre), "preTask1", Direction::In)?;
    Ok(())
}

fn wire(graph: &mut Graph, from: &str, to: &str) -> Result<()> {
    let source = graph.find_plug(from)?;
    let destination = graph.find_plug(to)?;
    graph.connect(source, destination)?;
    Ok(())
}

fn main() -> Result<()> {
    let mut graph = Graph::new();
    writer(&mut graph, "comp", "comp_####.exr")?;
    writer(&mut graph, "render", "render_${layer}_####.exr")?;
    writer(&mut graph, "cache", "cache.abc")?;
    wire(&mut graph, "render.task", "comp.preTasks.preTask0")?;
    wire(&mut graph, "cache.task", "render.preTasks.preTask0")?;

    let task = graph.find_plug("comp.task")?;
    let algo = TaskAlgo::new();

    println!("Declared sources of comp:");
    for name in algo.source_filenames(&graph, task) {
        println!("   {}", name);
    }

    let frames = FrameList::parse("1-3")?;
    let contexts = frames
        .as_list()
        .into_iter()
        .map(|f| Context::new().with_frame(f as f64).with_variable("layer", "beauty"));
    println!("\nResolved over frames {}:", frames);
    for name in algo.substituted_source_filenames_over(&graph, task, contexts)? {
        println!("   {}", name);
    }

    Ok(())
}
