use std::collections::BTreeSet;
use std::path::PathBuf;
use taskdeps::core::{Context, PlugGraph};
use taskdeps::{upstream_nodes, App, Graph, Query, SettingsLayer, TaskAlgo};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_simple_graph_from_file() {
    let graph = Graph::from_file(&fixture("simple.yml")).unwrap();
    assert_eq!(graph.metadata.as_ref().unwrap().project, "simple");

    let task = graph.find_plug("n1.task").unwrap();
    let result = TaskAlgo::new().source_filenames(&graph, task);
    assert_eq!(
        result,
        set(&["simple2.txt", "simple3.txt", "simple4a.txt", "simple4b.txt"])
    );
}

#[test]
fn test_subgraph_nodes_are_transparent() {
    let graph = Graph::from_file(&fixture("subgraph.yml")).unwrap();
    let task = graph.find_plug("n1.task").unwrap();

    let entry = graph.plug_node(task);
    let mut nodes: Vec<String> = upstream_nodes(&graph, entry)
        .into_iter()
        .map(|n| graph.node_path(n))
        .collect();
    nodes.sort();
    assert_eq!(nodes, vec!["box.boxWriter", "n2"]);

    let result = TaskAlgo::new().source_filenames(&graph, task);
    assert_eq!(result, set(&["graphWriter.txt", "boxWriter.txt"]));
}

#[test]
fn test_frame_range_per_context() {
    let graph = Graph::from_file(&fixture("frames.yml")).unwrap();
    let task = graph.find_plug("nOutput.task").unwrap();
    let algo = TaskAlgo::new();

    let mut result = BTreeSet::new();
    for frame in 3..=5 {
        let context = Context::new()
            .with_frame(frame as f64)
            .with_variable("wedgeString", "is");
        result.extend(algo.substituted_source_filenames(&graph, task, &context).unwrap());
    }
    assert_eq!(
        result,
        set(&[
            "source_0003.txt",
            "source_0004.txt",
            "source_0005.txt",
            "wedge_is.txt"
        ])
    );
}

#[test]
fn test_app_uses_document_settings() {
    let app = App::load(&fixture("frames.yml"), &SettingsLayer::default(), None).unwrap();
    let report = app
        .run(&Query {
            task: "nOutput.task".to_string(),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(report.frames, Some(vec![3, 4, 5]));
    assert_eq!(
        report.source_files,
        vec![
            "source_0003.txt",
            "source_0004.txt",
            "source_0005.txt",
            "wedge_wedging.txt"
        ]
    );
}

#[test]
fn test_missing_graph_file() {
    let err = Graph::from_file(&fixture("does-not-exist.yml")).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.yml"));
}
