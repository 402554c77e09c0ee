//! Loading grammars from disk and driving the nodes against a plugin directory.

use lsystem_instancer::node::Node;
use lsystem_instancer::{
    Grammar, LSystem, LSystemError, LSystemInstanceNode, NodeRegistry, initialize_plugin,
    uninitialize_plugin,
};
use std::fs;
use tempfile::TempDir;

const SIMPLE_PLANT: &str = "\
# simple1: bracketed plant
axiom F
angle 25
step 1
F -> F[+F]F[-F]F
";

/// A plugin directory with an empty `plants/` folder, removed on drop.
fn plugin_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("plants")).unwrap();
    dir
}

#[test]
fn load_reports_missing_arrow_line() {
    let tmp = plugin_dir();
    let dir = tmp.path();
    let path = dir.join("plants/broken.txt");
    fs::write(&path, "axiom F\n\n# fine so far\nF F[+F]\n").unwrap();

    match Grammar::load(&path) {
        Err(LSystemError::GrammarParse { line, message }) => {
            assert_eq!(line, 4);
            assert!(message.contains("->"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn load_missing_path_is_not_found() {
    let tmp = plugin_dir();
    let dir = tmp.path();
    let err = LSystem::load(dir.join("plants/nope.txt")).unwrap_err();
    assert!(matches!(err, LSystemError::GrammarNotFound { .. }));

    // A directory is not a grammar either.
    let err = Grammar::load(dir.join("plants")).unwrap_err();
    assert!(matches!(err, LSystemError::GrammarNotFound { .. }));
}

#[test]
fn write_and_reload_round_trip() {
    let tmp = plugin_dir();
    let dir = tmp.path();
    let text = "axiom X\nangle 22.5\nstep 0.75\n0.6 X -> F[+X]F[-X]+X\n0.4 X -> F[-X]K\nF < X > F -> X\nF -> FF\n";
    let original = Grammar::parse(text).unwrap();

    let path = dir.join("plants/written.txt");
    fs::write(&path, original.to_string()).unwrap();
    let reloaded = Grammar::load(&path).unwrap();

    assert_eq!(original, reloaded);
    assert_eq!(reloaded.rule_count(), 4);
    assert_eq!(reloaded.axiom(), "X");
}

#[test]
fn instance_node_evaluates_plugin_grammar() {
    let tmp = plugin_dir();
    let dir = tmp.path();
    fs::write(dir.join("plants/simple1.txt"), SIMPLE_PLANT).unwrap();

    let mut node = LSystemInstanceNode::new(dir);
    // Two generations of F -> F[+F]F[-F]F: 5 * 5 segments.
    assert_eq!(node.out_branches().len(), 25);
    assert!(node.out_flowers().is_empty());
    assert!(node.last_error().is_none());
    assert_eq!(node.out_branches().aim_directions.len(), 25);

    node.set_iterations(1);
    assert!(node.is_dirty());
    assert_eq!(node.out_branches().len(), 5);

    node.set_iterations(-4);
    assert_eq!(node.out_branches().len(), 1);
}

#[test]
fn instance_node_surfaces_parse_errors() {
    let tmp = plugin_dir();
    let dir = tmp.path();
    fs::write(dir.join("plants/bad.txt"), "axiom F\nF => FF\n").unwrap();

    let mut node = LSystemInstanceNode::new(dir);
    node.set_grammar_file("plants/bad.txt");
    node.compute();
    assert!(node.out_branches().is_empty());
    assert!(matches!(
        node.last_error(),
        Some(LSystemError::GrammarParse { line: 2, .. })
    ));
}

#[test]
fn plugin_nodes_resolve_against_load_path() {
    let tmp = plugin_dir();
    let dir = tmp.path();
    fs::write(dir.join("plants/simple1.txt"), SIMPLE_PLANT).unwrap();

    let mut registry = NodeRegistry::new();
    let ctx = initialize_plugin(&mut registry, dir).unwrap();

    let mut node = registry.create("LSystemInstanceNode", &ctx).unwrap();
    assert!(node.is_dirty());
    node.compute();
    assert!(!node.is_dirty());

    uninitialize_plugin(&mut registry).unwrap();
    assert!(registry.is_empty());
}
