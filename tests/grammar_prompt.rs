//! Integration tests for autocomplete: suffix completion, grouped forks,
//! nested grammar delegation.

use argot::argot::grammar::{Grammar, Node};
use argot::argot::handler::{chain, FieldHandler};
use argot::argot::{CandidateGroup, Completion};

/// root -> dir(one-of north/south) -> leaf "0"
fn compass() -> Grammar {
    let mut g = Grammar::new("compass");
    let root = g.root();
    let dir = g
        .add_child(root, Node::normal("dir", FieldHandler::one_of(["north", "south"])))
        .unwrap();
    g.end_branch(dir, "0").unwrap();
    g
}

#[test]
fn test_unique_candidate_completes_with_suffix() {
    let g = compass();
    assert_eq!(g.prompt("no"), Completion::Suffix("rth".to_string()));
}

#[test]
fn test_shared_prefix_completes_up_to_the_fork() {
    let mut g = Grammar::new("compass8");
    let root = g.root();
    let dir = g
        .add_child(
            root,
            Node::normal("dir", FieldHandler::one_of(["north", "northeast", "northwest"])),
        )
        .unwrap();
    g.end_branch(dir, "0").unwrap();

    // "no" extends to the common "north"; beyond that the set forks
    assert_eq!(g.prompt("no"), Completion::Suffix("rth".to_string()));
    assert_eq!(
        g.prompt("north"),
        Completion::Candidates(vec![CandidateGroup {
            source: "dir".to_string(),
            candidates: vec![
                "north".to_string(),
                "northeast".to_string(),
                "northwest".to_string(),
            ],
        }])
    );
}

#[test]
fn test_empty_prompt_lists_all_candidates() {
    let g = compass();
    assert_eq!(
        g.prompt(""),
        Completion::Candidates(vec![CandidateGroup {
            source: "dir".to_string(),
            candidates: vec!["north".to_string(), "south".to_string()],
        }])
    );
}

#[test]
fn test_fork_under_different_parents_stays_grouped() {
    // Two alternatives ending in literals that share the prefix "f"; the
    // sources are distinct nodes, so the candidates must not be merged.
    let mut g = Grammar::new("fork");
    let root = g.root();
    let m1 = g
        .add_child(root, Node::normal("m1", FieldHandler::literal("flip")))
        .unwrap();
    g.end_branch(m1, "0").unwrap();
    let m2 = g
        .add_child(root, Node::normal("m2", FieldHandler::literal("flop")))
        .unwrap();
    g.end_branch(m2, "1").unwrap();

    assert_eq!(
        g.prompt("f"),
        Completion::Candidates(vec![
            CandidateGroup {
                source: "m1".to_string(),
                candidates: vec!["flip".to_string()],
            },
            CandidateGroup {
                source: "m2".to_string(),
                candidates: vec!["flop".to_string()],
            },
        ])
    );
}

#[test]
fn test_second_token_completion_after_committed_word() {
    let mut g = Grammar::new("turn");
    let root = g.root();
    let verb = g
        .add_child(root, Node::normal("verb", FieldHandler::literal("turn")))
        .unwrap();
    let dir = g
        .add_child(verb, Node::normal("dir", FieldHandler::one_of(["left", "right"])))
        .unwrap();
    g.end_branch(dir, "0").unwrap();

    assert_eq!(g.prompt("turn le"), Completion::Suffix("ft".to_string()));
    // Committed word that matches nothing: no sources survive
    assert_eq!(g.prompt("spin le"), Completion::None);
}

#[test]
fn test_unenumerable_handler_yields_no_completion() {
    let mut g = Grammar::new("count");
    let root = g.root();
    let n = g
        .add_child(root, Node::normal("n", FieldHandler::decimal(0.0, 9.0).unwrap()))
        .unwrap();
    g.end_branch(n, "0").unwrap();

    assert_eq!(g.prompt("3"), Completion::None);
}

#[test]
fn test_sub_grammar_completion_has_nested_source_path() {
    let axes = chain("axis", FieldHandler::one_of(["x", "y", "z"]), 2).unwrap();
    let mut g = Grammar::new("rotate");
    let root = g.root();
    let plane = g
        .add_child(root, Node::normal("plane", FieldHandler::sub_grammar(axes)))
        .unwrap();
    g.end_branch(plane, "0").unwrap();

    assert_eq!(
        g.prompt(""),
        Completion::Candidates(vec![CandidateGroup {
            source: "plane axis0".to_string(),
            candidates: vec!["x".to_string(), "y".to_string(), "z".to_string()],
        }])
    );
    // The source path walks through the consumed first component
    assert_eq!(
        g.prompt("x "),
        Completion::Candidates(vec![CandidateGroup {
            source: "plane axis0 axis1".to_string(),
            candidates: vec!["x".to_string(), "y".to_string(), "z".to_string()],
        }])
    );
}

#[test]
fn test_loop_prompts_again_after_each_item() {
    let mut g = Grammar::new("walk");
    let root = g.root();
    let dirs = g
        .add_child(root, Node::repeating("dirs", FieldHandler::one_of(["up", "down"])))
        .unwrap();
    g.end_branch(dirs, "0").unwrap();

    assert_eq!(g.prompt("up d"), Completion::Suffix("own".to_string()));
    assert_eq!(g.prompt("up down u"), Completion::Suffix("p".to_string()));
}

#[test]
fn test_prompt_does_not_disturb_committed_captures() {
    let mut g = compass();
    assert!(g.validate("north").unwrap());
    let _ = g.prompt("so");
    assert_eq!(g.captured_value("dir").unwrap(), Some("north"));
    assert_eq!(g.matched_leaf_id().unwrap(), "0");
}
