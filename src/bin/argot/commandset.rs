//! Built-in demo command set for the argot binary.
//!
//! Registers a handful of prototypes and command grammars that exercise the
//! engine end to end: alternatives, loops, a chained vector sub-grammar and
//! a back-reference.

use argot::argot::grammar::{Node, NodeKind};
use argot::argot::handler::{chain, FieldHandler};
use argot::argot::registry;
use argot::argot::{Grammar, Result};

/// Command names in display order
pub const COMMANDS: &[&str] = &["go", "paint", "set", "toggle"];

/// Register every prototype and command grammar of the demo set.
///
/// Call once at startup; repeating it trips the registry's duplicate check.
pub fn register_all() -> Result<()> {
    registry::register_handler(
        "direction",
        FieldHandler::one_of(["north", "south", "east", "west"]),
    )?;
    registry::register_handler("steps", FieldHandler::decimal(1.0, 99.0)?)?;
    registry::register_handler("rgb", FieldHandler::sub_grammar(chain(
        "rgb",
        FieldHandler::decimal(0.0, 255.0)?,
        3,
    )?))?;

    registry::register_grammar("go", go())?;
    registry::register_grammar("paint", paint())?;
    registry::register_grammar("set", set())?;
    registry::register_grammar("toggle", toggle())?;
    Ok(())
}

/// Clone a command grammar for one invocation
pub fn invoke(command: &str) -> Result<Grammar> {
    registry::create_grammar(command)
}

/// `go <direction> <steps>...` (zero steps allowed) | `go home`
fn go() -> Grammar {
    let mut g = Grammar::new("go");
    let root = g.root();
    let dir = g
        .add_registered(root, "direction", "direction", NodeKind::Normal)
        .expect("direction prototype registered above");
    let steps = g
        .add_registered(dir, "steps", "steps", NodeKind::Loop)
        .expect("steps prototype registered above");
    g.end_branch(steps, "0").expect("fresh tree");
    let home = g
        .add_child(root, Node::normal("home", FieldHandler::literal("home")))
        .expect("fresh tree");
    g.end_branch(home, "1").expect("fresh tree");
    g
}

/// `paint <r> <g> <b>` via the chained rgb sub-grammar
fn paint() -> Grammar {
    let mut g = Grammar::new("paint");
    let root = g.root();
    let color = g
        .add_registered(root, "color", "rgb", NodeKind::Normal)
        .expect("rgb prototype registered above");
    g.end_branch(color, "0").expect("fresh tree");
    g
}

/// `set <key> <value>` where the value must repeat the key — the
/// back-reference demo
fn set() -> Grammar {
    let mut g = Grammar::new("set");
    let root = g.root();
    let key = g
        .add_child(root, Node::normal("key", FieldHandler::any_word()))
        .expect("fresh tree");
    let value = g
        .add_child(key, Node::normal("value", FieldHandler::back_ref("key")))
        .expect("fresh tree");
    g.end_branch(value, "0").expect("fresh tree");
    g
}

/// `toggle true|false`
fn toggle() -> Grammar {
    let mut g = Grammar::new("toggle");
    let root = g.root();
    let flag = g
        .add_child(root, Node::normal("flag", FieldHandler::boolean()))
        .expect("fresh tree");
    g.end_branch(flag, "0").expect("fresh tree");
    g
}
