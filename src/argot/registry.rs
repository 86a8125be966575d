//! The prototype registry: a process-wide catalog of named field-handler and
//! grammar prototypes.
//!
//! Prototypes are registered once at startup and only ever cloned out, so a
//! command invocation always works on an isolated tree: no invocation can
//! observe another's captures. The global instance lives behind a lock only
//! because Rust statics must be `Sync`; the engine itself is single-threaded.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::argot::error::{Error, Result};
use crate::argot::grammar::Grammar;
use crate::argot::handler::FieldHandler;

/// A registered prototype: either one field handler or a whole grammar
#[derive(Debug, Clone)]
pub enum Prototype {
    Handler(FieldHandler),
    Grammar(Grammar),
}

/// Name → prototype catalog; populated once, clone-only afterwards
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, Prototype>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field-handler prototype. An embedded grammar is verified
    /// and linked here, exactly like a grammar prototype.
    pub fn register_handler(&mut self, name: &str, handler: FieldHandler) -> Result<()> {
        if let FieldHandler::SubGrammar(grammar) = &handler {
            grammar.verify()?;
        }
        let mut handler = handler;
        if let FieldHandler::SubGrammar(grammar) = &mut handler {
            grammar.link()?;
        }
        self.insert(name, Prototype::Handler(handler))
    }

    /// Register a grammar prototype after verifying and linking it
    pub fn register_grammar(&mut self, name: &str, mut grammar: Grammar) -> Result<()> {
        grammar.verify()?;
        grammar.link()?;
        self.insert(name, Prototype::Grammar(grammar))
    }

    fn insert(&mut self, name: &str, prototype: Prototype) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(Error::DuplicateItem(format!(
                "registry entry '{}'",
                name
            )));
        }
        self.entries.insert(name.to_string(), prototype);
        Ok(())
    }

    /// Clone out a field-handler prototype
    pub fn create_handler(&self, name: &str) -> Result<FieldHandler> {
        match self.entries.get(name) {
            Some(Prototype::Handler(handler)) => Ok(handler.clone()),
            // A grammar prototype embeds fine as a handler
            Some(Prototype::Grammar(grammar)) => {
                Ok(FieldHandler::SubGrammar(Box::new(grammar.clone())))
            }
            None => Err(Error::NotFound(format!("handler prototype '{}'", name))),
        }
    }

    /// Clone out a grammar prototype. Ancestor cross-references are
    /// re-linked on the clone rather than trusted from the prototype.
    pub fn create_grammar(&self, name: &str) -> Result<Grammar> {
        match self.entries.get(name) {
            Some(Prototype::Grammar(grammar)) => {
                let mut clone = grammar.clone();
                clone.link()?;
                Ok(clone)
            }
            Some(Prototype::Handler(_)) => Err(Error::NotFound(format!(
                "grammar prototype '{}' (a handler is registered under that name)",
                name
            ))),
            None => Err(Error::NotFound(format!("grammar prototype '{}'", name))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted for stable display
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

static GLOBAL: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::new()));

/// Register a handler prototype in the process-wide registry
pub fn register_handler(name: &str, handler: FieldHandler) -> Result<()> {
    GLOBAL
        .write()
        .expect("registry lock poisoned")
        .register_handler(name, handler)
}

/// Register a grammar prototype in the process-wide registry
pub fn register_grammar(name: &str, grammar: Grammar) -> Result<()> {
    GLOBAL
        .write()
        .expect("registry lock poisoned")
        .register_grammar(name, grammar)
}

/// Clone a handler prototype out of the process-wide registry
pub fn create_handler(name: &str) -> Result<FieldHandler> {
    GLOBAL
        .read()
        .expect("registry lock poisoned")
        .create_handler(name)
}

/// Clone a grammar prototype out of the process-wide registry
pub fn create_grammar(name: &str) -> Result<Grammar> {
    GLOBAL
        .read()
        .expect("registry lock poisoned")
        .create_grammar(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argot::grammar::Node;

    fn yes_no() -> Grammar {
        let mut g = Grammar::new("yes-no");
        let root = g.root();
        let flag = g
            .add_child(root, Node::normal("flag", FieldHandler::boolean()))
            .unwrap();
        g.end_branch(flag, "0").unwrap();
        g
    }

    #[test]
    fn test_register_and_create_handler() {
        let mut registry = Registry::new();
        registry
            .register_handler("direction", FieldHandler::one_of(["north", "south"]))
            .unwrap();
        let handler = registry.create_handler("direction").unwrap();
        assert!(matches!(handler, FieldHandler::OneOf(_)));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = Registry::new();
        registry
            .register_handler("direction", FieldHandler::any_word())
            .unwrap();
        let err = registry
            .register_handler("direction", FieldHandler::boolean())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateItem(_)));
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = Registry::new();
        assert!(matches!(
            registry.create_handler("missing"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            registry.create_grammar("missing"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_register_grammar_runs_verification() {
        let mut registry = Registry::new();
        let mut broken = Grammar::new("broken");
        let root = broken.root();
        broken
            .add_child(root, Node::normal("x", FieldHandler::any_word()))
            .unwrap();
        let err = registry.register_grammar("broken", broken).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn test_created_grammars_are_isolated() {
        let mut registry = Registry::new();
        registry.register_grammar("yes-no", yes_no()).unwrap();

        let mut first = registry.create_grammar("yes-no").unwrap();
        let second = registry.create_grammar("yes-no").unwrap();

        assert!(first.validate("true").unwrap());
        assert_eq!(first.captured_value("flag").unwrap(), Some("true"));
        // The sibling clone saw nothing
        assert!(matches!(
            second.captured_value("flag"),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_grammar_prototype_embeds_as_handler() {
        let mut registry = Registry::new();
        registry.register_grammar("yes-no", yes_no()).unwrap();
        let handler = registry.create_handler("yes-no").unwrap();
        assert!(matches!(handler, FieldHandler::SubGrammar(_)));
    }
}
