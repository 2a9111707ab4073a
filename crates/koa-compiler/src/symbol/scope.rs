//! Scopes for name resolution.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Symbol, SymbolError};

/// Shared handle to a scope.
pub type ScopeRef = Arc<RwLock<Scope>>;

/// A set of bindings plus a lookup-only link to the enclosing scope.
///
/// Children never own their parent: the link is a `Weak`, so a chain of
/// scopes is freed from the top down.
#[derive(Debug, Default)]
pub struct Scope {
    store: FxHashMap<String, Arc<Symbol>>,
    outer: Option<Weak<RwLock<Scope>>>,
}

impl Scope {
    /// Creates a scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shared scope with no parent.
    pub fn new_ref() -> ScopeRef {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Creates a shared scope nested in `outer`.
    pub fn enclosed(outer: &ScopeRef) -> ScopeRef {
        Arc::new(RwLock::new(Self {
            store: FxHashMap::default(),
            outer: Some(Arc::downgrade(outer)),
        }))
    }

    /// The enclosing scope, if it is still alive.
    pub fn outer(&self) -> Option<ScopeRef> {
        self.outer.as_ref().and_then(Weak::upgrade)
    }

    /// Binds `name` in this scope and returns the stored symbol.
    ///
    /// A name may be bound once per scope; nested scopes may shadow it.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        symbol: Symbol,
    ) -> Result<Arc<Symbol>, SymbolError> {
        let name = name.into();
        if self.store.contains_key(&name) {
            return Err(SymbolError::Redefined(name));
        }
        let symbol = Arc::new(symbol);
        self.store.insert(name, Arc::clone(&symbol));
        Ok(symbol)
    }

    /// Looks `name` up here, then in each enclosing scope.
    pub fn resolve(&self, name: &str) -> Option<Arc<Symbol>> {
        if let Some(symbol) = self.resolve_local(name) {
            return Some(symbol);
        }
        self.outer()?.read().resolve(name)
    }

    /// Looks `name` up in this scope only.
    pub fn resolve_local(&self, name: &str) -> Option<Arc<Symbol>> {
        self.store.get(name).cloned()
    }

    /// Number of bindings in this scope.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing is bound in this scope.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
