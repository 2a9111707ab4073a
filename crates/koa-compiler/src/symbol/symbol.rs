//! Symbol definitions.

use std::fmt;
use std::sync::Arc;

use super::{Scope, ScopeRef, SymbolError};
use crate::ast::{DataStructure, Identifier};

/// The closed set of symbol kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    /// An `int` binding
    Integer,
    /// A `string` binding
    String,
    /// A `bool` binding
    Boolean,
    /// A function
    Function,
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolType::Integer => "INTEGER",
            SymbolType::String => "STRING",
            SymbolType::Boolean => "BOOLEAN",
            SymbolType::Function => "FUNCTION",
        })
    }
}

/// What an identifier means in the scope that defines it.
///
/// Symbols are immutable once built; scopes hand them out behind an `Arc`.
#[derive(Debug, Clone)]
pub enum Symbol {
    /// An `int` variable or parameter
    Integer(Identifier),
    /// A `string` variable or parameter
    String(Identifier),
    /// A `bool` variable or parameter
    Boolean(Identifier),
    /// A function together with the scope of its parameters and locals
    Function(FunctionSymbol),
}

/// A function symbol.
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    /// The function name
    pub name: String,
    /// The function's own scope
    pub scope: ScopeRef,
}

impl Symbol {
    /// Builds the variable symbol matching a declared type.
    pub fn from_data_structure(ty: DataStructure, ident: Identifier) -> Result<Symbol, SymbolError> {
        match ty {
            DataStructure::Int => Ok(Symbol::Integer(ident)),
            DataStructure::String => Ok(Symbol::String(ident)),
            DataStructure::Bool => Ok(Symbol::Boolean(ident)),
            DataStructure::Void => Err(SymbolError::VoidBinding(ident.value)),
        }
    }

    /// Builds a function symbol whose scope is nested in `outer`.
    pub fn function(name: impl Into<String>, outer: &ScopeRef) -> Symbol {
        Symbol::Function(FunctionSymbol {
            name: name.into(),
            scope: Scope::enclosed(outer),
        })
    }

    /// The kind of this symbol.
    pub fn symbol_type(&self) -> SymbolType {
        match self {
            Symbol::Integer(_) => SymbolType::Integer,
            Symbol::String(_) => SymbolType::String,
            Symbol::Boolean(_) => SymbolType::Boolean,
            Symbol::Function(_) => SymbolType::Function,
        }
    }

    /// The bare identifier name.
    pub fn name(&self) -> &str {
        match self {
            Symbol::Integer(ident) | Symbol::String(ident) | Symbol::Boolean(ident) => {
                &ident.value
            }
            Symbol::Function(function) => &function.name,
        }
    }

    /// The data type a value of this symbol has, `None` for functions.
    pub fn data_structure(&self) -> Option<DataStructure> {
        match self {
            Symbol::Integer(_) => Some(DataStructure::Int),
            Symbol::String(_) => Some(DataStructure::String),
            Symbol::Boolean(_) => Some(DataStructure::Bool),
            Symbol::Function(_) => None,
        }
    }

    /// The function's scope, for function symbols.
    pub fn scope(&self) -> Option<&ScopeRef> {
        match self {
            Symbol::Function(function) => Some(&function.scope),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Function(function) => write!(f, "func {}", function.name),
            other => f.write_str(other.name()),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Symbol::Integer(a), Symbol::Integer(b))
            | (Symbol::String(a), Symbol::String(b))
            | (Symbol::Boolean(a), Symbol::Boolean(b)) => a == b,
            (Symbol::Function(a), Symbol::Function(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.scope, &b.scope)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        for name in ["testName", "a", "b"] {
            let symbol = Symbol::Integer(Identifier::new(name));
            assert_eq!(symbol.to_string(), name);
            assert_eq!(symbol.symbol_type(), SymbolType::Integer);
        }
    }

    #[test]
    fn test_string() {
        for name in ["testName", "a", "b"] {
            let symbol = Symbol::String(Identifier::new(name));
            assert_eq!(symbol.to_string(), name);
            assert_eq!(symbol.symbol_type(), SymbolType::String);
        }
    }

    #[test]
    fn test_boolean() {
        for name in ["testName", "a"] {
            let symbol = Symbol::Boolean(Identifier::new(name));
            assert_eq!(symbol.to_string(), name);
            assert_eq!(symbol.symbol_type(), SymbolType::Boolean);
        }
    }

    #[test]
    fn test_function() {
        let global = Scope::new_ref();
        let symbol = Symbol::function("add", &global);
        assert_eq!(symbol.to_string(), "func add");
        assert_eq!(symbol.name(), "add");
        assert_eq!(symbol.symbol_type(), SymbolType::Function);
        assert!(symbol.scope().is_some());
    }

    #[test]
    fn test_from_data_structure() {
        let ident = Identifier::new("x");
        assert_eq!(
            Symbol::from_data_structure(DataStructure::Bool, ident.clone())
                .unwrap()
                .symbol_type(),
            SymbolType::Boolean
        );
        assert!(matches!(
            Symbol::from_data_structure(DataStructure::Void, ident),
            Err(SymbolError::VoidBinding(name)) if name == "x"
        ));
    }
}
