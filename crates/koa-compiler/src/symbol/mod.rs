//! Symbol table: typed bindings across nested scopes.
//!
//! The global scope holds one [`Symbol::Function`] per contract function.
//! Every function symbol carries its own child scope, which receives the
//! parameters up front and the local variables as code generation reaches
//! their declarations.
//!
//! ```rust
//! use koa_compiler::ast::Identifier;
//! use koa_compiler::symbol::{Scope, Symbol, SymbolType};
//!
//! let global = Scope::new_ref();
//! let add = global.write().define("add", Symbol::function("add", &global)).unwrap();
//!
//! let body = add.scope().unwrap();
//! body.write().define("a", Symbol::Integer(Identifier::new("a"))).unwrap();
//!
//! assert_eq!(body.read().resolve("a").unwrap().symbol_type(), SymbolType::Integer);
//! assert!(global.read().resolve("a").is_none());
//! ```

mod scope;
#[allow(clippy::module_inception)]
mod symbol;

pub use scope::{Scope, ScopeRef};
pub use symbol::{FunctionSymbol, Symbol, SymbolType};

use thiserror::Error;
use tracing::debug;

use crate::ast::Contract;

/// Errors raised while defining symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The name is already bound in the same scope
    #[error("'{0}' is already defined in this scope")]
    Redefined(String),

    /// A variable or parameter was declared with the void type
    #[error("'{0}' cannot have type void")]
    VoidBinding(String),
}

/// Builds the global scope of a contract: one function symbol per function,
/// each with its parameters already bound in the function's scope.
pub fn declare_functions(contract: &Contract) -> Result<ScopeRef, SymbolError> {
    let global = Scope::new_ref();

    for function in &contract.functions {
        let name = &function.name.value;
        let symbol = global
            .write()
            .define(name.clone(), Symbol::function(name.clone(), &global))?;

        if let Some(scope) = symbol.scope() {
            let mut scope = scope.write();
            for param in &function.parameters {
                let param_symbol = Symbol::from_data_structure(param.ty, param.identifier.clone())?;
                scope.define(param.identifier.value.clone(), param_symbol)?;
            }
        }

        debug!(function = %name, params = function.parameters.len(), "declared function");
    }

    Ok(global)
}
