//! Reader for nested `subsection` / `set` parameter files and a compiler for
//! the function expressions they embed.
//!
//! ```
//! use paramfile_rs::{parse_parameters, ParsedFunction};
//!
//! let tree = parse_parameters(
//!     "subsection Function\n  set Function expression = 2*x + t\nend\n",
//! )
//! .unwrap();
//! let function = ParsedFunction::from_section(&tree, &["Function"], 1, 1).unwrap();
//! assert_eq!(function.evaluate_at(&[3.0], 1.0).unwrap(), vec![7.0]);
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod functions;
pub mod parsed_function;

use std::collections::HashMap;

pub use ast::{CompiledFunction, FunctionCache};
pub use config::{ConfigTree, Pattern};
pub use error::{CompileError, ConfigError, Error, EvaluationError, Result};
pub use parsed_function::ParsedFunction;

pub fn parse_parameters(text: &str) -> Result<ConfigTree, ConfigError> {
    ConfigTree::parse(text)
}

pub fn compile_function<V>(
    expression: &str,
    variables: V,
    constants: &HashMap<String, f64>,
) -> Result<CompiledFunction, CompileError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
{
    CompiledFunction::compile(expression, variables, constants)
}

/// Compiles and evaluates a single-component expression in one step.
pub fn evaluate_expression(expression: &str, variables: &[(&str, f64)]) -> Result<f64> {
    let scope = ast::Scope::new(variables.iter().map(|(name, _)| *name), &HashMap::new())?;
    let ast = ast::Parser::parse_expression(expression, &scope)?;
    let args: Vec<f64> = variables.iter().map(|(_, value)| *value).collect();
    Ok(ast.evaluate(&args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(
            evaluate_expression("x * y + 1", &[("x", 2.0), ("y", 3.0)]).unwrap(),
            7.0
        );
        assert!(evaluate_expression("2 ^ 3", &[]).is_err());
        assert!(matches!(
            evaluate_expression("1; 2", &[]),
            Err(Error::Compile(CompileError::ComponentCount {
                expected: 1,
                found: 2
            }))
        ));
        assert!(matches!(
            evaluate_expression("x", &[("x", 1.0), ("x", 2.0)]),
            Err(Error::Compile(CompileError::DuplicateSymbol(_)))
        ));
    }

    #[test]
    fn test_compile_function() {
        let constants = HashMap::from([("g".to_string(), 9.81)]);
        let function = compile_function("0; -g*z", ["x", "z"], &constants).unwrap();
        assert_eq!(function.evaluate(&[0.0, 2.0]).unwrap(), vec![0.0, -19.62]);
    }
}
