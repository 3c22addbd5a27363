//! Functions of space and time configured from a parameter section.
//!
//! A section describes a function through three entries:
//!
//! ```text
//! subsection Function
//!   set Variable names      = x,y,t
//!   set Function constants  = cm=0.01, year=1, vel=-0.20
//!   set Function expression = if (x==0 && y>0.5e3, vel*cm/year, 0); 0
//! end
//! ```
//!
//! All three are optional. Missing variable names default to the spatial
//! coordinates followed by `t`, and a missing expression is the zero function.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::ast::{CompiledFunction, FunctionCache};
use crate::config::{normalize_name, split_list, ConfigTree, ParameterValue};
use crate::error::{CompileError, ConfigError, Error, EvaluationError};

pub const VARIABLE_NAMES: &str = "Variable names";
pub const FUNCTION_CONSTANTS: &str = "Function constants";
pub const FUNCTION_EXPRESSION: &str = "Function expression";

/// A compiled vector-valued function of a `dim`-dimensional point and,
/// optionally, time.
#[derive(Debug, Clone)]
pub struct ParsedFunction {
    function: Arc<CompiledFunction>,
    dim: usize,
    time_dependent: bool,
}

struct Definition {
    variables: Vec<String>,
    constants: HashMap<String, f64>,
    expression: String,
}

impl ParsedFunction {
    /// Reads and compiles the function described by the section at `path`.
    pub fn from_section(
        tree: &ConfigTree,
        path: &[&str],
        dim: usize,
        n_components: usize,
    ) -> Result<Self, Error> {
        let definition = Definition::read(tree, path, dim, n_components)?;
        let function =
            CompiledFunction::compile(&definition.expression, &definition.variables, &definition.constants)?;
        Self::new(Arc::new(function), dim, n_components)
    }

    /// Like [`ParsedFunction::from_section`], sharing compiled functions
    /// through `cache`.
    pub fn from_section_cached(
        tree: &ConfigTree,
        path: &[&str],
        dim: usize,
        n_components: usize,
        cache: &FunctionCache,
    ) -> Result<Self, Error> {
        let definition = Definition::read(tree, path, dim, n_components)?;
        let function = cache.get_or_compile(
            &definition.expression,
            &definition.variables,
            &definition.constants,
        )?;
        Self::new(function, dim, n_components)
    }

    fn new(function: Arc<CompiledFunction>, dim: usize, n_components: usize) -> Result<Self, Error> {
        if function.n_components() != n_components {
            return Err(CompileError::ComponentCount {
                expected: n_components,
                found: function.n_components(),
            }
            .into());
        }
        let time_dependent = function.variables().len() == dim + 1;
        debug!(
            "Parsed function of ({}){}: {}",
            function.variables().join(", "),
            if time_dependent { " with time" } else { "" },
            function.source()
        );
        Ok(Self {
            function,
            dim,
            time_dependent,
        })
    }

    /// All components at `point` and `time`. `time` is ignored when the
    /// function does not declare a time variable.
    pub fn evaluate_at(&self, point: &[f64], time: f64) -> Result<Vec<f64>, EvaluationError> {
        self.function.evaluate(&self.arguments(point, time)?)
    }

    pub fn value_at(
        &self,
        point: &[f64],
        time: f64,
        component: usize,
    ) -> Result<f64, EvaluationError> {
        self.function.value(&self.arguments(point, time)?, component)
    }

    fn arguments(&self, point: &[f64], time: f64) -> Result<Vec<f64>, EvaluationError> {
        if point.len() != self.dim {
            return Err(EvaluationError::ArgumentCount {
                expected: self.dim,
                found: point.len(),
            });
        }
        let mut args = Vec::with_capacity(self.dim + 1);
        args.extend_from_slice(point);
        if self.time_dependent {
            args.push(time);
        }
        Ok(args)
    }

    pub fn function(&self) -> &CompiledFunction {
        &self.function
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn n_components(&self) -> usize {
        self.function.n_components()
    }

    pub fn is_time_dependent(&self) -> bool {
        self.time_dependent
    }
}

impl Definition {
    fn read(
        tree: &ConfigTree,
        path: &[&str],
        dim: usize,
        n_components: usize,
    ) -> Result<Self, ConfigError> {
        let variables = match tree.get_list::<String>(path, VARIABLE_NAMES) {
            Ok(names) => names,
            Err(ConfigError::MissingKey { .. }) => default_variable_names(dim),
            Err(e) => return Err(e),
        };
        if variables.len() != dim && variables.len() != dim + 1 {
            return Err(type_error(
                tree,
                path,
                VARIABLE_NAMES,
                format!("{} or {} variable names", dim, dim + 1),
            ));
        }

        let constants = match tree.get_str(path, FUNCTION_CONSTANTS) {
            Ok(text) => parse_constants(text).ok_or_else(|| {
                type_error(
                    tree,
                    path,
                    FUNCTION_CONSTANTS,
                    "a comma-separated list of name=value pairs".to_string(),
                )
            })?,
            Err(ConfigError::MissingKey { .. }) => HashMap::new(),
            Err(e) => return Err(e),
        };

        let expression = match tree.get_str(path, FUNCTION_EXPRESSION) {
            Ok(text) => text.to_string(),
            Err(ConfigError::MissingKey { .. }) => vec!["0"; n_components].join("; "),
            Err(e) => return Err(e),
        };

        Ok(Self {
            variables,
            constants,
            expression,
        })
    }
}

fn type_error(tree: &ConfigTree, path: &[&str], key: &str, expected: String) -> ConfigError {
    ConfigError::Type {
        expected,
        path: path.iter().map(|name| normalize_name(name)).collect(),
        key: key.to_string(),
        text: tree.get_str(path, key).unwrap_or_default().to_string(),
    }
}

fn default_variable_names(dim: usize) -> Vec<String> {
    let mut names: Vec<String> = match dim {
        1..=3 => ["x", "y", "z"][..dim].iter().map(|n| n.to_string()).collect(),
        _ => (1..=dim).map(|i| format!("x{}", i)).collect(),
    };
    names.push("t".to_string());
    names
}

/// Parses `name=value, name=value`; `None` if any pair is malformed or a
/// name repeats.
fn parse_constants(text: &str) -> Option<HashMap<String, f64>> {
    let mut constants = HashMap::new();
    for pair in split_list(text) {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let value = f64::from_text(value)?;
        if constants.insert(name.to_string(), value).is_some() {
            return None;
        }
    }
    Some(constants)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "
subsection Boundary velocity model
  subsection Function
    set Variable names      = x,y,t
    set Function constants  = cm=0.01, year=1, vel=-0.20
    set Function expression = if (x==0 && y>0.5e3, vel*cm/year, 0); 0
  end
end
subsection Initial temperature model
  subsection Function
    set Variable names      = x,y
    set Function expression = 1600 - y/1000
  end
end
subsection Gravity model
  subsection Function
  end
end
subsection Broken
  set Function constants  = cm=0.01, year
  set Variable names      = a,b,c,d
end
";

    fn tree() -> ConfigTree {
        ConfigTree::parse(INPUT).unwrap()
    }

    const VELOCITY: [&str; 2] = ["Boundary velocity model", "Function"];

    #[test]
    fn test_boundary_velocity() {
        let function = ParsedFunction::from_section(&tree(), &VELOCITY, 2, 2).unwrap();
        assert!(function.is_time_dependent());
        assert_eq!(function.n_components(), 2);

        let inflow = function.evaluate_at(&[0.0, 600.0], 0.0).unwrap();
        assert!((inflow[0] + 0.002).abs() < 1e-15);
        assert_eq!(inflow[1], 0.0);
        assert_eq!(function.value_at(&[10.0, 600.0], 0.0, 0).unwrap(), 0.0);
        assert_eq!(function.value_at(&[0.0, 100.0], 5.0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_without_time_variable() {
        let function =
            ParsedFunction::from_section(&tree(), &["Initial temperature model", "Function"], 2, 1)
                .unwrap();
        assert!(!function.is_time_dependent());
        assert_eq!(function.evaluate_at(&[0.0, 1000.0], 99.0).unwrap(), vec![1599.0]);
    }

    #[test]
    fn test_defaults_are_a_zero_function() {
        let function =
            ParsedFunction::from_section(&tree(), &["Gravity model", "Function"], 3, 3).unwrap();
        assert_eq!(function.function().variables(), ["x", "y", "z", "t"]);
        assert_eq!(function.function().source(), "0; 0; 0");
        assert_eq!(function.evaluate_at(&[1.0, 2.0, 3.0], 4.0).unwrap(), vec![0.0; 3]);

        // A section that does not exist at all behaves the same.
        let function = ParsedFunction::from_section(&tree(), &["Nowhere"], 1, 1).unwrap();
        assert_eq!(function.function().variables(), ["x", "t"]);
    }

    #[test]
    fn test_component_count_must_match() {
        let error = ParsedFunction::from_section(&tree(), &VELOCITY, 2, 3).unwrap_err();
        assert!(matches!(
            error,
            Error::Compile(CompileError::ComponentCount {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_malformed_entries() {
        let error = ParsedFunction::from_section(&tree(), &["Broken"], 3, 1).unwrap_err();
        assert!(matches!(
            error,
            Error::Config(ConfigError::Type { ref key, .. }) if key == FUNCTION_CONSTANTS
        ));

        // Four names for a 2d function is neither dim nor dim + 1.
        let mut tree = tree();
        tree.set(&["Broken"], FUNCTION_CONSTANTS, "a=1").unwrap();
        let error = ParsedFunction::from_section(&tree, &["Broken"], 2, 1).unwrap_err();
        assert!(matches!(
            error,
            Error::Config(ConfigError::Type { ref key, .. }) if key == VARIABLE_NAMES
        ));
    }

    #[test]
    fn test_point_dimension_is_checked() {
        let function = ParsedFunction::from_section(&tree(), &VELOCITY, 2, 2).unwrap();
        assert_eq!(
            function.evaluate_at(&[0.0, 1.0, 2.0], 0.0),
            Err(EvaluationError::ArgumentCount {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            function.value_at(&[0.0, 1.0], 0.0, 2),
            Err(EvaluationError::ComponentOutOfRange {
                component: 2,
                count: 2
            })
        );
    }

    #[test]
    fn test_cached_sections_share_compiled_functions() {
        let mut tree = tree();
        tree.set(&["Copy"], VARIABLE_NAMES, "x,y,t").unwrap();
        tree.set(&["Copy"], FUNCTION_CONSTANTS, "vel=-0.20,cm=0.01 , year=1").unwrap();
        tree.set(
            &["Copy"],
            FUNCTION_EXPRESSION,
            "if (x==0 && y>0.5e3, vel*cm/year, 0); 0",
        )
        .unwrap();

        let cache = FunctionCache::new(8);
        let first = ParsedFunction::from_section_cached(&tree, &VELOCITY, 2, 2, &cache).unwrap();
        let second = ParsedFunction::from_section_cached(&tree, &["Copy"], 2, 2, &cache).unwrap();
        assert!(std::ptr::eq(first.function(), second.function()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(
            parse_constants("cm=0.01, year = 1"),
            Some(HashMap::from([
                ("cm".to_string(), 0.01),
                ("year".to_string(), 1.0)
            ]))
        );
        assert_eq!(parse_constants(""), Some(HashMap::new()));
        assert_eq!(parse_constants("cm"), None);
        assert_eq!(parse_constants("=1"), None);
        assert_eq!(parse_constants("cm=fast"), None);
        assert_eq!(parse_constants("cm=nan"), None);
        assert_eq!(parse_constants("cm=0.01, year=1, cm=0.02"), None);
    }

    #[test]
    fn test_repeated_constant_is_a_type_error() {
        let mut tree = tree();
        tree.set(&["Twice"], FUNCTION_CONSTANTS, "a=1, a=2").unwrap();
        tree.set(&["Twice"], FUNCTION_EXPRESSION, "a*x").unwrap();
        let error = ParsedFunction::from_section(&tree, &["Twice"], 1, 1).unwrap_err();
        assert!(matches!(
            error,
            Error::Config(ConfigError::Type { ref key, ref text, .. })
                if key == FUNCTION_CONSTANTS && text == "a=1, a=2"
        ));
    }

    #[test]
    fn test_errors_report_normalized_paths() {
        let error = ParsedFunction::from_section(&tree(), &["  Broken  "], 3, 1).unwrap_err();
        match error {
            Error::Config(ConfigError::Type { path, key, .. }) => {
                assert_eq!(path, vec!["Broken".to_string()]);
                assert_eq!(key, FUNCTION_CONSTANTS);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
