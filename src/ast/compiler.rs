use crate::ast::{ASTNode, Parser, Scope};
use crate::error::{CompileError, EvaluationError};
use log::debug;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A compiled `;`-separated expression list over declared variables and constants.
///
/// Immutable once built, so a single instance can be evaluated from any
/// number of threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    source: String,
    components: Vec<ASTNode>,
    scope: Scope,
}

impl CompiledFunction {
    /// Compiles `expression` against the given variable names (in argument
    /// order) and named constants.
    ///
    /// Every identifier is bound here, so an unknown name fails now rather
    /// than at the first evaluation.
    pub fn compile<V>(
        expression: &str,
        variables: V,
        constants: &HashMap<String, f64>,
    ) -> Result<Self, CompileError>
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        Self::with_scope(expression, Scope::new(variables, constants)?)
    }

    pub fn with_scope(expression: &str, scope: Scope) -> Result<Self, CompileError> {
        let components = Parser::parse_function_list(expression, &scope)?;
        debug!(
            "Compiled {} component(s) over ({}): {}",
            components.len(),
            scope.variables().join(", "),
            expression
        );
        Ok(Self {
            source: expression.to_string(),
            components,
            scope,
        })
    }

    /// Evaluates every component; `args` follow the order of [`Self::variables`].
    pub fn evaluate(&self, args: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        self.check_arguments(args)?;
        Ok(self
            .components
            .iter()
            .map(|component| component.evaluate(args))
            .collect())
    }

    /// Evaluates a single component.
    pub fn value(&self, args: &[f64], component: usize) -> Result<f64, EvaluationError> {
        self.check_arguments(args)?;
        self.components
            .get(component)
            .map(|ast| ast.evaluate(args))
            .ok_or(EvaluationError::ComponentOutOfRange {
                component,
                count: self.components.len(),
            })
    }

    /// Evaluates many argument sets in parallel, preserving their order.
    pub fn evaluate_batch<P>(&self, points: &[P]) -> Result<Vec<Vec<f64>>, EvaluationError>
    where
        P: AsRef<[f64]> + Sync,
    {
        points
            .par_iter()
            .map(|point| self.evaluate(point.as_ref()))
            .collect()
    }

    fn check_arguments(&self, args: &[f64]) -> Result<(), EvaluationError> {
        let expected = self.scope.variables().len();
        if args.len() != expected {
            return Err(EvaluationError::ArgumentCount {
                expected,
                found: args.len(),
            });
        }
        Ok(())
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[ASTNode] {
        &self.components
    }

    pub fn variables(&self) -> &[String] {
        self.scope.variables()
    }

    pub fn constants(&self) -> &BTreeMap<String, f64> {
        self.scope.constants()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}
