use std::fmt;

mod cache;
mod compiler;
mod evaluator;
mod parser;

pub use cache::FunctionCache;
pub use compiler::CompiledFunction;
pub use parser::{ExpressionParser as Parser, Scope};

use crate::functions::Builtin;

/// A bound expression tree. Identifiers are resolved while parsing, so a tree
/// only ever refers to declared variables (by argument index), constants (by
/// value) and built-in functions.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(f64),
    Variable {
        name: String,
        index: usize,
    },
    Constant {
        name: String,
        value: f64,
    },
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    LogicalOperation {
        left: Box<ASTNode>,
        operator: LogicalOperator,
        right: Box<ASTNode>,
    },
    Negate(Box<ASTNode>),
    Conditional {
        condition: Box<ASTNode>,
        then: Box<ASTNode>,
        otherwise: Box<ASTNode>,
    },
    FunctionCall {
        builtin: &'static Builtin,
        args: Vec<ASTNode>,
    },
}

impl fmt::Display for ASTNode {
    /// Writes a fully parenthesized form that parses back to the same tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Number(value) => write!(f, "{:?}", value),
            ASTNode::Variable { name, .. } | ASTNode::Constant { name, .. } => f.write_str(name),
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ASTNode::LogicalOperation {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ASTNode::Negate(inner) => write!(f, "(-{})", inner),
            ASTNode::Conditional {
                condition,
                then,
                otherwise,
            } => write!(f, "if({}, {}, {})", condition, then, otherwise),
            ASTNode::FunctionCall { builtin, args } => {
                write!(f, "{}(", builtin.name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[inline]
fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            LogicalOperator::And => truth(left != 0.0 && right != 0.0),
            LogicalOperator::Or => truth(left != 0.0 || right != 0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LogicalOperator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "&&" => Ok(LogicalOperator::And),
            "||" => Ok(LogicalOperator::Or),
            _ => Err(format!("Unknown logical operator: {}", value)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equal,
    NotEqual,
}

impl Operator {
    /// Division follows IEEE-754: `x / 0.0` is an infinity or NaN, not an error.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
            Operator::GreaterThan => truth(left > right),
            Operator::LessThan => truth(left < right),
            Operator::GreaterThanOrEqual => truth(left >= right),
            Operator::LessThanOrEqual => truth(left <= right),
            Operator::Equal => truth(left == right),
            Operator::NotEqual => truth(left != right),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            ">" => Ok(Operator::GreaterThan),
            "<" => Ok(Operator::LessThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "<=" => Ok(Operator::LessThanOrEqual),
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons_are_numeric() {
        assert_eq!(Operator::GreaterThan.apply(2.0, 1.0), 1.0);
        assert_eq!(Operator::GreaterThan.apply(1.0, 2.0), 0.0);
        assert_eq!(Operator::Equal.apply(0.0, -0.0), 1.0);
        assert_eq!(Operator::NotEqual.apply(f64::NAN, f64::NAN), 1.0);
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(Operator::Divide.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(Operator::Divide.apply(-1.0, 0.0), f64::NEG_INFINITY);
        assert!(Operator::Divide.apply(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_logical_operators_treat_nonzero_as_true() {
        assert_eq!(LogicalOperator::And.apply(2.5, -1.0), 1.0);
        assert_eq!(LogicalOperator::And.apply(2.5, 0.0), 0.0);
        assert_eq!(LogicalOperator::Or.apply(0.0, 0.0), 0.0);
        assert_eq!(LogicalOperator::Or.apply(0.0, 3.0), 1.0);
    }

    #[test]
    fn test_operator_round_trips_through_text() {
        for op in [
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::GreaterThanOrEqual,
            Operator::LessThanOrEqual,
            Operator::Equal,
            Operator::NotEqual,
        ] {
            assert_eq!(Operator::try_from(op.as_str()), Ok(op));
        }
        assert!(Operator::try_from("%").is_err());
        assert_eq!(LogicalOperator::try_from("||"), Ok(LogicalOperator::Or));
        assert!(LogicalOperator::try_from("AND").is_err());
    }
}
