use crate::ast::{ASTNode, LogicalOperator};
use crate::functions::MAX_ARITY;

impl ASTNode {
    /// Evaluates the tree for one set of variable values, indexed as bound by
    /// the parser. `&&`, `||` and `if` only evaluate the operands they need.
    ///
    /// `args` must cover every variable index in the tree;
    /// [`CompiledFunction`](crate::ast::CompiledFunction) checks this once per call.
    pub fn evaluate(&self, args: &[f64]) -> f64 {
        match self {
            ASTNode::Number(value) => *value,
            ASTNode::Variable { index, .. } => args[*index],
            ASTNode::Constant { value, .. } => *value,
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => operator.apply(left.evaluate(args), right.evaluate(args)),
            ASTNode::LogicalOperation {
                left,
                operator,
                right,
            } => {
                let left_value = left.evaluate(args);
                match (operator, left_value != 0.0) {
                    (LogicalOperator::And, false) => 0.0,
                    (LogicalOperator::Or, true) => 1.0,
                    _ => operator.apply(left_value, right.evaluate(args)),
                }
            }
            ASTNode::Negate(inner) => -inner.evaluate(args),
            ASTNode::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate(args) != 0.0 {
                    then.evaluate(args)
                } else {
                    otherwise.evaluate(args)
                }
            }
            ASTNode::FunctionCall { builtin, args: call_args } => {
                let mut values = [0.0; MAX_ARITY];
                for (slot, arg) in values.iter_mut().zip(call_args) {
                    *slot = arg.evaluate(args);
                }
                builtin.apply(&values[..call_args.len()])
            }
        }
    }
}
