use crate::ast::{ASTNode, LogicalOperator, Operator};
use crate::error::CompileError;
use crate::functions;
use log::{debug, trace};
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use std::collections::{BTreeMap, HashMap};

#[derive(Parser)]
#[grammar = "./expression.pest"]
pub struct ExpressionParser;

/// The names an expression may refer to: variables bound at each evaluation
/// (by position) and constants bound once at compile time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    variables: Vec<String>,
    constants: BTreeMap<String, f64>,
}

impl Scope {
    pub fn new<V>(variables: V, constants: &HashMap<String, f64>) -> Result<Self, CompileError>
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let variables: Vec<String> = variables
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();

        for (i, name) in variables.iter().enumerate() {
            if !is_identifier(name) {
                return Err(CompileError::InvalidSymbol(name.clone()));
            }
            if variables[..i].contains(name) || constants.contains_key(name) {
                return Err(CompileError::DuplicateSymbol(name.clone()));
            }
        }
        if let Some(name) = constants.keys().find(|name| !is_identifier(name)) {
            return Err(CompileError::InvalidSymbol(name.clone()));
        }

        Ok(Self {
            variables,
            constants: constants
                .iter()
                .map(|(name, value)| (name.clone(), *value))
                .collect(),
        })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn constants(&self) -> &BTreeMap<String, f64> {
        &self.constants
    }

    /// Variables win over constants, user constants over predefined ones.
    fn resolve(&self, name: &str, offset: usize) -> Result<ASTNode, CompileError> {
        if let Some(index) = self.variables.iter().position(|v| v == name) {
            return Ok(ASTNode::Variable {
                name: name.to_string(),
                index,
            });
        }
        self.constants
            .get(name)
            .copied()
            .or_else(|| functions::predefined_constant(name))
            .map(|value| ASTNode::Constant {
                name: name.to_string(),
                value,
            })
            .ok_or_else(|| CompileError::UnboundIdentifier {
                name: name.to_string(),
                offset,
            })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn syntax_error(error: pest::error::Error<Rule>) -> CompileError {
    let offset = match error.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    CompileError::Syntax {
        offset,
        message: error.variant.message().into_owned(),
    }
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, offset: usize) -> Result<Pair<'i, Rule>, CompileError> {
    pairs.next().ok_or_else(|| CompileError::Syntax {
        offset,
        message: "incomplete expression".to_string(),
    })
}

type Build = fn(Pair<Rule>, &Scope) -> Result<ASTNode, CompileError>;

impl ExpressionParser {
    /// Parses a `;`-separated list of expressions, one tree per component.
    pub fn parse_function_list(input: &str, scope: &Scope) -> Result<Vec<ASTNode>, CompileError> {
        debug!("Parsing function expression: {}", input);
        let list = ExpressionParser::parse(Rule::function_list, input)
            .map_err(syntax_error)?
            .next()
            .ok_or_else(|| CompileError::Syntax {
                offset: 0,
                message: "empty expression".to_string(),
            })?;

        list.into_inner()
            .filter(|pair| pair.as_rule() == Rule::expression)
            .map(|pair| Self::build_expression(pair, scope))
            .collect()
    }

    /// Parses a single expression; a `;` list is rejected.
    pub fn parse_expression(input: &str, scope: &Scope) -> Result<ASTNode, CompileError> {
        let mut components = Self::parse_function_list(input, scope)?;
        if components.len() != 1 {
            return Err(CompileError::ComponentCount {
                expected: 1,
                found: components.len(),
            });
        }
        Ok(components.remove(0))
    }

    fn build_expression(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        let offset = pair.as_span().start();
        let mut pairs = pair.into_inner();
        Self::build_or_expression(next_pair(&mut pairs, offset)?, scope)
    }

    fn build_or_expression(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        Self::build_chain(pair, scope, Self::build_and_expression)
    }

    fn build_and_expression(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        Self::build_chain(pair, scope, Self::build_equality_expression)
    }

    fn build_equality_expression(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        Self::build_chain(pair, scope, Self::build_relational_expression)
    }

    fn build_relational_expression(
        pair: Pair<Rule>,
        scope: &Scope,
    ) -> Result<ASTNode, CompileError> {
        Self::build_chain(pair, scope, Self::build_additive_expression)
    }

    fn build_additive_expression(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        Self::build_chain(pair, scope, Self::build_term)
    }

    fn build_term(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        Self::build_chain(pair, scope, Self::build_factor)
    }

    /// Left-associative `operand (operator operand)*`.
    fn build_chain(pair: Pair<Rule>, scope: &Scope, operand: Build) -> Result<ASTNode, CompileError> {
        let offset = pair.as_span().start();
        let mut pairs = pair.into_inner();
        let mut node = operand(next_pair(&mut pairs, offset)?, scope)?;

        while let Some(operator_pair) = pairs.next() {
            let operator_offset = operator_pair.as_span().start();
            let right = operand(next_pair(&mut pairs, operator_offset)?, scope)?;
            let text = operator_pair.as_str();
            trace!("Operator {:?} at {}", text, operator_offset);

            node = match operator_pair.as_rule() {
                Rule::OR | Rule::AND => ASTNode::LogicalOperation {
                    left: Box::new(node),
                    operator: LogicalOperator::try_from(text).map_err(|message| {
                        CompileError::Syntax {
                            offset: operator_offset,
                            message,
                        }
                    })?,
                    right: Box::new(right),
                },
                _ => ASTNode::BinaryOperation {
                    left: Box::new(node),
                    operator: Operator::try_from(text).map_err(|message| CompileError::Syntax {
                        offset: operator_offset,
                        message,
                    })?,
                    right: Box::new(right),
                },
            };
        }

        Ok(node)
    }

    fn build_factor(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        let offset = pair.as_span().start();
        let mut signs = Vec::new();
        let mut primary = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::PLUS | Rule::MINUS => signs.push(inner.as_rule()),
                _ => primary = Some(inner),
            }
        }

        let primary = primary.ok_or_else(|| CompileError::Syntax {
            offset,
            message: "expected an operand".to_string(),
        })?;
        let mut node = Self::build_primary_expression(primary, scope)?;
        for sign in signs.into_iter().rev() {
            if sign == Rule::MINUS {
                node = ASTNode::Negate(Box::new(node));
            }
        }
        Ok(node)
    }

    fn build_primary_expression(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        let offset = pair.as_span().start();
        match pair.as_rule() {
            Rule::number => pair
                .as_str()
                .parse::<f64>()
                .map(ASTNode::Number)
                .map_err(|e| CompileError::Syntax {
                    offset,
                    message: format!("invalid number `{}`: {}", pair.as_str(), e),
                }),
            Rule::identifier => scope.resolve(pair.as_str(), offset),
            Rule::group => {
                let mut inner = pair.into_inner();
                Self::build_expression(next_pair(&mut inner, offset)?, scope)
            }
            Rule::conditional => {
                let mut inner = pair.into_inner();
                let condition = Self::build_expression(next_pair(&mut inner, offset)?, scope)?;
                let then = Self::build_expression(next_pair(&mut inner, offset)?, scope)?;
                let otherwise = Self::build_expression(next_pair(&mut inner, offset)?, scope)?;
                Ok(ASTNode::Conditional {
                    condition: Box::new(condition),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                })
            }
            Rule::function_call => Self::build_function_call(pair, scope),
            rule => Err(CompileError::Syntax {
                offset,
                message: format!("unexpected {:?} in primary expression", rule),
            }),
        }
    }

    fn build_function_call(pair: Pair<Rule>, scope: &Scope) -> Result<ASTNode, CompileError> {
        let offset = pair.as_span().start();
        let mut inner = pair.into_inner();
        let name = next_pair(&mut inner, offset)?.as_str();
        let builtin = functions::lookup(name).ok_or_else(|| CompileError::UnboundIdentifier {
            name: name.to_string(),
            offset,
        })?;

        let args = inner
            .map(|arg| Self::build_expression(arg, scope))
            .collect::<Result<Vec<_>, _>>()?;
        if args.len() != builtin.arity {
            return Err(CompileError::ArgumentCount {
                name: name.to_string(),
                offset,
                expected: builtin.arity,
                found: args.len(),
            });
        }

        Ok(ASTNode::FunctionCall { builtin, args })
    }
}
