use crate::config::{normalize_name, ConfigTree, Leaf, Section};
use crate::error::ConfigError;
use log::{debug, trace};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./parameters.pest"]
pub struct ParameterParser;

/// One or more physical lines joined by trailing backslashes.
#[derive(Debug, PartialEq)]
struct LogicalLine {
    number: usize,
    text: String,
}

#[derive(Debug, PartialEq)]
enum Statement {
    Set { key: String, value: String },
    Subsection(String),
    End,
}

struct OpenSection {
    name: String,
    line: usize,
    section: Section,
}

fn logical_lines(input: &str) -> Result<Vec<LogicalLine>, ConfigError> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (i, raw) in input.lines().enumerate() {
        let trimmed = raw.trim();
        let (text, continues) = match trimmed.strip_suffix('\\') {
            Some(text) => (text, true),
            None => (trimmed, false),
        };

        let line = match pending.take() {
            Some(mut line) => {
                line.text.push_str(text);
                line
            }
            None => LogicalLine {
                number: i + 1,
                text: text.to_string(),
            },
        };

        if continues {
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }

    if let Some(line) = pending {
        return Err(ConfigError::Syntax {
            line: line.number,
            message: "input ends inside a line continuation".to_string(),
        });
    }
    Ok(lines)
}

/// Drops everything from the first `#` not preceded by a backslash, then
/// unescapes `\#`.
fn strip_comment(text: &str) -> String {
    let bytes = text.as_bytes();
    let end = (0..bytes.len())
        .find(|&i| bytes[i] == b'#' && (i == 0 || bytes[i - 1] != b'\\'))
        .unwrap_or(bytes.len());
    text[..end].replace("\\#", "#")
}

fn parse_statement(text: &str, line: usize) -> Result<Statement, ConfigError> {
    let syntax_error = |message: String| ConfigError::Syntax { line, message };

    let pair = ParameterParser::parse(Rule::statement, text)
        .map_err(|e| syntax_error(format!("cannot parse `{}`: {}", text, e.variant.message())))?
        .next()
        .and_then(|statement| statement.into_inner().next())
        .ok_or_else(|| syntax_error(format!("cannot parse `{}`", text)))?;

    match pair.as_rule() {
        Rule::set_statement => {
            let mut inner = pair.into_inner();
            let key = inner
                .next()
                .map(|key| normalize_name(&key.as_str().replace("\\=", "=")))
                .unwrap_or_default();
            let value = inner
                .next()
                .map(|value| value.as_str().trim().to_string())
                .unwrap_or_default();
            if key.is_empty() {
                return Err(syntax_error(format!("missing parameter name in `{}`", text)));
            }
            Ok(Statement::Set { key, value })
        }
        Rule::subsection_statement => {
            let name = pair
                .into_inner()
                .next()
                .map(|name| normalize_name(name.as_str()))
                .unwrap_or_default();
            if name.is_empty() {
                return Err(syntax_error(format!("missing subsection name in `{}`", text)));
            }
            Ok(Statement::Subsection(name))
        }
        Rule::end_statement => Ok(Statement::End),
        rule => Err(syntax_error(format!("unexpected {:?} in `{}`", rule, text))),
    }
}

impl ParameterParser {
    /// Parses parameter-file text into a tree.
    pub fn parse_parameters(input: &str) -> Result<ConfigTree, ConfigError> {
        debug!("Parsing parameters ({} bytes)", input.len());
        let mut root = Section::default();
        let mut open: Vec<OpenSection> = Vec::new();

        let scope_names = |open: &[OpenSection]| -> Vec<String> {
            open.iter().map(|o| o.name.clone()).collect()
        };

        for line in logical_lines(input)? {
            let text = strip_comment(&line.text);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            trace!("line {}: {}", line.number, text);

            let statement = parse_statement(text, line.number)?;
            let current = match open.last_mut() {
                Some(top) => &mut top.section,
                None => &mut root,
            };

            match statement {
                Statement::Set { key, value } => {
                    current
                        .insert_leaf(&key, Leaf::new(value, line.number))
                        .map_err(|message| ConfigError::Structural {
                            line: line.number,
                            message,
                            scope: scope_names(&open),
                        })?;
                }
                Statement::Subsection(name) => {
                    let section = current.open(&name).map_err(|message| {
                        ConfigError::Structural {
                            line: line.number,
                            message,
                            scope: scope_names(&open),
                        }
                    })?;
                    open.push(OpenSection {
                        name,
                        line: line.number,
                        section,
                    });
                }
                Statement::End => {
                    let closed = open.pop().ok_or_else(|| ConfigError::Structural {
                        line: line.number,
                        message: "`end` without a matching `subsection`".to_string(),
                        scope: Vec::new(),
                    })?;
                    let parent = match open.last_mut() {
                        Some(top) => &mut top.section,
                        None => &mut root,
                    };
                    parent.restore(&closed.name, closed.section);
                }
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(ConfigError::Structural {
                line: unclosed.line,
                message: format!("subsection `{}` is never closed by `end`", unclosed.name),
                scope: scope_names(&open),
            });
        }

        debug!("Parsed {} top-level entries", root.len());
        Ok(ConfigTree::from_root(root))
    }
}
