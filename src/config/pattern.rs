//! Validators for parameter text, with descriptions in the bracketed style
//! parameter files use to document entries (`[Integer range 0...10 (inclusive)]`).

use std::fmt;

use crate::config::value::{split_list, ParameterValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Anything,
    Bool,
    Integer { min: i64, max: i64 },
    Double { min: f64, max: f64 },
    Selection(Vec<String>),
    List {
        element: Box<Pattern>,
        min_len: usize,
        max_len: usize,
    },
}

impl Pattern {
    pub fn integer() -> Self {
        Pattern::Integer {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    pub fn integer_range(min: i64, max: i64) -> Self {
        Pattern::Integer { min, max }
    }

    pub fn double() -> Self {
        Pattern::Double {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    pub fn double_range(min: f64, max: f64) -> Self {
        Pattern::Double { min, max }
    }

    /// Options separated by `|`, e.g. `"box|sphere|chunk"`.
    pub fn selection(options: &str) -> Self {
        Pattern::Selection(options.split('|').map(|o| o.trim().to_string()).collect())
    }

    pub fn list(element: Pattern) -> Self {
        Pattern::List {
            element: Box::new(element),
            min_len: 0,
            max_len: usize::MAX,
        }
    }

    pub fn list_of_length(element: Pattern, min_len: usize, max_len: usize) -> Self {
        Pattern::List {
            element: Box::new(element),
            min_len,
            max_len,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        match self {
            Pattern::Anything => true,
            Pattern::Bool => bool::from_text(text).is_some(),
            Pattern::Integer { min, max } => {
                i64::from_text(text).is_some_and(|value| (*min..=*max).contains(&value))
            }
            Pattern::Double { min, max } => {
                f64::from_text(text).is_some_and(|value| (*min..=*max).contains(&value))
            }
            Pattern::Selection(options) => options.iter().any(|option| option == text),
            Pattern::List {
                element,
                min_len,
                max_len,
            } => {
                let items = split_list(text);
                (*min_len..=*max_len).contains(&items.len())
                    && items.iter().all(|item| element.matches(item))
            }
        }
    }

    pub fn description(&self) -> String {
        match self {
            Pattern::Anything => "[Anything]".to_string(),
            Pattern::Bool => "[Bool]".to_string(),
            Pattern::Integer { min, max } if *min == i64::MIN && *max == i64::MAX => {
                "[Integer]".to_string()
            }
            Pattern::Integer { min, max } => {
                format!("[Integer range {}...{} (inclusive)]", min, max)
            }
            Pattern::Double { min, max } if *min == f64::MIN && *max == f64::MAX => {
                "[Double]".to_string()
            }
            Pattern::Double { min, max } => {
                format!("[Double {}...{} (inclusive)]", min, max)
            }
            Pattern::Selection(options) => format!("[Selection {} ]", options.join("|")),
            Pattern::List {
                element,
                min_len,
                max_len,
            } => format!(
                "[List of <{}> of length {}...{} (inclusive)]",
                element.description(),
                min_len,
                max_len
            ),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
