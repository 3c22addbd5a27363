//! Typed views over the raw text of a parameter.

/// A type a parameter's text can be coerced into.
pub trait ParameterValue: Sized {
    /// Describes the type in error messages, e.g. "a real number".
    fn expected() -> String;

    fn from_text(text: &str) -> Option<Self>;
}

/// Splits a comma-separated list, trimming each element. Blank text is an
/// empty list; an empty element between commas is kept.
pub fn split_list(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::trim).collect()
}

impl ParameterValue for String {
    fn expected() -> String {
        "a string".to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

impl ParameterValue for f64 {
    fn expected() -> String {
        "a real number".to_string()
    }

    /// Decimal or scientific notation only; `nan` and `inf` are not numbers here.
    fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        let numeric = text.bytes().any(|b| b.is_ascii_digit())
            && text
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
        if !numeric {
            return None;
        }
        text.parse().ok()
    }
}

impl ParameterValue for i64 {
    fn expected() -> String {
        "an integer".to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ParameterValue for usize {
    fn expected() -> String {
        "a non-negative integer".to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ParameterValue for bool {
    fn expected() -> String {
        "a boolean (true, false, yes or no)".to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("no") {
            Some(false)
        } else {
            None
        }
    }
}

impl<T: ParameterValue> ParameterValue for Vec<T> {
    fn expected() -> String {
        format!("a comma-separated list of {}", T::expected())
    }

    fn from_text(text: &str) -> Option<Self> {
        split_list(text).into_iter().map(T::from_text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(""), Vec::<&str>::new());
        assert_eq!(split_list("   "), Vec::<&str>::new());
        assert_eq!(split_list("a"), vec!["a"]);
        assert_eq!(split_list(" left , right,bottom "), vec!["left", "right", "bottom"]);
        assert_eq!(split_list("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_reals_accept_scientific_notation() {
        assert_eq!(f64::from_text("1e-6"), Some(1e-6));
        assert_eq!(f64::from_text(" 660e3 "), Some(660e3));
        assert_eq!(f64::from_text("-0.20"), Some(-0.2));
        assert_eq!(f64::from_text("1.5E+2"), Some(150.0));
        assert_eq!(f64::from_text("fast"), None);
        assert_eq!(f64::from_text(""), None);
        assert_eq!(f64::from_text("nan"), None);
        assert_eq!(f64::from_text("NaN"), None);
        assert_eq!(f64::from_text("inf"), None);
        assert_eq!(f64::from_text("-infinity"), None);
        assert_eq!(f64::from_text("1e"), None);
        assert_eq!(f64::from_text(".5"), Some(0.5));
    }

    #[test]
    fn test_integers() {
        assert_eq!(i64::from_text("42"), Some(42));
        assert_eq!(i64::from_text("-3"), Some(-3));
        assert_eq!(i64::from_text("4.0"), None);
        assert_eq!(usize::from_text("-3"), None);
        assert_eq!(usize::from_text("7"), Some(7));
    }

    #[test]
    fn test_booleans_use_a_fixed_token_set() {
        assert_eq!(bool::from_text("true"), Some(true));
        assert_eq!(bool::from_text("Yes"), Some(true));
        assert_eq!(bool::from_text("FALSE"), Some(false));
        assert_eq!(bool::from_text("no"), Some(false));
        assert_eq!(bool::from_text("1"), None);
        assert_eq!(bool::from_text("0"), None);
        assert_eq!(bool::from_text("on"), None);
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            Vec::<f64>::from_text("1, 2.5, 3e2"),
            Some(vec![1.0, 2.5, 300.0])
        );
        assert_eq!(Vec::<f64>::from_text(""), Some(vec![]));
        assert_eq!(Vec::<f64>::from_text("1, two"), None);
        assert_eq!(
            Vec::<String>::from_text("left, right"),
            Some(vec!["left".to_string(), "right".to_string()])
        );
        assert_eq!(
            Vec::<bool>::expected(),
            "a comma-separated list of a boolean (true, false, yes or no)"
        );
    }
}
