//! Built-in functions callable from expressions, e.g. `sin(x)` or `pow(x, 2)`.

use std::fmt;

pub mod math;

/// Largest arity among the built-ins; calls evaluate their arguments on the stack.
pub const MAX_ARITY: usize = 2;

/// A fixed-arity function over reals. Declared with
/// [`builtin_fn`](paramfile_macros::builtin_fn).
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub call: fn(&[f64]) -> f64,
}

impl Builtin {
    /// Calls the function. `args` must hold exactly `arity` values.
    #[inline]
    pub fn apply(&self, args: &[f64]) -> f64 {
        debug_assert_eq!(args.len(), self.arity);
        (self.call)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({}/{})", self.name, self.arity)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

/// Looks up a built-in function by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    math::BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Names available as predefined constants in every expression.
pub fn predefined_constant(name: &str) -> Option<f64> {
    match name {
        "pi" | "Pi" => Some(std::f64::consts::PI),
        _ => None,
    }
}
