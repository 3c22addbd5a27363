use super::Builtin;
use paramfile_macros::builtin_fn;

pub static BUILTINS: &[Builtin] = &[
    SIN, COS, TAN, ASIN, ACOS, ATAN, ATAN2, SINH, COSH, TANH, EXP, LN, LOG, LOG10, LOG2, SQRT,
    ABS, SIGN, FLOOR, CEIL, RINT, POW, FMOD, MIN, MAX,
];

#[builtin_fn]
fn sin(x: f64) -> f64 {
    x.sin()
}

#[builtin_fn]
fn cos(x: f64) -> f64 {
    x.cos()
}

#[builtin_fn]
fn tan(x: f64) -> f64 {
    x.tan()
}

#[builtin_fn]
fn asin(x: f64) -> f64 {
    x.asin()
}

#[builtin_fn]
fn acos(x: f64) -> f64 {
    x.acos()
}

#[builtin_fn]
fn atan(x: f64) -> f64 {
    x.atan()
}

#[builtin_fn]
fn atan2(y: f64, x: f64) -> f64 {
    y.atan2(x)
}

#[builtin_fn]
fn sinh(x: f64) -> f64 {
    x.sinh()
}

#[builtin_fn]
fn cosh(x: f64) -> f64 {
    x.cosh()
}

#[builtin_fn]
fn tanh(x: f64) -> f64 {
    x.tanh()
}

#[builtin_fn]
fn exp(x: f64) -> f64 {
    x.exp()
}

#[builtin_fn]
fn ln(x: f64) -> f64 {
    x.ln()
}

// Natural logarithm, same as `ln`.
#[builtin_fn]
fn log(x: f64) -> f64 {
    x.ln()
}

#[builtin_fn]
fn log10(x: f64) -> f64 {
    x.log10()
}

#[builtin_fn]
fn log2(x: f64) -> f64 {
    x.log2()
}

#[builtin_fn]
fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

#[builtin_fn]
fn abs(x: f64) -> f64 {
    x.abs()
}

// 0 for 0, unlike f64::signum.
#[builtin_fn]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[builtin_fn]
fn floor(x: f64) -> f64 {
    x.floor()
}

#[builtin_fn]
fn ceil(x: f64) -> f64 {
    x.ceil()
}

#[builtin_fn]
fn rint(x: f64) -> f64 {
    x.round_ties_even()
}

#[builtin_fn]
fn pow(base: f64, exponent: f64) -> f64 {
    base.powf(exponent)
}

#[builtin_fn]
fn fmod(x: f64, y: f64) -> f64 {
    x % y
}

#[builtin_fn]
fn min(a: f64, b: f64) -> f64 {
    a.min(b)
}

#[builtin_fn]
fn max(a: f64, b: f64) -> f64 {
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_of_zero() {
        assert_eq!(SIGN.apply(&[0.0]), 0.0);
        assert_eq!(SIGN.apply(&[-3.0]), -1.0);
        assert_eq!(SIGN.apply(&[7.0]), 1.0);
    }

    #[test]
    fn test_rint_rounds_half_to_even() {
        assert_eq!(RINT.apply(&[2.5]), 2.0);
        assert_eq!(RINT.apply(&[3.5]), 4.0);
    }

    #[test]
    fn test_two_argument_functions() {
        assert_eq!(ATAN2.arity, 2);
        assert_eq!(ATAN2.apply(&[1.0, 0.0]), std::f64::consts::FRAC_PI_2);
        assert_eq!(FMOD.apply(&[7.0, 3.0]), 1.0);
        assert_eq!(MIN.apply(&[7.0, 3.0]), 3.0);
        assert_eq!(MAX.apply(&[7.0, 3.0]), 7.0);
    }

    #[test]
    fn test_log_is_natural() {
        assert!((LOG.apply(&[std::f64::consts::E]) - 1.0).abs() < 1e-15);
        assert_eq!(LOG.apply(&[1.0]), LN.apply(&[1.0]));
        assert!((LOG10.apply(&[1000.0]) - 3.0).abs() < 1e-12);
        assert_eq!(LOG2.apply(&[8.0]), 3.0);
    }
}
