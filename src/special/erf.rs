//! Error-function family beyond what `libm` provides.

use std::f64::consts::PI;

const FRAC_2_SQRT_PI: f64 = std::f64::consts::FRAC_2_SQRT_PI;

/// Above this point erfcx switches from `exp(x²)·erfc(x)` to the continued
/// fraction. Must match `HARP_ERFCX_CF_START` in `assets/c/erfcx.h`.
pub const ERFCX_CF_START: f64 = 12.0;
const ERFCX_CF_TERMS: u32 = 40;

/// Scaled complementary error function `exp(x²)·erfc(x)`.
pub fn erfcx(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < ERFCX_CF_START {
        return (x * x).exp() * libm::erfc(x);
    }
    if x.is_infinite() {
        return 0.0;
    }
    // erfc(x) = exp(-x²)/√π · 1/(x + (1/2)/(x + 1/(x + (3/2)/(x + ...))))
    let mut t = x;
    for k in (1..=ERFCX_CF_TERMS).rev() {
        t = x + (k as f64 * 0.5) / t;
    }
    1.0 / (PI.sqrt() * t)
}

/// Single-precision-quality starting point for the inverse error function,
/// parameterised by `w = -ln((1 - y)(1 + y))`.
fn inverse_guess(w: f64, y: f64) -> f64 {
    let p = if w < 5.0 {
        let w = w - 2.5;
        let mut p = 2.810_226_36e-08;
        p = 3.432_739_39e-07 + p * w;
        p = -3.523_387_7e-06 + p * w;
        p = -4.391_506_54e-06 + p * w;
        p = 0.000_218_580_87 + p * w;
        p = -0.001_253_725_03 + p * w;
        p = -0.004_177_681_64 + p * w;
        p = 0.246_640_727 + p * w;
        1.501_409_41 + p * w
    } else {
        let w = w.sqrt() - 3.0;
        let mut p = -0.000_200_214_257;
        p = 0.000_100_950_558 + p * w;
        p = 0.001_349_343_22 + p * w;
        p = -0.003_673_428_44 + p * w;
        p = 0.005_739_507_73 + p * w;
        p = -0.007_622_461_3 + p * w;
        p = 0.009_438_870_47 + p * w;
        p = 1.001_674_06 + p * w;
        2.832_976_82 + p * w
    };
    p * y
}

/// Halley refinement of `f(x) = g(x) - target` where `g' = sign·(2/√π)·e^(-x²)`.
fn refine(mut x: f64, target: f64, g: fn(f64) -> f64, sign: f64) -> f64 {
    for _ in 0..8 {
        let deriv = sign * FRAC_2_SQRT_PI * (-x * x).exp();
        let u = (g(x) - target) / deriv;
        if !u.is_finite() {
            break;
        }
        // g'' = -2x·g'
        let step = u / (1.0 + x * u);
        x -= step;
        if step.abs() <= 1e-16 * x.abs().max(1e-300) {
            break;
        }
    }
    x
}

/// Inverse error function on [-1, 1].
pub fn erfinv(y: f64) -> f64 {
    if y.is_nan() || !(-1.0..=1.0).contains(&y) {
        return f64::NAN;
    }
    if y == 1.0 {
        return f64::INFINITY;
    }
    if y == -1.0 {
        return f64::NEG_INFINITY;
    }
    if y == 0.0 {
        return y;
    }
    let w = -((1.0 - y) * (1.0 + y)).ln();
    refine(inverse_guess(w, y), y, libm::erf, 1.0)
}

/// Inverse complementary error function on [0, 2].
pub fn erfcinv(y: f64) -> f64 {
    if y.is_nan() || !(0.0..=2.0).contains(&y) {
        return f64::NAN;
    }
    if y == 0.0 {
        return f64::INFINITY;
    }
    if y == 2.0 {
        return f64::NEG_INFINITY;
    }
    if y == 1.0 {
        return 0.0;
    }
    // (1 - s)(1 + s) with s = 1 - y, formed without cancellation for small y
    let w = -(y * (2.0 - y)).ln();
    refine(inverse_guess(w, 1.0 - y), y, libm::erfc, -1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(1.0, 0.427_583_576_155_807)]
    #[case(-1.0, 5.008_980_080_762_283)]
    #[case(5.0, 0.110_704_637_733_069)]
    fn test_erfcx_values(#[case] x: f64, #[case] expected: f64) {
        assert_relative_eq!(erfcx(x), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_erfcx_continuous_at_switch() {
        let below = (ERFCX_CF_START - 1e-9).powi(2).exp() * libm::erfc(ERFCX_CF_START - 1e-9);
        assert_relative_eq!(erfcx(ERFCX_CF_START), below, max_relative = 1e-9);
    }

    #[test]
    fn test_erfcx_large_argument() {
        // erfcx(x) ~ 1/(x√π) for large x
        let x = 1e6;
        assert_relative_eq!(erfcx(x), 1.0 / (x * PI.sqrt()), max_relative = 1e-10);
        assert_eq!(erfcx(f64::INFINITY), 0.0);
    }

    #[rstest]
    #[case(-0.999)]
    #[case(-0.5)]
    #[case(0.1)]
    #[case(0.7)]
    #[case(0.999_999)]
    fn test_erfinv_inverts_erf(#[case] y: f64) {
        assert_relative_eq!(libm::erf(erfinv(y)), y, max_relative = 1e-14);
    }

    #[rstest]
    #[case(1e-10)]
    #[case(0.01)]
    #[case(0.5)]
    #[case(1.5)]
    #[case(1.99)]
    fn test_erfcinv_inverts_erfc(#[case] y: f64) {
        assert_relative_eq!(libm::erfc(erfcinv(y)), y, max_relative = 1e-13);
    }

    #[test]
    fn test_inverse_edges() {
        assert_eq!(erfinv(1.0), f64::INFINITY);
        assert_eq!(erfinv(-1.0), f64::NEG_INFINITY);
        assert!(erfinv(1.5).is_nan());
        assert_eq!(erfcinv(0.0), f64::INFINITY);
        assert_eq!(erfcinv(2.0), f64::NEG_INFINITY);
        assert!(erfcinv(-0.1).is_nan());
        assert_eq!(erfcinv(1.0), 0.0);
    }

    #[test]
    fn test_erfinv_known_value() {
        assert_relative_eq!(erfinv(0.5), 0.476_936_276_204_469_9, max_relative = 1e-14);
    }
}
