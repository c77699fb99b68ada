//! Bessel functions of real order.
//!
//! Integer orders of J go through `libm::jn`. Non-integer orders use the power
//! series for small arguments and Miller's backward recurrence, normalised by
//! the Neumann sum, for moderate ones. Large arguments use Hankel's
//! asymptotic expansion.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Largest argument for which the J power series is used. The series
/// cancels badly beyond this point (its terms grow like I_v(x)).
const J_SERIES_LIMIT: f64 = 5.0;
/// Hankel's expansion is used for `x > max(HANKEL_START, v²)`.
const HANKEL_START: f64 = 25.0;
const HANKEL_MAX_TERMS: usize = 200;
/// Miller's recurrence is not started above this index; larger problems give NaN.
const MILLER_MAX_START: usize = 1 << 16;
const SERIES_MAX_TERMS: usize = 5000;
const SERIES_EPS: f64 = 1e-17;
const RESCALE: f64 = 1e250;

fn is_integer(v: f64) -> bool {
    v == v.floor() && v.abs() < i32::MAX as f64
}

/// `Σ_m s^m (x/2)^(2m+v) / (m! Γ(m+v+1))` with `s = -1` for J and `s = 1` for I.
fn power_series(v: f64, x: f64, alternating: bool) -> f64 {
    let half = 0.5 * x;
    let (lg, sign) = libm::lgamma_r(v + 1.0);
    let mut term = sign as f64 * (v * half.ln() - lg).exp();
    let q = if alternating { -half * half } else { half * half };
    let mut sum = term;
    for m in 1..SERIES_MAX_TERMS {
        let m = m as f64;
        term *= q / (m * (m + v));
        sum += term;
        if term.abs() <= SERIES_EPS * sum.abs() && m > half {
            break;
        }
    }
    sum
}

/// J_v(x) ≈ √(2/(πx))·(P cos ω - Q sin ω), ω = x - vπ/2 - π/4.
fn jv_hankel(v: f64, x: f64) -> f64 {
    let mu = 4.0 * v * v;
    let mut p = 1.0;
    let mut q = 0.0;
    let mut term = 1.0;
    let mut prev = f64::INFINITY;
    for k in 1..HANKEL_MAX_TERMS {
        let odd = (2 * k - 1) as f64;
        term *= (mu - odd * odd) / (8.0 * k as f64 * x);
        // asymptotic series: stop once the terms start growing
        if term.abs() >= prev {
            break;
        }
        prev = term.abs();
        match k % 4 {
            1 => q += term,
            2 => p -= term,
            3 => q -= term,
            _ => p += term,
        }
        if term == 0.0 || term.abs() <= f64::EPSILON * p.abs().max(q.abs()) {
            break;
        }
    }
    // cos/sin of ω expanded so that x is reduced exactly by libm
    let phase = v * FRAC_PI_2 + FRAC_PI_4;
    let (sx, cx) = x.sin_cos();
    let (sp, cp) = phase.sin_cos();
    let cos_w = cx * cp + sx * sp;
    let sin_w = sx * cp - cx * sp;
    (2.0 / (PI * x)).sqrt() * (p * cos_w - q * sin_w)
}

/// J_v(x) for non-integer `v` and `x > J_SERIES_LIMIT` via Miller's algorithm.
fn jv_miller(v: f64, x: f64) -> f64 {
    let n = v.floor();
    let mu = v - n;
    let start = (n.max(x) + 12.0 * x.cbrt() + 20.0).ceil();
    if start > MILLER_MAX_START as f64 || -n > MILLER_MAX_START as f64 {
        return f64::NAN;
    }
    let start = start as usize;

    // (x/2)^mu = Σ_k (mu + 2k) Γ(mu + k) / k! · J_{mu+2k}(x)
    let kmax = start / 2;
    let gamma_mu1 = libm::tgamma(mu + 1.0);
    let mut coeff = Vec::with_capacity(kmax + 1);
    coeff.push(gamma_mu1);
    let mut g = gamma_mu1;
    for k in 1..=kmax {
        let k = k as f64;
        if k > 1.0 {
            g *= (mu + k - 1.0) / k;
        }
        coeff.push((mu + 2.0 * k) * g);
    }

    let target_idx = if n >= 0.0 { Some(n as usize) } else { None };
    let mut above = 0.0;
    let mut cur = 1e-30;
    let mut sum = 0.0;
    let mut target = 0.0;
    let mut idx = start;
    loop {
        if idx % 2 == 0 {
            sum += coeff[idx / 2] * cur;
        }
        if target_idx == Some(idx) {
            target = cur;
        }
        if idx == 0 {
            break;
        }
        let below = 2.0 * (mu + idx as f64) / x * cur - above;
        above = cur;
        cur = below;
        idx -= 1;
        if cur.abs() > RESCALE {
            cur /= RESCALE;
            above /= RESCALE;
            sum /= RESCALE;
            target /= RESCALE;
        }
    }

    let scale = (0.5 * x).powf(mu) / sum;
    if target_idx.is_some() {
        return target * scale;
    }

    // negative orders: J_{nu-1} = (2nu/x) J_nu - J_{nu+1}
    let mut cur = cur * scale;
    let mut above = above * scale;
    for k in 0..(-n as usize) {
        let below = 2.0 * (mu - k as f64) / x * cur - above;
        above = cur;
        cur = below;
    }
    cur
}

/// Bessel function of the first kind of real order, J_v(x).
pub fn bessel_jv(v: f64, x: f64) -> f64 {
    if v.is_nan() || x.is_nan() {
        return f64::NAN;
    }
    if is_integer(v) {
        return libm::jn(v as i32, x);
    }
    if x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return if v > 0.0 { 0.0 } else { f64::INFINITY };
    }
    if x.is_infinite() {
        return 0.0;
    }
    if x <= J_SERIES_LIMIT {
        power_series(v, x, true)
    } else if x > HANKEL_START.max(v * v) {
        jv_hankel(v, x)
    } else {
        jv_miller(v, x)
    }
}

/// Modified Bessel function of the first kind of real order, I_v(x).
pub fn bessel_iv(v: f64, x: f64) -> f64 {
    if v.is_nan() || x.is_nan() {
        return f64::NAN;
    }
    if is_integer(v) {
        // I_{-n} = I_n, I_n(-x) = (-1)^n I_n(x)
        let n = v.abs();
        if x < 0.0 {
            let r = bessel_iv(n, -x);
            return if n % 2.0 == 1.0 { -r } else { r };
        }
        if x == 0.0 {
            return if n == 0.0 { 1.0 } else { 0.0 };
        }
        if x.is_infinite() {
            return f64::INFINITY;
        }
        return power_series(n, x, false);
    }
    if x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return if v > 0.0 { 0.0 } else { f64::INFINITY };
    }
    if x.is_infinite() {
        return f64::INFINITY;
    }
    power_series(v, x, false)
}

pub fn bessel_j0(x: f64) -> f64 {
    libm::j0(x)
}

pub fn bessel_j1(x: f64) -> f64 {
    libm::j1(x)
}

pub fn bessel_i0(x: f64) -> f64 {
    bessel_iv(0.0, x)
}

pub fn bessel_i1(x: f64) -> f64 {
    bessel_iv(1.0, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rstest::rstest;

    /// J_{1/2}(x) = sqrt(2/(πx)) sin x
    fn j_half(x: f64) -> f64 {
        (2.0 / (PI * x)).sqrt() * x.sin()
    }

    /// J_{-1/2}(x) = sqrt(2/(πx)) cos x
    fn j_minus_half(x: f64) -> f64 {
        (2.0 / (PI * x)).sqrt() * x.cos()
    }

    #[rstest]
    #[case(0.3)]
    #[case(2.0)]
    #[case(4.5)]
    #[case(5.5)]
    #[case(11.5)]
    #[case(40.0)]
    #[case(80.0)]
    fn test_jv_half_order(#[case] x: f64) {
        assert_abs_diff_eq!(bessel_jv(0.5, x), j_half(x), epsilon = 1e-12);
        assert_abs_diff_eq!(bessel_jv(-0.5, x), j_minus_half(x), epsilon = 1e-12);
    }

    #[rstest]
    #[case(1.5, 3.0)]
    #[case(1.5, 30.0)]
    #[case(-1.5, 5.0)]
    #[case(-1.5, 25.0)]
    fn test_jv_three_halves(#[case] v: f64, #[case] x: f64) {
        // J_{±3/2} from the recurrence on J_{±1/2}
        let expected = if v > 0.0 {
            j_half(x) / x - j_minus_half(x)
        } else {
            -j_minus_half(x) / x - j_half(x)
        };
        assert_abs_diff_eq!(bessel_jv(v, x), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_jv_integer_order_matches_libm() {
        for x in [0.5, 3.0, 17.0] {
            assert_eq!(bessel_jv(2.0, x), libm::jn(2, x));
            assert_eq!(bessel_jv(0.0, x), libm::j0(x));
        }
    }

    #[test]
    fn test_jv_series_and_miller_agree() {
        let v = 2.3;
        let below = bessel_jv(v, J_SERIES_LIMIT);
        let above = jv_miller(v, J_SERIES_LIMIT);
        assert_abs_diff_eq!(below, above, epsilon = 1e-12);
    }

    #[rstest]
    #[case(2.3, 30.0)]
    #[case(-0.7, 60.0)]
    #[case(5.5, 41.0)]
    fn test_jv_hankel_and_miller_agree(#[case] v: f64, #[case] x: f64) {
        assert_abs_diff_eq!(jv_hankel(v, x), jv_miller(v, x), epsilon = 1e-13);
    }

    #[rstest]
    #[case(1e8)]
    #[case(1e13)]
    #[case(1e300)]
    fn test_jv_huge_argument(#[case] x: f64) {
        let amplitude = (2.0 / (PI * x)).sqrt();
        assert_abs_diff_eq!(bessel_jv(0.5, x), amplitude * x.sin(), epsilon = 1e-12 * amplitude);
        assert_abs_diff_eq!(bessel_jv(-0.5, x), amplitude * x.cos(), epsilon = 1e-12 * amplitude);
    }

    #[test]
    fn test_jv_miller_refuses_oversized_recurrence() {
        assert!(jv_miller(1e6 + 0.5, 1e7).is_nan());
        assert!(bessel_jv(1e6 + 0.5, 1e7).is_nan());
        assert!(bessel_jv(-1e6 - 0.5, 1e7).is_nan());
    }

    #[test]
    fn test_jv_domain() {
        assert!(bessel_jv(0.5, -1.0).is_nan());
        assert_eq!(bessel_jv(0.5, 0.0), 0.0);
        assert_eq!(bessel_jv(-0.5, 0.0), f64::INFINITY);
        assert_eq!(bessel_jv(1.0, -2.0), -bessel_jv(1.0, 2.0));
    }

    #[rstest]
    #[case(0.5, 0.0, 1.0)]
    #[case(1.0, 1.266_065_877_752_008_4, 0.565_159_103_992_485_1)]
    #[case(2.0, 2.279_585_302_336_067, 1.590_636_854_637_329)]
    fn test_i0_i1(#[case] x: f64, #[case] i0: f64, #[case] i1: f64) {
        if x == 0.5 {
            // I_{1/2}(x) = sqrt(2/(πx)) sinh x
            assert_relative_eq!(
                bessel_iv(0.5, x),
                (2.0 / (PI * x)).sqrt() * x.sinh(),
                max_relative = 1e-14
            );
            return;
        }
        assert_relative_eq!(bessel_i0(x), i0, max_relative = 1e-14);
        assert_relative_eq!(bessel_i1(x), i1, max_relative = 1e-14);
    }

    #[test]
    fn test_iv_parity() {
        assert_eq!(bessel_iv(1.0, -2.0), -bessel_iv(1.0, 2.0));
        assert_eq!(bessel_iv(2.0, -2.0), bessel_iv(2.0, 2.0));
        assert_eq!(bessel_iv(-3.0, 1.5), bessel_iv(3.0, 1.5));
        assert!(bessel_iv(0.5, -1.0).is_nan());
        assert_eq!(bessel_i0(0.0), 1.0);
        assert_eq!(bessel_i1(0.0), 0.0);
    }

    #[test]
    fn test_iv_large_argument() {
        // I_v(x) ~ e^x / sqrt(2πx) · (1 - (4v² - 1)/(8x))
        let x: f64 = 60.0;
        let asymptotic = x.exp() / (2.0 * PI * x).sqrt() * (1.0 + 1.0 / (8.0 * x));
        assert_relative_eq!(bessel_i0(x), asymptotic, max_relative = 1e-4);
    }
}
