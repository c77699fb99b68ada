//! Numeric kernels used by operator evaluation.

mod bessel;
mod erf;
mod gamma;

pub use bessel::{bessel_i0, bessel_i1, bessel_iv, bessel_j0, bessel_j1, bessel_jv};
pub use erf::{ERFCX_CF_START, erfcinv, erfcx, erfinv};
pub use gamma::{chi2_sf, digamma, gamma_lower, gamma_upper, gammainc, gammaincc, trigamma};

/// Logistic function 1 / (1 + e^-x).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_f32(x: f32) -> f32 {
    1.0 / (1.0 + libm::expf(-x))
}

/// log(1 + e^x) with the Mächler (2012) region split.
pub fn softplus(x: f64) -> f64 {
    if x < -37.0 {
        x.exp()
    } else if x < 18.0 {
        x.exp().ln_1p()
    } else if x < 33.3 {
        x + (-x).exp()
    } else {
        x
    }
}

pub fn softplus_f32(x: f32) -> f32 {
    if x < -37.0 {
        libm::expf(x)
    } else if x < 18.0 {
        libm::log1pf(libm::expf(x))
    } else if x < 33.3 {
        x + libm::expf(-x)
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_softplus_regions() {
        assert_eq!(softplus(-800.0), 0.0);
        assert_eq!(softplus(-40.0), (-40.0f64).exp());
        assert_relative_eq!(softplus(0.0), std::f64::consts::LN_2);
        assert_eq!(softplus(25.0), 25.0 + (-25.0f64).exp());
        assert_eq!(softplus(40.0), 40.0);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for x in [-30.0, -2.5, 0.0, 0.3, 7.0] {
            assert_relative_eq!(sigmoid(x) + sigmoid(-x), 1.0, epsilon = 1e-15);
        }
        assert_eq!(sigmoid_f32(0.0), 0.5);
    }
}
