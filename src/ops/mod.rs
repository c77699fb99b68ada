//! The operator catalog
//!
//! Constructors for every catalog operator, plus the helpers the family
//! modules share when building gradient rules and C statements.

pub(crate) mod activation;
pub(crate) mod bessel;
pub(crate) mod error_fn;
pub(crate) mod gamma;

use crate::dtype::DType;
use crate::error::{Result, ScalarOpError};
use crate::graph::Expr;
use crate::op::{OpKind, ScalarOp, Signature};

macro_rules! constructors {
    ($($(#[$doc:meta])* $fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub const fn $fn_name() -> ScalarOp {
                ScalarOp::new(OpKind::$kind)
            }
        )*
    };
}

constructors! {
    /// Gauss error function
    erf => Erf,
    erfc => Erfc,
    /// Scaled complementary error function exp(x²)·erfc(x)
    erfcx => Erfcx,
    erfinv => Erfinv,
    erfcinv => Erfcinv,
    gamma => Gamma,
    gammaln => GammaLn,
    /// Digamma
    psi => Psi,
    tri_gamma => TriGamma,
    /// Chi-square survival function of (x, k)
    chi2sf => Chi2Sf,
    /// Regularized lower incomplete gamma of (k, x)
    gammainc => GammaInc,
    gammaincc => GammaIncC,
    gammau => GammaU,
    gammal => GammaL,
    /// Bessel function of the first kind of (v, x)
    jv => Jv,
    j0 => J0,
    j1 => J1,
    /// Modified Bessel function of the first kind of (v, x)
    iv => Iv,
    i0 => I0,
    i1 => I1,
    sigmoid => Sigmoid,
    softplus => Softplus,
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Literal typed as the join of the operand and output-gradient types.
pub(crate) fn rule_const(value: f64, x: &Expr, gz: &Expr) -> Expr {
    Expr::constant(value, x.dtype().upcast(gz.dtype()))
}

pub(crate) fn c_type(op: ScalarOp, dtype: DType) -> Result<&'static str> {
    dtype.c_name().ok_or_else(|| {
        ScalarOpError::unsupported(op.name(), dtype, "type has no C spelling")
    })
}

/// Fails unless every operand is a float.
pub(crate) fn require_float(op: ScalarOp, sig: &Signature) -> Result<()> {
    match sig.inputs.iter().find(|t| !t.is_float()) {
        Some(t) => Err(ScalarOpError::unsupported(
            op.name(),
            *t,
            "only floating point is implemented",
        )),
        None => Ok(()),
    }
}

/// The float32 variant of a C routine is used for float32 results.
pub(crate) fn single_precision(sig: &Signature) -> bool {
    sig.output == DType::F32
}

pub(crate) fn not_emitted(op: ScalarOp, sig: &Signature) -> ScalarOpError {
    ScalarOpError::NotImplementedEmission {
        op: op.name(),
        dtype: sig.output,
    }
}
