//! gamma, gammaln, psi, tri_gamma and the incomplete gamma family

use super::{c_type, not_emitted, require_float, single_precision};
use crate::error::Result;
use crate::graph::Expr;
use crate::op::{Gradient, OpKind, ScalarOp, Signature};
use crate::ops;
use crate::special;

pub(crate) fn evaluate(kind: OpKind, args: &[f64]) -> f64 {
    match kind {
        OpKind::Gamma => libm::tgamma(args[0]),
        OpKind::GammaLn => libm::lgamma(args[0]),
        OpKind::Psi => special::digamma(args[0]),
        OpKind::TriGamma => special::trigamma(args[0]),
        // (x, k)
        OpKind::Chi2Sf => special::chi2_sf(args[0], args[1]),
        // (k, x)
        OpKind::GammaInc => special::gammainc(args[0], args[1]),
        OpKind::GammaIncC => special::gammaincc(args[0], args[1]),
        OpKind::GammaU => special::gamma_upper(args[0], args[1]),
        OpKind::GammaL => special::gamma_lower(args[0], args[1]),
        _ => unreachable!("{kind:?} is not a gamma-family operator"),
    }
}

pub(crate) fn evaluate_f32(kind: OpKind, args: &[f32]) -> Option<f32> {
    match kind {
        OpKind::Gamma => Some(libm::tgammaf(args[0])),
        OpKind::GammaLn => Some(libm::lgammaf(args[0])),
        _ => None,
    }
}

pub(crate) fn differentiate(
    op: ScalarOp,
    inputs: &[Expr],
    output: &Expr,
    gz: &Expr,
) -> Result<Vec<Gradient>> {
    let x = &inputs[0];
    let grad = match op.kind() {
        // Γ'(x) = Γ(x)ψ(x)
        OpKind::Gamma => gz * output * ops::psi().apply(std::slice::from_ref(x))?,
        OpKind::GammaLn => gz * ops::psi().apply(std::slice::from_ref(x))?,
        OpKind::Psi => gz * ops::tri_gamma().apply(std::slice::from_ref(x))?,
        OpKind::TriGamma
        | OpKind::Chi2Sf
        | OpKind::GammaInc
        | OpKind::GammaIncC
        | OpKind::GammaU
        | OpKind::GammaL => {
            return Ok((0..inputs.len())
                .map(|i| Gradient::not_implemented(op, i))
                .collect());
        }
        kind => unreachable!("{kind:?} is not a gamma-family operator"),
    };
    Ok(vec![Gradient::Defined(grad)])
}

pub(crate) fn emit_c(
    op: ScalarOp,
    inputs: &[&str],
    output: &str,
    sig: &Signature,
) -> Result<String> {
    let cast = c_type(op, sig.output)?;
    let single = single_precision(sig);
    let x = inputs[0];

    if op.kind() == OpKind::GammaLn {
        // lgamma takes any real operand through the cast
        let f = if single { "lgammaf" } else { "lgamma" };
        return Ok(format!("{output} = {f}(({cast}){x});"));
    }

    require_float(op, sig)?;
    let code = match op.kind() {
        OpKind::Gamma => {
            let f = if single { "tgammaf" } else { "tgamma" };
            format!("{output} = {f}({x});")
        }
        OpKind::Psi => format!("{output} = ({cast}) _psi((double) {x});"),
        OpKind::TriGamma => format!("{output} = ({cast}) _tri_gamma((double) {x});"),
        OpKind::Chi2Sf => {
            let k = inputs[1];
            format!(
                "{output} = ({cast}) (isnan({x}) || !({k} > 0) ? NAN : {x} <= 0 ? 1.0 : GammaQ({k} / 2., {x} / 2.));"
            )
        }
        OpKind::GammaInc | OpKind::GammaIncC | OpKind::GammaU | OpKind::GammaL => {
            let f = match op.kind() {
                OpKind::GammaInc => "GammaP",
                OpKind::GammaIncC => "GammaQ",
                OpKind::GammaU => "upperGamma",
                _ => "lowerGamma",
            };
            let (k, x) = (inputs[0], inputs[1]);
            format!("{output} = ({cast}) {f}((double) {k}, (double) {x});")
        }
        _ => return Err(not_emitted(op, sig)),
    };
    Ok(code)
}
