//! jv, j0, j1, iv, i0, i1

use super::{not_emitted, require_float, rule_const, single_precision};
use crate::error::Result;
use crate::graph::Expr;
use crate::op::{Gradient, OpKind, ScalarOp, Signature};
use crate::ops;
use crate::special;

pub(crate) fn evaluate(kind: OpKind, args: &[f64]) -> f64 {
    match kind {
        OpKind::Jv => special::bessel_jv(args[0], args[1]),
        OpKind::J0 => special::bessel_j0(args[0]),
        OpKind::J1 => special::bessel_j1(args[0]),
        OpKind::Iv => special::bessel_iv(args[0], args[1]),
        OpKind::I0 => special::bessel_i0(args[0]),
        OpKind::I1 => special::bessel_i1(args[0]),
        _ => unreachable!("{kind:?} is not a Bessel function"),
    }
}

pub(crate) fn evaluate_f32(kind: OpKind, args: &[f32]) -> Option<f32> {
    match kind {
        OpKind::J0 => Some(libm::j0f(args[0])),
        OpKind::J1 => Some(libm::j1f(args[0])),
        _ => None,
    }
}

pub(crate) fn differentiate(
    op: ScalarOp,
    inputs: &[Expr],
    _output: &Expr,
    gz: &Expr,
) -> Result<Vec<Gradient>> {
    match op.kind() {
        // d/dx J_v(x) = (J_{v-1}(x) - J_{v+1}(x)) / 2, no rule for the order
        OpKind::Jv | OpKind::Iv => {
            let (v, x) = (&inputs[0], &inputs[1]);
            let lower = op.apply(&[v - 1.0, x.clone()])?;
            let upper = op.apply(&[v + 1.0, x.clone()])?;
            let diff = if op.kind() == OpKind::Jv {
                lower - upper
            } else {
                lower + upper
            };
            Ok(vec![
                Gradient::not_implemented(op, 0),
                Gradient::Defined(gz * diff * rule_const(0.5, x, gz)),
            ])
        }
        OpKind::J0 => {
            let x = &inputs[0];
            let j1 = ops::j1().apply(std::slice::from_ref(x))?;
            Ok(vec![Gradient::Defined(-(gz * j1))])
        }
        OpKind::J1 => {
            let x = &inputs[0];
            let j0 = ops::j0().apply(std::slice::from_ref(x))?;
            let j2 = ops::jv().apply(&[rule_const(2.0, x, gz), x.clone()])?;
            Ok(vec![Gradient::Defined(gz * (j0 - j2) * rule_const(0.5, x, gz))])
        }
        OpKind::I0 => {
            let x = &inputs[0];
            let i1 = ops::i1().apply(std::slice::from_ref(x))?;
            Ok(vec![Gradient::Defined(gz * i1)])
        }
        OpKind::I1 => {
            let x = &inputs[0];
            let i0 = ops::i0().apply(std::slice::from_ref(x))?;
            let i2 = ops::iv().apply(&[rule_const(2.0, x, gz), x.clone()])?;
            Ok(vec![Gradient::Defined(gz * (i0 + i2) * rule_const(0.5, x, gz))])
        }
        kind => unreachable!("{kind:?} is not a Bessel function"),
    }
}

pub(crate) fn emit_c(
    op: ScalarOp,
    inputs: &[&str],
    output: &str,
    sig: &Signature,
) -> Result<String> {
    let f = match (op.kind(), single_precision(sig)) {
        (OpKind::J0, false) => "j0",
        (OpKind::J0, true) => "j0f",
        (OpKind::J1, false) => "j1",
        (OpKind::J1, true) => "j1f",
        _ => return Err(not_emitted(op, sig)),
    };
    require_float(op, sig)?;
    Ok(format!("{output} = {f}({});", inputs[0]))
}
