//! sigmoid and softplus

use super::{not_emitted, require_float, rule_const};
use crate::dtype::DType;
use crate::error::Result;
use crate::graph::Expr;
use crate::op::{Gradient, OpKind, ScalarOp, Signature};
use crate::ops;
use crate::special;

pub(crate) fn evaluate(kind: OpKind, args: &[f64]) -> f64 {
    match kind {
        OpKind::Sigmoid => special::sigmoid(args[0]),
        OpKind::Softplus => special::softplus(args[0]),
        _ => unreachable!("{kind:?} is not an activation"),
    }
}

pub(crate) fn evaluate_f32(kind: OpKind, args: &[f32]) -> Option<f32> {
    match kind {
        OpKind::Sigmoid => Some(special::sigmoid_f32(args[0])),
        OpKind::Softplus => Some(special::softplus_f32(args[0])),
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
        // σ' = σ(1 - σ)
        OpKind::Sigmoid => gz * output * (rule_const(1.0, x, gz) - output),
        OpKind::Softplus => gz * ops::sigmoid().apply(std::slice::from_ref(x))?,
        kind => unreachable!("{kind:?} is not an activation"),
    };
    Ok(vec![Gradient::Defined(grad)])
}

pub(crate) fn emit_c(
    op: ScalarOp,
    inputs: &[&str],
    output: &str,
    sig: &Signature,
) -> Result<String> {
    require_float(op, sig)?;
    let x = inputs[0];
    let double = sig.inputs[0] == DType::F64;
    let code = match (op.kind(), double) {
        (OpKind::Sigmoid, true) => format!("{output} = 1.0 / (1.0 + exp(-{x}));"),
        (OpKind::Sigmoid, false) => format!("{output} = 1.0f / (1.0f + expf(-{x}));"),
        (OpKind::Softplus, true) => format!(
            "{output} = (\n    {x} < -745.0 ? 0.0 :\n    {x} < -37.0 ? exp({x}) :\n    {x} < 18.0 ? log1p(exp({x})) :\n    {x} < 33.3 ? {x} + exp(-{x}) :\n    {x}\n);"
        ),
        (OpKind::Softplus, false) => format!(
            "{output} = (\n    {x} < -103.0f ? 0.0f :\n    {x} < -37.0f ? expf({x}) :\n    {x} < 18.0f ? log1pf(expf({x})) :\n    {x} < 33.3f ? {x} + expf(-{x}) :\n    {x}\n);"
        ),
        _ => return Err(not_emitted(op, sig)),
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScalarOpError;
    use crate::scalar::Scalar;
    use rstest::rstest;

    #[rstest]
    #[case(-800.0, 0.0)]
    #[case(-40.0, (-40.0f64).exp())]
    #[case(25.0, 25.0 + (-25.0f64).exp())]
    #[case(40.0, 40.0)]
    fn test_softplus_boundaries(#[case] x: f64, #[case] expected: f64) {
        let v = ops::softplus().evaluate(&[Scalar::F64(x)]).unwrap();
        assert_eq!(v, Scalar::F64(expected));
    }

    #[test]
    fn test_softplus_at_zero() {
        let v = ops::softplus().evaluate(&[Scalar::F64(0.0)]).unwrap();
        let v = v.to_f64().unwrap();
        assert!((v - std::f64::consts::LN_2).abs() < 1e-15);
    }

    #[test]
    fn test_emit_sigmoid_variants() {
        let sig = Signature::new(vec![DType::F64], DType::F64);
        assert_eq!(
            ops::sigmoid().emit_c(&["x"], "z", &sig).unwrap(),
            "z = 1.0 / (1.0 + exp(-x));"
        );
        let sig = Signature::new(vec![DType::F32], DType::F32);
        assert_eq!(
            ops::sigmoid().emit_c(&["x"], "z", &sig).unwrap(),
            "z = 1.0f / (1.0f + expf(-x));"
        );
    }

    #[test]
    fn test_emit_softplus_cutoffs() {
        let sig = Signature::new(vec![DType::F64], DType::F64);
        let code = ops::softplus().emit_c(&["x"], "z", &sig).unwrap();
        assert!(code.contains("x < -745.0 ? 0.0"));
        assert!(code.contains("x < 33.3 ? x + exp(-x)"));
        let sig = Signature::new(vec![DType::F32], DType::F32);
        let code = ops::softplus().emit_c(&["x"], "z", &sig).unwrap();
        assert!(code.contains("x < -103.0f ? 0.0f"));
    }

    #[test]
    fn test_emit_rejects_discrete() {
        let sig = Signature::new(vec![DType::I16], DType::F32);
        let err = ops::softplus().emit_c(&["x"], "z", &sig).unwrap_err();
        assert!(matches!(err, ScalarOpError::UnsupportedType { dtype: DType::I16, .. }));
    }
}
