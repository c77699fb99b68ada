//! erf, erfc, erfcx, erfinv, erfcinv

use std::f64::consts::{FRAC_2_SQRT_PI, PI};

use super::{c_type, not_emitted, require_float, rule_const, single_precision};
use crate::error::Result;
use crate::graph::Expr;
use crate::op::{Gradient, OpKind, ScalarOp, Signature};
use crate::special;

pub(crate) fn evaluate(kind: OpKind, args: &[f64]) -> f64 {
    let x = args[0];
    match kind {
        OpKind::Erf => libm::erf(x),
        OpKind::Erfc => libm::erfc(x),
        OpKind::Erfcx => special::erfcx(x),
        OpKind::Erfinv => special::erfinv(x),
        OpKind::Erfcinv => special::erfcinv(x),
        _ => unreachable!("{kind:?} is not an error function"),
    }
}

pub(crate) fn evaluate_f32(kind: OpKind, args: &[f32]) -> Option<f32> {
    match kind {
        OpKind::Erf => Some(libm::erff(args[0])),
        OpKind::Erfc => Some(libm::erfcf(args[0])),
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
    let c = |v: f64| rule_const(v, x, gz);

    let grad = match op.kind() {
        // d/dx erf(x) = 2/√π · e^(-x²)
        OpKind::Erf => gz * c(FRAC_2_SQRT_PI) * (-(x * x)).exp(),
        OpKind::Erfc => -(gz * c(FRAC_2_SQRT_PI) * (-(x * x)).exp()),
        // d/dx erfcx(x) = 2x·erfcx(x) - 2/√π
        OpKind::Erfcx => gz * (-c(FRAC_2_SQRT_PI) + c(2.0) * x * output),
        // d/dy erfinv(y) = √π/2 · e^(erfinv(y)²)
        OpKind::Erfinv => gz * c(PI.sqrt() / 2.0) * (output * output).exp(),
        OpKind::Erfcinv => -(gz * c(PI.sqrt() / 2.0) * (output * output).exp()),
        kind => unreachable!("{kind:?} is not an error function"),
    };
    Ok(vec![Gradient::Defined(grad)])
}

pub(crate) fn emit_c(
    op: ScalarOp,
    inputs: &[&str],
    output: &str,
    sig: &Signature,
) -> Result<String> {
    let x = inputs[0];
    let cast = c_type(op, sig.output)?;
    let single = single_precision(sig);
    match op.kind() {
        OpKind::Erf => {
            let f = if single { "erff" } else { "erf" };
            Ok(format!("{output} = {f}(({cast}){x});"))
        }
        OpKind::Erfc => {
            let f = if single { "erfcf" } else { "erfc" };
            Ok(format!("{output} = {f}(({cast}){x});"))
        }
        OpKind::Erfcx => {
            require_float(op, sig)?;
            Ok(format!("{output} = ({cast}) harp_erfcx((double) {x});"))
        }
        _ => Err(not_emitted(op, sig)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::error::ScalarOpError;
    use crate::ops;

    fn sig(input: DType, output: DType) -> Signature {
        Signature::new(vec![input], output)
    }

    #[test]
    fn test_emit_erf_casts_discrete_operand() {
        let code = ops::erf()
            .emit_c(&["x"], "z", &sig(DType::I32, DType::F64))
            .unwrap();
        assert_eq!(code, "z = erf((double)x);");
        let code = ops::erfc()
            .emit_c(&["x"], "z", &sig(DType::F32, DType::F32))
            .unwrap();
        assert_eq!(code, "z = erfcf((float)x);");
    }

    #[test]
    fn test_emit_erfcx_requires_float() {
        let code = ops::erfcx()
            .emit_c(&["a"], "b", &sig(DType::F32, DType::F32))
            .unwrap();
        assert_eq!(code, "b = (float) harp_erfcx((double) a);");
        let err = ops::erfcx()
            .emit_c(&["a"], "b", &sig(DType::I64, DType::F64))
            .unwrap_err();
        assert!(matches!(err, ScalarOpError::UnsupportedType { dtype: DType::I64, .. }));
    }

    #[test]
    fn test_inverse_has_no_c_path() {
        for op in [ops::erfinv(), ops::erfcinv()] {
            let err = op.emit_c(&["x"], "z", &sig(DType::F64, DType::F64)).unwrap_err();
            assert!(matches!(err, ScalarOpError::NotImplementedEmission { .. }));
        }
    }

    #[test]
    fn test_rule_constants_follow_operand_types() {
        let x = Expr::input("x", DType::F32);
        let gz = Expr::input("gz", DType::F32);
        let y = ops::erf().apply(&[x.clone()]).unwrap();
        let grads = ops::erf().differentiate(&[x], &[y], &[gz]).unwrap();
        assert_eq!(grads[0].as_expr().map(Expr::dtype), Some(DType::F32));
    }
}
