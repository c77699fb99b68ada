//! VJP (Vector-Jacobian Product) rules for automatic differentiation
//!
//! Combinator nodes carry their own rules here; operator nodes delegate to
//! [`ScalarOp::differentiate`](crate::op::ScalarOp::differentiate).

use crate::error::Result;
use crate::graph::{Expr, ExprOp};
use crate::op::Gradient;

// ============================================================================
// VJP Result
// ============================================================================

/// Result of computing VJP for an operation.
pub struct VjpResult {
    /// One gradient per operand, in order.
    pub input_grads: Vec<Gradient>,
}

impl VjpResult {
    fn defined(grads: Vec<Expr>) -> Self {
        Self {
            input_grads: grads.into_iter().map(Gradient::Defined).collect(),
        }
    }
}

// ============================================================================
// Main VJP Dispatcher
// ============================================================================

/// Given the gradient of `node`'s output, computes the gradient for each of
/// its operands.
pub fn compute_vjp(node: &Expr, grad_output: &Expr) -> Result<VjpResult> {
    let src = node.src();
    let g = grad_output;

    let result = match node.op() {
        ExprOp::Input(_) | ExprOp::Const(_) => VjpResult::defined(vec![]),

        ExprOp::Apply(op) => VjpResult {
            input_grads: op.differentiate(
                src,
                std::slice::from_ref(node),
                std::slice::from_ref(grad_output),
            )?,
        },

        // add(a, b): grad_a = grad_out, grad_b = grad_out
        ExprOp::Add => VjpResult::defined(vec![g.clone(), g.clone()]),

        // sub(a, b): grad_a = grad_out, grad_b = -grad_out
        ExprOp::Sub => VjpResult::defined(vec![g.clone(), -g]),

        // mul(a, b): grad_a = grad_out * b, grad_b = grad_out * a
        ExprOp::Mul => VjpResult::defined(vec![g * &src[1], g * &src[0]]),

        ExprOp::Neg => VjpResult::defined(vec![-g]),

        // exp(a): grad_a = grad_out * exp(a)
        ExprOp::Exp => VjpResult::defined(vec![g * node]),

        // log(a): grad_a = grad_out * a^-1
        ExprOp::Log => VjpResult::defined(vec![g * src[0].powf(-1.0)]),

        // pow(a, b): grad_a = grad_out * b * a^(b-1), grad_b = grad_out * a^b * log(a)
        ExprOp::Pow => {
            let (a, b) = (&src[0], &src[1]);
            VjpResult::defined(vec![g * b * a.pow(&(b - 1.0)), g * node * a.log()])
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    #[test]
    fn test_mul_vjp() {
        let a = Expr::input("a", DType::F64);
        let b = Expr::input("b", DType::F64);
        let g = Expr::input("g", DType::F64);
        let vjp = compute_vjp(&(&a * &b), &g).unwrap();
        assert_eq!(vjp.input_grads[0], Gradient::Defined(&g * &b));
        assert_eq!(vjp.input_grads[1], Gradient::Defined(&g * &a));
    }

    #[test]
    fn test_sub_vjp() {
        let a = Expr::input("a", DType::F64);
        let b = Expr::input("b", DType::F64);
        let g = Expr::input("g", DType::F64);
        let vjp = compute_vjp(&(&a - &b), &g).unwrap();
        assert_eq!(vjp.input_grads[1], Gradient::Defined(-&g));
    }

    #[test]
    fn test_leaf_has_no_operand_grads() {
        let a = Expr::input("a", DType::F64);
        let vjp = compute_vjp(&a, &a).unwrap();
        assert!(vjp.input_grads.is_empty());
    }
}
