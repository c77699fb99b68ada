//! Backward pass implementation for automatic differentiation
//!
//! This module provides the `backward()` function that computes gradients
//! by propagating through the expression graph in reverse order.

use log::debug;

use crate::config::float_x;
use crate::error::Result;
use crate::graph::{Expr, topological_sort};
use crate::op::Gradient;

use super::context::{GradContext, GradResult};
use super::rules::compute_vjp;

// ============================================================================
// Backward Function
// ============================================================================

/// Compute gradients of `output` with respect to `params`.
///
/// Performs reverse-mode differentiation seeded with a gradient of one.
/// A not-implemented marker only matters on paths that reach a requested
/// parameter: the parameter is then reported as blocked by
/// [`GradResult::get`]. Markers on other paths are dropped.
///
/// # Example
///
/// ```
/// use harp_scalar::prelude::*;
///
/// let x = Expr::input("x", DType::F64);
/// let y = ops::gammaln().apply(&[x.clone()]).unwrap();
///
/// let grads = backward(&y, &[&x]).unwrap();
/// let dx = grads.get(&x).unwrap().unwrap(); // 1 * psi(x)
/// assert_eq!(dx.dtype(), DType::F64);
/// ```
pub fn backward(output: &Expr, params: &[&Expr]) -> Result<GradResult> {
    let mut ctx = GradContext::new();

    for param in params {
        ctx.mark_requires_grad(param);
    }

    // Topologically sorted nodes (operands before users)
    let sorted = topological_sort(std::slice::from_ref(output));
    ctx.compute_reachability(&sorted);

    let seed_type = if output.dtype().is_discrete() {
        float_x()
    } else {
        output.dtype()
    };
    ctx.set_grad(output, Expr::constant(1.0, seed_type));

    // Traverse in reverse order (from output to inputs)
    for node in sorted.into_iter().rev() {
        let sources = node.src();
        if sources.is_empty() {
            continue;
        }

        if let Some((op, input)) = ctx.blocked_by(&node) {
            for source in sources {
                if ctx.needs_grad(source) {
                    ctx.block(source, op, input);
                }
            }
            continue;
        }

        let grad_output = match ctx.get_grad(&node) {
            Some(g) => g.clone(),
            None => continue,
        };

        let vjp = compute_vjp(&node, &grad_output)?;

        for (source, grad_input) in sources.iter().zip(vjp.input_grads) {
            // Only accumulate if the source is on the path to a parameter
            if !ctx.needs_grad(source) {
                continue;
            }
            match grad_input {
                Gradient::Defined(grad) => ctx.accumulate_grad(source, grad),
                Gradient::NotImplemented { op, input } => {
                    debug!("gradient of {op} with respect to input {input} is not implemented");
                    ctx.block(source, op, input);
                }
            }
        }
    }

    let param_nodes: Vec<Expr> = params.iter().map(|p| (*p).clone()).collect();
    Ok(GradResult::new(ctx, param_nodes))
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Gradient of `output` with respect to a single parameter.
pub fn grad(output: &Expr, param: &Expr) -> Result<Option<Expr>> {
    backward(output, &[param])?.get(param)
}

// ============================================================================
// Extension Trait for Expr
// ============================================================================

/// Extension trait to add backward() method to Expr.
pub trait Differentiable {
    fn backward(&self, params: &[&Expr]) -> Result<GradResult>;

    fn grad(&self, param: &Expr) -> Result<Option<Expr>>;
}

impl Differentiable for Expr {
    fn backward(&self, params: &[&Expr]) -> Result<GradResult> {
        backward(self, params)
    }

    fn grad(&self, param: &Expr) -> Result<Option<Expr>> {
        grad(self, param)
    }
}

// ============================================================================
// Tests
// ============================================================================
