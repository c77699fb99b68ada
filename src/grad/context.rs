//! Gradient computation context
//!
//! This module provides the `GradContext` structure that tracks gradients
//! during backpropagation.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, ScalarOpError};
use crate::graph::{Expr, NodeId};

// ============================================================================
// GradContext
// ============================================================================

/// Context for gradient computation during backpropagation.
///
/// Maps forward nodes to their accumulated gradient. A node whose gradient
/// passes through an input without a differentiation rule is recorded as
/// blocked instead; the marker travels down to every parameter it reaches.
#[derive(Default)]
pub struct GradContext {
    /// Mapping from forward node (by pointer) to its gradient node.
    pub(crate) grad_map: FxHashMap<NodeId, Expr>,

    /// Nodes whose gradient crosses a not-implemented rule.
    pub(crate) blocked: FxHashMap<NodeId, (&'static str, usize)>,

    /// Parameters the caller asked for.
    pub(crate) requires_grad_set: FxHashSet<NodeId>,

    /// Nodes with a parameter among their ancestors (or that are parameters).
    pub(crate) reaches_param: FxHashSet<NodeId>,
}

impl GradContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_requires_grad(&mut self, node: &Expr) {
        self.requires_grad_set.insert(node.id());
    }

    pub fn requires_grad(&self, node: &Expr) -> bool {
        self.requires_grad_set.contains(&node.id())
    }

    /// Records which nodes lie on a path to a parameter. `sorted` must list
    /// operands before their users.
    pub(crate) fn compute_reachability(&mut self, sorted: &[Expr]) {
        for node in sorted {
            let reaches = self.requires_grad(node)
                || node.src().iter().any(|s| self.reaches_param.contains(&s.id()));
            if reaches {
                self.reaches_param.insert(node.id());
            }
        }
    }

    /// True when the node is a parameter or depends on one.
    pub fn needs_grad(&self, node: &Expr) -> bool {
        self.reaches_param.contains(&node.id())
    }

    pub fn get_grad(&self, node: &Expr) -> Option<&Expr> {
        self.grad_map.get(&node.id())
    }

    pub fn set_grad(&mut self, node: &Expr, grad: Expr) {
        self.grad_map.insert(node.id(), grad);
    }

    /// Adds to an existing gradient, or sets it.
    pub fn accumulate_grad(&mut self, node: &Expr, grad: Expr) {
        let id = node.id();
        let accumulated = match self.grad_map.get(&id) {
            Some(existing) => existing + &grad,
            None => grad,
        };
        self.grad_map.insert(id, accumulated);
    }

    pub fn block(&mut self, node: &Expr, op: &'static str, input: usize) {
        self.blocked.entry(node.id()).or_insert((op, input));
    }

    pub fn blocked_by(&self, node: &Expr) -> Option<(&'static str, usize)> {
        self.blocked.get(&node.id()).copied()
    }

    pub fn num_grads(&self) -> usize {
        self.grad_map.len()
    }
}

// ============================================================================
// GradResult
// ============================================================================

/// Result of backward pass computation.
pub struct GradResult {
    context: GradContext,
    params: Vec<Expr>,
}

impl GradResult {
    pub(crate) fn new(context: GradContext, params: Vec<Expr>) -> Self {
        Self { context, params }
    }

    /// Gradient for one parameter.
    ///
    /// `Ok(None)` when the parameter is not connected to the output, and
    /// `NotImplementedGradient` when every path to it is blocked.
    pub fn get(&self, param: &Expr) -> Result<Option<Expr>> {
        if let Some((op, input)) = self.context.blocked_by(param) {
            return Err(ScalarOpError::NotImplementedGradient { op, input });
        }
        Ok(self.context.get_grad(param).cloned())
    }

    /// Gradients in the order the parameters were given.
    pub fn grads(&self) -> Vec<Result<Option<Expr>>> {
        self.params.iter().map(|p| self.get(p)).collect()
    }

    pub fn context(&self) -> &GradContext {
        &self.context
    }
}

// ============================================================================
// Tests
// ============================================================================
