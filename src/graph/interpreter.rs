//! Reference interpreter for expression graphs

use rustc_hash::FxHashMap;

use crate::error::{Result, ScalarOpError};
use crate::graph::node::{Expr, ExprOp, NodeId, topological_sort};
use crate::scalar::Scalar;

/// Evaluates graphs with values bound to their named inputs.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    bindings: FxHashMap<String, Scalar>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Scalar>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn eval(&self, expr: &Expr) -> Result<Scalar> {
        let mut values = self.eval_many(std::slice::from_ref(expr))?;
        values
            .pop()
            .ok_or_else(|| ScalarOpError::UnboundInput(expr.to_string()))
    }

    /// Evaluates several roots, sharing common subgraphs.
    pub fn eval_many(&self, roots: &[Expr]) -> Result<Vec<Scalar>> {
        let mut memo: FxHashMap<NodeId, Scalar> = FxHashMap::default();
        for node in topological_sort(roots) {
            let args: Vec<Scalar> = node.src().iter().map(|s| memo[&s.id()]).collect();
            let value = self.eval_node(&node, &args)?;
            memo.insert(node.id(), value);
        }
        Ok(roots.iter().map(|r| memo[&r.id()]).collect())
    }

    fn eval_node(&self, node: &Expr, args: &[Scalar]) -> Result<Scalar> {
        let dtype = node.dtype();
        match node.op() {
            ExprOp::Input(name) => {
                let value = *self
                    .bindings
                    .get(name)
                    .ok_or_else(|| ScalarOpError::UnboundInput(name.clone()))?;
                if value.dtype() == dtype {
                    return Ok(value);
                }
                let real = real(node.op(), &value)?;
                Ok(Scalar::from_f64(real, dtype))
            }
            ExprOp::Const(v) => Ok(Scalar::from_f64(*v, dtype)),
            ExprOp::Apply(op) => op.evaluate(args),
            op => {
                let a = args
                    .iter()
                    .map(|v| real(op, v))
                    .collect::<Result<Vec<f64>>>()?;
                let v = match op {
                    ExprOp::Add => a[0] + a[1],
                    ExprOp::Sub => a[0] - a[1],
                    ExprOp::Mul => a[0] * a[1],
                    ExprOp::Neg => -a[0],
                    ExprOp::Pow => a[0].powf(a[1]),
                    ExprOp::Exp => a[0].exp(),
                    ExprOp::Log => a[0].ln(),
                    ExprOp::Input(_) | ExprOp::Const(_) | ExprOp::Apply(_) => {
                        unreachable!("leaf and operator nodes are handled above")
                    }
                };
                Ok(Scalar::from_f64(v, dtype))
            }
        }
    }
}

fn real(op: &ExprOp, value: &Scalar) -> Result<f64> {
    value.to_f64().ok_or_else(|| {
        ScalarOpError::unsupported(op.name(), value.dtype(), "complex values are not evaluated")
    })
}
