//! Scalar expression graphs
//!
//! Operators and the differentiation combinators build immutable nodes;
//! [`Interpreter`] evaluates them and [`topological_sort`] orders them for the
//! backward pass and the C backend.

mod interpreter;
mod node;

pub use interpreter::Interpreter;
pub use node::{Expr, ExprInner, ExprOp, NodeId, topological_sort};
