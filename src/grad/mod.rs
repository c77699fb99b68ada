//! Reverse-mode differentiation over expression graphs
//!
//! ```text
//! output ──▶ topological sort ──▶ reverse walk ──▶ GradResult
//!                                   │
//!                                   ├─ combinators: rules::compute_vjp
//!                                   └─ operators:   ScalarOp::differentiate
//! ```

mod backward;
mod context;
mod rules;

pub use backward::{Differentiable, backward, grad};
pub use context::{GradContext, GradResult};
pub use rules::{VjpResult, compute_vjp};
