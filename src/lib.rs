//! Harp Scalar: special-function operators for the Harp graph compiler
//!
//! Each operator in the catalog behaves consistently under three
//! interpretations:
//! - numeric evaluation (`ScalarOp::evaluate`)
//! - symbolic reverse-mode differentiation (`ScalarOp::differentiate`, `grad`)
//! - C code generation (`ScalarOp::emit_c`, `backend::c`)
//!
//! # Architecture
//!
//! - **dtype** / **promote**: scalar types and promotion policies
//! - **op**: the operator contract
//! - **ops**: the catalog (error function, gamma, Bessel and activation families)
//! - **special**: numeric kernels used by evaluation
//! - **graph**: expression graphs, combinators and the interpreter
//! - **grad**: the backward pass
//! - **backend**: bundled C support code, cache versions, the C compiler driver
//!
//! # Configuration
//!
//! - `HARP_FLOATX`: default float type for discrete operands (`float64`)
//! - `CC`: C compiler used by the native backend (`cc`)

// ============================================================================
// Core Modules
// ============================================================================

pub mod backend;
pub mod config;
pub mod dtype;
pub mod error;
pub mod grad;
pub mod graph;
pub mod op;
pub mod ops;
pub mod promote;
pub mod scalar;
pub mod special;

// ============================================================================
// Re-exports
// ============================================================================

pub use dtype::{DType, TypeClass};
pub use error::{Result, ScalarOpError};
pub use graph::Expr;
pub use op::{Gradient, OpKind, ScalarOp, Signature};
pub use promote::Promotion;
pub use scalar::Scalar;

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module with commonly used types and traits
pub mod prelude {
    pub use crate::backend::c::{CCompiler, CKernel, CompilationUnit};
    pub use crate::backend::{CacheVersion, SupportCode};
    pub use crate::dtype::DType;
    pub use crate::error::{Result, ScalarOpError};
    pub use crate::grad::{Differentiable, GradResult, backward, grad};
    pub use crate::graph::{Expr, Interpreter};
    pub use crate::op::{Gradient, OpKind, ScalarOp, Signature};
    pub use crate::ops;
    pub use crate::promote::Promotion;
    pub use crate::scalar::Scalar;
}
