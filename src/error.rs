//! Error types for scalar operators

use thiserror::Error;

use crate::dtype::DType;

/// Errors raised by promotion, evaluation, differentiation, emission and the
/// native backend.
#[derive(Debug, Error)]
pub enum ScalarOpError {
    /// The operand type lies outside the operator's domain
    #[error("{op}: type {dtype} not supported ({reason})")]
    UnsupportedType {
        op: &'static str,
        dtype: DType,
        reason: &'static str,
    },

    /// A requested gradient path crosses an operator input without a rule
    #[error("{op}: gradient with respect to input {input} is not implemented")]
    NotImplementedGradient { op: &'static str, input: usize },

    /// No native code path for this operator/type combination
    #[error("{op}: no C implementation for {dtype}")]
    NotImplementedEmission { op: &'static str, dtype: DType },

    /// Wrong number of operands
    #[error("{op}: expected {expected} operand(s), got {got}")]
    Arity {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    /// Unknown type name
    #[error("unknown dtype: {0}")]
    UnknownType(String),

    /// Unknown operator name
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// Interpreter could not find a value for a graph input
    #[error("no value bound to input '{0}'")]
    UnboundInput(String),

    /// The C compiler rejected the unit or could not be run
    #[error("compilation failed: {0}")]
    Compile(String),

    /// The compiled library could not be loaded
    #[error("library error: {0}")]
    Library(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScalarOpError {
    /// True for the "not implemented" family, which callers may recover from
    /// by falling back or dropping the path.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            ScalarOpError::NotImplementedGradient { .. }
                | ScalarOpError::NotImplementedEmission { .. }
        )
    }

    pub(crate) fn unsupported(op: &'static str, dtype: DType, reason: &'static str) -> Self {
        ScalarOpError::UnsupportedType { op, dtype, reason }
    }
}

pub type Result<T> = std::result::Result<T, ScalarOpError>;
