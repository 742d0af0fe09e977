//! Lowering error types.
//!
//! The two user-facing failures come straight from policy lookups and are
//! detected before any output is built. `Internal` carries caller defects,
//! such as a generic method whose type arguments cannot be read off the
//! delegate type, which overload resolution should have rejected.

use std::fmt;

use rowan::TextRange;

/// A failed method group conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum LowerError {
    /// The method's policy forbids referencing it from script.
    NotUsableFromScript { member: String, span: TextRange },
    /// The method expands its `params` array but the delegate type does not.
    IncompatibleParamsExpansion {
        member: String,
        delegate: String,
        span: TextRange,
    },
    /// The conversion request itself is inconsistent.
    Internal { message: String, span: TextRange },
}

impl LowerError {
    pub fn span(&self) -> TextRange {
        match self {
            LowerError::NotUsableFromScript { span, .. }
            | LowerError::IncompatibleParamsExpansion { span, .. }
            | LowerError::Internal { span, .. } => *span,
        }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::NotUsableFromScript { member, .. } => {
                write!(f, "the method `{}` cannot be used from script", member)
            }
            LowerError::IncompatibleParamsExpansion {
                member, delegate, ..
            } => {
                write!(
                    f,
                    "the method `{}` expands its param array in script, \
                     but the delegate type `{}` does not expand param arrays",
                    member, delegate
                )
            }
            LowerError::Internal { message, .. } => {
                write!(f, "internal error in method group conversion: {}", message)
            }
        }
    }
}

impl std::error::Error for LowerError {}
