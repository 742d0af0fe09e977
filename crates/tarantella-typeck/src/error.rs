//! Inference error types.
//!
//! These only arise when the front end hands the lowering stage a method
//! group and delegate type that overload resolution should already have
//! rejected, so they describe caller defects rather than user errors.

use std::fmt;

use crate::ty::{Ty, TyVar};

/// A failure while inferring method type arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum InferError {
    /// Two types that should be equal are not.
    Mismatch { expected: Ty, found: Ty },
    /// A variable appears inside the type it would be bound to.
    InfiniteType { var: TyVar, ty: Ty },
    /// Generic argument lists of different lengths.
    ArityMismatch { expected: usize, found: usize },
    /// The delegate and method have different parameter counts.
    ParameterCountMismatch { method: usize, delegate: usize },
    /// The target type is not a delegate.
    NotADelegate { ty: Ty },
    /// No parameter position constrains this method type parameter.
    Unbound { type_param: String },
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::Mismatch { expected, found } => {
                write!(f, "type mismatch: expected `{}`, found `{}`", expected, found)
            }
            InferError::InfiniteType { var, ty } => {
                write!(f, "infinite type: `?{}` occurs in `{}`", var.0, ty)
            }
            InferError::ArityMismatch { expected, found } => {
                write!(
                    f,
                    "arity mismatch: expected {} type arguments, found {}",
                    expected, found
                )
            }
            InferError::ParameterCountMismatch { method, delegate } => {
                write!(
                    f,
                    "method takes {} parameters but the delegate passes {}",
                    method, delegate
                )
            }
            InferError::NotADelegate { ty } => {
                write!(f, "`{}` is not a delegate type", ty)
            }
            InferError::Unbound { type_param } => {
                write!(f, "cannot infer type argument for `{}`", type_param)
            }
        }
    }
}

impl std::error::Error for InferError {}
