//! Tarantella type checker support for method-group lowering.
//!
//! This crate holds the source-language type information the lowering
//! stage consults once overload resolution has picked a method:
//!
//! - [`ty`]: Core type representation (Ty, TyCon, TyParam, TyVar)
//! - [`index`]: The type and method index, including the inheritance hierarchy
//! - [`unify`]: `ena`-backed unification with occurs check
//! - [`infer`]: Method type-argument inference from a delegate type
//! - [`members`]: Override slots and `base` dispatch target resolution
//! - [`error`]: Inference error types

pub mod error;
pub mod index;
pub mod infer;
pub mod members;
pub mod ty;
pub mod unify;

pub use index::{MethodDef, MethodId, MethodSig, TypeDef, TypeDefId, TypeIndex, Virtuality};
pub use members::{BaseTarget, MemberResolution};
