//! Tarantella method group lowering.
//!
//! Turns a method group converted to a delegate type into script code that
//! reproduces the method's identity, receiver binding, generic
//! instantiation and dispatch at runtime:
//!
//! - [`js`]: Script output tree
//! - [`printer`]: Deterministic text rendering of script trees
//! - [`config`]: Runtime helper names and naming prefixes (TOML)
//! - [`semantics`]: Method emission and delegate binding policies
//! - [`receiver`]: Receiver classification and exactly-once evaluation
//! - [`method_group`]: The conversion engine
//! - [`error`]: Lowering error types
//! - [`diagnostics`]: Diagnostic sink and ariadne rendering

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod js;
pub mod method_group;
pub mod printer;
pub mod receiver;
pub mod semantics;

pub use config::LowerConfig;
pub use diagnostics::{Diagnostic, DiagnosticOptions, Diagnostics, Severity};
pub use error::LowerError;
pub use method_group::{Lowered, MethodGroupConversion, MethodGroupLowerer};
pub use receiver::{CompiledTarget, Receiver, TargetEvaluator, Temporaries};
pub use semantics::{DelegateSemantics, MethodSemantics, SemanticsTable};
