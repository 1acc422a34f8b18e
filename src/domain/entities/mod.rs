//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `BuildContext` - State of one build pass
//! - `ComponentDescriptor` - Compiled metadata for one component module
//! - `Diagnostic` - A recoverable, reportable build issue

mod build_context;
mod component;
mod diagnostic;

pub use build_context::{BuildContext, PassPhase, TimeSpan};
pub use component::{
    dash_to_pascal_case, ComponentDescriptor, ComponentEvent, ComponentMember, TypeReference,
};
pub use diagnostic::{Diagnostic, DiagnosticLevel};
