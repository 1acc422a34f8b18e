//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod config_warning;
mod hash;
pub mod path;

pub use config_warning::ConfigWarning;
pub use hash::ContentHash;
pub use path::{import_specifier, normalize_path, relative_path, resolve_path, to_slash};
