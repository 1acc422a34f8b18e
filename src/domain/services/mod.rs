//! Domain Services
//!
//! Pure build logic that operates on domain entities.
//! These services have no I/O dependencies and are easily testable.

pub mod app_types;
pub mod component_types;
mod differ;
pub mod type_imports;

pub use app_types::{
    build_type_import_table, generate_component_types_file, AppTypesOptions,
    COMPONENTS_DTS_HEADER, GENERATED_DTS,
};
pub use component_types::{generate_component_types, generate_event_detail_types, TypesModule};
pub use differ::{DiffStats, Differ};
pub use type_imports::{
    rewrite_type_text, sort_import_names, update_reference_type_imports, ImportSource,
    TypeImport, TypeImportTable,
};
