//! Declaration aggregator
//!
//! Merges the per-component declaration blocks into the single
//! `components.d.ts` artifact. Output is a pure function of the descriptor
//! list and the options: the import table is rebuilt from scratch on every
//! call, so identical input yields byte-identical output.
//!
//! Section order is part of the artifact's contract:
//! 1. header comment
//! 2. runtime import, then one import statement per declaring source
//! 3. `Components` namespace
//! 4. `CustomEvent` subtypes for components with events
//! 5. `declare global` element interfaces and the tag-name map
//! 6. `LocalJSX` namespace and its intrinsic elements
//! 7. framework module augmentation repeating the tag map

use std::path::Path;

use crate::domain::entities::ComponentDescriptor;
use crate::domain::value_objects::import_specifier;

use super::component_types::{generate_component_types, generate_event_detail_types, TypesModule};
use super::type_imports::{
    global_type_names, update_reference_type_imports, ImportSource, TypeImportTable,
};

/// File name of the generated declaration artifact
pub const GENERATED_DTS: &str = "components.d.ts";

pub const COMPONENTS_DTS_HEADER: &str = "/* eslint-disable */
/* tslint:disable */
/**
 * This is an autogenerated file created by the Hobbes compiler.
 * It contains typing information for all components that exist in this project.
 */";

/// Names the artifact itself declares or imports
const ARTIFACT_NAMES: [&str; 3] = ["Components", "LocalJSX", "JSXBase"];

/// Rendering options for one artifact
#[derive(Debug, Clone)]
pub struct AppTypesOptions<'a> {
    /// Directory the artifact is written to; project imports are relative to it
    pub import_base_dir: &'a Path,
    /// Framework module, e.g. `@hobbes/core`
    pub runtime_module: &'a str,
    /// Base interface every element extends
    pub element_base: &'a str,
    /// Include members flagged `internal`
    pub are_types_internal: bool,
}

/// Fill a fresh import table from `components`, in input order
pub fn build_type_import_table(
    components: &[&ComponentDescriptor],
    options: &AppTypesOptions<'_>,
) -> TypeImportTable {
    let mut table = TypeImportTable::with_reserved(
        ARTIFACT_NAMES
            .iter()
            .map(|n| n.to_string())
            .chain(std::iter::once(options.element_base.to_string()))
            .chain(global_type_names(components.iter().copied())),
    );
    for cmp in components {
        update_reference_type_imports(&mut table, cmp, options.are_types_internal);
    }
    table
}

/// Render the aggregate artifact for every non-dependency component
pub fn generate_component_types_file(
    components: &[ComponentDescriptor],
    options: &AppTypesOptions<'_>,
) -> String {
    let components: Vec<&ComponentDescriptor> = components
        .iter()
        .filter(|cmp| !cmp.is_collection_dependency)
        .collect();

    let table = build_type_import_table(&components, options);

    let modules: Vec<TypesModule> = components
        .iter()
        .map(|cmp| {
            generate_component_types(
                cmp,
                &table,
                options.are_types_internal,
                options.element_base,
            )
        })
        .collect();

    let event_detail_types: Vec<String> = components
        .iter()
        .filter(|cmp| cmp.visible_events(options.are_types_internal).next().is_some())
        .map(|cmp| generate_event_detail_types(cmp))
        .collect();

    let mut c: Vec<String> = Vec::new();
    c.push(COMPONENTS_DTS_HEADER.to_string());
    c.push(format!(
        "import {{ {}, JSXBase }} from \"{}/internal\";",
        options.element_base, options.runtime_module
    ));

    for (source, imports) in table.sorted_imports() {
        let specifier = match source {
            ImportSource::File(path) => import_specifier(options.import_base_dir, path),
            ImportSource::Module(module) => module.clone(),
        };
        let names: Vec<String> = imports.iter().map(|i| i.render()).collect();
        c.push(format!(
            "import {{ {} }} from \"{}\";",
            names.join(", "),
            specifier
        ));
    }

    c.push("export namespace Components {".to_string());
    c.extend(modules.iter().map(|m| m.component.clone()));
    c.push("}".to_string());

    c.extend(event_detail_types);

    c.push("declare global {".to_string());
    c.extend(modules.iter().map(|m| m.element.clone()));
    c.push("    interface HTMLElementTagNameMap {".to_string());
    c.extend(
        modules
            .iter()
            .map(|m| format!("        \"{}\": {};", m.tag_name, m.html_element_name)),
    );
    c.push("    }".to_string());
    c.push("}".to_string());

    c.push("declare namespace LocalJSX {".to_string());
    c.extend(modules.iter().map(|m| m.jsx.clone()));
    c.push("    interface IntrinsicElements {".to_string());
    c.extend(
        modules
            .iter()
            .map(|m| format!("        \"{}\": {};", m.tag_name, m.tag_name_as_pascal)),
    );
    c.push("    }".to_string());
    c.push("}".to_string());

    c.push("export { LocalJSX as JSX };".to_string());

    c.push(format!("declare module \"{}\" {{", options.runtime_module));
    c.push("    export namespace JSX {".to_string());
    c.push("        interface IntrinsicElements {".to_string());
    c.extend(modules.iter().map(|m| {
        format!(
            "            \"{}\": LocalJSX.{} & JSXBase.HTMLAttributes<{}>;",
            m.tag_name, m.tag_name_as_pascal, m.html_element_name
        )
    }));
    c.push("        }".to_string());
    c.push("    }".to_string());
    c.push("}".to_string());

    c.join("\n") + "\n"
}
