//! Property tests for the declaration aggregator.

use std::collections::HashSet;
use std::path::Path;

use proptest::prelude::*;

use hobbes::domain::entities::{ComponentDescriptor, ComponentMember, TypeReference};
use hobbes::domain::services::{generate_component_types_file, AppTypesOptions};

const TYPE_NAMES: [&str; 3] = ["Item", "Row", "Cell"];

fn reference(kind: usize) -> TypeReference {
    match kind {
        0 => TypeReference::Local,
        1 => TypeReference::Import {
            path: "../models".to_string(),
        },
        2 => TypeReference::Import {
            path: "./types".to_string(),
        },
        _ => TypeReference::Import {
            path: "@lib/shared".to_string(),
        },
    }
}

fn components() -> impl Strategy<Value = Vec<ComponentDescriptor>> {
    let member = ("[a-z]{1,4}", 0..TYPE_NAMES.len(), 0..4usize);
    let tags = proptest::collection::btree_set("[a-z]{1,5}", 1..5);
    tags.prop_flat_map(move |tags| {
        let count = tags.len();
        (
            Just(tags),
            proptest::collection::vec(proptest::collection::vec(member.clone(), 0..4), count),
        )
    })
    .prop_map(|(tags, members)| {
        tags.into_iter()
            .zip(members)
            .map(|(tag, members)| {
                let mut cmp = ComponentDescriptor::new(
                    format!("x-{}", tag),
                    format!("/proj/src/{}/{}.tsx", tag, tag),
                );
                for (name, type_index, kind) in members {
                    let type_name = TYPE_NAMES[type_index];
                    cmp = cmp.with_property(
                        ComponentMember::new(name, format!("{}[]", type_name))
                            .with_reference(type_name, reference(kind)),
                    );
                }
                cmp
            })
            .collect()
    })
}

fn render(components: &[ComponentDescriptor]) -> String {
    let options = AppTypesOptions {
        import_base_dir: Path::new("/proj/src"),
        runtime_module: "@hobbes/core",
        element_base: "HTMLHobbesElement",
        are_types_internal: true,
    };
    generate_component_types_file(components, &options)
}

/// `(specifier, [(name, alias)])` for every project import statement
fn imports(artifact: &str) -> Vec<(String, Vec<(String, String)>)> {
    artifact
        .lines()
        .filter(|line| line.starts_with("import { ") && !line.contains("JSXBase"))
        .map(|line| {
            let open = line.find("{ ").unwrap() + 2;
            let close = line.find(" }").unwrap();
            let names = line[open..close]
                .split(", ")
                .map(|part| match part.split_once(" as ") {
                    Some((name, alias)) => (name.to_string(), alias.to_string()),
                    None => (part.to_string(), part.to_string()),
                })
                .collect();
            let spec_start = line.find("from \"").unwrap() + 6;
            let specifier = line[spec_start..line.len() - 2].to_string();
            (specifier, names)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: identical input renders byte-identical output.
    #[test]
    fn property_render_is_deterministic(components in components()) {
        prop_assert_eq!(render(&components), render(&components));
    }

    /// PROPERTY: every declaring source has one import statement, and no two
    /// imported types share an alias.
    #[test]
    fn property_aliases_are_unique(components in components()) {
        let artifact = render(&components);
        let imports = imports(&artifact);

        let mut specifiers = HashSet::new();
        let mut aliases = HashSet::new();
        for (specifier, names) in &imports {
            prop_assert!(specifiers.insert(specifier.clone()), "duplicate import of {}", specifier);
            for (_, alias) in names {
                prop_assert!(aliases.insert(alias.clone()), "duplicate alias {}", alias);
            }
        }
    }

    /// PROPERTY: every component appears in the tag map exactly once.
    #[test]
    fn property_every_tag_is_mapped(components in components()) {
        let artifact = render(&components);

        for cmp in &components {
            let entry = format!("        \"{}\": {};", cmp.tag_name, cmp.html_element_name());
            prop_assert_eq!(artifact.matches(&entry).count(), 1);
        }
    }
}
