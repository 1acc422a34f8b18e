//! Per-component declaration blocks
//!
//! Renders the pieces of the aggregate artifact that belong to a single
//! component. Type references are rewritten to the aliases assigned by the
//! `TypeImportTable`, which must already contain every reference of `cmp`.

use crate::domain::entities::{ComponentDescriptor, ComponentMember};

use super::type_imports::{member_renames, rewrite_type_text, TypeImportTable};

/// Rendered declaration blocks for one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesModule {
    pub tag_name: String,
    pub tag_name_as_pascal: String,
    pub html_element_name: String,
    /// Entry in the `Components` namespace
    pub component: String,
    /// Element interface and constructor inside `declare global`
    pub element: String,
    /// Entry in the `LocalJSX` namespace
    pub jsx: String,
}

/// Render the `Components`, element and JSX blocks for `cmp`
pub fn generate_component_types(
    cmp: &ComponentDescriptor,
    table: &TypeImportTable,
    are_types_internal: bool,
    element_base: &str,
) -> TypesModule {
    let pascal = cmp.tag_name_as_pascal();
    let element_name = cmp.html_element_name();

    let mut component = Vec::new();
    component.push(format!("    interface {} {{", pascal));
    for prop in cmp.visible_properties(are_types_internal) {
        push_docs(&mut component, prop.docs.as_deref());
        component.push(member_line(cmp, table, prop, prop.optional));
    }
    for method in cmp.visible_methods(are_types_internal) {
        push_docs(&mut component, method.docs.as_deref());
        component.push(member_line(cmp, table, method, false));
    }
    component.push("    }".to_string());

    let element = generate_element(cmp, table, are_types_internal, &pascal, &element_name, element_base);

    let mut jsx = Vec::new();
    jsx.push(format!("    interface {} {{", pascal));
    for prop in cmp.visible_properties(are_types_internal) {
        push_docs(&mut jsx, prop.docs.as_deref());
        jsx.push(member_line(cmp, table, prop, !prop.required));
    }
    for event in cmp.visible_events(are_types_internal) {
        push_docs(&mut jsx, event.docs.as_deref());
        let renames = member_renames(table, cmp, &event.references);
        jsx.push(format!(
            "        \"{}\"?: (event: {}<{}>) => void;",
            event.handler_name(),
            cmp.custom_event_name(),
            rewrite_type_text(&event.detail_type, &renames)
        ));
    }
    jsx.push("    }".to_string());

    TypesModule {
        tag_name: cmp.tag_name.clone(),
        tag_name_as_pascal: pascal,
        html_element_name: element_name,
        component: component.join("\n"),
        element,
        jsx: jsx.join("\n"),
    }
}

fn generate_element(
    cmp: &ComponentDescriptor,
    table: &TypeImportTable,
    are_types_internal: bool,
    pascal: &str,
    element_name: &str,
    element_base: &str,
) -> String {
    let mut lines = Vec::new();
    let events: Vec<_> = cmp.visible_events(are_types_internal).collect();

    if events.is_empty() {
        lines.push(format!(
            "    interface {} extends Components.{}, {} {{",
            element_name, pascal, element_base
        ));
    } else {
        let event_map = format!("{}EventMap", element_name);
        lines.push(format!("    interface {} {{", event_map));
        for event in &events {
            let renames = member_renames(table, cmp, &event.references);
            lines.push(format!(
                "        \"{}\": {};",
                event.name,
                rewrite_type_text(&event.detail_type, &renames)
            ));
        }
        lines.push("    }".to_string());
        lines.push(format!(
            "    interface {} extends Components.{}, {} {{",
            element_name, pascal, element_base
        ));
        let custom_event = cmp.custom_event_name();
        lines.push(format!(
            "        addEventListener<K extends keyof {map}>(type: K, listener: (this: {el}, ev: {ev}<{map}[K]>) => any, options?: boolean | AddEventListenerOptions): void;",
            map = event_map,
            el = element_name,
            ev = custom_event
        ));
        lines.push(format!(
            "        removeEventListener<K extends keyof {map}>(type: K, listener: (this: {el}, ev: {ev}<{map}[K]>) => any, options?: boolean | EventListenerOptions): void;",
            map = event_map,
            el = element_name,
            ev = custom_event
        ));
    }
    lines.push("    }".to_string());
    lines.push(format!("    var {}: {{", element_name));
    lines.push(format!("        prototype: {};", element_name));
    lines.push(format!("        new (): {};", element_name));
    lines.push("    };".to_string());
    lines.join("\n")
}

/// `CustomEvent` subtype for components that emit events. Only called for
/// components with at least one event.
pub fn generate_event_detail_types(cmp: &ComponentDescriptor) -> String {
    [
        format!(
            "export interface {}<T> extends CustomEvent<T> {{",
            cmp.custom_event_name()
        ),
        "    detail: T;".to_string(),
        format!("    target: {};", cmp.html_element_name()),
        "}".to_string(),
    ]
    .join("\n")
}

fn member_line(
    cmp: &ComponentDescriptor,
    table: &TypeImportTable,
    member: &ComponentMember,
    optional: bool,
) -> String {
    let renames = member_renames(table, cmp, &member.references);
    format!(
        "        \"{}\"{}: {};",
        member.name,
        if optional { "?" } else { "" },
        rewrite_type_text(&member.type_text, &renames)
    )
}

fn push_docs(lines: &mut Vec<String>, docs: Option<&str>) {
    let Some(docs) = docs.map(str::trim).filter(|d| !d.is_empty()) else {
        return;
    };
    lines.push("        /**".to_string());
    for line in docs.lines() {
        lines.push(format!("          * {}", line.trim_end()).trim_end().to_string());
    }
    lines.push("         */".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ComponentEvent, TypeReference};
    use crate::domain::services::type_imports::update_reference_type_imports;

    fn card() -> ComponentDescriptor {
        ComponentDescriptor::new("my-card", "/src/card/card.tsx")
            .with_property(
                ComponentMember::new("item", "Item")
                    .required()
                    .with_docs("The item to show")
                    .with_reference("Item", TypeReference::Local),
            )
            .with_property(ComponentMember::new("dense", "boolean").optional())
            .with_method(ComponentMember::new("refresh", "() => Promise<void>"))
    }

    #[test]
    fn component_block_lists_props_then_methods() {
        let cmp = card();
        let mut table = TypeImportTable::new();
        update_reference_type_imports(&mut table, &cmp, true);
        let module = generate_component_types(&cmp, &table, true, "HTMLHobbesElement");

        assert_eq!(
            module.component,
            [
                "    interface MyCard {",
                "        /**",
                "          * The item to show",
                "         */",
                "        \"item\": Item;",
                "        \"dense\"?: boolean;",
                "        \"refresh\": () => Promise<void>;",
                "    }",
            ]
            .join("\n")
        );
    }

    #[test]
    fn jsx_block_marks_non_required_optional() {
        let cmp = card();
        let table = TypeImportTable::new();
        let module = generate_component_types(&cmp, &table, true, "HTMLHobbesElement");

        assert!(module.jsx.contains("        \"item\": Item;"));
        assert!(module.jsx.contains("        \"dense\"?: boolean;"));
        assert!(!module.jsx.contains("refresh"));
    }

    #[test]
    fn element_without_events_has_no_event_map() {
        let module =
            generate_component_types(&card(), &TypeImportTable::new(), true, "HTMLHobbesElement");
        assert!(module
            .element
            .starts_with("    interface HTMLMyCardElement extends Components.MyCard, HTMLHobbesElement {"));
        assert!(!module.element.contains("EventMap"));
    }

    #[test]
    fn aliased_references_are_rewritten() {
        let other = ComponentDescriptor::new("x-other", "/src/other.tsx").with_property(
            ComponentMember::new("item", "Item").with_reference("Item", TypeReference::Local),
        );
        let cmp = card().with_event(
            ComponentEvent::new("picked", "Item").with_reference("Item", TypeReference::Local),
        );

        let mut table = TypeImportTable::new();
        update_reference_type_imports(&mut table, &other, true);
        update_reference_type_imports(&mut table, &cmp, true);
        let module = generate_component_types(&cmp, &table, true, "HTMLHobbesElement");

        assert!(module.component.contains("\"item\": Item1;"));
        assert!(module.jsx.contains("\"onPicked\"?: (event: MyCardCustomEvent<Item1>) => void;"));
        assert!(module.element.contains("        \"picked\": Item1;"));
    }

    #[test]
    fn event_detail_type_block() {
        assert_eq!(
            generate_event_detail_types(&card()),
            "export interface MyCardCustomEvent<T> extends CustomEvent<T> {\n    detail: T;\n    target: HTMLMyCardElement;\n}"
        );
    }
}
