//! Component descriptor entity
//!
//! One descriptor per compiled component module, produced by the front-end
//! and consumed read-only by the declaration aggregator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a type referenced from a member signature is declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "location", rename_all = "lowercase")]
pub enum TypeReference {
    /// Exported from the component's own source file
    Local,
    /// Imported by the component's source file from `path`. Relative paths
    /// are relative to the source file's directory; bare specifiers name a
    /// package.
    Import { path: String },
    /// Ambient type, never imported
    Global,
}

/// A property or method on a component's public surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMember {
    pub name: String,
    /// Signature text as written in source, e.g. `Item[]` or `(id: string) => Promise<void>`
    #[serde(rename = "type")]
    pub type_text: String,
    #[serde(default)]
    pub optional: bool,
    /// Required when used as a JSX attribute
    #[serde(default)]
    pub required: bool,
    /// Hidden from declarations generated outside the source tree
    #[serde(default)]
    pub internal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default)]
    pub references: BTreeMap<String, TypeReference>,
}

/// An event a component emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEvent {
    /// DOM event name, e.g. `cardSelected`
    pub name: String,
    /// Type of `CustomEvent.detail`
    #[serde(rename = "detail")]
    pub detail_type: String,
    #[serde(default)]
    pub internal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default)]
    pub references: BTreeMap<String, TypeReference>,
}

/// Compiled metadata for one component module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub tag_name: String,
    pub source_file_path: PathBuf,
    /// Vendored from a dependency; excluded from the aggregate
    #[serde(default)]
    pub is_collection_dependency: bool,
    #[serde(default)]
    pub properties: Vec<ComponentMember>,
    #[serde(default)]
    pub methods: Vec<ComponentMember>,
    #[serde(default)]
    pub events: Vec<ComponentEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ComponentDescriptor {
    /// Create a descriptor with no members
    pub fn new(tag_name: impl Into<String>, source_file_path: impl Into<PathBuf>) -> Self {
        Self {
            tag_name: tag_name.into(),
            source_file_path: source_file_path.into(),
            is_collection_dependency: false,
            properties: Vec::new(),
            methods: Vec::new(),
            events: Vec::new(),
            docs: None,
        }
    }

    pub fn with_property(mut self, member: ComponentMember) -> Self {
        self.properties.push(member);
        self
    }

    pub fn with_method(mut self, member: ComponentMember) -> Self {
        self.methods.push(member);
        self
    }

    pub fn with_event(mut self, event: ComponentEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn as_dependency(mut self) -> Self {
        self.is_collection_dependency = true;
        self
    }

    /// `my-card` -> `MyCard`
    pub fn tag_name_as_pascal(&self) -> String {
        dash_to_pascal_case(&self.tag_name)
    }

    /// `my-card` -> `HTMLMyCardElement`
    pub fn html_element_name(&self) -> String {
        format!("HTML{}Element", self.tag_name_as_pascal())
    }

    /// `my-card` -> `MyCardCustomEvent`
    pub fn custom_event_name(&self) -> String {
        format!("{}CustomEvent", self.tag_name_as_pascal())
    }

    /// Directory containing the component's source file
    pub fn source_dir(&self) -> &Path {
        self.source_file_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Members visible in declarations of the given audience
    pub fn visible_properties(&self, internal: bool) -> impl Iterator<Item = &ComponentMember> {
        self.properties.iter().filter(move |m| internal || !m.internal)
    }

    pub fn visible_methods(&self, internal: bool) -> impl Iterator<Item = &ComponentMember> {
        self.methods.iter().filter(move |m| internal || !m.internal)
    }

    pub fn visible_events(&self, internal: bool) -> impl Iterator<Item = &ComponentEvent> {
        self.events.iter().filter(move |e| internal || !e.internal)
    }
}

impl ComponentMember {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            optional: false,
            required: false,
            internal: false,
            docs: None,
            references: BTreeMap::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn with_reference(mut self, name: impl Into<String>, reference: TypeReference) -> Self {
        self.references.insert(name.into(), reference);
        self
    }
}

impl ComponentEvent {
    pub fn new(name: impl Into<String>, detail_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail_type: detail_type.into(),
            internal: false,
            docs: None,
            references: BTreeMap::new(),
        }
    }

    pub fn with_reference(mut self, name: impl Into<String>, reference: TypeReference) -> Self {
        self.references.insert(name.into(), reference);
        self
    }

    /// JSX handler attribute: `cardSelected` -> `onCardSelected`
    pub fn handler_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
            None => "on".to_string(),
        }
    }
}

/// Convert a dash-case tag to PascalCase
pub fn dash_to_pascal_case(s: &str) -> String {
    s.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
