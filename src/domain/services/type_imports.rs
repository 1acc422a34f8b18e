//! Type import table
//!
//! Collects every externally declared type referenced by component members
//! and assigns each `(declaring source, name)` pair an alias that is unique
//! across the whole generated artifact. The table is pass-scoped: build a
//! new one for every artifact.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::entities::{ComponentDescriptor, TypeReference};
use crate::domain::value_objects::{normalize_path, resolve_path};

/// Where an imported type is declared
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportSource {
    /// A project file, by normalized absolute path
    File(PathBuf),
    /// A bare package specifier
    Module(String),
}

impl ImportSource {
    /// Resolve a member's type reference as seen from `cmp`'s source file.
    /// Global references have no import source.
    pub fn for_reference(cmp: &ComponentDescriptor, reference: &TypeReference) -> Option<Self> {
        match reference {
            TypeReference::Local => Some(ImportSource::File(normalize_path(&cmp.source_file_path))),
            TypeReference::Import { path } if is_relative_specifier(path) => {
                Some(ImportSource::File(resolve_path(cmp.source_dir(), Path::new(path))))
            }
            TypeReference::Import { path } => Some(ImportSource::Module(path.clone())),
            TypeReference::Global => None,
        }
    }
}

fn is_relative_specifier(path: &str) -> bool {
    path.starts_with("./") || path.starts_with("../") || path == "." || path == ".."
}

/// One imported name and the alias it is bound to in the artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeImport {
    pub original_name: String,
    pub alias: String,
}

impl TypeImport {
    pub fn is_aliased(&self) -> bool {
        self.original_name != self.alias
    }

    /// `Name` or `Name as Alias`
    pub fn render(&self) -> String {
        if self.is_aliased() {
            format!("{} as {}", self.original_name, self.alias)
        } else {
            self.original_name.clone()
        }
    }
}

/// Stable ordering for names inside one import statement
pub fn sort_import_names(a: &TypeImport, b: &TypeImport) -> std::cmp::Ordering {
    a.original_name
        .cmp(&b.original_name)
        .then_with(|| a.alias.cmp(&b.alias))
}

/// Mapping from declaring source to the names imported from it
#[derive(Debug, Default, Clone)]
pub struct TypeImportTable {
    imports: BTreeMap<ImportSource, Vec<TypeImport>>,
    taken: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl TypeImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table where `names` can never be assigned as aliases
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for name in names {
            table.reserve(name);
        }
        table
    }

    /// Keep `name` out of the alias space (globals, runtime imports)
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Insert `(source, name)` and return its alias. Inserting an existing
    /// pair returns the alias it already has.
    pub fn insert(&mut self, source: ImportSource, name: &str) -> String {
        if let Some(alias) = self.alias_of(&source, name) {
            return alias.to_string();
        }
        let alias = self.next_alias(name);
        self.imports.entry(source).or_default().push(TypeImport {
            original_name: name.to_string(),
            alias: alias.clone(),
        });
        alias
    }

    pub fn alias_of(&self, source: &ImportSource, name: &str) -> Option<&str> {
        self.imports
            .get(source)?
            .iter()
            .find(|import| import.original_name == name)
            .map(|import| import.alias.as_str())
    }

    fn next_alias(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let suffix = self.suffixes.entry(name.to_string()).or_insert(0);
        loop {
            *suffix += 1;
            let candidate = format!("{}{}", name, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of distinct `(source, name)` entries
    pub fn len(&self) -> usize {
        self.imports.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Sources in stable order, each with its imports sorted by name
    pub fn sorted_imports(&self) -> Vec<(&ImportSource, Vec<&TypeImport>)> {
        self.imports
            .iter()
            .map(|(source, imports)| {
                let mut sorted: Vec<&TypeImport> = imports.iter().collect();
                sorted.sort_by(|a, b| sort_import_names(a, b));
                (source, sorted)
            })
            .collect()
    }
}

/// Record every reference made by `cmp`'s visible members, in member order
/// (properties, methods, events).
pub fn update_reference_type_imports(
    table: &mut TypeImportTable,
    cmp: &ComponentDescriptor,
    internal: bool,
) {
    let member_refs = cmp
        .visible_properties(internal)
        .map(|m| &m.references)
        .chain(cmp.visible_methods(internal).map(|m| &m.references))
        .chain(cmp.visible_events(internal).map(|e| &e.references));

    for references in member_refs {
        for (name, reference) in references {
            if let Some(source) = ImportSource::for_reference(cmp, reference) {
                table.insert(source, name);
            }
        }
    }
}

/// Global type names referenced anywhere in `components`
pub fn global_type_names<'a>(
    components: impl IntoIterator<Item = &'a ComponentDescriptor>,
) -> Vec<String> {
    let mut names = Vec::new();
    for cmp in components {
        let all_refs = cmp
            .properties
            .iter()
            .map(|m| &m.references)
            .chain(cmp.methods.iter().map(|m| &m.references))
            .chain(cmp.events.iter().map(|e| &e.references));
        for references in all_refs {
            for (name, reference) in references {
                if *reference == TypeReference::Global && !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}

/// Alias map for one member's references
pub fn member_renames(
    table: &TypeImportTable,
    cmp: &ComponentDescriptor,
    references: &BTreeMap<String, TypeReference>,
) -> HashMap<String, String> {
    references
        .iter()
        .filter_map(|(name, reference)| {
            let source = ImportSource::for_reference(cmp, reference)?;
            let alias = table.alias_of(&source, name)?;
            (alias != name).then(|| (name.clone(), alias.to_string()))
        })
        .collect()
}

/// Replace standalone identifiers in `text` using `renames`. Property
/// accesses (`a.Name`) and string literal contents are left alone.
pub fn rewrite_type_text(text: &str, renames: &HashMap<String, String>) -> String {
    if renames.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut quote: Option<char> = None;
    let mut prev_significant: Option<char> = None;

    while i < chars.len() {
        let c = chars[i];

        if let Some(q) = quote {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == q {
                quote = None;
                prev_significant = Some(c);
            }
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' || c == '`' {
            quote = Some(c);
            out.push(c);
            i += 1;
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            match renames.get(&ident) {
                Some(alias) if prev_significant != Some('.') => out.push_str(alias),
                _ => out.push_str(&ident),
            }
            prev_significant = chars.get(i - 1).copied();
            continue;
        }

        out.push(c);
        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
        i += 1;
    }

    out
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ComponentMember;

    fn file(path: &str) -> ImportSource {
        ImportSource::File(PathBuf::from(path))
    }

    #[test]
    fn first_use_keeps_name() {
        let mut table = TypeImportTable::new();
        assert_eq!(table.insert(file("/src/a.ts"), "Item"), "Item");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn same_pair_is_idempotent() {
        let mut table = TypeImportTable::new();
        table.insert(file("/src/a.ts"), "Item");
        assert_eq!(table.insert(file("/src/a.ts"), "Item"), "Item");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn same_name_different_file_gets_suffix() {
        let mut table = TypeImportTable::new();
        assert_eq!(table.insert(file("/src/a.ts"), "Item"), "Item");
        assert_eq!(table.insert(file("/src/b.ts"), "Item"), "Item1");
        assert_eq!(table.insert(file("/src/c.ts"), "Item"), "Item2");
    }

    #[test]
    fn suffix_skips_names_already_taken() {
        let mut table = TypeImportTable::new();
        table.insert(file("/src/x.ts"), "Item1");
        table.insert(file("/src/a.ts"), "Item");
        assert_eq!(table.insert(file("/src/b.ts"), "Item"), "Item2");
    }

    #[test]
    fn reserved_names_are_never_aliases() {
        let mut table = TypeImportTable::with_reserved(["JSXBase"]);
        assert_eq!(table.insert(file("/src/a.ts"), "JSXBase"), "JSXBase1");
    }

    #[test]
    fn sorted_imports_order_names() {
        let mut table = TypeImportTable::new();
        table.insert(file("/src/a.ts"), "Zed");
        table.insert(file("/src/a.ts"), "Alpha");
        let sorted = table.sorted_imports();
        let names: Vec<_> = sorted[0].1.iter().map(|i| i.original_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zed"]);
    }

    #[test]
    fn relative_import_resolves_against_source_dir() {
        let cmp = ComponentDescriptor::new("x-a", "/proj/src/components/a/a.tsx");
        let reference = TypeReference::Import {
            path: "../../utils/types".to_string(),
        };
        assert_eq!(
            ImportSource::for_reference(&cmp, &reference),
            Some(file("/proj/src/utils/types"))
        );
    }

    #[test]
    fn bare_import_stays_module() {
        let cmp = ComponentDescriptor::new("x-a", "/proj/src/a.tsx");
        let reference = TypeReference::Import {
            path: "@acme/models".to_string(),
        };
        assert_eq!(
            ImportSource::for_reference(&cmp, &reference),
            Some(ImportSource::Module("@acme/models".to_string()))
        );
    }

    #[test]
    fn update_skips_globals_and_internal_members() {
        let cmp = ComponentDescriptor::new("x-a", "/src/a.tsx")
            .with_property(
                ComponentMember::new("el", "HTMLElement")
                    .with_reference("HTMLElement", TypeReference::Global),
            )
            .with_property(
                ComponentMember::new("hidden", "Secret")
                    .internal()
                    .with_reference("Secret", TypeReference::Local),
            );

        let mut public = TypeImportTable::new();
        update_reference_type_imports(&mut public, &cmp, false);
        assert!(public.is_empty());

        let mut internal = TypeImportTable::new();
        update_reference_type_imports(&mut internal, &cmp, true);
        assert_eq!(internal.len(), 1);
    }

    #[test]
    fn rewrite_replaces_whole_identifiers_only() {
        let renames = HashMap::from([("Item".to_string(), "Item1".to_string())]);
        assert_eq!(
            rewrite_type_text("Item[] | ItemList | Record<string, Item>", &renames),
            "Item1[] | ItemList | Record<string, Item1>"
        );
    }

    #[test]
    fn rewrite_leaves_member_access_and_strings() {
        let renames = HashMap::from([("Item".to_string(), "Item1".to_string())]);
        assert_eq!(
            rewrite_type_text("ns.Item | \"Item\"", &renames),
            "ns.Item | \"Item\""
        );
    }
}
