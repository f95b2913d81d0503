//! Recursive filler for blank resource schemas.
//!
//! A schema document fetched with `schema=blank` has a root element whose
//! single child is the resource wrapper (`<prestashop><category>...`), the
//! wrapper's children being the resource fields. [`fill_schema`] merges a
//! [`SchemaValue`] mapping into that tree and returns the populated copy:
//!
//! ```ignore
//! use pmoprestashop::schema::{fill_schema, FillOptions, SchemaValue};
//!
//! let schema = client.get_blank_schema("categories")?;
//! let mut data = indexmap::IndexMap::new();
//! data.insert("name".to_string(), SchemaValue::from("Spring sale"));
//! data.insert("active".to_string(), SchemaValue::from("1"));
//! let populated = fill_schema(&schema, &data, &FillOptions::prune_unmatched())?;
//! client.add(&RequestOptions::resource("categories")
//!     .with_post_xml(xml::to_xml_string(&populated)?))?;
//! ```
//!
//! The input tree is never mutated; the function works on a clone and
//! returns it.

use indexmap::IndexMap;
use xmltree::{Element, XMLNode};

use crate::errors::{Result, SchemaError};
use crate::xml;

/// Value merged into a schema field.
///
/// The four shapes mirror what the webservice accepts: a scalar leaf, a
/// per-language mapping for multi-language fields, a nested field mapping,
/// and an ordered list replacing a node's repeated children.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaValue {
    Text(String),
    Translations(IndexMap<u32, String>),
    Fields(IndexMap<String, SchemaValue>),
    Items(Vec<SchemaValue>),
}

impl From<&str> for SchemaValue {
    fn from(value: &str) -> Self {
        SchemaValue::Text(value.to_string())
    }
}

impl From<String> for SchemaValue {
    fn from(value: String) -> Self {
        SchemaValue::Text(value)
    }
}

impl SchemaValue {
    /// Multi-language value from `(language id, text)` pairs.
    pub fn translations<S: Into<String>>(pairs: impl IntoIterator<Item = (u32, S)>) -> Self {
        SchemaValue::Translations(
            pairs
                .into_iter()
                .map(|(id, text)| (id, text.into()))
                .collect(),
        )
    }

    /// Nested mapping from `(field name, value)` pairs.
    pub fn fields<S: Into<String>>(pairs: impl IntoIterator<Item = (S, SchemaValue)>) -> Self {
        SchemaValue::Fields(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Ordered list replacing a node's repeated children.
    pub fn items(values: impl IntoIterator<Item = SchemaValue>) -> Self {
        SchemaValue::Items(values.into_iter().collect())
    }
}

/// Post-merge pruning policy, applied to the first level of the resource
/// node only.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Drop every first-level field the data did not mention.
    pub remove_unmatched: bool,
    /// When `remove_unmatched` is unset, drop exactly these fields.
    pub remove_nodes: Vec<String>,
}

impl FillOptions {
    /// Keep only the fields present in the data.
    pub fn prune_unmatched() -> Self {
        FillOptions {
            remove_unmatched: true,
            remove_nodes: Vec::new(),
        }
    }

    /// Keep unmatched fields, dropping only the named ones.
    pub fn remove_nodes<S: Into<String>>(nodes: impl IntoIterator<Item = S>) -> Self {
        FillOptions {
            remove_unmatched: false,
            remove_nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Merge `data` into a blank schema and return the populated document.
///
/// Fails with a structured error when the data names a field the schema
/// does not declare; never performs I/O.
pub fn fill_schema(
    schema: &Element,
    data: &IndexMap<String, SchemaValue>,
    options: &FillOptions,
) -> Result<Element> {
    let mut tree = schema.clone();
    let resource = resource_node_mut(&mut tree)?;

    merge_fields(resource, data)?;
    prune(resource, data, options);

    Ok(tree)
}

/// The resource wrapper is the single element child of the document root.
fn resource_node_mut(root: &mut Element) -> std::result::Result<&mut Element, SchemaError> {
    root.children
        .iter_mut()
        .find_map(|node| match node {
            XMLNode::Element(elem) => Some(elem),
            _ => None,
        })
        .ok_or(SchemaError::MissingResourceNode)
}

fn merge_fields(
    node: &mut Element,
    fields: &IndexMap<String, SchemaValue>,
) -> std::result::Result<(), SchemaError> {
    for (key, value) in fields {
        let child = node
            .get_mut_child(key.as_str())
            .ok_or_else(|| SchemaError::UnknownField(key.clone()))?;

        if child.get_child("language").is_some() {
            fill_language_node(child, key, value)?;
            continue;
        }

        match value {
            SchemaValue::Text(text) => xml::set_element_text(child, text),
            SchemaValue::Fields(nested) => merge_fields(child, nested)?,
            SchemaValue::Items(items) => {
                // Index 0 semantics: the whole repeated-children set is
                // replaced, not appended to.
                child.children.clear();
                append_items(child, key, items)?;
            }
            SchemaValue::Translations(_) => {
                return Err(SchemaError::NotTranslatable(key.clone()));
            }
        }
    }
    Ok(())
}

/// Apply a value to every `<language id="...">` variant of a field.
///
/// A plain text value goes to all variants; a translation mapping is looked
/// up by language id, falling back to the value keyed at id 1.
fn fill_language_node(
    node: &mut Element,
    field: &str,
    value: &SchemaValue,
) -> std::result::Result<(), SchemaError> {
    for child in node.children.iter_mut() {
        let XMLNode::Element(language) = child else {
            continue;
        };
        if language.name != "language" {
            continue;
        }
        let id: u32 = language
            .attributes
            .get("id")
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);

        let text = match value {
            SchemaValue::Text(text) => text.clone(),
            SchemaValue::Translations(map) => map
                .get(&id)
                .or_else(|| map.get(&1))
                .ok_or(SchemaError::MissingDefaultTranslation {
                    field: field.to_string(),
                    language: id,
                })?
                .clone(),
            SchemaValue::Fields(_) | SchemaValue::Items(_) => {
                return Err(SchemaError::NotTranslatable(field.to_string()));
            }
        };
        xml::set_element_text(language, &text);
    }
    Ok(())
}

fn append_items(
    parent: &mut Element,
    field: &str,
    items: &[SchemaValue],
) -> std::result::Result<(), SchemaError> {
    for item in items {
        match item {
            SchemaValue::Fields(entries) => create_children(parent, entries)?,
            // Nested lists flatten into repeated children of the same parent.
            SchemaValue::Items(nested) => append_items(parent, field, nested)?,
            SchemaValue::Text(_) | SchemaValue::Translations(_) => {
                return Err(SchemaError::UnnamedItem(field.to_string()));
            }
        }
    }
    Ok(())
}

fn create_children(
    parent: &mut Element,
    entries: &IndexMap<String, SchemaValue>,
) -> std::result::Result<(), SchemaError> {
    for (name, value) in entries {
        create_named(parent, name, value)?;
    }
    Ok(())
}

fn create_named(
    parent: &mut Element,
    name: &str,
    value: &SchemaValue,
) -> std::result::Result<(), SchemaError> {
    match value {
        SchemaValue::Text(text) => {
            let mut elem = Element::new(name);
            elem.children.push(XMLNode::Text(text.clone()));
            parent.children.push(XMLNode::Element(elem));
        }
        SchemaValue::Fields(entries) => {
            let mut elem = Element::new(name);
            create_children(&mut elem, entries)?;
            parent.children.push(XMLNode::Element(elem));
        }
        SchemaValue::Items(list) => {
            // One sibling named `name` per item.
            for item in list {
                create_named(parent, name, item)?;
            }
        }
        SchemaValue::Translations(_) => {
            return Err(SchemaError::NotTranslatable(name.to_string()));
        }
    }
    Ok(())
}

fn prune(resource: &mut Element, data: &IndexMap<String, SchemaValue>, options: &FillOptions) {
    if options.remove_unmatched {
        resource.children.retain(|node| match node {
            XMLNode::Element(elem) => data.contains_key(elem.name.as_str()),
            _ => true,
        });
    } else {
        for name in &options.remove_nodes {
            while resource.take_child(name.as_str()).is_some() {}
        }
    }
}
