//! Read-only projection of a datapackage descriptor.
//!
//! The descriptor is parsed into a generic JSON tree first (YAML input is
//! converted to the same tree) and then read once into typed records with
//! every optional attribute defaulted. Nothing here enforces a schema;
//! only impossible shapes (a resource list that is not a list, an object
//! where text is expected) are rejected.

use crate::{DatapackageError, Result};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use tracing::debug;
use yaml_rust2::{Yaml, YamlLoader};

/// Document title used when a package has neither `title` nor `name`.
pub const DEFAULT_PACKAGE_TITLE: &str = "Paquete de datos";

/// Name used for resources that carry no `name`.
pub const DEFAULT_RESOURCE_NAME: &str = "resource";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub name: String,
    pub title: String,
    pub version: String,
    pub sources: Vec<Source>,
    pub resources: Vec<Resource>,
}

impl Package {
    /// `title`, falling back to `name`, then to [`DEFAULT_PACKAGE_TITLE`].
    pub fn display_title(&self) -> &str {
        first_non_empty(&[&self.title, &self.name]).unwrap_or(DEFAULT_PACKAGE_TITLE)
    }
}

/// One entry of `sources`.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Text(String),
    Record {
        title: String,
        name: String,
        path: String,
        url: String,
    },
}

impl Source {
    /// The display label, or `None` when the entry has nothing usable.
    pub fn label(&self) -> Option<&str> {
        match self {
            Source::Text(text) => first_non_empty(&[text]),
            Source::Record {
                title,
                name,
                path,
                url,
            } => first_non_empty(&[title, name, path, url]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub name: String,
    pub title: String,
    pub kind: String,
    pub path: String,
    pub format: String,
    pub mediatype: String,
    pub encoding: String,
    pub description: String,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub fields: Option<Vec<Field>>,
}

impl Resource {
    /// `name`, falling back to [`DEFAULT_RESOURCE_NAME`].
    pub fn display_name(&self) -> &str {
        first_non_empty(&[&self.name]).unwrap_or(DEFAULT_RESOURCE_NAME)
    }

    /// `title`, falling back to the display name.
    pub fn display_title(&self) -> &str {
        first_non_empty(&[&self.title]).unwrap_or_else(|| self.display_name())
    }

    /// The field list. A resource without `schema.fields` cannot be
    /// described, so this fails instead of yielding an empty table.
    pub fn fields(&self) -> Result<&[Field]> {
        let missing = match &self.schema {
            None => "schema",
            Some(Schema { fields: None }) => "schema.fields",
            Some(Schema {
                fields: Some(fields),
            }) => return Ok(fields.as_slice()),
        };
        Err(DatapackageError::MissingStructure {
            resource: self.display_name().to_string(),
            missing,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub categories: Vec<Category>,
}

/// A permitted value of a categorical field.
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    Text(String),
    Entry {
        value: String,
        label: String,
        description: String,
    },
}

fn first_non_empty<'a>(candidates: &[&'a String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|value| value.as_str())
        .find(|value| !value.is_empty())
}

/// Parses a JSON descriptor.
pub fn parse_json(input: &str) -> Result<Package> {
    let root: JsonValue =
        serde_json::from_str(input).map_err(|err| DatapackageError::Json(err.to_string()))?;
    package_from_value(&root)
}

/// Parses a YAML descriptor (`datapackage.yaml`).
pub fn parse_yaml(input: &str) -> Result<Package> {
    let docs =
        YamlLoader::load_from_str(input).map_err(|err| DatapackageError::Yaml(err.to_string()))?;
    let document = docs
        .first()
        .ok_or_else(|| DatapackageError::Yaml("empty yaml document".to_string()))?;
    package_from_value(&yaml_to_json(document))
}

/// Reads typed records out of an already parsed descriptor tree.
pub fn package_from_value(root: &JsonValue) -> Result<Package> {
    let map = ensure_object(root, "datapackage root")?;
    let resources = map_get_array(map, "resources")?
        .unwrap_or(&[])
        .iter()
        .enumerate()
        .map(|(index, value)| resource_from_value(value, index))
        .collect::<Result<Vec<_>>>()?;
    Ok(Package {
        name: map_get_text(map, "name")?,
        title: map_get_text(map, "title")?,
        version: map_get_text(map, "version")?,
        sources: sources_from_value(map.get("sources"))?,
        resources,
    })
}

fn resource_from_value(value: &JsonValue, index: usize) -> Result<Resource> {
    let map = ensure_object(value, &format!("resources[{index}]"))?;
    let schema = match map.get("schema") {
        None | Some(JsonValue::Null) => None,
        Some(schema) => {
            let schema = ensure_object(schema, &format!("resources[{index}].schema"))?;
            let fields = match map_get_array(schema, "fields")? {
                Some(fields) => Some(
                    fields
                        .iter()
                        .enumerate()
                        .map(|(field_index, field)| {
                            field_from_value(
                                field,
                                &format!("resources[{index}].schema.fields[{field_index}]"),
                            )
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                None => None,
            };
            Some(Schema { fields })
        }
    };
    Ok(Resource {
        name: map_get_text(map, "name")?,
        title: map_get_text(map, "title")?,
        kind: map_get_text(map, "type")?,
        path: map_get_text(map, "path")?,
        format: map_get_text(map, "format")?,
        mediatype: map_get_text(map, "mediatype")?,
        encoding: map_get_text(map, "encoding")?,
        description: map_get_text(map, "description")?,
        schema,
    })
}

fn field_from_value(value: &JsonValue, context: &str) -> Result<Field> {
    let map = ensure_object(value, context)?;
    Ok(Field {
        name: map_get_text(map, "name")?,
        kind: map_get_text(map, "type")?,
        description: map_get_text(map, "description")?,
        categories: categories_from_value(map.get("categories"), context)?,
    })
}

fn categories_from_value(value: Option<&JsonValue>, context: &str) -> Result<Vec<Category>> {
    let Some(JsonValue::Array(entries)) = value else {
        if let Some(other) = value.filter(|value| !value.is_null()) {
            debug!(
                "ignoring {context}.categories: expected sequence, found {}",
                json_type_name(other)
            );
        }
        return Ok(Vec::new());
    };
    let mut categories = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            JsonValue::Object(map) => categories.push(Category::Entry {
                value: map_get_text(map, "value")?,
                label: map_get_text(map, "label")?,
                description: map_get_text(map, "description")?,
            }),
            JsonValue::Null => {}
            other => categories.push(Category::Text(scalar_text(other, "categories")?)),
        }
    }
    Ok(categories)
}

fn sources_from_value(value: Option<&JsonValue>) -> Result<Vec<Source>> {
    match value {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::String(text)) => Ok(vec![Source::Text(text.clone())]),
        Some(JsonValue::Array(entries)) => {
            let mut sources = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    JsonValue::String(text) => sources.push(Source::Text(text.clone())),
                    JsonValue::Object(map) => sources.push(Source::Record {
                        title: map_get_text(map, "title")?,
                        name: map_get_text(map, "name")?,
                        path: map_get_text(map, "path")?,
                        url: map_get_text(map, "url")?,
                    }),
                    other => debug!("ignoring source entry of type {}", json_type_name(other)),
                }
            }
            Ok(sources)
        }
        Some(other) => Err(DatapackageError::Malformed(format!(
            "expected string or sequence for key 'sources', found {}",
            json_type_name(other)
        ))),
    }
}

fn ensure_object<'a>(value: &'a JsonValue, context: &str) -> Result<&'a JsonMap<String, JsonValue>> {
    value.as_object().ok_or_else(|| {
        DatapackageError::Malformed(format!(
            "expected mapping for {context}, found {}",
            json_type_name(value)
        ))
    })
}

/// Text of an optional scalar attribute; missing and `null` are empty.
fn map_get_text(map: &JsonMap<String, JsonValue>, key: &str) -> Result<String> {
    match map.get(key) {
        None => Ok(String::new()),
        Some(value) => scalar_text(value, key),
    }
}

fn map_get_array<'a>(map: &'a JsonMap<String, JsonValue>, key: &str) -> Result<Option<&'a [JsonValue]>> {
    match map.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Array(values)) => Ok(Some(values.as_slice())),
        Some(other) => Err(DatapackageError::Malformed(format!(
            "expected sequence for key '{key}', found {}",
            json_type_name(other)
        ))),
    }
}

fn scalar_text(value: &JsonValue, key: &str) -> Result<String> {
    match value {
        JsonValue::Null => Ok(String::new()),
        JsonValue::String(text) => Ok(text.clone()),
        JsonValue::Bool(flag) => Ok(flag.to_string()),
        JsonValue::Number(number) => Ok(number.to_string()),
        JsonValue::Array(values) => {
            let parts = values
                .iter()
                .map(|value| match value {
                    JsonValue::Array(_) | JsonValue::Object(_) => {
                        Err(DatapackageError::Malformed(format!(
                            "expected scalar items for key '{key}', found {}",
                            json_type_name(value)
                        )))
                    }
                    scalar => scalar_text(scalar, key),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join(", "))
        }
        JsonValue::Object(_) => Err(DatapackageError::Malformed(format!(
            "expected text for key '{key}', found mapping"
        ))),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "sequence",
        JsonValue::Object(_) => "mapping",
    }
}

fn yaml_to_json(value: &Yaml) -> JsonValue {
    match value {
        Yaml::Null | Yaml::BadValue => JsonValue::Null,
        Yaml::Boolean(value) => JsonValue::Bool(*value),
        Yaml::Integer(value) => JsonValue::Number(JsonNumber::from(*value)),
        // Keep the literal spelling ("1.0" stays "1.0") since reals are shown, not computed.
        Yaml::Real(value) => JsonValue::String(value.clone()),
        Yaml::String(value) => JsonValue::String(value.clone()),
        Yaml::Array(values) => JsonValue::Array(values.iter().map(yaml_to_json).collect()),
        Yaml::Hash(map) => {
            let mut out = JsonMap::new();
            for (key, value) in map.iter() {
                let key = match key {
                    Yaml::String(key) | Yaml::Real(key) => key.clone(),
                    Yaml::Integer(key) => key.to_string(),
                    Yaml::Boolean(key) => key.to_string(),
                    _ => continue,
                };
                out.insert(key, yaml_to_json(value));
            }
            JsonValue::Object(out)
        }
        Yaml::Alias(alias) => JsonValue::String(format!("*{alias}")),
    }
}
