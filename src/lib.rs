#![forbid(unsafe_code)]
//! datapackage-qmd turns a Frictionless datapackage descriptor into Quarto
//! documents: YAML front matter plus LaTeX (or plain Markdown) describing
//! every resource and its fields, ready for a PDF render.
//!
//! # Example
//!
//! ```
//! let json = r#"{"name": "demo", "resources": [
//!     {"name": "r1", "schema": {"fields": [{"name": "id", "type": "integer"}]}}
//! ]}"#;
//! let options = datapackage_qmd::RenderOptions::default();
//! let qmd = datapackage_qmd::convert_json_to_qmd(json, &options)?;
//! assert!(qmd.contains("\\begin{longtable*}"));
//! # Ok::<(), datapackage_qmd::DatapackageError>(())
//! ```

pub mod emit;
pub mod escape;
pub mod latex;
pub mod markdown;
pub mod model;
pub mod style;

pub use emit::{Document, render_documents, write_documents};
pub use model::{Category, Field, Package, Resource, Schema, Source, parse_json, parse_yaml};
pub use style::StyleOptions;

use tracing::debug;

/// Labels printed in the generated documents.
pub(crate) mod labels {
    pub const TITLE: &str = "Título";
    pub const PACKAGE: &str = "Paquete";
    pub const VERSION: &str = "Versión";
    pub const SOURCES: &str = "Fuentes";
    pub const PROJECT: &str = "Proyecto";
    pub const NAME: &str = "Nombre";
    pub const TYPE: &str = "Tipo";
    pub const PATH: &str = "Documento";
    pub const FORMAT: &str = "Formato";
    pub const MEDIATYPE: &str = "Extensión";
    pub const ENCODING: &str = "Codificación";
    pub const FIELD: &str = "Campo";
    pub const DESCRIPTION: &str = "Descripción";
}

#[derive(Debug, thiserror::Error)]
pub enum DatapackageError {
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error: {0}")]
    Json(String),
    #[error("yaml parse error: {0}")]
    Yaml(String),
    #[error("malformed datapackage: {0}")]
    Malformed(String),
    #[error("resource '{resource}' has no {missing}")]
    MissingStructure {
        resource: String,
        missing: &'static str,
    },
    #[error("no resources found in datapackage")]
    NoResources,
    #[error("front matter error: {0}")]
    FrontMatter(String),
}

pub type Result<T> = std::result::Result<T, DatapackageError>;

/// Markup flavour of the generated documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    /// LaTeX fragments inside Quarto, relying on the brand style file.
    #[default]
    Latex,
    /// Plain Markdown with pipe tables.
    Markdown,
}

/// Output granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One document for the whole package.
    #[default]
    Combined,
    /// One `<resource-name>.qmd` per resource.
    PerResource,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub target: Target,
    /// Brand key; the header image is `assets/<identity>/header.png`.
    pub identity: Option<String>,
    pub project: Option<String>,
    pub style: StyleOptions,
}

impl RenderOptions {
    /// Blank `identity`/`project` values are treated as unset.
    pub fn new(target: Target, identity: Option<String>, project: Option<String>) -> Self {
        Self {
            target,
            identity: non_blank(identity),
            project: non_blank(project),
            style: StyleOptions::default(),
        }
    }

    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    pub(crate) fn header_image(&self) -> Option<String> {
        self.identity
            .as_deref()
            .map(|identity| format!("assets/{identity}/header.png"))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Inputs of the document header shared by both output modes.
#[derive(Debug, Clone, Copy)]
pub struct DocumentHeader<'a> {
    pub title: &'a str,
    pub package_name: &'a str,
    pub version: &'a str,
    pub sources: &'a [Source],
}

impl<'a> DocumentHeader<'a> {
    /// Header for the whole package.
    pub fn for_package(package: &'a Package) -> Self {
        Self {
            title: package.display_title(),
            package_name: &package.name,
            version: &package.version,
            sources: &package.sources,
        }
    }

    /// Header for a document holding a single resource of `package`.
    pub fn for_resource(package: &'a Package, resource: &'a Resource) -> Self {
        Self {
            title: resource.display_title(),
            ..Self::for_package(package)
        }
    }
}

/// Joins the usable source labels with `; `, escaping each one.
/// Returns an empty string when no entry has a label.
pub fn format_sources(sources: &[Source], escape: fn(&str) -> String) -> String {
    sources
        .iter()
        .filter_map(|source| {
            let label = source.label();
            if label.is_none() {
                debug!("dropping source without a usable label: {source:?}");
            }
            label
        })
        .map(escape)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Text of one category bullet: `value: <label>` with the label passed
/// through `italic`, then ` — description`. `None` when nothing is left.
pub(crate) fn category_bullet(
    category: &Category,
    escape: fn(&str) -> String,
    italic: fn(&str) -> String,
) -> Option<String> {
    let item = match category {
        Category::Text(text) => escape(text),
        Category::Entry {
            value,
            label,
            description,
        } => {
            let mut item = escape(value);
            if !label.is_empty() {
                let label = italic(&escape(label));
                item = if item.is_empty() {
                    label
                } else {
                    format!("{item}: {label}")
                };
            }
            if !description.is_empty() {
                let description = escape(description);
                item = if item.is_empty() {
                    description
                } else {
                    format!("{item} — {description}")
                };
            }
            item
        }
    };
    if item.is_empty() {
        debug!("dropping empty category entry");
        None
    } else {
        Some(item)
    }
}

/// Renders the document header (front matter, brand directives, metadata).
pub fn render_header(header: &DocumentHeader<'_>, options: &RenderOptions) -> Result<String> {
    match options.target {
        Target::Latex => latex::header(header, options),
        Target::Markdown => markdown::header(header, options),
    }
}

/// Renders one resource block. `with_title` adds a section heading
/// naming the resource.
pub fn render_resource(
    resource: &Resource,
    options: &RenderOptions,
    with_title: bool,
) -> Result<String> {
    debug!("rendering resource '{}'", resource.display_name());
    match options.target {
        Target::Latex => latex::resource_block(resource, &options.style, with_title),
        Target::Markdown => markdown::resource_block(resource, with_title),
    }
}

/// The whole package as one document.
pub fn render_combined(package: &Package, options: &RenderOptions) -> Result<String> {
    let mut parts = vec![render_header(&DocumentHeader::for_package(package), options)?];
    for resource in &package.resources {
        parts.push(render_resource(resource, options, true)?);
    }
    Ok(finish_document(parts))
}

/// A standalone document for one resource, titled after the resource.
pub fn render_resource_document(
    package: &Package,
    resource: &Resource,
    options: &RenderOptions,
) -> Result<String> {
    let header = render_header(&DocumentHeader::for_resource(package, resource), options)?;
    let block = render_resource(resource, options, false)?;
    Ok(finish_document(vec![header, block]))
}

fn finish_document(parts: Vec<String>) -> String {
    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

/// Converts a JSON descriptor into a single combined document.
pub fn convert_json_to_qmd(json: &str, options: &RenderOptions) -> Result<String> {
    let package = parse_json(json)?;
    render_combined(&package, options)
}

/// Converts a YAML descriptor into a single combined document.
pub fn convert_yaml_to_qmd(yaml: &str, options: &RenderOptions) -> Result<String> {
    let package = parse_yaml(yaml)?;
    render_combined(&package, options)
}
