//! Page styling knobs and the YAML front matter built from them.

use crate::{DatapackageError, Result, Target};
use yaml_rust2::{Yaml, YamlEmitter, yaml::Hash};

/// The only engine the generated LaTeX fragments are written for.
pub const PDF_ENGINE: &str = "lualatex";

#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    pub document_class: String,
    pub font_size: String,
    /// Page margins, e.g. `top=0.75in`.
    pub geometry: Vec<String>,
    pub linestretch: f64,
    pub colorlinks: bool,
    /// LaTeX file defining the brand macros used by the typeset target.
    pub include_in_header: String,
    /// Field table column widths as fractions of `\linewidth`.
    pub column_widths: [f64; 3],
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            document_class: "scrartcl".to_string(),
            font_size: "11pt".to_string(),
            geometry: ["top=0.75in", "bottom=0.75in", "left=1in", "right=1in"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            linestretch: 1.2,
            colorlinks: true,
            include_in_header: "linea.tex".to_string(),
            column_widths: [0.30, 0.14, 0.52],
        }
    }
}

fn key(name: &str) -> Yaml {
    Yaml::String(name.to_string())
}

/// Renders the `---` delimited front matter block for a document titled
/// `title`. The title is written raw; YAML quoting is left to the emitter.
pub fn front_matter(title: &str, style: &StyleOptions, target: Target) -> Result<String> {
    let mut pdf = Hash::new();
    pdf.insert(key("toc"), Yaml::Boolean(false));
    pdf.insert(key("number-sections"), Yaml::Boolean(false));
    pdf.insert(key("documentclass"), Yaml::String(style.document_class.clone()));
    pdf.insert(key("pdf-engine"), Yaml::String(PDF_ENGINE.to_string()));
    pdf.insert(key("fontsize"), Yaml::String(style.font_size.clone()));
    pdf.insert(
        key("geometry"),
        Yaml::Array(style.geometry.iter().cloned().map(Yaml::String).collect()),
    );
    pdf.insert(key("linestretch"), Yaml::Real(style.linestretch.to_string()));
    pdf.insert(key("colorlinks"), Yaml::Boolean(style.colorlinks));
    if target == Target::Latex && !style.include_in_header.is_empty() {
        pdf.insert(
            key("include-in-header"),
            Yaml::Array(vec![Yaml::String(style.include_in_header.clone())]),
        );
    }

    let mut format = Hash::new();
    format.insert(key("pdf"), Yaml::Hash(pdf));

    let mut root = Hash::new();
    root.insert(key("title"), Yaml::String(title.to_string()));
    root.insert(key("format"), Yaml::Hash(format));

    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&Yaml::Hash(root))
        .map_err(|err| DatapackageError::FrontMatter(err.to_string()))?;
    out.push_str("\n---");
    Ok(out)
}
