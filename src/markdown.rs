//! Plain Markdown output: metadata as bullet lists, fields as a pipe table.

use crate::escape::escape_light;
use crate::style::front_matter;
use crate::{Category, DocumentHeader, Field, RenderOptions, Resource, Result, Target};
use crate::{category_bullet, format_sources, labels};

const LINE_BREAK: &str = "<br>";

fn raw(text: &str) -> String {
    text.to_string()
}

fn italic(text: &str) -> String {
    format!("*{text}*")
}

fn code(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("`{text}`")
    }
}

fn bold(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("**{text}**")
    }
}

fn bullet(label: &str, value: &str) -> String {
    format!("- **{label}:** {value}").trim_end().to_string()
}

fn cell(text: &str) -> String {
    escape_light(text).replace("\r\n", "\n").replace('\n', LINE_BREAK)
}

/// `<br>`-separated `•` bullets for a field's categories, or `None` when
/// no entry yields any text.
pub fn format_categories(categories: &[Category]) -> Option<String> {
    let items = categories
        .iter()
        .filter_map(|category| category_bullet(category, cell, italic))
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>();
    if items.is_empty() {
        None
    } else {
        Some(items.join(LINE_BREAK))
    }
}

/// One pipe-table row: name, type, description (+ categories).
pub fn field_row(field: &Field) -> String {
    let mut description = cell(&field.description);
    if let Some(items) = format_categories(&field.categories) {
        description = if description.is_empty() {
            items
        } else {
            format!("{description}{LINE_BREAK}{items}")
        };
    }
    format!(
        "| {} | {} | {} |",
        bold(&cell(&field.name)),
        cell(&field.kind),
        description
    )
}

/// Document header for the Markdown target.
pub fn header(header: &DocumentHeader<'_>, options: &RenderOptions) -> Result<String> {
    let mut lines = vec![front_matter(header.title, &options.style, Target::Markdown)?];
    let mut branding = Vec::new();
    if let Some(image) = options.header_image() {
        branding.push(format!("![]({image})"));
    }
    if let Some(project) = &options.project {
        branding.push(format!("**{}:** {project}", labels::PROJECT));
    }
    if !branding.is_empty() {
        lines.push(String::new());
        lines.push(branding.join("\n\n"));
    }
    lines.push(String::new());
    lines.push(bullet(labels::TITLE, header.title));
    lines.push(bullet(labels::PACKAGE, header.package_name));
    lines.push(bullet(labels::VERSION, header.version));
    let sources = format_sources(header.sources, raw);
    if !sources.is_empty() {
        lines.push(bullet(labels::SOURCES, &sources));
    }
    Ok(lines.join("\n"))
}

/// Section describing one resource.
pub fn resource_block(resource: &Resource, with_title: bool) -> Result<String> {
    let fields = resource.fields()?;

    let mut lines = Vec::new();
    if with_title {
        lines.push(format!("## {}", resource.display_title()));
        lines.push(String::new());
    }
    if !resource.description.is_empty() {
        lines.push(resource.description.clone());
        lines.push(String::new());
    }
    for (label, value) in [
        (labels::NAME, &resource.name),
        (labels::TYPE, &resource.kind),
        (labels::PATH, &resource.path),
        (labels::FORMAT, &resource.format),
        (labels::MEDIATYPE, &resource.mediatype),
        (labels::ENCODING, &resource.encoding),
    ] {
        lines.push(bullet(label, &code(value)));
    }
    lines.push(String::new());
    lines.push(format!(
        "| {} | {} | {} |",
        labels::FIELD,
        labels::TYPE,
        labels::DESCRIPTION
    ));
    lines.push("| --- | --- | --- |".to_string());
    lines.extend(fields.iter().map(field_row));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;

    #[test]
    fn pipes_in_cells_are_escaped() {
        let row = field_row(&Field {
            name: "a|b".to_string(),
            kind: "string".to_string(),
            description: "x | y".to_string(),
            categories: Vec::new(),
        });
        assert_eq!(row, "| **a\\|b** | string | x \\| y |");
    }

    #[test]
    fn newlines_and_categories_use_html_breaks() {
        let row = field_row(&Field {
            name: "estado".to_string(),
            kind: "string".to_string(),
            description: "Estado\ncivil".to_string(),
            categories: vec![
                Category::Text("soltero".to_string()),
                Category::Entry {
                    value: "2".to_string(),
                    label: "Casado".to_string(),
                    description: String::new(),
                },
            ],
        });
        assert_eq!(
            row,
            "| **estado** | string | Estado<br>civil<br>• soltero<br>• 2: *Casado* |"
        );
    }

    #[test]
    fn empty_name_is_not_bolded() {
        let row = field_row(&Field::default());
        assert_eq!(row, "|  |  |  |");
    }

    #[test]
    fn resource_block_has_table_header() {
        let resource = Resource {
            name: "r1".to_string(),
            schema: Some(Schema { fields: Some(Vec::new()) }),
            ..Resource::default()
        };
        let block = resource_block(&resource, true).expect("block");
        assert!(block.starts_with("## r1\n"));
        assert!(block.contains("- **Nombre:** `r1`"));
        assert!(block.contains("- **Tipo:**\n"));
        assert!(block.ends_with("| Campo | Tipo | Descripción |\n| --- | --- | --- |"));
    }

    #[test]
    fn header_uses_plain_bullets() {
        let header_info = DocumentHeader {
            title: "Demo",
            package_name: "demo",
            version: "",
            sources: &[],
        };
        let options = RenderOptions::new(Target::Markdown, Some("linea".to_string()), Some("Censo".to_string()));
        let text = header(&header_info, &options).expect("header");
        assert!(text.contains("![](assets/linea/header.png)"));
        assert!(text.contains("**Proyecto:** Censo"));
        assert!(text.contains("- **Título:** Demo"));
        assert!(text.contains("- **Versión:**"));
        assert!(!text.contains("Fuentes"));
        assert!(!text.contains("linea.tex"));
    }
}
