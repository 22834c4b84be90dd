//! LaTeX flavoured Quarto output.
//!
//! The brand macros (`\BrandHeader`, `\MetaItem`, the `ResourceBlock`
//! environment, the `Ornament*` colours) come from the style file named in
//! the front matter; this module only references them.

use crate::escape::{escape_typeset, typeset_name};
use crate::style::{StyleOptions, front_matter};
use crate::{Category, DocumentHeader, Field, RenderOptions, Resource, Result, Target};
use crate::{category_bullet, format_sources, labels};

/// Opens the small, tight itemize used for category lists inside a cell.
const CATEGORY_LIST_BEGIN: &str = "\\vspace{0.05em}\\footnotesize\\begin{itemize}\\setlength{\\itemsep}{0.15em}\\setlength{\\parskip}{0pt}\\setlength{\\parsep}{0pt}\\setlength{\\topsep}{0pt}\\setlength{\\partopsep}{0pt}";
const CATEGORY_LIST_END: &str = "\\end{itemize}\\normalsize";

const LINE_BREAK: &str = "\\newline ";

struct LatexWriter {
    lines: Vec<String>,
}

impl LatexWriter {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn write_header(&mut self, header: &DocumentHeader<'_>, options: &RenderOptions) -> Result<()> {
        self.line(front_matter(header.title, &options.style, Target::Latex)?);
        self.blank();
        if let Some(image) = options.header_image() {
            self.line(format!("\\BrandHeader{{{image}}}"));
        }
        if let Some(project) = &options.project {
            self.line(format!("\\ProjectTitle{{{}}}", escape_typeset(project)));
        }
        self.line(format!("\\PackageTitle{{{}}}", escape_typeset(header.title)));
        self.blank();
        self.line("\\BrandRuleAccentTop");
        self.line("\\begin{BrandMeta}");
        self.meta_item(labels::TITLE, &escape_typeset(header.title));
        self.meta_item(labels::PACKAGE, &escape_typeset(header.package_name));
        self.meta_item(labels::VERSION, &escape_typeset(header.version));
        let sources = format_sources(header.sources, escape_typeset);
        if !sources.is_empty() {
            self.meta_item(labels::SOURCES, &sources);
        }
        self.line("\\end{BrandMeta}");
        self.line("\\BrandRuleAccentBottom");
        Ok(())
    }

    fn meta_item(&mut self, label: &str, value: &str) {
        self.line(format!("\\MetaItem{{{label}}}{{{value}}}"));
    }

    fn write_resource(
        &mut self,
        resource: &Resource,
        style: &StyleOptions,
        with_title: bool,
    ) -> Result<()> {
        let fields = resource.fields()?;

        self.line("\\begin{ResourceBlock}");
        if with_title {
            self.line(format!(
                "\\section*{{{}}}",
                escape_typeset(resource.display_title())
            ));
        }
        self.blank();
        if !resource.description.is_empty() {
            self.line(format!(
                "\\hyphenpenalty=10000\\exhyphenpenalty=10000\\textit{{{}}}",
                multiline(&resource.description)
            ));
            self.blank();
        }
        self.line("\\vspace{1.2em}");
        let properties = [
            (labels::NAME, &resource.name),
            (labels::TYPE, &resource.kind),
            (labels::PATH, &resource.path),
            (labels::FORMAT, &resource.format),
            (labels::MEDIATYPE, &resource.mediatype),
            (labels::ENCODING, &resource.encoding),
        ];
        let last = properties.len() - 1;
        for (index, (label, value)) in properties.into_iter().enumerate() {
            let terminator = if index == last { "" } else { "\\\\" };
            self.line(format!(
                "\\textbf{{{label}:}} \\texttt{{{}}}{terminator}",
                escape_typeset(value)
            ));
        }
        self.blank();
        self.line("\\vspace{1.2em}");
        self.line(longtable_begin(style));
        self.line(format!(
            "\\rowcolor{{OrnamentLight}} \\textbf{{{}}} & \\textbf{{{}}} & \\textbf{{{}}} \\\\",
            labels::FIELD,
            labels::TYPE,
            labels::DESCRIPTION
        ));
        self.line("\\addlinespace[0.6em]");
        self.line("\\endfirsthead");
        self.line("\\normalfont\\normalsize\\rmfamily");
        for field in fields {
            self.line(field_row(field));
        }
        self.line("\\end{longtable*}");
        self.line("\\end{ResourceBlock}");
        Ok(())
    }
}

fn longtable_begin(style: &StyleOptions) -> String {
    let [name, kind, description] = style.column_widths;
    format!(
        "\\begin{{longtable*}}{{@{{}}>{{\\raggedright\\arraybackslash}}p{{{name:.2}\\linewidth}}>{{\\centering\\arraybackslash}}p{{{kind:.2}\\linewidth}}>{{\\raggedright\\arraybackslash}}p{{{description:.2}\\linewidth}}@{{}}}}"
    )
}

/// Escaped text with source newlines turned into explicit line breaks.
fn multiline(text: &str) -> String {
    escape_typeset(text).replace('\n', LINE_BREAK)
}

fn italic(text: &str) -> String {
    format!("\\textit{{{text}}}")
}

/// `\item` entries for a field's categories, or `None` when no entry
/// yields any text.
pub fn format_categories(categories: &[Category]) -> Option<String> {
    let items = categories
        .iter()
        .filter_map(|category| category_bullet(category, escape_typeset, italic))
        .map(|item| format!("\\item {item}"))
        .collect::<Vec<_>>();
    if items.is_empty() {
        None
    } else {
        Some(items.join(" "))
    }
}

/// One `longtable` row: name, type, description (+ categories).
pub fn field_row(field: &Field) -> String {
    let mut description = multiline(&field.description);
    if let Some(items) = format_categories(&field.categories) {
        let block = format!("{CATEGORY_LIST_BEGIN}{items}{CATEGORY_LIST_END}");
        description = if description.is_empty() {
            block
        } else {
            format!("{description} {block}")
        };
    }
    format!(
        "\\textcolor{{OrnamentDark}}{{\\textbf{{{}}}}} & \\textcolor{{OrnamentDark}}{{{}}} & \\textcolor{{OrnamentDark}}{{{}}} \\\\",
        typeset_name(&field.name),
        escape_typeset(&field.kind),
        description
    )
}

/// Document header for the LaTeX target.
pub fn header(header: &DocumentHeader<'_>, options: &RenderOptions) -> Result<String> {
    let mut writer = LatexWriter::new();
    writer.write_header(header, options)?;
    Ok(writer.finish())
}

/// `ResourceBlock` environment describing one resource.
pub fn resource_block(resource: &Resource, style: &StyleOptions, with_title: bool) -> Result<String> {
    let mut writer = LatexWriter::new();
    writer.write_resource(resource, style, with_title)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatapackageError, Schema, Source};

    fn field(name: &str, kind: &str, description: &str, categories: Vec<Category>) -> Field {
        Field {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            categories,
        }
    }

    fn text(value: &str) -> Category {
        Category::Text(value.to_string())
    }

    #[test]
    fn plain_categories_become_escaped_items() {
        let items = format_categories(&[text("a"), text("b_c")]).expect("categories");
        assert_eq!(items, "\\item a \\item b\\_c");
        assert_eq!(items.matches("\\item ").count(), 2);
    }

    #[test]
    fn labelled_category_is_italic() {
        let items = format_categories(&[Category::Entry {
            value: "1".to_string(),
            label: "Yes".to_string(),
            description: String::new(),
        }])
        .expect("categories");
        assert_eq!(items, "\\item 1: \\textit{Yes}");
    }

    #[test]
    fn empty_categories_emit_nothing() {
        assert_eq!(format_categories(&[]), None);
        assert_eq!(format_categories(&[text("")]), None);
        let row = field_row(&field("x", "string", "desc", vec![text("")]));
        assert!(!row.contains("itemize"));
    }

    #[test]
    fn field_row_escapes_and_colors_cells() {
        let row = field_row(&field("monto_total", "number", "En $ & %", Vec::new()));
        assert_eq!(
            row,
            "\\textcolor{OrnamentDark}{\\textbf{monto\\_\\allowbreak{}total}} & \\textcolor{OrnamentDark}{number} & \\textcolor{OrnamentDark}{En \\$ \\& \\%} \\\\"
        );
    }

    #[test]
    fn field_row_breaks_lines_before_categories() {
        let row = field_row(&field("sexo", "string", "Sexo\nautodeclarado", vec![text("H"), text("M")]));
        assert!(row.contains("Sexo\\newline autodeclarado \\vspace{0.05em}\\footnotesize\\begin{itemize}"));
        assert!(row.contains("\\item H \\item M\\end{itemize}\\normalsize"));
        assert!(!row.contains('\n'));
    }

    #[test]
    fn categories_alone_fill_the_description() {
        let row = field_row(&field("flag", "boolean", "", vec![text("true")]));
        assert!(row.contains("\\textcolor{OrnamentDark}{\\vspace{0.05em}"));
    }

    #[test]
    fn header_lists_metadata_and_optional_branding() {
        let sources = vec![Source::Text("Censo 2020".to_string())];
        let header_info = DocumentHeader {
            title: "Datos & más",
            package_name: "datos_mas",
            version: "1.0",
            sources: &sources,
        };
        let options = RenderOptions::new(Target::Latex, Some("linea".to_string()), Some("Proyecto #1".to_string()));
        let text = header(&header_info, &options).expect("header");
        assert!(text.starts_with("---\n"));
        assert!(text.contains("\\BrandHeader{assets/linea/header.png}"));
        assert!(text.contains("\\ProjectTitle{Proyecto \\#1}"));
        assert!(text.contains("\\PackageTitle{Datos \\& más}"));
        assert!(text.contains("\\MetaItem{Paquete}{datos\\_mas}"));
        assert!(text.contains("\\MetaItem{Versión}{1.0}"));
        assert!(text.contains("\\MetaItem{Fuentes}{Censo 2020}"));

        let bare = header(
            &DocumentHeader { sources: &[], ..header_info },
            &RenderOptions::default(),
        )
        .expect("header");
        assert!(!bare.contains("\\BrandHeader"));
        assert!(!bare.contains("\\ProjectTitle"));
        assert!(!bare.contains("Fuentes"));
    }

    #[test]
    fn resource_block_lists_properties_and_rows() {
        let resource = Resource {
            name: "hogares".to_string(),
            title: "Hogares".to_string(),
            path: "data/hogares.csv".to_string(),
            description: "Un hogar por fila".to_string(),
            schema: Some(Schema {
                fields: Some(vec![field("id", "integer", "Clave", Vec::new())]),
            }),
            ..Resource::default()
        };
        let block = resource_block(&resource, &StyleOptions::default(), true).expect("block");
        let lines = block.lines().collect::<Vec<_>>();
        assert_eq!(lines.first(), Some(&"\\begin{ResourceBlock}"));
        assert_eq!(lines[1], "\\section*{Hogares}");
        assert_eq!(lines.last(), Some(&"\\end{ResourceBlock}"));
        assert!(block.contains("\\textit{Un hogar por fila}"));
        assert!(block.contains("\\textbf{Nombre:} \\texttt{hogares}\\\\"));
        assert!(block.contains("\\textbf{Documento:} \\texttt{data/hogares.csv}\\\\"));
        assert!(block.contains("\\textbf{Codificación:} \\texttt{}\n"));
        assert!(block.contains("p{0.30\\linewidth}"));
        assert!(block.contains("p{0.14\\linewidth}"));
        assert!(block.contains("p{0.52\\linewidth}"));
        assert_eq!(block.matches("\\textcolor{OrnamentDark}{\\textbf{").count(), 1);
    }

    #[test]
    fn resource_block_skips_empty_description() {
        let resource = Resource {
            name: "r".to_string(),
            schema: Some(Schema { fields: Some(Vec::new()) }),
            ..Resource::default()
        };
        let block = resource_block(&resource, &StyleOptions::default(), false).expect("block");
        assert!(!block.contains("\\hyphenpenalty"));
        assert!(!block.contains("\\section*"));
    }

    #[test]
    fn resource_without_schema_is_an_error() {
        let resource = Resource {
            name: "r".to_string(),
            ..Resource::default()
        };
        let err = resource_block(&resource, &StyleOptions::default(), false).expect_err("no schema");
        assert!(matches!(err, DatapackageError::MissingStructure { missing: "schema", .. }));
    }

    #[test]
    fn column_widths_follow_style() {
        let style = StyleOptions {
            column_widths: [0.25, 0.2, 0.5],
            ..StyleOptions::default()
        };
        let begin = longtable_begin(&style);
        assert!(begin.contains("p{0.25\\linewidth}"));
        assert!(begin.contains("p{0.20\\linewidth}"));
        assert!(begin.contains("p{0.50\\linewidth}"));
    }
}
