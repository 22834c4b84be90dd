//! Literal escaping for the two output targets.

/// Escapes the pipe-table column delimiter.
pub fn escape_light(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Escapes the ten characters LaTeX treats specially.
///
/// Each character is mapped once, so the braces of an inserted
/// `\textbackslash{}` are never escaped again. This is a one-way
/// transform: already escaped input gets its backslashes escaped.
pub fn escape_typeset(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '#' => out.push_str("\\#"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '^' => out.push_str("\\^{}"),
            '~' => out.push_str("\\~{}"),
            _ => out.push(ch),
        }
    }
    out
}

/// Typeset escaping for identifiers, with a break opportunity after every
/// underscore so snake_case names can wrap in narrow table columns.
pub fn typeset_name(text: &str) -> String {
    escape_typeset(text).replace("\\_", "\\_\\allowbreak{}")
}
