//! Turning a package into files on disk.

use crate::{
    DatapackageError, OutputMode, Package, RenderOptions, Result, render_combined,
    render_resource_document,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extension of every generated document.
pub const EXTENSION: &str = "qmd";

/// A rendered document and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pub contents: String,
}

/// Renders every document `mode` calls for, without touching the disk.
///
/// `output` is the document path in combined mode and the destination
/// directory in per-resource mode. A structural error in any resource
/// fails the whole call, so nothing is written for a half-valid package.
pub fn render_documents(
    package: &Package,
    options: &RenderOptions,
    mode: OutputMode,
    output: &Path,
) -> Result<Vec<Document>> {
    match mode {
        OutputMode::Combined => Ok(vec![Document {
            path: output.to_path_buf(),
            contents: render_combined(package, options)?,
        }]),
        OutputMode::PerResource => {
            if package.resources.is_empty() {
                return Err(DatapackageError::NoResources);
            }
            let mut seen = HashSet::new();
            package
                .resources
                .iter()
                .map(|resource| -> Result<Document> {
                    let stem = file_stem(resource.display_name())?;
                    if !seen.insert(stem) {
                        return Err(DatapackageError::Malformed(format!(
                            "duplicate resource name '{stem}'"
                        )));
                    }
                    Ok(Document {
                        path: output.join(format!("{stem}.{EXTENSION}")),
                        contents: render_resource_document(package, resource, options)?,
                    })
                })
                .collect()
        }
    }
}

/// A resource name used as a file stem must stay inside the output directory.
fn file_stem(name: &str) -> Result<&str> {
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(DatapackageError::Malformed(format!(
            "resource name '{name}' cannot be used as a file name"
        )));
    }
    Ok(name)
}

/// Writes `documents` as UTF-8, creating missing directories and
/// replacing existing files. `on_written` is called after each write.
pub fn write_documents<F>(documents: &[Document], mut on_written: F) -> Result<()>
where
    F: FnMut(&Path),
{
    for document in documents {
        if let Some(parent) = document
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|source| DatapackageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&document.path, &document.contents).map_err(|source| DatapackageError::Io {
            path: document.path.clone(),
            source,
        })?;
        info!("wrote {}", document.path.display());
        on_written(&document.path);
    }
    Ok(())
}
