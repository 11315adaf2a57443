use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;

use crate::constants::MAX_FILE_CHARS;
use crate::logging::{log_debug, log_warn};

use super::path_guard::Root;
use super::{ToolError, ToolResult};

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryInfo {
    name: String,
    size: u64,
    is_dir: bool,
}

impl EntryInfo {
    fn to_line(&self) -> String {
        format!(
            "{}: file_size={} bytes, is_dir={}",
            self.name, self.size, self.is_dir
        )
    }
}

/// Stat a resolved path, mapping "missing" to `NotFound` for the name the model used
async fn stat(path: &Path, display: &str) -> Result<Metadata, ToolError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ToolError::NotFound(display.to_string())),
        Err(e) => Err(ToolError::io(format!("Cannot access \"{display}\""), e)),
    }
}

/// List the immediate children of `directory` (default: the root)
///
/// One line per entry, sorted by name:
/// `name: file_size=<bytes> bytes, is_dir=<bool>`
pub async fn list_directory(root: &Root, directory: Option<&str>) -> ToolResult {
    let display = directory.unwrap_or(".");
    let path = root
        .resolve(directory)
        .map_err(|e| ToolError::from_containment(e, "list"))?;

    let metadata = stat(&path, display).await?;
    if !metadata.is_dir() {
        return Err(ToolError::NotADirectory(display.to_string()));
    }

    let mut reader = tokio::fs::read_dir(&path)
        .await
        .map_err(|e| ToolError::io(format!("Cannot list \"{display}\""), e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| ToolError::io(format!("Cannot list \"{display}\""), e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => entries.push(EntryInfo {
                name,
                size: meta.len(),
                is_dir: meta.is_dir(),
            }),
            Err(e) => log_warn(&format!("Skipping {name}: {e}")),
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    log_debug(&format!("Listed {} entries in {}", entries.len(), path.display()));

    Ok(entries
        .iter()
        .map(EntryInfo::to_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Read a text file, truncated to `MAX_FILE_CHARS` characters
pub async fn read_file(root: &Root, file_path: &str) -> ToolResult {
    let path = root
        .resolve(Some(file_path))
        .map_err(|e| ToolError::from_containment(e, "read"))?;

    let metadata = stat(&path, file_path).await?;
    if !metadata.is_file() {
        return Err(ToolError::NotAFile(file_path.to_string()));
    }

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ToolError::io(format!("Cannot read \"{file_path}\""), e))?;

    Ok(truncate_content(&content, file_path, MAX_FILE_CHARS))
}

fn truncate_content(content: &str, file_path: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!(
            "{}[...File \"{}\" truncated at {} characters]",
            &content[..cut],
            file_path,
            limit
        ),
        None => content.to_string(),
    }
}

/// Create or overwrite a file; parent directories must already exist
pub async fn write_file(root: &Root, file_path: &str, content: &str) -> ToolResult {
    let path = root
        .resolve(Some(file_path))
        .map_err(|e| ToolError::from_containment(e, "write to"))?;

    tokio::fs::write(&path, content)
        .await
        .map_err(|e| ToolError::io(format!("Cannot write to \"{file_path}\""), e))?;

    Ok(format!(
        "Successfully wrote to \"{}\" ({} characters written)",
        file_path,
        content.chars().count()
    ))
}
