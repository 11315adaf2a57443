use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Reasons a path cannot be used by a tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainmentError {
    #[error("\"{0}\" is not a valid directory")]
    InvalidRoot(String),

    #[error("\"{0}\" is outside the permitted working directory")]
    PathEscape(String),
}

/// The single directory every tool operation is confined to
///
/// A `Root` can only be obtained through [`Root::new`], so holding one means the
/// directory existed when the session started. The path is stored absolute and
/// lexically normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    path: PathBuf,
}

impl Root {
    /// Validate `dir` and build a root from it
    ///
    /// Relative paths are resolved against the process's current directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ContainmentError> {
        let dir = dir.as_ref();
        let invalid = || ContainmentError::InvalidRoot(dir.display().to_string());

        let absolute = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir().map_err(|_| invalid())?.join(dir)
        };

        if !absolute.is_dir() {
            return Err(invalid());
        }

        Ok(Self {
            path: normalize(&absolute),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a model-supplied path against this root
    ///
    /// `None` resolves to the root itself. Pure path arithmetic: the candidate
    /// is never touched on disk.
    pub fn resolve(&self, candidate: Option<&str>) -> Result<PathBuf, ContainmentError> {
        let target = match candidate {
            None => self.path.clone(),
            Some(raw) => {
                let raw_path = Path::new(raw);
                if raw_path.is_absolute() {
                    normalize(raw_path)
                } else {
                    normalize(&self.path.join(raw_path))
                }
            }
        };

        if common_ancestor(&target, &self.path) != self.path {
            return Err(ContainmentError::PathEscape(
                candidate.unwrap_or_default().to_string(),
            ));
        }

        Ok(target)
    }
}

/// Validate `root` and resolve `candidate` inside it in one step
pub fn resolve(root: impl AsRef<Path>, candidate: Option<&str>) -> Result<PathBuf, ContainmentError> {
    Root::new(root)?.resolve(candidate)
}

/// Drop `.` segments and fold `..` into its parent without consulting the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Longest shared leading run of path components
fn common_ancestor(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(left, right)| left == right)
        .map(|(component, _)| component)
        .collect()
}
