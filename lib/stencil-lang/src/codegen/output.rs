//! Generated output tree
//!
//! The generator produces files into memory first; writing to disk is a
//! separate step so a compilation that fails late leaves nothing behind.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::ast::Loc;
use crate::error::{CompileError, CompileErrorKind};

#[derive(Debug, Default)]
pub struct OutputTree {
    files: IndexMap<PathBuf, String>,
}

impl OutputTree {
    pub fn insert(&mut self, path: PathBuf, contents: String) -> Result<(), CompileError> {
        if self.files.contains_key(&path) {
            return Err(CompileError::internal(
                "codegen",
                format!("duplicate output file {}", path.display()),
                Loc::generated(),
            ));
        }
        self.files.insert(path, contents);
        Ok(())
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `root`, creating directories as needed.
    /// Refuses to overwrite existing files unless `force` is set.
    pub fn write_to(&self, root: &Path, force: bool) -> Result<(), CompileError> {
        for (path, contents) in &self.files {
            let target = root.join(path);

            if !force && target.exists() {
                return Err(CompileError::new(
                    CompileErrorKind::OverwriteRefused {
                        path: target.display().to_string(),
                    },
                    Loc::generated(),
                ));
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| io_error(&target, e))?;
            }
            std::fs::write(&target, contents).map_err(|e| io_error(&target, e))?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CompileError {
    CompileError::new(
        CompileErrorKind::Io(format!("{}: {}", path.display(), err)),
        Loc::generated(),
    )
}
