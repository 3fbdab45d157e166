//! Global compiler context
//!
//! State threaded through the whole pipeline: the string interner and the
//! map of translation-unit sources used for diagnostics.

use crate::ast::SourceId;
use crate::context::Interner;

/// The source text of every translation unit in the compilation, indexed by
/// `SourceId`. Error reports pull the text back out of here.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<(String, String)>,
}

impl SourceMap {
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceId {
        let id = self.files.len();
        self.files.push((name.into(), text.into()));
        id
    }

    pub fn name(&self, id: SourceId) -> &str {
        &self.files[id].0
    }

    pub fn text(&self, id: SourceId) -> &str {
        &self.files[id].1
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &str, &str)> {
        self.files
            .iter()
            .enumerate()
            .map(|(id, (name, text))| (id, name.as_str(), text.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalContext {
    pub interner: Interner,
    pub sources: SourceMap,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self::default()
    }
}
