//! Document providers: a mapping from index to raw bytes, consumed by
//! model training and the CLI surfaces.

use crate::error::Result;
use std::fs;
use std::path::PathBuf;

pub trait DocumentList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<Vec<u8>>;
}

/// In-memory documents.
pub struct ArrayDocumentList {
    documents: Vec<Vec<u8>>,
}

impl ArrayDocumentList {
    pub fn new(documents: Vec<Vec<u8>>) -> Self {
        Self { documents }
    }
}

impl DocumentList for ArrayDocumentList {
    fn len(&self) -> usize {
        self.documents.len()
    }

    fn get(&self, index: usize) -> Result<Vec<u8>> {
        Ok(self.documents[index].clone())
    }
}

/// Documents backed by files, read on demand so large corpora never sit in
/// memory at once.
pub struct FileDocumentList {
    paths: Vec<PathBuf>,
}

impl FileDocumentList {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl DocumentList for FileDocumentList {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn get(&self, index: usize) -> Result<Vec<u8>> {
        Ok(fs::read(&self.paths[index])?)
    }
}
