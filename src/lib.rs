//! # doczip
//!
//! Dictionary-assisted compression for collections of small, structurally
//! similar documents (JSON or XML records sharing keys and boilerplate).
//!
//! General-purpose compressors perform poorly on tiny inputs because they
//! cannot amortize a statistical model per document. doczip instead trains
//! a shared model once, from a sample corpus and/or an explicit dictionary,
//! and reuses it across many short, independently compressed documents.
//!
//! ## Features
//!
//! - **Shared dictionary**: back-references resolve into a dictionary that
//!   logically precedes every document, so common boilerplate costs a few
//!   bits instead of being repeated per document
//! - **Trained entropy coding**: canonical Huffman and arithmetic back
//!   ends with learned symbol statistics and bit-exact round-trips
//! - **Automatic dictionary inference**: substrings repeated across the
//!   training corpus are discovered and packed when no dictionary is given
//! - **Durable models**: build once, persist, and share read-only across
//!   threads while serving
//!
//! ## Quick Start
//!
//! ```rust
//! use doczip::{ArrayDocumentList, CompressionModel, DoczipConfig};
//!
//! let corpus = ArrayDocumentList::new(vec![
//!     b"{\"name\": \"alpha\", \"value\": 1}".to_vec(),
//!     b"{\"name\": \"beta\", \"value\": 2}".to_vec(),
//!     b"{\"name\": \"gamma\", \"value\": 3}".to_vec(),
//! ]);
//! let config = DoczipConfig::default();
//! let model = CompressionModel::build(&corpus, None, &config).unwrap();
//!
//! let document = b"{\"name\": \"delta\", \"value\": 4}";
//! let compressed = model.compress(document).unwrap();
//! assert!(compressed.len() < document.len());
//! assert_eq!(model.decompress(&compressed).unwrap(), document);
//! ```
//!
//! ## Choosing a strategy
//!
//! ```rust
//! use doczip::{ArrayDocumentList, CompressionModel, DoczipConfig, EncodingKind};
//!
//! let corpus = ArrayDocumentList::new(vec![b"sample sample sample".to_vec()]);
//!
//! // Baseline without substring modeling, for comparison.
//! let config = DoczipConfig::default().with_encoding(EncodingKind::PureHuffman);
//! let model = CompressionModel::build(&corpus, None, &config).unwrap();
//! let compressed = model.compress(b"sample text").unwrap();
//! assert_eq!(model.decompress(&compressed).unwrap(), b"sample text");
//! ```

pub mod cli;
pub mod coding;
pub mod config;
pub mod dict;
pub mod docs;
pub mod error;
pub mod model;
pub mod strategy;
pub mod substring;

// Re-export commonly used types for convenience
pub use config::{DoczipConfig, EncodingKind, MAX_DICTIONARY_LENGTH};
pub use docs::{ArrayDocumentList, DocumentList, FileDocumentList};
pub use error::{DoczipError, Result};
pub use model::CompressionModel;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
