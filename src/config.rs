use crate::error::DoczipError;
use std::str::FromStr;

/// Maximum dictionary size. Back-reference distances are capped at 64 KiB,
/// so bytes further from the document start can never be referenced.
pub const MAX_DICTIONARY_LENGTH: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingKind {
    /// Substring tokens and literals share one arithmetic model.
    Unified,
    /// Raw bytes through a canonical Huffman coder, no tokenization.
    PureHuffman,
    /// Raw bytes through the arithmetic coder, no tokenization.
    PureArith,
    /// Tokens rendered as readable text, for diagnostics.
    Verbose,
}

impl EncodingKind {
    pub fn name(&self) -> &'static str {
        match self {
            EncodingKind::Unified => "unified",
            EncodingKind::PureHuffman => "pure-huffman",
            EncodingKind::PureArith => "pure-arith",
            EncodingKind::Verbose => "verbose",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoczipConfig {
    pub encoding: EncodingKind,
    pub max_dictionary: usize,
}

impl Default for DoczipConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingKind::Unified,
            max_dictionary: MAX_DICTIONARY_LENGTH,
        }
    }
}

impl DoczipConfig {
    pub fn with_encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }
}

impl FromStr for EncodingKind {
    type Err = DoczipError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unified" => Ok(EncodingKind::Unified),
            "pure-huffman" | "huffman" => Ok(EncodingKind::PureHuffman),
            "pure-arith" | "arith" => Ok(EncodingKind::PureArith),
            "verbose" => Ok(EncodingKind::Verbose),
            _ => Err(DoczipError::ConfigError(format!("Invalid encoding: {}", s))),
        }
    }
}
