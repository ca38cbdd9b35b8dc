//! Encoding strategies: compression back ends pairing a tokenization choice
//! with an entropy coder.
//!
//! The set is closed and selected by configuration at construction time.
//! Every variant satisfies the same contract: model-construction hooks fed
//! by the training corpus, save/load of the learned model, and
//! compress/decompress of individual documents against the shared
//! dictionary.

pub mod pure_arith;
pub mod pure_huffman;
pub mod unified;
pub mod verbose;

use crate::config::EncodingKind;
use crate::docs::DocumentList;
use crate::error::Result;
use std::io::{Read, Write};

pub use pure_arith::PureArithStrategy;
pub use pure_huffman::PureHuffmanStrategy;
pub use unified::UnifiedStrategy;
pub use verbose::VerboseStrategy;

pub enum EncodingStrategy {
    Unified(UnifiedStrategy),
    PureHuffman(PureHuffmanStrategy),
    PureArith(PureArithStrategy),
    Verbose(VerboseStrategy),
}

impl EncodingStrategy {
    pub fn kind(&self) -> EncodingKind {
        match self {
            EncodingStrategy::Unified(_) => EncodingKind::Unified,
            EncodingStrategy::PureHuffman(_) => EncodingKind::PureHuffman,
            EncodingStrategy::PureArith(_) => EncodingKind::PureArith,
            EncodingStrategy::Verbose(_) => EncodingKind::Verbose,
        }
    }

    /// Streams the training corpus through the strategy's
    /// model-construction hooks and produces the trained strategy.
    pub fn build(
        kind: EncodingKind,
        dictionary: &[u8],
        documents: &dyn DocumentList,
    ) -> Result<Self> {
        match kind {
            EncodingKind::Unified => {
                let mut builder = unified::UnifiedModelBuilder::new(dictionary);
                for index in 0..documents.len() {
                    builder.add_document(&documents.get(index)?)?;
                }
                Ok(EncodingStrategy::Unified(builder.finish()))
            }
            EncodingKind::PureHuffman => {
                let mut builder = pure_huffman::PureHuffmanModelBuilder::new();
                for index in 0..documents.len() {
                    builder.add_document(&documents.get(index)?)?;
                }
                Ok(EncodingStrategy::PureHuffman(builder.finish()))
            }
            EncodingKind::PureArith => {
                let mut builder = pure_arith::PureArithModelBuilder::new();
                for index in 0..documents.len() {
                    builder.add_document(&documents.get(index)?)?;
                }
                Ok(EncodingStrategy::PureArith(builder.finish()))
            }
            EncodingKind::Verbose => Ok(EncodingStrategy::Verbose(VerboseStrategy)),
        }
    }

    pub fn compress(&self, document: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
        match self {
            EncodingStrategy::Unified(strategy) => strategy.compress(document, dictionary),
            EncodingStrategy::PureHuffman(strategy) => strategy.compress(document),
            EncodingStrategy::PureArith(strategy) => strategy.compress(document),
            EncodingStrategy::Verbose(strategy) => strategy.compress(document, dictionary),
        }
    }

    pub fn decompress(&self, compressed: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
        match self {
            EncodingStrategy::Unified(strategy) => strategy.decompress(compressed, dictionary),
            EncodingStrategy::PureHuffman(strategy) => strategy.decompress(compressed),
            EncodingStrategy::PureArith(strategy) => strategy.decompress(compressed),
            EncodingStrategy::Verbose(strategy) => strategy.decompress(compressed, dictionary),
        }
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        match self {
            EncodingStrategy::Unified(strategy) => strategy.save(out),
            EncodingStrategy::PureHuffman(strategy) => strategy.save(out),
            EncodingStrategy::PureArith(strategy) => strategy.save(out),
            EncodingStrategy::Verbose(_) => Ok(()),
        }
    }

    pub fn load<R: Read>(kind: EncodingKind, input: &mut R) -> Result<Self> {
        match kind {
            EncodingKind::Unified => Ok(EncodingStrategy::Unified(UnifiedStrategy::load(input)?)),
            EncodingKind::PureHuffman => {
                Ok(EncodingStrategy::PureHuffman(PureHuffmanStrategy::load(input)?))
            }
            EncodingKind::PureArith => {
                Ok(EncodingStrategy::PureArith(PureArithStrategy::load(input)?))
            }
            EncodingKind::Verbose => Ok(EncodingStrategy::Verbose(VerboseStrategy)),
        }
    }
}
