//! Pure-Huffman strategy: raw document bytes through the canonical Huffman
//! coder, no substring tokenization. A baseline for measuring the value of
//! substring modeling.

use crate::coding::huffman::{FrequencyHuffmanModel, HuffmanDecoder, HuffmanEncoder};
use crate::error::{DoczipError, Result};
use crate::substring::TokenConsumer;
use std::io::{Read, Write};

pub struct PureHuffmanStrategy {
    model: FrequencyHuffmanModel,
}

/// Literal-only histogram builder. This strategy never tokenizes, so a
/// substring event can only mean a strategy/tokenizer mismatch.
pub struct PureHuffmanModelBuilder {
    histogram: Vec<u32>,
}

impl TokenConsumer for PureHuffmanModelBuilder {
    fn literal(&mut self, byte: u8) -> Result<()> {
        self.histogram[byte as usize] += 1;
        Ok(())
    }

    fn substring(&mut self, _offset: i32, _length: u8) -> Result<()> {
        Err(DoczipError::UnsupportedToken(
            "literal-only model builder received a substring event".to_string(),
        ))
    }

    fn end_encoding(&mut self) -> Result<()> {
        Ok(())
    }
}

impl PureHuffmanModelBuilder {
    pub fn new() -> Self {
        Self { histogram: vec![0u32; 256 + 1] }
    }

    pub fn add_document(&mut self, document: &[u8]) -> Result<()> {
        for &byte in document {
            self.literal(byte)?;
        }
        // One EOF per document keeps the terminator's weight realistic.
        let eof = self.histogram.len() - 1;
        self.histogram[eof] += 1;
        Ok(())
    }

    pub fn finish(self) -> PureHuffmanStrategy {
        PureHuffmanStrategy { model: FrequencyHuffmanModel::new(&self.histogram, false) }
    }
}

impl Default for PureHuffmanModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PureHuffmanStrategy {
    pub fn compress(&self, document: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut encoder = HuffmanEncoder::new(&self.model, &mut out);
        for &byte in document {
            encoder.encode_symbol(byte as u16)?;
        }
        encoder.finish()?;
        Ok(out)
    }

    pub fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = HuffmanDecoder::new(&self.model, compressed);
        let mut out = Vec::new();
        while let Some(symbol) = decoder.decode_symbol()? {
            if symbol > 255 {
                return Err(DoczipError::MalformedStream(format!(
                    "unexpected symbol {}",
                    symbol
                )));
            }
            out.push(symbol as u8);
        }
        Ok(out)
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        self.model.save(out)
    }

    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        Ok(Self { model: FrequencyHuffmanModel::load(input)? })
    }
}
