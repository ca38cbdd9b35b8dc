//! Pure-arithmetic strategy: raw document bytes through the arithmetic
//! coder, no substring tokenization. The second baseline back end.

use crate::coding::arithmetic::{ArithCodeReader, ArithCodeWriter, FrequencyCodeModel};
use crate::error::{DoczipError, Result};
use crate::substring::TokenConsumer;
use std::io::{Read, Write};

pub struct PureArithStrategy {
    model: FrequencyCodeModel,
}

pub struct PureArithModelBuilder {
    histogram: Vec<u32>,
}

impl TokenConsumer for PureArithModelBuilder {
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

impl PureArithModelBuilder {
    pub fn new() -> Self {
        Self { histogram: vec![0u32; 256 + 1] }
    }

    pub fn add_document(&mut self, document: &[u8]) -> Result<()> {
        for &byte in document {
            self.literal(byte)?;
        }
        Ok(())
    }

    pub fn finish(self) -> PureArithStrategy {
        PureArithStrategy { model: FrequencyCodeModel::new(&self.histogram, false) }
    }
}

impl Default for PureArithModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PureArithStrategy {
    pub fn compress(&self, document: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut writer = ArithCodeWriter::new(&self.model, &mut out);
        for &byte in document {
            writer.write_symbol(byte as u16)?;
        }
        writer.finish()?;
        Ok(out)
    }

    pub fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut reader = ArithCodeReader::new(&self.model, compressed)?;
        let mut out = Vec::new();
        while let Some(symbol) = reader.read_symbol()? {
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
        Ok(Self { model: FrequencyCodeModel::load(input)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(corpus: &[&[u8]]) -> PureArithStrategy {
        let mut builder = PureArithModelBuilder::new();
        for document in corpus {
            builder.add_document(document).unwrap();
        }
        builder.finish()
    }

    #[test]
    fn test_roundtrip() {
        let document = b"structured records compress well with trained statistics";
        let strategy = build(&[document]);
        let compressed = strategy.compress(document).unwrap();
        assert_eq!(strategy.decompress(&compressed).unwrap(), document);
        assert!(compressed.len() < document.len());
    }

    #[test]
    fn test_untrained_bytes_roundtrip() {
        let strategy = build(&[b"narrow training alphabet"]);
        let document = b"!@#$%^&*() 0123456789 ZYXW";
        let compressed = strategy.compress(document).unwrap();
        assert_eq!(strategy.decompress(&compressed).unwrap(), document);
    }

    #[test]
    fn test_empty_document() {
        let strategy = build(&[b"training"]);
        let compressed = strategy.compress(b"").unwrap();
        assert_eq!(strategy.decompress(&compressed).unwrap(), b"");
    }
}
