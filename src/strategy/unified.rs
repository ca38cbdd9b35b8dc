//! Unified-frequency strategy: the literal/substring token stream itself is
//! the symbol alphabet of a single arithmetic model.
//!
//! A substring token becomes four symbols: a reserved marker, the length,
//! then the 16-bit distance as two byte-valued symbols (low, high). Length
//! and offset symbols share the byte-value ids, so a single histogram
//! captures the whole token stream.

use crate::coding::arithmetic::{ArithCodeReader, ArithCodeWriter, FrequencyCodeModel};
use crate::error::{DoczipError, Result};
use crate::substring::{SubstringPacker, SubstringUnpacker, TokenConsumer};
use std::io::{Read, Write};

/// Reserved symbol marking the start of a substring reference.
const SUBSTRING_SYMBOL: u16 = 256;

/// 256 byte values, the substring marker, and EOF.
const ALPHABET_SIZE: usize = 256 + 1 + 1;

fn check_token(offset: i32, length: u8) -> Result<u32> {
    if length == 0 {
        return Err(DoczipError::TokenOutOfRange(format!(
            "length {} out of range [1,255]",
            length
        )));
    }
    let distance = -(offset as i64);
    if !(1..=65535).contains(&distance) {
        return Err(DoczipError::TokenOutOfRange(format!(
            "distance {} out of range [1,65535]",
            distance
        )));
    }
    Ok(distance as u32)
}

pub struct UnifiedStrategy {
    model: FrequencyCodeModel,
}

/// Collects the token-stream histogram over the training corpus.
pub struct UnifiedModelBuilder<'d> {
    packer: SubstringPacker<'d>,
    histogram: Vec<u32>,
}

struct HistogramTokens<'a> {
    histogram: &'a mut [u32],
}

impl TokenConsumer for HistogramTokens<'_> {
    fn literal(&mut self, byte: u8) -> Result<()> {
        self.histogram[byte as usize] += 1;
        Ok(())
    }

    fn substring(&mut self, offset: i32, length: u8) -> Result<()> {
        let distance = check_token(offset, length)?;
        self.histogram[SUBSTRING_SYMBOL as usize] += 1;
        self.histogram[length as usize] += 1;
        self.histogram[(distance & 0xff) as usize] += 1;
        self.histogram[(distance >> 8) as usize] += 1;
        Ok(())
    }

    fn end_encoding(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<'d> UnifiedModelBuilder<'d> {
    pub fn new(dictionary: &'d [u8]) -> Self {
        Self {
            packer: SubstringPacker::new(dictionary),
            histogram: vec![0u32; ALPHABET_SIZE],
        }
    }

    /// Tokenizes one training document and histograms its symbol stream.
    pub fn add_document(&mut self, document: &[u8]) -> Result<()> {
        let mut events = HistogramTokens { histogram: &mut self.histogram };
        self.packer.pack(document, &mut events)
    }

    pub fn finish(self) -> UnifiedStrategy {
        // The token alphabet is never treated as fully sampled; unseen
        // symbols go through the escape path.
        UnifiedStrategy { model: FrequencyCodeModel::new(&self.histogram, false) }
    }
}

/// Streams tokens into the arithmetic coder during compression.
struct ArithTokenEncoder<'m, 'o> {
    writer: Option<ArithCodeWriter<'m, &'o mut Vec<u8>>>,
}

impl<'m, 'o> ArithTokenEncoder<'m, 'o> {
    fn writer(&mut self) -> Result<&mut ArithCodeWriter<'m, &'o mut Vec<u8>>> {
        self.writer
            .as_mut()
            .ok_or_else(|| DoczipError::CompressionError("encoder already finished".to_string()))
    }
}

impl TokenConsumer for ArithTokenEncoder<'_, '_> {
    fn literal(&mut self, byte: u8) -> Result<()> {
        self.writer()?.write_symbol(byte as u16)
    }

    fn substring(&mut self, offset: i32, length: u8) -> Result<()> {
        let distance = check_token(offset, length)?;
        let writer = self.writer()?;
        writer.write_symbol(SUBSTRING_SYMBOL)?;
        writer.write_symbol(length as u16)?;
        writer.write_symbol((distance & 0xff) as u16)?;
        writer.write_symbol((distance >> 8) as u16)
    }

    fn end_encoding(&mut self) -> Result<()> {
        self.writer
            .take()
            .ok_or_else(|| DoczipError::CompressionError("encoder already finished".to_string()))?
            .finish()
    }
}

impl UnifiedStrategy {
    pub fn compress(&self, document: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
        let packer = SubstringPacker::new(dictionary);
        let mut out = Vec::new();
        let mut encoder =
            ArithTokenEncoder { writer: Some(ArithCodeWriter::new(&self.model, &mut out)) };
        packer.pack(document, &mut encoder)?;
        Ok(out)
    }

    pub fn decompress(&self, compressed: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
        let mut reader = ArithCodeReader::new(&self.model, compressed)?;
        let mut unpacker = SubstringUnpacker::new(dictionary);

        while let Some(symbol) = reader.read_symbol()? {
            if symbol == SUBSTRING_SYMBOL {
                let length = Self::next_symbol(&mut reader)?;
                let low = Self::next_symbol(&mut reader)?;
                let high = Self::next_symbol(&mut reader)?;
                if length == 0 || length > 255 || low > 255 || high > 255 {
                    return Err(DoczipError::MalformedStream(
                        "substring token symbols out of range".to_string(),
                    ));
                }
                let distance = (low | (high << 8)) as i32;
                if distance == 0 {
                    return Err(DoczipError::MalformedStream(
                        "substring distance of zero".to_string(),
                    ));
                }
                unpacker.substring(-distance, length as u8)?;
            } else if symbol < 256 {
                unpacker.literal(symbol as u8)?;
            } else {
                return Err(DoczipError::MalformedStream(format!(
                    "unexpected symbol {}",
                    symbol
                )));
            }
        }
        unpacker.end_encoding()?;
        Ok(unpacker.into_bytes())
    }

    fn next_symbol<R: Read>(reader: &mut ArithCodeReader<'_, R>) -> Result<u16> {
        reader.read_symbol()?.ok_or_else(|| {
            DoczipError::MalformedStream("stream ended inside a substring token".to_string())
        })
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        self.model.save(out)
    }

    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        let model = FrequencyCodeModel::load(input)?;
        if model.symbol_count() != ALPHABET_SIZE {
            return Err(DoczipError::InvalidFormat(format!(
                "unified model has {} symbols, expected {}",
                model.symbol_count(),
                ALPHABET_SIZE
            )));
        }
        Ok(Self { model })
    }
}
