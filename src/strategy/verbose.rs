//! Verbose strategy: tokens rendered as readable text, literals verbatim
//! and substrings as `<offset,length>` markers.
//!
//! A diagnostic back end, not a compressor: it has no model to train or
//! persist, but satisfies the same contract so the orchestrator stays
//! polymorphic over strategies.

use crate::error::{DoczipError, Result};
use crate::substring::{SubstringPacker, SubstringUnpacker, TokenConsumer};

pub struct VerboseStrategy;

struct TextTokenEncoder {
    out: Vec<u8>,
}

impl TokenConsumer for TextTokenEncoder {
    fn literal(&mut self, byte: u8) -> Result<()> {
        self.out.push(byte);
        Ok(())
    }

    fn substring(&mut self, offset: i32, length: u8) -> Result<()> {
        if length == 0 || !(-65535..=-1).contains(&offset) {
            return Err(DoczipError::TokenOutOfRange(format!(
                "substring ({},{}) out of range",
                offset, length
            )));
        }
        self.out.extend_from_slice(format!("<{},{}>", offset, length).as_bytes());
        Ok(())
    }

    fn end_encoding(&mut self) -> Result<()> {
        Ok(())
    }
}

impl VerboseStrategy {
    pub fn compress(&self, document: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
        let packer = SubstringPacker::new(dictionary);
        let mut encoder = TextTokenEncoder { out: Vec::new() };
        packer.pack(document, &mut encoder)?;
        Ok(encoder.out)
    }

    pub fn decompress(&self, compressed: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
        let mut unpacker = SubstringUnpacker::new(dictionary);
        let mut position = 0;
        while position < compressed.len() {
            if compressed[position] == b'<' {
                let close = compressed[position..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map(|i| position + i)
                    .ok_or_else(|| {
                        DoczipError::MalformedStream("unterminated substring marker".to_string())
                    })?;
                let marker = std::str::from_utf8(&compressed[position + 1..close])
                    .map_err(|_| bad_marker())?;
                let (offset, length) = marker.split_once(',').ok_or_else(bad_marker)?;
                let offset: i32 = offset.parse().map_err(|_| bad_marker())?;
                let length: u8 = length.parse().map_err(|_| bad_marker())?;
                unpacker.substring(offset, length)?;
                position = close + 1;
            } else {
                unpacker.literal(compressed[position])?;
                position += 1;
            }
        }
        unpacker.end_encoding()?;
        Ok(unpacker.into_bytes())
    }
}

fn bad_marker() -> DoczipError {
    DoczipError::MalformedStream("invalid substring marker".to_string())
}
