//! Detokenizer: replays literal and back-reference events into raw bytes
//! against a dictionary.

use crate::error::{DoczipError, Result};
use crate::substring::packer::TokenConsumer;

/// Accumulates decoded output. The dictionary logically precedes the
/// output, so a negative offset may resolve into the dictionary tail and a
/// reference may straddle the boundary.
pub struct SubstringUnpacker<'d> {
    dictionary: &'d [u8],
    output: Vec<u8>,
}

impl<'d> SubstringUnpacker<'d> {
    pub fn new(dictionary: &'d [u8]) -> Self {
        Self { dictionary, output: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.output
    }
}

impl TokenConsumer for SubstringUnpacker<'_> {
    fn literal(&mut self, byte: u8) -> Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn substring(&mut self, offset: i32, length: u8) -> Result<()> {
        let length = length as usize;
        let current = self.output.len() as i64;
        let start = current + offset as i64;

        if start >= 0 {
            if start >= current {
                return Err(DoczipError::MalformedStream(format!(
                    "substring offset {} references unwritten output",
                    offset
                )));
            }
            // Entirely within produced output. Copying one byte at a time
            // lets an overlapping reference replicate a repeating pattern.
            let start = start as usize;
            for k in 0..length {
                let byte = self.output[start + k];
                self.output.push(byte);
            }
        } else {
            let dict_start = start + self.dictionary.len() as i64;
            if dict_start < 0 {
                return Err(DoczipError::MalformedStream(format!(
                    "substring offset {} reaches before the dictionary",
                    offset
                )));
            }
            let dict_start = dict_start as usize;
            let from_dictionary = length.min(self.dictionary.len() - dict_start);
            self.output
                .extend_from_slice(&self.dictionary[dict_start..dict_start + from_dictionary]);
            // A reference running past the dictionary's end continues from
            // the start of the output: dictionary-then-output is one
            // continuous address space.
            for k in 0..length - from_dictionary {
                let byte = self.output[k];
                self.output.push(byte);
            }
        }
        Ok(())
    }

    fn end_encoding(&mut self) -> Result<()> {
        Ok(())
    }
}
