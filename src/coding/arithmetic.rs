//! Frequency-table arithmetic coding.
//!
//! The coder narrows a bounded-precision interval per symbol and renormalizes
//! by shifting out determined high-order bits, tracking underflow bits while
//! the interval straddles the midpoint. A trained `FrequencyCodeModel` maps
//! symbols to cumulative-count intervals; when the training sample did not
//! cover the alphabet, an escape entry routes unseen symbols through a
//! uniform fallback code over the regular (non-EOF) symbol range.

use crate::coding::bits::{BitReader, BitWriter};
use crate::error::{DoczipError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

const CODE_VALUE_BITS: u32 = 27;
const TOP_VALUE: u64 = (1 << CODE_VALUE_BITS) - 1;
const FIRST_QUARTER: u64 = TOP_VALUE / 4 + 1;
const HALF: u64 = 2 * FIRST_QUARTER;
const THIRD_QUARTER: u64 = 3 * FIRST_QUARTER;

/// Largest cumulative total the interval arithmetic can carry without the
/// per-symbol range collapsing to zero. Histograms from large corpora are
/// scaled down to fit.
const MAX_TOTAL: u32 = 1 << 24;

/// Cumulative-frequency table over an alphabet whose last slot is EOF,
/// with an optional trailing escape entry for unsampled alphabets.
pub struct FrequencyCodeModel {
    counts: Vec<u32>,
    cumulative: Vec<u32>,
    all_symbols_sampled: bool,
}

impl FrequencyCodeModel {
    /// Builds the table from a histogram whose last slot is reserved for
    /// EOF (its trained count is ignored; EOF always has weight one).
    pub fn new(histogram: &[u32], all_symbols_sampled: bool) -> Self {
        let mut counts = histogram.to_vec();
        let eof = counts.len() - 1;
        counts[eof] = 1;

        loop {
            let total: u64 = counts.iter().map(|&c| c as u64).sum::<u64>() + 1;
            if total <= MAX_TOTAL as u64 {
                break;
            }
            for count in counts.iter_mut() {
                if *count > 1 {
                    *count /= 2;
                }
            }
        }

        let mut cumulative = Vec::with_capacity(counts.len() + 2);
        cumulative.push(0u32);
        for &count in &counts {
            cumulative.push(cumulative.last().unwrap() + count);
        }
        if !all_symbols_sampled {
            cumulative.push(cumulative.last().unwrap() + 1);
        }

        Self { counts, cumulative, all_symbols_sampled }
    }

    pub fn symbol_count(&self) -> usize {
        self.counts.len()
    }

    fn eof_slot(&self) -> usize {
        self.counts.len() - 1
    }

    /// Number of regular symbols the uniform escape fallback ranges over
    /// (the alphabet minus EOF; exactly 256 for byte alphabets).
    fn regular_count(&self) -> u32 {
        (self.counts.len() - 1) as u32
    }

    fn total(&self) -> u32 {
        *self.cumulative.last().unwrap()
    }

    fn interval(&self, slot: usize) -> (u32, u32, u32) {
        (self.cumulative[slot], self.cumulative[slot + 1], self.total())
    }

    /// Maps a cumulative count back to its slot by binary search.
    fn slot_for_count(&self, count: u32) -> usize {
        self.cumulative[1..].partition_point(|&upper| upper <= count)
    }

    fn escaped(&self, symbol: usize) -> bool {
        !self.all_symbols_sampled && self.counts[symbol] == 0
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u8(self.all_symbols_sampled as u8)?;
        out.write_u32::<LittleEndian>(self.counts.len() as u32)?;
        for &count in &self.counts {
            out.write_u32::<LittleEndian>(count)?;
        }
        Ok(())
    }

    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        let all_symbols_sampled = match input.read_u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(DoczipError::InvalidFormat(format!(
                    "invalid sampling flag {}",
                    other
                )))
            }
        };
        let symbols = input.read_u32::<LittleEndian>()? as usize;
        if symbols < 2 {
            return Err(DoczipError::InvalidFormat("frequency table too small".to_string()));
        }
        let mut counts = vec![0u32; symbols];
        for count in counts.iter_mut() {
            *count = input.read_u32::<LittleEndian>()?;
        }
        Ok(Self::new(&counts, all_symbols_sampled))
    }
}

/// Interval state for one encode call. No hidden global state; one instance
/// per stream, never shared.
struct ArithEncoder<W: Write> {
    low: u64,
    high: u64,
    pending: u32,
    bits: BitWriter<W>,
}

impl<W: Write> ArithEncoder<W> {
    fn new(out: W) -> Self {
        Self { low: 0, high: TOP_VALUE, pending: 0, bits: BitWriter::new(out) }
    }

    fn encode(&mut self, low_count: u32, high_count: u32, total: u32) -> Result<()> {
        let range = self.high - self.low + 1;
        self.high = self.low + range * high_count as u64 / total as u64 - 1;
        self.low += range * low_count as u64 / total as u64;
        loop {
            if self.high < HALF {
                self.emit(false)?;
            } else if self.low >= HALF {
                self.emit(true)?;
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
                self.pending += 1;
                self.low -= FIRST_QUARTER;
                self.high -= FIRST_QUARTER;
            } else {
                return Ok(());
            }
            self.low <<= 1;
            self.high = (self.high << 1) + 1;
        }
    }

    fn emit(&mut self, bit: bool) -> Result<()> {
        self.bits.write_bit(bit)?;
        while self.pending > 0 {
            self.bits.write_bit(!bit)?;
            self.pending -= 1;
        }
        Ok(())
    }

    /// Flushes the bits that disambiguate the final interval.
    fn finish(mut self) -> Result<()> {
        self.pending += 1;
        if self.low < FIRST_QUARTER {
            self.emit(false)?;
        } else {
            self.emit(true)?;
        }
        self.bits.flush()
    }
}

struct ArithDecoder<R: Read> {
    low: u64,
    high: u64,
    value: u64,
    buffered: u32,
    end: bool,
    bits: BitReader<R>,
}

impl<R: Read> ArithDecoder<R> {
    fn new(input: R) -> Result<Self> {
        let mut decoder = Self {
            low: 0,
            high: TOP_VALUE,
            value: 0,
            buffered: 0,
            end: false,
            bits: BitReader::new(input),
        };
        for _ in 0..CODE_VALUE_BITS {
            decoder.buffer_bit()?;
            decoder.buffered += 1;
        }
        Ok(decoder)
    }

    fn end_of_stream(&self) -> bool {
        self.end
    }

    fn current_count(&self, total: u32) -> u32 {
        (((self.value - self.low + 1) * total as u64 - 1) / (self.high - self.low + 1)) as u32
    }

    fn remove(&mut self, low_count: u32, high_count: u32, total: u32) -> Result<()> {
        let range = self.high - self.low + 1;
        self.high = self.low + range * high_count as u64 / total as u64 - 1;
        self.low += range * low_count as u64 / total as u64;
        loop {
            if self.high < HALF {
                // interval already determined, nothing to subtract
            } else if self.low >= HALF {
                self.value -= HALF;
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
                self.value -= FIRST_QUARTER;
                self.low -= FIRST_QUARTER;
                self.high -= FIRST_QUARTER;
            } else {
                return Ok(());
            }
            self.low <<= 1;
            self.high = (self.high << 1) + 1;
            self.buffer_bit()?;
        }
    }

    /// Past the input's end the stream is padded with zero bits; the pad
    /// credit runs out after `CODE_VALUE_BITS` reads and marks end of
    /// stream for callers that never saw an in-band EOF.
    fn buffer_bit(&mut self) -> Result<()> {
        match self.bits.read_bit()? {
            Some(bit) => {
                self.value = (self.value << 1) | bit as u64;
            }
            None => {
                if self.buffered == 0 {
                    self.end = true;
                    return Ok(());
                }
                self.value <<= 1;
                self.buffered -= 1;
            }
        }
        Ok(())
    }
}

/// Symbol-level writer pairing the encoder with a frequency model.
pub struct ArithCodeWriter<'a, W: Write> {
    model: &'a FrequencyCodeModel,
    encoder: ArithEncoder<W>,
}

impl<'a, W: Write> ArithCodeWriter<'a, W> {
    pub fn new(model: &'a FrequencyCodeModel, out: W) -> Self {
        Self { model, encoder: ArithEncoder::new(out) }
    }

    pub fn write_symbol(&mut self, symbol: u16) -> Result<()> {
        let slot = symbol as usize;
        if slot >= self.model.eof_slot() {
            return Err(DoczipError::CompressionError(format!(
                "symbol {} outside alphabet",
                symbol
            )));
        }
        if self.model.escaped(slot) {
            let (low, high, total) = self.model.interval(self.model.counts.len());
            self.encoder.encode(low, high, total)?;
            let regular = self.model.regular_count();
            self.encoder.encode(slot as u32, slot as u32 + 1, regular)
        } else {
            if self.model.counts[slot] == 0 {
                return Err(DoczipError::CompressionError(format!(
                    "symbol {} has no trained frequency",
                    symbol
                )));
            }
            let (low, high, total) = self.model.interval(slot);
            self.encoder.encode(low, high, total)
        }
    }

    /// Codes the in-band EOF symbol and flushes the interval state.
    pub fn finish(mut self) -> Result<()> {
        let (low, high, total) = self.model.interval(self.model.eof_slot());
        self.encoder.encode(low, high, total)?;
        self.encoder.finish()
    }
}

/// Symbol-level reader; buffers one decoded symbol of lookahead so EOF is
/// observed before it is returned.
pub struct ArithCodeReader<'a, R: Read> {
    model: &'a FrequencyCodeModel,
    decoder: ArithDecoder<R>,
    next: Option<u16>,
    finished: bool,
}

impl<'a, R: Read> ArithCodeReader<'a, R> {
    pub fn new(model: &'a FrequencyCodeModel, input: R) -> Result<Self> {
        let decoder = ArithDecoder::new(input)?;
        let mut reader = Self { model, decoder, next: None, finished: false };
        reader.decode_next()?;
        Ok(reader)
    }

    /// Returns the next symbol, or `None` at end of stream.
    pub fn read_symbol(&mut self) -> Result<Option<u16>> {
        let symbol = self.next;
        if symbol.is_some() {
            self.decode_next()?;
        }
        Ok(symbol)
    }

    fn decode_next(&mut self) -> Result<()> {
        if self.finished || self.decoder.end_of_stream() {
            self.next = None;
            self.finished = true;
            return Ok(());
        }
        let count = self.decoder.current_count(self.model.total());
        if count >= self.model.total() {
            return Err(DoczipError::MalformedStream(
                "code value outside frequency table".to_string(),
            ));
        }
        let slot = self.model.slot_for_count(count);
        let (low, high, total) = self.model.interval(slot);
        self.decoder.remove(low, high, total)?;

        if slot == self.model.eof_slot() {
            self.next = None;
            self.finished = true;
        } else if slot == self.model.counts.len() {
            // Escape: the symbol follows under the uniform fallback.
            let regular = self.model.regular_count();
            let symbol = self.decoder.current_count(regular);
            if symbol >= regular {
                return Err(DoczipError::MalformedStream(
                    "escaped symbol outside alphabet".to_string(),
                ));
            }
            self.decoder.remove(symbol, symbol + 1, regular)?;
            self.next = Some(symbol as u16);
        } else {
            self.next = Some(slot as u16);
        }
        Ok(())
    }
}
