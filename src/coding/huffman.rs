//! Canonical Huffman coding over a trained symbol histogram.
//!
//! The model reserves the last histogram slot for an in-band EOF symbol so a
//! coded stream needs no external framing. When the training sample did not
//! cover the full alphabet, zero-frequency symbols are given a minimum weight
//! of one so every possible symbol value has a codeword.

use crate::coding::bits::{BitReader, BitWriter};
use crate::error::{DoczipError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};

/// A symbol's bit pattern. Bits are appended least-significant-first as the
/// tree is descended, and written to the stream in that same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub value: u32,
    pub bit_length: u8,
    pub symbol: u16,
}

impl Codeword {
    fn append_bit(&mut self, bit: u32) {
        self.value |= (bit & 1) << self.bit_length;
        self.bit_length += 1;
    }

    fn write<W: Write>(&self, out: &mut BitWriter<W>) -> Result<()> {
        for k in 0..self.bit_length {
            out.write_bit((self.value >> k) & 1 == 1)?;
        }
        Ok(())
    }
}

/// Tree node used during construction, held in an arena and referenced by
/// index. Only weight and children matter once nodes are merged.
struct BuildNode {
    weight: u64,
    symbol: Option<u16>,
    left: Option<usize>,
    right: Option<usize>,
}

/// Decode-side tree node. Every internal node of a Huffman tree has both
/// children, so a missing child can only come from a corrupt model file.
#[derive(Debug, Clone, Copy, Default)]
struct DecodeNode {
    left: Option<u32>,
    right: Option<u32>,
    symbol: Option<u16>,
}

pub struct FrequencyHuffmanModel {
    encoding: Vec<Option<Codeword>>,
    decode_nodes: Vec<DecodeNode>,
}

/// Histograms `data` into 257 slots: byte values plus a trailing EOF slot.
pub fn histogram_with_eof(data: &[u8]) -> Vec<u32> {
    let mut histogram = vec![0u32; 256 + 1];
    for &byte in data {
        histogram[byte as usize] += 1;
    }
    *histogram.last_mut().unwrap() = 1;
    histogram
}

impl FrequencyHuffmanModel {
    /// Builds codewords from a histogram whose last slot is the EOF symbol.
    pub fn new(histogram: &[u32], all_symbols_sampled: bool) -> Self {
        let mut histogram = histogram.to_vec();
        if !all_symbols_sampled {
            for count in histogram.iter_mut() {
                if *count == 0 {
                    *count = 1;
                }
            }
        }
        let eof = histogram.len() - 1;
        if histogram[eof] == 0 {
            histogram[eof] = 1;
        }

        let encoding = compute_huffman_coding(&histogram);
        let decode_nodes = build_decode_tree(&encoding);
        Self { encoding, decode_nodes }
    }

    pub fn symbol_count(&self) -> usize {
        self.encoding.len()
    }

    pub fn eof_symbol(&self) -> u16 {
        (self.encoding.len() - 1) as u16
    }

    fn codeword(&self, symbol: u16) -> Result<&Codeword> {
        self.encoding
            .get(symbol as usize)
            .and_then(|c| c.as_ref())
            .ok_or_else(|| {
                DoczipError::CompressionError(format!("symbol {} not in model", symbol))
            })
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u32::<LittleEndian>(self.encoding.len() as u32)?;
        let present = self.encoding.iter().flatten().count();
        out.write_u32::<LittleEndian>(present as u32)?;
        for code in self.encoding.iter().flatten() {
            out.write_u32::<LittleEndian>(code.value)?;
            out.write_u8(code.bit_length)?;
            out.write_u16::<LittleEndian>(code.symbol)?;
        }
        Ok(())
    }

    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        let symbols = input.read_u32::<LittleEndian>()? as usize;
        let present = input.read_u32::<LittleEndian>()? as usize;
        if present > symbols {
            return Err(DoczipError::InvalidFormat(
                "codeword count exceeds alphabet size".to_string(),
            ));
        }
        let mut encoding = vec![None; symbols];
        for _ in 0..present {
            let value = input.read_u32::<LittleEndian>()?;
            let bit_length = input.read_u8()?;
            let symbol = input.read_u16::<LittleEndian>()?;
            if symbol as usize >= symbols || bit_length == 0 || bit_length > 32 {
                return Err(DoczipError::InvalidFormat(
                    "invalid codeword entry".to_string(),
                ));
            }
            encoding[symbol as usize] = Some(Codeword { value, bit_length, symbol });
        }
        let decode_nodes = build_decode_tree(&encoding);
        Ok(Self { encoding, decode_nodes })
    }
}

/// Repeatedly merges the two lowest-weight nodes until one root remains,
/// then collects per-symbol bit paths (0 = left, 1 = right) by depth-first
/// traversal. Ties are broken by insertion order, keeping output
/// deterministic for a given histogram.
fn compute_huffman_coding(histogram: &[u32]) -> Vec<Option<Codeword>> {
    let mut arena: Vec<BuildNode> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();

    for (symbol, &weight) in histogram.iter().enumerate() {
        if weight > 0 {
            arena.push(BuildNode {
                weight: weight as u64,
                symbol: Some(symbol as u16),
                left: None,
                right: None,
            });
            heap.push(Reverse((weight as u64, arena.len() - 1)));
        }
    }

    let mut encoding: Vec<Option<Codeword>> = vec![None; histogram.len()];

    if heap.len() == 1 {
        // Degenerate single-symbol alphabet still needs a decodable bit.
        let Reverse((_, index)) = heap.pop().unwrap();
        let symbol = arena[index].symbol.unwrap();
        encoding[symbol as usize] = Some(Codeword { value: 0, bit_length: 1, symbol });
        return encoding;
    }

    while heap.len() > 1 {
        let Reverse((left_weight, left)) = heap.pop().unwrap();
        let Reverse((right_weight, right)) = heap.pop().unwrap();
        arena.push(BuildNode {
            weight: left_weight + right_weight,
            symbol: None,
            left: Some(left),
            right: Some(right),
        });
        heap.push(Reverse((left_weight + right_weight, arena.len() - 1)));
    }

    let Reverse((_, root)) = heap.pop().unwrap();
    let mut stack = vec![(root, Codeword { value: 0, bit_length: 0, symbol: 0 })];
    while let Some((index, prefix)) = stack.pop() {
        let node = &arena[index];
        if let Some(symbol) = node.symbol {
            let mut code = prefix;
            code.symbol = symbol;
            encoding[symbol as usize] = Some(code);
        } else {
            let mut left_code = prefix;
            left_code.append_bit(0);
            stack.push((node.left.unwrap(), left_code));
            let mut right_code = prefix;
            right_code.append_bit(1);
            stack.push((node.right.unwrap(), right_code));
        }
    }

    encoding
}

fn build_decode_tree(encoding: &[Option<Codeword>]) -> Vec<DecodeNode> {
    let mut nodes = vec![DecodeNode::default()];
    for code in encoding.iter().flatten() {
        let mut current = 0usize;
        for k in 0..code.bit_length {
            let right = (code.value >> k) & 1 == 1;
            let child = if right { nodes[current].right } else { nodes[current].left };
            let next = match child {
                Some(index) => index as usize,
                None => {
                    nodes.push(DecodeNode::default());
                    let index = (nodes.len() - 1) as u32;
                    if right {
                        nodes[current].right = Some(index);
                    } else {
                        nodes[current].left = Some(index);
                    }
                    index as usize
                }
            };
            current = next;
        }
        nodes[current].symbol = Some(code.symbol);
    }
    nodes
}

pub struct HuffmanEncoder<'a, W: Write> {
    model: &'a FrequencyHuffmanModel,
    bits: BitWriter<W>,
}

impl<'a, W: Write> HuffmanEncoder<'a, W> {
    pub fn new(model: &'a FrequencyHuffmanModel, out: W) -> Self {
        Self { model, bits: BitWriter::new(out) }
    }

    pub fn encode_symbol(&mut self, symbol: u16) -> Result<()> {
        self.model.codeword(symbol)?.write(&mut self.bits)
    }

    /// Emits the EOF codeword and pads out the final byte.
    pub fn finish(mut self) -> Result<()> {
        self.model.codeword(self.model.eof_symbol())?.write(&mut self.bits)?;
        self.bits.flush()
    }
}

pub struct HuffmanDecoder<'a, R: Read> {
    model: &'a FrequencyHuffmanModel,
    bits: BitReader<R>,
    done: bool,
}

impl<'a, R: Read> HuffmanDecoder<'a, R> {
    pub fn new(model: &'a FrequencyHuffmanModel, input: R) -> Self {
        Self { model, bits: BitReader::new(input), done: false }
    }

    /// Decodes one symbol; `None` once the EOF symbol is read or the input
    /// is exhausted.
    pub fn decode_symbol(&mut self) -> Result<Option<u16>> {
        if self.done {
            return Ok(None);
        }
        let mut current = 0usize;
        loop {
            if let Some(symbol) = self.model.decode_nodes[current].symbol {
                if symbol == self.model.eof_symbol() {
                    self.done = true;
                    return Ok(None);
                }
                return Ok(Some(symbol));
            }
            match self.bits.read_bit()? {
                Some(bit) => {
                    let node = self.model.decode_nodes[current];
                    let child = if bit { node.right } else { node.left };
                    current = child.ok_or_else(|| {
                        DoczipError::MalformedStream("no codeword for bit sequence".to_string())
                    })? as usize;
                }
                None => {
                    self.done = true;
                    return Ok(None);
                }
            }
        }
    }
}
