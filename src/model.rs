//! Compression orchestrator: owns the dictionary and the encoding strategy,
//! drives model building, compression and decompression, and persists the
//! model in a checksummed container.

use crate::config::{DoczipConfig, EncodingKind};
use crate::dict;
use crate::docs::DocumentList;
use crate::error::{DoczipError, Result};
use crate::strategy::EncodingStrategy;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC_NUMBER: &[u8; 4] = b"DZM1";
const VERSION: u8 = 1;

pub struct CompressionModel {
	dictionary: Vec<u8>,
	strategy: EncodingStrategy,
}

impl CompressionModel {
	/// Trains a model over the corpus. Without an explicit dictionary, one
	/// is inferred from substrings repeated across the documents.
	pub fn build(
		documents: &dyn DocumentList,
		dictionary: Option<Vec<u8>>,
		config: &DoczipConfig,
	) -> Result<Self> {
		let dictionary = match dictionary {
			Some(dictionary) => dictionary,
			None => dict::build_dictionary(documents, config.max_dictionary)?,
		};
		let dictionary = truncate_dictionary(dictionary, config.max_dictionary);
		info!(
			"building {} model over {} documents with a {} byte dictionary",
			config.encoding.name(),
			documents.len(),
			dictionary.len()
		);
		let strategy = EncodingStrategy::build(config.encoding, &dictionary, documents)?;
		Ok(Self { dictionary, strategy })
	}

	pub fn kind(&self) -> EncodingKind {
		self.strategy.kind()
	}

	pub fn dictionary(&self) -> &[u8] {
		&self.dictionary
	}

	pub fn compress(&self, document: &[u8]) -> Result<Vec<u8>> {
		self.strategy.compress(document, &self.dictionary)
	}

	pub fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
		self.strategy.decompress(compressed, &self.dictionary)
	}

	pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
		let mut payload = Vec::new();
		payload.write_u32::<LittleEndian>(self.dictionary.len() as u32)?;
		payload.extend_from_slice(&self.dictionary);
		self.strategy.save(&mut payload)?;

		writer.write_all(MAGIC_NUMBER)?;
		writer.write_u8(VERSION)?;
		writer.write_u8(strategy_id(self.strategy.kind()))?;
		writer.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
		writer.write_all(&payload)?;
		Ok(())
	}

	pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
		let mut magic = [0u8; 4];
		reader.read_exact(&mut magic)?;
		if magic != *MAGIC_NUMBER {
			return Err(DoczipError::InvalidFormat("invalid magic number".to_string()));
		}
		let version = reader.read_u8()?;
		if version != VERSION {
			return Err(DoczipError::InvalidFormat(format!(
				"unsupported version: {}",
				version
			)));
		}
		let kind = kind_from_id(reader.read_u8()?)?;
		let checksum = reader.read_u32::<LittleEndian>()?;

		let mut payload = Vec::new();
		reader.read_to_end(&mut payload)?;
		if crc32fast::hash(&payload) != checksum {
			return Err(DoczipError::ChecksumMismatch);
		}

		let mut cursor = &payload[..];
		let dictionary_length = cursor.read_u32::<LittleEndian>()? as usize;
		let mut dictionary = vec![0u8; dictionary_length];
		cursor.read_exact(&mut dictionary)?;
		let strategy = EncodingStrategy::load(kind, &mut cursor)?;

		Ok(Self { dictionary, strategy })
	}

	pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let mut writer = BufWriter::new(File::create(path)?);
		self.save(&mut writer)?;
		writer.flush()?;
		Ok(())
	}

	pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		let mut reader = BufReader::new(File::open(path)?);
		Self::load(&mut reader)
	}
}

/// Distances into the dictionary are capped at 64 KiB, so an over-long
/// dictionary keeps its tail: important strings pack toward the end.
fn truncate_dictionary(mut dictionary: Vec<u8>, max_length: usize) -> Vec<u8> {
	if dictionary.len() > max_length {
		dictionary.split_off(dictionary.len() - max_length)
	} else {
		dictionary
	}
}

fn strategy_id(kind: EncodingKind) -> u8 {
	match kind {
		EncodingKind::Unified => 0,
		EncodingKind::PureHuffman => 1,
		EncodingKind::PureArith => 2,
		EncodingKind::Verbose => 3,
	}
}

fn kind_from_id(id: u8) -> Result<EncodingKind> {
	match id {
		0 => Ok(EncodingKind::Unified),
		1 => Ok(EncodingKind::PureHuffman),
		2 => Ok(EncodingKind::PureArith),
		3 => Ok(EncodingKind::Verbose),
		other => Err(DoczipError::InvalidFormat(format!("unknown strategy id: {}", other))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::docs::ArrayDocumentList;

	fn sample_corpus() -> ArrayDocumentList {
		ArrayDocumentList::new(vec![
			b"{\"user\": \"alice\", \"active\": true}".to_vec(),
			b"{\"user\": \"bob\", \"active\": false}".to_vec(),
			b"{\"user\": \"carol\", \"active\": true}".to_vec(),
		])
	}

	#[test]
	fn test_build_and_roundtrip_every_strategy() {
		let corpus = sample_corpus();
		let document = b"{\"user\": \"dave\", \"active\": false}";
		for encoding in [
			EncodingKind::Unified,
			EncodingKind::PureHuffman,
			EncodingKind::PureArith,
			EncodingKind::Verbose,
		] {
			let config = DoczipConfig::default().with_encoding(encoding);
			let model = CompressionModel::build(&corpus, None, &config).unwrap();
			let compressed = model.compress(document).unwrap();
			assert_eq!(model.decompress(&compressed).unwrap(), document);
		}
	}

	#[test]
	fn test_trained_unified_model_shrinks_similar_documents() {
		let corpus = sample_corpus();
		let config = DoczipConfig::default();
		let model = CompressionModel::build(&corpus, None, &config).unwrap();
		let document = b"{\"user\": \"erin\", \"active\": true}";
		let compressed = model.compress(document).unwrap();
		assert!(compressed.len() < document.len() / 2);
	}

	#[test]
	fn test_save_load_produces_identical_output() {
		let corpus = sample_corpus();
		let config = DoczipConfig::default();
		let model = CompressionModel::build(&corpus, None, &config).unwrap();

		let mut saved = Vec::new();
		model.save(&mut saved).unwrap();
		let restored = CompressionModel::load(&mut &saved[..]).unwrap();

		let document = b"{\"user\": \"frank\", \"active\": true}";
		assert_eq!(
			model.compress(document).unwrap(),
			restored.compress(document).unwrap()
		);
		assert_eq!(restored.dictionary(), model.dictionary());
	}

	#[test]
	fn test_corrupt_container_is_rejected() {
		let corpus = sample_corpus();
		let config = DoczipConfig::default();
		let model = CompressionModel::build(&corpus, None, &config).unwrap();

		let mut saved = Vec::new();
		model.save(&mut saved).unwrap();

		let mut bad_magic = saved.clone();
		bad_magic[0] ^= 0xff;
		assert!(CompressionModel::load(&mut &bad_magic[..]).is_err());

		let mut bad_payload = saved.clone();
		let last = bad_payload.len() - 1;
		bad_payload[last] ^= 0xff;
		assert!(matches!(
			CompressionModel::load(&mut &bad_payload[..]),
			Err(DoczipError::ChecksumMismatch)
		));
	}

	#[test]
	fn test_explicit_dictionary_is_used() {
		let corpus = sample_corpus();
		let config = DoczipConfig::default();
		let dictionary = b"{\"user\": \"\", \"active\": }".to_vec();
		let model =
			CompressionModel::build(&corpus, Some(dictionary.clone()), &config).unwrap();
		assert_eq!(model.dictionary(), &dictionary[..]);
	}

	#[test]
	fn test_dictionary_truncation_keeps_tail() {
		let dictionary: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
		let truncated = truncate_dictionary(dictionary.clone(), 100);
		assert_eq!(truncated, dictionary[900..]);
	}
}
