use doczip::{
	ArrayDocumentList, CompressionModel, DocumentList, DoczipConfig, EncodingKind,
	FileDocumentList,
};
use std::fs;
use std::io::Write;

fn record(id: u32, status: &str) -> Vec<u8> {
	format!(
		"{{\"id\": {}, \"status\": \"{}\", \"region\": \"us-east\", \"tags\": [\"a\", \"b\"]}}",
		id, status
	)
	.into_bytes()
}

fn sample_corpus() -> ArrayDocumentList {
	ArrayDocumentList::new(vec![
		record(1, "active"),
		record(2, "active"),
		record(3, "disabled"),
		record(4, "pending"),
	])
}

#[test]
fn round_trip_every_strategy() {
	let corpus = sample_corpus();
	let document = record(99, "active");

	for encoding in [
		EncodingKind::Unified,
		EncodingKind::PureHuffman,
		EncodingKind::PureArith,
		EncodingKind::Verbose,
	] {
		let config = DoczipConfig::default().with_encoding(encoding);
		let model = CompressionModel::build(&corpus, None, &config).unwrap();
		let compressed = model.compress(&document).unwrap();
		let restored = model.decompress(&compressed).unwrap();
		assert_eq!(restored, document, "round trip failed for {:?}", encoding);
	}
}

#[test]
fn unified_beats_baselines_on_similar_documents() {
	let corpus = sample_corpus();
	let document = record(77, "pending");

	let mut sizes = Vec::new();
	for encoding in
		[EncodingKind::Unified, EncodingKind::PureHuffman, EncodingKind::PureArith]
	{
		let config = DoczipConfig::default().with_encoding(encoding);
		let model = CompressionModel::build(&corpus, None, &config).unwrap();
		sizes.push(model.compress(&document).unwrap().len());
	}

	// Substring modeling against the shared dictionary has to win on
	// documents that are mostly boilerplate.
	assert!(sizes[0] < sizes[1], "unified {} not below pure-huffman {}", sizes[0], sizes[1]);
	assert!(sizes[0] < sizes[2], "unified {} not below pure-arith {}", sizes[0], sizes[2]);
}

#[test]
fn model_survives_filesystem_roundtrip() {
	let corpus = sample_corpus();
	let config = DoczipConfig::default();
	let model = CompressionModel::build(&corpus, None, &config).unwrap();

	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("corpus.dzm");
	model.save_to_path(&path).unwrap();
	let restored = CompressionModel::load_from_path(&path).unwrap();

	let document = record(42, "active");
	let compressed = model.compress(&document).unwrap();
	assert_eq!(restored.compress(&document).unwrap(), compressed);
	assert_eq!(restored.decompress(&compressed).unwrap(), document);
}

#[test]
fn file_backed_corpus_trains_a_model() {
	let dir = tempfile::tempdir().unwrap();
	let mut paths = Vec::new();
	for i in 0..5u32 {
		let path = dir.path().join(format!("doc-{}.json", i));
		let mut file = fs::File::create(&path).unwrap();
		file.write_all(&record(i, "active")).unwrap();
		paths.push(path);
	}

	let corpus = FileDocumentList::new(paths);
	assert_eq!(corpus.len(), 5);

	let config = DoczipConfig::default();
	let model = CompressionModel::build(&corpus, None, &config).unwrap();
	let document = corpus.get(3).unwrap();
	let compressed = model.compress(&document).unwrap();
	assert!(compressed.len() < document.len());
	assert_eq!(model.decompress(&compressed).unwrap(), document);
}

#[test]
fn explicit_dictionary_backreferences_roundtrip() {
	// Documents that open with dictionary content compress to a leading
	// back-reference into the shared dictionary.
	let dictionary = b"common-prefix/common-prefix/".to_vec();
	let corpus = ArrayDocumentList::new(vec![
		b"common-prefix/common-prefix/one".to_vec(),
		b"common-prefix/common-prefix/two".to_vec(),
	]);
	let config = DoczipConfig::default();
	let model = CompressionModel::build(&corpus, Some(dictionary), &config).unwrap();

	let document = b"common-prefix/common-prefix/common-prefix/three";
	let compressed = model.compress(document).unwrap();
	assert_eq!(model.decompress(&compressed).unwrap(), document);
	assert!(compressed.len() < document.len());
}

#[test]
fn empty_document_and_empty_dictionary() {
	let corpus = ArrayDocumentList::new(vec![b"unrelated".to_vec()]);
	let config = DoczipConfig::default();
	let model =
		CompressionModel::build(&corpus, Some(Vec::new()), &config).unwrap();

	let compressed = model.compress(b"").unwrap();
	assert_eq!(model.decompress(&compressed).unwrap(), b"");
}

#[test]
fn binary_documents_round_trip() {
	use rand::rngs::StdRng;
	use rand::{Rng, SeedableRng};
	let mut rng = StdRng::seed_from_u64(20240817);

	let boilerplate: Vec<u8> = (0..200).map(|_| rng.gen()).collect();
	let mut corpus_docs = Vec::new();
	for _ in 0..6 {
		let mut doc = boilerplate.clone();
		doc.extend((0..64).map(|_| rng.gen::<u8>()));
		corpus_docs.push(doc);
	}
	let corpus = ArrayDocumentList::new(corpus_docs);

	let config = DoczipConfig::default();
	let model = CompressionModel::build(&corpus, None, &config).unwrap();

	let mut document = boilerplate;
	document.extend((0..64).map(|_| rng.gen::<u8>()));
	let compressed = model.compress(&document).unwrap();
	assert_eq!(model.decompress(&compressed).unwrap(), document);
	assert!(compressed.len() < document.len());
}
