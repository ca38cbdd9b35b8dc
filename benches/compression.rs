use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use doczip::{ArrayDocumentList, CompressionModel, DoczipConfig, EncodingKind};

fn sample_corpus() -> ArrayDocumentList {
	let documents = (0..64u32)
		.map(|i| {
			format!(
				"{{\"id\": {}, \"status\": \"active\", \"region\": \"us-east\", \"score\": {}}}",
				i,
				i * 7
			)
			.into_bytes()
		})
		.collect();
	ArrayDocumentList::new(documents)
}

fn bench_compress(c: &mut Criterion) {
	let corpus = sample_corpus();
	let document =
		b"{\"id\": 999, \"status\": \"active\", \"region\": \"us-east\", \"score\": 123}".to_vec();

	let mut group = c.benchmark_group("compression");
	group.throughput(Throughput::Bytes(document.len() as u64));
	for encoding in [EncodingKind::Unified, EncodingKind::PureHuffman, EncodingKind::PureArith] {
		let config = DoczipConfig::default().with_encoding(encoding);
		let model = CompressionModel::build(&corpus, None, &config).unwrap();
		group.bench_function(format!("compress_{}", encoding.name()), |b| {
			b.iter(|| model.compress(&document).unwrap());
		});
		let compressed = model.compress(&document).unwrap();
		group.bench_function(format!("decompress_{}", encoding.name()), |b| {
			b.iter(|| model.decompress(&compressed).unwrap());
		});
	}
	group.finish();
}

fn bench_build_model(c: &mut Criterion) {
	let corpus = sample_corpus();
	c.bench_function("build_model_unified", |b| {
		b.iter(|| {
			let config = DoczipConfig::default();
			CompressionModel::build(&corpus, None, &config).unwrap()
		});
	});
}

criterion_group!(benches, bench_compress, bench_build_model);
criterion_main!(benches);
