use crate::config::{DoczipConfig, EncodingKind, MAX_DICTIONARY_LENGTH};
use crate::docs::FileDocumentList;
use crate::error::{DoczipError, Result};
use crate::model::CompressionModel;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Extension appended to compressed documents.
const COMPRESSED_EXTENSION: &str = "dzc";

#[derive(Parser)]
#[command(author, version, about, long_about = "Dictionary-assisted compressor for small documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trains a compression model from sample documents
    BuildModel {
        /// Where to write the model file
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,

        /// Encoding strategy [unified, pure-huffman, pure-arith, verbose]
        #[arg(short, long, default_value = "unified")]
        encoding: EncodingKind,

        /// Explicit dictionary file (inferred from the corpus if omitted)
        #[arg(short, long, value_name = "FILE")]
        dictionary: Option<PathBuf>,

        /// Maximum dictionary size in bytes
        #[arg(long, default_value_t = MAX_DICTIONARY_LENGTH)]
        max_dictionary: usize,

        /// Sample documents to train on
        #[arg(required = true, value_name = "FILES")]
        documents: Vec<PathBuf>,
    },
    /// Compresses documents with a trained model
    Compress {
        /// Model file produced by build-model
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,

        /// Number of threads to use (default: all available cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Documents to compress
        #[arg(required = true, value_name = "FILES")]
        documents: Vec<PathBuf>,
    },
    /// Decompresses previously compressed documents
    Decompress {
        /// Model file produced by build-model
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,

        /// Number of threads to use (default: all available cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Compressed documents (*.dzc)
        #[arg(required = true, value_name = "FILES")]
        documents: Vec<PathBuf>,
    },
    /// Prints facts about a model file
    Info {
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildModel { model, encoding, dictionary, max_dictionary, documents } => {
            let config = DoczipConfig { encoding, max_dictionary };
            let corpus = FileDocumentList::new(documents);
            let explicit = dictionary.map(fs::read).transpose()?;

            let start = Instant::now();
            let compression_model = CompressionModel::build(&corpus, explicit, &config)?;
            compression_model.save_to_path(&model)?;

            println!("Model built in {:.2?}", start.elapsed());
            println!("  Encoding:        {}", compression_model.kind().name());
            println!("  Dictionary Size: {} bytes", compression_model.dictionary().len());
            println!("  Written To:      {}", model.display());
        }
        Commands::Compress { model, threads, documents } => {
            let compression_model = CompressionModel::load_from_path(&model)?;
            build_thread_pool(threads);

            let progress = corpus_progress(documents.len() as u64);
            let start = Instant::now();
            let sizes: Vec<(u64, u64)> = documents
                .par_iter()
                .map(|path| {
                    let document = fs::read(path)?;
                    let compressed = compression_model.compress(&document)?;
                    fs::write(compressed_path(path), &compressed)?;
                    progress.inc(1);
                    Ok::<(u64, u64), DoczipError>((document.len() as u64, compressed.len() as u64))
                })
                .collect::<Result<Vec<_>>>()?;
            progress.finish_with_message("Compression finished");

            let original: u64 = sizes.iter().map(|&(original, _)| original).sum();
            let compressed: u64 = sizes.iter().map(|&(_, compressed)| compressed).sum();
            let ratio = if compressed > 0 { original as f64 / compressed as f64 } else { 0.0 };
            println!("Compressed {} documents in {:.2?}", sizes.len(), start.elapsed());
            println!("  Original Size:   {} bytes", original);
            println!("  Compressed Size: {} bytes", compressed);
            println!("  Ratio:           {:.2}x", ratio);
        }
        Commands::Decompress { model, threads, documents } => {
            let compression_model = CompressionModel::load_from_path(&model)?;
            build_thread_pool(threads);

            let progress = corpus_progress(documents.len() as u64);
            let start = Instant::now();
            let count = documents.len();
            documents
                .par_iter()
                .map(|path| {
                    let compressed = fs::read(path)?;
                    let document = compression_model.decompress(&compressed)?;
                    fs::write(decompressed_path(path)?, &document)?;
                    progress.inc(1);
                    Ok::<(), DoczipError>(())
                })
                .collect::<Result<Vec<()>>>()?;
            progress.finish_with_message("Decompression finished");
            println!("Decompressed {} documents in {:.2?}", count, start.elapsed());
        }
        Commands::Info { model } => {
            let compression_model = CompressionModel::load_from_path(&model)?;
            println!("Model {}", model.display());
            println!("  Encoding:        {}", compression_model.kind().name());
            println!("  Dictionary Size: {} bytes", compression_model.dictionary().len());
        }
    }

    Ok(())
}

fn build_thread_pool(threads: Option<usize>) {
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or_else(num_cpus::get))
        .build_global();
}

fn corpus_progress(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress
}

fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

fn decompressed_path(path: &Path) -> Result<PathBuf> {
    if path.extension().and_then(|e| e.to_str()) != Some(COMPRESSED_EXTENSION) {
        return Err(DoczipError::ConfigError(format!(
            "{} does not end in .{}",
            path.display(),
            COMPRESSED_EXTENSION
        )));
    }
    Ok(path.with_extension(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_path() {
        assert_eq!(compressed_path(Path::new("docs/a.json")), PathBuf::from("docs/a.json.dzc"));
    }

    #[test]
    fn test_decompressed_path() {
        assert_eq!(
            decompressed_path(Path::new("docs/a.json.dzc")).unwrap(),
            PathBuf::from("docs/a.json")
        );
        assert!(decompressed_path(Path::new("docs/a.json")).is_err());
    }
}
