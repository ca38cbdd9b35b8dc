use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoczipError>;

#[derive(Error, Debug)]
pub enum DoczipError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Model integrity check failed: checksum mismatch")]
	ChecksumMismatch,

	#[error("Invalid model format: {0}")]
	InvalidFormat(String),

	#[error("Compression failed: {0}")]
	CompressionError(String),

	#[error("Malformed compressed stream: {0}")]
	MalformedStream(String),

	#[error("Token out of range: {0}")]
	TokenOutOfRange(String),

	#[error("Unsupported token event: {0}")]
	UnsupportedToken(String),

	#[error("Configuration error: {0}")]
	ConfigError(String),
}
