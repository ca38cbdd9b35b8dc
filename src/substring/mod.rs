//! Substring matching against a shared dictionary: the hash-chain match
//! index, the greedy tokenizer and the replaying detokenizer.

pub mod packer;
pub mod prefix_hash;
pub mod unpacker;

pub use packer::{SubstringPacker, TokenConsumer};
pub use prefix_hash::{Match, PrefixHash};
pub use unpacker::SubstringUnpacker;
