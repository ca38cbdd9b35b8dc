//! Greedy tokenizer: turns a document into literal and back-reference
//! tokens against a shared dictionary.

use crate::error::Result;
use crate::substring::prefix_hash::{PrefixHash, PREFIX_LENGTH};

/// Minimum match length worth a token; shorter runs cost more to encode
/// than the literals they replace.
pub const MINIMUM_MATCH_LENGTH: usize = PREFIX_LENGTH;

/// Receiver for the token stream produced by packing, and replayed by
/// strategy decoders. `offset` is zero or negative; `length` is `1..=255`.
pub trait TokenConsumer {
    fn literal(&mut self, byte: u8) -> Result<()>;
    fn substring(&mut self, offset: i32, length: u8) -> Result<()>;
    fn end_encoding(&mut self) -> Result<()>;
}

/// Tokenizes documents against one dictionary. The dictionary index is
/// built once and reused read-only across documents; a fresh document
/// index is grown incrementally per call.
pub struct SubstringPacker<'d> {
    dictionary: &'d [u8],
    dict_hash: PrefixHash<'d>,
}

impl<'d> SubstringPacker<'d> {
    pub fn new(dictionary: &'d [u8]) -> Self {
        Self { dictionary, dict_hash: PrefixHash::new(dictionary, true) }
    }

    /// Single-pass greedy scan: at each position take the longest match
    /// across the dictionary and the already-scanned document, preferring
    /// the document on ties because it is nearer.
    pub fn pack(&self, document: &[u8], consumer: &mut dyn TokenConsumer) -> Result<()> {
        let dict_len = self.dictionary.len();
        let mut doc_hash = PrefixHash::new(document, false);

        let mut position = 0;
        while position < document.len() {
            let mut best_index = 0;
            let mut best_length = 0;
            let mut from_dictionary = false;

            if position + PREFIX_LENGTH <= document.len() {
                let dict_match = self.dict_hash.best_match(position, document);
                let doc_match = doc_hash.best_match(position, document);
                if doc_match.length >= dict_match.length {
                    best_index = doc_match.index;
                    best_length = doc_match.length;
                } else {
                    best_index = dict_match.index;
                    best_length = dict_match.length;
                    from_dictionary = true;
                }
                doc_hash.insert(position);
            }

            if best_length >= MINIMUM_MATCH_LENGTH {
                let distance = if from_dictionary {
                    position + dict_len - best_index
                } else {
                    position - best_index
                };
                consumer.substring(-(distance as i32), best_length as u8)?;

                // Index the skipped positions so later repetitions can
                // reference them at the same relative locations.
                for skipped in position + 1..position + best_length {
                    if skipped + PREFIX_LENGTH <= document.len() {
                        doc_hash.insert(skipped);
                    }
                }
                position += best_length;
            } else {
                consumer.literal(document[position])?;
                position += 1;
            }
        }
        consumer.end_encoding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substring::unpacker::SubstringUnpacker;

    /// Renders tokens as text so expectations stay readable.
    #[derive(Default)]
    struct TextConsumer {
        out: String,
    }

    impl TokenConsumer for TextConsumer {
        fn literal(&mut self, byte: u8) -> Result<()> {
            self.out.push(byte as char);
            Ok(())
        }

        fn substring(&mut self, offset: i32, length: u8) -> Result<()> {
            self.out.push_str(&format!("<{},{}>", offset, length));
            Ok(())
        }

        fn end_encoding(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn pack(document: &str, dictionary: &str) -> String {
        let packer = SubstringPacker::new(dictionary.as_bytes());
        let mut text = TextConsumer::default();
        packer.pack(document.as_bytes(), &mut text).unwrap();

        // Every packing must also unpack to the original bytes.
        let mut unpacker = SubstringUnpacker::new(dictionary.as_bytes());
        packer.pack(document.as_bytes(), &mut unpacker).unwrap();
        assert_eq!(unpacker.into_bytes(), document.as_bytes());

        text.out
    }

    #[test]
    fn test_run_length_encoding() {
        assert_eq!(pack("", ""), "");
        assert_eq!(pack("a", ""), "a");
        assert_eq!(pack("aa", ""), "aa");
        assert_eq!(pack("aaaa", ""), "aaaa");
        assert_eq!(pack("aaaaa", ""), "a<-1,4>");
        assert_eq!(pack("a a a a a ", ""), "a <-2,8>");
        assert_eq!(pack("a a a a ax", ""), "a <-2,7>x");
    }

    #[test]
    fn test_simple_repetitions() {
        assert_eq!(pack("garrick garrick", ""), "garrick <-8,7>");
        assert_eq!(pack("garrick garrick garrick", ""), "garrick <-8,15>");
        assert_eq!(pack("garrick garrick garrickx", ""), "garrick <-8,15>x");
        assert_eq!(
            pack("garrick toubassi garrick toubassi garrick", ""),
            "garrick toubassi <-17,24>"
        );
        assert_eq!(
            pack("garrick toubassi garrick toubassi x garrick", ""),
            "garrick toubassi <-17,17>x<-19,8>"
        );
        assert_eq!(
            pack("garrick toubassi garrick garrick toubassi", ""),
            "garrick toubassi <-17,8><-25,16>"
        );
    }

    #[test]
    fn test_multiple_matches() {
        assert_eq!(
            pack("garrick garrick nadim nadim toubassi toubassi", ""),
            "garrick <-8,8>nadim<-6,7>toubassi<-9,9>"
        );
    }

    #[test]
    fn test_later_match_after_literals() {
        assert_eq!(pack("arrickgargarrick", ""), "arrickgarg<-10,6>");
    }

    #[test]
    fn test_initial_dictionary() {
        assert_eq!(pack("garrick toubassi", "garrick"), "<-7,7> toubassi");
        assert_eq!(pack("garrick toubassi", "toubassi"), "garrick <-16,8>");
        assert_eq!(pack("garrick toubassi", "toubassi garrick"), "<-7,7> <-24,8>");
    }

    #[test]
    fn test_roundtrip_binary_data() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(99);

        let dictionary: Vec<u8> = (0..512).map(|_| rng.gen_range(b'a'..=b'f')).collect();
        let mut document = dictionary[100..300].to_vec();
        document.extend((0..400).map(|_| rng.gen_range(b'a'..=b'f')));
        document.extend_from_slice(&dictionary[400..500]);

        let packer = SubstringPacker::new(&dictionary);
        let mut unpacker = SubstringUnpacker::new(&dictionary);
        packer.pack(&document, &mut unpacker).unwrap();
        assert_eq!(unpacker.into_bytes(), document);
    }
}
