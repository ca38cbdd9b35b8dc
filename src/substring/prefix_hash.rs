//! Hash-chain index over 4-byte prefixes of a buffer.
//!
//! Each bucket holds the most recently inserted position; a parallel chain
//! array links every position to the previous occurrence sharing its bucket,
//! so chains are walked most-recent-first and distances only grow.

/// Prefix width hashed per position; also the minimum economically
/// worthwhile match length.
pub const PREFIX_LENGTH: usize = 4;

/// Longest back-reference distance a token can express.
pub const MAX_DISTANCE: usize = 65535;

/// Longest match a token can express.
pub const MAX_MATCH_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    /// Position within the indexed buffer. Meaningless when `length` is 0.
    pub index: usize,
    /// Matched byte count; 0 means no match was found.
    pub length: usize,
}

pub struct PrefixHash<'a> {
    buffer: &'a [u8],
    buckets: Vec<i32>,
    chain: Vec<i32>,
}

impl<'a> PrefixHash<'a> {
    /// Indexes `buffer`. With `seed_all`, every position with a full prefix
    /// ahead of it is inserted immediately; otherwise the caller inserts
    /// positions incrementally as it scans.
    pub fn new(buffer: &'a [u8], seed_all: bool) -> Self {
        // ~1.75 buckets per indexed byte keeps chains short.
        let buckets = vec![-1i32; (buffer.len() as f64 * 1.75) as usize];
        let chain = vec![-1i32; buffer.len()];
        let mut hash = Self { buffer, buckets, chain };
        if seed_all && buffer.len() > PREFIX_LENGTH {
            for position in 0..buffer.len() - PREFIX_LENGTH {
                hash.insert(position);
            }
        }
        hash
    }

    fn bucket_index(buffer: &[u8], position: usize, bucket_count: usize) -> usize {
        let code = u32::from_le_bytes([
            buffer[position],
            buffer[position + 1],
            buffer[position + 2],
            buffer[position + 3],
        ]);
        (code & 0x7f_ffff) as usize % bucket_count
    }

    /// Prepends `position` to its bucket's chain. The caller guarantees a
    /// full prefix exists at `position`.
    pub fn insert(&mut self, position: usize) {
        let bucket = Self::bucket_index(self.buffer, position, self.buckets.len());
        self.chain[position] = self.buckets[bucket];
        self.buckets[bucket] = position as i32;
    }

    /// Finds the longest prior occurrence of the bytes at
    /// `target[position..]`. When `target` is a distinct buffer, the indexed
    /// buffer is treated as logically preceding it, so distances are
    /// measured across the boundary. Ties keep the earliest-found (nearest)
    /// candidate.
    pub fn best_match(&self, position: usize, target: &[u8]) -> Match {
        let mut best = Match::default();
        if self.buffer.is_empty() || position + PREFIX_LENGTH > target.len() {
            return best;
        }

        let same_buffer =
            self.buffer.as_ptr() == target.as_ptr() && self.buffer.len() == target.len();
        let max_limit = MAX_MATCH_LENGTH.min(target.len() - position);

        let bucket = Self::bucket_index(target, position, self.buckets.len());
        let mut candidate = self.buckets[bucket];
        while candidate >= 0 {
            let candidate_index = candidate as usize;
            let distance = if same_buffer {
                position - candidate_index
            } else {
                position + self.buffer.len() - candidate_index
            };
            if distance > MAX_DISTANCE {
                // Chains are most-recent-first, so no closer match remains.
                break;
            }

            let limit = position + max_limit.min(self.buffer.len() - candidate_index);
            let mut j = position;
            let mut k = candidate_index;
            while j < limit && self.buffer[k] == target[j] {
                j += 1;
                k += 1;
            }

            let length = j - position;
            if length > best.length {
                best = Match { index: candidate_index, length };
            }
            candidate = self.chain[candidate_index];
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"a man a clan a canal panama";

    #[test]
    fn test_match_within_same_buffer() {
        let mut hash = PrefixHash::new(SAMPLE, false);
        for position in 0..12 {
            hash.insert(position);
        }
        assert_eq!(hash.best_match(12, SAMPLE), Match { index: 5, length: 4 });
    }

    #[test]
    fn test_match_against_separate_target() {
        let hash = PrefixHash::new(SAMPLE, true);
        assert_eq!(hash.best_match(3, b"xxx a ca"), Match { index: 12, length: 5 });
    }

    #[test]
    fn test_match_miss() {
        let hash = PrefixHash::new(SAMPLE, true);
        assert_eq!(hash.best_match(0, b"blah!"), Match { index: 0, length: 0 });
    }

    #[test]
    fn test_empty_buffer() {
        let hash = PrefixHash::new(b"", true);
        assert_eq!(hash.best_match(0, b"anything"), Match::default());
    }

    #[test]
    fn test_match_respects_length_cap() {
        let long = vec![b'x'; 1000];
        let mut hash = PrefixHash::new(&long, false);
        hash.insert(0);
        let found = hash.best_match(300, &long);
        assert!(found.length <= MAX_MATCH_LENGTH);
        assert_eq!(found.length, MAX_MATCH_LENGTH);
    }
}
