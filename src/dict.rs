//! Automatic dictionary construction from a training corpus.
//!
//! Repeated substrings are found with a suffix array and its LCP array,
//! scored by how many distinct documents they occur in, and packed
//! back-to-front into the dictionary so the most valuable strings sit
//! nearest its end, where back-reference distances are shortest. Adjacent
//! strings are merged on common prefix/suffix overlap.

use crate::docs::DocumentList;
use crate::error::Result;
use log::debug;

/// Substrings shorter than this cost more to reference than they save.
const MIN_SUBSTRING_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    position: usize,
    length: usize,
    score: u32,
}

/// Builds a shared dictionary of at most `desired_length` bytes from the
/// corpus. Returns an empty dictionary when the corpus has no repeats worth
/// keeping.
pub fn build_dictionary(documents: &dyn DocumentList, desired_length: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut starts = Vec::with_capacity(documents.len());
    for index in 0..documents.len() {
        starts.push(bytes.len());
        bytes.extend_from_slice(&documents.get(index)?);
    }

    if bytes.len() < MIN_SUBSTRING_LENGTH || desired_length == 0 {
        return Ok(Vec::new());
    }

    let suffix_array = compute_suffix_array(&bytes);
    let lcp = compute_lcp(&bytes, &suffix_array);
    let mut candidates = collect_substrings(&bytes, &starts, &suffix_array, &lcp);
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let dictionary = pack(&bytes, &candidates, desired_length);
    debug!(
        "dictionary: {} candidate substrings over {} corpus bytes packed into {} bytes",
        candidates.len(),
        bytes.len(),
        dictionary.len()
    );
    Ok(dictionary)
}

fn compute_suffix_array(bytes: &[u8]) -> Vec<usize> {
    let mut suffixes: Vec<usize> = (0..bytes.len()).collect();
    suffixes.sort_unstable_by(|&a, &b| bytes[a..].cmp(&bytes[b..]));
    suffixes
}

/// Kasai's algorithm; `lcp[i]` is the common-prefix length of the suffixes
/// at ranks `i-1` and `i`.
fn compute_lcp(bytes: &[u8], suffix_array: &[usize]) -> Vec<usize> {
    let n = bytes.len();
    let mut rank = vec![0usize; n];
    for (r, &suffix) in suffix_array.iter().enumerate() {
        rank[suffix] = r;
    }
    let mut lcp = vec![0usize; n];
    let mut h = 0usize;
    for i in 0..n {
        if rank[i] > 0 {
            let j = suffix_array[rank[i] - 1];
            while i + h < n && j + h < n && bytes[i + h] == bytes[j + h] {
                h += 1;
            }
            lcp[rank[i]] = h;
            h = h.saturating_sub(1);
        } else {
            h = 0;
        }
    }
    lcp
}

/// Walks the LCP array with an interval stack, yielding every maximal
/// repeated substring of usable length along with its occurrence span.
fn collect_substrings(
    bytes: &[u8],
    starts: &[usize],
    suffix_array: &[usize],
    lcp: &[usize],
) -> Vec<Candidate> {
    let n = lcp.len();
    let mut candidates = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new(); // (prefix length, first rank)

    for i in 1..=n {
        let current = if i < n { lcp[i] } else { 0 };
        let mut interval_start = i;
        while let Some(&(length, start)) = stack.last() {
            if length <= current {
                break;
            }
            stack.pop();
            interval_start = start;
            if length >= MIN_SUBSTRING_LENGTH {
                let doc_count = unique_documents(bytes, starts, &suffix_array[start - 1..i], length);
                if doc_count > 0 {
                    candidates.push(Candidate {
                        position: suffix_array[start - 1],
                        length,
                        score: compute_score(length, doc_count),
                    });
                }
            }
        }
        if current > 0 && stack.last().map_or(true, |&(length, _)| length < current) {
            stack.push((current, interval_start));
        }
    }
    candidates
}

/// The true value of a repeated string is the number of distinct documents
/// it appears in: within one document later occurrences already reference
/// the first. Occurrences spanning two concatenated documents do not count.
fn unique_documents(bytes: &[u8], starts: &[usize], occurrences: &[usize], length: usize) -> u32 {
    let mut seen = vec![false; starts.len()];
    let mut count = 0u32;
    for &position in occurrences {
        let doc = starts.partition_point(|&s| s <= position) - 1;
        let doc_end = starts.get(doc + 1).copied().unwrap_or(bytes.len());
        if position + length <= doc_end && !seen[doc] {
            seen[doc] = true;
            count += 1;
        }
    }
    count
}

/// A substring of length n occurring in m documents saves roughly (n-3)*m
/// output bytes while consuming n dictionary bytes; score the per-byte
/// benefit.
fn compute_score(length: usize, count: u32) -> u32 {
    (100 * count * (length as u32 - 3)) / length as u32
}

fn pack(bytes: &[u8], candidates: &[Candidate], desired_length: usize) -> Vec<u8> {
    // Prune redundant strings: drop a candidate already contained in a
    // winner, and evict winners contained in a new candidate.
    let mut chosen: Vec<&[u8]> = Vec::new();
    let mut size = 0usize;
    for candidate in candidates {
        let string = &bytes[candidate.position..candidate.position + candidate.length];
        if chosen.iter().any(|c| contains(c, string)) {
            continue;
        }
        chosen.retain(|c| {
            if contains(string, c) {
                size -= c.len();
                false
            } else {
                true
            }
        });
        chosen.push(string);
        size += string.len();
        // Prefix/suffix merging below shrinks the layout, so gather extra.
        if size >= 2 * desired_length {
            break;
        }
    }

    let mut packed = vec![0u8; desired_length];
    let mut tail = desired_length;
    for string in chosen {
        if tail == 0 {
            break;
        }
        let length = string.len().min(tail);
        tail -= prepend(&string[..length], &mut packed, tail);
    }
    packed.split_off(tail)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

/// Lays `string` down immediately before `position`, overlapping its suffix
/// with the prefix of the content already at `position` (packing " and "
/// before " the " yields " and the "). Returns the bytes actually consumed.
fn prepend(string: &[u8], packed: &mut [u8], position: usize) -> usize {
    let length = string.len();
    let mut overlap = (length - 1).min(packed.len() - position);
    while overlap > 0 {
        if string[length - overlap..] == packed[position..position + overlap] {
            break;
        }
        overlap -= 1;
    }
    let fresh = length - overlap;
    packed[position - fresh..position].copy_from_slice(&string[..fresh]);
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::ArrayDocumentList;

    fn corpus(documents: &[&str]) -> ArrayDocumentList {
        ArrayDocumentList::new(documents.iter().map(|d| d.as_bytes().to_vec()).collect())
    }

    #[test]
    fn test_cross_document_repeat_is_extracted() {
        let documents = corpus(&[
            "http://espn.com/scores",
            "http://google.com/mail",
            "http://yahoo.com/news",
        ]);
        let dictionary = build_dictionary(&documents, 64).unwrap();
        assert!(contains(&dictionary, b"http://"));
        assert!(contains(&dictionary, b".com/"));
    }

    #[test]
    fn test_single_document_repeats_score_low() {
        // "toubassi" spans both documents while "garrick " repeats only
        // inside the first; the shared string must survive packing into a
        // tight budget.
        let documents = corpus(&["garrick garrick garrick toubassi", "toubassi"]);
        let dictionary = build_dictionary(&documents, 8).unwrap();
        assert!(contains(&dictionary, b"toubassi"));
    }

    #[test]
    fn test_empty_corpus() {
        let documents = corpus(&[]);
        assert!(build_dictionary(&documents, 1024).unwrap().is_empty());
    }

    #[test]
    fn test_no_repeats() {
        let documents = corpus(&["abcdefgh", "ijklmnop"]);
        assert!(build_dictionary(&documents, 1024).unwrap().is_empty());
    }

    #[test]
    fn test_respects_length_budget() {
        let documents = corpus(&[
            "shared boilerplate header one",
            "shared boilerplate header two",
            "shared boilerplate header three",
        ]);
        let dictionary = build_dictionary(&documents, 16).unwrap();
        assert!(dictionary.len() <= 16);
        assert!(!dictionary.is_empty());
    }

    #[test]
    fn test_prefix_suffix_merge() {
        let mut packed = vec![0u8; 16];
        let consumed = prepend(b" the ", &mut packed, 16);
        assert_eq!(consumed, 5);
        let consumed = prepend(b" and ", &mut packed, 11);
        // " and " overlaps its trailing space with " the ".
        assert_eq!(consumed, 4);
        assert_eq!(&packed[7..16], b" and the ");
    }
}
