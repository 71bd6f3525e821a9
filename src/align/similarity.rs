use std::collections::HashMap;

/// Normalize text for fuzzy comparison.
///
/// Lowercases, drops every character outside `[a-z0-9]` and whitespace,
/// then collapses whitespace runs to one space. Applying it twice is a no-op.
pub fn normalize_text(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two texts after normalization, in `[0, 1]`
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    sequence_ratio(a.as_bytes(), b.as_bytes())
}

/// `2 * M / T` over the matching blocks of `a` and `b`.
///
/// Two empty inputs are considered identical.
pub fn sequence_ratio<T: Eq + std::hash::Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = SequenceMatcher::new(a, b)
        .matching_blocks()
        .iter()
        .map(|block| block.size)
        .sum();

    2.0 * matched as f64 / total as f64
}

/// A run of `size` equal elements at `a[a_start..]` and `b[b_start..]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Ratcliff/Obershelp matcher: take the longest common run, then recurse
/// on the unmatched pieces to its left and right.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + std::hash::Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest equal run inside `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Among equally long runs the one starting earliest in `a` wins, then
    /// earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let mut best = MatchingBlock {
            a_start: alo,
            b_start: blo,
            size: 0,
        };
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best.size {
                        best = MatchingBlock {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next_j2len;
        }

        best
    }

    /// All matching blocks, sorted by position, adjacent blocks merged
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a_start && blo < m.b_start {
                queue.push((alo, m.a_start, blo, m.b_start));
            }
            if m.a_start + m.size < ahi && m.b_start + m.size < bhi {
                queue.push((m.a_start + m.size, ahi, m.b_start + m.size, bhi));
            }
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.a_start + last.size == block.a_start
                        && last.b_start + last.size == block.b_start =>
                {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("  WAR FEVER ran high,\n\tin the little   town!"),
            "war fever ran high in the little town"
        );
        assert_eq!(normalize_text("Bill's — story"), "bills story");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "a - b",
            "Hello,   World!\n\nAgain",
            "  “Quoted” text… with 123 numbers ",
            "",
            "ÉCOLE über",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_ratio_identical_is_one() {
        assert_eq!(similarity_score("The same text.", "the SAME text"), 1.0);
        assert_eq!(sequence_ratio::<u8>(&[], &[]), 1.0);
    }

    #[test]
    fn test_ratio_disjoint_is_zero() {
        assert_eq!(sequence_ratio(b"abc", b"xyz"), 0.0);
        assert_eq!(sequence_ratio(b"abc", b""), 0.0);
    }

    #[test]
    fn test_ratio_known_values() {
        // "abcd" vs "bcde": one block "bcd" of 3 -> 6 / 8
        assert!((sequence_ratio(b"abcd", b"bcde") - 0.75).abs() < 1e-9);
        // classic difflib example
        let ratio = sequence_ratio(b"qabxcd", b"abycdf");
        assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_matching_blocks_are_ordered_and_merged() {
        let matcher = SequenceMatcher::new(b"abxcd".as_slice(), b"abcd".as_slice());
        let blocks = matcher.matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchingBlock { a_start: 0, b_start: 0, size: 2 },
                MatchingBlock { a_start: 3, b_start: 2, size: 2 },
            ]
        );
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let matcher = SequenceMatcher::new(b"abab".as_slice(), b"ab".as_slice());
        let m = matcher.find_longest_match(0, 4, 0, 2);
        assert_eq!((m.a_start, m.b_start, m.size), (0, 0, 2));
    }

    #[test]
    fn test_prefix_scores_high() {
        // 18 shared chars out of 18 + 37
        let score = similarity_score("WAR FEVER ran high", "WAR FEVER ran high in the little town");
        assert!((score - 36.0 / 55.0).abs() < 1e-9, "score was {}", score);
    }
}
