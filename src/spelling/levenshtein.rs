//! Edit distance functions.

use std::cmp::min;
use std::mem;

/// Calculate the Levenshtein distance between two strings.
/// This is the minimum number of single-character edits (insertions, deletions, or substitutions)
/// required to change one word into another.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    let mut prev_row: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut curr_row = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            curr_row[j + 1] = min(
                min(
                    prev_row[j + 1] + 1, // deletion
                    curr_row[j] + 1,     // insertion
                ),
                prev_row[j] + cost, // substitution
            );
        }
        mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[s2_chars.len()]
}

/// Damerau-Levenshtein distance in its optimal string alignment variant.
///
/// Adjacent transpositions count as one edit, but no substring is edited
/// more than once, so `"ca"` to `"abc"` is 3 rather than 2.
/// Returns `None` if the distance exceeds `max_distance`.
pub fn damerau_levenshtein_osa(a: &str, b: &str, max_distance: usize) -> Option<usize> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // Early termination if length difference exceeds threshold
    if a_chars.len().abs_diff(b_chars.len()) > max_distance {
        return None;
    }

    let b_len = b_chars.len();
    let mut prev_two: Vec<usize> = (0..=b_len).collect();
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, &a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;

        for (j, &b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = min(curr[j] + 1, min(prev[j + 1] + 1, prev[j] + cost));

            if i > 0 && j > 0 && a_char == b_chars[j - 1] && a_chars[i - 1] == b_char && cost == 1 {
                curr[j + 1] = min(curr[j + 1], prev_two[j - 1] + 1);
            }
        }

        mem::swap(&mut prev_two, &mut prev);
        mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b_len];
    (distance <= max_distance).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("", "а"), 1);
        assert_eq!(levenshtein_distance("а", ""), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("серед", "сереод"), 1);
        assert_eq!(levenshtein_distance("живу", "жвиу"), 2); // transposition
    }

    #[test]
    fn test_osa_transposition() {
        assert_eq!(damerau_levenshtein_osa("живу", "жвиу", 2), Some(1));
        assert_eq!(damerau_levenshtein_osa("ab", "ba", 1), Some(1));
        assert_eq!(damerau_levenshtein_osa("ca", "abc", 3), Some(3));
    }

    #[test]
    fn test_osa_threshold() {
        assert_eq!(damerau_levenshtein_osa("kitten", "sitting", 3), Some(3));
        assert_eq!(damerau_levenshtein_osa("kitten", "sitting", 2), None);
        assert_eq!(damerau_levenshtein_osa("слово", "слово", 0), Some(0));
        assert_eq!(damerau_levenshtein_osa("а", "абв", 1), None);
        assert_eq!(damerau_levenshtein_osa("", "аб", 2), Some(2));
    }

    #[test]
    fn test_osa_counts_chars_not_bytes() {
        // Cyrillic letters are two bytes each
        assert_eq!(damerau_levenshtein_osa("привіт", "привет", 2), Some(1));
        assert_eq!(damerau_levenshtein_osa("їжак", "ижак", 1), Some(1));
    }
}
