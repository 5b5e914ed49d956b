//! String similarity scores in `[0, 100]`.
//!
//! `ratio` is `2 * M / T` scaled to a percentage, where `T` is the combined
//! length and `M` the number of characters in matching blocks, found by
//! repeatedly taking the longest common substring and recursing on both
//! sides. `token_set_ratio` first normalises both strings, splits them into
//! token sets and compares the shared tokens against each side's remainder.

use std::collections::BTreeSet;

/// Lowercase, drop non-ASCII characters, and turn everything that is not a
/// letter, digit or `_` into a space.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Longest common block in `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // Run lengths ending at (i - 1, j), indexed by j - blo.
    let mut previous = vec![0usize; bhi - blo];
    for i in alo..ahi {
        let mut current = vec![0usize; bhi - blo];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let run = if j > blo { previous[j - blo - 1] + 1 } else { 1 };
            current[j - blo] = run;
            if run > best_len {
                best_i = i + 1 - run;
                best_j = j + 1 - run;
                best_len = run;
            }
        }
        previous = current;
    }
    (best_i, best_j, best_len)
}

/// Total length of the matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];
    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        let (i, j, len) = longest_match(a, b, (alo, ahi), (blo, bhi));
        if len == 0 {
            continue;
        }
        total += len;
        if alo < i && blo < j {
            pending.push(((alo, i), (blo, j)));
        }
        if i + len < ahi && j + len < bhi {
            pending.push(((i + len, ahi), (j + len, bhi)));
        }
    }
    total
}

/// Similarity of two strings. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let matched = matching_characters(&a, &b);
    let score = 200.0 * matched as f64 / (a.len() + b.len()) as f64;
    score.round() as u8
}

/// Token-set similarity: insensitive to token order, repetition, case and
/// punctuation other than `_`.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let shared = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{shared} {only_a}").trim().to_string();
    let combined_b = format!("{shared} {only_b}").trim().to_string();

    ratio(&shared, &combined_a)
        .max(ratio(&shared, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scores() {
        assert_eq!(token_set_ratio("specular", "specularColor"), 76);
        assert_eq!(token_set_ratio("specular", "specularcolor"), 76);
        assert_eq!(token_set_ratio("coat_color", "coat_ior"), 78);
        assert_eq!(
            token_set_ratio("secondary_specular_color", "secondary_specular_ior"),
            91
        );
        assert_eq!(token_set_ratio("base", "diffusecolor"), 25);
        assert_eq!(token_set_ratio("baseColor", "diffusecolor"), 67);
        assert_eq!(token_set_ratio("specular_color", "specular_bump"), 67);
        assert_eq!(token_set_ratio("subsurface_weight", "subsurface_Color"), 67);
        assert_eq!(token_set_ratio("emission", "emission_weight"), 70);
        assert_eq!(token_set_ratio("diffuse_weight", "diffuseGain"), 64);
    }

    #[test]
    fn test_token_order_and_case_ignored() {
        assert_eq!(token_set_ratio("Base Color", "color base"), 100);
        assert_eq!(token_set_ratio("normal", "normal normal"), 100);
        assert_eq!(token_set_ratio("bump-map", "map bump"), 100);
    }

    #[test]
    fn test_shared_subset_scores_full() {
        assert_eq!(token_set_ratio("coat roughness", "coat"), 100);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(ratio("", ""), 0);
        assert_eq!(ratio("a", ""), 0);
        assert_eq!(token_set_ratio("", "base"), 0);
        assert_eq!(token_set_ratio("!!", "base"), 0);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("abcd", "abce"), 75);
    }

    #[test]
    fn test_matching_blocks_recurse_both_sides() {
        let a: Vec<char> = "xabcyde".chars().collect();
        let b: Vec<char> = "abczdex".chars().collect();
        // "abc" then "de" to the right; the leading "x" cannot pair with the trailing one.
        assert_eq!(matching_characters(&a, &b), 5);
    }
}
