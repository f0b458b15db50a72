//! Word n-gram expansion over analyzed terms.

/// Expand a term sequence into all word n-grams with `min_n <= n <= max_n`.
///
/// Unigrams come first, then bigrams, and so on; n-grams longer than one word
/// are the consecutive terms joined by a single space.
///
/// ```
/// use spam_detector::analysis::ngram::word_ngrams;
///
/// let terms = vec!["call".to_string(), "now".to_string(), "free".to_string()];
/// assert_eq!(
///     word_ngrams(&terms, 1, 2),
///     vec!["call", "now", "free", "call now", "now free"]
/// );
/// ```
pub fn word_ngrams(terms: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let min_n = min_n.max(1);
    let mut ngrams = Vec::new();

    for n in min_n..=max_n {
        if n > terms.len() {
            break;
        }
        if n == 1 {
            ngrams.extend(terms.iter().cloned());
            continue;
        }
        ngrams.extend(terms.windows(n).map(|window| window.join(" ")));
    }

    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_unigrams_only() {
        let t = terms(&["win", "cash"]);
        assert_eq!(word_ngrams(&t, 1, 1), vec!["win", "cash"]);
    }

    #[test]
    fn test_bigrams_only() {
        let t = terms(&["win", "cash", "now"]);
        assert_eq!(word_ngrams(&t, 2, 2), vec!["win cash", "cash now"]);
    }

    #[test]
    fn test_short_input() {
        let t = terms(&["hi"]);
        assert_eq!(word_ngrams(&t, 1, 3), vec!["hi"]);
        assert!(word_ngrams(&[], 1, 2).is_empty());
    }

    #[test]
    fn test_repeated_terms_are_kept() {
        let t = terms(&["free", "free", "free"]);
        assert_eq!(
            word_ngrams(&t, 1, 2),
            vec!["free", "free", "free", "free free", "free free"]
        );
    }
}
