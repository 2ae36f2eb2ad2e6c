//! Text normalization and lexical scoring.

use std::collections::HashSet;

/// Minimum token length considered significant for scoring and embedding.
const MIN_TOKEN_LEN: usize = 3;

/// Lowercase, replace punctuation with spaces and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            cleaned.push(ch);
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All tokens of the normalized text.
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Tokens longer than two characters, de-duplicated preserving first-seen
/// order.
pub fn significant_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Jaccard similarity over the token sets of two texts.
///
/// Defined as 0 when both sets are empty.
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let set_a: HashSet<String> = tokens(a).into_iter().collect();
    let set_b: HashSet<String> = tokens(b).into_iter().collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    intersection as f32 / union as f32
}

/// Relative weight of auto content matches vs. manually curated keywords.
///
/// Curated keywords carry more weight than content matches; when an item has
/// no curated keywords the content fraction stands alone.
#[derive(Debug, Clone)]
pub struct LexicalWeights {
    pub content_weight: f32,
    pub manual_weight: f32,
}

impl Default for LexicalWeights {
    fn default() -> Self {
        Self {
            content_weight: 0.3,
            manual_weight: 0.7,
        }
    }
}

/// Weighted fraction of query tokens found in an item's curated keywords
/// and/or body text.
pub fn keyword_match_score(
    query: &str,
    content: &str,
    keywords: &[String],
    weights: &LexicalWeights,
) -> f32 {
    let query_tokens = significant_tokens(query);
    if query_tokens.is_empty() {
        return 0.0;
    }

    let content_norm = normalize(content);
    let content_hits = query_tokens
        .iter()
        .filter(|t| content_norm.contains(t.as_str()))
        .count();
    let content_fraction = content_hits as f32 / query_tokens.len() as f32;

    if keywords.is_empty() {
        return content_fraction;
    }

    // Substring match in either direction: "bill" matches keyword "billing"
    // and keyword "pay" matches token "payment".
    let manual_hits = query_tokens
        .iter()
        .filter(|t| {
            keywords.iter().any(|k| {
                let k = k.to_lowercase();
                k.contains(t.as_str()) || t.contains(&k)
            })
        })
        .count();
    let manual_fraction = manual_hits as f32 / query_tokens.len() as f32;

    weights.content_weight * content_fraction + weights.manual_weight * manual_fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("How do I pay?!  My BILL..."), "how do i pay my bill");
    }

    #[test]
    fn test_significant_tokens_drop_short_and_duplicates() {
        let toks = significant_tokens("to be or not to be, that is the question question");
        assert_eq!(toks, vec!["not", "that", "the", "question"]);
    }

    #[test]
    fn test_jaccard_identity() {
        let sim = jaccard_similarity("hello brave new world", "hello brave new world");
        assert!((sim - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_jaccard_disjoint() {
        assert_eq!(jaccard_similarity("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_jaccard_both_empty() {
        assert_eq!(jaccard_similarity("", "!!!"), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        // sets: {how, do, i, pay} and {pay, your, bill}; intersection 1, union 6
        let sim = jaccard_similarity("how do i pay", "pay your bill");
        assert!((sim - 1.0 / 6.0).abs() < 0.001);
    }

    #[test]
    fn test_keyword_score_without_keywords_is_content_fraction() {
        let score = keyword_match_score(
            "reset my password",
            "Open settings and reset your password there.",
            &[],
            &LexicalWeights::default(),
        );
        // tokens: reset, password — both in content
        assert!((score - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_keyword_score_manual_substring_both_directions() {
        let weights = LexicalWeights::default();

        // query token "bill" inside keyword "billing"
        let score = keyword_match_score("bill", "unrelated", &["billing".to_string()], &weights);
        assert!((score - 0.7).abs() < 0.001);

        // keyword "pay" inside query token "payment"
        let score = keyword_match_score("payment", "unrelated", &["pay".to_string()], &weights);
        assert!((score - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_keyword_score_blends_content_and_manual() {
        let weights = LexicalWeights::default();
        let score = keyword_match_score(
            "how do I pay my bill",
            "Pay your bill from the billing page.",
            &["billing".to_string()],
            &weights,
        );

        // tokens: how, pay, bill; content hits: pay, bill (2/3); manual: bill (1/3)
        let expected = 0.3 * (2.0 / 3.0) + 0.7 * (1.0 / 3.0);
        assert!((score - expected).abs() < 0.001);
    }

    #[test]
    fn test_keyword_score_empty_query_is_zero() {
        let score = keyword_match_score("a b c", "anything", &["a".to_string()], &LexicalWeights::default());
        assert_eq!(score, 0.0);
    }
}
