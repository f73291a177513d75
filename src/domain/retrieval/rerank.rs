//! Context re-ranking by lexical overlap with the question

use std::collections::HashSet;

use crate::domain::vector_store::RetrievedDocument;

/// Result sets at or below this size are returned untouched
pub const RERANK_MIN_DOCS: usize = 10;
/// Upper bound on documents kept by threshold filtering
pub const MAX_RERANKED_DOCS: usize = 25;

const DOCUMENT_CODE_TERMS: &[&str] = &["function", "class", "method", "import", "return"];
const QUESTION_CODE_TERMS: &[&str] = &["function", "method", "code", "implement"];

fn long_words(text: &str) -> HashSet<&str> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .collect()
}

/// Relevance of one document's text to the question.
///
/// `shared words (> 3 chars) + 2 per question token (> 4 chars) found in the
/// document + 1 if both sides look code-related`. Comparison is lowercase.
pub fn score_document(question: &str, content: &str) -> usize {
    let question_lower = question.to_lowercase();
    let content_lower = content.to_lowercase();

    let keyword_overlap = long_words(&question_lower)
        .intersection(&long_words(&content_lower))
        .count();

    let phrase_bonus = question_lower
        .split_whitespace()
        .filter(|token| token.chars().count() > 4 && content_lower.contains(token))
        .count();

    let code_bonus = DOCUMENT_CODE_TERMS.iter().any(|t| content_lower.contains(t))
        && QUESTION_CODE_TERMS.iter().any(|t| question_lower.contains(t));

    keyword_overlap + 2 * phrase_bonus + usize::from(code_bonus)
}

/// Re-order `documents` by [`score_document`], most relevant first.
///
/// Ties keep retrieval order. With `limit` the top `limit` are returned;
/// otherwise documents scoring at least 30% of the best score are kept, up to
/// [`MAX_RERANKED_DOCS`].
pub fn rerank(
    question: &str,
    documents: Vec<RetrievedDocument>,
    limit: Option<usize>,
) -> Vec<RetrievedDocument> {
    if documents.len() <= RERANK_MIN_DOCS {
        return documents;
    }

    let mut scored: Vec<(usize, RetrievedDocument)> = documents
        .into_iter()
        .map(|doc| (score_document(question, &doc.content), doc))
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    if let Some(limit) = limit {
        return scored.into_iter().take(limit).map(|(_, doc)| doc).collect();
    }

    let top = scored.first().map(|(score, _)| *score).unwrap_or(0);
    let min_useful = top as f64 * 0.3;

    scored
        .into_iter()
        .filter(|(score, _)| *score as f64 >= min_useful)
        .take(MAX_RERANKED_DOCS)
        .map(|(_, doc)| doc)
        .collect()
}
