//! Retrieval sizing from question shape

const SIMPLE_CUES: &[&str] = &["what is", "list", "show me", "which"];
const COMPLEX_CUES: &[&str] = &["explain", "how does", "why", "architecture", "workflow"];
const MEDIUM_CUES: &[&str] = &["describe", "tell me about", "summarize"];

/// Coarse question classification driving the document count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionComplexity {
    Simple,
    Medium,
    Complex,
    /// No cue matched and the question has at most 5 words
    Short,
    /// No cue matched and the question has at least 15 words
    Long,
    /// No cue matched, 6 to 14 words
    Regular,
}

impl QuestionComplexity {
    /// Cue checks run in priority order simple > complex > medium, so
    /// "what is the architecture" is simple.
    pub fn classify(question: &str) -> Self {
        let lower = question.to_lowercase();
        let has_any = |cues: &[&str]| cues.iter().any(|cue| lower.contains(cue));

        if has_any(SIMPLE_CUES) {
            return Self::Simple;
        }
        if has_any(COMPLEX_CUES) {
            return Self::Complex;
        }
        if has_any(MEDIUM_CUES) {
            return Self::Medium;
        }

        match question.split_whitespace().count() {
            0..=5 => Self::Short,
            15.. => Self::Long,
            _ => Self::Regular,
        }
    }
}

/// Number of documents to fetch for `question`, never above `max_docs`
pub fn size_retrieval(question: &str, max_docs: usize) -> usize {
    match QuestionComplexity::classify(question) {
        QuestionComplexity::Simple => max_docs.min(15.max(max_docs / 3)),
        QuestionComplexity::Complex | QuestionComplexity::Long => max_docs,
        QuestionComplexity::Medium => max_docs.min(20.max(max_docs * 7 / 10)),
        QuestionComplexity::Short => max_docs.min(12.max(max_docs / 4)),
        QuestionComplexity::Regular => max_docs.min(18.max(max_docs * 6 / 10)),
    }
}
