//! Infrastructure services

mod answering_service;
mod test_synthesis_service;
mod warmup_service;

pub use answering_service::{
    format_context, split_fragments, AnswerRequest, AnsweringService, FragmentStream,
};
pub use test_synthesis_service::{test_prompt_variant, SynthesizedTest, TestSynthesisService};
pub use warmup_service::{
    parse_sample_questions, ProjectKind, WarmupService, WarmupSource, WarmupSummary,
};
