//! Generation engine domain traits

mod provider;

pub use provider::{LlmProvider, LlmStream};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
