//! Project warm-up types

use serde::{Deserialize, Serialize};

use crate::infrastructure::services::{ProjectKind, WarmupSource};

/// Either explicit questions or a project kind selecting the sample list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarmRequest {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub kind: Option<ProjectKind>,
}

impl WarmRequest {
    pub fn into_source(self) -> Option<WarmupSource> {
        match (self.questions.is_empty(), self.kind) {
            (false, _) => Some(WarmupSource::Questions(self.questions)),
            (true, Some(kind)) => Some(WarmupSource::Samples(kind)),
            (true, None) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WarmResponse {
    pub status: &'static str,
    pub project_id: String,
}
