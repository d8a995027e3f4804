//! Product text in, translated title and description out.
//!
//! Only a malformed model answer is handled here. Model and translation
//! failures are returned to the caller as they are, and nothing is retried.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extract::candidate_json;
use crate::language::Language;
use crate::llm::ModelProvider;
use crate::prompt::{ANSWER_MARKER, build_prompt};
use crate::record::{GeneratedRecord, MALFORMED_RESPONSE_MESSAGE, TranslatedRecord};
use crate::translation::Translator;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter product information.";

/// A single user submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub text: String,
    pub language: Language,
}

impl ProductQuery {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: text.into(),
            language,
        }
    }
}

/// Failures the pipeline does not recover from.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,
    #[error("text generation failed: {0:#}")]
    Generation(#[source] anyhow::Error),
    #[error("translation failed: {0:#}")]
    Translation(#[source] anyhow::Error),
}

/// What the user gets to see for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Candidate JSON cut out of the model answer, shown whatever happens next.
    pub json_answer: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Translated(TranslatedRecord),
    /// The answer was not a usable record; carries the user-facing message.
    Malformed(&'static str),
}

/// Runs prompt → model → extraction → validation → translation.
pub struct Pipeline<M: ModelProvider, T: Translator> {
    model: M,
    translator: T,
}

impl<M: ModelProvider, T: Translator> Pipeline<M, T> {
    pub fn new(model: M, translator: T) -> Self {
        Self { model, translator }
    }

    pub async fn run(&self, query: &ProductQuery) -> Result<PipelineOutput, PipelineError> {
        if query.text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let prompt = build_prompt(&query.text);
        let completion = self
            .model
            .generate(&prompt)
            .await
            .map_err(PipelineError::Generation)?;

        let json_answer = candidate_json(&completion, ANSWER_MARKER);
        debug!("Candidate answer: {}", json_answer);

        let record = match GeneratedRecord::parse(&json_answer) {
            Ok(record) => record,
            Err(e) => {
                warn!("Discarding model answer: {}", e);
                return Ok(PipelineOutput {
                    json_answer,
                    outcome: Outcome::Malformed(MALFORMED_RESPONSE_MESSAGE),
                });
            }
        };

        let title = self
            .translator
            .translate(&record.title, query.language)
            .await
            .map_err(PipelineError::Translation)?;
        let description = self
            .translator
            .translate(&record.description, query.language)
            .await
            .map_err(PipelineError::Translation)?;
        info!("Generated listing translated into {}", query.language);

        Ok(PipelineOutput {
            json_answer,
            outcome: Outcome::Translated(TranslatedRecord { title, description }),
        })
    }
}
