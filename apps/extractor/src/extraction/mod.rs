// Phase 2: turn page text into a structured record through the LLM client.
// One attempt per request; every failure is an ExtractionError the caller turns
// into a warning.

pub mod lenient;
pub mod parse;
pub mod prompts;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::extraction::parse::{parse_record, truncate_chars};
use crate::extraction::prompts::{DIRECT_PROMPT_TEMPLATE, SCHEMA_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, MISSING_FIELDS_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

/// A flat record the LLM can be asked to fill.
pub trait StructuredRecord: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Short machine name, also used as the schema name.
    const KIND: &'static str;
    /// What to extract, phrased for the prompt ("job posting information").
    const SUBJECT: &'static str;
    /// Field list with expected shapes, one per line.
    const FIELD_GUIDE: &'static str;

    fn json_schema() -> Value;

    /// Human-readable identity for log lines.
    fn label(&self) -> Option<&str>;
}

/// How the remote model is asked for the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Free-text instruction listing the fields.
    Direct,
    /// Formal JSON schema sent as `response_format`.
    Schema,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::Direct => "direct",
            ExtractionStrategy::Schema => "schema",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(ExtractionStrategy::Direct),
            "schema" => Ok(ExtractionStrategy::Schema),
            other => Err(format!("unknown extraction strategy '{other}' (expected direct|schema)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("LLM returned invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("LLM output failed validation: {0}")]
    Validation(String),
}

/// Extraction adapter: prompt construction, the LLM call, reply parsing.
#[derive(Clone)]
pub struct Extractor {
    llm: LlmClient,
    max_input_chars: usize,
}

impl Extractor {
    pub fn new(llm: LlmClient, max_input_chars: usize) -> Self {
        Self {
            llm,
            max_input_chars,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    pub async fn extract<R: StructuredRecord>(
        &self,
        text: &str,
        strategy: ExtractionStrategy,
    ) -> Result<R, ExtractionError> {
        info!(kind = R::KIND, %strategy, model = self.llm.model(), "Phase 2: LLM extraction");

        if !self.llm.is_configured() {
            return Err(LlmError::MissingApiKey.into());
        }

        let content = truncate_chars(text, self.max_input_chars);
        let reply = match strategy {
            ExtractionStrategy::Direct => self.llm.complete(&direct_prompt::<R>(content)).await?,
            ExtractionStrategy::Schema => {
                self.llm
                    .complete_structured(
                        JSON_ONLY_SYSTEM,
                        &schema_prompt::<R>(content),
                        R::KIND,
                        &R::json_schema(),
                    )
                    .await?
            }
        };

        let record = parse_record::<R>(&reply)?;
        info!(
            kind = R::KIND,
            label = record.label().unwrap_or("N/A"),
            "LLM extraction successful"
        );
        Ok(record)
    }
}

pub fn direct_prompt<R: StructuredRecord>(content: &str) -> String {
    let fields = format!("{}\n\n{}", R::FIELD_GUIDE, MISSING_FIELDS_INSTRUCTION);
    DIRECT_PROMPT_TEMPLATE
        .trim_start()
        .replace("{subject}", R::SUBJECT)
        .replace("{fields}", &fields)
        .replace("{content}", content)
}

pub fn schema_prompt<R: StructuredRecord>(content: &str) -> String {
    SCHEMA_PROMPT_TEMPLATE
        .replace("{subject}", R::SUBJECT)
        .replace("{content}", content)
}
