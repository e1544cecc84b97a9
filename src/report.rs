//! Analysis and export payloads.
//!
//! [`Analysis`] bundles everything the engine derives from one piece of text.
//! [`ExportReport`] is the export payload: the current draft's analysis,
//! every saved prompt with freshly computed costs, and the selected subset.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::analyzer::{Analyzer, PromptIssue};
use crate::cost::{get_cost_breakdown, CostBreakdown};
use crate::history::Prompt;
use crate::suggestions::generate_optimization_suggestions;
use crate::tokens::{estimate_output_tokens_with_ratio, TokenEstimator};

/// Everything derived from one prompt text.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub text: String,
    pub tokens: usize,
    pub estimated_output_tokens: usize,
    /// Name of the estimator that produced `tokens`.
    pub tokenizer: String,
    pub costs: Vec<CostBreakdown>,
    pub issues: Vec<PromptIssue>,
    pub suggestions: Vec<String>,
}

impl Analysis {
    pub fn new(text: &str, estimator: &dyn TokenEstimator, analyzer: &Analyzer<'_>) -> Self {
        let tokens = estimator.estimate(text);
        let estimated_output_tokens = estimate_output_tokens_with_ratio(tokens, analyzer.output_ratio);
        Self {
            text: text.to_string(),
            tokens,
            estimated_output_tokens,
            tokenizer: estimator.name().to_string(),
            costs: get_cost_breakdown(analyzer.catalog, tokens, estimated_output_tokens),
            issues: analyzer.analyze(text, tokens),
            suggestions: generate_optimization_suggestions(text),
        }
    }

    pub fn total_tokens(&self) -> usize {
        self.tokens + self.estimated_output_tokens
    }
}

/// A saved prompt priced against the current catalog.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PricedPrompt {
    #[serde(flatten)]
    pub prompt: Prompt,
    pub costs: Vec<CostBreakdown>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// RFC 3339 generation time.
    pub timestamp: String,
    pub current_prompt: Option<Analysis>,
    pub saved_prompts: Vec<PricedPrompt>,
    pub selected_prompts: Vec<Prompt>,
}

impl ExportReport {
    /// Assemble the payload. Saved prompts are repriced from their stored
    /// token counts, so catalog changes apply to old records too.
    pub fn build(
        generated_at: DateTime<Utc>,
        current: Option<Analysis>,
        prompts: &[Prompt],
        selected: &[Prompt],
        analyzer: &Analyzer<'_>,
    ) -> Self {
        let saved_prompts = prompts
            .iter()
            .map(|p| PricedPrompt {
                prompt: p.clone(),
                costs: get_cost_breakdown(analyzer.catalog, p.tokens, p.estimated_output_tokens),
            })
            .collect();

        Self {
            timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            current_prompt: current,
            saved_prompts,
            selected_prompts: selected.to_vec(),
        }
    }
}
