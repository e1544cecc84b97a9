//! Pricing catalog: per-model token rates, cost severity thresholds, and
//! the request rates used for the projection ladder.
//!
//! The built-in catalog is pure data. A config file can replace it with
//! its own `[[models]]` table; see [`crate::config::Config::catalog`].

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One priced model configuration.
///
/// Preconditions (not checked by the cost engine): `name` is unique within
/// its catalog and both rates are non-negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelPricing {
    pub name: String,
    /// USD per 1000 input tokens.
    #[serde(rename = "inputCostPer1K", alias = "input_cost_per_1k")]
    pub input_cost_per_1k: f64,
    /// USD per 1000 output tokens.
    #[serde(rename = "outputCostPer1K", alias = "output_cost_per_1k")]
    pub output_cost_per_1k: f64,
    /// Display color as a hex string (e.g. `#10b981`).
    pub color: String,
    pub provider: String,
}

impl ModelPricing {
    pub fn new(
        name: impl Into<String>,
        input_cost_per_1k: f64,
        output_cost_per_1k: f64,
        color: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_cost_per_1k,
            output_cost_per_1k,
            color: color.into(),
            provider: provider.into(),
        }
    }

    /// True for free tiers (both rates zero).
    pub fn is_free(&self) -> bool {
        self.input_cost_per_1k == 0.0 && self.output_cost_per_1k == 0.0
    }
}

/// Ascending breakpoints for the cheap / moderate / expensive tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostThresholds {
    pub cheap: f64,
    pub moderate: f64,
    pub expensive: f64,
}

impl Default for CostThresholds {
    fn default() -> Self {
        Self {
            cheap: 0.01,
            moderate: 0.05,
            expensive: 0.1,
        }
    }
}

/// Frequencies used for the projection ladder (monthly cost per rung).
pub const PROJECTION_LADDER: [u64; 6] = [1, 10, 50, 100, 500, 1000];

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

static DEFAULT_CATALOG: LazyLock<Vec<ModelPricing>> = LazyLock::new(|| {
    vec![
        // OpenAI
        ModelPricing::new("GPT-4", 0.03, 0.06, "#10b981", "OpenAI"),
        ModelPricing::new("GPT-3.5-turbo", 0.0015, 0.002, "#3b82f6", "OpenAI"),
        // Anthropic
        ModelPricing::new("Claude Sonnet", 0.003, 0.015, "#8b5cf6", "Anthropic"),
        ModelPricing::new("Claude Haiku", 0.00025, 0.00125, "#ec4899", "Anthropic"),
        // Google
        ModelPricing::new("Gemini 1.5 Pro", 0.00125, 0.005, "#f59e0b", "Google"),
        ModelPricing::new("Gemini 1.5 Flash", 0.000075, 0.0003, "#14b8a6", "Google"),
        ModelPricing::new("Gemini 2.0 Flash", 0.0, 0.0, "#06b6d4", "Google"),
        // Groq
        ModelPricing::new("Llama 3.1 70B (Groq)", 0.00059, 0.00079, "#ef4444", "Groq"),
        ModelPricing::new("Llama 3.1 8B (Groq)", 0.00005, 0.00008, "#f97316", "Groq"),
        ModelPricing::new("Mixtral 8x7B (Groq)", 0.00024, 0.00024, "#84cc16", "Groq"),
    ]
});

/// The built-in pricing catalog, in display order.
pub fn default_catalog() -> &'static [ModelPricing] {
    &DEFAULT_CATALOG
}

/// Distinct provider names in catalog order.
pub fn providers(catalog: &[ModelPricing]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for model in catalog {
        if !out.contains(&model.provider.as_str()) {
            out.push(&model.provider);
        }
    }
    out
}

/// Look up a model by name (case-insensitive).
pub fn find_model<'a>(catalog: &'a [ModelPricing], name: &str) -> Option<&'a ModelPricing> {
    catalog.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
