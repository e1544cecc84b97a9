//! Prompt issue detection.
//!
//! Detectors are an ordered list of [`Rule`]s evaluated uniformly: each rule
//! scores the prompt, and if the score crosses its threshold it contributes
//! exactly one [`PromptIssue`]. Issues come back in rule order
//! (repetition, verbosity, large-tokens, cost-warning), never sorted by
//! severity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cost::{average_cost, get_cost_breakdown};
use crate::pricing::{default_catalog, CostThresholds, ModelPricing};
use crate::tokens::{estimate_output_tokens_with_ratio, OUTPUT_RATIO};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Repetition,
    Verbosity,
    LargeTokens,
    CostWarning,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repetition => "repetition",
            Self::Verbosity => "verbosity",
            Self::LargeTokens => "large-tokens",
            Self::CostWarning => "cost-warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A single inefficiency found in a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

/// Tunable detector thresholds.
///
/// The defaults carry no calibration beyond matching long-standing
/// behaviour; they are exposed so they can be tuned from config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerThresholds {
    /// Only words longer than this many characters count as repeats.
    pub repetition_min_word_len: usize,
    /// Occurrences of a word tolerated before each extra one counts.
    pub repetition_allowed_occurrences: usize,
    pub repetition_issue: f64,
    pub repetition_high: f64,
    pub verbosity_words_per_sentence: f64,
    pub verbosity_scale: f64,
    pub verbosity_issue: f64,
    pub verbosity_high: f64,
    pub large_tokens: usize,
    pub large_tokens_high: usize,
}

impl Default for AnalyzerThresholds {
    fn default() -> Self {
        Self {
            repetition_min_word_len: 3,
            repetition_allowed_occurrences: 2,
            repetition_issue: 0.1,
            repetition_high: 0.2,
            verbosity_words_per_sentence: 25.0,
            verbosity_scale: 10.0,
            verbosity_issue: 0.5,
            verbosity_high: 1.0,
            large_tokens: 1000,
            large_tokens_high: 2000,
        }
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Number of whitespace-separated fragments in `text`.
///
/// Leading and trailing whitespace each add one empty fragment, so
/// `"a b\n"` has three. Piped input usually ends in a newline and scores
/// accordingly.
pub fn word_count(text: &str) -> usize {
    let edges = [
        text.starts_with(char::is_whitespace),
        text.ends_with(char::is_whitespace),
    ];
    text.split_whitespace().count() + edges.iter().filter(|&&edge| edge).count()
}

/// Fraction of words that are excess repeats of longer words.
///
/// Words are whitespace-separated and compared case-insensitively. For each
/// word longer than `repetition_min_word_len` seen more than
/// `repetition_allowed_occurrences` times, the surplus is summed and divided
/// by [`word_count`].
pub fn repetition_score(text: &str, thresholds: &AnalyzerThresholds) -> f64 {
    let lower = text.to_lowercase();
    let total = word_count(&lower);
    if total == 0 {
        return 0.0;
    }
    let words: Vec<&str> = lower.split_whitespace().collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in &words {
        if word.chars().count() > thresholds.repetition_min_word_len {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let allowed = thresholds.repetition_allowed_occurrences;
    let surplus: usize = counts
        .values()
        .filter(|&&count| count > allowed)
        .map(|count| count - allowed)
        .sum();

    surplus as f64 / total as f64
}

/// Average words per sentence above the verbosity baseline, scaled.
///
/// Sentences are split on `.`, `!` and `?`; fragments that are blank are
/// discarded. Returns 0 when there are no sentences or the average is at or
/// below `verbosity_words_per_sentence`.
pub fn verbosity_score(text: &str, thresholds: &AnalyzerThresholds) -> f64 {
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentences == 0 {
        return 0.0;
    }

    let words = word_count(text) as f64;
    let avg = words / sentences as f64;
    let baseline = thresholds.verbosity_words_per_sentence;
    if avg > baseline {
        (avg - baseline) / thresholds.verbosity_scale
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Rule engine
// ---------------------------------------------------------------------------

/// One detector: how to score, when to fire, and what to report.
struct Rule {
    kind: IssueKind,
    score: fn(&Analyzer<'_>, &str, usize) -> f64,
    fires: fn(&Analyzer<'_>, f64) -> bool,
    severity: fn(&Analyzer<'_>, f64) -> Severity,
    message: fn(f64) -> String,
    suggestion: &'static str,
}

const RULES: [Rule; 4] = [
    Rule {
        kind: IssueKind::Repetition,
        score: |a, text, _| repetition_score(text, &a.thresholds),
        fires: |a, score| score > a.thresholds.repetition_issue,
        severity: |a, score| medium_or_high(score > a.thresholds.repetition_high),
        message: |_| "Excessive word repetition detected".to_string(),
        suggestion: "Remove repeated words and phrases to reduce token count",
    },
    Rule {
        kind: IssueKind::Verbosity,
        score: |a, text, _| verbosity_score(text, &a.thresholds),
        fires: |a, score| score > a.thresholds.verbosity_issue,
        severity: |a, score| medium_or_high(score > a.thresholds.verbosity_high),
        message: |_| "Prompt is overly verbose".to_string(),
        suggestion: "Use shorter, more concise sentences to reduce tokens",
    },
    Rule {
        kind: IssueKind::LargeTokens,
        score: |_, _, tokens| tokens as f64,
        fires: |a, score| score > a.thresholds.large_tokens as f64,
        severity: |a, score| medium_or_high(score > a.thresholds.large_tokens_high as f64),
        message: |score| format!("Large token count ({} tokens)", score as usize),
        suggestion: "Consider breaking this into smaller prompts or removing unnecessary details",
    },
    Rule {
        kind: IssueKind::CostWarning,
        score: |a, _, tokens| a.average_cost(tokens),
        fires: |a, score| score > a.cost_thresholds.moderate,
        severity: |a, score| medium_or_high(score > a.cost_thresholds.expensive),
        message: |score| format!("High estimated cost (${score:.4} average)"),
        suggestion: "Optimize prompt length to reduce costs",
    },
];

fn medium_or_high(high: bool) -> Severity {
    if high {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Runs the detector rules against a pricing catalog and thresholds.
///
/// Holds no state between calls; construct one per configuration and reuse
/// it freely.
#[derive(Debug, Clone)]
pub struct Analyzer<'a> {
    pub catalog: &'a [ModelPricing],
    pub cost_thresholds: CostThresholds,
    pub thresholds: AnalyzerThresholds,
    pub output_ratio: f64,
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl<'a> Analyzer<'a> {
    pub fn new(catalog: &'a [ModelPricing]) -> Self {
        Self {
            catalog,
            cost_thresholds: CostThresholds::default(),
            thresholds: AnalyzerThresholds::default(),
            output_ratio: OUTPUT_RATIO,
        }
    }

    pub fn with_cost_thresholds(mut self, thresholds: CostThresholds) -> Self {
        self.cost_thresholds = thresholds;
        self
    }

    pub fn with_thresholds(mut self, thresholds: AnalyzerThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_output_ratio(mut self, ratio: f64) -> Self {
        self.output_ratio = ratio;
        self
    }

    /// Mean total cost across the catalog for `tokens` in and the
    /// estimated reply out.
    pub fn average_cost(&self, tokens: usize) -> f64 {
        let output = estimate_output_tokens_with_ratio(tokens, self.output_ratio);
        average_cost(&get_cost_breakdown(self.catalog, tokens, output))
    }

    /// Evaluate every rule in order and collect the issues that fire.
    pub fn analyze(&self, text: &str, tokens: usize) -> Vec<PromptIssue> {
        RULES
            .iter()
            .filter_map(|rule| {
                let score = (rule.score)(self, text, tokens);
                if !(rule.fires)(self, score) {
                    return None;
                }
                Some(PromptIssue {
                    kind: rule.kind,
                    severity: (rule.severity)(self, score),
                    message: (rule.message)(score),
                    suggestion: rule.suggestion.to_string(),
                })
            })
            .collect()
    }
}

/// Analyze `text` against the built-in catalog and default thresholds.
pub fn analyze_prompt(text: &str, tokens: usize) -> Vec<PromptIssue> {
    Analyzer::default().analyze(text, tokens)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(issues: &[PromptIssue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn concise_prompt_has_no_issues() {
        let text = "Write a Python function to calculate fibonacci numbers using memoization.";
        assert!(analyze_prompt(text, 14).is_empty());
    }

    #[test]
    fn empty_prompt_has_no_issues() {
        assert!(analyze_prompt("", 0).is_empty());
        assert_eq!(repetition_score("", &AnalyzerThresholds::default()), 0.0);
        assert_eq!(verbosity_score("", &AnalyzerThresholds::default()), 0.0);
    }

    #[test]
    fn heavy_repetition_is_high() {
        // "apple" x5 among 9 words: (5 - 2) / 9 = 0.33
        let text = "apple apple apple apple apple is a red fruit";
        let score = repetition_score(text, &AnalyzerThresholds::default());
        assert!(score > 0.2);

        let issues = analyze_prompt(text, 9);
        assert_eq!(kinds(&issues), vec![IssueKind::Repetition]);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].message, "Excessive word repetition detected");
    }

    #[test]
    fn moderate_repetition_is_medium() {
        // "token" x4 among 16 words: 2 / 16 = 0.125
        let text = "token one two three token four five six token seven eight nine token ten eleven twelve";
        let issues = analyze_prompt(text, 16);
        assert_eq!(kinds(&issues), vec![IssueKind::Repetition]);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn repetition_ignores_case_and_short_words() {
        let t = AnalyzerThresholds::default();
        assert!(repetition_score("Data DATA data data", &t) > 0.0);
        assert_eq!(repetition_score("the the the the the", &t), 0.0);
    }

    #[test]
    fn edge_whitespace_counts_as_a_word() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("a b"), 2);
        assert_eq!(word_count("a b\n"), 3);
        assert_eq!(word_count("  a  b  "), 4);
        assert_eq!(word_count(" "), 2);
    }

    #[test]
    fn trailing_newline_dilutes_repetition() {
        let t = AnalyzerThresholds::default();
        // 1 surplus "data" over 9 words fires; over 10 fragments it sits at 0.1.
        let text = "data data data x y z w v q";
        assert!((repetition_score(text, &t) - 1.0 / 9.0).abs() < 1e-9);
        assert_eq!(kinds(&analyze_prompt(text, 7)), vec![IssueKind::Repetition]);

        let piped = format!("{text}\n");
        assert!((repetition_score(&piped, &t) - 0.1).abs() < 1e-9);
        assert!(analyze_prompt(&piped, 7).is_empty());
    }

    #[test]
    fn long_run_on_sentence_is_verbose() {
        let words = vec!["word"; 40].join(" ");
        let text = format!("{words}.");
        // avg 40 -> (40 - 25) / 10 = 1.5
        let score = verbosity_score(&text, &AnalyzerThresholds::default());
        assert!((score - 1.5).abs() < 1e-9);

        let mixed: String = (0..40).map(|i| format!("w{i} ")).collect();
        let issues = analyze_prompt(&format!("{}.", mixed.trim()), 40);
        assert_eq!(kinds(&issues), vec![IssueKind::Verbosity]);
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn verbosity_medium_band() {
        // avg 32 -> 0.7
        let text: String = (0..32).map(|i| format!("w{i} ")).collect();
        let issues = analyze_prompt(&format!("{}!", text.trim()), 32);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn punctuation_only_has_no_sentences() {
        assert_eq!(verbosity_score("...!!!???", &AnalyzerThresholds::default()), 0.0);
    }

    #[test]
    fn large_token_count_is_reported_with_count() {
        let issues = analyze_prompt("short", 2500);
        let large = issues
            .iter()
            .find(|i| i.kind == IssueKind::LargeTokens)
            .unwrap();
        assert_eq!(large.severity, Severity::High);
        assert!(large.message.contains("2500 tokens"));

        let issues = analyze_prompt("short", 1500);
        assert_eq!(issues[0].kind, IssueKind::LargeTokens);
        assert_eq!(issues[0].severity, Severity::Medium);

        assert!(analyze_prompt("short", 1000).is_empty());
    }

    #[test]
    fn cost_warning_uses_catalog_average() {
        // One model at $1/1K in and out: 100 tokens in, 175 out -> $0.275.
        let catalog = vec![ModelPricing::new("Pricey", 1.0, 1.0, "#000", "x")];
        let analyzer = Analyzer::new(&catalog);
        let issues = analyzer.analyze("short", 100);
        assert_eq!(kinds(&issues), vec![IssueKind::CostWarning]);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].message, "High estimated cost ($0.2750 average)");

        // Adding a free model halves the average to $0.1375, still high.
        let catalog = vec![
            ModelPricing::new("Pricey", 1.0, 1.0, "#000", "x"),
            ModelPricing::new("Free", 0.0, 0.0, "#000", "y"),
        ];
        let issues = Analyzer::new(&catalog).analyze("short", 100);
        assert_eq!(issues[0].severity, Severity::High);

        // 40 tokens in, 70 out -> $0.11 / 2 = $0.055, medium.
        let issues = Analyzer::new(&catalog).analyze("short", 40);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn default_catalog_warns_on_very_large_prompts() {
        let issues = analyze_prompt("short", 20_000);
        assert_eq!(
            kinds(&issues),
            vec![IssueKind::LargeTokens, IssueKind::CostWarning]
        );
    }

    #[test]
    fn issues_follow_rule_order() {
        let repeated = vec!["repeat"; 60].join(" ");
        let issues = analyze_prompt(&repeated, 30_000);
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::Repetition,
                IssueKind::Verbosity,
                IssueKind::LargeTokens,
                IssueKind::CostWarning,
            ]
        );
    }

    #[test]
    fn thresholds_are_configurable() {
        let thresholds = AnalyzerThresholds {
            large_tokens: 10,
            large_tokens_high: 20,
            ..AnalyzerThresholds::default()
        };
        let analyzer = Analyzer::default().with_thresholds(thresholds);
        let issues = analyzer.analyze("short", 15);
        assert_eq!(issues[0].kind, IssueKind::LargeTokens);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn issue_serializes_with_type_tag() {
        let issues = analyze_prompt("short", 2500);
        let json = serde_json::to_value(&issues[0]).unwrap();
        assert_eq!(json["type"], "large-tokens");
        assert_eq!(json["severity"], "high");
    }
}
