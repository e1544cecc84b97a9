//! Token estimation for prompt costing.
//!
//! Provides a trait-based architecture for token counting. The default
//! [`BpeEstimator`] segments text with the `cl100k_base` vocabulary used by
//! GPT-family models and falls back to a character heuristic if the encoder
//! cannot be loaded or fails on the input. Counts are an approximation of
//! what any particular vendor bills, not an exact match.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock};

use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::{debug, warn};

/// Output tokens expected per input token for a typical conversational reply.
pub const OUTPUT_RATIO: f64 = 1.75;

/// Characters per token used by the heuristic estimator.
pub const CHARS_PER_TOKEN: f64 = 4.0;

// ---------------------------------------------------------------------------
// Trait (extensibility point)
// ---------------------------------------------------------------------------

/// Estimates token counts for a given text.
///
/// Implementations must be total: any string maps to a count, never an
/// error. All implementations must be thread-safe.
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in `text`.
    fn estimate(&self, text: &str) -> usize;

    /// Short name of the counting method, shown in reports.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Character-based estimator
// ---------------------------------------------------------------------------

/// Token estimator that uses a character-count heuristic.
///
/// Also serves as the fallback path of [`BpeEstimator`].
#[derive(Debug, Clone)]
pub struct CharEstimator {
    chars_per_token: f64,
}

impl CharEstimator {
    pub fn new(chars_per_token: f64) -> Self {
        Self { chars_per_token }
    }
}

impl Default for CharEstimator {
    fn default() -> Self {
        Self::new(CHARS_PER_TOKEN)
    }
}

impl TokenEstimator for CharEstimator {
    fn estimate(&self, text: &str) -> usize {
        if text.trim().is_empty() {
            return 0;
        }
        let chars = text.chars().count() as f64;
        (chars / self.chars_per_token).ceil() as usize
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

// ---------------------------------------------------------------------------
// BPE estimator
// ---------------------------------------------------------------------------

// Loaded once per process; `None` when the vocabulary failed to load.
static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();

// Serializes panic-hook swaps so concurrent encodes restore the right hook.
static HOOK_LOCK: Mutex<()> = Mutex::new(());

fn cl100k() -> Option<&'static CoreBPE> {
    CL100K
        .get_or_init(|| match cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(err) => {
                warn!("failed to load cl100k_base tokenizer, using heuristic: {err}");
                None
            }
        })
        .as_ref()
}

fn cl100k_len(text: &str) -> usize {
    cl100k().map_or(0, |bpe| bpe.encode_with_special_tokens(text).len())
}

/// Primary token counter behind [`BpeEstimator`]. It may panic.
pub type EncodeFn = fn(&str) -> usize;

/// Byte-pair-encoding estimator with heuristic fallback.
#[derive(Debug, Clone)]
pub struct BpeEstimator {
    encoder: Option<EncodeFn>,
    fallback: CharEstimator,
}

impl Default for BpeEstimator {
    fn default() -> Self {
        Self::with_encoder(cl100k().map(|_| cl100k_len as EncodeFn))
    }
}

impl BpeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `encoder` as the primary counter; `None` means it is unavailable
    /// and every estimate comes from the heuristic.
    pub fn with_encoder(encoder: Option<EncodeFn>) -> Self {
        Self {
            encoder,
            fallback: CharEstimator::default(),
        }
    }

    /// Run the encoder, returning `None` if it is unavailable or panics.
    ///
    /// The panic hook is silenced for the duration so a failing encoder
    /// leaves nothing on stderr but the `warn!` line.
    fn encode_len(&self, text: &str) -> Option<usize> {
        let encode = self.encoder?;
        let _guard = HOOK_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let result = panic::catch_unwind(AssertUnwindSafe(|| encode(text)));
        panic::set_hook(hook);

        match result {
            Ok(len) => Some(len),
            Err(_) => {
                warn!("tokenizer failed on input, using heuristic estimate");
                None
            }
        }
    }
}

impl TokenEstimator for BpeEstimator {
    fn estimate(&self, text: &str) -> usize {
        if text.trim().is_empty() {
            return 0;
        }
        match self.encode_len(text) {
            Some(len) => len,
            None => {
                let estimate = self.fallback.estimate(text);
                debug!(estimate, "heuristic token estimate");
                estimate
            }
        }
    }

    fn name(&self) -> &str {
        "cl100k_base"
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Select an estimator: the BPE path by default, the heuristic on request.
pub fn estimator(heuristic: bool) -> Box<dyn TokenEstimator> {
    if heuristic {
        Box::new(CharEstimator::default())
    } else {
        Box::new(BpeEstimator::new())
    }
}

/// Estimate the token count of `text` with the default (BPE) estimator.
pub fn estimate_tokens(text: &str) -> usize {
    BpeEstimator::new().estimate(text)
}

/// Expected output tokens for `input_tokens`: `ceil(input * 1.75)`.
pub fn estimate_output_tokens(input_tokens: usize) -> usize {
    estimate_output_tokens_with_ratio(input_tokens, OUTPUT_RATIO)
}

/// Expected output tokens with a caller-supplied ratio.
///
/// Non-finite or negative ratios yield 0.
pub fn estimate_output_tokens_with_ratio(input_tokens: usize, ratio: f64) -> usize {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 0;
    }
    (input_tokens as f64 * ratio).ceil() as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_are_zero_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("   \n\t "), 0);
        assert_eq!(CharEstimator::default().estimate(""), 0);
        assert_eq!(CharEstimator::default().estimate("  "), 0);
    }

    #[test]
    fn heuristic_rounds_up() {
        let est = CharEstimator::default();
        assert_eq!(est.estimate("x"), 1);
        assert_eq!(est.estimate("abcdefgh"), 2);
        // 10 chars / 4 = 2.5, ceil = 3
        assert_eq!(est.estimate("0123456789"), 3);
    }

    #[test]
    fn heuristic_counts_characters_not_bytes() {
        // 4 chars, 12 bytes
        assert_eq!(CharEstimator::default().estimate("日本語だ"), 1);
    }

    #[test]
    fn bpe_counts_short_prompt() {
        let text = "Write a Python function to calculate fibonacci numbers using memoization.";
        let tokens = estimate_tokens(text);
        assert!(tokens > 5 && tokens < 25, "unexpected count {tokens}");
    }

    #[test]
    fn bpe_is_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog.";
        assert_eq!(estimate_tokens(text), estimate_tokens(text));
    }

    fn panicking_encoder(_: &str) -> usize {
        panic!("encoder failure")
    }

    fn doubling_encoder(text: &str) -> usize {
        text.len() * 2
    }

    #[test]
    fn missing_encoder_falls_back_to_heuristic() {
        let est = BpeEstimator::with_encoder(None);
        // 10 chars -> ceil(2.5)
        assert_eq!(est.estimate("0123456789"), 3);
        assert_eq!(est.estimate("   "), 0);
        assert_eq!(est.name(), "cl100k_base");
    }

    #[test]
    fn panicking_encoder_falls_back_to_heuristic() {
        let est = BpeEstimator::with_encoder(Some(panicking_encoder as EncodeFn));
        assert_eq!(est.estimate("0123456789"), 3);
        // The hook is restored, so later estimates still work.
        assert_eq!(est.estimate("abcd"), 1);
    }

    #[test]
    fn working_encoder_is_used() {
        let est = BpeEstimator::with_encoder(Some(doubling_encoder as EncodeFn));
        assert_eq!(est.estimate("abcd"), 8);
    }

    #[test]
    fn output_tokens_use_fixed_ratio() {
        assert_eq!(estimate_output_tokens(0), 0);
        assert_eq!(estimate_output_tokens(1), 2);
        assert_eq!(estimate_output_tokens(4), 7);
        assert_eq!(estimate_output_tokens(100), 175);
        assert_eq!(estimate_output_tokens(13), 23); // 22.75
    }

    #[test]
    fn output_tokens_are_monotonic() {
        let mut prev = 0;
        for t in 0..2000 {
            let out = estimate_output_tokens(t);
            assert!(out >= prev);
            assert_eq!(out, (t as f64 * 1.75).ceil() as usize);
            prev = out;
        }
    }

    #[test]
    fn degenerate_ratio_yields_zero() {
        assert_eq!(estimate_output_tokens_with_ratio(10, f64::NAN), 0);
        assert_eq!(estimate_output_tokens_with_ratio(10, -1.0), 0);
        assert_eq!(estimate_output_tokens_with_ratio(10, 2.0), 20);
    }

    #[test]
    fn trait_object_works() {
        let est = estimator(true);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.name(), "heuristic");
        assert_eq!(estimator(false).name(), "cl100k_base");
    }
}
