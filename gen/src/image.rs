// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Merge and pad primitives over raw image buffers.

use alloc::vec::Vec;

/// What [`pad_image`] did to reach the target length.
///
/// Truncation loses data, so it is reported as a distinct outcome for the
/// caller to surface - never silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadOutcome {
    /// Source already matched the target length
    Exact,

    /// Source was shorter; the remainder was zero-filled
    ZeroExtended { added: usize },

    /// Source was longer; trailing bytes were dropped
    Truncated { dropped: usize },
}

impl PadOutcome {
    pub fn is_truncated(&self) -> bool {
        matches!(self, PadOutcome::Truncated { .. })
    }
}

/// Merges a primary image with a continuation image.
///
/// The output starts with all of `primary`; `secondary` is then appended
/// from offset `len(primary)` within itself, so the portion of `secondary`
/// already covered by `primary` is skipped.  When `secondary` is no longer
/// than `primary` the output is just `primary`.
pub fn merge_images(primary: &[u8], secondary: &[u8]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(primary.len().max(secondary.len()));
    merged.extend_from_slice(primary);
    if secondary.len() > primary.len() {
        merged.extend_from_slice(&secondary[primary.len()..]);
    }
    merged
}

/// Returns exactly `target` bytes: `src` zero-extended or truncated.
pub fn pad_image(src: &[u8], target: usize) -> (Vec<u8>, PadOutcome) {
    use core::cmp::Ordering;

    let outcome = match src.len().cmp(&target) {
        Ordering::Equal => PadOutcome::Exact,
        Ordering::Less => PadOutcome::ZeroExtended {
            added: target - src.len(),
        },
        Ordering::Greater => PadOutcome::Truncated {
            dropped: src.len() - target,
        },
    };

    let mut padded = Vec::with_capacity(target);
    padded.extend_from_slice(&src[..src.len().min(target)]);
    padded.resize(target, 0);

    (padded, outcome)
}
