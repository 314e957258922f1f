//! Duration and section estimation from lyric section headers
//!
//! Lyrics may carry bracketed headers at line starts (`[Verse 1]`, `[Chorus]`).
//! Each header maps to a bar count; bars, tempo and the time-signature
//! numerator give seconds:
//!
//! ```text
//! seconds = total_bars * numerator / bpm * 60
//! ```
//!
//! The duration estimate is snapped to 5 s and clamped to [10, 600]. The
//! section estimate instead scales the same per-header durations so they fill
//! a known target duration exactly.
//!
//! `estimate_duration` wraps the heuristic behind an optional LM stage: the
//! engine is asked first, and any failure there falls through silently.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{DurationEstimate, EstimationMethod, SectionEstimate};
use crate::services::parameter_mapper::round2;

/// Tempo assumed when the request carries none
pub const DEFAULT_BPM: u32 = 120;

/// Beats per bar assumed when the time signature does not parse
pub const DEFAULT_NUMERATOR: u32 = 4;

/// Bars assumed for a header that matches nothing in the table
pub const DEFAULT_SECTION_BARS: u32 = 8;

/// Two 16-bar and two 8-bar sections, used when lyrics have no headers
pub const UNSTRUCTURED_BARS: u32 = 16 * 2 + 8 * 2;

pub const MIN_SECONDS: f64 = 10.0;
pub const MAX_SECONDS: f64 = 600.0;

/// Header keyword → bar count. Order matters for the prefix/substring fallback.
const SECTION_BARS: &[(&str, u32)] = &[
    ("intro", 8),
    ("verse", 16),
    ("pre-chorus", 8),
    ("prechorus", 8),
    ("pre chorus", 8),
    ("chorus", 8),
    ("hook", 8),
    ("bridge", 8),
    ("outro", 8),
    ("instrumental", 8),
    ("break", 8),
    ("interlude", 8),
    ("refrain", 8),
    ("drop", 8),
    ("build", 8),
    ("solo", 8),
];

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^\[([^\]]+)\]").expect("section header pattern is valid")
});

/// Bracketed headers found at line starts, in order, untrimmed
pub fn section_headers(lyrics: &str) -> Vec<&str> {
    SECTION_RE
        .captures_iter(lyrics)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Bar count for one header: exact match, then prefix/substring, then 8
pub fn bars_for_header(header: &str) -> u32 {
    let h = header.trim().to_lowercase();

    if let Some((_, bars)) = SECTION_BARS.iter().find(|(name, _)| *name == h) {
        return *bars;
    }

    SECTION_BARS
        .iter()
        .find(|(name, _)| h.starts_with(name) || h.contains(name))
        .map(|(_, bars)| *bars)
        .unwrap_or(DEFAULT_SECTION_BARS)
}

/// Numerator of an "N/M" time signature, 4 if it does not parse
pub fn time_signature_numerator(time_signature: &str) -> u32 {
    time_signature
        .split('/')
        .next()
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(DEFAULT_NUMERATOR)
}

/// Treat a missing or zero tempo as the default
pub fn effective_bpm(bpm: Option<u32>) -> u32 {
    bpm.filter(|b| *b > 0).unwrap_or(DEFAULT_BPM)
}

fn bars_to_seconds(bars: u32, numerator: u32, bpm: u32) -> f64 {
    bars as f64 * numerator as f64 / bpm as f64 * 60.0
}

/// Snap to the nearest 5 s (ties to even) and clamp to [10, 600]
pub fn snap_and_clamp(seconds: f64) -> f64 {
    let snapped = (seconds / 5.0).round_ties_even() * 5.0;
    snapped.clamp(MIN_SECONDS, MAX_SECONDS)
}

/// Heuristic duration estimate in seconds
pub fn heuristic_seconds(lyrics: &str, bpm: u32, time_signature: &str) -> f64 {
    let headers = section_headers(lyrics);
    let numerator = time_signature_numerator(time_signature);

    let total_bars = if headers.is_empty() {
        UNSTRUCTURED_BARS
    } else {
        headers.iter().map(|h| bars_for_header(h)).sum()
    };

    snap_and_clamp(bars_to_seconds(total_bars, numerator, bpm))
}

/// Distribute `duration` across the lyric sections in proportion to their bars
///
/// Returns contiguous `[start, end)` ranges; the last one ends at `duration`.
/// Empty when the lyrics carry no headers, which callers render as "no timeline".
pub fn estimate_sections(
    lyrics: &str,
    duration: f64,
    bpm: u32,
    time_signature: &str,
) -> Vec<SectionEstimate> {
    let headers = section_headers(lyrics);
    if headers.is_empty() {
        return Vec::new();
    }

    let numerator = time_signature_numerator(time_signature);
    let raw: Vec<(&str, u32, f64)> = headers
        .iter()
        .map(|h| {
            let bars = bars_for_header(h);
            (h.trim(), bars, bars_to_seconds(bars, numerator, bpm))
        })
        .collect();

    let total_raw: f64 = raw.iter().map(|(_, _, secs)| secs).sum();
    if total_raw <= 0.0 {
        return Vec::new();
    }

    let scale = duration / total_raw;
    let mut cursor = 0.0;
    let mut sections = Vec::with_capacity(raw.len());
    for (name, bars, raw_secs) in raw {
        let scaled = raw_secs * scale;
        sections.push(SectionEstimate {
            name: name.to_string(),
            start: round2(cursor),
            end: round2(cursor + scaled),
            bars,
        });
        cursor += scaled;
    }

    sections
}

/// LM-side duration hint provider (the engine's lyric analysis)
#[async_trait]
pub trait LyricsAnalyzer: Send + Sync {
    /// Suggested duration in seconds, or `None` when the analysis has no opinion
    async fn suggest_duration(&self, lyrics: &str) -> anyhow::Result<Option<f64>>;
}

/// Duration estimate: LM stage first, heuristic on any miss or failure
///
/// The LM stage is skipped for `lm_model == "none"` and for blank lyrics.
/// `assumed_bpm` is reported only when the heuristic ran without a tempo.
pub async fn estimate_duration<A: LyricsAnalyzer + ?Sized>(
    analyzer: &A,
    lyrics: &str,
    bpm: Option<u32>,
    time_signature: &str,
    lm_model: &str,
) -> DurationEstimate {
    if lm_model != "none" && !lyrics.trim().is_empty() {
        match analyzer.suggest_duration(lyrics).await {
            Ok(Some(seconds)) if seconds.is_finite() => {
                return DurationEstimate {
                    seconds: snap_and_clamp(seconds),
                    method: EstimationMethod::Lm,
                    assumed_bpm: None,
                };
            }
            Ok(_) => {
                tracing::debug!("LM analysis returned no duration, using heuristic");
            }
            Err(e) => {
                tracing::debug!(error = %e, "LM duration estimate failed, using heuristic");
            }
        }
    }

    let has_bpm = bpm.filter(|b| *b > 0).is_some();
    DurationEstimate {
        seconds: heuristic_seconds(lyrics, effective_bpm(bpm), time_signature),
        method: EstimationMethod::Heuristic,
        assumed_bpm: if has_bpm { None } else { Some(DEFAULT_BPM) },
    }
}
