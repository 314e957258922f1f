//! Duration and section estimate requests/responses

use serde::{Deserialize, Serialize};

use super::generation::default_time_signature;

/// `POST /estimate-duration` body
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateDurationRequest {
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default = "default_time_signature")]
    pub time_signature: String,
    /// LM size hint; "none" skips the engine and goes straight to the heuristic
    #[serde(default = "default_lm_model")]
    pub lm_model: String,
}

fn default_lm_model() -> String {
    "1.7b".to_string()
}

/// How a duration estimate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMethod {
    Lm,
    Heuristic,
}

/// `POST /estimate-duration` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationEstimate {
    pub seconds: f64,
    pub method: EstimationMethod,
    /// Present only when the heuristic had to assume a tempo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumed_bpm: Option<u32>,
}

/// `POST /estimate-sections` body
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateSectionsRequest {
    #[serde(default)]
    pub lyrics: String,
    #[serde(default = "default_section_duration")]
    pub duration: f64,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default = "default_time_signature")]
    pub time_signature: String,
}

fn default_section_duration() -> f64 {
    30.0
}

/// One section's time range `[start, end)` in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEstimate {
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub bars: u32,
}

/// `POST /estimate-sections` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsResponse {
    pub sections: Vec<SectionEstimate>,
}
