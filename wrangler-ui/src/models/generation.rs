//! Generation request (UI side) and engine payload (wire side)
//!
//! `GenerationRequest` is what the browser posts. `EnginePayload` is what the
//! engine's `/release_task` expects. The mapping is one-way; see
//! `services::parameter_mapper`.

use serde::{Deserialize, Serialize};

/// Friendly generation parameters posted by the UI
///
/// Every field has a default so a partial JSON body is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    // Main panel
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub lyrics: String,
    /// Target duration in seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// 0 = loose, 1 = medium, 2 = strict
    #[serde(default = "default_level")]
    pub lyric_adherence: i64,
    /// 0 (restrained) to 100 (wild)
    #[serde(default = "default_creativity")]
    pub creativity: f64,
    /// 0 = raw, 1 = balanced, 2 = polished
    #[serde(default = "default_level")]
    pub quality: i64,

    // Advanced panel
    #[serde(default)]
    pub seed: Option<i64>,
    /// Model key: turbo | sft | base
    #[serde(default = "default_gen_model", alias = "model")]
    pub gen_model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    /// Scheduler key: euler | dpm | ddim
    #[serde(default = "default_scheduler")]
    pub scheduler: String,
    /// mp3 | wav | flac
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    // Song parameters, appended to the prompt
    /// e.g. "C major"
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default = "default_time_signature")]
    pub time_signature: String,

    // Raw overrides from the advanced sliders; these win over the friendly presets
    #[serde(default)]
    pub guidance_scale_raw: Option<f64>,
    #[serde(default)]
    pub audio_guidance_scale: Option<f64>,
    #[serde(default)]
    pub inference_steps_raw: Option<i64>,

    // Auto-lyrics: the engine's LM writes lyrics from this description
    #[serde(default)]
    pub sample_query: Option<String>,
    #[serde(default = "default_vocal_language")]
    pub vocal_language: String,

    // Rework
    /// text2music | cover | repaint
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub src_audio_path: Option<String>,
    /// 0.0 - 1.0, cover only
    #[serde(default)]
    pub audio_cover_strength: Option<f64>,
    /// Seconds, repaint only
    #[serde(default)]
    pub repainting_start: Option<f64>,
    /// Seconds, repaint only
    #[serde(default)]
    pub repainting_end: Option<f64>,
}

fn default_duration() -> f64 {
    30.0
}

fn default_level() -> i64 {
    1
}

fn default_creativity() -> f64 {
    50.0
}

fn default_gen_model() -> String {
    "turbo".to_string()
}

fn default_batch_size() -> i64 {
    1
}

fn default_scheduler() -> String {
    "euler".to_string()
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

pub(crate) fn default_time_signature() -> String {
    "4/4".to_string()
}

fn default_vocal_language() -> String {
    "en".to_string()
}

fn default_task_type() -> String {
    "text2music".to_string()
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            style: String::new(),
            lyrics: String::new(),
            duration: default_duration(),
            lyric_adherence: default_level(),
            creativity: default_creativity(),
            quality: default_level(),
            seed: None,
            gen_model: default_gen_model(),
            batch_size: default_batch_size(),
            scheduler: default_scheduler(),
            audio_format: default_audio_format(),
            key: String::new(),
            bpm: None,
            time_signature: default_time_signature(),
            guidance_scale_raw: None,
            audio_guidance_scale: None,
            inference_steps_raw: None,
            sample_query: None,
            vocal_language: default_vocal_language(),
            task_type: default_task_type(),
            src_audio_path: None,
            audio_cover_strength: None,
            repainting_start: None,
            repainting_end: None,
        }
    }
}

/// Request body for `/release_task` on the engine
///
/// Field names are the engine's and must not change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnginePayload {
    pub prompt: String,
    pub lyrics: String,
    pub audio_duration: f64,
    pub guidance_scale: f64,
    pub shift: f64,
    pub inference_steps: i64,
    pub batch_size: i64,
    pub use_random_seed: bool,
    /// -1 when `use_random_seed` is set
    pub seed: i64,
    pub infer_method: String,
    pub audio_format: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocal_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_audio_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_cover_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repainting_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repainting_end: Option<f64>,
}

/// `POST /generate-lyrics` body
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateLyricsRequest {
    pub description: String,
    #[serde(default = "default_vocal_language")]
    pub vocal_language: String,
}

/// `POST /generate-lyrics` response
///
/// Besides the lyrics, carries the preview audio location so the UI can chain
/// straight into a rework.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateLyricsResponse {
    pub caption: String,
    pub lyrics: String,
    pub bpm: Option<serde_json::Value>,
    pub key_scale: String,
    pub time_signature: String,
    pub duration: Option<serde_json::Value>,
    pub audio_url: String,
    pub audio_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        let req: GenerationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, GenerationRequest::default());
        assert_eq!(req.duration, 30.0);
        assert_eq!(req.gen_model, "turbo");
        assert_eq!(req.time_signature, "4/4");
    }

    #[test]
    fn test_model_alias() {
        let req: GenerationRequest = serde_json::from_str(r#"{"model": "sft"}"#).unwrap();
        assert_eq!(req.gen_model, "sft");
    }

    #[test]
    fn test_payload_omits_absent_optionals() {
        let payload = EnginePayload {
            prompt: "lofi".into(),
            lyrics: String::new(),
            audio_duration: 30.0,
            guidance_scale: 7.0,
            shift: 3.0,
            inference_steps: 60,
            batch_size: 1,
            use_random_seed: true,
            seed: -1,
            infer_method: "ode".into(),
            audio_format: "mp3".into(),
            audio_guidance_scale: None,
            sample_query: None,
            vocal_language: None,
            model: None,
            task_type: None,
            src_audio_path: None,
            audio_cover_strength: None,
            repainting_start: None,
            repainting_end: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 11);
        assert!(!obj.contains_key("model"));
        assert_eq!(obj["seed"], -1);
    }
}
