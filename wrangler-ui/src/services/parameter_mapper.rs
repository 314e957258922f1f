//! Friendly UI parameters → engine payload
//!
//! Pure, deterministic, one-way. Three sliders map through fixed tables and one
//! inverse-linear formula:
//! - lyric adherence (0..=2) → `guidance_scale`
//! - quality (0..=2) → `inference_steps`
//! - creativity (0..=100) → `shift`, from 5.0 (restrained) down to 1.0 (wild)
//!
//! Raw overrides from the advanced panel always win over the presets.

use crate::models::{EnginePayload, GenerationRequest};

/// Loose, medium, strict → guidance_scale
pub const LYRIC_ADHERENCE_GUIDANCE: [f64; 3] = [3.0, 7.0, 12.0];

/// Raw, balanced, polished → inference_steps
pub const QUALITY_STEPS: [i64; 3] = [15, 60, 120];

/// Scheduler used when the requested key is unknown
pub const DEFAULT_INFER_METHOD: &str = "ode";

/// Seed sent alongside `use_random_seed = true`
pub const RANDOM_SEED_SENTINEL: i64 = -1;

/// Model key → engine model name. Unknown keys leave `model` unset.
pub fn engine_model_name(key: &str) -> Option<&'static str> {
    match key {
        "turbo" => Some("acestep-v15-turbo"),
        "sft" => Some("acestep-v15-sft"),
        "base" => Some("acestep-v15-base"),
        _ => None,
    }
}

/// Scheduler key → engine `infer_method`
pub fn infer_method(key: &str) -> &'static str {
    match key {
        "euler" => "ode",
        "dpm" => "dpm",
        "ddim" => "ddim",
        _ => DEFAULT_INFER_METHOD,
    }
}

/// Vocal language code → label embedded in sample queries
pub fn language_label(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some("English"),
        "zh" => Some("Chinese"),
        "ja" => Some("Japanese"),
        "ko" => Some("Korean"),
        "es" => Some("Spanish"),
        "fr" => Some("French"),
        "de" => Some("German"),
        "it" => Some("Italian"),
        "pt" => Some("Portuguese"),
        "ru" => Some("Russian"),
        "hi" => Some("Hindi"),
        "ar" => Some("Arabic"),
        _ => None,
    }
}

/// Round to 2 decimals the way a decimal formatter does: the exact binary value
/// is rounded to the nearest 2-decimal string (ties to even) and parsed back.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Creativity percentage → shift: 0 → 5.0, 50 → 3.0, 100 → 1.0
pub fn creativity_to_shift(creativity: f64) -> f64 {
    let creativity = creativity.clamp(0.0, 100.0);
    round2(5.0 - (creativity / 100.0) * 4.0)
}

fn level_index(level: i64) -> usize {
    level.clamp(0, 2) as usize
}

/// Style text plus an optional `"<key>, <bpm> BPM, <ts> time"` suffix
///
/// The suffix is only built when a key or a non-zero BPM is present.
pub fn build_prompt(style: &str, key: &str, bpm: Option<u32>, time_signature: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !key.is_empty() {
        parts.push(key.to_string());
    }
    if let Some(bpm) = bpm.filter(|b| *b > 0) {
        parts.push(format!("{} BPM", bpm));
    }
    if parts.is_empty() {
        return style.to_string();
    }

    parts.push(format!("{} time", time_signature));
    let suffix = parts.join(", ");
    if style.is_empty() {
        suffix
    } else {
        format!("{}, {}", style, suffix)
    }
}

/// Sample-query text with the language label folded in
///
/// The engine ignores a separate language field in sample-query mode, so the
/// label has to ride along in the query itself.
pub fn enrich_sample_query(query: &str, vocal_language: &str) -> String {
    match language_label(vocal_language) {
        Some(label) => format!("{}. {} vocals.", query, label),
        None => query.to_string(),
    }
}

/// Map a generation request onto the engine's wire schema
pub fn map_request(req: &GenerationRequest) -> EnginePayload {
    let guidance_scale = req
        .guidance_scale_raw
        .unwrap_or(LYRIC_ADHERENCE_GUIDANCE[level_index(req.lyric_adherence)]);
    let inference_steps = req
        .inference_steps_raw
        .unwrap_or(QUALITY_STEPS[level_index(req.quality)]);

    let mut payload = EnginePayload {
        prompt: build_prompt(&req.style, &req.key, req.bpm, &req.time_signature),
        lyrics: req.lyrics.clone(),
        audio_duration: req.duration,
        guidance_scale,
        shift: creativity_to_shift(req.creativity),
        inference_steps,
        batch_size: req.batch_size.max(1),
        use_random_seed: req.seed.is_none(),
        seed: req.seed.unwrap_or(RANDOM_SEED_SENTINEL),
        infer_method: infer_method(&req.scheduler).to_string(),
        audio_format: req.audio_format.clone(),
        audio_guidance_scale: req.audio_guidance_scale,
        sample_query: None,
        vocal_language: None,
        model: engine_model_name(&req.gen_model).map(str::to_string),
        task_type: None,
        src_audio_path: None,
        audio_cover_strength: None,
        repainting_start: None,
        repainting_end: None,
    };

    if let Some(query) = req.sample_query.as_deref().filter(|q| !q.is_empty()) {
        payload.sample_query = Some(enrich_sample_query(query, &req.vocal_language));
        payload.vocal_language = Some(req.vocal_language.clone());
    }

    match req.task_type.as_str() {
        "cover" => {
            payload.task_type = Some(req.task_type.clone());
            payload.src_audio_path = req.src_audio_path.clone().filter(|p| !p.is_empty());
            payload.audio_cover_strength = req.audio_cover_strength;
        }
        "repaint" => {
            payload.task_type = Some(req.task_type.clone());
            payload.src_audio_path = req.src_audio_path.clone().filter(|p| !p.is_empty());
            payload.repainting_start = req.repainting_start;
            payload.repainting_end = req.repainting_end;
        }
        _ => {}
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_endpoints() {
        assert_eq!(creativity_to_shift(0.0), 5.0);
        assert_eq!(creativity_to_shift(50.0), 3.0);
        assert_eq!(creativity_to_shift(100.0), 1.0);
    }

    #[test]
    fn test_shift_clamps_out_of_range() {
        assert_eq!(creativity_to_shift(-20.0), 5.0);
        assert_eq!(creativity_to_shift(250.0), 1.0);
    }

    #[test]
    fn test_shift_rounds_to_two_decimals() {
        // 5.0 - 0.333 * 4.0 = 3.668
        assert_eq!(creativity_to_shift(33.3), 3.67);
        // 5.0 - 0.01 * 4.0 = 4.96
        assert_eq!(creativity_to_shift(1.0), 4.96);
        for step in 0..=100 {
            let shift = creativity_to_shift(step as f64);
            assert!((1.0..=5.0).contains(&shift));
            assert_eq!(shift, round2(shift));
        }
    }

    #[test]
    fn test_round2_matches_decimal_rounding() {
        assert_eq!(round2(2.675), 2.67); // binary value sits just below .675
        assert_eq!(round2(0.125), 0.12); // exact tie rounds to even
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn test_guidance_table_and_override() {
        for (level, expected) in [(0, 3.0), (1, 7.0), (2, 12.0)] {
            let req = GenerationRequest {
                lyric_adherence: level,
                ..Default::default()
            };
            assert_eq!(map_request(&req).guidance_scale, expected);
        }

        let req = GenerationRequest {
            lyric_adherence: 2,
            guidance_scale_raw: Some(4.25),
            ..Default::default()
        };
        assert_eq!(map_request(&req).guidance_scale, 4.25);
    }

    #[test]
    fn test_levels_are_clamped() {
        let req = GenerationRequest {
            lyric_adherence: 9,
            quality: -3,
            ..Default::default()
        };
        let payload = map_request(&req);
        assert_eq!(payload.guidance_scale, 12.0);
        assert_eq!(payload.inference_steps, 15);
    }

    #[test]
    fn test_steps_table_and_override() {
        let req = GenerationRequest {
            quality: 2,
            ..Default::default()
        };
        assert_eq!(map_request(&req).inference_steps, 120);

        let req = GenerationRequest {
            quality: 2,
            inference_steps_raw: Some(8),
            ..Default::default()
        };
        assert_eq!(map_request(&req).inference_steps, 8);
    }

    #[test]
    fn test_seed_handling() {
        let random = map_request(&GenerationRequest::default());
        assert!(random.use_random_seed);
        assert_eq!(random.seed, RANDOM_SEED_SENTINEL);

        let fixed = map_request(&GenerationRequest {
            seed: Some(1234),
            ..Default::default()
        });
        assert!(!fixed.use_random_seed);
        assert_eq!(fixed.seed, 1234);
    }

    #[test]
    fn test_prompt_suffix() {
        assert_eq!(build_prompt("synthwave", "", None, "4/4"), "synthwave");
        assert_eq!(
            build_prompt("synthwave", "A minor", Some(110), "4/4"),
            "synthwave, A minor, 110 BPM, 4/4 time"
        );
        assert_eq!(build_prompt("", "", Some(90), "3/4"), "90 BPM, 3/4 time");
        assert_eq!(build_prompt("jazz", "", Some(0), "4/4"), "jazz");
        assert_eq!(build_prompt("", "", None, "4/4"), "");
    }

    #[test]
    fn test_batch_size_floor() {
        let payload = map_request(&GenerationRequest {
            batch_size: 0,
            ..Default::default()
        });
        assert_eq!(payload.batch_size, 1);
    }

    #[test]
    fn test_model_and_scheduler_lookup() {
        let payload = map_request(&GenerationRequest {
            gen_model: "base".into(),
            scheduler: "ddim".into(),
            ..Default::default()
        });
        assert_eq!(payload.model.as_deref(), Some("acestep-v15-base"));
        assert_eq!(payload.infer_method, "ddim");

        let payload = map_request(&GenerationRequest {
            gen_model: "mystery".into(),
            scheduler: "mystery".into(),
            ..Default::default()
        });
        assert!(payload.model.is_none());
        assert_eq!(payload.infer_method, "ode");
    }

    #[test]
    fn test_sample_query_gets_language_label() {
        let payload = map_request(&GenerationRequest {
            sample_query: Some("a sad song about rain".into()),
            vocal_language: "ja".into(),
            ..Default::default()
        });
        assert_eq!(
            payload.sample_query.as_deref(),
            Some("a sad song about rain. Japanese vocals.")
        );
        assert_eq!(payload.vocal_language.as_deref(), Some("ja"));

        let payload = map_request(&GenerationRequest {
            sample_query: Some("instrumental".into()),
            vocal_language: "xx".into(),
            ..Default::default()
        });
        assert_eq!(payload.sample_query.as_deref(), Some("instrumental"));

        let payload = map_request(&GenerationRequest::default());
        assert!(payload.sample_query.is_none());
        assert!(payload.vocal_language.is_none());
    }

    #[test]
    fn test_rework_fields_follow_task_type() {
        let base = GenerationRequest {
            src_audio_path: Some("/tmp/src.mp3".into()),
            audio_cover_strength: Some(0.6),
            repainting_start: Some(10.0),
            repainting_end: Some(20.0),
            ..Default::default()
        };

        let plain = map_request(&base);
        assert!(plain.task_type.is_none());
        assert!(plain.src_audio_path.is_none());
        assert!(plain.audio_cover_strength.is_none());

        let cover = map_request(&GenerationRequest {
            task_type: "cover".into(),
            ..base.clone()
        });
        assert_eq!(cover.task_type.as_deref(), Some("cover"));
        assert_eq!(cover.src_audio_path.as_deref(), Some("/tmp/src.mp3"));
        assert_eq!(cover.audio_cover_strength, Some(0.6));
        assert!(cover.repainting_start.is_none());

        let repaint = map_request(&GenerationRequest {
            task_type: "repaint".into(),
            ..base
        });
        assert_eq!(repaint.task_type.as_deref(), Some("repaint"));
        assert!(repaint.audio_cover_strength.is_none());
        assert_eq!(repaint.repainting_start, Some(10.0));
        assert_eq!(repaint.repainting_end, Some(20.0));
    }
}
