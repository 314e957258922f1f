//! Audio path handling
//!
//! The engine reports audio either as a bare filesystem path or as an
//! engine-relative URL such as `/v1/audio?path=%2Fdata%2Fout%2Fa.mp3`.
//! These helpers recover the filesystem path and stage rework sources where
//! the engine will accept them.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Content type used when nothing better is known
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Value of query parameter `name` in `url`, percent-decoded
///
/// Blank values count as absent.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Filesystem path behind an engine audio location
///
/// `/v1/audio?path=%2Fx.mp3` → `/x.mp3`; anything without a `path` parameter
/// is returned unchanged.
pub fn resolve_audio_path(path: &str) -> String {
    if path.contains('?') {
        if let Some(resolved) = query_param(path, "path") {
            return resolved;
        }
    }
    path.to_string()
}

/// Local file behind an engine audio location, if it exists on this machine
pub async fn local_audio_file(path: &str) -> Option<PathBuf> {
    let candidate = PathBuf::from(resolve_audio_path(path));
    match tokio::fs::metadata(&candidate).await {
        Ok(meta) if meta.is_file() => Some(candidate),
        _ => None,
    }
}

/// Content type guessed from the file extension
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
        .to_string()
}

/// Make a rework source acceptable to the engine
///
/// The engine refuses absolute source paths outside the system temp dir.
/// Sources already inside it are returned as resolved paths; anything else is
/// copied to `<temp>/wrangler_src_<id><ext>` and the copy's path returned.
/// A source that does not exist yields `io::ErrorKind::NotFound`.
pub async fn stage_source_audio(path: &str) -> io::Result<String> {
    let resolved = resolve_audio_path(path);
    let real = tokio::fs::canonicalize(&resolved).await?;
    let system_temp = tokio::fs::canonicalize(std::env::temp_dir()).await?;

    if real.starts_with(&system_temp) {
        return Ok(resolved);
    }

    let suffix = Path::new(&resolved)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".mp3".to_string());
    let staged = system_temp.join(format!("wrangler_src_{}{}", Uuid::new_v4().simple(), suffix));

    tokio::fs::copy(&real, &staged).await?;
    tracing::info!(
        source = %real.display(),
        staged = %staged.display(),
        "Copied rework source into temp dir"
    );

    Ok(staged.to_string_lossy().into_owned())
}
