use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ARTICLE_FILE: &str = "blog_post.md";
pub const SOCIAL_POST_FILE: &str = "social_post.txt";
pub const IMAGE_PROMPT_FILE: &str = "image_prompt.txt";
pub const MANIFEST_FILE: &str = "manifest.json";

/// The persisted end-state of a run. The article is always present and the
/// image prompt always has at least its templated fallback; only the social
/// post can be lost to a non-fatal generation failure.
#[derive(Clone, Debug)]
pub struct OutputBundle {
    pub article: String,
    pub social_post: Option<String>,
    pub image_prompt: String,
}

/// Records which artifacts were written and which were omitted, so a missing
/// file is distinguishable from a failed write.
#[derive(Serialize)]
struct RunManifest<'a> {
    created_at: String,
    written: Vec<&'a str>,
    omitted: Vec<&'a str>,
}

/// Writes the bundle into a fresh `blog_content_{timestamp}` directory under
/// `root` and returns its path. Timestamps have second granularity; two runs
/// within the same second collide, which is acceptable for single-run usage.
/// Missing artifacts are skipped, not written as empty files, and recorded in
/// the manifest.
pub fn save_bundle(
    root: &Path,
    bundle: &OutputBundle,
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    let dir_name = format!("blog_content_{}", timestamp.format("%Y%m%d_%H%M%S"));
    let dir = root.join(dir_name);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    let mut omitted = Vec::new();

    fs::write(dir.join(ARTICLE_FILE), &bundle.article)
        .with_context(|| format!("Failed to write {}", ARTICLE_FILE))?;
    written.push(ARTICLE_FILE);

    match &bundle.social_post {
        Some(post) => {
            fs::write(dir.join(SOCIAL_POST_FILE), post)
                .with_context(|| format!("Failed to write {}", SOCIAL_POST_FILE))?;
            written.push(SOCIAL_POST_FILE);
        }
        None => {
            warn!("Social post missing, skipping {}", SOCIAL_POST_FILE);
            omitted.push(SOCIAL_POST_FILE);
        }
    }

    fs::write(dir.join(IMAGE_PROMPT_FILE), &bundle.image_prompt)
        .with_context(|| format!("Failed to write {}", IMAGE_PROMPT_FILE))?;
    written.push(IMAGE_PROMPT_FILE);

    let manifest = RunManifest {
        created_at: timestamp.to_rfc3339(),
        written,
        omitted,
    };
    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )
    .with_context(|| format!("Failed to write {}", MANIFEST_FILE))?;

    info!("Content saved to folder: {}", dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bundle() -> OutputBundle {
        OutputBundle {
            article: "TITLE: T\n\nbody".to_string(),
            social_post: Some("post".to_string()),
            image_prompt: "prompt".to_string(),
        }
    }

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 10, 30, 5).unwrap()
    }

    #[test]
    fn writes_one_directory_with_all_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let dir = save_bundle(root.path(), &bundle(), timestamp()).unwrap();

        assert_eq!(dir, root.path().join("blog_content_20240517_103005"));
        let entries = fs::read_dir(root.path()).unwrap().count();
        assert_eq!(entries, 1);

        assert_eq!(
            fs::read_to_string(dir.join(ARTICLE_FILE)).unwrap(),
            "TITLE: T\n\nbody"
        );
        assert_eq!(fs::read_to_string(dir.join(SOCIAL_POST_FILE)).unwrap(), "post");
        assert_eq!(
            fs::read_to_string(dir.join(IMAGE_PROMPT_FILE)).unwrap(),
            "prompt"
        );
    }

    #[test]
    fn missing_social_post_is_skipped_and_recorded() {
        let root = tempfile::tempdir().unwrap();
        let bundle = OutputBundle {
            article: "a".to_string(),
            social_post: None,
            image_prompt: "p".to_string(),
        };

        let dir = save_bundle(root.path(), &bundle, timestamp()).unwrap();

        assert!(!dir.join(SOCIAL_POST_FILE).exists());
        let manifest = fs::read_to_string(dir.join(MANIFEST_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(parsed["omitted"][0], SOCIAL_POST_FILE);
        assert_eq!(parsed["written"][0], ARTICLE_FILE);
    }
}
