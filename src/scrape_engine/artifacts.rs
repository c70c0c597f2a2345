//! Artifact tree layout and writers.
//!
//! The artifact tree is one directory per category, each holding a
//! `<slug>.json` record, an optional `<slug>.jsx`/`<slug>.js` code file and an
//! optional `<slug>-preview.png` screenshot, plus a generated `README.md` at
//! the root. The JSON record is the authoritative artifact; the loader reads
//! the tree back when populating the store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cleaner::{determine_file_extension, format_code_with_headers};
use crate::page_extractor::schema::{Category, ComponentPayload};

pub fn category_dir(root: &Path, category: Category) -> PathBuf {
    root.join(category.as_str())
}

pub fn json_path(root: &Path, category: Category, slug: &str) -> PathBuf {
    category_dir(root, category).join(format!("{slug}.json"))
}

pub fn preview_path(root: &Path, category: Category, slug: &str) -> PathBuf {
    category_dir(root, category).join(format!("{slug}-preview.png"))
}

/// Write the JSON record for one item, creating the category directory as
/// needed.
pub async fn write_payload_json(
    root: &Path,
    category: Category,
    slug: &str,
    payload: &ComponentPayload,
) -> Result<PathBuf> {
    let dir = category_dir(root, category);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let path = json_path(root, category, slug);
    let json = serde_json::to_string_pretty(payload).context("failed to serialize payload")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Write the formatted code artifact for one item.
///
/// Returns `None` when the payload has no code. The extension is chosen from
/// the code's syntax; if a previous run chose the other extension, that stale
/// sibling is deleted so each item has at most one code file.
pub async fn write_code_artifact(
    root: &Path,
    category: Category,
    slug: &str,
    payload: &ComponentPayload,
) -> Result<Option<PathBuf>> {
    if payload.code.trim().is_empty() {
        return Ok(None);
    }

    let dir = category_dir(root, category);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let extension = determine_file_extension(&payload.code, category);
    let path = dir.join(format!("{slug}.{extension}"));
    let formatted = format_code_with_headers(&payload.code, payload);

    tokio::fs::write(&path, formatted)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    let stale_extension = if extension == "jsx" { "js" } else { "jsx" };
    let stale = dir.join(format!("{slug}.{stale_extension}"));
    if tokio::fs::try_exists(&stale).await.unwrap_or(false) {
        if let Err(e) = tokio::fs::remove_file(&stale).await {
            warn!("Failed to remove stale code file {}: {e}", stale.display());
        } else {
            debug!("Removed stale code file {}", stale.display());
        }
    }

    debug!("Wrote {}", path.display());
    Ok(Some(path))
}

/// Regenerate the artifact tree's `README.md` index.
///
/// Lists every scraped item grouped by category, derived purely from the JSON
/// records on disk so it survives partial runs.
pub async fn generate_readme(root: &Path) -> Result<()> {
    let mut sections = String::new();
    let mut total = 0usize;

    for category in Category::ALL {
        let dir = category_dir(root, category);
        let mut names: Vec<String> = Vec::new();

        if let Ok(mut entries) = tokio::fs::read_dir(&dir).await {
            let mut files: Vec<PathBuf> = Vec::new();
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
            files.sort();

            for path in files {
                let Ok(text) = tokio::fs::read_to_string(&path).await else {
                    continue;
                };
                match serde_json::from_str::<ComponentPayload>(&text) {
                    Ok(payload) if !payload.error => names.push(payload.name),
                    Ok(_) => {}
                    Err(e) => warn!("Unreadable record {}: {e}", path.display()),
                }
            }
        }

        total += names.len();
        sections.push_str(&format!("\n## {}\n\n", capitalize(category.as_str())));
        if names.is_empty() {
            sections.push_str("_None scraped yet._\n");
        } else {
            for name in names {
                sections.push_str(&format!("- {name}\n"));
            }
        }
    }

    let readme = format!(
        "# Scraped Components\n\n{total} components scraped from reactbits.dev.\n{sections}"
    );

    let path = root.join("README.md");
    tokio::fs::write(&path, readme)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    debug!("Regenerated {}", path.display());
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with_code(name: &str, code: &str) -> ComponentPayload {
        ComponentPayload {
            name: name.to_string(),
            code: code.to_string(),
            ..ComponentPayload::default()
        }
    }

    #[tokio::test]
    async fn code_artifact_skipped_when_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = payload_with_code("Empty", "   ");
        let written = write_code_artifact(dir.path(), Category::Components, "empty", &payload)
            .await
            .expect("write");
        assert!(written.is_none());
    }

    #[tokio::test]
    async fn stale_alternate_extension_is_deleted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let category_dir = dir.path().join("components");
        tokio::fs::create_dir_all(&category_dir).await.expect("mkdir");

        // Simulate a previous run that classified the code as plain JS.
        let stale = category_dir.join("dock.js");
        tokio::fs::write(&stale, "// old").await.expect("seed");

        let payload = payload_with_code("Dock", "export default function Dock(props) { return <div />; }");
        let written = write_code_artifact(dir.path(), Category::Components, "dock", &payload)
            .await
            .expect("write")
            .expect("some path");

        assert_eq!(written.extension().and_then(|e| e.to_str()), Some("jsx"));
        assert!(!stale.exists());
        assert!(written.exists());
    }

    #[tokio::test]
    async fn json_artifact_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = payload_with_code("Waves", "const w = 1;");
        let path = write_payload_json(dir.path(), Category::Backgrounds, "waves", &payload)
            .await
            .expect("write");

        let text = tokio::fs::read_to_string(&path).await.expect("read");
        let back: ComponentPayload = serde_json::from_str(&text).expect("parse");
        assert_eq!(back.name, "Waves");
    }

    #[tokio::test]
    async fn readme_lists_components_by_category() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = payload_with_code("Aurora", "");
        write_payload_json(dir.path(), Category::Backgrounds, "aurora", &payload)
            .await
            .expect("write");
        let failed = ComponentPayload::failure("u", "broken", "nope");
        write_payload_json(dir.path(), Category::Backgrounds, "broken", &failed)
            .await
            .expect("write");

        generate_readme(dir.path()).await.expect("readme");

        let readme = tokio::fs::read_to_string(dir.path().join("README.md"))
            .await
            .expect("read");
        assert!(readme.contains("## Backgrounds"));
        assert!(readme.contains("- Aurora"));
        assert!(!readme.contains("Error: broken"));
        assert!(readme.contains("1 components scraped"));
    }
}
