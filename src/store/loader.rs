//! Populate the store from an artifact tree.
//!
//! The loader is a full rebuild: it wipes the table and reinserts every JSON
//! record found on disk, so the store always mirrors the artifact tree
//! exactly. Unparseable records are skipped with a warning rather than
//! aborting the load.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{ComponentStore, NewComponent};
use crate::page_extractor::schema::{Category, ComponentPayload};

/// Rebuild the store from the artifact tree rooted at `artifacts_root`.
///
/// Returns the number of components loaded.
pub async fn load_artifacts(store: &ComponentStore, artifacts_root: &Path) -> Result<usize> {
    store.clear().await?;

    let mut loaded = 0usize;

    for category in Category::ALL {
        let dir = artifacts_root.join(category.as_str());
        let mut files = match json_files(&dir).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Skipping {category}: {e:#}");
                continue;
            }
        };
        files.sort();

        for path in files {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;

            let payload: ComponentPayload = match serde_json::from_str(&text) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Skipping unparseable record {}: {e}", path.display());
                    continue;
                }
            };

            let slug = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();

            let component = row_for_payload(category, &slug, &payload, &text, &dir).await;
            store.insert(&component).await?;
            loaded += 1;
        }
    }

    info!("Loaded {loaded} components into {}", store.db_path().display());
    Ok(loaded)
}

async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("cannot read {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("directory read failed")?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Flatten one payload into an insertable row.
///
/// The sibling code artifact (`.jsx` preferred over `.js`) is the canonical
/// code: its formatted text goes into the `code` column and its relative path
/// into `file_path`. The payload's raw code is only a fallback for records
/// with no code file. `json_data` keeps the raw record text verbatim so detail
/// rendering never loses fields the flattened columns drop.
async fn row_for_payload(
    category: Category,
    slug: &str,
    payload: &ComponentPayload,
    raw_json: &str,
    category_dir: &Path,
) -> NewComponent {
    let mut file_path = None;
    let mut code = payload.code.clone();
    for extension in ["jsx", "js"] {
        let candidate = category_dir.join(format!("{slug}.{extension}"));
        if let Ok(text) = tokio::fs::read_to_string(&candidate).await {
            file_path = Some(format!("{category}/{slug}.{extension}"));
            code = text;
            break;
        }
    }

    let dependencies = if payload.dependencies.is_empty() {
        None
    } else {
        Some(payload.dependencies.join(" "))
    };

    NewComponent {
        name: payload.name.clone(),
        description: Some(payload.description.clone()),
        category: category.to_string(),
        code: Some(code),
        dependencies,
        preview_image: payload.preview_image.clone(),
        json_data: Some(raw_json.to_string()),
        file_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn seed_record(root: &Path, category: &str, slug: &str, payload: &ComponentPayload) {
        let dir = root.join(category);
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let json = serde_json::to_string_pretty(payload).expect("serialize");
        tokio::fs::write(dir.join(format!("{slug}.json")), json)
            .await
            .expect("write");
    }

    fn payload(name: &str, deps: &[&str]) -> ComponentPayload {
        ComponentPayload {
            name: name.to_string(),
            description: format!("{name} description"),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            code: "export default null;".to_string(),
            ..ComponentPayload::default()
        }
    }

    #[tokio::test]
    async fn load_is_a_full_rebuild() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ComponentStore::open(&dir.path().join("c.db")).await?;
        let artifacts = dir.path().join("artifacts");

        seed_record(&artifacts, "components", "dock", &payload("Dock", &[])).await;
        seed_record(&artifacts, "backgrounds", "waves", &payload("Waves", &[])).await;

        assert_eq!(load_artifacts(&store, &artifacts).await?, 2);
        assert_eq!(store.count().await?, 2);

        // Rerunning replaces rather than accumulates.
        assert_eq!(load_artifacts(&store, &artifacts).await?, 2);
        assert_eq!(store.count().await?, 2);

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn dependencies_flatten_to_spaces() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ComponentStore::open(&dir.path().join("c.db")).await?;
        let artifacts = dir.path().join("artifacts");

        seed_record(
            &artifacts,
            "components",
            "lanyard",
            &payload("Lanyard", &["three", "@react-three/fiber"]),
        )
        .await;
        load_artifacts(&store, &artifacts).await?;

        let (deps,): (Option<String>,) =
            sqlx::query_as("SELECT dependencies FROM components WHERE name = 'Lanyard'")
                .fetch_one(store.pool())
                .await?;
        assert_eq!(deps.as_deref(), Some("three @react-three/fiber"));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn jsx_sibling_preferred_over_js() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ComponentStore::open(&dir.path().join("c.db")).await?;
        let artifacts = dir.path().join("artifacts");

        seed_record(&artifacts, "animations", "magnet", &payload("Magnet", &[])).await;
        let category_dir = artifacts.join("animations");
        tokio::fs::write(category_dir.join("magnet.js"), "// js").await?;
        tokio::fs::write(category_dir.join("magnet.jsx"), "// jsx").await?;

        load_artifacts(&store, &artifacts).await?;

        let (file_path,): (Option<String>,) =
            sqlx::query_as("SELECT file_path FROM components WHERE name = 'Magnet'")
                .fetch_one(store.pool())
                .await?;
        assert_eq!(file_path.as_deref(), Some("animations/magnet.jsx"));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn sibling_code_file_text_wins_over_payload_code() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ComponentStore::open(&dir.path().join("c.db")).await?;
        let artifacts = dir.path().join("artifacts");

        seed_record(&artifacts, "components", "dock", &payload("Dock", &[])).await;
        tokio::fs::create_dir_all(artifacts.join("components")).await?;
        tokio::fs::write(
            artifacts.join("components").join("dock.jsx"),
            "// formatted artifact text",
        )
        .await?;

        load_artifacts(&store, &artifacts).await?;

        let (code,): (Option<String>,) =
            sqlx::query_as("SELECT code FROM components WHERE name = 'Dock'")
                .fetch_one(store.pool())
                .await?;
        assert_eq!(code.as_deref(), Some("// formatted artifact text"));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn payload_code_is_the_fallback_without_a_code_file() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ComponentStore::open(&dir.path().join("c.db")).await?;
        let artifacts = dir.path().join("artifacts");

        seed_record(&artifacts, "components", "stack", &payload("Stack", &[])).await;
        load_artifacts(&store, &artifacts).await?;

        let (code,): (Option<String>,) =
            sqlx::query_as("SELECT code FROM components WHERE name = 'Stack'")
                .fetch_one(store.pool())
                .await?;
        assert_eq!(code.as_deref(), Some("export default null;"));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn unparseable_records_are_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ComponentStore::open(&dir.path().join("c.db")).await?;
        let artifacts = dir.path().join("artifacts");

        seed_record(&artifacts, "components", "stack", &payload("Stack", &[])).await;
        let broken = artifacts.join("components").join("broken.json");
        tokio::fs::write(&broken, "{ not json").await?;

        assert_eq!(load_artifacts(&store, &artifacts).await?, 1);

        store.close().await;
        Ok(())
    }
}
