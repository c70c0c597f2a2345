//! Query service behavior against a real SQLite store.

use bitscrape::query::{QueryError, QueryService};
use bitscrape::store::{ComponentStore, NewComponent};
use tempfile::TempDir;

async fn seeded_store(dir: &TempDir) -> ComponentStore {
    let store = ComponentStore::open(&dir.path().join("components.db"))
        .await
        .expect("open store");

    let rows = [
        ("Stepper", "components", "A multi-step wizard component", ""),
        ("Counter", "components", "An animated number counter", "framer-motion"),
        ("Aurora", "backgrounds", "A flowing aurora background", "ogl"),
        ("Magnet", "animations", "Elements that snap toward the cursor", ""),
    ];

    for (name, category, description, deps) in rows {
        store
            .insert(&NewComponent {
                name: name.to_string(),
                description: Some(description.to_string()),
                category: category.to_string(),
                code: Some(format!("export default function {name}() {{}}")),
                dependencies: if deps.is_empty() {
                    None
                } else {
                    Some(deps.to_string())
                },
                ..NewComponent::default()
            })
            .await
            .expect("insert");
    }

    store
}

#[tokio::test]
async fn search_finds_by_prefix() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service
        .search_components("step", None)
        .await
        .expect("search");
    assert!(text.contains("Found 1 components matching \"step\""));
    assert!(text.contains("**Stepper** (components)"));
}

#[tokio::test]
async fn search_falls_back_to_substring_match() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    // "tep" is mid-token, so the FTS prefix query misses and LIKE takes over.
    let text = service
        .search_components("tep", None)
        .await
        .expect("search");
    assert!(text.contains("**Stepper**"));
}

#[tokio::test]
async fn search_includes_install_command() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service
        .search_components("counter", None)
        .await
        .expect("search");
    assert!(text.contains("Installation: `npm install framer-motion`"));
}

#[tokio::test]
async fn empty_query_with_category_lists_that_category() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service
        .search_components("", Some("backgrounds"))
        .await
        .expect("search");
    assert!(text.contains("in category backgrounds"));
    assert!(text.contains("**Aurora**"));
    assert!(!text.contains("**Stepper**"));
}

#[tokio::test]
async fn empty_query_without_category_is_invalid() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let result = service.search_components("   ", None).await;
    assert!(matches!(result, Err(QueryError::InvalidParams(_))));
}

#[tokio::test]
async fn quotes_in_queries_do_not_break_fts() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    // Must not surface an FTS syntax error; zero results is fine.
    let text = service
        .search_components("au\"rora", None)
        .await
        .expect("search");
    assert!(text.starts_with("Found "));
}

#[tokio::test]
async fn get_component_matches_case_insensitively() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service.get_component("COUNTER").await.expect("lookup");
    assert!(text.starts_with("# Counter\n"));
    assert!(text.contains("**Category:** components"));
    assert!(text.contains("npm install framer-motion"));
    assert!(text.contains("```jsx\nexport default function Counter() {}"));
}

#[tokio::test]
async fn get_component_falls_back_to_partial_match() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service.get_component("urora").await.expect("lookup");
    assert!(text.starts_with("# Aurora\n"));
}

#[tokio::test]
async fn get_component_reports_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let result = service.get_component("Nonexistent").await;
    assert!(matches!(result, Err(QueryError::NotFound(_))));
}

#[tokio::test]
async fn get_component_reads_code_from_artifact_file() {
    let dir = TempDir::new().expect("tempdir");
    let store = ComponentStore::open(&dir.path().join("components.db"))
        .await
        .expect("open store");

    let artifacts = dir.path().join("artifacts");
    let category_dir = artifacts.join("components");
    tokio::fs::create_dir_all(&category_dir).await.expect("mkdir");
    tokio::fs::write(category_dir.join("folder.jsx"), "// from the file")
        .await
        .expect("write code");

    store
        .insert(&NewComponent {
            name: "Folder".to_string(),
            category: "components".to_string(),
            code: None,
            file_path: Some("components/folder.jsx".to_string()),
            ..NewComponent::default()
        })
        .await
        .expect("insert");

    let service = QueryService::new(store, Some(artifacts));
    let text = service.get_component("Folder").await.expect("lookup");
    assert!(text.contains("// from the file"));
}

#[tokio::test]
async fn missing_code_everywhere_yields_placeholder() {
    let dir = TempDir::new().expect("tempdir");
    let store = ComponentStore::open(&dir.path().join("components.db"))
        .await
        .expect("open store");
    store
        .insert(&NewComponent {
            name: "Ghost".to_string(),
            category: "components".to_string(),
            ..NewComponent::default()
        })
        .await
        .expect("insert");

    let service = QueryService::new(store, None);
    let text = service.get_component("Ghost").await.expect("lookup");
    assert!(text.contains("// No code available for this component"));
}

#[tokio::test]
async fn list_categories_is_comma_separated() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service.list_categories().await.expect("list");
    assert_eq!(
        text,
        "Available categories: animations, backgrounds, components"
    );
}

#[tokio::test]
async fn list_components_groups_by_category() {
    let dir = TempDir::new().expect("tempdir");
    let service = QueryService::new(seeded_store(&dir).await, None);

    let text = service.list_components(None).await.expect("list");
    assert!(text.starts_with("Found 4 components:"));
    let animations_at = text.find("## animations").expect("animations section");
    let components_at = text.find("## components").expect("components section");
    assert!(animations_at < components_at);

    let filtered = service
        .list_components(Some("components"))
        .await
        .expect("list");
    assert!(filtered.starts_with("Found 2 components in category components:"));
    assert!(!filtered.contains("Aurora"));
}
