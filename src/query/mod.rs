//! Read-side queries over the component store.
//!
//! Every operation renders its result as markdown-flavored prose, since the
//! tool surface returns text for a model or a human to read, never structured
//! records. Search runs against the FTS index first and falls back to LIKE
//! matching when the index has nothing, so typos and mid-word fragments still
//! find components.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::page_extractor::schema::ComponentPayload;
use crate::store::{ComponentRow, ComponentStore};
use crate::utils::constants::SEARCH_RESULT_LIMIT;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The caller's arguments were malformed or insufficient.
    #[error("{0}")]
    InvalidParams(String),

    /// No component matched a lookup by name.
    #[error("Component \"{0}\" not found")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for QueryError {
    fn from(e: sqlx::Error) -> Self {
        QueryError::Internal(e.into())
    }
}

/// Query layer over an open [`ComponentStore`].
#[derive(Debug, Clone)]
pub struct QueryService {
    store: ComponentStore,
    /// Root of the artifact tree, for reading code files the store only
    /// references by relative path.
    artifacts_root: Option<PathBuf>,
}

/// Quote a user-supplied term for an FTS5 prefix query.
///
/// FTS5 treats bare punctuation as syntax; wrapping the term in doubled quotes
/// makes it a literal string, and the trailing `*` keeps prefix matching.
fn fts_prefix_term(query: &str) -> String {
    format!("\"{}\"*", query.replace('"', "\"\""))
}

impl QueryService {
    pub fn new(store: ComponentStore, artifacts_root: Option<PathBuf>) -> Self {
        Self {
            store,
            artifacts_root,
        }
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Search components by keyword, optionally scoped to a category.
    ///
    /// An empty query with a category degenerates to a category listing; an
    /// empty query without one is an error.
    pub async fn search_components(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<String, QueryError> {
        let query = query.trim();

        let results = if query.is_empty() {
            let Some(category) = category else {
                return Err(QueryError::InvalidParams(
                    "Search query or category must be provided".to_string(),
                ));
            };
            sqlx::query_as::<_, ComponentRow>(
                "SELECT * FROM components WHERE category = ? ORDER BY name LIMIT ?",
            )
            .bind(category)
            .bind(SEARCH_RESULT_LIMIT)
            .fetch_all(self.store.pool())
            .await?
        } else {
            let mut results = self.search_fts(query, category).await;
            if results.is_empty() {
                debug!("FTS found nothing for {query:?}, trying LIKE fallback");
                results = self.search_like(query, category).await?;
            }
            results
        };

        let mut text = format!(
            "Found {} components matching \"{}\"{}:\n\n",
            results.len(),
            query,
            category.map(|c| format!(" in category {c}")).unwrap_or_default()
        );

        for (index, row) in results.iter().enumerate() {
            text.push_str(&format!(
                "{}. **{}** ({})\n   {}\n",
                index + 1,
                row.name,
                row.category,
                description_or_default(row)
            ));
            if let Some(deps) = row.dependencies.as_deref()
                && !deps.trim().is_empty()
            {
                text.push_str(&format!("   Installation: `npm install {deps}`\n"));
            }
            text.push('\n');
        }

        Ok(text)
    }

    /// FTS5 prefix search, ranked by relevance. Index failures degrade to an
    /// empty result so the LIKE fallback gets a chance.
    async fn search_fts(&self, query: &str, category: Option<&str>) -> Vec<ComponentRow> {
        let term = fts_prefix_term(query);

        let result = match category {
            Some(category) => {
                sqlx::query_as::<_, ComponentRow>(
                    r#"
                    SELECT c.*
                    FROM components_fts ft
                    JOIN components c ON ft.rowid = c.id
                    WHERE ft.components_fts MATCH ? AND c.category = ?
                    ORDER BY rank
                    LIMIT ?
                    "#,
                )
                .bind(&term)
                .bind(category)
                .bind(SEARCH_RESULT_LIMIT)
                .fetch_all(self.store.pool())
                .await
            }
            None => {
                sqlx::query_as::<_, ComponentRow>(
                    r#"
                    SELECT c.*
                    FROM components_fts ft
                    JOIN components c ON ft.rowid = c.id
                    WHERE ft.components_fts MATCH ?
                    ORDER BY rank
                    LIMIT ?
                    "#,
                )
                .bind(&term)
                .bind(SEARCH_RESULT_LIMIT)
                .fetch_all(self.store.pool())
                .await
            }
        };

        match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!("FTS query failed for {query:?}: {e}");
                Vec::new()
            }
        }
    }

    async fn search_like(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<ComponentRow>, QueryError> {
        let pattern = format!("%{query}%");

        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ComponentRow>(
                    r#"
                    SELECT *
                    FROM components
                    WHERE (name LIKE ? OR description LIKE ?) AND category = ?
                    ORDER BY name
                    LIMIT ?
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(category)
                .bind(SEARCH_RESULT_LIMIT)
                .fetch_all(self.store.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, ComponentRow>(
                    r#"
                    SELECT *
                    FROM components
                    WHERE name LIKE ? OR description LIKE ?
                    ORDER BY category, name
                    LIMIT ?
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(SEARCH_RESULT_LIMIT)
                .fetch_all(self.store.pool())
                .await?
            }
        };

        Ok(rows)
    }

    /// Full details for one component, located by progressively looser name
    /// matching: exact, then case-insensitive, then substring.
    pub async fn get_component(&self, name: &str) -> Result<String, QueryError> {
        if name.trim().is_empty() {
            return Err(QueryError::InvalidParams(
                "Component name is required".to_string(),
            ));
        }

        let lookups = [
            "SELECT * FROM components WHERE name = ? LIMIT 1",
            "SELECT * FROM components WHERE LOWER(name) = LOWER(?) LIMIT 1",
            "SELECT * FROM components WHERE name LIKE ? LIMIT 1",
        ];

        let mut component: Option<ComponentRow> = None;
        for (i, sql) in lookups.iter().enumerate() {
            let bound = if i == 2 {
                format!("%{name}%")
            } else {
                name.to_string()
            };
            component = sqlx::query_as::<_, ComponentRow>(sql)
                .bind(bound)
                .fetch_optional(self.store.pool())
                .await?;
            if component.is_some() {
                break;
            }
        }

        let Some(component) = component else {
            return Err(QueryError::NotFound(name.to_string()));
        };

        Ok(self.render_component(&component).await)
    }

    async fn render_component(&self, component: &ComponentRow) -> String {
        let payload: Option<ComponentPayload> = component
            .json_data
            .as_deref()
            .and_then(|raw| match serde_json::from_str(raw) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!("Unparseable json_data for {}: {e}", component.name);
                    None
                }
            });

        let mut text = format!("# {}\n\n", component.name);
        text.push_str(&format!("**Category:** {}\n\n", component.category));
        text.push_str(&format!("{}\n\n", description_or_default(component)));

        if let Some(deps) = component.dependencies.as_deref()
            && !deps.trim().is_empty()
        {
            text.push_str(&format!(
                "## Installation\n\n```bash\nnpm install {deps}\n```\n\n"
            ));
        }

        if let Some(payload) = &payload
            && !payload.props.is_empty()
        {
            text.push_str("## Component Props\n\n");
            for (name, prop) in &payload.props {
                text.push_str(&format!("- **{name}**: "));
                if prop.prop_type.is_empty() {
                    text.push_str("any");
                } else {
                    text.push_str(&prop.prop_type);
                }
                if !prop.default_value.is_empty() {
                    text.push_str(&format!(" (default: {})", prop.default_value));
                }
                text.push('\n');
                if !prop.description.is_empty() {
                    text.push_str(&format!("  {}\n", prop.description));
                }
                text.push('\n');
            }
        }

        text.push_str("## Component Code\n\n```jsx\n");
        text.push_str(&self.component_code(component).await);
        text.push_str("\n```\n\n");

        if let Some(preview) = component.preview_image.as_deref() {
            text.push_str(&format!("## Preview\n\nPreview Image URL: {preview}\n\n"));
        }

        text
    }

    /// Code for a component: the stored column when present, else the code
    /// artifact on disk, else a placeholder comment.
    async fn component_code(&self, component: &ComponentRow) -> String {
        if let Some(code) = component.code.as_deref()
            && !code.trim().is_empty()
        {
            return code.to_string();
        }

        if let Some(root) = &self.artifacts_root
            && let Some(relative) = component.file_path.as_deref()
        {
            let path = root.join(relative);
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => return contents,
                Err(e) => debug!("Code file unreadable at {}: {e}", path.display()),
            }
        }

        "// No code available for this component".to_string()
    }

    pub async fn list_categories(&self) -> Result<String, QueryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT category FROM components ORDER BY category")
                .fetch_all(self.store.pool())
                .await?;

        let names: Vec<String> = rows.into_iter().map(|(c,)| c).collect();
        Ok(format!("Available categories: {}", names.join(", ")))
    }

    /// List every component, grouped by category in stored order.
    pub async fn list_components(&self, category: Option<&str>) -> Result<String, QueryError> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ComponentRow>(
                    "SELECT * FROM components WHERE category = ? ORDER BY name",
                )
                .bind(category)
                .fetch_all(self.store.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, ComponentRow>(
                    "SELECT * FROM components ORDER BY category, name",
                )
                .fetch_all(self.store.pool())
                .await?
            }
        };

        let mut text = format!(
            "Found {} components{}:\n\n",
            rows.len(),
            category.map(|c| format!(" in category {c}")).unwrap_or_default()
        );

        let mut current_category: Option<&str> = None;
        let mut index = 0usize;
        for row in &rows {
            if current_category != Some(row.category.as_str()) {
                current_category = Some(row.category.as_str());
                index = 0;
                text.push_str(&format!("## {}\n\n", row.category));
            }
            index += 1;
            text.push_str(&format!(
                "{index}. **{}**\n   {}\n\n",
                row.name,
                description_or_default(row)
            ));
        }

        Ok(text)
    }
}

fn description_or_default(row: &ComponentRow) -> &str {
    match row.description.as_deref() {
        Some(description) if !description.trim().is_empty() => description,
        _ => "No description available",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fts_term_is_quoted_and_prefixed() {
        assert_eq!(fts_prefix_term("stepper"), "\"stepper\"*");
        assert_eq!(fts_prefix_term("a\"b"), "\"a\"\"b\"*");
    }
}
