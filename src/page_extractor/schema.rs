//! Payload types shared by the extraction ladder, the artifact files and the
//! store loader.
//!
//! The wire format is camelCase JSON so artifacts written by this crate stay
//! interchangeable with the gallery payloads it originally mirrored.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The gallery's fixed category set.
///
/// Every item URL, artifact directory and store row belongs to exactly one of
/// these. `ALL` fixes the iteration order used by the site mapper, the
/// orchestrator and the store loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Components,
    Backgrounds,
    Animations,
}

impl Category {
    /// All categories in canonical processing order.
    pub const ALL: [Category; 3] = [
        Category::Components,
        Category::Backgrounds,
        Category::Animations,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Components => "components",
            Category::Backgrounds => "backgrounds",
            Category::Animations => "animations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "components" => Ok(Category::Components),
            "backgrounds" => Ok(Category::Backgrounds),
            "animations" => Ok(Category::Animations),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One row of an item page's props table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropInfo {
    /// Declared prop type, empty when the table omits it.
    #[serde(rename = "type", default)]
    pub prop_type: String,

    /// Default value column, empty when absent.
    #[serde(rename = "default", default)]
    pub default_value: String,

    #[serde(default)]
    pub description: String,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// The structured extraction record for one gallery item.
///
/// This is both the in-memory result of the extraction ladder and the exact
/// shape of the `<slug>.json` artifact. When stored, the serialized form is
/// the authoritative source for props and dependencies; the store's flattened
/// `dependencies` column is derived from `dependencies` here at write time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPayload {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Prop name → details. A BTreeMap keeps serialization deterministic.
    #[serde(default)]
    pub props: BTreeMap<String, PropInfo>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Concatenated, cleaned source text; may be empty.
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Relative filename of the captured preview screenshot, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,

    /// RFC 3339 capture timestamp, stamped by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,

    /// Set when every extraction stage failed for this item.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

impl ComponentPayload {
    /// A payload is usable when it carries a real name and no error marker.
    /// This is the gate between stages of the extraction ladder.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.name.trim().is_empty() && !self.error
    }

    /// Synthesize the error payload produced on total extraction failure.
    ///
    /// The name falls back to `Error: <slug>` so the artifact is still
    /// identifiable, and the failure message lands in `description` for
    /// diagnostics.
    #[must_use]
    pub fn failure(url: &str, slug: &str, message: &str) -> Self {
        ComponentPayload {
            name: format!("Error: {slug}"),
            description: format!("Failed to scrape: {message}"),
            url: url.to_string(),
            error: true,
            ..ComponentPayload::default()
        }
    }
}
