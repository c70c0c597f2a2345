//! Discovery of item URLs, grouped by category.
//!
//! Two strategies: ask the mapping service for every URL under the gallery
//! root, or fetch the root page ourselves and harvest anchors. The root page
//! renders its navigation client-side, so the fetch path is backstopped by a
//! curated list of known item paths. Either way the result is a [`SiteMap`]
//! with a stable category order and first-seen URL order within each category.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::firecrawl::FirecrawlClient;
use crate::page_extractor::schema::Category;
use crate::utils::constants::CURATED_ITEM_PATHS;

/// Cap passed to the mapping service; the gallery is far smaller than this.
const MAP_LIMIT: usize = 500;

/// Item URLs per category, in discovery order.
#[derive(Debug, Default)]
pub struct SiteMap {
    entries: Vec<(Category, Vec<String>)>,
}

impl SiteMap {
    fn from_links<I>(base_url: &str, links: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries: Vec<(Category, Vec<String>)> = Category::ALL
            .iter()
            .map(|&category| (category, Vec::new()))
            .collect();

        for link in links {
            let Some((category, url)) = partition_link(base_url, &link) else {
                continue;
            };
            let bucket = &mut entries
                .iter_mut()
                .find(|(c, _)| *c == category)
                .expect("all categories present")
                .1;
            if !bucket.contains(&url) {
                bucket.push(url);
            }
        }

        SiteMap { entries }
    }

    /// Categories in canonical order with their discovered URLs.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries
            .iter()
            .map(|(category, urls)| (*category, urls.as_slice()))
    }

    pub fn urls_for(&self, category: Category) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, urls)| urls.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, urls)| urls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Classify one discovered link against the gallery's category prefixes.
///
/// Accepts absolute URLs under `base_url` and site-relative paths; returns the
/// absolute URL. Links outside the three category prefixes, and the bare
/// category index pages themselves, are dropped.
pub fn partition_link(base_url: &str, link: &str) -> Option<(Category, String)> {
    let base = base_url.trim_end_matches('/');

    let path = if let Some(stripped) = link.strip_prefix(base) {
        stripped
    } else if link.starts_with('/') {
        link
    } else {
        return None;
    };

    let path = path.trim_end_matches('/');
    for category in Category::ALL {
        if let Some(rest) = path.strip_prefix(&format!("/{category}/"))
            && !rest.is_empty()
            && !rest.contains('/')
        {
            return Some((category, format!("{base}{path}")));
        }
    }
    None
}

/// Map the site via the structured-extraction service.
pub async fn map_with_service(client: &FirecrawlClient, base_url: &str) -> Result<SiteMap> {
    let links = client
        .map_site(base_url, MAP_LIMIT)
        .await
        .context("site mapping service failed")?;
    let map = SiteMap::from_links(base_url, links);
    info!("Mapping service discovered {} item URLs", map.total());
    Ok(map)
}

/// Map the site by fetching the root page and harvesting anchors, merged with
/// the curated path list.
///
/// A fetch failure degrades to the curated list alone rather than erroring;
/// the curated paths are the floor for discovery.
pub async fn map_from_root(base_url: &str) -> SiteMap {
    let mut links: Vec<String> = Vec::new();

    match fetch_root_anchors(base_url).await {
        Ok(anchors) => {
            info!("Harvested {} anchors from the gallery root", anchors.len());
            links.extend(anchors);
        }
        Err(e) => warn!("Root page fetch failed, using curated paths only: {e:#}"),
    }

    links.extend(CURATED_ITEM_PATHS.iter().map(|p| p.to_string()));

    let map = SiteMap::from_links(base_url, links);
    info!("Root mapping yielded {} item URLs", map.total());
    map
}

async fn fetch_root_anchors(base_url: &str) -> Result<Vec<String>> {
    let body = reqwest::Client::new()
        .get(base_url)
        .send()
        .await
        .context("root page request failed")?
        .error_for_status()
        .context("root page request rejected")?
        .text()
        .await
        .context("root page body unreadable")?;

    let document = Html::parse_document(&body);
    let anchor = Selector::parse("a[href]").expect("valid selector");

    Ok(document
        .select(&anchor)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect())
}
