use serde::{Deserialize, Serialize};

use crate::core::geo::TileCoord;

/// Anything that can produce the URL of a tile.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`. Wrapped copies of a tile must
    /// produce the URL of its canonical tile.
    fn url(&self, coord: &TileCoord) -> String;
}

/// URL template with `{z}`, `{x}`, `{y}` and optional `{s}` placeholders, as
/// used by most slippy-map tile servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSource {
    template: String,
    #[serde(default)]
    subdomains: Vec<String>,
}

impl TemplateSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: Vec::new(),
        }
    }

    /// Hosts substituted for `{s}`, spread evenly across tiles
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// The standard OpenStreetMap tile server
    pub fn openstreetmap() -> Self {
        Self::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
            .with_subdomains(["a", "b", "c"])
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

impl TileSource for TemplateSource {
    fn url(&self, coord: &TileCoord) -> String {
        let x = coord.canonical_x();
        let mut url = self
            .template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &coord.y.to_string());

        if url.contains("{s}") {
            let sub = if self.subdomains.is_empty() {
                ""
            } else {
                let idx = (x + coord.y).rem_euclid(self.subdomains.len() as i64) as usize;
                self.subdomains[idx].as_str()
            };
            url = url.replace("{s}", sub);
        }
        url
    }
}
