//! Build manifest
//!
//! Tells the hosting platform which output paths reach the router and which
//! it serves straight from the static layer. Serialised as `_routes.json`:
//!
//! ```json
//! { "version": 1, "include": ["/api/*", "/*"], "exclude": ["/static/*", "/favicon.ico", "/", "/index.html"] }
//! ```

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use super::table::{RouteKind, RoutePattern, RouteTable};

pub const ROUTES_FILE: &str = "_routes.json";
const ROUTES_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestClass {
    /// Handled by the router at the edge
    Api,
    /// Served by the platform's static layer
    StaticExclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub class: ManifestClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildManifest {
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
struct RoutesJson<'a> {
    version: u32,
    include: Vec<&'a str>,
    exclude: Vec<&'a str>,
}

impl BuildManifest {
    /// Derive the manifest from the route table, in table order
    pub fn from_table(table: &RouteTable) -> Self {
        let mut entries: Vec<ManifestEntry> = Vec::new();
        for route in table.routes() {
            let class = match (&route.kind, &route.pattern) {
                (RouteKind::Unmatched, _) => continue,
                (RouteKind::Health | RouteKind::Api, _) | (RouteKind::Spa, RoutePattern::Any) => {
                    ManifestClass::Api
                }
                (RouteKind::Static | RouteKind::Asset(_) | RouteKind::Spa, _) => {
                    ManifestClass::StaticExclude
                }
            };
            let path = route.pattern.as_glob();
            if !entries.iter().any(|e| e.path == path) {
                entries.push(ManifestEntry { path, class });
            }
        }
        Self { entries }
    }

    pub fn class_of(&self, path: &str) -> Option<ManifestClass> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.class)
    }

    fn paths(&self, class: ManifestClass) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.class == class)
            .map(|e| e.path.as_str())
            .collect()
    }

    /// Render the platform's `_routes.json`
    pub fn to_routes_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&RoutesJson {
            version: ROUTES_VERSION,
            include: self.paths(ManifestClass::Api),
            exclude: self.paths(ManifestClass::StaticExclude),
        })
    }

    /// Write `_routes.json` into `out_dir`, creating it if needed
    pub fn write_routes_json(&self, out_dir: &Path) -> io::Result<PathBuf> {
        let json = self.to_routes_json().map_err(io::Error::other)?;
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(ROUTES_FILE);
        std::fs::write(&path, json + "\n")?;
        Ok(path)
    }
}
