//! Route manifest produced by the content build.
//!
//! ```json
//! {
//!   "routes": [
//!     { "path": "/", "page": "pages/index.html.json", "meta": { "title": "Home" } }
//!   ],
//!   "redirects": { "/documentation/": "/docs/" }
//! }
//! ```
//!
//! `page` is relative to the manifest's directory. Routes are an array so
//! a duplicated path survives parsing and is reported by the registry.

mod error;
mod page_file;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

pub use error::ManifestError;
pub use page_file::{file_loader, read_page};

use crate::core::RoutePath;
use crate::page::RouteMeta;
use crate::route::{RedirectTable, RouteEntry};
use crate::utils::ContentHash;

/// One route as written by the content build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRoute {
    /// Raw path; normalized when the entry is created.
    pub path: String,
    /// Page file, relative to the manifest.
    pub page: PathBuf,
    pub meta: RouteMeta,
}

/// Parsed `routes.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
    /// Raw source -> destination. Sources are normalized later.
    #[serde(default, deserialize_with = "deserialize_redirects")]
    pub redirects: BTreeMap<String, String>,
}

/// Redirect object that refuses a repeated source key instead of keeping
/// the last one.
fn deserialize_redirects<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Redirects;

    impl<'de> Visitor<'de> for Redirects {
        type Value = BTreeMap<String, String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of redirect sources to destinations")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut redirects = BTreeMap::new();
            while let Some((from, to)) = map.next_entry::<String, String>()? {
                if redirects.contains_key(&from) {
                    return Err(de::Error::custom(format_args!(
                        "duplicate redirect source `{from}`"
                    )));
                }
                redirects.insert(from, to);
            }
            Ok(redirects)
        }
    }

    deserializer.deserialize_map(Redirects)
}

impl RouteManifest {
    /// Normalize redirect sources, rejecting two raw keys that collapse
    /// into one path.
    pub fn redirect_table(&self) -> Result<RedirectTable, ManifestError> {
        let mut table = RedirectTable::new();
        for (from, to) in &self.redirects {
            let source = RoutePath::new(from);
            if table.insert(source.clone(), to.as_str()).is_some() {
                return Err(ManifestError::DuplicateRedirect(source));
            }
        }
        Ok(table)
    }
}

/// A manifest loaded from disk, with its location and content hash.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
    manifest: RouteManifest,
    fingerprint: ContentHash,
}

impl ManifestSource {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|err| ManifestError::Io(path.to_path_buf(), err))?;
        Self::parse(path, &bytes)
    }

    /// Parse manifest bytes as if read from `path`.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, ManifestError> {
        let manifest = serde_json::from_slice(bytes)
            .map_err(|err| ManifestError::Json(path.to_path_buf(), err))?;
        Ok(Self {
            path: path.to_path_buf(),
            manifest,
            fingerprint: ContentHash::of(bytes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &RouteManifest {
        &self.manifest
    }

    /// blake3 hash of the raw manifest bytes.
    pub fn fingerprint(&self) -> ContentHash {
        self.fingerprint
    }

    /// Directory that relative page paths resolve against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Absolute page file for a manifest route.
    pub fn page_file(&self, route: &ManifestRoute) -> PathBuf {
        self.base_dir().join(&route.page)
    }

    /// Every page file the manifest references, in manifest order.
    pub fn page_files(&self) -> Vec<PathBuf> {
        self.manifest
            .routes
            .iter()
            .map(|route| self.page_file(route))
            .collect()
    }

    /// Route entries with file-backed loaders, plus the redirect table.
    ///
    /// Fresh entries every call, so a new registry never shares cached
    /// page modules with an older one.
    pub fn to_parts(&self) -> Result<(Vec<RouteEntry>, RedirectTable), ManifestError> {
        let redirects = self.manifest.redirect_table()?;
        let entries = self
            .manifest
            .routes
            .iter()
            .map(|route| {
                let path = RoutePath::new(&route.path);
                let loader = file_loader(path.clone(), self.page_file(route));
                RouteEntry::new(path, loader, route.meta.clone())
            })
            .collect();
        Ok((entries, redirects))
    }
}
