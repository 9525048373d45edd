//! Page data record shipped with every page module.
//!
//! The JSON shape is shared with the renderer and downstream tooling,
//! so field names and nesting are fixed:
//!
//! ```json
//! {
//!   "path": "/documentation/",
//!   "title": "Docs",
//!   "lang": "en-US",
//!   "frontmatter": { "description": "Docs index" },
//!   "headers": [{ "level": 3, "title": "Replaying", "slug": "replaying",
//!                 "link": "#replaying", "children": [] }],
//!   "git": { "updatedTime": 1732803811000, "contributors": [
//!              { "name": "…", "email": "…", "commits": 2, "url": "…" }] },
//!   "filePathRelative": "documentation/README.md"
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::core::RoutePath;

/// Structured page metadata produced by the content build.
///
/// Immutable once produced: a content change yields a new record in a new
/// registry snapshot, never an in-place edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub path: RoutePath,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub frontmatter: JsonMap,
    /// Top-level headings; nested ones live in `children`.
    #[serde(default)]
    pub headers: Vec<PageHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path_relative: Option<String>,
}

impl PageData {
    pub fn new(path: impl Into<RoutePath>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            lang: String::new(),
            frontmatter: JsonMap::new(),
            headers: Vec::new(),
            git: None,
            file_path_relative: None,
        }
    }

    /// Frontmatter `description`, if it is a string.
    pub fn description(&self) -> Option<&str> {
        self.frontmatter.get("description").and_then(|v| v.as_str())
    }

    /// All headings, depth-first in document order.
    pub fn all_headers(&self) -> Vec<&PageHeader> {
        let mut out = Vec::new();
        for header in &self.headers {
            header.collect_into(&mut out);
        }
        out
    }

    /// Find a heading anywhere in the tree by slug.
    pub fn find_header(&self, slug: &str) -> Option<&PageHeader> {
        self.all_headers().into_iter().find(|h| h.slug == slug)
    }

    /// Last update time in milliseconds since the Unix epoch.
    pub fn updated_time(&self) -> Option<u64> {
        self.git.as_ref().and_then(|git| git.updated_time)
    }
}

/// One heading descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHeader {
    /// Heading level (1-6).
    pub level: u8,
    pub title: String,
    pub slug: String,
    /// Anchor link, `#<slug>`.
    pub link: String,
    #[serde(default)]
    pub children: Vec<PageHeader>,
}

impl PageHeader {
    pub fn new(level: u8, title: impl Into<String>, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            level,
            title: title.into(),
            link: format!("#{slug}"),
            slug,
            children: Vec::new(),
        }
    }

    /// Build a heading tree from a flat, document-ordered list.
    ///
    /// A heading becomes a child of the closest preceding heading with a
    /// smaller level. Children already present on the inputs are kept.
    pub fn nest(flat: impl IntoIterator<Item = PageHeader>) -> Vec<PageHeader> {
        let mut roots = Vec::new();
        let mut stack: Vec<PageHeader> = Vec::new();

        for header in flat {
            while stack.last().is_some_and(|top| top.level >= header.level) {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut roots, done);
                }
            }
            stack.push(header);
        }
        while let Some(done) = stack.pop() {
            attach(&mut stack, &mut roots, done);
        }

        roots
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a PageHeader>) {
        out.push(self);
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

fn attach(stack: &mut [PageHeader], roots: &mut Vec<PageHeader>, done: PageHeader) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(done),
        None => roots.push(done),
    }
}

/// Provenance from version control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<u64>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub commits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
