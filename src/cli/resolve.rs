//! `docroute resolve`: show the path a request ends up on.

use std::sync::Arc;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use super::common::load_registry;
use crate::config::RouterConfig;
use crate::core::{BuildMode, RoutePath};
use crate::page::RouteMeta;
use crate::reload::{HotUpdateCoordinator, NavOutcome, Navigator};
use crate::route::Registry;

pub async fn resolve(config: &RouterConfig, path: &str, data: bool) -> Result<()> {
    let (_, registry) = load_registry(config)?;
    let requested = RoutePath::new(path);

    for step in describe_chain(&registry, &requested) {
        println!("{step}");
    }

    let coordinator = Arc::new(HotUpdateCoordinator::new(registry, BuildMode::PRODUCTION));
    let navigator = Navigator::new(Arc::clone(&coordinator));

    let rendered = match navigator.navigate(requested).await? {
        NavOutcome::Rendered(rendered) => rendered,
        NavOutcome::Failed { path, error } => bail!("failed to load `{}`: {}", path, error),
        NavOutcome::Superseded => return Ok(()),
    };

    let snapshot = coordinator.snapshot();
    if let Some(meta) = snapshot.metadata_of(rendered.path.clone()) {
        for line in describe_meta(meta) {
            println!("{line}");
        }
    }

    if data {
        println!("{}", serde_json::to_string_pretty(&rendered.page.data)?);
    }
    Ok(())
}

/// One step of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Redirect(RoutePath, RoutePath),
    Route(RoutePath),
    Missing(RoutePath),
    Fallback(RoutePath),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redirect(from, to) => write!(f, "{} {} {}", from, "->".dimmed(), to),
            Self::Route(path) => write!(f, "{} {}", path.bold(), "(route)".green()),
            Self::Missing(path) => write!(f, "{} {}", path, "(not found)".red()),
            Self::Fallback(path) => write!(f, "{} {}", path.bold(), "(fallback)".yellow()),
        }
    }
}

/// Every hop, ending with the page that renders.
fn describe_chain(registry: &Registry, requested: &RoutePath) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut current = requested.clone();

    // Registry validation guarantees the chain ends
    while let Some(next) = registry.redirects().target(&current) {
        steps.push(Step::Redirect(current, next.clone()));
        current = next.clone();
    }

    if registry.contains(current.clone()) {
        steps.push(Step::Route(current));
    } else {
        steps.push(Step::Missing(current));
        if let Some(fallback) = registry.not_found() {
            steps.push(Step::Fallback(fallback.clone()));
        }
    }
    steps
}

fn describe_meta(meta: &RouteMeta) -> Vec<String> {
    let mut lines = vec![format!("  title: {}", meta.title)];
    lines.extend(meta.extra.iter().map(|(key, value)| format!("  {key}: {value}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageData, PageModule};
    use crate::route::{PageLoader, RouteEntry};

    fn entry(path: &str, title: &str) -> RouteEntry {
        let module = PageModule::new("page.vue", PageData::new(path, title));
        RouteEntry::new(path, PageLoader::ready(module), RouteMeta::new(title))
    }

    fn registry() -> Registry {
        Registry::builder()
            .routes([entry("/docs/", "Docs"), entry("/404.html", "")])
            .redirect("/documentation/", "/guide/")
            .redirect("/guide/", "/docs/")
            .build()
            .unwrap()
    }

    fn path(p: &str) -> RoutePath {
        RoutePath::new(p)
    }

    #[test]
    fn test_describe_chain_follows_redirects() {
        let steps = describe_chain(&registry(), &path("/documentation"));
        assert_eq!(
            steps,
            [
                Step::Redirect(path("/documentation/"), path("/guide/")),
                Step::Redirect(path("/guide/"), path("/docs/")),
                Step::Route(path("/docs/")),
            ]
        );
    }

    #[test]
    fn test_describe_chain_fallback() {
        let steps = describe_chain(&registry(), &path("/missing/"));
        assert_eq!(
            steps,
            [Step::Missing(path("/missing/")), Step::Fallback(path("/404.html"))]
        );
    }

    #[test]
    fn test_describe_meta() {
        let meta = RouteMeta::new("Docs").with("order", 2);
        assert_eq!(describe_meta(&meta), ["  title: Docs", "  order: 2"]);
    }
}
