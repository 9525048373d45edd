use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::debouncer::{ChangeKind, Debouncer};
use super::manifest::{ChangeSet, ManifestWatch, ReloadOutcome};
use super::watch_new_dirs;
use crate::core::{BuildMode, RoutePath};
use crate::manifest::ManifestSource;
use crate::reload::{HotUpdateCoordinator, UpdateError};
use crate::route::{Registry, RouteError};
use crate::utils::normalize_path;

const WINDOW: Duration = Duration::from_millis(300);

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

// ============================================================================
// Debouncer
// ============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(WINDOW);
    assert!(!debouncer.is_ready());
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_event_kinds() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.json"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.json"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.json"], remove_kind()));

    assert_eq!(debouncer.changes[Path::new("/tmp/a.json")], ChangeKind::Created);
    assert_eq!(debouncer.changes[Path::new("/tmp/b.json")], ChangeKind::Modified);
    assert_eq!(debouncer.changes[Path::new("/tmp/c.json")], ChangeKind::Removed);
}

#[test]
fn test_metadata_and_temp_files_ignored() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(
        vec!["/tmp/a.json"],
        notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::Any,
        )),
    ));
    debouncer.add_event(&make_event(
        vec!["/tmp/.routes.json.swp", "/tmp/routes.json~", "/tmp/x.bak"],
        modify_kind(),
    ));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_dedup_rules() {
    let mut debouncer = Debouncer::new(WINDOW);

    // restored
    debouncer.add_event(&make_event(vec!["/tmp/r.json"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/r.json"], create_kind()));
    // deleted after edit
    debouncer.add_event(&make_event(vec!["/tmp/m.json"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/m.json"], remove_kind()));
    // appeared and vanished
    debouncer.add_event(&make_event(vec!["/tmp/t.json"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/t.json"], remove_kind()));
    // first wins
    debouncer.add_event(&make_event(vec!["/tmp/f.json"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/f.json"], modify_kind()));

    assert_eq!(debouncer.changes[Path::new("/tmp/r.json")], ChangeKind::Created);
    assert_eq!(debouncer.changes[Path::new("/tmp/m.json")], ChangeKind::Removed);
    assert!(!debouncer.changes.contains_key(Path::new("/tmp/t.json")));
    assert_eq!(debouncer.changes[Path::new("/tmp/f.json")], ChangeKind::Created);
}

#[test]
fn test_take_after_window() {
    let mut debouncer = Debouncer::new(Duration::from_millis(5));
    debouncer.add_event(&make_event(vec!["/tmp/a.json"], modify_kind()));
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(5));

    std::thread::sleep(Duration::from_millis(10));
    let changes = debouncer.take_if_ready().unwrap();
    assert_eq!(changes.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.take_if_ready().is_none());
}

// ============================================================================
// ManifestWatch
// ============================================================================

fn page_json(path: &str, title: &str) -> String {
    format!(r#"{{"content":"{title}.vue","data":{{"path":"{path}","title":"{title}"}}}}"#)
}

fn manifest_json(routes: &[(&str, &str, &str)], redirects: &[(&str, &str)]) -> String {
    let routes: Vec<_> = routes
        .iter()
        .map(|(path, page, title)| {
            serde_json::json!({ "path": path, "page": page, "meta": { "title": title } })
        })
        .collect();
    let redirects: serde_json::Map<_, _> = redirects
        .iter()
        .map(|(from, to)| (from.to_string(), serde_json::Value::from(*to)))
        .collect();
    serde_json::json!({ "routes": routes, "redirects": redirects }).to_string()
}

struct Site {
    dir: TempDir,
    manifest: PathBuf,
}

impl Site {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        for (file, path, title) in [
            ("index.json", "/", "Home"),
            ("docs.json", "/docs/", "Docs"),
            ("404.json", "/404.html", ""),
        ] {
            fs::write(dir.path().join("pages").join(file), page_json(path, title)).unwrap();
        }
        let manifest = dir.path().join("routes.json");
        let site = Self { dir, manifest };
        site.write_manifest(&manifest_json(
            &[
                ("/", "pages/index.json", "Home"),
                ("/docs/", "pages/docs.json", "Docs"),
                ("/404.html", "pages/404.json", ""),
            ],
            &[("/documentation/", "/docs/")],
        ));
        site
    }

    fn write_manifest(&self, json: &str) {
        fs::write(&self.manifest, json).unwrap();
    }

    fn page(&self, name: &str) -> PathBuf {
        normalize_path(&self.dir.path().join("pages").join(name))
    }

    fn start(&self) -> (ManifestWatch, Arc<HotUpdateCoordinator>) {
        let source = ManifestSource::load(&self.manifest).unwrap();
        let (routes, redirects) = source.to_parts().unwrap();
        let registry = Registry::builder()
            .routes(routes)
            .redirects(redirects)
            .build()
            .unwrap();
        let coordinator = Arc::new(HotUpdateCoordinator::new(registry, BuildMode::DEVELOPMENT));
        (ManifestWatch::new(&source), coordinator)
    }
}

fn manifest_only() -> ChangeSet {
    ChangeSet {
        manifest: true,
        pages: vec![],
    }
}

#[test]
fn test_classify_filters_unrelated_files() {
    let site = Site::new();
    let (watch, _) = site.start();

    let mut raw = FxHashMap::default();
    raw.insert(normalize_path(&site.manifest), ChangeKind::Modified);
    raw.insert(site.page("docs.json"), ChangeKind::Modified);
    raw.insert(site.page("unrelated.json"), ChangeKind::Created);

    let set = watch.classify(&raw).unwrap();
    assert!(set.manifest);
    assert_eq!(set.pages, vec![site.page("docs.json")]);

    let mut raw = FxHashMap::default();
    raw.insert(site.page("unrelated.json"), ChangeKind::Modified);
    assert!(watch.classify(&raw).is_none());
}

#[test]
fn test_watch_dirs_dedup_nested() {
    let site = Site::new();
    let (watch, _) = site.start();
    // pages/ lives under the manifest directory
    assert_eq!(watch.watch_dirs(), vec![normalize_path(site.dir.path())]);
}

#[tokio::test]
async fn test_new_page_dir_gets_watched() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();
    let mut watched = watch.watch_dirs();
    let mut watcher = notify::recommended_watcher(|_: notify::Result<notify::Event>| {}).unwrap();

    let outside = TempDir::new().unwrap();
    let guide = outside.path().join("guide.json");
    fs::write(&guide, page_json("/guide/", "Guide")).unwrap();
    site.write_manifest(&manifest_json(
        &[
            ("/", "pages/index.json", "Home"),
            ("/guide/", guide.to_str().unwrap(), "Guide"),
            ("/404.html", "pages/404.json", ""),
        ],
        &[],
    ));

    let outcome = watch.reload(&manifest_only(), &coordinator).await;
    assert!(matches!(outcome, ReloadOutcome::Applied(_)));
    assert_eq!(
        watch.unwatched_dirs(&watched),
        vec![normalize_path(outside.path())]
    );

    watch_new_dirs(&mut watcher, &mut watched, &watch);
    assert!(watched.contains(&normalize_path(outside.path())));
    assert!(watch.unwatched_dirs(&watched).is_empty());
}

#[tokio::test]
async fn test_reload_skips_unchanged_manifest() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();

    let outcome = watch.reload(&manifest_only(), &coordinator).await;
    assert!(matches!(outcome, ReloadOutcome::Unchanged));
    assert_eq!(coordinator.generation(), 0);
}

#[tokio::test]
async fn test_reload_page_edit_always_publishes() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();
    let changes = ChangeSet {
        manifest: false,
        pages: vec![site.page("docs.json")],
    };

    let ReloadOutcome::Applied(ack) = watch.reload(&changes, &coordinator).await else {
        panic!("expected update to apply");
    };
    assert!(ack.diff.added.is_empty() && ack.diff.removed.is_empty());
    assert!(ack.diff.changed.is_empty());
    assert_eq!(coordinator.generation(), 1);
}

#[tokio::test]
async fn test_reload_marks_only_edited_pages() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();
    let before = coordinator.snapshot();

    fs::write(site.page("docs.json"), page_json("/docs/", "Docs v2")).unwrap();
    let changes = ChangeSet {
        manifest: false,
        pages: vec![site.page("docs.json")],
    };

    let ReloadOutcome::Applied(ack) = watch.reload(&changes, &coordinator).await else {
        panic!("expected update to apply");
    };
    assert_eq!(ack.diff.reloaded, vec![RoutePath::new("/docs/")]);

    let after = coordinator.snapshot();
    let index = (before.get("/").unwrap(), after.get("/").unwrap());
    assert!(index.0.loader().same_as(index.1.loader()));

    let target = after.resolve_target("/docs/").unwrap();
    let page = after.load_page(&target.entry).await.unwrap();
    assert_eq!(page.title(), "Docs v2");
}

#[tokio::test]
async fn test_reload_applies_new_routes() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();

    fs::write(site.page("guide.json"), page_json("/guide/", "Guide")).unwrap();
    site.write_manifest(&manifest_json(
        &[
            ("/", "pages/index.json", "Home"),
            ("/guide/", "pages/guide.json", "Guide"),
            ("/404.html", "pages/404.json", ""),
        ],
        &[],
    ));

    let ReloadOutcome::Applied(ack) = watch.reload(&manifest_only(), &coordinator).await else {
        panic!("expected update to apply");
    };
    assert_eq!(ack.generation, 1);
    assert_eq!(ack.diff.added.len(), 1);
    assert_eq!(ack.diff.removed.len(), 1);
    assert!(ack.diff.reloaded.is_empty());

    let registry = coordinator.snapshot();
    let target = registry.resolve_target("/guide").unwrap();
    assert_eq!(registry.load_page(&target.entry).await.unwrap().title(), "Guide");

    // the new page file is now tracked
    let mut raw = FxHashMap::default();
    raw.insert(site.page("guide.json"), ChangeKind::Modified);
    assert!(watch.classify(&raw).is_some());
}

#[tokio::test]
async fn test_reload_rejects_cycle_and_keeps_routes() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();

    site.write_manifest(&manifest_json(
        &[
            ("/", "pages/index.json", "Home"),
            ("/404.html", "pages/404.json", ""),
        ],
        &[("/a", "/b"), ("/b", "/a")],
    ));

    let outcome = watch.reload(&manifest_only(), &coordinator).await;
    assert!(matches!(
        outcome,
        ReloadOutcome::Rejected(UpdateError::Rejected(RouteError::RedirectCycle { .. }))
    ));
    assert_eq!(coordinator.generation(), 0);
    assert!(coordinator.snapshot().contains("/docs/"));

    // Same broken bytes again are still offered, not skipped as unchanged
    let outcome = watch.reload(&manifest_only(), &coordinator).await;
    assert!(matches!(outcome, ReloadOutcome::Rejected(_)));
}

#[tokio::test]
async fn test_reload_reports_unreadable_manifest() {
    let site = Site::new();
    let (mut watch, coordinator) = site.start();

    site.write_manifest("{ broken");
    let outcome = watch.reload(&manifest_only(), &coordinator).await;
    assert!(matches!(outcome, ReloadOutcome::Failed(_)));
    assert_eq!(coordinator.generation(), 0);
}
