//! File-backed page loaders.
//!
//! A page file is a serialized [`PageModule`]:
//!
//! ```json
//! { "content": "pages/docs.vue", "data": { "path": "/docs/", "title": "Docs" } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::RoutePath;
use crate::page::PageModule;
use crate::route::{LoadError, PageLoader};

/// Loader that reads `file` on a blocking task each time it is invoked.
///
/// The page's `data.path` must normalize to `route`.
pub fn file_loader(route: RoutePath, file: PathBuf) -> PageLoader {
    let source = file.display().to_string();
    PageLoader::new(move || {
        let route = route.clone();
        let file = file.clone();
        async move {
            let module = tokio::task::spawn_blocking(move || read_page(&file))
                .await
                .map_err(|err| LoadError::Task(err.to_string()))??;

            if module.data.path != route {
                return Err(LoadError::PathMismatch {
                    expected: route,
                    found: module.data.path,
                });
            }
            Ok(module)
        }
    })
    .with_source(source)
}

/// Read and parse one page file.
pub fn read_page(file: &Path) -> Result<PageModule, LoadError> {
    let bytes = fs::read(file).map_err(|err| LoadError::Io(file.to_path_buf(), err))?;
    serde_json::from_slice(&bytes).map_err(|err| LoadError::Parse(file.to_path_buf(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_file_loader_reads_page() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "docs.json",
            r#"{"content":"docs.vue","data":{"path":"/docs/","title":"Docs"}}"#,
        );

        let loader = file_loader(RoutePath::new("/docs/"), file.clone());
        assert_eq!(loader.source(), Some(file.display().to_string().as_str()));

        let page = loader.load().await.unwrap();
        assert_eq!(page.content.as_str(), "docs.vue");
        assert_eq!(page.title(), "Docs");
    }

    #[tokio::test]
    async fn test_file_loader_normalizes_page_path() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "docs.json",
            r#"{"content":"docs.vue","data":{"path":"/docs/index.html","title":"Docs"}}"#,
        );
        let page = file_loader(RoutePath::new("/docs"), file).load().await.unwrap();
        assert_eq!(page.data.path, "/docs/");
    }

    #[tokio::test]
    async fn test_file_loader_path_mismatch() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "a.json",
            r#"{"content":"a.vue","data":{"path":"/b/","title":"B"}}"#,
        );
        let err = file_loader(RoutePath::new("/a/"), file)
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::PathMismatch { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_file_loader_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = file_loader(RoutePath::new("/a/"), dir.path().join("nope.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(..)));
    }

    #[test]
    fn test_read_page_invalid_json() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "bad.json", "{ not json");
        assert!(matches!(read_page(&file), Err(LoadError::Parse(..))));
    }

    #[tokio::test]
    async fn test_file_loader_sees_edits() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "a.json",
            r#"{"content":"a.vue","data":{"path":"/a/","title":"Old"}}"#,
        );
        let loader = file_loader(RoutePath::new("/a/"), file.clone());
        assert_eq!(loader.load().await.unwrap().title(), "Old");

        fs::write(
            &file,
            r#"{"content":"a.vue","data":{"path":"/a/","title":"New"}}"#,
        )
        .unwrap();
        assert_eq!(loader.load().await.unwrap().title(), "New");
    }
}
