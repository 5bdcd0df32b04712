//! Directory import
//!
//! Walks the scan root depth-first and writes every property of every
//! accepted file under `<prefix>/<relative dir>/<key>`.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigSeedError, Result};
use crate::seed::formats::FormatResolver;
use crate::store::StoreClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files: usize,
    pub keys: usize,
}

/// Directory of `file` relative to `root`, `/`-separated with a trailing
/// `/`, or `""` for files directly inside `root`.
pub fn relative_dir(root: &Path, file: &Path) -> String {
    let parent = file.parent().unwrap_or(Path::new(""));
    let relative = parent.strip_prefix(root).unwrap_or(Path::new(""));

    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        String::new()
    } else {
        format!("{}/", segments.join("/"))
    }
}

/// Store key for `key` read from a file whose relative directory is `dir`.
pub fn store_key(prefix: &str, dir: &str, key: &str) -> String {
    format!("{}/{}{}", prefix, dir, key)
}

fn walk_error(path: &Path, error: std::io::Error) -> ConfigSeedError {
    ConfigSeedError::Io(std::io::Error::new(
        error.kind(),
        format!("{}: {}", path.display(), error),
    ))
}

/// Import every accepted file below `root` into `store`.
///
/// Entries are visited in lexical order. The first read, parse or write
/// error stops the whole walk; keys written before it stay in the store.
pub async fn import_directory<C>(
    store: &C,
    root: &Path,
    prefix: &str,
    resolver: &FormatResolver,
) -> Result<ImportReport>
where
    C: StoreClient + ?Sized,
{
    let mut report = ImportReport::default();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(path) = pending.pop() {
        // symlinks are not followed into, matching a plain lstat walk
        let metadata = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|e| walk_error(&path, e))?;

        if metadata.is_dir() {
            let mut children = Vec::new();
            let mut entries = tokio::fs::read_dir(&path)
                .await
                .map_err(|e| walk_error(&path, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| walk_error(&path, e))?
            {
                children.push(entry.path());
            }
            children.sort();
            pending.extend(children.into_iter().rev());
            continue;
        }

        if !resolver.is_acceptable(&path) {
            debug!("skipping {}", path.display());
            continue;
        }

        let dir = relative_dir(root, &path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("found config file: {} in context '{}'", file_name, dir);

        let props = resolver.read_file(&path).await?;

        for (key, value) in &props {
            let full_key = store_key(prefix, &dir, key);
            debug!("put {}", full_key);
            store.put(&full_key, value.as_bytes()).await?;
            report.keys += 1;
        }
        report.files += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MockStoreClient;
    use tempfile::TempDir;

    fn resolver() -> FormatResolver {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        FormatResolver::new(
            s(&[".yaml", ".yml", ".properties", ".toml"]),
            s(&[".yaml", ".yml"]),
            s(&[".toml"]),
        )
    }

    #[test]
    fn test_relative_dir() {
        let root = Path::new("res/properties");
        assert_eq!(relative_dir(root, Path::new("res/properties/app.yaml")), "");
        assert_eq!(
            relative_dir(root, Path::new("res/properties/sub/app.properties")),
            "sub/"
        );
        assert_eq!(
            relative_dir(root, Path::new("res/properties/a/b/app.toml")),
            "a/b/"
        );
        assert_eq!(relative_dir(Path::new("./"), Path::new("./app.yaml")), "");
    }

    #[test]
    fn test_store_key_concatenation() {
        assert_eq!(store_key("config", "sub/", "foo"), "config/sub/foo");
        assert_eq!(store_key("config", "", "foo"), "config/foo");
    }

    #[tokio::test]
    async fn test_import_writes_namespaced_keys() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("sub")).unwrap();
        std::fs::write(temp_dir.path().join("sub/app.properties"), "foo=bar").unwrap();

        let mut store = MockStoreClient::new();
        store
            .expect_put()
            .withf(|key, value| key == "config/sub/foo" && value == b"bar")
            .times(1)
            .returning(|_, _| Ok(()));

        let report = import_directory(&store, temp_dir.path(), "config", &resolver())
            .await
            .unwrap();
        assert_eq!(report, ImportReport { files: 1, keys: 1 });
    }

    #[tokio::test]
    async fn test_ignored_extensions_are_never_written() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("test.json"), "{\"key\":\"value\"}").unwrap();
        std::fs::write(temp_dir.path().join("README"), "key=value").unwrap();

        let mut store = MockStoreClient::new();
        store.expect_put().never();

        let report = import_directory(&store, temp_dir.path(), "config", &resolver())
            .await
            .unwrap();
        assert_eq!(report, ImportReport::default());
    }

    #[tokio::test]
    async fn test_write_error_aborts_walk() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.properties"), "a=1").unwrap();
        std::fs::write(temp_dir.path().join("b.properties"), "b=2").unwrap();

        let mut store = MockStoreClient::new();
        store
            .expect_put()
            .times(1)
            .returning(|key, _| Err(ConfigSeedError::write(key, "HTTP 500")));

        let err = import_directory(&store, temp_dir.path(), "config", &resolver())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = MockStoreClient::new();

        let err = import_directory(
            &store,
            &temp_dir.path().join("does-not-exist"),
            "config",
            &resolver(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
