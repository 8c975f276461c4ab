use object_store::{ObjectMeta, ObjectStore, path::Path};
use tracing::debug;

use crate::{error::Result, pattern::HIVE_NULL};

/// Children of one directory, each group sorted by name.
#[derive(Debug, Default)]
pub(crate) struct DirectoryListing {
    pub(crate) directories: Vec<Path>,
    pub(crate) files: Vec<ObjectMeta>,
}

/// One delimiter listing; a missing directory lists as empty.
pub(crate) async fn list_directory(
    store: &dyn ObjectStore,
    location: &Path,
) -> Result<DirectoryListing> {
    let prefix = (!location.as_ref().is_empty()).then_some(location);
    let listing = match store.list_with_delimiter(prefix).await {
        Ok(listing) => listing,
        Err(object_store::Error::NotFound { .. }) => return Ok(DirectoryListing::default()),
        Err(err) => return Err(err.into()),
    };
    let mut directories = listing.common_prefixes;
    directories.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
    let mut files = listing.objects;
    files.sort_by(|a, b| a.location.as_ref().cmp(b.location.as_ref()));
    debug!(
        location = %location,
        directories = directories.len(),
        files = files.len(),
        "listed directory"
    );
    Ok(DirectoryListing { directories, files })
}

/// `HEAD` a generated file name; `None` when it does not exist.
pub(crate) async fn head_file(store: &dyn ObjectStore, location: &Path) -> Result<Option<ObjectMeta>> {
    match store.head(location).await {
        Ok(meta) => Ok(Some(meta)),
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn is_hidden(name: &str) -> bool {
    (name.starts_with('.') || name.starts_with('_')) && name != HIVE_NULL
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use object_store::{PutPayload, memory::InMemory};

    use super::*;

    #[tokio::test]
    async fn listing_is_sorted_and_split() {
        let store = InMemory::new();
        for path in ["t/b/f.csv", "t/a/f.csv", "t/z.csv", "t/c.csv"] {
            store
                .put(&Path::from(path), PutPayload::from(Bytes::from_static(b"x")))
                .await
                .unwrap();
        }
        let listing = list_directory(&store, &Path::from("t")).await.unwrap();
        let dirs: Vec<_> = listing.directories.iter().map(|p| p.as_ref()).collect();
        let files: Vec<_> = listing.files.iter().map(|m| m.location.as_ref()).collect();
        assert_eq!(dirs, vec!["t/a", "t/b"]);
        assert_eq!(files, vec!["t/c.csv", "t/z.csv"]);

        let missing = list_directory(&store, &Path::from("nope")).await.unwrap();
        assert!(missing.directories.is_empty() && missing.files.is_empty());
    }

    #[tokio::test]
    async fn head_reports_missing_files() {
        let store = InMemory::new();
        let path = Path::from("t/f.csv");
        store
            .put(&path, PutPayload::from(Bytes::from_static(b"k\n1\n")))
            .await
            .unwrap();
        assert_eq!(head_file(&store, &path).await.unwrap().unwrap().size, 4);
        assert!(head_file(&store, &Path::from("t/g.csv")).await.unwrap().is_none());
    }

    #[test]
    fn hidden_names() {
        assert!(is_hidden("_SUCCESS"));
        assert!(is_hidden(".part.crc"));
        assert!(!is_hidden(HIVE_NULL));
        assert!(!is_hidden("c=1"));
    }
}
