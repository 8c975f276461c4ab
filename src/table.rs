use std::sync::Arc;

use object_store::{ObjectStore, path::Path};

use crate::{
    error::Result, pattern::PathPattern, request::ScanRequest, store::StoreConfig,
};

/// A partitioned table: a root inside an object store and the pattern of its paths.
#[derive(Clone, Debug)]
pub struct Table {
    store: Arc<dyn ObjectStore>,
    root: Path,
    pattern: PathPattern,
}

impl Table {
    /// Table rooted at `root` with an [`auto`](PathPattern::auto) pattern.
    pub fn new(store: Arc<dyn ObjectStore>, root: impl Into<Path>) -> Self {
        Self {
            store,
            root: root.into(),
            pattern: PathPattern::auto(),
        }
    }

    /// Resolve `location` (URL or local path) through `config`.
    pub fn open(location: &str, config: &StoreConfig) -> Result<Self> {
        let (store, root) = config.resolve(location)?;
        Ok(Self::new(store, root))
    }

    pub fn with_pattern(self, pattern: PathPattern) -> Self {
        Self { pattern, ..self }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Start a scan of this table.
    pub fn scan(&self) -> ScanRequest<'_> {
        ScanRequest::new(self)
    }
}
