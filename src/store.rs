//! Resolution of table locations into object stores.

use std::{collections::BTreeMap, fs, path::Path as FsPath, sync::Arc};

use object_store::{ObjectStore, path::Path};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{FsqlError, Result};

/// Environment variables read by [`StoreConfig::from_env`], with the option key
/// each one sets for the `s3` scheme.
const AWS_ENV: [(&str, &str); 5] = [
    ("AWS_ACCESS_KEY_ID", "aws_access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "aws_secret_access_key"),
    ("AWS_SESSION_TOKEN", "aws_session_token"),
    ("AWS_ENDPOINT_URL", "aws_endpoint"),
    ("AWS_REGION", "aws_region"),
];

/// Per-scheme options handed to the object store builders.
///
/// ```toml
/// [s3]
/// aws_endpoint = "http://localhost:9000"
/// aws_allow_http = "true"
/// aws_region = "us-east-1"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StoreConfig {
    schemes: BTreeMap<String, BTreeMap<String, String>>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taken from the standard AWS environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub(crate) fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut config = Self::default();
        for (name, value) in vars {
            let Some((_, key)) = AWS_ENV.iter().find(|(env, _)| *env == name) else {
                continue;
            };
            if *key == "aws_endpoint" && value.starts_with("http://") {
                config.set("s3", "aws_allow_http", "true");
            }
            config.set("s3", *key, value);
        }
        config
    }

    pub fn from_toml_file(path: impl AsRef<FsPath>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Environment, overlaid by the file when one is given.
    pub fn load(file: Option<&FsPath>) -> Result<Self> {
        let env = Self::from_env();
        match file {
            Some(path) => Ok(env.overlay(Self::from_toml_file(path)?)),
            None => Ok(env),
        }
    }

    /// Set one option; explicit options win over everything loaded before.
    pub fn with_option(
        mut self,
        scheme: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(scheme, key, value);
        self
    }

    /// Merge `other` on top of `self`.
    pub fn overlay(mut self, other: StoreConfig) -> Self {
        for (scheme, options) in other.schemes {
            self.schemes.entry(scheme).or_default().extend(options);
        }
        self
    }

    pub fn options(&self, scheme: &str) -> Option<&BTreeMap<String, String>> {
        self.schemes.get(scheme)
    }

    fn set(&mut self, scheme: &str, key: impl Into<String>, value: impl Into<String>) {
        self.schemes
            .entry(scheme.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Open the store behind `location` and return the table root inside it.
    ///
    /// `location` is a URL (`s3://bucket/prefix`, `file:///data`, `memory:///`) or
    /// a local path. The root is always treated as a directory.
    pub fn resolve(&self, location: &str) -> Result<(Arc<dyn ObjectStore>, Path)> {
        let url = table_url(location)?;
        let options = self
            .options(url.scheme())
            .map(|options| options.clone().into_iter().collect::<Vec<_>>())
            .unwrap_or_default();
        debug!(url = %url, options = options.len(), "resolving object store");
        let (store, root) = object_store::parse_url_opts(&url, options)?;
        Ok((Arc::from(store), root))
    }
}

/// Parse a table location into a URL whose path ends with `/`.
pub(crate) fn table_url(location: &str) -> Result<Url> {
    let mut url = if location.contains("://") {
        Url::parse(location)?
    } else {
        let absolute = std::path::absolute(location)?;
        Url::from_directory_path(&absolute).map_err(|()| FsqlError::InvalidLocation {
            url: location.to_string(),
            reason: "not a usable local path".to_string(),
        })?
    };
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn environment_fills_s3_options() {
        let config = StoreConfig::from_vars(vars(&[
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
            ("HOME", "/root"),
        ]));
        let s3 = config.options("s3").unwrap();
        assert_eq!(s3["aws_access_key_id"], "minio");
        assert_eq!(s3["aws_endpoint"], "http://localhost:9000");
        assert_eq!(s3["aws_allow_http"], "true");
        assert_eq!(s3.len(), 3);
    }

    #[test]
    fn file_overrides_env_and_explicit_overrides_file() {
        let env = StoreConfig::from_vars(vars(&[
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ACCESS_KEY_ID", "env"),
        ]));
        let file = StoreConfig::from_toml_str(
            r#"
            [s3]
            aws_region = "us-east-1"
            "#,
        )
        .unwrap();
        let config = env
            .overlay(file)
            .with_option("s3", "aws_access_key_id", "explicit");
        let s3 = config.options("s3").unwrap();
        assert_eq!(s3["aws_region"], "us-east-1");
        assert_eq!(s3["aws_access_key_id"], "explicit");
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = StoreConfig::from_toml_str("[s3\n").unwrap_err();
        assert!(matches!(err, FsqlError::Config(_)));
    }

    #[test]
    fn locations_become_directory_urls() {
        assert_eq!(
            table_url("s3://bucket/table").unwrap().as_str(),
            "s3://bucket/table/"
        );
        assert_eq!(
            table_url("file:///data/t/").unwrap().as_str(),
            "file:///data/t/"
        );
        let local = table_url("/tmp/table").unwrap();
        assert_eq!(local.scheme(), "file");
        assert!(local.path().ends_with("/tmp/table/"));
    }

    #[test]
    fn resolves_local_paths() {
        let dir = tempfile::tempdir().unwrap();
        let (_, root) = StoreConfig::new()
            .resolve(dir.path().to_str().unwrap())
            .unwrap();
        let expected = dir.path().to_str().unwrap().trim_start_matches('/');
        assert_eq!(root.as_ref(), expected);
    }
}
