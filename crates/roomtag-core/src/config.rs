//! Run configuration
//!
//! Loaded from TOML; every field has a default so an empty file is a valid
//! configuration.
//!
//! ```toml
//! link_name_filter = "ARCH"
//! match_mode = "level_and_phase"
//! view_kinds = ["floor", "ceiling"]
//! worker_threads = 4
//! transaction_label = "Tag Linked Rooms"
//! dry_run = false
//! ```

use crate::error::ConfigError;
use crate::model::ViewKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default host transaction label
pub const DEFAULT_TRANSACTION_LABEL: &str = "Tag Linked Rooms";

/// How rooms are paired with views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Level name and phase name must both match the view
    #[default]
    LevelAndPhase,
    /// Only the level name must match; phases are ignored
    LevelOnly,
}

impl MatchMode {
    /// Check if phase equality is required
    #[inline]
    #[must_use]
    pub fn matches_phase(self) -> bool {
        matches!(self, Self::LevelAndPhase)
    }
}

/// Reconciliation run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Case-insensitive substring a link's display name must contain
    pub link_name_filter: Option<String>,
    /// Room-to-view matching rule
    pub match_mode: MatchMode,
    /// Plan view kinds to tag
    pub view_kinds: Vec<ViewKind>,
    /// Worker threads for candidate planning (`None`: rayon default)
    pub worker_threads: Option<usize>,
    /// Label of the host transaction wrapping all placements
    pub transaction_label: String,
    /// Plan placements without touching the host
    pub dry_run: bool,
}

impl ReconcileConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With link name filter
    #[inline]
    #[must_use]
    pub fn with_link_filter(mut self, filter: impl Into<String>) -> Self {
        self.link_name_filter = Some(filter.into());
        self
    }

    /// With match mode
    #[inline]
    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// With view kinds
    #[inline]
    #[must_use]
    pub fn with_view_kinds(mut self, kinds: impl IntoIterator<Item = ViewKind>) -> Self {
        self.view_kinds = kinds.into_iter().collect();
        self
    }

    /// With worker thread count
    #[inline]
    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// With transaction label
    #[inline]
    #[must_use]
    pub fn with_transaction_label(mut self, label: impl Into<String>) -> Self {
        self.transaction_label = label.into();
        self
    }

    /// With dry run
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown keys
    /// - `ConfigError::Invalid` if the parsed values fail [`Self::validate`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Read` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// `ConfigError::Invalid` if `worker_threads` is zero, no view kind is
    /// selected, or the transaction label is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == Some(0) {
            return Err(ConfigError::Invalid(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.view_kinds.is_empty() {
            return Err(ConfigError::Invalid(
                "view_kinds must select at least one plan view kind".to_string(),
            ));
        }
        if self.transaction_label.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "transaction_label must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            link_name_filter: None,
            match_mode: MatchMode::LevelAndPhase,
            view_kinds: vec![ViewKind::Floor, ViewKind::Ceiling],
            worker_threads: None,
            transaction_label: DEFAULT_TRANSACTION_LABEL.to_string(),
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        let config = ReconcileConfig::from_toml_str("").unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert!(config.match_mode.matches_phase());
        assert_eq!(config.view_kinds, vec![ViewKind::Floor, ViewKind::Ceiling]);
    }

    #[test]
    fn parses_all_fields() {
        let config = ReconcileConfig::from_toml_str(
            r#"
            link_name_filter = "arch"
            match_mode = "level_only"
            view_kinds = ["floor"]
            worker_threads = 2
            transaction_label = "Tag rooms"
            dry_run = true
            "#,
        )
        .unwrap();

        assert_eq!(config.link_name_filter.as_deref(), Some("arch"));
        assert_eq!(config.match_mode, MatchMode::LevelOnly);
        assert!(!config.match_mode.matches_phase());
        assert_eq!(config.view_kinds, vec![ViewKind::Floor]);
        assert_eq!(config.worker_threads, Some(2));
        assert_eq!(config.transaction_label, "Tag rooms");
        assert!(config.dry_run);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ReconcileConfig::from_toml_str("worker_thread = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_workers_and_empty_kinds() {
        let err = ReconcileConfig::from_toml_str("worker_threads = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ReconcileConfig::new().with_view_kinds(Vec::new()).validate().unwrap_err();
        assert!(err.to_string().contains("view_kinds"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "link_name_filter = \"STRUCT\"").unwrap();

        let config = ReconcileConfig::from_path(file.path()).unwrap();
        assert_eq!(config.link_name_filter.as_deref(), Some("STRUCT"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReconcileConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn builders_chain() {
        let config = ReconcileConfig::new()
            .with_link_filter("ARCH")
            .with_match_mode(MatchMode::LevelOnly)
            .with_worker_threads(3)
            .with_transaction_label("Retag")
            .with_dry_run(true);
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_threads, Some(3));
    }
}
