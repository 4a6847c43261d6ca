//! Configuration Management
//!
//! Settings come from layered env files and the process environment, lowest
//! priority first:
//!
//! 1. `.env` (base; never overrides the process environment)
//! 2. the process environment
//! 3. `.env.{ENV}` (`ENV` defaults to `development`)
//! 4. `.env.local`
//!
//! Every file is optional. The result is an immutable [`Settings`].

use crate::gcp::auth::{get_default_project, validate_project_id};
use crate::resource::ProjectContext;
use crate::ui::Console;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Variable selecting the environment-specific file
pub const ENV_SELECTOR: &str = "ENV";

/// Environment used when none is selected
pub const DEFAULT_ENVIRONMENT: &str = "development";

pub const GOOGLE_CLOUD_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
pub const GCS_BUCKET_NAME: &str = "GCS_BUCKET_NAME";
pub const DESTINATION_BUCKET: &str = "DESTINATION_BUCKET";
pub const FIRESTORE_COLLECTION: &str = "FIRESTORE_COLLECTION";
pub const PUBSUB_TOPIC: &str = "PUBSUB_TOPIC";
pub const PUBSUB_SUBSCRIPTION: &str = "PUBSUB_SUBSCRIPTION";
pub const BIGQUERY_DATASET: &str = "BIGQUERY_DATASET";
pub const BIGQUERY_TABLE: &str = "BIGQUERY_TABLE";
pub const BACKEND_URL: &str = "BACKEND_URL";
pub const SECRET_NAME: &str = "SECRET_NAME";

/// Known keys with the labels used when printing
pub const KEYS: &[(&str, &str)] = &[
    (GOOGLE_CLOUD_PROJECT, "project_id"),
    (GCS_BUCKET_NAME, "gcs_bucket"),
    (DESTINATION_BUCKET, "destination_bucket"),
    (FIRESTORE_COLLECTION, "firestore_collection"),
    (PUBSUB_TOPIC, "pubsub_topic"),
    (PUBSUB_SUBSCRIPTION, "pubsub_subscription"),
    (BIGQUERY_DATASET, "bigquery_dataset"),
    (BIGQUERY_TABLE, "bigquery_table"),
    (BACKEND_URL, "backend_url"),
    (SECRET_NAME, "secret_name"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    ConfigurationMissing(&'static str),
    #[error("Invalid project ID '{0}'")]
    InvalidProject(String),
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved configuration
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
    environment: String,
    loaded: Vec<PathBuf>,
}

impl Settings {
    /// Load from `dir` and the process environment
    pub fn load(dir: &Path, environment: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_sources(dir, environment, std::env::vars())
    }

    /// Load from `dir` with an explicit process environment
    pub fn from_sources(
        dir: &Path,
        environment: Option<&str>,
        process_env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let process: BTreeMap<String, String> = process_env
            .into_iter()
            .filter(|(key, _)| key == ENV_SELECTOR || KEYS.iter().any(|(k, _)| k == key))
            .collect();

        let mut settings = Self::default();

        let base = dir.join(".env");
        if let Some(pairs) = read_env_file(&base)? {
            settings.loaded.push(base);
            settings.values.extend(pairs);
        }
        settings.values.extend(process);

        let environment = environment
            .map(str::to_string)
            .or_else(|| settings.values.get(ENV_SELECTOR).cloned())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        for name in [format!(".env.{}", environment), ".env.local".to_string()] {
            let path = dir.join(name);
            if let Some(pairs) = read_env_file(&path)? {
                settings.loaded.push(path);
                settings.values.extend(pairs);
            }
        }

        tracing::debug!(
            environment = %environment,
            files = settings.loaded.len(),
            "Configuration loaded"
        );
        settings.environment = environment;
        Ok(settings)
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Env files that were found and applied, in order
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Project from `GOOGLE_CLOUD_PROJECT`, else the gcloud default project
    pub fn project_id(&self) -> Result<String, ConfigError> {
        match self.get(GOOGLE_CLOUD_PROJECT) {
            Some(project) if validate_project_id(project) => Ok(project.to_string()),
            Some(project) => Err(ConfigError::InvalidProject(project.to_string())),
            None => get_default_project().ok_or(ConfigError::ConfigurationMissing(GOOGLE_CLOUD_PROJECT)),
        }
    }

    pub fn project_context(&self) -> Result<ProjectContext, ConfigError> {
        self.project_id().map(|id| ProjectContext::new(&id))
    }

    /// Value of `key`, or `ConfigurationMissing`
    pub fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.get(key).ok_or(ConfigError::ConfigurationMissing(key))
    }

    /// Print every known key, masking long values
    pub fn print<W: Write>(&self, console: &mut Console<W>) {
        for path in &self.loaded {
            console.line(format!("✓ Loaded {}", path.display()));
        }
        console.notice(format!("🌍 Environment: {}", self.environment));
        console.notice("📋 Current Configuration:");
        console.rule('=', 50);
        for (key, label) in KEYS {
            let shown = self.get(key).map(mask).unwrap_or_else(|| "(not set)".to_string());
            console.line(format!("  {:25} = {}", label, shown));
        }
        console.rule('=', 50);
    }
}

/// `abcde...xyz` for values longer than 10 characters
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 10 {
        return value.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", head, tail)
}

fn read_env_file(path: &Path) -> Result<Option<Vec<(String, String)>>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(parse_env_file(&content))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse `KEY=VALUE` lines. Supports `#` comments, an `export ` prefix and
/// single or double quotes; other lines are skipped.
pub fn parse_env_file(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            tracing::warn!(line = number + 1, "Ignoring env line without '='");
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            tracing::warn!(line = number + 1, "Ignoring env line with invalid key");
            continue;
        }

        pairs.push((key.to_string(), parse_value(value.trim())));
    }

    pairs
}

fn parse_value(raw: &str) -> String {
    if let Some(inner) = quoted(raw, '"') {
        return inner
            .replace("\\n", "\n")
            .replace("\\\"", "\"")
            .replace("\\\\", "\\");
    }
    if let Some(inner) = quoted(raw, '\'') {
        return inner.to_string();
    }
    // Unquoted values end at an inline comment
    match raw.find(" #") {
        Some(index) => raw[..index].trim_end().to_string(),
        None => raw.to_string(),
    }
}

fn quoted(raw: &str, quote: char) -> Option<&str> {
    raw.strip_prefix(quote)?.strip_suffix(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::console::{captured, output};
    use std::fs;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_env_file() {
        let content = r#"
# comment
GOOGLE_CLOUD_PROJECT=demo-proj
export PUBSUB_TOPIC = orders
SECRET_NAME="svc acc"
BACKEND_URL='http://localhost:8081'
GCS_BUCKET_NAME=bucket # trailing comment
not a pair
"#;
        assert_eq!(
            parse_env_file(content),
            env(&[
                ("GOOGLE_CLOUD_PROJECT", "demo-proj"),
                ("PUBSUB_TOPIC", "orders"),
                ("SECRET_NAME", "svc acc"),
                ("BACKEND_URL", "http://localhost:8081"),
                ("GCS_BUCKET_NAME", "bucket"),
            ])
        );
    }

    #[test]
    fn test_layering_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "GOOGLE_CLOUD_PROJECT=base-proj\nPUBSUB_TOPIC=base-topic\nGCS_BUCKET_NAME=base-bucket\n",
        )
        .unwrap();
        fs::write(dir.path().join(".env.development"), "PUBSUB_TOPIC=dev-topic\n").unwrap();
        fs::write(dir.path().join(".env.local"), "GCS_BUCKET_NAME=local-bucket\n").unwrap();

        let settings = Settings::from_sources(
            dir.path(),
            None,
            env(&[("GOOGLE_CLOUD_PROJECT", "env-proj"), ("PUBSUB_TOPIC", "env-topic")]),
        )
        .unwrap();

        assert_eq!(settings.environment(), "development");
        // process env beats .env, later files beat the process env
        assert_eq!(settings.get(GOOGLE_CLOUD_PROJECT), Some("env-proj"));
        assert_eq!(settings.get(PUBSUB_TOPIC), Some("dev-topic"));
        assert_eq!(settings.get(GCS_BUCKET_NAME), Some("local-bucket"));
        assert_eq!(settings.loaded_files().len(), 3);
    }

    #[test]
    fn test_environment_selection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "ENV=staging\n").unwrap();
        fs::write(dir.path().join(".env.staging"), "PUBSUB_TOPIC=staging-topic\n").unwrap();
        fs::write(dir.path().join(".env.production"), "PUBSUB_TOPIC=prod-topic\n").unwrap();

        let from_file = Settings::from_sources(dir.path(), None, Vec::new()).unwrap();
        assert_eq!(from_file.environment(), "staging");
        assert_eq!(from_file.get(PUBSUB_TOPIC), Some("staging-topic"));

        let explicit = Settings::from_sources(dir.path(), Some("production"), Vec::new()).unwrap();
        assert_eq!(explicit.get(PUBSUB_TOPIC), Some("prod-topic"));
    }

    #[test]
    fn test_missing_files_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_sources(dir.path(), None, Vec::new()).unwrap();
        assert!(settings.loaded_files().is_empty());
        assert!(matches!(
            settings.require(DESTINATION_BUCKET),
            Err(ConfigError::ConfigurationMissing("DESTINATION_BUCKET"))
        ));
    }

    #[test]
    fn test_project_context() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_sources(
            dir.path(),
            None,
            env(&[("GOOGLE_CLOUD_PROJECT", "demo-proj")]),
        )
        .unwrap();
        assert_eq!(settings.project_context().unwrap().project_id(), "demo-proj");

        let invalid = Settings::from_sources(
            dir.path(),
            None,
            env(&[("GOOGLE_CLOUD_PROJECT", "Not A Project")]),
        )
        .unwrap();
        assert!(matches!(invalid.project_id(), Err(ConfigError::InvalidProject(_))));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "short");
        assert_eq!(mask("exactly10!"), "exactly10!");
        assert_eq!(mask("my-long-project-id"), "my-lo...-id");
        assert_eq!(mask("ééééééééééé"), "ééééé...ééé");
    }

    #[test]
    fn test_print_masks_values() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_sources(
            dir.path(),
            None,
            env(&[("GOOGLE_CLOUD_PROJECT", "my-long-project-id")]),
        )
        .unwrap();
        let mut console = captured();

        settings.print(&mut console);

        let text = output(console);
        assert!(text.contains("project_id                = my-lo...-id"));
        assert!(text.contains("pubsub_topic              = (not set)"));
        assert!(!text.contains("my-long-project-id"));
    }
}
