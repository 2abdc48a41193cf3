use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    pub trello: Option<TrelloConfig>,
    pub jira: Option<JiraConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrelloConfig {
    pub key: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JiraConfig {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Negotiate a session with Kerberos instead of sending username/password.
    #[serde(default)]
    pub gss_api: bool,
    #[serde(default = "default_strict_ssl")]
    pub strict_ssl: bool,
    /// Labels added to every created issue, before the card's own labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_labels: Vec<String>,
}

fn default_strict_ssl() -> bool {
    true
}

impl AppConfig {
    pub fn trello(&self) -> Result<&TrelloConfig> {
        self.trello.as_ref().context(
            "Configuration for Trello has not been provided, please run `cardsync target <jira-host>` first",
        )
    }

    pub fn jira(&self) -> Result<&JiraConfig> {
        self.jira.as_ref().context(
            "Configuration for Jira has not been provided, please run `cardsync target <jira-host>` first",
        )
    }
}

/// Home directory first, then the working directory.
fn config_paths() -> [PathBuf; 2] {
    let home = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cardsync")
        .join("config.toml");
    [home, PathBuf::from(".cardsync.toml")]
}

pub fn load_config() -> Result<AppConfig> {
    load_first(&config_paths())
}

/// Parses the first readable file in `paths`. An unreadable file, missing or
/// not, falls through to the next one; a readable file that fails to parse is an error.
fn load_first(paths: &[PathBuf]) -> Result<AppConfig> {
    for path in paths {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::trace!(path = %path.display(), "Loading configuration");
                return parse(path, &contents);
            }
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "Unable to read configuration file");
            }
        }
    }
    Ok(AppConfig::default())
}

pub fn load_from(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse(path, &contents)
}

fn parse(path: &Path, contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes to the home directory, falling back to the working directory. Returns the path used.
pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let [home, local] = config_paths();
    match save_to(&home, config) {
        Ok(()) => Ok(home),
        Err(e) => {
            tracing::debug!(path = %home.display(), error = %e, "Unable to store configuration in home directory");
            save_to(&local, config)?;
            Ok(local)
        }
    }
}

pub fn save_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            trello: Some(TrelloConfig {
                key: "k".into(),
                token: "t".into(),
            }),
            jira: Some(JiraConfig {
                host: "issues.example.com".into(),
                username: Some("jdoe".into()),
                password: Some("secret".into()),
                gss_api: false,
                strict_ssl: true,
                extra_labels: vec!["test-case".into()],
            }),
        }
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        save_to(&path, &sample()).unwrap();
        assert_eq!(load_from(&path).unwrap(), sample());
    }

    #[test]
    fn jira_defaults_apply() {
        let config: AppConfig = toml::from_str(
            r#"
            [jira]
            host = "issues.example.com"
            gss_api = true
            "#,
        )
        .unwrap();
        let jira = config.jira().unwrap();
        assert!(jira.strict_ssl);
        assert!(jira.gss_api);
        assert_eq!(jira.username, None);
        assert!(jira.extra_labels.is_empty());
    }

    #[test]
    fn missing_section_points_at_target_command() {
        let err = AppConfig::default().trello().unwrap_err();
        assert!(err.to_string().contains("cardsync target"));
    }

    #[test]
    fn unreadable_home_config_falls_back_to_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists at the home path but cannot be read as a file.
        let home = dir.path().join("home-config.toml");
        std::fs::create_dir(&home).unwrap();
        let local = dir.path().join(".cardsync.toml");
        save_to(&local, &sample()).unwrap();

        assert_eq!(load_first(&[home, local]).unwrap(), sample());
    }

    #[test]
    fn no_readable_config_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = [dir.path().join("a.toml"), dir.path().join("b.toml")];
        assert_eq!(load_first(&paths).unwrap(), AppConfig::default());
    }

    #[test]
    fn unparseable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "trello = 3").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
