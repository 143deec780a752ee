use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GaragebookConfig {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub port: Option<u16>,
}

impl GaragebookConfig {
    /// Config written by `config init`
    pub fn starter() -> Self {
        Self {
            database: Some(default_database_path_in(Path::new(".")).display().to_string()),
            schema: None,
            port: Some(DEFAULT_PORT),
        }
    }
}

/// Settings after merging CLI flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub database: PathBuf,
    pub schema: Option<PathBuf>,
    pub port: u16,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("garagebook.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".garagebook").join("garagebook.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<GaragebookConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: GaragebookConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &GaragebookConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Flags win over the config file, the config file over defaults.
pub fn resolve(
    config: Option<&GaragebookConfig>,
    database: Option<PathBuf>,
    schema: Option<PathBuf>,
    port: Option<u16>,
) -> ResolvedSettings {
    ResolvedSettings {
        database: database
            .or_else(|| config.and_then(|c| c.database.as_deref()).map(PathBuf::from))
            .unwrap_or_else(|| default_database_path_in(Path::new("."))),
        schema: schema.or_else(|| config.and_then(|c| c.schema.as_deref()).map(PathBuf::from)),
        port: port
            .or_else(|| config.and_then(|c| c.port))
            .unwrap_or(DEFAULT_PORT),
    }
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".garagebook/";

    let mut content = String::new();
    if gitignore_path.exists() {
        content = std::fs::read_to_string(&gitignore_path)?;
        if content.lines().any(|line| line.trim() == entry) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_write_then_load_and_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garagebook.toml");
        let config = GaragebookConfig {
            database: Some("data/shop.db".into()),
            schema: Some("schema.sql".into()),
            port: Some(9000),
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &GaragebookConfig::default(), true).unwrap();
    }

    #[test]
    fn test_resolve_precedence() {
        let config = GaragebookConfig {
            database: Some("from-config.db".into()),
            schema: None,
            port: Some(9000),
        };

        let settings = resolve(Some(&config), None, None, None);
        assert_eq!(settings.database, PathBuf::from("from-config.db"));
        assert_eq!(settings.port, 9000);

        let settings = resolve(Some(&config), Some("flag.db".into()), None, Some(1234));
        assert_eq!(settings.database, PathBuf::from("flag.db"));
        assert_eq!(settings.port, 1234);

        let settings = resolve(None, None, None, None);
        assert_eq!(settings.database, default_database_path_in(Path::new(".")));
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(settings.schema.is_none());
    }

    #[test]
    fn test_gitignore_entry_added_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target").unwrap();

        ensure_gitignore(dir.path()).unwrap();
        ensure_gitignore(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target\n.garagebook/\n");
    }
}
