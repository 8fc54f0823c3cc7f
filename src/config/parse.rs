//! Task file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, KnitError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default task file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["knit.yml", "knit.yaml"];

/// Find the task file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the task file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a task file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, KnitError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    parse_config(&contents)
}

/// Parse a task file from a string
pub fn parse_config(yaml: &str) -> Result<Config, KnitError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

/// Load the task file's `dotenv` file into the process environment
///
/// Variables already set in the environment are left alone.
pub fn load_dotenv(config: &Config, config_path: &Path) -> ConfigResult<()> {
    let Some(dotenv) = &config.dotenv else {
        return Ok(());
    };

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let path = base_dir.join(dotenv);

    dotenvy::from_path(&path).map_err(|e| ConfigError::DotEnv {
        path,
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_config() {
        let yaml = r#"
tasks:
  hello:
    description: Say hello
    run: echo "hello"
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.tasks.len(), 1);
        assert!(config.task("hello").is_some());
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("knit.yml");
        fs::write(&config_path, "tasks: {}\n").unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_yaml_extension() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("knit.yaml");
        fs::write(&config_path, "tasks: {}\n").unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("knit.yml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&config_path, "tasks: {}\n").unwrap();

        let found = find_config_file_from(sub_dir).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_config_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_config_file_from(temp_dir.path().to_path_buf());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_parse_config_with_name_and_interpreter() {
        let yaml = r#"
name: my-app
usage: My application
interpreter:
  - bash
  - -c
tasks:
  hello:
    run: echo "hello"
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.name, Some("my-app".to_string()));
        assert_eq!(config.usage, Some("My application".to_string()));
        assert_eq!(
            config.interpreter,
            Some(vec!["bash".to_string(), "-c".to_string()])
        );
    }

    #[test]
    fn test_load_dotenv() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("knit.yml");
        fs::write(temp_dir.path().join(".env"), "KNIT_DOTENV_TEST=loaded\n").unwrap();

        let config = parse_config("dotenv: .env\ntasks: {}\n").unwrap();
        load_dotenv(&config, &config_path).unwrap();

        assert_eq!(env::var("KNIT_DOTENV_TEST").unwrap(), "loaded");
        env::remove_var("KNIT_DOTENV_TEST");
    }

    #[test]
    fn test_missing_dotenv_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("knit.yml");

        let config = parse_config("dotenv: missing.env\n").unwrap();
        let result = load_dotenv(&config, &config_path);
        assert!(matches!(result, Err(ConfigError::DotEnv { .. })));
    }
}
