use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{PromptCostError, Result};

/// Options for the `init` command.
pub struct InitOptions {
    pub config_path: Option<PathBuf>,
    pub force: bool,
}

/// Result of a successful `init` operation.
#[derive(Debug)]
pub struct InitResult {
    pub config_path: PathBuf,
    pub overwritten: bool,
}

/// Run the init command: write a config file holding every default.
pub fn run(options: InitOptions) -> Result<InitResult> {
    let config_path = options
        .config_path
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if config_path.is_dir() {
        return Err(PromptCostError::validation(
            "path",
            format!("'{}' is a directory", config_path.display()),
        ));
    }

    let existed = config_path.exists();
    if existed && !options.force {
        return Err(PromptCostError::config(format!(
            "config already exists at '{}' (use --force to overwrite)",
            config_path.display()
        )));
    }

    Config::default().save(&config_path)?;

    Ok(InitResult {
        config_path,
        overwritten: existed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(path: PathBuf, force: bool) -> Result<InitResult> {
        run(InitOptions {
            config_path: Some(path),
            force,
        })
    }

    #[test]
    fn init_creates_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let result = init(path.clone(), false).unwrap();

        assert_eq!(result.config_path, path);
        assert!(!result.overwritten);
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn init_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join(CONFIG_FILE);
        init(path.clone(), false).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn init_errors_on_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        init(path.clone(), false).unwrap();
        let err = init(path, false).unwrap_err();

        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_force_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "output_ratio = 3.0\n").unwrap();

        let result = init(path.clone(), true).unwrap();

        assert!(result.overwritten);
        assert_eq!(Config::load(&path).unwrap().output_ratio, 1.75);
    }

    #[test]
    fn init_rejects_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = init(dir.path().to_path_buf(), true).unwrap_err();
        assert!(err.is_user_error());
    }
}
