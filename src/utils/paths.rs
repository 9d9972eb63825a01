use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable that relocates the application directory
pub const HOME_OVERRIDE_VAR: &str = "PDFCHAT_HOME";

/// Get the main application directory (~/.pdfchat, or $PDFCHAT_HOME)
pub fn get_app_dir() -> Result<PathBuf> {
    let path = match std::env::var_os(HOME_OVERRIDE_VAR) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .context("Failed to determine home directory")?;
            PathBuf::from(home).join(".pdfchat")
        }
    };

    std::fs::create_dir_all(&path).context("Failed to create application directory")?;

    Ok(path)
}

/// Get the config file path (~/.pdfchat/config.json)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_app_dir()?.join("config.json"))
}

/// Get the plaintext credentials file path (~/.pdfchat/credentials.json)
pub fn get_credentials_path() -> Result<PathBuf> {
    Ok(get_app_dir()?.join("credentials.json"))
}
