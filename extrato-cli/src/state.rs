use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn extrato_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".extrato"))
}

pub fn ensure_extrato_home() -> Result<PathBuf> {
    let dir = extrato_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Database used when the config does not name one
pub fn default_database_path() -> Result<PathBuf> {
    Ok(ensure_extrato_home()?.join("movements.db"))
}
