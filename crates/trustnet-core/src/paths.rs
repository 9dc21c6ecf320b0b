use anyhow::Result;
use std::path::PathBuf;

const TRUSTNET_DIR: &str = ".trustnet";
const DB_FILE: &str = "trustnet.db";

/// Environment variable to override the TrustNet directory.
const TRUSTNET_DIR_ENV: &str = "TRUSTNET_DIR";

/// Resolve the TrustNet data directory.
/// Priority: TRUSTNET_DIR env var > ~/.trustnet/
pub fn resolve_trustnet_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(TRUSTNET_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(TRUSTNET_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the TrustNet directory exists and return its path.
pub fn ensure_trustnet_dir() -> Result<PathBuf> {
    let dir = resolve_trustnet_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the database path: ~/.trustnet/trustnet.db
pub fn database_path() -> Result<PathBuf> {
    Ok(resolve_trustnet_dir()?.join(DB_FILE))
}

/// Database path with its parent directory created, as a UTF-8 string.
pub fn ensure_database_path_string() -> Result<String> {
    ensure_trustnet_dir()?;
    Ok(database_path()?.to_string_lossy().into_owned())
}
