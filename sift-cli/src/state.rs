use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn sift_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".sift"))
}

pub fn ensure_sift_home() -> Result<PathBuf> {
    let dir = sift_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Expand a leading `~/` against HOME; other paths are returned as given.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => Path::new(&home).join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("files_to_categorize"), PathBuf::from("files_to_categorize"));
        assert_eq!(expand_home("/tmp/in"), PathBuf::from("/tmp/in"));
    }

    #[test]
    fn test_expand_home_prefix() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        assert_eq!(expand_home("~/statements"), Path::new(&home).join("statements"));
    }
}
