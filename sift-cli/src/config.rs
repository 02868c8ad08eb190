use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sift_core::BucketMode;
use sift_finance::ClassifierOptions;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_sift_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsSection,
    pub reports: ReportsSection,
    pub classifier: ClassifierOptions,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Directory holding the statement exports
    pub input_dir: String,
    /// CSV with `Keyword` and `Category` columns
    pub keyword_file: String,
    pub output_dir: String,
}

/// Which reports `sift run` writes when no flag says otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsSection {
    /// Detailed `{run_date}_finance.csv` with every categorized row
    pub detailed: bool,
    /// Whole-set summary
    pub entire: bool,
    pub monthly: bool,
    pub weekly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input_dir: "files_to_categorize".to_string(),
            keyword_file: "categorization_keywords.csv".to_string(),
            output_dir: "files_categorized".to_string(),
        }
    }
}

impl Default for ReportsSection {
    fn default() -> Self {
        Self {
            detailed: true,
            entire: true,
            monthly: true,
            weekly: false,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ReportsSection {
    /// Enabled modes in write order
    pub fn modes(&self) -> Vec<BucketMode> {
        [
            (self.entire, BucketMode::Entire),
            (self.monthly, BucketMode::Month),
            (self.weekly, BucketMode::Week),
        ]
        .into_iter()
        .filter_map(|(on, mode)| on.then_some(mode))
        .collect()
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_sift_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Missing file means defaults.
pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.reports.modes(), vec![BucketMode::Entire, BucketMode::Month]);
        assert!(!cfg.classifier.pot_transfer_fallback);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.paths.input_dir = "~/statements".to_string();
        cfg.reports.weekly = true;
        cfg.classifier.pot_transfer_fallback = true;
        save_config_to(&cfg, &p).unwrap();

        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[reports]\nweekly = true\n\n[logging]\nlevel = \"debug\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert!(cfg.reports.detailed);
        assert!(cfg.reports.entire);
        assert!(cfg.reports.weekly);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.paths, PathsSection::default());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[reports\n").unwrap();
        let err = load_config_from(&p).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
