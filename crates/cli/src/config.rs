use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::Cli;

pub const DEFAULT_DB_PATH: &str = "ransomware_data.db";
pub const DEFAULT_FIRST_YEAR: i32 = 2020;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_CONFIG_BYTES: u64 = 64 * 1024;

/// Settings file, every key optional. Command-line flags win over it.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<PathBuf>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    pub first_year: Option<i32>,
    pub years: Option<Vec<i32>>,
    pub min_posts: Option<u64>,
    pub top_countries: Option<usize>,
    pub markdown: Option<PathBuf>,
    pub plot: Option<bool>,
    pub log_level: Option<String>,
}

pub fn load_file(path: &Path) -> Result<FileConfig> {
    let size = fs::metadata(path)
        .with_context(|| format!("cannot read config {}", path.display()))?
        .len();
    if size > MAX_CONFIG_BYTES {
        bail!("config {} is larger than {} bytes", path.display(), MAX_CONFIG_BYTES);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub api_base: String,
    pub timeout: Duration,
    /// Empty when the run is offline.
    pub years: Vec<i32>,
    pub min_posts: u64,
    pub top_countries: usize,
    pub markdown: Option<PathBuf>,
    pub plot: bool,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig, current_year: i32) -> Result<Self> {
        let years = if cli.offline {
            Vec::new()
        } else if !cli.years.is_empty() {
            normalise_years(cli.years.clone())
        } else if let Some(years) = file.years.filter(|y| !y.is_empty()) {
            normalise_years(years)
        } else {
            let first = file.first_year.unwrap_or(DEFAULT_FIRST_YEAR);
            if first > current_year {
                bail!("first_year {} is after the current year {}", first, current_year);
            }
            (first..=current_year).collect()
        };

        let top_countries = cli
            .top_countries
            .or(file.top_countries)
            .unwrap_or(ninefive_core::ranking::DEFAULT_TOP_COUNTRIES);
        if top_countries == 0 {
            bail!("top_countries must be at least 1");
        }

        Ok(Self {
            db_path: cli
                .db
                .clone()
                .or(file.db_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            api_base: cli
                .api_base
                .clone()
                .or(file.api_base)
                .unwrap_or_else(|| http_adapter::DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            years,
            min_posts: cli.min_posts.or(file.min_posts).unwrap_or(1),
            top_countries,
            markdown: cli.markdown.clone().or(file.markdown),
            plot: cli.plot || file.plot.unwrap_or(false),
            log_level: file.log_level,
        })
    }
}

fn normalise_years(mut years: Vec<i32>) -> Vec<i32> {
    years.sort_unstable();
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ninefive").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_fetch_every_year() {
        let settings = Settings::resolve(&cli(&[]), FileConfig::default(), 2023).unwrap();
        assert_eq!(settings.years, vec![2020, 2021, 2022, 2023]);
        assert_eq!(settings.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(settings.api_base, "https://api.ransomware.live");
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.min_posts, 1);
        assert_eq!(settings.top_countries, 5);
        assert_eq!(settings.markdown, None);
        assert!(!settings.plot);
    }

    #[test]
    fn test_cli_years_are_sorted_and_deduplicated() {
        let args = cli(&["--year", "2024", "--year", "2022", "--year", "2024"]);
        let settings = Settings::resolve(&args, FileConfig::default(), 2025).unwrap();
        assert_eq!(settings.years, vec![2022, 2024]);
    }

    #[test]
    fn test_offline_has_no_years() {
        let args = cli(&["--offline", "--year", "2024"]);
        let settings = Settings::resolve(&args, FileConfig::default(), 2025).unwrap();
        assert!(settings.years.is_empty());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            db_path: Some(PathBuf::from("file.db")),
            min_posts: Some(10),
            first_year: Some(2024),
            plot: Some(true),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&cli(&["--db", "cli.db"]), file, 2025).unwrap();
        assert_eq!(settings.db_path, PathBuf::from("cli.db"));
        assert_eq!(settings.min_posts, 10);
        assert_eq!(settings.years, vec![2024, 2025]);
        assert!(settings.plot);
    }

    #[test]
    fn test_first_year_in_future_is_rejected() {
        let file = FileConfig {
            first_year: Some(2030),
            ..FileConfig::default()
        };
        assert!(Settings::resolve(&cli(&[]), file, 2025).is_err());
    }

    #[test]
    fn test_zero_top_countries_is_rejected() {
        let args = cli(&["--top-countries", "0"]);
        assert!(Settings::resolve(&args, FileConfig::default(), 2025).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ninefive.toml");
        fs::write(
            &path,
            "db_path = \"data/victims.db\"\nyears = [2024, 2023]\nmarkdown = \"out/report.md\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let file = load_file(&path).unwrap();
        assert_eq!(file.db_path, Some(PathBuf::from("data/victims.db")));
        assert_eq!(file.years, Some(vec![2024, 2023]));
        assert_eq!(file.log_level.as_deref(), Some("debug"));

        let settings = Settings::resolve(&cli(&[]), file, 2025).unwrap();
        assert_eq!(settings.years, vec![2023, 2024]);
        assert_eq!(settings.markdown, Some(PathBuf::from("out/report.md")));
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_file_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ninefive.toml");
        fs::write(&path, "database = \"x.db\"\n").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_load_file_missing() {
        assert!(load_file(Path::new("/definitely/not/here.toml")).is_err());
    }
}
