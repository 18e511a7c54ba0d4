use crate::cli::CliArgs;
use crate::namespaces::DEFAULT_NAMESPACE;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Effective runtime settings after merging flags, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub preferred_namespace: String,
    pub initial_namespace: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
struct KubediagConfigFile {
    #[serde(default, alias = "url", alias = "base_url")]
    api_url: Option<String>,
    #[serde(default, alias = "timeout", alias = "timeout_s")]
    timeout_secs: Option<u64>,
    #[serde(default, alias = "default_namespace")]
    preferred_namespace: Option<String>,
}

impl Settings {
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let path = args.config.clone().or_else(discover_config_path);
        let (file, source) = match path {
            Some(path) => (load_config_file(&path)?, Some(path.display().to_string())),
            None => (KubediagConfigFile::default(), None),
        };
        Ok(Self::merge(args, file, source))
    }

    fn merge(args: &CliArgs, file: KubediagConfigFile, source: Option<String>) -> Self {
        let api_url = non_blank(args.api_url.clone())
            .or_else(|| non_blank(file.api_url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = args
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let preferred_namespace = non_blank(file.preferred_namespace)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            preferred_namespace,
            initial_namespace: non_blank(args.namespace.clone()),
            source,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_config_file(path: &Path) -> Result<KubediagConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn parse_config(raw: &str) -> Result<KubediagConfigFile> {
    if raw.trim().is_empty() {
        return Ok(KubediagConfigFile::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KUBEDIAG_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("kubediag.yaml"),
        PathBuf::from("kubediag.yml"),
        PathBuf::from(".kubediag.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let candidate = PathBuf::from(&home).join(".config/kubediag/config.yaml");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}
