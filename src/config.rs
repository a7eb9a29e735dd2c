//! Analysis Configuration
//!
//! YAML or JSON documents describing how raw measurements are projected,
//! how efficiencies are derived, and how results are reported. A base
//! document can be overlaid with a local customization file.

use anyhow::{Context, Result};
use p3_core::metrics::{FomOrdering, DEFAULT_FOM_COLUMN};
use p3_core::Projection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::report::OutputFormat;

/// Environment variable naming a config file to load when none is given.
pub const CONFIG_ENV: &str = "P3_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column projection applied right after loading.
    pub projection: Option<Projection>,
    pub efficiency: EfficiencyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    pub fom_column: String,
    pub ordering: FomOrdering,
    /// Compute `app eff` from the fom column before the portability metric.
    pub derive_app_eff: bool,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            fom_column: DEFAULT_FOM_COLUMN.to_string(),
            ordering: FomOrdering::default(),
            derive_app_eff: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Decimal places for text and markdown output.
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: 4,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses a config document into a generic JSON value. `.yaml`/`.yml`
    /// files are read as YAML, everything else as JSON.
    pub fn load_document(path: &Path) -> Result<serde_json::Value> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let doc = if is_yaml {
            serde_yaml::from_str(&text)
                .with_context(|| format!("invalid YAML in {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", path.display()))?
        };
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<AnalysisConfig> {
        Self::from_document(Self::load_document(path)?)
    }

    /// Overlays `custom` on top of `base`. A missing customization file is
    /// not an error; the base is used as-is.
    pub fn load_with_customization(base: &Path, custom: &Path) -> Result<serde_json::Value> {
        let mut doc = Self::load_document(base)?;
        if custom.exists() {
            let overlay = Self::load_document(custom)?;
            merge(&mut doc, overlay);
        } else {
            debug!(path = %custom.display(), "No config customization found");
        }
        Ok(doc)
    }

    pub fn from_document(doc: serde_json::Value) -> Result<AnalysisConfig> {
        serde_json::from_value(doc).context("config does not match the expected schema")
    }

    /// Config named by `P3_CONFIG` (after loading `.env`), or the defaults.
    pub fn from_env() -> Result<AnalysisConfig> {
        dotenv::dotenv().ok();
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                debug!(path = %path.display(), "Loading config from {}", CONFIG_ENV);
                Self::load(&path)
            }
            None => Ok(AnalysisConfig::default()),
        }
    }
}

/// Recursive merge: objects merge key by key, any other value replaces.
fn merge(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
