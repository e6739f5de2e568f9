use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::scale::{default_bands, GradeBand, GradeScale};

/// Caller-supplied grading policy: the letter scale and the fallback weight
/// for each assignment category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradebookConfig {
    #[serde(default = "default_bands")]
    pub scale: Vec<GradeBand>,
    #[serde(default = "default_weights")]
    pub default_weights: BTreeMap<String, f64>,
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            scale: default_bands(),
            default_weights: default_weights(),
        }
    }
}

fn default_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("homework".to_string(), 20.0),
        ("quiz".to_string(), 20.0),
        ("project".to_string(), 20.0),
        ("exam".to_string(), 40.0),
    ])
}

impl GradebookConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid gradebook config")
    }

    /// Reads `path` when given, otherwise falls back to the built-in policy.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            tracing::debug!("no gradebook config given, using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::info!(path = %path.display(), bands = config.scale.len(), "loaded gradebook config");
        Ok(config)
    }

    pub fn grade_scale(&self) -> anyhow::Result<GradeScale> {
        GradeScale::new(self.scale.clone()).context("grade scale in config is malformed")
    }

    /// Weight for a category, matched case-insensitively.
    pub fn weight_for(&self, category: &str) -> Option<f64> {
        let key = category.trim().to_ascii_lowercase();
        self.default_weights.get(&key).copied()
    }
}
