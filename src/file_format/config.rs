use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, ErrorLayer, Result};

/// Categorical palette used when neither the config nor the caller provides
/// one.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Per-category folding directive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoldConfig {
    /// Minimum fold group size that gets collapsed into a single node.
    pub threshold: Option<i64>,
    /// Symbol to use for the synthetic folded node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl FoldConfig {
    /// The threshold if it actually asks for folding.  Missing thresholds and
    /// thresholds of 1 or less mean "don't fold".
    pub fn effective_threshold(&self) -> Option<usize> {
        match self.threshold {
            Some(threshold) if threshold > 1 => Some(threshold as usize),
            _ => None,
        }
    }
}

/// The `properties.categories[name]` entry from a panel definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Either a literal CSS color or one of the theme names "alert", "info",
    /// or "ok".
    pub color: Option<String>,
    /// Symbol for nodes in this category.
    pub icon: Option<String>,
    /// Link template; `{{.column}}` placeholders are filled from the node row.
    pub href: Option<String>,
    pub fold: Option<FoldConfig>,
}

pub type CategoryConfigMap = BTreeMap<String, CategoryConfig>;

/// Theme colors that the named color overrides resolve to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeColors {
    pub alert: String,
    pub info: String,
    pub ok: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        ThemeColors {
            alert: "#c0504e".to_string(),
            info: "#2e75b6".to_string(),
            ok: "#4e8c3f".to_string(),
        }
    }
}

impl ThemeColors {
    /// Resolve a configured category color through the override table.
    pub fn resolve_color_override(&self, color: &str) -> String {
        match color {
            "alert" => self.alert.clone(),
            "info" => self.info.clone(),
            "ok" => self.ok.clone(),
            _ => color.to_string(),
        }
    }
}

/// Everything the extractor needs to pick category colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorPalette {
    pub colors: Vec<String>,
    pub theme: ThemeColors,
}

impl Default for ColorPalette {
    fn default() -> Self {
        ColorPalette {
            colors: default_palette(),
            theme: ThemeColors::default(),
        }
    }
}

/// How the chart dataset transformer should treat the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataTransform {
    /// Crosstab if the data looks like (category, series, value) triples.
    Auto,
    None,
    Crosstab,
}

impl Default for DataTransform {
    fn default() -> Self {
        DataTransform::Auto
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartProperties {
    #[serde(default)]
    pub transform: Option<DataTransform>,
}

/// Schema for the dashboard config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default)]
    pub theme: ThemeColors,
    #[serde(default)]
    pub categories: CategoryConfigMap,
    #[serde(default)]
    pub chart: ChartProperties,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            palette: default_palette(),
            theme: ThemeColors::default(),
            categories: BTreeMap::new(),
            chart: ChartProperties::default(),
        }
    }
}

impl DashboardConfig {
    pub fn color_palette(&self) -> ColorPalette {
        ColorPalette {
            colors: self.palette.clone(),
            theme: self.theme.clone(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|err| DashboardError::new(ErrorLayer::ConfigLayer, err.to_string()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Load a config file, treating `.toml` files as TOML and everything else as
/// JSON.
pub fn load(config_path: &str) -> Result<DashboardConfig> {
    let contents = fs::read_to_string(config_path)?;
    if config_path.ends_with(".toml") {
        DashboardConfig::from_toml_str(&contents)
    } else {
        DashboardConfig::from_json_str(&contents)
    }
}
