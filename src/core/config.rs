use crate::core::ingest::SheetSelector;
use crate::core::schema::SchemaConfig;
use crate::core::session::Category;
use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct InputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub sheet: Option<SheetSelector>,
}

impl InputConfig {
    /// The configured path with a leading `~/` expanded to the home directory.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        let path = self.path.as_ref()?;
        match (path.strip_prefix("~").ok(), BaseDirs::new()) {
            (Some(rest), Some(dirs)) => Some(dirs.home_dir().join(rest)),
            _ => Some(path.clone()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct InputsConfig {
    pub sales: InputConfig,
    pub financial: InputConfig,
    pub evaluation: InputConfig,
}

impl InputsConfig {
    pub fn get(&self, category: Category) -> &InputConfig {
        match category {
            Category::Sales => &self.sales,
            Category::Financial => &self.financial,
            Category::Evaluation => &self.evaluation,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut InputConfig {
        match category {
            Category::Sales => &mut self.sales,
            Category::Financial => &mut self.financial,
            Category::Evaluation => &mut self.evaluation,
        }
    }

    /// Configured sheet, or the sheet each export is known to use.
    pub fn sheet(&self, category: Category) -> SheetSelector {
        self.get(category)
            .sheet
            .clone()
            .unwrap_or_else(|| match category {
                Category::Sales => SheetSelector::Name("Sheet2".to_string()),
                Category::Financial => SheetSelector::Name("Sheet1".to_string()),
                Category::Evaluation => SheetSelector::Index(0),
            })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ThresholdsConfig {
    /// Expectation ratings at or below this count as "Low".
    #[serde(default = "default_low_expectation_max")]
    pub low_expectation_max: f64,
}

fn default_low_expectation_max() -> f64 {
    3.0
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        ThresholdsConfig {
            low_expectation_max: default_low_expectation_max(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Loads `path` when given. Otherwise the default config file is used if
    /// it exists, and built-in defaults if it does not.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }
        let default_path = Self::default_config_path()?;
        if default_path.exists() {
            Self::load()
        } else {
            debug!(
                "No config at {}, using built-in defaults",
                default_path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "kpidash", "kpidash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
