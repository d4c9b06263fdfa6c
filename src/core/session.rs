//! Per-session context holding the three uploaded datasets.

use super::aggregate::ALL;
use super::config::InputsConfig;
use super::dataset::Dataset;
use super::error::DashboardError;
use super::ingest;
use super::schema::SchemaConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sales,
    Financial,
    Evaluation,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Sales, Category::Financial, Category::Evaluation];
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Sales => "Sales KPI",
                Category::Financial => "Financial KPI",
                Category::Evaluation => "Evaluation Form",
            }
        )
    }
}

/// The datasets currently loaded. Uploading a category replaces whatever
/// was there before; nothing is merged.
#[derive(Debug, Clone, Default)]
pub struct Session {
    sales: Option<Dataset>,
    financial: Option<Dataset>,
    evaluation: Option<Dataset>,
}

/// All three datasets, borrowed from a session once every upload is present.
#[derive(Debug, Clone, Copy)]
pub struct LoadedData<'a> {
    pub sales: &'a Dataset,
    pub financial: &'a Dataset,
    pub evaluation: &'a Dataset,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every input that has a path configured. Inputs without a path
    /// stay missing; a configured file that cannot be read is an error.
    pub fn load_inputs(inputs: &InputsConfig, on_loaded: &dyn Fn(Category)) -> Result<Self> {
        let mut session = Session::new();
        for category in Category::ALL {
            let Some(path) = inputs.get(category).resolved_path() else {
                debug!("No path configured for {category}");
                continue;
            };
            let dataset = ingest::load_dataset(&path, &inputs.sheet(category))?;
            info!("Loaded {category} from {}", path.display());
            session.upload(category, dataset);
            on_loaded(category);
        }
        Ok(session)
    }

    pub fn upload(&mut self, category: Category, dataset: Dataset) {
        debug!("Replacing {category} dataset with {} rows", dataset.len());
        *self.slot_mut(category) = Some(dataset);
    }

    pub fn get(&self, category: Category) -> Option<&Dataset> {
        match category {
            Category::Sales => self.sales.as_ref(),
            Category::Financial => self.financial.as_ref(),
            Category::Evaluation => self.evaluation.as_ref(),
        }
    }

    pub fn missing(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }

    /// Borrows all three datasets, or names the ones still missing.
    pub fn loaded(&self) -> Result<LoadedData<'_>, DashboardError> {
        match (&self.sales, &self.financial, &self.evaluation) {
            (Some(sales), Some(financial), Some(evaluation)) => Ok(LoadedData {
                sales,
                financial,
                evaluation,
            }),
            _ => Err(DashboardError::MissingInputs(self.missing())),
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<Dataset> {
        match category {
            Category::Sales => &mut self.sales,
            Category::Financial => &mut self.financial,
            Category::Evaluation => &mut self.evaluation,
        }
    }
}

/// Selectable values for each filter, each list starting with `"All"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub months: Vec<String>,
    pub trainers: Vec<String>,
}

impl FilterOptions {
    pub fn from_data(data: &LoadedData<'_>, schema: &SchemaConfig) -> Self {
        FilterOptions {
            years: distinct_with_all(data.sales, &schema.sales.year),
            months: distinct_with_all(data.sales, &schema.sales.month),
            trainers: distinct_with_all(data.evaluation, &schema.evaluation.trainer),
        }
    }
}

fn distinct_with_all(dataset: &Dataset, column: &str) -> Vec<String> {
    let values: BTreeSet<String> = dataset
        .column(column)
        .map(|values| values.filter_map(|v| v.as_label()).collect())
        .unwrap_or_default();
    std::iter::once(ALL.to_string()).chain(values).collect()
}
