//! Field validation and per-row error accumulation

pub mod errors;
pub mod fields;

pub use errors::ErrorCollector;

use crate::config::ValidationConfig;

/// Statically configured values for gender, category and group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowLists {
    pub gender: Vec<String>,
    pub category: Vec<String>,
    pub group: Vec<String>,
}

impl From<&ValidationConfig> for AllowLists {
    fn from(config: &ValidationConfig) -> Self {
        AllowLists {
            gender: config.gender_values.clone(),
            category: config.category_values.clone(),
            group: config.group_values.clone(),
        }
    }
}

impl Default for AllowLists {
    fn default() -> Self {
        AllowLists::from(&ValidationConfig::default())
    }
}
