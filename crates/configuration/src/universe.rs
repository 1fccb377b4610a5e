use crate::error::ConfigError;
use core_types::AssetCategory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One selectable asset: a display label and the provider symbol behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub label: String,
    pub ticker: String,
}

/// A named block of the universe (e.g. "EU SECTORS") and its assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseGroup {
    pub name: String,
    pub category: AssetCategory,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
}

/// The asset universe, in the order it was configured.
///
/// Any group may be absent; in particular a universe without a yield group is
/// perfectly valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Universe {
    groups: Vec<UniverseGroup>,
}

impl Universe {
    pub fn new(groups: Vec<UniverseGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[UniverseGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.assets.is_empty())
    }

    /// Label -> ticker across every group.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        self.groups
            .iter()
            .flat_map(|g| g.assets.iter())
            .map(|a| (a.label.clone(), a.ticker.clone()))
            .collect()
    }

    /// The labels of one group, or an empty list if the group is not configured.
    pub fn labels_in(&self, group: &str) -> Vec<String> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.assets.iter().map(|a| a.label.clone()).collect())
            .unwrap_or_default()
    }

    /// Group name and labels of every priced group, in configured order.
    ///
    /// Yield groups are left out: they are levels, not prices, and never rank.
    pub fn group_labels(&self) -> Vec<(String, Vec<String>)> {
        self.groups
            .iter()
            .filter(|g| !g.category.is_yield())
            .map(|g| {
                (
                    g.name.clone(),
                    g.assets.iter().map(|a| a.label.clone()).collect(),
                )
            })
            .collect()
    }

    /// Expands a user selection: a group name stands for every label of that
    /// group, any other entry is taken as an asset label. Order is kept and
    /// repeats are dropped.
    pub fn expand_selection(&self, entries: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        entries
            .iter()
            .flat_map(|entry| match self.labels_in(entry) {
                members if members.is_empty() => vec![entry.clone()],
                members => members,
            })
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }

    pub fn category_of(&self, label: &str) -> Option<AssetCategory> {
        self.groups
            .iter()
            .find(|g| g.assets.iter().any(|a| a.label == label))
            .map(|g| g.category)
    }

    pub fn has_category(&self, category: AssetCategory) -> bool {
        self.groups
            .iter()
            .any(|g| g.category == category && !g.assets.is_empty())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let mut group_names = HashSet::new();
        let mut labels = HashSet::new();
        for group in &self.groups {
            if !group_names.insert(group.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "universe group '{}' is defined more than once",
                    group.name
                )));
            }
            for asset in &group.assets {
                if asset.label.trim().is_empty() || asset.ticker.trim().is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "universe group '{}' contains an asset with an empty label or ticker",
                        group.name
                    )));
                }
                if !labels.insert(asset.label.as_str()) {
                    return Err(ConfigError::ValidationError(format!(
                        "asset label '{}' appears in more than one place in the universe",
                        asset.label
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Splits a comma-separated selection ("S&P 500, DAX,,Gold") into trimmed,
/// non-empty entries, keeping the first occurrence of each.
pub fn parse_asset_list(csv: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}
