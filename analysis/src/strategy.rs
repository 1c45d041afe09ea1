use crate::{
    error::{AnalysisError, MissingSelection},
    record::StrategyId,
};
use std::collections::BTreeMap;

/// Strategy ids written by the reachability tools
pub const DEFAULT_STRATEGIES: [(&str, StrategyId); 6] = [
    ("bfs", 0),
    ("sat", 2),
    ("rec", 4),
    ("bfs-plain", 5),
    ("rec-par", 14),
    ("rec-copy", 104),
];

/// Name -> id registry for strategies, seeded with [`DEFAULT_STRATEGIES`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRegistry {
    ids: BTreeMap<String, StrategyId>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            ids: DEFAULT_STRATEGIES
                .iter()
                .map(|(name, id)| ((*name).to_owned(), *id))
                .collect(),
        }
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            ids: BTreeMap::new(),
        }
    }

    /// register an (experimental) strategy, returning the id it replaced
    pub fn register(&mut self, name: impl Into<String>, id: StrategyId) -> Option<StrategyId> {
        self.ids.insert(name.into(), id)
    }

    pub fn resolve(&self, name: &str) -> Result<StrategyId, AnalysisError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| MissingSelection::StrategyName(name.to_owned()).into())
    }

    pub fn name_of(&self, id: StrategyId) -> Option<&str> {
        self.ids
            .iter()
            .find(|(_, registered)| **registered == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StrategyId)> {
        self.ids.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

impl Extend<(String, StrategyId)> for StrategyRegistry {
    fn extend<T: IntoIterator<Item = (String, StrategyId)>>(&mut self, iter: T) {
        self.ids.extend(iter);
    }
}
