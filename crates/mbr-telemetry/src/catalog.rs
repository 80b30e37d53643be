use std::collections::BTreeMap;

use mbr_balance::TankInfo;

use crate::error::TelemetryError;

/// Tank identity and metadata lookup.
pub trait AssetCatalog: Send + Sync {
    /// Every tank, ordered by `tank_id`.
    fn tanks(&self) -> Vec<TankInfo>;

    fn tank(&self, tank_id: &str) -> Result<TankInfo, TelemetryError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tanks: BTreeMap<String, TankInfo>,
}

impl InMemoryCatalog {
    /// Later entries with a repeated `tank_id` replace earlier ones.
    pub fn new(tanks: Vec<TankInfo>) -> Self {
        Self {
            tanks: tanks
                .into_iter()
                .map(|t| (t.tank_id.clone(), t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tanks.is_empty()
    }
}

impl AssetCatalog for InMemoryCatalog {
    fn tanks(&self) -> Vec<TankInfo> {
        self.tanks.values().cloned().collect()
    }

    fn tank(&self, tank_id: &str) -> Result<TankInfo, TelemetryError> {
        self.tanks
            .get(tank_id)
            .cloned()
            .ok_or_else(|| TelemetryError::UnknownTank(tank_id.to_string()))
    }
}
