//! Static content oracles.
//!
//! [`StaticContent`] implements every `combat-core` oracle trait over plain
//! maps; [`OracleManager`] bundles whichever implementations the host wires
//! in so the engine can hand out trait objects.
mod content;

use std::sync::Arc;

use combat_core::{ItemOracle, LootOracle, MapOracle, SkillOracle};

pub use content::StaticContent;

/// Shared handles to every oracle the engine reads.
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) skills: Arc<dyn SkillOracle>,
    pub(crate) maps: Arc<dyn MapOracle>,
    pub(crate) items: Arc<dyn ItemOracle>,
    pub(crate) loot: Arc<dyn LootOracle>,
}

impl OracleManager {
    pub fn new(
        skills: Arc<dyn SkillOracle>,
        maps: Arc<dyn MapOracle>,
        items: Arc<dyn ItemOracle>,
        loot: Arc<dyn LootOracle>,
    ) -> Self {
        Self {
            skills,
            maps,
            items,
            loot,
        }
    }

    /// Uses one content set for every lookup.
    pub fn from_content(content: StaticContent) -> Self {
        let content = Arc::new(content);
        Self {
            skills: content.clone(),
            maps: content.clone(),
            items: content.clone(),
            loot: content,
        }
    }

    pub fn skills(&self) -> &dyn SkillOracle {
        self.skills.as_ref()
    }

    pub fn maps(&self) -> &dyn MapOracle {
        self.maps.as_ref()
    }

    pub fn items(&self) -> &dyn ItemOracle {
        self.items.as_ref()
    }

    pub fn loot(&self) -> &dyn LootOracle {
        self.loot.as_ref()
    }
}
