#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootDrop {
    pub item_id: String,
    /// Probability in `[0, 1]`.
    pub chance: f64,
}

/// Rewards granted for killing one enemy of a template.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyLoot {
    pub experience: u64,
    pub gold: u64,
    pub drops: Vec<LootDrop>,
}

impl EnemyLoot {
    /// Rewards for templates without a loot table, scaled by toughness.
    pub fn fallback(max_health: u32) -> Self {
        Self {
            experience: u64::from(max_health) * 2,
            gold: u64::from(max_health),
            drops: Vec::new(),
        }
    }
}

pub trait LootOracle: Send + Sync {
    fn enemy_loot(&self, template_id: &str) -> Option<EnemyLoot>;
}
