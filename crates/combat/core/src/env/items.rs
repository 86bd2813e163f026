#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Consumable,
    Equipment,
    Material,
}

/// What using an item does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    HealHp(u32),
    HealMp(u32),
    /// Out-of-combat effects (teleport scrolls, buffs, ...).
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub effect: Option<ItemEffect>,
}

impl ItemDefinition {
    /// Equipment occupies one slot per piece; everything else stacks.
    pub fn stackable(&self) -> bool {
        self.kind != ItemKind::Equipment
    }
}

pub trait ItemOracle: Send + Sync {
    fn item(&self, id: &str) -> Option<ItemDefinition>;

    fn item_by_name(&self, name: &str) -> Option<ItemDefinition>;
}
