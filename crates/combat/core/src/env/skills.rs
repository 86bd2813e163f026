use crate::skill::SkillDefinition;

pub trait SkillOracle: Send + Sync {
    fn skill(&self, id: &str) -> Option<SkillDefinition>;
}
