use serde::{Deserialize, Serialize};
use std::fmt;

/// The stat an effect targets. Decoded once from content keys at load time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Health,
    Wealth,
    Skill(String),
    Attribute(String),
    RandomSkill,
    RandomAttribute,
}

impl Effect {
    /// Decode a content key such as `"wealth"`, `"skill_trade"` or
    /// `"attribute_cunning"`. Returns `None` for keys that name no stat.
    pub fn from_key(key: &str) -> Option<Effect> {
        match key {
            "health" => return Some(Self::Health),
            "wealth" => return Some(Self::Wealth),
            "random_skill" => return Some(Self::RandomSkill),
            "random_attribute" => return Some(Self::RandomAttribute),
            _ => {}
        }

        if let Some(name) = key.strip_prefix("skill_") {
            if !name.is_empty() {
                return Some(Self::Skill(name.to_string()));
            }
        }
        if let Some(name) = key.strip_prefix("attribute_") {
            if !name.is_empty() {
                return Some(Self::Attribute(name.to_string()));
            }
        }
        None
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Health => f.write_str("health"),
            Self::Wealth => f.write_str("wealth"),
            Self::Skill(name) => write!(f, "skill_{name}"),
            Self::Attribute(name) => write!(f, "attribute_{name}"),
            Self::RandomSkill => f.write_str("random_skill"),
            Self::RandomAttribute => f.write_str("random_attribute"),
        }
    }
}

/// An ordered list of stat deltas, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSet {
    pub deltas: Vec<(Effect, i64)>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, effect: Effect, delta: i64) -> Self {
        self.deltas.push((effect, delta));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Effect, i64)> {
        self.deltas.iter()
    }
}
