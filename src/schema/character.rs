use serde::{Deserialize, Serialize};

use super::role::{Gender, Role};

/// Skills every character starts with.
pub const BASE_SKILLS: [&str; 6] = [
    "combat",
    "diplomacy",
    "stewardship",
    "trade",
    "farming",
    "crafting",
];

/// Attributes every character starts with.
pub const BASE_ATTRIBUTES: [&str; 5] = [
    "strength",
    "intelligence",
    "charisma",
    "wisdom",
    "dexterity",
];

/// Upper bound for health, skills and attributes.
pub const STAT_MAX: i32 = 100;

const BASE_SKILL_VALUE: i32 = 30;
const BASE_ATTRIBUTE_VALUE: i32 = 50;

/// The character snapshot the arc engine reads for eligibility checks and
/// mutates through effect application.
///
/// Skills and attributes are ordered maps by insertion so that "random
/// skill" effects pick reproducibly under a seeded RNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub role: Role,
    pub health: i32,
    pub wealth: i64,
    pub skills: Vec<(String, i32)>,
    pub attributes: Vec<(String, i32)>,
    #[serde(default)]
    pub completed_arcs: Vec<String>,
}

impl Character {
    /// Create a character with base stats plus the bonuses of their role.
    pub fn new(name: &str, gender: Gender, role: Role, age: u32) -> Self {
        let mut character = Self {
            name: name.to_string(),
            age,
            gender,
            role,
            health: STAT_MAX,
            wealth: 0,
            skills: BASE_SKILLS
                .iter()
                .map(|s| (s.to_string(), BASE_SKILL_VALUE))
                .collect(),
            attributes: BASE_ATTRIBUTES
                .iter()
                .map(|a| (a.to_string(), BASE_ATTRIBUTE_VALUE))
                .collect(),
            completed_arcs: Vec::new(),
        };

        let caps = role.capabilities();
        for (name, bonus) in caps.skill_bonuses {
            if let Some(value) = character.skill_mut(name) {
                *value = (*value + bonus).clamp(0, STAT_MAX);
            }
        }
        for (name, bonus) in caps.attribute_bonuses {
            if let Some(value) = character.attribute_mut(name) {
                *value = (*value + bonus).clamp(0, STAT_MAX);
            }
        }
        character
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn skill(&self, name: &str) -> Option<i32> {
        self.skills.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn attribute(&self, name: &str) -> Option<i32> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn skill_mut(&mut self, name: &str) -> Option<&mut i32> {
        self.skills.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut i32> {
        self.attributes
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns true if the character has finished the arc with this id.
    pub fn has_completed(&self, arc_id: &str) -> bool {
        self.completed_arcs.iter().any(|id| id == arc_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_character_has_base_stats() {
        let c = Character::new("Aldric", Gender::Male, Role::Craftsman, 20);
        assert_eq!(c.health, STAT_MAX);
        assert_eq!(c.skills.len(), BASE_SKILLS.len());
        assert_eq!(c.attributes.len(), BASE_ATTRIBUTES.len());
        assert_eq!(c.skill("combat"), Some(BASE_SKILL_VALUE));
        assert_eq!(c.attribute("wisdom"), Some(BASE_ATTRIBUTE_VALUE));
        assert!(c.completed_arcs.is_empty());
        assert!(c.is_alive());
    }

    #[test]
    fn role_bonuses_applied() {
        let farmer = Character::new("Wat", Gender::Male, Role::Farmer, 30);
        assert_eq!(farmer.skill("farming"), Some(BASE_SKILL_VALUE + 30));

        let priest = Character::new("Hild", Gender::Female, Role::Priest, 30);
        assert_eq!(priest.attribute("wisdom"), Some(BASE_ATTRIBUTE_VALUE + 30));
        assert_eq!(priest.attribute("charisma"), Some(BASE_ATTRIBUTE_VALUE + 10));
    }

    #[test]
    fn unknown_stat_lookups() {
        let mut c = Character::new("Edda", Gender::Female, Role::Noble, 25);
        assert_eq!(c.skill("sorcery"), None);
        assert!(c.attribute_mut("cunning").is_none());
    }

    #[test]
    fn completed_arcs_lookup() {
        let mut c = Character::new("Edda", Gender::Female, Role::Noble, 25);
        c.completed_arcs.push("smuggling".to_string());
        assert!(c.has_completed("smuggling"));
        assert!(!c.has_completed("theft"));
        assert_eq!(c.skill("diplomacy"), Some(BASE_SKILL_VALUE + 20));
    }
}
