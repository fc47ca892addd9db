use serde::{Deserialize, Serialize};
use std::fmt;

/// The social role a character plays in the world.
///
/// Arc eligibility depends only on this tag, never on role-specific
/// character types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Craftsman,
    Merchant,
    Priest,
    Knight,
    Noble,
    King,
}

/// Static per-role capabilities: role-specific actions and the skill or
/// attribute bonuses a freshly created character of that role receives.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub actions: &'static [&'static str],
    pub skill_bonuses: &'static [(&'static str, i32)],
    pub attribute_bonuses: &'static [(&'static str, i32)],
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Farmer,
        Role::Craftsman,
        Role::Merchant,
        Role::Priest,
        Role::Knight,
        Role::Noble,
        Role::King,
    ];

    /// Content tag for this role: "farmer", "king", ...
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Craftsman => "craftsman",
            Self::Merchant => "merchant",
            Self::Priest => "priest",
            Self::Knight => "knight",
            Self::Noble => "noble",
            Self::King => "king",
        }
    }

    /// Parse a lowercase content tag. Returns `None` for unknown roles.
    pub fn from_tag(tag: &str) -> Option<Role> {
        let tag = tag.trim().to_lowercase();
        Self::ALL.iter().copied().find(|role| role.tag() == tag)
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::Farmer => Capabilities {
                actions: &["Plant Crops", "Tend Livestock", "Sell Produce"],
                skill_bonuses: &[("farming", 30)],
                attribute_bonuses: &[],
            },
            Self::Craftsman => Capabilities {
                actions: &["Craft Goods", "Take Commission"],
                skill_bonuses: &[("crafting", 30)],
                attribute_bonuses: &[],
            },
            Self::Merchant => Capabilities {
                actions: &["Trade Goods", "Hire Employee", "Upgrade Shop"],
                skill_bonuses: &[("trade", 30), ("diplomacy", 10)],
                attribute_bonuses: &[],
            },
            Self::Priest => Capabilities {
                actions: &["Pray", "Perform Ceremony", "Study Scriptures"],
                skill_bonuses: &[],
                attribute_bonuses: &[("wisdom", 30), ("charisma", 10)],
            },
            Self::Knight => Capabilities {
                actions: &["Train Combat", "Participate in Tournament"],
                skill_bonuses: &[("combat", 30), ("diplomacy", 10)],
                attribute_bonuses: &[],
            },
            Self::Noble => Capabilities {
                actions: &["Manage Estate", "Attend Court"],
                skill_bonuses: &[("diplomacy", 20), ("stewardship", 10)],
                attribute_bonuses: &[],
            },
            Self::King => Capabilities {
                actions: &["Hold Court", "Levy Taxes", "Declare War"],
                skill_bonuses: &[("diplomacy", 20), ("stewardship", 20), ("combat", 10)],
                attribute_bonuses: &[],
            },
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Gender> {
        match tag.trim().to_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
