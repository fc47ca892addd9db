use serde::{Deserialize, Serialize};
use std::fmt;

use super::character::Character;
use super::effect::EffectSet;
use super::event::Choice;
use super::npc::NpcProfile;
use super::role::{Gender, Role};

/// Which earlier choice a conditional branch keys on: the choice history
/// holds `choice` at position `stage`. History only grows on stages that
/// offered choices, so `stage` is a history slot rather than a stage index
/// once an earlier stage is choiceless. See [`ArcDefinition::history_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchCondition {
    pub stage: usize,
    pub choice: usize,
}

impl BranchCondition {
    /// True when `history` holds `choice` at position `stage`. A history
    /// that does not reach that far never matches.
    pub fn matches(&self, history: &[usize]) -> bool {
        history.get(self.stage) == Some(&self.choice)
    }
}

/// An alternate rendition of a stage, selected by an earlier choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    pub condition: BranchCondition,
    pub description: String,
    pub effects: EffectSet,
    pub choices: Vec<Choice>,
}

/// One step of an arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub title: String,
    pub description: String,
    pub effects: EffectSet,
    pub choices: Vec<Choice>,
    pub branches: Vec<ConditionalBranch>,
    /// Years the arc waits on this stage before it surfaces. Always >= 1.
    pub years_until_next: u32,
}

impl Stage {
    /// The first branch whose condition holds for `history`, if any.
    pub fn branch_for(&self, history: &[usize]) -> Option<&ConditionalBranch> {
        self.branches.iter().find(|b| b.condition.matches(history))
    }

    /// Whether resolving this stage adds a history entry, given the slots
    /// filled before it: `Some(true)` always, `Some(false)` never, `None`
    /// when it depends on earlier picks.
    fn records_choice(&self, stages: &[Stage], slots: &[usize]) -> Option<bool> {
        let branches_choose = self.branches.iter().all(|b| !b.choices.is_empty());
        if self.choices.is_empty() && self.branches.iter().all(|b| b.choices.is_empty()) {
            return Some(false);
        }
        if !branches_choose {
            return None;
        }
        if !self.choices.is_empty() || self.default_unreachable(stages, slots) {
            return Some(true);
        }
        None
    }

    /// True when some earlier slot has a branch here for every choice that
    /// could fill it, so the default rendition never shows.
    fn default_unreachable(&self, stages: &[Stage], slots: &[usize]) -> bool {
        slots.iter().enumerate().any(|(slot, &filled_by)| {
            let offered = stages[filled_by].max_choices();
            offered > 0
                && (0..offered).all(|choice| {
                    self.branches
                        .iter()
                        .any(|b| b.condition == BranchCondition { stage: slot, choice })
                })
        })
    }

    /// Largest number of choices any rendition of this stage can offer.
    pub fn max_choices(&self) -> usize {
        self.branches
            .iter()
            .map(|b| b.choices.len())
            .chain(std::iter::once(self.choices.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Which stage's choice lands at each position of an arc's choice history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLayout {
    /// `slots[k]` is the stage recorded at history position `k`.
    pub slots: Vec<usize>,
    /// First stage that records a choice on some paths and not on others.
    /// Positions after the slots it precedes are not fixed.
    pub unsettled_from: Option<usize>,
}

impl HistoryLayout {
    /// The stage recorded at `slot`, as far as stage `position` can see.
    pub fn stage_for(&self, slot: usize, position: usize) -> Option<usize> {
        self.slots.get(slot).copied().filter(|&stage| stage < position)
    }
}

/// A predicate over character state that gates arc eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prerequisite {
    MinAge(u32),
    MinWealth(i64),
    MinHealth(i32),
    MinSkill { name: String, min: i32 },
    MinAttribute { name: String, min: i32 },
    Role(Role),
    Gender(Gender),
    CompletedArc(String),
}

impl Prerequisite {
    /// Skill and attribute thresholds naming a stat the character lacks
    /// are treated as met.
    pub fn is_met(&self, character: &Character) -> bool {
        match self {
            Self::MinAge(min) => character.age >= *min,
            Self::MinWealth(min) => character.wealth >= *min,
            Self::MinHealth(min) => character.health >= *min,
            Self::MinSkill { name, min } => character.skill(name).map_or(true, |v| v >= *min),
            Self::MinAttribute { name, min } => {
                character.attribute(name).map_or(true, |v| v >= *min)
            }
            Self::Role(role) => character.role == *role,
            Self::Gender(gender) => character.gender == *gender,
            Self::CompletedArc(id) => character.has_completed(id),
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinAge(min) => write!(f, "age >= {min}"),
            Self::MinWealth(min) => write!(f, "wealth >= {min}"),
            Self::MinHealth(min) => write!(f, "health >= {min}"),
            Self::MinSkill { name, min } => write!(f, "skill {name} >= {min}"),
            Self::MinAttribute { name, min } => write!(f, "attribute {name} >= {min}"),
            Self::Role(role) => write!(f, "role is {role}"),
            Self::Gender(gender) => write!(f, "gender is {gender}"),
            Self::CompletedArc(id) => write!(f, "completed arc '{id}'"),
        }
    }
}

/// Which NPCs can pull the player into an arc during a social encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcAffinity {
    Any,
    /// The NPC is married.
    Married,
    /// The NPC's role differs from the player's.
    DifferentRole,
    /// The NPC shares the player's gender.
    SameGender,
}

impl NpcAffinity {
    pub fn accepts(&self, character: &Character, npc: &NpcProfile) -> bool {
        match self {
            Self::Any => true,
            Self::Married => npc.married,
            Self::DifferentRole => npc.role != character.role,
            Self::SameGender => npc.gender == character.gender,
        }
    }
}

/// An immutable catalog entry describing a multi-stage storyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub stages: Vec<Stage>,
    pub role_restricted: bool,
    pub allowed_roles: Vec<Role>,
    pub prerequisites: Vec<Prerequisite>,
    /// Set when the arc may start again after completion and cooldown.
    pub repeatable: bool,
    /// Set when a social encounter with a matching NPC may start the arc.
    pub npc_affinity: Option<NpcAffinity>,
}

impl ArcDefinition {
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Role restriction check; unrestricted arcs accept every role.
    pub fn allows_role(&self, role: Role) -> bool {
        !self.role_restricted || self.allowed_roles.contains(&role)
    }

    /// The first prerequisite the character fails, if any.
    pub fn unmet_prerequisite(&self, character: &Character) -> Option<&Prerequisite> {
        self.prerequisites.iter().find(|p| !p.is_met(character))
    }

    /// Map history positions to stages. Walks the stages in order and stops
    /// at the first one whose recording depends on earlier picks.
    pub fn history_layout(&self) -> HistoryLayout {
        let mut layout = HistoryLayout::default();
        for (position, stage) in self.stages.iter().enumerate() {
            match stage.records_choice(&self.stages, &layout.slots) {
                Some(true) => layout.slots.push(position),
                Some(false) => {}
                None => {
                    layout.unsettled_from = Some(position);
                    break;
                }
            }
        }
        layout
    }
}
