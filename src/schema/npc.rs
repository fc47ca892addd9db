use serde::{Deserialize, Serialize};
use std::fmt;

use super::role::{Gender, Role};

/// Newtype wrapper for NPC ids issued by the NPC subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(pub u64);

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npc#{}", self.0)
    }
}

/// What the arc engine needs to know about an NPC the player meets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcProfile {
    pub id: NpcId,
    pub name: String,
    pub role: Role,
    pub gender: Gender,
    pub married: bool,
}
