/// Save state — RON persistence for arc manager progress.
///
/// Definitions are never saved; instances are stored by arc id and
/// re-bound to the loaded catalog on restore.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::instance::{ArcInstanceState, ArcStatus};
use crate::schema::npc::NpcId;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("saved arc '{0}' is not in the catalog")]
    UnknownArc(String),
    #[error("saved arc '{arc}' is at stage {stage}, which does not fit its definition")]
    StageOutOfRange { arc: String, stage: usize },
    #[error("saved arc '{arc}' should have status {expected:?}")]
    StatusMismatch { arc: String, expected: ArcStatus },
    #[error("save has {active} active arcs but at most {max} are allowed")]
    CapacityExceeded { active: usize, max: usize },
    #[error("saved arc '{0}' appears more than once")]
    DuplicateArc(String),
    #[error("saved arc '{arc}' is active alongside '{by}' in exclusion group '{group}'")]
    Excluded { group: String, arc: String, by: String },
}

/// Everything the arc manager needs to resume a playthrough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcManagerState {
    pub active: Vec<ArcInstanceState>,
    pub completed: Vec<ArcInstanceState>,
    /// Remaining cooldown years per arc id. Only positive entries matter.
    #[serde(default)]
    pub cooldowns: Vec<(String, u32)>,
    #[serde(default)]
    pub npc_bindings: Vec<(String, Vec<NpcId>)>,
}

impl ArcManagerState {
    pub fn to_ron(&self) -> Result<String, SaveError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn from_ron(input: &str) -> Result<ArcManagerState, SaveError> {
        Ok(ron::from_str(input)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), SaveError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<ArcManagerState, SaveError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }
}
