/// Arc instance — the per-playthrough state machine for one arc.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::schema::arc::ArcDefinition;
use crate::schema::effect::EffectSet;
use crate::schema::event::{Choice, Event};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArcError {
    #[error("arc '{0}' has already been started")]
    AlreadyStarted(String),
    #[error("arc '{0}' is not active")]
    NotActive(String),
    #[error("arc '{arc}' stage {stage} offers {count} choices, got index {index}")]
    ChoiceOutOfRange {
        arc: String,
        stage: usize,
        index: usize,
        count: usize,
    },
    #[error("arc '{arc}' stage {stage} needs a choice to advance")]
    MissingChoice { arc: String, stage: usize },
    #[error("arc '{arc}' stage {stage} offers no choices, got index {index}")]
    UnexpectedChoice {
        arc: String,
        stage: usize,
        index: usize,
    },
}

/// Lifecycle of an arc instance. There is no cancelled state: once
/// started, an arc runs until its stages are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcStatus {
    Pending,
    Active,
    Completed,
}

/// Serializable progress of one arc, keyed by arc id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcInstanceState {
    pub arc_id: String,
    pub current_stage: usize,
    pub choice_history: Vec<usize>,
    pub years_since_last_stage: u32,
    pub status: ArcStatus,
}

/// The stage content that applies right now: the matching conditional
/// branch, or the stage's own defaults.
struct Rendition<'a> {
    description: &'a str,
    effects: &'a EffectSet,
    choices: &'a [Choice],
}

/// Runtime state of one arc, sharing its read-only definition.
///
/// `choice_history` only grows for stages that offered choices, so it is
/// never longer than `current_stage`.
#[derive(Debug, Clone)]
pub struct ArcInstance {
    definition: Arc<ArcDefinition>,
    current_stage: usize,
    choice_history: Vec<usize>,
    years_since_last_stage: u32,
    status: ArcStatus,
}

impl ArcInstance {
    pub fn new(definition: Arc<ArcDefinition>) -> Self {
        Self {
            definition,
            current_stage: 0,
            choice_history: Vec::new(),
            years_since_last_stage: 0,
            status: ArcStatus::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn definition(&self) -> &ArcDefinition {
        &self.definition
    }

    pub fn current_stage(&self) -> usize {
        self.current_stage
    }

    pub fn choice_history(&self) -> &[usize] {
        &self.choice_history
    }

    pub fn years_since_last_stage(&self) -> u32 {
        self.years_since_last_stage
    }

    pub fn status(&self) -> ArcStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ArcStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == ArcStatus::Completed
    }

    /// Begin the arc at its first stage.
    pub fn start(&mut self) -> Result<(), ArcError> {
        if self.status != ArcStatus::Pending {
            return Err(ArcError::AlreadyStarted(self.id().to_string()));
        }
        self.status = ArcStatus::Active;
        self.current_stage = 0;
        self.years_since_last_stage = 0;
        self.choice_history.clear();
        Ok(())
    }

    /// Count one simulated year. Returns true when the current stage has
    /// waited at least its `years_until_next`. Inactive instances are left
    /// untouched and never ready.
    pub fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(stage) = self.definition.stages.get(self.current_stage) else {
            return false;
        };
        self.years_since_last_stage = self.years_since_last_stage.saturating_add(1);
        self.years_since_last_stage >= stage.years_until_next
    }

    /// The event for the current stage, if the arc is active.
    ///
    /// Pure read: the same history and stage always yield the same event.
    pub fn current_event(&self) -> Option<Event> {
        let stage = self.definition.stages.get(self.current_stage)?;
        let rendition = self.rendition()?;
        Some(Event {
            title: format!("{}: {}", self.definition.title, stage.title),
            description: rendition.description.to_string(),
            effects: rendition.effects.clone(),
            choices: rendition.choices.to_vec(),
        })
    }

    /// Resolve the current stage and move to the next one.
    ///
    /// `choice` must be given exactly when the current rendition offers
    /// choices, and must index into them.
    pub fn advance(&mut self, choice: Option<usize>) -> Result<(), ArcError> {
        let rendition = self
            .rendition()
            .ok_or_else(|| ArcError::NotActive(self.id().to_string()))?;
        let count = rendition.choices.len();

        match (choice, count) {
            (None, 0) => {}
            (None, _) => {
                return Err(ArcError::MissingChoice {
                    arc: self.id().to_string(),
                    stage: self.current_stage,
                });
            }
            (Some(index), 0) => {
                return Err(ArcError::UnexpectedChoice {
                    arc: self.id().to_string(),
                    stage: self.current_stage,
                    index,
                });
            }
            (Some(index), count) if index >= count => {
                return Err(ArcError::ChoiceOutOfRange {
                    arc: self.id().to_string(),
                    stage: self.current_stage,
                    index,
                    count,
                });
            }
            (Some(index), _) => self.choice_history.push(index),
        }

        self.current_stage += 1;
        self.years_since_last_stage = 0;
        if self.current_stage >= self.definition.stage_count() {
            self.status = ArcStatus::Completed;
        }
        Ok(())
    }

    /// Snapshot for persistence.
    pub fn state(&self) -> ArcInstanceState {
        ArcInstanceState {
            arc_id: self.id().to_string(),
            current_stage: self.current_stage,
            choice_history: self.choice_history.clone(),
            years_since_last_stage: self.years_since_last_stage,
            status: self.status,
        }
    }

    /// Rebuild an instance from saved progress. The caller has checked
    /// that `state` fits `definition`.
    pub(crate) fn from_state(definition: Arc<ArcDefinition>, state: ArcInstanceState) -> Self {
        Self {
            definition,
            current_stage: state.current_stage,
            choice_history: state.choice_history,
            years_since_last_stage: state.years_since_last_stage,
            status: state.status,
        }
    }

    fn rendition(&self) -> Option<Rendition<'_>> {
        if !self.is_active() {
            return None;
        }
        let stage = self.definition.stages.get(self.current_stage)?;
        Some(match stage.branch_for(&self.choice_history) {
            Some(branch) => Rendition {
                description: &branch.description,
                effects: &branch.effects,
                choices: &branch.choices,
            },
            None => Rendition {
                description: &stage.description,
                effects: &stage.effects,
                choices: &stage.choices,
            },
        })
    }
}
