/// Arc manager — the once-per-year scheduler for narrative arcs.
///
/// Advances ready arcs, decays cooldowns, starts new eligible arcs under
/// the capacity and exclusion-group limits, and surfaces at most one event
/// per year.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::core::catalog::{ArcCatalog, CatalogError};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::instance::{ArcError, ArcInstance, ArcInstanceState, ArcStatus};
use crate::core::save::{ArcManagerState, SaveError};
use crate::schema::arc::{ArcDefinition, Prerequisite};
use crate::schema::character::Character;
use crate::schema::event::Event;
use crate::schema::npc::{NpcId, NpcProfile};
use crate::schema::role::Role;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("arc error: {0}")]
    Arc(#[from] ArcError),
    #[error("arc '{0}' is not in the catalog")]
    UnknownArc(String),
    #[error("arc '{0}' is not active")]
    NotActive(String),
    #[error("arc '{arc}' cannot start: {reason}")]
    Ineligible { arc: String, reason: Ineligible },
    #[error("{0} arcs are already active")]
    AtCapacity(usize),
}

/// Why an arc cannot start right now. These are normal scheduling
/// outcomes, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
    UnknownArc,
    Active,
    Completed,
    Cooldown { years: u32 },
    RoleRestricted { role: Role },
    Prerequisite(Prerequisite),
    Excluded { group: String, by: String },
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArc => f.write_str("not in the catalog"),
            Self::Active => f.write_str("already active"),
            Self::Completed => f.write_str("already completed"),
            Self::Cooldown { years } => write!(f, "cooling down for {years} more years"),
            Self::RoleRestricted { role } => write!(f, "not open to the {role} role"),
            Self::Prerequisite(p) => write!(f, "requires {p}"),
            Self::Excluded { group, by } => write!(f, "'{by}' is active in group '{group}'"),
        }
    }
}

/// An arc event picked for presentation this year.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacedEvent {
    pub arc_id: String,
    pub stage: usize,
    /// Years the stage had waited when it surfaced.
    pub years_waiting: u32,
    pub event: Event,
}

/// What resolving an outcome did to the arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The arc moved on to `stage`.
    Advanced { stage: usize },
    /// The arc ran out of stages and is now on cooldown.
    Completed,
}

/// Schedules arcs for one playthrough. Built via `ArcManager::builder()`.
pub struct ArcManager<R = StdRng> {
    catalog: ArcCatalog,
    config: EngineConfig,
    active: Vec<ArcInstance>,
    completed: Vec<ArcInstance>,
    cooldowns: FxHashMap<String, u32>,
    npc_bindings: FxHashMap<String, Vec<NpcId>>,
    rng: R,
}

/// Builder for constructing an `ArcManager`.
pub struct ArcManagerBuilder {
    catalog_paths: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    seed: u64,
    /// Directly provided catalog (for testing without files).
    catalog: Option<ArcCatalog>,
    /// Directly provided config (for testing without files).
    config: Option<EngineConfig>,
}

impl ArcManager<StdRng> {
    pub fn builder() -> ArcManagerBuilder {
        ArcManagerBuilder {
            catalog_paths: Vec::new(),
            config_path: None,
            seed: 0,
            catalog: None,
            config: None,
        }
    }
}

impl<R: Rng> ArcManager<R> {
    pub fn new(catalog: ArcCatalog, config: EngineConfig, rng: R) -> Result<Self, ManagerError> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            active: Vec::new(),
            completed: Vec::new(),
            cooldowns: FxHashMap::default(),
            npc_bindings: FxHashMap::default(),
            rng,
        })
    }

    pub fn catalog(&self) -> &ArcCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active instances, in the order they started.
    pub fn active(&self) -> &[ArcInstance] {
        &self.active
    }

    pub fn completed(&self) -> &[ArcInstance] {
        &self.completed
    }

    pub fn instance(&self, arc_id: &str) -> Option<&ArcInstance> {
        self.active.iter().find(|i| i.id() == arc_id)
    }

    pub fn is_active(&self, arc_id: &str) -> bool {
        self.instance(arc_id).is_some()
    }

    /// The manager's random source, shared with event execution so a seed
    /// covers the whole simulation.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Remaining cooldown years for an arc id; 0 when none is recorded.
    pub fn cooldown(&self, arc_id: &str) -> u32 {
        self.cooldowns.get(arc_id).copied().unwrap_or(0)
    }

    /// Run the yearly scheduling pass and return the one event to present,
    /// if any.
    ///
    /// Ready arcs that lose the selection keep their waiting time and are
    /// offered again next year; nothing is advanced until the surfaced
    /// event's outcome is resolved.
    pub fn update_for_new_year(&mut self, character: &Character) -> Option<SurfacedEvent> {
        // Advance phase
        let mut candidates = Vec::new();
        for instance in &mut self.active {
            if instance.tick() {
                if let Some(event) = instance.current_event() {
                    candidates.push(SurfacedEvent {
                        arc_id: instance.id().to_string(),
                        stage: instance.current_stage(),
                        years_waiting: instance.years_since_last_stage(),
                        event,
                    });
                }
            }
        }

        // Cooldown decay
        for (arc_id, years) in self.cooldowns.iter_mut() {
            if *years > 0 && !self.active.iter().any(|i| i.id() == arc_id) {
                *years -= 1;
            }
        }
        self.cooldowns.retain(|_, years| *years > 0);

        // Start phase
        if self.active.len() < self.config.max_active_arcs {
            let eligible = self.eligible_definitions(character);
            if eligible.is_empty() {
                trace!("no eligible arcs this year");
            } else if self.rng.gen_bool(self.config.start_probability) {
                if let Some(definition) = eligible.choose(&mut self.rng).cloned() {
                    match self.start_definition(definition) {
                        Ok(surfaced) => candidates.push(surfaced),
                        Err(e) => error!(error = %e, "failed to start arc"),
                    }
                }
            }
        }

        self.select(candidates)
    }

    /// Advance the arc whose event was presented, recording `choice`.
    ///
    /// On completion the arc moves to the completed set, its id is added
    /// to the character's record, its cooldown starts and its NPC bindings
    /// are released. A failed resolution leaves every piece of state as it
    /// was.
    pub fn resolve_outcome(
        &mut self,
        arc_id: &str,
        choice: Option<usize>,
        character: &mut Character,
    ) -> Result<Resolution, ManagerError> {
        let Some(slot) = self.active.iter().position(|i| i.id() == arc_id) else {
            error!(arc = arc_id, "resolve_outcome for an arc that is not active");
            return Err(ManagerError::NotActive(arc_id.to_string()));
        };

        if let Err(e) = self.active[slot].advance(choice) {
            error!(arc = arc_id, error = %e, "rejected arc outcome");
            return Err(e.into());
        }

        if !self.active[slot].is_completed() {
            let stage = self.active[slot].current_stage();
            debug!(arc = arc_id, stage, "arc advanced");
            return Ok(Resolution::Advanced { stage });
        }

        let instance = self.active.remove(slot);
        if !character.has_completed(arc_id) {
            character.completed_arcs.push(arc_id.to_string());
        }
        if self.config.cooldown_years > 0 {
            self.cooldowns
                .insert(arc_id.to_string(), self.config.cooldown_years);
        }
        self.npc_bindings.remove(arc_id);
        info!(
            arc = arc_id,
            choices = ?instance.choice_history(),
            "arc completed"
        );
        // A repeatable arc keeps only its latest run.
        self.completed.retain(|done| done.id() != arc_id);
        self.completed.push(instance);
        Ok(Resolution::Completed)
    }

    /// Check whether one arc could start for this character right now,
    /// ignoring capacity.
    pub fn eligibility(&self, arc_id: &str, character: &Character) -> Result<(), Ineligible> {
        let definition = self.catalog.get(arc_id).ok_or(Ineligible::UnknownArc)?;
        self.check_definition(definition, character)
    }

    /// Ids of every arc that could start right now, in catalog order.
    pub fn eligible_arcs(&self, character: &Character) -> Vec<&str> {
        self.catalog
            .iter()
            .filter(|d| self.check_definition(d, character).is_ok())
            .map(|d| d.id.as_str())
            .collect()
    }

    /// Start a specific arc, bypassing the yearly start roll but not the
    /// capacity limit or the eligibility filter.
    pub fn try_start(
        &mut self,
        arc_id: &str,
        character: &Character,
    ) -> Result<SurfacedEvent, ManagerError> {
        if self.active.len() >= self.config.max_active_arcs {
            return Err(ManagerError::AtCapacity(self.active.len()));
        }
        let definition = self
            .catalog
            .get(arc_id)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownArc(arc_id.to_string()))?;
        self.check_definition(&definition, character)
            .map_err(|reason| ManagerError::Ineligible {
                arc: arc_id.to_string(),
                reason,
            })?;
        self.start_definition(definition)
    }

    /// Bind an NPC to an arc's narrative.
    pub fn assign(&mut self, arc_id: &str, npc: NpcId) {
        self.npc_bindings
            .entry(arc_id.to_string())
            .or_default()
            .push(npc);
    }

    /// NPCs bound to an arc; empty when there are none.
    pub fn bound_npcs(&self, arc_id: &str) -> &[NpcId] {
        self.npc_bindings
            .get(arc_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Active arcs the NPC is bound to, in start order.
    pub fn arcs_for_npc(&self, npc: NpcId) -> Vec<&str> {
        self.active
            .iter()
            .filter(|i| self.bound_npcs(i.id()).contains(&npc))
            .map(|i| i.id())
            .collect()
    }

    /// The current event of the first active arc bound to this NPC, so a
    /// conversation with them can carry the arc forward.
    pub fn encounter_event(&self, npc: NpcId) -> Option<SurfacedEvent> {
        self.active
            .iter()
            .filter(|i| self.bound_npcs(i.id()).contains(&npc))
            .find_map(|i| {
                i.current_event().map(|event| SurfacedEvent {
                    arc_id: i.id().to_string(),
                    stage: i.current_stage(),
                    years_waiting: i.years_since_last_stage(),
                    event,
                })
            })
    }

    /// Possibly start an arc during a social encounter with `npc`.
    ///
    /// Only arcs with an NPC affinity that accepts this NPC qualify, on top
    /// of the usual eligibility filter and capacity limit. The started arc
    /// is bound to the NPC.
    pub fn start_from_encounter(
        &mut self,
        character: &Character,
        npc: &NpcProfile,
    ) -> Option<SurfacedEvent> {
        if self.active.len() >= self.config.max_active_arcs {
            return None;
        }

        let eligible: Vec<Arc<ArcDefinition>> = self
            .eligible_definitions(character)
            .into_iter()
            .filter(|d| d.npc_affinity.is_some_and(|a| a.accepts(character, npc)))
            .collect();
        if eligible.is_empty() || !self.rng.gen_bool(self.config.encounter_probability) {
            return None;
        }

        let definition = eligible.choose(&mut self.rng).cloned()?;
        let arc_id = definition.id.clone();
        match self.start_definition(definition) {
            Ok(surfaced) => {
                self.assign(&arc_id, npc.id);
                debug!(arc = %arc_id, npc = %npc.id, "arc started from encounter");
                Some(surfaced)
            }
            Err(e) => {
                error!(error = %e, "failed to start arc from encounter");
                None
            }
        }
    }

    /// Capture all mutable scheduling state for a save file.
    pub fn snapshot(&self) -> ArcManagerState {
        let mut cooldowns: Vec<(String, u32)> = self
            .cooldowns
            .iter()
            .map(|(id, years)| (id.clone(), *years))
            .collect();
        cooldowns.sort();
        let mut npc_bindings: Vec<(String, Vec<NpcId>)> = self
            .npc_bindings
            .iter()
            .map(|(id, npcs)| (id.clone(), npcs.clone()))
            .collect();
        npc_bindings.sort();

        ArcManagerState {
            active: self.active.iter().map(ArcInstance::state).collect(),
            completed: self.completed.iter().map(ArcInstance::state).collect(),
            cooldowns,
            npc_bindings,
        }
    }

    /// Replace all mutable scheduling state with a saved snapshot,
    /// re-binding every instance to this manager's catalog by id.
    ///
    /// Nothing changes if the snapshot does not fit the catalog, or breaks
    /// the rules the scheduler keeps: one instance per arc id (a repeatable
    /// arc may also have one completed run) and one active member per
    /// exclusion group.
    pub fn restore(&mut self, state: ArcManagerState) -> Result<(), SaveError> {
        if state.active.len() > self.config.max_active_arcs {
            return Err(SaveError::CapacityExceeded {
                active: state.active.len(),
                max: self.config.max_active_arcs,
            });
        }
        self.check_saved_ids(&state)?;

        let mut active = Vec::with_capacity(state.active.len());
        for saved in state.active {
            if saved.status != ArcStatus::Active {
                return Err(SaveError::StatusMismatch {
                    arc: saved.arc_id,
                    expected: ArcStatus::Active,
                });
            }
            active.push(self.rebind(saved)?);
        }
        let mut completed = Vec::with_capacity(state.completed.len());
        for saved in state.completed {
            if saved.status != ArcStatus::Completed {
                return Err(SaveError::StatusMismatch {
                    arc: saved.arc_id,
                    expected: ArcStatus::Completed,
                });
            }
            completed.push(self.rebind(saved)?);
        }

        for (arc_id, _) in &state.cooldowns {
            if !self.catalog.contains(arc_id) {
                warn!(arc = %arc_id, "saved cooldown for an arc no longer in the catalog");
            }
        }

        self.active = active;
        self.completed = completed;
        self.cooldowns = state
            .cooldowns
            .into_iter()
            .filter(|(_, years)| *years > 0)
            .collect();
        self.npc_bindings = state.npc_bindings.into_iter().collect();
        Ok(())
    }

    fn check_saved_ids(&self, state: &ArcManagerState) -> Result<(), SaveError> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for saved in &state.completed {
            if !seen.insert(saved.arc_id.as_str()) {
                return Err(SaveError::DuplicateArc(saved.arc_id.clone()));
            }
        }

        let mut active: FxHashSet<&str> = FxHashSet::default();
        let mut held: FxHashMap<&str, &str> = FxHashMap::default();
        for saved in &state.active {
            let arc_id = saved.arc_id.as_str();
            let repeatable = self.catalog.get(arc_id).is_some_and(|d| d.repeatable);
            if !active.insert(arc_id) || (seen.contains(arc_id) && !repeatable) {
                return Err(SaveError::DuplicateArc(saved.arc_id.clone()));
            }
            for group in self.catalog.groups_of(arc_id) {
                if let Some(other) = held.insert(group.name.as_str(), arc_id) {
                    return Err(SaveError::Excluded {
                        group: group.name.clone(),
                        arc: saved.arc_id.clone(),
                        by: other.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn rebind(&self, saved: ArcInstanceState) -> Result<ArcInstance, SaveError> {
        let definition = self
            .catalog
            .get(&saved.arc_id)
            .cloned()
            .ok_or_else(|| SaveError::UnknownArc(saved.arc_id.clone()))?;

        let stage_count = definition.stage_count();
        let stage_ok = match saved.status {
            ArcStatus::Completed => saved.current_stage >= stage_count,
            _ => saved.current_stage < stage_count,
        };
        if !stage_ok || saved.choice_history.len() > saved.current_stage {
            return Err(SaveError::StageOutOfRange {
                arc: saved.arc_id,
                stage: saved.current_stage,
            });
        }
        Ok(ArcInstance::from_state(definition, saved))
    }

    fn eligible_definitions(&self, character: &Character) -> Vec<Arc<ArcDefinition>> {
        self.catalog
            .iter()
            .filter(|d| match self.check_definition(d, character) {
                Ok(()) => true,
                Err(reason) => {
                    trace!(arc = %d.id, %reason, "arc not eligible");
                    false
                }
            })
            .cloned()
            .collect()
    }

    fn check_definition(
        &self,
        definition: &ArcDefinition,
        character: &Character,
    ) -> Result<(), Ineligible> {
        let arc_id = definition.id.as_str();
        if self.is_active(arc_id) {
            return Err(Ineligible::Active);
        }
        if !definition.repeatable && self.completed.iter().any(|i| i.id() == arc_id) {
            return Err(Ineligible::Completed);
        }
        let years = self.cooldown(arc_id);
        if years > 0 {
            return Err(Ineligible::Cooldown { years });
        }
        if !definition.allows_role(character.role) {
            return Err(Ineligible::RoleRestricted {
                role: character.role,
            });
        }
        if let Some(prerequisite) = definition.unmet_prerequisite(character) {
            return Err(Ineligible::Prerequisite(prerequisite.clone()));
        }
        for group in self.catalog.groups_of(arc_id) {
            if let Some(other) = self
                .active
                .iter()
                .find(|i| i.id() != arc_id && group.members.contains(i.id()))
            {
                return Err(Ineligible::Excluded {
                    group: group.name.clone(),
                    by: other.id().to_string(),
                });
            }
        }
        Ok(())
    }

    fn start_definition(
        &mut self,
        definition: Arc<ArcDefinition>,
    ) -> Result<SurfacedEvent, ManagerError> {
        let mut instance = ArcInstance::new(definition);
        instance.start()?;
        let event = instance
            .current_event()
            .ok_or_else(|| ManagerError::NotActive(instance.id().to_string()))?;
        let surfaced = SurfacedEvent {
            arc_id: instance.id().to_string(),
            stage: instance.current_stage(),
            years_waiting: instance.years_since_last_stage(),
            event,
        };
        debug!(arc = %surfaced.arc_id, active = self.active.len() + 1, "arc started");
        self.active.push(instance);
        Ok(surfaced)
    }

    /// Keep the candidate that has waited longest; ties are broken at
    /// random.
    fn select(&mut self, mut candidates: Vec<SurfacedEvent>) -> Option<SurfacedEvent> {
        if candidates.len() <= 1 {
            return candidates.pop();
        }

        let longest = candidates.iter().map(|c| c.years_waiting).max()?;
        let tied: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.years_waiting == longest)
            .map(|(slot, _)| slot)
            .collect();
        let winner = *tied.choose(&mut self.rng)?;
        let surfaced = candidates.swap_remove(winner);
        debug!(
            arc = %surfaced.arc_id,
            deferred = ?candidates.iter().map(|c| c.arc_id.as_str()).collect::<Vec<_>>(),
            "surfacing one arc event, deferring the rest"
        );
        Some(surfaced)
    }
}

impl ArcManagerBuilder {
    /// Add a catalog file. Later files override arcs from earlier ones.
    pub fn catalog_path(mut self, path: impl AsRef<Path>) -> Self {
        self.catalog_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide a catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: ArcCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide a config directly (for testing without files).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<ArcManager<StdRng>, ManagerError> {
        let rng = StdRng::seed_from_u64(self.seed);
        self.build_with_rng(rng)
    }

    /// Build with a caller-supplied random source.
    pub fn build_with_rng<R: Rng>(self, rng: R) -> Result<ArcManager<R>, ManagerError> {
        let mut catalog = self.catalog.unwrap_or_default();
        for path in &self.catalog_paths {
            catalog.merge(ArcCatalog::load_from_ron(path)?);
        }

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(&path)?,
            (None, None) => EngineConfig::default(),
        };

        ArcManager::new(catalog, config, rng)
    }
}
