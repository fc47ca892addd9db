/// Arc catalog — RON loading, effect decoding, and load-time validation.
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::schema::arc::{
    ArcDefinition, BranchCondition, ConditionalBranch, NpcAffinity, Prerequisite, Stage,
};
use crate::schema::effect::{Effect, EffectSet};
use crate::schema::event::Choice;
use crate::schema::role::{Gender, Role};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("arc '{0}' has no stages")]
    EmptyArc(String),
    #[error("arc '{0}' is defined twice")]
    DuplicateArc(String),
    #[error("arc '{arc}' stage {stage}: years_until_next must be at least 1")]
    ZeroDelay { arc: String, stage: usize },
    #[error("arc '{arc}' stage {stage}: branch keys on history slot {referenced}, which no earlier stage fills")]
    BranchNotReachable {
        arc: String,
        stage: usize,
        referenced: usize,
    },
    #[error("arc '{arc}' stage {stage}: branch keys on history slot {referenced}, but stage {unsettled} only sometimes records a choice")]
    UnsettledHistory {
        arc: String,
        stage: usize,
        referenced: usize,
        unsettled: usize,
    },
    #[error("arc '{arc}' stage {stage}: branch keys on choice {choice} of history slot {referenced} (stage {recorded_by}), which offers {available}")]
    ChoiceOutOfRange {
        arc: String,
        stage: usize,
        referenced: usize,
        recorded_by: usize,
        choice: usize,
        available: usize,
    },
    #[error("arc '{arc}': unknown effect key '{key}'")]
    UnknownEffect { arc: String, key: String },
    #[error("arc '{arc}': unknown role '{role}'")]
    UnknownRole { arc: String, role: String },
    #[error("arc '{arc}': unknown prerequisite '{key}'")]
    UnknownPrerequisite { arc: String, key: String },
    #[error("arc '{arc}': prerequisite '{key}' has an invalid value")]
    InvalidPrerequisite { arc: String, key: String },
    #[error("exclusion group '{group}' names unknown arc '{arc}'")]
    UnknownGroupMember { group: String, arc: String },
}

/// A named set of arcs of which at most one may be active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionGroup {
    pub name: String,
    pub members: FxHashSet<String>,
}

/// The static set of arc definitions plus their exclusion groups.
///
/// Arcs keep their declaration order so that random selection over the
/// eligible set is reproducible under a fixed seed.
#[derive(Debug, Clone, Default)]
pub struct ArcCatalog {
    arcs: Vec<Arc<ArcDefinition>>,
    index: FxHashMap<String, usize>,
    exclusion_groups: Vec<ExclusionGroup>,
}

// RON authoring shape. Effects and prerequisites use string keys in the
// content files and are decoded into closed enums here.

#[derive(Debug, Deserialize)]
struct RonCatalog {
    #[serde(default, deserialize_with = "ordered_map")]
    exclusion_groups: Vec<(String, Vec<String>)>,
    arcs: Vec<RonArc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Arc")]
struct RonArc {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    role_restricted: bool,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    prerequisites: Vec<(String, RonValue)>,
    #[serde(default)]
    repeatable: bool,
    #[serde(default)]
    npc_affinity: Option<NpcAffinity>,
    stages: Vec<RonStage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Stage")]
struct RonStage {
    title: String,
    description: String,
    #[serde(default, deserialize_with = "ordered_map")]
    effects: Vec<(String, i64)>,
    #[serde(default)]
    choices: Vec<RonChoice>,
    #[serde(default)]
    conditional_events: Vec<RonBranch>,
    #[serde(default = "default_years_until_next")]
    years_until_next: u32,
}

#[derive(Debug, Deserialize)]
struct RonChoice {
    text: String,
    #[serde(default, deserialize_with = "ordered_map")]
    effects: Vec<(String, i64)>,
    outcome: String,
}

#[derive(Debug, Deserialize)]
struct RonBranch {
    condition: BranchCondition,
    description: String,
    #[serde(default, deserialize_with = "ordered_map")]
    effects: Vec<(String, i64)>,
    #[serde(default)]
    choices: Vec<RonChoice>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RonValue {
    Int(i64),
    Text(String),
}

fn default_years_until_next() -> u32 {
    1
}

/// Deserialize a map into a `Vec` of pairs, keeping the authored order.
fn ordered_map<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map with string keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(PhantomData))
}

impl ArcCatalog {
    /// Load a catalog from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ArcCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a catalog from a RON string.
    pub fn parse_ron(input: &str) -> Result<ArcCatalog, CatalogError> {
        let raw: RonCatalog = ron::from_str(input)?;
        let mut definitions = Vec::with_capacity(raw.arcs.len());
        for arc in raw.arcs {
            definitions.push(decode_arc(arc)?);
        }
        Self::from_definitions(definitions, raw.exclusion_groups)
    }

    /// Build a catalog from already-decoded definitions, validating each
    /// arc and every exclusion group member.
    pub fn from_definitions(
        definitions: Vec<ArcDefinition>,
        groups: Vec<(String, Vec<String>)>,
    ) -> Result<ArcCatalog, CatalogError> {
        let mut catalog = ArcCatalog::default();
        for definition in definitions {
            validate(&definition)?;
            if catalog.index.contains_key(&definition.id) {
                return Err(CatalogError::DuplicateArc(definition.id));
            }
            catalog
                .index
                .insert(definition.id.clone(), catalog.arcs.len());
            catalog.arcs.push(Arc::new(definition));
        }

        for (name, members) in groups {
            catalog.add_group(name, members)?;
        }
        Ok(catalog)
    }

    /// Merge another catalog into this one. Arcs from `other` replace arcs
    /// with the same id; exclusion groups with the same name are unioned.
    pub fn merge(&mut self, other: ArcCatalog) {
        for definition in other.arcs {
            match self.index.get(&definition.id) {
                Some(&slot) => self.arcs[slot] = definition,
                None => {
                    self.index.insert(definition.id.clone(), self.arcs.len());
                    self.arcs.push(definition);
                }
            }
        }
        for group in other.exclusion_groups {
            match self.exclusion_groups.iter_mut().find(|g| g.name == group.name) {
                Some(existing) => existing.members.extend(group.members),
                None => self.exclusion_groups.push(group),
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ArcDefinition>> {
        self.index.get(id).map(|&slot| &self.arcs[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ArcDefinition>> {
        self.arcs.iter()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn exclusion_groups(&self) -> &[ExclusionGroup] {
        &self.exclusion_groups
    }

    /// Groups the arc belongs to.
    pub fn groups_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ExclusionGroup> + 'a {
        self.exclusion_groups
            .iter()
            .filter(move |g| g.members.contains(id))
    }

    fn add_group(&mut self, name: String, members: Vec<String>) -> Result<(), CatalogError> {
        if let Some(unknown) = members.iter().find(|m| !self.contains(m)) {
            return Err(CatalogError::UnknownGroupMember {
                group: name,
                arc: unknown.clone(),
            });
        }
        self.exclusion_groups.push(ExclusionGroup {
            name,
            members: members.into_iter().collect(),
        });
        Ok(())
    }
}

/// Check the authoring rules that the runtime relies on.
///
/// Branch conditions are checked against history slots, not stage indices:
/// each must name a slot some earlier stage always fills, and a choice that
/// stage can offer.
pub fn validate(definition: &ArcDefinition) -> Result<(), CatalogError> {
    let arc = &definition.id;
    if definition.stages.is_empty() {
        return Err(CatalogError::EmptyArc(arc.clone()));
    }
    let layout = definition.history_layout();

    for (position, stage) in definition.stages.iter().enumerate() {
        if stage.years_until_next < 1 {
            return Err(CatalogError::ZeroDelay {
                arc: arc.clone(),
                stage: position,
            });
        }

        for branch in &stage.branches {
            let referenced = branch.condition.stage;
            let recorded_by = match layout.stage_for(referenced, position) {
                Some(recorded_by) => recorded_by,
                None => {
                    return Err(match layout.unsettled_from.filter(|&u| u < position) {
                        Some(unsettled) => CatalogError::UnsettledHistory {
                            arc: arc.clone(),
                            stage: position,
                            referenced,
                            unsettled,
                        },
                        None => CatalogError::BranchNotReachable {
                            arc: arc.clone(),
                            stage: position,
                            referenced,
                        },
                    });
                }
            };
            let available = definition.stages[recorded_by].max_choices();
            if branch.condition.choice >= available {
                return Err(CatalogError::ChoiceOutOfRange {
                    arc: arc.clone(),
                    stage: position,
                    referenced,
                    recorded_by,
                    choice: branch.condition.choice,
                    available,
                });
            }
        }
    }
    Ok(())
}

fn decode_arc(raw: RonArc) -> Result<ArcDefinition, CatalogError> {
    let id = raw.id;

    let mut allowed_roles = Vec::with_capacity(raw.roles.len());
    for tag in &raw.roles {
        let role = Role::from_tag(tag).ok_or_else(|| CatalogError::UnknownRole {
            arc: id.clone(),
            role: tag.clone(),
        })?;
        allowed_roles.push(role);
    }

    let mut prerequisites = Vec::with_capacity(raw.prerequisites.len());
    for (key, value) in raw.prerequisites {
        prerequisites.push(decode_prerequisite(&id, key, value)?);
    }

    let mut stages = Vec::with_capacity(raw.stages.len());
    for stage in raw.stages {
        let mut branches = Vec::with_capacity(stage.conditional_events.len());
        for branch in stage.conditional_events {
            branches.push(ConditionalBranch {
                condition: branch.condition,
                description: branch.description,
                effects: decode_effects(&id, branch.effects)?,
                choices: decode_choices(&id, branch.choices)?,
            });
        }
        stages.push(Stage {
            title: stage.title,
            description: stage.description,
            effects: decode_effects(&id, stage.effects)?,
            choices: decode_choices(&id, stage.choices)?,
            branches,
            years_until_next: stage.years_until_next,
        });
    }

    Ok(ArcDefinition {
        id,
        title: raw.title,
        description: raw.description,
        stages,
        role_restricted: raw.role_restricted,
        allowed_roles,
        prerequisites,
        repeatable: raw.repeatable,
        npc_affinity: raw.npc_affinity,
    })
}

fn decode_choices(arc: &str, raw: Vec<RonChoice>) -> Result<Vec<Choice>, CatalogError> {
    raw.into_iter()
        .map(|choice| {
            Ok(Choice {
                text: choice.text,
                effects: decode_effects(arc, choice.effects)?,
                outcome: choice.outcome,
            })
        })
        .collect()
}

fn decode_effects(arc: &str, raw: Vec<(String, i64)>) -> Result<EffectSet, CatalogError> {
    let mut effects = EffectSet::new();
    for (key, delta) in raw {
        let effect = Effect::from_key(&key).ok_or_else(|| CatalogError::UnknownEffect {
            arc: arc.to_string(),
            key: key.clone(),
        })?;
        effects = effects.with(effect, delta);
    }
    Ok(effects)
}

fn decode_prerequisite(arc: &str, key: String, value: RonValue) -> Result<Prerequisite, CatalogError> {
    let invalid = || CatalogError::InvalidPrerequisite {
        arc: arc.to_string(),
        key: key.clone(),
    };

    let prerequisite = match (key.as_str(), value) {
        ("age", RonValue::Int(v)) => Prerequisite::MinAge(u32::try_from(v).map_err(|_| invalid())?),
        ("wealth", RonValue::Int(v)) => Prerequisite::MinWealth(v),
        ("health", RonValue::Int(v)) => {
            Prerequisite::MinHealth(i32::try_from(v).map_err(|_| invalid())?)
        }
        ("role", RonValue::Text(tag)) => Prerequisite::Role(Role::from_tag(&tag).ok_or_else(invalid)?),
        ("gender", RonValue::Text(tag)) => {
            Prerequisite::Gender(Gender::from_tag(&tag).ok_or_else(invalid)?)
        }
        ("previous_arc", RonValue::Text(id)) => Prerequisite::CompletedArc(id),
        (k, RonValue::Int(v)) if k.starts_with("skill_") || k.starts_with("attribute_") => {
            let min = i32::try_from(v).map_err(|_| invalid())?;
            match Effect::from_key(k) {
                Some(Effect::Skill(name)) => Prerequisite::MinSkill { name, min },
                Some(Effect::Attribute(name)) => Prerequisite::MinAttribute { name, min },
                _ => return Err(invalid()),
            }
        }
        ("age" | "wealth" | "health" | "role" | "gender" | "previous_arc", _) => {
            return Err(invalid())
        }
        (k, _) if k.starts_with("skill_") || k.starts_with("attribute_") => return Err(invalid()),
        _ => {
            return Err(CatalogError::UnknownPrerequisite {
                arc: arc.to_string(),
                key: key.clone(),
            })
        }
    };
    Ok(prerequisite)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_CATALOG: &str = r#"(
        exclusion_groups: {
            "romance": ["affair", "courtship"],
        },
        arcs: [
            (
                id: "affair",
                title: "An Affair",
                roles: [],
                prerequisites: { "age": 18, "attribute_charisma": 40 },
                npc_affinity: Some(married),
                stages: [
                    (
                        title: "Temptation",
                        description: "A glance across the hall.",
                        effects: { "attribute_charisma": 2 },
                        choices: [
                            (text: "Return it", effects: { "health": -1, "wealth": 5 }, outcome: "You smile back."),
                            (text: "Look away", outcome: "You look away."),
                        ],
                    ),
                    (
                        title: "Rumours",
                        description: "People talk.",
                        conditional_events: [
                            (
                                condition: (stage: 0, choice: 0),
                                description: "People talk about you.",
                                choices: [(text: "Deny", outcome: "You deny it.")],
                            ),
                        ],
                        years_until_next: 2,
                    ),
                ],
            ),
            (
                id: "courtship",
                title: "A Courtship",
                role_restricted: true,
                roles: ["noble", "king"],
                prerequisites: { "previous_arc": "affair", "gender": "female" },
                repeatable: true,
                stages: [
                    (title: "Letters", description: "A letter arrives."),
                ],
            ),
        ],
    )"#;

    fn mini_arc_ron(stages: &str) -> String {
        format!(
            r#"(arcs: [(id: "a", title: "A", stages: [{stages}])])"#
        )
    }

    #[test]
    fn parse_mini_catalog() {
        let catalog = ArcCatalog::parse_ron(MINI_CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        let ids: Vec<_> = catalog.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["affair", "courtship"]);

        let affair = catalog.get("affair").unwrap();
        assert_eq!(affair.npc_affinity, Some(NpcAffinity::Married));
        assert_eq!(
            affair.prerequisites,
            vec![
                Prerequisite::MinAge(18),
                Prerequisite::MinAttribute {
                    name: "charisma".to_string(),
                    min: 40
                },
            ]
        );
        assert_eq!(affair.stages[0].years_until_next, 1);
        assert_eq!(affair.stages[1].years_until_next, 2);
        assert_eq!(affair.stages[1].branches.len(), 1);
    }

    #[test]
    fn effects_keep_authored_order() {
        let catalog = ArcCatalog::parse_ron(MINI_CATALOG).unwrap();
        let choice = &catalog.get("affair").unwrap().stages[0].choices[0];
        let keys: Vec<_> = choice.effects.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(keys, vec![Effect::Health, Effect::Wealth]);
    }

    #[test]
    fn roles_and_identity_prerequisites_decode() {
        let catalog = ArcCatalog::parse_ron(MINI_CATALOG).unwrap();
        let courtship = catalog.get("courtship").unwrap();
        assert!(courtship.role_restricted);
        assert_eq!(courtship.allowed_roles, vec![Role::Noble, Role::King]);
        assert!(courtship.repeatable);
        assert_eq!(
            courtship.prerequisites,
            vec![
                Prerequisite::CompletedArc("affair".to_string()),
                Prerequisite::Gender(Gender::Female),
            ]
        );
    }

    #[test]
    fn exclusion_groups_load() {
        let catalog = ArcCatalog::parse_ron(MINI_CATALOG).unwrap();
        assert_eq!(catalog.exclusion_groups().len(), 1);
        let groups: Vec<_> = catalog.groups_of("courtship").map(|g| g.name.as_str()).collect();
        assert_eq!(groups, vec!["romance"]);
        assert_eq!(catalog.groups_of("missing").count(), 0);
    }

    #[test]
    fn zero_delay_rejected() {
        let ron = mini_arc_ron(r#"(title: "S", description: "d", years_until_next: 0)"#);
        assert!(matches!(
            ArcCatalog::parse_ron(&ron),
            Err(CatalogError::ZeroDelay { stage: 0, .. })
        ));
    }

    #[test]
    fn forward_branch_rejected() {
        let ron = mini_arc_ron(
            r#"(title: "S", description: "d",
                choices: [(text: "x", outcome: "y")],
                conditional_events: [(condition: (stage: 0, choice: 0), description: "b")])"#,
        );
        assert!(matches!(
            ArcCatalog::parse_ron(&ron),
            Err(CatalogError::BranchNotReachable { stage: 0, referenced: 0, .. })
        ));
    }

    #[test]
    fn branch_on_missing_choice_rejected() {
        let ron = mini_arc_ron(
            r#"(title: "S0", description: "d", choices: [(text: "x", outcome: "y")]),
               (title: "S1", description: "d",
                conditional_events: [(condition: (stage: 0, choice: 3), description: "b")])"#,
        );
        assert!(matches!(
            ArcCatalog::parse_ron(&ron),
            Err(CatalogError::ChoiceOutOfRange { choice: 3, available: 1, .. })
        ));
    }

    #[test]
    fn branch_after_choiceless_stage_keys_on_history_slot() {
        // Stage 0 records nothing, so stage 1's pick lands in slot 0.
        let shifted = mini_arc_ron(
            r#"(title: "S0", description: "d"),
               (title: "S1", description: "d",
                choices: [(text: "x", outcome: "y"), (text: "z", outcome: "w")]),
               (title: "S2", description: "d",
                conditional_events: [(condition: (stage: 1, choice: 1), description: "b")])"#,
        );
        assert!(matches!(
            ArcCatalog::parse_ron(&shifted),
            Err(CatalogError::BranchNotReachable { stage: 2, referenced: 1, .. })
        ));

        let by_slot = shifted.replace("(stage: 1, choice: 1)", "(stage: 0, choice: 1)");
        let catalog = ArcCatalog::parse_ron(&by_slot).unwrap();
        let arc = catalog.get("a").unwrap();
        let mut instance = crate::core::instance::ArcInstance::new(Arc::clone(arc));
        instance.start().unwrap();
        instance.advance(None).unwrap();
        instance.advance(Some(1)).unwrap();
        assert_eq!(instance.choice_history(), &[1]);
        assert_eq!(instance.current_event().unwrap().description, "b");
    }

    #[test]
    fn branch_past_partial_branching_rejected() {
        // S1 only offers choices after S0 choice 0, so slot 1 is not fixed.
        let ron = mini_arc_ron(
            r#"(title: "S0", description: "d",
                choices: [(text: "x", outcome: "y"), (text: "z", outcome: "w")]),
               (title: "S1", description: "d",
                conditional_events: [(condition: (stage: 0, choice: 0), description: "b",
                    choices: [(text: "x", outcome: "y")])]),
               (title: "S2", description: "d",
                conditional_events: [(condition: (stage: 1, choice: 0), description: "b")])"#,
        );
        assert!(matches!(
            ArcCatalog::parse_ron(&ron),
            Err(CatalogError::UnsettledHistory { stage: 2, referenced: 1, unsettled: 1, .. })
        ));
    }

    #[test]
    fn unknown_effect_key_rejected() {
        let ron = mini_arc_ron(r#"(title: "S", description: "d", effects: { "fame": 3 })"#);
        assert!(matches!(
            ArcCatalog::parse_ron(&ron),
            Err(CatalogError::UnknownEffect { key, .. }) if key == "fame"
        ));
    }

    #[test]
    fn bad_prerequisites_rejected() {
        let unknown = r#"(arcs: [(id: "a", title: "A", prerequisites: { "luck": 3 },
            stages: [(title: "S", description: "d")])])"#;
        assert!(matches!(
            ArcCatalog::parse_ron(unknown),
            Err(CatalogError::UnknownPrerequisite { .. })
        ));

        let wrong_type = r#"(arcs: [(id: "a", title: "A", prerequisites: { "age": "old" },
            stages: [(title: "S", description: "d")])])"#;
        assert!(matches!(
            ArcCatalog::parse_ron(wrong_type),
            Err(CatalogError::InvalidPrerequisite { .. })
        ));
    }

    #[test]
    fn unknown_role_rejected() {
        let ron = r#"(arcs: [(id: "a", title: "A", role_restricted: true, roles: ["jester"],
            stages: [(title: "S", description: "d")])])"#;
        assert!(matches!(
            ArcCatalog::parse_ron(ron),
            Err(CatalogError::UnknownRole { role, .. }) if role == "jester"
        ));
    }

    #[test]
    fn empty_and_duplicate_arcs_rejected() {
        assert!(matches!(
            ArcCatalog::parse_ron(r#"(arcs: [(id: "a", title: "A", stages: [])])"#),
            Err(CatalogError::EmptyArc(id)) if id == "a"
        ));

        let dup = r#"(arcs: [
            (id: "a", title: "A", stages: [(title: "S", description: "d")]),
            (id: "a", title: "A again", stages: [(title: "S", description: "d")]),
        ])"#;
        assert!(matches!(
            ArcCatalog::parse_ron(dup),
            Err(CatalogError::DuplicateArc(id)) if id == "a"
        ));
    }

    #[test]
    fn unknown_group_member_rejected() {
        let ron = r#"(
            exclusion_groups: { "crime": ["a", "ghost"] },
            arcs: [(id: "a", title: "A", stages: [(title: "S", description: "d")])],
        )"#;
        assert!(matches!(
            ArcCatalog::parse_ron(ron),
            Err(CatalogError::UnknownGroupMember { arc, .. }) if arc == "ghost"
        ));
    }

    #[test]
    fn merge_overrides_and_unions_groups() {
        let mut base = ArcCatalog::parse_ron(MINI_CATALOG).unwrap();
        let extra = ArcCatalog::parse_ron(
            r#"(
                exclusion_groups: { "romance": ["elopement"] },
                arcs: [
                    (id: "affair", title: "A Different Affair", stages: [(title: "S", description: "d")]),
                    (id: "elopement", title: "Elopement", stages: [(title: "S", description: "d")]),
                ],
            )"#,
        )
        .unwrap();
        base.merge(extra);

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("affair").unwrap().title, "A Different Affair");
        let romance = &base.exclusion_groups()[0];
        assert_eq!(romance.members.len(), 3);
        assert!(romance.members.contains("elopement"));
    }

    #[test]
    fn load_test_catalog_from_ron() {
        let path = std::path::PathBuf::from("tests/fixtures/test_arcs.ron");
        let catalog = ArcCatalog::load_from_ron(&path).unwrap();
        assert!(catalog.contains("adultery"));
        assert!(catalog.contains("forbidden_romance"));
        assert!(!catalog.exclusion_groups().is_empty());
    }
}
