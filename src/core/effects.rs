/// Effect application — turns decoded stat deltas into character changes.
use rand::seq::SliceRandom;
use rand::Rng;

use crate::schema::character::{Character, STAT_MAX};
use crate::schema::effect::{Effect, EffectSet};

/// Apply every delta in `effects` to the character, in declaration order.
///
/// Health, skills and attributes clamp to `[0, 100]`; wealth clamps at 0
/// with no upper bound. Named skills or attributes the character does not
/// have are skipped. Random picks draw from the character's current set.
pub fn apply_effects<R: Rng + ?Sized>(character: &mut Character, effects: &EffectSet, rng: &mut R) {
    for (effect, delta) in effects.iter() {
        apply_one(character, effect, *delta, rng);
    }
}

fn apply_one<R: Rng + ?Sized>(character: &mut Character, effect: &Effect, delta: i64, rng: &mut R) {
    match effect {
        Effect::Health => character.health = clamp_stat(character.health, delta),
        Effect::Wealth => character.wealth = character.wealth.saturating_add(delta).max(0),
        Effect::Skill(name) => {
            if let Some(value) = character.skill_mut(name) {
                *value = clamp_stat(*value, delta);
            }
        }
        Effect::Attribute(name) => {
            if let Some(value) = character.attribute_mut(name) {
                *value = clamp_stat(*value, delta);
            }
        }
        Effect::RandomSkill => {
            if let Some((_, value)) = character.skills.choose_mut(rng) {
                *value = clamp_stat(*value, delta);
            }
        }
        Effect::RandomAttribute => {
            if let Some((_, value)) = character.attributes.choose_mut(rng) {
                *value = clamp_stat(*value, delta);
            }
        }
    }
}

fn clamp_stat(current: i32, delta: i64) -> i32 {
    (i64::from(current) + delta).clamp(0, i64::from(STAT_MAX)) as i32
}
