use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::character::Character;
use super::effect::EffectSet;
use crate::core::effects::apply_effects;
use crate::core::presenter::Presenter;

/// Prompt shown above an event's choice list.
pub const CHOICE_PROMPT: &str = "What will you do?";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("presenter returned choice {index} but the event offers {count}")]
    ChoiceOutOfRange { index: usize, count: usize },
}

/// One option the player can pick when an event offers choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub effects: EffectSet,
    pub outcome: String,
}

/// A displayable unit produced by an arc stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub effects: EffectSet,
    pub choices: Vec<Choice>,
}

impl Event {
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Present the event, collect a choice if there is one, and apply the
    /// resulting effects to the character.
    ///
    /// Returns the chosen index, or `None` for a choiceless event (whose
    /// base effects were applied instead).
    pub fn execute<P, R>(
        &self,
        character: &mut Character,
        presenter: &mut P,
        rng: &mut R,
    ) -> Result<Option<usize>, EventError>
    where
        P: Presenter + ?Sized,
        R: Rng + ?Sized,
    {
        presenter.display(&self.title, &self.description);

        if self.choices.is_empty() {
            apply_effects(character, &self.effects, rng);
            return Ok(None);
        }

        let options: Vec<&str> = self.choices.iter().map(|c| c.text.as_str()).collect();
        let index = presenter.choose(CHOICE_PROMPT, &options);
        let choice = self.choices.get(index).ok_or(EventError::ChoiceOutOfRange {
            index,
            count: self.choices.len(),
        })?;

        apply_effects(character, &choice.effects, rng);
        presenter.display(&format!("Outcome: {}", self.title), &choice.outcome);
        Ok(Some(index))
    }
}
