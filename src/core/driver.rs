/// Year driver — one simulated year: schedule, present, resolve.
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::core::manager::{ArcManager, ManagerError, Resolution};
use crate::core::presenter::Presenter;
use crate::schema::character::Character;
use crate::schema::event::EventError;

#[derive(Debug, Error)]
pub enum YearError {
    #[error("event error: {0}")]
    Event(#[from] EventError),
    #[error("manager error: {0}")]
    Manager(#[from] ManagerError),
}

/// What happened during one year that surfaced an arc event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearReport {
    pub arc_id: String,
    pub stage: usize,
    pub choice: Option<usize>,
    pub completed: bool,
}

/// Run the yearly arc pass for `character`.
///
/// The surfaced event (if any) is shown through `presenter`, its effects
/// are applied, and the manager is told the outcome. Returns `None` in a
/// quiet year.
pub fn run_year<R, P>(
    manager: &mut ArcManager<R>,
    character: &mut Character,
    presenter: &mut P,
) -> Result<Option<YearReport>, YearError>
where
    R: Rng,
    P: Presenter + ?Sized,
{
    let Some(surfaced) = manager.update_for_new_year(character) else {
        return Ok(None);
    };

    let choice = surfaced
        .event
        .execute(character, presenter, manager.rng_mut())?;
    let resolution = manager.resolve_outcome(&surfaced.arc_id, choice, character)?;
    debug!(arc = %surfaced.arc_id, stage = surfaced.stage, ?choice, "year resolved");

    Ok(Some(YearReport {
        arc_id: surfaced.arc_id,
        stage: surfaced.stage,
        choice,
        completed: resolution == Resolution::Completed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ArcCatalog;
    use crate::core::config::EngineConfig;
    use crate::core::presenter::ScriptedPresenter;
    use crate::schema::role::{Gender, Role};

    const CATALOG: &str = r#"(
        arcs: [
            Arc(
                id: "criminal_temptation",
                title: "Criminal Temptation",
                prerequisites: { "age": 18 },
                stages: [
                    Stage(
                        title: "An Offer",
                        description: "A shady character approaches you.",
                        choices: [
                            (text: "Accept", effects: { "wealth": 200 }, outcome: "Coin changes hands."),
                            (text: "Decline", outcome: "You walk away."),
                        ],
                    ),
                    Stage(
                        title: "Consequences",
                        description: "Your earlier choice catches up with you.",
                        effects: { "health": -10 },
                        conditional_events: [
                            (
                                condition: (stage: 0, choice: 0),
                                description: "The guards come knocking.",
                                choices: [
                                    (text: "Bribe them", effects: { "wealth": -150 }, outcome: "They look away."),
                                    (text: "Flee", effects: { "health": -20 }, outcome: "You escape, bruised."),
                                ],
                            ),
                        ],
                    ),
                ],
            ),
        ],
    )"#;

    fn manager() -> ArcManager {
        ArcManager::builder()
            .seed(3)
            .with_catalog(ArcCatalog::parse_ron(CATALOG).unwrap())
            .with_config(EngineConfig {
                start_probability: 1.0,
                ..EngineConfig::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn quiet_year_reports_nothing() {
        let mut m = manager();
        let mut youth = Character::new("Hal", Gender::Male, Role::Farmer, 17);
        let mut presenter = ScriptedPresenter::default();
        assert_eq!(run_year(&mut m, &mut youth, &mut presenter).unwrap(), None);
        assert!(presenter.transcript.is_empty());
    }

    #[test]
    fn branch_follows_earlier_choice_through_the_driver() {
        let mut m = manager();
        let mut c = Character::new("Hal", Gender::Male, Role::Farmer, 18);
        let mut presenter = ScriptedPresenter::new([0, 0]);

        let first = run_year(&mut m, &mut c, &mut presenter).unwrap().unwrap();
        assert_eq!(first.arc_id, "criminal_temptation");
        assert_eq!(first.choice, Some(0));
        assert!(!first.completed);
        assert_eq!(c.wealth, 200);

        let second = run_year(&mut m, &mut c, &mut presenter).unwrap().unwrap();
        assert_eq!(second.stage, 1);
        assert!(second.completed);
        assert_eq!(c.wealth, 50);
        assert!(presenter
            .transcript
            .iter()
            .any(|(_, body)| body == "The guards come knocking."));
        assert!(c.has_completed("criminal_temptation"));
        assert_eq!(m.cooldown("criminal_temptation"), 10);
    }

    #[test]
    fn bad_presenter_choice_leaves_arc_in_place() {
        let mut m = manager();
        let mut c = Character::new("Hal", Gender::Male, Role::Farmer, 18);
        let mut presenter = ScriptedPresenter::new([4]);

        let err = run_year(&mut m, &mut c, &mut presenter).unwrap_err();
        assert!(matches!(err, YearError::Event(EventError::ChoiceOutOfRange { index: 4, count: 2 })));
        let instance = m.instance("criminal_temptation").unwrap();
        assert_eq!(instance.current_stage(), 0);
        assert!(instance.choice_history().is_empty());
    }
}
