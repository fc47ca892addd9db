/// Presentation seam — the engine never renders, it asks a presenter.
use std::collections::VecDeque;

/// Anything that can show text to the player and collect a menu choice.
///
/// `choose` blocks until the player picks; it must return an index into
/// `options`.
pub trait Presenter {
    fn display(&mut self, title: &str, body: &str);
    fn choose(&mut self, prompt: &str, options: &[&str]) -> usize;
}

/// Presenter that replays a fixed queue of choices and records everything
/// it was asked to show. Used by tests, demos and headless simulations.
///
/// When the queue runs dry it picks option 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresenter {
    choices: VecDeque<usize>,
    pub transcript: Vec<(String, String)>,
    pub prompts: Vec<(String, Vec<String>)>,
}

impl ScriptedPresenter {
    pub fn new(choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            transcript: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn push_choice(&mut self, index: usize) {
        self.choices.push_back(index);
    }
}

impl Presenter for ScriptedPresenter {
    fn display(&mut self, title: &str, body: &str) {
        self.transcript.push((title.to_string(), body.to_string()));
    }

    fn choose(&mut self, prompt: &str, options: &[&str]) -> usize {
        self.prompts.push((
            prompt.to_string(),
            options.iter().map(|o| o.to_string()).collect(),
        ));
        self.choices.pop_front().unwrap_or(0)
    }
}
