use crate::{
    config::SiteConfig,
    error::{SiteError, SiteResult},
    scheduler::Scheduler,
};
use std::{cell::RefCell, rc::Rc, time::Duration};

/// Where the rendered text goes.
pub trait TypingView {
    fn render(&self, text: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingPhase {
    Typing,
    PausingFull,
    Deleting,
    PausingEmpty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingTimings {
    pub tick: Duration,
    pub pause_full: Duration,
    pub pause_empty: Duration,
}

impl TypingTimings {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            tick: config.typing_tick,
            pause_full: config.typing_pause_full,
            pause_empty: config.typing_pause_empty,
        }
    }

    /// Deleting runs at twice the typing speed.
    fn delete_tick(&self) -> Duration {
        self.tick / 2
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingState {
    word_list: Vec<String>,
    current_word_index: usize,
    current_text: String,
    phase: TypingPhase,
}

impl TypingState {
    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn deleting(&self) -> bool {
        matches!(self.phase, TypingPhase::PausingFull | TypingPhase::Deleting)
    }

    pub fn phase(&self) -> TypingPhase {
        self.phase
    }

    fn current_word(&self) -> &str {
        &self.word_list[self.current_word_index % self.word_list.len()]
    }
}

/// Types and deletes phrases from a rotating list, forever.
pub struct TypingAnimator<V> {
    state: TypingState,
    timings: TypingTimings,
    view: V,
}

impl<V: TypingView + 'static> TypingAnimator<V> {
    pub fn new(words: Vec<String>, timings: TypingTimings, view: V) -> SiteResult<Self> {
        if words.is_empty() {
            return Err(SiteError::EmptyPhraseList);
        }

        Ok(Self {
            state: TypingState {
                word_list: words,
                current_word_index: 0,
                current_text: String::new(),
                phase: TypingPhase::Typing,
            },
            timings,
            view,
        })
    }

    pub fn state(&self) -> &TypingState {
        &self.state
    }

    /// Advances one character, renders, and returns the delay before the next
    /// step.
    pub fn step(&mut self) -> Duration {
        let full_len = self.state.current_word().chars().count();
        let typed = self.state.current_text.chars().count();
        let deleting = self.state.deleting();

        let next_len = if deleting {
            typed.saturating_sub(1)
        } else {
            (typed + 1).min(full_len)
        };
        self.state.current_text = self.state.current_word().chars().take(next_len).collect();
        self.view.render(&self.state.current_text);

        if !deleting && next_len == full_len {
            self.state.phase = TypingPhase::PausingFull;
            self.timings.pause_full
        } else if deleting && next_len == 0 {
            self.state.current_word_index =
                (self.state.current_word_index + 1) % self.state.word_list.len();
            self.state.phase = TypingPhase::PausingEmpty;
            log::debug!("typing advanced to phrase {}", self.state.current_word_index);
            self.timings.pause_empty
        } else if deleting {
            self.state.phase = TypingPhase::Deleting;
            self.timings.delete_tick()
        } else {
            self.state.phase = TypingPhase::Typing;
            self.timings.tick
        }
    }

    /// Runs the first step now and keeps rescheduling itself for the rest of
    /// the page's life.
    pub fn start(self, scheduler: Rc<dyn Scheduler>) {
        schedule_step(Rc::new(RefCell::new(self)), scheduler);
    }
}

fn schedule_step<V: TypingView + 'static>(
    animator: Rc<RefCell<TypingAnimator<V>>>,
    scheduler: Rc<dyn Scheduler>,
) {
    let delay = animator.borrow_mut().step();
    let next_scheduler = Rc::clone(&scheduler);
    let _ = scheduler.set_timeout(
        delay,
        Box::new(move || schedule_step(animator, next_scheduler)),
    );
}
