use crate::scheduler::Scheduler;
use std::{rc::Rc, time::Duration};

/// Browsers may report a crossing ratio a hair under the configured threshold.
const RATIO_TOLERANCE: f64 = 0.01;
const COUNTER_PLUS_ABOVE: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    pub is_intersecting: bool,
    pub ratio: f64,
}

type RevealCallback<E> = Box<dyn FnOnce(&E)>;

/// One-shot visibility trigger. Each observed element fires its callback the
/// first time it is at least `threshold` visible and is then forgotten.
pub struct RevealObserver<E> {
    threshold: f64,
    pending: Vec<(E, RevealCallback<E>)>,
}

impl<E: PartialEq> RevealObserver<E> {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            pending: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn observe(&mut self, element: E, on_reveal: impl FnOnce(&E) + 'static) {
        self.pending.push((element, Box::new(on_reveal)));
    }

    /// Feeds visibility changes in. Returns the elements revealed by this
    /// batch so the caller can stop watching them.
    pub fn handle_entries<I>(&mut self, entries: I) -> Vec<E>
    where
        I: IntoIterator<Item = (E, Visibility)>,
    {
        let mut revealed = Vec::new();

        for (element, visibility) in entries {
            if !self.is_revealing(visibility) {
                continue;
            }

            let Some(position) = self.pending.iter().position(|(pending, _)| *pending == element)
            else {
                continue;
            };

            let (element, on_reveal) = self.pending.remove(position);
            on_reveal(&element);
            revealed.push(element);
        }

        revealed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn is_revealing(&self, visibility: Visibility) -> bool {
        visibility.is_intersecting && visibility.ratio + RATIO_TOLERANCE >= self.threshold
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CounterFrame {
    Running(String),
    Finished(String),
}

/// Count-up from zero to `target` in fixed per-frame increments.
#[derive(Clone, Debug)]
pub struct CounterAnimation {
    target: i64,
    increment: f64,
    current: f64,
}

impl CounterAnimation {
    pub fn new(target: i64, duration: Duration, frame: Duration) -> Self {
        let frames = if frame.is_zero() {
            1.0
        } else {
            (duration.as_secs_f64() / frame.as_secs_f64()).max(1.0)
        };

        Self {
            target,
            increment: target as f64 / frames,
            current: 0.0,
        }
    }

    pub fn step(&mut self) -> CounterFrame {
        self.current += self.increment;

        if self.current < self.target as f64 {
            CounterFrame::Running(format!("{}", self.current.ceil() as i64))
        } else {
            CounterFrame::Finished(final_counter_text(self.target))
        }
    }
}

pub fn final_counter_text(target: i64) -> String {
    if target > COUNTER_PLUS_ABOVE {
        format!("{target}+")
    } else {
        target.to_string()
    }
}

/// Runs the first step now and every following step on the next frame until
/// the counter finishes.
pub fn run_counter(
    scheduler: Rc<dyn Scheduler>,
    mut animation: CounterAnimation,
    render: Rc<dyn Fn(&str)>,
) {
    match animation.step() {
        CounterFrame::Running(text) => {
            render(&text);
            let next_scheduler = Rc::clone(&scheduler);
            let _ = scheduler.request_frame(Box::new(move || {
                run_counter(next_scheduler, animation, render)
            }));
        }
        CounterFrame::Finished(text) => render(&text),
    }
}

/// Leading integer of a `data-count` value (`"120+"` reads as 120).
pub fn parse_count(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|(index, ch)| !(ch.is_ascii_digit() || (*index == 0 && matches!(ch, '-' | '+'))))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());

    trimmed[..end].parse().ok()
}

/// Width style for a `data-progress` value, clamped to 0..=100.
pub fn skill_bar_width(raw: &str) -> Option<String> {
    let progress = raw.trim().trim_end_matches('%').parse::<f64>().ok()?;
    if !progress.is_finite() {
        return None;
    }

    Some(format!("{}%", progress.clamp(0.0, 100.0)))
}

pub fn reveal_skill_bar(
    scheduler: &dyn Scheduler,
    delay: Duration,
    width: String,
    apply: impl FnOnce(&str) + 'static,
) {
    let _ = scheduler.set_timeout(delay, Box::new(move || apply(&width)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualScheduler;
    use std::cell::{Cell, RefCell};

    const VISIBLE: Visibility = Visibility {
        is_intersecting: true,
        ratio: 0.5,
    };
    const HIDDEN: Visibility = Visibility {
        is_intersecting: false,
        ratio: 0.0,
    };

    #[test]
    fn reveal_fires_once_across_visibility_changes() {
        let mut observer = RevealObserver::new(0.3);
        let fired = Rc::new(Cell::new(0));
        {
            let fired = fired.clone();
            observer.observe("stat", move |_| fired.set(fired.get() + 1));
        }

        assert!(observer.handle_entries([("stat", HIDDEN)]).is_empty());
        assert_eq!(observer.handle_entries([("stat", VISIBLE)]), vec!["stat"]);
        observer.handle_entries([("stat", HIDDEN), ("stat", VISIBLE), ("stat", VISIBLE)]);

        assert_eq!(fired.get(), 1);
        assert_eq!(observer.pending(), 0);
    }

    #[test]
    fn partial_visibility_below_threshold_does_not_reveal() {
        let mut observer = RevealObserver::new(0.3);
        let fired = Rc::new(Cell::new(false));
        {
            let fired = fired.clone();
            observer.observe(7, move |_| fired.set(true));
        }

        let sliver = Visibility {
            is_intersecting: true,
            ratio: 0.1,
        };
        observer.handle_entries([(7, sliver)]);
        assert!(!fired.get());

        let edge = Visibility {
            is_intersecting: true,
            ratio: 0.295,
        };
        assert_eq!(observer.handle_entries([(7, edge)]), vec![7]);
        assert!(fired.get());
    }

    #[test]
    fn other_elements_stay_armed() {
        let mut observer = RevealObserver::new(0.3);
        observer.observe("a", |_| {});
        observer.observe("b", |_| {});

        observer.handle_entries([("a", VISIBLE)]);
        assert_eq!(observer.pending(), 1);
    }

    #[test]
    fn counter_final_text_gets_plus_only_above_ten() {
        assert_eq!(final_counter_text(10), "10");
        assert_eq!(final_counter_text(11), "11+");
        assert_eq!(final_counter_text(0), "0");
        assert_eq!(final_counter_text(-3), "-3");
    }

    #[test]
    fn counter_counts_up_over_frames_and_lands_on_target() {
        let scheduler = ManualScheduler::new();
        let frames = Rc::new(RefCell::new(Vec::<String>::new()));
        let render: Rc<dyn Fn(&str)> = {
            let frames = frames.clone();
            Rc::new(move |text: &str| frames.borrow_mut().push(text.to_string()))
        };

        let animation =
            CounterAnimation::new(50, Duration::from_millis(1_500), Duration::from_millis(16));
        run_counter(Rc::new(scheduler.clone()), animation, render);
        assert_eq!(frames.borrow().len(), 1, "first step renders synchronously");

        while scheduler.pending_frames() > 0 {
            scheduler.render_frame();
        }

        let frames = frames.borrow();
        assert_eq!(frames.last().map(String::as_str), Some("50+"));
        // 1500 / 16 = 93.75 increments, so the target is reached on step 94.
        assert_eq!(frames.len(), 94);
        let numbers: Vec<i64> = frames[..frames.len() - 1]
            .iter()
            .map(|text| text.parse().expect("intermediate frames are plain integers"))
            .collect();
        assert!(numbers.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(numbers.iter().all(|value| *value <= 50));
    }

    #[test]
    fn zero_target_finishes_immediately() {
        let mut animation =
            CounterAnimation::new(0, Duration::from_millis(1_500), Duration::from_millis(16));
        assert_eq!(animation.step(), CounterFrame::Finished("0".to_string()));
    }

    #[test]
    fn parse_count_reads_leading_integer() {
        assert_eq!(parse_count("150"), Some(150));
        assert_eq!(parse_count(" 120+ "), Some(120));
        assert_eq!(parse_count("-4"), Some(-4));
        assert_eq!(parse_count("many"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn skill_bar_width_formats_and_clamps() {
        assert_eq!(skill_bar_width("85").as_deref(), Some("85%"));
        assert_eq!(skill_bar_width("92.5%").as_deref(), Some("92.5%"));
        assert_eq!(skill_bar_width("140").as_deref(), Some("100%"));
        assert_eq!(skill_bar_width("full"), None);
    }

    #[test]
    fn skill_bar_applies_width_after_delay() {
        let scheduler = ManualScheduler::new();
        let width = Rc::new(RefCell::new(String::from("0%")));
        {
            let width = width.clone();
            let delay = Duration::from_millis(100);
            reveal_skill_bar(&scheduler, delay, "70%".to_string(), move |value| {
                *width.borrow_mut() = value.to_string()
            });
        }

        scheduler.advance(Duration::from_millis(99));
        assert_eq!(*width.borrow(), "0%");
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*width.borrow(), "70%");
    }
}
