use crate::scheduler::Scheduler;
use std::{cell::Cell, rc::Rc};

/// Coalesces high-frequency events (scroll, resize) so the wrapped callback
/// runs at most once per rendered frame.
#[derive(Clone)]
pub struct ScrollGate {
    inner: Rc<GateInner>,
}

struct GateInner {
    scheduler: Rc<dyn Scheduler>,
    pending: Cell<bool>,
    callback: Box<dyn Fn()>,
}

impl ScrollGate {
    pub fn new(scheduler: Rc<dyn Scheduler>, callback: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(GateInner {
                scheduler,
                pending: Cell::new(false),
                callback: Box::new(callback),
            }),
        }
    }

    /// Call on every raw event.
    pub fn on_event(&self) {
        if self.inner.pending.replace(true) {
            return;
        }

        let inner = Rc::clone(&self.inner);
        let _ = self.inner.scheduler.request_frame(Box::new(move || {
            (inner.callback)();
            inner.pending.set(false);
        }));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }
}

/// Wraps `callback` into an event handler gated on animation frames.
pub fn gate(scheduler: Rc<dyn Scheduler>, callback: impl Fn() + 'static) -> impl Fn() {
    let gate = ScrollGate::new(scheduler, callback);
    move || gate.on_event()
}

/// Class toggles (`scrolled`, `visible`) switch on strictly past their offset.
pub fn is_past(scroll_offset: f64, threshold: f64) -> bool {
    scroll_offset > threshold
}

/// The section whose top (minus `lookahead`) has been scrolled past last, in
/// document order.
pub fn active_section<'a, I>(scroll_offset: f64, lookahead: f64, sections: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    sections
        .into_iter()
        .filter(|(_, top)| scroll_offset >= top - lookahead)
        .map(|(id, _)| id)
        .last()
}

/// `href` a navigation link must carry to be marked active. With no active
/// section this is a bare `#`.
pub fn active_link_href(section: Option<&str>) -> String {
    format!("#{}", section.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualScheduler;

    #[test]
    fn rapid_events_run_callback_once_per_frame() {
        let scheduler = ManualScheduler::new();
        let runs = Rc::new(Cell::new(0));
        let handler = {
            let runs = runs.clone();
            gate(Rc::new(scheduler.clone()), move || runs.set(runs.get() + 1))
        };

        for _ in 0..100 {
            handler();
        }
        assert_eq!(runs.get(), 0);
        assert_eq!(scheduler.pending_frames(), 1);

        scheduler.render_frame();
        assert_eq!(runs.get(), 1);

        scheduler.render_frame();
        assert_eq!(runs.get(), 1, "no events, no extra run");
    }

    #[test]
    fn gate_rearms_after_the_frame_runs() {
        let scheduler = ManualScheduler::new();
        let runs = Rc::new(Cell::new(0));
        let gate = {
            let runs = runs.clone();
            ScrollGate::new(Rc::new(scheduler.clone()), move || runs.set(runs.get() + 1))
        };

        gate.on_event();
        assert!(gate.is_pending());
        scheduler.render_frame();
        assert!(!gate.is_pending());

        gate.on_event();
        gate.on_event();
        scheduler.render_frame();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn active_section_picks_last_section_within_lookahead() {
        let sections = [("home", 0.0), ("about", 600.0), ("projects", 1400.0)];

        assert_eq!(active_section(0.0, 150.0, sections), Some("home"));
        assert_eq!(active_section(449.0, 150.0, sections), Some("home"));
        assert_eq!(active_section(450.0, 150.0, sections), Some("about"));
        assert_eq!(active_section(5000.0, 150.0, sections), Some("projects"));
        assert_eq!(active_section(0.0, 150.0, [("late", 400.0)]), None);
    }

    #[test]
    fn offsets_toggle_strictly_past_threshold() {
        assert!(!is_past(100.0, 100.0));
        assert!(is_past(100.5, 100.0));
        assert!(!is_past(0.0, 300.0));
    }

    #[test]
    fn active_link_href_prefixes_hash() {
        assert_eq!(active_link_href(Some("about")), "#about");
        assert_eq!(active_link_href(None), "#");
    }
}
