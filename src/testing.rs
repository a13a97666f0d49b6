use crate::scheduler::{Scheduler, Task, TaskHandle};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
    time::Duration,
};

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<(Duration, u64), Task>,
    frames: Vec<(u64, Task)>,
}

/// Virtual clock: timers fire on [`ManualScheduler::advance`], frame callbacks
/// on [`ManualScheduler::render_frame`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;

        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target);
                due.and_then(|key| {
                    state.now = key.0;
                    state.timers.remove(&key)
                })
            };

            match next {
                Some(task) => task(),
                None => break,
            }
        }

        self.state.borrow_mut().now = target;
    }

    pub fn render_frame(&self) {
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        for (_, task) in frames {
            task();
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    fn allocate_id(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskHandle {
        let id = self.allocate_id();
        let key = (self.state.borrow().now + delay, id);
        self.state.borrow_mut().timers.insert(key, task);

        let state = Rc::downgrade(&self.state);
        TaskHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().timers.remove(&key);
            }
        })
    }

    fn request_frame(&self, task: Task) -> TaskHandle {
        let id = self.allocate_id();
        self.state.borrow_mut().frames.push((id, task));

        let state = Rc::downgrade(&self.state);
        TaskHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().frames.retain(|(frame_id, _)| *frame_id != id);
            }
        })
    }

    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}
