use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;

/// Deferred work on the page's single event loop.
///
/// The browser implementation wraps `setTimeout` and `requestAnimationFrame`;
/// tests drive a manual clock instead so time can be simulated.
pub trait Scheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskHandle;

    fn request_frame(&self, task: Task) -> TaskHandle;

    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Handle to a pending task. Dropping the handle detaches the task; only
/// [`TaskHandle::cancel`] prevents it from running.
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TaskHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
