use crate::{
    config::SiteConfig,
    scheduler::{Scheduler, TaskHandle},
};
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    /// Unknown kinds fall back to info.
    pub fn from_str(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Error => "exclamation-circle",
            Self::Info => "info-circle",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Self::Success => "rgba(34, 197, 94, 0.9)",
            Self::Error => "rgba(239, 68, 68, 0.9)",
            Self::Info => "rgba(59, 130, 246, 0.9)",
        }
    }
}

pub type ToastId = u64;

#[derive(Clone, Debug, PartialEq)]
pub struct ToastMessage {
    pub id: ToastId,
    pub text: String,
    pub kind: ToastKind,
    pub created_at: Duration,
}

/// Close affordance handed to the view with each toast.
#[derive(Clone)]
pub struct DismissHandle(Rc<dyn Fn()>);

impl DismissHandle {
    pub fn dismiss(&self) {
        (self.0)()
    }
}

impl PartialEq for DismissHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for DismissHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DismissHandle")
    }
}

/// Rendering side of the notification center. Implementations must not call
/// back into the center synchronously.
pub trait ToastView {
    fn show(&self, toast: &ToastMessage, dismiss: DismissHandle);
    fn begin_exit(&self, id: ToastId);
    fn remove(&self, id: ToastId);
}

/// Anything that can put a message in front of the user.
pub trait Notify {
    fn notify(&self, text: &str, kind: ToastKind);
}

struct LiveToast {
    message: ToastMessage,
    auto_dismiss: Option<TaskHandle>,
    removal: Option<TaskHandle>,
    leaving: bool,
}

impl LiveToast {
    fn cancel_timers(self) {
        if let Some(handle) = self.auto_dismiss {
            handle.cancel();
        }
        if let Some(handle) = self.removal {
            handle.cancel();
        }
    }
}

struct CenterInner<V> {
    scheduler: Rc<dyn Scheduler>,
    view: V,
    display_for: Duration,
    exit_after: Duration,
    next_id: Cell<ToastId>,
    current: RefCell<Option<LiveToast>>,
}

/// Shows one toast at a time. A new message always replaces the current one.
pub struct NotificationCenter<V> {
    inner: Rc<CenterInner<V>>,
}

impl<V> Clone for NotificationCenter<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: ToastView + 'static> NotificationCenter<V> {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        view: V,
        display_for: Duration,
        exit_after: Duration,
    ) -> Self {
        Self {
            inner: Rc::new(CenterInner {
                scheduler,
                view,
                display_for,
                exit_after,
                next_id: Cell::new(0),
                current: RefCell::new(None),
            }),
        }
    }

    pub fn from_config(scheduler: Rc<dyn Scheduler>, view: V, config: &SiteConfig) -> Self {
        Self::new(scheduler, view, config.toast_duration, config.toast_exit)
    }

    pub fn show(&self, text: &str, kind: ToastKind) -> ToastId {
        self.inner.show(text, kind)
    }

    pub fn dismiss(&self, id: ToastId) {
        self.inner.dismiss(id);
    }

    pub fn current(&self) -> Option<ToastMessage> {
        self.inner
            .current
            .borrow()
            .as_ref()
            .map(|live| live.message.clone())
    }

    pub fn is_leaving(&self) -> bool {
        self.inner
            .current
            .borrow()
            .as_ref()
            .is_some_and(|live| live.leaving)
    }
}

impl<V: ToastView + 'static> Notify for NotificationCenter<V> {
    fn notify(&self, text: &str, kind: ToastKind) {
        self.show(text, kind);
    }
}

impl<V: ToastView + 'static> CenterInner<V> {
    fn show(self: &Rc<Self>, text: &str, kind: ToastKind) -> ToastId {
        let evicted = self.current.borrow_mut().take();
        if let Some(live) = evicted {
            let evicted_id = live.message.id;
            live.cancel_timers();
            self.view.remove(evicted_id);
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let message = ToastMessage {
            id,
            text: text.to_string(),
            kind,
            created_at: self.scheduler.now(),
        };

        let weak = Rc::downgrade(self);
        let auto_dismiss = self.scheduler.set_timeout(
            self.display_for,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dismiss(id);
                }
            }),
        );

        *self.current.borrow_mut() = Some(LiveToast {
            message: message.clone(),
            auto_dismiss: Some(auto_dismiss),
            removal: None,
            leaving: false,
        });

        log::debug!("toast {id} shown ({})", kind.as_str());
        self.view.show(&message, self.dismiss_handle(id));
        id
    }

    fn dismiss(self: &Rc<Self>, id: ToastId) {
        let auto_dismiss = {
            let mut current = self.current.borrow_mut();
            let Some(live) = current
                .as_mut()
                .filter(|live| live.message.id == id && !live.leaving)
            else {
                return;
            };
            live.leaving = true;
            live.auto_dismiss.take()
        };

        if let Some(handle) = auto_dismiss {
            handle.cancel();
        }

        let weak = Rc::downgrade(self);
        let removal = self.scheduler.set_timeout(
            self.exit_after,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.finish_removal(id);
                }
            }),
        );

        if let Some(live) = self
            .current
            .borrow_mut()
            .as_mut()
            .filter(|live| live.message.id == id)
        {
            live.removal = Some(removal);
        }

        log::debug!("toast {id} dismissed");
        self.view.begin_exit(id);
    }

    fn finish_removal(&self, id: ToastId) {
        let removed = {
            let mut current = self.current.borrow_mut();
            if current.as_ref().is_some_and(|live| live.message.id == id) {
                current.take()
            } else {
                None
            }
        };

        if removed.is_some() {
            self.view.remove(id);
        }
    }

    fn dismiss_handle(self: &Rc<Self>, id: ToastId) -> DismissHandle {
        let weak: Weak<Self> = Rc::downgrade(self);
        DismissHandle(Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.dismiss(id);
            }
        }))
    }
}
