use crate::{
    error::{SiteError, SiteResult},
    notification::{DismissHandle, ToastId, ToastKind, ToastMessage, ToastView},
};
use std::cell::RefCell;
use web_sys::{Document, MouseEvent};
use yew::{prelude::*, AppHandle};

const TOAST_KEYFRAMES: &str = r#"
    @keyframes slideInRight  { from { transform: translateX(100%); opacity: 0; } to { transform: translateX(0); opacity: 1; } }
    @keyframes slideOutRight { from { transform: translateX(0); opacity: 1; } to { transform: translateX(100%); opacity: 0; } }
    .notification-close { background: none; border: none; color: white; font-size: 1.5rem; cursor: pointer; padding: 0; line-height: 1; }
"#;

#[derive(Clone, PartialEq)]
pub struct ToastSnapshot {
    id: ToastId,
    text: AttrValue,
    kind: ToastKind,
    leaving: bool,
    on_close: Callback<()>,
}

#[derive(Properties, PartialEq, Default)]
pub struct ToastLayerProps {
    #[prop_or_default]
    pub toast: Option<ToastSnapshot>,
}

fn toast_style(kind: ToastKind, leaving: bool) -> String {
    let animation = if leaving { "slideOutRight" } else { "slideInRight" };
    format!(
        "position: fixed; top: 20px; right: 20px; padding: 1rem 1.5rem; \
         background: {}; color: white; border-radius: 10px; display: flex; \
         align-items: center; gap: 1rem; z-index: 10000; animation: {animation} 0.3s ease; \
         box-shadow: 0 10px 40px rgba(0,0,0,0.3); backdrop-filter: blur(10px); max-width: 400px;",
        kind.background()
    )
}

#[function_component(ToastLayer)]
pub fn toast_layer(props: &ToastLayerProps) -> Html {
    let Some(toast) = props.toast.as_ref() else {
        return html! {};
    };

    let onclick = {
        let on_close = toast.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div
            key={toast.id.to_string()}
            class="notification"
            role="status"
            aria-live="polite"
            style={toast_style(toast.kind, toast.leaving)}
        >
            <i class={classes!("bi", format!("bi-{}", toast.kind.icon()))} aria-hidden="true"></i>
            <span>{toast.text.clone()}</span>
            <button
                class="notification-close"
                type="button"
                aria-label="Dismiss notification"
                onclick={onclick}
            >
                {"×"}
            </button>
        </div>
    }
}

/// Renders the notification center's single toast through a Yew app mounted
/// at the end of `<body>`.
pub struct YewToastView {
    handle: RefCell<AppHandle<ToastLayer>>,
    current: RefCell<Option<ToastSnapshot>>,
}

impl YewToastView {
    pub fn mount(document: &Document) -> SiteResult<Self> {
        install_keyframes(document)?;

        let host = document.create_element("div")?;
        host.set_class_name("notification-host");
        document
            .body()
            .ok_or(SiteError::MissingElement("body"))?
            .append_child(&host)?;

        let handle = yew::Renderer::<ToastLayer>::with_root(host).render();

        Ok(Self {
            handle: RefCell::new(handle),
            current: RefCell::new(None),
        })
    }

    fn publish(&self) {
        let toast = self.current.borrow().clone();
        self.handle.borrow_mut().update(ToastLayerProps { toast });
    }
}

impl ToastView for YewToastView {
    fn show(&self, toast: &ToastMessage, dismiss: DismissHandle) {
        *self.current.borrow_mut() = Some(ToastSnapshot {
            id: toast.id,
            text: AttrValue::from(toast.text.clone()),
            kind: toast.kind,
            leaving: false,
            on_close: Callback::from(move |_| dismiss.dismiss()),
        });
        self.publish();
    }

    fn begin_exit(&self, id: ToastId) {
        if let Some(current) = self
            .current
            .borrow_mut()
            .as_mut()
            .filter(|current| current.id == id)
        {
            current.leaving = true;
        }
        self.publish();
    }

    fn remove(&self, id: ToastId) {
        {
            let mut current = self.current.borrow_mut();
            if current.as_ref().is_some_and(|current| current.id == id) {
                *current = None;
            }
        }
        self.publish();
    }
}

fn install_keyframes(document: &Document) -> SiteResult<()> {
    let style = document.create_element("style")?;
    style.set_text_content(Some(TOAST_KEYFRAMES));
    document
        .head()
        .ok_or(SiteError::MissingElement("head"))?
        .append_child(&style)?;
    Ok(())
}
