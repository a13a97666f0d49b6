use crate::{
    contact::{
        find_cookie, ContactFields, ContactFormView, ContactRequest, ContactTransport,
        TransportResponse,
    },
    error::{SiteError, SiteResult},
    reveal::{RevealObserver, Visibility},
    scheduler::{Scheduler, Task, TaskHandle},
    typing::TypingView,
};
use gloo_net::http::Request;
use js_sys::{decode_uri_component, Array, Date};
use std::{cell::RefCell, rc::Rc, time::Duration};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlButtonElement,
    HtmlDocument, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior,
    ScrollToOptions,
};

fn millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// `setTimeout` / `requestAnimationFrame` on the page window.
pub struct WindowScheduler;

impl Scheduler for WindowScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskHandle {
        let Some(win) = window() else {
            return TaskHandle::noop();
        };

        let callback = Closure::once_into_js(move || task());
        match win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis(delay),
        ) {
            Ok(id) => TaskHandle::new(move || {
                if let Some(win) = window() {
                    win.clear_timeout_with_handle(id);
                }
            }),
            Err(error) => {
                log::warn!("setTimeout failed: {}", SiteError::from(error));
                TaskHandle::noop()
            }
        }
    }

    fn request_frame(&self, task: Task) -> TaskHandle {
        let Some(win) = window() else {
            return TaskHandle::noop();
        };

        let callback = Closure::once_into_js(move || task());
        match win.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => TaskHandle::new(move || {
                if let Some(win) = window() {
                    let _ = win.cancel_animation_frame(id);
                }
            }),
            Err(error) => {
                log::warn!("requestAnimationFrame failed: {}", SiteError::from(error));
                TaskHandle::noop()
            }
        }
    }

    fn now(&self) -> Duration {
        Duration::from_secs_f64(Date::now().max(0.0) / 1_000.0)
    }
}

pub struct ElementText(pub Element);

impl TypingView for ElementText {
    fn render(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn offset_top(element: &Element) -> f64 {
    element
        .dyn_ref::<HtmlElement>()
        .map(|element| f64::from(element.offset_top()))
        .unwrap_or(0.0)
}

pub fn scroll_offset() -> f64 {
    window()
        .and_then(|win| win.page_y_offset().ok())
        .unwrap_or(0.0)
}

pub fn viewport_width() -> f64 {
    window()
        .and_then(|win| win.inner_width().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0)
}

pub fn smooth_scroll_to(top: f64) {
    if let Some(win) = window() {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        win.scroll_to_with_scroll_to_options(&options);
    }
}

/// Attaches a page-lifetime listener.
pub fn listen(
    target: &EventTarget,
    event: &str,
    passive: bool,
    handler: impl FnMut(Event) + 'static,
) -> SiteResult<()> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.as_ref().unchecked_ref(),
        &options,
    )?;
    callback.forget();
    Ok(())
}

/// [`RevealObserver`] fed by a browser `IntersectionObserver`.
pub struct DomRevealObserver {
    state: Rc<RefCell<RevealObserver<Element>>>,
    observer: IntersectionObserver,
}

impl DomRevealObserver {
    pub fn new(threshold: f64) -> SiteResult<Self> {
        let state = Rc::new(RefCell::new(RevealObserver::new(threshold)));

        let callback = {
            let state = Rc::clone(&state);
            Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
                move |entries: Array, observer: IntersectionObserver| {
                    let batch = entries
                        .iter()
                        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                        .map(|entry| {
                            let visibility = Visibility {
                                is_intersecting: entry.is_intersecting(),
                                ratio: entry.intersection_ratio(),
                            };
                            (entry.target(), visibility)
                        })
                        .collect::<Vec<_>>();

                    let revealed = state.borrow_mut().handle_entries(batch);
                    for element in revealed {
                        observer.unobserve(&element);
                    }
                },
            )
        };

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        callback.forget();

        Ok(Self { state, observer })
    }

    pub fn observe(&self, element: Element, on_reveal: impl FnOnce(&Element) + 'static) {
        self.observer.observe(&element);
        self.state.borrow_mut().observe(element, on_reveal);
    }
}

/// The `#contactForm` fields and its submit button.
pub struct DomContactForm {
    document: Document,
    form: HtmlFormElement,
    button: Option<HtmlButtonElement>,
}

impl DomContactForm {
    pub fn new(document: &Document, form: HtmlFormElement) -> Self {
        let button = form
            .query_selector("button[type=\"submit\"]")
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok());

        Self {
            document: document.clone(),
            form,
            button,
        }
    }

    fn field_value(&self, id: &str) -> String {
        let Some(element) = self.document.get_element_by_id(id) else {
            return String::new();
        };

        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.value()
        } else {
            String::new()
        }
    }
}

impl ContactFormView for DomContactForm {
    fn read_fields(&self) -> ContactFields {
        ContactFields {
            name: self.field_value("name"),
            email: self.field_value("email"),
            subject: self.field_value("subject"),
            message: self.field_value("message"),
        }
    }

    fn reset(&self) {
        self.form.reset();
    }

    fn submit_label(&self) -> String {
        self.button
            .as_ref()
            .map(|button| button.inner_html())
            .unwrap_or_default()
    }

    fn set_submit_label(&self, label: &str) {
        if let Some(button) = self.button.as_ref() {
            button.set_inner_html(label);
        }
    }

    fn set_submit_disabled(&self, disabled: bool) {
        if let Some(button) = self.button.as_ref() {
            button.set_disabled(disabled);
        }
    }
}

/// URI-decoded value of a cookie readable from script.
pub fn read_cookie(document: &Document, name: &str) -> Option<String> {
    let cookies = document.dyn_ref::<HtmlDocument>()?.cookie().ok()?;
    let raw = find_cookie(&cookies, name)?;
    decode_uri_component(raw).ok()?.as_string()
}

/// Same-origin `fetch` through gloo-net.
pub struct FetchTransport;

impl ContactTransport for FetchTransport {
    async fn post_json(&self, request: ContactRequest<'_>) -> SiteResult<TransportResponse> {
        let mut builder =
            Request::post(request.endpoint).header("Content-Type", "application/json");
        if let Some(token) = request.csrf_token {
            builder = builder.header("X-CSRFToken", token);
        }

        let response = builder
            .body(request.body)
            .map_err(|error| SiteError::Transport(error.to_string()))?
            .send()
            .await
            .map_err(|error| SiteError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| SiteError::Transport(error.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
