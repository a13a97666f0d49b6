use crate::{
    error::SiteResult,
    notification::{Notify, ToastKind},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{future::Future, rc::Rc, sync::LazyLock};

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const SENT_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";
pub const REJECTED_FALLBACK_MESSAGE: &str = "Failed to send message.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";
pub const PENDING_LABEL: &str = r#"<i class="bi bi-hourglass-split"></i> Sending..."#;

/// `local@domain.tld` with no whitespace or extra `@`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

/// Escapes text the way a DOM text node serializes it back to markup.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Raw value of cookie `name` from a `document.cookie` string, still
/// URI-encoded.
pub fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactPayload {
    pub fn sanitized(fields: &ContactFields) -> Self {
        Self {
            name: escape_html(&fields.name),
            email: escape_html(&fields.email),
            subject: escape_html(&fields.subject),
            message: escape_html(&fields.message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContactResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactRequest<'a> {
    pub endpoint: &'a str,
    pub csrf_token: Option<&'a str>,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends the JSON request. An `Err` means no response was received.
pub trait ContactTransport {
    fn post_json(
        &self,
        request: ContactRequest<'_>,
    ) -> impl Future<Output = SiteResult<TransportResponse>>;
}

/// The form's fields and submit button.
pub trait ContactFormView {
    fn read_fields(&self) -> ContactFields;
    fn reset(&self);
    fn submit_label(&self) -> String;
    fn set_submit_label(&self, label: &str);
    fn set_submit_disabled(&self, disabled: bool);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    InvalidEmail,
    Sent,
    Rejected(String),
    NetworkFailure,
}

/// Restores the submit button on every exit path.
struct PendingSubmit<'a, F: ContactFormView> {
    form: &'a F,
    original_label: String,
}

impl<'a, F: ContactFormView> PendingSubmit<'a, F> {
    fn begin(form: &'a F) -> Self {
        let original_label = form.submit_label();
        form.set_submit_disabled(true);
        form.set_submit_label(PENDING_LABEL);
        Self {
            form,
            original_label,
        }
    }
}

impl<F: ContactFormView> Drop for PendingSubmit<'_, F> {
    fn drop(&mut self) {
        self.form.set_submit_disabled(false);
        self.form.set_submit_label(&self.original_label);
    }
}

pub struct ContactSubmitter<T> {
    endpoint: String,
    transport: T,
    notifier: Rc<dyn Notify>,
}

impl<T: ContactTransport> ContactSubmitter<T> {
    pub fn new(endpoint: impl Into<String>, transport: T, notifier: Rc<dyn Notify>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            notifier,
        }
    }

    /// Validates, posts and reports the result through the notifier. The
    /// submit button is disabled for the duration of the request.
    pub async fn submit<F: ContactFormView>(
        &self,
        form: &F,
        csrf_token: Option<&str>,
    ) -> SubmitOutcome {
        let payload = ContactPayload::sanitized(&form.read_fields());

        if !is_valid_email(&payload.email) {
            self.notifier.notify(INVALID_EMAIL_MESSAGE, ToastKind::Error);
            return SubmitOutcome::InvalidEmail;
        }

        let _pending = PendingSubmit::begin(form);

        let outcome = match self.send(&payload, csrf_token).await {
            Ok(response) => interpret_response(&response),
            Err(error) => {
                log::warn!("contact request failed: {error}");
                SubmitOutcome::NetworkFailure
            }
        };

        match &outcome {
            SubmitOutcome::Sent => {
                log::info!("contact message sent");
                self.notifier.notify(SENT_MESSAGE, ToastKind::Success);
                form.reset();
            }
            SubmitOutcome::Rejected(message) => {
                log::info!("contact message rejected: {message}");
                self.notifier.notify(message, ToastKind::Error);
            }
            SubmitOutcome::NetworkFailure => {
                self.notifier.notify(NETWORK_ERROR_MESSAGE, ToastKind::Error);
            }
            SubmitOutcome::InvalidEmail => {}
        }

        outcome
    }

    async fn send(
        &self,
        payload: &ContactPayload,
        csrf_token: Option<&str>,
    ) -> SiteResult<TransportResponse> {
        if csrf_token.is_none() {
            log::warn!("no CSRF token available; sending contact request without one");
        }

        let request = ContactRequest {
            endpoint: &self.endpoint,
            csrf_token,
            body: serde_json::to_string(payload)?,
        };
        self.transport.post_json(request).await
    }
}

/// A body that is not JSON counts as a transport failure.
fn interpret_response(response: &TransportResponse) -> SubmitOutcome {
    let body = match serde_json::from_str::<ContactResponse>(&response.body) {
        Ok(body) => body,
        Err(error) => {
            log::warn!("contact response (status {}) is not JSON: {error}", response.status);
            return SubmitOutcome::NetworkFailure;
        }
    };

    if response.is_success() && body.success {
        return SubmitOutcome::Sent;
    }

    let message = body
        .error
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| REJECTED_FALLBACK_MESSAGE.to_string());
    SubmitOutcome::Rejected(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteError;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<(String, ToastKind)>>,
    }

    impl Notify for RecordingNotifier {
        fn notify(&self, text: &str, kind: ToastKind) {
            self.messages.borrow_mut().push((text.to_string(), kind));
        }
    }

    struct FakeTransport {
        reply: Option<TransportResponse>,
        requests: RefCell<Vec<(String, Option<String>, String)>>,
    }

    impl FakeTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Some(TransportResponse {
                    status,
                    body: body.to_string(),
                }),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: None,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContactTransport for FakeTransport {
        async fn post_json(&self, request: ContactRequest<'_>) -> SiteResult<TransportResponse> {
            self.requests.borrow_mut().push((
                request.endpoint.to_string(),
                request.csrf_token.map(ToString::to_string),
                request.body,
            ));
            self.reply
                .clone()
                .ok_or_else(|| SiteError::Transport("connection refused".to_string()))
        }
    }

    struct FakeForm {
        fields: RefCell<ContactFields>,
        label: RefCell<String>,
        disabled: Cell<bool>,
        label_history: RefCell<Vec<String>>,
        disabled_history: RefCell<Vec<bool>>,
    }

    impl FakeForm {
        fn with_email(email: &str) -> Self {
            Self {
                fields: RefCell::new(ContactFields {
                    name: "Ada <Lovelace>".to_string(),
                    email: email.to_string(),
                    subject: "Hello".to_string(),
                    message: "Fish & chips".to_string(),
                }),
                label: RefCell::new("Send Message".to_string()),
                disabled: Cell::new(false),
                label_history: RefCell::new(Vec::new()),
                disabled_history: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContactFormView for FakeForm {
        fn read_fields(&self) -> ContactFields {
            self.fields.borrow().clone()
        }

        fn reset(&self) {
            *self.fields.borrow_mut() = ContactFields::default();
        }

        fn submit_label(&self) -> String {
            self.label.borrow().clone()
        }

        fn set_submit_label(&self, label: &str) {
            self.label_history.borrow_mut().push(label.to_string());
            *self.label.borrow_mut() = label.to_string();
        }

        fn set_submit_disabled(&self, disabled: bool) {
            self.disabled_history.borrow_mut().push(disabled);
            self.disabled.set(disabled);
        }
    }

    fn submitter(
        transport: FakeTransport,
    ) -> (ContactSubmitter<FakeTransport>, Rc<RecordingNotifier>) {
        let notifier = Rc::new(RecordingNotifier::default());
        let submitter = ContactSubmitter::new("/api/contact/", transport, notifier.clone());
        (submitter, notifier)
    }

    fn assert_button_restored(form: &FakeForm) {
        assert!(!form.disabled.get());
        assert_eq!(*form.label.borrow(), "Send Message");
        assert_eq!(*form.disabled_history.borrow(), vec![true, false]);
        assert_eq!(
            *form.label_history.borrow(),
            vec![PENDING_LABEL.to_string(), "Send Message".to_string()]
        );
    }

    #[test]
    fn escape_html_matches_text_node_serialization() {
        assert_eq!(escape_html("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; \"Jerry\"&lt;/b&gt;");
        assert_eq!(escape_html("a\u{a0}b"), "a&nbsp;b");
    }

    #[test]
    fn email_pattern_accepts_basic_shape_only() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn find_cookie_reads_named_value() {
        let cookies = "theme=dark; csrftoken=abc%3D123; other=1";
        assert_eq!(find_cookie(cookies, "csrftoken"), Some("abc%3D123"));
        assert_eq!(find_cookie(cookies, "csrf"), None);
        assert_eq!(find_cookie("", "csrftoken"), None);
    }

    #[tokio::test]
    async fn invalid_email_never_reaches_the_network() {
        let (submitter, notifier) = submitter(FakeTransport::replying(200, r#"{"success":true}"#));
        let form = FakeForm::with_email("not-an-email");

        let outcome = submitter.submit(&form, Some("token")).await;

        assert_eq!(outcome, SubmitOutcome::InvalidEmail);
        assert!(submitter.transport.requests.borrow().is_empty());
        assert_eq!(
            *notifier.messages.borrow(),
            vec![(INVALID_EMAIL_MESSAGE.to_string(), ToastKind::Error)]
        );
        assert!(form.disabled_history.borrow().is_empty());
    }

    #[tokio::test]
    async fn success_clears_fields_and_posts_sanitized_json() {
        let (submitter, notifier) = submitter(FakeTransport::replying(200, r#"{"success":true}"#));
        let form = FakeForm::with_email("a@b.com");

        let outcome = submitter.submit(&form, Some("tok")).await;

        assert_eq!(outcome, SubmitOutcome::Sent);
        assert_eq!(*form.fields.borrow(), ContactFields::default());
        assert_eq!(
            *notifier.messages.borrow(),
            vec![(SENT_MESSAGE.to_string(), ToastKind::Success)]
        );
        assert_button_restored(&form);

        let requests = submitter.transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        let (endpoint, token, body) = &requests[0];
        assert_eq!(endpoint, "/api/contact/");
        assert_eq!(token.as_deref(), Some("tok"));
        let body: serde_json::Value = serde_json::from_str(body).expect("JSON body");
        assert_eq!(
            body,
            serde_json::json!({
                "name": "Ada &lt;Lovelace&gt;",
                "email": "a@b.com",
                "subject": "Hello",
                "message": "Fish &amp; chips",
            })
        );
    }

    #[tokio::test]
    async fn server_rejection_shows_its_error_and_keeps_fields() {
        let (submitter, notifier) =
            submitter(FakeTransport::replying(200, r#"{"success":false,"error":"X"}"#));
        let form = FakeForm::with_email("a@b.com");

        let outcome = submitter.submit(&form, None).await;

        assert_eq!(outcome, SubmitOutcome::Rejected("X".to_string()));
        assert_eq!(*notifier.messages.borrow(), vec![("X".to_string(), ToastKind::Error)]);
        assert_eq!(form.fields.borrow().email, "a@b.com");
        assert_button_restored(&form);
    }

    #[tokio::test]
    async fn http_error_without_message_uses_fallback() {
        let (submitter, notifier) = submitter(FakeTransport::replying(429, r#"{"success":true}"#));
        let form = FakeForm::with_email("a@b.com");

        let outcome = submitter.submit(&form, None).await;

        assert_eq!(outcome, SubmitOutcome::Rejected(REJECTED_FALLBACK_MESSAGE.to_string()));
        assert_eq!(
            *notifier.messages.borrow(),
            vec![(REJECTED_FALLBACK_MESSAGE.to_string(), ToastKind::Error)]
        );
    }

    #[tokio::test]
    async fn transport_failure_and_non_json_body_report_network_error() {
        for transport in [
            FakeTransport::unreachable(),
            FakeTransport::replying(502, "<html>Bad Gateway</html>"),
        ] {
            let (submitter, notifier) = submitter(transport);
            let form = FakeForm::with_email("a@b.com");

            let outcome = submitter.submit(&form, None).await;

            assert_eq!(outcome, SubmitOutcome::NetworkFailure);
            assert_eq!(
                *notifier.messages.borrow(),
                vec![(NETWORK_ERROR_MESSAGE.to_string(), ToastKind::Error)]
            );
            assert_button_restored(&form);
        }
    }
}
