use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use log::{error, info};
use serde_json::Value;

use crate::components::notification::{NotificationKind, Notifier};
use crate::config::Messages;
use crate::dom::{Bindings, DomEvent, ElementRef, FormElement};
use crate::error::SiteResult;
use crate::runtime::EventLoop;

/// Status and raw body of the server's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactResponse {
    pub status: u16,
    pub body: String,
}

impl ContactResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends the serialized form as multipart data.
#[async_trait(?Send)]
pub trait ContactTransport {
    async fn submit(&self, endpoint: &str, fields: Vec<(String, String)>) -> SiteResult<ContactResponse>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Sent,
    /// Non-2xx; carries the text shown to the user.
    Rejected(String),
    /// Network or decode failure.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

pub struct ContactForm<T> {
    inner: Rc<ContactFormInner<T>>,
}

impl<T> Clone for ContactForm<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct ContactFormInner<T> {
    form: Rc<dyn FormElement>,
    submit_button: Option<ElementRef>,
    transport: T,
    notifier: Notifier,
    event_loop: Rc<dyn EventLoop>,
    endpoint: String,
    messages: Messages,
    in_flight: Cell<usize>,
    idle_label: RefCell<Option<String>>,
}

impl<T: ContactTransport + 'static> ContactForm<T> {
    pub fn new(
        form: Rc<dyn FormElement>,
        submit_button: Option<ElementRef>,
        transport: T,
        notifier: Notifier,
        event_loop: Rc<dyn EventLoop>,
        endpoint: impl Into<String>,
        messages: Messages,
    ) -> Self {
        Self {
            inner: Rc::new(ContactFormInner {
                form,
                submit_button,
                transport,
                notifier,
                event_loop,
                endpoint: endpoint.into(),
                messages,
                in_flight: Cell::new(0),
                idle_label: RefCell::new(None),
            }),
        }
    }

    pub fn state(&self) -> FormState {
        if self.inner.in_flight.get() == 0 {
            FormState::Idle
        } else {
            FormState::Submitting
        }
    }

    pub fn bind(&self) -> Bindings {
        let mut bindings = Bindings::default();
        let this = self.clone();
        bindings.push(self.inner.form.on_submit(Box::new(move |event: &dyn DomEvent| {
            event.prevent_default();
            let form = this.clone();
            this.inner.event_loop.spawn(Box::pin(async move {
                form.submit().await;
            }));
        })));
        bindings
    }

    /// One full submission: lock the button, post, report, unlock.
    pub async fn submit(&self) -> SubmissionOutcome {
        let inner = &self.inner;
        let fields = inner.form.fields();
        self.lock_button();

        let outcome = match self.exchange(fields).await {
            Ok((true, _)) => SubmissionOutcome::Sent,
            Ok((false, reply)) => SubmissionOutcome::Rejected(
                server_message(&reply)
                    .unwrap_or(inner.messages.server_error_fallback.as_str())
                    .to_string(),
            ),
            Err(e) => {
                error!("contact form submission failed: {}", e);
                SubmissionOutcome::Failed
            }
        };

        match &outcome {
            SubmissionOutcome::Sent => {
                info!("contact form sent");
                inner.notifier.show(&inner.messages.sent, NotificationKind::Success);
                inner.form.reset();
            }
            SubmissionOutcome::Rejected(message) => {
                inner.notifier.show(message, NotificationKind::Error);
            }
            SubmissionOutcome::Failed => {
                inner.notifier.show(&inner.messages.send_failed, NotificationKind::Error);
            }
        }

        self.unlock_button();
        outcome
    }

    async fn exchange(&self, fields: Vec<(String, String)>) -> SiteResult<(bool, Value)> {
        let response = self
            .inner
            .transport
            .submit(&self.inner.endpoint, fields)
            .await?;
        // Any JSON will do; only a body that is not JSON at all fails.
        let reply: Value = serde_json::from_str(&response.body)?;
        Ok((response.is_success(), reply))
    }

    fn lock_button(&self) {
        let inner = &self.inner;
        let in_flight = inner.in_flight.get();
        inner.in_flight.set(in_flight + 1);

        let Some(button) = &inner.submit_button else {
            return;
        };
        if in_flight == 0 {
            *inner.idle_label.borrow_mut() = Some(button.text());
        }
        button.set_disabled(true);
        button.set_inner_html(&format!(
            "<span class=\"loading\"></span> {}",
            inner.messages.sending
        ));
    }

    fn unlock_button(&self) {
        let inner = &self.inner;
        inner.in_flight.set(inner.in_flight.get().saturating_sub(1));

        let Some(button) = &inner.submit_button else {
            return;
        };
        button.set_disabled(false);
        if let Some(label) = inner.idle_label.borrow().as_deref() {
            button.set_text(label);
        }
    }
}

/// Non-empty string `message` of an error reply. Other shapes count as absent.
fn server_message(reply: &Value) -> Option<&str> {
    reply
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}
