// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort email notifications for the Helpdesk System.
//!
//! Notifications are side effects of successful mutations, never part
//! of them. `dispatch` renders a [`Notification`] and hands it to a
//! [`NotificationSender`]; a failed send is logged at warn and
//! swallowed so the triggering operation's outcome is unaffected.
//! Transport stays external to this crate: the server installs a
//! logging sender, tests use a recording sender.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

use tracing::{info, warn};

/// Opaque identifier returned by a sender for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a random message identifier.
    #[must_use]
    pub fn random() -> Self {
        let id: u64 = rand::random();
        Self(format!("msg-{id:016x}"))
    }
}

/// Errors a sender can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The transport rejected or failed to deliver the message.
    SendFailed(String),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendFailed(msg) => write!(f, "Failed to send notification: {msg}"),
        }
    }
}

impl std::error::Error for NotifyError {}

/// Delivery transport for rendered notifications.
pub trait NotificationSender: Send + Sync {
    /// Delivers a single message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot deliver the message.
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<MessageId, NotifyError>;
}

/// The notification events the system emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A new registration needs its email address verified.
    VerificationRequested {
        /// The registrant's email address.
        email: String,
        /// The registrant's first name.
        first_name: String,
        /// The single-use verification token.
        token: String,
    },
    /// A verified registration awaits admin approval.
    ApprovalPending {
        /// The admin's email address.
        admin_email: String,
        /// The registrant's username.
        username: String,
    },
    /// An admin approved the account.
    AccountApproved {
        /// The approved user's email address.
        email: String,
        /// The approved user's first name.
        first_name: String,
    },
    /// A ticket was created in a department.
    TicketCreated {
        /// The supervisor's email address.
        supervisor_email: String,
        /// The ticket number.
        ticket_number: String,
        /// The ticket title.
        title: String,
    },
    /// A ticket was assigned to a user.
    TicketAssigned {
        /// The assignee's email address.
        assignee_email: String,
        /// The ticket number.
        ticket_number: String,
        /// The ticket title.
        title: String,
    },
    /// A comment was added to a ticket.
    CommentAdded {
        /// The ticket author's email address.
        author_email: String,
        /// The ticket number.
        ticket_number: String,
        /// The commenter's username.
        commenter: String,
    },
    /// A ticket's status changed.
    StatusChanged {
        /// The ticket author's email address.
        author_email: String,
        /// The ticket number.
        ticket_number: String,
        /// The previous status.
        old_status: String,
        /// The new status.
        new_status: String,
    },
}

impl Notification {
    /// The email address this notification goes to.
    #[must_use]
    pub fn recipient(&self) -> &str {
        match self {
            Self::VerificationRequested { email, .. } | Self::AccountApproved { email, .. } => {
                email
            }
            Self::ApprovalPending { admin_email, .. } => admin_email,
            Self::TicketCreated {
                supervisor_email, ..
            } => supervisor_email,
            Self::TicketAssigned { assignee_email, .. } => assignee_email,
            Self::CommentAdded { author_email, .. } | Self::StatusChanged { author_email, .. } => {
                author_email
            }
        }
    }

    /// The rendered subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            Self::VerificationRequested { .. } => "Verify your email address".to_string(),
            Self::ApprovalPending { username, .. } => {
                format!("Account approval needed: {username}")
            }
            Self::AccountApproved { .. } => "Your account has been approved".to_string(),
            Self::TicketCreated { ticket_number, .. } => {
                format!("New ticket {ticket_number}")
            }
            Self::TicketAssigned { ticket_number, .. } => {
                format!("Ticket {ticket_number} assigned to you")
            }
            Self::CommentAdded { ticket_number, .. } => {
                format!("New comment on ticket {ticket_number}")
            }
            Self::StatusChanged { ticket_number, .. } => {
                format!("Ticket {ticket_number} status changed")
            }
        }
    }

    /// The rendered HTML body.
    #[must_use]
    pub fn html_body(&self) -> String {
        match self {
            Self::VerificationRequested {
                first_name, token, ..
            } => format!(
                "<p>Hello {first_name},</p>\
                 <p>Please verify your email address using the token below:</p>\
                 <p><code>{token}</code></p>"
            ),
            Self::ApprovalPending { username, .. } => format!(
                "<p>The account <strong>{username}</strong> has verified its \
                 email address and is awaiting approval.</p>"
            ),
            Self::AccountApproved { first_name, .. } => format!(
                "<p>Hello {first_name},</p>\
                 <p>Your account has been approved. You can now log in.</p>"
            ),
            Self::TicketCreated {
                ticket_number,
                title,
                ..
            } => format!(
                "<p>A new ticket <strong>{ticket_number}</strong> was created \
                 in your department:</p><p>{title}</p>"
            ),
            Self::TicketAssigned {
                ticket_number,
                title,
                ..
            } => format!(
                "<p>Ticket <strong>{ticket_number}</strong> has been assigned \
                 to you:</p><p>{title}</p>"
            ),
            Self::CommentAdded {
                ticket_number,
                commenter,
                ..
            } => format!(
                "<p><strong>{commenter}</strong> commented on ticket \
                 <strong>{ticket_number}</strong>.</p>"
            ),
            Self::StatusChanged {
                ticket_number,
                old_status,
                new_status,
                ..
            } => format!(
                "<p>Ticket <strong>{ticket_number}</strong> moved from \
                 <em>{old_status}</em> to <em>{new_status}</em>.</p>"
            ),
        }
    }
}

/// Renders and sends a notification, swallowing delivery failures.
///
/// The triggering mutation has already committed when this runs; a
/// failed send must not change its outcome.
pub fn dispatch(sender: &dyn NotificationSender, notification: &Notification) {
    let recipient = notification.recipient();
    let subject = notification.subject();
    match sender.send(recipient, &subject, &notification.html_body()) {
        Ok(message_id) => {
            info!(recipient, subject, message_id = %message_id.0, "Notification sent");
        }
        Err(err) => {
            warn!(recipient, subject, error = %err, "Notification delivery failed");
        }
    }
}

/// A sender that only logs, used when no real transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSender;

impl NotificationSender for LoggingSender {
    fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<MessageId, NotifyError> {
        let message_id = MessageId::random();
        info!(to, subject, message_id = %message_id.0, "Logging-only notification transport");
        Ok(message_id)
    }
}

/// A test double that records every send and can be made to fail.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: std::sync::Mutex<Vec<(String, String)>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingSender {
    /// Creates a recording sender that delivers successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail.
    pub fn fail_sends(&self) {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// The `(recipient, subject)` pairs recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSender for RecordingSender {
    fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<MessageId, NotifyError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotifyError::SendFailed("transport unavailable".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((to.to_string(), subject.to_string()));
        }
        Ok(MessageId::random())
    }
}
