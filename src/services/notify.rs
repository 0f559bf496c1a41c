//! Notification sink and email delivery

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{
        enums::{NotificationType, TransactionStatus},
        notification::Notification,
        transaction::Transaction,
    },
};

/// Receives structured notification records for delivery.
///
/// The coordinator persists the record in its commit and hands it here
/// afterwards; delivery failures are logged, never propagated back into the
/// lifecycle operation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> AppResult<()>;
}

/// SMTP delivery via lettre
pub struct EmailSink {
    config: EmailConfig,
}

impl EmailSink {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Labtrack");
        let from_mailbox =
            Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
                .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(&notification.to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&notification.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(notification.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(notification.html.clone()),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host).map_err(|e| {
                AppError::Internal(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Sink that drops every notification; used where delivery is disabled.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn deliver(&self, _notification: &Notification) -> AppResult<()> {
        Ok(())
    }
}

fn build(
    txn: &Transaction,
    kind: NotificationType,
    subject: String,
    text: String,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        to: txn.student_email.clone(),
        subject,
        html: format!(
            "<html><body><pre>{}</pre></body></html>",
            text.replace('\n', "<br>")
        ),
        text,
        user_id: txn.student_id,
        notification_type: kind.as_str().to_string(),
        transaction_id: txn.transaction_id.clone(),
        created_at: now,
    }
}

fn item_lines(txn: &Transaction) -> String {
    txn.items
        .iter()
        .map(|i| format!("  - {} x{}", i.item_name, i.quantity))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Approval notice with the items and the due date
pub fn approval_notification(txn: &Transaction, now: DateTime<Utc>) -> Notification {
    let text = format!(
        r#"Hello {name},

Your borrow request {id} has been approved.

{items}

Everything is due back by {due}.
"#,
        name = txn.student_name,
        id = txn.transaction_id,
        items = item_lines(txn),
        due = txn.due_date.format("%Y-%m-%d %H:%M UTC"),
    );
    build(
        txn,
        NotificationType::Approval,
        format!("Borrow request {} approved", txn.transaction_id),
        text,
        now,
    )
}

/// Denial notice; the reservation has been released
pub fn denial_notification(txn: &Transaction, now: DateTime<Utc>) -> Notification {
    let text = format!(
        r#"Hello {name},

Your borrow request {id} has been denied.

{items}

The requested equipment has been released back to inventory. Please contact
the laboratory staff if you have questions.
"#,
        name = txn.student_name,
        id = txn.transaction_id,
        items = item_lines(txn),
    );
    build(
        txn,
        NotificationType::Denial,
        format!("Borrow request {} denied", txn.transaction_id),
        text,
        now,
    )
}

/// Return receipt written when a transaction is archived
pub fn return_receipt_notification(
    txn: &Transaction,
    final_status: TransactionStatus,
    fine_amount: Decimal,
    days_overdue: i64,
    now: DateTime<Utc>,
) -> Notification {
    let fine_line = if fine_amount > Decimal::ZERO {
        format!(
            "An overdue fine of {} has been levied ({} day(s) late).",
            fine_amount, days_overdue
        )
    } else {
        "No fine is owed.".to_string()
    };
    let text = format!(
        r#"Hello {name},

All items of transaction {id} have been returned ({status}).

{items}

{fine_line}
"#,
        name = txn.student_name,
        id = txn.transaction_id,
        status = final_status,
        items = item_lines(txn),
        fine_line = fine_line,
    );
    build(
        txn,
        NotificationType::Return,
        format!("Return receipt for {}", txn.transaction_id),
        text,
        now,
    )
}
