/// Notification gateway
///
/// Outgoing email is fire-and-forget: services hand an [`Email`] to the
/// [`Notifier`], which queues it for a background dispatcher. Delivery
/// failures are logged by the dispatcher and never reach the request that
/// triggered them.
///
/// # Modules
///
/// - `mailer`: The [`Mailer`] trait plus log and HTTP-relay implementations
/// - `dispatcher`: Bounded queue and background sender
/// - `templates`: Verification and password reset messages
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_shared::notify::{templates, LogMailer, Notifier};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let shutdown = CancellationToken::new();
/// let (notifier, dispatcher) = Notifier::spawn(Arc::new(LogMailer::default()), 256, shutdown.clone());
///
/// notifier.enqueue(templates::verification_email("no-reply@taskdeck.local", "a@b.com", "0a1b2"));
///
/// shutdown.cancel();
/// let _ = dispatcher.await;
/// # }
/// ```

pub mod dispatcher;
pub mod mailer;
pub mod templates;

pub use dispatcher::Notifier;
pub use mailer::{Email, HttpMailer, LogMailer, MailError, Mailer};
