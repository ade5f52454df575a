/// Background email dispatcher
///
/// [`Notifier`] is a cheap, cloneable handle over a bounded queue. Request
/// handlers call [`Notifier::enqueue`], which never waits: when the queue is
/// full or the dispatcher has stopped, the message is dropped with a
/// warning.
///
/// The dispatcher task sends queued messages one at a time. When the
/// shutdown token fires it stops accepting new work, sends what is already
/// queued, then exits.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::mailer::{Email, Mailer};

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Email>,
}

impl Notifier {
    /// Creates a notifier and the receiving end of its queue
    ///
    /// Most callers want [`Notifier::spawn`]; this is the building block for
    /// running the dispatcher elsewhere.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Email>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Creates a notifier and spawns its dispatcher on the current runtime
    pub fn spawn(
        mailer: Arc<dyn Mailer>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (notifier, rx) = Self::channel(capacity);
        let handle = tokio::spawn(run_dispatcher(rx, mailer, shutdown));
        (notifier, handle)
    }

    /// Queues `email` for delivery without waiting
    ///
    /// Returns whether the message was queued.
    pub fn enqueue(&self, email: Email) -> bool {
        match self.tx.try_send(email) {
            Ok(()) => true,
            Err(TrySendError::Full(email)) => {
                warn!(to = %email.to, subject = %email.subject, "Mail queue full, dropping email");
                false
            }
            Err(TrySendError::Closed(email)) => {
                warn!(to = %email.to, subject = %email.subject, "Mail dispatcher stopped, dropping email");
                false
            }
        }
    }
}

/// Drains `rx` through `mailer` until shutdown, then flushes the backlog
pub async fn run_dispatcher(
    mut rx: mpsc::Receiver<Email>,
    mailer: Arc<dyn Mailer>,
    shutdown: CancellationToken,
) {
    info!("Mail dispatcher started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some(email) => deliver(mailer.as_ref(), &email).await,
                None => {
                    info!("Mail queue closed, dispatcher exiting");
                    return;
                }
            },
        }
    }

    rx.close();
    let mut flushed = 0usize;
    while let Ok(email) = rx.try_recv() {
        deliver(mailer.as_ref(), &email).await;
        flushed += 1;
    }

    info!(flushed, "Mail dispatcher stopped");
}

async fn deliver(mailer: &dyn Mailer, email: &Email) {
    match mailer.send(email).await {
        Ok(()) => debug!(to = %email.to, subject = %email.subject, "Email sent"),
        Err(e) => error!(to = %email.to, subject = %email.subject, error = %e, "Failed to send email"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mailer::MailError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &Email) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &Email) -> Result<(), MailError> {
            Err(MailError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    fn email(to: &str) -> Email {
        Email {
            from: "no-reply@taskdeck.local".to_string(),
            to: to.to_string(),
            subject: "Test".to_string(),
            html: "<p>test</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_shutdown_flushes_queue() {
        let mailer = Arc::new(RecordingMailer::default());
        let (notifier, rx) = Notifier::channel(8);

        for i in 0..3 {
            assert!(notifier.enqueue(email(&format!("user{i}@example.com"))));
        }

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        run_dispatcher(rx, mailer.clone(), shutdown).await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].to, "user0@example.com");
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (notifier, _rx) = Notifier::channel(1);

        assert!(notifier.enqueue(email("a@example.com")));
        assert!(!notifier.enqueue(email("b@example.com")));
    }

    #[tokio::test]
    async fn test_closed_queue_drops() {
        let (notifier, rx) = Notifier::channel(4);
        drop(rx);

        assert!(!notifier.enqueue(email("a@example.com")));
    }

    #[tokio::test]
    async fn test_send_failures_do_not_stop_dispatcher() {
        let (notifier, rx) = Notifier::channel(4);
        notifier.enqueue(email("a@example.com"));
        notifier.enqueue(email("b@example.com"));
        drop(notifier);

        // Sender dropped: dispatcher drains both messages then exits on its own
        run_dispatcher(rx, Arc::new(FailingMailer), CancellationToken::new()).await;
    }

    #[tokio::test]
    async fn test_spawned_dispatcher_delivers() {
        let mailer = Arc::new(RecordingMailer::default());
        let shutdown = CancellationToken::new();
        let (notifier, handle) = Notifier::spawn(mailer.clone(), 4, shutdown.clone());

        notifier.enqueue(email("a@example.com"));
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }
}
