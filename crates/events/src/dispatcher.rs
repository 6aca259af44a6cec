//! Bounded mail queue and the background dispatcher that drains it.
//!
//! Handlers call [`MailQueue::enqueue`] and move on. [`MailDispatcher::run`]
//! delivers each message through a [`MailTransport`], retrying a bounded
//! number of times. A message is delivered at least once unless every
//! attempt fails, in which case it is logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::delivery::MailTransport;
use crate::message::MailMessage;

/// Default pause before the second attempt; grows linearly per attempt.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// MailQueue
// ---------------------------------------------------------------------------

/// Sending half of the mail channel, cheap to clone into application state.
#[derive(Debug, Clone)]
pub struct MailQueue {
    sender: mpsc::Sender<MailMessage>,
}

impl MailQueue {
    /// Create a queue holding at most `capacity` undelivered messages.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MailMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Hand a message off for delivery without waiting.
    ///
    /// When the queue is full the send is moved to a detached task so the
    /// caller still returns immediately.
    pub fn enqueue(&self, message: MailMessage) {
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!(to = %message.to, "Mail queue full, deferring enqueue");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    if let Err(e) = sender.send(message).await {
                        tracing::error!(to = %e.0.to, "Mail queue closed, message dropped");
                    }
                });
            }
            Err(TrySendError::Closed(message)) => {
                tracing::error!(to = %message.to, "Mail queue closed, message dropped");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MailDispatcher
// ---------------------------------------------------------------------------

/// Background delivery loop.
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, max_attempts: u32) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Deliver messages until the token is cancelled or every sender is
    /// dropped. On cancellation, messages already queued are still delivered.
    pub async fn run(self, mut receiver: mpsc::Receiver<MailMessage>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Mail dispatcher cancelled, draining queue");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(message) => {
                        self.deliver(&message).await;
                    }
                    None => {
                        tracing::info!("Mail queue closed, dispatcher shutting down");
                        return;
                    }
                },
            }
        }

        receiver.close();
        while let Some(message) = receiver.recv().await {
            self.deliver(&message).await;
        }
    }

    /// Try to deliver one message, returning whether any attempt succeeded.
    pub async fn deliver(&self, message: &MailMessage) -> bool {
        for attempt in 1..=self.max_attempts {
            match self.transport.send(message).await {
                Ok(()) => return true,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        to = %message.to,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Mail delivery failed"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }
        tracing::error!(
            to = %message.to,
            subject = %message.subject,
            "Giving up on mail delivery"
        );
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::delivery::email::EmailError;

    /// Fails the first `failures` sends, then records every delivered subject.
    #[derive(Default)]
    struct FlakyTransport {
        failures: u32,
        attempts: AtomicU32,
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MailTransport for FlakyTransport {
        async fn send(&self, message: &MailMessage) -> Result<(), EmailError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                return Err(EmailError::Build("connection refused".into()));
            }
            self.delivered.lock().unwrap().push(message.subject.clone());
            Ok(())
        }
    }

    fn message(subject: &str) -> MailMessage {
        MailMessage::new("guest@example.com", "me@here.com", subject, "<p>hi</p>")
    }

    #[tokio::test]
    async fn retries_until_delivered() {
        let transport = Arc::new(FlakyTransport {
            failures: 2,
            ..Default::default()
        });
        let dispatcher =
            MailDispatcher::new(transport.clone(), 3).with_retry_delay(Duration::ZERO);

        assert!(dispatcher.deliver(&message("one")).await);
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(*transport.delivered.lock().unwrap(), vec!["one".to_string()]);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let transport = Arc::new(FlakyTransport {
            failures: 10,
            ..Default::default()
        });
        let dispatcher =
            MailDispatcher::new(transport.clone(), 2).with_retry_delay(Duration::ZERO);

        assert!(!dispatcher.deliver(&message("lost")).await);
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn full_queue_defers_instead_of_dropping() {
        let (queue, mut receiver) = MailQueue::new(1);
        queue.enqueue(message("first"));
        queue.enqueue(message("second"));

        assert_eq!(receiver.recv().await.unwrap().subject, "first");
        assert_eq!(receiver.recv().await.unwrap().subject, "second");
    }

    #[tokio::test]
    async fn cancelled_dispatcher_drains_pending_messages() {
        let transport = Arc::new(FlakyTransport::default());
        let (queue, receiver) = MailQueue::new(10);
        queue.enqueue(message("a"));
        queue.enqueue(message("b"));

        let cancel = CancellationToken::new();
        cancel.cancel();
        MailDispatcher::new(transport.clone(), 1)
            .run(receiver, cancel)
            .await;

        assert_eq!(
            *transport.delivered.lock().unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[tokio::test]
    async fn dispatcher_stops_when_queue_dropped() {
        let transport = Arc::new(FlakyTransport::default());
        let (queue, receiver) = MailQueue::new(4);
        queue.enqueue(message("only"));
        drop(queue);

        MailDispatcher::new(transport.clone(), 1)
            .run(receiver, CancellationToken::new())
            .await;
        assert_eq!(transport.delivered.lock().unwrap().len(), 1);
    }
}
