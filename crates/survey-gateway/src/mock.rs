//! Scripted gateway for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use survey_core::{GatewayError, Submission, SurveyGateway, SurveyRecord};

/// Pre-programmed outcome of one gateway call.
pub enum MockReply<T> {
    /// Return this result.
    Ready(Result<T, GatewayError>),
    /// Wait, then return the inner reply.
    Delay(Duration, Box<MockReply<T>>),
}

impl<T> MockReply<T> {
    /// Wrap a reply with a delay.
    pub fn delayed(delay: Duration, inner: Self) -> Self {
        Self::Delay(delay, Box::new(inner))
    }

    async fn resolve(self) -> Result<T, GatewayError> {
        let mut reply = self;
        loop {
            match reply {
                Self::Ready(result) => return result,
                Self::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

/// Gateway that answers from scripted queues, in order. Calls past the end
/// of a script fail with a transport error.
#[derive(Default)]
pub struct MockGateway {
    submits: Mutex<VecDeque<MockReply<()>>>,
    fetches: Mutex<VecDeque<MockReply<Vec<SurveyRecord>>>>,
    submitted: Mutex<Vec<Submission>>,
    fetch_count: AtomicUsize,
}

impl MockGateway {
    /// Gateway with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next unscripted submit.
    #[must_use]
    pub fn with_submit(self, result: Result<(), GatewayError>) -> Self {
        self.with_submit_reply(MockReply::Ready(result))
    }

    /// Queue a scripted submit reply, possibly delayed.
    #[must_use]
    pub fn with_submit_reply(self, reply: MockReply<()>) -> Self {
        self.push_submit(reply);
        self
    }

    /// Queue the result of the next unscripted fetch.
    #[must_use]
    pub fn with_fetch(self, result: Result<Vec<SurveyRecord>, GatewayError>) -> Self {
        self.with_fetch_reply(MockReply::Ready(result))
    }

    /// Queue a scripted fetch reply, possibly delayed.
    #[must_use]
    pub fn with_fetch_reply(self, reply: MockReply<Vec<SurveyRecord>>) -> Self {
        self.push_fetch(reply);
        self
    }

    /// Queue a fetch returning these records.
    #[must_use]
    pub fn with_records(self, records: Vec<SurveyRecord>) -> Self {
        self.with_fetch(Ok(records))
    }

    /// Queue a submit reply after construction.
    pub fn push_submit(&self, reply: MockReply<()>) {
        self.submits.lock().push_back(reply);
    }

    /// Queue a fetch reply after construction.
    pub fn push_fetch(&self, reply: MockReply<Vec<SurveyRecord>>) {
        self.fetches.lock().push_back(reply);
    }

    /// Every submission received, in call order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submitted.lock().clone()
    }

    /// Number of fetch calls made.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SurveyGateway for MockGateway {
    async fn submit(&self, submission: &Submission) -> Result<(), GatewayError> {
        self.submitted.lock().push(submission.clone());
        let reply = self.submits.lock().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(GatewayError::Transport(
                "MockGateway: no submit outcome scripted".into(),
            )),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<SurveyRecord>, GatewayError> {
        let call = self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let reply = self.fetches.lock().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(GatewayError::Transport(format!(
                "MockGateway: no fetch outcome scripted for call {call}"
            ))),
        }
    }
}
