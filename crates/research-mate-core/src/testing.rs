//! Test doubles for the controller collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::surface::{Collaborators, Pacer, Prompter, ViewObserver};
use crate::transport::{Endpoint, Request, Transport, TransportError};
use crate::view::ViewEvent;

/// Transport that replays queued replies per endpoint and records requests.
///
/// A gated endpoint records the request, then waits for its [`Notify`]
/// before replying, which keeps the call in flight for as long as a test
/// needs.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<Endpoint, VecDeque<Result<Value, TransportError>>>>,
    gates: Mutex<HashMap<Endpoint, Arc<Notify>>>,
    calls: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, endpoint: Endpoint, value: Value) {
        self.push(endpoint, Ok(value));
    }

    pub fn fail(&self, endpoint: Endpoint, err: TransportError) {
        self.push(endpoint, Err(err));
    }

    fn push(&self, endpoint: Endpoint, reply: Result<Value, TransportError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(reply);
    }

    pub fn gate(&self, endpoint: Endpoint) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(endpoint, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.endpoint() == endpoint)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, request: Request) -> Result<Value, TransportError> {
        let endpoint = request.endpoint();
        self.calls.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().get(&endpoint).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(TransportError::decode(format!(
                    "no scripted reply for {}",
                    endpoint.path()
                )))
            })
    }
}

/// Pacer that only yields, recording every requested delay.
///
/// A held duration waits for the hold's [`Notify`] instead.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
    hold: Mutex<Option<(Duration, Arc<Notify>)>>,
}

impl RecordingPacer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn hold(&self, duration: Duration) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some((duration, gate.clone()));
        gate
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
        let held = self
            .hold
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(d, _)| *d == duration)
            .map(|(_, gate)| gate.clone());
        match held {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
    }
}

/// Prompter with a fixed answer that records what it was shown.
pub struct RecordingPrompter {
    answer: AtomicBool,
    confirms: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingPrompter {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer: AtomicBool::new(answer),
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        })
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for RecordingPrompter {
    async fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().unwrap().push(message.to_string());
        self.answer.load(Ordering::SeqCst)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ViewObserver for RecordingObserver {
    fn notify(&self, event: &ViewEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Handles to every double behind a [`Collaborators`] bundle.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub pacer: Arc<RecordingPacer>,
    pub prompter: Arc<RecordingPrompter>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new() -> Self {
        Self::confirming(true)
    }

    pub fn confirming(answer: bool) -> Self {
        Self {
            transport: ScriptedTransport::new(),
            pacer: RecordingPacer::new(),
            prompter: RecordingPrompter::answering(answer),
            observer: Arc::new(RecordingObserver::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.transport.clone(),
            self.pacer.clone(),
            self.prompter.clone(),
        )
        .with_observer(self.observer.clone())
    }
}
