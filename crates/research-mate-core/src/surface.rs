//! Collaborators the controllers use to reach the user and the clock.
//!
//! A front end supplies one implementation of each trait; the controllers
//! never touch a terminal, a DOM, or a runtime timer directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::transport::Transport;
use crate::view::ViewEvent;

/// Suspends the caller for a fixed delay.
///
/// Used between reveal units and before a settled card resets. Dropping the
/// returned future abandons the wait.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Blocking decisions and notices addressed to the user.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question. The caller waits for the answer.
    async fn confirm(&self, message: &str) -> bool;

    /// Show a message the user has to acknowledge.
    fn alert(&self, message: &str);
}

/// Receives a notification after every state change a view depends on.
pub trait ViewObserver: Send + Sync {
    fn notify(&self, event: &ViewEvent);
}

/// Observer that ignores every event.
pub struct Unobserved;

impl ViewObserver for Unobserved {
    fn notify(&self, _event: &ViewEvent) {}
}

/// Everything a controller needs from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub pacer: Arc<dyn Pacer>,
    pub prompter: Arc<dyn Prompter>,
    pub observer: Arc<dyn ViewObserver>,
}

impl Collaborators {
    pub fn new(
        transport: Arc<dyn Transport>,
        pacer: Arc<dyn Pacer>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            transport,
            pacer,
            prompter,
            observer: Arc::new(Unobserved),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ViewObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub(crate) fn notify(&self, event: ViewEvent) {
        self.observer.notify(&event);
    }
}
