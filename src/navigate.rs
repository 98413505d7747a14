//! Delayed post-success navigation.
use std::{sync::Arc, time::Duration};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Moves the client to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

/// Forwards destinations over a channel.
#[derive(Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, destination: &str) {
        if self.sender.send(destination.to_owned()).is_err() {
            warn!(%destination, "navigation receiver is gone");
        }
    }
}

/// A pending navigation. Dropping it cancels the navigation.
#[derive(Debug)]
pub struct DelayedNavigation {
    timer: Option<JoinHandle<()>>,
}

impl DelayedNavigation {
    pub fn schedule(navigator: Arc<dyn Navigator>, destination: String, delay: Duration) -> Self {
        let Ok(runtime) = Handle::try_current() else {
            warn!(%destination, "no async runtime, navigating immediately");
            navigator.navigate(&destination);
            return Self { timer: None };
        };
        debug!(%destination, ?delay, "navigation scheduled");

        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(%destination, "navigating");
            navigator.navigate(&destination);
        });
        Self { timer: Some(timer) }
    }

    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for DelayedNavigation {
    fn drop(&mut self) {
        self.cancel();
    }
}
