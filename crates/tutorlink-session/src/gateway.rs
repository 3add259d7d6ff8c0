//! Authentication boundary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use tutorlink_core::result::AppResult;
use tutorlink_entity::identity::Identity;

/// An identity-change event. `None` means the session ended.
pub type IdentityEvent = Option<Identity>;

/// The authentication provider boundary.
///
/// The provider pushes identity-change events; beyond "session ended"
/// there is no guarantee attached to the sign-out call.
#[async_trait]
pub trait AuthGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Subscribe to identity-change events.
    fn subscribe(&self) -> mpsc::Receiver<IdentityEvent>;

    /// Ask the provider to end the current session. The gateway follows
    /// up with a `None` identity event.
    async fn sign_out(&self) -> AppResult<()>;
}

/// In-process [`AuthGateway`] fed by the embedding application.
///
/// The embedding side calls [`ChannelAuthGateway::signed_in`] /
/// [`ChannelAuthGateway::signed_out`] as its authentication provider
/// reports changes; every subscriber receives each event.
#[derive(Debug)]
pub struct ChannelAuthGateway {
    subscribers: std::sync::Mutex<Vec<mpsc::Sender<IdentityEvent>>>,
    buffer: usize,
}

impl ChannelAuthGateway {
    /// Create a gateway whose event channels hold `buffer` events.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: std::sync::Mutex::new(Vec::new()),
            buffer,
        }
    }

    /// Report that an identity signed in (or the active identity changed).
    pub async fn signed_in(&self, identity: Identity) {
        self.emit(Some(identity)).await;
    }

    /// Report that the active identity signed out.
    pub async fn signed_out(&self) {
        self.emit(None).await;
    }

    async fn emit(&self, event: IdentityEvent) {
        let senders: Vec<_> = {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            subscribers.retain(|tx| !tx.is_closed());
            subscribers.clone()
        };
        for tx in senders {
            let _ = tx.send(event.clone()).await;
        }
    }
}

impl Default for ChannelAuthGateway {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl AuthGateway for ChannelAuthGateway {
    fn subscribe(&self) -> mpsc::Receiver<IdentityEvent> {
        let (tx, rx) = mpsc::channel(self.buffer);
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.signed_out().await;
        Ok(())
    }
}
