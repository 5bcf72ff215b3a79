use std::sync::Arc;

use tokio::sync::watch;

use super::step::{Step, Terminal};

/// Holder for the chain a player pushes frames through.
///
/// The chain lives in a `watch` channel: `attach` swaps the whole `Arc` in
/// one step, so a reader sees either the old chain or the new one.
pub struct AttachableCallback<T, M> {
    sender: watch::Sender<Arc<Step<T, M>>>,
}

impl<T, M> AttachableCallback<T, M>
where
    Step<T, M>: Terminal,
{
    /// Starts with the no-op chain attached.
    pub fn new() -> Self {
        Self::with_chain(Step::no_op())
    }

    pub fn with_chain(chain: Arc<Step<T, M>>) -> Self {
        Self {
            sender: watch::Sender::new(chain),
        }
    }

    /// Replace the current chain, returning the one it replaced.
    pub fn attach(&self, chain: Arc<Step<T, M>>) -> Arc<Step<T, M>> {
        self.sender.send_replace(chain)
    }

    /// Go back to the no-op chain.
    pub fn detach(&self) -> Arc<Step<T, M>> {
        self.attach(Step::no_op())
    }

    /// The chain currently attached.
    pub fn retrieve(&self) -> Arc<Step<T, M>> {
        self.sender.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        let chain = self.sender.borrow();
        !<Step<T, M> as Terminal>::is_no_op(&chain)
    }

    /// Receiver notified on every attach or detach.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Step<T, M>>> {
        self.sender.subscribe()
    }
}

impl<T, M> Default for AttachableCallback<T, M>
where
    Step<T, M>: Terminal,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M> std::fmt::Debug for AttachableCallback<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachableCallback")
            .field("chain", &*self.sender.borrow())
            .finish()
    }
}
