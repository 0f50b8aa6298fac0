use crate::content::NodeId;

/// Delegated click channel. Anything that detects a click on a trigger
/// image publishes the node here; whoever owns the viewer session drains
/// the channel on its next tick. This replaces a root-level click listener
/// catching events from arbitrarily deep descendants.
pub struct ActivationBus {
    tx: flume::Sender<NodeId>,
    rx: flume::Receiver<NodeId>,
}

impl ActivationBus {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    pub fn publish(&self, node: NodeId) {
        // The receiver lives as long as the bus, so this cannot fail.
        let _ = self.tx.send(node);
    }

    /// All activations since the last drain, oldest first.
    pub fn drain(&self) -> Vec<NodeId> {
        self.rx.try_iter().collect()
    }
}

impl Default for ActivationBus {
    fn default() -> Self {
        Self::new()
    }
}
