use tokio::sync::broadcast;

/// Table a mutation touched. Notifications carry no payload beyond this;
/// consumers re-query instead of trusting deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangedTable {
    Students,
    DrawItems,
    DrawWinners,
    DrawLiveEvents,
    DrawSettings,
}

/// In-process change feed. Every mutating service call publishes here after
/// the database write; the live refresher treats the stream purely as an
/// invalidation signal and re-fetches. Lagged receivers lose nothing of
/// substance, the periodic fallback resync covers them.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangedTable>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn publish(&self, table: ChangedTable) {
        // No subscribers is fine (e.g. during startup).
        let _ = self.tx.send(table);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangedTable> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
