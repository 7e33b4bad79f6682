use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// The independently tracked mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    BulkImport,
}

impl MutationKind {
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Create,
        MutationKind::Update,
        MutationKind::Delete,
        MutationKind::BulkImport,
    ];

    fn index(self) -> usize {
        match self {
            Self::Create => 0,
            Self::Update => 1,
            Self::Delete => 2,
            Self::BulkImport => 3,
        }
    }
}

/// Lifecycle of one mutation kind: Idle → InProgress → Success | Failed → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    #[default]
    Idle,
    InProgress,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KindStatus {
    pub state: MutationState,
    /// Requests of this kind still awaiting a response.
    pub in_flight: usize,
}

/// Point-in-time view of every mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MutationSnapshot {
    kinds: [KindStatus; 4],
}

impl MutationSnapshot {
    pub fn status(&self, kind: MutationKind) -> KindStatus {
        self.kinds[kind.index()]
    }

    pub fn state(&self, kind: MutationKind) -> MutationState {
        self.status(kind).state
    }

    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.status(kind).in_flight > 0
    }

    /// True while any create, update, delete or import is in flight.
    pub fn is_any_pending(&self) -> bool {
        MutationKind::ALL.iter().any(|kind| self.is_pending(*kind))
    }
}

/// Publishes mutation status changes to subscribers.
#[derive(Clone)]
pub struct MutationTracker {
    status: Arc<watch::Sender<MutationSnapshot>>,
}

impl MutationTracker {
    pub fn new() -> Self {
        let (status, _) = watch::channel(MutationSnapshot::default());
        Self {
            status: Arc::new(status),
        }
    }

    pub fn snapshot(&self) -> MutationSnapshot {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationSnapshot> {
        self.status.subscribe()
    }

    /// Marks a request of `kind` as dispatched. The returned flight must be
    /// settled; dropping it unsettled clears the in-progress flag as well.
    pub fn start(&self, kind: MutationKind) -> MutationFlight {
        self.status.send_modify(|snapshot| {
            let status = &mut snapshot.kinds[kind.index()];
            status.in_flight += 1;
            status.state = MutationState::InProgress;
        });
        MutationFlight {
            tracker: self.clone(),
            kind,
            settled: false,
        }
    }

    /// Returns a settled kind to Idle. Has no effect while requests are in flight.
    pub fn reset(&self, kind: MutationKind) {
        self.status.send_if_modified(|snapshot| {
            let status = &mut snapshot.kinds[kind.index()];
            if status.in_flight > 0 || status.state == MutationState::Idle {
                return false;
            }
            status.state = MutationState::Idle;
            true
        });
    }

    fn settle(&self, kind: MutationKind, outcome: MutationState) {
        self.status.send_modify(|snapshot| {
            let status = &mut snapshot.kinds[kind.index()];
            status.in_flight = status.in_flight.saturating_sub(1);
            status.state = if status.in_flight > 0 {
                MutationState::InProgress
            } else {
                outcome
            };
        });
    }
}

impl Default for MutationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One dispatched mutation request.
pub struct MutationFlight {
    tracker: MutationTracker,
    kind: MutationKind,
    settled: bool,
}

impl MutationFlight {
    pub fn succeed(mut self) {
        self.settled = true;
        self.tracker.settle(self.kind, MutationState::Success);
    }

    pub fn fail(mut self) {
        self.settled = true;
        self.tracker.settle(self.kind, MutationState::Failed);
    }
}

impl Drop for MutationFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.settle(self.kind, MutationState::Idle);
        }
    }
}
