use tokio::task::AbortHandle;

/// Identifies which issue of an asynchronous operation a completion
/// belongs to. Completions carrying an old generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Generation(u64);

/// One in-flight operation slot. Superseding aborts the previous task
/// and bumps the generation, so a stale completion can neither arrive
/// (task aborted) nor be applied (generation mismatch).
#[derive(Default)]
pub(crate) struct PendingOp {
    generation: u64,
    task: Option<AbortHandle>,
}

impl PendingOp {
    /// Cancels whatever was in flight and returns the generation the
    /// replacement operation must be tagged with.
    pub(crate) fn supersede(&mut self) -> Generation {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        Generation(self.generation)
    }

    pub(crate) fn track(&mut self, task: AbortHandle) {
        self.task = Some(task);
    }

    pub(crate) fn matches(&self, generation: Generation) -> bool {
        generation == Generation(self.generation)
    }

    pub(crate) fn cancel(&mut self) {
        let _ = self.supersede();
    }
}

/// One live slot per operation kind: the planner never has two
/// authoritative calls of the same kind in flight.
#[derive(Default)]
pub(crate) struct PendingOps {
    pub(crate) suggest: PendingOp,
    pub(crate) resolve: PendingOp,
    pub(crate) reverse: PendingOp,
    pub(crate) route: PendingOp,
}

impl PendingOps {
    pub(crate) fn cancel_all(&mut self) {
        self.suggest.cancel();
        self.resolve.cancel();
        self.reverse.cancel();
        self.route.cancel();
    }
}
