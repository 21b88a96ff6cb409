use tokio::sync::watch;
use tracing::{info, warn};

/// The stages an initiating flow moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Generate,
    Verify,
    Sign,
    GatherSignatures,
    Finalize,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Generate,
        Stage::Verify,
        Stage::Sign,
        Stage::GatherSignatures,
        Stage::Finalize,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Generate => "Generating transaction based on parameters",
            Stage::Verify => "Verifying contract constraints",
            Stage::Sign => "Signing transaction with our private key",
            Stage::GatherSignatures => "Gathering the counterparty's signature.",
            Stage::Finalize => "Obtaining notary signature and recording transaction",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub current: Option<Stage>,
    pub visited: Vec<Stage>,
}

/// Publishes the stage a flow is in. Observers subscribe and see each change;
/// stages only ever move forward.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<Progress>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Progress::default());
        ProgressTracker { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Stage> {
        self.tx.borrow().current
    }

    pub fn visited(&self) -> Vec<Stage> {
        self.tx.borrow().visited.clone()
    }

    /// Moves to `stage`. Moving backwards or repeating a stage is ignored.
    pub fn set(&self, stage: Stage) {
        self.tx.send_if_modified(|progress| {
            if progress.current.is_some_and(|current| stage <= current) {
                warn!(?stage, current = ?progress.current, "Ignoring backwards progress step");
                return false;
            }
            info!(stage = stage.label(), "Flow progress");
            progress.current = Some(stage);
            progress.visited.push(stage);
            true
        });
    }
}
