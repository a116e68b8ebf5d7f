use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use tracing::{debug, warn};

/// Summary of a successfully precached effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectInfo {
    pub name: String,
    pub bytes: usize,
}

/// Loads (and warms) the compiled gradient effect ahead of the first frame.
pub trait EffectLoader: Send + Sync {
    /// Human-readable name used in log lines.
    fn describe(&self) -> String;
    fn load(&self) -> Result<EffectInfo>;
}

/// Reads a compiled effect from disk.
#[derive(Debug, Clone)]
pub struct FileEffectLoader {
    path: PathBuf,
}

impl FileEffectLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EffectLoader for FileEffectLoader {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<EffectInfo> {
        let contents = fs::read(&self.path)
            .with_context(|| format!("failed to read effect at {}", self.path.display()))?;
        if contents.is_empty() {
            anyhow::bail!("effect at {} is empty", self.path.display());
        }
        Ok(EffectInfo {
            name: self.describe(),
            bytes: contents.len(),
        })
    }
}

/// Result reported by a precache worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecacheOutcome {
    Ready(EffectInfo),
    Failed(String),
}

/// Receiving end of a detached precache worker.
///
/// Dropping the task does not cancel the worker; the outcome is logged either way.
pub struct PrecacheTask {
    effect: String,
    outcome: Receiver<PrecacheOutcome>,
}

impl PrecacheTask {
    pub fn effect(&self) -> &str {
        &self.effect
    }

    /// Returns the outcome if the worker has finished.
    pub fn try_outcome(&self) -> Option<PrecacheOutcome> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the worker to finish.
    pub fn wait(&self, timeout: Duration) -> Option<PrecacheOutcome> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl fmt::Debug for PrecacheTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrecacheTask")
            .field("effect", &self.effect)
            .finish()
    }
}

/// Runs `loader` once on a background thread.
///
/// Failures are logged and never reach the caller; the surface keeps
/// rendering with whatever the external effect pipeline provides.
pub fn precache_effect(loader: Arc<dyn EffectLoader>) -> PrecacheTask {
    let effect = loader.describe();
    let (sender, receiver) = bounded(1);
    let worker_effect = effect.clone();
    let spawned = thread::Builder::new()
        .name("meshgrad-precache".into())
        .spawn(move || {
            let outcome = match loader.load() {
                Ok(info) => {
                    debug!(effect = %info.name, bytes = info.bytes, "effect precached");
                    PrecacheOutcome::Ready(info)
                }
                Err(err) => {
                    warn!(effect = %worker_effect, error = ?err, "failed to precache effect");
                    PrecacheOutcome::Failed(format!("{err:#}"))
                }
            };
            let _ = sender.send(outcome);
        });
    if let Err(err) = spawned {
        warn!(effect = %effect, %err, "failed to spawn precache worker");
    }
    PrecacheTask { effect, outcome: receiver }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    struct FailingLoader;

    impl EffectLoader for FailingLoader {
        fn describe(&self) -> String {
            "failing".into()
        }

        fn load(&self) -> Result<EffectInfo> {
            anyhow::bail!("effect unavailable")
        }
    }

    #[test]
    fn loads_effect_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"@fragment fn main() {}").unwrap();

        let task = precache_effect(Arc::new(FileEffectLoader::new(file.path())));
        match task.wait(WAIT) {
            Some(PrecacheOutcome::Ready(info)) => assert_eq!(info.bytes, 22),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn missing_effect_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileEffectLoader::new(dir.path().join("missing.wgsl"));
        let task = precache_effect(Arc::new(loader));
        match task.wait(WAIT) {
            Some(PrecacheOutcome::Failed(message)) => {
                assert!(message.contains("failed to read effect"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn loader_errors_are_captured() {
        let task = precache_effect(Arc::new(FailingLoader));
        assert_eq!(task.effect(), "failing");
        assert_eq!(
            task.wait(WAIT),
            Some(PrecacheOutcome::Failed("effect unavailable".into()))
        );
        assert_eq!(task.try_outcome(), None);
    }
}
