use std::sync::{Arc, Mutex};

use assetdag::errors::{BuildError, Result};
use assetdag::fs::FileSystem;

/// Shared, ordered log of names. Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str) {
        self.entries.lock().unwrap().push(name.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// A task action that records `name` and succeeds.
    pub fn action(
        &self,
        name: &str,
    ) -> impl Fn(&dyn FileSystem) -> Result<()> + Send + Sync + 'static {
        let recorder = self.clone();
        let name = name.to_string();
        move |_: &dyn FileSystem| -> Result<()> {
            recorder.record(&name);
            Ok(())
        }
    }

    /// A task action that records `name` and then fails.
    pub fn failing_action(
        &self,
        name: &str,
    ) -> impl Fn(&dyn FileSystem) -> Result<()> + Send + Sync + 'static {
        let recorder = self.clone();
        let name = name.to_string();
        move |_: &dyn FileSystem| -> Result<()> {
            recorder.record(&name);
            Err(BuildError::Other(anyhow::anyhow!("{name} exploded")))
        }
    }
}
