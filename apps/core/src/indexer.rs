//! Background indexer - Rebuilds the line index off the UI thread.
//!
//! Every `reindex()` spawns one thread that builds a fresh [`LineIndex`].
//! Builds are never cancelled; a finished build only replaces the current
//! index if no newer build has already been installed.

use crate::error::{Result, VoidError};
use crate::index::LineIndex;
use crate::void::Void;
use rand::Rng;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Result of asking for a random line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recall {
    Line(String),
    /// An index build is still running
    Busy,
    /// Nothing to recall; a reindex has been requested
    Empty,
}

#[derive(Debug, Default)]
struct State {
    index: LineIndex,
    /// Generation handed to the most recent request
    requested: u64,
    /// Generation of the index currently installed
    installed: u64,
    in_flight: usize,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Counts one running build; releases it on drop, even if the build panics.
struct InFlight {
    shared: Arc<Shared>,
}

impl InFlight {
    fn begin(shared: &Arc<Shared>) -> (Self, u64) {
        let generation = {
            let mut state = shared.lock();
            state.requested += 1;
            state.in_flight += 1;
            state.requested
        };
        let guard = Self {
            shared: Arc::clone(shared),
        };
        (guard, generation)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 {
            self.shared.idle.notify_all();
        }
    }
}

/// Cloneable handle to the background line index of a void.
#[derive(Debug, Clone)]
pub struct Indexer {
    void: Void,
    shared: Arc<Shared>,
}

impl Indexer {
    /// Create an indexer with an empty index. Call [`Indexer::reindex`] to fill it.
    pub fn new(void: Void) -> Self {
        Self {
            void,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Create an indexer and immediately start the first build.
    pub fn start(void: Void) -> Result<Self> {
        let indexer = Self::new(void);
        indexer.reindex()?;
        Ok(indexer)
    }

    pub fn void(&self) -> &Void {
        &self.void
    }

    /// Spawn a background build of the index.
    pub fn reindex(&self) -> Result<()> {
        let (in_flight, generation) = InFlight::begin(&self.shared);

        let void = self.void.clone();
        let shared = Arc::clone(&self.shared);
        // On spawn failure the closure, and with it the guard, is dropped.
        std::thread::Builder::new()
            .name(format!("voider-index-{}", generation))
            .spawn(move || {
                let _in_flight = in_flight;
                let built = LineIndex::build(&void);
                let mut state = shared.lock();
                match built {
                    Ok(index) if generation > state.installed => {
                        debug!(
                            "Installing index generation {} ({} lines)",
                            generation,
                            index.len()
                        );
                        state.index = index;
                        state.installed = generation;
                    }
                    Ok(_) => debug!("Dropping stale index generation {}", generation),
                    Err(e) => warn!("Index generation {} failed: {}", generation, e),
                }
            })
            .map_err(|e| VoidError::io(self.void.dir(), e))?;

        Ok(())
    }

    pub fn is_indexing(&self) -> bool {
        self.shared.lock().in_flight > 0
    }

    /// Number of recallable lines in the installed index.
    pub fn len(&self) -> usize {
        self.shared.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick a random line without blocking on a running build.
    pub fn recall(&self) -> Recall {
        self.recall_with_rng(&mut rand::thread_rng())
    }

    pub fn recall_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Recall {
        {
            let state = self.shared.lock();
            if state.in_flight > 0 {
                return Recall::Busy;
            }
            if let Some(line) = state.index.random_line(rng) {
                return Recall::Line(line.to_string());
            }
        }

        if let Err(e) = self.reindex() {
            warn!("Could not start reindex: {}", e);
        }
        Recall::Empty
    }

    /// Block until no build is running. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .idle
            .wait_timeout_while(state, timeout, |s| s.in_flight > 0)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.in_flight == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn test_start_indexes_archives() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        fs::write(temp.path().join("a.txt"), "only line\n.\n").unwrap();

        let indexer = Indexer::start(void).unwrap();
        assert!(indexer.wait_idle(WAIT));
        assert_eq!(indexer.len(), 1);
        assert_eq!(
            indexer.recall_with_rng(&mut StdRng::seed_from_u64(3)),
            Recall::Line("only line".to_string())
        );
    }

    #[test]
    fn test_busy_while_building() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        let indexer = Indexer::new(void);

        indexer.shared.lock().in_flight = 1;
        assert!(indexer.is_indexing());
        assert_eq!(indexer.recall(), Recall::Busy);
        assert!(!indexer.wait_idle(Duration::from_millis(20)));

        indexer.shared.lock().in_flight = 0;
        assert!(indexer.wait_idle(WAIT));
    }

    #[test]
    fn test_empty_recall_requests_reindex() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        let indexer = Indexer::new(void);

        fs::write(temp.path().join("late.txt"), "arrived late\n").unwrap();
        assert_eq!(indexer.recall(), Recall::Empty);

        assert!(indexer.wait_idle(WAIT));
        assert_eq!(indexer.recall(), Recall::Line("arrived late".to_string()));
    }

    #[test]
    fn test_newer_generation_replaces_index() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        let indexer = Indexer::new(void);
        {
            let mut state = indexer.shared.lock();
            state.requested = 5;
            state.installed = 5;
            state.index = LineIndex::from_lines(["old"]);
        }

        indexer.reindex().unwrap();
        assert!(indexer.wait_idle(WAIT));
        assert!(indexer.is_empty());
        assert_eq!(indexer.shared.lock().installed, 6);
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        let indexer = Indexer::new(void);
        {
            // a later build already landed before this one finishes
            let mut state = indexer.shared.lock();
            state.installed = 10;
            state.index = LineIndex::from_lines(["newest"]);
        }

        indexer.reindex().unwrap();
        assert!(indexer.wait_idle(WAIT));
        assert_eq!(indexer.len(), 1);
        assert_eq!(indexer.shared.lock().installed, 10);
    }

    #[test]
    fn test_panicking_build_releases_in_flight() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        let indexer = Indexer::new(void);

        let (guard, _) = InFlight::begin(&indexer.shared);
        assert!(indexer.is_indexing());

        let crashed = std::thread::spawn(move || {
            let _guard = guard;
            panic!("build blew up");
        })
        .join();
        assert!(crashed.is_err());

        assert!(indexer.wait_idle(WAIT));
        assert_ne!(indexer.recall(), Recall::Busy);
    }
}
