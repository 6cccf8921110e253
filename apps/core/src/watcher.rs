//! File System Watcher
//!
//! Event-driven monitoring of the void directory. Changes to archives
//! trigger a background reindex; appends to the active file do not.

use crate::error::{Result, VoidError};
use crate::indexer::Indexer;
use crate::void::Void;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// How often the watch thread checks whether it should stop.
const STOP_POLL: Duration = Duration::from_millis(250);

/// File system event watcher.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<std::result::Result<Event, notify::Error>>,
}

impl FileWatcher {
    /// Create a new file watcher.
    pub fn new() -> Result<Self> {
        let (tx, rx) = channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        Ok(Self { watcher, rx })
    }

    /// Start watching a directory (its direct children only).
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    /// Stop watching a directory.
    pub fn unwatch(&mut self, path: &Path) -> Result<()> {
        self.watcher.unwatch(path)?;
        Ok(())
    }

    /// Get the next event (blocking).
    pub fn next_event(&self) -> Option<Event> {
        match self.rx.recv() {
            Ok(Ok(event)) => Some(event),
            _ => None,
        }
    }

    /// Get the next event with timeout.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(event)) => Some(event),
            Ok(Err(e)) => {
                warn!("Watcher error: {}", e);
                None
            }
            Err(_) => None,
        }
    }

    /// Check for pending events (non-blocking).
    pub fn try_next_event(&self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(Ok(event)) => Some(event),
            _ => None,
        }
    }
}

/// Whether an event can change what recall sees.
pub fn touches_archive(void: &Void, event: &Event) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant_kind && event.paths.iter().any(|path| void.is_archive(path))
}

/// Background thread that reindexes whenever an archive changes.
///
/// The watch stops when this handle is dropped.
pub struct VoidWatch {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VoidWatch {
    pub fn spawn(indexer: Indexer) -> Result<Self> {
        let void = indexer.void().clone();
        let dir = void.dir().to_path_buf();
        let mut watcher = FileWatcher::new()?;
        watcher.watch(&dir)?;
        debug!("Watching {:?}", dir);

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread_dir = dir.clone();
        let handle = std::thread::Builder::new()
            .name("voider-watch".to_string())
            .spawn(move || {
                while !thread_stop.load(Ordering::Relaxed) {
                    let Some(event) = watcher.next_event_timeout(STOP_POLL) else {
                        continue;
                    };
                    if !touches_archive(&void, &event) {
                        continue;
                    }
                    debug!("Archive change {:?}, reindexing", event.paths);
                    if let Err(e) = indexer.reindex() {
                        warn!("Reindex after change failed: {}", e);
                    }
                }
                if let Err(e) = watcher.unwatch(&thread_dir) {
                    debug!("Unwatch {:?} failed: {}", thread_dir, e);
                }
            })
            .map_err(|e| VoidError::io(&dir, e))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the watch thread, release the directory watch, and wait for
    /// the thread to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for VoidWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &Path) -> Event {
        Event::new(kind).add_path(path.to_path_buf())
    }

    #[test]
    fn test_active_file_changes_are_ignored() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();

        let append = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &void.active_path(),
        );
        assert!(!touches_archive(&void, &append));
    }

    #[test]
    fn test_archive_changes_are_relevant() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        let archive = temp.path().join("monday.txt");

        assert!(touches_archive(
            &void,
            &event(EventKind::Create(CreateKind::File), &archive)
        ));
        assert!(touches_archive(
            &void,
            &event(EventKind::Remove(RemoveKind::File), &archive)
        ));
        assert!(!touches_archive(
            &void,
            &event(EventKind::Create(CreateKind::File), &temp.path().join("x.md"))
        ));
        assert!(!touches_archive(
            &void,
            &event(EventKind::Access(AccessKind::Any), &archive)
        ));
    }

    #[test]
    fn test_file_watcher_reports_changes_until_unwatched() {
        let temp = TempDir::new().unwrap();
        let mut watcher = FileWatcher::new().unwrap();
        watcher.watch(temp.path()).unwrap();

        std::fs::write(temp.path().join("a.txt"), "x\n").unwrap();
        let event = watcher.next_event().unwrap();
        assert!(event.paths.iter().any(|p| p.ends_with("a.txt")));

        watcher.unwatch(temp.path()).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        while watcher.try_next_event().is_some() {}

        std::fs::write(temp.path().join("b.txt"), "y\n").unwrap();
        std::thread::sleep(Duration::from_millis(200));
        assert!(watcher.try_next_event().is_none());
    }
}
