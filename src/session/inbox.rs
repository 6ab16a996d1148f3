//! Inbox file watcher.
//!
//! An external tool writes a selected subject into the inbox file; every
//! change is forwarded to the session as a [`SubjectEvent`].

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::session::event::SubjectEvent;

/// A watcher that monitors the inbox file for new selections.
pub struct InboxWatcher {
    path: PathBuf,
    events: mpsc::UnboundedSender<SubjectEvent>,
}

impl InboxWatcher {
    pub fn new(path: &Path, events: mpsc::UnboundedSender<SubjectEvent>) -> Self {
        Self {
            path: path.to_path_buf(),
            events,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// The parent directory is watched so the file may be created or replaced
    /// after startup.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let path = self.path.clone();
        let tx = self.events;
        let mut last_seen: Option<String> = None;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_inbox = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !touches_inbox {
                        return;
                    }

                    let Some(text) = read_inbox(&path) else {
                        return;
                    };
                    if last_seen.as_deref() == Some(text.as_str()) {
                        return;
                    }
                    match SubjectEvent::parse_selection(&text) {
                        Some(selection) => {
                            tracing::info!(subject = %selection.subject, "Selection received from inbox");
                            last_seen = Some(text);
                            let _ = tx.send(selection);
                        }
                        None => tracing::debug!("Inbox is empty, ignoring"),
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Inbox watcher started");
        Ok(watcher)
    }
}

fn read_inbox(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read inbox");
            None
        }
    }
}
