//! Configuration file watcher for hot reload.
//!
//! Only proxy rules and page settings take effect on reload. A file that
//! fails to load or parse is logged and skipped; the server keeps what it has.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::DevServerConfig;

/// Watches one config file and sends each successfully loaded version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DevServerConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DevServerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching on notify's background thread.
    ///
    /// Reloads stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let watched = path.clone();

        let handler = move |res: notify::Result<Event>| reload_on_change(&watched, &update_tx, res);
        let config = Config::default().with_poll_interval(Duration::from_secs(2));
        let mut watcher = RecommendedWatcher::new(handler, config)?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

fn reload_on_change(
    path: &Path,
    update_tx: &mpsc::UnboundedSender<DevServerConfig>,
    res: notify::Result<Event>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Config watch error");
            return;
        }
    };
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return;
    }

    tracing::info!(path = %path.display(), "Config file changed, reloading");
    match load_config(path) {
        // The receiver is gone once the server stops.
        Ok(config) => {
            let _ = update_tx.send(config);
        }
        Err(e) => tracing::error!(error = %e, "Config reload failed, keeping current rules"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, EventKind, ModifyKind};
    use std::fs;

    #[test]
    fn only_loadable_changes_are_sent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devserver.toml");
        let (tx, mut rx) = mpsc::unbounded_channel();

        fs::write(&path, "[server]\nport = 4100\n").unwrap();
        reload_on_change(&path, &tx, Ok(Event::new(EventKind::Access(AccessKind::Any))));
        reload_on_change(&path, &tx, Err(notify::Error::generic("watch failed")));
        assert!(rx.try_recv().is_err());

        fs::write(&path, "[server\nport = ").unwrap();
        reload_on_change(&path, &tx, Ok(Event::new(EventKind::Modify(ModifyKind::Any))));
        assert!(rx.try_recv().is_err());

        fs::write(&path, "[server]\nport = 4101\n").unwrap();
        reload_on_change(&path, &tx, Ok(Event::new(EventKind::Modify(ModifyKind::Any))));
        assert_eq!(rx.try_recv().unwrap().server.port, 4101);
    }

    #[tokio::test]
    async fn delivers_reloaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devserver.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _guard = watcher.run().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        fs::write(&path, "[server]\nport = 4001\n").unwrap();

        let config = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                match updates.recv().await {
                    Some(config) if config.server.port == 4001 => return config,
                    Some(_) => continue,
                    None => panic!("watcher channel closed"),
                }
            }
        })
        .await
        .expect("no reload delivered");

        assert_eq!(config.server.port, 4001);
    }
}
