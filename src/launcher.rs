use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::error::LaunchError;
use crate::video::Resolved;

const REAP_INTERVAL: Duration = Duration::from_millis(250);

struct Player {
    command: String,
    child: Child,
}

// ---------------------------------------------------------------------------
// Launcher: fire-and-forget player processes
// ---------------------------------------------------------------------------

/// Starts players without waiting on them. Exited children are collected by
/// a background reaper thread.
pub struct Launcher {
    reaper: Sender<Player>,
}

impl Launcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        if let Err(e) = thread::Builder::new()
            .name("player-reaper".into())
            .spawn(move || reap(rx))
        {
            log::error!("Could not start reaper thread: {}", e);
        }
        Self { reaper: tx }
    }

    /// Spawn the player and return its pid.
    pub fn launch(&self, resolved: &Resolved) -> Result<u32, LaunchError> {
        let mut argv = resolved.argv().into_iter();
        let command = argv.next().unwrap_or_default();

        let child = Command::new(&command)
            .args(argv)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                command: command.clone(),
                source,
            })?;
        let pid = child.id();
        log::info!("Started {} (pid {})", resolved, pid);

        if let Err(mpsc::SendError(mut player)) = self.reaper.send(Player { command, child }) {
            log::warn!("Reaper is gone, waiting on pid {} from its own thread", pid);
            thread::spawn(move || {
                if let Err(e) = player.child.wait() {
                    log::warn!("Lost track of {} (pid {}): {}", player.command, pid, e);
                }
            });
        }
        Ok(pid)
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll children until the launcher is dropped and every child has exited.
fn reap(rx: Receiver<Player>) {
    let mut running: Vec<Player> = Vec::new();
    let mut connected = true;

    while connected || !running.is_empty() {
        if connected {
            match rx.recv_timeout(REAP_INTERVAL) {
                Ok(player) => running.push(player),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => connected = false,
            }
            while let Ok(player) = rx.try_recv() {
                running.push(player);
            }
        } else {
            thread::sleep(REAP_INTERVAL);
        }

        running.retain_mut(|p| match p.child.try_wait() {
            Ok(Some(status)) => {
                log::info!("{} (pid {}) exited: {}", p.command, p.child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("Lost track of {} (pid {}): {}", p.command, p.child.id(), e);
                false
            }
        });
    }
    log::debug!("Reaper finished");
}
