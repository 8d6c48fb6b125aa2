//! Background I/O manager using threads and channels.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use crate::async_io::{IoRequest, IoResponse};
use crate::fs::read_directory;

/// Manages background I/O operations on a dedicated thread.
///
/// Requests are sent via `send()` and responses are polled via `try_recv()`.
/// The background thread terminates when the IoManager is dropped.
#[derive(Debug)]
pub struct IoManager {
    tx: Sender<IoRequest>,
    rx: Receiver<IoResponse>,
}

impl IoManager {
    /// Create a new IoManager with a background worker thread.
    #[must_use]
    pub fn new() -> Self {
        let (req_tx, req_rx) = channel::<IoRequest>();
        let (res_tx, res_rx) = channel::<IoResponse>();

        thread::spawn(move || {
            while let Ok(request) = req_rx.recv() {
                handle_request(request, &res_tx);
            }
        });

        Self {
            tx: req_tx,
            rx: res_rx,
        }
    }

    /// Send a request to the background worker.
    pub fn send(&self, req: IoRequest) {
        // Only fails once the worker thread has exited
        let _ = self.tx.send(req);
    }

    /// Try to receive a response without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<IoResponse> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<IoResponse> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Default for IoManager {
    fn default() -> Self {
        Self::new()
    }
}

fn handle_request(req: IoRequest, tx: &Sender<IoResponse>) {
    match req {
        IoRequest::List(path) => {
            let response = match read_directory(&path) {
                Ok(snapshot) => IoResponse::Listed(snapshot),
                Err(e) => {
                    log::debug!("background listing of {} failed: {}", path.display(), e);
                    IoResponse::Error(path, e)
                }
            };
            let _ = tx.send(response);
        }
    }
}
