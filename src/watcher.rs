//! Device Watcher
//!
//! Turns the polling device-list interface into a stream of add/remove
//! change events.
//!
//! ## Lifecycle
//! ```text
//! Idle ──start()──▶ Polling ──stop()──▶ Stopped
//! ```
//!
//! The polling loop runs on its own background thread. `stop()` signals
//! the loop and joins it; no events are delivered after `stop()` returns.
//! Transport failures inside the loop are reported on a side error channel
//! and polling continues, since the server may restart at any time.

use std::collections::BTreeMap;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::Serialize;

use crate::device::{parse_device_list_long, DeviceInfo};
use crate::error::{AdbError, Result};
use crate::network::Server;

/// Source of device snapshots for the polling loop.
///
/// Injected so the loop can be driven deterministically under test; the
/// production implementation is the `Server` handle issuing
/// `host:devices-l` round trips.
pub trait DeviceLister: Send + 'static {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>>;
}

impl DeviceLister for Server {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let payload = self.round_trip_single_response("host:devices-l")?;
        parse_device_list_long(&String::from_utf8_lossy(&payload))
    }
}

/// The difference between two successive device snapshots.
///
/// A device whose connection state changed appears in both sets: removed
/// with its old state, added with its new one. Never emitted empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    /// Devices present now but absent from the previous snapshot
    pub added: Vec<DeviceInfo>,

    /// Devices present before but absent now
    pub removed: Vec<DeviceInfo>,
}

/// A snapshot of the attached device set, keyed by serial
pub type Snapshot = BTreeMap<String, DeviceInfo>;

/// Build a snapshot from a device listing
pub fn snapshot_from(devices: Vec<DeviceInfo>) -> Snapshot {
    devices.into_iter().map(|d| (d.serial.clone(), d)).collect()
}

/// Compute the change event between two snapshots, if any.
///
/// Keyed by serial; a state transition is reported as removed-then-added,
/// never as a silent mutation. Returns `None` when nothing changed.
pub fn diff_snapshots(previous: &Snapshot, current: &Snapshot) -> Option<ChangeEvent> {
    let mut added = Vec::new();
    let mut removed = Vec::new();

    for (serial, device) in current {
        match previous.get(serial) {
            None => added.push(device.clone()),
            Some(old) if old.state != device.state => {
                removed.push(old.clone());
                added.push(device.clone());
            }
            Some(_) => {}
        }
    }

    for (serial, device) in previous {
        if !current.contains_key(serial) {
            removed.push(device.clone());
        }
    }

    if added.is_empty() && removed.is_empty() {
        None
    } else {
        Some(ChangeEvent { added, removed })
    }
}

/// Watcher lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatcherState {
    Idle,
    Polling,
    Stopped,
}

struct Inner {
    state: WatcherState,
    lister: Option<Box<dyn DeviceLister>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Watches the device set and emits change events to subscribers.
///
/// One background polling thread per watcher instance; the snapshot is
/// owned solely by that thread. Consumers observe only the event stream.
pub struct DeviceWatcher {
    interval: Duration,
    events_tx: Sender<ChangeEvent>,
    events_rx: Receiver<ChangeEvent>,
    errors_tx: Sender<AdbError>,
    errors_rx: Receiver<AdbError>,
    inner: Mutex<Inner>,
}

impl DeviceWatcher {
    /// Create a watcher in the `Idle` state over the given poll source
    pub fn new(lister: impl DeviceLister, poll_interval: Duration) -> Self {
        let (events_tx, events_rx) = unbounded();
        let (errors_tx, errors_rx) = unbounded();

        Self {
            interval: poll_interval,
            events_tx,
            events_rx,
            errors_tx,
            errors_rx,
            inner: Mutex::new(Inner {
                state: WatcherState::Idle,
                lister: Some(Box::new(lister)),
                stop_tx: None,
                handle: None,
            }),
        }
    }

    /// Subscribe to the change-event stream (events arrive oldest first)
    pub fn events(&self) -> Receiver<ChangeEvent> {
        self.events_rx.clone()
    }

    /// Subscribe to transient poll failures
    pub fn errors(&self) -> Receiver<AdbError> {
        self.errors_rx.clone()
    }

    /// Spawn the polling loop: `Idle` → `Polling`.
    ///
    /// Does nothing when already polling or stopped.
    pub fn start(&self) {
        let mut inner = self.inner.lock();
        if inner.state != WatcherState::Idle {
            tracing::warn!("start() ignored in state {:?}", inner.state);
            return;
        }

        // Lister is always present while Idle
        let Some(lister) = inner.lister.take() else {
            return;
        };
        let (stop_tx, stop_rx) = bounded(1);
        let events_tx = self.events_tx.clone();
        let errors_tx = self.errors_tx.clone();
        let interval = self.interval;

        inner.handle = Some(std::thread::spawn(move || {
            poll_loop(lister, interval, events_tx, errors_tx, stop_rx);
        }));
        inner.stop_tx = Some(stop_tx);
        inner.state = WatcherState::Polling;
        tracing::debug!("device watcher started (interval {:?})", interval);
    }

    /// Terminate the watcher: `Polling` → `Stopped`.
    ///
    /// Signals the loop and blocks until it has exited; a poll already in
    /// flight completes first. Safe to call in any state, including before
    /// any poll has run.
    pub fn stop(&self) {
        let (stop_tx, handle) = {
            let mut inner = self.inner.lock();
            if inner.state == WatcherState::Stopped {
                return;
            }
            inner.state = WatcherState::Stopped;
            (inner.stop_tx.take(), inner.handle.take())
        };

        if let Some(tx) = stop_tx {
            let _ = tx.send(());
        }
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("device watcher thread panicked");
            }
        }
        tracing::debug!("device watcher stopped");
    }
}

impl Drop for DeviceWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The polling loop body.
///
/// The first successful poll seeds the baseline snapshot without emitting
/// events. Poll failures are reported and polling continues.
fn poll_loop(
    lister: Box<dyn DeviceLister>,
    interval: Duration,
    events_tx: Sender<ChangeEvent>,
    errors_tx: Sender<AdbError>,
    stop_rx: Receiver<()>,
) {
    let mut baseline: Option<Snapshot> = None;

    loop {
        match lister.list_devices() {
            Ok(devices) => {
                let current = snapshot_from(devices);
                if let Some(previous) = &baseline {
                    if let Some(event) = diff_snapshots(previous, &current) {
                        tracing::debug!(
                            added = event.added.len(),
                            removed = event.removed.len(),
                            "device set changed"
                        );
                        if events_tx.send(event).is_err() {
                            // Every subscriber is gone; nothing left to do
                            return;
                        }
                    }
                }
                baseline = Some(current);
            }
            Err(e) => {
                // Transient by contract: the server may restart, so the
                // loop keeps polling rather than terminating
                tracing::warn!("device poll failed: {}", e);
                let _ = errors_tx.send(e);
            }
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
