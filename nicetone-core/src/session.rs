//! # Session Module
//!
//! Mutable state for one capture session: the shared control context
//! written by the UI path, the tuner that folds accepted samples into
//! the classification snapshot, the single-slot register between the
//! tracker callback and the classification thread, and the worker
//! thread itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender};

use crate::classify::{self, DEFAULT_AMPLITUDE_THRESHOLD};
use crate::tuning;
use crate::{ClassificationSnapshot, PitchSample};

/// Default concert pitch in Hz.
pub const DEFAULT_REFERENCE_HZ: f64 = 440.0;

/// Shared control state: one writer (the UI/control path), many
/// readers (the classification path).
///
/// The reference frequency is stored as its bit pattern in an
/// `AtomicU64` so the classification path reads it without taking a
/// lock. Reads and writes are independent; there is no ordering
/// relationship to the sample stream, classification simply uses
/// whatever value is current when it runs.
#[derive(Debug)]
pub struct TunerControls {
    reference_bits: AtomicU64,
    target_note: Mutex<String>,
}

impl Default for TunerControls {
    fn default() -> Self {
        Self {
            reference_bits: AtomicU64::new(DEFAULT_REFERENCE_HZ.to_bits()),
            target_note: Mutex::new("A".to_string()),
        }
    }
}

impl TunerControls {
    /// The current reference (concert pitch) frequency in Hz.
    pub fn reference_frequency(&self) -> f64 {
        f64::from_bits(self.reference_bits.load(Ordering::Relaxed))
    }

    pub fn set_reference_frequency(&self, hz: f64) {
        self.reference_bits.store(hz.to_bits(), Ordering::Relaxed);
    }

    /// The currently selected target note name.
    pub fn target_note(&self) -> String {
        self.target_note
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Selects a new target note and snaps the reference to its
    /// canonical frequency, as the picker does.
    ///
    /// The selection set is the fixed 12 pitch-class names; anything
    /// else is rejected rather than silently mapped to A.
    pub fn set_target_note(&self, name: &str) -> Result<()> {
        let canonical = tuning::lookup_note_frequency(name)
            .ok_or_else(|| anyhow!("unknown note name: {name}"))?;
        *self
            .target_note
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = name.to_string();
        self.set_reference_frequency(canonical);
        Ok(())
    }

    /// Snaps the reference back to the target note's canonical frequency.
    pub fn reset_to_target(&self) {
        self.set_reference_frequency(tuning::note_frequency(&self.target_note()));
    }

    /// Nudges the reference up one Hz.
    pub fn increment_reference(&self) {
        self.set_reference_frequency(self.reference_frequency() + 1.0);
    }

    /// Nudges the reference down one Hz, never below the target note's
    /// canonical frequency.
    pub fn decrement_reference(&self) {
        let canonical = tuning::note_frequency(&self.target_note());
        let current = self.reference_frequency();
        if current > canonical {
            self.set_reference_frequency(current - 1.0);
        }
    }

    /// Gauge display bounds an octave either side of the current reference.
    pub fn gauge_bounds(&self) -> (f64, f64) {
        tuning::gauge_bounds(self.reference_frequency())
    }
}

/// Single-slot "latest sample" register between the tracker callback
/// and the classification thread.
///
/// Publishing overwrites whatever is pending, so a slow consumer
/// always sees the newest sample instead of a backlog.
#[derive(Debug, Default)]
pub struct SampleSlot {
    latest: Mutex<Option<PitchSample>>,
}

impl SampleSlot {
    /// Stores a sample, replacing any unconsumed one.
    ///
    /// Returns the sample that was displaced, if any.
    pub fn publish(&self, sample: PitchSample) -> Option<PitchSample> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(sample)
    }

    /// Removes and returns the pending sample.
    pub fn take(&self) -> Option<PitchSample> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Folds accepted samples into the classification snapshot.
///
/// All snapshot fields are recomputed together on an accepted sample;
/// rejected samples leave the snapshot untouched.
#[derive(Debug)]
pub struct Tuner {
    snapshot: ClassificationSnapshot,
    amplitude_threshold: f64,
}

impl Default for Tuner {
    fn default() -> Self {
        Self::new()
    }
}

impl Tuner {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_AMPLITUDE_THRESHOLD)
    }

    pub fn with_threshold(amplitude_threshold: f64) -> Self {
        Self {
            snapshot: ClassificationSnapshot::default(),
            amplitude_threshold,
        }
    }

    /// Classifies one sample against the current controls.
    ///
    /// Returns false when the amplitude gate or input validation
    /// rejected the sample, in which case the snapshot is unchanged.
    pub fn process(&mut self, sample: PitchSample, controls: &TunerControls) -> bool {
        if !classify::amplitude_open(sample.amplitude, self.amplitude_threshold) {
            return false;
        }
        let Some((sharp, flat)) = classify::absolute_note_names(sample.frequency) else {
            return false;
        };

        self.snapshot.pitch = sample.frequency;
        self.snapshot.amplitude = sample.amplitude;
        self.snapshot.note_name_sharp = sharp;
        self.snapshot.note_name_flat = flat;
        if let Some(base) = classify::base_note_name(sample.frequency) {
            self.snapshot.base_note_name = base.to_string();
        }
        // An unusable reference yields no relative name; keep the
        // previous one rather than showing the sentinel.
        if let Some(name) =
            classify::relative_note_name(sample.frequency, controls.reference_frequency())
        {
            self.snapshot.relative_note_name = name;
        }
        true
    }

    /// A clone of the current snapshot. Readers get a fully-old or
    /// fully-new record, never a partial update.
    pub fn snapshot(&self) -> ClassificationSnapshot {
        self.snapshot.clone()
    }
}

/// Handle to the classification worker thread.
#[derive(Debug)]
pub struct ClassifierWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ClassifierWorker {
    /// Spawns the classification thread.
    ///
    /// Each tick drains the latest sample from the slot, classifies it
    /// against the shared controls and sends the updated snapshot
    /// downstream. Exits when either channel closes or a shutdown
    /// signal arrives.
    pub fn spawn(
        slot: Arc<SampleSlot>,
        controls: Arc<TunerControls>,
        tick_rx: Receiver<()>,
        snapshot_tx: Sender<ClassificationSnapshot>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let thread_handle = thread::spawn(move || {
            let mut tuner = Tuner::new();
            loop {
                crossbeam_channel::select! {
                    recv(tick_rx) -> msg => match msg {
                        Ok(()) => {
                            // The tick can outlive its sample when
                            // publishes coalesce in the slot.
                            let Some(sample) = slot.take() else { continue };
                            if tuner.process(sample, &controls)
                                && snapshot_tx.send(tuner.snapshot()).is_err()
                            {
                                eprintln!("[WORKER] Snapshot channel closed, exiting");
                                break;
                            }
                        }
                        Err(_) => {
                            eprintln!("[WORKER] Tick channel closed, exiting");
                            break;
                        }
                    },
                    recv(shutdown_rx) -> _ => {
                        eprintln!("[WORKER] Received shutdown signal");
                        break;
                    }
                }
            }
        });
        Self {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        }
    }

    /// Signals the worker and waits for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}
