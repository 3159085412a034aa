// nicetone-cli/src/main.rs

//! Line-oriented frontend for the NiceTone classification engine.
//!
//! Stands in for the audio-capture and rendering collaborators: reads
//! `(frequency, amplitude)` samples and control commands from stdin,
//! runs classification on a dedicated worker thread, and prints each
//! accepted snapshot as one JSON line on stdout.
//!
//! Protocol, one command per line:
//! - `<freq> <amp>`   feed a pitch sample
//! - `ref <hz>`       set the reference (concert pitch) frequency
//! - `target <note>`  select a target note (C, C#, ... B)
//! - `reset`          snap the reference back to the target's canonical frequency
//! - `+` / `-`        nudge the reference by 1 Hz
//! - `quit`           shut down

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, Sender};
use nicetone_core::session::{ClassifierWorker, SampleSlot, TunerControls};
use nicetone_core::{ClassificationSnapshot, PitchSample, tuning};
use serde_json::json;

fn main() -> Result<()> {
    eprintln!("[MAIN] Starting NiceTone classifier...");
    let slot = Arc::new(SampleSlot::default());
    let controls = Arc::new(TunerControls::default());
    let (tick_tx, tick_rx) = crossbeam_channel::bounded::<()>(64);
    let (snapshot_tx, snapshot_rx) = crossbeam_channel::unbounded();

    let worker = ClassifierWorker::spawn(
        Arc::clone(&slot),
        Arc::clone(&controls),
        tick_rx,
        snapshot_tx,
    );
    let printer = spawn_printer(snapshot_rx, Arc::clone(&controls));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        if let Err(e) = handle_line(line, &slot, &controls, &tick_tx) {
            eprintln!("[MAIN] Ignoring input {line:?}: {e}");
        }
    }

    eprintln!("[MAIN] Shutting down...");
    // Closing the tick channel lets the worker drain before the
    // shutdown signal lands.
    drop(tick_tx);
    worker.shutdown();
    let _ = printer.join();
    eprintln!("[MAIN] Done");
    Ok(())
}

/// Parses one input line and routes it to the slot or the controls.
fn handle_line(
    line: &str,
    slot: &SampleSlot,
    controls: &TunerControls,
    tick_tx: &Sender<()>,
) -> Result<()> {
    let mut parts = line.split_whitespace();
    let head = parts.next().ok_or_else(|| anyhow!("empty command"))?;

    match head {
        "ref" => {
            let hz: f64 = parts
                .next()
                .ok_or_else(|| anyhow!("missing frequency"))?
                .parse()
                .context("reference must be a number")?;
            if hz <= 0.0 {
                return Err(anyhow!("reference must be positive"));
            }
            controls.set_reference_frequency(hz);
        }
        "target" => {
            let note = parts.next().ok_or_else(|| anyhow!("missing note name"))?;
            controls.set_target_note(note)?;
        }
        "reset" => controls.reset_to_target(),
        "+" => controls.increment_reference(),
        "-" => controls.decrement_reference(),
        _ => {
            let frequency: f64 = head
                .parse()
                .context("expected a frequency or a command")?;
            let amplitude: f64 = parts
                .next()
                .ok_or_else(|| anyhow!("missing amplitude"))?
                .parse()
                .context("amplitude must be a number")?;
            if slot.publish(PitchSample { frequency, amplitude }).is_some() {
                eprintln!("[MAIN] Worker is behind, dropped a stale sample");
            }
            // A full tick queue just means the worker is behind; the
            // slot already holds the newest sample.
            let _ = tick_tx.try_send(());
        }
    }
    Ok(())
}

/// Spawns the output thread: one JSON line per accepted snapshot, with
/// the gauge data the renderer needs alongside it.
fn spawn_printer(
    snapshot_rx: Receiver<ClassificationSnapshot>,
    controls: Arc<TunerControls>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for snapshot in snapshot_rx.iter() {
            let target_note = controls.target_note();
            let target_hz = tuning::note_frequency(&target_note);
            let (gauge_min, gauge_max) = controls.gauge_bounds();
            let line = json!({
                "snapshot": snapshot,
                "reference_hz": controls.reference_frequency(),
                "target_note": target_note,
                "cents_from_target": tuning::cents_deviation(snapshot.pitch, target_hz),
                "gauge_min": gauge_min,
                "gauge_max": gauge_max,
            });
            println!("{line}");
        }
        eprintln!("[PRINTER] Snapshot channel closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harness() -> (SampleSlot, TunerControls, Sender<()>, Receiver<()>) {
        let (tick_tx, tick_rx) = crossbeam_channel::bounded(4);
        (SampleSlot::default(), TunerControls::default(), tick_tx, tick_rx)
    }

    #[test]
    fn sample_lines_land_in_the_slot() {
        let (slot, controls, tick_tx, tick_rx) = harness();
        handle_line("440.0 0.5", &slot, &controls, &tick_tx).unwrap();
        assert_eq!(
            slot.take(),
            Some(PitchSample { frequency: 440.0, amplitude: 0.5 })
        );
        assert!(tick_rx.try_recv().is_ok());
    }

    #[test]
    fn control_lines_mutate_the_controls() {
        let (slot, controls, tick_tx, _tick_rx) = harness();
        handle_line("ref 432", &slot, &controls, &tick_tx).unwrap();
        assert_eq!(controls.reference_frequency(), 432.0);
        handle_line("target C", &slot, &controls, &tick_tx).unwrap();
        assert_eq!(controls.reference_frequency(), 261.0);
        handle_line("+", &slot, &controls, &tick_tx).unwrap();
        assert_eq!(controls.reference_frequency(), 262.0);
        handle_line("reset", &slot, &controls, &tick_tx).unwrap();
        assert_eq!(controls.reference_frequency(), 261.0);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let (slot, controls, tick_tx, tick_rx) = harness();
        assert!(handle_line("ref zero", &slot, &controls, &tick_tx).is_err());
        assert!(handle_line("ref -440", &slot, &controls, &tick_tx).is_err());
        assert!(handle_line("target H", &slot, &controls, &tick_tx).is_err());
        assert!(handle_line("440.0", &slot, &controls, &tick_tx).is_err());
        assert!(handle_line("hello world", &slot, &controls, &tick_tx).is_err());
        assert!(slot.take().is_none());
        assert!(tick_rx.try_recv().is_err());
        assert_eq!(controls.reference_frequency(), 440.0);
    }
}
