//! Producer / worker pool / writer pipeline.
//!
//! The calling thread drives the tokenizer and the record assembler and
//! feeds a bounded work queue. Worker threads share that queue's receiver,
//! run the template locator and pass non-empty entries to a bounded
//! result queue drained by a single writer thread. Output order is
//! completion order; with one worker it matches page order.
//!
//! Shutdown runs front to back: the producer drops the work sender, the
//! workers drain the queue and exit, the last result sender is dropped
//! once every worker has been joined, and the writer flushes after the
//! result queue runs dry.

use std::io::{BufRead, BufWriter, Write};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::assembler::{RecordAssembler, WorkItem};
use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::ipa::{find_ipa, Pronunciation};
use crate::tokenizer::{EventSource, XmlEvents};

#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub pages_scanned: usize,
    pub meta_records: usize,
    pub work_items: usize,
    pub entries_written: usize,
    pub elapsed: Duration,
}

impl Stats {
    pub fn pages_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_scanned as f64 / secs
        } else {
            0.0
        }
    }
}

/// Extract pronunciations from an XML dump into newline-delimited JSON.
pub fn process<R: BufRead, W: Write + Send>(
    reader: R,
    writer: W,
    config: &Config,
    progress: &ProgressBar,
) -> Result<Stats> {
    process_events(XmlEvents::new(reader), writer, config, progress)
}

/// Same as [`process`] for any event source.
pub fn process_events<S: EventSource, W: Write + Send>(
    mut events: S,
    writer: W,
    config: &Config,
    progress: &ProgressBar,
) -> Result<Stats> {
    config.validate()?;
    let start_time = Instant::now();

    info!(
        "Starting pipeline: {} workers, work queue {}, result queue {}",
        config.workers,
        config.work_queue_capacity(),
        config.result_queue_capacity()
    );

    let (work_tx, work_rx): (SyncSender<WorkItem>, Receiver<WorkItem>) =
        sync_channel(config.work_queue_capacity());
    let (result_tx, result_rx): (SyncSender<Pronunciation>, Receiver<Pronunciation>) =
        sync_channel(config.result_queue_capacity());

    // Only workers hold the receiver, so the producer notices when they are gone
    let work_rx = Arc::new(Mutex::new(work_rx));
    let mut assembler = RecordAssembler::new(config);
    let buffer_size = config.output_buffer_size;

    let (produced, written) = thread::scope(|scope| {
        let writer_handle =
            scope.spawn(move || write_results(result_rx, writer, buffer_size, progress));

        let worker_handles: Vec<_> = (0..config.workers)
            .map(|id| {
                let rx = Arc::clone(&work_rx);
                let tx = result_tx.clone();
                scope.spawn(move || process_work_items(id, rx, tx))
            })
            .collect();
        drop(work_rx);

        let produced = read_work_items(&mut events, &mut assembler, work_tx);

        let mut worker_panicked = false;
        for handle in worker_handles {
            if handle.join().is_err() {
                worker_panicked = true;
            }
        }
        drop(result_tx);

        let written = writer_handle
            .join()
            .unwrap_or(Err(ExtractError::ThreadPanicked("writer")));
        if worker_panicked {
            return (produced, Err(ExtractError::ThreadPanicked("worker")));
        }
        (produced, written)
    });

    let entries_written = written?;
    let work_items = produced?;

    let stats = Stats {
        pages_scanned: assembler.pages(),
        meta_records: assembler.meta_records(),
        work_items,
        entries_written,
        elapsed: start_time.elapsed(),
    };
    info!(
        "Scanned {} pages, queued {} candidates, wrote {} entries in {:.1}s",
        stats.pages_scanned,
        stats.work_items,
        stats.entries_written,
        stats.elapsed.as_secs_f64()
    );
    Ok(stats)
}

/// Producer: feed every event to the assembler, queueing each work item.
/// Consumes the sender so the queue closes when this returns.
fn read_work_items<S: EventSource>(
    events: &mut S,
    assembler: &mut RecordAssembler,
    tx: SyncSender<WorkItem>,
) -> Result<usize> {
    let mut count = 0;
    events.for_each_event(|event| {
        let Some(item) = assembler.handle(event) else {
            return true;
        };
        if tx.send(item).is_err() {
            warn!("Work queue closed before the input was exhausted");
            return false;
        }
        count += 1;
        true
    })?;
    debug!("Producer finished after {} pages", assembler.pages());
    Ok(count)
}

fn process_work_items(
    id: usize,
    rx: Arc<Mutex<Receiver<WorkItem>>>,
    tx: SyncSender<Pronunciation>,
) -> usize {
    let mut found = 0;
    loop {
        let item = {
            let lock = rx.lock().ok();
            lock.and_then(|guard| guard.recv().ok())
        };

        let Some(item) = item else {
            break;
        };

        let entry = find_ipa(&item.raw, item.entry);
        if entry.ipa.is_empty() {
            continue;
        }
        if tx.send(entry).is_err() {
            debug!("Worker {id}: result queue closed");
            break;
        }
        found += 1;
    }
    debug!("Worker {id} exiting after {found} entries");
    found
}

fn write_results<W: Write>(
    rx: Receiver<Pronunciation>,
    writer: W,
    buffer_size: usize,
    progress: &ProgressBar,
) -> Result<usize> {
    let mut writer = BufWriter::with_capacity(buffer_size, writer);
    let mut written = 0;

    while let Ok(entry) = rx.recv() {
        serde_json::to_writer(&mut writer, &entry)?;
        writer.write_all(b"\n")?;
        written += 1;
        progress.inc(1);
    }

    writer.flush()?;
    Ok(written)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
