//! Persistence queue and writer thread
//!
//! All producers funnel batches through one blocking FIFO into a dedicated
//! writer thread; only that thread ever opens the sink for writing. The
//! header-written flag lives on the writer's stack, so header-once needs no
//! cross-thread synchronization at all.

use crate::record::Listing;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

/// Errors from the persistence layer.
///
/// A batch-level failure is logged and the batch dropped; the run continues.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to open sink {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to append to sink: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink writer is no longer running")]
    WriterGone,
}

/// Messages on the persistence FIFO. `Shutdown` is the end-of-run sentinel;
/// the writer stops on dequeuing it.
pub enum SinkMessage {
    Batch {
        listings: Vec<Listing>,
        include_header: bool,
    },
    Shutdown,
}

/// Producer-side handle to the persistence FIFO.
#[derive(Clone)]
pub struct SinkHandle {
    tx: flume::Sender<SinkMessage>,
}

impl SinkHandle {
    /// Enqueues one batch. Blocks (asynchronously) while the FIFO is full.
    pub async fn submit(
        &self,
        listings: Vec<Listing>,
        include_header: bool,
    ) -> Result<(), PersistenceError> {
        self.tx
            .send_async(SinkMessage::Batch {
                listings,
                include_header,
            })
            .await
            .map_err(|_| PersistenceError::WriterGone)
    }
}

/// The dedicated writer thread and its queue.
pub struct SinkWriter {
    handle: Option<thread::JoinHandle<u64>>,
    tx: flume::Sender<SinkMessage>,
    path: PathBuf,
}

impl SinkWriter {
    /// Spawns the writer thread for the given sink file.
    ///
    /// If the sink already exists and is non-empty, the header is considered
    /// written and no run will ever append another one.
    pub fn spawn(path: PathBuf) -> Result<Self, PersistenceError> {
        let header_written = std::fs::metadata(&path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);

        let (tx, rx) = flume::bounded::<SinkMessage>(64);
        let writer_path = path.clone();
        let handle = thread::Builder::new()
            .name("sink-writer".to_string())
            .spawn(move || writer_loop(&writer_path, rx, header_written))?;

        Ok(Self {
            handle: Some(handle),
            tx,
            path,
        })
    }

    pub fn handle(&self) -> SinkHandle {
        SinkHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sends the shutdown sentinel and joins the writer thread, returning the
    /// cumulative row count. Blocks until the queue has drained.
    pub fn finish(mut self) -> u64 {
        let _ = self.tx.send(SinkMessage::Shutdown);
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                tracing::error!("sink writer thread panicked");
                0
            }),
            None => 0,
        }
    }
}

fn writer_loop(path: &Path, rx: flume::Receiver<SinkMessage>, mut header_written: bool) -> u64 {
    let mut total: u64 = 0;

    while let Ok(message) = rx.recv() {
        match message {
            SinkMessage::Shutdown => break,
            SinkMessage::Batch {
                listings,
                include_header,
            } => {
                let write_header = include_header && !header_written;
                if write_header {
                    // Marked before the attempt: a partial failure may already
                    // have put the header on disk, and a duplicate header is
                    // worse than a missing one.
                    header_written = true;
                }

                match append_batch(path, &listings, write_header) {
                    Ok(rows) => {
                        total += rows;
                        tracing::info!(rows, sink = %path.display(), "appended batch");
                    }
                    Err(e) => {
                        tracing::error!(
                            dropped = listings.len(),
                            sink = %path.display(),
                            "batch write failed, dropping batch: {e}"
                        );
                    }
                }
            }
        }
    }

    tracing::info!(total, sink = %path.display(), "sink writer finished");
    total
}

/// Appends one batch as a contiguous block, optionally preceded by the header.
fn append_batch(
    path: &Path,
    listings: &[Listing],
    write_header: bool,
) -> Result<u64, PersistenceError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PersistenceError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if write_header {
        writer.write_record(Listing::COLUMNS)?;
    }
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;

    Ok(listings.len() as u64)
}
