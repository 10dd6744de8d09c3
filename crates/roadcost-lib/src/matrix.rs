//! Travel-cost matrix and the parallel builder that fills it.
//!
//! The builder hands each worker `(source index, &mut row)` jobs over a
//! bounded channel, so exclusive ownership of every row is enforced by the
//! borrow checker rather than a lock: no two workers can ever write the same
//! cell, and the matrix itself needs no synchronization. Channel close is
//! the shutdown signal; the builder joins every worker before returning, so
//! the finished matrix is plainly visible to the caller.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use crossbeam_channel::bounded;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::{NodeId, RoadNetwork};
use crate::matching::MatchedLocations;
use crate::queue::QueueKind;
use crate::search::{shortest_paths, UNREACHABLE};

/// Square travel-cost table indexed by matched-location index, row-major.
/// Index 0 is the depot. Cell (i, j) holds the directed cost from location
/// i to location j in meters, or [`UNREACHABLE`].
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    /// A matrix with every off-diagonal cell at the unreachable sentinel
    /// and a zero diagonal.
    pub fn unreachable(size: usize) -> Self {
        let mut cells = vec![UNREACHABLE; size * size];
        for i in 0..size {
            cells[i * size + i] = 0.0;
        }
        Self { size, cells }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost from `from` to `to`. Indices must be below [`Self::size`].
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.size + to]
    }

    /// Overwrite one cell. Indices must be below [`Self::size`].
    pub fn set(&mut self, from: usize, to: usize, value: f64) {
        self.cells[from * self.size + to] = value;
    }

    /// One full row as a slice.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.cells[from * self.size..(from + 1) * self.size]
    }

    fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, f64> {
        self.cells.chunks_mut(self.size)
    }

    /// Write the matrix as plain text: the size on the first line, then one
    /// whitespace-separated row per line. Unreachable cells print as `inf`,
    /// which [`Self::load`] parses back to the sentinel.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", self.size)?;
        for row in self.cells.chunks(self.size) {
            let line: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            writeln!(writer, "{}", line.join(" "))?;
        }
        writer.flush()?;
        info!(path = %path.display(), size = self.size, "saved cost matrix");
        Ok(())
    }

    /// Read a matrix previously written by [`Self::save`], validating the
    /// declared size against the actual row and column counts.
    pub fn load(path: &Path) -> Result<Self> {
        let malformed = |message: String| Error::MalformedMatrix {
            path: path.to_path_buf(),
            message,
        };
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines();
        let size: usize = lines
            .next()
            .ok_or_else(|| malformed("missing size header".to_string()))?
            .trim()
            .parse()
            .map_err(|_| malformed("size header is not a number".to_string()))?;
        let mut cells = Vec::with_capacity(size * size);
        let mut rows = 0usize;
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            rows += 1;
            let mut columns = 0usize;
            for token in line.split_whitespace() {
                let value: f64 = token
                    .parse()
                    .map_err(|_| malformed(format!("unparseable cell `{token}`")))?;
                cells.push(value);
                columns += 1;
            }
            if columns != size {
                return Err(malformed(format!(
                    "row {rows} has {columns} columns, expected {size}"
                )));
            }
        }
        if rows != size {
            return Err(malformed(format!("found {rows} rows, expected {size}")));
        }
        info!(path = %path.display(), size, "loaded cost matrix");
        Ok(Self { size, cells })
    }
}

/// Caller-facing knobs for [`populate_cost_matrix`].
#[derive(Debug, Clone)]
pub struct MatrixBuildOptions {
    /// Queue implementation every worker's searches run on.
    pub queue: QueueKind,
    /// Worker-thread count, at least 1. One worker degenerates to
    /// sequential execution with identical results.
    pub workers: usize,
    /// Optional file receiving one raw timing line per completed search.
    pub timing_log: Option<PathBuf>,
}

impl Default for MatrixBuildOptions {
    fn default() -> Self {
        Self {
            queue: QueueKind::default(),
            workers: 1,
            timing_log: None,
        }
    }
}

/// Fill `matrix` with the pairwise travel costs between `matched` locations.
///
/// Runs one single-source search per location on a fixed pool of worker
/// threads. The matrix content is deterministic: it depends only on the
/// network, the matched list, and the queue kind, never on worker count or
/// scheduling. Unreachable pairs keep the sentinel and are logged, not
/// failed; spawn failures and worker panics abort the whole build.
pub fn populate_cost_matrix(
    network: &RoadNetwork,
    matched: &MatchedLocations,
    matrix: &mut CostMatrix,
    options: &MatrixBuildOptions,
) -> Result<()> {
    if options.workers == 0 {
        return Err(Error::InvalidWorkerCount);
    }
    let ids = matched.node_ids();
    if ids.len() != matrix.size() {
        return Err(Error::MatchedLocationMismatch {
            matched: ids.len(),
            expected: matrix.size(),
        });
    }
    for &id in &ids {
        network.node(id)?;
    }

    let sink = match &options.timing_log {
        Some(path) => Some(Mutex::new(BufWriter::new(File::create(path)?))),
        None => None,
    };
    let sink = sink.as_ref();

    let worker_count = options.workers.min(ids.len());
    let started = Instant::now();
    info!(
        locations = ids.len(),
        workers = worker_count,
        queue = %options.queue,
        "building travel-cost matrix"
    );

    let rows: Vec<(usize, &mut [f64])> = matrix.rows_mut().enumerate().collect();
    let (sender, receiver) = bounded(rows.len());
    let ids = &ids;

    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("matrix-worker-{worker}"))
                .spawn_scoped(scope, move || -> Result<()> {
                    for (source_index, row) in receiver {
                        fill_row(network, ids, source_index, row, options.queue, sink)?;
                    }
                    Ok(())
                })
                .map_err(Error::WorkerSpawn)?;
            workers.push(handle);
        }

        for job in rows {
            if sender.send(job).is_err() {
                // Every worker is gone; the join loop below reports why.
                break;
            }
        }
        drop(sender);

        let mut outcome = Ok(());
        for handle in workers {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    if outcome.is_ok() {
                        outcome = Err(error);
                    }
                }
                Err(_) => {
                    if outcome.is_ok() {
                        outcome = Err(Error::WorkerPanicked);
                    }
                }
            }
        }
        outcome
    })?;

    if let Some(writer) = sink {
        if let Ok(mut guard) = writer.lock() {
            guard.flush()?;
        }
    }
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "travel-cost matrix complete"
    );
    Ok(())
}

/// One worker job: a full single-source search written into the source's
/// own matrix row.
fn fill_row(
    network: &RoadNetwork,
    ids: &[NodeId],
    source_index: usize,
    row: &mut [f64],
    queue: QueueKind,
    sink: Option<&Mutex<BufWriter<File>>>,
) -> Result<()> {
    let source = ids[source_index];
    let started = Instant::now();
    let results = shortest_paths(network, source, ids, queue)?;

    let mut reached = 0usize;
    for (column, &target) in ids.iter().enumerate() {
        if column == source_index {
            continue;
        }
        let cost = results
            .get(&target)
            .map(|route| route.cost)
            .unwrap_or(UNREACHABLE);
        if cost.is_finite() {
            reached += 1;
        } else {
            warn!(source, target, "no path between matched locations");
        }
        row[column] = cost;
    }

    let elapsed = started.elapsed().as_micros() as u64;
    debug!(source_index, reached, micros = elapsed, "matrix row complete");
    if let Some(writer) = sink {
        if let Ok(mut guard) = writer.lock() {
            writeln!(guard, "{source_index} {elapsed} {reached}")?;
        }
    }
    Ok(())
}
