//! Plain-text checkpoints of the full body set
//!
//! One file per snapshot, one line per body:
//!
//! ```text
//! name mass x y z vx vy vz display
//! ```
//!
//! Files live under `<output>/checkpoints/<forward|reversed>/t_<time>.txt`,
//! where `<time>` is the simulated time in the configured time unit with two
//! decimals. A `COMPLETE` marker naming the final snapshot is written when a
//! run reaches its last step; only marked runs can be rewound.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::simulation::clock::Direction;
use crate::simulation::states::{Body, BodyStore, NVec3};

const COMPLETE_MARKER: &str = "COMPLETE";
const FIELDS: usize = 9;

/// Destination for snapshots taken by the integrator
pub trait CheckpointSink {
    /// Called once before the first snapshot of a run
    fn begin_run(&mut self) -> SimResult<()> {
        Ok(())
    }

    /// Persist every body at simulated time `time` (seconds)
    fn write(&mut self, bodies: &[Body], time: f64) -> SimResult<()>;

    /// Record that the snapshot at `time` closes a finished run
    fn mark_complete(&mut self, time: f64) -> SimResult<()>;
}

/// A snapshot file on disk together with its time label
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub label: f64, // simulated time in the time unit
    pub path: PathBuf,
}

/// Directory-backed checkpoint namespace for one run direction
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
    time_unit: f64, // seconds per label unit
}

impl CheckpointStore {
    pub fn new(output_dir: &Path, direction: Direction, time_unit: f64) -> Self {
        let dir = output_dir.join("checkpoints").join(direction.dir_name());
        Self { dir, time_unit }
    }

    pub fn forward(output_dir: &Path, time_unit: f64) -> Self {
        Self::new(output_dir, Direction::Forward, time_unit)
    }

    pub fn reversed(output_dir: &Path, time_unit: f64) -> Self {
        Self::new(output_dir, Direction::Reversed, time_unit)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Two-decimal label for a time given in seconds
    pub fn label(&self, time: f64) -> String {
        format!("{:.2}", time / self.time_unit)
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("t_{label}.txt"))
    }

    /// Load the snapshot with the given label, e.g. `"1.40"`
    pub fn read_label(&self, label: &str) -> SimResult<BodyStore> {
        read(&self.path_for(label))
    }

    /// All snapshots in this namespace, ordered by time
    pub fn list(&self) -> SimResult<Vec<Snapshot>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(SimError::CheckpointReadError { path: self.dir.clone(), source }),
        };

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SimError::CheckpointReadError { path: self.dir.clone(), source })?;
            let path = entry.path();
            if let Some(label) = parse_label(&path) {
                snapshots.push(Snapshot { label, path });
            }
        }
        snapshots.sort_by(|a, b| a.label.total_cmp(&b.label));
        Ok(snapshots)
    }

    /// Highest-labelled snapshot, whether or not the run finished
    pub fn latest(&self) -> SimResult<Snapshot> {
        self.list()?
            .pop()
            .ok_or_else(|| SimError::IncompleteRun { dir: self.dir.clone() })
    }

    /// The snapshot named by the `COMPLETE` marker
    pub fn final_snapshot(&self) -> SimResult<Snapshot> {
        let marker = self.dir.join(COMPLETE_MARKER);
        let name = match fs::read_to_string(&marker) {
            Ok(name) => name,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SimError::IncompleteRun { dir: self.dir.clone() })
            }
            Err(source) => return Err(SimError::CheckpointReadError { path: marker, source }),
        };

        let path = self.dir.join(name.trim());
        let label = parse_label(&path).ok_or_else(|| SimError::CheckpointParseError {
            path: marker.clone(),
            line: 1,
            reason: format!("marker names an invalid snapshot `{}`", name.trim()),
        })?;
        if !path.is_file() {
            return Err(SimError::IncompleteRun { dir: self.dir.clone() });
        }
        Ok(Snapshot { label, path })
    }

    fn write_file(path: &Path, contents: &str) -> SimResult<()> {
        let write_err = |source| SimError::CheckpointWriteError { path: path.to_path_buf(), source };
        let tmp = path.with_extension("tmp");

        let file = File::create(&tmp).map_err(write_err)?;
        let mut out = BufWriter::new(file);
        out.write_all(contents.as_bytes()).map_err(write_err)?;
        let file = out.into_inner().map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)
    }
}

impl CheckpointSink for CheckpointStore {
    /// A new run invalidates any earlier completion marker in this namespace
    fn begin_run(&mut self) -> SimResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| SimError::CheckpointWriteError { path: self.dir.clone(), source })?;
        let marker = self.dir.join(COMPLETE_MARKER);
        match fs::remove_file(&marker) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SimError::CheckpointWriteError { path: marker, source }),
        }
    }

    fn write(&mut self, bodies: &[Body], time: f64) -> SimResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| SimError::CheckpointWriteError { path: self.dir.clone(), source })?;

        let mut contents = String::with_capacity(bodies.len() * 128);
        for b in bodies {
            contents.push_str(&format_line(b));
            contents.push('\n');
        }

        let path = self.path_for(&self.label(time));
        Self::write_file(&path, &contents)?;
        debug!(path = %path.display(), bodies = bodies.len(), "checkpoint written");
        Ok(())
    }

    fn mark_complete(&mut self, time: f64) -> SimResult<()> {
        let name = format!("t_{}.txt", self.label(time));
        Self::write_file(&self.dir.join(COMPLETE_MARKER), &name)
    }
}

fn format_line(b: &Body) -> String {
    format!(
        "{} {:e} {:e} {:e} {:e} {:e} {:e} {:e} {}",
        b.name, b.m, b.x.x, b.x.y, b.x.z, b.v.x, b.v.y, b.v.z, b.display
    )
}

fn parse_label(path: &Path) -> Option<f64> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("t_")?.strip_suffix(".txt")?.parse().ok()
}

/// Parse a snapshot file into a fresh body store, preserving file order
pub fn read(path: &Path) -> SimResult<BodyStore> {
    let text = fs::read_to_string(path)
        .map_err(|source| SimError::CheckpointReadError { path: path.to_path_buf(), source })?;

    let parse_err = |line: usize, reason: String| SimError::CheckpointParseError {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut store = BodyStore::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.len() != FIELDS {
            return Err(parse_err(line, format!("expected {FIELDS} fields, found {}", fields.len())));
        }

        let mut nums = [0.0_f64; 7];
        for (k, field) in fields[1..8].iter().enumerate() {
            nums[k] = field
                .parse()
                .map_err(|_| parse_err(line, format!("`{field}` is not a number")))?;
            if !nums[k].is_finite() {
                return Err(parse_err(line, format!("`{field}` is not finite")));
            }
        }
        if nums[0] <= 0.0 {
            return Err(parse_err(line, format!("mass must be positive, got {}", nums[0])));
        }

        store.create(
            fields[0],
            nums[0],
            NVec3::new(nums[1], nums[2], nums[3]),
            NVec3::new(nums[4], nums[5], nums[6]),
            fields[8],
        );
    }

    store.check_layout().map_err(|e| parse_err(0, e.to_string()))?;
    Ok(store)
}

/// Load the final snapshot of a completed forward run as the initial state of
/// a reversed run
///
/// Velocities are taken verbatim: the reversed run simply keeps stepping from
/// the end state into its own namespace.
pub fn rewind(forward: &CheckpointStore) -> SimResult<(BodyStore, Snapshot)> {
    let snapshot = forward.final_snapshot()?;
    let bodies = read(&snapshot.path)?;
    Ok((bodies, snapshot))
}
