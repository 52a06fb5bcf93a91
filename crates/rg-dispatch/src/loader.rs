//! Schedule loaders (CSV and JSON).
//!
//! # Record format
//!
//! One record per timetabled train.  `time_offset` is in simulated seconds
//! after the moment the schedule is loaded.
//!
//! ```csv
//! time_offset,from,to,priority,cyclic
//! 0,A,B,5,false
//! 30,B,A,8,true
//! 60,C,A,3
//! ```
//!
//! The JSON form is an array of objects, as emitted by schedule generators:
//!
//! ```json
//! [{"timeOffset": 0, "from": "A", "to": "B", "priority": 5},
//!  {"timeOffset": 30, "from": "B", "to": "A", "priority": 8, "cyclic": true}]
//! ```
//!
//! `timeOffset` and `time_offset` are both accepted, and `cyclic` defaults to
//! `false`.
//!
//! # Rejection
//!
//! A record that does not deserialize, names an unknown station, names the
//! same station twice, or carries a priority outside 1–10 is returned in
//! [`ScheduleLoad::rejected`] with its zero-based index.  The rest of the file
//! still loads.  Only a document that cannot be read at all (I/O failure,
//! broken CSV framing, JSON that is not an array) fails the whole load.

use std::io::Read;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use rg_core::{SimClock, Tick};
use rg_spatial::Grid;

use crate::{resolve_endpoints, validate_priority, DispatchError, DispatchResult, ScheduleItem};

// ── Records ───────────────────────────────────────────────────────────────────

/// Wire form.  `priority` is signed so out-of-range values reach validation
/// instead of failing deserialization.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "timeOffset", alias = "time_offset")]
    time_offset: u64,
    from:        String,
    to:          String,
    priority:    i64,
    #[serde(default)]
    cyclic:      bool,
}

/// A validated schedule record.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScheduleRecord {
    /// Simulated seconds after load time.
    pub time_offset: u64,
    pub from:        String,
    pub to:          String,
    pub priority:    u8,
    pub cyclic:      bool,
}

impl ScheduleRecord {
    /// The queue item for this record when loaded at `now`.
    pub fn to_item(&self, clock: &SimClock, now: Tick) -> ScheduleItem {
        let target = now + clock.ticks_for_secs(self.time_offset);
        ScheduleItem::new(&self.from, &self.to, target, self.priority, self.cyclic)
    }
}

/// A record that failed to load.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Zero-based position in the input.
    pub index: usize,
    pub error: DispatchError,
}

/// Result of a schedule load.
#[derive(Debug, Default)]
pub struct ScheduleLoad {
    pub records:  Vec<ScheduleRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl ScheduleLoad {
    fn accept(&mut self, index: usize, raw: DispatchResult<RawRecord>, grid: &Grid) {
        match raw.and_then(|r| validate(r, grid)) {
            Ok(record) => self.records.push(record),
            Err(error) => {
                debug!("schedule record {index} rejected: {error}");
                self.rejected.push(RejectedRecord { index, error });
            }
        }
    }
}

fn validate(raw: RawRecord, grid: &Grid) -> DispatchResult<ScheduleRecord> {
    let priority = validate_priority(raw.priority)?;
    resolve_endpoints(grid, &raw.from, &raw.to)?;
    Ok(ScheduleRecord {
        time_offset: raw.time_offset,
        from: raw.from.trim().to_owned(),
        to: raw.to.trim().to_owned(),
        priority,
        cyclic: raw.cyclic,
    })
}

// ── CSV ───────────────────────────────────────────────────────────────────────

/// Load a schedule from a CSV file.
pub fn load_schedule_csv(path: &Path, grid: &Grid) -> DispatchResult<ScheduleLoad> {
    let file = std::fs::File::open(path)?;
    load_schedule_reader(file, grid)
}

/// Like [`load_schedule_csv`] but accepts any `Read` source.
pub fn load_schedule_reader<R: Read>(reader: R, grid: &Grid) -> DispatchResult<ScheduleLoad> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut load = ScheduleLoad::default();

    for (index, result) in csv_reader.deserialize::<RawRecord>().enumerate() {
        let raw = match result {
            Ok(raw) => Ok(raw),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                Err(DispatchError::Parse(e.to_string()))
            }
            Err(e) => return Err(DispatchError::Parse(e.to_string())),
        };
        load.accept(index, raw, grid);
    }
    Ok(load)
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Parse a JSON array of schedule records.
pub fn parse_schedule_json(text: &str, grid: &Grid) -> DispatchResult<ScheduleLoad> {
    let doc: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DispatchError::Parse(e.to_string()))?;
    let serde_json::Value::Array(values) = doc else {
        return Err(DispatchError::Parse("expected a JSON array of schedule records".into()));
    };

    let mut load = ScheduleLoad::default();
    for (index, value) in values.into_iter().enumerate() {
        let raw = serde_json::from_value::<RawRecord>(value)
            .map_err(|e| DispatchError::Parse(e.to_string()));
        load.accept(index, raw, grid);
    }
    Ok(load)
}
