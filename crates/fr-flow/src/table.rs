//! Lookup-table oracle.
//!
//! # Wide CSV format
//!
//! One row per time point, one column per sensor.  The first column holds
//! the time index; every other header is a sensor id.  An empty cell means
//! "no observation" and is left out of the table.
//!
//! ```csv
//! time,15,18,20
//! 99,12.0,30.5,8.0
//! 100,14.0,,9.5
//! ```

use std::io::Read;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use fr_core::{SensorId, TimePoint};

use crate::{FlowError, FlowOracle, FlowResult};

/// A [`FlowOracle`] answering from an in-memory `(sensor, time) → volume`
/// table.
///
/// Lookups for a sensor the table has never seen fail with
/// `UnknownSensor`; a known sensor with no value at the requested time fails
/// with `Unavailable`.
#[derive(Clone, Debug, Default)]
pub struct TableOracle {
    volumes: FxHashMap<(SensorId, TimePoint), f64>,
    sensors: FxHashSet<SensorId>,
}

impl TableOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `volume` for `sensor` at `time`, replacing any previous value.
    pub fn insert(&mut self, sensor: SensorId, time: TimePoint, volume: f64) -> &mut Self {
        self.sensors.insert(sensor);
        self.volumes.insert((sensor, time), volume);
        self
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Load a table from a wide CSV file.
    pub fn from_wide_csv(path: &Path) -> FlowResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_wide_reader(file)
    }

    /// Like [`from_wide_csv`](Self::from_wide_csv) but accepts any `Read`
    /// source.
    pub fn from_wide_reader<R: Read>(reader: R) -> FlowResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| FlowError::Parse(e.to_string()))?
            .clone();
        let sensors: Vec<SensorId> = headers
            .iter()
            .skip(1)
            .map(|h| {
                h.parse::<u32>()
                    .map(SensorId)
                    .map_err(|_| FlowError::Parse(format!("column header {h:?} is not a sensor id")))
            })
            .collect::<FlowResult<_>>()?;

        let mut table = TableOracle::new();
        table.sensors.extend(sensors.iter().copied());

        for (row_no, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| FlowError::Parse(e.to_string()))?;
            let time_field = record.get(0).unwrap_or_default();
            let time = time_field
                .parse::<u32>()
                .map(TimePoint)
                .map_err(|_| FlowError::Parse(format!("row {}: time {time_field:?} is not an integer", row_no + 1)))?;

            for (&sensor, cell) in sensors.iter().zip(record.iter().skip(1)) {
                if cell.is_empty() {
                    continue;
                }
                let volume = cell.parse::<f64>().map_err(|_| {
                    FlowError::Parse(format!("row {}: sensor {sensor}: {cell:?} is not a number", row_no + 1))
                })?;
                table.volumes.insert((sensor, time), volume);
            }
        }

        log::info!(
            "loaded flow table: {} sensors, {} observations",
            table.sensors.len(),
            table.volumes.len()
        );
        Ok(table)
    }
}

impl FlowOracle for TableOracle {
    fn estimate(&self, sensor: SensorId, time: TimePoint) -> FlowResult<f64> {
        match self.volumes.get(&(sensor, time)) {
            Some(&v) => Ok(v),
            None if !self.sensors.contains(&sensor) => Err(FlowError::UnknownSensor(sensor)),
            None => Err(FlowError::Unavailable {
                sensor,
                time,
                reason: "no observation for this time".into(),
            }),
        }
    }
}
