//! Assembles a [`WindField`] from already-decoded GRIB-style messages.
//!
//! Byte-level GRIB decoding is out of scope here; callers hand in messages
//! already pulled apart into parameter/level/grid metadata plus values.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::engine::wind::{WindField, WindGrid};
use crate::error::Result;

/// A single decoded field message, identified the way GRIB identifies its
/// records: a parameter code, a level type/value, and a valid time.
#[derive(Debug, Clone)]
pub struct WindMessage {
    pub parameter: u32,
    pub level_type: String,
    pub level: u32,
    pub valid_time: DateTime<Utc>,
    pub values: Vec<Vec<f64>>,
    pub lats: Vec<Vec<f64>>,
    pub lons: Vec<Vec<f64>>,
}

const LEVEL_TYPE_10M: &str = "10 m above ground";
const LEVEL_10: u32 = 10;
const PARAM_U: u32 = 33;
const PARAM_V: u32 = 34;

/// Filters `messages` to 10 m U/V wind components, groups by valid time, and
/// keeps only timestamps carrying both components.
///
/// Returns [`RouteError::NoData`](crate::error::RouteError::NoData) if no
/// timestamp ends up with both components, or if a grid fails its own shape
/// validation.
pub fn build_wind_field<I: IntoIterator<Item = WindMessage>>(messages: I) -> Result<WindField> {
    let mut by_time: HashMap<DateTime<Utc>, (Option<WindMessage>, Option<WindMessage>)> = HashMap::new();

    for msg in messages {
        if msg.level_type != LEVEL_TYPE_10M || msg.level != LEVEL_10 {
            continue;
        }
        let entry = by_time.entry(msg.valid_time).or_insert((None, None));
        match msg.parameter {
            PARAM_U => entry.0 = Some(msg),
            PARAM_V => entry.1 = Some(msg),
            _ => {}
        }
    }

    let mut grids = Vec::new();
    for (time, (u_msg, v_msg)) in by_time {
        match (u_msg, v_msg) {
            (Some(u), Some(v)) => {
                let grid = WindGrid::new(time, u.lats, u.lons, u.values, v.values)?;
                grids.push(grid);
            }
            _ => {
                warn!("wind message at {time} missing a U or V component, dropped");
            }
        }
    }

    debug!("assembled wind field from {} timestamped grids", grids.len());
    WindField::new(grids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(parameter: u32, time: DateTime<Utc>, value: f64) -> WindMessage {
        WindMessage {
            parameter,
            level_type: LEVEL_TYPE_10M.to_string(),
            level: LEVEL_10,
            valid_time: time,
            values: vec![vec![value; 2]; 2],
            lats: vec![vec![40.0; 2], vec![50.0; 2]],
            lons: vec![vec![-10.0, 0.0], vec![-10.0, 0.0]],
        }
    }

    #[test]
    fn keeps_only_timestamps_with_both_components() {
        let t0 = Utc.with_ymd_and_hms(2025, 12, 8, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 12, 8, 6, 0, 0).unwrap();
        let messages = vec![
            message(PARAM_U, t0, 1.0),
            message(PARAM_V, t0, 2.0),
            message(PARAM_U, t1, 3.0), // no matching V at t1
        ];
        let field = build_wind_field(messages).unwrap();
        assert!(field.wind_uv(45.0, -5.0, t0).is_ok());
    }

    #[test]
    fn filters_out_other_levels_and_parameters() {
        let t0 = Utc.with_ymd_and_hms(2025, 12, 8, 0, 0, 0).unwrap();
        let mut other_level = message(PARAM_U, t0, 1.0);
        other_level.level = 100;
        let messages = vec![other_level, message(PARAM_U, t0, 1.0), message(PARAM_V, t0, 2.0)];
        let field = build_wind_field(messages).unwrap();
        assert!(field.contains(45.0, -5.0));
    }

    #[test]
    fn empty_input_fails_with_no_data() {
        let messages: Vec<WindMessage> = Vec::new();
        assert!(build_wind_field(messages).is_err());
    }
}
