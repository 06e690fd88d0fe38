//! Search node and discretized state key.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The kind of course change detected between two consecutive legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Maneuver {
    None,
    Tack,
    Gybe,
}

/// A single point on a route, produced by the expander.
///
/// Pre-departure fields are `None` only on the start node: there is no
/// heading or wind sample before the first expansion, so no spurious
/// maneuver can ever be attributed to it.
#[derive(Debug, Clone, Serialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub time: DateTime<Utc>,
    pub heading_deg: Option<f64>,
    pub boat_speed_kn: f64,
    pub wind_speed_kn: Option<f64>,
    pub wind_dir_from_deg: Option<f64>,
    pub twa_deg: Option<f64>,
    pub tack: i8,
    pub maneuver: Maneuver,
    pub g_cost: f64,
    pub h_cost: f64,
    pub f_cost: f64,
    #[serde(skip)]
    pub(super) parent: Option<usize>,
}

/// Discretized `(lat, lon, t)` key used only for dominance checks, never
/// for path geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey(i64, i64, i64);

impl StateKey {
    pub fn new(lat: f64, lon: f64, t: DateTime<Utc>, t0: DateTime<Utc>, d_lat: f64, d_lon: f64, dt_secs: f64) -> Self {
        let dt = (t - t0).num_milliseconds() as f64 / 1000.0;
        Self(
            (lat / d_lat).floor() as i64,
            (lon / d_lon).floor() as i64,
            (dt / dt_secs).floor() as i64,
        )
    }
}
