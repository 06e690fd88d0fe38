//! Spatio-temporal wind field: an ordered list of timestamped (u, v) grids,
//! sampled by bilinear-space / linear-time interpolation.

use chrono::{DateTime, Utc};

use crate::engine::conventions::{uv_to_wind_dir_from, MPS_TO_KN};
use crate::error::{Result, RouteError};

/// A single wind snapshot on a rectilinear lat/lon grid, in m/s.
///
/// `lats`/`lons` are stored as the full `rows x cols` meshgrids the source
/// messages carry (mirroring GRIB's own `latlons()` convention), but the
/// grid must in fact be rectilinear: latitude varies only along axis 0 and
/// longitude only along axis 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WindGrid {
    time: DateTime<Utc>,
    lat_axis: Vec<f64>,
    lon_axis: Vec<f64>,
    u: Vec<Vec<f64>>,
    v: Vec<Vec<f64>>,
}

impl WindGrid {
    /// Builds a grid from full meshgrid-shaped lats/lons (as decoded GRIB
    /// messages provide) plus the u/v component fields, all `rows x cols`.
    /// Longitudes are normalized to \[-180, 180\] and axes' monotonic
    /// direction is auto-detected (not assumed ascending).
    pub fn new(
        time: DateTime<Utc>,
        lats: Vec<Vec<f64>>,
        lons: Vec<Vec<f64>>,
        u: Vec<Vec<f64>>,
        v: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let rows = lats.len();
        if rows == 0 || lats[0].is_empty() {
            return Err(RouteError::InvalidInput);
        }
        let cols = lats[0].len();
        if lons.len() != rows
            || u.len() != rows
            || v.len() != rows
            || lons.iter().any(|r| r.len() != cols)
            || u.iter().any(|r| r.len() != cols)
            || v.iter().any(|r| r.len() != cols)
        {
            return Err(RouteError::InvalidInput);
        }

        let lat_axis: Vec<f64> = (0..rows).map(|i| lats[i][0]).collect();
        let lon_axis: Vec<f64> = (0..cols).map(|j| normalize_lon(lons[0][j])).collect();

        Ok(Self {
            time,
            lat_axis,
            lon_axis,
            u,
            v,
        })
    }

    /// Convenience constructor from 1-D axes, building the meshgrid
    /// internally (equivalent data, less boilerplate for callers that
    /// already hold a rectilinear axis pair).
    pub fn from_axes(
        time: DateTime<Utc>,
        lat_axis: Vec<f64>,
        lon_axis: Vec<f64>,
        u: Vec<Vec<f64>>,
        v: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if lat_axis.is_empty() || lon_axis.is_empty() {
            return Err(RouteError::InvalidInput);
        }
        let cols = lon_axis.len();
        let rows = lat_axis.len();
        let lats: Vec<Vec<f64>> = lat_axis.iter().map(|&lat| vec![lat; cols]).collect();
        let lons: Vec<Vec<f64>> = (0..rows).map(|_| lon_axis.clone()).collect();
        Self::new(time, lats, lons, u, v)
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn in_bounds(&self, lat: f64, lon: f64) -> bool {
        let lon = normalize_lon(lon);
        let (lat_lo, lat_hi) = axis_bounds(&self.lat_axis);
        let (lon_lo, lon_hi) = axis_bounds(&self.lon_axis);
        lat >= lat_lo && lat <= lat_hi && lon >= lon_lo && lon <= lon_hi
    }

    fn sample(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let lon = normalize_lon(lon);
        let u = bilinear(&self.lat_axis, &self.lon_axis, &self.u, lat, lon)?;
        let v = bilinear(&self.lat_axis, &self.lon_axis, &self.v, lat, lon)?;
        Some((u, v))
    }
}

fn normalize_lon(lon: f64) -> f64 {
    let mut l = lon;
    while l > 180.0 {
        l -= 360.0;
    }
    while l < -180.0 {
        l += 360.0;
    }
    l
}

fn axis_bounds(axis: &[f64]) -> (f64, f64) {
    let lo = axis.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = axis.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

/// Locates the bracketing indices (lo, hi) and fractional weight for
/// `target` within `axis`, whose direction (ascending/descending) is
/// auto-detected. Returns `None` if `target` is outside the axis range.
fn locate(axis: &[f64], target: f64) -> Option<(usize, usize, f64)> {
    if axis.len() == 1 {
        return Some((0, 0, 0.0));
    }
    let ascending = axis[1] >= axis[0];
    let (lo_bound, hi_bound) = axis_bounds(axis);
    if target < lo_bound || target > hi_bound {
        return None;
    }

    // Work on an ascending copy, then map indices back.
    let ascending_axis: Vec<f64> = if ascending {
        axis.to_vec()
    } else {
        axis.iter().rev().cloned().collect()
    };

    let mut hi = ascending_axis.partition_point(|&x| x < target);
    if hi == 0 {
        hi = 1;
    }
    if hi >= ascending_axis.len() {
        hi = ascending_axis.len() - 1;
    }
    let lo = hi - 1;

    let (a, b) = (ascending_axis[lo], ascending_axis[hi]);
    let t = if (b - a).abs() < 1e-12 {
        0.0
    } else {
        ((target - a) / (b - a)).clamp(0.0, 1.0)
    };

    if ascending {
        Some((lo, hi, t))
    } else {
        let n = axis.len();
        Some((n - 1 - lo, n - 1 - hi, t))
    }
}

/// Bilinear interpolation of `field` (rows x cols, indexed \[lat_idx\]\[lon_idx\])
/// at (lat, lon), handling degenerate (coincident-bound) cells on either axis.
fn bilinear(lat_axis: &[f64], lon_axis: &[f64], field: &[Vec<f64>], lat: f64, lon: f64) -> Option<f64> {
    let (i0, i1, ty) = locate(lat_axis, lat)?;
    let (j0, j1, tx) = locate(lon_axis, lon)?;

    let f00 = field[i0][j0];
    let f01 = field[i0][j1];
    let f10 = field[i1][j0];
    let f11 = field[i1][j1];

    let top = f00 * (1.0 - tx) + f01 * tx;
    let bottom = f10 * (1.0 - tx) + f11 * tx;
    Some(top * (1.0 - ty) + bottom * ty)
}

/// An ordered, time-varying surface wind forecast: a sequence of
/// [`WindGrid`]s sharing a common spatial extent.
#[derive(Debug, Clone, PartialEq)]
pub struct WindField {
    grids: Vec<WindGrid>,
}

impl WindField {
    /// Builds a field from an unordered list of grids. Sorts by time.
    /// Fails with [`RouteError::NoData`] if the list is empty.
    pub fn new(mut grids: Vec<WindGrid>) -> Result<Self> {
        if grids.is_empty() {
            return Err(RouteError::NoData);
        }
        grids.sort_by_key(|g| g.time);
        Ok(Self { grids })
    }

    /// Whether (lat, lon) lies within the field's common spatial extent.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.grids[0].in_bounds(lat, lon)
    }

    /// Wind (u, v) in m/s at (lat, lon, t): bilinear in space, linear in
    /// time with clamping at the forecast's temporal ends (no
    /// extrapolation).
    pub fn wind_uv(&self, lat: f64, lon: f64, t: DateTime<Utc>) -> Result<(f64, f64)> {
        let first = &self.grids[0];
        let last = self.grids.last().unwrap();

        if t <= first.time() {
            return first.sample(lat, lon).ok_or(RouteError::OutOfGrid);
        }
        if t >= last.time() {
            return last.sample(lat, lon).ok_or(RouteError::OutOfGrid);
        }

        let hi_idx = self.grids.partition_point(|g| g.time() <= t);
        let lo_idx = hi_idx - 1;
        let g0 = &self.grids[lo_idx];
        let g1 = &self.grids[hi_idx];

        let (u0, v0) = g0.sample(lat, lon).ok_or(RouteError::OutOfGrid)?;
        let (u1, v1) = g1.sample(lat, lon).ok_or(RouteError::OutOfGrid)?;

        let span = (g1.time() - g0.time()).num_milliseconds() as f64;
        let alpha = if span <= 0.0 {
            0.0
        } else {
            ((t - g0.time()).num_milliseconds() as f64 / span).clamp(0.0, 1.0)
        };

        Ok((u0 + (u1 - u0) * alpha, v0 + (v1 - v0) * alpha))
    }

    /// Derived wind speed (knots) and "from" direction (degrees) at
    /// (lat, lon, t).
    pub fn wind_speed_knots_and_from_dir(
        &self,
        lat: f64,
        lon: f64,
        t: DateTime<Utc>,
    ) -> Result<(f64, f64)> {
        let (u, v) = self.wind_uv(lat, lon, t)?;
        let speed_kn = (u * u + v * v).sqrt() * MPS_TO_KN;
        let dir_from = uv_to_wind_dir_from(u, v);
        Ok((speed_kn, dir_from))
    }
}
