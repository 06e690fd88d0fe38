//! The A*-style routing core: candidate-heading generation, maneuver-aware
//! successor expansion, beam pruning and the priority-queue search loop.

pub mod state;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chrono::{DateTime, Duration, Utc};
use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::engine::conventions::{tack_sign, true_wind_angle, wrap360, KN_TO_MPS};
use crate::engine::geodesy;
use crate::engine::mask::LandMask;
use crate::engine::polar::Polar;
use crate::engine::wind::WindField;
use crate::error::{Result, RouteError};

pub use state::{Maneuver, StateKey, Waypoint};

/// Tack-change penalty, seconds.
pub const P_TACK_S: f64 = 180.0;
/// Gybe penalty, seconds.
pub const P_GYBE_S: f64 = 120.0;
/// Light-air penalty, seconds.
pub const P_LOW_WIND_S: f64 = 300.0;
/// Below this true wind speed the light-air penalty applies, knots.
pub const LOW_WIND_THRESHOLD_KN: f64 = 6.0;
/// Candidates slower than this are pruned, knots.
pub const MIN_BOAT_SPEED_KN: f64 = 0.5;

/// Tunable search parameters. Defaults match the specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    pub time_step_s: f64,
    pub max_iterations: usize,
    pub arrival_threshold_m: f64,
    pub d_lat: f64,
    pub d_lon: f64,
    pub beam_width: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            time_step_s: 3600.0,
            max_iterations: 50_000,
            arrival_threshold_m: 8_000.0,
            d_lat: 0.05,
            d_lon: 0.05,
            beam_width: 40,
        }
    }
}

/// A fully built router: holds read-only references to its collaborators
/// and owns nothing across calls to [`Router::route`] beyond `config`.
pub struct Router<'a> {
    pub polar: &'a Polar,
    pub wind: &'a WindField,
    pub mask: Option<&'a LandMask>,
    pub config: RouterConfig,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    f_cost: f64,
    counter: u64,
    index: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.counter == other.counter
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            .then_with(|| self.counter.cmp(&other.counter))
    }
}

impl<'a> Router<'a> {
    pub fn new(polar: &'a Polar, wind: &'a WindField, mask: Option<&'a LandMask>, config: RouterConfig) -> Self {
        Self { polar, wind, mask, config }
    }

    /// Runs the search from `(start_lat, start_lon)` to `(goal_lat,
    /// goal_lon)` departing at `departure`. `cancel`, if given, is polled
    /// once per iteration; when it returns `true` the search aborts with
    /// [`RouteError::Cancelled`].
    pub fn route(
        &self,
        start_lat: f64,
        start_lon: f64,
        goal_lat: f64,
        goal_lon: f64,
        departure: DateTime<Utc>,
        cancel: Option<&dyn Fn() -> bool>,
    ) -> Result<Vec<Waypoint>> {
        if !self.wind.contains(start_lat, start_lon) {
            return Err(RouteError::StartOutsideForecast);
        }
        if !self.wind.contains(goal_lat, goal_lon) {
            return Err(RouteError::GoalOutsideForecast);
        }
        if let Some(mask) = self.mask {
            if !mask.is_sea(start_lat, start_lon) {
                return Err(RouteError::StartOnLand);
            }
            if !mask.is_sea(goal_lat, goal_lon) {
                return Err(RouteError::GoalOnLand);
            }
        }

        let max_speed_kn = self.polar.max_speed_kn();
        let h0 = geodesy::distance(start_lat, start_lon, goal_lat, goal_lon) / (max_speed_kn * KN_TO_MPS);

        let start = Waypoint {
            lat: start_lat,
            lon: start_lon,
            time: departure,
            heading_deg: None,
            boat_speed_kn: 0.0,
            wind_speed_kn: None,
            wind_dir_from_deg: None,
            twa_deg: None,
            tack: 0,
            maneuver: Maneuver::None,
            g_cost: 0.0,
            h_cost: h0,
            f_cost: h0,
            parent: None,
        };

        let mut arena = vec![start];
        let mut heap = BinaryHeap::new();
        let mut counter: u64 = 1;
        heap.push(Reverse(HeapEntry { f_cost: h0, counter: 0, index: 0 }));

        let mut best_g: HashMap<StateKey, f64> = HashMap::new();
        let mut best_frontier_distance = f64::INFINITY;

        for iteration in 0..self.config.max_iterations {
            if let Some(cancel) = cancel {
                if cancel() {
                    return Err(RouteError::Cancelled { best_distance_m: best_frontier_distance });
                }
            }

            let Some(Reverse(entry)) = heap.pop() else {
                return Err(RouteError::QueueExhausted);
            };

            let current = arena[entry.index].clone();
            let dist = geodesy::distance(current.lat, current.lon, goal_lat, goal_lon);
            best_frontier_distance = best_frontier_distance.min(dist);

            if iteration % 500 == 0 {
                debug!(
                    "iteration {iteration}: dist_to_goal={dist:.0}m g={:.0}s queue={}",
                    current.g_cost,
                    heap.len()
                );
            }

            if dist < self.config.arrival_threshold_m {
                debug!("arrival reached after {iteration} iterations, dist={dist:.0}m");
                return Ok(reconstruct(&arena, entry.index));
            }

            let key = StateKey::new(current.lat, current.lon, current.time, departure, self.config.d_lat, self.config.d_lon, self.config.time_step_s);
            if let Some(&g) = best_g.get(&key) {
                if g <= current.g_cost {
                    continue;
                }
            }
            best_g.insert(key, current.g_cost);

            let successors = self.expand(&current, entry.index, goal_lat, goal_lon, max_speed_kn);
            if successors.is_empty() {
                trace!("node at ({:.4},{:.4}) is a dead end", current.lat, current.lon);
            }
            for succ in successors {
                arena.push(succ);
                let idx = arena.len() - 1;
                let f = arena[idx].f_cost;
                heap.push(Reverse(HeapEntry { f_cost: f, counter, index: idx }));
                counter += 1;
            }
        }

        warn!("iteration limit reached, best frontier distance {best_frontier_distance:.0}m");
        Err(RouteError::IterationLimitReached { best_distance_m: best_frontier_distance })
    }

    /// Generates successor waypoints for `current` (at arena index
    /// `current_index`), applying candidate-heading generation, the
    /// per-candidate physical/landmask filters, maneuver costing, and beam
    /// pruning.
    fn expand(&self, current: &Waypoint, current_index: usize, goal_lat: f64, goal_lon: f64, max_speed_kn: f64) -> Vec<Waypoint> {
        let dt = self.config.time_step_s;

        let (wind_speed_kn, wind_from_deg) =
            match self.wind.wind_speed_knots_and_from_dir(current.lat, current.lon, current.time) {
                Ok(v) => v,
                Err(_) => {
                    trace!("node at ({:.4},{:.4}) fell outside the wind grid", current.lat, current.lon);
                    return Vec::new();
                }
            };

        let bearing_to_goal = geodesy::bearing(current.lat, current.lon, goal_lat, goal_lon);
        let headings = candidate_headings(bearing_to_goal, wind_from_deg, wind_speed_kn, self.polar);

        struct Raw {
            lat: f64,
            lon: f64,
            heading: f64,
            boat_speed_kn: f64,
            twa: f64,
            tack: i8,
            maneuver: Maneuver,
            dist_to_goal: f64,
        }

        // Each candidate is physically independent of the others, so the
        // per-heading evaluation runs in parallel; candidate order is
        // preserved through the index (not the join order), so the
        // resulting insertion order into the heap stays deterministic.
        let evaluated: Vec<Option<Raw>> = headings
            .par_iter()
            .map(|&heading| {
                let twa = true_wind_angle(heading, wind_from_deg);
                let boat_speed_kn = self.polar.boat_speed(twa, wind_speed_kn);
                if boat_speed_kn < MIN_BOAT_SPEED_KN {
                    return None;
                }

                let delta_m = boat_speed_kn * KN_TO_MPS * dt;
                let (lat2, lon2) = geodesy::destination(current.lat, current.lon, heading, delta_m);

                if let Some(mask) = self.mask {
                    if !mask.is_path_clear(current.lat, current.lon, lat2, lon2, 6) {
                        return None;
                    }
                }

                let tack = tack_sign(heading, wind_from_deg);
                let maneuver = detect_maneuver(current, twa, tack);
                let dist_to_goal = geodesy::distance(lat2, lon2, goal_lat, goal_lon);

                Some(Raw {
                    lat: lat2,
                    lon: lon2,
                    heading,
                    boat_speed_kn,
                    twa,
                    tack,
                    maneuver,
                    dist_to_goal,
                })
            })
            .collect();

        let mut raw: Vec<Raw> = evaluated.into_iter().flatten().collect();

        raw.sort_by(|a, b| {
            a.dist_to_goal
                .total_cmp(&b.dist_to_goal)
                .then_with(|| b.boat_speed_kn.total_cmp(&a.boat_speed_kn))
        });
        raw.truncate(self.config.beam_width);

        let new_time = current.time + Duration::milliseconds((dt * 1000.0) as i64);

        raw.into_iter()
            .map(|r| {
                let maneuver_penalty = match r.maneuver {
                    Maneuver::None => 0.0,
                    Maneuver::Tack => P_TACK_S,
                    Maneuver::Gybe => P_GYBE_S,
                };
                let light_air_penalty = if wind_speed_kn < LOW_WIND_THRESHOLD_KN { P_LOW_WIND_S } else { 0.0 };
                let g_cost = current.g_cost + dt + maneuver_penalty + light_air_penalty;
                let h_cost = r.dist_to_goal / (max_speed_kn * KN_TO_MPS);

                Waypoint {
                    lat: r.lat,
                    lon: r.lon,
                    time: new_time,
                    heading_deg: Some(wrap360(r.heading)),
                    boat_speed_kn: r.boat_speed_kn,
                    wind_speed_kn: Some(wind_speed_kn),
                    wind_dir_from_deg: Some(wind_from_deg),
                    twa_deg: Some(r.twa),
                    tack: r.tack,
                    maneuver: r.maneuver,
                    g_cost,
                    h_cost,
                    f_cost: g_cost + h_cost,
                    parent: Some(current_index),
                }
            })
            .collect()
    }
}

/// Detects the maneuver (if any) between `current`'s leg and a new
/// candidate leg of true wind angle `new_twa` and tack `new_tack`.
fn detect_maneuver(current: &Waypoint, new_twa: f64, new_tack: i8) -> Maneuver {
    if current.heading_deg.is_none() {
        return Maneuver::None;
    }
    let prev_tack = current.tack;
    if prev_tack == 0 || new_tack == 0 || prev_tack == new_tack {
        return Maneuver::None;
    }
    let prev_twa = current.twa_deg.unwrap_or(new_twa);
    let avg_twa = 0.5 * (prev_twa + new_twa);
    if avg_twa < 90.0 {
        Maneuver::Tack
    } else {
        Maneuver::Gybe
    }
}

/// Generates the restricted set of candidate headings evaluated at a node:
/// a goal-directed fan, the best upwind/downwind VMG headings on each
/// tack, and a jitter pass around every heading so collected.
fn candidate_headings(bearing_to_goal: f64, wind_from_deg: f64, wind_speed_kn: f64, polar: &Polar) -> Vec<f64> {
    let mut headings = Vec::new();

    // 1. Goal-directed fan: 6 evenly spaced samples in [-25, +25].
    const GOAL_FAN: [f64; 6] = [-25.0, -15.0, -5.0, 5.0, 15.0, 25.0];
    for d in GOAL_FAN {
        headings.push(bearing_to_goal + d);
    }

    // 2. Upwind VMG, both tacks.
    let twa_up = polar.best_upwind_twa(wind_speed_kn);
    for s in [-1.0, 1.0] {
        headings.push(wind_from_deg + s * twa_up);
    }

    // 3. Downwind VMG, both tacks.
    let twa_dn = polar.best_downwind_twa(wind_speed_kn);
    for s in [-1.0, 1.0] {
        headings.push(wind_from_deg + s * twa_dn);
    }

    // 4. Jitter: ±10° around every heading collected so far.
    let base: Vec<f64> = headings.clone();
    for h in base {
        headings.push(h - 10.0);
        headings.push(h + 10.0);
    }

    let mut normalized: Vec<f64> = headings.into_iter().map(wrap360).collect();
    normalized.sort_by(|a, b| a.total_cmp(b));
    normalized.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    normalized
}

/// Walks the parent chain from `goal_index` back to the start and returns
/// the path in departure-to-arrival order.
fn reconstruct(arena: &[Waypoint], goal_index: usize) -> Vec<Waypoint> {
    let mut path = Vec::new();
    let mut idx = Some(goal_index);
    while let Some(i) = idx {
        let node = &arena[i];
        path.push(node.clone());
        idx = node.parent;
    }
    path.reverse();
    path
}
