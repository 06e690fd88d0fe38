//! Error kinds surfaced by the router and its collaborators.

use thiserror::Error;

/// Failure reasons a full [`crate::engine::router::Router::route`] call can return.
///
/// `OutOfGrid`-style conditions encountered *inside* the search loop are not
/// represented here: they are silently skipped at the candidate level per
/// the propagation policy and never escape the loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("polar table is empty or malformed")]
    InvalidInput,

    #[error("no usable data (e.g. no common wind timestamp)")]
    NoData,

    #[error("point lies outside the wind forecast grid")]
    OutOfGrid,

    #[error("departure point is on land")]
    StartOnLand,

    #[error("destination point is on land")]
    GoalOnLand,

    #[error("departure point lies outside the wind forecast grid")]
    StartOutsideForecast,

    #[error("destination point lies outside the wind forecast grid")]
    GoalOutsideForecast,

    #[error("iteration limit reached, best frontier distance {best_distance_m:.0} m from goal")]
    IterationLimitReached { best_distance_m: f64 },

    #[error("search queue exhausted before reaching the goal")]
    QueueExhausted,

    #[error("search cancelled, best frontier distance {best_distance_m:.0} m from goal")]
    Cancelled { best_distance_m: f64 },
}

pub type Result<T> = std::result::Result<T, RouteError>;
