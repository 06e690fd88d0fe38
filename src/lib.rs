//! Weather routing engine core: wind/polar/landmask models and an A*-style
//! search over them, producing a maneuver-aware route between two points.

pub mod engine;
pub mod error;
pub mod io;

pub use engine::mask::{GeoTransform, LandMask};
pub use engine::polar::Polar;
pub use engine::router::{Maneuver, Router, RouterConfig, Waypoint};
pub use engine::wind::{WindField, WindGrid};
pub use error::RouteError;
