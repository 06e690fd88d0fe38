//! Angular wrapping and unit conventions shared across the engine.
//!
//! Headings and wind directions are degrees, 0°=North, clockwise. Wind
//! direction is always the meteorological "from" direction.

/// Meters per second to knots.
pub const MPS_TO_KN: f64 = 1.9438444924406048;

/// Knots to meters per second.
pub const KN_TO_MPS: f64 = 1.0 / MPS_TO_KN;

/// Wraps an angle in degrees to (-180, 180].
pub fn wrap180(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Wraps an angle in degrees to [0, 360).
pub fn wrap360(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    a
}

/// Meteorological "from" direction of a wind vector given in (u, v) m/s,
/// where u is the eastward component and v the northward component.
pub fn uv_to_wind_dir_from(u: f64, v: f64) -> f64 {
    wrap360(270.0 - v.atan2(u).to_degrees())
}

/// Recovers (u, v) m/s from a speed (m/s) and a "from" direction, the
/// inverse of [`uv_to_wind_dir_from`].
pub fn wind_dir_from_to_uv(speed_ms: f64, dir_from_deg: f64) -> (f64, f64) {
    // Wind blows *towards* dir_from + 180.
    let towards = (dir_from_deg + 180.0).to_radians();
    (speed_ms * towards.sin(), speed_ms * towards.cos())
}

/// True Wind Angle: the unsigned angle in [0, 180] between a boat heading
/// and the wind's "from" direction.
pub fn true_wind_angle(heading_deg: f64, wind_from_deg: f64) -> f64 {
    wrap180(wind_from_deg - heading_deg).abs()
}

/// Sign of the tack implied by heading relative to the wind-from direction:
/// -1 (port) / 0 (dead on the wind axis) / +1 (starboard).
pub fn tack_sign(heading_deg: f64, wind_from_deg: f64) -> i8 {
    let delta = wrap180(wind_from_deg - heading_deg);
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}
