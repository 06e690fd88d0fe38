//! Boat polar diagram: speed as a function of (TWA, TWS), plus
//! velocity-made-good (VMG) optimization.

use crate::error::{Result, RouteError};

/// Lower/upper bound and 1° step of the upwind VMG search, in degrees.
const UPWIND_SEARCH: (i32, i32) = (25, 80);
/// Lower/upper bound and 1° step of the downwind VMG search, in degrees.
const DOWNWIND_SEARCH: (i32, i32) = (100, 175);

/// A boat polar diagram: `speed[twa_idx][tws_idx]` in knots.
///
/// Both axes must be strictly increasing and the matrix row-major by TWA.
#[derive(Debug, Clone, PartialEq)]
pub struct Polar {
    twa_axis: Vec<f64>,
    tws_axis: Vec<f64>,
    speed: Vec<Vec<f64>>,
    max_speed: f64,
}

impl Polar {
    /// Builds a polar diagram from axes and a speed matrix.
    ///
    /// Returns [`RouteError::InvalidInput`] if either axis is empty, if the
    /// matrix shape doesn't match the axes, or if an axis isn't strictly
    /// increasing.
    pub fn new(twa_axis: Vec<f64>, tws_axis: Vec<f64>, speed: Vec<Vec<f64>>) -> Result<Self> {
        if twa_axis.is_empty() || tws_axis.is_empty() || speed.len() != twa_axis.len() {
            return Err(RouteError::InvalidInput);
        }
        for row in &speed {
            if row.len() != tws_axis.len() {
                return Err(RouteError::InvalidInput);
            }
        }
        if !is_strictly_increasing(&twa_axis) || !is_strictly_increasing(&tws_axis) {
            return Err(RouteError::InvalidInput);
        }

        let max_speed = speed
            .iter()
            .flat_map(|row| row.iter())
            .cloned()
            .fold(0.0_f64, f64::max);

        Ok(Self {
            twa_axis,
            tws_axis,
            speed,
            max_speed,
        })
    }

    /// The global maximum boat speed in the table, in knots. Used by the
    /// router's admissible heuristic.
    pub fn max_speed_kn(&self) -> f64 {
        self.max_speed
    }

    /// Interpolated boat speed in knots for a given TWA (degrees, any sign
    /// or magnitude) and TWS (knots), clamped to the table's axes and to
    /// non-negative results.
    pub fn boat_speed(&self, twa_deg: f64, tws_kn: f64) -> f64 {
        let twa = fold_twa(twa_deg);
        let twa = twa.clamp(self.twa_axis[0], *self.twa_axis.last().unwrap());
        let tws = tws_kn.clamp(self.tws_axis[0], *self.tws_axis.last().unwrap());

        let (i0, i1, ti) = bracket(&self.twa_axis, twa);
        let (j0, j1, tj) = bracket(&self.tws_axis, tws);

        let v00 = self.speed[i0][j0];
        let v01 = self.speed[i0][j1];
        let v10 = self.speed[i1][j0];
        let v11 = self.speed[i1][j1];

        let v0 = v00 * (1.0 - tj) + v01 * tj;
        let v1 = v10 * (1.0 - tj) + v11 * tj;
        let speed = v0 * (1.0 - ti) + v1 * ti;
        speed.max(0.0)
    }

    /// VMG upwind: the component of boat speed along the wind axis when
    /// beating, `v * cos(twa)`.
    pub fn vmg_upwind(twa_deg: f64, boat_speed_kn: f64) -> f64 {
        boat_speed_kn * twa_deg.to_radians().cos()
    }

    /// VMG downwind: the component of boat speed along the wind axis when
    /// running, `v * cos(180 - twa)`.
    pub fn vmg_downwind(twa_deg: f64, boat_speed_kn: f64) -> f64 {
        boat_speed_kn * (180.0 - twa_deg).to_radians().cos()
    }

    /// The TWA in \[25°, 80°\] that maximizes upwind VMG at the given TWS.
    /// Ties are broken in favor of the lowest candidate angle.
    pub fn best_upwind_twa(&self, tws_kn: f64) -> f64 {
        self.best_vmg_twa(tws_kn, UPWIND_SEARCH, Self::vmg_upwind)
    }

    /// The TWA in \[100°, 175°\] that maximizes downwind VMG at the given
    /// TWS. Ties are broken in favor of the lowest candidate angle.
    pub fn best_downwind_twa(&self, tws_kn: f64) -> f64 {
        self.best_vmg_twa(tws_kn, DOWNWIND_SEARCH, Self::vmg_downwind)
    }

    fn best_vmg_twa(&self, tws_kn: f64, range: (i32, i32), vmg_of: fn(f64, f64) -> f64) -> f64 {
        let mut best_twa = range.0 as f64;
        let mut best_vmg = f64::NEG_INFINITY;
        for twa in range.0..=range.1 {
            let twa = twa as f64;
            let v = self.boat_speed(twa, tws_kn);
            let vmg = vmg_of(twa, v);
            if vmg > best_vmg {
                best_vmg = vmg;
                best_twa = twa;
            }
        }
        best_twa
    }
}

fn is_strictly_increasing(axis: &[f64]) -> bool {
    axis.windows(2).all(|w| w[1] > w[0])
}

/// Folds an arbitrary TWA (any sign, any magnitude) into \[0, 180\].
fn fold_twa(twa_deg: f64) -> f64 {
    let mut twa = twa_deg.abs() % 360.0;
    if twa > 180.0 {
        twa = 360.0 - twa;
    }
    twa
}

/// Locates the bracketing pair of indices in a strictly increasing, already
/// clamped-to-range axis, plus the fractional weight within the bracket.
fn bracket(axis: &[f64], value: f64) -> (usize, usize, f64) {
    if axis.len() == 1 {
        return (0, 0, 0.0);
    }
    let mut hi = axis.partition_point(|&x| x < value);
    if hi == 0 {
        hi = 1;
    }
    if hi >= axis.len() {
        hi = axis.len() - 1;
    }
    let lo = hi - 1;
    let (a, b) = (axis[lo], axis[hi]);
    let t = if b == a { 0.0 } else { (value - a) / (b - a) };
    (lo, hi, t.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_polar() -> Polar {
        // TWA axis: 0, 45, 90, 135, 180. TWS axis: 0, 10, 20.
        let twa = vec![0.0, 45.0, 90.0, 135.0, 180.0];
        let tws = vec![0.0, 10.0, 20.0];
        let speed = vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 5.0, 7.0],
            vec![0.0, 6.0, 9.0],
            vec![0.0, 5.5, 8.0],
            vec![0.0, 3.0, 5.0],
        ];
        Polar::new(twa, tws, speed).unwrap()
    }

    #[test]
    fn rejects_malformed_tables() {
        assert_eq!(Polar::new(vec![], vec![0.0], vec![]), Err(RouteError::InvalidInput));
        assert_eq!(
            Polar::new(vec![0.0, 1.0], vec![0.0], vec![vec![1.0]]),
            Err(RouteError::InvalidInput)
        );
    }

    #[test]
    fn boat_speed_symmetric_in_twa_sign_and_reflection() {
        let polar = sample_polar();
        let a = polar.boat_speed(60.0, 10.0);
        let b = polar.boat_speed(-60.0, 10.0);
        let c = polar.boat_speed(360.0 - 60.0, 10.0);
        assert!((a - b).abs() < 1e-12);
        assert!((a - c).abs() < 1e-12);
    }

    #[test]
    fn boat_speed_clamps_to_axis_range() {
        let polar = sample_polar();
        let over = polar.boat_speed(90.0, 1000.0);
        let at_edge = polar.boat_speed(90.0, 20.0);
        assert!((over - at_edge).abs() < 1e-12);
    }

    #[test]
    fn boat_speed_never_negative() {
        let polar = sample_polar();
        assert!(polar.boat_speed(0.0, 10.0) >= 0.0);
    }

    #[test]
    fn max_speed_is_global_max() {
        let polar = sample_polar();
        assert!((polar.max_speed_kn() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn vmg_upwind_at_zero_twa_is_speed() {
        assert!((Polar::vmg_upwind(0.0, 8.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn vmg_downwind_at_180_twa_is_speed() {
        assert!((Polar::vmg_downwind(180.0, 8.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn best_upwind_twa_is_within_search_range() {
        let polar = sample_polar();
        let twa = polar.best_upwind_twa(10.0);
        assert!((25.0..=80.0).contains(&twa));
    }

    #[test]
    fn best_downwind_twa_is_within_search_range() {
        let polar = sample_polar();
        let twa = polar.best_downwind_twa(10.0);
        assert!((100.0..=175.0).contains(&twa));
    }
}
