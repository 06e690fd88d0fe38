//! Land/sea raster sampler.
//!
//! Backed by a sparse bitmap over a fixed index grid, matching the
//! resolution of common GSHHG-derived coastline masks. Point and segment
//! queries are pure in-memory lookups, as required by the search loop.

use std::collections::BTreeSet;

use roaring::RoaringTreemap;

/// An affine, north-up geographic transform: `lon = origin_lon + col *
/// pixel_size_lon`, `lat = origin_lat + row * pixel_size_lat` (pixel_size_lat
/// is typically negative for a top-left-origin raster).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub pixel_size_lon: f64,
    pub pixel_size_lat: f64,
}

/// Land/sea point and segment sampler.
#[derive(Debug, Clone)]
pub struct LandMask {
    /// `None` when no mask was loaded: every point is sea.
    raster: Option<Raster>,
}

#[derive(Debug, Clone)]
struct Raster {
    width: u64,
    height: u64,
    transform: GeoTransform,
    land_cells: RoaringTreemap,
}

impl LandMask {
    /// A mask with no raster loaded: every point is sea, matching the
    /// contract "when no mask is loaded, returns true".
    pub fn none() -> Self {
        Self { raster: None }
    }

    /// Builds a mask from a decoded single-band raster (row-major,
    /// `width * height` values) and its geotransform, auto-detecting which
    /// raw value means "sea" from the set of unique values present.
    pub fn from_raster(width: u64, height: u64, values: &[u8], transform: GeoTransform) -> Self {
        let sea_value = detect_sea_value(values);

        let mut land_cells = RoaringTreemap::new();
        for (idx, &value) in values.iter().enumerate() {
            if value != sea_value {
                land_cells.insert(idx as u64);
            }
        }

        Self {
            raster: Some(Raster {
                width,
                height,
                transform,
                land_cells,
            }),
        }
    }

    /// Whether (lat, lon) is sea. Out-of-raster or no-sample falls back to
    /// `false` (conservative: treat as land), except when no mask is
    /// loaded at all, which always returns `true`.
    pub fn is_sea(&self, lat: f64, lon: f64) -> bool {
        let Some(raster) = &self.raster else {
            return true;
        };

        let Some((row, col)) = raster.row_col(lat, lon) else {
            return false;
        };
        let idx = row * raster.width + col;
        !raster.land_cells.contains(idx)
    }

    /// Samples `n + 1` evenly spaced points along the (linear in lat/lon)
    /// chord from (lat1, lon1) to (lat2, lon2) and requires every sample to
    /// be sea.
    pub fn is_path_clear(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64, n: usize) -> bool {
        for i in 0..=n {
            let a = i as f64 / n as f64;
            let lat = lat1 + (lat2 - lat1) * a;
            let lon = lon1 + (lon2 - lon1) * a;
            if !self.is_sea(lat, lon) {
                return false;
            }
        }
        true
    }
}

impl Raster {
    fn row_col(&self, lat: f64, lon: f64) -> Option<(u64, u64)> {
        let col = ((lon - self.transform.origin_lon) / self.transform.pixel_size_lon).floor();
        let row = ((lat - self.transform.origin_lat) / self.transform.pixel_size_lat).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as u64, row as u64);
        if col >= self.width || row >= self.height {
            return None;
        }
        Some((row, col))
    }
}

/// Auto-detects which raw byte value represents "sea" from the unique
/// values present in a decoded raster, per the conventions observed in
/// common GSHHG/Zenodo-derived land masks.
fn detect_sea_value(values: &[u8]) -> u8 {
    let unique: BTreeSet<u8> = values.iter().cloned().collect();

    if unique == BTreeSet::from([0, 255]) {
        return 0;
    }
    if unique == BTreeSet::from([0, 100]) {
        return 0;
    }
    if unique == BTreeSet::from([0, 1]) {
        let count0 = values.iter().filter(|&&v| v == 0).count();
        let count1 = values.len() - count0;
        return if count0 > count1 { 0 } else { 1 };
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> GeoTransform {
        // 1x1 degree cells, origin at the top-left (north-west) corner.
        GeoTransform {
            origin_lon: -10.0,
            origin_lat: 50.0,
            pixel_size_lon: 1.0,
            pixel_size_lat: -1.0,
        }
    }

    #[test]
    fn no_mask_is_always_sea() {
        let mask = LandMask::none();
        assert!(mask.is_sea(48.8566, 2.3522));
        assert!(mask.is_sea(1000.0, 1000.0));
    }

    #[test]
    fn detects_0_255_convention() {
        let values = vec![0, 0, 255, 0];
        assert_eq!(detect_sea_value(&values), 0);
    }

    #[test]
    fn detects_0_100_convention() {
        let values = vec![0, 100, 100, 0];
        assert_eq!(detect_sea_value(&values), 0);
    }

    #[test]
    fn detects_0_1_majority_convention() {
        // Ocean dominates: most cells are 0, so 0 = sea.
        let values = vec![0, 0, 0, 1];
        assert_eq!(detect_sea_value(&values), 0);
        // Majority flips: most cells are 1, so 1 = sea.
        let values = vec![1, 1, 1, 0];
        assert_eq!(detect_sea_value(&values), 1);
    }

    #[test]
    fn defaults_to_1_is_sea() {
        let values = vec![7, 9, 7, 9];
        assert_eq!(detect_sea_value(&values), 1);
    }

    #[test]
    fn out_of_raster_is_land() {
        let width = 2;
        let height = 2;
        let values = [0u8, 0, 0, 0]; // all sea
        let mask = LandMask::from_raster(width, height, &values, transform());
        assert!(!mask.is_sea(90.0, 90.0));
    }

    #[test]
    fn raster_classification_round_trip() {
        // 2x2 raster, row-major, north-up: row0 = lat in [49,50), row1 = lat in [48,49).
        let width = 2;
        let height = 2;
        // land at (row=0,col=1) i.e. near lon=-9, lat=49.5
        let values = [0u8, 255, 0, 0];
        let mask = LandMask::from_raster(width, height, &values, transform());
        assert!(mask.is_sea(49.5, -9.5)); // row0,col0 -> sea
        assert!(!mask.is_sea(49.5, -8.5)); // row0,col1 -> land
        assert!(mask.is_sea(48.5, -9.5)); // row1,col0 -> sea
    }

    #[test]
    fn path_clear_requires_every_sample_sea() {
        let width = 2;
        let height = 2;
        let values = [0u8, 255, 0, 0];
        let mask = LandMask::from_raster(width, height, &values, transform());
        assert!(!mask.is_path_clear(49.5, -9.5, 49.5, -8.5, 6));
        assert!(mask.is_path_clear(49.5, -9.5, 48.5, -9.5, 6));
    }
}
