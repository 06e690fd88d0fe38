//! Constructs a [`LandMask`] from an already-decoded single-band raster.
//!
//! Raster *decoding* (GeoTIFF, PNG, etc.) is out of scope; callers hand in
//! the band already unpacked to bytes plus its affine geotransform.

use log::info;

use crate::engine::mask::{GeoTransform, LandMask};
use crate::error::{Result, RouteError};

/// Builds a [`LandMask`] from a row-major single-band raster. Fails with
/// [`RouteError::InvalidInput`] if `values.len() != width * height`.
pub fn build_landmask(width: u64, height: u64, values: Vec<u8>, transform: GeoTransform) -> Result<LandMask> {
    let expected = (width as usize).saturating_mul(height as usize);
    if values.len() != expected {
        return Err(RouteError::InvalidInput);
    }
    info!("loaded land mask raster: {width}x{height}");
    Ok(LandMask::from_raster(width, height, &values, transform))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_value_count() {
        let transform = GeoTransform {
            origin_lon: -10.0,
            origin_lat: 50.0,
            pixel_size_lon: 1.0,
            pixel_size_lat: -1.0,
        };
        let err = build_landmask(2, 2, vec![0u8, 0, 0], transform).unwrap_err();
        assert_eq!(err, RouteError::InvalidInput);
    }

    #[test]
    fn builds_from_well_formed_raster() {
        let transform = GeoTransform {
            origin_lon: -10.0,
            origin_lat: 50.0,
            pixel_size_lon: 1.0,
            pixel_size_lat: -1.0,
        };
        let mask = build_landmask(2, 2, vec![0u8, 0, 0, 0], transform).unwrap();
        assert!(mask.is_sea(49.5, -9.5));
    }
}
