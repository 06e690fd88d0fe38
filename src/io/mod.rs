//! Thin, already-decoded-data constructors for the engine's collaborators.
//!
//! Byte-level file formats (GRIB, GeoTIFF, raw polar dumps) are decoded
//! elsewhere; this module only assembles the engine's types from data that
//! has already been pulled apart into the shapes described by the external
//! interface contracts.

pub mod landmask_raster;
pub mod polar_table;
pub mod wind_messages;
