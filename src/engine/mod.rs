//! Core routing engine: geodesy, physical conventions, boat performance,
//! wind fields, land masking and the search itself.

pub mod conventions;
pub mod geodesy;
pub mod mask;
pub mod polar;
pub mod router;
pub mod wind;
