//! Boat polar table loader: TAB- or comma-separated text, first column TWA
//! degrees, remaining headers TWS knots, cells boat speed in knots.

use std::io::BufRead;

use log::info;

use crate::engine::polar::Polar;
use crate::error::{Result, RouteError};

/// Normalizes a TAB- or comma-separated polar table to comma-separated form,
/// mirroring the one-shot TSV→CSV conversion used upstream of the loader.
fn normalize_separator(line: &str) -> String {
    if line.contains('\t') {
        line.replace('\t', ",")
    } else {
        line.to_string()
    }
}

/// Parses a polar table from any `BufRead` source (file, in-memory buffer).
///
/// Returns [`RouteError::InvalidInput`] on an empty table, a malformed
/// header, a row with the wrong column count, or an unparsable number.
pub fn load_polar_table<R: BufRead>(reader: R) -> Result<Polar> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or(RouteError::InvalidInput)?
        .map_err(|_| RouteError::InvalidInput)?;
    let header = normalize_separator(&header);
    let mut header_fields = header.split(',');
    header_fields.next().ok_or(RouteError::InvalidInput)?; // "twa/tws" corner cell

    let tws_axis: Vec<f64> = header_fields
        .map(|f| f.trim().parse::<f64>().map_err(|_| RouteError::InvalidInput))
        .collect::<Result<_>>()?;

    let mut twa_axis = Vec::new();
    let mut speed = Vec::new();

    for line in lines {
        let line = line.map_err(|_| RouteError::InvalidInput)?;
        let line = normalize_separator(&line);
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(',');
        let twa: f64 = fields
            .next()
            .ok_or(RouteError::InvalidInput)?
            .trim()
            .parse()
            .map_err(|_| RouteError::InvalidInput)?;
        let row: Vec<f64> = fields
            .map(|f| f.trim().parse::<f64>().map_err(|_| RouteError::InvalidInput))
            .collect::<Result<_>>()?;
        if row.len() != tws_axis.len() {
            return Err(RouteError::InvalidInput);
        }
        twa_axis.push(twa);
        speed.push(row);
    }

    info!("loaded polar table: {} TWA rows x {} TWS columns", twa_axis.len(), tws_axis.len());
    Polar::new(twa_axis, tws_axis, speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_table() {
        let text = "twa/tws,10,20\n45,5,7\n90,6,9\n";
        let polar = load_polar_table(text.as_bytes()).unwrap();
        assert!((polar.boat_speed(90.0, 20.0) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn parses_tab_separated_table() {
        let text = "twa/tws\t10\t20\n45\t5\t7\n90\t6\t9\n";
        let polar = load_polar_table(text.as_bytes()).unwrap();
        assert!((polar.boat_speed(45.0, 10.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(load_polar_table("".as_bytes()).unwrap_err(), RouteError::InvalidInput);
    }

    #[test]
    fn rejects_ragged_rows() {
        let text = "twa/tws,10,20\n45,5\n";
        assert_eq!(load_polar_table(text.as_bytes()).unwrap_err(), RouteError::InvalidInput);
    }
}
