//! Landcover class grid → walking speed grid.

use cpa_core::Grid;

use crate::speed_map::SpeedMap;

/// Map every landcover class to its speed (km/h).
///
/// Classes missing from `speeds`, non-integral values and nodata all become
/// nodata.  When the table's codes are small non-negative integers a dense
/// lookup array replaces the binary search.
pub fn apply_landcover(landcover: &Grid, speeds: &SpeedMap) -> Grid {
    match speeds.dense_table() {
        Some(table) => {
            log::debug!("landcover lookup: dense table of {} codes", table.len());
            landcover.map(|v| {
                let v = v?;
                if v < 0.0 || v.fract() != 0.0 {
                    return None;
                }
                table.get(v as usize).copied().filter(|s| !s.is_nan())
            })
        }
        None => landcover.map(|v| v.and_then(|v| speeds.lookup_value(v))),
    }
}
