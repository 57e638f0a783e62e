//! Linear units of a grid's coordinate system.
//!
//! Slope and cost conversion both need pixel spacing in metres.  Geographic
//! grids are scaled with the flat-earth factor of 111 120 m per degree, a
//! good approximation near the equator and a poor one towards the poles.
//! Grids whose unit was not established by the raster reader are rejected
//! rather than guessed.

use crate::{CpaError, CpaResult};

/// Metres per degree of arc near the equator.
pub const METRES_PER_DEGREE: f64 = 111_120.0;

/// The linear unit of a grid's horizontal coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinearUnit {
    /// Geographic latitude/longitude in decimal degrees.
    Degree,
    /// Projected coordinates in metres.
    Metre,
    /// The raster reader could not determine the unit.
    #[default]
    Unknown,
}

impl LinearUnit {
    /// Metres spanned by one coordinate unit.
    ///
    /// Fails with [`CpaError::Config`] for [`LinearUnit::Unknown`].
    pub fn metres_per_unit(self) -> CpaResult<f64> {
        match self {
            LinearUnit::Degree  => Ok(METRES_PER_DEGREE),
            LinearUnit::Metre   => Ok(1.0),
            LinearUnit::Unknown => Err(CpaError::Config(
                "grid linear unit is unknown; tag it as degree or metre before \
                 computing slope or cost"
                    .to_string(),
            )),
        }
    }
}

impl std::fmt::Display for LinearUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinearUnit::Degree  => "degree",
            LinearUnit::Metre   => "metre",
            LinearUnit::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
