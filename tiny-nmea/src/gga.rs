use heapless::String;

use crate::common::{parse_coordinate, parse_polarity};
use crate::error::NmeaError;
use crate::fields::Fields;
use crate::message::FixQuality;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct GgaData {
    pub talker: String<2>,
    pub quality: FixQuality,
    /// Latitude, longitude in signed degrees and altitude in meters, only
    /// present when `quality` is valid.
    pub position: Option<(f32, f32, f32)>,
}

// fields: 0 time, 1-4 lat/N-S/lon/E-W, 5 quality, 6 satellites, 7 HDOP, 8 altitude
pub fn parse_gga(talker: String<2>, fields: Fields) -> Result<GgaData, NmeaError> {
    let quality = FixQuality::from_field(fields.get_or_empty(5));
    if !quality.is_valid() {
        return Ok(GgaData {
            talker,
            quality,
            position: None,
        });
    }

    let latitude = parse_coordinate("latitude", fields.get_or_empty(1))?
        * parse_polarity("latitude polarity", fields.get_or_empty(2))?;
    let longitude = parse_coordinate("longitude", fields.get_or_empty(3))?
        * parse_polarity("longitude polarity", fields.get_or_empty(4))?;

    let altitude_str = fields.get_or_empty(8);
    let altitude = altitude_str
        .parse::<f32>()
        .map_err(|_| NmeaError::malformed("altitude", altitude_str))?;

    Ok(GgaData {
        talker,
        quality,
        position: Some((latitude, longitude, altitude)),
    })
}
