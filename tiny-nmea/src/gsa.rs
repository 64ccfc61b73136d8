use heapless::String;

use crate::common::parse_f32_or_zero;
use crate::error::NmeaError;
use crate::fields::Fields;
use crate::message::{Constellation, Dop, FixType};

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct GsaData {
    pub talker: String<2>,
    pub auto_mode: bool,
    /// `None` when the fix type field is not `1`, `2` or `3`. Such sentences
    /// do not update the fix info.
    pub fix_type: Option<FixType>,
    pub satellites_used: u8,
    pub dop: Dop,
    pub constellation: Constellation,
}

// fields: 0 mode A/M, 1 fix type, 2-13 satellite ids, 14 PDOP, 15 HDOP, 16 VDOP, 17 system id
pub fn parse_gsa(talker: String<2>, fields: Fields) -> Result<GsaData, NmeaError> {
    let auto_mode = fields.get_or_empty(0) == "A";

    let fix_type = match fields.get_or_empty(1) {
        "1" => Some(FixType::None),
        "2" => Some(FixType::Fix2D),
        "3" => Some(FixType::Fix3D),
        _ => None,
    };

    let satellites_used = fields
        .iter()
        .skip(2)
        .take(12)
        .filter(|id| !id.is_empty())
        .count() as u8;

    let dop = Dop {
        pdop: parse_f32_or_zero("PDOP", fields.get_or_empty(14))?,
        hdop: parse_f32_or_zero("HDOP", fields.get_or_empty(15))?,
        vdop: parse_f32_or_zero("VDOP", fields.get_or_empty(16))?,
    };

    let system_id = fields.get_or_empty(17);
    let constellation = match system_id
        .get(..1)
        .and_then(|digit| u8::from_str_radix(digit, 16).ok())
    {
        Some(id) => Constellation::from_system_id(id),
        None => {
            if !system_id.is_empty() {
                log_warn!("nmea: '{}' is not a valid system id", system_id);
            }
            Constellation::Invalid
        }
    };

    Ok(GsaData {
        talker,
        auto_mode,
        fix_type,
        satellites_used,
        dop,
        constellation,
    })
}
