use core::fmt::Write;
use core::str::FromStr;

use libm::roundf;

/// Complete weather report fields that follow the `_` symbol.
///
/// Units are the ones the sensors deliver, conversion to the APRS units
/// (°F, mph, tenths of hPa) happens when the frame is written or read.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherReport {
    /// degrees
    pub wind_direction: Option<u16>,
    /// mph
    pub wind_speed: Option<u16>,
    /// mph
    pub wind_gust: Option<u16>,
    /// °C
    pub temperature: Option<f32>,
    /// %
    pub humidity: Option<u8>,
    /// Pa
    pub pressure: Option<f32>,
}

impl WeatherReport {
    /// Writes `ddd/sssgGGGtTTThHHbBBBBB`, unknown values as dots.
    pub fn write_to<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        match self.wind_direction {
            Some(direction) => write!(w, "{:03}", direction % 360)?,
            None => w.write_str("...")?,
        }
        w.write_char('/')?;
        write_u16_or_dots(w, self.wind_speed)?;

        w.write_char('g')?;
        write_u16_or_dots(w, self.wind_gust)?;

        w.write_char('t')?;
        match self.temperature {
            Some(celsius) => {
                let fahrenheit = roundf(celsius * 9.0 / 5.0 + 32.0) as i32;
                write!(w, "{:03}", fahrenheit.clamp(-99, 999))?
            }
            None => w.write_str("...")?,
        }

        w.write_char('h')?;
        match self.humidity {
            Some(humidity) if humidity >= 100 => w.write_str("00")?,
            Some(humidity) => write!(w, "{:02}", humidity.max(1))?,
            None => w.write_str("..")?,
        }

        w.write_char('b')?;
        match self.pressure {
            Some(pa) => {
                let tenths_hpa = roundf(pa / 10.0) as i32;
                write!(w, "{:05}", tenths_hpa.clamp(0, 99999))
            }
            None => w.write_str("....."),
        }
    }

    /// Parses weather fields at the start of `data`, returning the report and
    /// the number of bytes used. Fields we don't keep (rain, luminosity, ...)
    /// are skipped.
    pub fn parse(data: &[u8]) -> Option<(WeatherReport, usize)> {
        let mut report = WeatherReport::default();

        if data.len() < 7 || data[3] != b'/' {
            return None;
        }
        report.wind_direction = parse_field(&data[0..3])?;
        report.wind_speed = parse_field(&data[4..7])?;

        let mut i = 7;
        while let Some(&tag) = data.get(i) {
            let width = match tag {
                b'h' => 2,
                b'b' => 5,
                b'g' | b't' | b'r' | b'p' | b'P' | b'L' | b'l' | b's' | b'#' => 3,
                _ => break,
            };
            let Some(value) = data.get(i + 1..i + 1 + width) else {
                break;
            };

            match tag {
                b'g' => report.wind_gust = parse_field(value)?,
                b't' => {
                    let fahrenheit: Option<i16> = parse_field(value)?;
                    report.temperature = fahrenheit.map(|f| (f as f32 - 32.0) * 5.0 / 9.0);
                }
                b'h' => {
                    let humidity: Option<u8> = parse_field(value)?;
                    report.humidity = humidity.map(|h| if h == 0 { 100 } else { h });
                }
                b'b' => {
                    let tenths_hpa: Option<u32> = parse_field(value)?;
                    report.pressure = tenths_hpa.map(|p| p as f32 * 10.0);
                }
                _ => {}
            }
            i += 1 + width;
        }

        Some((report, i))
    }
}

fn write_u16_or_dots<W: Write>(w: &mut W, value: Option<u16>) -> core::fmt::Result {
    match value {
        Some(value) => write!(w, "{:03}", value.min(999)),
        None => w.write_str("..."),
    }
}

/// `Some(None)` for an unknown (dotted or blank) value, `None` if the field is garbage.
fn parse_field<T: FromStr>(raw: &[u8]) -> Option<Option<T>> {
    if raw.iter().all(|&b| b == b'.' || b == b' ') {
        return Some(None);
    }
    let raw = core::str::from_utf8(raw).ok()?;
    raw.parse::<T>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn write(report: &WeatherReport) -> String<64> {
        let mut s = String::new();
        report.write_to(&mut s).unwrap();
        s
    }

    #[test]
    fn sensor_values_in_aprs_units() {
        let report = WeatherReport {
            temperature: Some(22.0),
            humidity: Some(55),
            pressure: Some(101_325.0),
            ..Default::default()
        };
        assert_eq!(write(&report).as_str(), ".../...g...t072h55b10133");
    }

    #[test]
    fn edge_values() {
        let report = WeatherReport {
            wind_direction: Some(90),
            wind_speed: Some(5),
            wind_gust: Some(12),
            temperature: Some(-20.0),
            humidity: Some(100),
            pressure: None,
        };
        assert_eq!(write(&report).as_str(), "090/005g012t-04h00b.....");
    }

    #[test]
    fn nothing_known() {
        assert_eq!(
            write(&WeatherReport::default()).as_str(),
            ".../...g...t...h..b....."
        );
    }

    #[test]
    fn parse_with_extra_fields() {
        let (report, used) = WeatherReport::parse(b"220/004g005t077r000p000P000h50b09900 comment").unwrap();
        assert_eq!(used, 36);
        assert_eq!(report.wind_direction, Some(220));
        assert_eq!(report.wind_gust, Some(5));
        assert!((report.temperature.unwrap() - 25.0).abs() < 1e-3);
        assert_eq!(report.humidity, Some(50));
        assert_eq!(report.pressure, Some(99_000.0));
    }

    #[test]
    fn parse_unknowns_and_garbage() {
        let (report, _) = WeatherReport::parse(b".../...g...t...h00b.....").unwrap();
        assert_eq!(report.temperature, None);
        assert_eq!(report.humidity, Some(100));

        assert_eq!(WeatherReport::parse(b"22x/004"), None);
        assert_eq!(WeatherReport::parse(b"abc"), None);
    }
}
