use core::f32::consts::PI;
use core::fmt::Write;

use heapless::String;
use libm::{asinf, atan2f, cosf, fabsf, sinf, sqrtf};

const EARTH_RADIUS_M: f32 = 6_371_000.0;
const DEG_TO_RAD: f32 = PI / 180.0;

/// Haversine distance in meters.
pub fn great_circle_distance_m(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f32 {
    let lat1 = lat1 * DEG_TO_RAD;
    let lon1 = lon1 * DEG_TO_RAD;
    let lat2 = lat2 * DEG_TO_RAD;
    let lon2 = lon2 * DEG_TO_RAD;

    let sin_dlat_over_2 = sinf((lat2 - lat1) * 0.5);
    let sin_dlon_over_2 = sinf((lon2 - lon1) * 0.5);
    let sin_sumlat_over_2 = sinf((lat2 + lat1) * 0.5);

    let sin_sq_dlat = sin_dlat_over_2 * sin_dlat_over_2;
    let sin_sq_dlon = sin_dlon_over_2 * sin_dlon_over_2;
    let sin_sq_sumlat = sin_sumlat_over_2 * sin_sumlat_over_2;

    let arg = sqrtf(sin_sq_dlat + (1.0 - sin_sq_dlat - sin_sq_sumlat) * sin_sq_dlon);
    2.0 * asinf(arg.min(1.0)) * EARTH_RADIUS_M
}

/// Initial bearing from point 1 to point 2, degrees in [0, 360).
pub fn direction_angle(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f32 {
    let lat1 = lat1 * DEG_TO_RAD;
    let lat2 = lat2 * DEG_TO_RAD;
    let dlon = (lon2 - lon1) * DEG_TO_RAD;

    let numer = cosf(lat2) * sinf(dlon);
    let denom = cosf(lat1) * sinf(lat2) - sinf(lat1) * cosf(lat2) * cosf(dlon);

    let angle = atan2f(numer, denom) / DEG_TO_RAD;
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

pub fn format_float<const N: usize>(value: f32, decimals: usize) -> String<N> {
    let mut s = String::new();
    write!(s, "{:.*}", decimals, value).ok();
    s
}

/// `DD-MM,mmmH` for latitudes, `DDD-MM,mmmH` for longitudes.
pub fn format_position_nautical<const N: usize>(
    value: f32,
    decimals: u32,
    is_latitude: bool,
) -> String<N> {
    let hemisphere = match (is_latitude, value < 0.0) {
        (true, false) => 'N',
        (true, true) => 'S',
        (false, false) => 'E',
        (false, true) => 'W',
    };
    let value = fabsf(value);
    let degrees = value as u32;

    let factor = 10u32.pow(decimals);
    let scaled_minutes = libm::roundf((value - degrees as f32) * 60.0 * factor as f32) as u32;
    // never round up to 60 minutes
    let scaled_minutes = scaled_minutes.min(60 * factor - 1);

    let mut s = String::new();
    write!(
        s,
        "{:0width$}-{:02},{:0decimals$}{}",
        degrees,
        scaled_minutes / factor,
        scaled_minutes % factor,
        hemisphere,
        width = if is_latitude { 2 } else { 3 },
        decimals = decimals as usize,
    )
    .ok();
    s
}

/// Six character Maidenhead locator, e.g. `FN31pr`.
pub fn maidenhead_locator(lat: f32, lon: f32) -> String<6> {
    let lon = (lon + 180.0).clamp(0.0, 359.999_9);
    let lat = (lat + 90.0).clamp(0.0, 179.999_9);

    let field_lon = (lon / 20.0) as u8;
    let field_lat = (lat / 10.0) as u8;
    let square_lon = ((lon % 20.0) / 2.0) as u8;
    let square_lat = (lat % 10.0) as u8;
    let sub_lon = ((lon % 2.0) * 12.0) as u8;
    let sub_lat = ((lat % 1.0) * 24.0) as u8;

    let mut s = String::new();
    for c in [
        b'A' + field_lon,
        b'A' + field_lat,
        b'0' + square_lon,
        b'0' + square_lat,
        b'a' + sub_lon.min(23),
        b'a' + sub_lat.min(23),
    ] {
        s.push(c as char).ok();
    }
    s
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn course_to_compass(course: f32) -> &'static str {
    let course = course % 360.0;
    let course = if course < 0.0 { course + 360.0 } else { course };
    let index = ((course + 11.25) / 22.5) as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}
