//! Small parsing/formatting helpers shared across the crate.
//!
//! Grounded on the teacher crate's own `utils.rs` (`parse_time`, `get_time_str`);
//! extended with the `"lon,lat"` point parsing the query parameter surface needs.

use crate::error::ParameterError;
use crate::network::Point;

/// Number of hour-of-day buckets in a demand profile.
/// Sized to 29 (`[0..28]`) to accommodate service days whose trips run past
/// midnight (`depTime / 3600` can reach 28 for a connection departing at
/// 28:xx:xx, i.e. 04:xx the following calendar day).
pub const HOUR_BUCKETS: usize = 29;

/// Computes the hour-of-day bucket for a departure time, rejecting anything
/// that would silently truncate instead of widening the array further.
pub fn hour_of_day(dep_time_seconds: u32) -> Option<usize> {
    let hour = (dep_time_seconds / 3600) as usize;
    if hour < HOUR_BUCKETS {
        Some(hour)
    } else {
        None
    }
}

pub fn parse_time_impl(h: &str, m: &str, s: &str) -> std::result::Result<u32, std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Parses a `"HH:MM:SS"` string into seconds since midnight. Hours may exceed
/// 23 for overnight service (e.g. `"25:30:00"`).
pub fn parse_time(s: &str) -> Option<u32> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    parse_time_impl(parts[0], parts[1], parts[2]).ok()
}

pub fn get_time_str(time: u32) -> String {
    let hours = time / 3600;
    let minutes = (time % 3600) / 60;
    let seconds = time % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parses a `"lon,lat"` decimal-string query parameter.
pub fn parse_point(s: &str, on_missing: ParameterError, on_invalid: ParameterError) -> std::result::Result<Point, ParameterError> {
    if s.trim().is_empty() {
        return Err(on_missing);
    }
    let mut parts = s.split(',');
    let lon = parts.next().ok_or_else(|| on_invalid.clone())?;
    let lat = parts.next().ok_or_else(|| on_invalid.clone())?;
    if parts.next().is_some() {
        return Err(on_invalid);
    }
    let longitude: f64 = lon.trim().parse().map_err(|_| on_invalid.clone())?;
    let latitude: f64 = lat.trim().parse().map_err(|_| on_invalid)?;
    Ok(Point { longitude, latitude })
}

/// Rounds a walking-time division up to the nearest second
/// (raw seconds divided by walkingSpeedFactor, rounded up).
pub fn ceil_div_speed(raw_seconds: u32, walking_speed_factor: f64) -> u32 {
    debug_assert!(walking_speed_factor > 0.0);
    (raw_seconds as f64 / walking_speed_factor).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overnight_time() {
        assert_eq!(parse_time("25:30:00"), Some(25 * 3600 + 30 * 60));
    }

    #[test]
    fn formats_roundtrip() {
        let t = parse_time("09:50:00").unwrap();
        assert_eq!(get_time_str(t), "09:50:00");
    }

    #[test]
    fn hour_of_day_rejects_overflow() {
        assert_eq!(hour_of_day(28 * 3600 + 1), Some(28));
        assert_eq!(hour_of_day(29 * 3600), None);
    }

    #[test]
    fn point_parsing_rejects_garbage() {
        assert!(parse_point("45", ParameterError::MissingOrigin, ParameterError::InvalidOrigin).is_err());
        assert!(parse_point("foo,bar", ParameterError::MissingOrigin, ParameterError::InvalidOrigin).is_err());
        let p = parse_point("-73.5,45.5544", ParameterError::MissingOrigin, ParameterError::InvalidOrigin).unwrap();
        assert_eq!(p.longitude, -73.5);
        assert_eq!(p.latitude, 45.5544);
    }
}
