//! Sun position from site and local clock time.

use crate::weather::Location;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::f64::consts::PI;

/// Solar altitude and azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Degrees above the horizon (negative at night).
    pub altitude: f64,
    /// Degrees clockwise from north.
    pub azimuth: f64,
}

/// Spencer day angle (radians).
fn day_angle(day_of_year: u16) -> f64 {
    2.0 * PI * (f64::from(day_of_year) - 1.0) / 365.0
}

/// Equation of time (minutes), Spencer series.
pub fn equation_of_time(day_of_year: u16) -> f64 {
    let g = day_angle(day_of_year);
    229.18
        * (0.000075 + 0.001868 * g.cos()
            - 0.032077 * g.sin()
            - 0.014615 * (2.0 * g).cos()
            - 0.040849 * (2.0 * g).sin())
}

/// Solar declination (radians), Spencer series.
pub fn declination(day_of_year: u16) -> f64 {
    let g = day_angle(day_of_year);
    0.006918 - 0.399912 * g.cos() + 0.070257 * g.sin() - 0.006758 * (2.0 * g).cos()
        + 0.000907 * (2.0 * g).sin()
        - 0.002697 * (3.0 * g).cos()
        + 0.00148 * (3.0 * g).sin()
}

impl SolarPosition {
    /// Position at `solar_hour` (apparent solar time, hours) on `day_of_year`.
    pub fn calculate(latitude: f64, day_of_year: u16, solar_hour: f64) -> Self {
        let lat = latitude.to_radians();
        let decl = declination(day_of_year);
        let hour_angle = ((solar_hour - 12.0) * 15.0).to_radians();

        let sin_alt = lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.cos();
        let altitude = sin_alt.clamp(-1.0, 1.0).asin();

        let cos_az =
            (decl.sin() * lat.cos() - decl.cos() * lat.sin() * hour_angle.cos())
                / altitude.cos().max(1e-10);
        let mut azimuth = cos_az.clamp(-1.0, 1.0).acos().to_degrees();
        if hour_angle > 0.0 {
            azimuth = 360.0 - azimuth;
        }

        Self {
            altitude: altitude.to_degrees().clamp(-90.0, 90.0),
            azimuth,
        }
    }

    /// Position at a local standard clock time of `location`.
    ///
    /// The clock time is shifted to apparent solar time with the longitude
    /// offset from the time zone meridian and the equation of time.
    pub fn from_local_time(location: &Location, datetime: NaiveDateTime) -> Self {
        let day_of_year = datetime.ordinal().min(365) as u16;
        let clock = f64::from(datetime.hour())
            + f64::from(datetime.minute()) / 60.0
            + f64::from(datetime.second()) / 3600.0;
        let solar_hour = clock
            + (4.0 * (location.longitude - 15.0 * location.time_zone)
                + equation_of_time(day_of_year))
                / 60.0;
        Self::calculate(location.latitude, day_of_year, solar_hour)
    }

    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn equation_of_time_extremes() {
        assert!((equation_of_time(307) - 16.37).abs() < 0.05);
        assert!((equation_of_time(42) + 14.20).abs() < 0.05);
    }

    #[test]
    fn solstice_noon_altitude() {
        // 90 - 40 + 23.44
        let sun = SolarPosition::calculate(40.0, 172, 12.0);
        assert!((sun.altitude - 73.44).abs() < 0.5, "{}", sun.altitude);
        assert!((sun.azimuth - 180.0).abs() < 1.0);
    }

    #[test]
    fn morning_east_afternoon_west() {
        let morning = SolarPosition::calculate(40.0, 172, 8.0);
        let afternoon = SolarPosition::calculate(40.0, 172, 16.0);
        assert!(morning.azimuth < 180.0);
        assert!(afternoon.azimuth > 180.0);
        assert!((morning.altitude - afternoon.altitude).abs() < 1e-9);
    }

    #[test]
    fn night_is_below_horizon() {
        let sun = SolarPosition::calculate(40.0, 172, 0.0);
        assert!(!sun.is_above_horizon());
    }

    #[test]
    fn local_time_applies_longitude_offset() {
        // Site on its zone meridian against one 15 degrees west: an hour later
        // in solar time.
        let meridian = Location {
            latitude: 40.0,
            longitude: -75.0,
            time_zone: -5.0,
            ..Location::default()
        };
        let west = Location {
            longitude: -90.0,
            ..meridian.clone()
        };
        let a = SolarPosition::from_local_time(&west, at(6, 21, 13, 0));
        let b = SolarPosition::from_local_time(&meridian, at(6, 21, 12, 0));
        assert!((a.altitude - b.altitude).abs() < 1e-9);
        assert!((a.azimuth - b.azimuth).abs() < 1e-9);
    }

    #[test]
    fn local_noon_is_near_solar_noon_in_summer() {
        let site = Location {
            latitude: 40.0,
            longitude: -75.0,
            time_zone: -5.0,
            ..Location::default()
        };
        let sun = SolarPosition::from_local_time(&site, at(6, 21, 12, 0));
        assert!((sun.altitude - 73.4).abs() < 0.6);
    }
}
