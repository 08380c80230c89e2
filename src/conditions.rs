/*
 *  conditions.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Raw observation values to display attributes: compass labels and
 *  threshold colours
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use serde::{Deserialize, Serialize};

use crate::display::color::InkyColor;

pub const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Compass label for a bearing in degrees.
///
/// Eight 45 degree sectors, nearest sector wins; exact half-way bearings
/// go to the even sector (22.5 is N, 67.5 is E).
pub fn wind_direction(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return COMPASS_POINTS[0];
    }
    let sector = (degrees / (360.0 / COMPASS_POINTS.len() as f64)).round_ties_even() as i64;
    COMPASS_POINTS[sector.rem_euclid(COMPASS_POINTS.len() as i64) as usize]
}

/// Colour for the big temperature numeral (degrees C).
///
/// 5..15 is deliberately left neutral.
pub fn temperature_color(temp: f64) -> InkyColor {
    if temp < 5.0 {
        InkyColor::Blue
    } else if (15.0..20.0).contains(&temp) {
        InkyColor::Green
    } else if (20.0..25.0).contains(&temp) {
        InkyColor::Orange
    } else if temp >= 25.0 {
        InkyColor::Red
    } else {
        InkyColor::Black
    }
}

/// Stat rows that get a threshold colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Wind,
    Rain,
    Humidity,
    Pressure,
    Uv,
}

/// Two ascending limits; above `caution` is orange, above `alert` red.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub caution: f64,
    pub alert: f64,
}

/// Humidity is flagged at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumidityBand {
    /// below this is too dry
    pub low: f64,
    /// above this is too damp
    pub high: f64,
}

/// Threshold table behind [`stat_color`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatThresholds {
    /// m/s
    pub wind: Band,
    pub uv: Band,
    /// percent
    pub humidity: HumidityBand,
}

impl Default for StatThresholds {
    fn default() -> Self {
        Self {
            wind: Band { caution: 10.0, alert: 15.0 },
            uv: Band { caution: 5.0, alert: 8.0 },
            humidity: HumidityBand { low: 40.0, high: 70.0 },
        }
    }
}

impl StatThresholds {
    pub fn validate(&self) -> Result<(), String> {
        for (name, band) in [("wind", self.wind), ("uv", self.uv)] {
            if !(band.caution < band.alert) {
                return Err(format!(
                    "thresholds.{name}: caution ({}) must be below alert ({})",
                    band.caution, band.alert
                ));
            }
        }
        if !(self.humidity.low < self.humidity.high) {
            return Err(format!(
                "thresholds.humidity: low ({}) must be below high ({})",
                self.humidity.low, self.humidity.high
            ));
        }
        Ok(())
    }

    /// Value colour for one stat row
    pub fn color_for(&self, value: f64, kind: StatKind) -> InkyColor {
        match kind {
            StatKind::Wind => band_color(value, self.wind),
            StatKind::Uv => band_color(value, self.uv),
            StatKind::Humidity => {
                if value > self.humidity.high {
                    InkyColor::Blue
                } else if value < self.humidity.low {
                    InkyColor::Orange
                } else {
                    InkyColor::Green
                }
            }
            StatKind::Rain | StatKind::Pressure => InkyColor::Black,
        }
    }
}

fn band_color(value: f64, band: Band) -> InkyColor {
    if value > band.alert {
        InkyColor::Red
    } else if value > band.caution {
        InkyColor::Orange
    } else {
        InkyColor::Green
    }
}

/// [`StatThresholds::color_for`] with the built-in table
pub fn stat_color(value: f64, kind: StatKind) -> InkyColor {
    StatThresholds::default().color_for(value, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_and_ordinal_points() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(44.0), "NE");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(135.0), "SE");
        assert_eq!(wind_direction(180.0), "S");
        assert_eq!(wind_direction(225.0), "SW");
        assert_eq!(wind_direction(270.0), "W");
        assert_eq!(wind_direction(315.0), "NW");
        assert_eq!(wind_direction(337.6), "N");
        assert_eq!(wind_direction(360.0), "N");
    }

    #[test]
    fn test_half_way_bearings_round_to_even_sector() {
        assert_eq!(wind_direction(22.5), "N");
        assert_eq!(wind_direction(67.5), "E");
        assert_eq!(wind_direction(112.5), "E");
        assert_eq!(wind_direction(157.5), "S");
    }

    #[test]
    fn test_wind_direction_is_periodic_and_total() {
        let mut d = -720.0;
        while d <= 720.0 {
            let label = wind_direction(d);
            assert!(COMPASS_POINTS.contains(&label), "{d} -> {label}");
            assert_eq!(label, wind_direction(d + 360.0), "{d}");
            d += 0.25;
        }
        assert_eq!(wind_direction(f64::NAN), "N");
        assert_eq!(wind_direction(-90.0), "W");
    }

    #[test]
    fn test_temperature_breakpoints() {
        assert_eq!(temperature_color(-10.0), InkyColor::Blue);
        assert_eq!(temperature_color(4.99), InkyColor::Blue);
        assert_eq!(temperature_color(5.0), InkyColor::Black);
        assert_eq!(temperature_color(10.0), InkyColor::Black);
        assert_eq!(temperature_color(14.99), InkyColor::Black);
        assert_eq!(temperature_color(15.0), InkyColor::Green);
        assert_eq!(temperature_color(19.99), InkyColor::Green);
        assert_eq!(temperature_color(20.0), InkyColor::Orange);
        assert_eq!(temperature_color(22.3), InkyColor::Orange);
        assert_eq!(temperature_color(24.99), InkyColor::Orange);
        assert_eq!(temperature_color(25.0), InkyColor::Red);
        assert_eq!(temperature_color(41.0), InkyColor::Red);
        assert_eq!(temperature_color(f64::NAN), InkyColor::Black);
    }

    #[test]
    fn test_temperature_gap_is_neutral() {
        let mut t = 5.0;
        while t < 15.0 {
            assert_eq!(temperature_color(t), InkyColor::Black, "{t}");
            t += 0.1;
        }
    }

    #[test]
    fn test_wind_and_uv_bands() {
        assert_eq!(stat_color(10.0, StatKind::Wind), InkyColor::Green);
        assert_eq!(stat_color(10.1, StatKind::Wind), InkyColor::Orange);
        assert_eq!(stat_color(15.0, StatKind::Wind), InkyColor::Orange);
        assert_eq!(stat_color(15.1, StatKind::Wind), InkyColor::Red);
        assert_eq!(stat_color(5.0, StatKind::Uv), InkyColor::Green);
        assert_eq!(stat_color(6.2, StatKind::Uv), InkyColor::Orange);
        assert_eq!(stat_color(8.5, StatKind::Uv), InkyColor::Red);
    }

    #[test]
    fn test_humidity_flags_both_ends() {
        assert_eq!(stat_color(39.0, StatKind::Humidity), InkyColor::Orange);
        assert_eq!(stat_color(40.0, StatKind::Humidity), InkyColor::Green);
        assert_eq!(stat_color(55.0, StatKind::Humidity), InkyColor::Green);
        assert_eq!(stat_color(70.0, StatKind::Humidity), InkyColor::Green);
        assert_eq!(stat_color(71.0, StatKind::Humidity), InkyColor::Blue);
    }

    #[test]
    fn test_unrated_stats_are_black() {
        assert_eq!(stat_color(12.5, StatKind::Rain), InkyColor::Black);
        assert_eq!(stat_color(1012.0, StatKind::Pressure), InkyColor::Black);
    }

    #[test]
    fn test_custom_table() {
        let table = StatThresholds {
            wind: Band { caution: 20.0, alert: 30.0 },
            ..Default::default()
        };
        assert!(table.validate().is_ok());
        assert_eq!(table.color_for(12.0, StatKind::Wind), InkyColor::Green);
        let bad = StatThresholds {
            humidity: HumidityBand { low: 80.0, high: 20.0 },
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
