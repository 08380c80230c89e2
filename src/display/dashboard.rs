/*
 *  display/dashboard.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  One full dashboard frame from a weather reading
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

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use embedded_graphics::{prelude::*, primitives::Rectangle};
use log::{debug, warn};

use crate::conditions::{StatKind, StatThresholds, temperature_color};
use crate::display::{
    Canvas,
    color::InkyColor,
    error::DisplayError,
    layout::{Anchor, DEFAULT_TIME_FORMAT, DashboardLayout, FontRole},
    text::TextPainter,
};
use crate::draw::{draw_hrule, fill_rect};
use crate::weather::WeatherReading;
use crate::weather_glyph::icon_glyph;

pub const CONNECT_ERROR: &str = "Connect Error";

/// Format `now`, falling back to the default pattern when chrono rejects `fmt`.
pub fn header_timestamp(now: &DateTime<Local>, fmt: &str) -> String {
    let mut stamp = String::new();
    if write!(stamp, "{}", now.format(fmt)).is_ok() {
        return stamp;
    }
    warn!("time format '{}' rejected, using '{}'", fmt, DEFAULT_TIME_FORMAT);
    stamp.clear();
    let _ = write!(stamp, "{}", now.format(DEFAULT_TIME_FORMAT));
    stamp
}

/// Draws the whole dashboard; owns the layout and the text painter.
pub struct DashboardRenderer<P: TextPainter> {
    layout: DashboardLayout,
    thresholds: StatThresholds,
    painter: P,
}

impl<P: TextPainter> DashboardRenderer<P> {
    pub fn new(layout: DashboardLayout, thresholds: StatThresholds, painter: P) -> Self {
        Self { layout, thresholds, painter }
    }

    pub fn painter(&self) -> &P {
        &self.painter
    }

    pub fn into_painter(self) -> P {
        self.painter
    }

    /// Render with the header stamped at the current local time.
    pub fn render(&mut self, reading: Option<&WeatherReading>) -> Result<Canvas, DisplayError> {
        self.render_at(reading, Local::now())
    }

    pub fn render_at(&mut self, reading: Option<&WeatherReading>, now: DateTime<Local>) -> Result<Canvas, DisplayError> {
        let mut canvas = Canvas::new(self.layout.width, self.layout.height, InkyColor::White);

        let Some(reading) = reading else {
            debug!("no reading, drawing error placeholder");
            self.text(&mut canvas, CONNECT_ERROR, self.layout.error_origin, FontRole::Header, Anchor::LeftTop, InkyColor::Red)?;
            return Ok(canvas);
        };

        self.draw_header(&mut canvas, now)?;
        self.draw_current(&mut canvas, reading)?;
        self.draw_stats(&mut canvas, reading)?;
        if reading.has_lightning() {
            self.draw_lightning_banner(&mut canvas, reading.strikes)?;
        } else {
            self.draw_forecast(&mut canvas, reading)?;
        }
        Ok(canvas)
    }

    fn text(
        &mut self,
        canvas: &mut Canvas,
        text: &str,
        origin: Point,
        role: FontRole,
        anchor: Anchor,
        color: InkyColor,
    ) -> Result<(), DisplayError> {
        self.painter.draw_text(canvas, text, origin, role, anchor, color)
    }

    fn draw_header(&mut self, canvas: &mut Canvas, now: DateTime<Local>) -> Result<(), DisplayError> {
        let header = self.layout.header.clone();
        let bar = Rectangle::new(Point::zero(), Size::new(self.layout.width, header.height));
        let Ok(()) = fill_rect(canvas, bar, InkyColor::Black);

        self.text(canvas, &header.title, header.title_origin, FontRole::Header, Anchor::LeftMiddle, InkyColor::White)?;
        let stamp = header_timestamp(&now, &header.time_format);
        self.text(canvas, &stamp, header.time_origin, FontRole::Header, Anchor::RightMiddle, InkyColor::White)
    }

    fn draw_current(&mut self, canvas: &mut Canvas, reading: &WeatherReading) -> Result<(), DisplayError> {
        let current = self.layout.current.clone();

        let (glyph, tint) = icon_glyph(&reading.icon);
        self.text(canvas, &glyph.to_string(), current.icon_origin, FontRole::IconLarge, Anchor::LeftTop, tint)?;

        let temp = format!("{:.1}°", reading.temperature);
        let temp_color = temperature_color(reading.temperature);
        debug!("current: {} in {}, '{}' {}", temp, temp_color.name(), reading.icon, tint.name());
        self.text(canvas, &temp, current.temp_origin, FontRole::Huge, Anchor::LeftTop, temp_color)?;

        self.text(canvas, &reading.summary, current.summary_origin, FontRole::Medium, Anchor::LeftTop, InkyColor::Black)?;
        let feels = format!("Feels like {:.1}°", reading.feels_like);
        self.text(canvas, &feels, current.feels_like_origin, FontRole::Small, Anchor::LeftTop, InkyColor::Black)
    }

    fn draw_stats(&mut self, canvas: &mut Canvas, reading: &WeatherReading) -> Result<(), DisplayError> {
        let rows = [
            ("Wind", format!("{:.1} {} m/s", reading.wind_speed, reading.wind_direction), reading.wind_speed, StatKind::Wind),
            ("Rain", format!("{:.1} mm", reading.rain_today), reading.rain_today, StatKind::Rain),
            ("Humidity", format!("{:.0} %", reading.humidity), reading.humidity, StatKind::Humidity),
            ("Pressure", format!("{:.0} hPa", reading.pressure), reading.pressure, StatKind::Pressure),
            ("UV Index", format!("{:.1}", reading.uv), reading.uv, StatKind::Uv),
        ];

        let label_x = self.layout.grid.label_x;
        let value_x = self.layout.grid.value_right_x;
        for (i, (label, value, raw, kind)) in rows.into_iter().enumerate() {
            let y = self.layout.grid_row_y(i);
            let color = self.thresholds.color_for(raw, kind);
            self.text(canvas, label, Point::new(label_x, y), FontRole::Medium, Anchor::LeftTop, InkyColor::Black)?;
            self.text(canvas, &value, Point::new(value_x, y), FontRole::Value, Anchor::RightTop, color)?;
        }
        Ok(())
    }

    fn draw_lightning_banner(&mut self, canvas: &mut Canvas, strikes: u32) -> Result<(), DisplayError> {
        let footer = self.layout.footer.clone();
        let top = self.layout.height as i32 - footer.banner_height as i32;
        let banner = Rectangle::new(Point::new(0, top), Size::new(self.layout.width, footer.banner_height));
        let Ok(()) = fill_rect(canvas, banner, InkyColor::Red);

        let text = format!("LIGHTNING DETECTED: {}", strikes);
        self.text(canvas, &text, footer.banner_text_origin, FontRole::Header, Anchor::LeftTop, InkyColor::White)
    }

    fn draw_forecast(&mut self, canvas: &mut Canvas, reading: &WeatherReading) -> Result<(), DisplayError> {
        let footer = self.layout.footer.clone();
        let y = footer.divider_y;
        let Ok(()) = draw_hrule(canvas, y, footer.divider_margin, InkyColor::Black, footer.divider_width);

        for (i, day) in reading.forecast.iter().take(footer.forecast_days).enumerate() {
            let x = self.layout.forecast_column_x(i);
            self.text(canvas, &day.day, Point::new(x + 20, y + 15), FontRole::Small, Anchor::LeftTop, InkyColor::Black)?;

            let (glyph, tint) = icon_glyph(&day.icon);
            self.text(canvas, &glyph.to_string(), Point::new(x + 15, y + 40), FontRole::IconSmall, Anchor::LeftTop, tint)?;

            let range = format!("{}° / {}°", day.high, day.low);
            self.text(canvas, &range, Point::new(x + 5, y + 105), FontRole::Small, Anchor::LeftTop, InkyColor::Black)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::text::RecordingPainter;
    use crate::weather::ForecastDay;
    use chrono::TimeZone;

    fn reading() -> WeatherReading {
        WeatherReading {
            temperature: 22.3,
            feels_like: 22.0,
            humidity: 55.0,
            wind_speed: 12.0,
            wind_direction: "NE".to_string(),
            pressure: 1012.0,
            rain_today: 0.0,
            uv: 6.2,
            strikes: 0,
            icon: "clear-day".to_string(),
            summary: "Clear".to_string(),
            forecast: (0..5)
                .map(|i| ForecastDay {
                    day: ["Mon", "Tue", "Wed", "Thu", "Fri"][i].to_string(),
                    high: 21 + i as i32,
                    low: 11,
                    icon: "rainy".to_string(),
                })
                .collect(),
        }
    }

    fn renderer() -> DashboardRenderer<RecordingPainter> {
        DashboardRenderer::new(DashboardLayout::default(), StatThresholds::default(), RecordingPainter::new())
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 12, 5, 0).unwrap()
    }

    #[test]
    fn test_header_bar_and_timestamp() {
        let mut r = renderer();
        let canvas = r.render_at(Some(&reading()), noon()).unwrap();
        assert_eq!(canvas.pixel(400, 2), Some(InkyColor::Black));
        assert_eq!(canvas.pixel(400, 65), Some(InkyColor::Black));
        assert_eq!(canvas.pixel(400, 66), Some(InkyColor::White));

        let stamp = r.painter().find("Mar 14, 12:05 PM").expect("timestamp");
        assert_eq!(stamp.anchor, Anchor::RightMiddle);
        assert_eq!(stamp.origin, Point::new(770, 32));
        assert_eq!(stamp.color, InkyColor::White);
        assert_eq!(r.painter().find("Tempest Weather").unwrap().origin, Point::new(30, 32));
    }

    #[test]
    fn test_current_block() {
        let mut r = renderer();
        r.render_at(Some(&reading()), noon()).unwrap();
        let p = r.painter();

        let temp = p.find("22.3°").unwrap();
        assert_eq!((temp.origin, temp.role, temp.color), (Point::new(200, 110), FontRole::Huge, InkyColor::Orange));
        let icon = p.find("\u{f00d}").unwrap();
        assert_eq!((icon.origin, icon.color), (Point::new(40, 120), InkyColor::Orange));
        assert_eq!(p.find("Clear").unwrap().origin, Point::new(210, 250));
        let feels = p.find("Feels like 22.0°").unwrap();
        assert_eq!((feels.role, feels.origin), (FontRole::Small, Point::new(210, 290)));
    }

    #[test]
    fn test_stat_values_right_aligned_and_coloured() {
        let mut r = renderer();
        r.render_at(Some(&reading()), noon()).unwrap();
        let p = r.painter();

        let expected = [
            ("12.0 NE m/s", 100, InkyColor::Orange),
            ("0.0 mm", 145, InkyColor::Black),
            ("55 %", 190, InkyColor::Green),
            ("1012 hPa", 235, InkyColor::Black),
            ("6.2", 280, InkyColor::Orange),
        ];
        for (text, y, color) in expected {
            let run = p.find(text).unwrap_or_else(|| panic!("missing {text}"));
            assert_eq!(run.origin, Point::new(760, y), "{text}");
            assert_eq!(run.anchor, Anchor::RightTop, "{text}");
            assert_eq!(run.color, color, "{text}");
        }
        for (label, y) in [("Wind", 100), ("Rain", 145), ("Humidity", 190), ("Pressure", 235), ("UV Index", 280)] {
            assert_eq!(p.find(label).unwrap().origin, Point::new(480, y));
        }
    }

    #[test]
    fn test_forecast_strip() {
        let mut r = renderer();
        let canvas = r.render_at(Some(&reading()), noon()).unwrap();
        let p = r.painter();

        assert_eq!(p.containing("° / ").count(), 5);
        assert_eq!(p.find("Mon").unwrap().origin, Point::new(60, 345));
        assert_eq!(p.find("25° / 11°").unwrap().origin, Point::new(645, 435));
        assert_eq!(p.texts().iter().filter(|t| **t == "\u{f019}").count(), 5);
        assert!(p.containing("LIGHTNING").next().is_none());

        assert_eq!(canvas.pixel(21, 330), Some(InkyColor::Black));
        assert_eq!(canvas.pixel(779, 330), Some(InkyColor::Black));
        assert_eq!(canvas.pixel(10, 330), Some(InkyColor::White));
        assert_eq!(canvas.count_in(&Rectangle::new(Point::new(0, 470), Size::new(800, 10)), InkyColor::Red), 0);
    }

    #[test]
    fn test_lightning_replaces_forecast() {
        let mut r = renderer();
        let storm = WeatherReading { strikes: 3, ..reading() };
        let canvas = r.render_at(Some(&storm), noon()).unwrap();
        let p = r.painter();

        let banner = p.find("LIGHTNING DETECTED: 3").unwrap();
        assert_eq!((banner.origin, banner.color), (Point::new(150, 440), InkyColor::White));
        assert_eq!(p.containing("° / ").count(), 0);
        assert!(p.find("Mon").is_none());

        assert_eq!(canvas.pixel(0, 430), Some(InkyColor::Red));
        assert_eq!(canvas.pixel(799, 479), Some(InkyColor::Red));
        assert_eq!(canvas.pixel(400, 429), Some(InkyColor::White));
        assert_eq!(canvas.pixel(400, 330), Some(InkyColor::White));
    }

    #[test]
    fn test_short_forecast_draws_what_it_has() {
        let mut r = renderer();
        let mut short = reading();
        short.forecast.truncate(2);
        r.render_at(Some(&short), noon()).unwrap();
        assert_eq!(r.painter().containing("° / ").count(), 2);
    }

    #[test]
    fn test_no_data_draws_only_the_error() {
        let mut r = renderer();
        let canvas = r.render_at(None, noon()).unwrap();
        let p = r.painter();

        assert_eq!(p.runs().len(), 1);
        let run = &p.runs()[0];
        assert_eq!((run.text.as_str(), run.origin, run.color), (CONNECT_ERROR, Point::new(100, 200), InkyColor::Red));
        assert_eq!(canvas.count(InkyColor::Black), 0);
        assert_eq!(canvas.count(InkyColor::White) + canvas.count(InkyColor::Red), 800 * 480);
    }

    #[test]
    fn test_custom_thresholds_change_row_colour() {
        let mut thresholds = StatThresholds::default();
        thresholds.wind.caution = 20.0;
        thresholds.wind.alert = 30.0;
        let mut r = DashboardRenderer::new(DashboardLayout::default(), thresholds, RecordingPainter::new());
        r.render_at(Some(&reading()), noon()).unwrap();
        assert_eq!(r.painter().find("12.0 NE m/s").unwrap().color, InkyColor::Green);
    }

    #[test]
    fn test_bad_time_format_falls_back() {
        let mut layout = DashboardLayout::default();
        layout.header.time_format = "%Q".to_string();
        let mut r = DashboardRenderer::new(layout, StatThresholds::default(), RecordingPainter::new());
        r.render_at(Some(&reading()), noon()).unwrap();
        assert!(r.painter().find("Mar 14, 12:05 PM").is_some());
        assert_eq!(header_timestamp(&noon(), "%H:%M"), "12:05");
    }
}
