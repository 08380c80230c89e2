/*
 *  display/layout.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Fixed-coordinate dashboard layout
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

use embedded_graphics::prelude::*;

use crate::config::DisplayConfig;

/// Header clock, e.g. "Mar 14, 3:05 PM"
pub const DEFAULT_TIME_FORMAT: &str = "%b %d, %-I:%M %p";

/// Font faces and pixel sizes used on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    /// Current temperature numeral (bold)
    Huge,
    /// Current condition glyph
    IconLarge,
    /// Forecast glyphs
    IconSmall,
    /// Header bar, banner and error text (bold)
    Header,
    /// Summary and stat labels
    Medium,
    /// Stat values (bold)
    Value,
    /// Forecast text and the feels-like line
    Small,
}

/// Which of the three font files a role is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Bold,
    Regular,
    WeatherIcons,
}

impl FontRole {
    pub const ALL: [FontRole; 7] = [
        FontRole::Huge,
        FontRole::IconLarge,
        FontRole::IconSmall,
        FontRole::Header,
        FontRole::Medium,
        FontRole::Value,
        FontRole::Small,
    ];

    pub fn face(self) -> FontFace {
        match self {
            FontRole::Huge | FontRole::Header | FontRole::Value => FontFace::Bold,
            FontRole::Medium | FontRole::Small => FontFace::Regular,
            FontRole::IconLarge | FontRole::IconSmall => FontFace::WeatherIcons,
        }
    }

    /// Em size in pixels
    pub fn pixel_size(self) -> u32 {
        match self {
            FontRole::Huge => 130,
            FontRole::IconLarge => 110,
            FontRole::IconSmall => 50,
            FontRole::Header => 24,
            FontRole::Medium => 28,
            FontRole::Value => 28,
            FontRole::Small => 20,
        }
    }
}

/// Where a text origin sits relative to the drawn run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// origin is the left edge, at the ascender line
    LeftTop,
    /// origin is the left edge, vertically centred
    LeftMiddle,
    /// origin is the right edge, at the ascender line
    RightTop,
    /// origin is the right edge, vertically centred
    RightMiddle,
}

impl Anchor {
    pub fn is_right(self) -> bool {
        matches!(self, Anchor::RightTop | Anchor::RightMiddle)
    }

    pub fn is_middle(self) -> bool {
        matches!(self, Anchor::LeftMiddle | Anchor::RightMiddle)
    }
}

/// Header bar
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    pub height: u32,
    pub title: String,
    pub title_origin: Point,
    pub time_origin: Point,
    /// strftime pattern for the timestamp
    pub time_format: String,
}

/// Current conditions block
#[derive(Debug, Clone)]
pub struct CurrentLayout {
    pub icon_origin: Point,
    pub temp_origin: Point,
    pub summary_origin: Point,
    pub feels_like_origin: Point,
}

/// Labelled stat rows
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub label_x: i32,
    /// right edge the values are anchored to
    pub value_right_x: i32,
    pub top_y: i32,
    pub row_height: i32,
}

/// Forecast strip or lightning banner
#[derive(Debug, Clone)]
pub struct FooterLayout {
    pub divider_y: i32,
    pub divider_margin: i32,
    pub divider_width: u32,
    pub start_x: i32,
    pub column_gap: i32,
    pub forecast_days: usize,
    pub banner_height: u32,
    pub banner_text_origin: Point,
}

/// Complete layout for one panel size
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    pub width: u32,
    pub height: u32,
    pub header: HeaderLayout,
    pub current: CurrentLayout,
    pub grid: GridLayout,
    pub footer: FooterLayout,
    /// Where the "no data" message goes
    pub error_origin: Point,
}

impl DashboardLayout {
    /// 800x480 layout for the Inky Impression 7.3"
    pub fn impression_7in3() -> Self {
        let width = 800;
        let height = 480;
        Self {
            width,
            height,
            header: HeaderLayout {
                height: 66,
                title: "Tempest Weather".to_string(),
                title_origin: Point::new(30, 32),
                time_origin: Point::new(width as i32 - 30, 32),
                time_format: DEFAULT_TIME_FORMAT.to_string(),
            },
            current: CurrentLayout {
                icon_origin: Point::new(40, 120),
                temp_origin: Point::new(200, 110),
                summary_origin: Point::new(210, 250),
                feels_like_origin: Point::new(210, 290),
            },
            grid: GridLayout {
                label_x: 480,
                value_right_x: 760,
                top_y: 100,
                row_height: 45,
            },
            footer: FooterLayout {
                divider_y: 330,
                divider_margin: 20,
                divider_width: 2,
                start_x: 40,
                column_gap: 150,
                forecast_days: 5,
                banner_height: 50,
                banner_text_origin: Point::new(150, height as i32 - 40),
            },
            error_origin: Point::new(100, 200),
        }
    }

    /// Start from the panel layout and apply the configured overrides
    pub fn from_config(config: &DisplayConfig) -> Self {
        let mut layout = Self::impression_7in3();
        if let Some(title) = config.title.as_ref() {
            layout.header.title = title.clone();
        }
        if let Some(fmt) = config.time_format.as_ref() {
            layout.header.time_format = fmt.clone();
        }
        layout
    }

    /// Top-left of the forecast column `index`
    pub fn forecast_column_x(&self, index: usize) -> i32 {
        self.footer.start_x + index as i32 * self.footer.column_gap
    }

    /// Y of stat row `index`
    pub fn grid_row_y(&self, index: usize) -> i32 {
        self.grid.top_y + index as i32 * self.grid.row_height
    }
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self::impression_7in3()
    }
}
