/*
 *  display/mod.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Display subsystem - palette canvas, dashboard renderer and output sinks
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;
pub mod color;

// Output sinks (panel support behind driver-inky)
pub mod drivers;

// Fixed-coordinate layout
pub mod layout;

// Text rasterisation
pub mod text;

// Dashboard frame
pub mod dashboard;

/// The frame every sink consumes
pub type Canvas = crate::vframebuf::VarFrameBuf<color::InkyColor>;

// Re-exports for convenience
pub use traits::{OutputSink, SinkCapabilities, ColorDepth};
pub use error::{DisplayError, FontError};
pub use factory::{SinkFactory, BoxedSink};
pub use color::InkyColor;
pub use layout::{Anchor, DashboardLayout, FontRole};
pub use text::{RecordingPainter, SvgTextPainter, TextPainter, TextRun};
pub use dashboard::DashboardRenderer;
