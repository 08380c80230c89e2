/*
 *  display/text.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  TrueType text onto the palette canvas
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

//! Text is laid out by usvg against the three dashboard fonts, rasterised
//! by resvg into an RGBA pixmap and then thresholded onto the canvas in a
//! single palette colour. E-ink has no grey, so coverage >= 50% is ink.

use std::path::{Path, PathBuf};

use embedded_graphics::{prelude::*, primitives::Rectangle};
use log::{debug, info};
use resvg::{
    render,
    usvg::{Options as UsvgOptions, Transform, Tree as UsvgTree},
};
use tiny_skia::Pixmap;

use crate::display::{
    Canvas,
    color::InkyColor,
    error::{DisplayError, FontError},
    layout::{Anchor, FontFace, FontRole},
};

/// Font files expected in the assets directory
pub const FONT_FILES: [(FontFace, &str); 3] = [
    (FontFace::Bold, "Merriweather-Bold.ttf"),
    (FontFace::Regular, "Merriweather-Regular.ttf"),
    (FontFace::WeatherIcons, "weathericons.ttf"),
];

/// Coverage at or above this is drawn
const INK_THRESHOLD: u8 = 128;

pub fn font_path(assets_dir: &Path, face: FontFace) -> PathBuf {
    let file = FONT_FILES
        .iter()
        .find(|(f, _)| *f == face)
        .map_or("", |(_, name)| *name);
    assets_dir.join(file)
}

/// Anything that can put a run of text on the canvas
pub trait TextPainter {
    fn draw_text(
        &mut self,
        canvas: &mut Canvas,
        text: &str,
        origin: Point,
        role: FontRole,
        anchor: Anchor,
        color: InkyColor,
    ) -> Result<(), DisplayError>;
}

/// Escape text for use inside an SVG element
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<text>` element on a transparent `size` canvas. Right anchors map to
/// `text-anchor="end"`, middle anchors to a central baseline.
pub fn text_svg(
    family: &str,
    weight: u16,
    pixel_size: u32,
    text: &str,
    origin: Point,
    anchor: Anchor,
    size: Size,
) -> String {
    let text_anchor = if anchor.is_right() { "end" } else { "start" };
    let baseline = if anchor.is_middle() { "central" } else { "text-before-edge" };
    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            r##"<text x="{x}" y="{y}" font-family="{family}" font-weight="{weight}" font-size="{size}" "##,
            r##"fill="#000000" text-anchor="{ta}" dominant-baseline="{db}" xml:space="preserve">{text}</text></svg>"##,
        ),
        w = size.width,
        h = size.height,
        x = origin.x,
        y = origin.y,
        family = xml_escape(family),
        weight = weight,
        size = pixel_size,
        ta = text_anchor,
        db = baseline,
        text = xml_escape(text),
    )
}

/// Family and weight as registered in the font database
#[derive(Debug, Clone, PartialEq)]
struct LoadedFace {
    family: String,
    weight: u16,
}

/// Production painter: usvg layout, resvg raster
pub struct SvgTextPainter {
    options: UsvgOptions<'static>,
    faces: Vec<(FontFace, LoadedFace)>,
    pixmap: Option<Pixmap>,
}

impl std::fmt::Debug for SvgTextPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgTextPainter").field("faces", &self.faces).finish()
    }
}

impl SvgTextPainter {
    /// Load all three fonts. Any missing or unusable file is an error.
    pub fn load(assets_dir: &Path) -> Result<Self, FontError> {
        let mut options = UsvgOptions::default();
        let mut faces = Vec::with_capacity(FONT_FILES.len());

        for (face, _) in FONT_FILES {
            let path = font_path(assets_dir, face);
            if !path.is_file() {
                return Err(FontError::Missing(path));
            }
            let data = std::fs::read(&path).map_err(|source| FontError::Unreadable {
                path: path.clone(),
                source,
            })?;

            let db = options.fontdb_mut();
            let before = db.len();
            db.load_font_data(data);
            let loaded = db
                .faces()
                .skip(before)
                .find_map(|info| {
                    info.families.first().map(|(family, _)| LoadedFace {
                        family: family.clone(),
                        weight: info.weight.0,
                    })
                })
                .ok_or_else(|| FontError::NoFace(path.clone()))?;

            debug!("font {:?}: '{}' weight {}", face, loaded.family, loaded.weight);
            faces.push((face, loaded));
        }
        info!("Fonts loaded from {}", assets_dir.display());

        Ok(Self { options, faces, pixmap: None })
    }

    fn face(&self, face: FontFace) -> Result<&LoadedFace, DisplayError> {
        self.faces
            .iter()
            .find(|(f, _)| *f == face)
            .map(|(_, loaded)| loaded)
            .ok_or_else(|| DisplayError::TextError(format!("no font loaded for {:?}", face)))
    }

    fn pixmap(&mut self, size: Size) -> Result<&mut Pixmap, DisplayError> {
        let reuse = self
            .pixmap
            .as_ref()
            .is_some_and(|p| p.width() == size.width && p.height() == size.height);
        if !reuse {
            self.pixmap = Pixmap::new(size.width, size.height);
        }
        let pixmap = self
            .pixmap
            .as_mut()
            .ok_or_else(|| DisplayError::TextError(format!("cannot allocate {}x{} pixmap", size.width, size.height)))?;
        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        Ok(pixmap)
    }
}

impl TextPainter for SvgTextPainter {
    fn draw_text(
        &mut self,
        canvas: &mut Canvas,
        text: &str,
        origin: Point,
        role: FontRole,
        anchor: Anchor,
        color: InkyColor,
    ) -> Result<(), DisplayError> {
        if text.is_empty() {
            return Ok(());
        }
        let size = canvas.size();
        let face = self.face(role.face())?;
        let svg = text_svg(&face.family, face.weight, role.pixel_size(), text, origin, anchor, size);
        let tree = UsvgTree::from_str(&svg, &self.options)
            .map_err(|e| DisplayError::TextError(format!("'{}': {:?}", text, e)))?;

        let pixmap = self.pixmap(size)?;
        render(&tree, Transform::default(), &mut pixmap.as_mut());

        let width = size.width as usize;
        for (i, p) in pixmap.pixels().iter().enumerate() {
            if p.alpha() >= INK_THRESHOLD {
                canvas.set_pixel((i % width) as i32, (i / width) as i32, color);
            }
        }
        Ok(())
    }
}

/// One recorded call to [`RecordingPainter::draw_text`]
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub role: FontRole,
    pub anchor: Anchor,
    pub color: InkyColor,
}

impl TextRun {
    /// Approximate ink box, about 0.55em per character and 0.8em tall
    pub fn bounds(&self) -> Rectangle {
        let em = self.role.pixel_size();
        let width = (self.text.chars().count() as u32 * em * 11 / 20).max(1);
        let height = (em * 4 / 5).max(1);
        let x = if self.anchor.is_right() { self.origin.x - width as i32 } else { self.origin.x };
        let y = if self.anchor.is_middle() { self.origin.y - height as i32 / 2 } else { self.origin.y };
        Rectangle::new(Point::new(x, y), Size::new(width, height))
    }
}

/// Font-free painter: keeps every run and blocks out its approximate box
/// in the run's colour so pixel checks still mean something.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    runs: Vec<TextRun>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn texts(&self) -> Vec<&str> {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// First run with exactly this text
    pub fn find(&self, text: &str) -> Option<&TextRun> {
        self.runs.iter().find(|r| r.text == text)
    }

    /// Runs whose text contains `needle`
    pub fn containing<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a TextRun> + 'a {
        self.runs.iter().filter(move |r| r.text.contains(needle))
    }

}

impl TextPainter for RecordingPainter {
    fn draw_text(
        &mut self,
        canvas: &mut Canvas,
        text: &str,
        origin: Point,
        role: FontRole,
        anchor: Anchor,
        color: InkyColor,
    ) -> Result<(), DisplayError> {
        let run = TextRun { text: text.to_string(), origin, role, anchor, color };
        if !text.is_empty() {
            let Ok(()) = canvas.fill_solid(&run.bounds(), color);
        }
        self.runs.push(run);
        Ok(())
    }
}
