//! Drawing surfaces the loader paints into.
//!
//! The loader only needs three drawing operations (clear, filled wedge,
//! stroked arc) and a way to turn the raster into something a `<link href>`
//! accepts. [`RasterSurface`] implements that on top of `tiny-skia` and
//! exports PNG data URLs; browser hosts provide their own canvas-backed
//! implementation.

use std::f32::consts::FRAC_PI_2;
use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::LoaderError;
use crate::geometry::{Point, Sweep};
use crate::types::{Color, ICON_SIZE};

/// Prefix of every image reference produced by [`RasterSurface`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Minimal 2D drawing capability.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Resets every pixel to transparent.
    fn clear(&mut self);
    /// Fills the wedge between `sweep` and the center, like a canvas
    /// `arc` followed by `lineTo(center)` and `fill`.
    fn fill_wedge(&mut self, center: Point, radius: f32, sweep: Sweep, color: Color);
    /// Strokes the arc described by `sweep` with butt caps.
    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f32,
        line_width: f32,
        sweep: Sweep,
        color: Color,
    );
    /// Serializes the current contents into an image reference usable as a
    /// favicon `href`.
    fn to_image_ref(&self) -> Result<String, LoaderError>;
}

/// CPU raster surface backed by a `tiny-skia` pixmap.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Allocates a transparent surface; zero-sized surfaces have no drawing
    /// context and are rejected.
    pub fn new(width: u32, height: u32) -> Result<Self, LoaderError> {
        let pixmap = Pixmap::new(width, height).ok_or(LoaderError::MissingContext)?;
        Ok(Self { pixmap })
    }

    /// The fixed 32x32 favicon surface.
    pub fn icon() -> Result<Self, LoaderError> {
        Self::new(ICON_SIZE, ICON_SIZE)
    }

    /// Straight-alpha color at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|premultiplied| {
            let c = premultiplied.demultiply();
            Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.pixmap
            .pixels()
            .iter()
            .filter(|pixel| pixel.alpha() > 0)
            .count()
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    /// PNG-encoded contents.
    pub fn png_bytes(&self) -> Result<Vec<u8>, LoaderError> {
        let mut bytes = Vec::new();
        self.to_rgba_image()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Writes the contents to `path` as PNG.
    pub fn write_png(&self, path: &Path) -> Result<(), LoaderError> {
        self.to_rgba_image()
            .save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn fill_wedge(&mut self, center: Point, radius: f32, sweep: Sweep, color: Color) {
        if sweep.is_empty() {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(center.x, center.y);
        let start = center.on_circle(radius, sweep.start);
        pb.line_to(start.x, start.y);
        push_arc(&mut pb, center, radius, sweep);
        pb.close();
        let Some(path) = pb.finish() else {
            tracing::trace!(?sweep, "wedge path degenerated; nothing to fill");
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint_for(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f32,
        line_width: f32,
        sweep: Sweep,
        color: Color,
    ) {
        if sweep.is_empty() || line_width <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        let start = center.on_circle(radius, sweep.start);
        pb.move_to(start.x, start.y);
        push_arc(&mut pb, center, radius, sweep);
        if sweep.is_full() {
            pb.close();
        }
        let Some(path) = pb.finish() else {
            tracing::trace!(?sweep, "arc path degenerated; nothing to stroke");
            return;
        };
        let stroke = Stroke {
            width: line_width,
            line_cap: LineCap::Butt,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            &path,
            &paint_for(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn to_image_ref(&self) -> Result<String, LoaderError> {
        let bytes = self.png_bytes()?;
        Ok(format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(bytes)))
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Appends cubic segments approximating the arc; the builder's current point
/// must already sit at the arc start.
fn push_arc(pb: &mut PathBuilder, center: Point, radius: f32, sweep: Sweep) {
    let total = sweep.angle();
    let segments = (total / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = total / segments as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let mut a0 = sweep.start;
    for _ in 0..segments {
        let a1 = a0 + step;
        let (sin0, cos0) = a0.sin_cos();
        let (sin1, cos1) = a1.sin_cos();
        let c1 = Point::new(
            center.x + radius * (cos0 - k * sin0),
            center.y + radius * (sin0 + k * cos0),
        );
        let c2 = Point::new(
            center.x + radius * (cos1 + k * sin1),
            center.y + radius * (sin1 - k * cos1),
        );
        let end = center.on_circle(radius, a1);
        pb.cubic_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y);
        a0 = a1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::center;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn zero_sized_surface_has_no_context() {
        assert!(matches!(
            RasterSurface::new(0, 32),
            Err(LoaderError::MissingContext)
        ));
    }

    #[test]
    fn full_wedge_covers_center_and_quadrants() {
        let mut surface = RasterSurface::icon().unwrap();
        surface.fill_wedge(center(32, 32), 16.0, Sweep::full(), RED);
        assert_eq!(surface.pixel(16, 16), Some(RED));
        assert_eq!(surface.pixel(16, 4), Some(RED));
        assert_eq!(surface.pixel(4, 16), Some(RED));
        assert_eq!(surface.pixel(0, 0).map(|c| c.a), Some(0));
    }

    #[test]
    fn quarter_wedge_fills_lower_right_only() {
        let mut surface = RasterSurface::icon().unwrap();
        let quarter = Sweep {
            start: 0.0,
            end: FRAC_PI_2,
        };
        surface.fill_wedge(center(32, 32), 16.0, quarter, RED);
        // Clockwise from three o'clock covers the lower right quadrant.
        assert_eq!(surface.pixel(22, 22), Some(RED));
        assert_eq!(surface.pixel(9, 9).map(|c| c.a), Some(0));
        assert_eq!(surface.pixel(9, 22).map(|c| c.a), Some(0));
    }

    #[test]
    fn empty_sweeps_draw_nothing() {
        let mut surface = RasterSurface::icon().unwrap();
        let empty = Sweep::for_progress(0.0, 1.0);
        surface.fill_wedge(center(32, 32), 16.0, empty, RED);
        surface.stroke_arc(center(32, 32), 10.0, 8.0, empty, RED);
        assert_eq!(surface.painted_pixels(), 0);
    }

    #[test]
    fn full_ring_leaves_hole_in_middle() {
        let mut surface = RasterSurface::icon().unwrap();
        surface.stroke_arc(center(32, 32), 32.0 / 3.0, 8.0, Sweep::full(), RED);
        assert_eq!(surface.pixel(16, 16).map(|c| c.a), Some(0));
        assert_eq!(surface.pixel(16 + 10, 16), Some(RED));
        assert_eq!(surface.pixel(16, 16 - 11), Some(RED));
    }

    #[test]
    fn clear_resets_pixels() {
        let mut surface = RasterSurface::icon().unwrap();
        surface.fill_wedge(center(32, 32), 16.0, Sweep::full(), RED);
        surface.clear();
        assert_eq!(surface.painted_pixels(), 0);
    }

    #[test]
    fn exports_png_data_url() {
        let surface = RasterSurface::icon().unwrap();
        let href = surface.to_image_ref().unwrap();
        let encoded = href.strip_prefix(PNG_DATA_URL_PREFIX).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }
}
