use std::path::Path;
use std::sync::Arc;
use tiny_skia as sk;

use crate::engine::Candidate;
use crate::error::{GrowError, Result};
use crate::shape::{Polygon, Shape};

/// parchment background behind every frame
pub const BACKGROUND: [u8; 3] = [0xe7, 0xd7, 0xc1];

const PREVIEW_STROKE: [u8; 4] = [0x33, 0x33, 0x33, 0xb0];

pub struct CpuRenderer;

impl CpuRenderer {
    /// Full-frame render of the store in painter's order, with optional candidate
    /// previews drawn dashed underneath. World units map 1:1 to pixels.
    pub fn render(polys: &[Arc<Polygon>], previews: &[Candidate], width: u32, height: u32) -> Result<sk::Pixmap> {
        profiling::scope!("render");
        let mut pix = sk::Pixmap::new(width, height)
            .ok_or_else(|| GrowError::Render(format!("cannot allocate a {width}x{height} pixmap")))?;
        let [r, g, b] = BACKGROUND;
        pix.fill(sk::Color::from_rgba8(r, g, b, 255));

        if !previews.is_empty() {
            let [r, g, b, a] = PREVIEW_STROKE;
            let mut paint = sk::Paint::default();
            paint.set_color_rgba8(r, g, b, a);
            paint.anti_alias = true;
            let stroke = sk::Stroke { width: 0.8, dash: sk::StrokeDash::new(vec![2.0, 2.0], 0.0), ..Default::default() };
            for shape in previews.iter().flat_map(|c| &c.to_add) {
                if let Some(path) = build_path(shape) {
                    pix.stroke_path(&path, &paint, &stroke, sk::Transform::identity(), None);
                }
            }
        }

        for poly in polys {
            draw_shape(&mut pix, poly.shape());
        }
        Ok(pix)
    }

    /// encode to PNG on disk
    pub fn save_png(pix: &sk::Pixmap, path: impl AsRef<Path>) -> Result<()> {
        profiling::scope!("save_png");
        let bytes = pix.encode_png().map_err(|e| GrowError::Render(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn build_path(shape: &Shape) -> Option<sk::Path> {
    let pts = shape.points();
    let mut pb = sk::PathBuilder::new();
    pb.move_to(pts[0].x as f32, pts[0].y as f32);
    for p in &pts[1..] {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    // degenerate outlines have no path
    pb.finish()
}

fn to_color(rgba: [f32; 4]) -> Option<sk::Color> {
    sk::Color::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn draw_shape(pix: &mut sk::Pixmap, shape: &Shape) {
    profiling::scope!("draw_shape");
    let Some(path) = build_path(shape) else {
        return;
    };

    // quick reject: bbox fully outside the pixmap
    let r = path.bounds();
    if r.right() < 0.0 || r.bottom() < 0.0 || r.left() >= pix.width() as f32 || r.top() >= pix.height() as f32 {
        return;
    }

    let mut paint = sk::Paint::default();
    paint.anti_alias = true;
    if let Some(fill) = shape.style.fill.and_then(to_color) {
        paint.set_color(fill);
        pix.fill_path(&path, &paint, sk::FillRule::EvenOdd, sk::Transform::identity(), None);
    }
    if let Some(stroke) = shape.style.stroke.and_then(to_color) {
        paint.set_color(stroke);
        pix.stroke_path(&path, &paint, &sk::Stroke::default(), sk::Transform::identity(), None);
    }
}
