use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{GrayImage, Luma};
use log::debug;
use thiserror::Error;

use crate::scale::ScaleTransform;
use crate::Shape;

const FOREGROUND: Luma<u8> = Luma([255]);

#[derive(Debug, Error)]
pub enum MaskError {
    #[error("failed to encode mask: {0}")]
    Encode(#[from] image::ImageError),
}

/// Rasterizes the committed shapes into a black/white mask at native media
/// resolution. Background is 0, every shape is 255. Deterministic: identical
/// shapes and scale produce byte-identical output.
pub fn rasterize(shapes: &[Shape], scale: &ScaleTransform) -> GrayImage {
    let mut mask = GrayImage::new(scale.native_width, scale.native_height);
    for shape in shapes {
        match shape {
            Shape::Brush { points, width } if points.len() >= 2 => {
                let radius = scale.stroke_width(*width) / 2.0;
                let native: Vec<(f64, f64)> =
                    points.iter().map(|point| scale.to_native(*point)).collect();
                for segment in native.windows(2) {
                    stamp_segment(&mut mask, segment[0], segment[1], radius);
                }
            }
            Shape::Box {
                x,
                y,
                width,
                height,
            } => {
                fill_rect(
                    &mut mask,
                    *x as f64 * scale.scale_x,
                    *y as f64 * scale.scale_y,
                    *width as f64 * scale.scale_x,
                    *height as f64 * scale.scale_y,
                );
            }
            // Open polygons never contribute a fill.
            Shape::Polygon { points, closed } if *closed && points.len() >= 3 => {
                let native: Vec<(f64, f64)> =
                    points.iter().map(|point| scale.to_native(*point)).collect();
                fill_polygon(&mut mask, &native);
            }
            _ => {}
        }
    }
    debug!(
        "rasterized {} shapes into {}x{} mask",
        shapes.len(),
        scale.native_width,
        scale.native_height
    );
    mask
}

pub fn encode_png(mask: &GrayImage) -> Result<Vec<u8>, MaskError> {
    let mut bytes = Vec::new();
    mask.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )?;
    Ok(bytes)
}

pub fn data_url(mask: &GrayImage) -> Result<String, MaskError> {
    let png = encode_png(mask)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

/// Pixel columns whose centers fall in `[start, end)`, clamped to the image.
fn pixel_span(start: f64, end: f64, limit: u32) -> Option<(u32, u32)> {
    let lo = (start - 0.5).ceil().clamp(0.0, limit as f64);
    let hi = (end - 0.5).ceil().clamp(0.0, limit as f64);
    if hi <= lo {
        return None;
    }
    Some((lo as u32, hi as u32))
}

fn fill_rect(mask: &mut GrayImage, x: f64, y: f64, width: f64, height: f64) {
    let (image_width, image_height) = mask.dimensions();
    let Some((x0, x1)) = pixel_span(x, x + width, image_width) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(y, y + height, image_height) else {
        return;
    };
    for py in y0..y1 {
        for px in x0..x1 {
            mask.put_pixel(px, py, FOREGROUND);
        }
    }
}

fn distance_to_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return ((px - x1).powi(2) + (py - y1).powi(2)).sqrt();
    }
    let t = ((px - x1) * dx + (py - y1) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    let proj_x = x1 + t * dx;
    let proj_y = y1 + t * dy;
    ((px - proj_x).powi(2) + (py - proj_y).powi(2)).sqrt()
}

/// Stamps a thick segment with round caps: every pixel whose center lies
/// within `radius` of the segment turns white.
fn stamp_segment(mask: &mut GrayImage, from: (f64, f64), to: (f64, f64), radius: f64) {
    let (image_width, image_height) = mask.dimensions();
    let min_x = (from.0.min(to.0) - radius - 0.5).floor().max(0.0);
    let max_x = (from.0.max(to.0) + radius + 0.5).ceil().min(image_width as f64);
    let min_y = (from.1.min(to.1) - radius - 0.5).floor().max(0.0);
    let max_y = (from.1.max(to.1) + radius + 0.5).ceil().min(image_height as f64);
    if max_x <= min_x || max_y <= min_y {
        return;
    }
    for py in min_y as u32..max_y as u32 {
        for px in min_x as u32..max_x as u32 {
            let cx = px as f64 + 0.5;
            let cy = py as f64 + 0.5;
            if distance_to_segment(cx, cy, from.0, from.1, to.0, to.1) <= radius {
                mask.put_pixel(px, py, FOREGROUND);
            }
        }
    }
}

/// Even-odd scanline fill over pixel-center sample points.
fn fill_polygon(mask: &mut GrayImage, points: &[(f64, f64)]) {
    let (image_width, image_height) = mask.dimensions();
    let min_y = points
        .iter()
        .map(|point| point.1)
        .fold(f64::INFINITY, f64::min);
    let max_y = points
        .iter()
        .map(|point| point.1)
        .fold(f64::NEG_INFINITY, f64::max);
    let y0 = min_y.floor().max(0.0) as u32;
    let y1 = (max_y.ceil().min(image_height as f64)).max(0.0) as u32;

    let mut crossings: Vec<f64> = Vec::new();
    for py in y0..y1 {
        let sy = py as f64 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let (ax, ay) = points[i];
            let (bx, by) = points[(i + 1) % points.len()];
            if (ay > sy) != (by > sy) {
                crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for pair in crossings.chunks_exact(2) {
            if let Some((x0, x1)) = pixel_span(pair[0], pair[1], image_width) {
                for px in x0..x1 {
                    mask.put_pixel(px, py, FOREGROUND);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn identity(width: u32, height: u32) -> ScaleTransform {
        ScaleTransform::compute(width, height, width as f64, height as f64).unwrap()
    }

    #[test]
    fn empty_shape_list_yields_all_black() {
        let mask = rasterize(&[], &identity(32, 16));
        assert_eq!(mask.dimensions(), (32, 16));
        assert!(mask.pixels().all(|pixel| pixel.0[0] == 0));
    }

    #[test]
    fn box_scales_each_extent_independently() {
        let scale = ScaleTransform::compute(200, 300, 100.0, 100.0).unwrap();
        let shapes = [Shape::Box {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        }];
        let mask = rasterize(&shapes, &scale);
        // (10,10,20,20) * (2,3) => native rect (20,30,40,60).
        assert_eq!(mask.get_pixel(20, 30).0[0], 255);
        assert_eq!(mask.get_pixel(59, 89).0[0], 255);
        assert_eq!(mask.get_pixel(19, 30).0[0], 0);
        assert_eq!(mask.get_pixel(20, 29).0[0], 0);
        assert_eq!(mask.get_pixel(60, 89).0[0], 0);
        assert_eq!(mask.get_pixel(59, 90).0[0], 0);
    }

    #[test]
    fn open_polygon_contributes_nothing() {
        let shapes = [Shape::Polygon {
            points: vec![p(5.0, 5.0), p(50.0, 5.0), p(50.0, 50.0)],
            closed: false,
        }];
        let mask = rasterize(&shapes, &identity(64, 64));
        assert!(mask.pixels().all(|pixel| pixel.0[0] == 0));
    }

    #[test]
    fn closed_polygon_is_filled() {
        let shapes = [Shape::Polygon {
            points: vec![p(10.0, 10.0), p(30.0, 10.0), p(30.0, 30.0), p(10.0, 30.0)],
            closed: true,
        }];
        let mask = rasterize(&shapes, &identity(64, 64));
        assert_eq!(mask.get_pixel(20, 20).0[0], 255);
        assert_eq!(mask.get_pixel(10, 10).0[0], 255);
        assert_eq!(mask.get_pixel(5, 5).0[0], 0);
        assert_eq!(mask.get_pixel(35, 20).0[0], 0);
    }

    #[test]
    fn brush_stroke_covers_segment_with_round_caps() {
        let shapes = [Shape::Brush {
            points: vec![p(10.0, 10.0), p(20.0, 10.0)],
            width: 4.0,
        }];
        let mask = rasterize(&shapes, &identity(40, 40));
        // On the segment.
        assert_eq!(mask.get_pixel(15, 10).0[0], 255);
        // Inside the start cap, behind the first point.
        assert_eq!(mask.get_pixel(8, 10).0[0], 255);
        // Beyond the stroke radius.
        assert_eq!(mask.get_pixel(15, 14).0[0], 0);
        assert_eq!(mask.get_pixel(4, 10).0[0], 0);
    }

    #[test]
    fn brush_width_never_drops_below_one_native_pixel() {
        let scale = ScaleTransform::compute(20, 20, 200.0, 200.0).unwrap();
        let shapes = [Shape::Brush {
            points: vec![p(0.0, 100.0), p(200.0, 100.0)],
            width: 1.0,
        }];
        let mask = rasterize(&shapes, &scale);
        assert!(mask.pixels().any(|pixel| pixel.0[0] == 255));
    }

    #[test]
    fn rasterization_is_deterministic() {
        let scale = ScaleTransform::compute(120, 90, 60.0, 45.0).unwrap();
        let shapes = [
            Shape::Brush {
                points: vec![p(5.0, 5.0), p(30.0, 20.0), p(10.0, 40.0)],
                width: 6.0,
            },
            Shape::Box {
                x: 12.0,
                y: 8.0,
                width: 15.0,
                height: 9.0,
            },
            Shape::Polygon {
                points: vec![p(40.0, 10.0), p(55.0, 30.0), p(35.0, 40.0)],
                closed: true,
            },
        ];
        let first = encode_png(&rasterize(&shapes, &scale)).unwrap();
        let second = encode_png(&rasterize(&shapes, &scale)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn png_round_trips_at_native_resolution() {
        let shapes = [Shape::Box {
            x: 2.0,
            y: 2.0,
            width: 10.0,
            height: 10.0,
        }];
        let mask = rasterize(&shapes, &identity(24, 18));
        let png = encode_png(&mask).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (24, 18));
        assert_eq!(decoded.get_pixel(6, 6).0[0], 255);
        assert_eq!(decoded.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn data_url_carries_png_payload() {
        let mask = rasterize(&[], &identity(4, 4));
        let url = data_url(&mask).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
