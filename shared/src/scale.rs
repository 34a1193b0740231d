use crate::Point;

/// Mapping from display space (CSS pixels of the preview) to native space
/// (pixels of the original media). Recomputed whenever the preview is resized
/// or the media reports new native dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleTransform {
    pub native_width: u32,
    pub native_height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ScaleTransform {
    /// Returns `None` while either size is unavailable (media still loading,
    /// preview not laid out yet). Callers retry on the next readiness or
    /// resize signal.
    pub fn compute(
        native_width: u32,
        native_height: u32,
        display_width: f64,
        display_height: f64,
    ) -> Option<Self> {
        if native_width == 0 || native_height == 0 {
            return None;
        }
        if !(display_width > 0.0) || !(display_height > 0.0) {
            return None;
        }
        Some(Self {
            native_width,
            native_height,
            scale_x: native_width as f64 / display_width,
            scale_y: native_height as f64 / display_height,
        })
    }

    /// Each vertex is mapped to native space independently.
    pub fn to_native(&self, point: Point) -> (f64, f64) {
        (
            point.x as f64 * self.scale_x,
            point.y as f64 * self.scale_y,
        )
    }

    /// Stroke widths scale by the average of the two factors, never below one
    /// native pixel.
    pub fn stroke_width(&self, width: f32) -> f64 {
        (width as f64 * (self.scale_x + self.scale_y) / 2.0)
            .round()
            .max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_independent_axis_factors() {
        let scale = ScaleTransform::compute(1920, 1080, 640.0, 360.0).unwrap();
        assert_eq!(scale.scale_x, 3.0);
        assert_eq!(scale.scale_y, 3.0);
        let (x, y) = scale.to_native(Point::new(10.0, 20.0));
        assert_eq!((x, y), (30.0, 60.0));
    }

    #[test]
    fn unavailable_dimensions_yield_none() {
        assert!(ScaleTransform::compute(0, 1080, 640.0, 360.0).is_none());
        assert!(ScaleTransform::compute(1920, 1080, 0.0, 360.0).is_none());
        assert!(ScaleTransform::compute(1920, 1080, 640.0, f64::NAN).is_none());
    }

    #[test]
    fn stroke_width_uses_average_scale_with_floor() {
        let scale = ScaleTransform::compute(200, 400, 100.0, 100.0).unwrap();
        // (2 + 4) / 2 = 3
        assert_eq!(scale.stroke_width(10.0), 30.0);
        let down = ScaleTransform::compute(10, 10, 1000.0, 1000.0).unwrap();
        assert_eq!(down.stroke_width(5.0), 1.0);
    }
}
