use serde::{Deserialize, Serialize};

pub mod api;
pub mod mask;
pub mod scale;
pub mod session;
pub mod upload;

pub use api::{check_submittable, ProcessOutcome, ProcessResponse, ResponseStatus, SubmitRejection};
pub use mask::{rasterize, MaskError};
pub use scale::ScaleTransform;
pub use session::{Mode, Session, Tool};
pub use upload::{validate_upload, MediaKind, UploadError};

/// A position in display space (CSS pixels of the on-screen canvas).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn normalize_point(point: Point) -> Option<Point> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return None;
    }
    Some(point)
}

/// A committed annotation. Coordinates stay in display space; conversion to
/// native media pixels happens only at rasterization time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum Shape {
    #[serde(rename = "brush")]
    Brush { points: Vec<Point>, width: f32 },
    #[serde(rename = "box")]
    Box {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    #[serde(rename = "polygon")]
    Polygon { points: Vec<Point>, closed: bool },
}
