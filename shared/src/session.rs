use crate::{normalize_point, Point, Shape};

/// Boxes with either extent at or below this (display px) are discarded.
pub const MIN_BOX_EXTENT: f32 = 3.0;
/// Clicking within this distance (display px) of a polygon's first vertex
/// closes it. Constant in display pixels regardless of device pixel ratio.
pub const POLYGON_CLOSE_RADIUS: f32 = 10.0;
pub const DEFAULT_BRUSH_WIDTH: f32 = 10.0;
pub const MAX_BLUR_AMOUNT: u32 = 50;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tool {
    Brush,
    Box,
    Polygon,
}

pub enum BrushMode {
    Idle,
    Dragging { points: Vec<Point> },
}

pub enum BoxMode {
    Idle,
    Dragging { anchor: Point, cursor: Point },
}

pub struct PolygonState {
    pub points: Vec<Point>,
}

pub enum Mode {
    Brush(BrushMode),
    Box(BoxMode),
    Polygon(PolygonState),
}

impl Mode {
    pub fn tool(&self) -> Tool {
        match self {
            Mode::Brush(_) => Tool::Brush,
            Mode::Box(_) => Tool::Box,
            Mode::Polygon(_) => Tool::Polygon,
        }
    }

    fn idle(tool: Tool) -> Self {
        match tool {
            Tool::Brush => Mode::Brush(BrushMode::Idle),
            Tool::Box => Mode::Box(BoxMode::Idle),
            Tool::Polygon => Mode::Polygon(PolygonState { points: Vec::new() }),
        }
    }
}

pub fn sanitize_width(width: f32) -> f32 {
    let width = if width.is_finite() {
        width
    } else {
        DEFAULT_BRUSH_WIDTH
    };
    width.max(1.0).min(60.0)
}

/// One drawing session: the committed shapes plus at most one in-progress
/// shape, driven entirely by normalized pointer events.
pub struct Session {
    shapes: Vec<Shape>,
    mode: Mode,
    brush_width: f32,
    blur_amount: u32,
    hover: Option<Point>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            mode: Mode::idle(Tool::Brush),
            brush_width: DEFAULT_BRUSH_WIDTH,
            blur_amount: 0,
            hover: None,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn tool(&self) -> Tool {
        self.mode.tool()
    }

    pub fn hover(&self) -> Option<Point> {
        self.hover
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    pub fn blur_amount(&self) -> u32 {
        self.blur_amount
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.brush_width = sanitize_width(width);
    }

    pub fn set_blur_amount(&mut self, amount: u32) {
        self.blur_amount = amount.min(MAX_BLUR_AMOUNT);
    }

    pub fn polygon_points(&self) -> &[Point] {
        match &self.mode {
            Mode::Polygon(polygon) => &polygon.points,
            _ => &[],
        }
    }

    pub fn has_drawings(&self) -> bool {
        !self.shapes.is_empty() || !self.polygon_points().is_empty()
    }

    pub fn can_finish_polygon(&self) -> bool {
        self.polygon_points().len() >= 3
    }

    /// Switching tools cancels any in-progress shape unconditionally;
    /// polygon vertices placed so far are lost.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.mode.tool() == tool {
            return;
        }
        self.mode = Mode::idle(tool);
    }

    pub fn pointer_down(&mut self, point: Point) {
        let Some(point) = normalize_point(point) else {
            return;
        };
        self.hover = Some(point);
        match &mut self.mode {
            Mode::Brush(brush) => {
                *brush = BrushMode::Dragging {
                    points: vec![point],
                };
            }
            Mode::Box(boxed) => {
                *boxed = BoxMode::Dragging {
                    anchor: point,
                    cursor: point,
                };
            }
            Mode::Polygon(polygon) => {
                if polygon.points.len() >= 3
                    && point.distance_to(polygon.points[0]) < POLYGON_CLOSE_RADIUS
                {
                    // Closing click reuses vertex 0 and is not recorded itself.
                    let points = std::mem::take(&mut polygon.points);
                    self.shapes.push(Shape::Polygon {
                        points,
                        closed: true,
                    });
                } else {
                    polygon.points.push(point);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        let Some(point) = normalize_point(point) else {
            return;
        };
        self.hover = Some(point);
        match &mut self.mode {
            Mode::Brush(BrushMode::Dragging { points }) => {
                points.push(point);
            }
            Mode::Box(BoxMode::Dragging { cursor, .. }) => {
                *cursor = point;
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, point: Point) {
        if let Some(point) = normalize_point(point) {
            if let Mode::Box(BoxMode::Dragging { cursor, .. }) = &mut self.mode {
                *cursor = point;
            }
        }
        self.finish_drag();
    }

    /// Leaving the surface mid-drag finalizes the shape at the last known
    /// position, exactly as a release would.
    pub fn pointer_leave(&mut self) {
        self.hover = None;
        self.finish_drag();
    }

    fn finish_drag(&mut self) {
        match &mut self.mode {
            Mode::Brush(brush) => {
                if let BrushMode::Dragging { points } = std::mem::replace(brush, BrushMode::Idle) {
                    if points.len() >= 2 {
                        self.shapes.push(Shape::Brush {
                            points,
                            width: self.brush_width,
                        });
                    }
                }
            }
            Mode::Box(boxed) => {
                if let BoxMode::Dragging { anchor, cursor } =
                    std::mem::replace(boxed, BoxMode::Idle)
                {
                    let x = anchor.x.min(cursor.x);
                    let y = anchor.y.min(cursor.y);
                    let width = (cursor.x - anchor.x).abs();
                    let height = (cursor.y - anchor.y).abs();
                    if width > MIN_BOX_EXTENT && height > MIN_BOX_EXTENT {
                        self.shapes.push(Shape::Box {
                            x,
                            y,
                            width,
                            height,
                        });
                    }
                }
            }
            Mode::Polygon(_) => {}
        }
    }

    /// Explicit "finish polygon": valid only with at least 3 vertices.
    pub fn finish_polygon(&mut self) -> bool {
        let Mode::Polygon(polygon) = &mut self.mode else {
            return false;
        };
        if polygon.points.len() < 3 {
            return false;
        }
        let points = std::mem::take(&mut polygon.points);
        self.shapes.push(Shape::Polygon {
            points,
            closed: true,
        });
        true
    }

    /// Removes the most recent polygon-in-progress vertex if one exists,
    /// otherwise the most recently committed shape.
    pub fn undo(&mut self) -> bool {
        if let Mode::Polygon(polygon) = &mut self.mode {
            if polygon.points.pop().is_some() {
                return true;
            }
        }
        self.shapes.pop().is_some()
    }

    /// Empties the committed list and any in-progress shape; the active tool
    /// is kept.
    pub fn clear_drawings(&mut self) {
        self.shapes.clear();
        self.mode = Mode::idle(self.mode.tool());
        self.hover = None;
    }

    /// Full reset on file change or load failure.
    pub fn reset(&mut self) {
        self.clear_drawings();
        self.blur_amount = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn brush_drag_commits_one_shape_with_all_points() {
        let mut session = Session::new();
        session.pointer_down(p(1.0, 1.0));
        session.pointer_move(p(2.0, 2.0));
        session.pointer_move(p(3.0, 3.0));
        session.pointer_up(p(3.0, 3.0));
        assert_eq!(session.shapes().len(), 1);
        match &session.shapes()[0] {
            Shape::Brush { points, width } => {
                assert_eq!(points.len(), 3);
                assert_eq!(*width, DEFAULT_BRUSH_WIDTH);
            }
            other => panic!("expected brush, got {other:?}"),
        }
    }

    #[test]
    fn single_point_brush_is_discarded() {
        let mut session = Session::new();
        session.pointer_down(p(1.0, 1.0));
        session.pointer_up(p(1.0, 1.0));
        assert!(session.shapes().is_empty());
    }

    #[test]
    fn box_below_minimum_extent_is_rejected() {
        let mut session = Session::new();
        session.set_tool(Tool::Box);
        session.pointer_down(p(10.0, 10.0));
        session.pointer_move(p(13.0, 40.0));
        session.pointer_up(p(13.0, 40.0));
        assert!(session.shapes().is_empty());
    }

    #[test]
    fn box_is_normalized_from_any_drag_direction() {
        let mut session = Session::new();
        session.set_tool(Tool::Box);
        session.pointer_down(p(30.0, 40.0));
        session.pointer_up(p(10.0, 15.0));
        assert_eq!(
            session.shapes(),
            &[Shape::Box {
                x: 10.0,
                y: 15.0,
                width: 20.0,
                height: 25.0,
            }]
        );
    }

    #[test]
    fn leaving_mid_drag_finalizes_like_release() {
        let mut session = Session::new();
        session.set_tool(Tool::Box);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_move(p(20.0, 20.0));
        session.pointer_leave();
        assert_eq!(session.shapes().len(), 1);
        assert_eq!(session.hover(), None);
    }

    #[test]
    fn polygon_closes_on_click_near_first_vertex() {
        let mut session = Session::new();
        session.set_tool(Tool::Polygon);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_down(p(50.0, 0.0));
        session.pointer_down(p(50.0, 50.0));
        session.pointer_down(p(3.0, 4.0));
        assert_eq!(
            session.shapes(),
            &[Shape::Polygon {
                points: vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 50.0)],
                closed: true,
            }]
        );
        assert!(session.polygon_points().is_empty());
    }

    #[test]
    fn polygon_does_not_close_with_fewer_than_three_vertices() {
        let mut session = Session::new();
        session.set_tool(Tool::Polygon);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_down(p(2.0, 2.0));
        assert!(session.shapes().is_empty());
        assert_eq!(session.polygon_points().len(), 2);
    }

    #[test]
    fn finish_polygon_requires_three_points() {
        let mut session = Session::new();
        session.set_tool(Tool::Polygon);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_down(p(40.0, 0.0));
        assert!(!session.finish_polygon());
        session.pointer_down(p(40.0, 40.0));
        assert!(session.finish_polygon());
        assert_eq!(session.shapes().len(), 1);
    }

    #[test]
    fn switching_tools_discards_polygon_in_progress() {
        let mut session = Session::new();
        session.set_tool(Tool::Polygon);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_down(p(40.0, 0.0));
        session.set_tool(Tool::Brush);
        session.set_tool(Tool::Polygon);
        assert!(session.polygon_points().is_empty());
        assert!(session.shapes().is_empty());
    }

    #[test]
    fn undo_pops_polygon_vertex_before_committed_shape() {
        let mut session = Session::new();
        session.pointer_down(p(0.0, 0.0));
        session.pointer_move(p(5.0, 5.0));
        session.pointer_up(p(5.0, 5.0));
        session.set_tool(Tool::Polygon);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_down(p(40.0, 0.0));

        assert!(session.undo());
        assert_eq!(session.polygon_points().len(), 1);
        assert_eq!(session.shapes().len(), 1);

        assert!(session.undo());
        assert!(session.polygon_points().is_empty());
        assert_eq!(session.shapes().len(), 1);

        assert!(session.undo());
        assert!(session.shapes().is_empty());
        assert!(!session.undo());
    }

    #[test]
    fn clear_drawings_empties_everything_but_keeps_tool() {
        let mut session = Session::new();
        session.set_tool(Tool::Polygon);
        session.pointer_down(p(0.0, 0.0));
        session.pointer_down(p(40.0, 0.0));
        session.pointer_down(p(40.0, 40.0));
        assert!(session.finish_polygon());
        session.pointer_down(p(1.0, 1.0));
        session.clear_drawings();
        assert!(session.shapes().is_empty());
        assert!(session.polygon_points().is_empty());
        assert_eq!(session.tool(), Tool::Polygon);
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let mut session = Session::new();
        session.pointer_down(p(f32::NAN, 0.0));
        session.pointer_move(p(1.0, 1.0));
        session.pointer_up(p(1.0, 1.0));
        assert!(session.shapes().is_empty());
    }

    #[test]
    fn blur_amount_is_clamped() {
        let mut session = Session::new();
        session.set_blur_amount(120);
        assert_eq!(session.blur_amount(), MAX_BLUR_AMOUNT);
    }
}
