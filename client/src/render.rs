use web_sys::CanvasRenderingContext2d;

use maskpad_shared::session::{BoxMode, BrushMode, PolygonState};
use maskpad_shared::{Mode, Point, Shape};

use crate::state::State;
use crate::theme::ThemeColors;

const VERTEX_MARKER_RADIUS: f64 = 4.0;

fn trace_polyline(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    let Some(first) = points.first() else {
        return;
    };
    ctx.move_to(first.x as f64, first.y as f64);
    for point in &points[1..] {
        ctx.line_to(point.x as f64, point.y as f64);
    }
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape, colors: &ThemeColors) {
    ctx.save();
    ctx.begin_path();
    match shape {
        Shape::Brush { points, width } if points.len() >= 2 => {
            ctx.set_stroke_style_str(colors.brush);
            ctx.set_line_width(*width as f64);
            ctx.set_line_cap("round");
            ctx.set_line_join("round");
            trace_polyline(ctx, points);
            ctx.stroke();
        }
        Shape::Box {
            x,
            y,
            width,
            height,
        } => {
            ctx.set_stroke_style_str(colors.box_stroke);
            ctx.set_fill_style_str(colors.box_fill);
            ctx.set_line_width(2.0);
            ctx.fill_rect(*x as f64, *y as f64, *width as f64, *height as f64);
            ctx.stroke_rect(*x as f64, *y as f64, *width as f64, *height as f64);
        }
        Shape::Polygon { points, closed } if points.len() >= 2 => {
            ctx.set_stroke_style_str(colors.polygon_stroke);
            ctx.set_fill_style_str(colors.polygon_fill);
            ctx.set_line_width(2.0);
            trace_polyline(ctx, points);
            if *closed {
                ctx.close_path();
                ctx.fill();
            }
            ctx.stroke();
        }
        _ => {}
    }
    ctx.restore();
}

fn draw_live_brush(ctx: &CanvasRenderingContext2d, points: &[Point], width: f32, colors: &ThemeColors) {
    if points.is_empty() {
        return;
    }
    ctx.save();
    ctx.set_stroke_style_str(colors.brush);
    ctx.set_line_width(width as f64);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    ctx.begin_path();
    trace_polyline(ctx, points);
    ctx.stroke();
    ctx.restore();
}

fn draw_rubber_band(
    ctx: &CanvasRenderingContext2d,
    anchor: Point,
    cursor: Point,
    colors: &ThemeColors,
) {
    ctx.save();
    ctx.set_stroke_style_str(colors.box_stroke);
    ctx.set_fill_style_str(colors.box_fill_live);
    ctx.set_line_width(1.0);
    let width = (cursor.x - anchor.x) as f64;
    let height = (cursor.y - anchor.y) as f64;
    ctx.stroke_rect(anchor.x as f64, anchor.y as f64, width, height);
    ctx.fill_rect(anchor.x as f64, anchor.y as f64, width, height);
    ctx.restore();
}

fn draw_polygon_in_progress(
    ctx: &CanvasRenderingContext2d,
    polygon: &PolygonState,
    hover: Option<Point>,
    colors: &ThemeColors,
) {
    if polygon.points.is_empty() {
        return;
    }
    ctx.save();

    ctx.set_fill_style_str(colors.vertex_marker);
    for point in &polygon.points {
        ctx.begin_path();
        let _ = ctx.arc(
            point.x as f64,
            point.y as f64,
            VERTEX_MARKER_RADIUS,
            0.0,
            std::f64::consts::PI * 2.0,
        );
        ctx.fill();
    }

    if polygon.points.len() >= 2 {
        ctx.set_stroke_style_str(colors.polygon_stroke);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        trace_polyline(ctx, &polygon.points);
        ctx.stroke();
    }

    // Dashed preview from the last vertex to the cursor. Visual only, never
    // part of the rasterized mask.
    if let (Some(hover), Some(last)) = (hover, polygon.points.last()) {
        ctx.set_stroke_style_str(colors.hover_preview);
        ctx.set_line_width(1.0);
        let _ = ctx.set_line_dash(&js_sys::Array::of2(&4.into(), &4.into()));
        ctx.begin_path();
        ctx.move_to(last.x as f64, last.y as f64);
        ctx.line_to(hover.x as f64, hover.y as f64);
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }

    ctx.restore();
}

/// Full redraw from state. Identical state produces an identical frame; the
/// committed order matters only for z-order.
pub fn redraw(state: &State) {
    let ctx = &state.ctx;
    ctx.clear_rect(0.0, 0.0, state.display_width, state.display_height);
    let colors = state.theme.colors();

    for shape in state.session.shapes() {
        draw_shape(ctx, shape, colors);
    }

    match state.session.mode() {
        Mode::Brush(BrushMode::Dragging { points }) => {
            draw_live_brush(ctx, points, state.session.brush_width(), colors);
        }
        Mode::Box(BoxMode::Dragging { anchor, cursor }) => {
            draw_rubber_band(ctx, *anchor, *cursor, colors);
        }
        Mode::Polygon(polygon) => {
            draw_polygon_in_progress(ctx, polygon, state.session.hover(), colors);
        }
        _ => {}
    }
}
