use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, PointerEvent, Window};

use maskpad_shared::{normalize_point, MediaKind, Point, ScaleTransform};

use crate::render::redraw;
use crate::state::State;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_tool_button(button: &HtmlButtonElement, active: bool) {
    let pressed = if active { "true" } else { "false" };
    let _ = button.set_attribute("aria-pressed", pressed);
}

pub fn set_display(element: &HtmlElement, value: &str) {
    let _ = element.style().set_property("display", value);
}

/// Event position relative to the canvas, in CSS pixels.
pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let x = event.client_x() as f64 - rect.left();
    let y = event.client_y() as f64 - rect.top();
    normalize_point(Point::new(x as f32, y as f32))
}

/// Sizes the drawing canvas to the displayed preview and recomputes the
/// display-to-native scale. The backing buffer is scaled by the device pixel
/// ratio; stored shape coordinates stay in CSS pixels. Returns false while
/// either the preview layout or the native dimensions are not available yet;
/// callers re-attempt on the media's readiness signal and on resize.
pub fn size_canvas_to_preview(window: &Window, state: &mut State) -> bool {
    let Some(media) = &state.media else {
        return false;
    };
    let preview: &HtmlElement = match media.kind {
        MediaKind::Image => state.image_preview.unchecked_ref(),
        MediaKind::Video => state.video_preview.unchecked_ref(),
    };
    let rect = preview.get_bounding_client_rect();
    let display_width = rect.width();
    let display_height = rect.height();
    let (native_width, native_height) = match media.kind {
        MediaKind::Image => (
            state.image_preview.natural_width(),
            state.image_preview.natural_height(),
        ),
        MediaKind::Video => (
            state.video_preview.video_width(),
            state.video_preview.video_height(),
        ),
    };

    let Some(scale) =
        ScaleTransform::compute(native_width, native_height, display_width, display_height)
    else {
        web_sys::console::warn_1(
            &format!(
                "Cannot size canvas yet: display {display_width}x{display_height}, native {native_width}x{native_height}"
            )
            .into(),
        );
        return false;
    };

    let style = state.canvas.style();
    let _ = style.set_property("width", &format!("{display_width}px"));
    let _ = style.set_property("height", &format!("{display_height}px"));

    let dpr = window.device_pixel_ratio();
    state.canvas.set_width((display_width * dpr) as u32);
    state.canvas.set_height((display_height * dpr) as u32);
    // Resizing the backing buffer resets the context state.
    let _ = state.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    state.ctx.set_line_cap("round");
    state.ctx.set_line_join("round");

    state.display_width = display_width;
    state.display_height = display_height;
    state.scale = Some(scale);

    web_sys::console::log_1(
        &format!(
            "Canvas sized: display {display_width}x{display_height} (dpr {dpr}), native {native_width}x{native_height}, scale ({:.3}, {:.3})",
            scale.scale_x, scale.scale_y
        )
        .into(),
    );

    redraw(state);
    true
}
