use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, DragEvent, Event, HtmlCanvasElement, HtmlImageElement,
    HtmlVideoElement, PointerEvent,
};

use maskpad_shared::session::DEFAULT_BRUSH_WIDTH;
use maskpad_shared::Tool;

use crate::dom::{event_to_point, get_element, size_canvas_to_preview};
use crate::media::{clear_media, handle_file};
use crate::net::submit;
use crate::render::redraw;
use crate::state::State;
use crate::theme::Theme;
use crate::ui::Ui;

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document.ready_state() == "complete" {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "draw-canvas")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    let image_preview: HtmlImageElement = get_element(&document, "image-preview")?;
    let video_preview: HtmlVideoElement = get_element(&document, "video-preview")?;
    let ui = Ui::from_document(&document)?;

    let theme = Theme::load(&window);
    theme.apply(&document);

    let state = Rc::new(RefCell::new(State::new(
        canvas.clone(),
        ctx,
        image_preview.clone(),
        video_preview.clone(),
        theme,
    )));

    ui.show_drop_zone();
    ui.reset_results();
    ui.set_loading(false, false);
    ui.sync_tool(Tool::Brush, &canvas);
    ui.brush_size
        .set_value(&format!("{}", DEFAULT_BRUSH_WIDTH as u32));
    ui.set_brush_label(DEFAULT_BRUSH_WIDTH);
    ui.blur_slider.set_value("0");
    ui.set_blur_label(0);
    ui.update_buttons(&state.borrow());

    // The preview reports its natural size only once loaded; the canvas and
    // the display-to-native scale follow from there.
    {
        let load_state = state.clone();
        let ui_cb = ui.clone();
        let window_cb = window.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            {
                let mut state = load_state.borrow_mut();
                size_canvas_to_preview(&window_cb, &mut state);
            }
            ui_cb.update_buttons(&load_state.borrow());
        });
        image_preview.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
        onload.forget();
    }

    {
        let load_state = state.clone();
        let ui_cb = ui.clone();
        let window_cb = window.clone();
        let onmeta = Closure::<dyn FnMut()>::new(move || {
            {
                let mut state = load_state.borrow_mut();
                size_canvas_to_preview(&window_cb, &mut state);
            }
            ui_cb.update_buttons(&load_state.borrow());
        });
        video_preview
            .add_event_listener_with_callback("loadedmetadata", onmeta.as_ref().unchecked_ref())?;
        onmeta.forget();
    }

    {
        let resize_state = state.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            size_canvas_to_preview(&window_cb, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    // A file the browser cannot decode resets everything, not just the preview.
    for (target, what) in [
        (image_preview.unchecked_ref::<web_sys::HtmlElement>(), "image"),
        (video_preview.unchecked_ref::<web_sys::HtmlElement>(), "video"),
    ] {
        let error_state = state.clone();
        let ui_cb = ui.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            if error_state.borrow().media.is_none() {
                return;
            }
            web_sys::console::error_1(&format!("Failed to decode the selected {what}").into());
            clear_media(&error_state, &ui_cb);
            ui_cb.show_error("The selected file could not be loaded.");
        });
        target.add_event_listener_with_callback("error", onerror.as_ref().unchecked_ref())?;
        onerror.forget();
    }

    // Pointer events cover mouse, touch and pen alike.
    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ui_cb = ui.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let _ = down_canvas.set_pointer_capture(event.pointer_id());
            let Some(point) = event_to_point(&down_canvas, &event) else {
                return;
            };
            {
                let mut state = down_state.borrow_mut();
                if state.media.is_none() {
                    return;
                }
                state.session.pointer_down(point);
                redraw(&state);
            }
            ui_cb.update_buttons(&down_state.borrow());
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some(point) = event_to_point(&move_canvas, &event) else {
                return;
            };
            let mut state = move_state.borrow_mut();
            if state.media.is_none() {
                return;
            }
            state.session.pointer_move(point);
            redraw(&state);
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let up_state = state.clone();
        let up_canvas = canvas.clone();
        let ui_cb = ui.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some(point) = event_to_point(&up_canvas, &event) else {
                return;
            };
            {
                let mut state = up_state.borrow_mut();
                if state.media.is_none() {
                    return;
                }
                state.session.pointer_up(point);
                redraw(&state);
            }
            ui_cb.update_buttons(&up_state.borrow());
        });
        canvas.add_event_listener_with_callback("pointerup", onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    {
        let leave_state = state.clone();
        let ui_cb = ui.clone();
        let onleave = Closure::<dyn FnMut(PointerEvent)>::new(move |_event: PointerEvent| {
            {
                let mut state = leave_state.borrow_mut();
                if state.media.is_none() {
                    return;
                }
                state.session.pointer_leave();
                redraw(&state);
            }
            ui_cb.update_buttons(&leave_state.borrow());
        });
        canvas
            .add_event_listener_with_callback("pointerleave", onleave.as_ref().unchecked_ref())?;
        onleave.forget();
    }

    for (button, tool) in [
        (ui.tool_brush_btn.clone(), Tool::Brush),
        (ui.tool_box_btn.clone(), Tool::Box),
        (ui.tool_polygon_btn.clone(), Tool::Polygon),
    ] {
        let tool_state = state.clone();
        let tool_canvas = canvas.clone();
        let ui_cb = ui.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let mut state = tool_state.borrow_mut();
                state.session.set_tool(tool);
                redraw(&state);
            }
            ui_cb.sync_tool(tool, &tool_canvas);
            ui_cb.update_buttons(&tool_state.borrow());
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let size_state = state.clone();
        let ui_cb = ui.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let value = ui_cb.brush_size.value().parse::<f32>().unwrap_or(0.0);
            let width = {
                let mut state = size_state.borrow_mut();
                state.session.set_brush_width(value);
                state.session.brush_width()
            };
            ui_cb.set_brush_label(width);
        });
        ui.brush_size
            .add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let blur_state = state.clone();
        let ui_cb = ui.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let value = ui_cb.blur_slider.value().parse::<u32>().unwrap_or(0);
            let amount = {
                let mut state = blur_state.borrow_mut();
                state.session.set_blur_amount(value);
                state.session.blur_amount()
            };
            ui_cb.set_blur_label(amount);
        });
        ui.blur_slider
            .add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let finish_state = state.clone();
        let ui_cb = ui.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let mut state = finish_state.borrow_mut();
                if !state.session.finish_polygon() {
                    return;
                }
                redraw(&state);
            }
            ui_cb.update_buttons(&finish_state.borrow());
        });
        ui.finish_polygon_btn
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let undo_state = state.clone();
        let ui_cb = ui.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let mut state = undo_state.borrow_mut();
                if !state.session.undo() {
                    return;
                }
                redraw(&state);
            }
            ui_cb.update_buttons(&undo_state.borrow());
        });
        ui.undo_btn
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let clear_state = state.clone();
        let ui_cb = ui.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let mut state = clear_state.borrow_mut();
                state.session.clear_drawings();
                redraw(&state);
            }
            ui_cb.update_buttons(&clear_state.borrow());
        });
        ui.clear_drawing_btn
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let clear_state = state.clone();
        let ui_cb = ui.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            clear_media(&clear_state, &ui_cb);
        });
        ui.clear_preview_btn
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let submit_state = state.clone();
        let ui_cb = ui.clone();
        let window_cb = window.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            submit(&window_cb, &submit_state, &ui_cb);
        });
        ui.process_btn
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let theme_state = state.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = theme_state.borrow_mut();
            state.theme = state.theme.toggled();
            state.theme.store(&window_cb);
            state.theme.apply(&document_cb);
            redraw(&state);
        });
        ui.theme_toggle
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let file_state = state.clone();
        let ui_cb = ui.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Some(file) = ui_cb.image_upload.files().and_then(|list| list.get(0)) else {
                return;
            };
            if let Err(err) = handle_file(&file_state, &ui_cb, file) {
                web_sys::console::error_1(&err);
            }
        });
        ui.image_upload
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let ui_cb = ui.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            ui_cb.image_upload.click();
        });
        ui.drop_zone
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    for event_name in ["dragenter", "dragover"] {
        let drop_zone = ui.drop_zone.clone();
        let ondrag = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
            event.prevent_default();
            let _ = drop_zone.class_list().add_1("dragover");
        });
        ui.drop_zone
            .add_event_listener_with_callback(event_name, ondrag.as_ref().unchecked_ref())?;
        ondrag.forget();
    }

    {
        let drop_zone = ui.drop_zone.clone();
        let onleave = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
            event.prevent_default();
            let _ = drop_zone.class_list().remove_1("dragover");
        });
        ui.drop_zone
            .add_event_listener_with_callback("dragleave", onleave.as_ref().unchecked_ref())?;
        onleave.forget();
    }

    {
        let drop_state = state.clone();
        let ui_cb = ui.clone();
        let ondrop = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
            event.prevent_default();
            let _ = ui_cb.drop_zone.class_list().remove_1("dragover");
            let file = event
                .data_transfer()
                .and_then(|transfer| transfer.files())
                .and_then(|list| list.get(0));
            let Some(file) = file else {
                return;
            };
            if let Err(err) = handle_file(&drop_state, &ui_cb, file) {
                web_sys::console::error_1(&err);
            }
        });
        ui.drop_zone
            .add_event_listener_with_callback("drop", ondrop.as_ref().unchecked_ref())?;
        ondrop.forget();
    }

    Ok(())
}
