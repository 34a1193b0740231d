use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{FormData, RequestInit, Response, Window};

use maskpad_shared::{check_submittable, mask, rasterize, ProcessOutcome, ProcessResponse};

use crate::state::State;
use crate::ui::Ui;

const PROCESS_URL: &str = "/api/process";

fn finish(state: &Rc<RefCell<State>>, ui: &Ui) {
    {
        let mut state = state.borrow_mut();
        state.submitting = false;
    }
    ui.set_loading(false, false);
    ui.update_buttons(&state.borrow());
}

fn finish_with_error(state: &Rc<RefCell<State>>, ui: &Ui, message: &str) {
    finish(state, ui);
    ui.show_error(message);
}

fn handle_body(state: &Rc<RefCell<State>>, ui: &Ui, http_ok: bool, status: u16, text: &str) {
    match serde_json::from_str::<ProcessResponse>(text) {
        Ok(response) => {
            // A non-2xx reply fails regardless of what the body claims.
            if let ProcessOutcome::Failed(message) = response.outcome_for(http_ok) {
                let message = if message.is_empty() {
                    format!("Server error (HTTP {status}).")
                } else {
                    message.to_string()
                };
                finish_with_error(state, ui, &message);
                return;
            }
            finish(state, ui);
            ui.show_response(&response);
        }
        Err(error) => {
            web_sys::console::error_1(&format!("Response parse error: {error}").into());
            finish_with_error(state, ui, "Could not parse the server response.");
        }
    }
}

fn handle_response(state: Rc<RefCell<State>>, ui: Ui, value: JsValue) {
    let response: Response = match value.dyn_into() {
        Ok(response) => response,
        Err(_) => {
            finish_with_error(&state, &ui, "Unexpected fetch result.");
            return;
        }
    };
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .ok()
        .flatten()
        .unwrap_or_default();
    // Error bodies are JSON too; anything else is a proxy or crash page.
    if !content_type.contains("application/json") {
        web_sys::console::error_1(
            &format!("Non-JSON response: status={status} content_type={content_type:?}").into(),
        );
        finish_with_error(&state, &ui, &format!("Server error (HTTP {status})."));
        return;
    }
    let text_promise = match response.text() {
        Ok(promise) => promise,
        Err(_) => {
            finish_with_error(&state, &ui, "Could not read the server response.");
            return;
        }
    };

    let http_ok = response.ok();
    let on_text = {
        let state = state.clone();
        let ui = ui.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let Some(text) = value.as_string() else {
                finish_with_error(&state, &ui, "Could not read the server response.");
                return;
            };
            handle_body(&state, &ui, http_ok, status, &text);
        })
    };
    let on_text_err = Closure::<dyn FnMut(JsValue)>::new(move |_err: JsValue| {
        finish_with_error(&state, &ui, "Could not read the server response.");
    });
    let _ = text_promise.then2(&on_text, &on_text_err);
    on_text.forget();
    on_text_err.forget();
}

/// Rasterizes the current annotations and posts them with the original file.
/// Rejections from the local checks surface immediately without touching the
/// session or the network.
pub fn submit(window: &Window, state: &Rc<RefCell<State>>, ui: &Ui) {
    let (file, mask_url, blur_amount, is_video) = {
        let state_ref = state.borrow();
        if state_ref.submitting {
            return;
        }
        if let Err(rejection) = check_submittable(
            state_ref.media.is_some(),
            state_ref.session.shapes().len(),
            state_ref.scale.as_ref(),
        ) {
            ui.show_error(&rejection.to_string());
            return;
        }
        let (Some(media), Some(scale)) = (&state_ref.media, &state_ref.scale) else {
            return;
        };
        let mask = rasterize(state_ref.session.shapes(), scale);
        let mask_url = match mask::data_url(&mask) {
            Ok(url) => url,
            Err(error) => {
                web_sys::console::error_1(&format!("Mask encode error: {error}").into());
                ui.show_error("Could not encode the mask.");
                return;
            }
        };
        (
            media.file.clone(),
            mask_url,
            state_ref.session.blur_amount(),
            state_ref.is_video(),
        )
    };

    {
        let mut state = state.borrow_mut();
        state.submitting = true;
    }
    ui.reset_results();
    ui.set_loading(true, is_video);
    ui.update_buttons(&state.borrow());

    let Ok(form) = FormData::new() else {
        finish_with_error(state, ui, "Could not build the upload form.");
        return;
    };
    let _ = form.append_with_blob_and_filename("image_file", &file, &file.name());
    let _ = form.append_with_str("mask_data", &mask_url);
    let _ = form.append_with_str("blur_amount", &blur_amount.to_string());

    let init = RequestInit::new();
    init.set_method("POST");
    let body: JsValue = form.into();
    init.set_body(&body);

    web_sys::console::log_1(&format!("POST {PROCESS_URL} file={:?}", file.name()).into());
    let promise = window.fetch_with_str_and_init(PROCESS_URL, &init);

    let on_ok = {
        let state = state.clone();
        let ui = ui.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            handle_response(state.clone(), ui.clone(), value);
        })
    };
    let on_err = {
        let state = state.clone();
        let ui = ui.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
            web_sys::console::error_2(&"Fetch failed:".into(), &err);
            finish_with_error(&state, &ui, "Network error contacting the server.");
        })
    };
    let _ = promise.then2(&on_ok, &on_err);
    on_ok.forget();
    on_err.forget();
}
