use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{File, FileReader, Url};

use maskpad_shared::{validate_upload, MediaKind};

use crate::dom::set_display;
use crate::render::redraw;
use crate::state::{Media, State};
use crate::ui::Ui;

/// Validates and installs a newly chosen file. Any previously loaded media,
/// drawings and results are discarded first, even when the new file is
/// rejected.
pub fn handle_file(state: &Rc<RefCell<State>>, ui: &Ui, file: File) -> Result<(), JsValue> {
    let kind = match validate_upload(&file.type_(), file.size() as u64) {
        Ok(kind) => kind,
        Err(error) => {
            clear_media(state, ui);
            ui.show_error(&error.to_string());
            return Ok(());
        }
    };

    web_sys::console::log_1(
        &format!(
            "Loading {} file {:?} ({} bytes)",
            match kind {
                MediaKind::Image => "image",
                MediaKind::Video => "video",
            },
            file.name(),
            file.size() as u64
        )
        .into(),
    );

    {
        let mut state = state.borrow_mut();
        state.revoke_object_url();
        state.media_callbacks.clear();
        state.media = None;
        state.scale = None;
        state.session.reset();
    }
    ui.reset_results();
    ui.blur_slider.set_value("0");
    ui.set_blur_label(0);

    let object_url = {
        let mut state_ref = state.borrow_mut();
        match kind {
            MediaKind::Image => {
                set_display(&state_ref.video_preview, "none");
                set_display(&state_ref.image_preview, "block");
                // The preview gets a data URL so it survives later revocation
                // of any object URLs.
                let reader = FileReader::new()?;
                let onload = {
                    let reader = reader.clone();
                    let image_preview = state_ref.image_preview.clone();
                    Closure::<dyn FnMut()>::new(move || {
                        if let Some(url) = reader.result().ok().and_then(|value| value.as_string())
                        {
                            image_preview.set_src(&url);
                        }
                    })
                };
                reader.set_onload(Some(onload.as_ref().unchecked_ref()));
                state_ref.media_callbacks.push(onload);
                reader.read_as_data_url(&file)?;
                None
            }
            MediaKind::Video => {
                set_display(&state_ref.image_preview, "none");
                set_display(&state_ref.video_preview, "block");
                let url = Url::create_object_url_with_blob(&file)?;
                state_ref.video_preview.set_src(&url);
                Some(url)
            }
        }
    };

    {
        let mut state = state.borrow_mut();
        state.media = Some(Media {
            file,
            kind,
            object_url,
        });
    }
    ui.show_preview();
    ui.update_buttons(&state.borrow());
    Ok(())
}

/// Back to the empty drop-zone state.
pub fn clear_media(state: &Rc<RefCell<State>>, ui: &Ui) {
    {
        let mut state = state.borrow_mut();
        state.revoke_object_url();
        state.media_callbacks.clear();
        state.media = None;
        state.scale = None;
        state.session.reset();
        state.image_preview.set_src("");
        let _ = state.video_preview.remove_attribute("src");
        set_display(&state.image_preview, "none");
        set_display(&state.video_preview, "none");
        redraw(&state);
    }
    ui.image_upload.set_value("");
    ui.blur_slider.set_value("0");
    ui.set_blur_label(0);
    ui.reset_results();
    ui.show_drop_zone();
    ui.update_buttons(&state.borrow());
}
