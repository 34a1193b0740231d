use wasm_bindgen::JsValue;
use web_sys::{
    Document, HtmlAnchorElement, HtmlButtonElement, HtmlCanvasElement, HtmlElement,
    HtmlImageElement, HtmlInputElement, HtmlSpanElement, HtmlVideoElement,
};

use maskpad_shared::{ProcessOutcome, ProcessResponse, ResponseStatus, Tool};

use crate::dom::{get_element, set_display, set_tool_button};
use crate::state::State;

/// Handles to the static page elements. Cloned freely into event closures;
/// every field is a cheap JS reference.
#[derive(Clone)]
pub struct Ui {
    pub drop_zone: HtmlElement,
    pub preview_container: HtmlElement,
    pub preview_instruction: HtmlElement,
    pub image_upload: HtmlInputElement,
    pub clear_preview_btn: HtmlButtonElement,

    pub tool_brush_btn: HtmlButtonElement,
    pub tool_box_btn: HtmlButtonElement,
    pub tool_polygon_btn: HtmlButtonElement,
    pub brush_controls: HtmlElement,
    pub polygon_controls: HtmlElement,
    pub brush_size: HtmlInputElement,
    pub brush_size_value: HtmlSpanElement,
    pub finish_polygon_btn: HtmlButtonElement,
    pub undo_btn: HtmlButtonElement,
    pub clear_drawing_btn: HtmlButtonElement,

    pub blur_slider: HtmlInputElement,
    pub blur_value: HtmlSpanElement,
    pub process_btn: HtmlButtonElement,
    pub loading_indicator: HtmlElement,
    pub loading_video_note: HtmlElement,

    pub results_box: HtmlElement,
    pub error_message: HtmlElement,
    pub success_message: HtmlElement,
    pub result_status: HtmlElement,
    pub result_message: HtmlElement,
    pub result_details_container: HtmlElement,
    pub result_details: HtmlElement,
    pub result_image_container: HtmlElement,
    pub result_image: HtmlImageElement,
    pub result_video_area: HtmlElement,
    pub result_video_player: HtmlVideoElement,
    pub download_btn: HtmlAnchorElement,

    pub theme_toggle: HtmlButtonElement,
}

impl Ui {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            drop_zone: get_element(document, "drop-zone")?,
            preview_container: get_element(document, "preview-container")?,
            preview_instruction: get_element(document, "preview-instruction")?,
            image_upload: get_element(document, "image-upload")?,
            clear_preview_btn: get_element(document, "clear-preview-btn")?,
            tool_brush_btn: get_element(document, "tool-brush")?,
            tool_box_btn: get_element(document, "tool-box")?,
            tool_polygon_btn: get_element(document, "tool-polygon")?,
            brush_controls: get_element(document, "brush-controls")?,
            polygon_controls: get_element(document, "polygon-controls")?,
            brush_size: get_element(document, "brush-size")?,
            brush_size_value: get_element(document, "brush-size-value")?,
            finish_polygon_btn: get_element(document, "finish-polygon-btn")?,
            undo_btn: get_element(document, "undo-last-btn")?,
            clear_drawing_btn: get_element(document, "clear-drawing-btn")?,
            blur_slider: get_element(document, "blur-slider")?,
            blur_value: get_element(document, "blur-value")?,
            process_btn: get_element(document, "process-btn")?,
            loading_indicator: get_element(document, "loading-indicator")?,
            loading_video_note: get_element(document, "loading-video-note")?,
            results_box: get_element(document, "results-box")?,
            error_message: get_element(document, "error-message")?,
            success_message: get_element(document, "success-message")?,
            result_status: get_element(document, "result-status")?,
            result_message: get_element(document, "result-message")?,
            result_details_container: get_element(document, "result-details-container")?,
            result_details: get_element(document, "result-details")?,
            result_image_container: get_element(document, "result-image-container")?,
            result_image: get_element(document, "result-image")?,
            result_video_area: get_element(document, "result-video-area")?,
            result_video_player: get_element(document, "result-video-player")?,
            download_btn: get_element(document, "download-btn")?,
            theme_toggle: get_element(document, "theme-toggle")?,
        })
    }

    pub fn sync_tool(&self, tool: Tool, canvas: &HtmlCanvasElement) {
        set_tool_button(&self.tool_brush_btn, tool == Tool::Brush);
        set_tool_button(&self.tool_box_btn, tool == Tool::Box);
        set_tool_button(&self.tool_polygon_btn, tool == Tool::Polygon);
        let cursor = match tool {
            Tool::Brush | Tool::Box => "crosshair",
            Tool::Polygon => "copy",
        };
        let _ = canvas.style().set_property("cursor", cursor);
        set_display(
            &self.brush_controls,
            if tool == Tool::Brush { "flex" } else { "none" },
        );
        set_display(
            &self.polygon_controls,
            if tool == Tool::Polygon { "flex" } else { "none" },
        );
    }

    pub fn update_buttons(&self, state: &State) {
        self.process_btn.set_disabled(!state.can_process());
        let no_drawings = !state.session.has_drawings();
        self.undo_btn.set_disabled(no_drawings);
        self.clear_drawing_btn.set_disabled(no_drawings);
        self.finish_polygon_btn
            .set_disabled(!state.session.can_finish_polygon());
        self.clear_preview_btn.set_disabled(state.media.is_none());
    }

    pub fn set_brush_label(&self, width: f32) {
        self.brush_size_value
            .set_text_content(Some(&format!("{}", width as u32)));
    }

    /// Shows the median blur kernel the chosen amount maps to, or "None".
    pub fn set_blur_label(&self, amount: u32) {
        let label = if amount == 0 {
            "None".to_string()
        } else {
            let kernel = amount * 2 + 1;
            format!("{kernel}x{kernel}")
        };
        self.blur_value.set_text_content(Some(&label));
    }

    pub fn show_preview(&self) {
        set_display(&self.drop_zone, "none");
        set_display(&self.preview_container, "block");
        self.preview_instruction
            .set_text_content(Some("Media loaded. Use the tools to mark objects."));
    }

    pub fn show_drop_zone(&self) {
        set_display(&self.preview_container, "none");
        set_display(&self.drop_zone, "flex");
        self.preview_instruction
            .set_text_content(Some("Upload an image or video to start."));
    }

    pub fn set_loading(&self, loading: bool, is_video: bool) {
        set_display(
            &self.loading_indicator,
            if loading { "flex" } else { "none" },
        );
        set_display(
            &self.loading_video_note,
            if loading && is_video { "block" } else { "none" },
        );
    }

    fn hide_result_media(&self) {
        set_display(&self.result_image_container, "none");
        set_display(&self.result_image, "none");
        self.result_image.set_src("#");
        set_display(&self.result_video_area, "none");
        set_display(&self.result_video_player, "none");
        self.result_video_player.set_src("");
        set_display(&self.download_btn, "none");
        self.download_btn.set_href("#");
        let _ = self.download_btn.remove_attribute("download");
    }

    pub fn reset_results(&self) {
        set_display(&self.results_box, "none");
        set_display(&self.error_message, "none");
        set_display(&self.success_message, "none");
        set_display(&self.result_details_container, "none");
        self.hide_result_media();
    }

    pub fn show_error(&self, message: &str) {
        set_display(&self.success_message, "none");
        self.error_message
            .set_text_content(Some(&format!("Error: {message}")));
        set_display(&self.error_message, "block");
        set_display(&self.results_box, "block");
        self.set_loading(false, false);
        self.hide_result_media();
    }

    pub fn show_response(&self, response: &ProcessResponse) {
        let outcome = response.outcome();
        if let ProcessOutcome::Failed(message) = &outcome {
            self.show_error(message);
            return;
        }

        set_display(&self.error_message, "none");
        set_display(&self.results_box, "block");
        set_display(&self.success_message, "block");

        let (label, color) = match response.status {
            ResponseStatus::Success => ("Success", "var(--success-color)"),
            ResponseStatus::Warning => ("Warning", "var(--warning-color)"),
            ResponseStatus::Error => ("Error", "var(--error-color)"),
        };
        self.result_status
            .set_text_content(Some(&format!("Status: {label}")));
        let _ = self.result_status.style().set_property("color", color);

        let mut message = format!(
            "Message: {}",
            if response.message.is_empty() {
                "No message received."
            } else {
                &response.message
            }
        );
        if outcome == ProcessOutcome::NoOutput && response.status == ResponseStatus::Success {
            message.push_str(" (Note: no output file was generated.)");
        }
        self.result_message.set_text_content(Some(&message));

        match response.details_text() {
            Some(text) => {
                self.result_details.set_text_content(Some(&text));
                set_display(&self.result_details_container, "block");
            }
            None => set_display(&self.result_details_container, "none"),
        }

        self.hide_result_media();
        match outcome {
            ProcessOutcome::Image(data) => {
                self.result_image.set_src(data);
                set_display(&self.result_image, "block");
                set_display(&self.result_image_container, "block");
                self.download_btn.set_href(data);
                let input_name = response.detail_str("input_filename").unwrap_or("image.png");
                let base = input_name.rsplit_once('.').map_or(input_name, |(base, _)| base);
                let _ = self
                    .download_btn
                    .set_attribute("download", &format!("processed_{base}.png"));
                set_display(&self.download_btn, "inline-block");
            }
            ProcessOutcome::Video(url) => {
                self.result_video_player.set_src(url);
                set_display(&self.result_video_player, "block");
                set_display(&self.result_video_area, "block");
                self.download_btn.set_href(url);
                let name = response.result_filename.as_deref().unwrap_or("video.mp4");
                let _ = self
                    .download_btn
                    .set_attribute("download", &format!("processed_{name}"));
                set_display(&self.download_btn, "inline-block");
                self.result_video_player.load();
            }
            ProcessOutcome::NoOutput | ProcessOutcome::Failed(_) => {}
        }
    }
}
