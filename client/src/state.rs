use wasm_bindgen::prelude::Closure;
use web_sys::{
    CanvasRenderingContext2d, File, HtmlCanvasElement, HtmlImageElement, HtmlVideoElement, Url,
};

use maskpad_shared::{MediaKind, ScaleTransform, Session};

use crate::theme::Theme;

pub struct Media {
    pub file: File,
    pub kind: MediaKind,
    pub object_url: Option<String>,
}

pub struct State {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub image_preview: HtmlImageElement,
    pub video_preview: HtmlVideoElement,
    pub session: Session,
    pub media: Option<Media>,
    pub scale: Option<ScaleTransform>,
    pub display_width: f64,
    pub display_height: f64,
    pub theme: Theme,
    pub submitting: bool,
    // Keeps the media load callbacks alive for the lifetime of the current
    // file; replaced wholesale on the next one.
    pub media_callbacks: Vec<Closure<dyn FnMut()>>,
}

impl State {
    pub fn new(
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        image_preview: HtmlImageElement,
        video_preview: HtmlVideoElement,
        theme: Theme,
    ) -> Self {
        Self {
            canvas,
            ctx,
            image_preview,
            video_preview,
            session: Session::new(),
            media: None,
            scale: None,
            display_width: 0.0,
            display_height: 0.0,
            theme,
            submitting: false,
            media_callbacks: Vec::new(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(
            self.media,
            Some(Media {
                kind: MediaKind::Video,
                ..
            })
        )
    }

    pub fn can_process(&self) -> bool {
        self.media.is_some() && !self.session.shapes().is_empty() && !self.submitting
    }

    pub fn revoke_object_url(&mut self) {
        if let Some(media) = &mut self.media {
            if let Some(url) = media.object_url.take() {
                let _ = Url::revoke_object_url(&url);
            }
        }
    }
}
