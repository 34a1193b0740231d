use web_sys::{Document, Window};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Theme {
    Light,
    Dark,
}

pub struct ThemeColors {
    pub brush: &'static str,
    pub box_stroke: &'static str,
    pub box_fill: &'static str,
    pub box_fill_live: &'static str,
    pub polygon_stroke: &'static str,
    pub polygon_fill: &'static str,
    pub vertex_marker: &'static str,
    pub hover_preview: &'static str,
}

static LIGHT: ThemeColors = ThemeColors {
    brush: "rgba(255, 0, 0, 0.7)",
    box_stroke: "rgba(0, 100, 255, 0.8)",
    box_fill: "rgba(0, 100, 255, 0.3)",
    box_fill_live: "rgba(0, 100, 255, 0.2)",
    polygon_stroke: "rgba(0, 200, 100, 0.8)",
    polygon_fill: "rgba(0, 200, 100, 0.4)",
    vertex_marker: "rgba(0, 0, 255, 0.7)",
    hover_preview: "rgba(150, 150, 150, 0.6)",
};

static DARK: ThemeColors = ThemeColors {
    brush: "rgba(255, 77, 77, 0.7)",
    box_stroke: "rgba(100, 150, 255, 0.8)",
    box_fill: "rgba(100, 150, 255, 0.3)",
    box_fill_live: "rgba(100, 150, 255, 0.2)",
    polygon_stroke: "rgba(100, 220, 150, 0.8)",
    polygon_fill: "rgba(100, 220, 150, 0.4)",
    vertex_marker: "rgba(0, 0, 255, 0.7)",
    hover_preview: "rgba(150, 150, 150, 0.6)",
};

const STORAGE_KEY: &str = "theme";

impl Theme {
    pub fn attr(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn colors(self) -> &'static ThemeColors {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }

    pub fn load(window: &Window) -> Theme {
        let saved = window
            .local_storage()
            .ok()
            .flatten()
            .and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten());
        match saved.as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn store(self, window: &Window) {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.set_item(STORAGE_KEY, self.attr());
        }
    }

    pub fn apply(self, document: &Document) {
        if let Some(body) = document.body() {
            let _ = body.set_attribute("data-theme", self.attr());
        }
    }
}
