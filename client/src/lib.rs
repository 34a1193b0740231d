mod app;
mod dom;
mod media;
mod net;
mod render;
mod state;
mod theme;
mod ui;

pub use app::run;
