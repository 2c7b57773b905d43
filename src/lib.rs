//! Progressive enhancements for a static marketing landing page, compiled to
//! WebAssembly.
//!
//! Each controller in [`components`] (plus [`analytics::EventLogger`]) binds
//! to existing markup by selector and works through an [`Env`], so the same
//! code runs against the browser (`web`, wasm32 only) or the in-memory
//! page used by the tests ([`page::memory`]).

pub mod analytics;
pub mod app;
pub mod config;
pub mod env;
pub mod error;
pub mod page;
pub mod scheduler;
pub mod styles;

pub mod components {
    pub mod cursor;
    pub mod faq;
    pub mod navbar;
    pub mod optimizer;
    pub mod particles;
    pub mod pricing;
    pub mod reveal;
    pub mod scroll_top;
    pub mod showcase;
}

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::App;
pub use env::Env;
pub use error::{FxError, Result};
