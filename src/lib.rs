//! Core library for the `looper` playback-speed controller.
//!
//! A [`session::PageSession`] watches a [`page::Document`] for video elements,
//! attaches an overlay control to each, routes keyboard and pointer input to
//! the right video, and remembers the chosen speed per hostname through a
//! [`storage::KeyValueStore`]. The `looper` binary drives sessions headlessly
//! from page scripts.
pub mod args;
pub mod config;
mod entry;
pub mod error;
pub mod overlay;
pub mod page;
pub mod persistence;
pub mod script;
pub mod session;
pub mod shutdown;
pub mod speed;
pub mod storage;
mod system;

pub use entry::run;
