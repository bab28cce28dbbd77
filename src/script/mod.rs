//! Page scripts: scripted documents and user input for the headless driver.
mod loader;
mod runner;
pub mod types;


pub use loader::load_script;
pub use runner::{PageSnapshot, VideoReport, page_host, run_script};
