//! Headless Chromium behind the page-session traits

pub mod driver;
pub mod session;

pub use driver::find_browser;
pub use session::{ChromiumLauncher, ChromiumSession};
