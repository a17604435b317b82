//! Interactive gitspace table.
//!
//! A full-screen view over the same rows the `list` command prints, with the
//! row menu bound to keys. Mutations run in the background and each row shows
//! its own pending marker until the call settles.

mod app;

pub use app::{init_terminal, restore_terminal, run_browser, BrowserApp};
