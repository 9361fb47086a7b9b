// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive CLI.
//
// Module responsibilities:
// - `walker`: paginated feed traversal with a confirmation gate between
//   pages. Knows nothing about contacts or HTTP.
// - `api`: blocking HTTP client for the contacts service (login, feed
//   pages, update, delete) and the page fetcher used by the walker.
// - `types`: wire types of the service.
// - `format`: console rendering of contact pages.
// - `ui`: interactive flows and the continue prompt.
// - `config`: TOML configuration.
// - `error`: typed client errors.
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod types;
pub mod ui;
pub mod walker;

#[cfg(test)]
mod testing;
