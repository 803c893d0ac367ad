//! Portfolio page components and the document model they run on.
//!
//! The server binary uses them to publish the page data and render static
//! snapshots. Built for `wasm32`, the `web` module runs the same components
//! in the browser against the live page.

pub mod config;
pub mod dom;
pub mod fetch;
pub mod models;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod web;
