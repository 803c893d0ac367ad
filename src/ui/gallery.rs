//! Pieces both galleries share: loading a record array and the inline
//! error state.

use log::{error, info};

use crate::dom::{Document, NodeId};
use crate::fetch::{DataSource, FetchError};
use crate::models::{parse_records, Record};

/// Lifecycle of a gallery component.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryState {
    /// Not yet set up.
    Idle,
    /// Records loaded and rendered.
    Ready,
    /// Data could not be loaded; the container shows an error.
    Failed(FetchError),
    /// Setup aborted because the container is missing.
    Disabled,
}

impl GalleryState {
    pub fn is_active(&self) -> bool {
        matches!(self, GalleryState::Ready | GalleryState::Failed(_))
    }
}

/// Fetch `path` and parse it into validated records.
pub fn load_records<T: Record>(source: &dyn DataSource, path: &str) -> Result<Vec<T>, FetchError> {
    let body = source.fetch(path)?;
    let records = parse_records::<T>(&body)?;
    info!("Loaded {} {} record(s) from {}", records.len(), T::KIND, path);
    Ok(records)
}

/// Replace the container's contents with a visible error message.
pub fn show_error(doc: &mut Document, container: NodeId, kind: &str, err: &FetchError) {
    error!("Error loading {}s: {}", kind, err);
    doc.clear_children(container);
    let msg = doc.element_with(
        "p",
        "load-error",
        Some(&format!("Failed to load {}s. Please try again later.", kind)),
    );
    doc.set_attr(msg, "role", "alert");
    doc.append_child(container, msg);
}

/// Card index stored on a rendered card.
pub fn card_index(doc: &Document, card: NodeId) -> Option<usize> {
    doc.attr(card, "data-index")?.parse().ok()
}

/// CSS pixel value with at most two decimals, trailing zeros dropped.
pub fn px(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{}px", trimmed)
}
