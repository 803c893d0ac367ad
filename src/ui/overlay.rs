use crate::dom::{Document, NodeId};

use super::event::{Key, UiEvent};
use super::page::Page;
use super::UiError;

/// Modal detail view shared by the galleries. Hidden until opened; closes
/// on its close control, a click outside the content box, or Escape.
#[derive(Debug)]
pub struct DetailOverlay {
    root: NodeId,
    content: NodeId,
    close: NodeId,
    body: NodeId,
    open: bool,
}

impl DetailOverlay {
    /// Build `div.<prefix>-modal > div.<prefix>-modal-content` and attach it
    /// to the end of the body.
    pub fn build(page: &mut Page, prefix: &str) -> Result<Self, UiError> {
        let body_el = page.body()?;
        let doc = &mut page.document;

        let root = doc.element_with("div", &format!("{}-modal", prefix), None);
        doc.set_attr(root, "role", "dialog");
        doc.set_attr(root, "aria-modal", "true");
        doc.set_attr(root, "aria-hidden", "true");
        doc.set_style(root, "display", "none");

        let content = doc.element_with("div", &format!("{}-modal-content", prefix), None);
        let close = doc.element_with("button", &format!("{}-modal-close", prefix), Some("×"));
        doc.set_attr(close, "type", "button");
        doc.set_attr(close, "aria-label", "Close");
        let body = doc.element_with("div", &format!("{}-modal-body", prefix), None);

        doc.append_child(content, close);
        doc.append_child(content, body);
        doc.append_child(root, content);
        doc.append_child(body_el, root);

        Ok(DetailOverlay {
            root,
            content,
            close,
            body,
            open: false,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Container the owning gallery fills with its detail fields.
    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn close_button(&self) -> NodeId {
        self.close
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self, page: &mut Page) {
        if self.open {
            return;
        }
        self.open = true;
        page.document.set_style(self.root, "display", "flex");
        page.document.set_attr(self.root, "aria-hidden", "false");
        page.lock_scroll();
    }

    pub fn close(&mut self, page: &mut Page) {
        if !self.open {
            return;
        }
        self.open = false;
        page.document.set_style(self.root, "display", "none");
        page.document.set_attr(self.root, "aria-hidden", "true");
        page.unlock_scroll();
    }

    /// Handle the overlay's own closers. Returns true when the event was
    /// aimed at the overlay and must not reach anything behind it.
    pub fn handle(&mut self, page: &mut Page, event: &UiEvent) -> bool {
        match event {
            UiEvent::Click { target } => {
                let doc = &page.document;
                if !doc.contains(self.root, *target) {
                    return false;
                }
                let on_close = doc.contains(self.close, *target);
                let outside_content = !doc.contains(self.content, *target);
                if on_close || outside_content {
                    self.close(page);
                }
                true
            }
            UiEvent::Key { key: Key::Escape, .. } if self.open => {
                self.close(page);
                true
            }
            _ => false,
        }
    }
}

/// Set a text field, blank when the value is absent.
pub(crate) fn fill_text(doc: &mut Document, id: NodeId, value: Option<&str>) {
    doc.set_text(id, value.unwrap_or(""));
}

/// Point an image at `src`, or hide it when there is none.
pub(crate) fn fill_image(doc: &mut Document, id: NodeId, src: Option<&str>, alt: &str) {
    match src {
        Some(src) => {
            doc.set_attr(id, "src", src);
            doc.set_attr(id, "alt", alt);
            doc.remove_style(id, "display");
        }
        None => {
            doc.remove_attr(id, "src");
            doc.set_attr(id, "alt", "");
            doc.set_style(id, "display", "none");
        }
    }
}
