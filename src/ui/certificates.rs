//! Certificate strip: one row of cards sized to the container, with a
//! shared detail overlay.

use std::sync::Arc;

use log::{error, info};

use crate::config::CertificateConfig;
use crate::dom::NodeId;
use crate::fetch::DataSource;
use crate::models::{Certificate, RecordSet};

use super::event::UiEvent;
use super::gallery::{card_index, load_records, px, show_error, GalleryState};
use super::overlay::{fill_image, fill_text, DetailOverlay};
use super::page::Page;
use super::{Component, UiError};

/// Computed card geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripLayout {
    pub card_width: f64,
    pub compact: bool,
    /// Cards were floored at the minimum width and no longer fit.
    pub overflows: bool,
}

/// Size `count` cards to fit `container_width`.
pub fn strip_layout(container_width: f64, count: usize, cfg: &CertificateConfig) -> Option<StripLayout> {
    if count == 0 {
        return None;
    }
    let inner = (container_width - cfg.padding).max(0.0);
    if count == 1 {
        let card_width = cfg.single_card_max_width.min(inner);
        return Some(StripLayout {
            card_width,
            compact: card_width < cfg.compact_threshold,
            overflows: false,
        });
    }
    let available = inner - cfg.gap * (count - 1) as f64;
    let fitted = available / count as f64;
    let card_width = fitted.max(cfg.min_card_width);
    Some(StripLayout {
        card_width,
        compact: card_width < cfg.compact_threshold,
        overflows: fitted < cfg.min_card_width,
    })
}

struct CertificateOverlay {
    overlay: DetailOverlay,
    image: NodeId,
    name: NodeId,
    issuer: NodeId,
    description: NodeId,
}

pub struct CertificateGallery {
    config: CertificateConfig,
    source: Arc<dyn DataSource>,
    state: GalleryState,
    records: RecordSet<Certificate>,
    container: Option<NodeId>,
    overlay: Option<CertificateOverlay>,
    strip: Option<NodeId>,
    cards: Vec<NodeId>,
    indicator: Option<NodeId>,
    layout: Option<StripLayout>,
}

impl CertificateGallery {
    pub fn new(config: CertificateConfig, source: Arc<dyn DataSource>) -> Self {
        CertificateGallery {
            config,
            source,
            state: GalleryState::Idle,
            records: RecordSet::new(),
            container: None,
            overlay: None,
            strip: None,
            cards: Vec::new(),
            indicator: None,
            layout: None,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn records(&self) -> &[Certificate] {
        self.records.as_slice()
    }

    pub fn cards(&self) -> &[NodeId] {
        &self.cards
    }

    pub fn layout(&self) -> Option<StripLayout> {
        self.layout
    }

    pub fn overlay_root(&self) -> Option<NodeId> {
        self.overlay.as_ref().map(|o| o.overlay.root())
    }

    pub fn close_button(&self) -> Option<NodeId> {
        self.overlay.as_ref().map(|o| o.overlay.close_button())
    }

    pub fn is_open(&self) -> bool {
        self.overlay.as_ref().map(|o| o.overlay.is_open()).unwrap_or(false)
    }

    // ── Lifecycle ───────────────────────────────────────

    fn init(&mut self, page: &mut Page) -> Result<(), UiError> {
        let Some(container) = page.document.element_by_id(&self.config.container_id) else {
            self.state = GalleryState::Disabled;
            error!("Certificate container #{} not found", self.config.container_id);
            return Err(UiError::MissingTarget(format!("#{}", self.config.container_id)));
        };
        self.container = Some(container);
        if self.overlay.is_none() {
            self.overlay = Some(self.build_overlay(page)?);
        }
        self.refresh(page);
        Ok(())
    }

    fn build_overlay(&self, page: &mut Page) -> Result<CertificateOverlay, UiError> {
        let overlay = DetailOverlay::build(page, "certificate")?;
        let doc = &mut page.document;
        let body = overlay.body();
        let image = doc.element_with("img", "certificate-modal-image", None);
        doc.set_style(image, "display", "none");
        let name = doc.element_with("h2", "certificate-modal-name", None);
        let issuer = doc.element_with("p", "certificate-modal-issuer", None);
        let description = doc.element_with("p", "certificate-modal-description", None);
        for node in [image, name, issuer, description] {
            doc.append_child(body, node);
        }
        Ok(CertificateOverlay {
            overlay,
            image,
            name,
            issuer,
            description,
        })
    }

    /// Fetch the records again and rebuild. A failed fetch leaves an
    /// inline error and an empty record set. An open overlay is closed
    /// first since its record may be gone.
    pub fn refresh(&mut self, page: &mut Page) {
        let Some(container) = self.container else {
            return;
        };
        self.close(page);
        match load_records::<Certificate>(self.source.as_ref(), &self.config.data_path) {
            Ok(records) => {
                self.records.replace(records);
                self.state = GalleryState::Ready;
                self.render(page);
            }
            Err(err) => {
                self.records.clear();
                self.cards.clear();
                self.strip = None;
                self.layout = None;
                self.remove_indicator(page);
                show_error(&mut page.document, container, "certificate", &err);
                self.state = GalleryState::Failed(err);
            }
        }
    }

    /// Clear and rebuild every card from the current records.
    pub fn render(&mut self, page: &mut Page) {
        let Some(container) = self.container else {
            return;
        };
        let doc = &mut page.document;
        doc.clear_children(container);
        self.cards.clear();
        self.remove_indicator(page);

        let width = page.element_width(container);
        self.layout = strip_layout(width, self.records.len(), &self.config);

        let doc = &mut page.document;
        let strip = doc.element_with("div", "certificates-strip", None);
        doc.set_style(strip, "display", "flex");
        doc.set_style(strip, "gap", &px(self.config.gap));
        doc.set_style(strip, "padding", &format!("0 {}", px(self.config.padding / 2.0)));
        doc.set_style(strip, "overflow-x", "auto");
        doc.append_child(container, strip);
        self.strip = Some(strip);

        let Some(layout) = self.layout else {
            return;
        };

        for (i, cert) in self.records.as_slice().iter().enumerate() {
            let class = if layout.compact {
                "certificate-card compact"
            } else {
                "certificate-card"
            };
            let card = doc.element_with("div", class, None);
            doc.set_attr(card, "data-index", &i.to_string());
            doc.set_attr(card, "tabindex", "0");
            doc.set_attr(card, "role", "button");
            doc.set_attr(card, "aria-label", &format!("{} by {}", cert.name, cert.issuer));
            doc.set_style(card, "flex", "0 0 auto");
            doc.set_style(card, "width", &px(layout.card_width));

            if let Some(src) = cert.image.as_deref() {
                let img = doc.element_with("img", "certificate-image", None);
                doc.set_attr(img, "src", src);
                doc.set_attr(img, "alt", &cert.name);
                doc.set_attr(img, "loading", "lazy");
                doc.append_child(card, img);
            }
            let name = doc.element_with("h3", "certificate-name", Some(&cert.name));
            let issuer = doc.element_with("p", "certificate-issuer", Some(&cert.issuer));
            doc.append_child(card, name);
            doc.append_child(card, issuer);
            doc.append_child(strip, card);
            self.cards.push(card);
        }

        if layout.overflows {
            self.insert_indicator(page, container);
        }
    }

    fn insert_indicator(&mut self, page: &mut Page, container: NodeId) {
        let doc = &mut page.document;
        let indicator = doc.element_with("div", "scroll-indicator", Some("Scroll for more →"));
        doc.set_attr(indicator, "aria-hidden", "true");
        let anchor = doc
            .element_by_id(&self.config.anchor_id)
            .and_then(|a| doc.parent(a).map(|p| (p, a)));
        match anchor {
            Some((parent, anchor)) => doc.insert_before(parent, indicator, anchor),
            None => doc.append_child(container, indicator),
        }
        self.indicator = Some(indicator);
    }

    fn remove_indicator(&mut self, page: &mut Page) {
        if let Some(old) = self.indicator.take() {
            page.document.remove(old);
        }
    }

    // ── Programmatic surface ────────────────────────────

    /// Records set by hand replace a failed load, so resizes re-render them.
    fn mark_rendered(&mut self) {
        if self.container.is_some() {
            self.state = GalleryState::Ready;
        }
    }

    pub fn add(&mut self, page: &mut Page, cert: Certificate) {
        self.records.add(cert);
        self.mark_rendered();
        self.render(page);
    }

    pub fn remove(&mut self, page: &mut Page, index: usize) -> Option<Certificate> {
        let removed = self.records.remove(index)?;
        self.close(page);
        self.mark_rendered();
        self.render(page);
        Some(removed)
    }

    /// Show the detail overlay for the record at `index`.
    pub fn open(&mut self, page: &mut Page, index: usize) -> bool {
        let Some(cert) = self.records.get(index).cloned() else {
            return false;
        };
        let Some(detail) = self.overlay.as_mut() else {
            return false;
        };
        let doc = &mut page.document;
        fill_image(doc, detail.image, cert.image.as_deref(), &cert.name);
        fill_text(doc, detail.name, Some(&cert.name));
        fill_text(doc, detail.issuer, Some(&cert.issuer));
        fill_text(doc, detail.description, cert.description.as_deref());
        detail.overlay.open(page);
        true
    }

    pub fn close(&mut self, page: &mut Page) {
        if let Some(detail) = self.overlay.as_mut() {
            detail.overlay.close(page);
        }
    }

    fn card_for(&self, page: &Page, target: NodeId) -> Option<usize> {
        let card = page.document.closest_with_class(target, "certificate-card")?;
        if !self.cards.contains(&card) {
            return None;
        }
        card_index(&page.document, card)
    }
}

impl Component for CertificateGallery {
    fn name(&self) -> &'static str {
        "certificate-gallery"
    }

    fn handle(&mut self, page: &mut Page, event: &UiEvent) -> Result<(), UiError> {
        if let UiEvent::Load = event {
            return self.init(page);
        }
        if !self.state.is_active() {
            return Ok(());
        }
        if let Some(detail) = self.overlay.as_mut() {
            if detail.overlay.handle(page, event) {
                return Ok(());
            }
        }
        match event {
            UiEvent::Resize { .. } if self.state == GalleryState::Ready => {
                self.render(page);
                if let Some(layout) = self.layout {
                    info!("Certificate cards resized to {}", px(layout.card_width));
                }
            }
            UiEvent::Click { target } => {
                if let Some(index) = self.card_for(page, *target) {
                    self.open(page, index);
                }
            }
            UiEvent::Key { key, target: Some(target) } if key.activates() => {
                if let Some(index) = self.card_for(page, *target) {
                    page.prevent_default();
                    self.open(page, index);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
