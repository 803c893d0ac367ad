//! Project grid: fixed-size cards rendered into the page's project
//! container, each with at most one outbound repository button.

use std::sync::Arc;

use log::error;

use crate::config::ProjectConfig;
use crate::dom::{Document, NodeId};
use crate::fetch::DataSource;
use crate::models::project::ProjectLink;
use crate::models::{Project, RecordSet};

use super::event::UiEvent;
use super::gallery::{card_index, load_records, px, show_error, GalleryState};
use super::overlay::{fill_image, fill_text, DetailOverlay};
use super::page::Page;
use super::{Component, UiError};

struct ProjectOverlay {
    overlay: DetailOverlay,
    image: NodeId,
    title: NodeId,
    description: NodeId,
    github_block: NodeId,
    github_link: NodeId,
    model_block: NodeId,
    model_link: NodeId,
}

pub struct ProjectGallery {
    config: ProjectConfig,
    source: Arc<dyn DataSource>,
    state: GalleryState,
    records: RecordSet<Project>,
    container: Option<NodeId>,
    overlay: Option<ProjectOverlay>,
    cards: Vec<NodeId>,
}

fn link_block(doc: &mut Document, class: &str, label: &str) -> (NodeId, NodeId) {
    let block = doc.element_with("div", class, None);
    doc.set_style(block, "display", "none");
    let link = doc.element_with("a", "modal-link", Some(label));
    doc.set_attr(link, "target", "_blank");
    doc.set_attr(link, "rel", "noopener noreferrer");
    doc.append_child(block, link);
    (block, link)
}

fn reveal_link(doc: &mut Document, block: NodeId, link: NodeId, url: Option<&str>) {
    match url {
        Some(url) => {
            doc.set_attr(link, "href", url);
            doc.set_style(block, "display", "block");
        }
        None => {
            doc.remove_attr(link, "href");
            doc.set_style(block, "display", "none");
        }
    }
}

impl ProjectGallery {
    pub fn new(config: ProjectConfig, source: Arc<dyn DataSource>) -> Self {
        ProjectGallery {
            config,
            source,
            state: GalleryState::Idle,
            records: RecordSet::new(),
            container: None,
            overlay: None,
            cards: Vec::new(),
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn records(&self) -> &[Project] {
        self.records.as_slice()
    }

    pub fn cards(&self) -> &[NodeId] {
        &self.cards
    }

    pub fn is_open(&self) -> bool {
        self.overlay.as_ref().map(|o| o.overlay.is_open()).unwrap_or(false)
    }

    pub fn overlay_root(&self) -> Option<NodeId> {
        self.overlay.as_ref().map(|o| o.overlay.root())
    }

    /// (GitHub block, Hugging Face block) of the detail overlay.
    pub fn link_blocks(&self) -> Option<(NodeId, NodeId)> {
        self.overlay.as_ref().map(|o| (o.github_block, o.model_block))
    }

    // ── Lifecycle ───────────────────────────────────────

    fn init(&mut self, page: &mut Page) -> Result<(), UiError> {
        let Some(container) = page.document.element_by_id(&self.config.container_id) else {
            self.state = GalleryState::Disabled;
            error!("Projects container #{} not found", self.config.container_id);
            return Err(UiError::MissingTarget(format!("#{}", self.config.container_id)));
        };
        self.container = Some(container);
        if self.overlay.is_none() {
            self.overlay = Some(Self::build_overlay(page)?);
        }
        self.refresh(page);
        Ok(())
    }

    fn build_overlay(page: &mut Page) -> Result<ProjectOverlay, UiError> {
        let overlay = DetailOverlay::build(page, "project")?;
        let body = overlay.body();
        let doc = &mut page.document;

        let image = doc.element_with("img", "project-modal-image", None);
        doc.set_style(image, "display", "none");
        let title = doc.element_with("h2", "project-modal-title", None);
        let description = doc.element_with("p", "project-modal-description", None);
        let (github_block, github_link) = link_block(doc, "modal-github-link", "View on GitHub");
        let (model_block, model_link) =
            link_block(doc, "modal-huggingface-link", "View on Hugging Face");
        for node in [image, title, description, github_block, model_block] {
            doc.append_child(body, node);
        }

        Ok(ProjectOverlay {
            overlay,
            image,
            title,
            description,
            github_block,
            github_link,
            model_block,
            model_link,
        })
    }

    /// Re-fetch and rebuild; closes an open overlay first.
    pub fn refresh(&mut self, page: &mut Page) {
        let Some(container) = self.container else {
            return;
        };
        self.close(page);
        match load_records::<Project>(self.source.as_ref(), &self.config.data_path) {
            Ok(records) => {
                self.records.replace(records);
                self.state = GalleryState::Ready;
                self.render(page);
            }
            Err(err) => {
                self.records.clear();
                self.cards.clear();
                show_error(&mut page.document, container, "project", &err);
                self.state = GalleryState::Failed(err);
            }
        }
    }

    /// Clear the container and rebuild one card per record.
    pub fn render(&mut self, page: &mut Page) {
        let Some(container) = self.container else {
            return;
        };
        let doc = &mut page.document;
        doc.clear_children(container);
        self.cards.clear();

        for (i, project) in self.records.as_slice().iter().enumerate() {
            let card = doc.element_with("div", "project-card", None);
            doc.set_attr(card, "data-index", &i.to_string());
            doc.set_attr(card, "tabindex", "0");
            doc.set_attr(card, "role", "button");
            doc.set_style(card, "width", &px(self.config.card_width));

            if let Some(src) = project.image.as_deref() {
                let img = doc.element_with("img", "project-image", None);
                doc.set_attr(img, "src", src);
                doc.set_attr(img, "alt", &project.title);
                doc.set_attr(img, "loading", "lazy");
                doc.append_child(card, img);
            }

            let info = doc.element_with("div", "project-info", None);
            let title = doc.element_with("h3", "project-title", Some(&project.title));
            let description =
                doc.element_with("p", "project-description", Some(&project.description));
            doc.append_child(info, title);
            doc.append_child(info, description);

            if let Some((kind, url)) = project.primary_link() {
                let (class, label) = match kind {
                    ProjectLink::Source => ("project-link github", "View on GitHub"),
                    ProjectLink::Model => ("project-link huggingface", "View on Hugging Face"),
                };
                let button = doc.element_with("button", class, Some(label));
                doc.set_attr(button, "type", "button");
                doc.set_attr(button, "data-url", url);
                doc.append_child(info, button);
            }

            doc.append_child(card, info);
            doc.append_child(container, card);
            self.cards.push(card);
        }
    }

    // ── Programmatic surface ────────────────────────────

    /// Records set by hand replace a failed load, so resizes re-render them.
    fn mark_rendered(&mut self) {
        if self.container.is_some() {
            self.state = GalleryState::Ready;
        }
    }

    pub fn add(&mut self, page: &mut Page, project: Project) {
        self.records.add(project);
        self.mark_rendered();
        self.render(page);
    }

    pub fn remove(&mut self, page: &mut Page, index: usize) -> Option<Project> {
        let removed = self.records.remove(index)?;
        self.close(page);
        self.mark_rendered();
        self.render(page);
        Some(removed)
    }

    pub fn open(&mut self, page: &mut Page, index: usize) -> bool {
        let Some(project) = self.records.get(index).cloned() else {
            return false;
        };
        let Some(detail) = self.overlay.as_mut() else {
            return false;
        };
        let doc = &mut page.document;
        fill_image(doc, detail.image, project.image.as_deref(), &project.title);
        fill_text(doc, detail.title, Some(&project.title));
        fill_text(doc, detail.description, Some(&project.description));
        reveal_link(doc, detail.github_block, detail.github_link, project.github.as_deref());
        reveal_link(doc, detail.model_block, detail.model_link, project.huggingface.as_deref());
        detail.overlay.open(page);
        true
    }

    pub fn close(&mut self, page: &mut Page) {
        if let Some(detail) = self.overlay.as_mut() {
            detail.overlay.close(page);
        }
    }

    fn owned_card(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        doc.closest_with_class(target, "project-card")
            .filter(|card| self.cards.contains(card))
    }

    fn on_click(&mut self, page: &mut Page, target: NodeId) {
        let Some(card) = self.owned_card(&page.document, target) else {
            return;
        };
        // The action button handles its own click; the card never sees it.
        if let Some(button) = page.document.closest_with_class(target, "project-link") {
            if let Some(url) = page.document.attr(button, "data-url").map(str::to_string) {
                page.open_url(&url);
            }
            return;
        }
        if let Some(index) = card_index(&page.document, card) {
            self.open(page, index);
        }
    }
}

impl Component for ProjectGallery {
    fn name(&self) -> &'static str {
        "project-gallery"
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
            UiEvent::Resize { .. } if self.state == GalleryState::Ready => self.render(page),
            UiEvent::Click { target } => self.on_click(page, *target),
            UiEvent::Key { key, target: Some(target) } if key.activates() => {
                let card = self.owned_card(&page.document, *target);
                if let Some(card) = card.filter(|&c| c == *target) {
                    page.prevent_default();
                    if let Some(index) = card_index(&page.document, card) {
                        self.open(page, index);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
