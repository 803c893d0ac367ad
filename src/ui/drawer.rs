//! Mobile navigation drawer. Below the breakpoint the page header is hidden
//! and replaced by a hamburger button, a slide-in drawer built from the
//! header's links, and a dimming backdrop. Above it, the header is restored
//! and the apparatus removed.

use log::{debug, info, warn};

use crate::config::DrawerConfig;
use crate::dom::{Document, NodeId};

use super::event::{Key, UiEvent};
use super::page::Page;
use super::selectors::SelectorChain;
use super::timer::{TimerId, TimerPurpose};
use super::viewport::ViewportClass;
use super::{Component, UiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerMode {
    Desktop,
    Mobile,
}

/// A navigation entry lifted from the page header.
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub text: String,
    pub href: Option<String>,
    /// Inline click handler carried over verbatim.
    pub action: Option<String>,
}

#[derive(Debug)]
struct Apparatus {
    button: NodeId,
    backdrop: NodeId,
    drawer: NodeId,
    close: NodeId,
    links: Vec<NodeId>,
}

pub struct MobileDrawer {
    config: DrawerConfig,
    header_selectors: SelectorChain,
    title_selectors: SelectorChain,
    mode: Option<DrawerMode>,
    class: ViewportClass,
    header: Option<NodeId>,
    header_display: Option<String>,
    apparatus: Option<Apparatus>,
    items: Vec<NavItem>,
    open: bool,
    resize_timer: Option<TimerId>,
    touch_start: Option<f64>,
}

/// Collect link- and button-like descendants of `header` with visible text.
pub fn extract_items(doc: &Document, header: NodeId) -> Vec<NavItem> {
    let candidates = doc.select_within(header, "a, button").unwrap_or_default();
    candidates
        .into_iter()
        .filter_map(|el| {
            let text = doc.text_content(el).trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(NavItem {
                text,
                href: doc.attr(el, "href").map(str::to_string),
                action: doc.attr(el, "onclick").map(str::to_string),
            })
        })
        .collect()
}

impl MobileDrawer {
    pub fn new(config: DrawerConfig) -> Self {
        let header_selectors = SelectorChain::new(config.header_selectors.clone());
        let mut titles = vec!["h1".to_string()];
        titles.extend(config.title_selectors.iter().cloned());
        MobileDrawer {
            config,
            header_selectors,
            title_selectors: SelectorChain::new(titles),
            mode: None,
            class: ViewportClass::Desktop,
            header: None,
            header_display: None,
            apparatus: None,
            items: Vec::new(),
            open: false,
            resize_timer: None,
            touch_start: None,
        }
    }

    pub fn mode(&self) -> Option<DrawerMode> {
        self.mode
    }

    pub fn viewport_class(&self) -> ViewportClass {
        self.class
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    pub fn has_apparatus(&self) -> bool {
        self.apparatus.is_some()
    }

    pub fn header(&self) -> Option<NodeId> {
        self.header
    }

    pub fn button(&self) -> Option<NodeId> {
        self.apparatus.as_ref().map(|a| a.button)
    }

    pub fn backdrop(&self) -> Option<NodeId> {
        self.apparatus.as_ref().map(|a| a.backdrop)
    }

    pub fn drawer(&self) -> Option<NodeId> {
        self.apparatus.as_ref().map(|a| a.drawer)
    }

    pub fn close_button(&self) -> Option<NodeId> {
        self.apparatus.as_ref().map(|a| a.close)
    }

    pub fn drawer_links(&self) -> &[NodeId] {
        self.apparatus.as_ref().map(|a| a.links.as_slice()).unwrap_or(&[])
    }

    fn mode_for(&self, width: f64) -> DrawerMode {
        if width <= self.config.mobile_breakpoint {
            DrawerMode::Mobile
        } else {
            DrawerMode::Desktop
        }
    }

    // ── Mode switching ──────────────────────────────────

    /// Re-run setup from scratch for the current viewport.
    pub fn setup(&mut self, page: &mut Page) {
        let mode = self.mode_for(page.viewport.width);
        self.apply(page, mode);
    }

    fn evaluate(&mut self, page: &mut Page) {
        let mode = self.mode_for(page.viewport.width);
        let class = ViewportClass::classify(page.viewport.width, &self.config);
        if Some(mode) != self.mode {
            info!("Viewport {}px: switching to {:?} navigation", page.viewport.width, mode);
            self.apply(page, mode);
        } else if class != self.class {
            self.class = class;
            if let Some(drawer) = self.drawer() {
                page.document
                    .toggle_class(drawer, "small", class == ViewportClass::SmallMobile);
            }
        }
    }

    fn apply(&mut self, page: &mut Page, mode: DrawerMode) {
        self.teardown(page);
        self.mode = Some(mode);
        self.class = ViewportClass::classify(page.viewport.width, &self.config);
        if mode == DrawerMode::Mobile {
            if let Err(e) = self.build(page) {
                warn!("Mobile navigation unavailable: {}", e);
            }
        }
    }

    /// Remove the apparatus and show the page header again.
    fn teardown(&mut self, page: &mut Page) {
        if self.open {
            self.set_open(page, false);
        }
        if let Some(app) = self.apparatus.take() {
            for node in [app.button, app.backdrop, app.drawer] {
                page.document.remove(node);
            }
        }
        if let Some(header) = self.header.take() {
            match self.header_display.take() {
                Some(display) => page.document.set_style(header, "display", &display),
                None => page.document.remove_style(header, "display"),
            }
        }
        self.items.clear();
        self.touch_start = None;
    }

    fn build(&mut self, page: &mut Page) -> Result<(), UiError> {
        let body = page.body()?;
        let header = self
            .header_selectors
            .first_one(&page.document)
            .ok_or_else(|| UiError::MissingTarget("page header".to_string()))?;

        let items = extract_items(&page.document, header);
        let title = self.heading(&page.document);
        debug!("Drawer: {} item(s), heading '{}'", items.len(), title);

        let doc = &mut page.document;
        self.header_display = doc.style(header, "display").map(str::to_string);
        doc.set_style(header, "display", "none");
        self.header = Some(header);

        let transition = format!("{}ms ease", self.config.transition_ms);

        let button = doc.element_with("button", "mobile-menu-toggle", None);
        doc.set_attr(button, "id", "mobile-menu-toggle");
        doc.set_attr(button, "type", "button");
        doc.set_attr(button, "aria-label", "Open menu");
        doc.set_attr(button, "aria-expanded", "false");
        doc.set_attr(button, "aria-controls", "mobile-drawer");
        doc.set_style(button, "position", "fixed");
        doc.set_style(button, "top", "16px");
        doc.set_style(button, "right", "16px");
        doc.set_style(button, "z-index", "1001");
        for _ in 0..3 {
            let line = doc.element_with("span", "hamburger-line", None);
            doc.append_child(button, line);
        }

        let backdrop = doc.element_with("div", "mobile-drawer-backdrop", None);
        doc.set_attr(backdrop, "id", "mobile-drawer-backdrop");
        doc.set_style(backdrop, "position", "fixed");
        doc.set_style(backdrop, "inset", "0");
        doc.set_style(backdrop, "background", "rgba(0, 0, 0, 0.5)");
        doc.set_style(backdrop, "opacity", "0");
        doc.set_style(backdrop, "pointer-events", "none");
        doc.set_style(backdrop, "transition", &format!("opacity {}", transition));
        doc.set_style(backdrop, "z-index", "999");

        let drawer = doc.element_with("nav", "mobile-drawer", None);
        doc.set_attr(drawer, "id", "mobile-drawer");
        doc.set_attr(drawer, "aria-hidden", "true");
        doc.set_style(drawer, "position", "fixed");
        doc.set_style(drawer, "top", "0");
        doc.set_style(drawer, "left", "0");
        doc.set_style(drawer, "height", "100%");
        doc.set_style(drawer, "width", "80%");
        doc.set_style(drawer, "max-width", "320px");
        doc.set_style(drawer, "transform", "translateX(-100%)");
        doc.set_style(drawer, "transition", &format!("transform {}", transition));
        doc.set_style(drawer, "z-index", "1000");
        if self.class == ViewportClass::SmallMobile {
            doc.add_class(drawer, "small");
        }

        let head = doc.element_with("div", "mobile-drawer-header", None);
        let heading = doc.element_with("h2", "mobile-drawer-title", Some(&title));
        let close = doc.element_with("button", "mobile-drawer-close", Some("×"));
        doc.set_attr(close, "type", "button");
        doc.set_attr(close, "aria-label", "Close menu");
        doc.append_child(head, heading);
        doc.append_child(head, close);
        doc.append_child(drawer, head);

        let list = doc.element_with("ul", "mobile-drawer-links", None);
        let mut links = Vec::with_capacity(items.len());
        for item in &items {
            let li = doc.create_element("li");
            let link = doc.element_with("a", "mobile-drawer-link", Some(&item.text));
            if let Some(href) = &item.href {
                doc.set_attr(link, "href", href);
            } else {
                doc.set_attr(link, "role", "button");
            }
            if let Some(action) = &item.action {
                doc.set_attr(link, "onclick", action);
            }
            doc.append_child(li, link);
            doc.append_child(list, li);
            links.push(link);
        }
        doc.append_child(drawer, list);

        doc.append_child(body, button);
        doc.append_child(body, backdrop);
        doc.append_child(body, drawer);

        self.items = items;
        self.apparatus = Some(Apparatus {
            button,
            backdrop,
            drawer,
            close,
            links,
        });
        Ok(())
    }

    /// Drawer heading: page heading, then a title element, then the
    /// document title.
    fn heading(&self, doc: &Document) -> String {
        self.title_selectors
            .first_one(doc)
            .map(|el| doc.text_content(el).trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| doc.title())
            .unwrap_or_else(|| "Menu".to_string())
    }

    // ── Open / close ────────────────────────────────────

    pub fn open(&mut self, page: &mut Page) {
        self.set_open(page, true);
    }

    pub fn close(&mut self, page: &mut Page) {
        self.set_open(page, false);
    }

    pub fn toggle(&mut self, page: &mut Page) {
        let next = !self.open;
        self.set_open(page, next);
    }

    fn set_open(&mut self, page: &mut Page, open: bool) {
        let Some(app) = self.apparatus.as_ref() else {
            return;
        };
        if open == self.open {
            return;
        }
        self.open = open;
        let doc = &mut page.document;
        if open {
            doc.set_style(app.drawer, "transform", "translateX(0)");
            doc.set_attr(app.drawer, "aria-hidden", "false");
            doc.set_style(app.backdrop, "opacity", "1");
            doc.set_style(app.backdrop, "pointer-events", "auto");
            doc.set_attr(app.button, "aria-expanded", "true");
            doc.add_class(app.button, "open");
            page.lock_scroll();
        } else {
            doc.set_style(app.drawer, "transform", "translateX(-100%)");
            doc.set_attr(app.drawer, "aria-hidden", "true");
            doc.set_style(app.backdrop, "opacity", "0");
            doc.set_style(app.backdrop, "pointer-events", "none");
            doc.set_attr(app.button, "aria-expanded", "false");
            doc.remove_class(app.button, "open");
            page.unlock_scroll();
        }
    }

    // ── Event handling ──────────────────────────────────

    fn on_click(&mut self, page: &mut Page, target: NodeId) {
        let Some(app) = self.apparatus.as_ref() else {
            return;
        };
        let doc = &page.document;
        if doc.contains(app.button, target) {
            self.toggle(page);
        } else if doc.contains(app.backdrop, target)
            || doc.contains(app.close, target)
            || app.links.iter().any(|&l| doc.contains(l, target))
        {
            self.close(page);
        }
    }

    fn on_resize(&mut self, page: &mut Page) {
        if let Some(old) = self.resize_timer.take() {
            page.timers.cancel(old);
        }
        self.resize_timer = Some(
            page.timers
                .schedule(self.config.resize_debounce_ms, TimerPurpose::DrawerResize),
        );
    }

    fn in_drawer(&self, doc: &Document, target: NodeId) -> bool {
        self.apparatus
            .as_ref()
            .map(|a| doc.contains(a.drawer, target))
            .unwrap_or(false)
    }
}

impl Component for MobileDrawer {
    fn name(&self) -> &'static str {
        "mobile-drawer"
    }

    fn handle(&mut self, page: &mut Page, event: &UiEvent) -> Result<(), UiError> {
        match event {
            UiEvent::Load => self.setup(page),
            UiEvent::Resize { .. } => self.on_resize(page),
            UiEvent::Timer { id, .. } if self.resize_timer == Some(*id) => {
                self.resize_timer = None;
                self.evaluate(page);
            }
            UiEvent::Click { target } => self.on_click(page, *target),
            UiEvent::Key { key: Key::Escape, .. } if self.open => self.close(page),
            UiEvent::TouchStart { target, y } if self.in_drawer(&page.document, *target) => {
                self.touch_start = Some(*y);
            }
            UiEvent::TouchEnd { y, .. } => {
                if let Some(start) = self.touch_start.take() {
                    if start - y > self.config.swipe_threshold {
                        self.close(page);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
