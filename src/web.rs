//! Browser driver.
//!
//! The live page is imported into an arena `Document` once and the
//! components run against it exactly as they do on the server. Real DOM
//! listeners feed them typed events; after each event the arena body is
//! written back to the live body and section geometry is measured in again.
//! Live elements carry `data-fid`, the arena slot they were written from.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use log::{info, warn, Level, LevelFilter, Log, Metadata};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, Element, Event, EventTarget, HtmlElement, KeyboardEvent, TouchEvent, Window};

use crate::config::SiteConfig;
use crate::dom::{Document, NodeId, Rect};
use crate::fetch::{data_base, resolve_data_url, FetchError, MemorySource};
use crate::ui::{Effect, Page, Portfolio, UiEvent, Viewport};

/// Where the server publishes the browser-facing site configuration.
pub const CONFIG_PATH: &str = "/data/site.json";

const NODE_ATTR: &str = "data-fid";

const TICK_MS: u32 = 16;

/// Longest stretch of time one tick will replay, e.g. after a hidden tab.
const MAX_STEP_MS: f64 = 1000.0;

// ── Logging ───────────────────────────────────────────

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

// ── Entry point ───────────────────────────────────────

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
    spawn_local(async {
        if let Err(e) = run().await {
            log::error!("Page components not started: {}", e);
        }
    });
}

async fn run() -> Result<(), String> {
    let win = window().ok_or("no window")?;
    let live = win.document().ok_or("no document")?;
    let root = live.document_element().ok_or("empty document")?;

    let config = load_config().await;
    let source = prefetch(&config).await;

    let mut doc = Document::empty();
    let doc_root = doc.root();
    import_element(&mut doc, doc_root, &root);

    let (width, height) = viewport_size(&win);
    let mut viewport = Viewport::new(width, height);
    viewport.scroll_y = win.scroll_y().unwrap_or(0.0);
    let mut page = Page::new(doc, viewport);
    measure(&win, &mut page.document);

    let portfolio = Portfolio::boot(page, &config, Arc::new(source));
    let driver = Rc::new(RefCell::new(Driver::new(win.clone(), portfolio)));
    driver.borrow_mut().settle();

    listen(&win, &driver)?;
    let ticker = Rc::clone(&driver);
    Interval::new(TICK_MS, move || {
        if let Ok(mut d) = ticker.try_borrow_mut() {
            d.tick();
        }
    })
    .forget();

    info!("Page components running at {}x{}", width, height);
    Ok(())
}

// ── Data ──────────────────────────────────────────────

async fn get(url: &str) -> Result<(u16, String), FetchError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    Ok((status, body))
}

async fn load_config() -> SiteConfig {
    match get(CONFIG_PATH).await {
        Ok((status, body)) if (200..300).contains(&status) => {
            serde_json::from_str(&body).unwrap_or_else(|e| {
                warn!("Site config unreadable, using defaults: {}", e);
                SiteConfig::default()
            })
        }
        Ok((status, _)) => {
            warn!("Site config answered {}, using defaults", status);
            SiteConfig::default()
        }
        Err(e) => {
            warn!("Site config unavailable, using defaults: {}", e);
            SiteConfig::default()
        }
    }
}

/// Fetch both data files up front; the galleries read them synchronously.
async fn prefetch(config: &SiteConfig) -> MemorySource {
    let base = config
        .data
        .base_url
        .as_deref()
        .and_then(|b| data_base(b).map_err(|e| warn!("Ignoring data base URL: {}", e)).ok());

    let mut source = MemorySource::new();
    for path in [&config.certificates.data_path, &config.projects.data_path] {
        let url = match &base {
            Some(base) => match resolve_data_url(base, path) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    source.insert_failure(path, e);
                    continue;
                }
            },
            None => path.clone(),
        };
        match get(&url).await {
            Ok((status, body)) => source.insert(path, status, &body),
            Err(e) => source.insert_failure(path, e),
        }
    }
    source
}

// ── Live page <-> arena ───────────────────────────────

fn import_element(doc: &mut Document, parent: NodeId, live: &Element) {
    let id = doc.create_element(&live.local_name());
    for name in live.get_attribute_names().iter() {
        let Some(name) = name.as_string() else {
            continue;
        };
        if let Some(value) = live.get_attribute(&name) {
            doc.set_attr(id, &name, &value);
        }
    }
    doc.append_child(parent, id);

    let children = live.child_nodes();
    for i in 0..children.length() {
        let Some(child) = children.item(i) else {
            continue;
        };
        match child.node_type() {
            web_sys::Node::ELEMENT_NODE => {
                if let Some(el) = child.dyn_ref::<Element>() {
                    import_element(doc, id, el);
                }
            }
            web_sys::Node::TEXT_NODE => {
                let text = doc.create_text(&child.text_content().unwrap_or_default());
                doc.append_child(id, text);
            }
            _ => {}
        }
    }
}

/// Tag every element under `body` with its arena slot.
fn stamp(doc: &mut Document, body: NodeId) {
    let mut nodes = doc.descendants(body);
    nodes.push(body);
    for node in nodes {
        if doc.is_element(node) {
            doc.set_attr(node, NODE_ATTR, &node.index().to_string());
        }
    }
}

/// Copy live geometry of every element with an id into the arena.
fn measure(win: &Window, doc: &mut Document) {
    let Some(live) = win.document() else {
        return;
    };
    let scroll_x = win.scroll_x().unwrap_or(0.0);
    let scroll_y = win.scroll_y().unwrap_or(0.0);
    let targets: Vec<(NodeId, String)> = doc
        .descendants(doc.root())
        .into_iter()
        .filter_map(|n| doc.attr(n, "id").map(|id| (n, id.to_string())))
        .collect();
    for (node, id) in targets {
        if let Some(el) = live.get_element_by_id(&id) {
            let r = el.get_bounding_client_rect();
            doc.set_layout(
                node,
                Rect::new(r.top() + scroll_y, r.left() + scroll_x, r.width(), r.height()),
            );
        }
    }
}

fn viewport_size(win: &Window) -> (f64, f64) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (dim(win.inner_width()), dim(win.inner_height()))
}

// ── Driver ────────────────────────────────────────────

struct Driver {
    win: Window,
    portfolio: Portfolio,
    synced: Option<u64>,
    last_tick: f64,
    carry: f64,
}

impl Driver {
    fn new(win: Window, portfolio: Portfolio) -> Self {
        Driver {
            win,
            portfolio,
            synced: None,
            last_tick: js_sys::Date::now(),
            carry: 0.0,
        }
    }

    fn node_for(&self, el: &Element) -> Option<NodeId> {
        let tagged = el.closest(&format!("[{}]", NODE_ATTR)).ok()??;
        let index = tagged.get_attribute(NODE_ATTR)?.parse().ok()?;
        self.portfolio.page.document.node_at(index)
    }

    fn target_of(&self, ev: &Event) -> Option<NodeId> {
        let el = ev.target()?.dyn_into::<Element>().ok()?;
        self.node_for(&el)
    }

    /// Carry out effects, follow the scroll position and write back changes.
    fn settle(&mut self) {
        self.run_effects();
        self.follow_scroll();
        self.sync();
    }

    fn run_effects(&mut self) {
        for effect in self.portfolio.page.take_effects() {
            match effect {
                Effect::OpenUrl { url, target } => {
                    if let Err(e) =
                        self.win
                            .open_with_url_and_target_and_features(&url, &target, "noopener")
                    {
                        warn!("Cannot open {}: {:?}", url, e);
                    }
                }
            }
        }
    }

    /// Mirror the components' scroll position onto the window.
    fn follow_scroll(&self) {
        let want = self.portfolio.page.viewport.scroll_y;
        let have = self.win.scroll_y().unwrap_or(want);
        if (want - have).abs() > 1.0 {
            let x = self.win.scroll_x().unwrap_or(0.0);
            self.win.scroll_to_with_x_and_y(x, want);
        }
    }

    /// Write the arena body back to the live page if it changed.
    fn sync(&mut self) {
        let doc = &mut self.portfolio.page.document;
        let Some(body) = doc.body() else {
            return;
        };
        stamp(doc, body);
        if self.synced == Some(doc.revision()) {
            return;
        }
        let markup = doc.inner_html(body);
        let mut attrs: Vec<(String, String)> = doc.attrs(body).to_vec();
        let style = doc.style_attr(body);
        if !style.is_empty() {
            attrs.push(("style".to_string(), style));
        }
        self.synced = Some(doc.revision());

        let Some(live) = self.win.document() else {
            return;
        };
        let Some(live_body) = live.body() else {
            return;
        };
        let focused = live
            .active_element()
            .and_then(|el| el.get_attribute(NODE_ATTR));

        live_body.set_inner_html(&markup);
        for name in live_body.get_attribute_names().iter() {
            if let Some(name) = name.as_string() {
                let _ = live_body.remove_attribute(&name);
            }
        }
        for (name, value) in &attrs {
            let _ = live_body.set_attribute(name, value);
        }

        if let Some(fid) = focused {
            let selector = format!("[{}=\"{}\"]", NODE_ATTR, fid);
            if let Ok(Some(el)) = live.query_selector(&selector) {
                if let Some(el) = el.dyn_ref::<HtmlElement>() {
                    let _ = el.focus();
                }
            }
        }
        measure(&self.win, &mut self.portfolio.page.document);
    }

    fn tick(&mut self) {
        let now = js_sys::Date::now();
        let elapsed = ((now - self.last_tick).max(0.0) + self.carry).min(MAX_STEP_MS);
        self.last_tick = now;
        let ms = elapsed.floor();
        self.carry = elapsed - ms;
        if ms < 1.0 {
            return;
        }
        measure(&self.win, &mut self.portfolio.page.document);
        self.portfolio.advance(ms as u64);
        self.settle();
    }

    // ── Listeners ───────────────────────────────────────

    fn on_click(&mut self, ev: &Event) {
        let Some(target) = self.target_of(ev) else {
            return;
        };
        measure(&self.win, &mut self.portfolio.page.document);
        if self.portfolio.click(target).default_prevented {
            ev.prevent_default();
        }
        self.settle();
    }

    fn on_key(&mut self, ev: &KeyboardEvent) {
        let target = self
            .win
            .document()
            .and_then(|d| d.active_element())
            .and_then(|el| self.node_for(&el));
        if self.portfolio.key(&ev.key(), target).default_prevented {
            ev.prevent_default();
        }
        self.settle();
    }

    fn on_resize(&mut self) {
        let (width, height) = viewport_size(&self.win);
        measure(&self.win, &mut self.portfolio.page.document);
        self.portfolio.resize(width, height);
        self.settle();
    }

    fn on_scroll(&mut self) {
        let y = self.win.scroll_y().unwrap_or(0.0);
        if (y - self.portfolio.page.viewport.scroll_y).abs() <= 1.0 {
            return;
        }
        measure(&self.win, &mut self.portfolio.page.document);
        self.portfolio.scroll_to(y);
        self.settle();
    }

    fn on_touch(&mut self, ev: &TouchEvent, start: bool) {
        let Some(target) = self.target_of(ev) else {
            return;
        };
        let Some(touch) = ev.changed_touches().get(0) else {
            return;
        };
        let y = touch.client_y() as f64;
        let event = if start {
            UiEvent::TouchStart { target, y }
        } else {
            UiEvent::TouchEnd { target, y }
        };
        self.portfolio.dispatch(event);
        self.settle();
    }
}

fn on<F>(target: &EventTarget, kind: &str, driver: &Rc<RefCell<Driver>>, handler: F) -> Result<(), String>
where
    F: Fn(&mut Driver, Event) + 'static,
{
    let driver = Rc::clone(driver);
    let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        // dropped when it arrives while another event is being handled
        if let Ok(mut d) = driver.try_borrow_mut() {
            handler(&mut d, ev);
        }
    });
    target
        .add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())
        .map_err(|e| format!("cannot listen for {}: {:?}", kind, e))?;
    cb.forget();
    Ok(())
}

fn listen(win: &Window, driver: &Rc<RefCell<Driver>>) -> Result<(), String> {
    let live = win.document().ok_or("no document")?;
    on(&live, "click", driver, |d, ev| d.on_click(&ev))?;
    on(win, "keydown", driver, |d, ev| {
        if let Some(key) = ev.dyn_ref::<KeyboardEvent>() {
            d.on_key(key);
        }
    })?;
    on(win, "resize", driver, |d, _| d.on_resize())?;
    on(win, "scroll", driver, |d, _| d.on_scroll())?;
    on(&live, "touchstart", driver, |d, ev| {
        if let Some(touch) = ev.dyn_ref::<TouchEvent>() {
            d.on_touch(touch, true);
        }
    })?;
    on(&live, "touchend", driver, |d, ev| {
        if let Some(touch) = ev.dyn_ref::<TouchEvent>() {
            d.on_touch(touch, false);
        }
    })?;
    Ok(())
}
