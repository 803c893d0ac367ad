#![cfg(test)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rocket::http::Status;
use rocket::local::blocking::Client;

use folio::config::SiteConfig;
use folio::dom::{Document, NodeId, Rect};
use folio::fetch::{DataSource, DirSource, FetchError, HttpSource, MemorySource};
use folio::models::{Certificate, Project};
use folio::ui::drawer::DrawerMode;
use folio::ui::gallery::GalleryState;
use folio::ui::scroll::ScrollPrimitive;
use folio::ui::viewport::{Capability, ScrollCapabilities, ViewportClass};
use folio::ui::{Effect, Page, Portfolio, UiEvent, Viewport};

use crate::render;

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head><title>Jane Doe</title></head>
<body>
  <header class="site-header">
    <h1 class="site-title">Jane Doe</h1>
    <nav class="main-nav">
      <a href="#about">About</a>
      <a href="#projects">Projects</a>
      <a href="#certificates">Certificates</a>
      <a href="#contact">Contact</a>
    </nav>
  </header>
  <section id="about"><p>Hello.</p></section>
  <section id="projects"><div id="projects-container"></div></section>
  <section id="certificates"><div id="certificates-container"></div></section>
  <section id="contact"><p>Write to me.</p></section>
</body>
</html>"##;

const PROJECTS: &str = r#"[
  {"title": "Classifier", "description": "Labels reviews.",
   "github": "https://github.com/example/classifier"},
  {"title": "Summarizer", "description": "Summarizes speech.",
   "hugging_face": "https://huggingface.co/spaces/example/summarizer"},
  {"title": "Folio", "description": "This site.",
   "github": "https://github.com/example/folio",
   "huggingface": "https://huggingface.co/example"}
]"#;

const SECTIONS: [&str; 4] = ["about", "projects", "certificates", "contact"];

fn certificates_json(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"name": "Cert {}", "issuer": "Issuer {}"}}"#, i, i))
        .collect();
    format!("[{}]", items.join(","))
}

fn source(certificates: &str, projects: &str) -> Arc<dyn DataSource> {
    Arc::new(
        MemorySource::new()
            .with("/data/certificates.json", 200, certificates)
            .with("/data/projects.json", 200, projects),
    )
}

/// Sections stacked 800px apart.
fn lay_out(doc: &mut Document) {
    for (i, id) in SECTIONS.iter().enumerate() {
        if let Some(section) = doc.element_by_id(id) {
            doc.set_layout(section, Rect::new(i as f64 * 800.0, 0.0, 1280.0, 800.0));
        }
    }
}

fn boot_page(html: &str, viewport: Viewport, config: &SiteConfig, data: Arc<dyn DataSource>) -> Portfolio {
    let mut doc = Document::parse(html).unwrap();
    lay_out(&mut doc);
    Portfolio::boot(Page::new(doc, viewport), config, data)
}

fn boot(width: f64, data: Arc<dyn DataSource>) -> Portfolio {
    boot_page(PAGE, Viewport::new(width, 800.0), &SiteConfig::default(), data)
}

fn boot_default(width: f64) -> Portfolio {
    boot(width, source(&certificates_json(3), PROJECTS))
}

fn first(doc: &Document, selector: &str) -> NodeId {
    doc.select_first(selector).unwrap().unwrap()
}

// ═══════════════════════════════════════════════════════════
// Scroll navigator
// ═══════════════════════════════════════════════════════════

#[test]
fn navigator_discovers_links_and_sections() {
    let p = boot_default(1280.0);
    assert_eq!(p.navigator.links().len(), 4);
    assert_eq!(p.navigator.sections().len(), 4);
    let doc = &p.page.document;
    for (link, section) in p.navigator.links().iter().zip(p.navigator.sections()) {
        let href = doc.attr(*link, "href").unwrap();
        assert_eq!(doc.attr(*section, "id"), Some(&href[1..]));
    }
}

#[test]
fn navigator_highlights_after_initial_delay() {
    let mut p = boot_default(1280.0);
    assert_eq!(p.navigator.active(), None);
    p.advance(100);
    assert_eq!(p.navigator.active(), Some(0));

    let doc = &p.page.document;
    let links = p.navigator.links();
    assert!(doc.has_class(links[0], "active"));
    assert_eq!(doc.style(links[0], "opacity"), Some("1"));
    for &link in &links[1..] {
        assert!(!doc.has_class(link, "active"));
        assert_eq!(doc.style(link, "opacity"), Some("0.6"));
    }
}

#[test]
fn navigator_highlights_section_nearest_trigger_line() {
    let mut p = boot_default(1280.0);
    p.advance(100);

    // trigger line at 1100: projects (800) is nearest
    p.scroll_to(1000.0);
    p.advance(16);
    assert_eq!(p.navigator.active(), Some(1));

    p.scroll_to(2350.0);
    p.advance(16);
    assert_eq!(p.navigator.active(), Some(3));
    let active = p
        .navigator
        .links()
        .iter()
        .filter(|&&l| p.page.document.has_class(l, "active"))
        .count();
    assert_eq!(active, 1);
}

#[test]
fn navigator_scroll_events_are_debounced() {
    let mut p = boot_default(1280.0);
    p.advance(100);
    p.scroll_to(800.0);
    p.advance(10);
    p.scroll_to(1600.0);
    p.advance(10);
    assert_eq!(p.navigator.active(), Some(0));
    p.advance(6);
    assert_eq!(p.navigator.active(), Some(2));
}

#[test]
fn navigator_safety_interval_catches_silent_scrolls() {
    let mut p = boot_default(1280.0);
    p.advance(100);
    assert_eq!(p.navigator.active(), Some(0));
    p.page.viewport.scroll_y = 1600.0;
    p.advance(100);
    assert_eq!(p.navigator.active(), Some(2));
}

#[test]
fn navigator_click_prevents_default_and_scrolls_smoothly() {
    let mut p = boot_default(1280.0);
    let target = p.navigator.links()[2];
    let outcome = p.click(target);
    assert!(outcome.default_prevented);
    assert_eq!(p.navigator.last_primitive(), Some(ScrollPrimitive::NativeSmooth));
    assert!(p.page.is_animating());

    p.advance(250);
    let midway = p.page.viewport.scroll_y;
    assert!(midway > 0.0 && midway < 1600.0);

    p.advance(1000);
    assert_eq!(p.page.viewport.scroll_y, 1600.0);
    assert_eq!(p.navigator.active(), Some(2));
}

#[test]
fn navigator_click_honors_header_offset() {
    let mut config = SiteConfig::default();
    config.navigator.header_offset = 80.0;
    let mut p = boot_page(PAGE, Viewport::new(1280.0, 800.0), &config, source("[]", "[]"));
    let target = p.navigator.links()[1];
    p.click(target);
    p.advance(1000);
    assert_eq!(p.page.viewport.scroll_y, 720.0);
}

#[test]
fn navigator_click_on_link_text_still_counts() {
    let mut p = boot_default(1280.0);
    let link = p.navigator.links()[3];
    let text = p.page.document.children(link)[0];
    assert!(p.click(text).default_prevented);
}

#[test]
fn navigator_falls_back_when_smooth_scroll_is_unavailable() {
    let caps = ScrollCapabilities {
        smooth_scroll: Capability::Missing,
        bounding_rect: Capability::Faulty,
        offset_top: Capability::Supported,
    };
    let viewport = Viewport::new(1280.0, 800.0).with_capabilities(caps);
    let mut p = boot_page(PAGE, viewport, &SiteConfig::default(), source("[]", "[]"));
    let target = p.navigator.links()[2];
    assert!(p.click(target).default_prevented);
    assert_eq!(p.navigator.last_primitive(), Some(ScrollPrimitive::OffsetTop));
    p.advance(1000);
    assert_eq!(p.page.viewport.scroll_y, 1600.0);
    assert_eq!(p.navigator.active(), Some(2));
}

#[test]
fn navigator_jumps_when_no_animated_primitive_works() {
    let caps = ScrollCapabilities {
        smooth_scroll: Capability::Faulty,
        bounding_rect: Capability::Missing,
        offset_top: Capability::Faulty,
    };
    let viewport = Viewport::new(1280.0, 800.0).with_capabilities(caps);
    let mut p = boot_page(PAGE, viewport, &SiteConfig::default(), source("[]", "[]"));
    let target = p.navigator.links()[3];
    assert!(p.click(target).default_prevented);
    assert_eq!(p.navigator.last_primitive(), Some(ScrollPrimitive::InstantJump));
    assert_eq!(p.page.viewport.scroll_y, 2400.0);
    assert!(!p.page.is_animating());
}

#[test]
fn navigator_ignores_clicks_elsewhere() {
    let mut p = boot_default(1280.0);
    let about = p.page.document.element_by_id("about").unwrap();
    assert!(!p.click(about).default_prevented);
    assert_eq!(p.page.viewport.scroll_y, 0.0);
}

#[test]
fn navigator_without_links_is_inert() {
    let html = "<html><body><section id=\"about\"><p>Only text.</p></section></body></html>";
    let mut p = boot_page(html, Viewport::new(1280.0, 800.0), &SiteConfig::default(), source("[]", "[]"));
    p.advance(500);
    assert!(p.navigator.links().is_empty());
    assert_eq!(p.navigator.active(), None);
}

#[test]
fn navigator_skips_links_without_a_section() {
    let html = r##"<html><body><nav><a href="#about">About</a><a href="#gone">Gone</a></nav>
        <section id="about"></section></body></html>"##;
    let p = boot_page(html, Viewport::new(1280.0, 800.0), &SiteConfig::default(), source("[]", "[]"));
    assert_eq!(p.navigator.links().len(), 1);
}

#[test]
fn navigator_duplicate_links_only_first_is_active() {
    let html = PAGE.replace(
        r##"<a href="#contact">Contact</a>"##,
        r##"<a href="#contact">Contact</a>
      <a href="#about">Top</a>"##,
    );
    let mut p = boot_page(&html, Viewport::new(1280.0, 800.0), &SiteConfig::default(), source("[]", "[]"));
    p.advance(100);
    let links = p.navigator.links().to_vec();
    assert_eq!(links.len(), 5);
    assert_eq!(p.navigator.active(), Some(0));
    assert!(p.page.document.has_class(links[0], "active"));
    assert!(!p.page.document.has_class(links[4], "active"));

    // the second link still scrolls to the shared section
    p.scroll_to(1600.0);
    p.advance(16);
    assert_eq!(p.navigator.active(), Some(2));
    assert!(p.click(links[4]).default_prevented);
    p.advance(1000);
    assert_eq!(p.page.viewport.scroll_y, 0.0);
    assert_eq!(p.navigator.active(), Some(0));
    assert!(p.page.document.has_class(links[0], "active"));
    assert!(!p.page.document.has_class(links[4], "active"));
}

// ═══════════════════════════════════════════════════════════
// Certificate gallery
// ═══════════════════════════════════════════════════════════

#[test]
fn certificates_fit_five_cards_into_800px() {
    let p = boot(800.0, source(&certificates_json(5), PROJECTS));
    assert_eq!(p.certificates.state(), &GalleryState::Ready);
    assert_eq!(p.certificates.cards().len(), 5);
    let layout = p.certificates.layout().unwrap();
    assert!((layout.card_width - 142.4).abs() < 1e-9);

    let doc = &p.page.document;
    for &card in p.certificates.cards() {
        assert_eq!(doc.style(card, "width"), Some("142.4px"));
        assert!(doc.has_class(card, "compact"));
    }
    assert!(doc.select(".scroll-indicator").unwrap().is_empty());
}

#[test]
fn wide_strip_uses_regular_cards() {
    let p = boot(1280.0, source(&certificates_json(5), PROJECTS));
    let card = p.certificates.cards()[0];
    assert_eq!(p.page.document.style(card, "width"), Some("238.4px"));
    assert!(!p.page.document.has_class(card, "compact"));
}

#[test]
fn single_certificate_is_capped() {
    let p = boot(800.0, source(&certificates_json(1), PROJECTS));
    let card = p.certificates.cards()[0];
    assert_eq!(p.page.document.style(card, "width"), Some("300px"));
}

#[test]
fn crowded_strip_floors_cards_and_adds_indicator_before_contact() {
    let p = boot(1000.0, source(&certificates_json(10), PROJECTS));
    let doc = &p.page.document;
    let card = p.certificates.cards()[0];
    assert_eq!(doc.style(card, "width"), Some("120px"));
    assert!(doc.has_class(card, "compact"));

    let indicators = doc.select(".scroll-indicator").unwrap();
    assert_eq!(indicators.len(), 1);
    let body = doc.body().unwrap();
    let siblings = doc.children(body);
    let at = siblings.iter().position(|&n| n == indicators[0]).unwrap();
    assert_eq!(siblings[at + 1], doc.element_by_id("contact").unwrap());
}

#[test]
fn certificates_rerender_on_resize() {
    let mut p = boot(1280.0, source(&certificates_json(5), PROJECTS));
    p.resize(800.0, 800.0);
    let card = p.certificates.cards()[0];
    assert_eq!(p.page.document.style(card, "width"), Some("142.4px"));
    assert_eq!(p.certificates.cards().len(), 5);
}

#[test]
fn repeated_resizes_do_not_grow_the_document() {
    let mut p = boot(1280.0, source(&certificates_json(5), PROJECTS));
    p.resize(1000.0, 800.0);
    let settled = p.page.document.arena_len();
    for i in 0..50 {
        let width = if i % 2 == 0 { 1200.0 } else { 1000.0 };
        p.resize(width, 800.0);
        p.advance(200);
    }
    assert_eq!(p.page.document.arena_len(), settled);
    assert_eq!(p.page.document.select(".certificate-card").unwrap().len(), 5);
    assert_eq!(p.page.document.select(".project-card").unwrap().len(), 3);
}

#[test]
fn certificate_render_is_idempotent() {
    let mut p = boot(1000.0, source(&certificates_json(10), PROJECTS));
    let before = p.page.document.to_html();
    p.certificates.render(&mut p.page);
    p.certificates.render(&mut p.page);
    assert_eq!(p.page.document.to_html(), before);
    assert_eq!(p.page.document.select(".certificate-card").unwrap().len(), 10);
    assert_eq!(p.page.document.select(".scroll-indicator").unwrap().len(), 1);
}

#[test]
fn certificate_fetch_404_shows_inline_error() {
    let data: Arc<dyn DataSource> =
        Arc::new(MemorySource::new().with("/data/projects.json", 200, PROJECTS));
    let p = boot(1280.0, data);
    assert_eq!(p.certificates.state(), &GalleryState::Failed(FetchError::Status(404)));
    assert!(p.certificates.cards().is_empty());

    let doc = &p.page.document;
    let container = doc.element_by_id("certificates-container").unwrap();
    assert_eq!(
        doc.text_content(container),
        "Failed to load certificates. Please try again later."
    );
    assert!(doc.select(".certificate-card").unwrap().is_empty());
    // the other gallery is unaffected
    assert_eq!(p.projects.state(), &GalleryState::Ready);
}

#[test]
fn malformed_certificate_json_shows_inline_error() {
    let p = boot(1280.0, source("{not json", PROJECTS));
    assert!(matches!(p.certificates.state(), GalleryState::Failed(FetchError::Parse(_))));
    assert!(p.certificates.cards().is_empty());
}

#[test]
fn certificate_with_blank_name_rejects_the_batch() {
    let body = r#"[{"name": "Good", "issuer": "A"}, {"name": "   ", "issuer": "B"}]"#;
    let p = boot(1280.0, source(body, PROJECTS));
    assert!(matches!(
        p.certificates.state(),
        GalleryState::Failed(FetchError::Schema { index: 1, .. })
    ));
    assert!(p.certificates.records().is_empty());
}

#[test]
fn certificate_server_error_is_reported() {
    let data: Arc<dyn DataSource> = Arc::new(
        MemorySource::new()
            .with("/data/certificates.json", 503, "")
            .with("/data/projects.json", 200, PROJECTS),
    );
    let p = boot(1280.0, data);
    assert_eq!(p.certificates.state(), &GalleryState::Failed(FetchError::Status(503)));
}

#[test]
fn certificate_overlay_opens_and_closes_three_ways() {
    let mut p = boot_default(1280.0);
    let card = p.certificates.cards()[1];
    let root = p.certificates.overlay_root().unwrap();

    p.click(card);
    assert!(p.certificates.is_open());
    assert!(p.page.is_scroll_locked());
    let body = p.page.document.body().unwrap();
    assert_eq!(p.page.document.style(body, "overflow"), Some("hidden"));
    assert_eq!(p.page.document.style(root, "display"), Some("flex"));
    let name = first(&p.page.document, ".certificate-modal-name");
    assert_eq!(p.page.document.text_content(name), "Cert 1");

    let close = p.certificates.close_button().unwrap();
    p.click(close);
    assert!(!p.certificates.is_open());
    assert!(!p.page.is_scroll_locked());
    assert_eq!(p.page.document.style(body, "overflow"), None);

    p.click(card);
    p.click(root);
    assert!(!p.certificates.is_open());

    p.click(card);
    let content = first(&p.page.document, ".certificate-modal-content");
    p.click(content);
    assert!(p.certificates.is_open());
    p.key("Escape", None);
    assert!(!p.certificates.is_open());
    assert!(!p.page.is_scroll_locked());
}

#[test]
fn certificate_cards_open_from_keyboard() {
    let mut p = boot_default(1280.0);
    let card = p.certificates.cards()[0];
    assert!(p.key("Enter", Some(card)).default_prevented);
    assert!(p.certificates.is_open());
    p.key("Escape", None);

    assert!(p.key(" ", Some(card)).default_prevented);
    assert!(p.certificates.is_open());
    p.certificates.close(&mut p.page);

    assert!(!p.key("a", Some(card)).default_prevented);
    assert!(!p.certificates.is_open());
}

#[test]
fn certificate_add_remove_and_refresh() {
    let mut p = boot_default(1280.0);
    assert_eq!(p.certificates.cards().len(), 3);

    p.certificates.add(&mut p.page, Certificate::new("Rust", "Ferris"));
    assert_eq!(p.certificates.cards().len(), 4);
    let last = p.certificates.cards()[3];
    assert!(p.page.document.text_content(last).contains("Rust"));

    let removed = p.certificates.remove(&mut p.page, 0).unwrap();
    assert_eq!(removed.name, "Cert 0");
    assert_eq!(p.certificates.cards().len(), 3);
    assert!(p.certificates.remove(&mut p.page, 99).is_none());

    p.certificates.refresh(&mut p.page);
    assert_eq!(p.certificates.records().len(), 3);
    assert_eq!(p.certificates.records()[0].name, "Cert 0");
}

#[test]
fn certificates_added_after_failed_load_follow_resizes() {
    let data: Arc<dyn DataSource> =
        Arc::new(MemorySource::new().with("/data/projects.json", 200, PROJECTS));
    let mut p = boot(1280.0, data);
    assert!(matches!(p.certificates.state(), GalleryState::Failed(_)));
    let container = p.page.document.element_by_id("certificates-container").unwrap();
    assert!(p.page.document.text_content(container).contains("Failed"));

    p.certificates.add(&mut p.page, Certificate::new("Rust", "Ferris"));
    p.certificates.add(&mut p.page, Certificate::new("Go", "Gopher"));
    assert_eq!(p.certificates.state(), &GalleryState::Ready);
    assert_eq!(p.certificates.layout().unwrap().card_width, 620.0);
    assert!(!p.page.document.text_content(container).contains("Failed"));

    p.resize(1000.0, 800.0);
    assert_eq!(p.certificates.layout().unwrap().card_width, 480.0);
    let card = p.certificates.cards()[0];
    assert_eq!(p.page.document.style(card, "width"), Some("480px"));
}

#[test]
fn removing_a_record_closes_the_overlay() {
    let mut p = boot_default(1280.0);
    assert!(p.certificates.open(&mut p.page, 1));
    p.certificates.remove(&mut p.page, 1);
    assert!(!p.certificates.is_open());
    assert!(!p.page.is_scroll_locked());

    let card = p.projects.cards()[0];
    p.click(card);
    assert!(p.projects.is_open());
    p.projects.remove(&mut p.page, 0);
    assert!(!p.projects.is_open());
    assert!(!p.page.is_scroll_locked());
}

/// Serves certificates once, then answers 503.
struct FlakySource {
    certificates_served: AtomicBool,
}

impl DataSource for FlakySource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        match path {
            "/data/projects.json" => Ok(PROJECTS.to_string()),
            "/data/certificates.json" if !self.certificates_served.swap(true, Ordering::SeqCst) => {
                Ok(certificates_json(2))
            }
            _ => Err(FetchError::Status(503)),
        }
    }
}

#[test]
fn failed_refresh_closes_the_overlay() {
    let data: Arc<dyn DataSource> = Arc::new(FlakySource {
        certificates_served: AtomicBool::new(false),
    });
    let mut p = boot(1280.0, data);
    let card = p.certificates.cards()[0];
    p.click(card);
    assert!(p.certificates.is_open());

    p.certificates.refresh(&mut p.page);
    assert_eq!(p.certificates.state(), &GalleryState::Failed(FetchError::Status(503)));
    assert!(!p.certificates.is_open());
    assert!(!p.page.is_scroll_locked());
    let root = p.certificates.overlay_root().unwrap();
    assert_eq!(p.page.document.style(root, "display"), Some("none"));
}

#[test]
fn open_out_of_range_does_nothing() {
    let mut p = boot_default(1280.0);
    assert!(!p.certificates.open(&mut p.page, 42));
    assert!(!p.page.is_scroll_locked());
}

// ═══════════════════════════════════════════════════════════
// Project gallery
// ═══════════════════════════════════════════════════════════

#[test]
fn projects_render_fixed_width_cards() {
    let p = boot_default(1280.0);
    assert_eq!(p.projects.cards().len(), 3);
    for &card in p.projects.cards() {
        assert_eq!(p.page.document.style(card, "width"), Some("320px"));
    }
}

#[test]
fn project_cards_offer_at_most_one_button() {
    let p = boot_default(1280.0);
    let doc = &p.page.document;
    let buttons = |card: NodeId| doc.select_within(card, "button.project-link").unwrap();

    let source_only = buttons(p.projects.cards()[0]);
    assert_eq!(source_only.len(), 1);
    assert!(doc.has_class(source_only[0], "github"));

    let model_only = buttons(p.projects.cards()[1]);
    assert_eq!(model_only.len(), 1);
    assert!(doc.has_class(model_only[0], "huggingface"));

    let both = buttons(p.projects.cards()[2]);
    assert_eq!(both.len(), 1);
    assert!(doc.has_class(both[0], "github"));
}

#[test]
fn project_button_opens_link_without_overlay() {
    let mut p = boot_default(1280.0);
    let card = p.projects.cards()[1];
    let button = p.page.document.select_within(card, "button").unwrap()[0];

    p.click(button);
    assert!(!p.projects.is_open());
    assert_eq!(
        p.page.take_effects(),
        vec![Effect::OpenUrl {
            url: "https://huggingface.co/spaces/example/summarizer".to_string(),
            target: "_blank".to_string(),
        }]
    );
}

#[test]
fn project_overlay_reveals_only_present_links() {
    let mut p = boot_default(1280.0);
    let card = p.projects.cards()[1];
    let title = p.page.document.select_within(card, "h3").unwrap()[0];
    p.click(title);
    assert!(p.projects.is_open());
    assert!(p.page.effects().is_empty());

    let (github, model) = p.projects.link_blocks().unwrap();
    let doc = &p.page.document;
    assert_eq!(doc.style(github, "display"), Some("none"));
    assert_eq!(doc.style(model, "display"), Some("block"));
    let link = doc.select_within(model, "a").unwrap()[0];
    assert_eq!(
        doc.attr(link, "href"),
        Some("https://huggingface.co/spaces/example/summarizer")
    );

    let root = p.projects.overlay_root().unwrap();
    p.click(root);
    assert!(!p.projects.is_open());

    // both links on the dual project
    let card = p.projects.cards()[2];
    p.click(card);
    let doc = &p.page.document;
    assert_eq!(doc.style(github, "display"), Some("block"));
    assert_eq!(doc.style(model, "display"), Some("block"));
}

#[test]
fn project_keyboard_only_opens_from_the_card_itself() {
    let mut p = boot_default(1280.0);
    let card = p.projects.cards()[0];
    let button = p.page.document.select_within(card, "button").unwrap()[0];

    assert!(!p.key("Enter", Some(button)).default_prevented);
    assert!(!p.projects.is_open());

    assert!(p.key("Enter", Some(card)).default_prevented);
    assert!(p.projects.is_open());
    p.key("Escape", None);
    assert!(!p.projects.is_open());
}

#[test]
fn project_with_unsafe_link_keeps_record_but_drops_link() {
    let body = r#"[{"title": "Odd", "description": "x", "github": "javascript:alert(1)"}]"#;
    let p = boot(1280.0, source("[]", body));
    assert_eq!(p.projects.records().len(), 1);
    assert_eq!(p.projects.records()[0].github, None);
    let card = p.projects.cards()[0];
    assert!(p.page.document.select_within(card, "button").unwrap().is_empty());
}

#[test]
fn project_add_and_remove() {
    let mut p = boot_default(1280.0);
    p.projects.add(&mut p.page, Project::new("New", "Fresh."));
    assert_eq!(p.projects.cards().len(), 4);
    assert_eq!(p.projects.remove(&mut p.page, 3).unwrap().title, "New");
    assert_eq!(p.projects.cards().len(), 3);
}

#[test]
fn missing_container_disables_only_that_gallery() {
    let html = PAGE.replace(r#"<div id="certificates-container"></div>"#, "");
    let mut p = boot_page(&html, Viewport::new(1280.0, 800.0), &SiteConfig::default(), source(&certificates_json(3), PROJECTS));
    assert_eq!(p.certificates.state(), &GalleryState::Disabled);
    assert!(p.certificates.overlay_root().is_none());
    assert_eq!(p.projects.state(), &GalleryState::Ready);
    assert_eq!(p.navigator.links().len(), 4);

    p.resize(700.0, 800.0);
    p.advance(200);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Mobile));
    assert_eq!(p.certificates.state(), &GalleryState::Disabled);
}

// ═══════════════════════════════════════════════════════════
// Mobile drawer
// ═══════════════════════════════════════════════════════════

fn header_visible(p: &Portfolio) -> bool {
    let header = first(&p.page.document, "header");
    p.page.document.is_displayed(header)
}

fn toggle_visible(p: &Portfolio) -> bool {
    p.drawer
        .button()
        .map(|b| p.page.document.is_connected(b) && p.page.document.is_displayed(b))
        .unwrap_or(false)
}

#[test]
fn drawer_absent_on_desktop() {
    let p = boot_default(1280.0);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Desktop));
    assert!(!p.drawer.has_apparatus());
    assert!(header_visible(&p));
    assert!(p.page.document.select("#mobile-menu-toggle").unwrap().is_empty());
}

#[test]
fn drawer_replaces_header_on_mobile() {
    let p = boot_default(600.0);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Mobile));
    assert!(!header_visible(&p));
    assert!(toggle_visible(&p));

    let texts: Vec<&str> = p.drawer.items().iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["About", "Projects", "Certificates", "Contact"]);
    let doc = &p.page.document;
    let hrefs: Vec<Option<&str>> = p.drawer.drawer_links().iter().map(|&l| doc.attr(l, "href")).collect();
    assert_eq!(hrefs, [Some("#about"), Some("#projects"), Some("#certificates"), Some("#contact")]);

    let heading = first(doc, ".mobile-drawer-title");
    assert_eq!(doc.text_content(heading), "Jane Doe");
}

#[test]
fn breakpoint_keeps_exactly_one_navigation_visible() {
    let mut p = boot_default(1280.0);
    for width in [320.0, 480.0, 481.0, 768.0, 769.0, 1440.0, 500.0] {
        p.resize(width, 800.0);
        p.advance(150);
        let mobile = width <= 768.0;
        assert_eq!(p.drawer.mode() == Some(DrawerMode::Mobile), mobile, "width {}", width);
        assert_ne!(header_visible(&p), toggle_visible(&p), "width {}", width);
        assert_eq!(toggle_visible(&p), mobile, "width {}", width);
        assert!(p.page.document.select("#mobile-drawer").unwrap().len() <= 1);
    }
}

#[test]
fn drawer_resize_is_debounced() {
    let mut p = boot_default(1280.0);
    p.resize(600.0, 800.0);
    p.advance(100);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Desktop));
    p.resize(620.0, 800.0);
    p.advance(100);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Desktop));
    p.advance(50);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Mobile));
}

#[test]
fn drawer_marks_small_screens_without_rebuilding() {
    let mut p = boot_default(600.0);
    let drawer = p.drawer.drawer().unwrap();
    assert!(!p.page.document.has_class(drawer, "small"));

    p.resize(400.0, 800.0);
    p.advance(150);
    assert_eq!(p.drawer.drawer(), Some(drawer));
    assert_eq!(p.drawer.viewport_class(), ViewportClass::SmallMobile);
    assert!(p.page.document.has_class(drawer, "small"));

    p.resize(600.0, 800.0);
    p.advance(150);
    assert!(!p.page.document.has_class(drawer, "small"));
}

#[test]
fn drawer_toggle_and_closers() {
    let mut p = boot_default(600.0);
    let button = p.drawer.button().unwrap();
    let drawer = p.drawer.drawer().unwrap();

    p.click(button);
    assert!(p.drawer.is_open());
    assert!(p.page.is_scroll_locked());
    assert_eq!(p.page.document.style(drawer, "transform"), Some("translateX(0)"));
    assert_eq!(p.page.document.attr(button, "aria-expanded"), Some("true"));

    p.click(button);
    assert!(!p.drawer.is_open());
    assert!(!p.page.is_scroll_locked());

    p.click(button);
    let backdrop = p.drawer.backdrop().unwrap();
    p.click(backdrop);
    assert!(!p.drawer.is_open());

    p.click(button);
    let close = p.drawer.close_button().unwrap();
    p.click(close);
    assert!(!p.drawer.is_open());

    p.click(button);
    let link = p.drawer.drawer_links()[1];
    p.click(link);
    assert!(!p.drawer.is_open());

    p.click(button);
    p.key("Escape", None);
    assert!(!p.drawer.is_open());
    assert_eq!(p.page.document.style(drawer, "transform"), Some("translateX(-100%)"));
}

#[test]
fn drawer_closes_on_upward_swipe() {
    let mut p = boot_default(600.0);
    let button = p.drawer.button().unwrap();
    let drawer = p.drawer.drawer().unwrap();
    p.click(button);

    p.dispatch(UiEvent::TouchStart { target: drawer, y: 300.0 });
    p.dispatch(UiEvent::TouchEnd { target: drawer, y: 270.0 });
    assert!(p.drawer.is_open());

    p.dispatch(UiEvent::TouchStart { target: drawer, y: 300.0 });
    p.dispatch(UiEvent::TouchEnd { target: drawer, y: 200.0 });
    assert!(!p.drawer.is_open());
}

#[test]
fn drawer_ignores_swipes_outside_the_drawer() {
    let mut p = boot_default(600.0);
    let button = p.drawer.button().unwrap();
    p.click(button);
    let about = p.page.document.element_by_id("about").unwrap();
    p.dispatch(UiEvent::TouchStart { target: about, y: 300.0 });
    p.dispatch(UiEvent::TouchEnd { target: about, y: 100.0 });
    assert!(p.drawer.is_open());
}

#[test]
fn drawer_restores_header_on_return_to_desktop() {
    let mut p = boot_default(600.0);
    let button = p.drawer.button().unwrap();
    p.click(button);

    p.resize(1280.0, 800.0);
    p.advance(150);
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Desktop));
    assert!(!p.drawer.is_open());
    assert!(!p.page.is_scroll_locked());
    assert!(!p.page.document.is_connected(button));
    assert!(header_visible(&p));
    let header = first(&p.page.document, "header");
    assert_eq!(p.page.document.style(header, "display"), None);
}

#[test]
fn missing_header_degrades_silently() {
    let html = r##"<html><head><title>Plain</title></head><body>
        <section id="projects"><div id="projects-container"></div></section>
        <section id="certificates"><div id="certificates-container"></div></section>
        </body></html>"##;
    let mut p = boot_page(html, Viewport::new(600.0, 800.0), &SiteConfig::default(), source(&certificates_json(2), PROJECTS));
    assert_eq!(p.drawer.mode(), Some(DrawerMode::Mobile));
    assert!(!p.drawer.has_apparatus());
    assert_eq!(p.certificates.cards().len(), 2);
    p.key("Escape", None);
    p.advance(500);
    assert!(!p.drawer.is_open());
}

#[test]
fn drawer_heading_falls_back_to_document_title_then_menu() {
    let with_title = r##"<html><head><title>Jane's Site</title></head><body>
        <header><a href="#top">Top</a></header><section id="top"></section></body></html>"##;
    let p = boot_page(with_title, Viewport::new(600.0, 800.0), &SiteConfig::default(), source("[]", "[]"));
    let heading = first(&p.page.document, ".mobile-drawer-title");
    assert_eq!(p.page.document.text_content(heading), "Jane's Site");

    let untitled = r##"<html><body><header><a href="#top">Top</a></header><section id="top"></section></body></html>"##;
    let p = boot_page(untitled, Viewport::new(600.0, 800.0), &SiteConfig::default(), source("[]", "[]"));
    let heading = first(&p.page.document, ".mobile-drawer-title");
    assert_eq!(p.page.document.text_content(heading), "Menu");
}

#[test]
fn drawer_carries_buttons_without_href() {
    let html = r##"<html><body><header>
        <a href="#about">About</a>
        <button onclick="toggleTheme()">Theme</button>
        <a href="#empty"> </a>
        </header><section id="about"></section></body></html>"##;
    let p = boot_page(html, Viewport::new(600.0, 800.0), &SiteConfig::default(), source("[]", "[]"));
    assert_eq!(p.drawer.items().len(), 2);
    let doc = &p.page.document;
    let theme = p.drawer.drawer_links()[1];
    assert_eq!(doc.attr(theme, "href"), None);
    assert_eq!(doc.attr(theme, "role"), Some("button"));
    assert_eq!(doc.attr(theme, "onclick"), Some("toggleTheme()"));
}

#[test]
fn overlay_and_drawer_scroll_locks_nest() {
    let mut p = boot_default(600.0);
    let button = p.drawer.button().unwrap();
    p.click(button);
    p.certificates.open(&mut p.page, 0);
    p.certificates.close(&mut p.page);
    assert!(p.page.is_scroll_locked());
    p.drawer.close(&mut p.page);
    assert!(!p.page.is_scroll_locked());
}

// ═══════════════════════════════════════════════════════════
// Data sources & config
// ═══════════════════════════════════════════════════════════

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("folio-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn dir_source_reads_by_file_name_only() {
    let dir = temp_dir("dirsource");
    fs::write(dir.join("certificates.json"), "[]").unwrap();
    let source = DirSource::new(dir.clone());
    assert_eq!(source.fetch("/data/certificates.json").unwrap(), "[]");
    assert_eq!(source.fetch("/data/../../etc/certificates.json").unwrap(), "[]");
    assert_eq!(source.fetch("/data/projects.json"), Err(FetchError::Status(404)));
    assert_eq!(source.fetch("/data/"), Err(FetchError::Status(404)));
}

#[test]
fn http_source_resolves_under_base_path() {
    for base in ["https://example.com/portfolio/", "https://example.com/portfolio"] {
        let source = HttpSource::new(base).unwrap();
        assert_eq!(
            source.resolve("/data/projects.json").unwrap().as_str(),
            "https://example.com/portfolio/data/projects.json"
        );
        assert_eq!(
            source.resolve("data/projects.json").unwrap().as_str(),
            "https://example.com/portfolio/data/projects.json"
        );
    }
    let origin = HttpSource::new("https://example.com").unwrap();
    assert_eq!(
        origin.resolve("/data/projects.json").unwrap().as_str(),
        "https://example.com/data/projects.json"
    );
    assert!(HttpSource::new("not a url").is_err());
}

#[test]
fn memory_source_replays_network_failures() {
    let mut source = MemorySource::new().with("/data/projects.json", 200, "[]");
    source.insert_failure("/data/certificates.json", FetchError::Network("offline".to_string()));
    assert_eq!(source.fetch("/data/projects.json"), Ok("[]".to_string()));
    assert_eq!(
        source.fetch("/data/certificates.json"),
        Err(FetchError::Network("offline".to_string()))
    );
}

#[test]
fn config_partial_toml_keeps_defaults() {
    let config = SiteConfig::from_toml(
        "[site]\nname = \"Jane\"\n\n[certificates]\nmin_card_width = 100\n",
    )
    .unwrap();
    assert_eq!(config.site.name, "Jane");
    assert_eq!(config.site.sections.len(), 4);
    assert_eq!(config.certificates.min_card_width, 100.0);
    assert_eq!(config.certificates.single_card_max_width, 300.0);
    assert_eq!(config.drawer.mobile_breakpoint, 768.0);
    assert_eq!(config.navigator.trigger_offset, 100.0);
    assert!(SiteConfig::from_toml("[site").is_err());
}

#[test]
fn config_missing_file_means_defaults() {
    let dir = temp_dir("config");
    let config = SiteConfig::load_file(&dir.join("absent.toml")).unwrap();
    assert_eq!(config.projects.card_width, 320.0);
}

// ═══════════════════════════════════════════════════════════
// Pre-rendering
// ═══════════════════════════════════════════════════════════

#[test]
fn viewport_width_is_clamped() {
    let config = SiteConfig::default();
    assert_eq!(render::viewport_width(None, &config), 1280.0);
    assert_eq!(render::viewport_width(Some(-5.0), &config), 1280.0);
    assert_eq!(render::viewport_width(Some(f64::NAN), &config), 1280.0);
    assert_eq!(render::viewport_width(Some(375.0), &config), 375.0);
    assert_eq!(render::viewport_width(Some(1e9), &config), render::MAX_RENDER_WIDTH);
}

#[test]
fn prerender_runs_components_over_markup() {
    let config = SiteConfig::default();
    let html = render::prerender(PAGE, &config, source(&certificates_json(2), PROJECTS), 1280.0).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("certificate-card"));
    assert!(html.contains("project-card"));
    assert!(html.contains("data-rendered-width=\"1280\""));
    assert!(!html.contains("mobile-menu-toggle"));

    let reparsed = Document::parse(&html).unwrap();
    let active = reparsed.select("nav a.active").unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(reparsed.attr(active[0], "href"), Some("#about"));
}

#[test]
fn prerender_for_phone_builds_drawer() {
    let config = SiteConfig::default();
    let html = render::prerender(PAGE, &config, source("[]", "[]"), 375.0).unwrap();
    let doc = Document::parse(&html).unwrap();
    let drawer = first(&doc, "#mobile-drawer");
    assert!(doc.has_class(drawer, "small"));
    let header = first(&doc, "header");
    assert!(!doc.is_displayed(header));
}

#[test]
fn prerender_rejects_unbalanced_markup() {
    let config = SiteConfig::default();
    assert!(render::prerender("<html><body><div></body>", &config, source("[]", "[]"), 1280.0).is_err());
}

// ═══════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════

fn client_for(data_dir: PathBuf) -> Client {
    let mut config = SiteConfig::default();
    config.data.dir = data_dir;
    config.data.base_url = None;
    Client::tracked(crate::build_rocket(config)).expect("valid rocket instance")
}

#[test]
fn data_routes_publish_validated_records() {
    let dir = temp_dir("routes-ok");
    fs::write(dir.join("certificates.json"), certificates_json(2)).unwrap();
    fs::write(dir.join("projects.json"), PROJECTS).unwrap();
    let client = client_for(dir);

    let response = client.get("/data/certificates.json").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Cache-Control"),
        Some("no-store, no-cache, must-revalidate, max-age=0")
    );
    let certs: Vec<Certificate> = response.into_json().unwrap();
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[1].issuer, "Issuer 1");

    let projects: Vec<Project> = client.get("/data/projects.json").dispatch().into_json().unwrap();
    assert_eq!(projects.len(), 3);
    assert_eq!(
        projects[1].huggingface.as_deref(),
        Some("https://huggingface.co/spaces/example/summarizer")
    );
}

#[test]
fn data_routes_answer_404_and_500() {
    let dir = temp_dir("routes-bad");
    fs::write(dir.join("projects.json"), r#"[{"title": "", "description": "x"}]"#).unwrap();
    let client = client_for(dir);

    assert_eq!(client.get("/data/certificates.json").dispatch().status(), Status::NotFound);
    assert_eq!(client.get("/data/projects.json").dispatch().status(), Status::InternalServerError);
}

#[test]
fn homepage_loads_driver_and_keeps_header_usable() {
    let client = client_for(temp_dir("routes-home"));
    let response = client.get("/").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("/static/pkg/folio.js"));
    assert!(body.contains("class=\"main-nav\""));
    assert!(!body.contains("mobile-menu-toggle"));
    assert!(!body.contains("display: none"));
}

#[test]
fn site_config_is_published_without_data_dir() {
    let client = client_for(temp_dir("routes-site"));
    let response = client.get("/data/site.json").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let value: serde_json::Value = response.into_json().unwrap();
    assert_eq!(value["drawer"]["mobile_breakpoint"], 768.0);
    assert_eq!(value["certificates"]["data_path"], "/data/certificates.json");
    assert!(value["data"].get("dir").is_none());

    let text = value.to_string();
    let config: SiteConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(config.projects.card_width, 320.0);
}

#[test]
fn snapshot_is_prerendered_for_requested_width() {
    let dir = temp_dir("routes-snapshot");
    fs::write(dir.join("certificates.json"), certificates_json(3)).unwrap();
    fs::write(dir.join("projects.json"), PROJECTS).unwrap();
    let client = client_for(dir);

    let response = client.get("/snapshot?width=600").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("mobile-menu-toggle"));
    assert!(body.contains("Cert 2"));
    assert!(body.contains("Summarizer"));
    assert!(!body.contains("<script"));

    let desktop = client.get("/snapshot").dispatch().into_string().unwrap();
    assert!(!desktop.contains("mobile-menu-toggle"));
    assert!(desktop.contains("data-rendered-width=\"1280\""));
}

#[test]
fn snapshot_shows_inline_errors_without_data() {
    let client = client_for(temp_dir("routes-empty"));
    let body = client.get("/snapshot").dispatch().into_string().unwrap();
    assert!(body.contains("Failed to load certificates. Please try again later."));
    assert!(body.contains("Failed to load projects. Please try again later."));
}

#[test]
fn unknown_page_uses_catcher() {
    let client = client_for(temp_dir("routes-404"));
    let response = client.get("/nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert!(response.into_string().unwrap().contains("Page not found."));
}
