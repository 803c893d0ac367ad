use std::sync::Arc;

use log::{info, warn};
use serde_json::{json, Value};

use folio::config::SiteConfig;
use folio::dom::html::ParseError;
use folio::dom::Document;
use folio::fetch::{DataSource, DirSource, HttpSource};
use folio::ui::{Page, Portfolio, Viewport};

/// Widest viewport a request may ask to be rendered for.
pub const MAX_RENDER_WIDTH: f64 = 7680.0;

/// Data source shared by every pre-render.
pub struct SharedSource(pub Arc<dyn DataSource>);

/// Remote origin when `data.base_url` is set, otherwise the data directory.
pub fn data_source(config: &SiteConfig) -> Arc<dyn DataSource> {
    if let Some(base) = config.data.base_url.as_deref() {
        match HttpSource::new(base) {
            Ok(source) => {
                info!("Page data will be fetched from {}", base);
                return Arc::new(source);
            }
            Err(e) => warn!("Ignoring data base URL: {}", e),
        }
    }
    Arc::new(DirSource::new(config.data.dir.clone()))
}

/// Values the host template is rendered with. `interactive` pages load the
/// browser driver.
pub fn host_context(config: &SiteConfig, interactive: bool) -> Value {
    json!({
        "site": {
            "name": config.site.name,
            "tagline": config.site.tagline,
            "sections": config.site.sections,
        },
        "year": chrono::Utc::now().format("%Y").to_string(),
        "interactive": interactive,
    })
}

/// Clamp a requested viewport width, falling back to the configured default.
pub fn viewport_width(requested: Option<f64>, config: &SiteConfig) -> f64 {
    requested
        .filter(|w| w.is_finite() && *w > 0.0)
        .map(|w| w.min(MAX_RENDER_WIDTH))
        .unwrap_or(config.site.default_width)
}

/// Run the page components over `markup` for a viewport `width` wide and
/// return the resulting HTML. The clock is advanced far enough for the
/// initial navigation highlight to land.
pub fn prerender(
    markup: &str,
    config: &SiteConfig,
    source: Arc<dyn DataSource>,
    width: f64,
) -> Result<String, ParseError> {
    let document = Document::parse(markup)?;
    let page = Page::new(document, Viewport::new(width, config.site.default_height));
    let mut portfolio = Portfolio::boot(page, config, source);
    portfolio.advance(config.navigator.initial_delay_ms);

    let doc = &mut portfolio.page.document;
    if let Some(body) = doc.body() {
        doc.set_attr(body, "data-rendered-width", &width.round().to_string());
    }
    Ok(doc.to_html())
}
