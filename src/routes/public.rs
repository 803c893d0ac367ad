use std::sync::Arc;

use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::State;
use rocket_dyn_templates::{Metadata, Template};

use folio::config::SiteConfig;

use crate::render::{self, SharedSource};

// ── Homepage ───────────────────────────────────────────

/// The live portfolio page. The browser driver runs the components once the
/// page has loaded; without it the header navigation still works.
#[get("/")]
pub fn homepage(config: &State<SiteConfig>) -> Template {
    Template::render("index", render::host_context(config, true))
}

// ── Snapshot ───────────────────────────────────────────

/// The page with every component already run for a viewport `width` pixels
/// wide. Static: it carries no driver script.
#[get("/snapshot?<width>")]
pub async fn snapshot(
    templates: Metadata<'_>,
    config: &State<SiteConfig>,
    source: &State<SharedSource>,
    width: Option<f64>,
) -> Result<RawHtml<String>, Status> {
    let context = render::host_context(config, false);
    let (_, markup) = templates.render("index", context).ok_or_else(|| {
        log::error!("Template 'index' failed to render");
        Status::InternalServerError
    })?;

    let width = render::viewport_width(width, config);
    let config = config.inner().clone();
    let source = Arc::clone(&source.0);
    let page = rocket::tokio::task::spawn_blocking(move || {
        render::prerender(&markup, &config, source, width)
    })
    .await
    .map_err(|e| {
        log::error!("Page render task failed: {}", e);
        Status::InternalServerError
    })?;

    page.map(RawHtml).map_err(|e| {
        log::error!("Host template is not well-formed: {}", e);
        Status::InternalServerError
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![homepage, snapshot]
}
