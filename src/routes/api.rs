use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;

use folio::config::SiteConfig;
use folio::fetch::{DataSource, DirSource, FetchError};
use folio::models::{parse_records, Certificate, Project, Record};

// ── Data files ─────────────────────────────────────────

/// Read `name` from the data directory and check every record before it is
/// published. A missing file is a 404; a file that breaks the schema is a 500
/// so the page components show their inline error.
fn publish<T: Record + Serialize>(config: &SiteConfig, name: &str) -> Result<Json<Vec<T>>, Status> {
    let source = DirSource::new(config.data.dir.clone());
    let body = source.fetch(name).map_err(|e| match e {
        FetchError::Status(code) => Status::from_code(code).unwrap_or(Status::NotFound),
        other => {
            log::error!("Cannot read {} data: {}", T::KIND, other);
            Status::InternalServerError
        }
    })?;
    parse_records::<T>(&body).map(Json).map_err(|e| {
        log::error!("Refusing to publish {}: {}", name, e);
        Status::InternalServerError
    })
}

#[get("/certificates.json")]
pub fn certificates(config: &State<SiteConfig>) -> Result<Json<Vec<Certificate>>, Status> {
    publish(config, "certificates.json")
}

#[get("/projects.json")]
pub fn projects(config: &State<SiteConfig>) -> Result<Json<Vec<Project>>, Status> {
    publish(config, "projects.json")
}

// ── Browser configuration ──────────────────────────────

/// Component settings for the browser driver. The data directory is left
/// out; everything else is sent as loaded.
#[get("/site.json")]
pub fn site(config: &State<SiteConfig>) -> Json<SiteConfig> {
    Json(config.inner().clone())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![certificates, projects, site]
}
