use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the site configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "folio.toml";

#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

// ── Sections ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub data: DataSection,
    pub navigator: NavigatorConfig,
    pub certificates: CertificateConfig,
    pub projects: ProjectConfig,
    pub drawer: DrawerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub tagline: String,
    /// Viewport width used to pre-render when the request gives none.
    pub default_width: f64,
    pub default_height: f64,
    /// Page sections listed in the header navigation, as (id, label).
    pub sections: Vec<SectionLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionLink {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory holding `certificates.json` and `projects.json`.
    /// Server-side only; never sent to the browser.
    #[serde(skip_serializing)]
    pub dir: PathBuf,
    /// When set, data is fetched over HTTP relative to this origin instead.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Link discovery selectors, broadest last. First selector with a hit wins.
    pub link_selectors: Vec<String>,
    /// Distance below the scroll position used to pick the active section.
    pub trigger_offset: f64,
    /// Space left above a section after a smooth scroll (fixed header height).
    pub header_offset: f64,
    pub scroll_debounce_ms: u64,
    pub safety_interval_ms: u64,
    pub initial_delay_ms: u64,
    pub post_scroll_delay_ms: u64,
    pub fallback_post_scroll_delay_ms: u64,
    pub smooth_scroll_ms: u64,
    pub active_opacity: String,
    pub inactive_opacity: String,
    pub active_border: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    pub data_path: String,
    pub container_id: String,
    /// Element the overflow indicator is inserted in front of.
    pub anchor_id: String,
    pub padding: f64,
    pub gap: f64,
    pub min_card_width: f64,
    pub single_card_max_width: f64,
    pub compact_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub data_path: String,
    pub container_id: String,
    pub card_width: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerConfig {
    pub mobile_breakpoint: f64,
    pub small_breakpoint: f64,
    pub header_selectors: Vec<String>,
    pub title_selectors: Vec<String>,
    pub transition_ms: u64,
    pub resize_debounce_ms: u64,
    pub swipe_threshold: f64,
}

// ── Defaults ──────────────────────────────────────────

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site: SiteSection::default(),
            data: DataSection::default(),
            navigator: NavigatorConfig::default(),
            certificates: CertificateConfig::default(),
            projects: ProjectConfig::default(),
            drawer: DrawerConfig::default(),
        }
    }
}

impl Default for SiteSection {
    fn default() -> Self {
        let section = |id: &str, label: &str| SectionLink {
            id: id.to_string(),
            label: label.to_string(),
        };
        SiteSection {
            name: "Portfolio".to_string(),
            tagline: String::new(),
            default_width: 1280.0,
            default_height: 800.0,
            sections: vec![
                section("about", "About"),
                section("projects", "Projects"),
                section("certificates", "Certificates"),
                section("contact", "Contact"),
            ],
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        DataSection {
            dir: PathBuf::from("website/data"),
            base_url: None,
        }
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        NavigatorConfig {
            link_selectors: vec![
                "nav a[href^=\"#\"]".to_string(),
                "header a[href^=\"#\"]".to_string(),
                "a[href^=\"#\"]".to_string(),
            ],
            trigger_offset: 100.0,
            header_offset: 0.0,
            scroll_debounce_ms: 16,
            safety_interval_ms: 100,
            initial_delay_ms: 100,
            post_scroll_delay_ms: 150,
            fallback_post_scroll_delay_ms: 800,
            smooth_scroll_ms: 500,
            active_opacity: "1".to_string(),
            inactive_opacity: "0.6".to_string(),
            active_border: "2px solid currentColor".to_string(),
        }
    }
}

impl Default for CertificateConfig {
    fn default() -> Self {
        CertificateConfig {
            data_path: "/data/certificates.json".to_string(),
            container_id: "certificates-container".to_string(),
            anchor_id: "contact".to_string(),
            padding: 24.0,
            gap: 16.0,
            min_card_width: 120.0,
            single_card_max_width: 300.0,
            compact_threshold: 160.0,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            data_path: "/data/projects.json".to_string(),
            container_id: "projects-container".to_string(),
            card_width: 320.0,
        }
    }
}

impl Default for DrawerConfig {
    fn default() -> Self {
        DrawerConfig {
            mobile_breakpoint: 768.0,
            small_breakpoint: 480.0,
            header_selectors: vec![
                "header".to_string(),
                ".header".to_string(),
                "#header".to_string(),
                "nav".to_string(),
                ".navbar".to_string(),
                ".nav-container".to_string(),
            ],
            title_selectors: vec![".site-title".to_string(), ".logo".to_string()],
            transition_ms: 300,
            resize_debounce_ms: 150,
            swipe_threshold: 50.0,
        }
    }
}

// ── Loading ───────────────────────────────────────────

impl SiteConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError(format!("invalid site config: {}", e)))
    }

    /// Load from `FOLIO_CONFIG` (or `folio.toml`), then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FOLIO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_file(Path::new(&path))?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("{} not found, using default site config", path.display());
            return Ok(Self::default());
        }
        let source = fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&source)?;
        info!("Loaded site config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("FOLIO_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data.dir = PathBuf::from(dir);
            }
        }
        if let Ok(url) = std::env::var("FOLIO_DATA_URL") {
            if !url.trim().is_empty() {
                self.data.base_url = Some(url);
            }
        }
    }
}
