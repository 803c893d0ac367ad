use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use folio::config::SiteConfig;

/// Required directories that will be created if missing
const REQUIRED_DIRS: &[&str] = &[
    "website",
    "website/static",
    "website/static/css",
    "website/templates",
];

/// Critical template files: the homepage cannot render without these
const CRITICAL_TEMPLATES: &[&str] = &["website/templates/index.html.tera"];

/// Static assets the page needs, with what goes missing without them
const STATIC_ASSETS: &[(&str, &str)] = &[
    ("website/static/css/site.css", "page will be unstyled"),
    ("website/static/pkg/folio.js", "page components will not run in the browser"),
];

/// Data files the page components fetch
const DATA_FILES: &[&str] = &["certificates.json", "projects.json"];

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, warns about missing files, and
/// aborts if critical dependencies are absent.
pub fn run(config: &SiteConfig) {
    info!("Folio boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    let data_dir = config.data.dir.to_string_lossy().to_string();
    for dir in REQUIRED_DIRS.iter().copied().chain([data_dir.as_str()]) {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            error!("  MISSING critical template: {}", file);
            errors += 1;
        }
    }

    // ── 3. Static assets ───────────────────────────────
    for (file, consequence) in STATIC_ASSETS {
        if !Path::new(file).exists() {
            warn!("  Missing static asset: {} ({})", file, consequence);
            warnings += 1;
        }
    }

    // ── 4. Data files ──────────────────────────────────
    if let Some(base) = config.data.base_url.as_deref() {
        info!("  Page data comes from {}", base);
    } else {
        for name in DATA_FILES {
            if !config.data.dir.join(name).exists() {
                warn!(
                    "  Missing data file: {} (its section will show a load error)",
                    config.data.dir.join(name).display()
                );
                warnings += 1;
            }
        }
    }

    // ── 5. Rocket.toml exists ───────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found, using default config");
        warnings += 1;
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some sections may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}
