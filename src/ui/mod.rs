//! Headless page components and the dispatcher that drives them.
//!
//! Every component owns its state and its own subtree of the page; the
//! dispatcher hands each typed event to each component in turn and keeps a
//! failure in one from reaching the others.

pub mod certificates;
pub mod drawer;
pub mod event;
pub mod gallery;
pub mod navigator;
pub mod overlay;
pub mod page;
pub mod selectors;
pub mod projects;
pub mod scroll;
pub mod timer;
pub mod viewport;

use std::sync::Arc;

use log::error;

use crate::config::SiteConfig;
use crate::dom::{NodeId, SelectorError};
use crate::fetch::{DataSource, FetchError};

pub use certificates::CertificateGallery;
pub use drawer::MobileDrawer;
pub use event::{Key, UiEvent};
pub use navigator::ScrollNavigator;
pub use page::{Effect, Page};
pub use projects::ProjectGallery;
pub use viewport::Viewport;

#[derive(Debug)]
pub enum UiError {
    /// An element the component needs is not on the page.
    MissingTarget(String),
    Selector(SelectorError),
    Fetch(FetchError),
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiError::MissingTarget(what) => write!(f, "{} not found", what),
            UiError::Selector(e) => write!(f, "{}", e),
            UiError::Fetch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UiError {}

impl From<SelectorError> for UiError {
    fn from(e: SelectorError) -> Self {
        UiError::Selector(e)
    }
}

impl From<FetchError> for UiError {
    fn from(e: FetchError) -> Self {
        UiError::Fetch(e)
    }
}

/// A self-contained interactive widget on the page.
pub trait Component {
    fn name(&self) -> &'static str;

    /// React to one event. Errors are reported by the dispatcher and do not
    /// stop other components from seeing the event.
    fn handle(&mut self, page: &mut Page, event: &UiEvent) -> Result<(), UiError>;
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub default_prevented: bool,
}

/// The page and its four components, owned by whoever booted them.
pub struct Portfolio {
    pub page: Page,
    pub navigator: ScrollNavigator,
    pub certificates: CertificateGallery,
    pub drawer: MobileDrawer,
    pub projects: ProjectGallery,
}

impl Portfolio {
    /// Build the components from `config`, attach them to `page`, and
    /// deliver the load event.
    pub fn boot(page: Page, config: &SiteConfig, source: Arc<dyn DataSource>) -> Self {
        let mut portfolio = Portfolio {
            page,
            navigator: ScrollNavigator::new(config.navigator.clone()),
            certificates: CertificateGallery::new(config.certificates.clone(), source.clone()),
            drawer: MobileDrawer::new(config.drawer.clone()),
            projects: ProjectGallery::new(config.projects.clone(), source),
        };
        portfolio.dispatch(UiEvent::Load);
        portfolio
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Dispatch {
        if let UiEvent::Resize { width, height } = event {
            self.page.viewport.width = width;
            self.page.viewport.height = height;
        }
        self.page.begin_dispatch();

        let Portfolio {
            page,
            navigator,
            certificates,
            drawer,
            projects,
        } = self;
        let components: [&mut dyn Component; 4] = [navigator, certificates, drawer, projects];
        for component in components {
            if let Err(e) = component.handle(page, &event) {
                error!("{}: {}", component.name(), e);
            }
        }

        let outcome = Dispatch {
            default_prevented: self.page.default_prevented(),
        };
        if self.page.take_scroll_moved() {
            self.dispatch(UiEvent::Scroll);
        }
        outcome
    }

    // ── Convenience drivers ─────────────────────────────

    pub fn click(&mut self, target: NodeId) -> Dispatch {
        self.dispatch(UiEvent::Click { target })
    }

    pub fn key(&mut self, name: &str, target: Option<NodeId>) -> Dispatch {
        self.dispatch(UiEvent::Key {
            key: Key::from_name(name),
            target,
        })
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Dispatch {
        self.dispatch(UiEvent::Resize { width, height })
    }

    /// The user scrolled to `y`.
    pub fn scroll_to(&mut self, y: f64) -> Dispatch {
        self.page.jump_to(y);
        self.page.take_scroll_moved();
        self.dispatch(UiEvent::Scroll)
    }

    /// Let `ms` milliseconds pass: animations progress and due timers fire
    /// in order.
    pub fn advance(&mut self, ms: u64) {
        let target = self.page.timers.now() + ms;
        loop {
            let step = self
                .page
                .timers
                .next_due()
                .filter(|&due| due <= target)
                .unwrap_or(target);
            self.page.timers.set_now(step);
            if self.page.step_animation(step) {
                self.page.take_scroll_moved();
                self.dispatch(UiEvent::Scroll);
            }
            match self.page.timers.pop_due(target) {
                Some((id, purpose)) => {
                    self.dispatch(UiEvent::Timer { id, purpose });
                }
                None => {
                    self.page.timers.set_now(target);
                    break;
                }
            }
        }
    }
}
