use crate::dom::{Document, NodeId};

use super::timer::TimerQueue;
use super::viewport::{ScrollAnimation, Viewport};
use super::UiError;

/// Side effects a handler asks the browser to perform outside the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open `url` in another browsing context.
    OpenUrl { url: String, target: String },
}

/// Everything the components share about the hosting page: the document,
/// the viewport, and the clock. Components own their own subtrees inside
/// the document and never touch each other's.
#[derive(Debug)]
pub struct Page {
    pub document: Document,
    pub viewport: Viewport,
    pub timers: TimerQueue,
    effects: Vec<Effect>,
    default_prevented: bool,
    animation: Option<ScrollAnimation>,
    scroll_moved: bool,
    scroll_locks: u32,
}

impl Page {
    pub fn new(document: Document, viewport: Viewport) -> Self {
        Page {
            document,
            viewport,
            timers: TimerQueue::new(),
            effects: Vec::new(),
            default_prevented: false,
            animation: None,
            scroll_moved: false,
            scroll_locks: 0,
        }
    }

    pub fn body(&self) -> Result<NodeId, UiError> {
        self.document
            .body()
            .ok_or_else(|| UiError::MissingTarget("body".to_string()))
    }

    // ── Event bookkeeping ───────────────────────────────

    pub(crate) fn begin_dispatch(&mut self) {
        self.default_prevented = false;
    }

    /// Cancel the browser's default action for the current event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn open_url(&mut self, url: &str) {
        self.effects.push(Effect::OpenUrl {
            url: url.to_string(),
            target: "_blank".to_string(),
        });
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ── Scrolling ───────────────────────────────────────

    /// Jump without animation.
    pub fn jump_to(&mut self, y: f64) {
        self.animation = None;
        self.set_scroll(y);
    }

    /// Animate from the current position to `y`.
    pub fn animate_to(&mut self, y: f64, duration_ms: u64) {
        let to = y.max(0.0);
        self.animation = Some(ScrollAnimation {
            from: self.viewport.scroll_y,
            to,
            start_ms: self.timers.now(),
            duration_ms,
        });
        self.step_animation(self.timers.now());
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance any running animation to `now`. Returns whether the scroll
    /// position changed.
    pub(crate) fn step_animation(&mut self, now: u64) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let (y, done) = anim.position(now);
        if done {
            self.animation = None;
        }
        let before = self.viewport.scroll_y;
        self.set_scroll(y);
        self.viewport.scroll_y != before
    }

    fn set_scroll(&mut self, y: f64) {
        let y = y.max(0.0);
        if y != self.viewport.scroll_y {
            self.viewport.scroll_y = y;
            self.scroll_moved = true;
        }
    }

    pub(crate) fn take_scroll_moved(&mut self) -> bool {
        std::mem::take(&mut self.scroll_moved)
    }

    /// Suppress page scrolling. Locks nest; the page scrolls again once
    /// every holder has released.
    pub fn lock_scroll(&mut self) {
        self.scroll_locks += 1;
        if let Some(body) = self.document.body() {
            self.document.set_style(body, "overflow", "hidden");
        }
    }

    pub fn unlock_scroll(&mut self) {
        self.scroll_locks = self.scroll_locks.saturating_sub(1);
        if self.scroll_locks == 0 {
            if let Some(body) = self.document.body() {
                self.document.remove_style(body, "overflow");
            }
        }
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locks > 0
    }

    // ── Geometry ────────────────────────────────────────

    /// Document-relative top edge; elements without layout sit at 0.
    pub fn element_top(&self, id: NodeId) -> f64 {
        self.document.layout(id).map(|r| r.top).unwrap_or(0.0)
    }

    /// Inner width available to an element, falling back to the viewport.
    pub fn element_width(&self, id: NodeId) -> f64 {
        self.document
            .layout(id)
            .map(|r| r.width)
            .filter(|w| *w > 0.0)
            .unwrap_or(self.viewport.width)
    }
}
