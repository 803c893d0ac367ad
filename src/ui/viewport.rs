use crate::config::DrawerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Desktop,
    Mobile,
    SmallMobile,
}

impl ViewportClass {
    pub fn classify(width: f64, config: &DrawerConfig) -> Self {
        if width <= config.small_breakpoint {
            ViewportClass::SmallMobile
        } else if width <= config.mobile_breakpoint {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        !matches!(self, ViewportClass::Desktop)
    }
}

/// Whether a browser primitive can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Supported,
    Missing,
    /// Present, but raises when called.
    Faulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCapabilities {
    /// Element-level smooth scrolling (`scrollIntoView` with behavior).
    pub smooth_scroll: Capability,
    /// Bounding client rectangles.
    pub bounding_rect: Capability,
    /// Layout-flow offsets (`offsetTop`).
    pub offset_top: Capability,
}

impl Default for ScrollCapabilities {
    fn default() -> Self {
        ScrollCapabilities {
            smooth_scroll: Capability::Supported,
            bounding_rect: Capability::Supported,
            offset_top: Capability::Supported,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
    pub capabilities: ScrollCapabilities,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport {
            width,
            height,
            scroll_y: 0.0,
            capabilities: ScrollCapabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: ScrollCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// An in-flight animated scroll, advanced by the page clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    pub from: f64,
    pub to: f64,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl ScrollAnimation {
    /// Position at `now` with ease-in-out, and whether the animation is done.
    pub fn position(&self, now: u64) -> (f64, bool) {
        let elapsed = now.saturating_sub(self.start_ms);
        if self.duration_ms == 0 || elapsed >= self.duration_ms {
            return (self.to, true);
        }
        let t = elapsed as f64 / self.duration_ms as f64;
        let eased = if t < 0.5 {
            2.0 * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
        };
        (self.from + (self.to - self.from) * eased, false)
    }
}
