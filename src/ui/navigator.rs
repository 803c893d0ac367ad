//! Scroll navigator: smooth scrolling for in-page links plus scroll-spy
//! highlighting of the link whose section sits nearest the trigger line.

use log::{info, warn};

use crate::config::NavigatorConfig;
use crate::dom::NodeId;

use super::event::UiEvent;
use super::page::Page;
use super::selectors::SelectorChain;
use super::scroll::{scroll_to_element, ScrollPrimitive};
use super::timer::{TimerId, TimerPurpose};
use super::{Component, UiError};

/// Index of the section whose top edge is closest to `trigger`.
/// The first section wins a tie.
pub fn closest_section(tops: &[f64], trigger: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, top) in tops.iter().enumerate() {
        let distance = (trigger - top).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

pub struct ScrollNavigator {
    config: NavigatorConfig,
    link_selectors: SelectorChain,
    links: Vec<NodeId>,
    sections: Vec<NodeId>,
    active: Option<usize>,
    debounce: Option<TimerId>,
    safety: Option<TimerId>,
    initial: Option<TimerId>,
    post_scroll: Option<TimerId>,
    last_primitive: Option<ScrollPrimitive>,
}

impl ScrollNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        let link_selectors = SelectorChain::new(config.link_selectors.clone());
        ScrollNavigator {
            config,
            link_selectors,
            links: Vec::new(),
            sections: Vec::new(),
            active: None,
            debounce: None,
            safety: None,
            initial: None,
            post_scroll: None,
            last_primitive: None,
        }
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn sections(&self) -> &[NodeId] {
        &self.sections
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Primitive used by the most recent link click.
    pub fn last_primitive(&self) -> Option<ScrollPrimitive> {
        self.last_primitive
    }

    /// Discover links, resolve their targets, and arm the timers.
    pub fn setup(&mut self, page: &mut Page) {
        self.teardown_timers(page);
        self.links.clear();
        self.sections.clear();
        self.active = None;

        let doc = &page.document;
        let Some((chosen, candidates)) = self.link_selectors.first_all(doc, doc.root()) else {
            info!("Scroll navigator: no in-page links found");
            return;
        };

        for link in candidates {
            let href = doc.attr(link, "href").unwrap_or("");
            let fragment = href.trim_start_matches('#');
            match doc.element_by_id(fragment) {
                Some(section) => {
                    self.links.push(link);
                    self.sections.push(section);
                }
                None => warn!("Scroll navigator: no section for link '{}'", href),
            }
        }
        info!(
            "Scroll navigator: {} link(s) via '{}'",
            self.links.len(),
            self.link_selectors.selectors()[chosen]
        );

        self.initial = Some(
            page.timers
                .schedule(self.config.initial_delay_ms, TimerPurpose::NavInitialHighlight),
        );
        self.safety = Some(
            page.timers
                .schedule_interval(self.config.safety_interval_ms, TimerPurpose::NavSafety),
        );
    }

    fn teardown_timers(&mut self, page: &mut Page) {
        for id in [
            self.debounce.take(),
            self.safety.take(),
            self.initial.take(),
            self.post_scroll.take(),
        ]
        .into_iter()
        .flatten()
        {
            page.timers.cancel(id);
        }
    }

    /// Recompute the active section and restyle every link.
    pub fn highlight(&mut self, page: &mut Page) {
        if self.sections.is_empty() {
            return;
        }
        let trigger = page.viewport.scroll_y + self.config.trigger_offset;
        let tops: Vec<f64> = self.sections.iter().map(|&s| page.element_top(s)).collect();
        self.active = closest_section(&tops, trigger);

        let doc = &mut page.document;
        for (i, &link) in self.links.iter().enumerate() {
            if Some(i) == self.active {
                doc.set_style(link, "opacity", &self.config.active_opacity);
                doc.set_style(link, "border-bottom", &self.config.active_border);
                doc.add_class(link, "active");
            } else {
                doc.set_style(link, "opacity", &self.config.inactive_opacity);
                doc.set_style(link, "border-bottom", "none");
                doc.remove_class(link, "active");
            }
        }
    }

    fn on_click(&mut self, page: &mut Page, target: NodeId) {
        let Some(index) = self
            .links
            .iter()
            .position(|&link| page.document.contains(link, target))
        else {
            return;
        };
        page.prevent_default();

        let primitive = scroll_to_element(
            page,
            self.sections[index],
            self.config.header_offset,
            self.config.smooth_scroll_ms,
        );
        self.last_primitive = Some(primitive);

        let delay = if primitive.is_native() {
            self.config.post_scroll_delay_ms
        } else {
            self.config.fallback_post_scroll_delay_ms
        };
        if let Some(old) = self.post_scroll.take() {
            page.timers.cancel(old);
        }
        self.post_scroll = Some(page.timers.schedule(delay, TimerPurpose::NavPostScroll));
    }

    fn on_scroll(&mut self, page: &mut Page) {
        if let Some(old) = self.debounce.take() {
            page.timers.cancel(old);
        }
        self.debounce = Some(
            page.timers
                .schedule(self.config.scroll_debounce_ms, TimerPurpose::NavScrollDebounce),
        );
    }

    fn on_timer(&mut self, page: &mut Page, id: TimerId) {
        let slot = if self.debounce == Some(id) {
            &mut self.debounce
        } else if self.initial == Some(id) {
            &mut self.initial
        } else if self.post_scroll == Some(id) {
            &mut self.post_scroll
        } else if self.safety == Some(id) {
            // interval timers stay armed
            self.highlight(page);
            return;
        } else {
            return;
        };
        *slot = None;
        self.highlight(page);
    }
}

impl Component for ScrollNavigator {
    fn name(&self) -> &'static str {
        "scroll-navigator"
    }

    fn handle(&mut self, page: &mut Page, event: &UiEvent) -> Result<(), UiError> {
        match event {
            UiEvent::Load => self.setup(page),
            UiEvent::Click { target } => self.on_click(page, *target),
            UiEvent::Scroll => self.on_scroll(page),
            UiEvent::Timer { id, .. } => self.on_timer(page, *id),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_section_prefers_smallest_distance() {
        let tops = [0.0, 600.0, 1200.0];
        assert_eq!(closest_section(&tops, 100.0), Some(0));
        assert_eq!(closest_section(&tops, 700.0), Some(1));
        assert_eq!(closest_section(&tops, 5000.0), Some(2));
    }

    #[test]
    fn test_closest_section_first_on_tie() {
        assert_eq!(closest_section(&[0.0, 200.0], 100.0), Some(0));
        assert_eq!(closest_section(&[300.0, 300.0], 0.0), Some(0));
        assert_eq!(closest_section(&[], 100.0), None);
    }
}
