use log::{debug, warn};

use crate::dom::NodeId;

use super::page::Page;
use super::viewport::Capability;

/// Ways of getting a section into view, most capable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPrimitive {
    /// Element-level smooth scroll.
    NativeSmooth,
    /// Window scroll to an offset computed from the bounding box.
    BoundingRect,
    /// Window scroll to an offset computed from the layout-flow offset.
    OffsetTop,
    /// Immediate jump; always available.
    InstantJump,
}

pub const SCROLL_CHAIN: [ScrollPrimitive; 4] = [
    ScrollPrimitive::NativeSmooth,
    ScrollPrimitive::BoundingRect,
    ScrollPrimitive::OffsetTop,
    ScrollPrimitive::InstantJump,
];

impl ScrollPrimitive {
    /// Whether completion is observable; fallbacks get a longer settle delay.
    pub fn is_native(self) -> bool {
        self == ScrollPrimitive::NativeSmooth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Unavailable,
    Threw,
}

fn check(cap: Capability) -> Result<(), Failure> {
    match cap {
        Capability::Supported => Ok(()),
        Capability::Missing => Err(Failure::Unavailable),
        Capability::Faulty => Err(Failure::Threw),
    }
}

fn attempt(
    page: &mut Page,
    primitive: ScrollPrimitive,
    target: NodeId,
    header_offset: f64,
    duration_ms: u64,
) -> Result<(), Failure> {
    let caps = page.viewport.capabilities;
    match primitive {
        ScrollPrimitive::NativeSmooth => {
            check(caps.smooth_scroll)?;
            let dest = page.element_top(target) - header_offset;
            page.animate_to(dest, duration_ms);
        }
        ScrollPrimitive::BoundingRect => {
            check(caps.bounding_rect)?;
            let client_top = page.element_top(target) - page.viewport.scroll_y;
            let dest = client_top + page.viewport.scroll_y - header_offset;
            page.animate_to(dest, duration_ms);
        }
        ScrollPrimitive::OffsetTop => {
            check(caps.offset_top)?;
            let dest = page.element_top(target) - header_offset;
            page.animate_to(dest, duration_ms);
        }
        ScrollPrimitive::InstantJump => {
            let dest = page.element_top(target) - header_offset;
            page.jump_to(dest);
        }
    }
    Ok(())
}

/// Scroll `target` to the top of the viewport (less `header_offset`) with
/// the first primitive that works. Failures never escape the chain.
pub fn scroll_to_element(
    page: &mut Page,
    target: NodeId,
    header_offset: f64,
    duration_ms: u64,
) -> ScrollPrimitive {
    for primitive in SCROLL_CHAIN {
        match attempt(page, primitive, target, header_offset, duration_ms) {
            Ok(()) => return primitive,
            Err(Failure::Unavailable) => debug!("{:?} unavailable, falling back", primitive),
            Err(Failure::Threw) => warn!("{:?} failed, falling back", primitive),
        }
    }
    ScrollPrimitive::InstantJump
}
