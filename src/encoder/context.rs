//! Render contexts handed to the external template collaborator.
//!
//! The engine computes tables and sentinels; turning them into HTML/CSS text
//! is the renderer's job. Each generation mode produces one plain-data
//! context with everything the templates need and nothing else.

use serde::Serialize;

use crate::config::Browser;

use super::widths::WidthContainer;

/// Context for a page resolving one character at one step.
#[derive(Debug, Clone, Serialize)]
pub struct SingleStepContext {
    /// Session identity
    pub id: String,
    /// Step this page resolves
    pub step: usize,
    /// Sentinel escape for this step's selector rules
    pub step_char: String,
    /// Width the page body is laid out at
    pub html_width: usize,
    /// Path of the probe font served to this session
    pub font_path: String,
    /// Candidate containers in increasing width order
    pub width_containers: Vec<WidthContainer>,
    /// CSS selector for the target element
    pub leak_selector: String,
    /// Base URL serving generated pages
    pub host: String,
    /// Base URL receiving leak beacons
    pub host_leak: String,
    /// Browser compatibility target
    pub browser: Browser,
}

/// Context for the clean navigation boundary placed before an encoded page.
///
/// Carries identity only; the staging page has no encoding content.
#[derive(Debug, Clone, Serialize)]
pub struct StagingContext {
    /// Session identity
    pub id: String,
    /// Step the follow-up page will resolve
    pub step: usize,
    /// Base URL serving generated pages
    pub host: String,
    /// Browser compatibility target
    pub browser: Browser,
}

/// Context for a page resolving many positions at once.
#[derive(Debug, Clone, Serialize)]
pub struct BatchedContext {
    /// Session identity
    pub id: String,
    /// Step the page was issued at
    pub step: usize,
    /// Number of positions currently meaningful; blocks beyond this are
    /// padding and observers must ignore them
    pub idx_max: usize,
    /// Total positions the page addresses
    pub length: usize,
    /// Width the page body is laid out at
    pub html_width: usize,
    /// Candidate containers in increasing width order
    pub width_containers: Vec<WidthContainer>,
    /// CSS selector for the target element
    pub leak_selector: String,
    /// Base URL serving generated pages
    pub host: String,
    /// Base URL receiving leak beacons
    pub host_leak: String,
    /// Browser compatibility target
    pub browser: Browser,
}

/// Context for a page that self-advances through steps without reloads.
#[derive(Debug, Clone, Serialize)]
pub struct AnimatedContext {
    /// Session identity
    pub id: String,
    /// Number of steps the page advances through
    pub idx_max: usize,
    /// Sentinel escapes for steps `0..idx_max`
    pub step_chars: Vec<String>,
    /// Width the page body is laid out at
    pub html_width: usize,
    /// Path of the probe font served to this session
    pub font_path: String,
    /// Candidate containers in increasing width order
    pub width_containers: Vec<WidthContainer>,
    /// CSS selector for the target element
    pub leak_selector: String,
    /// Base URL serving generated pages
    pub host: String,
    /// Base URL receiving leak beacons
    pub host_leak: String,
    /// Browser compatibility target
    pub browser: Browser,
}

/// Tagged union over the four page kinds, one per generation mode.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderContext {
    /// One character per page load
    SingleStep(SingleStepContext),
    /// Navigation boundary, no encoding content
    Staging(StagingContext),
    /// Many positions in one page
    Batched(BatchedContext),
    /// Self-advancing multi-step page
    Animated(AnimatedContext),
}

impl RenderContext {
    /// Session id the context was generated for.
    pub fn id(&self) -> &str {
        match self {
            RenderContext::SingleStep(c) => &c.id,
            RenderContext::Staging(c) => &c.id,
            RenderContext::Batched(c) => &c.id,
            RenderContext::Animated(c) => &c.id,
        }
    }
}
