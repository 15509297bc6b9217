//! Page generation.
//!
//! Four presentation strategies turn session state into a render context:
//!
//! 1. **SingleStep**: one page load resolves one character
//! 2. **Staging**: a clean navigation boundary before the encoded page
//! 3. **Batched**: one page packs every position's candidate range
//! 4. **Animated**: one page self-advances through several steps
//!
//! All of them are pure: state and settings in, plain-data context out. The
//! external renderer owns templating; the external server owns delivery.

mod context;
mod stepmap;
mod widths;

pub use context::{
    AnimatedContext, BatchedContext, RenderContext, SingleStepContext, StagingContext,
};
pub use stepmap::{StepMap, STEP_SENTINEL_BASE};
pub use widths::{batched_table, single_step_table, EncodingTable, WidthContainer};

use crate::config::Settings;
use crate::error::Result;
use crate::session::LeakState;

/// Presentation strategy for one generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Resolve one character at the given step
    SingleStep {
        /// Step to resolve
        step: usize,
    },
    /// Navigation boundary before an encoded page
    Staging {
        /// Step the follow-up page will resolve
        step: usize,
    },
    /// Resolve up to `idx_max` positions in one page
    Batched {
        /// Step the page is issued at
        step: usize,
        /// Positions currently meaningful
        idx_max: usize,
    },
    /// Self-advance through `idx_max` steps without reloads
    Animated {
        /// Steps to advance through
        idx_max: usize,
    },
}

/// Build the render context for `mode`.
///
/// Fails with [`crate::Error::StepOutOfRange`] when the requested step or
/// `idx_max` lies beyond the session's step map.
pub fn generate(
    mode: GenerationMode,
    state: &LeakState,
    settings: &Settings,
) -> Result<RenderContext> {
    let alphabet_size = state.setup.alphabet.len();

    match mode {
        GenerationMode::SingleStep { step } => {
            let step_char = state.step_map.escape(step)?;
            let table = single_step_table(alphabet_size);

            Ok(RenderContext::SingleStep(SingleStepContext {
                id: state.id.clone(),
                step,
                step_char,
                html_width: table.html_width,
                font_path: state.font_path.clone(),
                width_containers: table.containers,
                leak_selector: state.setup.selector.clone(),
                host: settings.host.clone(),
                host_leak: settings.host_leak.clone(),
                browser: state.browser,
            }))
        }

        GenerationMode::Staging { step } => Ok(RenderContext::Staging(StagingContext {
            id: state.id.clone(),
            step,
            host: settings.host.clone(),
            browser: state.browser,
        })),

        GenerationMode::Batched { step, idx_max } => {
            let table = batched_table(alphabet_size, state.length);

            Ok(RenderContext::Batched(BatchedContext {
                id: state.id.clone(),
                step,
                idx_max,
                length: state.length,
                html_width: table.html_width,
                width_containers: table.containers,
                leak_selector: state.setup.selector.clone(),
                host: settings.host.clone(),
                host_leak: settings.host_leak.clone(),
                browser: state.browser,
            }))
        }

        GenerationMode::Animated { idx_max } => {
            let step_chars = state.step_map.escapes(idx_max)?;
            let table = single_step_table(alphabet_size);

            Ok(RenderContext::Animated(AnimatedContext {
                id: state.id.clone(),
                idx_max,
                step_chars,
                html_width: table.html_width,
                font_path: state.font_path.clone(),
                width_containers: table.containers,
                leak_selector: state.setup.selector.clone(),
                host: settings.host.clone(),
                host_leak: settings.host_leak.clone(),
                browser: state.browser,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::config::LeakSetup;

    fn test_state() -> LeakState {
        let setup = LeakSetup {
            alphabet: Alphabet::new("ABCD").unwrap(),
            length: 8,
            ..Default::default()
        };
        LeakState::new("s-1", setup, "fonts/probe.woff")
    }

    fn test_settings() -> Settings {
        Settings::new("http://pages.test", "http://beacons.test").unwrap()
    }

    #[test]
    fn test_single_step_context() {
        let state = test_state();
        let ctx = generate(GenerationMode::SingleStep { step: 2 }, &state, &test_settings())
            .unwrap();

        match ctx {
            RenderContext::SingleStep(c) => {
                assert_eq!(c.id, "s-1");
                assert_eq!(c.step, 2);
                assert_eq!(c.step_char, "\\102");
                assert_eq!(c.html_width, 6);
                assert_eq!(c.width_containers.len(), 5);
                assert_eq!(c.host, "http://pages.test");
                assert_eq!(c.host_leak, "http://beacons.test");
            }
            other => panic!("expected single-step context, got {other:?}"),
        }
    }

    #[test]
    fn test_single_step_rejects_exhausted_step() {
        let state = test_state();
        let err = generate(GenerationMode::SingleStep { step: 8 }, &state, &test_settings())
            .unwrap_err();
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_staging_context_carries_identity_only() {
        let state = test_state();
        let ctx =
            generate(GenerationMode::Staging { step: 0 }, &state, &test_settings()).unwrap();

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["mode"], "staging");
        assert_eq!(json["id"], "s-1");
        assert_eq!(json["step"], 0);
        assert_eq!(json["browser"], "all");
        assert!(json.get("width_containers").is_none());
        assert!(json.get("host_leak").is_none());
    }

    #[test]
    fn test_batched_context() {
        let state = test_state();
        let ctx = generate(
            GenerationMode::Batched { step: 0, idx_max: 3 },
            &state,
            &test_settings(),
        )
        .unwrap();

        match ctx {
            RenderContext::Batched(c) => {
                assert_eq!(c.idx_max, 3);
                assert_eq!(c.length, 8);
                assert_eq!(c.html_width, 8 * 5 + 1);
                assert_eq!(c.width_containers.len(), 8 * 5);
                assert!(c.width_containers.iter().all(|w| w.step.is_some()));
            }
            other => panic!("expected batched context, got {other:?}"),
        }
    }

    #[test]
    fn test_animated_context() {
        let state = test_state();
        let ctx = generate(GenerationMode::Animated { idx_max: 3 }, &state, &test_settings())
            .unwrap();

        match ctx {
            RenderContext::Animated(c) => {
                assert_eq!(c.step_chars, vec!["\\100", "\\101", "\\102"]);
                assert_eq!(c.html_width, 6);
            }
            other => panic!("expected animated context, got {other:?}"),
        }
    }

    #[test]
    fn test_animated_rejects_idx_max_beyond_map() {
        let state = test_state();
        let err = generate(GenerationMode::Animated { idx_max: 9 }, &state, &test_settings())
            .unwrap_err();
        assert_eq!(
            err,
            crate::Error::StepOutOfRange { step: 9, max: 8 }
        );
    }

    #[test]
    fn test_context_json_is_tagged() {
        let state = test_state();
        let ctx = generate(GenerationMode::SingleStep { step: 0 }, &state, &test_settings())
            .unwrap();

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["mode"], "single_step");
        assert_eq!(json["width_containers"][0]["width"], 1);
        assert_eq!(json["width_containers"][0]["char_idx"], 4);
    }
}
