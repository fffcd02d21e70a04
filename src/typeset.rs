//! Seam to the external typesetting engine.
//!
//! Typeset rendering is a collaborator, not something this crate implements:
//! the trait mirrors the engine's contract (fire-and-forget typesetting,
//! post-settle measurement, resizing). Render failures are logged and worked
//! around, never propagated: a symbol that fails to typeset falls back to
//! its unicode text before giving up entirely.

use std::collections::HashMap;

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedSize {
    pub width: f64,
    pub height: f64,
}

/// Contract for the typesetting collaborator.
pub trait Typesetter {
    /// Replaces the markup rendered under `selector`. Fire-and-forget; the
    /// implementation logs failures instead of reporting them.
    fn typeset(&mut self, selector: &str, markup: &str);

    /// Size of the rendered element. Only meaningful once the corresponding
    /// `typeset` call has settled; `None` means rendering failed.
    fn measure(&self, selector: &str) -> Option<RenderedSize>;

    /// Rescales the rendered element to the target size. No-op when the
    /// target is not positive.
    fn resize(&mut self, selector: &str, target: f64);
}

/// Renders a symbol, falling back to its unicode text when the typeset
/// markup does not produce a measurable element. Never fails; complete
/// failure is only logged.
pub fn render_symbol<T: Typesetter>(engine: &mut T, selector: &str, markup: &str, unicode: &str) {
    engine.typeset(selector, markup);
    if engine.measure(selector).is_some() {
        return;
    }
    warn!(selector, markup, "typeset failed, falling back to unicode");
    engine.typeset(selector, unicode);
    if engine.measure(selector).is_none() {
        error!(selector, unicode, "typeset fallback failed as well");
    }
}

/// Plain-text stand-in for the typesetting engine used by native builds:
/// "rendering" stores the text and sizes it from its character count.
#[derive(Default)]
pub struct TextTypesetter {
    rendered: HashMap<String, (String, f64)>,
}

impl TextTypesetter {
    const BASE_FONT_PX: f64 = 16.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently rendered under `selector`, if any.
    pub fn text(&self, selector: &str) -> Option<&str> {
        self.rendered.get(selector).map(|(text, _)| text.as_str())
    }

    pub fn font_size(&self, selector: &str) -> Option<f64> {
        self.rendered.get(selector).map(|&(_, size)| size)
    }
}

impl Typesetter for TextTypesetter {
    fn typeset(&mut self, selector: &str, markup: &str) {
        if markup.is_empty() {
            // Nothing renderable; leave the slot unset so measure() reports
            // the failure.
            self.rendered.remove(selector);
            return;
        }
        self.rendered
            .insert(selector.to_string(), (markup.to_string(), Self::BASE_FONT_PX));
    }

    fn measure(&self, selector: &str) -> Option<RenderedSize> {
        let (text, font_size) = self.rendered.get(selector)?;
        Some(RenderedSize {
            width: font_size * text.chars().count() as f64,
            height: *font_size,
        })
    }

    fn resize(&mut self, selector: &str, target: f64) {
        if target <= 0.0 {
            return;
        }
        let Some((text, font_size)) = self.rendered.get_mut(selector) else {
            warn!(selector, "cannot resize an element that was never typeset");
            return;
        };
        let chars = text.chars().count().max(1) as f64;
        let max_dim = (*font_size * chars).max(*font_size);
        *font_size = (*font_size * target / max_dim).round();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typeset_then_measure() {
        let mut engine = TextTypesetter::new();
        engine.typeset("#cell-0", "\\sum");
        let size = engine.measure("#cell-0").unwrap();
        assert_eq!(size.width, 16.0 * 4.0);
        assert_eq!(size.height, 16.0);
    }

    #[test]
    fn test_measure_before_typeset_fails() {
        let engine = TextTypesetter::new();
        assert!(engine.measure("#nowhere").is_none());
    }

    #[test]
    fn test_resize_ignores_non_positive_target() {
        let mut engine = TextTypesetter::new();
        engine.typeset("#cell-0", "x");
        let before = engine.font_size("#cell-0").unwrap();
        engine.resize("#cell-0", 0.0);
        engine.resize("#cell-0", -4.0);
        assert_eq!(engine.font_size("#cell-0").unwrap(), before);
    }

    #[test]
    fn test_resize_scales_font() {
        let mut engine = TextTypesetter::new();
        engine.typeset("#cell-0", "ab");
        engine.resize("#cell-0", 64.0);
        // max dimension is 32 px wide at base size, scaled towards 64.
        assert_eq!(engine.font_size("#cell-0").unwrap(), 32.0);
    }

    #[test]
    fn test_render_symbol_falls_back_to_unicode() {
        let mut engine = TextTypesetter::new();
        // Empty markup does not render, so the unicode text must win.
        render_symbol(&mut engine, "#cell-1", "", "U+2211");
        assert_eq!(engine.text("#cell-1"), Some("U+2211"));
    }

    #[test]
    fn test_render_symbol_prefers_markup() {
        let mut engine = TextTypesetter::new();
        render_symbol(&mut engine, "#cell-1", "\\sum", "U+2211");
        assert_eq!(engine.text("#cell-1"), Some("\\sum"));
    }

    #[test]
    fn test_render_symbol_total_failure_is_silent() {
        let mut engine = TextTypesetter::new();
        // Both representations empty: logged, not panicked or propagated.
        render_symbol(&mut engine, "#cell-2", "", "");
        assert!(engine.measure("#cell-2").is_none());
    }
}
