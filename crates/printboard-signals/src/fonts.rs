//! Indirect font detection by text metrics.
//!
//! A font counts as installed when rendering the probe string with
//! `"<font>", <fallback>` produces a box that differs from the fallback's
//! baseline for at least one fallback family. A font that metrically matches
//! every fallback is a false negative.

use std::collections::HashMap;

pub const FALLBACK_FAMILIES: &[&str] = &["monospace", "sans-serif", "serif"];

pub const CANDIDATE_FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Arial Narrow",
    "Calibri",
    "Cambria",
    "Cambria Math",
    "Comic Sans MS",
    "Courier",
    "Courier New",
    "Georgia",
    "Helvetica",
    "Impact",
    "Lucida Console",
    "Lucida Sans Unicode",
    "Microsoft Sans Serif",
    "Palatino Linotype",
    "Tahoma",
    "Times",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

pub const PROBE_TEXT: &str = "mmmmmmmmmmlli";
pub const PROBE_SIZE_PX: u32 = 72;

/// Measures the rendered box of a text run. `font_family` is a CSS-style
/// family list such as `'Arial', monospace`.
pub trait TextMeasurer {
    /// `(width, height)` in pixels, or `None` if the text could not be laid out.
    fn measure(&mut self, text: &str, size_px: u32, font_family: &str) -> Option<(u32, u32)>;
}

/// Detected candidate fonts in candidate-list order.
pub fn detect_fonts(measurer: &mut dyn TextMeasurer) -> Vec<String> {
    let mut baseline = HashMap::new();
    for fallback in FALLBACK_FAMILIES {
        if let Some(size) = measurer.measure(PROBE_TEXT, PROBE_SIZE_PX, fallback) {
            baseline.insert(*fallback, size);
        }
    }
    if baseline.is_empty() {
        return Vec::new();
    }

    CANDIDATE_FONTS
        .iter()
        .filter(|font| {
            FALLBACK_FAMILIES.iter().any(|fallback| {
                let Some(base) = baseline.get(fallback) else {
                    return false;
                };
                let family = format!("'{}', {}", font, fallback);
                matches!(
                    measurer.measure(PROBE_TEXT, PROBE_SIZE_PX, &family),
                    Some(size) if size != *base
                )
            })
        })
        .map(|font| font.to_string())
        .collect()
}
