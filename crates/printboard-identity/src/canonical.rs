//! Canonical encoding of a signal set.
//!
//! The encoding is the identity input: changing a key, its position, or how
//! a value is stringified changes every identifier. New layouts get a new
//! `Encoding` variant; existing ones are frozen.

use printboard_core::{DerivationError, SignalSet};
use printboard_signals::{classify_browser, classify_os};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Compact JSON object, keys in declaration order of `V1`, every value a
    /// string.
    #[default]
    V1,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct V1<'a> {
    user_agent: &'a str,
    language: &'a str,
    platform: &'a str,
    screen_size: String,
    color_depth: String,
    timezone: &'a str,
    touch_support: &'static str,
    cookies_enabled: &'static str,
    canvas_hash: &'a str,
    webgl_vendor: &'a str,
    webgl_renderer: &'a str,
    audio_hash: &'a str,
    fonts: String,
    browser: &'static str,
    os: &'static str,
}

fn flag(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

pub fn canonical_encoding(
    signals: &SignalSet,
    encoding: Encoding,
) -> Result<String, DerivationError> {
    match encoding {
        Encoding::V1 => {
            let v1 = V1 {
                user_agent: &signals.user_agent,
                language: &signals.language,
                platform: &signals.platform,
                screen_size: signals.screen_size(),
                color_depth: signals.color_depth_label(),
                timezone: &signals.timezone,
                touch_support: flag(signals.touch_support),
                cookies_enabled: flag(signals.cookies_enabled),
                canvas_hash: &signals.canvas,
                webgl_vendor: &signals.webgl_vendor,
                webgl_renderer: &signals.webgl_renderer,
                audio_hash: &signals.audio,
                fonts: signals.fonts.join(","),
                browser: classify_browser(&signals.user_agent),
                os: classify_os(&signals.user_agent),
            };
            Ok(serde_json::to_string(&v1)?)
        }
    }
}
