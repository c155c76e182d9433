//! Signal collection
//!
//! Runs every probe against an `Environment`, substituting a sentinel for any
//! probe that fails. The only suspension point is the audio sampling window.

use crate::audio::{self, AudioProbeSettings};
use crate::canvas::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::environment::Environment;
use crate::fonts;
use printboard_core::{
    CollectionError, SignalSet, AUDIO_NOT_SUPPORTED, CANVAS_NOT_SUPPORTED, UNKNOWN, UNSUPPORTED,
};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub audio: AudioProbeSettings,
    /// Wait between starting the oscillator and reading the analyser.
    pub audio_window: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            audio: AudioProbeSettings::default(),
            audio_window: Duration::from_millis(100),
        }
    }
}

/// A signal set plus the probe failures that were papered over.
#[derive(Debug, Clone)]
pub struct Collected {
    pub signals: SignalSet,
    pub failures: Vec<CollectionError>,
}

struct Failures(Vec<CollectionError>);

impl Failures {
    fn or<T>(&mut self, result: Result<T, CollectionError>, sentinel: T) -> T {
        match result {
            Ok(v) => v,
            Err(e) => {
                debug!("signal unavailable: {}", e);
                self.0.push(e);
                sentinel
            }
        }
    }
}

pub async fn collect(env: &dyn Environment, options: &CollectorOptions) -> Collected {
    let mut failures = Failures(Vec::new());

    let user_agent = failures.or(env.user_agent(), UNSUPPORTED.to_string());
    let language = failures.or(env.language(), UNSUPPORTED.to_string());
    let platform = failures.or(env.platform(), UNSUPPORTED.to_string());
    let (screen_width, screen_height, color_depth) = match env.screen() {
        Ok(s) => (s.width.to_string(), s.height.to_string(), s.color_depth.to_string()),
        Err(e) => {
            let s = failures.or::<String>(Err(e), UNSUPPORTED.to_string());
            (s.clone(), s.clone(), s)
        }
    };
    let timezone = failures.or(env.timezone(), UNSUPPORTED.to_string());
    let touch_support = failures.or(env.touch_support(), false);
    let cookies_enabled = failures.or(env.cookies_enabled(), false);

    let canvas = failures.or(canvas_probe(env), CANVAS_NOT_SUPPORTED.to_string());

    let graphics = failures.or(env.graphics_info(), Default::default());
    let webgl_vendor = graphics.vendor.unwrap_or_else(|| UNKNOWN.to_string());
    let webgl_renderer = graphics.renderer.unwrap_or_else(|| UNKNOWN.to_string());

    let audio = failures.or(
        audio_probe(env, options).await,
        AUDIO_NOT_SUPPORTED.to_string(),
    );

    let fonts = match env.text_measurer() {
        Ok(mut measurer) => fonts::detect_fonts(measurer.as_mut()),
        Err(e) => failures.or(Err(e), Vec::new()),
    };

    Collected {
        signals: SignalSet {
            user_agent,
            language,
            platform,
            screen_width,
            screen_height,
            color_depth,
            timezone,
            touch_support,
            cookies_enabled,
            canvas,
            webgl_vendor,
            webgl_renderer,
            audio,
            fonts,
        },
        failures: failures.0,
    }
}

fn canvas_probe(env: &dyn Environment) -> Result<String, CollectionError> {
    let mut surface = env.create_canvas(CANVAS_WIDTH, CANVAS_HEIGHT)?;
    canvas::render_probe(surface.as_mut())
}

async fn audio_probe(
    env: &dyn Environment,
    options: &CollectorOptions,
) -> Result<String, CollectionError> {
    let graph = env.create_audio_graph()?;
    audio::sample(graph, &options.audio, options.audio_window).await
}
