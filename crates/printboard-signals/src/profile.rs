//! Declarative environments.
//!
//! A `Profile` records what a device reported (or would report) for each
//! probe. `ProfileEnvironment` replays it through the same probe code the
//! collector uses, so a saved profile derives the same identity as the live
//! device it was captured from. Absent fields behave like a missing
//! capability.

use crate::audio::{AudioGraph, AudioProbeSettings};
use crate::canvas::CanvasSurface;
use crate::environment::{Environment, GraphicsInfo, ScreenInfo};
use crate::fonts::TextMeasurer;
use printboard_core::CollectionError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub color_depth: Option<u32>,
    pub timezone: Option<String>,
    pub touch_support: Option<bool>,
    pub cookies_enabled: Option<bool>,
    /// Captured canvas encoding.
    pub canvas: Option<String>,
    pub webgl_vendor: Option<String>,
    pub webgl_renderer: Option<String>,
    /// Captured analyser bins.
    pub audio_bins: Option<Vec<u8>>,
    /// Fonts that render with their own metrics. `None` means text layout
    /// is unavailable.
    pub installed_fonts: Option<Vec<String>>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self, CollectionError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CollectionError::probe_failed("profile", format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CollectionError::probe_failed("profile", format!("{}: {}", path.display(), e)))
    }

    /// What a headless process can honestly report about its host. No
    /// screen, canvas, audio, or fonts.
    pub fn from_host() -> Self {
        let language = std::env::var("LANG").ok().and_then(|lang| {
            let tag = lang.split('.').next().unwrap_or_default().replace('_', "-");
            (!tag.is_empty() && tag != "C" && tag != "POSIX").then_some(tag)
        });
        Self {
            user_agent: Some(format!(
                "printboard/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            language,
            platform: Some(std::env::consts::OS.to_string()),
            timezone: std::env::var("TZ").ok().filter(|tz| !tz.is_empty()),
            touch_support: Some(false),
            cookies_enabled: Some(false),
            ..Default::default()
        }
    }
}

pub struct ProfileEnvironment {
    profile: Profile,
}

impl ProfileEnvironment {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

fn declared<T: Clone>(value: &Option<T>, what: &'static str) -> Result<T, CollectionError> {
    value.clone().ok_or(CollectionError::Unavailable(what))
}

impl Environment for ProfileEnvironment {
    fn user_agent(&self) -> Result<String, CollectionError> {
        declared(&self.profile.user_agent, "userAgent")
    }

    fn language(&self) -> Result<String, CollectionError> {
        declared(&self.profile.language, "language")
    }

    fn platform(&self) -> Result<String, CollectionError> {
        declared(&self.profile.platform, "platform")
    }

    fn screen(&self) -> Result<ScreenInfo, CollectionError> {
        let p = &self.profile;
        match (p.screen_width, p.screen_height, p.color_depth) {
            (Some(width), Some(height), Some(color_depth)) => Ok(ScreenInfo {
                width,
                height,
                color_depth,
            }),
            _ => Err(CollectionError::Unavailable("screen")),
        }
    }

    fn timezone(&self) -> Result<String, CollectionError> {
        declared(&self.profile.timezone, "timezone")
    }

    fn touch_support(&self) -> Result<bool, CollectionError> {
        declared(&self.profile.touch_support, "touchSupport")
    }

    fn cookies_enabled(&self) -> Result<bool, CollectionError> {
        declared(&self.profile.cookies_enabled, "cookiesEnabled")
    }

    fn create_canvas(&self, _: u32, _: u32) -> Result<Box<dyn CanvasSurface>, CollectionError> {
        let encoded = declared(&self.profile.canvas, "canvas")?;
        Ok(Box::new(ReplayCanvas { encoded }))
    }

    fn graphics_info(&self) -> Result<GraphicsInfo, CollectionError> {
        Ok(GraphicsInfo {
            vendor: self.profile.webgl_vendor.clone(),
            renderer: self.profile.webgl_renderer.clone(),
        })
    }

    fn create_audio_graph(&self) -> Result<Box<dyn AudioGraph>, CollectionError> {
        let bins = declared(&self.profile.audio_bins, "audio")?;
        Ok(Box::new(ReplayAudio {
            bins,
            started: false,
        }))
    }

    fn text_measurer(&self) -> Result<Box<dyn TextMeasurer + Send>, CollectionError> {
        let installed = declared(&self.profile.installed_fonts, "fonts")?;
        Ok(Box::new(ProfileMetrics { installed }))
    }
}

/// Ignores drawing and returns the captured encoding.
struct ReplayCanvas {
    encoded: String,
}

impl CanvasSurface for ReplayCanvas {
    fn set_fill_style(&mut self, _: &str) {}
    fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64) {}
    fn set_font(&mut self, _: &str) {}
    fn fill_text(&mut self, _: &str, _: f64, _: f64) {}
    fn begin_path(&mut self) {}
    fn arc(&mut self, _: f64, _: f64, _: f64, _: f64, _: f64) {}
    fn close_path(&mut self) {}
    fn fill(&mut self) {}

    fn to_data_url(&self) -> Result<String, CollectionError> {
        Ok(self.encoded.clone())
    }
}

struct ReplayAudio {
    bins: Vec<u8>,
    started: bool,
}

impl AudioGraph for ReplayAudio {
    fn configure(&mut self, _: &AudioProbeSettings) -> Result<(), CollectionError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), CollectionError> {
        self.started = true;
        Ok(())
    }

    fn frequency_data(&mut self) -> Result<Vec<u8>, CollectionError> {
        if !self.started {
            return Err(CollectionError::probe_failed("audio", "analyser read before start"));
        }
        Ok(self.bins.clone())
    }

    fn close(&mut self) {
        self.started = false;
    }
}

/// Generic families have fixed boxes; an installed font widens the run.
struct ProfileMetrics {
    installed: Vec<String>,
}

impl TextMeasurer for ProfileMetrics {
    fn measure(&mut self, text: &str, size_px: u32, font_family: &str) -> Option<(u32, u32)> {
        let chars = text.chars().count() as u32;
        let (first, fallback) = match font_family.rsplit_once(", ") {
            Some((first, fallback)) => (Some(first.trim_matches('\'')), fallback),
            None => (None, font_family),
        };
        let advance = match fallback {
            "monospace" => size_px * 6 / 10,
            "sans-serif" => size_px * 55 / 100,
            _ => size_px / 2,
        };
        let mut width = chars * advance;
        if let Some(font) = first {
            if self.installed.iter().any(|f| f == font) {
                width += 1 + font.len() as u32;
            }
        }
        Some((width, size_px + size_px / 8))
    }
}
