//! Printboard Signals - collects raw environment measurements
//!
//! Every probe is independent: a probe that is unavailable or fails yields a
//! sentinel for its own field and never aborts the collection.

pub mod audio;
pub mod canvas;
pub mod collector;
pub mod environment;
pub mod fonts;
pub mod profile;
pub mod ua;

pub use audio::{AudioGraph, AudioProbeSettings};
pub use canvas::CanvasSurface;
pub use collector::{collect, Collected, CollectorOptions};
pub use environment::{Environment, GraphicsInfo, ScreenInfo};
pub use fonts::{detect_fonts, TextMeasurer};
pub use profile::{Profile, ProfileEnvironment};
pub use ua::{classify_browser, classify_os};
