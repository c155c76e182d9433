//! The platform seam the collector reads from.

use crate::audio::AudioGraph;
use crate::canvas::CanvasSurface;
use crate::fonts::TextMeasurer;
use printboard_core::CollectionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphicsInfo {
    pub vendor: Option<String>,
    pub renderer: Option<String>,
}

/// Source of raw signals. Each accessor fails independently; resources
/// handed out (surfaces, graphs, measurers) are released when dropped.
pub trait Environment: Send + Sync {
    fn user_agent(&self) -> Result<String, CollectionError>;
    fn language(&self) -> Result<String, CollectionError>;
    fn platform(&self) -> Result<String, CollectionError>;
    fn screen(&self) -> Result<ScreenInfo, CollectionError>;
    fn timezone(&self) -> Result<String, CollectionError>;
    fn touch_support(&self) -> Result<bool, CollectionError>;
    fn cookies_enabled(&self) -> Result<bool, CollectionError>;
    fn create_canvas(&self, width: u32, height: u32)
        -> Result<Box<dyn CanvasSurface>, CollectionError>;
    fn graphics_info(&self) -> Result<GraphicsInfo, CollectionError>;
    fn create_audio_graph(&self) -> Result<Box<dyn AudioGraph>, CollectionError>;
    fn text_measurer(&self) -> Result<Box<dyn TextMeasurer + Send>, CollectionError>;
}
