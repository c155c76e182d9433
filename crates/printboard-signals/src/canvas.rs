//! Canvas probe: draw a fixed scene offscreen and read back its encoding.
//! Rasterization differences (fonts, anti-aliasing, GPU) show up in the output.

use printboard_core::CollectionError;
use std::f64::consts::PI;

pub const CANVAS_WIDTH: u32 = 200;
pub const CANVAS_HEIGHT: u32 = 50;

/// An offscreen 2D drawing surface. Dropping the surface releases it.
pub trait CanvasSurface: Send {
    fn set_fill_style(&mut self, style: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_font(&mut self, font: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn begin_path(&mut self);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    /// Encoded surface contents, typically a `data:image/png;base64,...` URL.
    fn to_data_url(&self) -> Result<String, CollectionError>;
}

/// Draw the probe scene and return the raw encoding.
pub fn render_probe(surface: &mut dyn CanvasSurface) -> Result<String, CollectionError> {
    surface.set_fill_style("#f60");
    surface.fill_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
    surface.set_fill_style("#069");
    surface.set_font("15px Arial");
    surface.fill_text("Browser Fingerprinting", 2.0, 15.0);
    surface.set_fill_style("rgba(102, 204, 0, 0.7)");
    surface.set_font("18px Times New Roman");
    surface.fill_text("Educational Demo", 4.0, 40.0);

    surface.begin_path();
    surface.arc(50.0, 25.0, 10.0, 0.0, PI * 2.0);
    surface.close_path();
    surface.fill();

    surface.to_data_url()
}
