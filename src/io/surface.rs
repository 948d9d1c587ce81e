use crate::dsp::Audio;

/// Rendering seam between modules and whatever actually draws.
///
/// Modules draw in channel-local character coordinates during
/// `update_display`; the engine brackets each module's drawing with
/// `begin_channel` so an implementation can map those coordinates onto its
/// own panel regions. The concrete surface lives outside the engine: an
/// OLED driver on hardware, a terminal grid in the simulator, `NullSurface`
/// in tests.
pub trait Surface {
    /// Route subsequent drawing to the given channel's panel region.
    fn begin_channel(&mut self, _channel: usize) {}

    fn draw_str(&mut self, x: u16, y: u16, text: &str);

    /// Horizontal level meter for a 0..1 value.
    fn draw_meter(&mut self, x: u16, y: u16, width: u16, level: Audio);
}

/// Discards all drawing. For tests and headless runs.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn draw_str(&mut self, _x: u16, _y: u16, _text: &str) {}

    fn draw_meter(&mut self, _x: u16, _y: u16, _width: u16, _level: Audio) {}
}
