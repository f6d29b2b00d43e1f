//! Waveform visualizer frames.
//!
//! Each animation frame fills a 64-bin magnitude buffer from one of three
//! sources and turns the first [`BAR_COUNT`] bins into rounded bars:
//!
//! - **analyser**: live frequency data while playing
//! - **synthetic**: three summed sine waves driven by wall-clock time, used
//!   when the analyser cannot see the samples
//! - **ambient**: a flat low level while idle or paused
//!
//! Geometry is in device pixels; the adapter scales by the device pixel ratio.

pub const BIN_COUNT: usize = 64;
pub const BAR_COUNT: usize = 40;
const GAP: f64 = 3.0;

/// Drawing surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
}

/// Everything a renderer needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bars: Vec<Bar>,
    /// Width of the progress strip along the bottom edge.
    pub progress_width: f64,
    pub progress_height: f64,
}

/// Fill `bins` with the synthetic waveform at time `t` (seconds).
pub fn synthetic_levels(t: f64, bins: &mut [u8]) {
    for (i, bin) in bins.iter_mut().enumerate() {
        let i = i as f64;
        let wave = (t * 2.0 + i * 0.4).sin() * 0.3
            + (t * 3.7 + i * 0.7).sin() * 0.2
            + (t * 1.3 + i * 1.1).sin() * 0.15
            + 0.35;
        *bin = (wave.clamp(0.0, 1.0) * 200.0).floor() as u8;
    }
}

/// Flat level shown while nothing is playing.
pub fn ambient_level(paused_or_synthetic: bool) -> u8 {
    if paused_or_synthetic { 15 } else { 10 }
}

/// Lay out bars for `bins` on `canvas`, with `progress` in `[0, 1]`.
pub fn layout(bins: &[u8], canvas: Canvas, progress: f64) -> Frame {
    let dpr = canvas.device_pixel_ratio;
    let w = canvas.width;
    let h = canvas.height;
    let bar_width = (w - GAP * (BAR_COUNT as f64 + 1.0)) / BAR_COUNT as f64;

    let bars = bins
        .iter()
        .take(BAR_COUNT)
        .enumerate()
        .map(|(i, &level)| {
            let value = f64::from(level) / 255.0;
            let height = (value * (h - 8.0 * dpr)).max(4.0 * dpr);
            Bar {
                x: GAP + i as f64 * (bar_width + GAP),
                y: h - height - 4.0 * dpr,
                width: bar_width,
                height,
                corner_radius: 2.0 * dpr,
            }
        })
        .collect();

    Frame {
        bars,
        progress_width: w * progress.clamp(0.0, 1.0),
        progress_height: 3.0 * dpr,
    }
}
