//! The player state machine.

use super::backend::{FrameSink, MediaBackend};
use super::visualizer::{self, BIN_COUNT, Canvas, Frame};

/// Consecutive all-zero analyser frames tolerated before assuming the
/// samples are hidden by cross-origin restrictions.
pub const ZERO_FRAME_LIMIT: u32 = 60;

/// Shown in place of the controls once the player is in [`PlayerState::Error`].
pub const UNAVAILABLE_MESSAGE: &str = "Episode audio unavailable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Loading,
    Playing,
    Paused,
    /// Terminal: the media could not be loaded.
    Error,
}

/// Keyboard shortcuts understood by the player region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    ArrowLeft,
    ArrowRight,
}

/// One player widget bound to one media source.
pub struct Player<B: MediaBackend> {
    backend: B,
    src: String,
    state: PlayerState,
    current_time: f64,
    real_duration: Option<f64>,
    cross_origin: bool,
    cors_failed: bool,
    synthetic: bool,
    context_open: bool,
    zero_frames: u32,
    released: bool,
    bins: [u8; BIN_COUNT],
}

impl<B: MediaBackend> Player<B> {
    /// Create a player and load `src` in cross-origin mode.
    pub fn new(mut backend: B, src: &str) -> Self {
        backend.load(src, true);
        Self {
            backend,
            src: src.to_string(),
            state: PlayerState::Idle,
            current_time: 0.0,
            real_duration: None,
            cross_origin: true,
            cors_failed: false,
            synthetic: false,
            context_open: false,
            zero_frames: 0,
            released: false,
            bins: [0; BIN_COUNT],
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Error text for the player region, if playback is impossible.
    pub fn error_message(&self) -> Option<&'static str> {
        (self.state == PlayerState::Error).then_some(UNAVAILABLE_MESSAGE)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Whether the synthetic visualization replaced the analyser.
    pub fn uses_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Duration from media metadata, else from the export (`fallback`).
    pub fn total_duration(&self, fallback: f64) -> f64 {
        self.real_duration.unwrap_or(fallback)
    }

    /// Playback progress in `[0, 1]`; zero while the duration is unknown.
    pub fn progress(&self, fallback_duration: f64) -> f64 {
        let total = self.total_duration(fallback_duration);
        if total > 0.0 {
            (self.current_time / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    // -- media events --------------------------------------------------------

    pub fn on_time_update(&mut self) {
        self.current_time = self.backend.position();
    }

    pub fn on_loaded_metadata(&mut self) {
        self.real_duration = self.backend.duration();
    }

    pub fn on_ended(&mut self) {
        self.state = PlayerState::Paused;
    }

    /// The media failed to load.
    ///
    /// The first failure in cross-origin mode reloads without it and falls
    /// back to the synthetic visualization; any later failure is terminal.
    pub fn on_error(&mut self) {
        if !self.cors_failed && self.cross_origin {
            tracing::debug!(src = %self.src, "media load failed in CORS mode; retrying without");
            self.cors_failed = true;
            self.cross_origin = false;
            self.synthetic = true;
            self.backend.load(&self.src, false);
        } else {
            tracing::debug!(src = %self.src, "media unavailable");
            self.state = PlayerState::Error;
        }
    }

    // -- controls ------------------------------------------------------------

    pub fn play(&mut self) {
        if self.state == PlayerState::Error {
            return;
        }
        self.init_context();
        if self.context_open {
            self.backend.resume_context();
        }
        self.state = PlayerState::Loading;
        self.state = match self.backend.play() {
            Ok(()) => PlayerState::Playing,
            Err(_) => PlayerState::Error,
        };
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.state = PlayerState::Paused;
    }

    pub fn toggle_play(&mut self) {
        if self.state == PlayerState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to `seconds`, clamped into the media's duration.
    pub fn seek(&mut self, seconds: f64) {
        let upper = self.backend.duration().unwrap_or(f64::INFINITY);
        self.backend.set_position(seconds.min(upper).max(0.0));
        self.current_time = self.backend.position();
        self.zero_frames = 0;
    }

    pub fn skip(&mut self, delta: f64) {
        self.seek(self.backend.position() + delta);
    }

    /// Seek to a fraction of the total duration (click on the waveform).
    pub fn seek_fraction(&mut self, fraction: f64, fallback_duration: f64) {
        let total = self.total_duration(fallback_duration);
        if total <= 0.0 {
            return;
        }
        self.seek(fraction.clamp(0.0, 1.0) * total);
    }

    /// Apply a keyboard shortcut. Returns `false` for unbound keys.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Space | Key::Char('k') => self.toggle_play(),
            Key::ArrowLeft => self.skip(-5.0),
            Key::ArrowRight => self.skip(5.0),
            Key::Char('j') => self.skip(-15.0),
            Key::Char('l') => self.skip(15.0),
            Key::Char(_) => return false,
        }
        true
    }

    // -- visualization -------------------------------------------------------

    /// Feed one frame of analyser output to the silence detector.
    pub fn check_frequency_data(&mut self, data: &[u8]) {
        if self.synthetic || self.state != PlayerState::Playing {
            return;
        }
        if data.iter().all(|&v| v == 0) {
            self.zero_frames += 1;
            if self.zero_frames > ZERO_FRAME_LIMIT {
                tracing::debug!(src = %self.src, "analyser silent; using synthetic visualization");
                self.synthetic = true;
            }
        } else {
            self.zero_frames = 0;
        }
    }

    /// Compute the frame for wall-clock time `now` (seconds).
    pub fn frame(&mut self, now: f64, canvas: Canvas, fallback_duration: f64) -> Frame {
        let playing = self.state == PlayerState::Playing;
        if playing && self.context_open && !self.synthetic {
            let mut bins = self.bins;
            self.backend.frequency_data(&mut bins);
            self.check_frequency_data(&bins);
            self.bins = bins;
        } else if playing && self.synthetic {
            visualizer::synthetic_levels(now, &mut self.bins);
        } else {
            let level =
                visualizer::ambient_level(self.synthetic || self.state == PlayerState::Paused);
            self.bins.fill(level);
        }
        visualizer::layout(&self.bins, canvas, self.progress(fallback_duration))
    }

    /// Compute a frame and hand it to `sink`.
    pub fn render(&mut self, now: f64, canvas: Canvas, fallback_duration: f64, sink: &mut impl FrameSink) {
        let frame = self.frame(now, canvas, fallback_duration);
        sink.draw(&frame);
    }

    /// Stop playback and release the decoding context.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.backend.pause();
        self.backend.unload();
        if self.context_open {
            self.backend.close_context();
            self.context_open = false;
        }
    }

    fn init_context(&mut self) {
        if self.context_open || self.cors_failed || self.synthetic {
            return;
        }
        match self.backend.open_context() {
            Ok(()) => self.context_open = true,
            Err(err) => {
                tracing::debug!(error = %err, "no audio context; using synthetic visualization");
                self.synthetic = true;
            }
        }
    }
}

impl<B: MediaBackend> Drop for Player<B> {
    fn drop(&mut self) {
        self.release();
    }
}
