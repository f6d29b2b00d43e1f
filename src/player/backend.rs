//! Capability traits implemented by a platform adapter.

use super::visualizer::Frame;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    #[error("Playback failed: {0}")]
    Playback(String),
    #[error("Audio context unavailable: {0}")]
    Context(String),
}

/// A media element plus the audio graph used to analyse it.
///
/// Event delivery is the adapter's job: it forwards `timeupdate`,
/// `loadedmetadata`, `ended` and `error` to the matching
/// [`Player`](super::Player) `on_*` methods.
pub trait MediaBackend {
    /// Point the element at `src`. `cross_origin` requests CORS mode.
    fn load(&mut self, src: &str, cross_origin: bool);

    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self);

    /// Current playback position in seconds.
    fn position(&self) -> f64;

    fn set_position(&mut self, seconds: f64);

    /// Media duration once metadata has loaded.
    fn duration(&self) -> Option<f64>;

    /// Create the decoding context and frequency analyser.
    fn open_context(&mut self) -> Result<(), PlayerError>;

    /// Resume a context the platform suspended before user interaction.
    fn resume_context(&mut self);

    /// Release the decoding context. Called at most once.
    fn close_context(&mut self);

    /// Fill `out` with byte frequency magnitudes from the analyser.
    fn frequency_data(&mut self, out: &mut [u8]);

    /// Detach the media source.
    fn unload(&mut self);
}

/// A drawing surface for visualizer frames.
pub trait FrameSink {
    fn draw(&mut self, frame: &Frame);
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Load { src: String, cross_origin: bool },
        Play,
        Pause,
        Seek(f64),
        OpenContext,
        ResumeContext,
        CloseContext,
        Unload,
    }

    /// Backend that records calls and replays scripted results.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Vec<RecordedOp>,
        pub position: f64,
        pub duration: Option<f64>,
        pub fail_play: bool,
        pub fail_context: bool,
        /// Value every analyser bin reports.
        pub level: u8,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self, op: &RecordedOp) -> usize {
            self.operations.iter().filter(|o| *o == op).count()
        }
    }

    impl MediaBackend for MockBackend {
        fn load(&mut self, src: &str, cross_origin: bool) {
            self.operations.push(RecordedOp::Load {
                src: src.to_string(),
                cross_origin,
            });
        }

        fn play(&mut self) -> Result<(), PlayerError> {
            self.operations.push(RecordedOp::Play);
            if self.fail_play {
                Err(PlayerError::Playback("not allowed".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.operations.push(RecordedOp::Pause);
        }

        fn position(&self) -> f64 {
            self.position
        }

        fn set_position(&mut self, seconds: f64) {
            self.operations.push(RecordedOp::Seek(seconds));
            self.position = seconds;
        }

        fn duration(&self) -> Option<f64> {
            self.duration
        }

        fn open_context(&mut self) -> Result<(), PlayerError> {
            self.operations.push(RecordedOp::OpenContext);
            if self.fail_context {
                Err(PlayerError::Context("unsupported".to_string()))
            } else {
                Ok(())
            }
        }

        fn resume_context(&mut self) {
            self.operations.push(RecordedOp::ResumeContext);
        }

        fn close_context(&mut self) {
            self.operations.push(RecordedOp::CloseContext);
        }

        fn frequency_data(&mut self, out: &mut [u8]) {
            out.fill(self.level);
        }

        fn unload(&mut self) {
            self.operations.push(RecordedOp::Unload);
        }
    }

    #[test]
    fn mock_records_load_mode() {
        let mut backend = MockBackend::new();
        backend.load("https://cdn.example.com/a.mp3", true);
        assert_eq!(
            backend.operations,
            vec![RecordedOp::Load {
                src: "https://cdn.example.com/a.mp3".to_string(),
                cross_origin: true
            }]
        );
    }

    #[test]
    fn mock_fills_frequency_data() {
        let mut backend = MockBackend {
            level: 7,
            ..MockBackend::default()
        };
        let mut buf = [0u8; 4];
        backend.frequency_data(&mut buf);
        assert_eq!(buf, [7, 7, 7, 7]);
    }
}
