//! Audio player logic.
//!
//! Episode pages embed a custom audio player with a waveform visualizer.
//! The platform-specific parts (the media element, the audio graph, the
//! drawing surface) sit behind small capability traits so that everything
//! else can be tested without a browser:
//!
//! | Capability | Trait | Provided by |
//! |------------|-------|-------------|
//! | decode / play media | [`MediaBackend`] | platform adapter |
//! | analyze frequencies | [`MediaBackend::frequency_data`] | platform adapter |
//! | render a frame | [`FrameSink`] | platform adapter |
//!
//! ## Cross-Origin Fallback
//!
//! Media is first loaded in cross-origin mode so its samples can be
//! analysed. Two failure modes are handled by [`Player`]:
//!
//! 1. The load itself fails. The player retries once without cross-origin
//!    mode and switches to the synthetic visualization. A second failure is
//!    terminal and the page shows "Episode audio unavailable."
//! 2. The load succeeds but the analyser only ever reports silence (the host
//!    sent no CORS headers). After more than [`ZERO_FRAME_LIMIT`]
//!    consecutive all-zero frames during playback the player switches to
//!    the synthetic visualization.
//!
//! ## Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`time`] | `format_time` / `parse_duration` / file size display |
//! | [`backend`] | [`MediaBackend`] and [`FrameSink`] capability traits |
//! | [`controller`] | [`Player`] state machine |
//! | [`visualizer`] | Frequency data, synthetic waves, bar geometry |
//! | [`preference`] | Custom vs native player choice, persisted per browser |

pub mod backend;
pub mod controller;
pub mod preference;
pub mod time;
pub mod visualizer;

pub use backend::{FrameSink, MediaBackend, PlayerError};
pub use controller::{Key, Player, PlayerState, UNAVAILABLE_MESSAGE, ZERO_FRAME_LIMIT};
pub use preference::{PlayerKind, PreferenceStore};
pub use time::{file_size_mb, format_time, parse_duration};
pub use visualizer::{Bar, Canvas, Frame};
