//! Speech playback collaborator.
//!
//! The trainer core triggers pronunciation playback but never consumes a
//! result from it; the actual text-to-speech mechanism lives outside the
//! core.

/// Fire-and-forget pronunciation playback.
pub trait SpeechPlayback: Send + Sync {
    fn speak(&self, text: &str);
}

/// Playback that does nothing. Useful as a default and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayback;

impl SpeechPlayback for SilentPlayback {
    fn speak(&self, _text: &str) {}
}
