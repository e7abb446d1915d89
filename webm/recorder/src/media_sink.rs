/*!
    Media input surface.
*/

use webm_encode::VideoEncoderConfig;
use webm_types::Result;

/**
    Destination for media produced by a capture source.

    Each track is declared once through the `init_*` methods before any
    frame is written to it. Implementations own all timing: callers hand
    over payloads in delivery order and never compute timestamps.
*/
pub trait MediaSink {
    /// Declare the audio track.
    fn init_audio(&mut self, sample_rate: u32, channels: u16) -> Result<()>;

    /// Declare the video track.
    fn init_video(&mut self, config: VideoEncoderConfig) -> Result<()>;

    /// Write one encoded audio frame covering `sample_count` samples.
    fn write_audio_frame(&mut self, data: &[u8], sample_count: u64) -> Result<()>;

    /// Write one RGBA video frame captured at index `frame_index`.
    fn write_video_frame(&mut self, frame_index: u64, rgba: &[u8]) -> Result<()>;
}
