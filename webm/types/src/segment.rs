/*!
    The container serialization contract.

    A [`SegmentMuxer`] turns track descriptors and frame records into container
    bytes. The implementation in `webm-mux` writes a live-mode WebM segment;
    tests substitute recording fakes.
*/

use crate::{BlockFrame, Result};

/// Well-known track number for the single video track.
pub const VIDEO_TRACK_NUMBER: u64 = 1;

/// Well-known track number for the single audio track.
pub const AUDIO_TRACK_NUMBER: u64 = 2;

/// Fixed output timescale: nanoseconds per container timecode unit.
pub const TIMECODE_SCALE_NS: u64 = 1_000_000;

/// Codec identifier string for VP8 video tracks.
pub const VP8_CODEC_ID: &str = "V_VP8";

/// Codec identifier string for Opus audio tracks.
pub const OPUS_CODEC_ID: &str = "A_OPUS";

/**
    Abstract container serializer.

    Tracks are registered first; once the first block is written the track
    layout is frozen. Implementations operate append-only and must not rely
    on seeking the output.
*/
pub trait SegmentMuxer {
    /**
        Add an audio track.

        `requested` is the desired track number, or 0 to let the muxer assign
        the next free number. Returns the actual track number.
    */
    fn add_audio_track(&mut self, sample_rate: u32, channels: u16, requested: u64) -> Result<u64>;

    /**
        Add a video track.

        Same track number semantics as [`SegmentMuxer::add_audio_track`].
    */
    fn add_video_track(&mut self, width: u32, height: u32, requested: u64) -> Result<u64>;

    /**
        Set the codec identifier string for a track.
    */
    fn set_codec_id(&mut self, track: u64, codec_id: &str) -> Result<()>;

    /**
        Set the bit depth for an audio track.
    */
    fn set_bit_depth(&mut self, track: u64, bits: u32) -> Result<()>;

    /**
        Install codec-private header bytes for a track.
    */
    fn set_codec_private(&mut self, track: u64, data: &[u8]) -> Result<()>;

    /**
        Mark a track as the target for random-access cue points.
    */
    fn enable_cues(&mut self, track: u64) -> Result<()>;

    /**
        Nanoseconds per container timecode unit.
    */
    fn timecode_scale_ns(&self) -> u64;

    /**
        Write one frame without an explicit duration.
    */
    fn add_frame(
        &mut self,
        track: u64,
        data: &[u8],
        timestamp_ns: u64,
        keyframe: bool,
    ) -> Result<()> {
        self.add_block(&BlockFrame {
            track,
            data,
            timestamp_ns,
            keyframe,
            duration_ns: None,
        })
    }

    /**
        Write one frame record.
    */
    fn add_block(&mut self, frame: &BlockFrame<'_>) -> Result<()>;

    /**
        Finish the segment.

        Must be called exactly once; no frames may be written afterwards.
    */
    fn finalize(&mut self) -> Result<()>;

    /**
        Cumulative bytes emitted to the downstream sink.
    */
    fn position(&self) -> u64;
}
