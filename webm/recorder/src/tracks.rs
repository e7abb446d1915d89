/*!
    Track registration against a segment muxer.

    The recorder pins fixed track numbers so audio-only, video-only, and
    combined recordings stay byte-stable: video is always track one, audio
    always track two. A muxer that cannot honor a pinned number, or that
    runs on a different timescale, is rejected before any track state is
    committed.
*/

use tracing::info;
use webm_types::{
    AUDIO_TRACK_NUMBER, Error, OPUS_CODEC_ID, Result, SegmentMuxer, TIMECODE_SCALE_NS,
    VIDEO_TRACK_NUMBER,
};

/// Bit depth advertised for the float PCM fed to the Opus encoder.
const AUDIO_BIT_DEPTH: u32 = 32;

fn check_timecode_scale<M: SegmentMuxer>(muxer: &M) -> Result<()> {
    let scale = muxer.timecode_scale_ns();
    if scale != TIMECODE_SCALE_NS {
        return Err(Error::setup(format!(
            "unsupported timecode scale {scale}, expected {TIMECODE_SCALE_NS}"
        )));
    }
    Ok(())
}

pub(crate) fn register_audio_track<M: SegmentMuxer>(
    muxer: &mut M,
    sample_rate: u32,
    channels: u16,
    codec_private: &[u8],
) -> Result<u64> {
    check_timecode_scale(muxer)?;
    let track = muxer.add_audio_track(sample_rate, channels, AUDIO_TRACK_NUMBER)?;
    if track != AUDIO_TRACK_NUMBER {
        return Err(Error::setup(format!(
            "muxer assigned audio track {track}, expected {AUDIO_TRACK_NUMBER}"
        )));
    }
    muxer.set_codec_id(track, OPUS_CODEC_ID)?;
    muxer.set_bit_depth(track, AUDIO_BIT_DEPTH)?;
    muxer.set_codec_private(track, codec_private)?;
    info!(track, sample_rate, channels, "audio track registered");
    Ok(track)
}

pub(crate) fn register_video_track<M: SegmentMuxer>(
    muxer: &mut M,
    width: u32,
    height: u32,
) -> Result<u64> {
    check_timecode_scale(muxer)?;
    let track = muxer.add_video_track(width, height, VIDEO_TRACK_NUMBER)?;
    if track != VIDEO_TRACK_NUMBER {
        return Err(Error::setup(format!(
            "muxer assigned video track {track}, expected {VIDEO_TRACK_NUMBER}"
        )));
    }
    muxer.enable_cues(track)?;
    info!(track, width, height, "video track registered");
    Ok(track)
}
