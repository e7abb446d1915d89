/*!
    WebM audio/video recording for the webm crate ecosystem.

    This crate ties the pipeline together: RGBA video frames are converted
    to planar YUV, pushed through a video codec, and written alongside
    already-encoded audio into one live WebM segment. The [`Recorder`] owns
    both track clocks, so capture sources only deliver payloads in order
    and never compute timestamps themselves.

    # Recording

    ```ignore
    use webm_mux::WebmMuxer;
    use webm_recorder::{MediaSink, Recorder, VideoEncoderConfig};
    use webm_types::{BufferSink, Rational};

    // `codec` is any VideoCodec implementation.
    let muxer = WebmMuxer::new(BufferSink::new());
    let mut recorder = Recorder::new(muxer, codec);

    recorder.init_audio(48_000, 2)?;
    recorder.init_video(VideoEncoderConfig::new(1280, 720, Rational::new(1, 30)))?;

    recorder.write_video_frame(0, &rgba)?;
    recorder.write_audio_frame(&opus_packet, 480)?;

    recorder.finalize()?;
    ```

    # Timing

    Audio timestamps accumulate delivered sample counts against the track's
    sample rate; video timestamps derive from the capture index and the
    configured frame rate. Both are integer arithmetic, so a re-run over
    the same input produces byte-identical output.

    # Track layout

    Video is always container track 1 and audio track 2, regardless of
    initialization order or whether the other track exists at all. A muxer
    that cannot honor those numbers is rejected at init time.
*/

pub use webm_encode::{StubCodec, VideoCodec, VideoEncoder, VideoEncoderConfig};
pub use webm_types::{Error, Result, SegmentMuxer};

mod media_sink;
mod opus;
mod recorder;
mod timeline;
mod tracks;

pub use media_sink::MediaSink;
pub use opus::OpusHeader;
pub use recorder::Recorder;
