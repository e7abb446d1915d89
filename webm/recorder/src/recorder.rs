/*!
    Recording surface.
*/

use tracing::info;
use webm_encode::{VideoCodec, VideoEncoder, VideoEncoderConfig};
use webm_image::PlanarImage;
use webm_types::{BlockFrame, Error, Result, SegmentMuxer};

use crate::media_sink::MediaSink;
use crate::opus::OpusHeader;
use crate::timeline::{self, Timeline};
use crate::tracks;

struct AudioState {
    track: u64,
    sample_rate: u32,
}

struct VideoState<C: VideoCodec> {
    track: u64,
    encoder: VideoEncoder<C>,
    image: PlanarImage,
}

/**
    Records one audio and one video track into a WebM segment.

    The recorder is the [`MediaSink`] implementation of this crate: declare
    tracks through `init_audio` and `init_video`, feed frames in delivery
    order, and call [`Recorder::finalize`] exactly once at the end.

    The video codec is an explicit constructor input and is consumed by
    `init_video`. Timing is owned entirely by the recorder: the audio clock
    accumulates delivered sample counts, and video timestamps derive from
    the capture index and the configured frame rate.
*/
pub struct Recorder<C: VideoCodec, M: SegmentMuxer> {
    muxer: M,
    timeline: Timeline,
    codec: Option<C>,
    audio: Option<AudioState>,
    video: Option<VideoState<C>>,
    finalized: bool,
}

impl<C: VideoCodec, M: SegmentMuxer> Recorder<C, M> {
    /**
        Create a recorder writing into `muxer`, holding `codec` for the
        video track.
    */
    pub fn new(muxer: M, codec: C) -> Self {
        Self {
            muxer,
            timeline: Timeline::new(),
            codec: Some(codec),
            audio: None,
            video: None,
            finalized: false,
        }
    }

    /**
        Cumulative bytes emitted to the output so far.
    */
    pub fn position(&self) -> u64 {
        self.muxer.position()
    }

    /**
        Whether the output supports seeking. Live segments never do.
    */
    pub fn seekable(&self) -> bool {
        false
    }

    /**
        Close the segment.

        Must be called exactly once; afterwards every write and init is
        rejected.
    */
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(Error::usage("recorder already finalized"));
        }
        self.finalized = true;
        self.muxer.finalize()?;
        info!(bytes_written = self.muxer.position(), "recording finalized");
        Ok(())
    }

    /**
        Consume the recorder and return the muxer.
    */
    pub fn into_muxer(self) -> M {
        self.muxer
    }

    fn check_writable(&self) -> Result<()> {
        if self.finalized {
            return Err(Error::usage("recorder already finalized"));
        }
        Ok(())
    }
}

impl<C: VideoCodec, M: SegmentMuxer> MediaSink for Recorder<C, M> {
    fn init_audio(&mut self, sample_rate: u32, channels: u16) -> Result<()> {
        self.check_writable()?;
        if self.audio.is_some() {
            return Err(Error::usage("audio track already initialized"));
        }
        if sample_rate == 0 {
            return Err(Error::invalid_data("audio sample rate must be non-zero"));
        }
        let channel_count = u8::try_from(channels)
            .map_err(|_| Error::invalid_data(format!("unsupported channel count {channels}")))?;

        let header = OpusHeader::new(channel_count, sample_rate).to_bytes();
        let track = tracks::register_audio_track(&mut self.muxer, sample_rate, channels, &header)?;
        self.audio = Some(AudioState { track, sample_rate });
        Ok(())
    }

    fn init_video(&mut self, config: VideoEncoderConfig) -> Result<()> {
        self.check_writable()?;
        if self.video.is_some() {
            return Err(Error::usage("video track already initialized"));
        }
        let codec = self
            .codec
            .take()
            .ok_or_else(|| Error::usage("video codec already consumed"))?;

        let width = config.width;
        let height = config.height;
        let encoder = VideoEncoder::new(codec, config)?;
        let image = PlanarImage::i420(width, height)?;
        let track = tracks::register_video_track(&mut self.muxer, width, height)?;
        self.video = Some(VideoState {
            track,
            encoder,
            image,
        });
        Ok(())
    }

    fn write_audio_frame(&mut self, data: &[u8], sample_count: u64) -> Result<()> {
        self.check_writable()?;
        let audio = self
            .audio
            .as_ref()
            .ok_or_else(|| Error::usage("audio track not initialized"))?;

        // The clock advances whether or not the muxer accepts the frame;
        // later frames keep their place on the timeline.
        let stamp_us = self.timeline.advance_audio(sample_count, audio.sample_rate);
        self.muxer.add_frame(audio.track, data, stamp_us * 1000, true)
    }

    fn write_video_frame(&mut self, frame_index: u64, rgba: &[u8]) -> Result<()> {
        self.check_writable()?;
        let video = self
            .video
            .as_mut()
            .ok_or_else(|| Error::usage("video track not initialized"))?;

        video.image.clear();
        video.image.convert_rgba(rgba)?;
        let frames = video.encoder.encode(&video.image, frame_index)?;

        let time_base = video.encoder.time_base();
        let tick = timeline::video_tick_ns(time_base);
        for frame in &frames {
            let block = BlockFrame {
                track: video.track,
                data: &frame.data,
                timestamp_ns: timeline::video_timestamp_ns(frame.pts, time_base),
                keyframe: frame.keyframe,
                duration_ns: Some(tick),
            };
            self.muxer.add_block(&block)?;
        }
        Ok(())
    }
}

impl<C: VideoCodec, M: SegmentMuxer> std::fmt::Debug for Recorder<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("audio", &self.audio.is_some())
            .field("video", &self.video.is_some())
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webm_encode::StubCodec;
    use webm_types::{AUDIO_TRACK_NUMBER, Rational, TIMECODE_SCALE_NS, VIDEO_TRACK_NUMBER};

    #[derive(Debug, Clone)]
    struct RecordedBlock {
        track: u64,
        timestamp_ns: u64,
        keyframe: bool,
        duration_ns: Option<u64>,
        data_len: usize,
    }

    #[derive(Debug, Default)]
    struct FakeMuxer {
        scale_override: Option<u64>,
        fail_first_blocks: u32,
        audio_tracks: Vec<(u32, u16)>,
        video_tracks: Vec<(u32, u32)>,
        codec_ids: Vec<(u64, String)>,
        codec_privates: Vec<(u64, Vec<u8>)>,
        bit_depths: Vec<(u64, u32)>,
        cues: Vec<u64>,
        blocks: Vec<RecordedBlock>,
        finalized: u32,
    }

    impl SegmentMuxer for FakeMuxer {
        fn add_audio_track(&mut self, sample_rate: u32, channels: u16, requested: u64) -> Result<u64> {
            self.audio_tracks.push((sample_rate, channels));
            Ok(requested)
        }
        fn add_video_track(&mut self, width: u32, height: u32, requested: u64) -> Result<u64> {
            self.video_tracks.push((width, height));
            Ok(requested)
        }
        fn set_codec_id(&mut self, track: u64, codec_id: &str) -> Result<()> {
            self.codec_ids.push((track, codec_id.to_string()));
            Ok(())
        }
        fn set_bit_depth(&mut self, track: u64, bits: u32) -> Result<()> {
            self.bit_depths.push((track, bits));
            Ok(())
        }
        fn set_codec_private(&mut self, track: u64, data: &[u8]) -> Result<()> {
            self.codec_privates.push((track, data.to_vec()));
            Ok(())
        }
        fn enable_cues(&mut self, track: u64) -> Result<()> {
            self.cues.push(track);
            Ok(())
        }
        fn timecode_scale_ns(&self) -> u64 {
            self.scale_override.unwrap_or(TIMECODE_SCALE_NS)
        }
        fn add_block(&mut self, frame: &BlockFrame<'_>) -> Result<()> {
            if self.fail_first_blocks > 0 {
                self.fail_first_blocks -= 1;
                return Err(Error::mux("injected block failure"));
            }
            self.blocks.push(RecordedBlock {
                track: frame.track,
                timestamp_ns: frame.timestamp_ns,
                keyframe: frame.keyframe,
                duration_ns: frame.duration_ns,
                data_len: frame.data.len(),
            });
            Ok(())
        }
        fn finalize(&mut self) -> Result<()> {
            self.finalized += 1;
            Ok(())
        }
        fn position(&self) -> u64 {
            self.blocks.len() as u64
        }
    }

    fn recorder() -> Recorder<StubCodec, FakeMuxer> {
        Recorder::new(FakeMuxer::default(), StubCodec::new())
    }

    fn video_config() -> VideoEncoderConfig {
        VideoEncoderConfig::new(4, 4, Rational::new(1, 30))
    }

    fn rgba_frame() -> Vec<u8> {
        vec![0x80; 4 * 4 * 4]
    }

    #[test]
    fn audio_frames_follow_the_sample_clock() {
        let mut recorder = recorder();
        recorder.init_audio(48_000, 2).unwrap();

        for count in [480, 480, 960] {
            recorder.write_audio_frame(&[0x11, 0x22], count).unwrap();
        }

        let muxer = recorder.into_muxer();
        let stamps: Vec<u64> = muxer.blocks.iter().map(|b| b.timestamp_ns).collect();
        assert_eq!(stamps, vec![0, 10_000_000, 20_000_000]);
        assert!(muxer.blocks.iter().all(|b| b.track == AUDIO_TRACK_NUMBER));
        assert!(muxer.blocks.iter().all(|b| b.keyframe));
        assert!(muxer.blocks.iter().all(|b| b.duration_ns.is_none()));
    }

    #[test]
    fn audio_init_registers_an_opus_head() {
        let mut recorder = recorder();
        recorder.init_audio(48_000, 1).unwrap();

        let muxer = recorder.into_muxer();
        assert_eq!(muxer.audio_tracks, vec![(48_000, 1)]);
        let (track, private) = &muxer.codec_privates[0];
        assert_eq!(*track, AUDIO_TRACK_NUMBER);
        assert_eq!(private.len(), 19);
        assert_eq!(&private[..8], b"OpusHead");
        assert_eq!(private[9], 1); // channel count
        assert!(muxer.codec_ids.contains(&(AUDIO_TRACK_NUMBER, "A_OPUS".to_string())));
        assert!(muxer.bit_depths.contains(&(AUDIO_TRACK_NUMBER, 32)));
    }

    #[test]
    fn video_frames_carry_one_tick_durations() {
        let mut recorder = recorder();
        recorder.init_video(video_config()).unwrap();

        let rgba = rgba_frame();
        for index in 0..3 {
            recorder.write_video_frame(index, &rgba).unwrap();
        }

        let muxer = recorder.into_muxer();
        assert_eq!(muxer.video_tracks, vec![(4, 4)]);
        assert_eq!(muxer.cues, vec![VIDEO_TRACK_NUMBER]);
        assert_eq!(muxer.blocks.len(), 3);

        let stamps: Vec<u64> = muxer.blocks.iter().map(|b| b.timestamp_ns).collect();
        assert_eq!(stamps, vec![0, 33_333_333, 66_666_666]);
        assert!(muxer.blocks.iter().all(|b| b.track == VIDEO_TRACK_NUMBER));
        assert!(muxer.blocks.iter().all(|b| b.duration_ns == Some(33_333_333)));
        assert!(muxer.blocks[0].keyframe);
        assert!(!muxer.blocks[1].keyframe);
        assert!(muxer.blocks.iter().all(|b| b.data_len > 0));
    }

    #[test]
    fn tracks_initialize_at_most_once() {
        let mut recorder = recorder();
        recorder.init_audio(48_000, 2).unwrap();
        recorder.init_video(video_config()).unwrap();

        assert!(matches!(
            recorder.init_audio(48_000, 2).unwrap_err(),
            Error::Usage(_)
        ));
        assert!(matches!(
            recorder.init_video(video_config()).unwrap_err(),
            Error::Usage(_)
        ));
    }

    #[test]
    fn writes_require_initialization() {
        let mut recorder = recorder();
        assert!(matches!(
            recorder.write_audio_frame(&[0x11], 480).unwrap_err(),
            Error::Usage(_)
        ));
        assert!(matches!(
            recorder.write_video_frame(0, &rgba_frame()).unwrap_err(),
            Error::Usage(_)
        ));
    }

    #[test]
    fn zero_sample_rates_are_rejected() {
        let mut recorder = recorder();
        assert!(matches!(
            recorder.init_audio(0, 2).unwrap_err(),
            Error::InvalidData(_)
        ));
    }

    #[test]
    fn finalize_is_once_and_blocks_everything_after() {
        let mut recorder = recorder();
        recorder.init_audio(48_000, 2).unwrap();
        recorder.write_audio_frame(&[0x11], 480).unwrap();
        recorder.finalize().unwrap();

        assert!(matches!(recorder.finalize().unwrap_err(), Error::Usage(_)));
        assert!(matches!(
            recorder.write_audio_frame(&[0x22], 480).unwrap_err(),
            Error::Usage(_)
        ));
        assert!(matches!(
            recorder.init_video(video_config()).unwrap_err(),
            Error::Usage(_)
        ));

        let muxer = recorder.into_muxer();
        assert_eq!(muxer.finalized, 1);
        assert_eq!(muxer.blocks.len(), 1);
    }

    #[test]
    fn failed_encodes_record_nothing() {
        let mut stub = StubCodec::new();
        stub.fail_encode_at = Some(0);
        let mut recorder = Recorder::new(FakeMuxer::default(), stub);
        recorder.init_video(video_config()).unwrap();

        let rgba = rgba_frame();
        assert!(recorder.write_video_frame(0, &rgba).is_err());
        assert_eq!(recorder.position(), 0);

        // The next capture index lands exactly where it belongs.
        recorder.write_video_frame(1, &rgba).unwrap();
        let muxer = recorder.into_muxer();
        assert_eq!(muxer.blocks.len(), 1);
        assert_eq!(muxer.blocks[0].timestamp_ns, 33_333_333);
    }

    #[test]
    fn failed_encodes_leave_the_audio_clock_untouched() {
        let mut stub = StubCodec::new();
        stub.fail_encode_at = Some(0);
        let mut recorder = Recorder::new(FakeMuxer::default(), stub);
        recorder.init_audio(48_000, 2).unwrap();
        recorder.init_video(video_config()).unwrap();

        recorder.write_audio_frame(&[0x11], 480).unwrap();
        assert!(recorder.write_video_frame(0, &rgba_frame()).is_err());
        recorder.write_audio_frame(&[0x22], 480).unwrap();

        let muxer = recorder.into_muxer();
        // Only the audio frames landed, one frame step apart.
        assert!(muxer.blocks.iter().all(|b| b.track == AUDIO_TRACK_NUMBER));
        let stamps: Vec<u64> = muxer.blocks.iter().map(|b| b.timestamp_ns).collect();
        assert_eq!(stamps, vec![0, 10_000_000]);
    }

    #[test]
    fn audio_clock_advances_past_rejected_frames() {
        let mut muxer = FakeMuxer::default();
        muxer.fail_first_blocks = 1;
        let mut recorder = Recorder::new(muxer, StubCodec::new());
        recorder.init_audio(48_000, 2).unwrap();

        assert!(recorder.write_audio_frame(&[0x11], 480).is_err());
        recorder.write_audio_frame(&[0x22], 480).unwrap();

        let muxer = recorder.into_muxer();
        assert_eq!(muxer.blocks.len(), 1);
        // The rejected frame still consumed its slot on the timeline.
        assert_eq!(muxer.blocks[0].timestamp_ns, 10_000_000);
    }

    #[test]
    fn bad_rgba_lengths_fail_before_the_encoder() {
        let mut recorder = recorder();
        recorder.init_video(video_config()).unwrap();

        let err = recorder.write_video_frame(0, &[0x00; 7]).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
        assert_eq!(recorder.into_muxer().blocks.len(), 0);
    }

    #[test]
    fn misbehaving_muxers_fail_init() {
        let mut muxer = FakeMuxer::default();
        muxer.scale_override = Some(1_000);
        let mut recorder = Recorder::new(muxer, StubCodec::new());
        assert!(matches!(
            recorder.init_audio(48_000, 2).unwrap_err(),
            Error::Setup(_)
        ));
    }

    #[test]
    fn recorder_reports_a_non_seekable_stream() {
        let recorder = recorder();
        assert!(!recorder.seekable());
        assert_eq!(recorder.position(), 0);
    }

    #[test]
    fn combined_recording_produces_a_webm_stream() {
        use webm_mux::WebmMuxer;
        use webm_types::BufferSink;

        fn contains(haystack: &[u8], needle: &[u8]) -> bool {
            haystack.windows(needle.len()).any(|w| w == needle)
        }

        let muxer = WebmMuxer::new(BufferSink::new()).with_writing_app("recorder-test");
        let mut recorder = Recorder::new(muxer, StubCodec::new());
        recorder.init_audio(48_000, 2).unwrap();
        recorder.init_video(video_config()).unwrap();

        let rgba = rgba_frame();
        recorder.write_video_frame(0, &rgba).unwrap();
        recorder.write_audio_frame(&[0x01, 0x02, 0x03], 480).unwrap();
        recorder.write_video_frame(1, &rgba).unwrap();
        recorder.write_audio_frame(&[0x04, 0x05], 480).unwrap();
        recorder.finalize().unwrap();

        let written = recorder.position();
        assert!(written > 0);

        let bytes = recorder.into_muxer().into_sink().into_inner();
        assert_eq!(bytes.len() as u64, written);
        assert_eq!(&bytes[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
        assert!(contains(&bytes, b"webm"));
        assert!(contains(&bytes, b"V_VP8"));
        assert!(contains(&bytes, b"A_OPUS"));
        assert!(contains(&bytes, b"OpusHead"));
        assert!(contains(&bytes, b"recorder-test"));
        // The keyframe at time zero opened a cluster.
        assert!(contains(&bytes, &[0x1F, 0x43, 0xB6, 0x75]));
    }
}
