/*!
    Live-mode WebM segment writer.

    The writer is forward-only. The segment and every cluster use the
    unknown-size form so nothing needs backpatching, which keeps the output
    compatible with non-seekable sinks. Track descriptors are collected up
    front and flushed lazily: the EBML header, segment info, and track list
    go out together when the first block arrives (or at finalize, if no
    block ever does). From that point the track table is frozen.

    Blocks are grouped into clusters. A new cluster starts on every video
    keyframe, when the relative timecode would overflow the signed 16-bit
    field, or when the open cluster spans thirty seconds.
*/

use tracing::{debug, info};

use webm_types::{
    BlockFrame, ByteSink, Error, OPUS_CODEC_ID, Result, SegmentMuxer, TIMECODE_SCALE_NS,
    TrackKind, VP8_CODEC_ID,
};

use crate::ebml;

/// Longest span a single cluster may cover, in nanoseconds.
const MAX_CLUSTER_DURATION_NS: u64 = 30_000_000_000;

/// Name stamped into the segment's MuxingApp element.
const MUXING_APP: &str = concat!("webm-mux-", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
enum TrackSettings {
    Video {
        width: u32,
        height: u32,
    },
    Audio {
        sample_rate: u32,
        channels: u16,
        bit_depth: Option<u32>,
    },
}

#[derive(Debug)]
struct Track {
    number: u64,
    /// Equal to the track number, which keeps repeated runs byte-identical.
    uid: u64,
    kind: TrackKind,
    codec_id: String,
    codec_private: Option<Vec<u8>>,
    settings: TrackSettings,
    last_timestamp_ns: Option<u64>,
}

#[derive(Debug)]
struct Cluster {
    /// Absolute cluster timecode, in timecode-scale units.
    timecode: u64,
}

/**
    Streams a WebM segment into a [`ByteSink`].

    Implements [`SegmentMuxer`]; see the trait for the track and block
    operations. Construct with [`WebmMuxer::new`], feed it, then call
    [`SegmentMuxer::finalize`] exactly once.
*/
pub struct WebmMuxer<S: ByteSink> {
    sink: S,
    writing_app: String,
    tracks: Vec<Track>,
    cues_track: Option<u64>,
    header_written: bool,
    finalized: bool,
    cluster: Option<Cluster>,
}

impl<S: ByteSink> WebmMuxer<S> {
    /**
        Create a muxer writing a live WebM segment into `sink`.
    */
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            writing_app: MUXING_APP.to_string(),
            tracks: Vec::new(),
            cues_track: None,
            header_written: false,
            finalized: false,
            cluster: None,
        }
    }

    /**
        Set the name stamped into the segment's WritingApp element.

        Defaults to the muxing application name.
    */
    pub fn with_writing_app(mut self, name: impl Into<String>) -> Self {
        self.writing_app = name.into();
        self
    }

    /**
        Consume the muxer and return the sink.
    */
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn next_track_number(&self) -> u64 {
        self.tracks.iter().map(|t| t.number).max().unwrap_or(0) + 1
    }

    fn check_track_addition(&self, requested: u64) -> Result<u64> {
        if self.finalized {
            return Err(Error::mux("segment already finalized"));
        }
        if self.header_written {
            return Err(Error::mux("tracks cannot be added after the first block"));
        }
        let number = if requested == 0 {
            self.next_track_number()
        } else {
            requested
        };
        if self.tracks.iter().any(|t| t.number == number) {
            return Err(Error::mux(format!("track number {number} already in use")));
        }
        Ok(number)
    }

    fn track_mut(&mut self, number: u64) -> Result<&mut Track> {
        if self.header_written {
            return Err(Error::mux("track metadata is frozen after the first block"));
        }
        self.tracks
            .iter_mut()
            .find(|t| t.number == number)
            .ok_or_else(|| Error::mux(format!("unknown track {number}")))
    }

    fn write_header(&mut self) -> Result<()> {
        let mut buf = Vec::new();

        let mut header = Vec::new();
        ebml::write_uint(&mut header, ebml::EBML_VERSION, 1);
        ebml::write_uint(&mut header, ebml::EBML_READ_VERSION, 1);
        ebml::write_uint(&mut header, ebml::EBML_MAX_ID_LENGTH, 4);
        ebml::write_uint(&mut header, ebml::EBML_MAX_SIZE_LENGTH, 8);
        ebml::write_string(&mut header, ebml::DOC_TYPE, "webm");
        ebml::write_uint(&mut header, ebml::DOC_TYPE_VERSION, 2);
        ebml::write_uint(&mut header, ebml::DOC_TYPE_READ_VERSION, 2);
        ebml::write_master(&mut buf, ebml::EBML_HEADER, &header);

        // The segment stays open for the rest of the stream.
        ebml::write_id(&mut buf, ebml::SEGMENT);
        ebml::write_unknown_size(&mut buf);

        let mut info = Vec::new();
        ebml::write_uint(&mut info, ebml::TIMECODE_SCALE, TIMECODE_SCALE_NS);
        ebml::write_string(&mut info, ebml::MUXING_APP, MUXING_APP);
        ebml::write_string(&mut info, ebml::WRITING_APP, &self.writing_app);
        ebml::write_master(&mut buf, ebml::INFO, &info);

        let mut tracks = Vec::new();
        for track in &self.tracks {
            let mut entry = Vec::new();
            ebml::write_uint(&mut entry, ebml::TRACK_NUMBER, track.number);
            ebml::write_uint(&mut entry, ebml::TRACK_UID, track.uid);
            let track_type = match track.kind {
                TrackKind::Video => 1,
                TrackKind::Audio => 2,
            };
            ebml::write_uint(&mut entry, ebml::TRACK_TYPE, track_type);
            ebml::write_string(&mut entry, ebml::CODEC_ID, &track.codec_id);
            if let Some(private) = &track.codec_private {
                ebml::write_binary(&mut entry, ebml::CODEC_PRIVATE, private);
            }
            match track.settings {
                TrackSettings::Video { width, height } => {
                    let mut video = Vec::new();
                    ebml::write_uint(&mut video, ebml::PIXEL_WIDTH, u64::from(width));
                    ebml::write_uint(&mut video, ebml::PIXEL_HEIGHT, u64::from(height));
                    ebml::write_master(&mut entry, ebml::VIDEO, &video);
                }
                TrackSettings::Audio {
                    sample_rate,
                    channels,
                    bit_depth,
                } => {
                    let mut audio = Vec::new();
                    ebml::write_float(&mut audio, ebml::SAMPLING_FREQUENCY, sample_rate as f32);
                    ebml::write_uint(&mut audio, ebml::CHANNELS, u64::from(channels));
                    if let Some(bits) = bit_depth {
                        ebml::write_uint(&mut audio, ebml::BIT_DEPTH, u64::from(bits));
                    }
                    ebml::write_master(&mut entry, ebml::AUDIO, &audio);
                }
            }
            ebml::write_master(&mut tracks, ebml::TRACK_ENTRY, &entry);
        }
        ebml::write_master(&mut buf, ebml::TRACKS, &tracks);

        self.sink.write(&buf)?;
        self.header_written = true;
        debug!(tracks = self.tracks.len(), "segment header written");
        Ok(())
    }

    fn start_cluster(&mut self, timecode: u64) -> Result<()> {
        let mut buf = Vec::new();
        ebml::write_id(&mut buf, ebml::CLUSTER);
        ebml::write_unknown_size(&mut buf);
        ebml::write_uint(&mut buf, ebml::TIMECODE, timecode);
        self.sink.write(&buf)?;
        self.cluster = Some(Cluster { timecode });
        debug!(timecode, "cluster started");
        Ok(())
    }
}

impl<S: ByteSink> SegmentMuxer for WebmMuxer<S> {
    fn add_audio_track(&mut self, sample_rate: u32, channels: u16, requested: u64) -> Result<u64> {
        let number = self.check_track_addition(requested)?;
        self.tracks.push(Track {
            number,
            uid: number,
            kind: TrackKind::Audio,
            codec_id: OPUS_CODEC_ID.to_string(),
            codec_private: None,
            settings: TrackSettings::Audio {
                sample_rate,
                channels,
                bit_depth: None,
            },
            last_timestamp_ns: None,
        });
        info!(track = number, sample_rate, channels, "audio track added");
        Ok(number)
    }

    fn add_video_track(&mut self, width: u32, height: u32, requested: u64) -> Result<u64> {
        let number = self.check_track_addition(requested)?;
        self.tracks.push(Track {
            number,
            uid: number,
            kind: TrackKind::Video,
            codec_id: VP8_CODEC_ID.to_string(),
            codec_private: None,
            settings: TrackSettings::Video { width, height },
            last_timestamp_ns: None,
        });
        info!(track = number, width, height, "video track added");
        Ok(number)
    }

    fn set_codec_id(&mut self, track: u64, codec_id: &str) -> Result<()> {
        self.track_mut(track)?.codec_id = codec_id.to_string();
        Ok(())
    }

    fn set_bit_depth(&mut self, track: u64, bits: u32) -> Result<()> {
        let entry = self.track_mut(track)?;
        match &mut entry.settings {
            TrackSettings::Audio { bit_depth, .. } => {
                *bit_depth = Some(bits);
                Ok(())
            }
            TrackSettings::Video { .. } => {
                Err(Error::mux(format!("track {track} is not an audio track")))
            }
        }
    }

    fn set_codec_private(&mut self, track: u64, data: &[u8]) -> Result<()> {
        self.track_mut(track)?.codec_private = Some(data.to_vec());
        Ok(())
    }

    fn enable_cues(&mut self, track: u64) -> Result<()> {
        self.track_mut(track)?;
        self.cues_track = Some(track);
        Ok(())
    }

    fn timecode_scale_ns(&self) -> u64 {
        TIMECODE_SCALE_NS
    }

    fn add_block(&mut self, frame: &BlockFrame<'_>) -> Result<()> {
        if self.finalized {
            return Err(Error::mux("segment already finalized"));
        }

        let (kind, last_units) = {
            let track = self
                .tracks
                .iter()
                .find(|t| t.number == frame.track)
                .ok_or_else(|| Error::mux(format!("unknown track {}", frame.track)))?;
            if let Some(last) = track.last_timestamp_ns {
                if frame.timestamp_ns < last {
                    return Err(Error::mux(format!(
                        "timestamp {} regresses behind {} on track {}",
                        frame.timestamp_ns, last, frame.track
                    )));
                }
            }
            (
                track.kind,
                track.last_timestamp_ns.map(|ns| ns / TIMECODE_SCALE_NS),
            )
        };

        if !self.header_written {
            self.write_header()?;
        }

        let timecode = frame.timestamp_ns / TIMECODE_SCALE_NS;
        // A block older than the open cluster is unrepresentable in
        // forward-only output, whether or not it would roll a cluster.
        if let Some(cluster) = &self.cluster {
            if timecode < cluster.timecode {
                return Err(Error::mux(format!(
                    "timestamp {} predates the open cluster at {}",
                    frame.timestamp_ns, cluster.timecode
                )));
            }
        }
        let needs_new_cluster = match &self.cluster {
            None => true,
            Some(cluster) => {
                let relative = timecode - cluster.timecode;
                (frame.keyframe && kind == TrackKind::Video)
                    || relative > i16::MAX as u64
                    || relative.saturating_mul(TIMECODE_SCALE_NS) >= MAX_CLUSTER_DURATION_NS
            }
        };
        if needs_new_cluster {
            self.start_cluster(timecode)?;
        }

        let cluster_timecode = match &self.cluster {
            Some(cluster) => cluster.timecode,
            None => return Err(Error::mux("no open cluster")),
        };
        // In range: the predate guard and the rollover rules bound it.
        let relative = (timecode - cluster_timecode) as i16;

        let mut buf = Vec::new();
        match frame.duration_ns {
            None => write_simple_block(&mut buf, frame, relative),
            Some(duration_ns) => {
                // A non-key frame always carries a reference; with no
                // prior block on the track it points at the track origin.
                let reference = if frame.keyframe {
                    None
                } else {
                    let prev = last_units.unwrap_or(0);
                    Some(prev as i64 - timecode as i64)
                };
                write_block_group(&mut buf, frame, relative, duration_ns, reference);
            }
        }
        self.sink.write(&buf)?;

        if let Some(track) = self.tracks.iter_mut().find(|t| t.number == frame.track) {
            track.last_timestamp_ns = Some(frame.timestamp_ns);
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(Error::mux("segment already finalized"));
        }
        if !self.header_written {
            self.write_header()?;
        }
        // Unknown-size clusters need no closing bytes; readers stop at
        // end of stream.
        self.cluster = None;
        self.finalized = true;
        if self.cues_track.is_some() {
            debug!("cue index omitted from live output");
        }
        info!(bytes_written = self.sink.position(), "segment finalized");
        Ok(())
    }

    fn position(&self) -> u64 {
        self.sink.position()
    }
}

impl<S: ByteSink> std::fmt::Debug for WebmMuxer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebmMuxer")
            .field("tracks", &self.tracks.len())
            .field("header_written", &self.header_written)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

fn block_payload(frame: &BlockFrame<'_>, relative: i16, keyframe_flag: bool) -> Vec<u8> {
    let mut payload = Vec::with_capacity(frame.data.len() + 8);
    // Track numbers are encoded like data-size vints.
    ebml::write_size(&mut payload, frame.track);
    payload.extend_from_slice(&relative.to_be_bytes());
    payload.push(if keyframe_flag { 0x80 } else { 0x00 });
    payload.extend_from_slice(frame.data);
    payload
}

fn write_simple_block(buf: &mut Vec<u8>, frame: &BlockFrame<'_>, relative: i16) {
    let payload = block_payload(frame, relative, frame.keyframe);
    ebml::write_binary(buf, ebml::SIMPLE_BLOCK, &payload);
}

fn write_block_group(
    buf: &mut Vec<u8>,
    frame: &BlockFrame<'_>,
    relative: i16,
    duration_ns: u64,
    reference_units: Option<i64>,
) {
    let mut group = Vec::new();
    // Block carries no keyframe flag; keyness is signaled by the absence
    // of a ReferenceBlock.
    let payload = block_payload(frame, relative, false);
    ebml::write_binary(&mut group, ebml::BLOCK, &payload);
    ebml::write_uint(
        &mut group,
        ebml::BLOCK_DURATION,
        duration_ns / TIMECODE_SCALE_NS,
    );
    if let Some(reference) = reference_units {
        ebml::write_int(&mut group, ebml::REFERENCE_BLOCK, reference);
    }
    ebml::write_master(buf, ebml::BLOCK_GROUP, &group);
}
