/*!
    Deterministic test codec.

    A stand-in for a real bitstream encoder so pipeline and container tests
    can run without native codec bindings.
*/

use std::collections::VecDeque;

use webm_image::{Plane, PlanarImage};
use webm_types::{CodecPacket, EncodedFrame, Error, Result};

use crate::codec::{EncodeFlags, VideoCodec};
use crate::config::VideoEncoderConfig;

/**
    In-memory codec with deterministic output.

    Every accepted frame becomes one packet whose payload embeds the frame
    index and a luma checksum, so tests can match packets to submissions.
    Keyframe cadence, lookahead delay, and failure injection are all
    configurable through the public fields before the first use.
*/
#[derive(Debug, Default)]
pub struct StubCodec {
    /// Emit a keyframe every this many frames (0 = only frame 0 is key).
    pub keyframe_interval: u64,
    /// Hold this many packets back to simulate encoder lookahead.
    pub delay: usize,
    /// Emit one metadata packet before the first frame packet.
    pub leading_metadata: bool,
    /// Refuse configuration.
    pub fail_configure: bool,
    /// Fail the encode call for this frame index.
    pub fail_encode_at: Option<u64>,
    configured: bool,
    submissions: u64,
    held: VecDeque<CodecPacket>,
    queue: VecDeque<CodecPacket>,
}

impl StubCodec {
    /**
        Create a stub with default settings: no delay, no failures, frame 0
        is the only keyframe.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Number of encode calls accepted so far.
    */
    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    fn is_keyframe(&self, frame_index: u64) -> bool {
        if self.keyframe_interval == 0 {
            frame_index == 0
        } else {
            frame_index % self.keyframe_interval == 0
        }
    }
}

impl VideoCodec for StubCodec {
    fn configure(&mut self, config: &VideoEncoderConfig) -> Result<()> {
        if self.fail_configure {
            return Err(Error::codec("stub codec refused configuration"));
        }
        config.validate()?;
        self.configured = true;
        Ok(())
    }

    fn encode(
        &mut self,
        image: &PlanarImage,
        frame_index: u64,
        _duration: u64,
        flags: EncodeFlags,
    ) -> Result<()> {
        if !self.configured {
            return Err(Error::codec("stub codec used before configuration"));
        }
        if self.fail_encode_at == Some(frame_index) {
            return Err(Error::codec(format!(
                "stub encode failure injected at frame {}",
                frame_index
            )));
        }

        let luma = image
            .plane_data(Plane::Luma)
            .ok_or_else(|| Error::codec("image has no luma plane"))?;
        let width = image.plane_width(Plane::Luma) as usize;
        let checksum = luma[..width].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));

        if self.leading_metadata {
            self.leading_metadata = false;
            self.queue.push_back(CodecPacket::Metadata(b"stats".to_vec()));
        }

        let mut data = frame_index.to_be_bytes().to_vec();
        data.push(checksum);
        self.held.push_back(CodecPacket::Frame(EncodedFrame {
            data,
            pts: frame_index as i64,
            keyframe: flags.force_keyframe || self.is_keyframe(frame_index),
        }));
        self.submissions += 1;

        while self.held.len() > self.delay {
            if let Some(packet) = self.held.pop_front() {
                self.queue.push_back(packet);
            }
        }
        Ok(())
    }

    fn next_packet(&mut self) -> Option<CodecPacket> {
        self.queue.pop_front()
    }
}
