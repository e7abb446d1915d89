/*!
    Video encoding pipeline.
*/

use webm_image::PlanarImage;
use webm_types::{CodecPacket, EncodedFrame, Error, Rational, Result};

use crate::codec::{EncodeFlags, VideoCodec};
use crate::config::VideoEncoderConfig;

/**
    Video encoder pipeline.

    Owns a codec instance and turns prepared planar images into compressed
    frames, draining the codec's packet queue on every submission.
*/
pub struct VideoEncoder<C: VideoCodec> {
    codec: C,
    time_base: Rational,
    width: u32,
    height: u32,
}

impl<C: VideoCodec> VideoEncoder<C> {
    /**
        Create a new encoder pipeline around a codec instance.

        The configuration is validated and applied before the pipeline is
        returned. A codec that cannot be configured is a fatal setup
        failure: no pipeline is constructed.
    */
    pub fn new(mut codec: C, config: VideoEncoderConfig) -> Result<Self> {
        config.validate()?;
        codec.configure(&config)?;

        Ok(Self {
            codec,
            time_base: config.time_base,
            width: config.width,
            height: config.height,
        })
    }

    /**
        Get the timebase for encoded frames.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Encode one prepared image, returning the compressed frames that
        became available.

        Each submission covers exactly one timebase tick, with no forced
        keyframe. The codec may buffer: zero, one, or several frames can
        come back, in emission order. Non-frame packets are discarded. On a
        codec error nothing is emitted for this submission.
    */
    pub fn encode(&mut self, image: &PlanarImage, frame_index: u64) -> Result<Vec<EncodedFrame>> {
        if image.width() != self.width || image.height() != self.height {
            return Err(Error::invalid_data(format!(
                "image dimensions {}x{} don't match encoder {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            )));
        }

        self.codec
            .encode(image, frame_index, 1, EncodeFlags::default())?;

        let mut frames = Vec::new();
        while let Some(packet) = self.codec.next_packet() {
            match packet {
                CodecPacket::Frame(frame) => frames.push(frame),
                _ => {}
            }
        }

        Ok(frames)
    }
}

impl<C: VideoCodec> std::fmt::Debug for VideoEncoder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}
