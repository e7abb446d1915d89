/*!
    The video codec contract.
*/

use webm_image::PlanarImage;
use webm_types::{CodecPacket, Result};

use crate::config::VideoEncoderConfig;

/**
    Per-submission encode flags.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeFlags {
    /// Force the emitted frame to be a keyframe.
    pub force_keyframe: bool,
}

/**
    A video encoder with a submit/drain packet protocol.

    Implementations buffer internally: one [`VideoCodec::encode`] call may
    make zero, one, or several packets available, pulled one at a time with
    [`VideoCodec::next_packet`] until it returns None.
*/
pub trait VideoCodec {
    /**
        Apply the configuration.

        A failure here is fatal: the codec is not usable afterwards.
    */
    fn configure(&mut self, config: &VideoEncoderConfig) -> Result<()>;

    /**
        Submit one prepared image covering `duration` timebase ticks.
    */
    fn encode(
        &mut self,
        image: &PlanarImage,
        frame_index: u64,
        duration: u64,
        flags: EncodeFlags,
    ) -> Result<()>;

    /**
        Pull the next buffered packet, or None when drained.
    */
    fn next_packet(&mut self) -> Option<CodecPacket>;
}
