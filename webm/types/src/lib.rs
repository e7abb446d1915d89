/*!
    Shared types for the webm crate ecosystem.

    This crate defines the vocabulary of the ecosystem: the types that cross crate
    boundaries. It has no dependency on any codec or container implementation,
    making it lightweight and enabling consumers to depend on it without pulling
    in an encoder or a muxer.
*/

mod error;
mod packet;
mod rational;
mod segment;
mod sink;

pub use error::{Error, Result};
pub use packet::{BlockFrame, CodecPacket, EncodedFrame, TrackKind};
pub use rational::Rational;
pub use segment::{
    AUDIO_TRACK_NUMBER, OPUS_CODEC_ID, SegmentMuxer, TIMECODE_SCALE_NS, VIDEO_TRACK_NUMBER,
    VP8_CODEC_ID,
};
pub use sink::{BufferSink, ByteSink, WriterSink};
