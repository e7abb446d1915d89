/*!
    Packet and frame record types.
*/

/**
    Media kind of a container track.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Audio track.
    Audio,
    /// Video track.
    Video,
}

/**
    One compressed video frame pulled from a codec.

    `pts` is expressed in encoder timebase ticks; downstream code converts it
    to container time using the encoder's timebase.
*/
#[derive(Clone, Debug)]
pub struct EncodedFrame {
    /// Compressed payload bytes.
    pub data: Vec<u8>,
    /// Presentation time in encoder timebase ticks.
    pub pts: i64,
    /// True if the frame is decodable without reference to prior frames.
    pub keyframe: bool,
}

/**
    A packet emitted by a video codec.

    Codecs may interleave non-frame packets (statistics and similar
    bookkeeping) with compressed frames. Consumers forward only `Frame`
    packets to the container.
*/
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum CodecPacket {
    /// A compressed video frame.
    Frame(EncodedFrame),
    /// Codec bookkeeping output, not part of the video stream.
    Metadata(Vec<u8>),
}

/**
    A container-level frame record.

    Transient: constructed per emitted frame, handed to the muxer, and not
    retained afterwards.
*/
#[derive(Clone, Copy, Debug)]
pub struct BlockFrame<'a> {
    /// Track the frame belongs to.
    pub track: u64,
    /// Frame payload bytes.
    pub data: &'a [u8],
    /// Presentation timestamp in nanoseconds.
    pub timestamp_ns: u64,
    /// True if the frame is a random-access point.
    pub keyframe: bool,
    /// Frame duration in nanoseconds, if known.
    pub duration_ns: Option<u64>,
}
