/*!
    Video encoding pipeline for the webm crate ecosystem.

    This crate drives a video codec through a submit/drain protocol: a
    prepared planar image goes in, and every compressed packet the codec has
    ready comes back out before the call returns. The codec itself stays
    behind the [`VideoCodec`] trait; which implementation to use is an
    explicit input, never ambient state.

    # Encoding

    ```ignore
    use webm_encode::{VideoEncoder, VideoEncoderConfig};
    use webm_image::PlanarImage;
    use webm_types::Rational;

    // 640x480 at 30 fps, 2.5 Mbps target.
    let config = VideoEncoderConfig::new(640, 480, Rational { num: 1, den: 30 })
        .with_bitrate(2_500_000);

    let mut encoder = VideoEncoder::new(vp8_codec, config)?;

    let mut image = PlanarImage::i420(640, 480)?;
    for (index, rgba) in captured_frames.iter().enumerate() {
        image.clear();
        image.convert_rgba(rgba)?;
        for frame in encoder.encode(&image, index as u64)? {
            // Hand to the muxer.
        }
    }
    ```

    # Packet draining

    Codecs buffer internally (lookahead and similar bookkeeping). One
    submission may surface zero, one, or several packets; the pipeline
    drains them all, in emission order, and discards non-frame packets so
    the container only ever sees compressed frames.

    # Testing

    [`StubCodec`] is a deterministic in-memory codec for exercising the
    pipeline, and everything downstream of it, without native codec
    bindings.
*/

pub use webm_types::{CodecPacket, EncodedFrame, Error, Rational, Result};

mod codec;
mod config;
mod testing;
mod video;

pub use codec::{EncodeFlags, VideoCodec};
pub use config::{EncoderDeadline, VideoEncoderConfig};
pub use testing::StubCodec;
pub use video::VideoEncoder;
