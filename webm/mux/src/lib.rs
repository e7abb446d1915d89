/*!
    Live-mode WebM muxing for the webm crate ecosystem.

    This crate serializes track descriptors and frame records into a
    streamable WebM segment. Output is forward-only: the segment and every
    cluster use the unknown-size form, so the writer never seeks and the
    byte stream can go straight to a pipe or a network socket. The price is
    that no cue index or total duration is written, which players tolerate
    for live content.
*/

pub use webm_types::{BlockFrame, ByteSink, Error, Result, SegmentMuxer};

mod ebml;
mod muxer;

pub use muxer::WebmMuxer;
