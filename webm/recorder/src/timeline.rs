/*!
    Track timing.

    Audio time is an accumulator over delivered sample counts; video time
    is derived from the capture index and the configured frame rate. Both
    stay in integer arithmetic end to end so repeated runs over the same
    input produce identical stamps.
*/

use webm_types::Rational;

/// Running audio clock, in microseconds.
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    audio_ts_us: u64,
}

impl Timeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stamp for an audio frame of `sample_count` samples, advancing the
    /// clock past it. The stamp is the clock value before the advance, so
    /// the first frame always lands at zero.
    pub(crate) fn advance_audio(&mut self, sample_count: u64, sample_rate: u32) -> u64 {
        let stamp = self.audio_ts_us;
        self.audio_ts_us += sample_count * 1_000_000 / u64::from(sample_rate);
        stamp
    }
}

/// Nanoseconds covered by one video frame at `time_base` seconds per tick.
pub(crate) fn video_tick_ns(time_base: Rational) -> u64 {
    1_000_000_000 * time_base.num as u64 / time_base.den as u64
}

/// Presentation time of the frame at tick `pts`, in nanoseconds.
pub(crate) fn video_timestamp_ns(pts: i64, time_base: Rational) -> u64 {
    pts as u64 * video_tick_ns(time_base)
}
