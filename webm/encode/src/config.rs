/*!
    Encoder configuration types.
*/

use webm_types::{Error, Rational, Result};

/**
    Encoder deadline: how much time the codec may spend per frame.

    Realtime trades compression efficiency for latency and is the default
    for live capture.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncoderDeadline {
    /// Emit each frame as fast as possible.
    #[default]
    Realtime,
    /// Balanced speed and compression.
    Good,
    /// Best compression, slowest.
    Best,
}

/**
    Configuration for video encoding.
*/
#[derive(Clone, Debug)]
pub struct VideoEncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Timebase: seconds per presentation tick.
    pub time_base: Rational,
    /// Target bitrate in bits per second (None = codec default).
    pub bitrate: Option<u64>,
    /// Encoder deadline.
    pub deadline: EncoderDeadline,
}

impl VideoEncoderConfig {
    /**
        Create a new video encoder configuration.
    */
    pub fn new(width: u32, height: u32, time_base: Rational) -> Self {
        Self {
            width,
            height,
            time_base,
            bitrate: None,
            deadline: EncoderDeadline::default(),
        }
    }

    /**
        Set the target bitrate in bits per second.
    */
    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /**
        Set the encoder deadline.
    */
    pub fn with_deadline(mut self, deadline: EncoderDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    /**
        Check the configuration against encoder preconditions.
    */
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_data(format!(
                "encoder dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.time_base.num <= 0 || self.time_base.den <= 0 {
            return Err(Error::invalid_data(format!(
                "timebase components must be positive, got {}/{}",
                self.time_base.num, self.time_base.den
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_fields() {
        let config = VideoEncoderConfig::new(640, 480, Rational::new(1, 30))
            .with_bitrate(2_500_000)
            .with_deadline(EncoderDeadline::Good);

        assert_eq!(config.width, 640);
        assert_eq!(config.bitrate, Some(2_500_000));
        assert_eq!(config.deadline, EncoderDeadline::Good);
    }

    #[test]
    fn default_leaves_bitrate_to_the_codec() {
        let config = VideoEncoderConfig::new(640, 480, Rational::new(1, 30));
        assert_eq!(config.bitrate, None);
        assert_eq!(config.deadline, EncoderDeadline::Realtime);
    }

    #[test]
    fn validate_rejects_bad_dimensions_and_timebase() {
        let timebase = Rational::new(1, 30);
        assert!(VideoEncoderConfig::new(0, 480, timebase).validate().is_err());
        assert!(VideoEncoderConfig::new(640, 0, timebase).validate().is_err());
        assert!(
            VideoEncoderConfig::new(640, 480, Rational::new(1, 0))
                .validate()
                .is_err()
        );
        assert!(
            VideoEncoderConfig::new(640, 480, Rational::new(-1, 30))
                .validate()
                .is_err()
        );
        assert!(VideoEncoderConfig::new(640, 480, timebase).validate().is_ok());
    }
}
