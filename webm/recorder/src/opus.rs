/*!
    Opus identification header.
*/

/// Default encoder pre-skip, in 48 kHz samples.
const DEFAULT_PRE_SKIP: u16 = 312;

/**
    The "OpusHead" structure carried in an Opus track's codec-private data.

    Layout per RFC 7845 section 5.1: magic, version, channel count,
    pre-skip, input sample rate, output gain, and the channel mapping
    family. Mapping family zero covers mono and stereo, which is all this
    recorder produces.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpusHeader {
    /// Number of output channels.
    pub channels: u8,
    /// Samples (at 48 kHz) a decoder discards before valid output.
    pub pre_skip: u16,
    /// Sample rate of the original input, informational only.
    pub input_sample_rate: u32,
    /// Output gain in Q7.8 dB, applied by the decoder.
    pub output_gain: i16,
    /// Channel mapping family (0 = mono/stereo).
    pub mapping_family: u8,
}

impl OpusHeader {
    /**
        Create a header with the default pre-skip and no output gain.
    */
    pub fn new(channels: u8, input_sample_rate: u32) -> Self {
        Self {
            channels,
            pre_skip: DEFAULT_PRE_SKIP,
            input_sample_rate,
            output_gain: 0,
            mapping_family: 0,
        }
    }

    /**
        Set the pre-skip, in 48 kHz samples.
    */
    pub fn with_pre_skip(mut self, pre_skip: u16) -> Self {
        self.pre_skip = pre_skip;
        self
    }

    /**
        Serialize the 19-byte identification header.
    */
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(19);
        bytes.extend_from_slice(b"OpusHead");
        bytes.push(1); // version
        bytes.push(self.channels);
        bytes.extend_from_slice(&self.pre_skip.to_le_bytes());
        bytes.extend_from_slice(&self.input_sample_rate.to_le_bytes());
        bytes.extend_from_slice(&self.output_gain.to_le_bytes());
        bytes.push(self.mapping_family);
        bytes
    }
}
