/*!
    Minimal EBML serialization.

    Element IDs are written verbatim; they carry their own length marker in
    the leading byte. Data sizes use variable-length integers in the fewest
    bytes that can hold them, with the all-ones pattern reserved for the
    unknown-size form. Only the element types a live WebM segment needs are
    covered here.
*/

// Element IDs, as they appear on the wire.
pub(crate) const EBML_HEADER: u32 = 0x1A45_DFA3;
pub(crate) const EBML_VERSION: u32 = 0x4286;
pub(crate) const EBML_READ_VERSION: u32 = 0x42F7;
pub(crate) const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
pub(crate) const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
pub(crate) const DOC_TYPE: u32 = 0x4282;
pub(crate) const DOC_TYPE_VERSION: u32 = 0x4287;
pub(crate) const DOC_TYPE_READ_VERSION: u32 = 0x4285;

pub(crate) const SEGMENT: u32 = 0x1853_8067;
pub(crate) const INFO: u32 = 0x1549_A966;
pub(crate) const TIMECODE_SCALE: u32 = 0x2A_D7B1;
pub(crate) const MUXING_APP: u32 = 0x4D80;
pub(crate) const WRITING_APP: u32 = 0x5741;

pub(crate) const TRACKS: u32 = 0x1654_AE6B;
pub(crate) const TRACK_ENTRY: u32 = 0xAE;
pub(crate) const TRACK_NUMBER: u32 = 0xD7;
pub(crate) const TRACK_UID: u32 = 0x73C5;
pub(crate) const TRACK_TYPE: u32 = 0x83;
pub(crate) const CODEC_ID: u32 = 0x86;
pub(crate) const CODEC_PRIVATE: u32 = 0x63A2;
pub(crate) const VIDEO: u32 = 0xE0;
pub(crate) const PIXEL_WIDTH: u32 = 0xB0;
pub(crate) const PIXEL_HEIGHT: u32 = 0xBA;
pub(crate) const AUDIO: u32 = 0xE1;
pub(crate) const SAMPLING_FREQUENCY: u32 = 0xB5;
pub(crate) const CHANNELS: u32 = 0x9F;
pub(crate) const BIT_DEPTH: u32 = 0x6264;

pub(crate) const CLUSTER: u32 = 0x1F43_B675;
pub(crate) const TIMECODE: u32 = 0xE7;
pub(crate) const SIMPLE_BLOCK: u32 = 0xA3;
pub(crate) const BLOCK_GROUP: u32 = 0xA0;
pub(crate) const BLOCK: u32 = 0xA1;
pub(crate) const BLOCK_DURATION: u32 = 0x9B;
pub(crate) const REFERENCE_BLOCK: u32 = 0xFB;

/// Append an element ID in its minimal big-endian form.
pub(crate) fn write_id(buf: &mut Vec<u8>, id: u32) {
    let bytes = id.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    buf.extend_from_slice(&bytes[skip..]);
}

/// Append a data-size vint using the fewest bytes that can hold `size`.
///
/// A length-n vint stores 7n data bits, but the all-ones pattern of every
/// length is reserved for the unknown-size marker, so a size landing exactly
/// on that pattern takes the next length up.
pub(crate) fn write_size(buf: &mut Vec<u8>, size: u64) {
    let mut length = 1usize;
    while length < 8 {
        let all_ones = (1u64 << (7 * length)) - 1;
        if size < all_ones {
            break;
        }
        length += 1;
    }

    let marker = 1u64 << (7 * length);
    let bytes = (marker | size).to_be_bytes();
    buf.extend_from_slice(&bytes[8 - length..]);
}

/// Append the reserved 8-byte unknown-size marker.
pub(crate) fn write_unknown_size(buf: &mut Vec<u8>) {
    buf.extend_from_slice(&[0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
}

/// Append an unsigned integer element with a minimal-length payload.
pub(crate) fn write_uint(buf: &mut Vec<u8>, id: u32, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count().min(7);
    write_id(buf, id);
    write_size(buf, (8 - skip) as u64);
    buf.extend_from_slice(&bytes[skip..]);
}

/// Append a signed integer element with a minimal-length payload.
pub(crate) fn write_int(buf: &mut Vec<u8>, id: u32, value: i64) {
    let mut length = 1usize;
    while length < 8 {
        let bits = 8 * length as u32;
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if value >= min && value <= max {
            break;
        }
        length += 1;
    }

    let bytes = value.to_be_bytes();
    write_id(buf, id);
    write_size(buf, length as u64);
    buf.extend_from_slice(&bytes[8 - length..]);
}

/// Append a 4-byte float element.
pub(crate) fn write_float(buf: &mut Vec<u8>, id: u32, value: f32) {
    write_id(buf, id);
    write_size(buf, 4);
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Append a string element.
pub(crate) fn write_string(buf: &mut Vec<u8>, id: u32, value: &str) {
    write_binary(buf, id, value.as_bytes());
}

/// Append a binary element.
pub(crate) fn write_binary(buf: &mut Vec<u8>, id: u32, data: &[u8]) {
    write_id(buf, id);
    write_size(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

/// Append a master element with a known size wrapping `children`.
pub(crate) fn write_master(buf: &mut Vec<u8>, id: u32, children: &[u8]) {
    write_id(buf, id);
    write_size(buf, children.len() as u64);
    buf.extend_from_slice(children);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_bytes(id: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_id(&mut buf, id);
        buf
    }

    fn size_bytes(size: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_size(&mut buf, size);
        buf
    }

    #[test]
    fn ids_keep_their_wire_length() {
        assert_eq!(id_bytes(TRACK_ENTRY), vec![0xAE]);
        assert_eq!(id_bytes(TRACK_UID), vec![0x73, 0xC5]);
        assert_eq!(id_bytes(TIMECODE_SCALE), vec![0x2A, 0xD7, 0xB1]);
        assert_eq!(id_bytes(EBML_HEADER), vec![0x1A, 0x45, 0xDF, 0xA3]);
    }

    #[test]
    fn sizes_use_minimal_vints() {
        assert_eq!(size_bytes(0), vec![0x80]);
        assert_eq!(size_bytes(2), vec![0x82]);
        assert_eq!(size_bytes(126), vec![0xFE]);
        assert_eq!(size_bytes(128), vec![0x40, 0x80]);
        assert_eq!(size_bytes(16382), vec![0x7F, 0xFE]);
    }

    #[test]
    fn all_ones_sizes_widen_to_the_next_length() {
        // 127 would collide with the reserved 0xFF pattern.
        assert_eq!(size_bytes(127), vec![0x40, 0x7F]);
        assert_eq!(size_bytes(16383), vec![0x20, 0x3F, 0xFF]);
    }

    #[test]
    fn unknown_size_is_the_reserved_marker() {
        let mut buf = Vec::new();
        write_unknown_size(&mut buf);
        assert_eq!(
            buf,
            vec![0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn uints_shrink_to_minimal_payloads() {
        let mut buf = Vec::new();
        write_uint(&mut buf, TRACK_NUMBER, 1);
        assert_eq!(buf, vec![0xD7, 0x81, 0x01]);

        let mut buf = Vec::new();
        write_uint(&mut buf, TIMECODE, 0);
        assert_eq!(buf, vec![0xE7, 0x81, 0x00]);

        let mut buf = Vec::new();
        write_uint(&mut buf, TIMECODE, 0x0123_4567);
        assert_eq!(buf, vec![0xE7, 0x84, 0x01, 0x23, 0x45, 0x67]);
    }

    #[test]
    fn ints_use_twos_complement() {
        let mut buf = Vec::new();
        write_int(&mut buf, REFERENCE_BLOCK, -33);
        assert_eq!(buf, vec![0xFB, 0x81, 0xDF]);

        let mut buf = Vec::new();
        write_int(&mut buf, REFERENCE_BLOCK, -129);
        assert_eq!(buf, vec![0xFB, 0x82, 0xFF, 0x7F]);
    }

    #[test]
    fn floats_are_four_bytes_big_endian() {
        let mut buf = Vec::new();
        write_float(&mut buf, SAMPLING_FREQUENCY, 48000.0);
        assert_eq!(buf, vec![0xB5, 0x84, 0x47, 0x3B, 0x80, 0x00]);
    }

    #[test]
    fn masters_wrap_their_children() {
        let mut child = Vec::new();
        write_uint(&mut child, TIMECODE, 7);
        let mut buf = Vec::new();
        write_master(&mut buf, CLUSTER, &child);
        assert_eq!(
            buf,
            vec![0x1F, 0x43, 0xB6, 0x75, 0x83, 0xE7, 0x81, 0x07]
        );
    }

    #[test]
    fn strings_carry_raw_bytes() {
        let mut buf = Vec::new();
        write_string(&mut buf, DOC_TYPE, "webm");
        assert_eq!(buf, vec![0x42, 0x82, 0x84, b'w', b'e', b'b', b'm']);
    }
}
