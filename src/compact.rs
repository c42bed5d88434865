use crate::config::{ChannelWidth, RAW_RECORD_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum CompactError {
    #[error("Invalid capture buffer: length {len} is not a multiple of 4")]
    InvalidBuffer { len: usize },
}

/// Strips the unused channel-group bytes out of a raw capture buffer.
///
/// The device stores every record as [`RAW_RECORD_SIZE`] bytes covering all
/// four channel groups. With 8 or 16 enabled channels only the leading one
/// or two bytes of each record carry data; this shifts them left so the
/// buffer holds `record_count * width.record_size()` meaningful bytes.
///
/// The compaction is stable and in place. Returns the new length; bytes
/// past it are left as is. With 32 channels the buffer is already compact
/// and is returned untouched.
pub fn compact_in_place(buf: &mut [u8], width: ChannelWidth) -> Result<usize, CompactError> {
    if buf.len() % RAW_RECORD_SIZE != 0 {
        return Err(CompactError::InvalidBuffer { len: buf.len() });
    }

    let keep = width.record_size();
    if keep == RAW_RECORD_SIZE {
        return Ok(buf.len());
    }

    let records = buf.len() / RAW_RECORD_SIZE;
    for record in 0..records {
        let src = record * RAW_RECORD_SIZE;
        buf.copy_within(src..src + keep, record * keep);
    }

    Ok(records * keep)
}

/// [`compact_in_place`] over an owned buffer, truncating to the new length.
pub fn compact_vec(buf: &mut Vec<u8>, width: ChannelWidth) -> Result<(), CompactError> {
    let len = compact_in_place(buf, width)?;
    buf.truncate(len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_8_channels() {
        let mut buf = vec![
            0x01, 0x00, 0x00, 0x00, //
            0x01, 0x00, 0x00, 0x00, //
            0x02, 0x00, 0x00, 0x00,
        ];
        compact_vec(&mut buf, ChannelWidth::W8).unwrap();
        assert_eq!(buf, vec![0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_compact_16_channels() {
        let mut buf = vec![
            0x11, 0x22, 0xaa, 0xbb, //
            0x33, 0x44, 0xcc, 0xdd,
        ];
        compact_vec(&mut buf, ChannelWidth::W16).unwrap();
        assert_eq!(buf, vec![0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_compact_32_channels_is_identity() {
        let original: Vec<u8> = (0..16).collect();
        let mut buf = original.clone();
        compact_vec(&mut buf, ChannelWidth::W32).unwrap();
        assert_eq!(buf, original);
    }

    #[test]
    fn test_compacted_length_law() {
        for (width, expected) in [
            (ChannelWidth::W8, 8),
            (ChannelWidth::W16, 16),
            (ChannelWidth::W32, 32),
        ] {
            let mut buf = vec![0u8; 32];
            let len = compact_in_place(&mut buf, width).unwrap();
            assert_eq!(len, expected);
            assert_eq!(len, 32 * width.record_size() / RAW_RECORD_SIZE);
        }
    }

    #[test]
    fn test_prefix_selection_law() {
        // every compacted record equals the leading bytes of its source record
        let original: Vec<u8> = (0..40).collect();
        for width in [ChannelWidth::W8, ChannelWidth::W16] {
            let mut buf = original.clone();
            let keep = width.record_size();
            let len = compact_in_place(&mut buf, width).unwrap();
            for record in 0..original.len() / RAW_RECORD_SIZE {
                assert_eq!(
                    buf[record * keep..(record + 1) * keep],
                    original[record * RAW_RECORD_SIZE..record * RAW_RECORD_SIZE + keep]
                );
            }
            assert_eq!(len, original.len() / RAW_RECORD_SIZE * keep);
        }
    }

    #[test]
    fn test_unaligned_buffer_rejected() {
        let mut buf = vec![0u8; 7];
        let err = compact_in_place(&mut buf, ChannelWidth::W8).unwrap_err();
        assert!(matches!(err, CompactError::InvalidBuffer { len: 7 }));
    }

    #[test]
    fn test_recompaction_rejected_for_narrow_widths() {
        // an already-compacted 8-channel buffer is no longer 4-byte aligned
        // and must not be compacted again
        let mut buf = vec![
            0x01, 0x00, 0x00, 0x00, //
            0x01, 0x00, 0x00, 0x00, //
            0x02, 0x00, 0x00, 0x00,
        ];
        compact_vec(&mut buf, ChannelWidth::W8).unwrap();
        assert!(compact_in_place(&mut buf, ChannelWidth::W8).is_err());
    }

    #[test]
    fn test_empty_buffer() {
        let mut buf = Vec::new();
        compact_vec(&mut buf, ChannelWidth::W8).unwrap();
        assert!(buf.is_empty());
    }
}
