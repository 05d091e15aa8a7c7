/// CRC-16 as used by `.basis` headers and slices (CCITT polynomial, inverted in and out).
///
/// `crc` is the running value; pass 0 to start a new checksum.
pub const fn crc16(data: &[u8], crc: u16) -> u16 {
    let mut crc = !crc;
    let mut i = 0;
    while i < data.len() {
        let q = data[i] ^ (crc >> 8) as u8;
        let k = ((q >> 4) ^ q) as u16;
        crc = (crc << 8) ^ k ^ (k << 5) ^ (k << 12);
        i += 1;
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[rstest]
    #[case(b"123456789", 0xD64E)]
    #[case(b"", 0x0000)]
    #[case(&[0u8], 0x1E0F)]
    fn known_vectors(#[case] data: &[u8], #[case] expected: u16) {
        assert_eq!(crc16(data, 0), expected);
    }

    #[test]
    fn can_be_computed_incrementally() {
        let whole = crc16(b"123456789", 0);
        let partial = crc16(b"6789", crc16(b"12345", 0));
        assert_eq!(whole, partial);
    }
}
