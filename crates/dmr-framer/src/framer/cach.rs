/// Common Announcement Channel TACT decoding.
/// See ETSI TS 102 361-1 Clause 9.3.5.
///
/// The CACH occupies the first 24 bits of a base-station burst. Its TACT
/// channel is 7 bits, Hamming (7,4,3) protected, spread across the CACH;
/// the remaining 17 bits carry short LC fragments and are left to the
/// downstream message factories.

use super::burst_consts::CACH_BITS;

/// CACH bit positions holding the 7 TACT bits, in TACT order
const TACT_BIT_POSITIONS: [usize; 7] = [0, 4, 8, 12, 14, 18, 22];

/// Syndrome produced by an error in each parity bit position tact[4..7].
/// Parity equations: p0 = d0+d1+d2, p1 = d1+d2+d3, p2 = d0+d1+d3
/// (ETSI TS 102 361-1 Annex B).
const PARITY_SYNDROMES: [u8; 3] = [0b001, 0b010, 0b100];

/// Decoded TACT content of a CACH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cach {
    /// Access type: inbound channel busy flag
    pub access_type: bool,
    /// Timeslot of the payload carried by this burst
    pub timeslot: u8,
    /// Link control start/stop
    pub lcss: u8,
    /// TACT bits repaired by the Hamming code
    pub corrected_bits: u8,
}

#[inline]
fn get_bit(bytes: &[u8], bit: usize) -> u8 {
    (bytes[bit / 8] >> (7 - (bit % 8))) & 1
}

/// Decode the TACT channel from the first 3 bytes (24 bits) of a burst.
///
/// A zero syndrome is a clean TACT. A syndrome implicating a parity bit is
/// repaired; it leaves the decoded fields untouched. A syndrome implicating
/// an information bit is rejected: on a distance-3 code such a "correction"
/// aliases with double errors, and a wrong timeslot mis-routes the burst,
/// so the caller falls back to timeslot toggling instead.
pub fn decode(cach_bytes: &[u8]) -> Option<Cach> {
    assert!(cach_bytes.len() * 8 >= CACH_BITS);

    let mut tact = [0u8; 7];
    for (i, &pos) in TACT_BIT_POSITIONS.iter().enumerate() {
        tact[i] = get_bit(cach_bytes, pos);
    }

    let syndrome = (tact[0] ^ tact[1] ^ tact[2] ^ tact[4])
        | (tact[1] ^ tact[2] ^ tact[3] ^ tact[5]) << 1
        | (tact[0] ^ tact[1] ^ tact[3] ^ tact[6]) << 2;

    let mut corrected_bits = 0;
    if syndrome != 0 {
        PARITY_SYNDROMES.iter().position(|&s| s == syndrome)?;
        corrected_bits = 1;
    }

    Some(Cach {
        access_type: tact[0] == 1,
        timeslot: tact[1],
        lcss: (tact[2] << 1) | tact[3],
        corrected_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build 3 CACH bytes carrying the given TACT fields with valid parity
    fn encode(access_type: bool, timeslot: u8, lcss: u8) -> [u8; 3] {
        let d = [
            access_type as u8,
            timeslot & 1,
            (lcss >> 1) & 1,
            lcss & 1,
        ];
        let tact = [
            d[0],
            d[1],
            d[2],
            d[3],
            d[0] ^ d[1] ^ d[2],
            d[1] ^ d[2] ^ d[3],
            d[0] ^ d[1] ^ d[3],
        ];
        let mut bytes = [0u8; 3];
        for (i, &pos) in TACT_BIT_POSITIONS.iter().enumerate() {
            bytes[pos / 8] |= tact[i] << (7 - (pos % 8));
        }
        bytes
    }

    fn flip(bytes: &mut [u8; 3], position: usize) {
        bytes[position / 8] ^= 1 << (7 - (position % 8));
    }

    #[test]
    fn test_decode_all_fields() {
        for at in [false, true] {
            for ts in 0..2u8 {
                for lcss in 0..4u8 {
                    let decoded = decode(&encode(at, ts, lcss)).unwrap();
                    assert_eq!(decoded.access_type, at);
                    assert_eq!(decoded.timeslot, ts);
                    assert_eq!(decoded.lcss, lcss);
                    assert_eq!(decoded.corrected_bits, 0);
                }
            }
        }
    }

    #[test]
    fn test_parity_bit_error_repaired() {
        let clean = encode(true, 1, 0b10);
        for &pos in &TACT_BIT_POSITIONS[4..] {
            let mut damaged = clean;
            flip(&mut damaged, pos);
            let decoded = decode(&damaged).unwrap();
            assert_eq!(decoded.access_type, true);
            assert_eq!(decoded.timeslot, 1);
            assert_eq!(decoded.lcss, 0b10);
            assert_eq!(decoded.corrected_bits, 1);
        }
    }

    #[test]
    fn test_information_bit_error_rejected() {
        let clean = encode(false, 1, 0);
        for &pos in &TACT_BIT_POSITIONS[..4] {
            let mut damaged = clean;
            flip(&mut damaged, pos);
            assert!(decode(&damaged).is_none(), "position {}", pos);
        }
    }

    #[test]
    fn test_payload_bits_ignored() {
        // Bits outside the TACT positions do not affect the decode
        let mut bytes = encode(false, 0, 0);
        bytes[0] |= 0b0110_0110;
        bytes[2] |= 0b0000_0001;
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.timeslot, 0);
        assert_eq!(decoded.corrected_bits, 0);
    }
}
