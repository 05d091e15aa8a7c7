//! Process-wide decode tables shared by every transcoding session.
//!
//! The tables are pure functions of compiled-in constants. They are built once, on first use,
//! and never torn down; every session borrows them as `&'static`.
//!
//! [`SliceDecoder`] implementations receive the shared instance in every call and read the
//! tables through the accessors on [`GlobalCodebook`]. C decoders get the same tables as raw
//! arrays when a session starts.
//!
//! [`SliceDecoder`]: crate::basis::SliceDecoder

/// ETC1 intensity modifier tables, indexed by table index then selector.
pub const ETC1_INTENSITY_MODIFIERS: [[i16; 4]; 8] = [
    [-8, -2, 2, 8],
    [-17, -5, 5, 17],
    [-29, -9, 9, 29],
    [-42, -13, 13, 42],
    [-60, -18, 18, 60],
    [-80, -24, 24, 80],
    [-106, -33, 33, 106],
    [-183, -47, 47, 183],
];

/// Signed value of each 3-bit ETC1 differential colour delta.
pub const ETC1_DELTA3: [i8; 8] = [0, 1, 2, 3, -4, -3, -2, -1];

/// Read-only decode tables shared by all sessions.
///
/// Obtain the process-wide instance with [`global_codebook`]; constructing additional
/// instances with [`GlobalCodebook::new`] is allowed (e.g. for `no_std` hosts that manage
/// their own statics), they are identical in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalCodebook {
    expand5: [u8; 32],
    expand4: [u8; 16],
    /// `[base level (5-bit)][intensity table][selector]`, clamped to 0..=255.
    etc1_colors: [[[u8; 4]; 8]; 32],
}

impl GlobalCodebook {
    /// Builds the tables from the compiled-in constants.
    pub const fn new() -> Self {
        let mut expand5 = [0u8; 32];
        let mut i = 0;
        while i < 32 {
            expand5[i] = expand5_bits(i as u8);
            i += 1;
        }

        let mut expand4 = [0u8; 16];
        let mut i = 0;
        while i < 16 {
            expand4[i] = expand4_bits(i as u8);
            i += 1;
        }

        let mut etc1_colors = [[[0u8; 4]; 8]; 32];
        let mut base = 0;
        while base < 32 {
            let mut table = 0;
            while table < 8 {
                let mut selector = 0;
                while selector < 4 {
                    let value =
                        expand5[base] as i16 + ETC1_INTENSITY_MODIFIERS[table][selector];
                    etc1_colors[base][table][selector] = clamp_u8(value);
                    selector += 1;
                }
                table += 1;
            }
            base += 1;
        }

        Self {
            expand5,
            expand4,
            etc1_colors,
        }
    }

    /// Expands a 5-bit colour component to 8 bits.
    #[inline]
    pub const fn expand5(&self, value: u8) -> u8 {
        self.expand5[(value & 31) as usize]
    }

    /// Expands a 4-bit colour component to 8 bits.
    #[inline]
    pub const fn expand4(&self, value: u8) -> u8 {
        self.expand4[(value & 15) as usize]
    }

    /// Final 8-bit component for an ETC1 5-bit base level, intensity table and selector.
    #[inline]
    pub const fn etc1_color(&self, base5: u8, table: u8, selector: u8) -> u8 {
        self.etc1_colors[(base5 & 31) as usize][(table & 7) as usize][(selector & 3) as usize]
    }

    /// The 5-bit expansion table, indexed by the 5-bit value.
    #[inline]
    pub const fn expand5_table(&self) -> &[u8; 32] {
        &self.expand5
    }

    /// The 4-bit expansion table, indexed by the 4-bit value.
    #[inline]
    pub const fn expand4_table(&self) -> &[u8; 16] {
        &self.expand4
    }

    /// Every value of [`Self::etc1_color`], laid out as `[base5][table][selector]`.
    #[inline]
    pub const fn etc1_color_table(&self) -> &[[[u8; 4]; 8]; 32] {
        &self.etc1_colors
    }

    /// Applies a 3-bit ETC1 differential delta to a 5-bit base, returning [`None`] when the
    /// result leaves the 5-bit range.
    #[inline]
    pub const fn apply_delta3(&self, base5: u8, delta3: u8) -> Option<u8> {
        let value = base5 as i16 + ETC1_DELTA3[(delta3 & 7) as usize] as i16;
        if value < 0 || value > 31 {
            None
        } else {
            Some(value as u8)
        }
    }
}

impl Default for GlobalCodebook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
static GLOBAL_CODEBOOK: std::sync::OnceLock<GlobalCodebook> = std::sync::OnceLock::new();

/// Returns the process-wide codebook, constructing it on first call.
///
/// Concurrent first calls are safe; exactly one construction is observed.
#[cfg(feature = "std")]
pub fn global_codebook() -> &'static GlobalCodebook {
    GLOBAL_CODEBOOK.get_or_init(GlobalCodebook::new)
}

/// Constructs the process-wide codebook if it has not been constructed yet.
///
/// Idempotent. Calling this is optional: handles construct the codebook lazily.
#[cfg(feature = "std")]
pub fn basis_init() {
    let _ = global_codebook();
}

#[inline(always)]
const fn expand5_bits(value: u8) -> u8 {
    (value << 3) | (value >> 2)
}

#[inline(always)]
const fn expand4_bits(value: u8) -> u8 {
    (value << 4) | value
}

#[inline(always)]
const fn clamp_u8(value: i16) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 8)]
    #[case(16, 132)]
    #[case(31, 255)]
    fn expand5_replicates_high_bits(#[case] value: u8, #[case] expected: u8) {
        assert_eq!(GlobalCodebook::new().expand5(value), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0x11)]
    #[case(15, 0xFF)]
    fn expand4_replicates_nibble(#[case] value: u8, #[case] expected: u8) {
        assert_eq!(GlobalCodebook::new().expand4(value), expected);
    }

    #[test]
    fn etc1_colors_are_clamped() {
        let codebook = GlobalCodebook::new();
        // Darkest base with the strongest negative modifier.
        assert_eq!(codebook.etc1_color(0, 7, 0), 0);
        // Brightest base with the strongest positive modifier.
        assert_eq!(codebook.etc1_color(31, 7, 3), 255);
        // Mid base, smallest positive modifier: 132 + 2.
        assert_eq!(codebook.etc1_color(16, 0, 2), 134);
    }

    #[test]
    fn tables_match_lookups() {
        let codebook = GlobalCodebook::new();
        for value in 0..32u8 {
            assert_eq!(codebook.expand5_table()[value as usize], codebook.expand5(value));
        }
        for value in 0..16u8 {
            assert_eq!(codebook.expand4_table()[value as usize], codebook.expand4(value));
        }
        assert_eq!(codebook.etc1_color_table()[16][0][2], codebook.etc1_color(16, 0, 2));
        assert_eq!(codebook.etc1_color_table()[31][7][3], 255);
    }

    #[rstest]
    #[case(10, 3, Some(13))]
    #[case(10, 4, Some(6))]
    #[case(1, 4, None)]
    #[case(30, 2, None)]
    fn delta3_stays_in_range(#[case] base: u8, #[case] delta: u8, #[case] expected: Option<u8>) {
        assert_eq!(GlobalCodebook::new().apply_delta3(base, delta), expected);
    }

    #[test]
    #[cfg(feature = "std")]
    fn global_codebook_is_constructed_once() {
        basis_init();
        let first = global_codebook() as *const GlobalCodebook;
        basis_init();
        let second = global_codebook() as *const GlobalCodebook;
        assert_eq!(first, second);
        assert_eq!(global_codebook(), &GlobalCodebook::new());
    }

    #[test]
    #[cfg(feature = "std")]
    fn global_codebook_is_shared_across_threads() {
        let addresses: Vec<usize> = (0..4)
            .map(|_| std::thread::spawn(|| global_codebook() as *const _ as usize))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
