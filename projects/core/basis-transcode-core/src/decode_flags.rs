use core::ops::{BitOr, BitOrAssign};

/// Bit flags forwarded to the transcoder for a single level decode.
///
/// The values match the bits the Basis Universal transcoder expects, so the raw value can be
/// passed across the C boundary unchanged.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecodeFlags(u32);

impl DecodeFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// PVRTC1: texture will use wrap addressing vs. clamp (most PVRTC viewer tools assume wrap
    /// addressing, so we default to wrap although that can cause edge artifacts).
    pub const PVRTC_WRAP_ADDRESSING: Self = Self(1);

    /// PVRTC1: decode non-pow2 ETC1S texture level to the next larger power of 2.
    /// Never set by the handle layer.
    pub const PVRTC_DECODE_TO_NEXT_POW2: Self = Self(2);

    /// When decoding to an opaque texture format, if the file has alpha, decode the alpha
    /// slice instead of the colour slice.
    pub const TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS: Self = Self(4);

    /// Forbid usage of BC1 3 colour blocks. Never set by the handle layer.
    pub const BC1_FORBID_THREE_COLOR_BLOCKS: Self = Self(8);

    /// The output buffer contains alpha endpoint/selector indices.
    /// Used internally by the transcoder; never set by the handle layer.
    pub const OUTPUT_HAS_ALPHA_INDICES: Self = Self(16);

    /// Creates flags from their raw bit representation. Unknown bits are kept.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Composes the flags used by a level transcode from the two caller options.
    ///
    /// - `wrap_addressing` sets [`Self::PVRTC_WRAP_ADDRESSING`].
    /// - `transcode_alpha_to_opaque` sets [`Self::TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS`].
    pub const fn from_options(wrap_addressing: bool, transcode_alpha_to_opaque: bool) -> Self {
        let mut bits = 0;
        if wrap_addressing {
            bits |= Self::PVRTC_WRAP_ADDRESSING.0;
        }
        if transcode_alpha_to_opaque {
            bits |= Self::TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS.0;
        }
        Self(bits)
    }
}

impl BitOr for DecodeFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DecodeFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
