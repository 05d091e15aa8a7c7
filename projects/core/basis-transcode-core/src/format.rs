//! The closed set of formats a `.basis` level can be transcoded into.
//!
//! Formats fall into two families which determine how output sizes are computed:
//!
//! - [`FormatFamily::Uncompressed`]: plain raster images, a fixed number of bytes per pixel.
//! - [`FormatFamily::BlockCompressed`]: 2D arrays of fixed size blocks.

use derive_enum_all_values::AllValues;

/// Number of valid [`TranscoderTextureFormat`] values.
///
/// Any raw format value greater or equal to this is invalid.
pub const TOTAL_TEXTURE_FORMATS: u32 = 22;

/// A GPU format that a `.basis` image level can be transcoded into.
///
/// The discriminants are part of the stable C ABI and must not change.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum TranscoderTextureFormat {
    /// ETC1 RGB, 4x4 blocks, 8 bytes per block.
    Etc1Rgb = 0,
    /// ETC2 RGBA (ETC2 EAC alpha + ETC1 colour), 16 bytes per block.
    Etc2Rgba = 1,
    /// BC1 (a.k.a. DXT1) RGB, 8 bytes per block.
    Bc1Rgb = 2,
    /// BC3 (a.k.a. DXT5) RGBA, 16 bytes per block.
    Bc3Rgba = 3,
    /// BC4 single channel, 8 bytes per block.
    Bc4R = 4,
    /// BC5 two channel, 16 bytes per block.
    Bc5Rg = 5,
    /// BC7 mode 6 opaque, 16 bytes per block.
    Bc7M6Rgb = 6,
    /// BC7 mode 5 with alpha, 16 bytes per block.
    Bc7M5Rgba = 7,
    /// PVRTC1 4bpp RGB, 8 bytes per block. Requires power of 2 dimensions.
    Pvrtc1_4Rgb = 8,
    /// PVRTC1 4bpp RGBA, 8 bytes per block. Requires power of 2 dimensions.
    Pvrtc1_4Rgba = 9,
    /// ASTC 4x4 LDR RGBA, 16 bytes per block.
    Astc4x4Rgba = 10,
    /// ATC RGB, 8 bytes per block.
    AtcRgb = 11,
    /// ATC RGBA (interpolated alpha), 16 bytes per block.
    AtcRgba = 12,
    /// 32bpp RGBA raster, 4 bytes per pixel.
    Rgba32 = 13,
    /// 16bpp RGB565 raster.
    Rgb565 = 14,
    /// 16bpp BGR565 raster.
    Bgr565 = 15,
    /// 16bpp RGBA4444 raster.
    Rgba4444 = 16,
    /// FXT1 RGB, 8x4 blocks, 16 bytes per block.
    Fxt1Rgb = 17,
    /// PVRTC2 4bpp RGB, 8 bytes per block.
    Pvrtc2_4Rgb = 18,
    /// PVRTC2 4bpp RGBA, 8 bytes per block.
    Pvrtc2_4Rgba = 19,
    /// ETC2 EAC R11 unsigned, 8 bytes per block.
    Etc2EacR11 = 20,
    /// ETC2 EAC RG11 unsigned, 16 bytes per block.
    Etc2EacRg11 = 21,
}

/// Determines which sizing rule applies to a [`TranscoderTextureFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFamily {
    /// One fixed size entry per pixel.
    Uncompressed,
    /// Fixed size blocks, each covering a small pixel footprint.
    BlockCompressed,
}

impl TranscoderTextureFormat {
    /// Converts a raw format value (as received over the C API) into a format.
    ///
    /// Returns [`None`] for values `>=` [`TOTAL_TEXTURE_FORMATS`].
    pub const fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Etc1Rgb,
            1 => Self::Etc2Rgba,
            2 => Self::Bc1Rgb,
            3 => Self::Bc3Rgba,
            4 => Self::Bc4R,
            5 => Self::Bc5Rg,
            6 => Self::Bc7M6Rgb,
            7 => Self::Bc7M5Rgba,
            8 => Self::Pvrtc1_4Rgb,
            9 => Self::Pvrtc1_4Rgba,
            10 => Self::Astc4x4Rgba,
            11 => Self::AtcRgb,
            12 => Self::AtcRgba,
            13 => Self::Rgba32,
            14 => Self::Rgb565,
            15 => Self::Bgr565,
            16 => Self::Rgba4444,
            17 => Self::Fxt1Rgb,
            18 => Self::Pvrtc2_4Rgb,
            19 => Self::Pvrtc2_4Rgba,
            20 => Self::Etc2EacR11,
            21 => Self::Etc2EacRg11,
            _ => return None,
        })
    }

    /// The raw value of this format, as used by the C API.
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// The sizing family of this format.
    #[inline]
    pub const fn family(self) -> FormatFamily {
        match self {
            Self::Rgba32 | Self::Rgb565 | Self::Bgr565 | Self::Rgba4444 => {
                FormatFamily::Uncompressed
            }
            _ => FormatFamily::BlockCompressed,
        }
    }

    /// Whether this is a plain raster format.
    #[inline]
    pub const fn is_uncompressed(self) -> bool {
        matches!(self.family(), FormatFamily::Uncompressed)
    }

    /// Whether this is one of the PVRTC1 formats, which need extra padding for small textures.
    #[inline]
    pub const fn is_pvrtc1(self) -> bool {
        matches!(self, Self::Pvrtc1_4Rgb | Self::Pvrtc1_4Rgba)
    }

    /// Bytes per pixel of an uncompressed format.
    ///
    /// Returns 0 for block compressed formats.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba32 => 4,
            Self::Rgb565 | Self::Bgr565 | Self::Rgba4444 => 2,
            _ => 0,
        }
    }

    /// Bytes per block of a block compressed format.
    ///
    /// For uncompressed formats this is the size of a single pixel, so a 'block' is one pixel.
    pub const fn bytes_per_block(self) -> u32 {
        match self {
            Self::Etc1Rgb
            | Self::Bc1Rgb
            | Self::Bc4R
            | Self::Pvrtc1_4Rgb
            | Self::Pvrtc1_4Rgba
            | Self::AtcRgb
            | Self::Pvrtc2_4Rgb
            | Self::Pvrtc2_4Rgba
            | Self::Etc2EacR11 => 8,
            Self::Etc2Rgba
            | Self::Bc3Rgba
            | Self::Bc5Rg
            | Self::Bc7M6Rgb
            | Self::Bc7M5Rgba
            | Self::Astc4x4Rgba
            | Self::AtcRgba
            | Self::Fxt1Rgb
            | Self::Etc2EacRg11 => 16,
            Self::Rgba32 => 4,
            Self::Rgb565 | Self::Bgr565 | Self::Rgba4444 => 2,
        }
    }

    /// Width of a block in pixels (1 for uncompressed formats).
    pub const fn block_width(self) -> u32 {
        match self {
            Self::Fxt1Rgb => 8,
            Self::Rgba32 | Self::Rgb565 | Self::Bgr565 | Self::Rgba4444 => 1,
            _ => 4,
        }
    }

    /// Height of a block in pixels (1 for uncompressed formats).
    pub const fn block_height(self) -> u32 {
        match self {
            Self::Rgba32 | Self::Rgb565 | Self::Bgr565 | Self::Rgba4444 => 1,
            _ => 4,
        }
    }

    /// Whether the output format stores an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Etc2Rgba
                | Self::Bc3Rgba
                | Self::Bc7M5Rgba
                | Self::Pvrtc1_4Rgba
                | Self::Astc4x4Rgba
                | Self::AtcRgba
                | Self::Rgba32
                | Self::Rgba4444
                | Self::Pvrtc2_4Rgba
        )
    }

    /// Parses a lowercase format name, e.g. `bc7_m5_rgba` or `rgba32`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all_values()
            .iter()
            .copied()
            .find(|format| format.name().eq_ignore_ascii_case(name))
    }

    /// Short, lowercase, human readable name of the format.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Etc1Rgb => "etc1_rgb",
            Self::Etc2Rgba => "etc2_rgba",
            Self::Bc1Rgb => "bc1_rgb",
            Self::Bc3Rgba => "bc3_rgba",
            Self::Bc4R => "bc4_r",
            Self::Bc5Rg => "bc5_rg",
            Self::Bc7M6Rgb => "bc7_m6_rgb",
            Self::Bc7M5Rgba => "bc7_m5_rgba",
            Self::Pvrtc1_4Rgb => "pvrtc1_4_rgb",
            Self::Pvrtc1_4Rgba => "pvrtc1_4_rgba",
            Self::Astc4x4Rgba => "astc_4x4_rgba",
            Self::AtcRgb => "atc_rgb",
            Self::AtcRgba => "atc_rgba",
            Self::Rgba32 => "rgba32",
            Self::Rgb565 => "rgb565",
            Self::Bgr565 => "bgr565",
            Self::Rgba4444 => "rgba4444",
            Self::Fxt1Rgb => "fxt1_rgb",
            Self::Pvrtc2_4Rgb => "pvrtc2_4_rgb",
            Self::Pvrtc2_4Rgba => "pvrtc2_4_rgba",
            Self::Etc2EacR11 => "etc2_eac_r11",
            Self::Etc2EacRg11 => "etc2_eac_rg11",
        }
    }
}

impl TryFrom<u32> for TranscoderTextureFormat {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or(raw)
    }
}

impl From<TranscoderTextureFormat> for u32 {
    fn from(format: TranscoderTextureFormat) -> Self {
        format.to_raw()
    }
}
