//! The contract between the container handle and a transcoding backend.
//!
//! A backend ([`TranscoderEngine`]) owns any per-session decode state. The container bytes are
//! always passed in by reference; the engine never holds onto them between calls.

use crate::decode_flags::DecodeFlags;
use crate::format::TranscoderTextureFormat;
use crate::size::ImageLevelDesc;

/// Summary of one image in a container (describes its level 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageInfo {
    /// Index of the image.
    pub image_index: u32,
    /// Number of mip levels in the image.
    pub total_levels: u32,
    /// Width of level 0 in pixels, before block alignment.
    pub orig_width: u32,
    /// Height of level 0 in pixels, before block alignment.
    pub orig_height: u32,
    /// Width of level 0 in blocks.
    pub num_blocks_x: u32,
    /// Height of level 0 in blocks.
    pub num_blocks_y: u32,
    /// Total blocks of level 0.
    pub total_blocks: u32,
    /// Whether the image has an alpha slice.
    pub alpha_flag: bool,
    /// Index of the first slice belonging to the image.
    pub first_slice_index: u32,
}

/// Detailed description of a single (image, level) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageLevelInfo {
    /// Index of the image.
    pub image_index: u32,
    /// Index of the mip level.
    pub level_index: u32,
    /// Width in pixels, before block alignment.
    pub orig_width: u32,
    /// Height in pixels, before block alignment.
    pub orig_height: u32,
    /// Width rounded up to whole 4x4 blocks.
    pub width: u32,
    /// Height rounded up to whole 4x4 blocks.
    pub height: u32,
    /// Width in blocks.
    pub num_blocks_x: u32,
    /// Height in blocks.
    pub num_blocks_y: u32,
    /// `num_blocks_x * num_blocks_y`.
    pub total_blocks: u32,
    /// Whether the level has an alpha slice.
    pub alpha_flag: bool,
    /// Index of the (colour) slice backing this level.
    pub first_slice_index: u32,
}

impl ImageLevelInfo {
    /// The subset of this info the size resolver needs.
    #[inline]
    pub const fn desc(&self) -> ImageLevelDesc {
        ImageLevelDesc::new(self.orig_width, self.orig_height, self.total_blocks)
    }
}

/// Parameters of a single level decode.
///
/// `output_units` is a block count for block compressed formats and a pixel count for
/// uncompressed formats. A row pitch or row count of 0 lets the engine pick the natural value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeRequest {
    /// Target format.
    pub format: TranscoderTextureFormat,
    /// Capacity of the destination buffer, in blocks or pixels.
    pub output_units: u32,
    /// Options for the decoder.
    pub flags: DecodeFlags,
    /// Row pitch of the destination, in blocks or pixels. 0 for the default.
    pub output_row_pitch: u32,
    /// Number of rows in the destination, in blocks or pixels. 0 for the default.
    pub output_rows: u32,
}

/// A backend able to validate, describe and transcode `.basis` containers.
///
/// Metadata queries are stateless with respect to the session and take the container bytes
/// explicitly. `start_transcoding` and `transcode_image_level` act on the engine's own
/// session state.
pub trait TranscoderEngine {
    /// Returns true if `data` starts with a well formed header.
    fn validate_header(&self, data: &[u8]) -> bool;

    /// Number of images in the container, or 0 if it cannot be read.
    fn total_images(&self, data: &[u8]) -> u32;

    /// Description of `image_index`, if present.
    fn image_info(&self, data: &[u8], image_index: u32) -> Option<ImageInfo>;

    /// Size-relevant description of a level, if present.
    fn image_level_desc(
        &self,
        data: &[u8],
        image_index: u32,
        level_index: u32,
    ) -> Option<ImageLevelDesc>;

    /// Full description of a level, if present.
    fn image_level_info(
        &self,
        data: &[u8],
        image_index: u32,
        level_index: u32,
    ) -> Option<ImageLevelInfo>;

    /// Prepares session state (e.g. decodes the codebooks of `data`) for later transcodes.
    fn start_transcoding(&mut self, data: &[u8]) -> bool;

    /// Drops any session state. Called when the handle is opened on a new buffer or closed.
    fn stop_transcoding(&mut self) {}

    /// Transcodes one level into `dst`. Returns the decoder's status unchanged.
    fn transcode_image_level(
        &mut self,
        data: &[u8],
        image_index: u32,
        level_index: u32,
        dst: &mut [u8],
        request: &TranscodeRequest,
    ) -> bool;
}
