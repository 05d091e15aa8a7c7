use crate::codebook::GlobalCodebook;
use crate::engine::TranscodeRequest;
use alloc::boxed::Box;

/// The codebook and table sections of a container, handed to
/// [`SliceDecoder::start_transcoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodebookSections<'a> {
    /// Number of endpoint codebook entries.
    pub total_endpoints: u32,
    /// Encoded endpoint codebook.
    pub endpoints: &'a [u8],
    /// Number of selector codebook entries.
    pub total_selectors: u32,
    /// Encoded selector codebook.
    pub selectors: &'a [u8],
    /// Encoded Huffman tables for the slice streams.
    pub tables: &'a [u8],
    /// Extended data section; empty if absent.
    pub extended: &'a [u8],
}

/// A single level, already located and bounds checked, handed to
/// [`SliceDecoder::transcode_slice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceTranscode<'a> {
    /// Index of the image.
    pub image_index: u32,
    /// Index of the mip level.
    pub level_index: u32,
    /// Width in pixels, before block alignment.
    pub orig_width: u32,
    /// Height in pixels, before block alignment.
    pub orig_height: u32,
    /// Width in blocks.
    pub num_blocks_x: u32,
    /// Height in blocks.
    pub num_blocks_y: u32,
    /// Encoded colour slice.
    pub data: &'a [u8],
    /// Encoded alpha slice, if the file has alpha.
    pub alpha_data: Option<&'a [u8]>,
}

/// Decodes the entropy coded block streams of a `.basis` file into GPU formats.
///
/// Everything about the container itself (headers, slice lookup, bounds and size checks)
/// has already been handled by [`BasisTranscoder`] when these methods are called.
///
/// [`BasisTranscoder`]: super::BasisTranscoder
pub trait SliceDecoder {
    /// Decodes the codebooks of a container into session state.
    fn start_transcoding(
        &mut self,
        codebook: &GlobalCodebook,
        sections: &CodebookSections<'_>,
    ) -> bool;

    /// Releases session state.
    fn stop_transcoding(&mut self) {}

    /// Decodes one level into `dst`, which is large enough for `request`.
    fn transcode_slice(
        &mut self,
        codebook: &GlobalCodebook,
        slice: &SliceTranscode<'_>,
        dst: &mut [u8],
        request: &TranscodeRequest,
    ) -> bool;
}

impl<T: SliceDecoder + ?Sized> SliceDecoder for Box<T> {
    fn start_transcoding(
        &mut self,
        codebook: &GlobalCodebook,
        sections: &CodebookSections<'_>,
    ) -> bool {
        (**self).start_transcoding(codebook, sections)
    }

    fn stop_transcoding(&mut self) {
        (**self).stop_transcoding()
    }

    fn transcode_slice(
        &mut self,
        codebook: &GlobalCodebook,
        slice: &SliceTranscode<'_>,
        dst: &mut [u8],
        request: &TranscodeRequest,
    ) -> bool {
        (**self).transcode_slice(codebook, slice, dst, request)
    }
}

/// A decoder for metadata-only use. Sessions start, but every transcode fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoSliceDecoder;

impl SliceDecoder for NoSliceDecoder {
    fn start_transcoding(&mut self, _: &GlobalCodebook, _: &CodebookSections<'_>) -> bool {
        true
    }

    fn transcode_slice(
        &mut self,
        _: &GlobalCodebook,
        _: &SliceTranscode<'_>,
        _: &mut [u8],
        _: &TranscodeRequest,
    ) -> bool {
        false
    }
}
