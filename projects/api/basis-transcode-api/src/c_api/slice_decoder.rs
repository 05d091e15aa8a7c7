//! C-compatible slice decoder interface.
//!
//! Lets a C host supply the block decoder that [`BasisTranscoder`] delegates to.
//!
//! [`BasisTranscoder`]: basis_transcode_core::BasisTranscoder

use basis_transcode_core::basis::{CodebookSections, SliceDecoder, SliceTranscode};
use basis_transcode_core::{GlobalCodebook, TranscodeRequest};
use core::ffi::c_void;
use core::ptr;

/// FFI-safe view of the process-wide decode tables.
///
/// The tables are never freed, so a decoder may keep these pointers after the callback returns.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AaDecodeTables {
    /// 5-bit to 8-bit component expansion, 32 entries
    pub expand5: *const u8,
    /// 4-bit to 8-bit component expansion, 16 entries
    pub expand4: *const u8,
    /// Clamped ETC1 colours as `[base5][table][selector]`, 32 * 8 * 4 entries
    pub etc1_colors: *const u8,
}

impl From<&GlobalCodebook> for AaDecodeTables {
    fn from(codebook: &GlobalCodebook) -> Self {
        Self {
            expand5: codebook.expand5_table().as_ptr(),
            expand4: codebook.expand4_table().as_ptr(),
            etc1_colors: codebook.etc1_color_table().as_ptr().cast::<u8>(),
        }
    }
}

/// FFI-safe view of a container's codebook and table sections.
///
/// All pointers borrow from the open buffer and are only valid during the callback.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AaCodebookSections {
    /// Number of endpoint codebook entries
    pub total_endpoints: u32,
    /// Encoded endpoint codebook
    pub endpoints: *const u8,
    /// Length of `endpoints` in bytes
    pub endpoints_len: usize,
    /// Number of selector codebook entries
    pub total_selectors: u32,
    /// Encoded selector codebook
    pub selectors: *const u8,
    /// Length of `selectors` in bytes
    pub selectors_len: usize,
    /// Encoded Huffman tables
    pub tables: *const u8,
    /// Length of `tables` in bytes
    pub tables_len: usize,
    /// Extended data section
    pub extended: *const u8,
    /// Length of `extended` in bytes (0 if absent)
    pub extended_len: usize,
}

impl From<&CodebookSections<'_>> for AaCodebookSections {
    fn from(sections: &CodebookSections<'_>) -> Self {
        Self {
            total_endpoints: sections.total_endpoints,
            endpoints: sections.endpoints.as_ptr(),
            endpoints_len: sections.endpoints.len(),
            total_selectors: sections.total_selectors,
            selectors: sections.selectors.as_ptr(),
            selectors_len: sections.selectors.len(),
            tables: sections.tables.as_ptr(),
            tables_len: sections.tables.len(),
            extended: sections.extended.as_ptr(),
            extended_len: sections.extended.len(),
        }
    }
}

/// FFI-safe view of a located, bounds checked level.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AaSliceTranscode {
    /// Index of the image
    pub image_index: u32,
    /// Index of the mip level
    pub level_index: u32,
    /// Width in pixels, before block alignment
    pub orig_width: u32,
    /// Height in pixels, before block alignment
    pub orig_height: u32,
    /// Width in blocks
    pub num_blocks_x: u32,
    /// Height in blocks
    pub num_blocks_y: u32,
    /// Encoded colour slice
    pub data: *const u8,
    /// Length of `data` in bytes
    pub data_len: usize,
    /// Encoded alpha slice, null if the file has no alpha
    pub alpha_data: *const u8,
    /// Length of `alpha_data` in bytes
    pub alpha_data_len: usize,
}

impl From<&SliceTranscode<'_>> for AaSliceTranscode {
    fn from(slice: &SliceTranscode<'_>) -> Self {
        let (alpha_data, alpha_data_len) = match slice.alpha_data {
            Some(alpha) => (alpha.as_ptr(), alpha.len()),
            None => (ptr::null(), 0),
        };

        Self {
            image_index: slice.image_index,
            level_index: slice.level_index,
            orig_width: slice.orig_width,
            orig_height: slice.orig_height,
            num_blocks_x: slice.num_blocks_x,
            num_blocks_y: slice.num_blocks_y,
            data: slice.data.as_ptr(),
            data_len: slice.data.len(),
            alpha_data,
            alpha_data_len,
        }
    }
}

/// FFI-safe version of [`TranscodeRequest`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AaTranscodeRequest {
    /// Raw `TranscoderTextureFormat` value
    pub format: u32,
    /// Capacity of the destination, in blocks or pixels
    pub output_units: u32,
    /// `DecodeFlags` bits
    pub decode_flags: u32,
    /// Row pitch in blocks or pixels (0 = default)
    pub output_row_pitch: u32,
    /// Row count in blocks or pixels (0 = default)
    pub output_rows: u32,
}

impl From<&TranscodeRequest> for AaTranscodeRequest {
    fn from(request: &TranscodeRequest) -> Self {
        Self {
            format: request.format as u32,
            output_units: request.output_units,
            decode_flags: request.flags.bits(),
            output_row_pitch: request.output_row_pitch,
            output_rows: request.output_rows,
        }
    }
}

/// Function pointer type for [`SliceDecoder::start_transcoding`].
///
/// # Returns
/// true on success
pub type AaStartTranscodingFn = unsafe extern "C" fn(
    context: *mut c_void,
    tables: *const AaDecodeTables,
    sections: *const AaCodebookSections,
) -> bool;

/// Function pointer type for [`SliceDecoder::stop_transcoding`].
pub type AaStopTranscodingFn = unsafe extern "C" fn(context: *mut c_void);

/// Function pointer type for [`SliceDecoder::transcode_slice`].
///
/// `dst` holds `dst_len` bytes, enough for `request`.
///
/// # Returns
/// true on success
pub type AaTranscodeSliceFn = unsafe extern "C" fn(
    context: *mut c_void,
    slice: *const AaSliceTranscode,
    dst: *mut u8,
    dst_len: usize,
    request: *const AaTranscodeRequest,
) -> bool;

/// C-compatible slice decoder that wraps function pointers.
#[repr(C)]
pub struct AaSliceDecoder {
    /// User-provided context passed to all callbacks
    pub context: *mut c_void,
    /// Function to decode a container's codebooks, given the shared decode tables
    pub start_transcoding: AaStartTranscodingFn,
    /// Function to release session state (optional, may be null)
    pub stop_transcoding: Option<AaStopTranscodingFn>,
    /// Function to decode one level
    pub transcode_slice: AaTranscodeSliceFn,
}

// Safety: AaSliceDecoder is Send if the context pointer is Send
unsafe impl Send for AaSliceDecoder {}

// Safety: AaSliceDecoder is Sync if the context pointer is Sync
unsafe impl Sync for AaSliceDecoder {}

impl SliceDecoder for AaSliceDecoder {
    fn start_transcoding(
        &mut self,
        codebook: &GlobalCodebook,
        sections: &CodebookSections<'_>,
    ) -> bool {
        let tables = AaDecodeTables::from(codebook);
        let sections = AaCodebookSections::from(sections);
        unsafe { (self.start_transcoding)(self.context, &tables, &sections) }
    }

    fn stop_transcoding(&mut self) {
        if let Some(stop) = self.stop_transcoding {
            unsafe { stop(self.context) }
        }
    }

    fn transcode_slice(
        &mut self,
        _codebook: &GlobalCodebook,
        slice: &SliceTranscode<'_>,
        dst: &mut [u8],
        request: &TranscodeRequest,
    ) -> bool {
        let slice = AaSliceTranscode::from(slice);
        let request = AaTranscodeRequest::from(request);
        unsafe {
            (self.transcode_slice)(self.context, &slice, dst.as_mut_ptr(), dst.len(), &request)
        }
    }
}
