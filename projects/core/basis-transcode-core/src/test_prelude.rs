//! Common test imports and utilities for `.basis` tests.
//!
//! Provides a writer for well formed (or deliberately malformed) `.basis` files and a
//! [`SliceDecoder`] that records what it was asked to do.
#![allow(unused_imports)]
#![allow(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// Re-export commonly used alloc types for tests
pub use alloc::{boxed::Box, format, string::String, vec, vec::Vec};

// External crates commonly used in tests
#[cfg(test)]
pub use rstest::rstest;

use crate::basis::constants::*;
use crate::basis::crc16::crc16;
use crate::basis::slice_decoder::{CodebookSections, SliceDecoder, SliceTranscode};
use crate::codebook::GlobalCodebook;
use crate::engine::TranscodeRequest;
use crate::size::{transcoded_size_in_bytes, ImageLevelDesc};
use endian_writer::{EndianWriter, LittleEndianWriter};

/// Endpoint count written by [`BasisFixture`].
pub const FIXTURE_TOTAL_ENDPOINTS: u16 = 12;
/// Selector count written by [`BasisFixture`].
pub const FIXTURE_TOTAL_SELECTORS: u16 = 34;
/// Size of each codebook / table section written by [`BasisFixture`].
pub const FIXTURE_SECTION_SIZE: usize = 16;

/// Byte written by [`RecordingDecoder`] into every transcoded output.
pub const FILL_BYTE: u8 = 0xA5;

/// Builds `.basis` files with valid checksums.
///
/// Images are laid out image by image, level by level; with alpha, each colour slice is
/// directly followed by its alpha slice. Level `n` of an image is `max(1, size >> n)`.
#[derive(Debug, Clone)]
pub struct BasisFixture {
    width: u32,
    height: u32,
    images: u32,
    levels: u32,
    alpha: bool,
    version: u16,
    total_images: Option<u32>,
    header_flags: Option<u16>,
    slice_desc_offset: Option<u32>,
    bad_slice_crc: bool,
    codebooks: bool,
}

impl BasisFixture {
    /// A single image with a single level of `width` x `height` pixels, no alpha.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            images: 1,
            levels: 1,
            alpha: false,
            version: BASIS_FIRST_VERSION,
            total_images: None,
            header_flags: None,
            slice_desc_offset: None,
            bad_slice_crc: false,
            codebooks: true,
        }
    }

    pub fn with_images(mut self, images: u32) -> Self {
        self.images = images;
        self
    }

    pub fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_alpha(mut self) -> Self {
        self.alpha = true;
        self
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Overrides the image count stored in the header.
    pub fn with_total_images(mut self, total_images: u32) -> Self {
        self.total_images = Some(total_images);
        self
    }

    /// Overrides the flags stored in the header.
    pub fn with_header_flags(mut self, flags: u16) -> Self {
        self.header_flags = Some(flags);
        self
    }

    /// Overrides the slice descriptor table offset stored in the header.
    pub fn with_slice_desc_offset(mut self, offset: u32) -> Self {
        self.slice_desc_offset = Some(offset);
        self
    }

    /// Stores a wrong CRC for slice 0. The data section CRC stays valid.
    pub fn with_bad_slice_crc(mut self) -> Self {
        self.bad_slice_crc = true;
        self
    }

    /// Declares empty endpoint and selector codebooks.
    pub fn without_codebooks(mut self) -> Self {
        self.codebooks = false;
        self
    }

    /// Dimensions of `level`, in pixels.
    pub fn level_dimensions(&self, level: u32) -> (u32, u32) {
        (
            core::cmp::max(1, self.width >> level),
            core::cmp::max(1, self.height >> level),
        )
    }

    /// Level description as an engine reports it.
    pub fn level_desc(&self, level: u32) -> ImageLevelDesc {
        let (width, height) = self.level_dimensions(level);
        ImageLevelDesc::from_dimensions(width, height)
    }

    pub fn build(&self) -> Vec<u8> {
        let planes = if self.alpha { 2 } else { 1 };
        let total_slices = self.images * self.levels * planes;

        // (image, level, flags, width, height)
        let mut slices = Vec::with_capacity(total_slices as usize);
        for image in 0..self.images {
            for level in 0..self.levels {
                let (width, height) = self.level_dimensions(level);
                slices.push((image, level, 0u8, width, height));
                if self.alpha {
                    slices.push((image, level, SLICE_FLAG_HAS_ALPHA, width, height));
                }
            }
        }

        let slice_table_ofs = BASIS_HEADER_SIZE;
        let endpoints_ofs = slice_table_ofs + slices.len() * BASIS_SLICE_DESC_SIZE;
        let selectors_ofs = endpoints_ofs + FIXTURE_SECTION_SIZE;
        let tables_ofs = selectors_ofs + FIXTURE_SECTION_SIZE;
        let mut slice_ofs = tables_ofs + FIXTURE_SECTION_SIZE;

        // Slice payloads: one byte per block, pattern filled.
        let mut payloads = Vec::with_capacity(slices.len());
        for (index, &(_, _, _, width, height)) in slices.iter().enumerate() {
            let blocks = width.div_ceil(4) * height.div_ceil(4);
            let payload: Vec<u8> = (0..blocks as usize)
                .map(|x| (x + index) as u8)
                .collect();
            payloads.push((slice_ofs, payload));
            slice_ofs += payloads[index].1.len();
        }

        let total_size = slice_ofs;
        let mut data = vec![0u8; total_size];

        // Codebook / table sections
        for (index, section) in [endpoints_ofs, selectors_ofs, tables_ofs]
            .into_iter()
            .enumerate()
        {
            for x in 0..FIXTURE_SECTION_SIZE {
                data[section + x] = (index * 0x40 + x) as u8;
            }
        }

        // Slice descriptors and payloads
        for (index, (&(image, level, flags, width, height), (offset, payload))) in
            slices.iter().zip(payloads.iter()).enumerate()
        {
            data[*offset..*offset + payload.len()].copy_from_slice(payload);

            let mut crc = crc16(payload, 0);
            if self.bad_slice_crc && index == 0 {
                crc ^= 1;
            }

            let desc_ofs = slice_table_ofs + index * BASIS_SLICE_DESC_SIZE;
            write_u24(&mut data, desc_ofs + SLICE_IMAGE_INDEX_OFFSET, image);
            data[desc_ofs + SLICE_LEVEL_INDEX_OFFSET] = level as u8;
            data[desc_ofs + SLICE_FLAGS_OFFSET] = flags;

            let mut writer = unsafe { LittleEndianWriter::new(data.as_mut_ptr().add(desc_ofs)) };
            unsafe {
                writer.write_u16_at(width as u16, SLICE_ORIG_WIDTH_OFFSET as isize);
                writer.write_u16_at(height as u16, SLICE_ORIG_HEIGHT_OFFSET as isize);
                writer.write_u16_at(width.div_ceil(4) as u16, SLICE_NUM_BLOCKS_X_OFFSET as isize);
                writer.write_u16_at(height.div_ceil(4) as u16, SLICE_NUM_BLOCKS_Y_OFFSET as isize);
                writer.write_u32_at(*offset as u32, SLICE_FILE_OFS_OFFSET as isize);
                writer.write_u32_at(payload.len() as u32, SLICE_FILE_SIZE_OFFSET as isize);
                writer.write_u16_at(crc, SLICE_DATA_CRC16_OFFSET as isize);
            }
        }

        // Header
        let flags = self.header_flags.unwrap_or(if self.alpha {
            HEADER_FLAG_ETC1S | HEADER_FLAG_HAS_ALPHA_SLICES
        } else {
            HEADER_FLAG_ETC1S
        });
        let (total_endpoints, total_selectors) = if self.codebooks {
            (FIXTURE_TOTAL_ENDPOINTS, FIXTURE_TOTAL_SELECTORS)
        } else {
            (0, 0)
        };

        write_u24(&mut data, TOTAL_SLICES_OFFSET, total_slices);
        write_u24(
            &mut data,
            TOTAL_IMAGES_OFFSET,
            self.total_images.unwrap_or(self.images),
        );
        write_u24(
            &mut data,
            ENDPOINT_CB_FILE_SIZE_OFFSET,
            FIXTURE_SECTION_SIZE as u32,
        );
        write_u24(
            &mut data,
            SELECTOR_CB_FILE_SIZE_OFFSET,
            FIXTURE_SECTION_SIZE as u32,
        );

        let data_size = (total_size - BASIS_HEADER_SIZE) as u32;
        let data_crc = crc16(&data[BASIS_HEADER_SIZE..], 0);

        let mut writer = unsafe { LittleEndianWriter::new(data.as_mut_ptr()) };
        unsafe {
            writer.write_u16_at(BASIS_SIGNATURE, SIG_OFFSET as isize);
            writer.write_u16_at(self.version, VERSION_OFFSET as isize);
            writer.write_u16_at(BASIS_HEADER_SIZE as u16, HEADER_SIZE_OFFSET as isize);
            writer.write_u32_at(data_size, DATA_SIZE_OFFSET as isize);
            writer.write_u16_at(data_crc, DATA_CRC16_OFFSET as isize);
            writer.write_u16_at(flags, FLAGS_OFFSET as isize);
            writer.write_u16_at(total_endpoints, TOTAL_ENDPOINTS_OFFSET as isize);
            writer.write_u32_at(endpoints_ofs as u32, ENDPOINT_CB_FILE_OFS_OFFSET as isize);
            writer.write_u16_at(total_selectors, TOTAL_SELECTORS_OFFSET as isize);
            writer.write_u32_at(selectors_ofs as u32, SELECTOR_CB_FILE_OFS_OFFSET as isize);
            writer.write_u32_at(tables_ofs as u32, TABLES_FILE_OFS_OFFSET as isize);
            writer.write_u32_at(FIXTURE_SECTION_SIZE as u32, TABLES_FILE_SIZE_OFFSET as isize);
            writer.write_u32_at(
                self.slice_desc_offset.unwrap_or(slice_table_ofs as u32),
                SLICE_DESC_FILE_OFS_OFFSET as isize,
            );
        }

        let header_crc = crc16(&data[HEADER_CRC_START..BASIS_HEADER_SIZE], 0);
        unsafe { writer.write_u16_at(header_crc, HEADER_CRC16_OFFSET as isize) };

        data
    }
}

fn write_u24(data: &mut [u8], offset: usize, value: u32) {
    data[offset] = value as u8;
    data[offset + 1] = (value >> 8) as u8;
    data[offset + 2] = (value >> 16) as u8;
}

/// What [`RecordingDecoder`] saw when a session started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    pub codebook_addr: usize,
    pub total_endpoints: u32,
    pub total_selectors: u32,
    pub endpoints_len: usize,
    pub selectors_len: usize,
    pub tables_len: usize,
}

/// What [`RecordingDecoder`] saw for a single level transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTranscode {
    pub image_index: u32,
    pub level_index: u32,
    pub desc: ImageLevelDesc,
    pub has_alpha_data: bool,
    pub dst_len: usize,
    pub bytes_written: usize,
    pub request: TranscodeRequest,
}

/// A [`SliceDecoder`] which records every call and fills outputs with [`FILL_BYTE`].
///
/// A transcode writes exactly as many bytes as the size resolver reports for the level.
#[derive(Debug, Default)]
pub struct RecordingDecoder {
    pub fail: bool,
    pub started: Option<StartedSession>,
    pub stops: u32,
    pub transcodes: Vec<RecordedTranscode>,
}

impl RecordingDecoder {
    /// A decoder whose session setup and transcodes always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl SliceDecoder for RecordingDecoder {
    fn start_transcoding(
        &mut self,
        codebook: &GlobalCodebook,
        sections: &CodebookSections<'_>,
    ) -> bool {
        if self.fail {
            return false;
        }

        self.started = Some(StartedSession {
            codebook_addr: codebook as *const GlobalCodebook as usize,
            total_endpoints: sections.total_endpoints,
            total_selectors: sections.total_selectors,
            endpoints_len: sections.endpoints.len(),
            selectors_len: sections.selectors.len(),
            tables_len: sections.tables.len(),
        });
        true
    }

    fn stop_transcoding(&mut self) {
        self.started = None;
        self.stops += 1;
    }

    fn transcode_slice(
        &mut self,
        _codebook: &GlobalCodebook,
        slice: &SliceTranscode<'_>,
        dst: &mut [u8],
        request: &TranscodeRequest,
    ) -> bool {
        if self.fail {
            return false;
        }

        let desc = ImageLevelDesc::new(
            slice.orig_width,
            slice.orig_height,
            slice.num_blocks_x * slice.num_blocks_y,
        );
        let bytes_written = core::cmp::min(
            transcoded_size_in_bytes(&desc, request.format) as usize,
            dst.len(),
        );
        dst[..bytes_written].fill(FILL_BYTE);

        self.transcodes.push(RecordedTranscode {
            image_index: slice.image_index,
            level_index: slice.level_index,
            desc,
            has_alpha_data: slice.alpha_data.is_some(),
            dst_len: dst.len(),
            bytes_written,
            request: *request,
        });
        true
    }
}
