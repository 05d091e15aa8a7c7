use super::constants::*;
use super::crc16::crc16;
use crate::error::HeaderError;
use endian_writer::{EndianReader, LittleEndianReader};
use likely_stable::unlikely;

/// Kind of texture stored in a `.basis` container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BasisTextureType {
    /// An arbitrary array of 2D RGB or RGBA images with optional mipmaps.
    Texture2D = 0,
    /// An array of 2D images, all of the same size and level count.
    Texture2DArray = 1,
    /// An array of cubemap levels, 6 images per cubemap.
    CubemapArray = 2,
    /// An array of 2D video frames.
    VideoFrames = 3,
    /// A 3D texture stored as 2D slices.
    Volume = 4,
    /// A value this reader does not know.
    Unknown = 0xFF,
}

impl BasisTextureType {
    /// Converts the raw header value.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Texture2D,
            1 => Self::Texture2DArray,
            2 => Self::CubemapArray,
            3 => Self::VideoFrames,
            4 => Self::Volume,
            _ => Self::Unknown,
        }
    }
}

/// The fixed size header at the start of every `.basis` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasisHeader {
    /// Container version, always `0x13`.
    pub version: u16,
    /// Size of the header in bytes, always [`BASIS_HEADER_SIZE`].
    pub header_size: u16,
    /// CRC-16 of the header bytes following this field.
    pub header_crc16: u16,
    /// Size of everything after the header.
    pub data_size: u32,
    /// CRC-16 of everything after the header.
    pub data_crc16: u16,
    /// Number of slice descriptors.
    pub total_slices: u32,
    /// Number of images.
    pub total_images: u32,
    /// Encoding of the slices; 0 = ETC1S.
    pub tex_format: u8,
    /// `HEADER_FLAG_*` bits.
    pub flags: u16,
    /// Raw [`BasisTextureType`].
    pub tex_type: u8,
    /// Video frame duration.
    pub us_per_frame: u32,
    /// Reserved by the container format; zero in files produced by the encoder.
    pub reserved: u32,
    /// Opaque application data.
    pub userdata0: u32,
    /// Opaque application data.
    pub userdata1: u32,
    /// Number of entries in the endpoint codebook.
    pub total_endpoints: u16,
    /// File offset of the endpoint codebook.
    pub endpoint_cb_file_ofs: u32,
    /// Size of the endpoint codebook.
    pub endpoint_cb_file_size: u32,
    /// Number of entries in the selector codebook.
    pub total_selectors: u16,
    /// File offset of the selector codebook.
    pub selector_cb_file_ofs: u32,
    /// Size of the selector codebook.
    pub selector_cb_file_size: u32,
    /// File offset of the Huffman tables.
    pub tables_file_ofs: u32,
    /// Size of the Huffman tables.
    pub tables_file_size: u32,
    /// File offset of the slice descriptor table.
    pub slice_desc_file_ofs: u32,
    /// File offset of the extended data.
    pub extended_file_ofs: u32,
    /// Size of the extended data.
    pub extended_file_size: u32,
}

impl BasisHeader {
    /// Whether the slices are ETC1S encoded.
    #[inline]
    pub const fn is_etc1s(&self) -> bool {
        self.flags & HEADER_FLAG_ETC1S != 0
    }

    /// Whether every colour slice is paired with an alpha slice.
    #[inline]
    pub const fn has_alpha_slices(&self) -> bool {
        self.flags & HEADER_FLAG_HAS_ALPHA_SLICES != 0
    }

    /// Whether the images are stored upside down.
    #[inline]
    pub const fn is_y_flipped(&self) -> bool {
        self.flags & HEADER_FLAG_Y_FLIPPED != 0
    }

    /// The texture type declared by the header.
    #[inline]
    pub const fn texture_type(&self) -> BasisTextureType {
        BasisTextureType::from_raw(self.tex_type)
    }
}

/// Describes one encoded plane (colour or alpha) of an (image, level) pair.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceDesc {
    pub image_index: u32,
    pub level_index: u8,
    /// `SLICE_FLAG_*` bits.
    pub flags: u8,
    pub orig_width: u16,
    pub orig_height: u16,
    pub num_blocks_x: u16,
    pub num_blocks_y: u16,
    pub file_ofs: u32,
    pub file_size: u32,
    pub slice_data_crc16: u16,
}

impl SliceDesc {
    /// Whether this is an alpha slice.
    #[inline]
    pub const fn is_alpha(&self) -> bool {
        self.flags & SLICE_FLAG_HAS_ALPHA != 0
    }

    /// Whether this slice is a video key frame.
    #[inline]
    pub const fn is_i_frame(&self) -> bool {
        self.flags & SLICE_FLAG_FRAME_IS_I_FRAME != 0
    }

    /// `num_blocks_x * num_blocks_y`
    #[inline]
    pub const fn total_blocks(&self) -> u32 {
        self.num_blocks_x as u32 * self.num_blocks_y as u32
    }

    /// The slice's encoded bytes, if they lie within `data`.
    #[inline]
    pub fn data<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        section(data, self.file_ofs, self.file_size)
    }
}

/// Reads and validates the header of a `.basis` file.
///
/// # Errors
///
/// Returns a [`HeaderError`] describing the first check that failed:
///
/// - the buffer must be larger than [`BASIS_HEADER_SIZE`],
/// - signature, version and header size must match,
/// - the header CRC-16 must match,
/// - the buffer must hold the data section the header describes,
/// - slice and image counts must be non-zero, with no more images than slices,
/// - with alpha slices the slice count must be even,
/// - the slice descriptor table must lie within the buffer.
///
/// The data section checksum is not verified; see [`validate_file_checksums`].
pub fn read_header(data: &[u8]) -> Result<BasisHeader, HeaderError> {
    if unlikely(data.len() <= BASIS_HEADER_SIZE) {
        return Err(HeaderError::TooShort {
            len: data.len(),
            min: BASIS_HEADER_SIZE,
        });
    }

    // SAFETY: data.len() > BASIS_HEADER_SIZE, every header field lies below that.
    let mut reader = unsafe { LittleEndianReader::new(data.as_ptr()) };
    let signature = unsafe { reader.read_u16_at(SIG_OFFSET as isize) };
    if unlikely(signature != BASIS_SIGNATURE) {
        return Err(HeaderError::BadSignature(signature));
    }

    let header = unsafe { read_header_fields(data) };
    if header.version != BASIS_FIRST_VERSION {
        return Err(HeaderError::UnsupportedVersion(header.version));
    }
    if header.header_size as usize != BASIS_HEADER_SIZE {
        return Err(HeaderError::BadHeaderSize(header.header_size));
    }

    let computed = crc16(&data[HEADER_CRC_START..BASIS_HEADER_SIZE], 0);
    if computed != header.header_crc16 {
        return Err(HeaderError::HeaderCrcMismatch {
            stored: header.header_crc16,
            computed,
        });
    }

    let needed = BASIS_HEADER_SIZE + header.data_size as usize;
    if data.len() < needed {
        return Err(HeaderError::DataTruncated {
            needed,
            actual: data.len(),
        });
    }

    if header.total_slices == 0 || header.total_images == 0 {
        return Err(HeaderError::NoSlices);
    }
    if header.total_images > header.total_slices {
        return Err(HeaderError::TooManyImages {
            images: header.total_images,
            slices: header.total_slices,
        });
    }
    if header.has_alpha_slices() && header.total_slices & 1 != 0 {
        return Err(HeaderError::OddAlphaSliceCount(header.total_slices));
    }

    let table_size = header.total_slices as usize * BASIS_SLICE_DESC_SIZE;
    let table_end = (header.slice_desc_file_ofs as usize).checked_add(table_size);
    match table_end {
        Some(end) if end <= data.len() => {}
        _ => return Err(HeaderError::SliceTableOutOfBounds),
    }

    Ok(header)
}

/// Validates the header, then the data section checksum.
/// With `full`, each slice's bounds and checksum are verified as well.
pub fn validate_file_checksums(data: &[u8], full: bool) -> Result<BasisHeader, HeaderError> {
    let header = read_header(data)?;

    let data_end = BASIS_HEADER_SIZE + header.data_size as usize;
    let computed = crc16(&data[BASIS_HEADER_SIZE..data_end], 0);
    if computed != header.data_crc16 {
        return Err(HeaderError::DataCrcMismatch {
            stored: header.data_crc16,
            computed,
        });
    }

    if full {
        for slice_index in 0..header.total_slices {
            let Some(desc) = read_slice_desc(data, &header, slice_index) else {
                return Err(HeaderError::SliceTableOutOfBounds);
            };
            let Some(slice_data) = desc.data(data) else {
                return Err(HeaderError::SliceOutOfBounds(slice_index));
            };
            if crc16(slice_data, 0) != desc.slice_data_crc16 {
                return Err(HeaderError::SliceCrcMismatch(slice_index));
            }
        }
    }

    Ok(header)
}

/// Reads the slice descriptor at `slice_index`.
///
/// Returns [`None`] if the index is out of range or the descriptor does not fit in `data`.
/// `header` must have been produced by [`read_header`] for the same `data`.
pub fn read_slice_desc(data: &[u8], header: &BasisHeader, slice_index: u32) -> Option<SliceDesc> {
    if slice_index >= header.total_slices {
        return None;
    }

    let offset = (header.slice_desc_file_ofs as usize)
        .checked_add(slice_index as usize * BASIS_SLICE_DESC_SIZE)?;
    let bytes = data.get(offset..offset.checked_add(BASIS_SLICE_DESC_SIZE)?)?;

    // SAFETY: bytes.len() == BASIS_SLICE_DESC_SIZE, every field lies below that.
    let mut reader = unsafe { LittleEndianReader::new(bytes.as_ptr()) };
    unsafe {
        Some(SliceDesc {
            image_index: read_u24(bytes, SLICE_IMAGE_INDEX_OFFSET),
            level_index: bytes[SLICE_LEVEL_INDEX_OFFSET],
            flags: bytes[SLICE_FLAGS_OFFSET],
            orig_width: reader.read_u16_at(SLICE_ORIG_WIDTH_OFFSET as isize),
            orig_height: reader.read_u16_at(SLICE_ORIG_HEIGHT_OFFSET as isize),
            num_blocks_x: reader.read_u16_at(SLICE_NUM_BLOCKS_X_OFFSET as isize),
            num_blocks_y: reader.read_u16_at(SLICE_NUM_BLOCKS_Y_OFFSET as isize),
            file_ofs: reader.read_u32_at(SLICE_FILE_OFS_OFFSET as isize),
            file_size: reader.read_u32_at(SLICE_FILE_SIZE_OFFSET as isize),
            slice_data_crc16: reader.read_u16_at(SLICE_DATA_CRC16_OFFSET as isize),
        })
    }
}

/// Returns `data[offset..offset + size]`, or [`None`] if it does not fit.
#[inline]
pub(crate) fn section(data: &[u8], offset: u32, size: u32) -> Option<&[u8]> {
    let start = offset as usize;
    let end = start.checked_add(size as usize)?;
    data.get(start..end)
}

/// # Safety
///
/// `data` must be at least [`BASIS_HEADER_SIZE`] bytes long.
unsafe fn read_header_fields(data: &[u8]) -> BasisHeader {
    let mut reader = LittleEndianReader::new(data.as_ptr());
    BasisHeader {
        version: reader.read_u16_at(VERSION_OFFSET as isize),
        header_size: reader.read_u16_at(HEADER_SIZE_OFFSET as isize),
        header_crc16: reader.read_u16_at(HEADER_CRC16_OFFSET as isize),
        data_size: reader.read_u32_at(DATA_SIZE_OFFSET as isize),
        data_crc16: reader.read_u16_at(DATA_CRC16_OFFSET as isize),
        total_slices: read_u24(data, TOTAL_SLICES_OFFSET),
        total_images: read_u24(data, TOTAL_IMAGES_OFFSET),
        tex_format: data[TEX_FORMAT_OFFSET],
        flags: reader.read_u16_at(FLAGS_OFFSET as isize),
        tex_type: data[TEX_TYPE_OFFSET],
        us_per_frame: read_u24(data, US_PER_FRAME_OFFSET),
        reserved: reader.read_u32_at(RESERVED_OFFSET as isize),
        userdata0: reader.read_u32_at(USERDATA0_OFFSET as isize),
        userdata1: reader.read_u32_at(USERDATA1_OFFSET as isize),
        total_endpoints: reader.read_u16_at(TOTAL_ENDPOINTS_OFFSET as isize),
        endpoint_cb_file_ofs: reader.read_u32_at(ENDPOINT_CB_FILE_OFS_OFFSET as isize),
        endpoint_cb_file_size: read_u24(data, ENDPOINT_CB_FILE_SIZE_OFFSET),
        total_selectors: reader.read_u16_at(TOTAL_SELECTORS_OFFSET as isize),
        selector_cb_file_ofs: reader.read_u32_at(SELECTOR_CB_FILE_OFS_OFFSET as isize),
        selector_cb_file_size: read_u24(data, SELECTOR_CB_FILE_SIZE_OFFSET),
        tables_file_ofs: reader.read_u32_at(TABLES_FILE_OFS_OFFSET as isize),
        tables_file_size: reader.read_u32_at(TABLES_FILE_SIZE_OFFSET as isize),
        slice_desc_file_ofs: reader.read_u32_at(SLICE_DESC_FILE_OFS_OFFSET as isize),
        extended_file_ofs: reader.read_u32_at(EXTENDED_FILE_OFS_OFFSET as isize),
        extended_file_size: reader.read_u32_at(EXTENDED_FILE_SIZE_OFFSET as isize),
    }
}

#[inline(always)]
fn read_u24(data: &[u8], offset: usize) -> u32 {
    data[offset] as u32 | (data[offset + 1] as u32) << 8 | (data[offset + 2] as u32) << 16
}
