//! `.basis` container layout constants.

/// `sB`, stored little endian.
pub(crate) const BASIS_SIGNATURE: u16 = 0x4273;

/// The only container version this reader accepts.
pub(crate) const BASIS_FIRST_VERSION: u16 = 0x13;

/// Size of the packed header.
pub const BASIS_HEADER_SIZE: usize = 77;

/// Size of one packed slice descriptor.
pub const BASIS_SLICE_DESC_SIZE: usize = 23;

/// Upper bound on the mip level count of one image.
pub const BASIS_MAX_LEVELS: u32 = 16;

// Header field offsets
pub(crate) const SIG_OFFSET: usize = 0;
pub(crate) const VERSION_OFFSET: usize = 2;
pub(crate) const HEADER_SIZE_OFFSET: usize = 4;
pub(crate) const HEADER_CRC16_OFFSET: usize = 6;
pub(crate) const DATA_SIZE_OFFSET: usize = 8;
pub(crate) const DATA_CRC16_OFFSET: usize = 12;
pub(crate) const TOTAL_SLICES_OFFSET: usize = 14;
pub(crate) const TOTAL_IMAGES_OFFSET: usize = 17;
pub(crate) const TEX_FORMAT_OFFSET: usize = 20;
pub(crate) const FLAGS_OFFSET: usize = 21;
pub(crate) const TEX_TYPE_OFFSET: usize = 23;
pub(crate) const US_PER_FRAME_OFFSET: usize = 24;
pub(crate) const RESERVED_OFFSET: usize = 27;
pub(crate) const USERDATA0_OFFSET: usize = 31;
pub(crate) const USERDATA1_OFFSET: usize = 35;
pub(crate) const TOTAL_ENDPOINTS_OFFSET: usize = 39;
pub(crate) const ENDPOINT_CB_FILE_OFS_OFFSET: usize = 41;
pub(crate) const ENDPOINT_CB_FILE_SIZE_OFFSET: usize = 45;
pub(crate) const TOTAL_SELECTORS_OFFSET: usize = 48;
pub(crate) const SELECTOR_CB_FILE_OFS_OFFSET: usize = 50;
pub(crate) const SELECTOR_CB_FILE_SIZE_OFFSET: usize = 54;
pub(crate) const TABLES_FILE_OFS_OFFSET: usize = 57;
pub(crate) const TABLES_FILE_SIZE_OFFSET: usize = 61;
pub(crate) const SLICE_DESC_FILE_OFS_OFFSET: usize = 65;
pub(crate) const EXTENDED_FILE_OFS_OFFSET: usize = 69;
pub(crate) const EXTENDED_FILE_SIZE_OFFSET: usize = 73;

/// The header CRC covers everything after the CRC field itself.
pub(crate) const HEADER_CRC_START: usize = DATA_SIZE_OFFSET;

// Slice descriptor field offsets (relative to the descriptor)
pub(crate) const SLICE_IMAGE_INDEX_OFFSET: usize = 0;
pub(crate) const SLICE_LEVEL_INDEX_OFFSET: usize = 3;
pub(crate) const SLICE_FLAGS_OFFSET: usize = 4;
pub(crate) const SLICE_ORIG_WIDTH_OFFSET: usize = 5;
pub(crate) const SLICE_ORIG_HEIGHT_OFFSET: usize = 7;
pub(crate) const SLICE_NUM_BLOCKS_X_OFFSET: usize = 9;
pub(crate) const SLICE_NUM_BLOCKS_Y_OFFSET: usize = 11;
pub(crate) const SLICE_FILE_OFS_OFFSET: usize = 13;
pub(crate) const SLICE_FILE_SIZE_OFFSET: usize = 17;
pub(crate) const SLICE_DATA_CRC16_OFFSET: usize = 21;

/// Header flag: the file is ETC1S encoded.
pub const HEADER_FLAG_ETC1S: u16 = 1;
/// Header flag: images are stored upside down.
pub const HEADER_FLAG_Y_FLIPPED: u16 = 2;
/// Header flag: every colour slice is followed by an alpha slice.
pub const HEADER_FLAG_HAS_ALPHA_SLICES: u16 = 4;

/// Slice flag: this is an alpha slice.
pub const SLICE_FLAG_HAS_ALPHA: u8 = 1;
/// Slice flag: video key frame.
pub const SLICE_FLAG_FRAME_IS_I_FRAME: u8 = 2;
