//! Native reader for the `.basis` container.
//!
//! Everything needed to answer metadata queries lives here: header parsing and validation,
//! slice descriptor lookup, and the bounds checks performed before any level is handed to a
//! [`SliceDecoder`].

/// Container layout constants.
pub mod constants;

/// The CRC-16 variant used by `.basis` files.
pub mod crc16;

/// Header and slice descriptor parsing.
pub mod header;

/// The seam to the external block decoder.
pub mod slice_decoder;

/// [`TranscoderEngine`](crate::TranscoderEngine) implementation over `.basis` files.
pub mod transcoder;

pub use constants::{BASIS_HEADER_SIZE, BASIS_MAX_LEVELS, BASIS_SLICE_DESC_SIZE};
pub use crc16::crc16;
pub use header::{
    read_header, read_slice_desc, validate_file_checksums, BasisHeader, BasisTextureType,
    SliceDesc,
};
pub use slice_decoder::{CodebookSections, NoSliceDecoder, SliceDecoder, SliceTranscode};
pub use transcoder::BasisTranscoder;
