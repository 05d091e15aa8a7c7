//! Test prelude for the handle API tests.
//!
//! Re-exports the `.basis` fixture writer and recording decoder from the core crate.
#![allow(unused_imports)]

pub use alloc::{boxed::Box, vec, vec::Vec};
pub use basis_transcode_core::test_prelude::{
    BasisFixture, FILL_BYTE, RecordedTranscode, RecordingDecoder, StartedSession,
};
pub use basis_transcode_core::{
    BasisTranscoder, ImageLevelDesc, TOTAL_TEXTURE_FORMATS, TranscoderTextureFormat,
};
pub use rstest::rstest;

use crate::BasisFile;

/// A closed handle whose engine records every decode request.
pub fn recording_file<'a>() -> BasisFile<'a, BasisTranscoder<RecordingDecoder>> {
    BasisFile::with_engine(BasisTranscoder::with_global_codebook(
        RecordingDecoder::default(),
    ))
}
