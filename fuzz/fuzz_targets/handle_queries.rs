#![no_main]

// Drives the handle API with arbitrary containers and arguments.
// Queries must never panic, and a level transcoded into a buffer of exactly the reported
// size must never be rejected for capacity.

use basis_transcode_api::{BasisFile, BasisTranscoder, HandleError};
use basis_transcode_core::test_prelude::RecordingDecoder;
use libfuzzer_sys::{arbitrary, fuzz_target};

const MAX_OUTPUT_SIZE: u32 = 1 << 20;

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct Input {
    pub data: Vec<u8>,
    pub image_index: u32,
    pub level_index: u32,
    pub format: u32,
    pub wrap_addressing: bool,
    pub transcode_alpha: bool,
}

fuzz_target!(|input: Input| {
    let mut file = BasisFile::with_engine(BasisTranscoder::with_global_codebook(
        RecordingDecoder::default(),
    ));

    if !file.open(&input.data) {
        assert_eq!(file.num_images(), 0);
        assert_eq!(
            file.transcoded_size_in_bytes(input.image_index, input.level_index, input.format),
            0
        );
        return;
    }

    let _ = file.has_alpha();
    for image_index in 0..file.num_images().min(64) {
        for level_index in 0..file.num_levels(image_index) {
            assert_ne!(file.try_level_desc(image_index, level_index), Err(HandleError::NotOpen));
        }
    }

    let _ = file.image_width(input.image_index, input.level_index);
    let _ = file.image_height(input.image_index, input.level_index);
    let size = file.transcoded_size_in_bytes(input.image_index, input.level_index, input.format);
    if size == 0 || size > MAX_OUTPUT_SIZE || !file.start_transcoding() {
        return;
    }

    let mut dst = vec![0u8; size as usize];
    let result = file.transcode_image_checked(
        &mut dst,
        input.image_index,
        input.level_index,
        input.format,
        input.wrap_addressing,
        input.transcode_alpha,
    );
    assert!(!matches!(result, Err(HandleError::OutputBufferTooSmall { .. })));

    file.close();
    assert_eq!(file.num_images(), 0);
});
