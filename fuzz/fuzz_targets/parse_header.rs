#![no_main]

// Feeds arbitrary bytes to the .basis header reader.
// Nothing may panic, and every accepted header must describe in-bounds slices.

use basis_transcode_core::basis::{read_header, read_slice_desc, validate_file_checksums};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(header) = read_header(data) else {
        assert!(validate_file_checksums(data, true).is_err());
        return;
    };

    for slice_index in 0..header.total_slices {
        let desc = read_slice_desc(data, &header, slice_index)
            .expect("accepted header has an out of bounds slice table");
        let _ = desc.data(data);
    }
    assert!(read_slice_desc(data, &header, header.total_slices).is_none());

    // A full check passing implies the cheap one passes.
    if validate_file_checksums(data, true).is_ok() {
        assert_eq!(validate_file_checksums(data, false), Ok(header));
    }
});
