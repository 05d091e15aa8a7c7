use crate::error::CliError;
use crate::util::with_mapped_file;
use argh::FromArgs;
use basis_transcode_api::{BasisFile, HandleError, TranscoderEngine};
use basis_transcode_core::basis::validate_file_checksums;
use bytesize::ByteSize;
use core::fmt::Write;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// Print the header, images and mip levels of a .basis file
#[argh(subcommand, name = "info")]
pub struct InfoCmd {
    /// input .basis file
    #[argh(option)]
    pub input: PathBuf,

    /// also verify the bounds and CRC of every slice
    #[argh(switch)]
    pub full: bool,
}

pub fn handle_info_command(cmd: InfoCmd) -> Result<(), CliError> {
    let report = with_mapped_file(&cmd.input, |data| describe(data, cmd.full))?;
    print!("{report}");
    Ok(())
}

/// Renders a human readable description of a `.basis` file.
pub fn describe(data: &[u8], full: bool) -> Result<String, CliError> {
    let header = validate_file_checksums(data, full)?;

    let mut file = BasisFile::new();
    if !file.open(data) {
        return Err(HandleError::NotOpen.into());
    }

    let mut out = String::new();
    writeln!(out, "Version: {:#x}", header.version)?;
    writeln!(out, "Texture type: {:?}", header.texture_type())?;
    writeln!(
        out,
        "Data size: {} ({} bytes)",
        ByteSize(header.data_size as u64),
        header.data_size
    )?;
    writeln!(out, "Slices: {}", header.total_slices)?;
    writeln!(out, "Has alpha: {}", yes_no(file.try_has_alpha()?))?;
    writeln!(out, "ETC1S: {}", yes_no(header.is_etc1s()))?;
    writeln!(out, "Y flipped: {}", yes_no(header.is_y_flipped()))?;
    writeln!(
        out,
        "Codebooks: {} endpoints, {} selectors",
        header.total_endpoints, header.total_selectors
    )?;
    writeln!(
        out,
        "Slice CRCs: {}",
        if full { "verified" } else { "not checked" }
    )?;

    let total_images = file.try_num_images()?;
    writeln!(out, "Images: {total_images}")?;

    for image_index in 0..total_images {
        let levels = file.try_num_levels(image_index)?;
        writeln!(out, "Image {image_index}: {levels} level(s)")?;

        for level_index in 0..levels {
            let info = file
                .engine()
                .image_level_info(data, image_index, level_index)
                .ok_or(HandleError::MetadataUnavailable {
                    image_index,
                    level_index,
                })?;
            writeln!(
                out,
                "  Level {level_index}: {}x{} ({}x{} blocks, {} total)",
                info.orig_width,
                info.orig_height,
                info.num_blocks_x,
                info.num_blocks_y,
                info.total_blocks
            )?;
        }
    }

    file.close();
    Ok(out)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis_transcode_core::test_prelude::BasisFixture;
    use basis_transcode_core::HeaderError;

    #[test]
    fn describes_single_level_texture() {
        let data = BasisFixture::new(16, 8).build();
        let report = describe(&data, true).expect("describe failed");

        assert!(report.contains("Images: 1"), "{report}");
        assert!(report.contains("Image 0: 1 level(s)"), "{report}");
        assert!(report.contains("Level 0: 16x8 (4x2 blocks, 8 total)"), "{report}");
        assert!(report.contains("Has alpha: no"), "{report}");
        assert!(report.contains("ETC1S: yes"), "{report}");
        assert!(report.contains("Slice CRCs: verified"), "{report}");
    }

    #[test]
    fn describes_every_image_and_level() {
        let data = BasisFixture::new(32, 32)
            .with_images(2)
            .with_levels(3)
            .with_alpha()
            .build();
        let report = describe(&data, false).expect("describe failed");

        assert!(report.contains("Images: 2"), "{report}");
        assert!(report.contains("Image 1: 3 level(s)"), "{report}");
        assert!(report.contains("Level 2: 8x8 (2x2 blocks, 4 total)"), "{report}");
        assert!(report.contains("Has alpha: yes"), "{report}");
        assert!(report.contains("Slice CRCs: not checked"), "{report}");
    }

    #[test]
    fn rejects_truncated_file() {
        let data = BasisFixture::new(16, 8).build();
        let result = describe(&data[..40], false);
        assert!(matches!(
            result,
            Err(CliError::Header(HeaderError::TooShort { .. }))
        ));
    }

    #[test]
    fn rejects_bad_slice_crc_only_when_full() {
        let data = BasisFixture::new(16, 8).with_bad_slice_crc().build();
        assert!(describe(&data, false).is_ok());
        assert!(matches!(
            describe(&data, true),
            Err(CliError::Header(HeaderError::SliceCrcMismatch(0)))
        ));
    }
}
