use crate::error::CliError;
use crate::util::with_mapped_file;
use argh::FromArgs;
use basis_transcode_api::{BasisFile, TranscoderTextureFormat};
use bytesize::ByteSize;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// Print the transcoded size of every level of a .basis file
#[argh(subcommand, name = "sizes")]
pub struct SizesCmd {
    /// input .basis file
    #[argh(option)]
    pub input: PathBuf,

    /// target format, by name or value (e.g. bc7_m5_rgba, 6) [default: all]
    #[argh(option, from_str_fn(crate::util::parse_format))]
    pub format: Option<TranscoderTextureFormat>,
}

/// Transcoded size of one level in one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSize {
    pub image_index: u32,
    pub level_index: u32,
    pub width: u32,
    pub height: u32,
    pub format: TranscoderTextureFormat,
    pub bytes: u32,
}

pub fn handle_sizes_command(cmd: SizesCmd) -> Result<(), CliError> {
    let sizes = with_mapped_file(&cmd.input, |data| level_sizes(data, cmd.format))?;

    let mut total_bytes = 0u64;
    for size in &sizes {
        println!(
            "image {} level {} ({}x{}) {}: {} bytes",
            size.image_index,
            size.level_index,
            size.width,
            size.height,
            size.format.name(),
            size.bytes
        );
        total_bytes += size.bytes as u64;
    }

    if cmd.format.is_some() {
        println!("Total: {}", ByteSize(total_bytes));
    }
    Ok(())
}

/// Resolves the transcoded size of every (image, level) pair, for `format` or for every
/// format when `format` is [`None`].
pub fn level_sizes(
    data: &[u8],
    format: Option<TranscoderTextureFormat>,
) -> Result<Vec<LevelSize>, CliError> {
    let formats: &[TranscoderTextureFormat] = match &format {
        Some(format) => core::slice::from_ref(format),
        None => TranscoderTextureFormat::all_values(),
    };

    let mut file = BasisFile::new();
    if !file.open(data) {
        // Re-run the header checks to report why the file was rejected.
        basis_transcode_core::basis::read_header(data)?;
        return Err(basis_transcode_api::HandleError::NotOpen.into());
    }

    let mut sizes = Vec::new();
    for image_index in 0..file.try_num_images()? {
        for level_index in 0..file.try_num_levels(image_index)? {
            let desc = file.try_level_desc(image_index, level_index)?;
            for &format in formats {
                sizes.push(LevelSize {
                    image_index,
                    level_index,
                    width: desc.orig_width,
                    height: desc.orig_height,
                    format,
                    bytes: file.try_transcoded_size_in_bytes(
                        image_index,
                        level_index,
                        format as u32,
                    )?,
                });
            }
        }
    }

    file.close();
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis_transcode_core::test_prelude::BasisFixture;
    use basis_transcode_core::HeaderError;
    use rstest::rstest;

    #[rstest]
    #[case(TranscoderTextureFormat::Rgba32, 512)]
    #[case(TranscoderTextureFormat::Bc1Rgb, 64)]
    #[case(TranscoderTextureFormat::Bc7M5Rgba, 128)]
    #[case(TranscoderTextureFormat::Pvrtc1_4Rgba, 64)]
    fn single_format(#[case] format: TranscoderTextureFormat, #[case] expected: u32) {
        let data = BasisFixture::new(16, 8).build();
        let sizes = level_sizes(&data, Some(format)).expect("sizes failed");

        assert_eq!(
            sizes,
            vec![LevelSize {
                image_index: 0,
                level_index: 0,
                width: 16,
                height: 8,
                format,
                bytes: expected,
            }]
        );
    }

    #[test]
    fn every_format_for_every_level() {
        let data = BasisFixture::new(16, 16).with_levels(2).build();
        let sizes = level_sizes(&data, None).expect("sizes failed");

        let formats = TranscoderTextureFormat::all_values();
        assert_eq!(sizes.len(), 2 * formats.len());
        assert!(sizes[formats.len()..]
            .iter()
            .all(|size| size.level_index == 1 && size.width == 8 && size.height == 8));
    }

    #[test]
    fn reports_header_error() {
        let mut data = BasisFixture::new(16, 8).build();
        data[0] ^= 0xFF;
        assert!(matches!(
            level_sizes(&data, None),
            Err(CliError::Header(HeaderError::BadSignature(_)))
        ));
    }
}
