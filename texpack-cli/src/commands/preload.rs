//! Preload command - decode a whole pack to find broken files.

use std::path::Path;
use std::time::Instant;

use clap::Args;
use texpack::cache::CustomTextureCache;

use super::common::{format_size, ProgramArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PreloadArgs {
    #[command(flatten)]
    pub program: ProgramArgs,
}

/// Run the preload command.
pub fn run(user_root: &Path, args: PreloadArgs) -> Result<(), CliError> {
    let settings = args.program.settings(user_root);
    let load_dir = settings.load_dir();
    if !load_dir.is_dir() {
        return Err(CliError::PackNotFound(load_dir));
    }

    let mut cache = CustomTextureCache::new(settings);
    let report = cache.find_custom_textures();
    if report.aborted {
        println!("Scan aborted: legacy packs cannot contain DDS or KTX files.");
        return Ok(());
    }

    let start = Instant::now();
    cache.preload_textures();
    let elapsed = start.elapsed();

    let mut failed = Vec::new();
    let mut bytes = 0;
    for texture in cache.registry().iter() {
        if texture.data().is_empty() {
            failed.push(texture.path().to_path_buf());
        }
        bytes += texture.data().len();
    }

    println!(
        "Decoded {} textures ({}) in {:.2?}",
        report.registered - failed.len(),
        format_size(bytes),
        elapsed
    );
    if !failed.is_empty() {
        println!("{} textures failed to decode:", failed.len());
        for path in failed {
            println!("  {}", path.display());
        }
    }

    Ok(())
}
