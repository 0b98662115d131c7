//! Scan command - report what a pack registers.

use std::path::Path;

use clap::Args;
use texpack::cache::CustomTextureCache;
use texpack::texture::HexHash;

use super::common::ProgramArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub program: ProgramArgs,

    /// List every registered texture
    #[arg(long)]
    pub list: bool,
}

/// Run the scan command.
pub fn run(user_root: &Path, args: ScanArgs) -> Result<(), CliError> {
    let settings = args.program.settings(user_root);
    let load_dir = settings.load_dir();
    if !load_dir.is_dir() {
        return Err(CliError::PackNotFound(load_dir));
    }

    let mut cache = CustomTextureCache::new(settings);
    let report = cache.find_custom_textures();
    let options = cache.pack_options();

    println!("Pack: {}", load_dir.display());
    println!(
        "  Options: skip_mipmap={} flip_png_files={} use_new_hash={}{}",
        options.skip_mipmap(),
        options.flip_on_load(),
        options.use_new_hash(),
        if options.legacy_pack() { " (legacy)" } else { "" }
    );
    println!("  Files:       {}", report.files);
    println!("  Registered:  {}", report.registered);
    println!("  Skipped:     {}", report.skipped);
    println!("  Collisions:  {}", report.collisions);
    if report.aborted {
        println!();
        println!("Scan aborted: legacy packs cannot contain DDS or KTX files.");
        println!("Add a pack.ini (see `texpack init`) to enable compressed textures.");
    }

    if args.list {
        println!();
        for texture in cache.registry().iter() {
            let path = texture
                .path()
                .strip_prefix(&load_dir)
                .unwrap_or(texture.path());
            println!(
                "{}  {:>5}x{:<5}  {}  {}",
                HexHash(texture.hash()),
                texture.width(),
                texture.height(),
                texture.file_format(),
                path.display()
            );
        }
    }

    Ok(())
}
