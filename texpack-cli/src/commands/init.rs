//! Init command - write a pack.ini template for pack authors.

use std::path::Path;

use clap::Args;
use texpack::cache::CustomTextureCache;
use texpack::config::PACK_CONFIG_FILENAME;

use super::common::ProgramArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub program: ProgramArgs,
}

/// Run the init command.
pub fn run(user_root: &Path, args: InitArgs) -> Result<(), CliError> {
    let cache = CustomTextureCache::new(args.program.settings(user_root));
    let path = cache.settings().dump_dir().join(PACK_CONFIG_FILENAME);

    if cache.write_config()? {
        println!("Wrote {}", path.display());
        println!();
        println!("Move it next to your replacement textures and edit as needed.");
    } else {
        println!("Config already exists: {}", path.display());
    }
    Ok(())
}
