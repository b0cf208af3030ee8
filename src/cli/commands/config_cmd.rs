//! config command - Print the effective configuration

use anyhow::{Context as _, Result};

use super::Context;

/// Print the effective configuration as TOML.
///
/// The source file, when one was found, is printed as a leading comment.
pub fn config(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;

    let rendered = toml::to_string(&loaded.config.effective())
        .context("Failed to render configuration")?;

    if !ctx.quiet {
        match loaded.config.loaded_from() {
            Some(path) => println!("# loaded from {}", path.display()),
            None => println!("# no config file found, showing defaults"),
        }
    }
    print!("{}", rendered);
    Ok(())
}
