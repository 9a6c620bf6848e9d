use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lens_core::rotate::FsImageBackend;
use lens_core::ResourceKey;

#[derive(Args)]
pub struct RecoverArgs {
    /// Image files to check for leftover backups
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &RecoverArgs) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let backend = FsImageBackend::new();

    let mut restored = 0usize;
    for file in &args.files {
        let key = ResourceKey::from_path(file)
            .with_context(|| format!("Cannot open {}", file.display()))?;
        let recovered = rt
            .block_on(backend.recover(&key))
            .with_context(|| format!("Failed to recover {}", key))?;
        crate::summary::print_recover_line(&key, recovered);
        restored += recovered as usize;
    }

    println!();
    println!("{} of {} file(s) restored", restored, args.files.len());
    Ok(())
}
