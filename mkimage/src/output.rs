// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Writes the composed artifacts out.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use iceflash_gen::{ComposedArtifact, PadOutcome};

#[allow(unused_imports)]
use log::{info, warn};

/// Writes all five artifacts; returns their paths in write order.
///
/// Existing files are only replaced with `overwrite`.  Truncation during
/// padding is surfaced as a warning - the artifact is still written, the
/// data loss is just never silent.
pub fn write_artifacts(
    dir: &Path,
    name: &str,
    artifact: &ComposedArtifact,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    warn_on_truncation("padded image", &artifact.image_outcome);
    warn_on_truncation("padded multiboot image", &artifact.multiboot_outcome);

    let files: [(String, &[u8]); 5] = [
        ("multiboot-header.bin".to_string(), &artifact.header),
        (format!("{name}.bin"), &artifact.image),
        (format!("{name}_multiboot.bin"), &artifact.multiboot),
        (format!("{name}_pad.bin"), &artifact.image_pad),
        (format!("{name}_multiboot_pad.bin"), &artifact.multiboot_pad),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (file_name, bytes) in files {
        let path = dir.join(&file_name);
        if path.exists() && !overwrite {
            bail!(
                "Output file '{}' already exists. Use --overwrite to overwrite.",
                path.display()
            );
        }
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} ({} bytes)", path.display(), bytes.len());
        written.push(path);
    }

    Ok(written)
}

fn warn_on_truncation(what: &str, outcome: &PadOutcome) {
    if let PadOutcome::Truncated { dropped } = outcome {
        warn!("{what}: {dropped} trailing bytes dropped to fit the pad target");
    }
}
