// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! iceflash-mkimage - composes deployable IceFlash flash images.
//!
//! Takes a gateware bitstream (prebuilt, or synthesized through the
//! icestorm toolchain), an optional firmware image, and a boot slot
//! list, and produces the warmboot header plus the plain and multiboot
//! artifacts, each also padded to the erase-sector-aligned target.  The
//! written multiboot image is parsed back as a final check.

mod args;
mod output;
mod toolchain;

use anyhow::{Context, Result, bail};
use clap::Parser;

#[allow(unused_imports)]
use log::{debug, info, warn};

use iceflash_config::{BootSlots, FlashLayout};
use iceflash_fw_parser::MultibootHeader;
use iceflash_gen::Composer;

use crate::args::Args;
use crate::toolchain::{Icestorm, Prebuilt, Toolchain};

/// Build configuration loadable from JSON
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BuildConfig {
    layout: FlashLayout,
    boot_slots: BootSlots,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let build = load_build_config(args)?;
    build.layout.validate().context("Invalid flash layout")?;

    let slots = if args.boot_offsets.is_empty() {
        build.boot_slots
    } else {
        BootSlots::from_offsets(&args.boot_offsets).context("Invalid boot offsets")?
    };

    let toolchain: Box<dyn Toolchain> = match (&args.gateware, &args.rtl) {
        (Some(path), _) => Box::new(Prebuilt { path: path.clone() }),
        (None, Some(rtl)) => Box::new(Icestorm {
            rtl: rtl.clone(),
            top: args.top.clone(),
            pcf: args.pcf.clone(),
            placer: args.placer,
            seed: args.seed,
        }),
        (None, None) => bail!("either --gateware or --rtl is required"),
    };

    let gateware_path = toolchain
        .produce_gateware(&args.output_dir)
        .context("Gateware production failed")?;
    let gateware = std::fs::read(&gateware_path)
        .with_context(|| format!("Failed to read gateware {}", gateware_path.display()))?;

    let firmware = match &args.firmware {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read firmware {}", path.display()))?,
        None => Vec::new(),
    };

    info!(
        "composing: gateware {} bytes, firmware {} bytes",
        gateware.len(),
        firmware.len()
    );

    let mut composer = Composer::new(slots, &build.layout)
        .gateware(gateware)
        .firmware(firmware);
    if let Some(pad) = args.pad_to {
        composer = composer.pad_target(pad as usize);
    }
    let artifact = composer.build().context("Artifact composition failed")?;

    println!("Artifacts:");
    let written = output::write_artifacts(&args.output_dir, &args.name, &artifact, args.overwrite)?;

    verify_header(&artifact.multiboot, &slots)?;

    println!(
        "Composed {} artifacts for boot offsets {:?}",
        written.len(),
        slots.offsets()
    );
    Ok(())
}

fn load_build_config(args: &Args) -> Result<BuildConfig> {
    match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        }
        None => Ok(BuildConfig::default()),
    }
}

// Final check: the header at the front of the multiboot artifact must
// parse and carry exactly the requested offsets.
fn verify_header(multiboot: &[u8], slots: &BootSlots) -> Result<()> {
    let header = MultibootHeader::parse(multiboot).context("Composed header failed to parse")?;
    if header.boot_offsets() != slots.offsets().to_vec() {
        bail!(
            "composed header offsets {:?} do not match requested {:?}",
            header.boot_offsets(),
            slots.offsets()
        );
    }
    debug!("header verified, {} records", header.records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Placer;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("iceflash-mkimage-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_args(dir: &PathBuf) -> Args {
        Args {
            gateware: None,
            rtl: None,
            top: "iceflash_top".to_string(),
            pcf: None,
            placer: Placer::Heap,
            seed: 0,
            firmware: None,
            boot_offsets: vec![],
            config: None,
            pad_to: None,
            output_dir: dir.clone(),
            name: "iceflash".to_string(),
            overwrite: true,
        }
    }

    #[test]
    fn compose_from_prebuilt_gateware() {
        let dir = temp_dir("compose");
        let gateware = dir.join("gw.bin");
        std::fs::write(&gateware, vec![0x5Au8; 4096]).unwrap();

        let mut args = test_args(&dir);
        args.gateware = Some(gateware);
        args.boot_offsets = vec![160, 160, 157696, 262144, 294912];
        run(&args).unwrap();

        let pad = std::fs::read(dir.join("iceflash_multiboot_pad.bin")).unwrap();
        assert_eq!(pad.len(), FlashLayout::default().gateware_region as usize);
        let header = MultibootHeader::parse(&pad).unwrap();
        assert_eq!(
            header.boot_offsets(),
            vec![160, 160, 157696, 262144, 294912]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_gateware_file_is_fatal() {
        let dir = temp_dir("missing");
        let mut args = test_args(&dir);
        args.gateware = Some(dir.join("does-not-exist.bin"));
        assert!(run(&args).is_err());
        // No artifact may be left behind
        assert!(!dir.join("iceflash_pad.bin").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn gateware_or_rtl_required() {
        let dir = temp_dir("neither");
        let args = test_args(&dir);
        assert!(run(&args).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
