// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Synthesis toolchain as a capability.
//!
//! The composer only needs "produce me a gateware bitstream"; whether
//! that runs yosys/nextpnr/icepack or just hands back a prebuilt file is
//! behind the [`Toolchain`] trait.  Every stage's exit status is checked
//! - a non-zero exit aborts the build before any artifact is composed.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[allow(unused_imports)]
use log::{debug, info};

use crate::args::Placer;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("{stage} failed with {status}")]
    StageFailed {
        stage: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("{stage} could not run: {source}")]
    Spawn {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("no RTL sources found in {path}")]
    NoSources { path: PathBuf },

    #[error("gateware artifact missing after {stage}: {path}")]
    MissingArtifact {
        stage: &'static str,
        path: PathBuf,
    },

    #[error("gateware image missing or empty: {path}")]
    BadPrebuilt { path: PathBuf },
}

/// Produces the gateware bitstream for composition
pub trait Toolchain {
    /// Returns the path of the produced bitstream.  Never swallows a
    /// failure: any stage error propagates and nothing is composed.
    fn produce_gateware(&self, out_dir: &Path) -> Result<PathBuf, ToolchainError>;
}

/// The icestorm flow: yosys, nextpnr-ice40, icepack
#[derive(Debug)]
pub struct Icestorm {
    pub rtl: PathBuf,
    pub top: String,
    pub pcf: Option<PathBuf>,
    pub placer: Placer,
    pub seed: u64,
}

impl Icestorm {
    fn verilog_sources(&self) -> Result<Vec<PathBuf>, ToolchainError> {
        let mut sources: Vec<PathBuf> = std::fs::read_dir(&self.rtl)
            .map_err(|source| ToolchainError::Spawn {
                stage: "rtl scan",
                source,
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "v"))
            .collect();
        sources.sort();

        if sources.is_empty() {
            return Err(ToolchainError::NoSources {
                path: self.rtl.clone(),
            });
        }
        Ok(sources)
    }
}

impl Toolchain for Icestorm {
    fn produce_gateware(&self, out_dir: &Path) -> Result<PathBuf, ToolchainError> {
        let json = out_dir.join(format!("{}.json", self.top));
        let asc = out_dir.join(format!("{}.asc", self.top));
        let bin = out_dir.join(format!("{}.bin", self.top));

        let sources = self.verilog_sources()?;

        let mut yosys = Command::new("yosys");
        yosys.arg("-q").arg("-p").arg(format!(
            "synth_ice40 -json {} -top {} -relut -dffe_min_ce_use 4",
            json.display(),
            self.top
        ));
        yosys.args(&sources);
        run_stage("yosys", &mut yosys)?;

        let mut nextpnr = Command::new("nextpnr-ice40");
        nextpnr
            .arg("--up5k")
            .arg("--package")
            .arg("sg48")
            .arg("--json")
            .arg(&json)
            .arg("--asc")
            .arg(&asc)
            .arg("--seed")
            .arg(self.seed.to_string())
            .arg("--placer")
            .arg(self.placer.flag_value())
            .arg("--ignore-loops");
        if let Some(pcf) = &self.pcf {
            nextpnr.arg("--pcf").arg(pcf);
        }
        run_stage("nextpnr", &mut nextpnr)?;

        // -s keeps the oscillator running so firmware words stay readable
        // over the memory-mapped bus
        let mut icepack = Command::new("icepack");
        icepack.arg("-s").arg(&asc).arg(&bin);
        run_stage("icepack", &mut icepack)?;

        if !bin.is_file() {
            return Err(ToolchainError::MissingArtifact {
                stage: "icepack",
                path: bin,
            });
        }
        Ok(bin)
    }
}

/// A bitstream built elsewhere; validated, not synthesized
#[derive(Debug)]
pub struct Prebuilt {
    pub path: PathBuf,
}

impl Toolchain for Prebuilt {
    fn produce_gateware(&self, _out_dir: &Path) -> Result<PathBuf, ToolchainError> {
        let ok = std::fs::metadata(&self.path)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false);
        if !ok {
            return Err(ToolchainError::BadPrebuilt {
                path: self.path.clone(),
            });
        }
        debug!("using prebuilt gateware {}", self.path.display());
        Ok(self.path.clone())
    }
}

fn run_stage(stage: &'static str, cmd: &mut Command) -> Result<(), ToolchainError> {
    info!("running {stage}");
    let status = cmd
        .status()
        .map_err(|source| ToolchainError::Spawn { stage, source })?;
    if !status.success() {
        return Err(ToolchainError::StageFailed { stage, status });
    }
    Ok(())
}
