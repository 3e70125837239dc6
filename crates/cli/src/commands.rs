use anyhow::{Context, Result};
use clap::Args;
use splatprep_colmap::{export_cameras, write_points3d, CameraExportOptions};
use splatprep_io::{read_ply, write_ply, write_ply_binary, PlyFormat};
use splatprep_sampling::{morton_subsample, SubsampleParams};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;

#[derive(Debug, Args)]
pub struct SubsampleArgs {
    /// Dense input cloud (.ply)
    #[arg(short, long, value_name = "PLY")]
    pub input: PathBuf,

    /// Where to write the subsampled cloud (.ply)
    #[arg(short, long, value_name = "PLY")]
    pub output: PathBuf,

    /// Exact number of points to keep [default: subsample.target_count]
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Morton grid depth per axis, 1..=21 [default: subsample.bits]
    #[arg(long)]
    pub bits: Option<u32>,

    /// Write ascii PLY even if the config asks for binary
    #[arg(long)]
    pub ascii: bool,
}

impl SubsampleArgs {
    pub fn params(&self, config: &Config) -> SubsampleParams {
        SubsampleParams::new(self.count.unwrap_or(config.subsample.target_count))
            .with_bits(self.bits.unwrap_or(config.subsample.bits))
    }

    pub fn format(&self, config: &Config) -> PlyFormat {
        if self.ascii || !config.ply.binary {
            PlyFormat::Ascii
        } else {
            PlyFormat::BinaryLittleEndian
        }
    }
}

#[derive(Debug, Args)]
pub struct Ply2TxtArgs {
    /// Colored input cloud (.ply)
    #[arg(short, long, value_name = "PLY")]
    pub input: PathBuf,

    /// COLMAP points3D.txt to write
    #[arg(short, long, value_name = "TXT")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportCamerasArgs {
    /// Directory of Open3D pinhole camera *.json files
    #[arg(short, long, value_name = "DIR")]
    pub dir: PathBuf,

    /// Output cameras.txt [default: <DIR>/cameras.txt]
    #[arg(long, value_name = "TXT")]
    pub cameras: Option<PathBuf>,

    /// Output images.txt [default: <DIR>/images.txt]
    #[arg(long, value_name = "TXT")]
    pub images: Option<PathBuf>,

    /// Image width written to cameras.txt [default: from the first camera]
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height written to cameras.txt [default: from the first camera]
    #[arg(long)]
    pub height: Option<u32>,
}

impl ExportCamerasArgs {
    pub fn options(&self, config: &Config) -> CameraExportOptions {
        let mut options = config.cameras.export_options();
        if self.width.is_some() {
            options.width = self.width;
        }
        if self.height.is_some() {
            options.height = self.height;
        }
        options
    }

    fn output_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.cameras
                .clone()
                .unwrap_or_else(|| self.dir.join("cameras.txt")),
            self.images
                .clone()
                .unwrap_or_else(|| self.dir.join("images.txt")),
        )
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

pub fn run_subsample(args: &SubsampleArgs, config: &Config) -> Result<()> {
    let params = args.params(config);
    let cloud =
        read_ply(&args.input).with_context(|| format!("failed to read {}", display(&args.input)))?;

    let sampled = morton_subsample(&cloud, &params).with_context(|| {
        format!(
            "cannot subsample {} to {} points",
            display(&args.input),
            params.target_count
        )
    })?;

    let format = args.format(config);
    let written = match format {
        PlyFormat::Ascii => write_ply(&args.output, &sampled),
        _ => write_ply_binary(&args.output, &sampled),
    };
    written.with_context(|| format!("failed to write {}", display(&args.output)))?;

    info!(
        input = cloud.len(),
        output = sampled.len(),
        bits = params.bits,
        ?format,
        path = %args.output.display(),
        "subsampled point cloud"
    );
    Ok(())
}

pub fn run_ply2txt(args: &Ply2TxtArgs) -> Result<()> {
    let cloud =
        read_ply(&args.input).with_context(|| format!("failed to read {}", display(&args.input)))?;
    write_points3d(&args.output, &cloud)
        .with_context(|| format!("failed to write {}", display(&args.output)))?;
    info!(points = cloud.len(), path = %args.output.display(), "wrote points3D");
    Ok(())
}

pub fn run_export_cameras(args: &ExportCamerasArgs, config: &Config) -> Result<()> {
    let options = args.options(config);
    let (cameras, images) = args.output_paths();
    export_cameras(&args.dir, &cameras, &images, &options).with_context(|| {
        format!("failed to export cameras from {}", display(&args.dir))
    })?;
    Ok(())
}
