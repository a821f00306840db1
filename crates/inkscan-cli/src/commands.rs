// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface: argument definitions and handlers.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use inkscan_core::config::{self, ScanSettings};
use inkscan_core::error::Result;
use inkscan_core::types::{ImageHandle, Origin, OutputFormat};
use inkscan_document::{Binarizer, HandleRegistry, ImageSource, ThresholdReport, UploadPreparer};
use serde::Serialize;
use tracing::info;

/// Scan-style binarization for homework photos.
#[derive(Debug, Parser)]
#[command(name = "inkscan", version, about)]
pub struct Cli {
    /// Directory holding settings.json (defaults to the user data directory).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Binarize one image regardless of the saved binarizing setting.
    Binarize(BinarizeArgs),
    /// Run an image through the upload stage using the saved settings.
    Prepare(PrepareArgs),
    /// Show or change the saved scan settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Image to process.
    pub input: PathBuf,

    /// Treat the image as fetched from this URL.
    #[arg(long)]
    pub remote_url: Option<String>,

    /// The remote host allowed cross-origin pixel access.
    #[arg(long, requires = "remote_url")]
    pub cors_approved: bool,
}

impl SourceArgs {
    fn to_source(&self) -> ImageSource {
        let origin = match &self.remote_url {
            Some(url) => Origin::Remote {
                url: url.clone(),
                cors_approved: self.cors_approved,
            },
            None => Origin::Local,
        };
        ImageSource::from_path(&self.input).with_origin(origin)
    }
}

#[derive(Debug, Args)]
pub struct BinarizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output path (defaults to enhanced_<name>.<ext> next to the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// png or jpeg (defaults to the saved setting).
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// JPEG quality in [0, 1] (defaults to the saved setting).
    #[arg(long)]
    pub quality: Option<f32>,
}

#[derive(Debug, Args)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Where to write the prepared upload. Binarized output defaults to a
    /// file next to the input; pass-through uploads are only written when set.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the saved settings as JSON.
    Show,
    /// Change one or more settings.
    Set {
        #[arg(long)]
        binarizing: Option<bool>,
        #[arg(long)]
        format: Option<OutputFormat>,
        #[arg(long)]
        quality: Option<f32>,
        #[arg(long)]
        max_pixels: Option<u64>,
    },
    /// Restore the defaults.
    Reset,
}

/// What a processing command prints on stdout.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    output: Option<&'a Path>,
    file_name: &'a str,
    mime_type: &'a str,
    handle: ImageHandle,
    binarized: bool,
    report: Option<ThresholdReport>,
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.unwrap_or_else(config::data_dir);

    match cli.command {
        Command::Binarize(args) => binarize(&data_dir, args),
        Command::Prepare(args) => prepare(&data_dir, args),
        Command::Settings { action } => settings(&data_dir, action),
    }
}

fn binarize(data_dir: &Path, args: BinarizeArgs) -> Result<()> {
    let settings = ScanSettings::load_or_default(data_dir);
    let binarizer = Binarizer::from_settings(&settings, HandleRegistry::new());

    let format = args.format.unwrap_or(settings.output_format);
    let quality = args.quality.or(settings.jpeg_quality);
    let processed = binarizer.binarize(&args.source.to_source(), format, quality)?;

    let output = args
        .output
        .unwrap_or_else(|| args.source.input.with_file_name(&processed.file_name));
    std::fs::write(&output, &*processed.bytes)?;
    info!(output = %output.display(), "Binarized image written");

    print_summary(&Summary {
        output: Some(&output),
        file_name: &processed.file_name,
        mime_type: processed.format.mime_type(),
        handle: processed.handle,
        binarized: true,
        report: Some(processed.report),
    })
}

fn prepare(data_dir: &Path, args: PrepareArgs) -> Result<()> {
    let settings = ScanSettings::load_or_default(data_dir);
    let preparer = UploadPreparer::new(settings, HandleRegistry::new());
    let upload = preparer.prepare(args.source.to_source())?;

    let output = match args.output {
        Some(path) => Some(path),
        None if upload.binarized => Some(args.source.input.with_file_name(&upload.file_name)),
        None => None,
    };
    if let Some(path) = &output {
        std::fs::write(path, &*upload.bytes)?;
        info!(output = %path.display(), "Prepared upload written");
    }

    print_summary(&Summary {
        output: output.as_deref(),
        file_name: &upload.file_name,
        mime_type: upload.mime_type,
        handle: upload.handle,
        binarized: upload.binarized,
        report: upload.report,
    })
}

fn settings(data_dir: &Path, action: SettingsAction) -> Result<()> {
    let settings = match action {
        SettingsAction::Show => ScanSettings::load_or_default(data_dir),
        SettingsAction::Set {
            binarizing,
            format,
            quality,
            max_pixels,
        } => {
            let mut settings = ScanSettings::load_or_default(data_dir);
            if let Some(value) = binarizing {
                settings.image_binarizing = value;
            }
            if let Some(value) = format {
                settings.output_format = value;
            }
            if let Some(value) = quality {
                settings.jpeg_quality = Some(value);
            }
            if let Some(value) = max_pixels {
                settings.max_pixels = value;
            }
            settings.save(data_dir)?;
            info!(data_dir = %data_dir.display(), "Settings saved");
            settings
        }
        SettingsAction::Reset => {
            let settings = ScanSettings::default();
            settings.save(data_dir)?;
            settings
        }
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn print_summary(summary: &Summary<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
