mod utils;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use hwc::{GrayPicture, Parameters, Quantizer, operations};
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use utils::{Assume, exists_decision, is_image_path, quantizer, read_picture};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'y', long = "overwrite", conflicts_with = "assumeno")]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'n', long = "preserve", conflicts_with = "assumeyes")]
    assumeno: bool,

    /// More output, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Encode a grayscale image into an HWC stream
    Encode(EncodeArgs),

    /// Decode an HWC stream into a raw or standard image
    Decode(DecodeArgs),

    /// Encode, decode and report the reconstruction error of a raw image
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct CodecArgs {
    /// Number of wavelet decomposition levels
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=7))]
    levels: u32,

    /// How detail coefficients are reconstructed. Both write the same
    /// stream
    ///
    /// Valid values:
    ///  - midrise    bin midpoints, error within half a step (default)
    ///  - zero-snap  zero details come back exactly, flat areas stay flat
    #[arg(short, long, value_parser = quantizer, verbatim_doc_comment)]
    quantizer: Option<Quantizer>,
}

impl CodecArgs {
    fn parameters(&self) -> Parameters {
        Parameters::new(self.levels).with_quantizer(self.quantizer.unwrap_or_default())
    }
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Input image. A headerless raw luma file when the width and height are
    /// given, otherwise any file supported by `image`
    input: PathBuf,

    /// Output path of the stream
    output: PathBuf,

    /// Width of a raw input image
    #[arg(short = 'W', long, requires = "height")]
    width: Option<u32>,

    /// Height of a raw input image
    #[arg(short = 'H', long, requires = "width")]
    height: Option<u32>,

    #[command(flatten)]
    codec: CodecArgs,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Input stream
    input: PathBuf,

    /// Output image. Written as a standard image when the extension is one
    /// `image` knows, as raw luma otherwise
    output: PathBuf,

    /// Width the stream was encoded with
    #[arg(short = 'W', long)]
    width: u32,

    /// Height the stream was encoded with
    #[arg(short = 'H', long)]
    height: u32,

    #[command(flatten)]
    codec: CodecArgs,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Headerless raw luma image
    input: PathBuf,

    #[arg(short = 'W', long)]
    width: u32,

    #[arg(short = 'H', long)]
    height: u32,

    /// Directory to write the stream, the per-level coefficient images and
    /// the reconstruction into
    #[arg(short, long, default_value = ".")]
    workdir: PathBuf,

    #[command(flatten)]
    codec: CodecArgs,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    match args.command {
        Subcommands::Encode(a) => encode(a, assume),
        Subcommands::Decode(a) => decode(a, assume),
        Subcommands::Run(a) => run(a, assume),
    }
}

fn encode(args: EncodeArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let picture = read_picture(&args.input, args.width.zip(args.height))?;
    let params = args.codec.parameters();

    picture.save(&args.output, &params)?;
    info!(
        "Encoded {}×{} image to {:?}",
        picture.width(),
        picture.height(),
        args.output
    );

    Ok(())
}

fn decode(args: DecodeArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let params = args.codec.parameters();
    let picture = hwc::open(&args.input, args.width, args.height, &params)?;

    if is_image_path(&args.output) {
        image::save_buffer(
            &args.output,
            picture.as_raw(),
            picture.width(),
            picture.height(),
            image::ColorType::L8,
        )?;
    } else {
        picture.save_raw(&args.output)?;
    }
    info!("Decoded stream to {:?}", args.output);

    Ok(())
}

/// Every file `run` writes into its work directory
struct RunOutputs {
    snapshots: Vec<PathBuf>,
    stream: PathBuf,
    reconstruction: PathBuf,
}

impl RunOutputs {
    fn new(workdir: &Path, width: u32, height: u32, levels: u32) -> Self {
        Self {
            snapshots: (1..=levels)
                .map(|k| workdir.join(format!("{k}_transform_coefficient_{width}x{height}_yuv400_8bit.raw")))
                .collect(),
            stream: workdir.join("encode_file"),
            reconstruction: workdir.join(format!("reconstructed_image_{width}x{height}_yuv400_8bit.raw")),
        }
    }

    fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.snapshots.iter().chain([&self.stream, &self.reconstruction])
    }
}

fn run(args: RunArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let (width, height) = (args.width, args.height);
    let params = args.codec.parameters();
    params.validate(width, height)?;

    fs::create_dir_all(&args.workdir)?;
    let outputs = RunOutputs::new(&args.workdir, width, height, params.levels);

    for path in outputs.all() {
        if path.try_exists()? && !exists_decision("Output", "Overwrite", path, assume) {
            return Ok(())
        }
    }

    let original = GrayPicture::open_raw(&args.input, width, height)?;

    let snapshots = operations::transform_snapshots(&original, params.levels)?;
    for (k, (snapshot, path)) in snapshots.iter().zip(&outputs.snapshots).enumerate() {
        hwc::raw::write_raw(path, snapshot)?;
        info!("Wrote level {} coefficients to {:?}", k + 1, path);
    }

    original.save(&outputs.stream, &params)?;
    let reconstructed = hwc::open(&outputs.stream, width, height, &params)?;
    reconstructed.save_raw(&outputs.reconstruction)?;

    let stream_size = fs::metadata(&outputs.stream)?.len();
    println!(
        "Stream : {} bytes ({:.3} bpp)",
        stream_size,
        stream_size as f64 * 8.0 / (width as f64 * height as f64)
    );
    println!("MSE : {:.6}", original.mse(&reconstructed)?);
    println!(
        "PSNR : {:.3} dB",
        operations::psnr(original.as_raw(), reconstructed.as_raw())?
    );

    Ok(())
}
