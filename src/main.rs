use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dicom_series::{ImageSeriesReader, PixelId, PixelTypeRegistry};

/// Reads an ordered list of slice files as one image and prints a summary.
#[derive(Parser, Debug)]
#[command(name = "dicom-series")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Slice files, in stacking order.
    #[arg(required_unless_present = "list_pixel_types")]
    files: Vec<PathBuf>,

    /// Output pixel type (e.g. UInt16, Float32, VectorUInt8); "infer" keeps
    /// the type of the first file.
    #[arg(long, default_value = "infer", env = "DICOM_SERIES_PIXEL_TYPE")]
    pixel_type: PixelId,

    /// Force a backend by name (DicomImageIo, RasterImageIo).
    #[arg(long, env = "DICOM_SERIES_IMAGE_IO")]
    image_io: Option<String>,

    /// Print the metadata dictionary of the first slice.
    #[arg(long)]
    metadata: bool,

    /// Save the middle slice of a scalar 3-D result as an 8-bit PNG.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// List the pixel types the series reader supports and exit.
    #[arg(long)]
    list_pixel_types: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_pixel_types {
        for pixel_id in PixelTypeRegistry::global().supported_pixel_ids() {
            println!("{pixel_id:?}\t{pixel_id}");
        }
        return ExitCode::SUCCESS;
    }

    let mut reader = ImageSeriesReader::new();
    reader
        .set_file_names(&cli.files)
        .set_output_pixel_type(cli.pixel_type)
        .set_metadata_capture(cli.metadata);
    if let Some(name) = &cli.image_io {
        reader.set_image_io(name.as_str());
    }

    let image = match reader.execute() {
        Ok(image) => image,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Pixel type: {}", image.pixel_id());
    println!("Components: {}", image.number_of_components());
    println!("Size:       {:?}", image.size());
    println!("Spacing:    {:?}", image.spacing());
    println!("Origin:     {:?}", image.origin());

    if cli.metadata {
        match reader.metadata_dictionary(0) {
            Ok(dictionary) => {
                for (key, value) in dictionary {
                    println!("{key} = {value}");
                }
            }
            Err(e) => error!("{}", e),
        }
    }

    if let Some(path) = &cli.preview {
        let middle = image.size().get(2).copied().unwrap_or(0) / 2;
        let Some(preview) = image.slice_preview(middle) else {
            error!("Preview needs a scalar 3-D image");
            return ExitCode::FAILURE;
        };
        if let Err(e) = preview.save(path) {
            error!("Failed to save preview: {}", e);
            return ExitCode::FAILURE;
        }
        info!("Saved slice {} to {}", middle, path.display());
    }

    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
