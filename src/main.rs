use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photoprint::models::{AppConfig, CONFIG_FILE_ENV};
use photoprint::server;
use photoprint::services::BatchConverter;
use thermal_dither::{ConvertError, DitherAlgorithm, DitherConfig};

#[derive(Parser)]
#[command(name = "photoprint")]
#[command(about = "Convert photos to 1-bit images for thermal receipt printers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image or every image in a directory tree
    Convert {
        /// Source image or directory (searched recursively)
        input: PathBuf,

        /// Output directory (default from config: data/surprise_photos)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output width in dots
        #[arg(short, long)]
        width: Option<u32>,

        /// Dither algorithm: atkinson_plus, atkinson, floyd_steinberg, sierra24a, stucki
        #[arg(short, long, value_parser = parse_algorithm)]
        algorithm: Option<DitherAlgorithm>,

        /// Brightness shift, -100 to 100
        #[arg(short, long, allow_negative_numbers = true)]
        brightness: Option<i32>,

        /// Contrast factor, 0.0 to 2.0
        #[arg(short, long)]
        contrast: Option<f32>,

        /// Never overwrite files already in the output directory
        #[arg(long)]
        keep_existing: bool,
    },
    /// Start the interactive preview server
    Preview {
        /// Listen address (default from config: 127.0.0.1:3000)
        #[arg(long)]
        bind: Option<String>,
    },
}

fn parse_algorithm(name: &str) -> Result<DitherAlgorithm, String> {
    name.parse().map_err(|e: ConvertError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert {
            input,
            output_dir,
            width,
            algorithm,
            brightness,
            contrast,
            keep_existing,
        }) => {
            let overrides = Overrides {
                width,
                algorithm,
                brightness,
                contrast,
            };
            run_convert_command(input, output_dir, overrides, keep_existing)
        }
        Some(Commands::Preview { bind }) => run_preview_server(bind).await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Conversion parameters given on the command line
struct Overrides {
    width: Option<u32>,
    algorithm: Option<DitherAlgorithm>,
    brightness: Option<i32>,
    contrast: Option<f32>,
}

impl Overrides {
    fn apply(&self, base: DitherConfig) -> DitherConfig {
        let mut config = base;
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(width) = self.width {
            config.target_width = width;
        }
        if let Some(brightness) = self.brightness {
            config.brightness = brightness;
        }
        if let Some(contrast) = self.contrast {
            config.contrast = contrast;
        }
        config
    }
}

/// Convert files without starting a server
fn run_convert_command(
    input: PathBuf,
    output_dir: Option<PathBuf>,
    overrides: Overrides,
    keep_existing: bool,
) -> anyhow::Result<()> {
    // Minimal logging for CLI, kept off stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoprint=warn,thermal_dither=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let app_config = AppConfig::load();
    let config = overrides.apply(app_config.defaults.dither_config());
    let output_dir = output_dir.unwrap_or(app_config.output_dir);

    // Fail on bad parameters before printing anything
    config.validate()?;

    println!("Input:      {}", input.display());
    println!("Output dir: {}", output_dir.display());
    println!(
        "Parameters: width={}, algorithm={}, brightness={}, contrast={}",
        config.target_width, config.algorithm, config.brightness, config.contrast
    );
    println!("{}", "-".repeat(60));

    let report = BatchConverter::new(config)
        .keep_existing(keep_existing)
        .run_with_progress(&input, &output_dir, |index, total, outcome| {
            println!("[{index}/{total}] {outcome}");
        })?;

    if report.is_empty() {
        println!("No images found in {}", input.display());
        return Ok(());
    }

    println!("{}", "-".repeat(60));
    println!("Done: {}", report.summary());

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_file = std::env::var(CONFIG_FILE_ENV).ok();
    let config = match &config_file {
        Some(path) => AppConfig::load_from_path(std::path::Path::new(path)),
        None => AppConfig::default(),
    };

    println!("Photoprint v{VERSION}");
    println!("Photo conversion for thermal receipt printers\n");

    println!("Environment Variables:");
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    let source = match &config_file {
        Some(path) if std::path::Path::new(path).exists() => path.as_str(),
        Some(_) => "defaults (file not found)",
        None => "defaults",
    };
    println!("\nConfiguration ({source}):");
    println!("  Output dir: {}", config.output_dir.display());
    println!("  Bind addr:  {}", config.bind_addr);
    println!(
        "  Sessions:   max {}, idle timeout {}s",
        config.max_sessions, config.session_idle_secs
    );
    println!("  Algorithm:  {}", config.defaults.algorithm);
    println!("  Width:      {}", config.defaults.width);
    println!("  Brightness: {}", config.defaults.brightness);
    println!("  Contrast:   {}", config.defaults.contrast);

    let algorithms: Vec<&str> = DitherAlgorithm::ALL.iter().map(|a| a.name()).collect();
    println!("\nAlgorithms: {}", algorithms.join(", "));

    println!("\nCommands:");
    println!("  photoprint convert <INPUT>   Convert an image or directory");
    println!("  photoprint preview           Start the interactive preview server");
    println!("\nRun 'photoprint --help' for more details.");
}

/// Run the preview HTTP server
async fn run_preview_server(bind: Option<String>) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoprint=info,thermal_dither=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load();
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());

    tracing::info!(
        output_dir = %config.output_dir.display(),
        algorithm = %config.defaults.algorithm,
        width = config.defaults.width,
        "Preview defaults configured"
    );

    let app = server::build_router(server::create_app_state(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Photoprint preview server listening");
    tracing::info!("Preview UI available at http://{}/", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
