mod cli;

use posterframe::config;
use posterframe_av::{
    decoder_info, resolve_decoder, CancellationToken, FfmpegExtractor, ThumbnailOptions,
    ThumbnailPipeline, VideoSource,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "posterframe=debug,posterframe_av=debug".to_string()
        } else {
            "posterframe=info,posterframe_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Thumbnail {
            input,
            output,
            timestamp,
            width,
            height,
            format,
            quality,
            timeout,
            stdin,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;

            let mut options = config.thumbnail.to_options();
            options.timestamp_seconds = timestamp.or(options.timestamp_seconds);
            options.width = width.or(options.width);
            options.height = height.or(options.height);
            options.output_format = format.or(options.output_format);
            options.quality = quality.or(options.quality);
            let timeout = timeout.or(config.thumbnail.timeout_secs);

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_thumbnail(ThumbnailJob {
                input,
                output,
                options,
                timeout,
                stdin,
                decoder: resolve_decoder(config.tools.ffmpeg_path.as_deref()),
            }))
        }
        Commands::CheckTools { json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let decoder = resolve_decoder(config.tools.ffmpeg_path.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check_tools(&decoder, json))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

struct ThumbnailJob {
    input: PathBuf,
    output: Option<PathBuf>,
    options: ThumbnailOptions,
    timeout: Option<u64>,
    stdin: bool,
    decoder: PathBuf,
}

async fn run_thumbnail(job: ThumbnailJob) -> Result<()> {
    let ThumbnailJob {
        input,
        output,
        mut options,
        timeout,
        stdin,
        decoder,
    } = job;

    if options.width == Some(0) || options.height == Some(0) {
        anyhow::bail!("Width and height must be greater than 0");
    }

    let source = if stdin {
        use tokio::io::AsyncReadExt;
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .context("Failed to read video from stdin")?;
        tracing::info!("Read {} bytes of video from stdin", bytes.len());
        VideoSource::from_bytes(bytes)
    } else {
        VideoSource::from_path(&input)
    };

    let token = CancellationToken::new();
    options.cancellation = Some(token.clone());
    spawn_cancel_triggers(&token, timeout);

    let format = options.effective_format();
    let output = output.unwrap_or_else(|| default_output_path(&input, format.extension()));

    let pipeline = ThumbnailPipeline::new(FfmpegExtractor::new(decoder));
    let result = pipeline
        .generate(&source, &options)
        .await
        .context("Thumbnail generation aborted")?;

    let Some(thumb) = result else {
        anyhow::bail!("No thumbnail could be generated for {:?}", input);
    };

    tokio::fs::write(&output, &thumb.bytes)
        .await
        .with_context(|| format!("Failed to write thumbnail: {:?}", output))?;

    println!("Output: {}", output.display());
    println!("Size: {}x{}", thumb.width, thumb.height);
    println!("Format: {}", thumb.format);
    println!("Timestamp: {:.3}s", thumb.timestamp_seconds);
    if let Some(q) = thumb.quality {
        println!("Quality: {}", q);
    }

    Ok(())
}

/// Cancel `token` on Ctrl-C, and after `timeout` seconds if given.
fn spawn_cancel_triggers(token: &CancellationToken, timeout: Option<u64>) {
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling extraction");
            on_signal.cancel();
        }
    });

    if let Some(secs) = timeout {
        let on_timeout = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!("Timed out after {}s, cancelling extraction", secs);
            on_timeout.cancel();
        });
    }
}

fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "thumbnail".to_string());
    PathBuf::from(format!("{}.{}", stem, extension))
}

async fn check_tools(decoder: &Path, json: bool) -> Result<()> {
    let tool = decoder_info(decoder).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&tool)?);
        return Ok(());
    }

    println!("Checking external tools...\n");
    let status = if tool.available { "✓" } else { "✗" };

    print!("{} {}", status, tool.name);
    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if tool.available {
        println!("Decoder is available!");
    } else {
        println!("Decoder is missing. Install ffmpeg or set tools.ffmpeg_path.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  ffmpeg: {:?}", config.tools.ffmpeg_path);
            println!("  Thumbnail defaults: {:?}", config.thumbnail);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("  Thumbnail defaults: {:?}", config.thumbnail);
        }
    }

    Ok(())
}
