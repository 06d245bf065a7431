//! bildtext - Image tags, accessibility descriptions and narrated audio from AI services

use anyhow::{Context, Result};
use bildtext::config::BildtextConfig;
use bildtext::describe::ImageDescriber;
use bildtext::image::load_image;
use bildtext::text::{chunk_document, read_document};
use bildtext::tts::{ElevenLabsBackend, Narrator};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bildtext")]
#[command(about = "Generate image tags, accessibility descriptions and narrated audio using AI services", long_about = None)]
#[command(version)]
struct Args {
    /// LLM preset for image requests (see ~/.config/cli-programs/llm.toml)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate SEO alt and title attributes for images
    Tags {
        /// Image files (JPEG, PNG, GIF, WEBP, BMP)
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Generate short and long accessibility descriptions for images
    Describe {
        /// Image files (JPEG, PNG, GIF, WEBP, BMP)
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Book context for the descriptions (overrides config)
        #[arg(short, long)]
        context: Option<String>,
    },
    /// Narrate a text or Word document with ElevenLabs
    Speak {
        /// Document to read (.txt, .md, .docx)
        document: PathBuf,

        /// Output file path (default: <document-name>.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show how a document would be split for speech synthesis
    Chunk {
        /// Document to split (.txt, .md, .docx)
        document: PathBuf,

        /// Maximum characters per chunk (overrides config)
        #[arg(long)]
        max_size: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set maximum characters per synthesis request
    SetChunkSize {
        /// Characters (at least 1)
        value: usize,
    },
    /// Set ElevenLabs voice
    SetVoice {
        /// Voice ID
        voice_id: String,
    },
    /// Set book context for accessibility descriptions
    SetContext {
        /// Short description of the book
        context: String,
    },
    /// Set pause between image requests
    SetDelay {
        /// Seconds
        seconds: u64,
    },
}

/// Outcome for one image, as printed in JSON mode.
#[derive(Debug, Serialize)]
struct ImageReport<T> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &args.command {
        Commands::Tags { images } => run_tags(&args, images).await,
        Commands::Describe { images, context } => {
            run_describe(&args, images, context.as_deref()).await
        }
        Commands::Speak { document, output } => run_speak(document, output.as_deref()).await,
        Commands::Chunk { document, max_size } => run_chunk(&args, document, *max_size),
        Commands::Config { action } => handle_config_command(action),
    }
}

fn describer(args: &Args, config: &BildtextConfig) -> Result<ImageDescriber> {
    let preset = args.model.as_deref().or(config.model_preset.as_deref());
    let describer = ImageDescriber::from_config(preset)
        .context("Failed to set up LLM provider")?
        .with_request_delay(config.request_delay());
    Ok(describer)
}

async fn run_tags(args: &Args, images: &[PathBuf]) -> Result<()> {
    let config = BildtextConfig::load().context("Failed to load configuration")?;
    let describer = describer(args, &config)?;

    let mut reports = Vec::new();
    for (i, path) in images.iter().enumerate() {
        eprintln!("[{}/{}] {}", i + 1, images.len(), path.display());

        let result = match load_image(path) {
            Ok(image) => describer.seo_tags(&image).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(tags) if !args.json => {
                println!("{}", path.display());
                println!("  alt:   {}", tags.alt);
                println!("  title: {}", tags.title);
            }
            Ok(_) => {}
            Err(e) => error!("{}: {}", path.display(), e),
        }
        reports.push(report(path, result));
    }

    finish(args, &reports)
}

async fn run_describe(args: &Args, images: &[PathBuf], context: Option<&str>) -> Result<()> {
    let config = BildtextConfig::load().context("Failed to load configuration")?;
    let describer = describer(args, &config)?;
    let context = context.or(config.book_context.as_deref());

    let mut reports = Vec::new();
    for (i, path) in images.iter().enumerate() {
        eprintln!("[{}/{}] {}", i + 1, images.len(), path.display());

        let result = match load_image(path) {
            Ok(image) => describer.accessibility_description(&image, context).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(description) if !args.json => {
                println!("{}", path.display());
                println!("  short: {}", description.short);
                println!("  long:  {}", description.long);
            }
            Ok(_) => {}
            Err(e) => error!("{}: {}", path.display(), e),
        }
        reports.push(report(path, result));
    }

    finish(args, &reports)
}

fn report<T>(path: &Path, result: bildtext::Result<T>) -> ImageReport<T> {
    let file = path.display().to_string();
    match result {
        Ok(value) => ImageReport {
            file,
            result: Some(value),
            error: None,
        },
        Err(e) => ImageReport {
            file,
            result: None,
            error: Some(e.to_string()),
        },
    }
}

/// Print JSON output if requested, then the processed/failed summary.
fn finish<T: Serialize>(args: &Args, reports: &[ImageReport<T>]) -> Result<()> {
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(reports).context("Failed to serialize results")?
        );
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    eprintln!(
        "\nProcessed: {}, Failed: {}",
        reports.len() - failed,
        failed
    );

    if failed == reports.len() {
        anyhow::bail!("No image could be processed");
    }
    Ok(())
}

async fn run_speak(document: &Path, output: Option<&Path>) -> Result<()> {
    let config = BildtextConfig::load().context("Failed to load configuration")?;

    let output_path = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = document.file_stem().unwrap_or_default();
        document.with_file_name(format!("{}.mp3", stem.to_string_lossy()))
    });

    eprintln!("Reading: {}", document.display());
    let text = read_document(document)
        .with_context(|| format!("Failed to read {}", document.display()))?;

    let api_key = config.elevenlabs_api_key()?;
    let narrator = Narrator::new(
        Box::new(ElevenLabsBackend::new(api_key)),
        config.tts_options(),
        config.max_chunk_size,
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let narration = narrator
        .narrate(&text, |progress| {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.completed as u64);
        })
        .await;
    pb.finish_and_clear();
    let narration = narration.context("Narration failed")?;

    if narration.oversized_chunks > 0 {
        eprintln!(
            "Warning: {} chunk(s) exceed {} characters",
            narration.oversized_chunks, config.max_chunk_size
        );
    }

    std::fs::write(&output_path, &narration.audio)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    let size_mb = narration.audio.len() as f64 / (1024.0 * 1024.0);
    eprintln!(
        "Output: {} ({} chunks, {:.1} MB)",
        output_path.display(),
        narration.chunk_count,
        size_mb
    );

    Ok(())
}

fn run_chunk(args: &Args, document: &Path, max_size: Option<usize>) -> Result<()> {
    let config = BildtextConfig::load().context("Failed to load configuration")?;
    let max_size = max_size.unwrap_or(config.max_chunk_size);

    let text = read_document(document)
        .with_context(|| format!("Failed to read {}", document.display()))?;
    let chunks = chunk_document(&text, max_size)?;

    if args.json {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&texts)?);
    } else {
        for chunk in &chunks {
            let marker = if chunk.oversized { " (oversized)" } else { "" };
            println!(
                "--- Chunk {} ({} characters){} ---",
                chunk.index + 1,
                chunk.char_len,
                marker
            );
            println!("{}", chunk.text);
        }
    }

    eprintln!("Total chunks: {}", chunks.len());
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = BildtextConfig::load()?;
            println!("Configuration file: {:?}", BildtextConfig::config_path()?);
            println!();
            match &config.model_preset {
                Some(preset) => println!("model_preset = \"{}\"", preset),
                None => println!("model_preset = (llm.toml default)"),
            }
            println!("request_delay_secs = {}", config.request_delay_secs);
            match &config.book_context {
                Some(context) => println!("book_context = \"{}\"", context),
                None => println!("book_context = (default)"),
            }
            println!("max_chunk_size = {}", config.max_chunk_size);
            println!("voice_id = \"{}\"", config.voice_id);
            println!("tts_model = \"{}\"", config.tts_model);
            match config.stability {
                Some(value) => println!("stability = {}", value),
                None => println!("stability = (voice default)"),
            }
            match config.similarity_boost {
                Some(value) => println!("similarity_boost = {}", value),
                None => println!("similarity_boost = (voice default)"),
            }
            let key_source = if config.elevenlabs_api_key.is_some() {
                "(set)"
            } else {
                "(from environment)"
            };
            println!("elevenlabs_api_key = {}", key_source);
        }
        ConfigAction::SetChunkSize { value } => {
            if *value == 0 {
                anyhow::bail!("Chunk size must be at least 1");
            }
            let mut config = BildtextConfig::load()?;
            config.max_chunk_size = *value;
            config.save()?;
            println!("Maximum chunk size set to: {}", value);
        }
        ConfigAction::SetVoice { voice_id } => {
            let mut config = BildtextConfig::load()?;
            config.voice_id = voice_id.clone();
            config.save()?;
            println!("Voice set to: {}", voice_id);
        }
        ConfigAction::SetContext { context } => {
            let mut config = BildtextConfig::load()?;
            config.book_context = Some(context.clone());
            config.save()?;
            println!("Book context set to: {}", context);
        }
        ConfigAction::SetDelay { seconds } => {
            let mut config = BildtextConfig::load()?;
            config.request_delay_secs = *seconds;
            config.save()?;
            println!("Request delay set to: {}s", seconds);
        }
    }
    Ok(())
}
