use clap::{Parser, Subcommand};
use gallery_push::imaging::RustBackend;
use gallery_push::publish::{PublishEvent, Workspace};
use gallery_push::runner::{self, Mode, RunOptions};
use gallery_push::transfer::FtpClient;
use gallery_push::{config, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gallery-push")]
#[command(about = "Resize local images and publish them to an FTP-hosted gallery")]
#[command(long_about = "\
Resize local images and publish them to an FTP-hosted gallery

Every .jpg, .jpeg, .png and .bmp file in the source directory is scaled to fit
the configured bound, written to the staging directory and uploaded to the
gallery folder on the server. The gallery is then listed and an HTML fragment
with one thumbnail per image is written next to the sources and uploaded.

Layout:

  ./
  ├── config.toml                  # Server credentials and paths (required)
  ├── a.jpg                        # Source images (not recursed into subdirs)
  ├── b.png
  ├── gallery_content.html         # Regenerated manifest
  └── imagesToUpload/              # Resized copies, created on demand

Run 'gallery-push gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory scanned for images
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Directory resized copies are written to
    #[arg(long, default_value = "imagesToUpload", global = true)]
    staging: PathBuf,

    /// Configuration file
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize, upload, then regenerate and upload the manifest
    Publish,
    /// Resize images into the staging directory without uploading
    Resize,
    /// Regenerate and upload the manifest from the remote gallery
    Manifest,
    /// Validate config and list images without touching anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(e.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mode = match cli.command {
        Command::Publish => Mode::Publish,
        Command::Resize => Mode::Resize,
        Command::Manifest => Mode::Manifest,
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let (config, images) = runner::check(&cli.config, &cli.source)?;
            output::print_check_output(&config, &images);
            println!("==> Config is valid");
            return Ok(());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
    };

    println!("Working Directory = {}", std::env::current_dir()?.display());

    let options = RunOptions {
        config_path: cli.config,
        workspace: Workspace {
            source_dir: cli.source,
            staging_dir: cli.staging,
        },
        mode,
    };
    let report = runner::run(
        &options,
        &RustBackend::new(),
        &FtpClient::new(),
        &mut |event: &PublishEvent| output::print_event(event),
    )?;
    output::print_report(&report);

    Ok(())
}
