use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use fm_core::config::{ChannelTable, ClientConfig};
use fm_core::dispatch::Dispatcher;
use fm_core::files::FileManager;
use fm_core::protocol::Request;
use fm_core::report;

#[derive(Parser, Debug)]
#[command(name = "fmctl")]
#[command(about = "File manager client for the procfs control-channel module")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, env = "FMCTL_CONFIG_PATH", global = true)]
    config_path: Option<String>,

    /// Directory holding the control entries (overrides every configured channel)
    #[arg(long, env = "FMCTL_PROC_ROOT", global = true)]
    proc_root: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "FMCTL_LOG_LEVEL", global = true)]
    log_level: String,

    /// Print snapshots as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Show sizes in KB/MB/GB instead of bytes
    #[arg(long, global = true)]
    human: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Request the creation of a folder
    CreateFolder { path: String },
    /// List the entries of a directory
    List { path: String },
    /// Show a directory's details and total size
    DirInfo { path: String },
    /// Request renaming a folder
    RenameFolder { path: String, new_name: String },
    /// Request the deletion of a folder
    DeleteFolder { path: String },
    /// Request the creation of a file with initial content
    CreateFile {
        path: String,
        #[arg(default_value = "")]
        content: String,
    },
    /// Show a file's details
    FileInfo { path: String },
    /// Request renaming a file
    RenameFile { path: String, new_name: String },
    /// Request appending to (or overwriting) a file
    UpdateFile {
        path: String,
        data: String,
        /// Replace the file contents instead of appending
        #[arg(long)]
        overwrite: bool,
    },
    /// Request the deletion of a file
    DeleteFile { path: String },
    /// Print a file's content
    Read { path: String },
    /// Show which control channels are present
    Channels,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("fmctl v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let fm = create_file_manager(config.channels)?;
    let human = cli.human || config.human_sizes;

    run_command(&fm, cli.command, cli.json, human)
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let config_path = cli
        .config_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);

    let mut config = if config_path.exists() {
        info!("loading config from {}", config_path.display());
        ClientConfig::load(&config_path)?
    } else {
        debug!("no config at {}, using defaults", config_path.display());
        ClientConfig::default()
    };

    // CLI args override config file
    if let Some(root) = &cli.proc_root {
        config.channels = ChannelTable::under(root);
    }

    config.channels.validate()?;
    Ok(config)
}

/// Mutations print what was requested, never what was done: delivery to the
/// receiver is the only thing the channel confirms.
fn run_command(fm: &FileManager, command: Commands, json: bool, human: bool) -> Result<()> {
    match command {
        Commands::CreateFolder { path } => {
            submit(fm, Request::CreateFolder { path: path.clone() })?;
            println!("Requested the creation of folder: {}", path);
        }
        Commands::RenameFolder { path, new_name } => {
            submit(
                fm,
                Request::RenameFolder {
                    old_path: path.clone(),
                    new_name: new_name.clone(),
                },
            )?;
            println!(
                "Requested the renaming of folder from '{}' to '{}'",
                path, new_name
            );
        }
        Commands::DeleteFolder { path } => {
            submit(fm, Request::DeleteFolder { path: path.clone() })?;
            println!("Requested deletion of folder: {}", path);
        }
        Commands::CreateFile { path, content } => {
            submit(
                fm,
                Request::CreateFile {
                    path: path.clone(),
                    content,
                },
            )?;
            println!("Requested the creation of file: {}", path);
        }
        Commands::RenameFile { path, new_name } => {
            submit(
                fm,
                Request::RenameFile {
                    old_path: path.clone(),
                    new_name: new_name.clone(),
                },
            )?;
            println!(
                "Requested the renaming of file from '{}' to '{}'",
                path, new_name
            );
        }
        Commands::UpdateFile {
            path,
            data,
            overwrite,
        } => {
            submit(
                fm,
                Request::UpdateFile {
                    path: path.clone(),
                    data,
                    overwrite,
                },
            )?;
            let mode = if overwrite { "overwrite" } else { "append" };
            println!("Requested {} of file: {}", mode, path);
        }
        Commands::DeleteFile { path } => {
            submit(fm, Request::DeleteFile { path: path.clone() })?;
            println!("Requested deletion of file: {}", path);
        }
        Commands::List { path } => {
            let entries = fm.list(&path)?;
            if json {
                print_json(&entries)?;
            } else {
                print!("{}", report::listing(&entries));
            }
        }
        Commands::DirInfo { path } => {
            let info = fm.directory_info(&path)?;
            if json {
                print_json(&info)?;
            } else {
                print!("{}", report::directory_report(&info, human));
            }
        }
        Commands::FileInfo { path } => {
            let info = fm.file_info(&path)?;
            if json {
                print_json(&info)?;
            } else {
                print!("{}", report::file_report(&info, human));
            }
        }
        Commands::Read { path } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for (i, line) in fm.read_content(&path)?.enumerate() {
                let line = line?;
                if i > 0 {
                    out.write_all(b"\n").context("failed to write to stdout")?;
                }
                out.write_all(&line).context("failed to write to stdout")?;
            }
            out.flush().context("failed to write to stdout")?;
        }
        Commands::Channels => {
            let status = fm.dispatcher().probe();
            if json {
                print_json(&status)?;
            } else {
                for s in &status {
                    let state = if s.present { "present" } else { "missing" };
                    println!("{:<14} {:<8} {}", s.kind, state, s.address.display());
                }
            }
        }
    }
    Ok(())
}

/// Reject ambiguous payloads before they reach the receiver, then dispatch
fn submit(fm: &FileManager, request: Request) -> Result<()> {
    request.check_delimiters()?;
    fm.submit(request)?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}

fn create_file_manager(channels: ChannelTable) -> Result<FileManager> {
    let dispatcher = Dispatcher::new(channels, create_platform_channel()?);
    Ok(FileManager::new(dispatcher, create_platform_inspector()?))
}

#[cfg(target_os = "linux")]
fn create_platform_channel() -> Result<Box<dyn fm_platform::channel::ControlChannel>> {
    Ok(Box::new(fm_linux::procfs::ProcChannel::new()))
}

#[cfg(not(target_os = "linux"))]
fn create_platform_channel() -> Result<Box<dyn fm_platform::channel::ControlChannel>> {
    anyhow::bail!("control channels are only available on Linux")
}

#[cfg(target_os = "linux")]
fn create_platform_inspector() -> Result<Box<dyn fm_platform::filesystem::Inspector>> {
    Ok(Box::new(fm_linux::filesystem::LinuxInspector::new()))
}

#[cfg(not(target_os = "linux"))]
fn create_platform_inspector() -> Result<Box<dyn fm_platform::filesystem::Inspector>> {
    anyhow::bail!("filesystem inspection not supported on this platform")
}
