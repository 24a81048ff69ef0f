use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use std::{path::PathBuf, process::ExitCode};

use sftp_mirror::{
    client::{self, ConnectOptions},
    walk::WalkOptions,
    Error, Result, UploadOptions, UploadSummary, Uploader,
};

/// Upload a local directory tree to a remote directory over SFTP
#[derive(Parser)]
#[command(name = "sftp-mirror", version, about)]
struct Cli {
    /// Username
    #[arg(short = 'u', long = "user")]
    user: String,

    /// Password
    #[arg(short = 'p', long, env = "SFTP_MIRROR_PASSWORD", hide_env_values = true)]
    password: String,

    /// Server address (host:port)
    #[arg(short = 's', long)]
    server: String,

    /// Local directory
    #[arg(short = 'l', long = "local")]
    local: PathBuf,

    /// Remote directory
    #[arg(short = 'r', long = "remote")]
    remote: String,

    /// Enable debug mode
    #[arg(short = 'd', long, visible_alias = "verbose")]
    debug: bool,

    /// Visit entries sorted by name instead of in filesystem order
    #[arg(long)]
    sorted: bool,

    /// Follow symbolic links in the local tree
    #[arg(long)]
    follow_links: bool,

    /// Do not create the remote parent directory before each file
    #[arg(long)]
    skip_parent_create: bool,

    /// SFTP response timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the upload summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            user: self.user.clone(),
            password: self.password.clone(),
            server: self.server.clone(),
            timeout: self.timeout,
        }
    }

    const fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            verbose: self.debug,
            walk: WalkOptions {
                sort_by_name: self.sorted,
                follow_links: self.follow_links,
            },
            ensure_parent: !self.skip_parent_create,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "sftp_mirror=debug,warn"
    } else {
        "sftp_mirror=info,warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();
}

async fn run(cli: &Cli) -> Result<UploadSummary> {
    let connection = client::connect(&cli.connect_options()).await?;

    if cli.debug {
        info!("Connection successful, starting file upload...");
    }

    let result = Uploader::new(connection.sftp(), cli.upload_options())
        .upload(&cli.local, &cli.remote)
        .await;

    if let Err(err) = connection.close().await {
        warn!("closing connection: {err}");
    }

    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let summary = match run(&cli).await {
        Ok(summary) => summary,
        Err(err @ (Error::Connect(_) | Error::AuthRejected { .. } | Error::Session(_))) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            error!("Files could not be uploaded: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "All files uploaded successfully: {} directories, {} files, {} bytes",
        summary.directories, summary.files, summary.bytes
    );

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("serializing summary: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
