//! CLI for getfile.

use anyhow::Result;
use clap::Parser;
use getfile_core::config::{self, GetfileConfig};
use getfile_core::proxy::ProxyDescriptor;
use getfile_core::{FetchError, Session, SessionOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Fetch one URL over HTTP/1.1 and print the raw response with a step-by-step transcript.
#[derive(Debug, Parser)]
#[command(name = "getfile")]
#[command(about = "getfile: single HTTP GET with step-by-step diagnostics", long_about = None)]
pub struct Cli {
    /// URL to fetch (e.g. http://example.com/index.html). Prompted for on stdin when omitted.
    pub url: Option<String>,

    /// Ignore the proxy environment variable and connect directly.
    #[arg(long)]
    pub no_proxy: bool,

    /// Read configuration from this file instead of ~/.config/getfile/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses arguments and runs one fetch. Returns the process exit status.
    pub fn run_from_args() -> Result<i32> {
        Cli::parse().run()
    }

    fn load_config(&self) -> Result<GetfileConfig> {
        match &self.config {
            Some(path) => config::load_from(path),
            None => config::load_or_init(),
        }
    }

    fn proxy(&self, cfg: &GetfileConfig) -> ProxyDescriptor {
        if self.no_proxy {
            ProxyDescriptor::Disabled
        } else {
            ProxyDescriptor::from_env(&cfg.proxy_env_var)
        }
    }

    pub fn run(self) -> Result<i32> {
        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let proxy = self.proxy(&cfg);
        let session = Session::new(SessionOptions::from_config(&cfg, proxy));

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match session.run(self.url.as_deref(), &mut input, &mut out) {
            Ok(summary) => {
                tracing::info!(
                    "done: {} bytes from {}",
                    summary.bytes_received,
                    summary.target
                );
                Ok(0)
            }
            Err(err) => {
                tracing::error!("fetch failed: {:?}", err);
                Ok(report(&err, &mut out)?)
            }
        }
    }
}

/// Writes the `ERROR: <message> (code <n>)` line and returns the exit status.
pub fn report<W: Write>(err: &FetchError, out: &mut W) -> io::Result<i32> {
    writeln!(out, "ERROR: {} (code {})", err, err.code())?;
    out.flush()?;
    Ok(err.exit_code())
}
