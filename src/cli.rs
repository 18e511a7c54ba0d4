use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "kubediag",
    version,
    about = "Terminal client for browsing Kubernetes diagnostics served by a remote API."
)]
pub struct CliArgs {
    /// Base URL of the diagnostic API (for example: http://localhost:8080/api)
    #[arg(long, env = "KUBEDIAG_API_URL")]
    pub api_url: Option<String>,

    /// Start in a specific namespace instead of the default policy
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Append logs to this file; logs are discarded otherwise
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Config file to use instead of the discovered one
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
