//! Command-line argument groups shared by both tools.

use clap::Args;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;
use vsr_vmware::types::{VsphereConfig, DEFAULT_API_RELEASE, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};

/// Where and as whom to connect.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Remote host to connect to
    #[arg(short = 's', long, env = "VSPHERE_HOST")]
    pub host: String,

    /// Port to connect on
    #[arg(short = 'o', long, env = "VSPHERE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// User name to use when connecting to host
    #[arg(short = 'u', long, env = "VSPHERE_USER")]
    pub user: String,

    /// Password to use when connecting to host (prompted if omitted)
    #[arg(short = 'p', long, env = "VSPHERE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, env = "VSPHERE_INSECURE")]
    pub insecure: bool,

    /// VI/JSON API release to address (path segment under /sdk/vim25)
    #[arg(long, env = "VSPHERE_API_RELEASE", default_value = DEFAULT_API_RELEASE)]
    pub api_release: String,

    /// Per-request timeout
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl ConnectionArgs {
    /// The password from the command line / environment, or read from the
    /// terminal without echo.
    pub fn resolve_password(&self) -> std::io::Result<SecretString> {
        match &self.password {
            Some(p) => Ok(SecretString::new(p.clone())),
            None => {
                let prompt = format!("Enter password for host {} and user {}: ", self.host, self.user);
                rpassword::prompt_password(prompt).map(SecretString::new)
            }
        }
    }

    pub fn to_config(&self, password: SecretString) -> VsphereConfig {
        VsphereConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.user.clone(),
            password,
            insecure: self.insecure,
            timeout_secs: self.timeout,
            api_release: self.api_release.clone(),
        }
    }
}

/// Diagnostics on stderr; the report itself goes to stdout.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Log requests and paging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl OutputArgs {
    /// Install the stderr subscriber. `RUST_LOG` wins unless `-v` is given.
    pub fn init_tracing(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
