use clap::Parser;
use std::net::IpAddr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(long, default_value_t = 12310)]
    pub port: u16,

    /// Directory containing the overlay item catalog (RGBA PNG files)
    #[arg(long, env = "WRIST_TRYON_CATALOG_ROOT")]
    pub catalog_root: String,

    /// Wrist landmark detector endpoint
    #[arg(long, env = "WRIST_TRYON_DETECTOR_URL")]
    pub detector_url: String,

    /// Bearer token for authenticated detector deployments
    #[arg(long, env = "WRIST_TRYON_DETECTOR_TOKEN")]
    pub detector_token: Option<String>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
