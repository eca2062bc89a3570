//! Server configuration from command-line flags and environment

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_PATH: &str = "./bookshelf_data";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Which store backend to open at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Books live only for the lifetime of the process
    Memory,
    /// Books are persisted to a JSON document under the data path
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "bookshelf-server")]
#[command(author, version, about = "REST API for a book catalogue", long_about = None)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "BOOKSHELF_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Store backend
    #[arg(long, env = "BOOKSHELF_STORE", value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// Directory holding the JSON store
    #[arg(long, env = "BOOKSHELF_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Request body limit for cover uploads, in bytes
    #[arg(long, env = "BOOKSHELF_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins: "*" or a comma-separated list
    #[arg(long, env = "BOOKSHELF_CORS_ORIGINS")]
    pub cors_origins: Option<String>,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            store: StoreKind::Json,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: None,
        }
    }
}
