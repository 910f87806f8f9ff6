//! cfkv CLI
//!
//! Opens a store directory and runs one raw operation against it.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use cfkv::codec::CF_DEFAULT;
use cfkv::server::{
    RawDeleteRequest, RawGetRequest, RawPutRequest, RawScanRequest, Server,
};
use cfkv::{Config, Context, StandaloneStorage, Storage};

/// cfkv CLI
#[derive(Parser, Debug)]
#[command(name = "cfkv")]
#[command(about = "Column-family key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./cfkv_data")]
    data_dir: String,

    /// Engine page cache size in MB
    #[arg(long)]
    cache_mb: Option<usize>,

    /// Skip fsync on commit
    #[arg(long)]
    no_sync: bool,

    /// Print responses as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// Column family
        #[arg(long, default_value = CF_DEFAULT)]
        cf: String,

        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// Column family
        #[arg(long, default_value = CF_DEFAULT)]
        cf: String,

        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// Column family
        #[arg(long, default_value = CF_DEFAULT)]
        cf: String,

        /// The key to delete
        key: String,
    },

    /// List pairs in key order starting at a key
    Scan {
        /// Column family
        #[arg(long, default_value = CF_DEFAULT)]
        cf: String,

        /// First key to return
        #[arg(short, long, default_value = "")]
        start: String,

        /// Maximum number of pairs
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,cfkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("cfkv v{}", cfkv::VERSION);
    tracing::debug!("Data directory: {}", args.data_dir);

    // Build config from args
    let mut builder = Config::builder()
        .data_dir(&args.data_dir)
        .sync_writes(!args.no_sync);
    if let Some(mb) = args.cache_mb {
        builder = builder.cache_size_mb(mb);
    }
    let config = builder.build();

    // Open storage
    let storage = match StandaloneStorage::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open storage: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = storage.start() {
        tracing::error!("Failed to start storage: {}", e);
        std::process::exit(1);
    }

    let server = Server::new(storage);
    let context = Context::new(u64::from(std::process::id()));

    let succeeded = match args.command {
        Commands::Get { cf, key } => {
            let resp = server.raw_get(RawGetRequest {
                context,
                cf,
                key: key.into_bytes(),
            });
            emit(&resp, args.json, &resp.error, || {
                if resp.not_found {
                    "(not found)".to_string()
                } else {
                    String::from_utf8_lossy(&resp.value).into_owned()
                }
            })
        }
        Commands::Put { cf, key, value } => {
            let resp = server.raw_put(RawPutRequest {
                context,
                cf,
                key: key.into_bytes(),
                value: value.into_bytes(),
            });
            emit(&resp, args.json, &resp.error, || "OK".to_string())
        }
        Commands::Delete { cf, key } => {
            let resp = server.raw_delete(RawDeleteRequest {
                context,
                cf,
                key: key.into_bytes(),
            });
            emit(&resp, args.json, &resp.error, || "OK".to_string())
        }
        Commands::Scan { cf, start, limit } => {
            let resp = server.raw_scan(RawScanRequest {
                context,
                cf,
                start_key: start.into_bytes(),
                limit,
            });
            emit(&resp, args.json, &resp.error, || {
                resp.kvs
                    .iter()
                    .map(|kv| {
                        format!(
                            "{} = {}",
                            String::from_utf8_lossy(&kv.key),
                            String::from_utf8_lossy(&kv.value)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    };

    if let Err(e) = server.storage().stop() {
        tracing::warn!("Failed to stop storage cleanly: {}", e);
    }

    if !succeeded {
        std::process::exit(1);
    }
}

/// Print a response; returns false if it carried an error
fn emit<T: Serialize>(resp: &T, json: bool, error: &str, text: impl FnOnce() -> String) -> bool {
    if json {
        match serde_json::to_string_pretty(resp) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                tracing::error!("Failed to encode response: {}", e);
                return false;
            }
        }
    } else if error.is_empty() {
        let out = text();
        if !out.is_empty() {
            println!("{}", out);
        }
    } else {
        eprintln!("error: {}", error);
    }

    error.is_empty()
}
