use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use parcel_id::{PublicIdCodec, DEFAULT_MIN_LENGTH};

use crate::db::DbConfig;

/// Which parcel store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => bail!("unknown store '{other}', expected 'postgres' or 'memory'"),
        }
    }
}

/// Public id codec settings.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    pub salt: String,
    pub min_length: usize,
}

impl CodecConfig {
    /// Build the codec.
    pub fn build(&self) -> Result<PublicIdCodec> {
        PublicIdCodec::builder()
            .salt(self.salt.clone())
            .min_length(self.min_length)
            .build()
            .context("invalid public id codec settings")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub dev_mode: bool,
    pub store: StoreKind,
    pub static_dir: Option<PathBuf>,
    pub codec: CodecConfig,
    pub database: DbConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("PARCEL_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .context("PARCEL_LISTEN_ADDR is not a socket address")?;

        let log_level = std::env::var("PARCEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dev_mode = std::env::var("PARCEL_DEV")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let store = match std::env::var("PARCEL_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => StoreKind::default(),
        };

        let static_dir = std::env::var("PARCEL_STATIC_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let salt = std::env::var("HASHIDS_SALT").context("HASHIDS_SALT must be set")?;

        let min_length = match std::env::var("HASHIDS_MIN_LENGTH") {
            Ok(value) => value
                .parse()
                .context("HASHIDS_MIN_LENGTH is not a number")?,
            Err(_) => DEFAULT_MIN_LENGTH,
        };

        let database = DbConfig::from_env();

        Ok(Self {
            listen_addr,
            log_level,
            dev_mode,
            store,
            static_dir,
            codec: CodecConfig { salt, min_length },
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("postgres", StoreKind::Postgres)]
    #[case("PG", StoreKind::Postgres)]
    #[case("memory", StoreKind::Memory)]
    #[case("Mem", StoreKind::Memory)]
    fn test_store_kind_parse(#[case] input: &str, #[case] expected: StoreKind) {
        assert_eq!(input.parse::<StoreKind>().unwrap(), expected);
    }

    #[test]
    fn test_store_kind_unknown() {
        assert!("mysql".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_codec_config_builds() {
        let codec = CodecConfig {
            salt: "salt".to_string(),
            min_length: 8,
        }
        .build()
        .unwrap();
        assert_eq!(codec.min_length(), 8);
        assert!(codec.encode(1).len() >= 8);
    }
}
