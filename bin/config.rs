use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::{collections::BTreeMap, fmt, fs, io, path::Path, str::FromStr};

/// The reason why loading server configuration failed.
#[derive(Debug, Display, Error, From)]
pub enum ParseServerConfigError {
    #[display(fmt = "failed to read server configuration")]
    Io(io::Error),

    #[display(fmt = "failed to parse server configuration")]
    Ron(ron::de::SpannedError),
}

/// A game available as soon as the server starts.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SeedGame {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black: Option<String>,
}

/// Runtime configuration for the server.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// The address to listen on.
    pub address: SocketAddr,

    /// How many notifications may be queued for a single participant.
    pub capacity: usize,

    /// Maps authentication tokens to the identities they belong to.
    pub tokens: BTreeMap<String, String>,

    /// The games to create on startup.
    pub games: Vec<SeedGame>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            capacity: 32,
            tokens: BTreeMap::new(),
            games: Vec::new(),
        }
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

/// Parses inline RON or, if `s` names a file, the RON it contains.
impl FromStr for ServerConfig {
    type Err = ParseServerConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Path::new(s).is_file() {
            Ok(ron::de::from_str(&fs::read_to_string(s)?)?)
        } else {
            Ok(ron::de::from_str(s)?)
        }
    }
}
