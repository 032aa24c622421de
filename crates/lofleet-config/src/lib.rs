pub mod error;

pub use error::*;

use lofleet_cloud::{DuplicateNamePolicy, LaunchSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing directly at the credentials file
pub const CONFIG_PATH_ENV: &str = "LOFLEET_CONFIG_PATH";

pub const DEFAULT_AVAILABILITY_ZONE: &str = "us-east-1b";
pub const DEFAULT_DOMAIN: &str = "learning-observer.org";

const CANDIDATES: [&str; 2] = ["creds.local.yaml", "creds.yaml"];

/// Contents of `creds.yaml`
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub aws_keyname: String,
    pub aws_subnet_id: String,
    pub aws_security_group: String,
    pub owner: String,

    #[serde(default = "default_availability_zone")]
    pub availability_zone: String,

    /// Overrides the region from the AWS environment
    #[serde(default)]
    pub region: Option<String>,

    /// Zone that holds the `<name>.<domain>` records
    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_dns_poll_interval_secs")]
    pub dns_poll_interval_secs: u64,

    #[serde(default = "default_instance_poll_interval_secs")]
    pub instance_poll_interval_secs: u64,

    #[serde(default = "default_termination_grace_secs")]
    pub termination_grace_secs: u64,

    #[serde(default)]
    pub duplicate_policy: DuplicateNamePolicy,
}

fn default_availability_zone() -> String {
    DEFAULT_AVAILABILITY_ZONE.to_string()
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_dns_poll_interval_secs() -> u64 {
    1
}

fn default_instance_poll_interval_secs() -> u64 {
    15
}

fn default_termination_grace_secs() -> u64 {
    10
}

impl Settings {
    /// Parse and validate a YAML credentials file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`, or from the first file [`find_creds_file`] finds
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(&find_creds_file()?),
        }
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("aws_keyname", &self.aws_keyname),
            ("aws_subnet_id", &self.aws_subnet_id),
            ("aws_security_group", &self.aws_security_group),
            ("owner", &self.owner),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingSetting(key));
            }
        }

        let intervals = [
            ("dns_poll_interval_secs", self.dns_poll_interval_secs),
            ("instance_poll_interval_secs", self.instance_poll_interval_secs),
        ];
        for (key, secs) in intervals {
            if secs == 0 {
                return Err(ConfigError::ZeroInterval(key));
            }
        }
        Ok(())
    }

    pub fn launch_settings(&self) -> LaunchSettings {
        LaunchSettings {
            key_name: self.aws_keyname.clone(),
            subnet_id: self.aws_subnet_id.clone(),
            security_group_id: self.aws_security_group.clone(),
            owner: self.owner.clone(),
            availability_zone: self.availability_zone.clone(),
        }
    }

    pub fn dns_poll_interval(&self) -> Duration {
        Duration::from_secs(self.dns_poll_interval_secs)
    }

    pub fn instance_poll_interval(&self) -> Duration {
        Duration::from_secs(self.instance_poll_interval_secs)
    }

    pub fn termination_grace(&self) -> Duration {
        Duration::from_secs(self.termination_grace_secs)
    }
}

/// Locate the credentials file
///
/// Search order:
/// 1. `LOFLEET_CONFIG_PATH`
/// 2. current directory: creds.local.yaml, creds.yaml
/// 3. `./.lofleet/`, same names
/// 4. `~/.config/lofleet/creds.yaml`
pub fn find_creds_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for dir in [current_dir.clone(), current_dir.join(".lofleet")] {
        for filename in &CANDIDATES {
            let path = dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("lofleet").join("creds.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::CredsFileNotFound)
}
