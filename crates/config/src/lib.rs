use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "mxfixture.toml",
    "config/mxfixture.toml",
    ".maestro/mxfixture.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureConfig {
    #[serde(default)]
    pub homeserver: HomeserverConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub shell: ShellConfig,
}

/// Where the homeserver under test lives and how to talk to it.
///
/// ```
/// use mxfixture_config::HomeserverConfig;
///
/// let homeserver = HomeserverConfig::default();
/// assert_eq!(homeserver.base_url, "http://localhost:8008");
/// assert_eq!(homeserver.api_prefix, "/_matrix/client/r0");
/// assert_eq!(homeserver.server_name, "localhost");
/// assert_eq!(homeserver.request_timeout_seconds, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeserverConfig {
    #[serde(default = "HomeserverConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "HomeserverConfig::default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "HomeserverConfig::default_server_name")]
    pub server_name: String,
    #[serde(default = "HomeserverConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl HomeserverConfig {
    fn default_base_url() -> String {
        "http://localhost:8008".to_string()
    }

    fn default_api_prefix() -> String {
        "/_matrix/client/r0".to_string()
    }

    fn default_server_name() -> String {
        "localhost".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for HomeserverConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_prefix: Self::default_api_prefix(),
            server_name: Self::default_server_name(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Shared password of the seeded test accounts. Not treated as a secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "CredentialsConfig::default_password")]
    pub password: String,
}

impl CredentialsConfig {
    fn default_password() -> String {
        "testpass123".to_string()
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            password: Self::default_password(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "ShellConfig::default_program")]
    pub program: String,
    #[serde(default = "ShellConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl ShellConfig {
    fn default_program() -> String {
        "/bin/bash".to_string()
    }

    const fn default_timeout() -> u64 {
        120
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

/// Load the fixture configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use mxfixture_config::load;
///
/// std::env::remove_var("MXFIXTURE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.homeserver.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<FixtureConfig> {
    let defaults = FixtureConfig::default();

    let request_timeout =
        i64::try_from(defaults.homeserver.request_timeout_seconds).unwrap_or(i64::MAX);
    let shell_timeout = i64::try_from(defaults.shell.timeout_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("homeserver.base_url", defaults.homeserver.base_url.clone())?
        .set_default("homeserver.api_prefix", defaults.homeserver.api_prefix.clone())?
        .set_default(
            "homeserver.server_name",
            defaults.homeserver.server_name.clone(),
        )?
        .set_default("homeserver.request_timeout_seconds", request_timeout)?
        .set_default("credentials.password", defaults.credentials.password.clone())?
        .set_default("shell.program", defaults.shell.program.clone())?
        .set_default("shell.timeout_seconds", shell_timeout)?;

    let environment_overrides = config::Environment::with_prefix("MXFIXTURE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("MXFIXTURE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via MXFIXTURE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<FixtureConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded fixture configuration");
    Ok(config)
}
