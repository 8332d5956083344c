//! Start-up configuration.
//!
//! Every setting is a flag with an environment fallback; `main` loads `.env`
//! into the environment before parsing. [`RelayConfig::from_args`] is the one
//! place raw settings are checked and turned into typed configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use jira::{ApiDefinition, JiraConfig, JiraError, ProjectCatalog};
use relay::creation::DEFAULT_ISSUE_TYPE;
use relay::{ProjectKey, ProjectSource, SyncSettings, DEFAULT_SYNC_LABEL};
use thiserror::Error;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Relays GitHub issue webhooks into Jira tickets.
#[derive(Parser)]
#[command(name = "issue-relay", version, about)]
pub struct Args {
    /// Address the webhook server binds to.
    #[arg(long, env = "RELAY_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Key of the Jira project tickets are created in.
    #[arg(long, env = "RELAY_PROJECT_KEY")]
    pub project_key: String,

    /// Label whose addition opens a ticket.
    #[arg(long, env = "RELAY_SYNC_LABEL", default_value = DEFAULT_SYNC_LABEL)]
    pub sync_label: String,

    /// Issue type used when the issue body names none.
    #[arg(long, env = "RELAY_DEFAULT_ISSUE_TYPE", default_value = DEFAULT_ISSUE_TYPE)]
    pub default_issue_type: String,

    /// Jira site root. Overrides the base URL of the API definition file.
    #[arg(long, env = "JIRA_BASE_URL")]
    pub jira_base_url: Option<String>,

    /// JSON file replacing the built-in Jira endpoint catalog.
    #[arg(long, env = "JIRA_API_DEFINITION")]
    pub api_definition: Option<PathBuf>,

    /// JSON project catalog; when set the target project is read from it.
    #[arg(long, env = "RELAY_PROJECT_CATALOG")]
    pub project_catalog: Option<PathBuf>,

    /// Jira account e-mail.
    #[arg(long, env = "JIRA_API_USER", hide_env_values = true)]
    pub jira_user: String,

    /// Jira API token.
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub jira_token: String,

    /// Per-request timeout for Jira calls, in seconds.
    #[arg(long, env = "RELAY_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log output format.
    #[arg(long, env = "RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

/// Invalid start-up configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--project-key` is blank.
    #[error("project key is empty")]
    MissingProjectKey,

    /// Neither a base URL flag nor a definition file supplies the Jira site.
    #[error("Jira base URL is not set; pass --jira-base-url or an API definition file")]
    MissingBaseUrl,

    /// `--request-timeout-secs` is zero.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,

    /// The API definition or project catalog is invalid.
    #[error(transparent)]
    Jira(#[from] JiraError),
}

/// Validated configuration, assembled once at start-up.
#[derive(Debug)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    pub project_key: ProjectKey,
    pub project_catalog: Option<PathBuf>,
    pub sync_label: String,
    pub default_issue_type: String,
    pub jira: JiraConfig,
    pub log_format: LogFormat,
}

impl RelayConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let project_key =
            ProjectKey::new(args.project_key.trim()).ok_or(ConfigError::MissingProjectKey)?;
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut jira = match &args.api_definition {
            Some(path) => {
                let definition = ApiDefinition::from_file(path)?;
                JiraConfig::from_definition(definition, args.jira_user, args.jira_token)?
            }
            None => {
                let base_url = args.jira_base_url.clone().ok_or(ConfigError::MissingBaseUrl)?;
                JiraConfig::new(base_url, args.jira_user, args.jira_token)
            }
        };
        if let (Some(_), Some(url)) = (&args.api_definition, &args.jira_base_url) {
            jira.base_url = url.trim_end_matches('/').to_string();
        }
        let jira = jira.with_timeout(Duration::from_secs(args.request_timeout_secs));
        jira.validate()?;

        Ok(Self {
            bind: args.bind,
            project_key,
            project_catalog: args.project_catalog,
            sync_label: args.sync_label,
            default_issue_type: args.default_issue_type,
            jira,
            log_format: args.log_format,
        })
    }

    /// Resolves the target project and builds the engine settings.
    ///
    /// With a project catalog the project is read once here; otherwise it is
    /// fetched from Jira for every event.
    pub fn sync_settings(&self) -> Result<SyncSettings, ConfigError> {
        let project = match &self.project_catalog {
            Some(path) => {
                let catalog = ProjectCatalog::from_file(path)?;
                ProjectSource::Fixed(catalog.project(&self.project_key)?)
            }
            None => ProjectSource::Remote(self.project_key.clone()),
        };
        Ok(SyncSettings::new(project)
            .with_sync_label(self.sync_label.clone())
            .with_default_issue_type(self.default_issue_type.clone()))
    }
}
