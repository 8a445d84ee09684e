use crate::Config;
use crate::config::args::value_parser::human_bytes;
use crate::config::file::{ConfigFile, DEFAULT_CONFIG_FILE, EndpointSettings};
use crate::config::{CLITimeoutConfig, ClientConfig, TracingConfig, TransferConfig};
use crate::types::AccessKeys;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
#[cfg(feature = "version")]
use shadow_rs::shadow;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

mod tests;
mod value_parser;

const DEFAULT_SAMPLE: bool = false;
const DEFAULT_PROGRESS: bool = false;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_MULTIPART_CHUNKSIZE: &str = "8MiB";
const DEFAULT_MAX_KEYS: i32 = 1000;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;

#[cfg(feature = "version")]
shadow!(build);

#[derive(Parser, Clone, Debug)]
#[cfg_attr(feature = "version", command(version=format!("{} ({} {}), {}", build::PKG_VERSION, build::SHORT_COMMIT, build::BUILD_TARGET, build::RUST_VERSION)))]
pub struct CLIArgs {
    /// location of config file
    #[arg(long, env, default_value = DEFAULT_CONFIG_FILE, value_name = "FILE")]
    config: PathBuf,

    /// print sample config and exit
    #[arg(long, env, default_value_t = DEFAULT_SAMPLE)]
    sample: bool,

    /// show progress estimation, it requires to count objects before copying
    #[arg(long, env, default_value_t = DEFAULT_PROGRESS)]
    progress: bool,

    /// maximum number of concurrent copies. overrides options.concurrency of the config file
    #[arg(long, env, value_parser = clap::value_parser!(u16).range(1..), help_heading = "Performance")]
    concurrency: Option<u16>,

    /// chunk size for streaming uploads of unknown length, Allow suffixes: MB, MiB, GB, GiB.
    /// the larger the size, the larger the memory usage.
    #[arg(long, env, default_value = DEFAULT_MULTIPART_CHUNKSIZE, value_parser = human_bytes::check_human_bytes, help_heading = "Performance")]
    multipart_chunksize: String,

    /// maximum number of objects returned in a single list object request
    #[arg(long, env, default_value_t = DEFAULT_MAX_KEYS, value_parser = clap::value_parser!(i32).range(1..=32767), help_heading = "Performance")]
    max_keys: i32,

    /// trace verbosity(-q: warn, -qq: error, -v: debug, -vv: trace)
    #[clap(flatten)]
    verbosity: Verbosity<InfoLevel>,

    /// show trace as json format
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Tracing/Logging")]
    json_tracing: bool,

    /// enable aws sdk tracing
    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Tracing/Logging")]
    aws_sdk_tracing: bool,

    /// show span event tracing
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Tracing/Logging")]
    span_events_tracing: bool,

    /// disable ANSI terminal colors
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Tracing/Logging")]
    disable_color_tracing: bool,

    /// operation timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_timeout",
        help_heading = "Timeout Options"
    )]
    operation_timeout_milliseconds: Option<u64>,

    /// operation attempt timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_attempt_timeout",
        help_heading = "Timeout Options"
    )]
    operation_attempt_timeout_milliseconds: Option<u64>,

    /// connect timeout (milliseconds).
    /// The default has AWS SDK default timeout (Currently 3100 milliseconds).
    #[arg(
        long,
        env,
        value_name = "connect_timeout",
        help_heading = "Timeout Options"
    )]
    connect_timeout_milliseconds: Option<u64>,

    /// read timeout (milliseconds).
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "read_timeout",
        help_heading = "Timeout Options"
    )]
    read_timeout_milliseconds: Option<u64>,

    /// disable stalled stream protection
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "Advanced")]
    disable_stalled_stream_protection: bool,

    /// generate a auto completions script. Valid values: bash, fish, zsh, powershell, elvish.
    #[arg(long, env, value_name = "SHELL", value_parser = clap_complete::shells::Shell::from_str, help_heading = "Advanced")]
    auto_complete_shell: Option<clap_complete::shells::Shell>,
}

pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    crate::Config::try_from(config_args)
}

impl CLIArgs {
    fn is_config_file_required(&self) -> bool {
        !self.sample && self.auto_complete_shell.is_none()
    }

    fn build_client_config(
        &self,
        endpoint_settings: &EndpointSettings,
    ) -> Result<ClientConfig, String> {
        Ok(ClientConfig {
            endpoint: endpoint_settings.endpoint.clone(),
            endpoint_url: endpoint_settings
                .endpoint_url()
                .map_err(|e| e.to_string())?,
            access_keys: AccessKeys {
                access_key: endpoint_settings.access_key.clone(),
                secret_key: endpoint_settings.secret_key.clone(),
                session_token: endpoint_settings.session_token.clone(),
            },
            region: endpoint_settings.region(),
            force_path_style: endpoint_settings.force_path_style,
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
        })
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(value: CLIArgs) -> Result<Self, Self::Error> {
        let tracing_config = value.verbosity.log_level().map(|log_level| TracingConfig {
            tracing_level: log_level,
            json_tracing: value.json_tracing,
            aws_sdk_tracing: value.aws_sdk_tracing,
            span_events_tracing: value.span_events_tracing,
            disable_color_tracing: value.disable_color_tracing,
        });

        let transfer_config = TransferConfig {
            multipart_chunksize: human_bytes::parse_human_bytes(&value.multipart_chunksize)?,
        };

        let mut config = Config {
            source_client_config: None,
            destination_client_config: None,
            bucket: String::new(),
            prefix: String::new(),
            concurrency: value
                .concurrency
                .unwrap_or(crate::config::file::DEFAULT_CONCURRENCY),
            count_objects: value.progress,
            max_keys: value.max_keys,
            transfer_config,
            tracing_config,
            auto_complete_shell: value.auto_complete_shell,
            print_sample: value.sample,
        };

        if !value.is_config_file_required() {
            return Ok(config);
        }

        let config_file = ConfigFile::load(&value.config).map_err(|e| e.to_string())?;
        config_file.validate().map_err(|e| e.to_string())?;

        config.source_client_config = Some(value.build_client_config(&config_file.source)?);
        config.destination_client_config =
            Some(value.build_client_config(&config_file.destination)?);
        config.bucket = config_file.options.bucket.clone();
        config.prefix = config_file.options.directory.clone();
        config.concurrency = value
            .concurrency
            .unwrap_or(config_file.options.concurrency);

        Ok(config)
    }
}
