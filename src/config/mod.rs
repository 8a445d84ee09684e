use crate::types::AccessKeys;

pub mod args;
pub mod file;

#[derive(Debug, Clone)]
pub struct Config {
    pub source_client_config: Option<ClientConfig>,
    pub destination_client_config: Option<ClientConfig>,
    pub bucket: String,
    pub prefix: String,
    pub concurrency: u16,
    pub count_objects: bool,
    pub max_keys: i32,
    pub transfer_config: TransferConfig,
    pub tracing_config: Option<TracingConfig>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
    pub print_sample: bool,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint as written in the configuration file, used for display only.
    pub endpoint: String,
    pub endpoint_url: String,
    pub access_keys: AccessKeys,
    pub region: String,
    pub force_path_style: bool,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TransferConfig {
    pub multipart_chunksize: u64,
}

impl TransferConfig {
    pub fn is_multipart_upload_required(&self, buffered_length: u64) -> bool {
        self.multipart_chunksize <= buffered_length
    }
}
