use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::config::Credentials;
use std::time::Duration;

use crate::config::ClientConfig;
use aws_smithy_runtime_api::client::stalled_stream_protection::StalledStreamProtectionConfig;
use aws_smithy_types::timeout::TimeoutConfig;
use aws_types::SdkConfig;
use aws_types::region::Region;

const CREDENTIALS_PROVIDER_NAME: &str = "s3migrate-config-file";

impl ClientConfig {
    pub async fn create_client(&self) -> Client {
        let mut config_builder = Builder::from(&self.load_sdk_config().await)
            .force_path_style(self.force_path_style);

        if let Some(timeout_config) = self.build_timeout_config() {
            config_builder = config_builder.timeout_config(timeout_config);
        }

        Client::from_conf(config_builder.build())
    }

    async fn load_sdk_config(&self) -> SdkConfig {
        let stalled_stream_protection = if self.disable_stalled_stream_protection {
            StalledStreamProtectionConfig::disabled()
        } else {
            StalledStreamProtectionConfig::enabled().build()
        };

        aws_config::defaults(BehaviorVersion::latest())
            .stalled_stream_protection(stalled_stream_protection)
            .credentials_provider(self.build_credentials())
            .region(Region::new(self.region.clone()))
            .endpoint_url(&self.endpoint_url)
            .load()
            .await
    }

    fn build_credentials(&self) -> Credentials {
        Credentials::new(
            self.access_keys.access_key.to_string(),
            self.access_keys.secret_key.to_string(),
            self.access_keys.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        )
    }

    fn build_timeout_config(&self) -> Option<TimeoutConfig> {
        // Setting each timeout to None does not restore the SDK default timeouts.
        let timeout_config = &self.cli_timeout_config;
        let operation_timeout = timeout_config
            .operation_timeout_milliseconds
            .map(Duration::from_millis);
        let operation_attempt_timeout = timeout_config
            .operation_attempt_timeout_milliseconds
            .map(Duration::from_millis);
        let connect_timeout = timeout_config
            .connect_timeout_milliseconds
            .map(Duration::from_millis);
        let read_timeout = timeout_config
            .read_timeout_milliseconds
            .map(Duration::from_millis);

        if operation_timeout.is_none()
            && operation_attempt_timeout.is_none()
            && connect_timeout.is_none()
            && read_timeout.is_none()
        {
            return None;
        }

        let mut builder = TimeoutConfig::builder();
        if let Some(operation_timeout) = operation_timeout {
            builder = builder.operation_timeout(operation_timeout);
        }
        if let Some(operation_attempt_timeout) = operation_attempt_timeout {
            builder = builder.operation_attempt_timeout(operation_attempt_timeout);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(read_timeout) = read_timeout {
            builder = builder.read_timeout(read_timeout);
        }

        Some(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CLITimeoutConfig;
    use crate::types::AccessKeys;
    use tracing_subscriber::EnvFilter;

    #[tokio::test]
    async fn create_client_from_config() {
        init_dummy_tracing_subscriber();

        let client_config = build_client_config(CLITimeoutConfig::default());
        let client = client_config.create_client().await;

        let timeout_config = client.config().timeout_config().unwrap();
        assert!(timeout_config.operation_timeout().is_none());
        assert!(timeout_config.operation_attempt_timeout().is_none());
        assert!(timeout_config.read_timeout().is_none());

        // AWS SDK have default connect timeout
        assert_eq!(
            timeout_config.connect_timeout(),
            Some(Duration::from_millis(3100))
        );

        assert_eq!(
            client.config().region().unwrap().to_string(),
            "my-region".to_string()
        );
    }

    #[tokio::test]
    async fn create_client_with_timeouts() {
        init_dummy_tracing_subscriber();

        let client_config = build_client_config(CLITimeoutConfig {
            operation_timeout_milliseconds: Some(1000),
            operation_attempt_timeout_milliseconds: Some(2000),
            connect_timeout_milliseconds: Some(3000),
            read_timeout_milliseconds: Some(4000),
        });
        let client = client_config.create_client().await;

        let timeout_config = client.config().timeout_config().unwrap();
        assert_eq!(
            timeout_config.operation_timeout(),
            Some(Duration::from_millis(1000))
        );
        assert_eq!(
            timeout_config.operation_attempt_timeout(),
            Some(Duration::from_millis(2000))
        );
        assert_eq!(
            timeout_config.connect_timeout(),
            Some(Duration::from_millis(3000))
        );
        assert_eq!(
            timeout_config.read_timeout(),
            Some(Duration::from_millis(4000))
        );
    }

    #[test]
    fn credentials_come_from_config() {
        init_dummy_tracing_subscriber();

        let client_config = build_client_config(CLITimeoutConfig::default());
        let credentials = client_config.build_credentials();

        assert_eq!(credentials.access_key_id(), "my_access_key");
        assert_eq!(credentials.secret_access_key(), "my_secret_key");
        assert_eq!(credentials.session_token(), Some("my_session_token"));
    }

    #[test]
    fn no_timeout_config_by_default() {
        init_dummy_tracing_subscriber();

        let client_config = build_client_config(CLITimeoutConfig::default());
        assert!(client_config.build_timeout_config().is_none());
    }

    fn build_client_config(cli_timeout_config: CLITimeoutConfig) -> ClientConfig {
        ClientConfig {
            endpoint: "my.endpoint.local".to_string(),
            endpoint_url: "https://my.endpoint.local".to_string(),
            access_keys: AccessKeys {
                access_key: "my_access_key".to_string(),
                secret_key: "my_secret_key".to_string(),
                session_token: Some("my_session_token".to_string()),
            },
            region: "my-region".to_string(),
            force_path_style: false,
            cli_timeout_config,
            disable_stalled_stream_protection: false,
        }
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .or_else(|_| EnvFilter::try_new("dummy=trace"))
                    .unwrap(),
            )
            .try_init();
    }
}
