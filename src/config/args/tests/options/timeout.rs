#[cfg(test)]
mod tests {
    use crate::config::args::tests::{TEST_CONFIG, write_config_file};
    use crate::config::args::*;

    #[test]
    fn with_default_value() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
        ];

        let config = build_config_from_args(args).unwrap();
        let timeout_config = &config
            .destination_client_config
            .as_ref()
            .unwrap()
            .cli_timeout_config;

        assert!(timeout_config.operation_timeout_milliseconds.is_none());
        assert!(timeout_config.operation_attempt_timeout_milliseconds.is_none());
        assert!(timeout_config.connect_timeout_milliseconds.is_none());
        assert!(timeout_config.read_timeout_milliseconds.is_none());
        assert!(
            !config
                .destination_client_config
                .as_ref()
                .unwrap()
                .disable_stalled_stream_protection
        );
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
            "--operation-timeout-milliseconds",
            "1000",
            "--operation-attempt-timeout-milliseconds",
            "2000",
            "--connect-timeout-milliseconds",
            "3000",
            "--read-timeout-milliseconds",
            "4000",
            "--disable-stalled-stream-protection",
        ];

        let config = build_config_from_args(args).unwrap();
        for client_config in [
            config.source_client_config.as_ref().unwrap(),
            config.destination_client_config.as_ref().unwrap(),
        ] {
            let timeout_config = &client_config.cli_timeout_config;
            assert_eq!(timeout_config.operation_timeout_milliseconds, Some(1000));
            assert_eq!(
                timeout_config.operation_attempt_timeout_milliseconds,
                Some(2000)
            );
            assert_eq!(timeout_config.connect_timeout_milliseconds, Some(3000));
            assert_eq!(timeout_config.read_timeout_milliseconds, Some(4000));
            assert!(client_config.disable_stalled_stream_protection);
        }
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
