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
        let tracing_config = config.tracing_config.as_ref().unwrap();

        assert_eq!(tracing_config.tracing_level, log::Level::Info);
        assert!(!tracing_config.json_tracing);
        assert!(!tracing_config.aws_sdk_tracing);
        assert!(!tracing_config.span_events_tracing);
        assert!(!tracing_config.disable_color_tracing);
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
            "-vv",
            "--json-tracing",
            "--aws-sdk-tracing",
            "--span-events-tracing",
            "--disable-color-tracing",
        ];

        let config = build_config_from_args(args).unwrap();
        let tracing_config = config.tracing_config.as_ref().unwrap();

        assert_eq!(tracing_config.tracing_level, log::Level::Trace);
        assert!(tracing_config.json_tracing);
        assert!(tracing_config.aws_sdk_tracing);
        assert!(tracing_config.span_events_tracing);
        assert!(tracing_config.disable_color_tracing);
    }

    #[test]
    fn with_quiet_option() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
            "-q",
        ];

        let config = build_config_from_args(args).unwrap();
        assert_eq!(
            config.tracing_config.as_ref().unwrap().tracing_level,
            log::Level::Warn
        );
    }

    #[test]
    fn with_silent_option() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
            "-qqq",
        ];

        let config = build_config_from_args(args).unwrap();
        assert!(config.tracing_config.is_none());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
