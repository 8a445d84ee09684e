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
        assert_eq!(config.transfer_config.multipart_chunksize, 8 * 1024 * 1024);
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
            "--multipart-chunksize",
            "16MiB",
        ];

        let config = build_config_from_args(args).unwrap();
        assert_eq!(
            config.transfer_config.multipart_chunksize,
            16 * 1024 * 1024
        );
    }

    #[test]
    fn with_too_small_value() {
        init_dummy_tracing_subscriber();

        let config_file = write_config_file(TEST_CONFIG);
        let args = vec![
            "s3migrate",
            "--config",
            config_file.path().to_str().unwrap(),
            "--multipart-chunksize",
            "1MiB",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
