mod options;

#[cfg(test)]
pub(crate) const TEST_CONFIG: &str = r#"{
    "source": {
        "endpoint": "s3.amazonaws.com",
        "ssl": true,
        "access_key": "AWSACCESSKEY",
        "secret_key": "AWSSECRETKEY"
    },
    "destination": {
        "endpoint": "localhost:9000",
        "ssl": false,
        "access_key": "MINIOACCESSKEY",
        "secret_key": "MINIOSECRETKEY",
        "region": "minio-region",
        "force_path_style": true
    },
    "options": {
        "bucket": "bucketname",
        "directory": "path/to/files",
        "concurrency": 6
    }
}"#;

#[cfg(test)]
pub(crate) fn write_config_file(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}
