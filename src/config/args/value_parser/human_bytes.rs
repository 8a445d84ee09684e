use byte_unit::Byte;
use std::str::FromStr;

const UNDER_MIN_VALUE: &str = "must be greater than or equal to 5MiB";
const OVER_MAX_VALUE: &str = "must be smaller than or equal to 5GiB";

// S3 multipart part size limits
const MIN_VALUE: u128 = 5 * 1024 * 1024;
const MAX_VALUE: u128 = 5 * 1024 * 1024 * 1024;

pub fn check_human_bytes(value: &str) -> Result<String, String> {
    to_bytes(value)?;
    Ok(value.to_string())
}

pub fn parse_human_bytes(value: &str) -> Result<u64, String> {
    to_bytes(value)
}

fn to_bytes(value: &str) -> Result<u64, String> {
    let result = Byte::from_str(value).map_err(|e| e.to_string())?.as_u128();

    if result < MIN_VALUE {
        return Err(UNDER_MIN_VALUE.to_string());
    }
    if result > MAX_VALUE {
        return Err(OVER_MAX_VALUE.to_string());
    }

    u64::try_from(result).map_err(|e| e.to_string())
}
