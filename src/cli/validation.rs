//! Value parsers for command-line arguments

use std::net::IpAddr;
use std::path::PathBuf;

const MAX_ROLLBACK_STEPS: u32 = 100;

const MAX_HOSTNAME_LENGTH: usize = 253;

pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!(
            "Port must be a number between 1 and 65535, got: '{}'",
            value
        )),
    }
}

/// Accepts an existing, readable regular file.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", value));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", value));
    }

    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{}': {}", value, e))
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("Rollback steps must be a positive number, got: '{}'", value))?;

    if !(1..=MAX_ROLLBACK_STEPS).contains(&steps) {
        return Err(format!(
            "Rollback steps must be between 1 and {}",
            MAX_ROLLBACK_STEPS
        ));
    }

    Ok(steps)
}

/// Accepts IP addresses and plausible hostnames.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    // Dotted digits that failed to parse are a malformed IPv4 address
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address: '{}'", value));
    }
    if host.len() > MAX_HOSTNAME_LENGTH {
        return Err(format!(
            "Host address is too long (maximum {} characters)",
            MAX_HOSTNAME_LENGTH
        ));
    }
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(format!("Invalid hostname: '{}'", value));
    }

    Ok(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_ports() {
        for port in ["1", "80", "5000", "65535"] {
            assert!(validate_port(port).is_ok(), "{} should be valid", port);
        }
        for port in ["0", "65536", "-1", "abc", ""] {
            assert!(validate_port(port).is_err(), "{} should be invalid", port);
        }
    }

    #[test]
    fn test_hosts() {
        for host in ["localhost", "127.0.0.1", "0.0.0.0", "::1", "planet-db.internal"] {
            assert!(validate_host_address(host).is_ok(), "{} should be valid", host);
        }
        let too_long = "x".repeat(300);
        for host in ["", "   ", "host with spaces", "999.999.999.999", too_long.as_str()] {
            assert!(validate_host_address(host).is_err(), "'{}' should be invalid", host);
        }
    }

    #[test]
    fn test_host_is_trimmed() {
        assert_eq!(validate_host_address(" localhost ").unwrap(), "localhost");
    }

    #[test]
    fn test_rollback_steps() {
        for steps in ["1", "50", "100"] {
            assert!(validate_rollback_steps(steps).is_ok(), "{} should be valid", steps);
        }
        for steps in ["0", "101", "-1", "abc", ""] {
            assert!(validate_rollback_steps(steps).is_err(), "'{}' should be invalid", steps);
        }
    }

    #[test]
    fn test_config_file_path() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(validate_config_file_path(path).unwrap(), file.path());

        let dir = file.path().parent().unwrap().to_str().unwrap();
        assert!(validate_config_file_path(dir).unwrap_err().contains("not a file"));
        assert!(
            validate_config_file_path("/definitely/missing/planet.toml")
                .unwrap_err()
                .contains("does not exist")
        );
    }
}
