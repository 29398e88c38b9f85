use url::Url;

use crate::utils::error::{MenuError, Result};
use crate::utils::text;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MenuError::Config {
                message: format!("{field_name}: unsupported URL scheme '{scheme}'"),
            }),
        },
        Err(e) => Err(MenuError::Config {
            message: format!("{field_name}: invalid URL '{url_str}': {e}"),
        }),
    }
}

pub fn validate_date(field_name: &str, date_str: &str) -> Result<()> {
    text::parse_date(date_str).map(|_| ()).map_err(|_| MenuError::Config {
        message: format!(
            "{field_name}: '{date_str}' does not match the required format {}",
            text::CLI_DATE_FORMAT
        ),
    })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(MenuError::Config {
            message: format!("{field_name}: path cannot be empty"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://example.com").is_ok());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
        assert!(validate_url("base_url", "not a url").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("date", "01.11.2021").is_ok());
        assert!(validate_date("date", "2021-11-01").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("jsonify", "./output").is_ok());
        assert!(validate_path("jsonify", "  ").is_err());
    }
}
