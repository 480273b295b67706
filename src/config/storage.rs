//! Persistent store configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Persistent store configuration (Supabase REST + storage)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Supabase project base URL
    pub supabase_url: String,

    /// Supabase service role key
    pub supabase_key: String,

    /// Storage bucket for uploaded card media
    #[serde(default = "default_bucket")]
    pub media_bucket: String,
}

impl StorageConfig {
    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.supabase_url.is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE_URL"));
        }
        if self.supabase_key.is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE_KEY"));
        }
        if !self.supabase_url.starts_with("http://") && !self.supabase_url.starts_with("https://") {
            return Err(ValidationError::InvalidSupabaseUrl);
        }
        Ok(())
    }
}

fn default_bucket() -> String {
    "card-media".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_missing_url() {
        let config = StorageConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url_scheme() {
        let config = StorageConfig {
            supabase_url: "ftp://example.supabase.co".to_string(),
            supabase_key: "service-key".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let config = StorageConfig {
            supabase_url: "https://example.supabase.co/".to_string(),
            supabase_key: "service-key".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "https://example.supabase.co");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_bucket() {
        assert_eq!(StorageConfig::default().media_bucket, "card-media");
    }
}
