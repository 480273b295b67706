//! Shared Supabase HTTP client.
//!
//! All Supabase adapters go through one `reqwest` client carrying the
//! project URL and the service role key. PostgREST wants the key both as
//! `apikey` and as a bearer token.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    service_key: SecretString,
    http: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            service_key: SecretString::new(service_key.into()),
            http: reqwest::Client::new(),
        }
    }

    /// PostgREST endpoint for a table.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Storage upload endpoint for an object path.
    pub fn storage_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    /// Public download URL for a stored object.
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.delete(url))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        builder
            .header("apikey", key)
            .bearer_auth(key)
    }
}
