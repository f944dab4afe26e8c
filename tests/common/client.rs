//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// A request body that passes validation.
    pub fn generation_body(duration: u32) -> Value {
        json!({
            "key": "C major",
            "instruments": ["piano", "upright bass"],
            "mood": "happy",
            "genre": "jazz",
            "tempo": 120,
            "duration": duration,
        })
    }

    // ========================================================================
    // Service Endpoints
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    pub async fn get_health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Theory Endpoints
    // ========================================================================

    pub async fn get_theory_node(&self, label: &str, name: &str) -> Response {
        self.client
            .get(format!(
                "{}/v1/theory/{}/{}",
                self.base_url,
                label,
                urlencode(name)
            ))
            .send()
            .await
            .expect("Theory lookup failed")
    }

    pub async fn get_genre_motifs(&self, genre: &str) -> Response {
        self.client
            .get(format!(
                "{}/v1/theory/genre/{}/motifs",
                self.base_url,
                urlencode(genre)
            ))
            .send()
            .await
            .expect("Motifs request failed")
    }

    pub async fn post_context(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/context/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Context request failed")
    }

    // ========================================================================
    // Generation Endpoints
    // ========================================================================

    pub async fn generate(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Generate request failed")
    }

    pub async fn generate_fallback(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/generate/fallback", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Fallback generate request failed")
    }

    pub async fn generate_raw(&self, body: &'static str) -> Response {
        self.client
            .post(format!("{}/v1/generate", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// Fetches a path returned by the server, such as an `audio_url`.
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Creations Endpoints
    // ========================================================================

    pub async fn list_creations(&self, limit: Option<usize>, offset: Option<usize>) -> Response {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }
        self.client
            .get(format!("{}/v1/creations", self.base_url))
            .query(&query)
            .send()
            .await
            .expect("List creations request failed")
    }

    pub async fn get_creation(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/creations/{}", self.base_url, id))
            .send()
            .await
            .expect("Get creation request failed")
    }

    pub async fn delete_creation(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/v1/creations/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete creation request failed")
    }
}

fn urlencode(segment: &str) -> String {
    segment.replace(' ', "%20")
}
