use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// PostgREST equality filter value, percent-encoded for use in a query string.
pub fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

/// PostgREST `or=(...)` expression matching any of the given `column = value` pairs.
///
/// Values are double-quoted so reserved characters such as `,` and `)` survive.
pub fn or_eq(pairs: &[(&str, &str)]) -> String {
    let terms: Vec<String> = pairs
        .iter()
        .map(|(column, value)| {
            let quoted = value.replace('\\', "\\\\").replace('"', "\\\"");
            format!("{}.eq.\"{}\"", column, quoted)
        })
        .collect();

    urlencoding::encode(&format!("({})", terms.join(","))).into_owned()
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    /// The anon key is sent both as `apikey` and as the bearer token.
    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.anon_key))?,
        );

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    async fn fetch<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let response = self.send(method, path, body, extra_headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// `GET /rest/v1/{table}?{query}` deserialized into rows.
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };

        self.fetch(Method::GET, &path, None, None).await
    }

    /// Insert rows and return the stored representation.
    pub async fn insert<T>(&self, table: &str, rows: Value) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.fetch(
            Method::POST,
            &format!("/rest/v1/{}", table),
            Some(rows),
            Some(headers),
        ).await
    }

    pub async fn update(&self, table: &str, filter: &str, changes: Value) -> Result<()> {
        self.send(
            Method::PATCH,
            &format!("/rest/v1/{}?{}", table, filter),
            Some(changes),
            None,
        ).await?;
        Ok(())
    }

    pub async fn delete(&self, table: &str, filter: &str) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("/rest/v1/{}?{}", table, filter),
            None,
            None,
        ).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{header, method, path, query_param};

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            supabase_url: url.to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            admin_password: String::new(),
            admin_session_secret: String::new(),
            admin_session_hours: 12,
            booking_function_url: String::new(),
            workflow_timeout_secs: 300,
            uipath_process_url: String::new(),
            uipath_access_token: String::new(),
            port: 3000,
        }
    }

    #[test]
    fn eq_encodes_reserved_characters() {
        assert_eq!(eq("a b&c"), "eq.a%20b%26c");
    }

    #[test]
    fn or_eq_quotes_each_value() {
        let expr = or_eq(&[("email", "jo@example.com"), ("contact", "555-123-4567")]);
        let decoded = urlencoding::decode(&expr).unwrap();
        assert_eq!(decoded, "(email.eq.\"jo@example.com\",contact.eq.\"555-123-4567\")");
    }

    #[tokio::test]
    async fn select_sends_api_key_and_parses_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/locations"))
            .and(query_param("order", "name"))
            .and(header("apikey", "test-anon-key"))
            .and(header("authorization", "Bearer test-anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "loc-1", "name": "Downtown" }
            ])))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let rows: Vec<Value> = client.select("locations", "order=name").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Downtown");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/appointment_slots"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let result = client
            .update("appointment_slots", "id=eq.slot-1", json!({ "status": "booked" }))
            .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("500"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn writes_authenticate_with_the_anon_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/providers"))
            .and(header("authorization", "Bearer test-anon-key"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                { "id": "prov-1", "name": "Dr. Chen" }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/providers"))
            .and(query_param("id", "eq.prov-1"))
            .and(header("authorization", "Bearer test-anon-key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let created: Vec<Value> = client
            .insert("providers", json!([{ "name": "Dr. Chen" }]))
            .await
            .unwrap();
        client.delete("providers", "id=eq.prov-1").await.unwrap();

        assert_eq!(created[0]["id"], "prov-1");
    }
}
