use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::error::ApiError;
use crate::api::models::{Contact, Message, NewMessage, StatusUpdate, Ticket};

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub http: HttpClient,
    base_api: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(),
            base_api: Self::base_api(base_url)?,
        })
    }

    /// Server root with `/api` appended unless it is already there.
    fn base_api(base_url: &str) -> Result<String, ApiError> {
        let parsed = Url::parse(base_url.trim())?;
        let trimmed = parsed.as_str().trim_end_matches('/');
        if trimmed.ends_with("/api") { Ok(trimmed.to_string()) } else { Ok(format!("{}/api", trimmed)) }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_api, path.trim_start_matches('/'))
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(resp.json::<T>().await?)
    }

    /// `GET /api/tickets`
    pub async fn tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        let resp = self.http.get(self.endpoint("tickets")).send().await?;
        Self::read(resp).await
    }

    /// `POST /api/messages`
    pub async fn send_message(&self, body: &NewMessage) -> Result<Message, ApiError> {
        let resp = self.http.post(self.endpoint("messages")).json(body).send().await?;
        Self::read(resp).await
    }

    /// `PATCH /api/tickets/{id}`
    pub async fn update_status(&self, ticket_id: &str, status: &str) -> Result<Ticket, ApiError> {
        let body = StatusUpdate { status: status.to_string() };
        let endpoint = self.endpoint(&format!("tickets/{}", ticket_id));
        let resp = self.http.patch(&endpoint).json(&body).send().await?;
        Self::read(resp).await
    }

    /// `PUT /api/contacts/{id}` with the full contact; returns the stored contact.
    pub async fn update_contact(&self, contact: &Contact) -> Result<Contact, ApiError> {
        let endpoint = self.endpoint(&format!("contacts/{}", contact.id));
        let resp = self.http.put(&endpoint).json(contact).send().await?;
        Self::read(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_api_segment_once() {
        let client = ApiClient::new("http://localhost:3000").unwrap();
        assert_eq!(client.endpoint("tickets"), "http://localhost:3000/api/tickets");

        let client = ApiClient::new("https://desk.example.com/api/").unwrap();
        assert_eq!(client.endpoint("/messages"), "https://desk.example.com/api/messages");

        let client = ApiClient::new("https://desk.example.com/support/").unwrap();
        assert_eq!(client.endpoint("tickets/7"), "https://desk.example.com/support/api/tickets/7");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::InvalidUrl(_))));
    }
}
