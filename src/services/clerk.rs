use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ClerkService {
    client: Client,
    api_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    pub primary_email_address_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClerkEmailAddress {
    pub id: String,
    pub email_address: String,
    pub verification: Option<ClerkVerification>,
}

#[derive(Debug, Deserialize)]
pub struct ClerkVerification {
    pub status: String,
}

impl ClerkEmailAddress {
    pub fn is_verified(&self) -> bool {
        self.verification
            .as_ref()
            .is_some_and(|v| v.status == "verified")
    }
}

impl ClerkService {
    pub fn new(api_url: &str, secret_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<ClerkUser> {
        let url = format!("{}/v1/users/{}", self.api_url, user_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Clerk API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Clerk API error {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse Clerk response: {}", e)))
    }

    /// The user's primary email address, only if it has been verified.
    pub fn primary_verified_email(user: &ClerkUser) -> Option<String> {
        let primary_id = user.primary_email_address_id.as_deref()?;
        user.email_addresses
            .iter()
            .find(|e| e.id == primary_id && e.is_verified())
            .map(|e| e.email_address.clone())
    }

    pub fn get_full_name(user: &ClerkUser) -> Option<String> {
        match (&user.first_name, &user.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn user(value: serde_json::Value) -> ClerkUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn primary_email_must_be_verified() {
        let verified = user(json!({
            "id": "user_1",
            "primary_email_address_id": "idn_2",
            "email_addresses": [
                { "id": "idn_1", "email_address": "old@shop.co", "verification": { "status": "verified" } },
                { "id": "idn_2", "email_address": "owner@shop.co", "verification": { "status": "verified" } }
            ]
        }));
        assert_eq!(
            ClerkService::primary_verified_email(&verified).as_deref(),
            Some("owner@shop.co")
        );

        let unverified = user(json!({
            "id": "user_2",
            "primary_email_address_id": "idn_1",
            "email_addresses": [
                { "id": "idn_1", "email_address": "owner@shop.co", "verification": { "status": "unverified" } }
            ]
        }));
        assert_eq!(ClerkService::primary_verified_email(&unverified), None);

        let no_primary = user(json!({ "id": "user_3", "email_addresses": [] }));
        assert_eq!(ClerkService::primary_verified_email(&no_primary), None);
    }

    #[test]
    fn full_name_joins_parts() {
        let u = user(json!({ "id": "u", "first_name": "Abiha", "last_name": null }));
        assert_eq!(ClerkService::get_full_name(&u).as_deref(), Some("Abiha"));
    }

    #[tokio::test]
    async fn get_user_uses_secret_key() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/users/user_1")
                .header("authorization", "Bearer sk_test");
            then.status(200).json_body(json!({
                "id": "user_1",
                "primary_email_address_id": null,
                "email_addresses": []
            }));
        });

        let clerk = ClerkService::new(&server.base_url(), "sk_test");
        let fetched = clerk.get_user("user_1").await.unwrap();

        mock.assert();
        assert_eq!(fetched.id, "user_1");
    }

    #[tokio::test]
    async fn get_user_surfaces_api_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/users/user_404");
            then.status(404).body("not found");
        });

        let clerk = ClerkService::new(&server.base_url(), "sk_test");
        let err = clerk.get_user("user_404").await.unwrap_err();

        assert!(matches!(err, AppError::ExternalService(_)));
    }
}
