//! Contact CRUD over the shared HTTP pipeline.
//!
//! Authentication rides on the bearer interceptor; this module never touches
//! the token. Failures are logged and handed back unchanged.

#[cfg(test)]
#[path = "contacts_test.rs"]
mod contacts_test;

use std::sync::Arc;

use tracing::error;

use super::api::ApiClient;
use super::types::{Contact, ContactInput};
use crate::error::ClientError;

const BASE_PATH: &str = "/contacts";

fn contact_path(contact_id: i64) -> String {
    format!("{BASE_PATH}/{contact_id}")
}

#[derive(Clone)]
pub struct ContactService {
    api: Arc<ApiClient>,
}

impl ContactService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// All contacts owned by the current user.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error unchanged.
    pub async fn list(&self) -> Result<Vec<Contact>, ClientError> {
        self.api.get(BASE_PATH).await.inspect_err(|e| {
            error!(error = %e, "error fetching contacts");
        })
    }

    /// Contacts matching `query`. A blank query lists everything.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error unchanged.
    pub async fn search(&self, query: &str) -> Result<Vec<Contact>, ClientError> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        let path = format!("{BASE_PATH}/search");
        self.api
            .get_with_query(&path, &[("query", query)])
            .await
            .inspect_err(|e| {
                error!(error = %e, "error searching contacts");
            })
    }

    /// # Errors
    ///
    /// Returns the pipeline error unchanged.
    pub async fn create(&self, input: &ContactInput) -> Result<Contact, ClientError> {
        self.api.post(BASE_PATH, input).await.inspect_err(|e| {
            error!(error = %e, "error creating contact");
        })
    }

    /// # Errors
    ///
    /// Returns the pipeline error unchanged.
    pub async fn update(&self, contact_id: i64, input: &ContactInput) -> Result<Contact, ClientError> {
        self.api
            .put(&contact_path(contact_id), input)
            .await
            .inspect_err(|e| {
                error!(error = %e, contact_id, "error updating contact");
            })
    }

    /// # Errors
    ///
    /// Returns the pipeline error unchanged.
    pub async fn delete(&self, contact_id: i64) -> Result<(), ClientError> {
        self.api
            .delete(&contact_path(contact_id))
            .await
            .inspect_err(|e| {
                error!(error = %e, contact_id, "error deleting contact");
            })
    }
}
