//! note.com publisher.
//!
//! The login, editor and publish steps are simulated with logs so the
//! pipeline runs end to end without touching the real service. Swap the
//! `simulate_*` steps for browser automation when wiring real credentials.

use async_trait::async_trait;
use chrono::Local;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{Article, ArticlePublisher, PublishResult};
use crate::config::NoteCredentials;
use crate::error::PublishError;

/// Login page.
pub const LOGIN_URL: &str = "https://note.com/login";

/// New-article editor.
pub const EDITOR_URL: &str = "https://note.com/new";

/// Publishes articles to note.com.
pub struct NoteClient {
    credentials: NoteCredentials,
    /// idempotency key -> URL of articles published by this client.
    published: Mutex<HashMap<String, String>>,
}

impl NoteClient {
    #[must_use]
    pub fn new(credentials: NoteCredentials) -> Self {
        Self {
            credentials,
            published: Mutex::new(HashMap::new()),
        }
    }

    fn simulate_login(&self) {
        tracing::debug!(email = %self.credentials.email, url = LOGIN_URL, "Simulating login");
    }

    fn simulate_editor_entry(&self, article: &Article) {
        tracing::debug!(
            url = EDITOR_URL,
            title = %article.title,
            price = article.price,
            free_chars = article.free_section.chars().count(),
            paid_chars = article.paid_section.chars().count(),
            "Simulating editor entry"
        );
    }

    fn simulate_publish(&self, article: &Article) -> String {
        format!(
            "https://note.com/{}/n/n{}{}",
            self.credentials.account,
            article
                .idempotency_key
                .get(..12)
                .unwrap_or(&article.idempotency_key),
            Local::now().format("%Y%m%d")
        )
    }
}

#[async_trait]
impl ArticlePublisher for NoteClient {
    fn name(&self) -> &'static str {
        "note"
    }

    async fn publish(&self, article: &Article) -> Result<PublishResult, PublishError> {
        if article.title.trim().is_empty() {
            return Err(PublishError::Rejected("title is empty".to_string()));
        }

        let mut published = self.published.lock().await;
        if let Some(url) = published.get(&article.idempotency_key) {
            tracing::info!(
                key = %article.idempotency_key,
                url = %url,
                "Article already published, returning existing URL"
            );
            return Ok(PublishResult { url: url.clone() });
        }

        tracing::info!(title = %article.title, "Publishing article");
        self.simulate_login();
        self.simulate_editor_entry(article);
        let url = self.simulate_publish(article);

        published.insert(article.idempotency_key.clone(), url.clone());
        tracing::info!(url = %url, "Article published");

        Ok(PublishResult { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NoteClient {
        NoteClient::new(NoteCredentials {
            email: "writer@example.com".to_string(),
            password: "pw".to_string(),
            account: "writer".to_string(),
        })
    }

    fn article() -> Article {
        Article::new(
            "恋愛・人間関係｜タイトル".to_string(),
            "free".to_string(),
            "paid".to_string(),
            400,
        )
    }

    #[tokio::test]
    async fn test_publish_url_shape() {
        let article = article();
        let result = client().publish(&article).await.unwrap();

        let prefix = format!("https://note.com/writer/n/n{}", &article.idempotency_key[..12]);
        assert!(result.url.starts_with(&prefix));
        assert_eq!(result.url.len(), prefix.len() + 8);
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let client = client();
        let first = client.publish(&article()).await.unwrap();
        let second = client.publish(&article()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.published.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let empty = Article::new(String::new(), "f".to_string(), "p".to_string(), 300);
        let err = client().publish(&empty).await.unwrap_err();
        assert!(matches!(err, PublishError::Rejected(_)));
    }
}
