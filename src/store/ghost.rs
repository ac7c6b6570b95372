/*!
 * Ghost Admin API client.
 *
 * Authenticates with a short-lived HS256 token derived from the admin API
 * key (`<id>:<hex secret>`) and maps posts onto the document model.
 */

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::document::{Document, DocumentBody, DocumentStatus, VersionStamp};
use crate::errors::StoreError;
use crate::store::{BodyUpdate, DocumentStore};

/// Lifetime of an admin token, in seconds
const TOKEN_LIFETIME_SECS: i64 = 5 * 60;

/// Body representations requested on every read
const FORMATS: &str = "html,mobiledoc,lexical";

/// A post as returned by the Admin API
#[derive(Debug, Deserialize)]
pub struct PostRecord {
    /// Post id
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Status string (`draft`, `published`...)
    #[serde(default)]
    pub status: Option<String>,
    /// HTML rendering
    #[serde(default)]
    pub html: Option<String>,
    /// Legacy Mobiledoc body
    #[serde(default)]
    pub mobiledoc: Option<String>,
    /// Lexical body
    #[serde(default)]
    pub lexical: Option<String>,
    /// Version stamp, kept verbatim
    pub updated_at: String,
}

impl From<PostRecord> for Document {
    fn from(post: PostRecord) -> Self {
        let status = post
            .status
            .as_deref()
            .and_then(|s| s.parse::<DocumentStatus>().ok())
            .unwrap_or_default();

        Document {
            id: post.id,
            title: post.title,
            status,
            body: DocumentBody::from_representations(post.lexical, post.mobiledoc, post.html),
            updated_at: VersionStamp::new(post.updated_at),
        }
    }
}

/// Claims of an admin token
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    posts: Vec<PostRecord>,
}

/// Client for the Ghost Admin API
#[derive(Debug)]
pub struct GhostClient {
    client: Client,
    base_url: Url,
    key_id: String,
    secret: Vec<u8>,
}

impl GhostClient {
    /// Create a client for the site at `url` using an admin API key
    pub fn new(url: &str, admin_api_key: &str) -> Result<Self, StoreError> {
        let base = format!("{}/", url.trim_end_matches('/'));
        let base_url = Url::parse(&base)
            .map_err(|e| StoreError::Transport(format!("Invalid store url '{}': {}", url, e)))?;

        let (key_id, secret_hex) = admin_api_key
            .split_once(':')
            .ok_or_else(|| StoreError::Authentication("admin API key must be <id>:<secret>".to_string()))?;
        let secret = hex::decode(secret_hex)
            .map_err(|e| StoreError::Authentication(format!("admin API secret is not hex: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            key_id: key_id.to_string(),
            secret,
        })
    }

    /// Admin token issued at `iat` (seconds since the epoch)
    pub fn admin_token_at(&self, iat: i64) -> Result<String, StoreError> {
        let header = Header {
            kid: Some(self.key_id.clone()),
            ..Header::new(Algorithm::HS256)
        };
        let claims = AdminClaims {
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
            aud: "/admin/".to_string(),
        };

        encode(&header, &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| StoreError::Authentication(format!("Failed to sign admin token: {}", e)))
    }

    fn authorization(&self) -> Result<String, StoreError> {
        let token = self.admin_token_at(chrono::Utc::now().timestamp())?;
        Ok(format!("Ghost {}", token))
    }

    fn posts_url(&self, id: Option<&str>) -> Result<Url, StoreError> {
        let path = match id {
            Some(id) => format!("ghost/api/admin/posts/{}/", id),
            None => "ghost/api/admin/posts/".to_string(),
        };
        self.base_url
            .join(&path)
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    async fn read_posts(&self, response: reqwest::Response, document_id: Option<&str>) -> Result<Vec<PostRecord>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ghost API error ({}): {}", status, message);
            return Err(Self::error_for_status(status, message, document_id));
        }

        let envelope: PostsEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(envelope.posts)
    }

    fn error_for_status(status: StatusCode, message: String, document_id: Option<&str>) -> StoreError {
        match status {
            StatusCode::CONFLICT => StoreError::Conflict {
                document_id: document_id.unwrap_or_default().to_string(),
                message,
            },
            StatusCode::NOT_FOUND => StoreError::NotFound(document_id.unwrap_or("posts").to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Authentication(message),
            other => StoreError::Api {
                status_code: other.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl DocumentStore for GhostClient {
    async fn list_documents(
        &self,
        status: Option<DocumentStatus>,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut url = self.posts_url(None)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("formats", FORMATS);
            query.append_pair("limit", &limit.to_string());
            if let Some(status) = status {
                query.append_pair("filter", &format!("status:{}", status));
            }
        }
        debug!("Listing posts: {}", url);

        let response = self
            .client
            .get(url)
            .header("Authorization", self.authorization()?)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let posts = self.read_posts(response, None).await?;
        Ok(posts.into_iter().map(Document::from).collect())
    }

    async fn get_document(&self, id: &str) -> Result<Document, StoreError> {
        let mut url = self.posts_url(Some(id))?;
        url.query_pairs_mut().append_pair("formats", FORMATS);

        let response = self
            .client
            .get(url)
            .header("Authorization", self.authorization()?)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        self.read_posts(response, Some(id))
            .await?
            .into_iter()
            .next()
            .map(Document::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_document(
        &self,
        id: &str,
        body: BodyUpdate,
        version: &VersionStamp,
    ) -> Result<Document, StoreError> {
        let mut url = self.posts_url(Some(id))?;
        url.query_pairs_mut().append_pair("formats", FORMATS);

        let mut post = serde_json::Map::new();
        match body {
            BodyUpdate::Lexical(lexical) => {
                post.insert("lexical".to_string(), Value::String(lexical));
            }
            BodyUpdate::Html(html) => {
                url.query_pairs_mut().append_pair("source", "html");
                post.insert("html".to_string(), Value::String(html));
            }
        }
        post.insert("updated_at".to_string(), Value::String(version.as_str().to_string()));
        let payload = json!({ "posts": [Value::Object(post)] });

        debug!("Updating post {} at version {}", id, version);
        let response = self
            .client
            .put(url)
            .header("Authorization", self.authorization()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        self.read_posts(response, Some(id))
            .await?
            .into_iter()
            .next()
            .map(Document::from)
            .ok_or_else(|| StoreError::Parse("update response contains no post".to_string()))
    }
}
