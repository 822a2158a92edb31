//! Comment retrieval from the YouTube Data API (`commentThreads`).
//!
//! The remote side is paged with an opaque `pageToken`. [`CommentFetcher`] walks those
//! pages in order and stops on one of two conditions: the corpus cap is reached, or
//! the source stops handing out a next token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PROVIDER_MAX_BATCH;
use crate::error::FetchError;

/// One page of comments as returned by the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentBatch {
    pub comments: Vec<String>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_batch(
        &self,
        video_id: &str,
        batch_size: usize,
        cursor: Option<&str>,
    ) -> Result<CommentBatch, FetchError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadList {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Client for `GET /youtube/v3/commentThreads`, authenticated with a static API key.
#[derive(Debug, Clone)]
pub struct YouTubeCommentSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl YouTubeCommentSource {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CommentSource for YouTubeCommentSource {
    async fn fetch_batch(
        &self,
        video_id: &str,
        batch_size: usize,
        cursor: Option<&str>,
    ) -> Result<CommentBatch, FetchError> {
        let max_results = batch_size.clamp(1, PROVIDER_MAX_BATCH).to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("key", self.api_key.as_str()),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token));
        }

        let response = self.client.get(&self.endpoint).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let page = response
            .json::<CommentThreadList>()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;

        Ok(CommentBatch {
            comments: page
                .items
                .into_iter()
                .map(|item| item.snippet.top_level_comment.snippet.text_display)
                .collect(),
            next_cursor: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Bounded, strictly sequential pager over a [`CommentSource`].
pub struct CommentFetcher<S> {
    source: S,
    max_comments: usize,
    batch_size: usize,
}

impl<S: CommentSource> CommentFetcher<S> {
    pub fn new(source: S, max_comments: usize, batch_size: usize) -> Self {
        Self {
            source,
            max_comments,
            batch_size: batch_size.clamp(1, PROVIDER_MAX_BATCH),
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Fetches comments in source order, never more than the corpus cap.
    ///
    /// Any batch failure aborts the whole fetch; nothing gathered so far is returned.
    pub async fn fetch_all(&self, video_id: &str) -> Result<Vec<String>, FetchError> {
        let mut comments: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut batches = 0usize;

        while !cap_reached(comments.len(), self.max_comments) {
            let wanted = self.batch_size.min(self.max_comments - comments.len());
            let batch = self
                .source
                .fetch_batch(video_id, wanted, cursor.as_deref())
                .await?;
            batches += 1;
            debug!(
                "[Fetch] batch {} for {}: {} comments, more: {}",
                batches,
                video_id,
                batch.comments.len(),
                batch.next_cursor.is_some()
            );

            let received = batch.comments.len();
            comments.extend(batch.comments);
            cursor = batch.next_cursor;

            // A page with nothing in it cannot move us toward the cap; treat it as the end.
            if source_exhausted(cursor.as_deref()) || received == 0 {
                break;
            }
        }

        comments.truncate(self.max_comments);
        info!(
            "📥 [Fetch] {} comments for {} in {} batches",
            comments.len(),
            video_id,
            batches
        );
        Ok(comments)
    }
}

fn cap_reached(collected: usize, cap: usize) -> bool {
    collected >= cap
}

fn source_exhausted(next_cursor: Option<&str>) -> bool {
    next_cursor.is_none()
}
