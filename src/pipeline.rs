//! Comment analysis pipeline: fetch, then clean → translate → classify every comment.
//!
//! Two independent passes run over the fetched corpus. The full pass labels every
//! comment to build the corpus-wide label sequence; the page pass re-runs the same chain
//! over the requested page only and keeps the per-comment detail. Comments that end up
//! blank are dropped from both.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::clean::clean_comment;
use crate::config::MAX_PAGE_LIMIT;
use crate::error::{AnalysisError, ScoreError};
use crate::ml::{SentimentClassifier, SentimentLabel};
use crate::translate::Translator;
use crate::video::extract_video_id;
use crate::youtube::{CommentFetcher, CommentSource};

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[schema(example = "https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    pub url: String,
    /// 1-based page number.
    #[serde(default = "default_page")]
    #[schema(example = 1)]
    pub page: usize,
    #[serde(default = "default_limit")]
    #[schema(example = 10)]
    pub limit: usize,
}

impl AnalyzeRequest {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.page < 1 {
            return Err(AnalysisError::InvalidRequest("page must be at least 1".into()));
        }
        if self.limit < 1 || self.limit > MAX_PAGE_LIMIT {
            return Err(AnalysisError::InvalidRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CommentSentiment {
    /// Cleaned and translated comment text.
    pub comment: String,
    pub sentiment: SentimentLabel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LabelCounts {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
}

impl LabelCounts {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

impl FromIterator<SentimentLabel> for LabelCounts {
    fn from_iter<I: IntoIterator<Item = SentimentLabel>>(iter: I) -> Self {
        let mut counts = LabelCounts::default();
        for label in iter {
            counts.record(label);
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResult {
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub page: usize,
    pub limit: usize,
    /// Comments in the whole fetched corpus that received a label.
    pub total_comments: usize,
    /// Labeled comments of the requested page, in source order.
    pub sentiments: Vec<CommentSentiment>,
    /// Label counts restricted to the requested page.
    pub summary: LabelCounts,
    /// Labels of the whole fetched corpus, in source order.
    pub all_sentiments: Vec<SentimentLabel>,
}

/// Slice of a `len`-long list covered by a 1-based `page` of `limit` items.
/// Pages past the end give an empty range.
pub fn page_bounds(len: usize, page: usize, limit: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(limit).min(len);
    let end = start.saturating_add(limit).min(len);
    start..end
}

pub struct AnalysisPipeline<S> {
    fetcher: CommentFetcher<S>,
    translator: Arc<dyn Translator>,
    classifier: SentimentClassifier,
    workers: usize,
}

impl<S: CommentSource> AnalysisPipeline<S> {
    pub fn new(
        fetcher: CommentFetcher<S>,
        translator: Arc<dyn Translator>,
        classifier: SentimentClassifier,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            translator,
            classifier,
            workers: workers.max(1),
        }
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_request(request).await.map_err(|e| {
            if e.is_client_error() {
                debug!("[Analyze] rejected: {}", e);
            } else {
                error!("❌ [Analyze] {}", e);
            }
            e
        })
    }

    async fn analyze_request(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        request.validate()?;
        let video_id = extract_video_id(&request.url)?;

        let span = info_span!("analysis", run_id = %Uuid::new_v4(), video_id = %video_id);
        self.run(video_id, request.page, request.limit)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        video_id: String,
        page: usize,
        limit: usize,
    ) -> Result<AnalysisResult, AnalysisError> {
        let comments = self.fetcher.fetch_all(&video_id).await?;

        let all_sentiments: Vec<SentimentLabel> = self
            .label_all(&comments)
            .await?
            .into_iter()
            .map(|entry| entry.sentiment)
            .collect();

        let page_slice = &comments[page_bounds(comments.len(), page, limit)];
        let sentiments = self.label_all(page_slice).await?;
        let summary: LabelCounts = sentiments.iter().map(|entry| entry.sentiment).collect();

        info!(
            "🧠 [Analyze] {} fetched, {} labeled; page {} has {} labeled of {}",
            comments.len(),
            all_sentiments.len(),
            page,
            summary.total(),
            page_slice.len()
        );

        Ok(AnalysisResult {
            video_id,
            page,
            limit,
            total_comments: all_sentiments.len(),
            sentiments,
            summary,
            all_sentiments,
        })
    }

    /// Runs the per-comment chain over `comments` on a bounded number of concurrent
    /// workers. Output keeps input order; blank comments are left out.
    async fn label_all(&self, comments: &[String]) -> Result<Vec<CommentSentiment>, ScoreError> {
        let jobs = comments
            .iter()
            .cloned()
            .map(|raw| async move { self.label_comment(&raw).await });
        let labeled: Vec<Option<CommentSentiment>> = stream::iter(jobs)
            .buffered(self.workers)
            .try_collect()
            .await?;
        Ok(labeled.into_iter().flatten().collect())
    }

    async fn label_comment(&self, raw: &str) -> Result<Option<CommentSentiment>, ScoreError> {
        let cleaned = clean_comment(raw);
        if cleaned.is_empty() {
            debug!("[Analyze] comment empty after cleaning, skipped");
            return Ok(None);
        }

        let translation = self.translator.translate(&cleaned).await;
        if translation.is_fallback() {
            debug!("[Analyze] scoring untranslated text {:?}", translation.text());
        }
        let translated = translation.into_text();
        Ok(self
            .classifier
            .classify(&translated)?
            .map(|sentiment| CommentSentiment {
                comment: translated,
                sentiment,
            }))
    }
}
