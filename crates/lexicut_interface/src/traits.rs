//! Collaborator trait definitions.

use crate::{
    DescribeTarget, GroupDescription, OrderingGroup, OrderingResponse, RangeDescription,
    ReasoningRequest, StreamEvent, Transcription,
};
use async_trait::async_trait;
use futures_util::stream::Stream;
use lexicut_error::LexicutResult;
use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;

/// Pull-based stream of decoded reasoning events.
pub type EventStream = Pin<Box<dyn Stream<Item = LexicutResult<StreamEvent>> + Send>>;

/// Reasoning service that can call tools and streams its response.
#[async_trait]
pub trait ReasoningDriver: Send + Sync {
    /// Send one request and return the decoded event stream.
    ///
    /// Transport failures (non-success status, absent body) are returned as
    /// `Err` before any event is yielded.
    async fn stream(&self, request: &ReasoningRequest) -> LexicutResult<EventStream>;

    /// Provider name (e.g., "anthropic").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Narrative-ordering collaborator.
///
/// Best-effort: callers validate and repair the response and fall back to
/// chronological order on any failure.
#[async_trait]
pub trait NarrativeOrderer: Send + Sync {
    /// Propose an ordering of `groups`; `source_names` maps source id to name.
    async fn order(
        &self,
        groups: &[OrderingGroup],
        source_names: &HashMap<String, String>,
    ) -> LexicutResult<OrderingResponse>;
}

/// Speech-to-text collaborator.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a media file. `cache_key` is the content fingerprint.
    async fn transcribe(&self, file: &Path, cache_key: Option<&str>)
    -> LexicutResult<Transcription>;
}

/// Video description collaborator.
///
/// Callers must tolerate empty results.
#[async_trait]
pub trait Describer: Send + Sync {
    /// Describe explicit time ranges of a file.
    async fn describe_ranges(
        &self,
        file: &Path,
        target: &DescribeTarget,
        cache_key: Option<&str>,
    ) -> LexicutResult<Vec<RangeDescription>>;

    /// Describe phrase groups of a file.
    async fn describe_groups(
        &self,
        file: &Path,
        target: &DescribeTarget,
        cache_key: Option<&str>,
    ) -> LexicutResult<Vec<GroupDescription>>;
}
