//! From source media to a ready-to-edit session.

use crate::LexicutConfig;
use futures::future::try_join_all;
use lexicut_agent::{AssemblyCutOutcome, run_assembly_cut};
use lexicut_assembly::{
    AssemblyOrder, arrange_sentences, assign_origin_groups, broll_eligible_sources,
    group_for_description, order_groups, segment_sources,
};
use lexicut_cache::{JobRegistry, ResultCache};
use lexicut_core::{PhraseGroup, Source, SourceDescription, Word};
use lexicut_error::LexicutResult;
use lexicut_interface::{
    DescribeTarget, Describer, GroupDescription, NarrativeOrderer, RangeDescription,
    ReasoningDriver, Transcriber, Transcription,
};
use lexicut_models::{AnthropicClient, AnthropicOrderer, RetryingDescriber};
use lexicut_storage::compute_cid;
use lexicut_timeline::EditSession;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

const TRANSCRIPTION: &str = "transcription";
const DESCRIPTIONS: &str = "descriptions";
const GROUP_DESCRIPTIONS: &str = "group_descriptions";

/// Input to [`ProcessingPipeline::assemble`].
///
/// Sources listed without words are transcribed when a transcriber is
/// configured; otherwise they become transcriptless (B-roll eligible).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    /// Project id
    pub id: String,
    /// Display name
    pub name: String,
    /// Source media
    pub sources: Vec<Source>,
    /// Pre-transcribed words, if any
    #[serde(default)]
    pub words: Vec<Word>,
}

/// What [`ProcessingPipeline::assemble`] produced.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The new session
    pub session: EditSession,
    /// How the phrase groups were ordered
    pub order: AssemblyOrder,
    /// Result of the automatic first pass
    pub assembly_cut: AssemblyCutOutcome,
}

/// Runs transcription, segmentation, ordering and the assembly cut.
///
/// Every collaborator is optional. Collaborator results are shared between
/// concurrent callers by content fingerprint and cached afterwards.
pub struct ProcessingPipeline {
    config: LexicutConfig,
    transcriber: Option<Arc<dyn Transcriber>>,
    describer: Option<Arc<dyn Describer>>,
    orderer: Option<Arc<dyn NarrativeOrderer>>,
    driver: Option<Arc<dyn ReasoningDriver>>,
    transcriptions: JobRegistry<Transcription>,
    descriptions: JobRegistry<Vec<RangeDescription>>,
    group_descriptions: JobRegistry<Vec<GroupDescription>>,
    cache: Arc<Mutex<ResultCache>>,
}

impl ProcessingPipeline {
    /// A pipeline with no collaborators.
    ///
    /// Results cached by earlier runs are loaded when `cache.path` is set.
    pub fn new(config: LexicutConfig) -> Self {
        let cache = ResultCache::new(config.cache.clone());
        Self {
            config,
            transcriber: None,
            describer: None,
            orderer: None,
            driver: None,
            transcriptions: JobRegistry::new(),
            descriptions: JobRegistry::new(),
            group_descriptions: JobRegistry::new(),
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Use the Anthropic API for ordering and the assembly cut when
    /// `ANTHROPIC_API_KEY` is set; leave both unset otherwise.
    pub fn with_anthropic_from_env(self) -> Self {
        match AnthropicClient::from_env(self.config.agent.model.clone()) {
            Ok(client) => {
                let orderer = AnthropicOrderer::new(client.clone(), self.config.agent.max_tokens);
                self.with_orderer(orderer).with_driver(client)
            }
            Err(e) => {
                info!(reason = %e, "Reasoning service not configured");
                self
            }
        }
    }

    /// Set the transcription collaborator.
    pub fn with_transcriber(mut self, transcriber: impl Transcriber + 'static) -> Self {
        self.transcriber = Some(Arc::new(transcriber));
        self
    }

    /// Set the description collaborator, wrapped in the configured retries.
    pub fn with_describer(mut self, describer: impl Describer + 'static) -> Self {
        self.describer = Some(Arc::new(RetryingDescriber::new(
            describer,
            self.config.describe,
        )));
        self
    }

    /// Set the narrative orderer.
    pub fn with_orderer(mut self, orderer: impl NarrativeOrderer + 'static) -> Self {
        self.orderer = Some(Arc::new(orderer));
        self
    }

    /// Set the reasoning service used for the assembly cut.
    pub fn with_driver(mut self, driver: impl ReasoningDriver + 'static) -> Self {
        self.driver = Some(Arc::new(driver));
        self
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &LexicutConfig {
        &self.config
    }

    /// The configured reasoning service, if any.
    pub fn driver(&self) -> Option<&dyn ReasoningDriver> {
        self.driver.as_deref()
    }

    /// Build a session from sources and words.
    ///
    /// Text streamed during the assembly cut is passed to `on_text`.
    ///
    /// # Errors
    ///
    /// Returns transcription and fingerprint failures. Ordering, description
    /// and the assembly cut never fail the pipeline.
    #[instrument(skip_all, fields(project = %request.id, sources = request.sources.len()))]
    pub async fn assemble<F>(
        &self,
        request: AssembleRequest,
        on_text: F,
    ) -> LexicutResult<PipelineOutput>
    where
        F: FnMut(&str) + Send,
    {
        let AssembleRequest {
            id,
            name,
            mut sources,
            mut words,
        } = request;

        words.extend(self.transcribe_sources(&mut sources, &words).await?);

        let segmenter = self.config.segmenter;
        let mut sentences = segment_sources(&sources, &words, &segmenter);
        let broll = broll_eligible_sources(&sources, &sentences);
        self.describe_sources(&mut sources, &broll).await;

        let mut groups = group_for_description(
            &words,
            segmenter.max_group_duration,
            segmenter.min_group_duration,
        );
        self.describe_spoken_groups(&sources, &mut groups).await;
        assign_origin_groups(&mut sentences, &groups);

        let order = order_groups(self.orderer.as_deref(), &groups, &sources).await;
        let arranged = arrange_sentences(&sentences, &order.ordered_ids);
        for cluster in &order.duplicates {
            debug!(
                groups = ?cluster.group_ids,
                keeper = %cluster.keeper_id,
                "Retake cluster detected"
            );
        }

        let mut session = EditSession::new(id, name, sources, words, arranged, groups);
        session.set_narrative_summary(order.narrative_summary.clone());

        let assembly_cut = if self.config.agent.assembly_cut {
            run_assembly_cut(
                self.driver.as_deref(),
                &mut session,
                self.config.agent.loop_config(),
                on_text,
            )
            .await
        } else {
            AssemblyCutOutcome::Skipped("disabled in configuration".to_string())
        };

        info!(
            entries = session.timeline().len(),
            strategy = %order.strategy,
            "Project assembled"
        );
        Ok(PipelineOutput {
            session,
            order,
            assembly_cut,
        })
    }

    /// Transcribe every source with a path and no supplied words.
    ///
    /// Transcribed words are stamped with their source and numbered `w1`,
    /// `w2`, ... skipping ids the supplied words already use.
    async fn transcribe_sources(
        &self,
        sources: &mut [Source],
        supplied: &[Word],
    ) -> LexicutResult<Vec<Word>> {
        let Some(transcriber) = &self.transcriber else {
            return Ok(Vec::new());
        };

        let spoken: HashSet<&str> = supplied.iter().map(|w| w.source_id.as_str()).collect();
        let pending: Vec<usize> = sources
            .iter()
            .enumerate()
            .filter(|(_, source)| !source.path.is_empty() && !spoken.contains(source.id.as_str()))
            .map(|(index, _)| index)
            .collect();

        for &index in &pending {
            if sources[index].cid.is_none() {
                sources[index].cid = Some(compute_cid(&sources[index].path).await?);
            }
        }

        let jobs = pending.iter().map(|&index| {
            let source = &sources[index];
            self.transcribe_one(Arc::clone(transcriber), source)
        });
        let transcriptions = try_join_all(jobs).await?;

        let taken: HashSet<&str> = supplied.iter().map(|w| w.id.as_str()).collect();
        let mut next_id = 0;
        let mut words = Vec::new();
        for (&index, transcription) in pending.iter().zip(transcriptions) {
            let source_id = &sources[index].id;
            debug!(
                source = %source_id,
                words = transcription.words.len(),
                language = %transcription.language_code,
                "Transcribed source"
            );
            for mut word in transcription.words {
                word.id = loop {
                    next_id += 1;
                    let candidate = format!("w{next_id}");
                    if !taken.contains(candidate.as_str()) {
                        break candidate;
                    }
                };
                word.source_id = source_id.clone();
                words.push(word);
            }
        }
        Ok(words)
    }

    async fn transcribe_one(
        &self,
        transcriber: Arc<dyn Transcriber>,
        source: &Source,
    ) -> LexicutResult<Transcription> {
        let cid = source.cid.clone().unwrap_or_else(|| source.path.clone());
        if let Some(hit) = self.cached::<Transcription>(&cid, TRANSCRIPTION) {
            debug!(source = %source.id, "Using cached transcription");
            return Ok(hit);
        }

        let path = PathBuf::from(&source.path);
        let key = cid.clone();
        let transcription = self
            .transcriptions
            .run_or_join(&cid, move || async move {
                transcriber.transcribe(&path, Some(&key)).await
            })
            .await?;
        self.store(&cid, TRANSCRIPTION, &transcription);
        Ok(transcription)
    }

    /// Describe B-roll footage in fixed windows so the editor can pick
    /// override ranges. Failures leave the source undescribed.
    async fn describe_sources(&self, sources: &mut [Source], broll: &[String]) {
        let Some(describer) = &self.describer else {
            return;
        };
        let window = self.config.segmenter.max_group_duration;

        let pending: Vec<usize> = sources
            .iter()
            .enumerate()
            .filter(|(_, source)| {
                broll.contains(&source.id)
                    && !source.path.is_empty()
                    && source.descriptions.is_none()
                    && source.duration.is_some_and(|d| d > 0.0)
            })
            .map(|(index, _)| index)
            .collect();

        let jobs = pending.iter().map(|&index| {
            let source = &sources[index];
            let ranges = windows(source.duration.unwrap_or_default(), window);
            self.describe_one(Arc::clone(describer), source, ranges)
        });
        let results = futures::future::join_all(jobs).await;

        for (&index, result) in pending.iter().zip(results) {
            let source = &mut sources[index];
            match result {
                Ok(descriptions) if !descriptions.is_empty() => {
                    debug!(source = %source.id, ranges = descriptions.len(), "Described source");
                    source.descriptions = Some(
                        descriptions
                            .into_iter()
                            .map(|d| SourceDescription {
                                start: d.start,
                                end: d.end,
                                description: d.description,
                            })
                            .collect(),
                    );
                }
                Ok(_) => debug!(source = %source.id, "No descriptions returned"),
                Err(e) => warn!(source = %source.id, error = %e, "Description failed"),
            }
        }
    }

    async fn describe_one(
        &self,
        describer: Arc<dyn Describer>,
        source: &Source,
        ranges: Vec<(f64, f64)>,
    ) -> LexicutResult<Vec<RangeDescription>> {
        let cid = match &source.cid {
            Some(cid) => cid.clone(),
            None => compute_cid(&source.path).await?,
        };
        if let Some(hit) = self.cached::<Vec<RangeDescription>>(&cid, DESCRIPTIONS) {
            return Ok(hit);
        }

        let path = PathBuf::from(&source.path);
        let key = cid.clone();
        let descriptions = self
            .descriptions
            .run_or_join(&cid, move || async move {
                describer
                    .describe_ranges(&path, &DescribeTarget::Ranges(ranges), Some(&key))
                    .await
            })
            .await?;
        if !descriptions.is_empty() {
            self.store(&cid, DESCRIPTIONS, &descriptions);
        }
        Ok(descriptions)
    }

    /// Describe what is on screen while each phrase group is spoken.
    /// Failures leave the groups undescribed.
    async fn describe_spoken_groups(&self, sources: &[Source], groups: &mut [PhraseGroup]) {
        let Some(describer) = &self.describer else {
            return;
        };

        let pending: Vec<(&Source, Vec<(String, f64, f64)>)> = sources
            .iter()
            .filter(|source| !source.path.is_empty())
            .map(|source| {
                let spans: Vec<(String, f64, f64)> = groups
                    .iter()
                    .filter(|group| group.source_id == source.id)
                    .map(|group| (group.group_id.clone(), group.start_time, group.end_time))
                    .collect();
                (source, spans)
            })
            .filter(|(_, spans)| !spans.is_empty())
            .collect();

        let jobs = pending
            .iter()
            .map(|(source, spans)| self.describe_spans(Arc::clone(describer), source, spans.clone()));
        let results = futures::future::join_all(jobs).await;

        for ((source, _), result) in pending.iter().zip(results) {
            let ranges = match result {
                Ok(ranges) => ranges,
                Err(e) => {
                    warn!(source = %source.id, error = %e, "Group description failed");
                    continue;
                }
            };
            let mut described = 0;
            for group in groups.iter_mut().filter(|g| g.source_id == source.id) {
                let matching = ranges.iter().find(|range| {
                    (range.start - group.start_time).abs() < 1e-6
                        && (range.end - group.end_time).abs() < 1e-6
                });
                if let Some(range) = matching {
                    group.description = Some(range.description.clone());
                    described += 1;
                }
            }
            debug!(source = %source.id, groups = described, "Described phrase groups");
        }
    }

    /// Group descriptions for one source, cached by time span so they stay
    /// valid when another project numbers its groups differently.
    async fn describe_spans(
        &self,
        describer: Arc<dyn Describer>,
        source: &Source,
        spans: Vec<(String, f64, f64)>,
    ) -> LexicutResult<Vec<RangeDescription>> {
        let cid = match &source.cid {
            Some(cid) => cid.clone(),
            None => compute_cid(&source.path).await?,
        };
        if let Some(hit) = self.cached::<Vec<RangeDescription>>(&cid, GROUP_DESCRIPTIONS) {
            return Ok(hit);
        }

        let path = PathBuf::from(&source.path);
        let key = cid.clone();
        let target = DescribeTarget::Groups(spans.clone());
        let described = self
            .group_descriptions
            .run_or_join(&format!("{cid}/groups"), move || async move {
                describer.describe_groups(&path, &target, Some(&key)).await
            })
            .await?;

        let times: HashMap<&str, (f64, f64)> = spans
            .iter()
            .map(|(id, start, end)| (id.as_str(), (*start, *end)))
            .collect();
        let descriptions: Vec<RangeDescription> = described
            .into_iter()
            .filter_map(|d| {
                let &(start, end) = times.get(d.group_id.as_str())?;
                Some(RangeDescription {
                    start,
                    end,
                    description: d.description,
                })
            })
            .collect();
        if !descriptions.is_empty() {
            self.store(&cid, GROUP_DESCRIPTIONS, &descriptions);
        }
        Ok(descriptions)
    }

    fn cached<T: DeserializeOwned>(&self, cid: &str, data_type: &str) -> Option<T> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get::<T>(cid, data_type) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(cid, data_type, error = %e, "Discarding unreadable cache entry");
                cache.invalidate(cid);
                None
            }
        }
    }

    fn store<T: Serialize>(&self, cid: &str, data_type: &str, value: &T) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = cache.insert(cid, data_type, value, None) {
            warn!(cid, data_type, error = %e, "Failed to cache result");
        }
    }
}

impl std::fmt::Debug for ProcessingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingPipeline")
            .field("transcriber", &self.transcriber.is_some())
            .field("describer", &self.describer.is_some())
            .field("orderer", &self.orderer.is_some())
            .field("driver", &self.driver.is_some())
            .field("in_flight", &self.transcriptions.in_flight())
            .finish()
    }
}

/// Split `[0, duration]` into consecutive windows of at most `window`
/// seconds.
fn windows(duration: f64, window: f64) -> Vec<(f64, f64)> {
    let mut ranges = Vec::new();
    let mut start = 0.0;
    while start < duration {
        let end = (start + window).min(duration);
        ranges.push((start, end));
        start = end;
    }
    ranges
}
