//! Initial assembly ordering.
//!
//! Chronological by default. When more than one source is involved, an
//! external narrative orderer may propose a different order; its response is
//! validated and repaired before use, and any failure falls back to
//! chronological order.

use lexicut_core::{PhraseGroup, Sentence, Source};
use lexicut_interface::{DuplicateCluster, NarrativeOrderer, OrderingGroup};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// How an assembly order was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderingStrategy {
    /// Natural time order
    Chronological,
    /// Repaired response of the narrative orderer
    Narrative,
}

/// Accepted ordering of phrase groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOrder {
    /// Every known group id exactly once
    pub ordered_ids: Vec<String>,
    /// Repaired retake clusters
    pub duplicates: Vec<DuplicateCluster>,
    /// Narrative summary (empty for chronological order)
    pub narrative_summary: String,
    /// Where the order came from
    pub strategy: OrderingStrategy,
}

impl AssemblyOrder {
    /// Groups in their input order.
    pub fn chronological(groups: &[PhraseGroup]) -> Self {
        Self {
            ordered_ids: groups.iter().map(|group| group.group_id.clone()).collect(),
            duplicates: Vec::new(),
            narrative_summary: String::new(),
            strategy: OrderingStrategy::Chronological,
        }
    }
}

/// Validate and repair a proposed ordering against the known ids.
///
/// Unknown and repeated ids are dropped; known ids the response left out are
/// appended in their original order.
///
/// # Examples
///
/// ```
/// use lexicut_assembly::repair_order;
///
/// let known: Vec<String> = ["g1", "g2", "g3"].iter().map(|s| s.to_string()).collect();
/// let returned: Vec<String> = ["g2", "g7", "g1"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(repair_order(&returned, &known), vec!["g2", "g1", "g3"]);
/// ```
pub fn repair_order(returned: &[String], known: &[String]) -> Vec<String> {
    let known_set: HashSet<&str> = known.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut repaired: Vec<String> = Vec::with_capacity(known.len());

    for id in returned {
        if !known_set.contains(id.as_str()) {
            warn!(id = %id, "Dropping unknown group id from ordering");
            continue;
        }
        if seen.insert(id.as_str()) {
            repaired.push(id.clone());
        }
    }

    for id in known {
        if seen.insert(id.as_str()) {
            debug!(id = %id, "Appending group missing from ordering");
            repaired.push(id.clone());
        }
    }

    repaired
}

/// Repair retake clusters against the known ids.
///
/// Unknown ids are removed, clusters left with fewer than two members are
/// dropped, and a keeper outside its cluster is replaced by the first member.
pub fn repair_duplicates(clusters: &[DuplicateCluster], known: &[String]) -> Vec<DuplicateCluster> {
    let known_set: HashSet<&str> = known.iter().map(String::as_str).collect();

    clusters
        .iter()
        .filter_map(|cluster| {
            let mut members: Vec<String> = Vec::new();
            for id in &cluster.group_ids {
                if known_set.contains(id.as_str()) && !members.contains(id) {
                    members.push(id.clone());
                }
            }
            if members.len() < 2 {
                return None;
            }
            let keeper_id = if members.contains(&cluster.keeper_id) {
                cluster.keeper_id.clone()
            } else {
                members[0].clone()
            };
            Some(DuplicateCluster {
                group_ids: members,
                keeper_id,
                reason: cluster.reason.clone(),
            })
        })
        .collect()
}

/// Produce the initial ordering of phrase groups.
///
/// The external orderer is consulted only when the groups span more than one
/// source and there is more than one group. Ordering never fails: errors fall
/// back to chronological order.
#[instrument(skip_all, fields(groups = groups.len()))]
pub async fn order_groups<O>(
    orderer: Option<&O>,
    groups: &[PhraseGroup],
    sources: &[Source],
) -> AssemblyOrder
where
    O: NarrativeOrderer + ?Sized,
{
    let source_count = groups
        .iter()
        .map(|group| group.source_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    if source_count <= 1 || groups.len() <= 1 {
        debug!(source_count, "Single source or group; keeping chronological order");
        return AssemblyOrder::chronological(groups);
    }

    let Some(orderer) = orderer else {
        debug!("No narrative orderer configured; keeping chronological order");
        return AssemblyOrder::chronological(groups);
    };

    let source_names: HashMap<String, String> = sources
        .iter()
        .map(|source| (source.id.clone(), source.name.clone()))
        .collect();

    let request: Vec<OrderingGroup> = groups
        .iter()
        .map(|group| OrderingGroup {
            id: group.group_id.clone(),
            source: source_names
                .get(&group.source_id)
                .cloned()
                .unwrap_or_else(|| group.source_id.clone()),
            text: group.text.clone(),
            start_time: group.start_time,
            end_time: group.end_time,
            confidence: group.avg_confidence,
            description: group.description.clone(),
        })
        .collect();

    match orderer.order(&request, &source_names).await {
        Ok(response) => {
            let known: Vec<String> = groups.iter().map(|group| group.group_id.clone()).collect();
            let ordered_ids = repair_order(&response.ordered_ids, &known);
            let duplicates = repair_duplicates(&response.duplicates, &known);
            info!(
                groups = ordered_ids.len(),
                duplicates = duplicates.len(),
                "Accepted narrative ordering"
            );
            AssemblyOrder {
                ordered_ids,
                duplicates,
                narrative_summary: response.narrative_summary,
                strategy: OrderingStrategy::Narrative,
            }
        }
        Err(e) => {
            warn!(error = %e, "Narrative ordering failed; falling back to chronological order");
            AssemblyOrder::chronological(groups)
        }
    }
}

/// Order sentences by the rank of their origin group.
///
/// Sentences keep their relative order within a group. Sentences without a
/// known group follow all grouped sentences in their input order.
pub fn arrange_sentences(sentences: &[Sentence], ordered_group_ids: &[String]) -> Vec<Sentence> {
    let rank: HashMap<&str, usize> = ordered_group_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();

    let mut arranged: Vec<Sentence> = sentences.to_vec();
    arranged.sort_by_key(|sentence| {
        sentence
            .origin_ordering_group_id
            .as_deref()
            .and_then(|id| rank.get(id).copied())
            .unwrap_or(usize::MAX)
    });
    arranged
}
