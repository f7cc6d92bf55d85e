//! Plain-text rendering of a session for the reasoning service.

use lexicut_timeline::{EditSession, TimelineEntry};
use std::fmt::{self, Write};
use tracing::warn;

/// Render the screenplay sent with the first user turn.
///
/// One block per entry in edit order: id, source, time range, status and
/// text, then the visual description of its phrase group and the word ids
/// with cut words bracketed. Sources and their visual descriptions come
/// first, followed by the B-roll eligible sources.
///
/// # Examples
///
/// ```
/// use lexicut_agent::format_screenplay;
/// use lexicut_core::{Sentence, Source, Word};
/// use lexicut_timeline::EditSession;
///
/// let words = vec![Word::new("w1", "Hello.", "cam", 0.0, 0.5)];
/// let sentence = Sentence {
///     sentence_id: "s1".into(),
///     source_id: "cam".into(),
///     word_ids: vec!["w1".into()],
///     text: "Hello.".into(),
///     start_time: 0.0,
///     end_time: 0.5,
///     origin_ordering_group_id: None,
/// };
/// let session = EditSession::new("p", "Demo", vec![Source::new("cam", "Camera")], words, vec![sentence], vec![]);
///
/// let screenplay = format_screenplay(&session);
/// assert!(screenplay.contains("[s1] cam 0.00-0.50 active"));
/// assert!(screenplay.contains("w1 Hello."));
/// ```
pub fn format_screenplay(session: &EditSession) -> String {
    let mut out = String::new();
    if let Err(e) = write_screenplay(&mut out, session) {
        warn!(error = %e, "Screenplay rendering stopped early");
    }
    out
}

fn write_screenplay(out: &mut String, session: &EditSession) -> fmt::Result {
    writeln!(out, "Project: {}", session.name())?;
    writeln!(out, "\nSources:")?;
    for source in session.sources() {
        let duration = source
            .duration
            .map(|d| format!(" ({d:.1}s)"))
            .unwrap_or_default();
        writeln!(out, "- {} \"{}\"{}", source.id, source.name, duration)?;
        for description in source.descriptions.iter().flatten() {
            writeln!(
                out,
                "    {:.1}-{:.1}: {}",
                description.start, description.end, description.description
            )?;
        }
    }

    let broll = session.broll_sources();
    if broll.is_empty() {
        writeln!(out, "\nB-roll eligible sources: none")?;
    } else {
        writeln!(out, "\nB-roll eligible sources: {}", broll.join(", "))?;
    }

    if !session.narrative_summary().is_empty() {
        writeln!(out, "\nNarrative: {}", session.narrative_summary())?;
    }

    writeln!(out, "\nScreenplay (edit order):")?;
    for entry in session.timeline().entries() {
        write_entry(out, session, entry)?;
    }

    if !session.broll_classifications().is_empty() {
        writeln!(out, "\nB-roll classifications:")?;
        for classification in session.broll_classifications() {
            writeln!(
                out,
                "- {} is_broll={} reason={} confidence={:.2}",
                classification.sentence_id,
                classification.is_broll,
                classification.reason,
                classification.confidence
            )?;
        }
    }
    Ok(())
}

fn write_entry(out: &mut String, session: &EditSession, entry: &TimelineEntry) -> fmt::Result {
    let status = if entry.excluded { "deleted" } else { "active" };
    let sentence = session.sentence(&entry.sentence_id);
    let (start, end, word_ids) = match sentence {
        Some(sentence) => (
            sentence.start_time,
            sentence.end_time,
            sentence.word_ids.as_slice(),
        ),
        None => (0.0, 0.0, &[][..]),
    };

    writeln!(
        out,
        "[{}] {} {:.2}-{:.2} {}",
        entry.sentence_id, entry.source_id, start, end, status
    )?;
    if !entry.text.is_empty() {
        writeln!(out, "  text: {}", entry.text)?;
    }

    let visual = sentence
        .and_then(|s| s.origin_ordering_group_id.as_deref())
        .and_then(|group_id| session.phrase_group(group_id))
        .and_then(|group| group.description.as_deref());
    if let Some(visual) = visual {
        writeln!(out, "  visual: {visual}")?;
    }

    if !word_ids.is_empty() {
        let words: Vec<String> = word_ids
            .iter()
            .map(|id| {
                let text = session.word(id).map(|w| w.text.as_str()).unwrap_or("?");
                if entry.excluded_word_ids.contains(id) {
                    format!("[cut {id} {text}]")
                } else {
                    format!("{id} {text}")
                }
            })
            .collect();
        writeln!(out, "  words: {}", words.join(" | "))?;
    }

    if let Some(video_override) = &entry.video_override {
        writeln!(
            out,
            "  b-roll: {} {:.2}-{:.2}",
            video_override.source_id, video_override.start, video_override.end
        )?;
    }
    Ok(())
}
