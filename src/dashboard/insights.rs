use crate::models::Entry;
use crate::timestamp::DisplayZone;

/// One bar of the mood trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodPoint {
    pub label: String,
    pub score: u64,
}

/// Analyzed entries oldest first, labelled with their display-zone date.
///
/// The loader returns newest first, so the list is walked in reverse.
pub fn mood_series(entries: &[Entry], zone: &DisplayZone) -> Vec<MoodPoint> {
    entries
        .iter()
        .rev()
        .filter_map(|entry| {
            let score = entry.mood_score.filter(|s| *s > 0)?;
            Some(MoodPoint {
                label: zone.format_date(entry.created_at.as_deref()),
                score: score.clamp(0, 10) as u64,
            })
        })
        .collect()
}
