//! Per-kind watermarks persisted between invocations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;

/// Last successful sync time for each resource kind
///
/// A missing entry means the kind has never completed a sync and the
/// next run fetches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prs: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussions: Option<DateTime<Utc>>,
}

impl SyncState {
    pub fn watermark(&self, kind: ResourceKind) -> Option<DateTime<Utc>> {
        match kind {
            ResourceKind::Issues => self.issues,
            ResourceKind::PullRequests => self.prs,
            ResourceKind::Discussions => self.discussions,
        }
    }

    pub fn set_watermark(&mut self, kind: ResourceKind, at: DateTime<Utc>) {
        let slot = match kind {
            ResourceKind::Issues => &mut self.issues,
            ResourceKind::PullRequests => &mut self.prs,
            ResourceKind::Discussions => &mut self.discussions,
        };
        *slot = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_state_serializes_to_empty_object() {
        let json = serde_json::to_string(&SyncState::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_parse_partial_state() {
        let state: SyncState =
            serde_json::from_str(r#"{"prs": "2024-03-01T12:00:00Z"}"#).unwrap();
        assert!(state.issues.is_none());
        assert_eq!(
            state.watermark(ResourceKind::PullRequests),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_set_watermark_touches_one_kind() {
        let at = Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap();
        let mut state = SyncState::default();
        state.set_watermark(ResourceKind::Discussions, at);
        assert_eq!(state.discussions, Some(at));
        assert!(state.issues.is_none());
        assert!(state.prs.is_none());
    }
}
