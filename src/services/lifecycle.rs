use chrono::{DateTime, Utc};

use crate::storage::Link;

/// Where a link stands at a given instant
///
/// Both expired states are terminal: the retrieval path deletes the link as
/// soon as it observes either of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Fresh,
    ExpiredByViews,
    ExpiredByTime,
}

impl LinkState {
    pub fn is_expired(self) -> bool {
        !matches!(self, LinkState::Fresh)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkState::Fresh => "fresh",
            LinkState::ExpiredByViews => "expired by views",
            LinkState::ExpiredByTime => "expired by time",
        }
    }
}

pub struct LinkLifecycle;

impl LinkLifecycle {
    /// Classify `link` at `now`
    ///
    /// View exhaustion is checked before the time bound, so a link past both
    /// limits reports [`LinkState::ExpiredByViews`].
    pub fn evaluate(link: &Link, now: DateTime<Utc>) -> LinkState {
        if link.views >= link.max_views {
            LinkState::ExpiredByViews
        } else if now >= link.expires_at {
            LinkState::ExpiredByTime
        } else {
            LinkState::Fresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_in_secs: i64, max_views: u32, views: u32) -> Link {
        Link {
            secret: "c".to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
            max_views,
            views,
        }
    }

    #[test]
    fn test_fresh_link() {
        let state = LinkLifecycle::evaluate(&link(60, 2, 1), Utc::now());
        assert_eq!(state, LinkState::Fresh);
        assert!(!state.is_expired());
    }

    #[test]
    fn test_view_exhaustion() {
        assert_eq!(
            LinkLifecycle::evaluate(&link(60, 2, 2), Utc::now()),
            LinkState::ExpiredByViews
        );
    }

    #[test]
    fn test_time_bound_is_inclusive() {
        let l = link(60, 5, 0);
        assert_eq!(
            LinkLifecycle::evaluate(&l, l.expires_at),
            LinkState::ExpiredByTime
        );
        assert_eq!(
            LinkLifecycle::evaluate(&l, l.expires_at - Duration::milliseconds(1)),
            LinkState::Fresh
        );
    }

    #[test]
    fn test_views_take_precedence_over_time() {
        let state = LinkLifecycle::evaluate(&link(-60, 1, 1), Utc::now());
        assert_eq!(state, LinkState::ExpiredByViews);
        assert!(state.is_expired());
    }
}
