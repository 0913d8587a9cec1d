use crate::types::{Session, SessionStatus};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Whether `session` has gone quiet long enough to be marked stale (§4.6).
#[must_use]
pub fn is_stale(session: &Session, now: DateTime<Utc>, stale_after: Duration) -> bool {
    session.status == SessionStatus::Active
        && (now - session.last_activity_at)
            .to_std()
            .map(|elapsed| elapsed >= stale_after)
            .unwrap_or(false)
}

/// Whether a stale or ended `session` is still within its resume window,
/// i.e. a new `startSession` call for the same project should reattach to
/// it instead of creating a fresh one.
#[must_use]
pub fn is_resumable(session: &Session, now: DateTime<Utc>, resume_window: Duration) -> bool {
    session.status != SessionStatus::Active
        && (now - session.last_activity_at)
            .to_std()
            .map(|elapsed| elapsed < resume_window)
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn session_at(last_activity_age: ChronoDuration, status: SessionStatus) -> Session {
        let mut session = Session::new("acme");
        session.status = status;
        session.last_activity_at = Utc::now() - last_activity_age;
        session
    }

    #[test]
    fn active_session_past_two_hours_is_stale() {
        let session = session_at(ChronoDuration::hours(3), SessionStatus::Active);
        assert!(is_stale(&session, Utc::now(), Duration::from_secs(2 * 3600)));
    }

    #[test]
    fn active_session_within_window_is_not_stale() {
        let session = session_at(ChronoDuration::minutes(5), SessionStatus::Active);
        assert!(!is_stale(&session, Utc::now(), Duration::from_secs(2 * 3600)));
    }

    #[test]
    fn ended_session_within_resume_window_is_resumable() {
        let session = session_at(ChronoDuration::hours(1), SessionStatus::Ended);
        assert!(is_resumable(&session, Utc::now(), Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn ended_session_past_resume_window_is_not_resumable() {
        let session = session_at(ChronoDuration::hours(25), SessionStatus::Ended);
        assert!(!is_resumable(&session, Utc::now(), Duration::from_secs(24 * 3600)));
    }
}
