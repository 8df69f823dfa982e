//! Identity types for LEADFACTORY entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Generate an opaque thread token for reply correlation.
///
/// The token is embedded in outbound messages (subject suffix + hidden
/// span) and is the sole key for matching a later inbound reply to the
/// send that originated it. Random v4, not v7: tokens must not leak
/// creation ordering.
pub fn new_thread_token() -> String {
    format!("t-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_version_7() {
        let a = new_entity_id();
        let b = new_entity_id();
        assert_ne!(a, b);
        assert_eq!(a.get_version_num(), 7);
    }

    #[test]
    fn test_entity_ids_sort_across_time() {
        let a = new_entity_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_entity_id();
        assert!(a < b, "UUIDv7 ids must sort by creation time");
    }

    #[test]
    fn test_thread_tokens_are_unique_and_prefixed() {
        let a = new_thread_token();
        let b = new_thread_token();
        assert_ne!(a, b);
        assert!(a.starts_with("t-"));
    }
}
