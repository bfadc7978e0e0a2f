//! Temporary ID generation for optimistic UI state.
//!
//! Server-side entities carry opaque UUIDs; the only client-generated ids are
//! the temporary ones attached to a pending conversation turn until the
//! gateway confirms it. ULIDs keep them chronologically ordered so pending
//! turns render in send order.

use ulid::Ulid;

/// Prefix for client-side temporary ids, never sent to the server.
const TEMP_PREFIX: &str = "tmp";

/// Generate a temporary id for an optimistic pending turn.
pub fn temp_id() -> String {
    format!("{}_{}", TEMP_PREFIX, Ulid::new().to_string().to_lowercase())
}

/// True if the id was generated client-side by [`temp_id`].
pub fn is_temp(id: &str) -> bool {
    id.starts_with("tmp_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_ids_are_ordered() {
        let id1 = temp_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = temp_id();

        assert!(is_temp(&id1));
        assert!(is_temp(&id2));
        assert!(id1 < id2);
    }

    #[test]
    fn test_server_ids_are_not_temp() {
        assert!(!is_temp("4a3c9b1e-0000-0000-0000-000000000001"));
    }
}
