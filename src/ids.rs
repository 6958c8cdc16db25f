//! Record identifier generation.

use chrono::Utc;

/// Generate a new record id: millisecond timestamp plus a random hex suffix.
///
/// Ids are never reused; two ids generated in the same millisecond still
/// differ by their suffix.
pub fn new_id() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: u32 = rand::random();
    format!("{timestamp}-{:06x}", random & 0x00FF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_shape() {
        let id = new_id();
        let (ts, suffix) = id.split_once('-').unwrap();
        assert!(ts.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 6);
    }

    #[test]
    fn test_ids_are_distinct() {
        let ids: HashSet<_> = (0..100).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 100);
    }
}
