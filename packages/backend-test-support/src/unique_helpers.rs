//! Test helpers for generating unique test data
//!
//! Unique names keep tests isolated when several sessions or rosters exist in
//! the same process.

use uuid::Uuid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("player");
/// let id2 = unique_str("player");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("player-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Generate a unique display name suitable for a roster
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_name;
///
/// let name = unique_name("ada");
/// assert!(name.starts_with("ada-"));
/// ```
pub fn unique_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}
