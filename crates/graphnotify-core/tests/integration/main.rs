//! Integration tests for the account manager and notification cache
//!
//! All collaborators are in-memory fakes from `common`; the tests exercise
//! the full startup/sign-in/logout lifecycle and the batch reconciliation
//! semantics end to end.

mod test_cache;
