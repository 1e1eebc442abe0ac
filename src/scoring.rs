//! Score and level derivation.
//!
//! Two formula families coexist on purpose: registration and the full stats
//! refresh weight problems by difficulty, while the lightweight sync endpoint
//! scores total volume plus streak. They produce different numbers for the
//! same underlying stats, so call sites must pick the one matching their
//! entry point rather than mixing them.

/// Difficulty-weighted score used at registration and by the full refresh.
pub fn score_registration(easy: u64, medium: u64, hard: u64) -> u64 {
    easy * 10 + medium * 15 + hard * 20
}

/// Level used at registration and by the full refresh. Always at least 1.
pub fn level_registration(problems: u64) -> u64 {
    problems / 10 + 1
}

/// Level used by the lightweight sync endpoint. Always at least 1.
pub fn level_sync(problems: u64) -> u64 {
    (problems * 10) / 100 + 1
}

/// Volume-plus-streak score used by the lightweight sync endpoint.
pub fn score_sync(problems: u64, streak: u64) -> u64 {
    problems * 10 + streak * 5 + level_sync(problems) * 20
}
