use serde::{Deserialize, Serialize};

/// Accepted values for the education-level profile field.
pub const EDUCATION_LEVELS: [&str; 7] = [
    "High School",
    "Undergraduate",
    "Graduate",
    "PhD",
    "Bootcamp",
    "Self-Taught",
    "Other",
];

/// Avatar pool sampled at registration.
pub const AVATARS: [&str; 10] = ["🎮", "⚔️", "🛡️", "🏹", "🔮", "⚡", "🔥", "💎", "👑", "🎯"];

/// Normalized snapshot of a LeetCode profile, as returned by the stats
/// provider. Missing upstream fields default to 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStats {
    pub problems: u64,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub ranking: u64,
    pub streak: u64,
    pub total_active_days: u64,
}

impl std::fmt::Display for LeetCodeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LeetCode Stats:\n\
             \tTotal Solved: {}\n\
             \tEasy Solved: {}\n\
             \tMedium Solved: {}\n\
             \tHard Solved: {}\n\
             \tRanking: {}\n\
             \tStreak: {}",
            self.problems, self.easy, self.medium, self.hard, self.ranking, self.streak
        )
    }
}

/// A registered account, exactly as persisted. `score` and `level` are only
/// ever written by a derivation step; they are never set independently.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,

    pub username: String,
    pub email: String,
    pub password_hash: String,

    /// Linked LeetCode handle. Unique across all accounts when present.
    pub leetcode_username: Option<String>,
    pub leetcode_verified: bool,

    pub avatar: String,
    pub education_level: String,
    pub institution_name: String,
    pub year: String,

    pub problems: u64,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub score: u64,
    pub level: u64,
    pub streak: u64,
    pub total_active_days: u64,
    pub ranking: u64,

    pub created_at: i64,
    pub last_synced: Option<i64>,
    pub last_updated: Option<i64>,
}

/// Externally-safe projection of an [`Account`]. Never carries the password
/// hash. `rank` is filled in only by call sites that computed one; it is a
/// position in a sorted view, not stored state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub leetcode_username: Option<String>,
    pub problems: u64,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub score: u64,
    pub level: u64,
    pub streak: u64,
    pub total_active_days: u64,
    pub ranking: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
    pub education_level: String,
    pub institution_name: String,
    pub year: String,
    pub last_synced: Option<i64>,
    pub last_updated: Option<i64>,
}

impl From<Account> for Profile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            avatar: account.avatar,
            leetcode_username: account.leetcode_username,
            problems: account.problems,
            easy: account.easy,
            medium: account.medium,
            hard: account.hard,
            score: account.score,
            level: account.level,
            streak: account.streak,
            total_active_days: account.total_active_days,
            ranking: account.ranking,
            rank: None,
            education_level: account.education_level,
            institution_name: account.institution_name,
            year: account.year,
            last_synced: account.last_synced,
            last_updated: account.last_updated,
        }
    }
}

/// One leaderboard position. Strips both the password hash and the email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: u64,
    pub username: String,
    pub avatar: String,
    pub leetcode_username: Option<String>,
    pub problems: u64,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub score: u64,
    pub level: u64,
    pub streak: u64,
}

impl LeaderboardRow {
    pub fn new(rank: u64, account: Account) -> Self {
        Self {
            rank,
            username: account.username,
            avatar: account.avatar,
            leetcode_username: account.leetcode_username,
            problems: account.problems,
            easy: account.easy,
            medium: account.medium,
            hard: account.hard,
            score: account.score,
            level: account.level,
            streak: account.streak,
        }
    }
}
