//! Account workflows: registration, login, stats synchronization, profile
//! edits, and the leaderboard.
//!
//! Every operation runs within one inbound request: at most one upstream
//! fetch, a bounded number of storage calls, and no background work. A
//! provider or storage failure aborts the operation before any write, so a
//! failed sync leaves the prior record retrievable.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::config::Config;
use crate::db::{self, Store};
use crate::error::ServiceError;
use crate::lcapi::StatsProvider;
use crate::models::{Account, LeaderboardRow, LeetCodeStats, Profile, AVATARS};
use crate::scoring;
use crate::validate;

/// Leaderboard responses are truncated to this many rows.
pub const LEADERBOARD_LIMIT: u64 = 100;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "Email already registered. Please login instead.";
const USERNAME_TAKEN: &str = "Username already taken. Please choose another.";
const HANDLE_ALREADY_LINKED: &str =
    "This LeetCode account is already linked to another user. Please login instead.";
const NO_HANDLE_LINKED: &str = "No LeetCode username linked";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub leetcode_username: String,
    /// Stats the client obtained from the verify step.
    pub leetcode_data: LeetCodeStats,
    pub education_level: String,
    pub institution_name: String,
    pub year: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub user: Profile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub institution_name: Option<String>,
    pub year: Option<String>,
    pub education_level: Option<String>,
}

/// The application service. Generic over the stats provider so tests can
/// swap in a canned one.
pub struct App<P> {
    config: Config,
    store: Store,
    provider: P,
}

impl<P: StatsProvider> App<P> {
    pub fn new(config: Config, store: Store, provider: P) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    /// Resolves a bearer token to the account id it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<i64, ServiceError> {
        auth::verify_token(&self.config.jwt_secret, token)
    }

    /// Checks that a LeetCode handle is unclaimed and resolves to a real
    /// profile, returning its normalized stats.
    pub async fn verify_leetcode(&self, handle: &str) -> Result<LeetCodeStats, ServiceError> {
        let handle = handle.trim();
        validate::leetcode_handle(handle)?;

        if self.store.handle_linked(handle)? {
            return Err(ServiceError::Conflict {
                message: HANDLE_ALREADY_LINKED.to_string(),
                already_exists: true,
            });
        }

        Ok(self.provider.fetch_stats(handle).await?)
    }

    /// Creates an account from a verified handle and its stats snapshot.
    ///
    /// Username/email are pre-checked for specific conflict messages, but
    /// the UNIQUE constraints are the authority: a racing duplicate loses
    /// at the insert and is reported as the same conflict.
    pub fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();
        let handle = req.leetcode_username.trim().to_string();

        validate::username(&username)?;
        validate::email(&email)?;
        validate::password(&req.password)?;
        validate::leetcode_handle(&handle)?;
        validate::education_level(&req.education_level)?;
        validate::institution_name(req.institution_name.trim())?;
        validate::year(&req.year)?;

        if self.store.find_by_email(&email)?.is_some() {
            return Err(ServiceError::conflict(EMAIL_TAKEN));
        }
        if self.store.find_by_username(&username)?.is_some() {
            return Err(ServiceError::conflict(USERNAME_TAKEN));
        }
        if self.store.handle_linked(&handle)? {
            return Err(ServiceError::Conflict {
                message: HANDLE_ALREADY_LINKED.to_string(),
                already_exists: true,
            });
        }

        let stats = req.leetcode_data;
        let now = Utc::now().timestamp();

        let mut account = Account {
            id: 0,
            username,
            email,
            password_hash: auth::hash_password(&req.password)?,
            leetcode_username: Some(handle),
            leetcode_verified: false,
            avatar: AVATARS[rand::rng().random_range(0..AVATARS.len())].to_string(),
            education_level: req.education_level,
            institution_name: req.institution_name.trim().to_string(),
            year: req.year,
            problems: stats.problems,
            easy: stats.easy,
            medium: stats.medium,
            hard: stats.hard,
            score: scoring::score_registration(stats.easy, stats.medium, stats.hard),
            level: scoring::level_registration(stats.problems),
            streak: stats.streak,
            total_active_days: stats.total_active_days,
            ranking: stats.ranking,
            created_at: now,
            last_synced: None,
            last_updated: Some(now),
        };

        account.id = self
            .store
            .insert_account(&account)
            .map_err(map_insert_conflict)?;

        let token = auth::issue_token(&self.config.jwt_secret, account.id)?;
        log::info!("[register] Account {} registered.", account.username);

        Ok(AuthResponse {
            token,
            user: account.into(),
        })
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        let email = email.trim().to_lowercase();

        let account = self
            .store
            .find_by_email(&email)?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !auth::verify_password(password, &account.password_hash)? {
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = auth::issue_token(&self.config.jwt_secret, account.id)?;
        Ok(AuthResponse {
            token,
            user: account.into(),
        })
    }

    pub fn me(&self, account_id: i64) -> Result<Profile, ServiceError> {
        self.load(account_id).map(Into::into)
    }

    /// Lightweight sync: refetch the linked profile and rescore with the
    /// volume-plus-streak formula. Difficulty splits are left alone.
    pub async fn sync_leetcode(&self, account_id: i64) -> Result<SyncResponse, ServiceError> {
        let mut account = self.load(account_id)?;
        let handle = account
            .leetcode_username
            .clone()
            .ok_or_else(|| ServiceError::InvalidState(NO_HANDLE_LINKED.to_string()))?;

        log::info!("[sync_leetcode] Syncing stats for {handle}");
        let stats = self.provider.fetch_stats(&handle).await?;

        account.problems = stats.problems;
        account.streak = stats.streak;
        account.level = scoring::level_sync(stats.problems);
        account.score = scoring::score_sync(stats.problems, stats.streak);
        account.last_synced = Some(Utc::now().timestamp());
        account.leetcode_verified = true;

        self.store.update_account(&account)?;

        Ok(SyncResponse {
            message: "Stats synced successfully!".to_string(),
            user: account.into(),
        })
    }

    /// Full refresh: refetch the linked profile, overwrite every raw stat,
    /// and rescore with the difficulty-weighted formula.
    pub async fn refresh_stats(&self, account_id: i64) -> Result<SyncResponse, ServiceError> {
        let mut account = self.load(account_id)?;
        let handle = account
            .leetcode_username
            .clone()
            .ok_or_else(|| ServiceError::InvalidState(NO_HANDLE_LINKED.to_string()))?;

        log::info!("[refresh_stats] Refreshing stats for {handle}");
        let stats = self.provider.fetch_stats(&handle).await?;

        account.problems = stats.problems;
        account.easy = stats.easy;
        account.medium = stats.medium;
        account.hard = stats.hard;
        account.streak = stats.streak;
        account.total_active_days = stats.total_active_days;
        account.ranking = stats.ranking;
        account.score = scoring::score_registration(stats.easy, stats.medium, stats.hard);
        account.level = scoring::level_registration(stats.problems);
        account.last_updated = Some(Utc::now().timestamp());

        self.store.update_account(&account)?;

        Ok(SyncResponse {
            message: "Stats refreshed successfully".to_string(),
            user: account.into(),
        })
    }

    /// Partial profile edit. The response carries the account's current
    /// rank, computed fresh with the leaderboard's tie-break rule.
    pub fn update_profile(
        &self,
        account_id: i64,
        update: ProfileUpdate,
    ) -> Result<Profile, ServiceError> {
        let mut account = self.load(account_id)?;

        if let Some(institution_name) = update.institution_name {
            validate::institution_name(institution_name.trim())?;
            account.institution_name = institution_name.trim().to_string();
        }
        if let Some(year) = update.year {
            validate::year(&year)?;
            account.year = year;
        }
        if let Some(education_level) = update.education_level {
            validate::education_level(&education_level)?;
            account.education_level = education_level;
        }

        self.store.update_account(&account)?;

        let rank = self
            .store
            .count_ranked_ahead(account.score, account.problems)?
            + 1;

        let mut profile = Profile::from(account);
        profile.rank = Some(rank);
        Ok(profile)
    }

    pub fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let mut account = self.load(account_id)?;

        if !auth::verify_password(current_password, &account.password_hash)? {
            return Err(ServiceError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        validate::password(new_password)?;
        account.password_hash = auth::hash_password(new_password)?;
        self.store.update_account(&account)?;

        log::info!("[change_password] Password changed for account {account_id}.");
        Ok(())
    }

    /// Top accounts with 1-based ranks assigned by sorted position.
    pub fn leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardRow>, ServiceError> {
        let rows = self
            .store
            .top_accounts(limit)?
            .into_iter()
            .enumerate()
            .map(|(index, account)| LeaderboardRow::new(index as u64 + 1, account))
            .collect();

        Ok(rows)
    }

    /// Rank of a single account: accounts strictly ahead of it under the
    /// leaderboard tie-break, plus one.
    pub fn rank_of(&self, account_id: i64) -> Result<u64, ServiceError> {
        let account = self.load(account_id)?;
        Ok(self
            .store
            .count_ranked_ahead(account.score, account.problems)?
            + 1)
    }

    fn load(&self, account_id: i64) -> Result<Account, ServiceError> {
        self.store
            .get_account(account_id)?
            .ok_or(ServiceError::NotFound)
    }
}

fn map_insert_conflict(err: rusqlite::Error) -> ServiceError {
    match db::unique_violation(&err).as_deref() {
        Some("accounts.email") => ServiceError::conflict(EMAIL_TAKEN),
        Some("accounts.username") => ServiceError::conflict(USERNAME_TAKEN),
        Some("accounts.leetcode_username") => ServiceError::Conflict {
            message: HANDLE_ALREADY_LINKED.to_string(),
            already_exists: true,
        },
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcapi::UpstreamError;
    use async_trait::async_trait;

    struct StubProvider(Result<LeetCodeStats, UpstreamError>);

    #[async_trait]
    impl StatsProvider for StubProvider {
        async fn fetch_stats(&self, _handle: &str) -> Result<LeetCodeStats, UpstreamError> {
            self.0.clone()
        }
    }

    fn test_app(name: &str, provider: StubProvider) -> App<StubProvider> {
        let path = std::env::temp_dir().join(format!(
            "leetboard-service-{}-{name}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = Store::open(path.to_string_lossy().to_string());
        store.initialize().unwrap();

        let config = Config {
            leetcode_api_base: "http://localhost:0".to_string(),
            database_path: path.to_string_lossy().to_string(),
            jwt_secret: "test-secret".to_string(),
            fetch_timeout_secs: 1,
        };

        App::new(config, store, provider)
    }

    fn sample_stats() -> LeetCodeStats {
        LeetCodeStats {
            problems: 17,
            easy: 10,
            medium: 5,
            hard: 2,
            ranking: 123456,
            streak: 4,
            total_active_days: 31,
        }
    }

    fn register_request(username: &str, email: &str, handle: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Passw0rd!".to_string(),
            leetcode_username: handle.to_string(),
            leetcode_data: sample_stats(),
            education_level: "Undergraduate".to_string(),
            institution_name: "State University".to_string(),
            year: "2".to_string(),
        }
    }

    /// An already-persisted-shape account for seeding the store directly.
    fn ranked_account(name: &str, score: u64, problems: u64) -> Account {
        Account {
            id: 0,
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "$2b$12$hash".to_string(),
            leetcode_username: Some(format!("{name}_lc")),
            leetcode_verified: true,
            avatar: "🎮".to_string(),
            education_level: "Other".to_string(),
            institution_name: "State University".to_string(),
            year: "1".to_string(),
            problems,
            easy: 0,
            medium: 0,
            hard: 0,
            score,
            level: 1,
            streak: 0,
            total_active_days: 0,
            ranking: 0,
            created_at: 1_700_000_000,
            last_synced: None,
            last_updated: None,
        }
    }

    #[test]
    fn register_derives_with_the_difficulty_formula() {
        let app = test_app("register-derive", StubProvider(Ok(sample_stats())));
        let auth = app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        // 10*10 + 5*15 + 2*20, and level floor(17/10)+1.
        assert_eq!(auth.user.score, 215);
        assert_eq!(auth.user.level, 2);
        assert!(auth.user.last_synced.is_none());
    }

    #[test]
    fn register_then_login_round_trip() {
        let app = test_app("login", StubProvider(Ok(sample_stats())));
        app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        let auth = app.login("Alice@Example.com", "Passw0rd!").unwrap();
        assert_eq!(auth.user.username, "alice");
        assert_eq!(app.authenticate(&auth.token).unwrap(), auth.user.id);

        let err = app.login("alice@example.com", "wrong-password").unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn duplicate_handle_conflicts_before_any_record_is_created() {
        let app = test_app("dup-handle", StubProvider(Ok(sample_stats())));
        app.register(register_request("alice", "alice@example.com", "shared")).unwrap();

        let err = app
            .register(register_request("bob", "bob@example.com", "shared"))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict { already_exists: true, .. }
        ));
        assert!(app.store.find_by_email("bob@example.com").unwrap().is_none());
    }

    #[tokio::test]
    async fn verify_rejects_an_already_claimed_handle() {
        let app = test_app("verify-claimed", StubProvider(Ok(sample_stats())));
        app.register(register_request("alice", "alice@example.com", "claimed")).unwrap();

        let err = app.verify_leetcode("claimed").await.unwrap_err();
        assert_eq!(err.status_code(), 409);

        let stats = app.verify_leetcode("fresh_handle").await.unwrap();
        assert_eq!(stats.problems, 17);
    }

    #[tokio::test]
    async fn sync_without_a_linked_handle_writes_nothing() {
        let app = test_app("no-handle", StubProvider(Ok(sample_stats())));

        let mut orphan = ranked_account("orphan", 30, 3);
        orphan.leetcode_username = None;
        orphan.leetcode_verified = false;
        orphan.id = app.store.insert_account(&orphan).unwrap();

        let err = app.sync_leetcode(orphan.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let reloaded = app.store.get_account(orphan.id).unwrap().unwrap();
        assert_eq!(reloaded.score, 30);
        assert_eq!(reloaded.last_synced, None);
    }

    #[tokio::test]
    async fn refresh_without_a_linked_handle_writes_nothing() {
        let app = test_app("refresh-no-handle", StubProvider(Ok(sample_stats())));

        let mut orphan = ranked_account("orphan", 30, 3);
        orphan.leetcode_username = None;
        orphan.leetcode_verified = false;
        orphan.id = app.store.insert_account(&orphan).unwrap();

        let err = app.refresh_stats(orphan.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let reloaded = app.store.get_account(orphan.id).unwrap().unwrap();
        assert_eq!(reloaded.score, 30);
        assert_eq!(reloaded.problems, 3);
        assert_eq!(reloaded.last_updated, None);
    }

    #[tokio::test]
    async fn provider_timeout_leaves_the_account_unchanged() {
        let app = test_app("timeout", StubProvider(Err(UpstreamError::TookTooLong)));
        let auth = app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        let err = app.sync_leetcode(auth.user.id).await.unwrap_err();
        assert!(err.to_string().contains("taking too long"));
        assert_eq!(err.status_code(), 400);

        let reloaded = app.store.get_account(auth.user.id).unwrap().unwrap();
        assert_eq!(reloaded.score, 215);
        assert_eq!(reloaded.last_synced, None);
        assert!(!reloaded.leetcode_verified);
    }

    #[tokio::test]
    async fn sync_applies_the_volume_formula() {
        let stats = LeetCodeStats {
            problems: 23,
            streak: 4,
            ..Default::default()
        };
        let app = test_app("sync-formula", StubProvider(Ok(stats)));
        let auth = app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        let synced = app.sync_leetcode(auth.user.id).await.unwrap();
        assert_eq!(synced.user.level, 3);
        assert_eq!(synced.user.score, 310);
        assert!(synced.user.last_synced.is_some());
        // Difficulty splits are untouched by the lightweight sync.
        assert_eq!(synced.user.easy, 10);
    }

    #[tokio::test]
    async fn refresh_applies_the_difficulty_formula() {
        let stats = LeetCodeStats {
            problems: 40,
            easy: 20,
            medium: 15,
            hard: 5,
            ranking: 99999,
            streak: 7,
            total_active_days: 60,
        };
        let app = test_app("refresh-formula", StubProvider(Ok(stats)));
        let auth = app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        let refreshed = app.refresh_stats(auth.user.id).await.unwrap();
        assert_eq!(refreshed.user.score, 20 * 10 + 15 * 15 + 5 * 20);
        assert_eq!(refreshed.user.level, 5);
        assert_eq!(refreshed.user.ranking, 99999);
        assert_eq!(refreshed.user.total_active_days, 60);
        assert!(refreshed.user.last_updated.is_some());
    }

    #[test]
    fn leaderboard_orders_by_score_then_problems() {
        let app = test_app("leaderboard", StubProvider(Ok(sample_stats())));

        for (name, score, problems) in [("five", 300, 5), ("ten", 300, 10), ("low", 150, 3)] {
            app.store
                .insert_account(&ranked_account(name, score, problems))
                .unwrap();
        }

        let rows = app.leaderboard(LEADERBOARD_LIMIT).unwrap();
        let order: Vec<(&str, u64)> = rows.iter().map(|r| (r.username.as_str(), r.rank)).collect();
        assert_eq!(order, [("ten", 1), ("five", 2), ("low", 3)]);

        // Sorted invariant over adjacent pairs.
        for pair in rows.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].problems >= pair[1].problems)
            );
        }

        // Projection never leaks credentials or emails.
        let serialized = serde_json::to_value(&rows).unwrap();
        for row in serialized.as_array().unwrap() {
            assert!(row.get("email").is_none());
            assert!(row.get("password").is_none());
            assert!(row.get("passwordHash").is_none());
        }
    }

    #[test]
    fn leaderboard_truncates_to_the_requested_limit() {
        let app = test_app("truncate", StubProvider(Ok(sample_stats())));

        for i in 0..6u64 {
            app.store
                .insert_account(&ranked_account(&format!("user{i}"), 100 * i, i))
                .unwrap();
        }

        let rows = app.leaderboard(3).unwrap();
        assert_eq!(rows.len(), 3);

        let ranked: Vec<(&str, u64)> = rows.iter().map(|r| (r.username.as_str(), r.rank)).collect();
        assert_eq!(ranked, [("user5", 1), ("user4", 2), ("user3", 3)]);
    }

    #[test]
    fn rank_of_agrees_with_the_leaderboard_tie_break() {
        let app = test_app("rank-of", StubProvider(Ok(sample_stats())));

        let mut ids = Vec::new();
        for (name, score, problems) in [("five", 300, 5), ("ten", 300, 10), ("low", 150, 3)] {
            let id = app
                .store
                .insert_account(&ranked_account(name, score, problems))
                .unwrap();
            ids.push(id);
        }

        assert_eq!(app.rank_of(ids[0]).unwrap(), 2);
        assert_eq!(app.rank_of(ids[1]).unwrap(), 1);
        assert_eq!(app.rank_of(ids[2]).unwrap(), 3);
    }

    #[test]
    fn update_profile_reports_a_fresh_rank() {
        let app = test_app("profile-update", StubProvider(Ok(sample_stats())));
        let auth = app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        let update = ProfileUpdate {
            institution_name: Some("Tech Institute".to_string()),
            year: None,
            education_level: Some("Graduate".to_string()),
        };
        let profile = app.update_profile(auth.user.id, update).unwrap();

        assert_eq!(profile.institution_name, "Tech Institute");
        assert_eq!(profile.education_level, "Graduate");
        assert_eq!(profile.year, "2");
        assert_eq!(profile.rank, Some(1));
    }

    #[test]
    fn change_password_requires_the_current_one() {
        let app = test_app("change-password", StubProvider(Ok(sample_stats())));
        let auth = app.register(register_request("alice", "alice@example.com", "alice_lc")).unwrap();

        let err = app
            .change_password(auth.user.id, "wrong", "NewPassw0rd")
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        app.change_password(auth.user.id, "Passw0rd!", "NewPassw0rd")
            .unwrap();
        assert!(app.login("alice@example.com", "NewPassw0rd").is_ok());
        assert_eq!(
            app.login("alice@example.com", "Passw0rd!").unwrap_err().status_code(),
            401
        );
    }

    #[test]
    fn me_on_an_unknown_account_is_not_found() {
        let app = test_app("me-missing", StubProvider(Ok(sample_stats())));
        assert!(matches!(app.me(9999).unwrap_err(), ServiceError::NotFound));
    }
}
