use crate::db::{DbResult, Store};
use crate::models::Account;

impl<'a> TryFrom<&'a rusqlite::Row<'a>> for Account {
    type Error = rusqlite::Error;

    fn try_from(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            leetcode_username: row.get("leetcode_username")?,
            leetcode_verified: row.get("leetcode_verified")?,
            avatar: row.get("avatar")?,
            education_level: row.get("education_level")?,
            institution_name: row.get("institution_name")?,
            year: row.get("year")?,
            problems: row.get("problems")?,
            easy: row.get("easy")?,
            medium: row.get("medium")?,
            hard: row.get("hard")?,
            score: row.get("score")?,
            level: row.get("level")?,
            streak: row.get("streak")?,
            total_active_days: row.get("total_active_days")?,
            ranking: row.get("ranking")?,
            created_at: row.get("created_at")?,
            last_synced: row.get("last_synced")?,
            last_updated: row.get("last_updated")?,
        })
    }
}

impl Store {
    /// Inserts a new account and returns its id. A UNIQUE collision on
    /// username, email, or handle surfaces as the raw constraint error so
    /// the caller can name the offending field.
    pub fn insert_account(&self, account: &Account) -> DbResult<i64> {
        log::trace!("[insert_account] Inserting account {}...", account.username);
        let connection = self.connect()?;

        connection.prepare(
            "INSERT INTO accounts ( username,  email,  password_hash,
                                    leetcode_username,  leetcode_verified,
                                    avatar,  education_level,  institution_name,  year,
                                    problems,  easy,  medium,  hard,  score,  level,
                                    streak,  total_active_days,  ranking,
                                    created_at,  last_synced,  last_updated)
             VALUES               (:username, :email, :password_hash,
                                   :leetcode_username, :leetcode_verified,
                                   :avatar, :education_level, :institution_name, :year,
                                   :problems, :easy, :medium, :hard, :score, :level,
                                   :streak, :total_active_days, :ranking,
                                   :created_at, :last_synced, :last_updated)"
        )?.execute(rusqlite::named_params! {
            ":username":          account.username,
            ":email":             account.email,
            ":password_hash":     account.password_hash,
            ":leetcode_username": account.leetcode_username,
            ":leetcode_verified": account.leetcode_verified,
            ":avatar":            account.avatar,
            ":education_level":   account.education_level,
            ":institution_name":  account.institution_name,
            ":year":              account.year,
            ":problems":          account.problems,
            ":easy":              account.easy,
            ":medium":            account.medium,
            ":hard":              account.hard,
            ":score":             account.score,
            ":level":             account.level,
            ":streak":            account.streak,
            ":total_active_days": account.total_active_days,
            ":ranking":           account.ranking,
            ":created_at":        account.created_at,
            ":last_synced":       account.last_synced,
            ":last_updated":      account.last_updated,
        })?;

        let id = connection.last_insert_rowid();
        log::info!("[insert_account] Account {} created with id {id}.", account.username);
        Ok(id)
    }

    /// Returns the account with this id, if it exists.
    pub fn get_account(&self, id: i64) -> DbResult<Option<Account>> {
        self.connect()?
            .prepare("SELECT * FROM accounts WHERE id = :id")?
            .query(rusqlite::named_params! { ":id": id })?
            .next()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Returns the account registered under this email, if any.
    pub fn find_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        self.connect()?
            .prepare("SELECT * FROM accounts WHERE email = :email")?
            .query(rusqlite::named_params! { ":email": email })?
            .next()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Returns the account registered under this username, if any.
    pub fn find_by_username(&self, username: &str) -> DbResult<Option<Account>> {
        self.connect()?
            .prepare("SELECT * FROM accounts WHERE username = :username")?
            .query(rusqlite::named_params! { ":username": username })?
            .next()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Whether any account has already linked this LeetCode handle.
    pub fn handle_linked(&self, handle: &str) -> DbResult<bool> {
        self.connect()?
            .prepare("SELECT 1 FROM accounts WHERE leetcode_username = :handle")?
            .exists(rusqlite::named_params! { ":handle": handle })
    }

    /// Overwrites every mutable field of an existing account in one write.
    /// Identity (id, username, email, created_at) never changes.
    pub fn update_account(&self, account: &Account) -> DbResult<()> {
        log::trace!("[update_account] Updating account {}...", account.id);

        self.connect()?.prepare(
            "UPDATE accounts SET
                password_hash     = :password_hash,
                leetcode_username = :leetcode_username,
                leetcode_verified = :leetcode_verified,
                avatar            = :avatar,
                education_level   = :education_level,
                institution_name  = :institution_name,
                year              = :year,
                problems          = :problems,
                easy              = :easy,
                medium            = :medium,
                hard              = :hard,
                score             = :score,
                level             = :level,
                streak            = :streak,
                total_active_days = :total_active_days,
                ranking           = :ranking,
                last_synced       = :last_synced,
                last_updated      = :last_updated
             WHERE id = :id"
        )?.execute(rusqlite::named_params! {
            ":id":                account.id,
            ":password_hash":     account.password_hash,
            ":leetcode_username": account.leetcode_username,
            ":leetcode_verified": account.leetcode_verified,
            ":avatar":            account.avatar,
            ":education_level":   account.education_level,
            ":institution_name":  account.institution_name,
            ":year":              account.year,
            ":problems":          account.problems,
            ":easy":              account.easy,
            ":medium":            account.medium,
            ":hard":              account.hard,
            ":score":             account.score,
            ":level":             account.level,
            ":streak":            account.streak,
            ":total_active_days": account.total_active_days,
            ":ranking":           account.ranking,
            ":last_synced":       account.last_synced,
            ":last_updated":      account.last_updated,
        })?;

        Ok(())
    }

    /// Top accounts ordered by (score desc, problems desc). Any further tie
    /// falls back to storage iteration order.
    pub fn top_accounts(&self, limit: u64) -> DbResult<Vec<Account>> {
        log::trace!("[top_accounts] Querying top {limit} accounts...");
        let connection = self.connect()?;

        let mut stmt = connection.prepare(
            "SELECT * FROM accounts
             ORDER BY score DESC, problems DESC
             LIMIT :limit",
        )?;

        let accounts = stmt
            .query_map(rusqlite::named_params! { ":limit": limit }, |row| {
                Account::try_from(row)
            })?
            .collect::<Result<Vec<Account>, _>>()?;

        Ok(accounts)
    }

    /// Number of accounts strictly ahead of (score, problems) under the
    /// leaderboard's tie-break rule.
    pub fn count_ranked_ahead(&self, score: u64, problems: u64) -> DbResult<u64> {
        self.connect()?
            .prepare(
                "SELECT COUNT(*) FROM accounts
                 WHERE score > :score
                    OR (score = :score AND problems > :problems)",
            )?
            .query_row(
                rusqlite::named_params! { ":score": score, ":problems": problems },
                |row| row.get(0),
            )
    }
}
