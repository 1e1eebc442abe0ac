pub const ACCOUNTS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS accounts (
        id                 INTEGER     PRIMARY KEY,

        username           TEXT        NOT NULL    UNIQUE,
        email              TEXT        NOT NULL    UNIQUE,
        password_hash      TEXT        NOT NULL,

        leetcode_username  TEXT                    UNIQUE,
        leetcode_verified  BOOLEAN     NOT NULL    DEFAULT 0,

        avatar             TEXT        NOT NULL,
        education_level    TEXT        NOT NULL,
        institution_name   TEXT        NOT NULL,
        year               TEXT        NOT NULL,

        problems           INTEGER     NOT NULL    DEFAULT 0,
        easy               INTEGER     NOT NULL    DEFAULT 0,
        medium             INTEGER     NOT NULL    DEFAULT 0,
        hard               INTEGER     NOT NULL    DEFAULT 0,
        score              INTEGER     NOT NULL    DEFAULT 0,
        level              INTEGER     NOT NULL    DEFAULT 1,
        streak             INTEGER     NOT NULL    DEFAULT 0,
        total_active_days  INTEGER     NOT NULL    DEFAULT 0,
        ranking            INTEGER     NOT NULL    DEFAULT 0,

        created_at         INTEGER     NOT NULL,
        last_synced        INTEGER,
        last_updated       INTEGER
    )";
