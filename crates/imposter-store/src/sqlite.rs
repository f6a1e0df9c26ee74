//! SQLite [`GameStore`] backend.
//!
//! One connection behind a `std::sync::Mutex`, opened in WAL mode with
//! foreign keys enabled. Every call runs on Tokio's blocking pool so a
//! slow fsync or a busy write lock never stalls a runtime worker. Multi-statement writes run inside a transaction;
//! the reveal is a single conditional `UPDATE ... WHERE viewed_at IS NULL`
//! so the database itself decides who saw the card first.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use imposter_protocol::{
    JoinCode, MessageId, PlayerId, PlayerToken, SessionId, SessionMode,
    SessionStatus, Slug, UserId,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{
    GameStore, JoinOutcome, MessageRow, NewMessage, NewPlayer, NewSession,
    PlayerRow, SessionRow, StartOutcome, StartPlan, StoreError, UniqueField,
    ViewOutcome,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sessions (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        slug            TEXT NOT NULL UNIQUE,
        join_code       TEXT UNIQUE,
        mode            TEXT NOT NULL,
        status          TEXT NOT NULL DEFAULT 'waiting',
        categories      TEXT NOT NULL DEFAULT '[]',
        word            TEXT NOT NULL DEFAULT '',
        imposter_count  INTEGER NOT NULL DEFAULT 0,
        moderator_id    INTEGER,
        created_at      TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS players (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id      INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        name            TEXT NOT NULL,
        token           TEXT NOT NULL UNIQUE,
        user_id         INTEGER,
        position        INTEGER NOT NULL,
        is_imposter     INTEGER NOT NULL DEFAULT 0,
        is_moderator    INTEGER NOT NULL DEFAULT 0,
        viewed_at       TEXT,
        UNIQUE(session_id, user_id)
    );

    CREATE INDEX IF NOT EXISTS idx_players_session
        ON players(session_id, position);

    CREATE TABLE IF NOT EXISTS messages (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id      INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        sender          TEXT NOT NULL,
        body            TEXT NOT NULL,
        created_at      TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_messages_session
        ON messages(session_id, id);
";

const SESSION_COLUMNS: &str = "id, slug, join_code, mode, status, categories, word, \
     imposter_count, moderator_id, created_at";

const PLAYER_COLUMNS: &str = "id, session_id, name, token, user_id, position, \
     is_imposter, is_moderator, viewed_at";

/// A [`GameStore`] backed by a SQLite database file.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn, &path.display().to_string())
    }

    /// Opens a private in-memory database. Handy for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, ":memory:")
    }

    fn init(conn: Connection, label: &str) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(database = %label, "sqlite store ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Backend(format!("connection lock poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "sqlite task failed");
            StoreError::Backend(format!("sqlite task failed: {e}"))
        })?
    }
}

impl GameStore for SqliteStore {
    async fn create_session(
        &self,
        session: NewSession,
        players: Vec<NewPlayer>,
    ) -> Result<(SessionRow, Vec<PlayerRow>), StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let created_at = Utc::now();
            let categories = encode_categories(&session.categories)?;

            tx.execute(
                "INSERT INTO sessions (slug, join_code, mode, status, categories, word, \
                 imposter_count, moderator_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session.slug.as_str(),
                    session.join_code.as_ref().map(JoinCode::as_str),
                    session.mode.as_str(),
                    session.status.as_str(),
                    categories,
                    session.word,
                    session.imposter_count as i64,
                    session.moderator.map(|u| u.0 as i64),
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(map_constraint)?;
            let id = SessionId(tx.last_insert_rowid() as u64);

            for (position, player) in players.iter().enumerate() {
                insert_player(&tx, id, position, player)?;
            }

            let row = query_session(&tx, id)?
                .ok_or(StoreError::SessionNotFound(id))?;
            let inserted = query_players(&tx, id)?;
            tx.commit()?;
            Ok((row, inserted))
        })
        .await
    }

    async fn session(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionRow>, StoreError> {
        self.with_conn(move |conn| query_session(conn, id)).await
    }

    async fn session_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<SessionRow>, StoreError> {
        let slug = slug.clone();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE slug = ?1");
            let raw = conn
                .query_row(&sql, [slug.as_str()], read_session)
                .optional()?;
            raw.map(RawSession::into_row).transpose()
        })
        .await
    }

    async fn session_by_code(
        &self,
        code: &JoinCode,
    ) -> Result<Option<SessionRow>, StoreError> {
        let code = code.clone();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE join_code = ?1");
            let raw = conn
                .query_row(&sql, [code.as_str()], read_session)
                .optional()?;
            raw.map(RawSession::into_row).transpose()
        })
        .await
    }

    async fn players(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<PlayerRow>, StoreError> {
        self.with_conn(move |conn| query_players(conn, session_id)).await
    }

    async fn player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<Option<PlayerRow>, StoreError> {
        self.with_conn(move |conn| query_player(conn, session_id, player_id)).await
    }

    async fn player_by_token(
        &self,
        session_id: SessionId,
        token: &PlayerToken,
    ) -> Result<Option<PlayerRow>, StoreError> {
        let token = token.clone();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE session_id = ?1 AND token = ?2"
            );
            let raw = conn
                .query_row(
                    &sql,
                    params![session_id.0 as i64, token.as_str()],
                    read_player,
                )
                .optional()?;
            raw.map(RawPlayer::into_row).transpose()
        })
        .await
    }

    async fn join_player(
        &self,
        session_id: SessionId,
        player: NewPlayer,
    ) -> Result<JoinOutcome, StoreError> {
        self.with_conn(move |conn| {
            // IMMEDIATE takes the write lock up front so the status check,
            // the position count, and the insert see one consistent state.
            let tx = conn.transaction_with_behavior(
                rusqlite::TransactionBehavior::Immediate,
            )?;

            let session = query_session(&tx, session_id)?
                .ok_or(StoreError::SessionNotFound(session_id))?;

            if let Some(user) = player.user {
                let seated: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM players WHERE session_id = ?1 AND user_id = ?2)",
                    params![session_id.0 as i64, user.0 as i64],
                    |row| row.get(0),
                )?;
                if seated {
                    return Ok(JoinOutcome::AlreadyJoined);
                }
            }
            if !session.status.is_joinable() {
                return Ok(JoinOutcome::NotWaiting);
            }

            let position: i64 = tx.query_row(
                "SELECT COUNT(*) FROM players WHERE session_id = ?1",
                [session_id.0 as i64],
                |row| row.get(0),
            )?;
            let id = insert_player(&tx, session_id, position as usize, &player)?;
            let row = query_player(&tx, session_id, id)?
                .ok_or_else(|| StoreError::Corrupt(format!("player {id} vanished")))?;
            tx.commit()?;
            Ok(JoinOutcome::Joined(row))
        })
        .await
    }

    async fn start_session(
        &self,
        session_id: SessionId,
        plan: StartPlan,
    ) -> Result<StartOutcome, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(
                rusqlite::TransactionBehavior::Immediate,
            )?;

            let session = query_session(&tx, session_id)?
                .ok_or(StoreError::SessionNotFound(session_id))?;
            if !session.status.can_transition_to(SessionStatus::Active) {
                return Ok(StartOutcome::NotWaiting);
            }

            let current: Vec<PlayerId> = query_players(&tx, session_id)?
                .into_iter()
                .filter(|p| !p.is_moderator)
                .map(|p| p.id)
                .collect();
            if current != plan.expected_roster {
                return Ok(StartOutcome::RosterChanged);
            }

            for id in &current {
                tx.execute(
                    "UPDATE players SET is_imposter = ?1 WHERE id = ?2",
                    params![plan.imposters.contains(id), id.0 as i64],
                )?;
            }

            tx.execute(
                "UPDATE sessions SET categories = ?1, word = ?2, imposter_count = ?3, \
                 status = ?4 WHERE id = ?5 AND status = ?6",
                params![
                    encode_categories(&plan.categories)?,
                    plan.word,
                    plan.imposter_count as i64,
                    SessionStatus::Active.as_str(),
                    session_id.0 as i64,
                    session.status.as_str(),
                ],
            )?;

            let row = query_session(&tx, session_id)?
                .ok_or(StoreError::SessionNotFound(session_id))?;
            tx.commit()?;
            Ok(StartOutcome::Started(row))
        })
        .await
    }

    async fn mark_viewed(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        at: DateTime<Utc>,
    ) -> Result<ViewOutcome, StoreError> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE players SET viewed_at = ?1 \
                 WHERE id = ?2 AND session_id = ?3 AND viewed_at IS NULL",
                params![at.to_rfc3339(), player_id.0 as i64, session_id.0 as i64],
            )?;

            let Some(row) = query_player(conn, session_id, player_id)? else {
                return Ok(ViewOutcome::PlayerMissing);
            };
            if changed == 1 {
                Ok(ViewOutcome::FirstView(row))
            } else {
                Ok(ViewOutcome::AlreadyViewed(row))
            }
        })
        .await
    }

    async fn append_message(
        &self,
        message: NewMessage,
    ) -> Result<MessageRow, StoreError> {
        self.with_conn(move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO messages (session_id, sender, body, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    message.session_id.0 as i64,
                    message.sender,
                    message.body,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => {
                    StoreError::SessionNotFound(message.session_id)
                }
                _ => StoreError::from(e),
            })?;

            Ok(MessageRow {
                id: MessageId(conn.last_insert_rowid() as u64),
                session_id: message.session_id,
                sender: message.sender,
                body: message.body,
                created_at,
            })
        })
        .await
    }

    async fn recent_messages(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> Result<Vec<MessageRow>, StoreError> {
        self.with_conn(move |conn| {
            // Newest `limit` rows, then flipped back to oldest first.
            let mut stmt = conn.prepare(
                "SELECT id, session_id, sender, body, created_at FROM (
                     SELECT * FROM messages WHERE session_id = ?1
                     ORDER BY id DESC LIMIT ?2
                 ) ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map(params![session_id.0 as i64, limit as i64], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, session, sender, body, created_at)| {
                    Ok(MessageRow {
                        id: MessageId(id as u64),
                        session_id: SessionId(session as u64),
                        sender,
                        body,
                        created_at: parse_time(&created_at)?,
                    })
                })
                .collect()
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Column values as SQLite hands them back, before domain validation.
struct RawSession {
    id: i64,
    slug: String,
    join_code: Option<String>,
    mode: String,
    status: String,
    categories: String,
    word: String,
    imposter_count: i64,
    moderator_id: Option<i64>,
    created_at: String,
}

impl RawSession {
    fn into_row(self) -> Result<SessionRow, StoreError> {
        Ok(SessionRow {
            id: SessionId(self.id as u64),
            slug: Slug::new(self.slug),
            join_code: self.join_code.map(JoinCode::from_generated),
            mode: SessionMode::from_str_opt(&self.mode)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown mode {:?}", self.mode)))?,
            status: SessionStatus::from_str_opt(&self.status)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown status {:?}", self.status)))?,
            categories: serde_json::from_str(&self.categories)
                .map_err(|e| StoreError::Corrupt(format!("categories: {e}")))?,
            word: self.word,
            imposter_count: self.imposter_count as usize,
            moderator: self.moderator_id.map(|id| UserId(id as u64)),
            created_at: parse_time(&self.created_at)?,
        })
    }
}

struct RawPlayer {
    id: i64,
    session_id: i64,
    name: String,
    token: String,
    user_id: Option<i64>,
    position: i64,
    is_imposter: bool,
    is_moderator: bool,
    viewed_at: Option<String>,
}

impl RawPlayer {
    fn into_row(self) -> Result<PlayerRow, StoreError> {
        Ok(PlayerRow {
            id: PlayerId(self.id as u64),
            session_id: SessionId(self.session_id as u64),
            name: self.name,
            token: PlayerToken::new(self.token),
            user: self.user_id.map(|id| UserId(id as u64)),
            position: self.position as usize,
            is_imposter: self.is_imposter,
            is_moderator: self.is_moderator,
            viewed_at: self.viewed_at.as_deref().map(parse_time).transpose()?,
        })
    }
}

fn read_session(row: &Row<'_>) -> rusqlite::Result<RawSession> {
    Ok(RawSession {
        id: row.get(0)?,
        slug: row.get(1)?,
        join_code: row.get(2)?,
        mode: row.get(3)?,
        status: row.get(4)?,
        categories: row.get(5)?,
        word: row.get(6)?,
        imposter_count: row.get(7)?,
        moderator_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn read_player(row: &Row<'_>) -> rusqlite::Result<RawPlayer> {
    Ok(RawPlayer {
        id: row.get(0)?,
        session_id: row.get(1)?,
        name: row.get(2)?,
        token: row.get(3)?,
        user_id: row.get(4)?,
        position: row.get(5)?,
        is_imposter: row.get(6)?,
        is_moderator: row.get(7)?,
        viewed_at: row.get(8)?,
    })
}

fn query_session(
    conn: &Connection,
    id: SessionId,
) -> Result<Option<SessionRow>, StoreError> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
    let raw = conn
        .query_row(&sql, [id.0 as i64], read_session)
        .optional()?;
    raw.map(RawSession::into_row).transpose()
}

fn query_players(
    conn: &Connection,
    session_id: SessionId,
) -> Result<Vec<PlayerRow>, StoreError> {
    let sql = format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE session_id = ?1 ORDER BY position"
    );
    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
        .query_map([session_id.0 as i64], read_player)?
        .collect::<Result<Vec<_>, _>>()?;
    raws.into_iter().map(RawPlayer::into_row).collect()
}

fn query_player(
    conn: &Connection,
    session_id: SessionId,
    player_id: PlayerId,
) -> Result<Option<PlayerRow>, StoreError> {
    let sql = format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE session_id = ?1 AND id = ?2"
    );
    let raw = conn
        .query_row(
            &sql,
            params![session_id.0 as i64, player_id.0 as i64],
            read_player,
        )
        .optional()?;
    raw.map(RawPlayer::into_row).transpose()
}

fn insert_player(
    conn: &Connection,
    session_id: SessionId,
    position: usize,
    player: &NewPlayer,
) -> Result<PlayerId, StoreError> {
    conn.execute(
        "INSERT INTO players (session_id, name, token, user_id, position, \
         is_imposter, is_moderator) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            session_id.0 as i64,
            player.name,
            player.token.as_str(),
            player.user.map(|u| u.0 as i64),
            position as i64,
            player.is_imposter,
            player.is_moderator,
        ],
    )
    .map_err(map_constraint)?;
    Ok(PlayerId(conn.last_insert_rowid() as u64))
}

/// Turns a UNIQUE violation into the matching [`StoreError::Conflict`].
fn map_constraint(err: rusqlite::Error) -> StoreError {
    if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
        let message = err.to_string();
        if message.contains("sessions.slug") {
            return StoreError::Conflict(UniqueField::Slug);
        }
        if message.contains("sessions.join_code") {
            return StoreError::Conflict(UniqueField::JoinCode);
        }
        if message.contains("players.token") {
            return StoreError::Conflict(UniqueField::Token);
        }
        if message.contains("players.session_id") {
            return StoreError::Conflict(UniqueField::Membership);
        }
    }
    StoreError::from(err)
}

fn encode_categories(categories: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(categories)
        .map_err(|e| StoreError::Corrupt(format!("categories: {e}")))
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("timestamp {value:?}: {e}")))
}
