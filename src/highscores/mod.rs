//! Shared high score store
//!
//! One SQLite database holds users, games and score rows for every game in
//! the suite. The store owns a private current-thread runtime and exposes
//! blocking calls so the frame loop never touches async code.

pub mod entity;

use std::fs;
use std::path::Path;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use tokio::runtime::Runtime;

use self::entity::{games, scores, users};
use crate::error::Result;
use crate::sim::{ScoreEntry, ScoreOrder};

/// Outcome of a score submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Score beat the previous best (or was the first)
    pub new_record: bool,
    /// Best after the insert
    pub best: Option<i64>,
    /// Top entries, board suffix already stripped
    pub top: Vec<ScoreEntry>,
}

/// Blocking handle to the leaderboard database
pub struct ScoreStore {
    rt: Runtime,
    db: DatabaseConnection,
    url: String,
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStore").field("url", &self.url).finish()
    }
}

impl ScoreStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open_url(&format!("sqlite://{}?mode=rwc", path.display()))
    }

    /// Open a database by connection URL (`sqlite::memory:` in tests)
    pub fn open_url(url: &str) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let db = rt.block_on(connect(url))?;
        log::info!("Score store opened at {url}");
        Ok(Self {
            rt,
            db,
            url: url.to_string(),
        })
    }

    /// Ping the connection and reconnect once if it dropped
    pub fn ensure_connected(&mut self) -> Result<()> {
        if self.rt.block_on(self.db.ping()).is_ok() {
            return Ok(());
        }
        log::warn!("Score store connection lost, reconnecting");
        self.db = self.rt.block_on(connect(&self.url))?;
        Ok(())
    }

    pub fn find_or_create_user(&self, username: &str) -> Result<i32> {
        Ok(self.rt.block_on(find_or_create_user(&self.db, username))?)
    }

    pub fn find_or_create_game(&self, game_name: &str) -> Result<i32> {
        Ok(self.rt.block_on(find_or_create_game(&self.db, game_name))?)
    }

    pub fn insert_score(&self, user_id: i32, game_id: i32, score: i64) -> Result<()> {
        Ok(self.rt.block_on(insert_score(&self.db, user_id, game_id, score))?)
    }

    /// Best entries for a game, optionally limited to one board
    pub fn top_scores(
        &self,
        game_id: i32,
        limit: u64,
        order: ScoreOrder,
        board: Option<&str>,
    ) -> Result<Vec<ScoreEntry>> {
        Ok(self
            .rt
            .block_on(top_scores(&self.db, game_id, limit, order, board))?)
    }

    /// MAX or MIN of a user's scores, depending on the order
    pub fn best_score(&self, user_id: i32, game_id: i32, order: ScoreOrder) -> Result<Option<i64>> {
        Ok(self
            .rt
            .block_on(best_score(&self.db, user_id, game_id, order))?)
    }

    /// True when the user has no score yet or `score` strictly beats the best
    pub fn is_new_record(
        &self,
        user_id: i32,
        game_id: i32,
        score: i64,
        order: ScoreOrder,
    ) -> Result<bool> {
        Ok(match self.best_score(user_id, game_id, order)? {
            Some(best) => order.beats(score, best),
            None => true,
        })
    }

    /// Record a finished run and read back the leaderboard
    ///
    /// The record check runs before the insert so a score never competes
    /// against itself.
    pub fn submit(
        &mut self,
        username: &str,
        game_name: &str,
        score: i64,
        order: ScoreOrder,
        board: Option<&str>,
    ) -> Result<SubmitOutcome> {
        self.ensure_connected()?;
        let user_id = self.find_or_create_user(username)?;
        let game_id = self.find_or_create_game(game_name)?;

        let new_record = self.is_new_record(user_id, game_id, score, order)?;
        self.insert_score(user_id, game_id, score)?;
        let best = self.best_score(user_id, game_id, order)?;
        let top = self.top_scores(game_id, crate::consts::TOP_SCORES, order, board)?;

        log::debug!("Saved {score} for {username} in {game_name} (record: {new_record})");
        Ok(SubmitOutcome {
            new_record,
            best,
            top,
        })
    }

    /// Top list by game name, for records screens
    pub fn leaderboard(
        &mut self,
        game_name: &str,
        order: ScoreOrder,
        board: Option<&str>,
    ) -> Result<Vec<ScoreEntry>> {
        self.ensure_connected()?;
        let game_id = self.find_or_create_game(game_name)?;
        self.top_scores(game_id, crate::consts::TOP_SCORES, order, board)
    }
}

async fn connect(url: &str) -> std::result::Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    create_tables(&db).await?;
    Ok(db)
}

async fn create_tables(db: &DatabaseConnection) -> std::result::Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statements = [
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(games::Entity),
        schema.create_table_from_entity(scores::Entity),
    ];
    for stmt in &mut statements {
        stmt.if_not_exists();
        db.execute(backend.build(&*stmt)).await?;
    }
    Ok(())
}

async fn find_or_create_user(
    db: &DatabaseConnection,
    username: &str,
) -> std::result::Result<i32, DbErr> {
    if let Some(user) = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
    {
        return Ok(user.id);
    }
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    log::info!("Created user {username}");
    Ok(user.id)
}

async fn find_or_create_game(
    db: &DatabaseConnection,
    game_name: &str,
) -> std::result::Result<i32, DbErr> {
    if let Some(game) = games::Entity::find()
        .filter(games::Column::GameName.eq(game_name))
        .one(db)
        .await?
    {
        return Ok(game.id);
    }
    let game = games::ActiveModel {
        game_name: Set(game_name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    log::info!("Registered game {game_name}");
    Ok(game.id)
}

async fn insert_score(
    db: &DatabaseConnection,
    user_id: i32,
    game_id: i32,
    score: i64,
) -> std::result::Result<(), DbErr> {
    scores::ActiveModel {
        user_id: Set(user_id),
        game_id: Set(game_id),
        score: Set(score),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn top_scores(
    db: &DatabaseConnection,
    game_id: i32,
    limit: u64,
    order: ScoreOrder,
    board: Option<&str>,
) -> std::result::Result<Vec<ScoreEntry>, DbErr> {
    let direction = match order {
        ScoreOrder::HigherIsBetter => Order::Desc,
        ScoreOrder::LowerIsBetter => Order::Asc,
    };
    let suffix = board.map(|b| format!("-{b}"));

    let mut query = scores::Entity::find()
        .find_also_related(users::Entity)
        .filter(scores::Column::GameId.eq(game_id));
    if let Some(suffix) = &suffix {
        query = query.filter(users::Column::Username.like(format!("%{suffix}")));
    }
    let rows = query
        .order_by(scores::Column::Score, direction)
        .order_by_asc(scores::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(score, user)| {
            let username = user.map(|u| u.username).unwrap_or_default();
            let name = match &suffix {
                Some(suffix) => username
                    .strip_suffix(suffix.as_str())
                    .unwrap_or(&username)
                    .to_string(),
                None => username,
            };
            ScoreEntry {
                name,
                score: score.score,
                date: local_date(&score.created_at),
            }
        })
        .collect())
}

async fn best_score(
    db: &DatabaseConnection,
    user_id: i32,
    game_id: i32,
    order: ScoreOrder,
) -> std::result::Result<Option<i64>, DbErr> {
    let aggregate = match order {
        ScoreOrder::HigherIsBetter => scores::Column::Score.max(),
        ScoreOrder::LowerIsBetter => scores::Column::Score.min(),
    };
    let best = scores::Entity::find()
        .select_only()
        .column_as(aggregate, "best")
        .filter(scores::Column::UserId.eq(user_id))
        .filter(scores::Column::GameId.eq(game_id))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;
    Ok(best.flatten())
}

/// RFC 3339 timestamp to a local YYYY-MM-DD date
fn local_date(stamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(stamp) {
        Ok(t) => t
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d")
            .to_string(),
        Err(_) => stamp.chars().take(10).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ScoreStore {
        ScoreStore::open_url("sqlite::memory:").unwrap()
    }

    #[test]
    fn test_find_or_create_is_idempotent() {
        let store = store();
        let a = store.find_or_create_user("ALX").unwrap();
        let b = store.find_or_create_user("ALX").unwrap();
        let c = store.find_or_create_user("BOB").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let g = store.find_or_create_game("Snake").unwrap();
        assert_eq!(store.find_or_create_game("Snake").unwrap(), g);
    }

    #[test]
    fn test_best_score_follows_order() {
        let store = store();
        let user = store.find_or_create_user("ALX").unwrap();
        let game = store.find_or_create_game("Racing Game").unwrap();
        assert_eq!(store.best_score(user, game, ScoreOrder::HigherIsBetter).unwrap(), None);

        for score in [90, 75, 120] {
            store.insert_score(user, game, score).unwrap();
        }
        assert_eq!(
            store.best_score(user, game, ScoreOrder::HigherIsBetter).unwrap(),
            Some(120)
        );
        assert_eq!(
            store.best_score(user, game, ScoreOrder::LowerIsBetter).unwrap(),
            Some(75)
        );
    }

    #[test]
    fn test_top_scores_ordering() {
        let store = store();
        let game = store.find_or_create_game("Flappy Bird").unwrap();
        for (name, score) in [("AAA", 5), ("BBB", 12), ("CCC", 8)] {
            let user = store.find_or_create_user(name).unwrap();
            store.insert_score(user, game, score).unwrap();
        }

        let high = store
            .top_scores(game, 10, ScoreOrder::HigherIsBetter, None)
            .unwrap();
        let scores: Vec<i64> = high.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![12, 8, 5]);
        assert_eq!(high[0].name, "BBB");
        assert_eq!(high[0].date.len(), 10);

        let low = store
            .top_scores(game, 2, ScoreOrder::LowerIsBetter, None)
            .unwrap();
        let scores: Vec<i64> = low.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![5, 8]);
    }

    #[test]
    fn test_board_filter_strips_suffix() {
        let store = store();
        let game = store.find_or_create_game("Memory Game").unwrap();
        for (name, score) in [("ANA-Level1", 30), ("ANA-Level2", 50), ("BEN-Level1", 25)] {
            let user = store.find_or_create_user(name).unwrap();
            store.insert_score(user, game, score).unwrap();
        }

        let top = store
            .top_scores(game, 10, ScoreOrder::LowerIsBetter, Some("Level1"))
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "BEN");
        assert_eq!(top[1].name, "ANA");
    }

    #[test]
    fn test_is_new_record() {
        let store = store();
        let user = store.find_or_create_user("ALX").unwrap();
        let game = store.find_or_create_game("Dino Runner").unwrap();
        let order = ScoreOrder::HigherIsBetter;
        assert!(store.is_new_record(user, game, 0, order).unwrap());

        store.insert_score(user, game, 100).unwrap();
        assert!(!store.is_new_record(user, game, 100, order).unwrap());
        assert!(store.is_new_record(user, game, 101, order).unwrap());
    }

    #[test]
    fn test_submit_checks_record_before_insert() {
        let mut store = store();
        let first = store
            .submit("ALX", "Space Invaders", 500, ScoreOrder::HigherIsBetter, None)
            .unwrap();
        assert!(first.new_record);
        assert_eq!(first.best, Some(500));
        assert_eq!(first.top.len(), 1);

        let second = store
            .submit("ALX", "Space Invaders", 300, ScoreOrder::HigherIsBetter, None)
            .unwrap();
        assert!(!second.new_record);
        assert_eq!(second.best, Some(500));
        assert_eq!(second.top.len(), 2);
    }

    #[test]
    fn test_submit_creates_missing_game() {
        let mut store = store();
        let outcome = store
            .submit("ZED-track2", "Racing Game", 95, ScoreOrder::LowerIsBetter, Some("track2"))
            .unwrap();
        assert_eq!(outcome.top[0].name, "ZED");
        let board = store
            .leaderboard("Racing Game", ScoreOrder::LowerIsBetter, Some("track1"))
            .unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.db");
        {
            let mut store = ScoreStore::open(&path).unwrap();
            store
                .submit("ALX", "Snake", 40, ScoreOrder::HigherIsBetter, None)
                .unwrap();
        }
        let mut store = ScoreStore::open(&path).unwrap();
        let top = store
            .leaderboard("Snake", ScoreOrder::HigherIsBetter, None)
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].score, 40);
    }

    #[test]
    fn test_ping_keeps_connection() {
        let mut store = store();
        store.find_or_create_user("ALX").unwrap();
        store.ensure_connected().unwrap();
        assert_eq!(store.find_or_create_user("ALX").unwrap(), 1);
    }
}
