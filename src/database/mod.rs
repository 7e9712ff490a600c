pub mod models;


use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::embed;

pub use models::*;

/// Shared column list for video queries. The category ids are aggregated
/// into a JSON array so one row carries the full many-to-many set.
const VIDEO_SELECT: &str = "\
    SELECT v.id, v.title, v.description, v.thumbnail, v.embed_url,
           v.expert_id, e.name AS expert_name, v.trail_id, v.views, v.created_at,
           (SELECT json_group_array(vc.category_id) FROM video_categories vc
            WHERE vc.video_id = v.id) AS category_ids
    FROM videos v
    LEFT JOIN experts e ON e.id = v.expert_id";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // Enable WAL mode for concurrent reads
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            PRAGMA cache_size=10000;
            PRAGMA temp_store=MEMORY;
        ",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        // Initialize schema
        db.init_schema()?;

        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS experts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                image TEXT,
                bio TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS trails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                thumbnail TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                thumbnail TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                thumbnail TEXT,
                embed_url TEXT NOT NULL,
                expert_id INTEGER,
                trail_id INTEGER,
                views INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (expert_id) REFERENCES experts(id) ON DELETE SET NULL,
                FOREIGN KEY (trail_id) REFERENCES trails(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_videos_expert ON videos(expert_id);
            CREATE INDEX IF NOT EXISTS idx_videos_trail ON videos(trail_id);
            CREATE INDEX IF NOT EXISTS idx_videos_created ON videos(created_at DESC);

            -- Many-to-many link between videos and categories
            CREATE TABLE IF NOT EXISTS video_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                video_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (video_id) REFERENCES videos(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE,
                UNIQUE(video_id, category_id)
            );

            CREATE INDEX IF NOT EXISTS idx_video_categories_video ON video_categories(video_id);
            CREATE INDEX IF NOT EXISTS idx_video_categories_category ON video_categories(category_id);

            -- Identity rows only; authentication lives outside this crate
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- One rating per (user, video); re-rating overwrites in place
            CREATE TABLE IF NOT EXISTS video_ratings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                video_id INTEGER NOT NULL,
                rate INTEGER NOT NULL CHECK (rate BETWEEN 1 AND 5),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (video_id) REFERENCES videos(id) ON DELETE CASCADE,
                UNIQUE(user_id, video_id)
            );

            CREATE INDEX IF NOT EXISTS idx_video_ratings_user ON video_ratings(user_id);
            CREATE INDEX IF NOT EXISTS idx_video_ratings_video ON video_ratings(video_id);

            -- Portal settings (key-value store)
            CREATE TABLE IF NOT EXISTS portal_settings (
                key TEXT PRIMARY KEY,
                value TEXT,
                updated_at TEXT DEFAULT (datetime('now'))
            );

            -- Insert default settings
            INSERT OR IGNORE INTO portal_settings (key, value) VALUES
                ('featured_limit', '6'),
                ('recent_limit', '8'),
                ('sidebar_limit', '5');
        "#,
        )?;

        Ok(())
    }

    fn video_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Video> {
        let category_ids: String = row.get(10)?;
        Ok(Video {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            thumbnail: row.get(3)?,
            embed_url: row.get(4)?,
            expert_id: row.get(5)?,
            expert_name: row.get(6)?,
            trail_id: row.get(7)?,
            category_ids: serde_json::from_str(&category_ids).unwrap_or_default(),
            views: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    // =========================================================================
    // Expert queries
    // =========================================================================

    pub fn create_expert(
        &self,
        name: &str,
        role: &str,
        image: Option<&str>,
        bio: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO experts (name, role, image, bio, created_at) VALUES (?, ?, ?, ?, ?)",
            params![name, role, image, bio, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_expert(
        &self,
        id: i64,
        name: &str,
        role: &str,
        image: Option<&str>,
        bio: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE experts SET name = ?, role = ?, image = ?, bio = ? WHERE id = ?",
            params![name, role, image, bio, id],
        )?;
        Ok(())
    }

    pub fn delete_expert(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM experts WHERE id = ?", params![id])?;
        Ok(())
    }

    pub fn get_expert(&self, id: i64) -> Result<Option<Expert>> {
        let conn = self.conn.lock().unwrap();
        let expert = conn
            .query_row(
                "SELECT e.id, e.name, e.role, e.image, e.bio, e.created_at,
                        (SELECT COUNT(*) FROM videos v WHERE v.expert_id = e.id) AS video_count
                 FROM experts e WHERE e.id = ?",
                params![id],
                Self::expert_from_row,
            )
            .optional()?;
        Ok(expert)
    }

    /// All experts, newest first, each with its owned-video count.
    pub fn get_experts(&self) -> Result<Vec<Expert>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT e.id, e.name, e.role, e.image, e.bio, e.created_at,
                    COUNT(v.id) AS video_count
             FROM experts e
             LEFT JOIN videos v ON v.expert_id = e.id
             GROUP BY e.id
             ORDER BY e.created_at DESC, e.id DESC",
        )?;
        let experts = stmt
            .query_map([], Self::expert_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(experts)
    }

    pub fn random_experts(&self, limit: i64) -> Result<Vec<Expert>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT e.id, e.name, e.role, e.image, e.bio, e.created_at,
                    (SELECT COUNT(*) FROM videos v WHERE v.expert_id = e.id) AS video_count
             FROM experts e ORDER BY RANDOM() LIMIT ?",
        )?;
        let experts = stmt
            .query_map(params![limit], Self::expert_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(experts)
    }

    fn expert_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expert> {
        Ok(Expert {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            image: row.get(3)?,
            bio: row.get(4)?,
            created_at: row.get(5)?,
            video_count: row.get(6)?,
        })
    }

    // =========================================================================
    // Trail queries
    // =========================================================================

    pub fn create_trail(
        &self,
        name: &str,
        description: Option<&str>,
        thumbnail: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO trails (name, description, thumbnail, created_at) VALUES (?, ?, ?, ?)",
            params![name, description, thumbnail, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_trail(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
        thumbnail: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE trails SET name = ?, description = ?, thumbnail = ? WHERE id = ?",
            params![name, description, thumbnail, id],
        )?;
        Ok(())
    }

    pub fn delete_trail(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM trails WHERE id = ?", params![id])?;
        Ok(())
    }

    pub fn get_trail(&self, id: i64) -> Result<Option<Trail>> {
        let conn = self.conn.lock().unwrap();
        let trail = conn
            .query_row(
                "SELECT t.id, t.name, t.description, t.thumbnail, t.created_at,
                        (SELECT COUNT(*) FROM videos v WHERE v.trail_id = t.id) AS video_count
                 FROM trails t WHERE t.id = ?",
                params![id],
                Self::trail_from_row,
            )
            .optional()?;
        Ok(trail)
    }

    pub fn get_trails(&self) -> Result<Vec<Trail>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.description, t.thumbnail, t.created_at,
                    COUNT(v.id) AS video_count
             FROM trails t
             LEFT JOIN videos v ON v.trail_id = t.id
             GROUP BY t.id
             ORDER BY t.created_at DESC, t.id DESC",
        )?;
        let trails = stmt
            .query_map([], Self::trail_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trails)
    }

    pub fn random_trails(&self, limit: i64) -> Result<Vec<Trail>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.description, t.thumbnail, t.created_at,
                    (SELECT COUNT(*) FROM videos v WHERE v.trail_id = t.id) AS video_count
             FROM trails t ORDER BY RANDOM() LIMIT ?",
        )?;
        let trails = stmt
            .query_map(params![limit], Self::trail_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trails)
    }

    fn trail_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trail> {
        Ok(Trail {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            thumbnail: row.get(3)?,
            created_at: row.get(4)?,
            video_count: row.get(5)?,
        })
    }

    // =========================================================================
    // Category queries
    // =========================================================================

    pub fn create_category(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
        thumbnail: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO categories (name, slug, description, thumbnail, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![name, slug, description, thumbnail, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_category(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        description: Option<&str>,
        thumbnail: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE categories SET name = ?, slug = ?, description = ?, thumbnail = ? WHERE id = ?",
            params![name, slug, description, thumbnail, id],
        )?;
        Ok(())
    }

    pub fn delete_category(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        Ok(())
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        let category = conn
            .query_row(
                "SELECT c.id, c.name, c.slug, c.description, c.thumbnail, c.created_at,
                        (SELECT COUNT(*) FROM video_categories vc WHERE vc.category_id = c.id) AS video_count
                 FROM categories c WHERE c.id = ?",
                params![id],
                Self::category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        let category = conn
            .query_row(
                "SELECT c.id, c.name, c.slug, c.description, c.thumbnail, c.created_at,
                        (SELECT COUNT(*) FROM video_categories vc WHERE vc.category_id = c.id) AS video_count
                 FROM categories c WHERE c.slug = ?",
                params![slug],
                Self::category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.slug, c.description, c.thumbnail, c.created_at,
                    COUNT(vc.id) AS video_count
             FROM categories c
             LEFT JOIN video_categories vc ON vc.category_id = c.id
             GROUP BY c.id
             ORDER BY c.created_at DESC, c.id DESC",
        )?;
        let categories = stmt
            .query_map([], Self::category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn random_categories(&self, limit: i64) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.slug, c.description, c.thumbnail, c.created_at,
                    (SELECT COUNT(*) FROM video_categories vc WHERE vc.category_id = c.id) AS video_count
             FROM categories c ORDER BY RANDOM() LIMIT ?",
        )?;
        let categories = stmt
            .query_map(params![limit], Self::category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
            thumbnail: row.get(4)?,
            created_at: row.get(5)?,
            video_count: row.get(6)?,
        })
    }

    // =========================================================================
    // Video queries
    // =========================================================================

    /// Insert a new video. The embed URL is canonicalized on the way in, so
    /// stored videos always hold the embeddable form for recognized links.
    pub fn create_video(
        &self,
        title: &str,
        description: Option<&str>,
        thumbnail: Option<&str>,
        embed_url: &str,
        expert_id: Option<i64>,
        trail_id: Option<i64>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let embed_url = embed::canonicalize_embed_url(embed_url);
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO videos (title, description, thumbnail, embed_url, expert_id, trail_id, views, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            params![title, description, thumbnail, embed_url, expert_id, trail_id, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Full-field update; the view counter is never touched here.
    pub fn update_video(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        thumbnail: Option<&str>,
        embed_url: &str,
        expert_id: Option<i64>,
        trail_id: Option<i64>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let embed_url = embed::canonicalize_embed_url(embed_url);
        conn.execute(
            "UPDATE videos SET title = ?, description = ?, thumbnail = ?, embed_url = ?,
                    expert_id = ?, trail_id = ? WHERE id = ?",
            params![title, description, thumbnail, embed_url, expert_id, trail_id, id],
        )?;
        Ok(())
    }

    pub fn delete_video(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        // Category links and ratings cascade with the row
        conn.execute("DELETE FROM videos WHERE id = ?", params![id])?;
        Ok(())
    }

    pub fn get_video(&self, id: i64) -> Result<Option<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{} WHERE v.id = ?", VIDEO_SELECT);
        let video = conn
            .query_row(&sql, params![id], Self::video_from_row)
            .optional()?;
        Ok(video)
    }

    /// All videos, newest first.
    pub fn get_videos(&self) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{} ORDER BY v.created_at DESC, v.id DESC", VIDEO_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map([], Self::video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    pub fn get_recent_videos(&self, limit: i64) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{} ORDER BY v.created_at DESC, v.id DESC LIMIT ?",
            VIDEO_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map(params![limit], Self::video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    pub fn get_featured_videos(&self, limit: i64) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{} ORDER BY RANDOM() LIMIT ?", VIDEO_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map(params![limit], Self::video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    pub fn get_videos_by_expert(&self, expert_id: i64) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{} WHERE v.expert_id = ? ORDER BY v.created_at DESC, v.id DESC",
            VIDEO_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map(params![expert_id], Self::video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    pub fn get_videos_by_trail(&self, trail_id: i64) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{} WHERE v.trail_id = ? ORDER BY v.created_at DESC, v.id DESC",
            VIDEO_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map(params![trail_id], Self::video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    pub fn get_videos_by_category(&self, category_id: i64) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{} WHERE v.id IN (SELECT video_id FROM video_categories WHERE category_id = ?)
             ORDER BY v.created_at DESC, v.id DESC",
            VIDEO_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map(params![category_id], Self::video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    /// Replace a video's category set with exactly the given ids.
    pub fn set_video_categories(&self, video_id: i64, category_ids: &[i64]) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM video_categories WHERE video_id = ?",
            params![video_id],
        )?;
        let now = chrono::Utc::now().to_rfc3339();
        for category_id in category_ids {
            conn.execute(
                "INSERT OR IGNORE INTO video_categories (video_id, category_id, created_at)
                 VALUES (?, ?, ?)",
                params![video_id, category_id, now],
            )?;
        }
        Ok(())
    }

    pub fn get_video_categories(&self, video_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.slug, c.description, c.thumbnail, c.created_at,
                    (SELECT COUNT(*) FROM video_categories x WHERE x.category_id = c.id) AS video_count
             FROM categories c
             JOIN video_categories vc ON vc.category_id = c.id
             WHERE vc.video_id = ?
             ORDER BY c.name ASC",
        )?;
        let categories = stmt
            .query_map(params![video_id], Self::category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    // =========================================================================
    // View counter
    // =========================================================================

    /// Bump the view counter by one. Returns the number of rows touched so
    /// callers can distinguish a missing video (0) from a counted view (1).
    /// There is no decrement.
    pub fn increment_views(&self, video_id: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "UPDATE videos SET views = views + 1 WHERE id = ?",
            params![video_id],
        )?;
        Ok(rows)
    }

    // =========================================================================
    // User queries
    // =========================================================================

    pub fn create_user(&self, name: &str, email: &str, is_admin: bool) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (name, email, is_admin, created_at) VALUES (?, ?, ?, ?)",
            params![name, email, if is_admin { 1 } else { 0 }, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                "SELECT u.id, u.name, u.email, u.is_admin, u.created_at,
                        (SELECT COUNT(*) FROM video_ratings r WHERE r.user_id = u.id) AS rating_count
                 FROM users u WHERE u.id = ?",
                params![id],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// All users, newest first, each with how many videos they have rated.
    pub fn get_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.email, u.is_admin, u.created_at,
                    COUNT(r.id) AS rating_count
             FROM users u
             LEFT JOIN video_ratings r ON r.user_id = u.id
             GROUP BY u.id
             ORDER BY u.created_at DESC, u.id DESC",
        )?;
        let users = stmt
            .query_map([], Self::user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn get_recent_users(&self, limit: i64) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.email, u.is_admin, u.created_at,
                    (SELECT COUNT(*) FROM video_ratings r WHERE r.user_id = u.id) AS rating_count
             FROM users u
             ORDER BY u.created_at DESC, u.id DESC
             LIMIT ?",
        )?;
        let users = stmt
            .query_map(params![limit], Self::user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            is_admin: row.get::<_, i32>(3)? == 1,
            created_at: row.get(4)?,
            rating_count: row.get(5)?,
        })
    }

    // =========================================================================
    // Rating queries
    // =========================================================================

    /// Record a user's rating for a video as a single atomic statement keyed
    /// on the (user, video) uniqueness constraint. Re-rating overwrites the
    /// prior value and refreshes `updated_at`; `created_at` stays from the
    /// first write.
    pub fn upsert_rating(&self, user_id: i64, video_id: i64, rate: i32) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO video_ratings (user_id, video_id, rate, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id, video_id)
             DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at",
            params![user_id, video_id, rate, now, now],
        )?;
        Ok(())
    }

    pub fn get_rating(&self, user_id: i64, video_id: i64) -> Result<Option<i32>> {
        let conn = self.conn.lock().unwrap();
        let rate = conn
            .query_row(
                "SELECT rate FROM video_ratings WHERE user_id = ? AND video_id = ?",
                params![user_id, video_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rate)
    }

    /// Ids of every video this user has rated, for flagging listings.
    pub fn rated_video_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT video_id FROM video_ratings WHERE user_id = ?")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// A user's rated videos, most recently rated first.
    pub fn get_user_ratings(&self, user_id: i64) -> Result<Vec<RatedVideo>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT v.id, v.title, v.description, v.thumbnail, v.embed_url,
                    v.expert_id, e.name AS expert_name, v.trail_id, v.views, v.created_at,
                    (SELECT json_group_array(vc.category_id) FROM video_categories vc
                     WHERE vc.video_id = v.id) AS category_ids,
                    r.rate, r.updated_at
             FROM video_ratings r
             JOIN videos v ON v.id = r.video_id
             LEFT JOIN experts e ON e.id = v.expert_id
             WHERE r.user_id = ?
             ORDER BY r.updated_at DESC, r.id DESC",
        )?;
        let ratings = stmt
            .query_map(params![user_id], |row| {
                Ok(RatedVideo {
                    video: Self::video_from_row(row)?,
                    rate: row.get(11)?,
                    rated_at: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ratings)
    }

    // =========================================================================
    // Stats queries
    // =========================================================================

    pub fn get_stats(&self) -> Result<PortalStats> {
        let conn = self.conn.lock().unwrap();

        let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let videos: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
        let experts: i64 = conn.query_row("SELECT COUNT(*) FROM experts", [], |row| row.get(0))?;
        let trails: i64 = conn.query_row("SELECT COUNT(*) FROM trails", [], |row| row.get(0))?;
        let categories: i64 =
            conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;

        Ok(PortalStats {
            users,
            videos,
            experts,
            trails,
            categories,
        })
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT value FROM portal_settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR REPLACE INTO portal_settings (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_all_settings(&self) -> Result<std::collections::HashMap<String, String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key, value FROM portal_settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut settings = std::collections::HashMap::new();
        for row in rows {
            let (key, value) = row?;
            settings.insert(key, value);
        }
        Ok(settings)
    }
}
