//! Curation operations: CRUD over experts, trails, categories, videos, and
//! the admin dashboard and user listings. Inputs are validated here; the
//! store below only enforces its own constraints.

use serde::{Deserialize, Serialize};

use crate::database::{Database, PortalStats, RatedVideo, User, Video};
use crate::error::PortalError;

/// How many recent users/videos the dashboard shows.
pub const DASHBOARD_RECENT_LIMIT: i64 = 5;

const MAX_FIELD_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: PortalStats,
    pub recent_users: Vec<User>,
    pub recent_videos: Vec<Video>,
}

fn require_field(field: &str, value: &str) -> Result<(), PortalError> {
    if value.trim().is_empty() {
        return Err(PortalError::Validation(format!("{} is required", field)));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(PortalError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_FIELD_LEN
        )));
    }
    Ok(())
}

fn require_expert(db: &Database, id: i64) -> Result<(), PortalError> {
    db.get_expert(id)?
        .ok_or_else(|| PortalError::NotFound(format!("expert {}", id)))?;
    Ok(())
}

fn require_trail(db: &Database, id: i64) -> Result<(), PortalError> {
    db.get_trail(id)?
        .ok_or_else(|| PortalError::NotFound(format!("trail {}", id)))?;
    Ok(())
}

fn require_video(db: &Database, id: i64) -> Result<(), PortalError> {
    db.get_video(id)?
        .ok_or_else(|| PortalError::NotFound(format!("video {}", id)))?;
    Ok(())
}

fn require_category(db: &Database, id: i64) -> Result<(), PortalError> {
    db.get_category(id)?
        .ok_or_else(|| PortalError::NotFound(format!("category {}", id)))?;
    Ok(())
}

// ============================================================================
// Experts
// ============================================================================

pub fn create_expert(
    db: &Database,
    name: &str,
    role: &str,
    image: Option<&str>,
    bio: Option<&str>,
) -> Result<i64, PortalError> {
    require_field("name", name)?;
    require_field("role", role)?;
    log::info!("Creating expert: {}", name);
    db.create_expert(name, role, image, bio).map_err(PortalError::from)
}

pub fn update_expert(
    db: &Database,
    id: i64,
    name: &str,
    role: &str,
    image: Option<&str>,
    bio: Option<&str>,
) -> Result<(), PortalError> {
    require_field("name", name)?;
    require_field("role", role)?;
    require_expert(db, id)?;
    log::info!("Updating expert {}: {}", id, name);
    db.update_expert(id, name, role, image, bio)
        .map_err(PortalError::from)
}

pub fn delete_expert(db: &Database, id: i64) -> Result<(), PortalError> {
    require_expert(db, id)?;
    log::info!("Deleting expert: {}", id);
    db.delete_expert(id).map_err(PortalError::from)
}

// ============================================================================
// Trails
// ============================================================================

pub fn create_trail(
    db: &Database,
    name: &str,
    description: Option<&str>,
    thumbnail: Option<&str>,
) -> Result<i64, PortalError> {
    require_field("name", name)?;
    log::info!("Creating trail: {}", name);
    db.create_trail(name, description, thumbnail)
        .map_err(PortalError::from)
}

pub fn update_trail(
    db: &Database,
    id: i64,
    name: &str,
    description: Option<&str>,
    thumbnail: Option<&str>,
) -> Result<(), PortalError> {
    require_field("name", name)?;
    require_trail(db, id)?;
    log::info!("Updating trail {}: {}", id, name);
    db.update_trail(id, name, description, thumbnail)
        .map_err(PortalError::from)
}

pub fn delete_trail(db: &Database, id: i64) -> Result<(), PortalError> {
    require_trail(db, id)?;
    log::info!("Deleting trail: {}", id);
    db.delete_trail(id).map_err(PortalError::from)
}

// ============================================================================
// Categories
// ============================================================================

pub fn create_category(
    db: &Database,
    name: &str,
    slug: &str,
    description: Option<&str>,
    thumbnail: Option<&str>,
) -> Result<i64, PortalError> {
    require_field("name", name)?;
    require_field("slug", slug)?;
    log::info!("Creating category: {} ({})", name, slug);
    db.create_category(name, slug, description, thumbnail)
        .map_err(PortalError::from)
}

pub fn update_category(
    db: &Database,
    id: i64,
    name: &str,
    slug: &str,
    description: Option<&str>,
    thumbnail: Option<&str>,
) -> Result<(), PortalError> {
    require_field("name", name)?;
    require_field("slug", slug)?;
    require_category(db, id)?;
    log::info!("Updating category {}: {}", id, name);
    db.update_category(id, name, slug, description, thumbnail)
        .map_err(PortalError::from)
}

pub fn delete_category(db: &Database, id: i64) -> Result<(), PortalError> {
    require_category(db, id)?;
    log::info!("Deleting category: {}", id);
    db.delete_category(id).map_err(PortalError::from)
}

// ============================================================================
// Videos
// ============================================================================

/// Create a video and attach its category set. The referenced expert,
/// trail, and categories must all exist. The embed URL is canonicalized
/// by the store on the way in.
#[allow(clippy::too_many_arguments)]
pub fn create_video(
    db: &Database,
    title: &str,
    description: Option<&str>,
    thumbnail: Option<&str>,
    embed_url: &str,
    expert_id: Option<i64>,
    trail_id: Option<i64>,
    categories: &[i64],
) -> Result<i64, PortalError> {
    require_field("title", title)?;
    require_field("embed_url", embed_url)?;
    if let Some(id) = expert_id {
        require_expert(db, id)?;
    }
    if let Some(id) = trail_id {
        require_trail(db, id)?;
    }
    for &id in categories {
        require_category(db, id)?;
    }

    log::info!("Creating video: {}", title);
    let video_id = db.create_video(title, description, thumbnail, embed_url, expert_id, trail_id)?;
    if !categories.is_empty() {
        db.set_video_categories(video_id, categories)?;
    }
    Ok(video_id)
}

/// Full update; the category set is replaced with exactly `categories`
/// (pass an empty slice to detach them all).
#[allow(clippy::too_many_arguments)]
pub fn update_video(
    db: &Database,
    id: i64,
    title: &str,
    description: Option<&str>,
    thumbnail: Option<&str>,
    embed_url: &str,
    expert_id: Option<i64>,
    trail_id: Option<i64>,
    categories: &[i64],
) -> Result<(), PortalError> {
    require_field("title", title)?;
    require_field("embed_url", embed_url)?;
    require_video(db, id)?;
    if let Some(expert) = expert_id {
        require_expert(db, expert)?;
    }
    if let Some(trail) = trail_id {
        require_trail(db, trail)?;
    }
    for &category in categories {
        require_category(db, category)?;
    }

    log::info!("Updating video {}: {}", id, title);
    db.update_video(id, title, description, thumbnail, embed_url, expert_id, trail_id)?;
    db.set_video_categories(id, categories)?;
    Ok(())
}

pub fn delete_video(db: &Database, id: i64) -> Result<(), PortalError> {
    require_video(db, id)?;
    log::info!("Deleting video: {}", id);
    db.delete_video(id).map_err(PortalError::from)
}

// ============================================================================
// Users
// ============================================================================

pub fn create_user(
    db: &Database,
    name: &str,
    email: &str,
    is_admin: bool,
) -> Result<i64, PortalError> {
    require_field("name", name)?;
    require_field("email", email)?;
    if !email.contains('@') {
        return Err(PortalError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    log::info!("Creating user: {}", email);
    db.create_user(name, email, is_admin).map_err(PortalError::from)
}

pub fn list_users(db: &Database) -> Result<Vec<User>, PortalError> {
    db.get_users().map_err(PortalError::from)
}

/// A user's rated videos, most recent rating first.
pub fn user_ratings(db: &Database, user_id: i64) -> Result<Vec<RatedVideo>, PortalError> {
    db.get_user(user_id)?
        .ok_or_else(|| PortalError::NotFound(format!("user {}", user_id)))?;
    db.get_user_ratings(user_id).map_err(PortalError::from)
}

// ============================================================================
// Dashboard
// ============================================================================

pub fn dashboard(db: &Database) -> Result<Dashboard, PortalError> {
    Ok(Dashboard {
        stats: db.get_stats()?,
        recent_users: db.get_recent_users(DASHBOARD_RECENT_LIMIT)?,
        recent_videos: db.get_recent_videos(DASHBOARD_RECENT_LIMIT)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).unwrap();
        (db, temp_dir)
    }

    #[test]
    fn create_expert_requires_name_and_role() {
        let (db, _temp) = setup_test_db();

        assert!(matches!(
            create_expert(&db, "", "Role", None, None),
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            create_expert(&db, "Maria", "   ", None, None),
            Err(PortalError::Validation(_))
        ));
        assert!(create_expert(&db, "Maria", "Security", None, None).is_ok());
    }

    #[test]
    fn overlong_field_is_rejected() {
        let (db, _temp) = setup_test_db();

        let long = "A".repeat(300);
        assert!(matches!(
            create_trail(&db, &long, None, None),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn update_missing_expert_is_not_found() {
        let (db, _temp) = setup_test_db();

        let result = update_expert(&db, 99999, "Maria", "Security", None, None);
        assert!(matches!(result, Err(PortalError::NotFound(_))));
    }

    #[test]
    fn create_video_rejects_unknown_references() {
        let (db, _temp) = setup_test_db();

        let result = create_video(&db, "Intro", None, None, "https://youtu.be/aaaaaaaaaaa", Some(99999), None, &[]);
        assert!(matches!(result, Err(PortalError::NotFound(_))));

        let result = create_video(&db, "Intro", None, None, "https://youtu.be/aaaaaaaaaaa", None, None, &[99999]);
        assert!(matches!(result, Err(PortalError::NotFound(_))));
    }

    #[test]
    fn create_video_attaches_categories() {
        let (db, _temp) = setup_test_db();
        let rust = db.create_category("Rust", "rust", None, None).unwrap();
        let web = db.create_category("Web", "web", None, None).unwrap();

        let id = create_video(
            &db,
            "Intro",
            Some("Getting started"),
            None,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            None,
            None,
            &[rust, web],
        )
        .unwrap();

        let video = db.get_video(id).unwrap().unwrap();
        assert_eq!(video.embed_url, "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(video.category_ids.len(), 2);
    }

    #[test]
    fn update_video_replaces_category_set() {
        let (db, _temp) = setup_test_db();
        let rust = db.create_category("Rust", "rust", None, None).unwrap();
        let web = db.create_category("Web", "web", None, None).unwrap();

        let id = create_video(&db, "Intro", None, None, "https://youtu.be/aaaaaaaaaaa", None, None, &[rust])
            .unwrap();
        update_video(&db, id, "Intro", None, None, "https://youtu.be/aaaaaaaaaaa", None, None, &[web])
            .unwrap();

        let video = db.get_video(id).unwrap().unwrap();
        assert_eq!(video.category_ids, vec![web]);

        // Empty slice detaches everything
        update_video(&db, id, "Intro", None, None, "https://youtu.be/aaaaaaaaaaa", None, None, &[])
            .unwrap();
        assert!(db.get_video(id).unwrap().unwrap().category_ids.is_empty());
    }

    #[test]
    fn delete_missing_video_is_not_found() {
        let (db, _temp) = setup_test_db();

        assert!(matches!(
            delete_video(&db, 99999),
            Err(PortalError::NotFound(_))
        ));
    }

    #[test]
    fn create_user_validates_email() {
        let (db, _temp) = setup_test_db();

        assert!(matches!(
            create_user(&db, "Ana", "not-an-email", false),
            Err(PortalError::Validation(_))
        ));
        assert!(create_user(&db, "Ana", "ana@example.com", false).is_ok());
    }

    #[test]
    fn dashboard_reports_counts_and_recents() {
        let (db, _temp) = setup_test_db();
        create_user(&db, "Ana", "ana@example.com", false).unwrap();
        create_expert(&db, "Maria", "Security", None, None).unwrap();
        create_trail(&db, "Backend", None, None).unwrap();
        db.create_category("Rust", "rust", None, None).unwrap();
        for i in 0..7 {
            create_video(
                &db,
                &format!("Video {}", i),
                None,
                None,
                "https://example.com/raw",
                None,
                None,
                &[],
            )
            .unwrap();
        }

        let dashboard = dashboard(&db).unwrap();
        assert_eq!(dashboard.stats.users, 1);
        assert_eq!(dashboard.stats.videos, 7);
        assert_eq!(dashboard.stats.experts, 1);
        assert_eq!(dashboard.stats.trails, 1);
        assert_eq!(dashboard.stats.categories, 1);
        assert_eq!(dashboard.recent_users.len(), 1);
        assert_eq!(dashboard.recent_videos.len(), DASHBOARD_RECENT_LIMIT as usize);
    }

    #[test]
    fn user_ratings_requires_existing_user() {
        let (db, _temp) = setup_test_db();

        assert!(matches!(
            user_ratings(&db, 99999),
            Err(PortalError::NotFound(_))
        ));
    }
}
