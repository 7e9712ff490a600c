//! User-facing portal operations: page-shaped reads, the rating upsert,
//! and the per-load view counter.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::database::{Category, Database, Expert, Trail, Video, VideoCard};
use crate::error::PortalError;
use crate::related;

/// How many trails the home page shows.
pub const HOME_TRAIL_LIMIT: usize = 4;

const DEFAULT_FEATURED_LIMIT: i64 = 6;
const DEFAULT_RECENT_LIMIT: i64 = 8;
const DEFAULT_SIDEBAR_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePage {
    pub featured: Vec<VideoCard>,
    pub recent: Vec<VideoCard>,
    pub trails: Vec<Trail>,
}

/// A titled video listing, used for category, expert, and trail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorePage {
    pub title: String,
    pub subtitle: Option<String>,
    pub videos: Vec<VideoCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetail {
    pub video: Video,
    pub trail: Option<Trail>,
    pub categories: Vec<Category>,
    pub user_rating: Option<i32>,
    pub related: Vec<VideoCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sidebar {
    pub categories: Vec<Category>,
    pub experts: Vec<Expert>,
    pub trails: Vec<Trail>,
}

fn setting_or(db: &Database, key: &str, default: i64) -> i64 {
    match db.get_setting(key) {
        Ok(Some(value)) => value.parse().unwrap_or(default),
        _ => default,
    }
}

fn rated_set(db: &Database, user_id: i64) -> Result<HashSet<i64>, PortalError> {
    Ok(db.rated_video_ids(user_id)?.into_iter().collect())
}

fn flag_rated(videos: Vec<Video>, rated: &HashSet<i64>) -> Vec<VideoCard> {
    videos
        .into_iter()
        .map(|video| VideoCard {
            is_rated: rated.contains(&video.id),
            video,
        })
        .collect()
}

/// Home page: a random featured selection, the newest videos, and the
/// first few trails. Every card carries whether this user already rated it.
pub fn home(db: &Database, user_id: i64) -> Result<HomePage, PortalError> {
    let rated = rated_set(db, user_id)?;
    let featured_limit = setting_or(db, "featured_limit", DEFAULT_FEATURED_LIMIT);
    let recent_limit = setting_or(db, "recent_limit", DEFAULT_RECENT_LIMIT);

    let featured = flag_rated(db.get_featured_videos(featured_limit)?, &rated);
    let recent = flag_rated(db.get_recent_videos(recent_limit)?, &rated);
    let mut trails = db.get_trails()?;
    trails.truncate(HOME_TRAIL_LIMIT);

    Ok(HomePage {
        featured,
        recent,
        trails,
    })
}

pub fn explore_category(
    db: &Database,
    user_id: i64,
    slug: &str,
) -> Result<ExplorePage, PortalError> {
    let category = db
        .get_category_by_slug(slug)?
        .ok_or_else(|| PortalError::NotFound(format!("category '{}'", slug)))?;
    let rated = rated_set(db, user_id)?;
    let videos = flag_rated(db.get_videos_by_category(category.id)?, &rated);

    Ok(ExplorePage {
        title: category.name,
        subtitle: category.description,
        videos,
    })
}

pub fn explore_expert(
    db: &Database,
    user_id: i64,
    expert_id: i64,
) -> Result<ExplorePage, PortalError> {
    let expert = db
        .get_expert(expert_id)?
        .ok_or_else(|| PortalError::NotFound(format!("expert {}", expert_id)))?;
    let rated = rated_set(db, user_id)?;
    let videos = flag_rated(db.get_videos_by_expert(expert.id)?, &rated);

    Ok(ExplorePage {
        title: expert.name,
        subtitle: Some(expert.role),
        videos,
    })
}

pub fn explore_trail(
    db: &Database,
    user_id: i64,
    trail_id: i64,
) -> Result<ExplorePage, PortalError> {
    let trail = db
        .get_trail(trail_id)?
        .ok_or_else(|| PortalError::NotFound(format!("trail {}", trail_id)))?;
    let rated = rated_set(db, user_id)?;
    let videos = flag_rated(db.get_videos_by_trail(trail.id)?, &rated);

    Ok(ExplorePage {
        title: trail.name,
        subtitle: trail.description,
        videos,
    })
}

/// Count one view. Every call counts, repeat views by the same user
/// included; there is no per-session dedup.
pub fn record_view(db: &Database, video_id: i64) -> Result<(), PortalError> {
    match db.increment_views(video_id)? {
        0 => Err(PortalError::NotFound(format!("video {}", video_id))),
        _ => Ok(()),
    }
}

/// Video detail page: counts the view, then assembles the video with its
/// trail, categories, the caller's own rating, and up to
/// [`related::RELATED_LIMIT`] related videos.
pub fn video_detail(
    db: &Database,
    user_id: i64,
    video_id: i64,
) -> Result<VideoDetail, PortalError> {
    record_view(db, video_id)?;

    let video = db
        .get_video(video_id)?
        .ok_or_else(|| PortalError::NotFound(format!("video {}", video_id)))?;
    let trail = match video.trail_id {
        Some(id) => db.get_trail(id)?,
        None => None,
    };
    let categories = db.get_video_categories(video_id)?;
    let user_rating = db.get_rating(user_id, video_id)?;

    let rated = rated_set(db, user_id)?;
    let candidates = db.get_videos()?;
    let related = related::select_related(&video, &candidates)
        .into_iter()
        .map(|v| VideoCard {
            is_rated: rated.contains(&v.id),
            video: v.clone(),
        })
        .collect();

    Ok(VideoDetail {
        video,
        trail,
        categories,
        user_rating,
        related,
    })
}

/// Upsert the user's 1–5 rating for a video. Exactly one rating row per
/// (user, video) pair survives; re-rating overwrites the prior value.
pub fn rate_video(
    db: &Database,
    user_id: i64,
    video_id: i64,
    rate: i32,
) -> Result<(), PortalError> {
    if !(1..=5).contains(&rate) {
        return Err(PortalError::Validation(format!(
            "rate must be an integer between 1 and 5, got {}",
            rate
        )));
    }

    db.get_user(user_id)?
        .ok_or_else(|| PortalError::NotFound(format!("user {}", user_id)))?;
    db.get_video(video_id)?
        .ok_or_else(|| PortalError::NotFound(format!("video {}", video_id)))?;

    log::info!("User {} rating video {}: {}", user_id, video_id, rate);
    db.upsert_rating(user_id, video_id, rate)?;
    Ok(())
}

/// Shared sidebar payload: a small random sample of each catalog entity.
pub fn sidebar(db: &Database) -> Result<Sidebar, PortalError> {
    let limit = setting_or(db, "sidebar_limit", DEFAULT_SIDEBAR_LIMIT);
    Ok(Sidebar {
        categories: db.random_categories(limit)?,
        experts: db.random_experts(limit)?,
        trails: db.random_trails(limit)?,
    })
}
