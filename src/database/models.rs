use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expert {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub video_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub created_at: String,
    pub video_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub created_at: String,
    pub video_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub embed_url: String,
    pub expert_id: Option<i64>,
    pub expert_name: Option<String>,
    pub trail_id: Option<i64>,
    pub category_ids: Vec<i64>,
    pub views: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
    pub rating_count: Option<i64>,
}

/// A video decorated with whether the acting user has already rated it.
/// Every portal listing carries this flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCard {
    pub video: Video,
    pub is_rated: bool,
}

/// A video joined with the rating one user gave it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatedVideo {
    pub video: Video,
    pub rate: i32,
    pub rated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalStats {
    pub users: i64,
    pub videos: i64,
    pub experts: i64,
    pub trails: i64,
    pub categories: i64,
}
