use once_cell::sync::Lazy;
use regex::Regex;

/// Compiled once; tried in order until one extracts a video ID.
static WATCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"youtube\.com/watch\?.*v=([A-Za-z0-9_-]+)").expect("Failed to compile watch regex")
});
static SHARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)").expect("Failed to compile share regex")
});
static EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"youtube\.com/embed/([A-Za-z0-9_-]+)").expect("Failed to compile embed regex")
});

/// Normalize a YouTube link into its iframe-embeddable form.
///
/// Handles `watch?v=` URLs (with any surrounding query parameters),
/// `youtu.be/` share links (including `?si=` tracking suffixes), and URLs
/// already in embed form. Anything unrecognized is returned unchanged —
/// the store keeps whatever it was given rather than rejecting it.
pub fn canonicalize_embed_url(url: &str) -> String {
    match extract_video_id(url) {
        Some(id) => format!("https://www.youtube.com/embed/{}", id),
        None => url.to_string(),
    }
}

/// Pull the video ID out of any recognized YouTube URL shape.
pub fn extract_video_id(url: &str) -> Option<&str> {
    for re in [&*WATCH_RE, &*SHARE_RE, &*EMBED_RE] {
        if let Some(caps) = re.captures(url) {
            return caps.get(1).map(|m| m.as_str());
        }
    }
    None
}
