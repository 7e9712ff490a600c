use crate::database::models::Video;

/// Cap on how many related videos a detail page shows.
pub const RELATED_LIMIT: usize = 4;

/// Pick videos related to `target`: same expert, or at least one shared
/// category. Candidates keep their input order and the first
/// [`RELATED_LIMIT`] matches win; no further ranking is applied. The
/// target itself is never returned, and a target with neither an expert
/// nor any categories matches nothing.
pub fn select_related<'a>(target: &Video, candidates: &'a [Video]) -> Vec<&'a Video> {
    candidates
        .iter()
        .filter(|c| c.id != target.id)
        .filter(|c| shares_expert(target, c) || shares_category(target, c))
        .take(RELATED_LIMIT)
        .collect()
}

fn shares_expert(a: &Video, b: &Video) -> bool {
    match (a.expert_id, b.expert_id) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn shares_category(a: &Video, b: &Video) -> bool {
    a.category_ids.iter().any(|id| b.category_ids.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: i64, expert_id: Option<i64>, category_ids: Vec<i64>) -> Video {
        Video {
            id,
            title: format!("Video {}", id),
            description: None,
            thumbnail: None,
            embed_url: "https://www.youtube.com/embed/dQw4w9WgXcQ".to_string(),
            expert_id,
            expert_name: None,
            trail_id: None,
            category_ids,
            views: 0,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn matches_shared_expert_or_category() {
        let target = video(1, Some(1), vec![1, 2]);
        let b = video(2, Some(1), vec![]);
        let c = video(3, None, vec![2]);
        let d = video(4, Some(2), vec![3]);

        let candidates = [b.clone(), c.clone(), d];
        let related = select_related(&target, &candidates);
        let ids: Vec<i64> = related.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn never_exceeds_limit() {
        let target = video(1, Some(1), vec![]);
        let candidates: Vec<Video> = (2..=10).map(|id| video(id, Some(1), vec![])).collect();

        let related = select_related(&target, &candidates);
        assert_eq!(related.len(), RELATED_LIMIT);
    }

    #[test]
    fn never_includes_target() {
        let target = video(1, Some(1), vec![1]);
        let candidates = vec![target.clone(), video(2, Some(1), vec![])];

        let related = select_related(&target, &candidates);
        assert!(related.iter().all(|v| v.id != target.id));
    }

    #[test]
    fn no_matches_yields_empty() {
        let target = video(1, Some(1), vec![1]);
        let candidates = vec![video(2, Some(2), vec![2]), video(3, None, vec![])];

        assert!(select_related(&target, &candidates).is_empty());
    }

    #[test]
    fn bare_target_matches_nothing() {
        // No expert and no categories: no match rule can fire.
        let target = video(1, None, vec![]);
        let candidates = vec![video(2, Some(1), vec![1]), video(3, None, vec![])];

        assert!(select_related(&target, &candidates).is_empty());
    }

    #[test]
    fn preserves_candidate_order() {
        let target = video(1, Some(7), vec![]);
        let candidates = vec![
            video(5, Some(7), vec![]),
            video(3, Some(7), vec![]),
            video(9, Some(7), vec![]),
        ];

        let ids: Vec<i64> = select_related(&target, &candidates)
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![5, 3, 9]);
    }
}
