//! Effort scoring for a user's own ideas
//!
//! An idea's score is its difficulty weight multiplied by the number of days
//! its free-text `estimatedTime` works out to.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::models::idea::{Difficulty, Idea, ScoredIdea};

/// Days assumed when the estimate cannot be read (midpoint of "1-3 days")
pub const FALLBACK_DAYS: f64 = 2.0;

fn estimate_regex() -> &'static Regex {
    static ESTIMATE_REGEX: OnceLock<Regex> = OnceLock::new();
    ESTIMATE_REGEX.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)(?:\s*(?:-|to)\s*(\d+(?:\.\d+)?))?\s*([a-z]*)")
            .expect("Failed to compile estimate regex")
    })
}

/// Multiplier to days for a time unit word
fn unit_days(unit: &str) -> f64 {
    if unit.starts_with("mi") {
        1.0 / 1440.0
    } else if unit.starts_with('h') {
        1.0 / 24.0
    } else if unit.starts_with('w') {
        7.0
    } else if unit.starts_with("mo") {
        30.0
    } else if unit.starts_with('y') {
        365.0
    } else {
        1.0
    }
}

/// Difficulty weight
pub fn weight(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 2.0,
        Difficulty::Hard => 3.0,
    }
}

/// Convert a free-text estimate such as "2-4 weeks" into days
pub fn estimated_days(text: &str) -> f64 {
    let text = text.to_ascii_lowercase();
    let Some(caps) = estimate_regex().captures(&text) else {
        return FALLBACK_DAYS;
    };

    let Some(low) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
        return FALLBACK_DAYS;
    };
    let amount = match caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) {
        Some(high) => (low + high) / 2.0,
        None => low,
    };
    let unit = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

    amount * unit_days(unit)
}

/// Score a single idea
pub fn score(idea: &Idea) -> f64 {
    weight(idea.difficulty) * estimated_days(&idea.estimated_time)
}

/// Score ideas and order them by score, highest first, then newest first
pub fn rank(ideas: Vec<Idea>) -> Vec<ScoredIdea> {
    let mut scored: Vec<ScoredIdea> = ideas
        .into_iter()
        .map(|idea| ScoredIdea {
            score: score(&idea),
            idea,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.idea.created_at.cmp(&a.idea.created_at))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::idea::Author;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn idea(difficulty: Difficulty, estimate: &str, age_days: i64) -> Idea {
        let created = Utc::now() - Duration::days(age_days);
        Idea {
            id: Uuid::new_v4(),
            title: format!("{} {}", difficulty, estimate),
            verified: false,
            summary: "s".to_string(),
            description: "d".to_string(),
            tags: Vec::new(),
            difficulty,
            estimated_time: estimate.to_string(),
            tech_stack: Vec::new(),
            upvotes: 0,
            views: 0,
            inspiration_link: None,
            author: Author {
                name: "Ada".to_string(),
                avatar_url: String::new(),
                github_url: String::new(),
            },
            user_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_estimated_days_units() {
        assert_eq!(estimated_days("1-3 days"), 2.0);
        assert_eq!(estimated_days("2 weeks"), 14.0);
        assert_eq!(estimated_days("1 Month"), 30.0);
        assert_eq!(estimated_days("1 year"), 365.0);
        assert_eq!(estimated_days("12 hours"), 0.5);
        assert_eq!(estimated_days("2 to 4 weeks"), 21.0);
        assert_eq!(estimated_days("5"), 5.0);
        assert_eq!(estimated_days("1.5 days"), 1.5);
    }

    #[test]
    fn test_minutes_are_not_days() {
        for estimate in ["30 min", "30 mins", "30 Minutes"] {
            let days = estimated_days(estimate);
            assert!((days - 30.0 / 1440.0).abs() < 1e-12, "{}", estimate);
        }
        assert_eq!(estimated_days("2 months"), 60.0);
    }

    #[test]
    fn test_estimated_days_fallback() {
        assert_eq!(estimated_days(""), FALLBACK_DAYS);
        assert_eq!(estimated_days("a weekend"), FALLBACK_DAYS);
    }

    #[test]
    fn test_score_multiplies_weight() {
        assert_eq!(score(&idea(Difficulty::Easy, "3 days", 0)), 3.0);
        assert_eq!(score(&idea(Difficulty::Medium, "3 days", 0)), 6.0);
        assert_eq!(score(&idea(Difficulty::Hard, "1 week", 0)), 21.0);
    }

    #[test]
    fn test_rank_orders_by_score_then_newest() {
        let ranked = rank(vec![
            idea(Difficulty::Easy, "1 day", 0),
            idea(Difficulty::Hard, "1 month", 5),
            idea(Difficulty::Medium, "2 days", 3),
            idea(Difficulty::Easy, "4 days", 1),
        ]);

        let scores: Vec<f64> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![90.0, 4.0, 4.0, 1.0]);
        // equal scores: newer idea first
        assert_eq!(ranked[1].idea.estimated_time, "4 days");
        assert_eq!(ranked[2].idea.estimated_time, "2 days");
    }

    #[test]
    fn test_scored_idea_serializes_flat() {
        let ranked = rank(vec![idea(Difficulty::Hard, "2 days", 0)]);
        let json = serde_json::to_value(&ranked[0]).unwrap();

        assert_eq!(json["score"], serde_json::json!(6.0));
        assert_eq!(json["difficulty"], serde_json::json!("hard"));
        assert!(json.get("_id").is_some());
    }
}
