//! Informal score predictions and the leaderboard derived from them.

use crate::state::storage::{read_json, write_json};
use pandascore_api::{Match, MatchResult, win_threshold};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

pub const BETS_FILE: &str = "bets_v1.json";
pub const USER_FILE: &str = "bets_user.json";
pub const DEFAULT_NICKNAME: &str = "Me";

pub const EXACT_SCORE_POINTS: u32 = 3;
pub const WINNER_POINTS: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default)]
    pub winner_id: Option<u64>,
    #[serde(default)]
    pub left: u8,
    #[serde(default)]
    pub right: u8,
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub bo: Option<u8>,
}

impl Prediction {
    pub fn is_blank(&self) -> bool {
        self.winner_id.is_none() && self.left == 0 && self.right == 0
    }

    /// `"l-r"` as two numbers. Anything else is unparseable.
    pub fn parsed_score(&self) -> Option<(u16, u16)> {
        let (l, r) = self.score.split_once('-')?;
        Some((l.trim().parse().ok()?, r.trim().parse().ok()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Match id -> prediction, for one nickname.
pub type UserPredictions = BTreeMap<u64, Prediction>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub nickname: String,
    pub points: u32,
}

/// Advance one side of a predicted score, wrapping back to zero past the win
/// threshold. Both sides may never sit on the threshold together.
pub fn step_score(
    current: &Prediction,
    side: Side,
    bo: u8,
    team_a: Option<u64>,
    team_b: Option<u64>,
) -> Prediction {
    let w = win_threshold(bo);
    let (mut left, mut right) = (current.left.min(w), current.right.min(w));
    match side {
        Side::Left => {
            left = (left + 1) % (w + 1);
            if left == w && right == w {
                right = w - 1;
            }
        }
        Side::Right => {
            right = (right + 1) % (w + 1);
            if left == w && right == w {
                left = w - 1;
            }
        }
    }

    let winner_id = if left == w && right < w {
        team_a
    } else if right == w && left < w {
        team_b
    } else {
        None
    };

    Prediction {
        winner_id,
        left,
        right,
        score: format!("{left}-{right}"),
        bo: Some(if bo == 0 { 3 } else { bo }),
    }
}

/// Points earned by one prediction against a settled result.
pub fn score_prediction(prediction: &Prediction, real: &MatchResult) -> u32 {
    let (Some(predicted), Some(actual)) = (prediction.winner_id, real.winner_id) else {
        return 0;
    };
    if predicted != actual {
        return 0;
    }
    let exact = match (prediction.parsed_score(), real.score_a, real.score_b) {
        (Some((l, r)), Some(a), Some(b)) => l == a && r == b,
        _ => false,
    };
    if exact { EXACT_SCORE_POINTS } else { WINNER_POINTS }
}

/// Totals per nickname, highest first, ties by nickname. Only matches present
/// in `past` are scored.
pub fn leaderboard(
    users: &BTreeMap<String, UserPredictions>,
    past: &HashMap<u64, MatchResult>,
) -> Vec<LeaderboardEntry> {
    let mut board: Vec<LeaderboardEntry> = users
        .iter()
        .map(|(nickname, predictions)| LeaderboardEntry {
            nickname: nickname.clone(),
            points: predictions
                .iter()
                .filter_map(|(id, p)| past.get(id).map(|real| score_prediction(p, real)))
                .sum(),
        })
        .collect();
    board.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.nickname.cmp(&b.nickname)));
    board
}

/// All users' predictions plus the active nickname, mirrored to disk on every change.
#[derive(Debug, Clone)]
pub struct PredictionStore {
    users: BTreeMap<String, UserPredictions>,
    nickname: String,
    bets_path: Option<PathBuf>,
    user_path: Option<PathBuf>,
}

impl Default for PredictionStore {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            nickname: DEFAULT_NICKNAME.to_string(),
            bets_path: None,
            user_path: None,
        }
    }
}

impl PredictionStore {
    pub fn load(dir: PathBuf) -> Self {
        let bets_path = dir.join(BETS_FILE);
        let user_path = dir.join(USER_FILE);
        let users = read_json(&bets_path).unwrap_or_default();
        let nickname = read_json::<String>(&user_path)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NICKNAME.to_string());
        Self { users, nickname, bets_path: Some(bets_path), user_path: Some(user_path) }
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Blank names fall back to the default nickname.
    pub fn set_nickname(&mut self, nickname: &str) {
        let trimmed = nickname.trim();
        self.nickname = if trimmed.is_empty() { DEFAULT_NICKNAME.to_string() } else { trimmed.to_string() };
        if let Some(path) = &self.user_path {
            write_json(path, &self.nickname);
        }
    }

    pub fn users(&self) -> &BTreeMap<String, UserPredictions> {
        &self.users
    }

    pub fn mine(&self) -> Option<&UserPredictions> {
        self.users.get(&self.nickname)
    }

    pub fn get(&self, match_id: u64) -> Option<&Prediction> {
        self.mine().and_then(|m| m.get(&match_id))
    }

    /// Store a prediction for the active nickname; a blank one is removed instead.
    pub fn set(&mut self, match_id: u64, prediction: Prediction) {
        if prediction.is_blank() {
            self.clear(match_id);
            return;
        }
        self.users
            .entry(self.nickname.clone())
            .or_default()
            .insert(match_id, prediction);
        self.save();
    }

    pub fn clear(&mut self, match_id: u64) {
        let Some(mine) = self.users.get_mut(&self.nickname) else {
            return;
        };
        if mine.remove(&match_id).is_some() {
            if mine.is_empty() {
                self.users.remove(&self.nickname);
            }
            self.save();
        }
    }

    /// Step the active user's score for `m` on one side and persist.
    pub fn increment(&mut self, m: &Match, side: Side) -> Prediction {
        let current = self.get(m.id).cloned().unwrap_or_default();
        let next = step_score(
            &current,
            side,
            m.best_of(),
            m.team_a().map(|t| t.id),
            m.team_b().map(|t| t.id),
        );
        self.set(m.id, next.clone());
        next
    }

    pub fn leaderboard(&self, past: &[Match]) -> Vec<LeaderboardEntry> {
        let results: HashMap<u64, MatchResult> = past.iter().map(|m| (m.id, m.result())).collect();
        leaderboard(&self.users, &results)
    }

    fn save(&self) {
        if let Some(path) = &self.bets_path {
            write_json(path, &self.users);
        }
    }
}
