//! Bet page grouping: matches bucketed by tournament, plus the share text.

use crate::state::predictions::UserPredictions;
use chrono::{DateTime, Utc};
use pandascore_api::Match;

pub const MAX_GROUPS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    pub key: String,
    pub name: String,
    pub matches: Vec<Match>,
}

impl MatchGroup {
    pub fn is_live(&self) -> bool {
        self.matches.iter().any(Match::is_live)
    }

    fn earliest_begin(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.matches
            .iter()
            .map(|m| m.begin_at.or(m.scheduled_at).unwrap_or(now))
            .min()
            .unwrap_or(now)
    }
}

/// "Current" groups are built from running matches, "next" from upcoming ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetBoard {
    pub current: Vec<MatchGroup>,
    pub next: Vec<MatchGroup>,
}

impl BetBoard {
    pub fn build(running: &[Match], upcoming: &[Match], now: DateTime<Utc>) -> Self {
        let mut current = group_matches(running);
        current.sort_by(|a, b| b.matches.len().cmp(&a.matches.len()));
        current.truncate(MAX_GROUPS);

        let mut next: Vec<MatchGroup> = group_matches(upcoming)
            .into_iter()
            .filter(|g| !current.iter().any(|c| c.key == g.key))
            .collect();
        next.sort_by_key(|g| g.earliest_begin(now));
        next.truncate(MAX_GROUPS);

        Self { current, next }
    }

    pub fn groups(&self) -> impl Iterator<Item = &MatchGroup> {
        self.current.iter().chain(self.next.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.next.is_empty()
    }
}

pub fn group_key(m: &Match) -> String {
    if let Some(t) = &m.tournament {
        return t.id.to_string();
    }
    let league = m.league.as_ref().map_or("L".to_string(), |l| l.id.to_string());
    let serie = m.serie.as_ref().map_or("S".to_string(), |s| s.id.to_string());
    format!("{league}-{serie}")
}

pub fn group_name(m: &Match) -> String {
    let league = m.league.as_ref().map(|l| l.name.as_str()).filter(|n| !n.is_empty());
    let serie = m.serie.as_ref().and_then(|s| s.display_name());
    if let (Some(league), Some(serie)) = (league, serie) {
        return format!("{league} • {serie}");
    }
    m.tournament
        .as_ref()
        .map(|t| t.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Tournament".to_string())
}

/// Group in first-seen order.
pub fn group_matches(matches: &[Match]) -> Vec<MatchGroup> {
    let mut groups: Vec<MatchGroup> = Vec::new();
    for m in matches {
        let key = group_key(m);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.matches.push(m.clone()),
            None => groups.push(MatchGroup { key, name: group_name(m), matches: vec![m.clone()] }),
        }
    }
    groups
}

/// Plain-text summary of the user's predictions in one group.
pub fn share_text(group: &MatchGroup, predictions: Option<&UserPredictions>) -> String {
    let mut lines = vec![format!("Bets — {}", group.name)];
    for m in &group.matches {
        let Some(p) = predictions.and_then(|all| all.get(&m.id)) else {
            continue;
        };
        let Some(winner) = p.winner_id else {
            continue;
        };
        if p.score.is_empty() {
            continue;
        }
        let name = |idx: usize| {
            m.opponents
                .get(idx)
                .map(|t| t.acronym.clone().filter(|a| !a.is_empty()).unwrap_or_else(|| t.name.clone()))
                .unwrap_or_else(|| "TBD".to_string())
        };
        let mark = |idx: usize| {
            if m.opponents.get(idx).is_some_and(|t| t.id == winner) { "✅" } else { "❌" }
        };
        let bo = p.bo.unwrap_or_else(|| m.best_of());
        lines.push(format!("• {} {} ⚔️ {} {} {} BO{bo}", mark(0), name(0), mark(1), name(1), p.score));
    }
    if lines.len() == 1 {
        lines.push("(no bets selected)".to_string());
    }
    lines.join("\n")
}
