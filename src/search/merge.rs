//! Combining AI and local result lists.

use std::{collections::HashSet, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::bookmarks::{ScoredBookmark, SearchType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// AI results first, then local-only results, capped at the AI limit.
    #[default]
    Union,
    /// Local results whose id the AI also returned, in local order.
    Intersect,
    /// AI results alone whenever the AI produced any.
    AiFirst,
}

impl FromStr for MergeStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(MergeStrategy::Union),
            "intersect" => Ok(MergeStrategy::Intersect),
            "ai-first" => Ok(MergeStrategy::AiFirst),
            _ => anyhow::bail!("unknown merge strategy {s:?} (union, intersect, ai-first)"),
        }
    }
}

impl Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MergeStrategy::Union => "union",
            MergeStrategy::Intersect => "intersect",
            MergeStrategy::AiFirst => "ai-first",
        };
        write!(f, "{name}")
    }
}

/// Merges two result lists. An empty `ai` list always yields `local`
/// untouched.
pub fn merge(
    ai: Vec<ScoredBookmark>,
    local: Vec<ScoredBookmark>,
    strategy: MergeStrategy,
    ai_limit: usize,
) -> Vec<ScoredBookmark> {
    if ai.is_empty() {
        return local;
    }

    match strategy {
        MergeStrategy::Union => union(ai, local, ai_limit),
        MergeStrategy::Intersect => intersect(&ai, local),
        MergeStrategy::AiFirst => {
            let mut ai = ai;
            ai.truncate(ai_limit);
            ai
        }
    }
}

fn union(ai: Vec<ScoredBookmark>, local: Vec<ScoredBookmark>, limit: usize) -> Vec<ScoredBookmark> {
    let mut seen: HashSet<String> = ai.iter().map(|r| r.id().to_string()).collect();
    let mut merged = ai;

    for mut hit in local {
        if seen.insert(hit.id().to_string()) {
            hit.search_type = Some(SearchType::Local);
            merged.push(hit);
        }
    }

    merged.truncate(limit);
    merged
}

fn intersect(ai: &[ScoredBookmark], local: Vec<ScoredBookmark>) -> Vec<ScoredBookmark> {
    let ai_ids: HashSet<&str> = ai.iter().map(|r| r.id()).collect();
    local
        .into_iter()
        .filter(|hit| ai_ids.contains(hit.id()))
        .collect()
}
