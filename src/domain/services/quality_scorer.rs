// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tld::normalize_tld;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 常见可品牌化词汇
static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // short words
        "app", "web", "net", "dev", "api", "hub", "lab", "box", "bot", "pro", "max", "top", "new",
        "hot", "big", "one", "all", "get", "buy", "pay", "run", "fly", "go", "do", "be", "my", "we",
        "up", "on", "in", "to", "ai", "io", "co", "tv", "me", "us", "uk", "eu", "la", "ny",
        // tech
        "cloud", "cyber", "pixel", "smart", "swift", "rapid", "ultra", "micro", "super", "hyper",
        "alpha", "beta", "delta", "gamma", "omega", "prime", "elite", "boost", "spark", "flash",
        "blaze", "storm", "force", "power", "logic", "nexus", "pulse", "vibe", "flux", "core",
        "edge", "sync", "tech", "data", "code", "hack", "byte", "link", "node", "mesh",
        // business
        "trade", "market", "store", "shop", "deal", "sale", "stock", "fund", "money", "cash",
        "gold", "bank", "trust", "legal", "audit", "brand", "media", "press", "news", "blog",
        "wiki", "forum", "group", "team",
        // creative
        "design", "style", "trend", "craft", "create", "build", "make", "form", "art", "music",
        "video", "photo", "game", "play", "fun", "cool",
        // actions
        "find", "search", "track", "watch", "learn", "teach", "guide", "help", "start", "launch",
        "grow", "scale", "level", "drive", "move",
        // descriptive
        "fast", "quick", "easy", "simple", "clean", "clear", "fresh", "pure", "safe", "secure",
        "free", "open", "direct", "instant", "global", "local",
        // domain specific
        "hosting", "domain", "server", "email", "mail", "inbox", "send", "chat", "call", "meet",
        "zoom", "live", "stream", "cast", "feed", "post",
    ]
    .into_iter()
    .collect()
});

const SUFFIXES: [&str; 11] = [
    "ly", "ify", "fy", "er", "io", "ia", "eo", "it", "ix", "ex", "ox",
];

const PREFIXES: [&str; 9] = ["get", "my", "the", "go", "try", "use", "be", "we", "i"];

const VOWELS: &str = "aeiou";
const CONSONANTS: &str = "bcdfghjklmnpqrstvwxyz";

/// 质量分各维度明细
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 长度分 (0-30)
    pub length: i32,
    /// 字符集分 (0-20)
    pub charset: i32,
    /// 模式分 (0-15)
    pub pattern: i32,
    /// 顶级域名分 (0-15)
    pub tld: i32,
    /// 词汇分 (0-20)
    pub word: i32,
}

/// 质量等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityTier {
    Low,
    BelowAverage,
    Average,
    Good,
    Excellent,
    Premium,
}

impl QualityTier {
    /// 根据总分获取等级
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 85 => QualityTier::Premium,
            s if s >= 70 => QualityTier::Excellent,
            s if s >= 55 => QualityTier::Good,
            s if s >= 40 => QualityTier::Average,
            s if s >= 25 => QualityTier::BelowAverage,
            _ => QualityTier::Low,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QualityTier::Premium => write!(f, "Premium"),
            QualityTier::Excellent => write!(f, "Excellent"),
            QualityTier::Good => write!(f, "Good"),
            QualityTier::Average => write!(f, "Average"),
            QualityTier::BelowAverage => write!(f, "Below Average"),
            QualityTier::Low => write!(f, "Low"),
        }
    }
}

/// 单个域名的质量评估结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    pub label: String,
    pub tld: String,
    /// 总分 (0-100)
    pub total: i32,
    pub breakdown: ScoreBreakdown,
    pub tier: QualityTier,
}

impl QualityScore {
    /// 完整域名
    pub fn full_domain(&self) -> String {
        format!("{}.{}", self.label, self.tld)
    }
}

/// 计算域名质量分
///
/// 纯函数，无副作用：相同输入总是得到相同的总分与明细
///
/// # 参数
///
/// * `label` - 二级标签（不含顶级域名）
/// * `tld` - 顶级域名，可带前导点
///
/// # 返回值
///
/// 总分、各维度明细以及等级
pub fn score(label: &str, tld: &str) -> QualityScore {
    let label = label.trim().to_lowercase();
    let tld = normalize_tld(tld);

    let breakdown = ScoreBreakdown {
        length: length_score(label.chars().count()),
        charset: charset_score(&label),
        pattern: pattern_score(&label),
        tld: tld_score(&tld),
        word: word_score(&label),
    };
    let total = (breakdown.length
        + breakdown.charset
        + breakdown.pattern
        + breakdown.tld
        + breakdown.word)
        .clamp(0, 100);

    QualityScore {
        label,
        tld,
        total,
        breakdown,
        tier: QualityTier::from_score(total),
    }
}

/// 批量计算质量分，按总分降序排列
pub fn batch_score(domains: &[(&str, &str)]) -> Vec<QualityScore> {
    let mut results: Vec<QualityScore> = domains
        .iter()
        .map(|(label, tld)| score(label, tld))
        .collect();
    results.sort_by(|a, b| b.total.cmp(&a.total));
    results
}

/// 是否为词典词汇
pub fn is_dictionary_word(word: &str) -> bool {
    COMMON_WORDS.contains(word.to_lowercase().as_str())
}

/// 是否可发音：至少一个元音，且连续辅音不超过 4 个
pub fn is_pronounceable(label: &str) -> bool {
    let mut has_vowel = false;
    let mut run = 0;
    let mut max_run = 0;
    for c in label.chars() {
        if VOWELS.contains(c) {
            has_vowel = true;
            run = 0;
        } else if CONSONANTS.contains(c) {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }
    has_vowel && max_run <= 4
}

fn length_score(length: usize) -> i32 {
    match length {
        0..=2 => 30,
        3 => 28,
        4 => 25,
        5 => 20,
        6 => 15,
        7..=8 => 10,
        9..=10 => 5,
        11..=15 => 2,
        _ => 0,
    }
}

fn charset_score(label: &str) -> i32 {
    if label.is_empty() {
        return 0;
    }
    if label.chars().all(char::is_alphabetic) {
        return 20;
    }
    if label.chars().all(|c| c.is_ascii_digit()) {
        return if label.chars().count() <= 4 { 15 } else { 8 };
    }
    if label.chars().all(char::is_alphanumeric) {
        let stem = label.trim_end_matches(|c: char| c.is_ascii_digit());
        if !stem.is_empty() && stem.chars().all(char::is_alphabetic) {
            return 15;
        }
        if label.starts_with(|c: char| c.is_ascii_digit()) {
            return 8;
        }
        return 10;
    }
    if label.matches('-').count() == 1 && !label.starts_with('-') && !label.ends_with('-') {
        return 5;
    }
    0
}

fn pattern_score(label: &str) -> i32 {
    let len = label.chars().count();
    let mut score = 0;

    if is_pronounceable(label) {
        score += 8;
    }
    if SUFFIXES
        .iter()
        .any(|s| label.ends_with(s) && len > s.len() + 1)
    {
        score += 3;
    }
    if PREFIXES
        .iter()
        .any(|p| label.starts_with(p) && len > p.len() + 1)
    {
        score += 3;
    }
    if has_triple_repeat(label) {
        score -= 5;
    }
    score.clamp(0, 15)
}

fn has_triple_repeat(label: &str) -> bool {
    let mut prev = None;
    let mut run = 0;
    for c in label.chars() {
        if Some(c) == prev {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}

fn tld_score(tld: &str) -> i32 {
    match tld {
        "com" | "ai" => 15,
        "dev" | "app" => 14,
        "io" => 12,
        "net" | "org" | "co" => 10,
        "tech" | "pro" | "cloud" => 8,
        "me" | "tv" | "shop" | "store" => 7,
        "blog" | "digital" | "media" | "news" | "live" => 6,
        "info" | "biz" | "site" | "online" => 5,
        "name" => 4,
        _ => 3,
    }
}

fn word_score(label: &str) -> i32 {
    if is_dictionary_word(label) {
        return 20;
    }

    let long_words = || COMMON_WORDS.iter().filter(|w| w.len() >= 3);
    if long_words().any(|w| label.starts_with(w) || label.ends_with(w)) {
        return 12;
    }
    if long_words().any(|w| label.contains(w)) {
        return 8;
    }

    let compound = COMMON_WORDS.iter().any(|first| {
        first.len() >= 2
            && label
                .strip_prefix(first)
                .map(is_dictionary_word)
                .unwrap_or(false)
    });
    if compound {
        return 15;
    }
    0
}

#[cfg(test)]
#[path = "quality_scorer_test.rs"]
mod tests;
