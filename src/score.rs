use std::{collections::BTreeMap, ops::RangeInclusive};

use rand::Rng;

use crate::{category::Category, record::EvaluationRecord};

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 10;

/// Range a score is drawn from when a category has no answer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum FallbackRange {
    /// 1 to 5
    #[default]
    Low,

    /// 1 to 10
    Full,
}

impl FallbackRange {
    pub fn range(&self) -> RangeInclusive<u8> {
        match self {
            FallbackRange::Low => SCORE_MIN..=5,
            FallbackRange::Full => SCORE_MIN..=SCORE_MAX,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap(BTreeMap<Category, u8>);

impl ScoreMap {
    pub fn get(&self, category: Category) -> Option<u8> {
        self.0.get(&category).copied()
    }

    pub fn set(&mut self, category: Category, score: u8) {
        self.0.insert(category, score.clamp(SCORE_MIN, SCORE_MAX));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u8)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unweighted mean of all scores.
    pub fn overall(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }

        let sum: u32 = self.0.values().map(|v| *v as u32).sum();
        sum as f64 / self.0.len() as f64
    }
}

impl FromIterator<(Category, u8)> for ScoreMap {
    fn from_iter<T: IntoIterator<Item = (Category, u8)>>(iter: T) -> Self {
        let mut map = ScoreMap(BTreeMap::new());
        for (category, score) in iter {
            map.set(category, score);
        }
        map
    }
}

/// Character count of the answer modulo 10, with 0 raised to 1.
pub fn score_value(value: &str) -> u8 {
    let remainder = (value.chars().count() % 10) as u8;
    remainder.clamp(SCORE_MIN, SCORE_MAX)
}

/// Score every category of `record`, drawing from `fallback` for the absent ones.
pub fn score_record<R: Rng>(
    record: &EvaluationRecord,
    fallback: FallbackRange,
    rng: &mut R,
) -> ScoreMap {
    record
        .iter()
        .map(|(category, value)| {
            let score = match value {
                Some(value) => score_value(value),
                None => rng.gen_range(fallback.range()),
            };
            (category, score)
        })
        .collect()
}
