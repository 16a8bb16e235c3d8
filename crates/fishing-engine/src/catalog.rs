use std::fmt::Display;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    rarity::{Rarity, RarityTable},
    settings::ConfigError,
};

/// Inclusive numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Uniform draw within `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && 0.0 <= self.min && self.min <= self.max
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub rarity: String,
    pub size_cm: Span,
    pub weight_kg: Span,
    pub description: String,
}

impl Item {
    /// Highest base score the declared ranges allow.
    pub fn theoretical_max(&self) -> u32 {
        (self.weight_kg.max * 10.0 + self.size_cm.max).round().max(1.0) as u32
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] ({}cm, {}kg)",
            self.name, self.rarity, self.size_cm, self.weight_kg
        )
    }
}

/// The validated, non-empty set of catchable items.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
    rarities: RarityTable,
}

impl Catalog {
    pub fn new(items: Vec<Item>, rarities: RarityTable) -> Result<Self, ConfigError> {
        if items.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        for (index, item) in items.iter().enumerate() {
            if items[..index]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&item.name))
            {
                return Err(ConfigError::DuplicateItem(item.name.clone()));
            }

            if rarities.get(&item.rarity).is_none() {
                return Err(ConfigError::UnknownRarity {
                    item: item.name.clone(),
                    rarity: item.rarity.clone(),
                });
            }

            for (axis, span) in [("size", item.size_cm), ("weight", item.weight_kg)] {
                if !span.is_valid() {
                    return Err(ConfigError::InvalidRange {
                        item: item.name.clone(),
                        axis,
                        min: span.min,
                        max: span.max,
                    });
                }
            }
        }

        Ok(Self { items, rarities })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn rarities(&self) -> &RarityTable {
        &self.rarities
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive exact lookup.
    pub fn find(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    /// Items whose name contains `fragment`, ignoring case.
    pub fn search<'a>(&'a self, fragment: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        let fragment = fragment.to_lowercase();
        self.items
            .iter()
            .filter(move |item| item.name.to_lowercase().contains(&fragment))
    }

    pub fn rarity_of(&self, item: &Item) -> &Rarity {
        self.rarities
            .get(&item.rarity)
            .expect("catalog items reference known rarities")
    }

    pub fn base_weight(&self, item: &Item) -> f64 {
        self.rarity_of(item).weight
    }

    /// Chance of drawing `item` once the special outcomes have been ruled out,
    /// ignoring recency dampening.
    pub fn chance(&self, item: &Item) -> f64 {
        let total: f64 = self.items.iter().map(|item| self.base_weight(item)).sum();
        self.base_weight(item) / total
    }

    /// Items sorted rarest first, then by name.
    pub fn by_rarity(&self) -> Vec<&Item> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|a, b| {
            self.rarities
                .rank(&a.rarity)
                .cmp(&self.rarities.rank(&b.rarity))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        items
    }
}
