use std::fmt::Display;

use crate::settings::ConfigError;

/// A named rarity bucket.
///
/// `weight` is the relative selection density of every item in this tier:
/// junk has the largest weight, the rarest tiers the smallest.
#[derive(Debug, Clone, PartialEq)]
pub struct Rarity {
    pub name: String,
    pub weight: f64,
    pub color: u32,
}

impl Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut capitalize = true;

        for c in self.name.chars() {
            if capitalize {
                write!(f, "{}", c.to_uppercase())?;
            } else {
                write!(f, "{c}")?;
            }
            capitalize = c == '-' || c == ' ';
        }

        Ok(())
    }
}

/// Rarity tiers ordered from rarest to most common.
#[derive(Debug, Clone, PartialEq)]
pub struct RarityTable {
    tiers: Vec<Rarity>,
}

impl RarityTable {
    pub fn new(tiers: Vec<Rarity>) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::NoRarities);
        }

        for (index, tier) in tiers.iter().enumerate() {
            if !tier.weight.is_finite() || tier.weight <= 0.0 {
                return Err(ConfigError::InvalidRarityWeight {
                    rarity: tier.name.clone(),
                    weight: tier.weight,
                });
            }

            if tiers[..index].iter().any(|other| other.name == tier.name) {
                return Err(ConfigError::DuplicateRarity(tier.name.clone()));
            }
        }

        // rarer tiers come first and must never outweigh a more common one
        if let Some(pair) = tiers.windows(2).find(|pair| pair[0].weight > pair[1].weight) {
            return Err(ConfigError::RarityOrder {
                rarer: pair[0].name.clone(),
                common: pair[1].name.clone(),
            });
        }

        Ok(Self { tiers })
    }

    pub fn get(&self, name: &str) -> Option<&Rarity> {
        self.tiers.iter().find(|tier| tier.name == name)
    }

    pub fn weight(&self, name: &str) -> Option<f64> {
        self.get(name).map(|tier| tier.weight)
    }

    /// Position of the tier, `0` being the rarest.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|tier| tier.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rarity> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// Parses `#rrggbb`, `0xrrggbb` or bare `rrggbb` into a packed RGB value.
pub fn parse_color(color: &str) -> Option<u32> {
    let hex = color
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x");

    if hex.len() != 6 {
        return None;
    }

    u32::from_str_radix(hex, 16).ok()
}
