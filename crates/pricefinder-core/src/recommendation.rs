//! Fixed vocabularies attached to a ranked listing.
//!
//! The wire form of each variant is the label below. Parsing is lenient
//! because these strings come back from a language model: matching ignores
//! case, a leading emoji, and surrounding punctuation, and it accepts the
//! Spanish labels earlier releases emitted.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// Recommendation tags in order of desirability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecommendationTag {
    BestOption,
    GoodAlternative,
    Consider,
    NotRecommended,
}

impl RecommendationTag {
    pub const ALL: [RecommendationTag; 4] = [
        RecommendationTag::BestOption,
        RecommendationTag::GoodAlternative,
        RecommendationTag::Consider,
        RecommendationTag::NotRecommended,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RecommendationTag::BestOption => "🏆 Best Option",
            RecommendationTag::GoodAlternative => "✅ Good Alternative",
            RecommendationTag::Consider => "⚠️ Consider",
            RecommendationTag::NotRecommended => "❌ Not Recommended",
        }
    }
}

impl std::fmt::Display for RecommendationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecommendationTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = fold(s);
        let tag = match key.as_str() {
            "best option" | "best price" | "mejor opcion" | "mejor precio" => {
                RecommendationTag::BestOption
            }
            "good alternative" | "alternative" | "buena alternativa" | "alternativa" => {
                RecommendationTag::GoodAlternative
            }
            "consider" | "considerar" => RecommendationTag::Consider,
            "not recommended" | "no recomendado" => RecommendationTag::NotRecommended,
            _ => return Err(CoreError::UnknownRecommendation(s.to_string())),
        };
        Ok(tag)
    }
}

/// How closely a listing matches the searched product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    Identical,
    #[default]
    Similar,
    Alternative,
    Different,
}

impl Category {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Identical => "Identical",
            Category::Similar => "Similar",
            Category::Alternative => "Alternative",
            Category::Different => "Different",
        }
    }

    /// Unknown labels fall back to [`Category::Similar`].
    #[must_use]
    pub fn from_label(s: &str) -> Self {
        match fold(s).as_str() {
            "identical" | "identico" => Category::Identical,
            "alternative" | "alternativa" | "alternativo" => Category::Alternative,
            "different" | "diferente" => Category::Different,
            _ => Category::Similar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    New,
    Refurbished,
    Used,
    #[default]
    Unknown,
}

impl Condition {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::Refurbished => "Refurbished",
            Condition::Used => "Used",
            Condition::Unknown => "Unknown",
        }
    }

    /// Unknown labels fall back to [`Condition::Unknown`].
    #[must_use]
    pub fn from_label(s: &str) -> Self {
        match fold(s).as_str() {
            "new" | "nuevo" => Condition::New,
            "refurbished" | "renewed" | "reacondicionado" => Condition::Refurbished,
            "used" | "pre-owned" | "usado" => Condition::Used,
            _ => Condition::Unknown,
        }
    }
}

/// Lowercases, strips accents used by the Spanish labels, and drops anything
/// that is not a letter, a space, or a hyphen (emoji, variation selectors).
fn fold(s: &str) -> String {
    let folded: String = s
        .chars()
        .map(|c| match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' => 'u',
            other => other.to_ascii_lowercase(),
        })
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ' || *c == '-')
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

macro_rules! label_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }
    };
}

label_serde!(RecommendationTag);
label_serde!(Category);
label_serde!(Condition);

impl<'de> Deserialize<'de> for RecommendationTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::from_label(&raw))
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Condition::from_label(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_parses_canonical_labels() {
        for tag in RecommendationTag::ALL {
            assert_eq!(tag.label().parse::<RecommendationTag>().unwrap(), tag);
        }
    }

    #[test]
    fn tag_parses_without_emoji_and_in_spanish() {
        assert_eq!(
            "best option".parse::<RecommendationTag>().unwrap(),
            RecommendationTag::BestOption
        );
        assert_eq!(
            "🏆 Mejor Opción".parse::<RecommendationTag>().unwrap(),
            RecommendationTag::BestOption
        );
        assert_eq!(
            "Mejor Precio".parse::<RecommendationTag>().unwrap(),
            RecommendationTag::BestOption
        );
        assert_eq!(
            "⚠️ Considerar".parse::<RecommendationTag>().unwrap(),
            RecommendationTag::Consider
        );
        assert_eq!(
            "NOT RECOMMENDED".parse::<RecommendationTag>().unwrap(),
            RecommendationTag::NotRecommended
        );
    }

    #[test]
    fn tag_rejects_unknown_label() {
        assert!("maybe".parse::<RecommendationTag>().is_err());
    }

    #[test]
    fn category_and_condition_fall_back() {
        assert_eq!(Category::from_label("Idéntico"), Category::Identical);
        assert_eq!(Category::from_label("whatever"), Category::Similar);
        assert_eq!(Condition::from_label("Reacondicionado"), Condition::Refurbished);
        assert_eq!(Condition::from_label(""), Condition::Unknown);
    }

    #[test]
    fn tag_serializes_as_emoji_label() {
        let json = serde_json::to_string(&RecommendationTag::GoodAlternative).unwrap();
        assert_eq!(json, "\"✅ Good Alternative\"");
    }
}
