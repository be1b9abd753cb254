//! Compact string codec for card types ("AS", "2C", "TD") plus serde impls.
//!
//! The wire format is the 2-character rank+suit token; suits and trump use
//! uppercase names. Parsing errors surface as `DomainError`, never panics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Card, Rank, Suit, Trump};
use crate::errors::domain::{DomainError, ValidationKind};

impl Suit {
    pub fn as_str(self) -> &'static str {
        match self {
            Suit::Hearts => "HEARTS",
            Suit::Clubs => "CLUBS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Spades => "SPADES",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        match s {
            "HEARTS" => Some(Suit::Hearts),
            "CLUBS" => Some(Suit::Clubs),
            "DIAMONDS" => Some(Suit::Diamonds),
            "SPADES" => Some(Suit::Spades),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Spades => 'S',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'H' => Some(Suit::Hearts),
            'C' => Some(Suit::Clubs),
            'D' => Some(Suit::Diamonds),
            'S' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl Rank {
    fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err =
            || DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"));
        let mut chars = s.chars();
        let rank_ch = chars.next().ok_or_else(parse_err)?;
        let suit_ch = chars.next().ok_or_else(parse_err)?;
        if chars.next().is_some() {
            return Err(parse_err());
        }
        let rank = Rank::from_char(rank_ch).ok_or_else(parse_err)?;
        let suit = Suit::from_char(suit_ch).ok_or_else(parse_err)?;
        Ok(Card { suit, rank })
    }
}

/// Non-panicking helper to parse card tokens (e.g., "AS", "2C") into cards.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}

// Suit serde: uppercase names
impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Suit::from_name(&s).ok_or_else(|| serde::de::Error::custom(format!("Invalid suit: {s}")))
    }
}

// Trump serde: suit name or NO_TRUMP
impl Serialize for Trump {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Trump::Suit(suit) => serializer.serialize_str(suit.as_str()),
            Trump::NoTrump => serializer.serialize_str("NO_TRUMP"),
        }
    }
}

impl<'de> Deserialize<'de> for Trump {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "NO_TRUMP" {
            return Ok(Trump::NoTrump);
        }
        Suit::from_name(&s)
            .map(Trump::Suit)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid trump: {s}")))
    }
}

// Card serde: compact 2-character token
impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Card>()
            .map_err(|_| serde::de::Error::custom(format!("Invalid card: {s}")))
    }
}
