use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Suit {
    Club,
    Spade,
    Heart,
    Diamond,
}

impl Suit {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen()
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Suit::Club => "♣",
            Suit::Spade => "♠",
            Suit::Heart => "♥",
            Suit::Diamond => "♦",
        }
    }

    /// Reverse of [`Suit::glyph`]. Anything that is not one of the four
    /// glyphs decodes to `None`.
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        Suit::iter().find(|suit| suit.glyph() == glyph)
    }

    pub fn glyphs() -> impl Iterator<Item = &'static str> {
        Suit::iter().map(|suit| suit.glyph())
    }
}

impl Distribution<Suit> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Suit {
        match rng.gen_range(0..4) {
            0 => Suit::Club,
            1 => Suit::Spade,
            2 => Suit::Heart,
            _ => Suit::Diamond,
        }
    }
}
