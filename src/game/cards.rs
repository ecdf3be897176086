use std::cmp::Ordering;
use std::fmt::Display;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CardError;

pub const CARDS_PER_DECK: usize = 108;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum UnoCard {
    NumberCard(Color, Number),
    ActionCard(Color, Action),
    WildCard(Option<Color>, WildType),
}

/// What a card matches on besides its color.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Rank {
    Number(Number),
    Action(Action),
}

impl UnoCard {
    pub fn get_color(&self) -> Result<Color, CardError> {
        match self {
            UnoCard::NumberCard(color, _) => Ok(*color),
            UnoCard::ActionCard(color, _) => Ok(*color),
            UnoCard::WildCard(color, _) => color.ok_or(CardError::ColorNotSet),
        }
    }

    pub fn color(&self) -> Option<Color> {
        self.get_color().ok()
    }

    pub fn get_number(&self) -> Option<&Number> {
        match self {
            UnoCard::NumberCard(_, number) => Some(number),
            UnoCard::ActionCard(_, _) => None,
            UnoCard::WildCard(_, _) => None,
        }
    }

    pub fn rank(&self) -> Option<Rank> {
        match self {
            UnoCard::NumberCard(_, number) => Some(Rank::Number(*number)),
            UnoCard::ActionCard(_, action) => Some(Rank::Action(*action)),
            UnoCard::WildCard(_, _) => None,
        }
    }

    pub fn is_wild(&self) -> bool {
        matches!(self, UnoCard::WildCard(_, _))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, UnoCard::NumberCard(_, _))
    }

    /// Skip-class cards hand the turn straight back to whoever played them.
    pub fn is_skip(&self) -> bool {
        match self {
            UnoCard::NumberCard(_, _) => false,
            UnoCard::ActionCard(_, _) => true,
            UnoCard::WildCard(_, wild_type) => *wild_type == WildType::DRAWFOUR,
        }
    }

    pub fn card_draws(&self) -> usize {
        match self {
            UnoCard::ActionCard(_, Action::DRAWTWO) => 2,
            UnoCard::WildCard(_, WildType::DRAWFOUR) => 4,
            _ => 0,
        }
    }

    pub fn can_play(&self, color: Color, rank: Option<Rank>) -> bool {
        match self {
            UnoCard::WildCard(_, _) => true,
            _ => self.color() == Some(color) || (rank.is_some() && self.rank() == rank),
        }
    }

    pub fn can_play_on(&self, top: &UnoCard) -> bool {
        match top.color() {
            Some(color) => self.can_play(color, top.rank()),
            None => true,
        }
    }

    /// True when `other` is this card, possibly with a wild color filled in.
    pub fn can_become(&self, other: &UnoCard) -> bool {
        match (self, other) {
            (UnoCard::WildCard(c1, w1), UnoCard::WildCard(c2, w2)) => {
                w1 == w2 && (c1.is_none() || c1 == c2)
            }
            (UnoCard::WildCard(_, _), _) | (_, UnoCard::WildCard(_, _)) => false,
            _ => self == other,
        }
    }

    pub fn order_code(&self) -> u8 {
        match self {
            UnoCard::NumberCard(color, number) => 10 + color.to_u8() * 13 + number.to_u8(),
            UnoCard::ActionCard(color, action) => 10 + color.to_u8() * 13 + action.to_u8(),
            UnoCard::WildCard(_, WildType::WILD) => 62,
            UnoCard::WildCard(_, WildType::DRAWFOUR) => 63,
        }
    }

    pub fn power_code(&self) -> i32 {
        match self {
            UnoCard::NumberCard(_, Number::ZERO) => 1,
            UnoCard::NumberCard(_, _) => 0,
            UnoCard::ActionCard(_, Action::DRAWTWO) => 10,
            UnoCard::ActionCard(_, _) => 5,
            UnoCard::WildCard(_, WildType::WILD) => 12,
            UnoCard::WildCard(_, WildType::DRAWFOUR) => 16,
        }
    }

    pub fn get_value(&self) -> i32 {
        // face value for numbers, 20 for actions, 50 for wilds
        match self {
            UnoCard::NumberCard(_, number) => number.to_u8() as i32,
            UnoCard::WildCard(_, _) => 50,
            UnoCard::ActionCard(_, _) => 20,
        }
    }

    /// Assigning the same color twice is a no-op, so replays stay harmless.
    pub fn set_color(&mut self, color: Color) {
        if let UnoCard::WildCard(c, _) = self {
            *c = Some(color);
        }
    }

    pub fn with_color(mut self, color: Color) -> UnoCard {
        self.set_color(color);
        self
    }

    pub fn cleared(self) -> UnoCard {
        match self {
            UnoCard::WildCard(_, wild_type) => UnoCard::WildCard(None, wild_type),
            card => card,
        }
    }

    pub fn encode(&self) -> String {
        let (kind, color) = match self {
            UnoCard::NumberCard(color, number) => ((b'0' + number.to_u8()) as char, color.code()),
            UnoCard::ActionCard(color, action) => (action.code(), color.code()),
            UnoCard::WildCard(color, wild_type) => {
                (wild_type.code(), color.map(|c| c.code()).unwrap_or('?'))
            }
        };
        let mut s = String::with_capacity(2);
        s.push(kind);
        s.push(color);
        s
    }

    pub fn decode(s: &str) -> Result<UnoCard, CardError> {
        let malformed = || CardError::Malformed(s.to_string());
        let mut chars = s.chars();
        let (Some(kind), Some(color), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(malformed());
        };
        let color = if color == '?' {
            None
        } else {
            Some(Color::from_code(color).ok_or_else(malformed)?)
        };
        match (kind, color) {
            ('W', color) => Ok(UnoCard::WildCard(color, WildType::WILD)),
            ('D', color) => Ok(UnoCard::WildCard(color, WildType::DRAWFOUR)),
            (_, None) => Err(malformed()),
            (k @ '0'..='9', Some(color)) => {
                let number = Number::from_u8(k as u8 - b'0').ok_or_else(malformed)?;
                Ok(UnoCard::NumberCard(color, number))
            }
            (k, Some(color)) => {
                let action = Action::from_code(k).ok_or_else(malformed)?;
                Ok(UnoCard::ActionCard(color, action))
            }
        }
    }
}

impl PartialOrd for UnoCard {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnoCard {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_code()
            .cmp(&other.order_code())
            .then_with(|| self.color().map(|c| c.to_u8()).cmp(&other.color().map(|c| c.to_u8())))
    }
}

impl Display for UnoCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnoCard::NumberCard(color, number) => write!(f, "({} {})", color.name(), number)?,
            UnoCard::ActionCard(color, action) => write!(f, "({} {})", color.name(), action)?,
            UnoCard::WildCard(color, wild_type) => {
                if let Some(c) = color {
                    write!(f, "({} {})", wild_type, c.name())?
                } else {
                    write!(f, "({})", wild_type)?
                }
            }
        }
        Ok(())
    }
}

/// Builds the ordered 108-card deck: per color one 0, two of 1-9 and two of
/// each action, plus four of each wild.
pub fn new_deck() -> Vec<UnoCard> {
    let mut cards = Vec::with_capacity(CARDS_PER_DECK);
    for color in Color::ALL {
        cards.push(UnoCard::NumberCard(color, Number::ZERO));
        for _ in 0..2 {
            for number in 1..10 {
                if let Some(num) = Number::from_u8(number) {
                    cards.push(UnoCard::NumberCard(color, num));
                }
            }
            cards.push(UnoCard::ActionCard(color, Action::SKIP));
            cards.push(UnoCard::ActionCard(color, Action::REVERSE));
            cards.push(UnoCard::ActionCard(color, Action::DRAWTWO));
        }
    }
    for _ in 0..4 {
        cards.push(UnoCard::WildCard(None, WildType::WILD));
        cards.push(UnoCard::WildCard(None, WildType::DRAWFOUR));
    }
    cards
}

pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<UnoCard> {
    let mut cards = new_deck();
    cards.shuffle(rng);
    cards
}

pub fn encode_cards<'a, I>(cards: I) -> String
where
    I: IntoIterator<Item = &'a UnoCard>,
{
    cards.into_iter().map(|c| c.encode()).collect::<Vec<_>>().join(" ")
}

pub fn decode_cards(s: &str) -> Result<Vec<UnoCard>, CardError> {
    s.split_whitespace().map(UnoCard::decode).collect()
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Color {
    RED,
    YELLOW,
    GREEN,
    BLUE,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::RED, Color::YELLOW, Color::GREEN, Color::BLUE];

    pub fn from_u8(val: u8) -> Option<Color> {
        match val {
            0 => Some(Color::RED),
            1 => Some(Color::YELLOW),
            2 => Some(Color::GREEN),
            3 => Some(Color::BLUE),
            _ => None,
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Color::RED => 0,
            Color::YELLOW => 1,
            Color::GREEN => 2,
            Color::BLUE => 3,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Color::RED => 'r',
            Color::YELLOW => 'y',
            Color::GREEN => 'g',
            Color::BLUE => 'b',
        }
    }

    pub fn from_code(c: char) -> Option<Color> {
        match c {
            'r' => Some(Color::RED),
            'y' => Some(Color::YELLOW),
            'g' => Some(Color::GREEN),
            'b' => Some(Color::BLUE),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::RED => "Red",
            Color::YELLOW => "Yellow",
            Color::GREEN => "Green",
            Color::BLUE => "Blue",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>6}", self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Number {
    ZERO,
    ONE,
    TWO,
    THREE,
    FOUR,
    FIVE,
    SIX,
    SEVEN,
    EIGHT,
    NINE,
}

impl Number {
    pub fn from_u8(val: u8) -> Option<Number> {
        match val {
            0 => Some(Number::ZERO),
            1 => Some(Number::ONE),
            2 => Some(Number::TWO),
            3 => Some(Number::THREE),
            4 => Some(Number::FOUR),
            5 => Some(Number::FIVE),
            6 => Some(Number::SIX),
            7 => Some(Number::SEVEN),
            8 => Some(Number::EIGHT),
            9 => Some(Number::NINE),
            _ => None,
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Number::ZERO => 0,
            Number::ONE => 1,
            Number::TWO => 2,
            Number::THREE => 3,
            Number::FOUR => 4,
            Number::FIVE => 5,
            Number::SIX => 6,
            Number::SEVEN => 7,
            Number::EIGHT => 8,
            Number::NINE => 9,
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_u8())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Action {
    SKIP,
    REVERSE,
    DRAWTWO,
}

impl Action {
    pub fn to_u8(&self) -> u8 {
        match self {
            Action::SKIP => 10,
            Action::REVERSE => 11,
            Action::DRAWTWO => 12,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Action::SKIP => 's',
            Action::REVERSE => 'r',
            Action::DRAWTWO => 'd',
        }
    }

    pub fn from_code(c: char) -> Option<Action> {
        match c {
            's' => Some(Action::SKIP),
            'r' => Some(Action::REVERSE),
            'd' => Some(Action::DRAWTWO),
            _ => None,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::SKIP => write!(f, "Skip")?,
            Action::REVERSE => write!(f, "Reverse")?,
            Action::DRAWTWO => write!(f, "Draw two")?,
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum WildType {
    WILD,
    DRAWFOUR,
}

impl WildType {
    pub fn code(&self) -> char {
        match self {
            WildType::WILD => 'W',
            WildType::DRAWFOUR => 'D',
        }
    }
}

impl Display for WildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WildType::WILD => write!(f, "Wild")?,
            WildType::DRAWFOUR => write!(f, "Draw four")?,
        }
        Ok(())
    }
}

/// A cheap stand-in card used only when both piles are somehow empty.
pub fn low_value_card<R: Rng + ?Sized>(rng: &mut R) -> UnoCard {
    let color = Color::ALL[rng.gen_range(0..4)];
    let number = Number::from_u8(rng.gen_range(0..3)).unwrap_or(Number::ZERO);
    UnoCard::NumberCard(color, number)
}
