use std::fmt;

/// Card rank, 1..=13. 1 is the ace, 11..13 are jack, queen, king.
pub type Rank = u8;

pub const ACE: Rank = 1;
pub const JACK: Rank = 11;
pub const QUEEN: Rank = 12;
pub const KING: Rank = 13;

/// Card suit. The discriminant is the wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Suit> {
        match value {
            0 => Some(Suit::Hearts),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Clubs),
            3 => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

/// A playing card. Cards are values; two cards with the same rank and suit are
/// indistinguishable. `face_up` controls whether the identity is revealed to
/// external observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    pub face_up: bool,
}

impl Card {
    /// A face-down card of the given rank and suit.
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            face_up: false,
        }
    }

    pub fn face_up(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            face_up: true,
        }
    }

    /// Whether presentation layers may expose this card's identity.
    pub fn is_revealed(&self) -> bool {
        self.face_up
    }

    /// Blackjack value: ace counts 11 here; hand totalling demotes aces to 1
    /// as needed.
    pub fn blackjack_value(&self) -> u32 {
        match self.rank {
            ACE => 11,
            JACK | QUEEN | KING => 10,
            r => u32::from(r),
        }
    }

    /// Cribbage count value, used for fifteens and the pegging total.
    pub fn cribbage_value(&self) -> u32 {
        match self.rank {
            JACK | QUEEN | KING => 10,
            r => u32::from(r),
        }
    }

    pub fn rank_label(&self) -> &'static str {
        match self.rank {
            ACE => "A",
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            JACK => "J",
            QUEEN => "Q",
            KING => "K",
            _ => "?",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_label(), self.suit.symbol())
    }
}
