//! Cribbage scoring: pegging points on the running pile, and show scoring
//! for a hand or crib plus the starter.

use crate::cards::{Card, JACK};

/// Points earned by the card most recently laid on the pegging pile.
///
/// `played` is the current round's pile, newest card last. Fifteens and
/// thirty-ones come from the pile total; pairs and runs from the trailing
/// cards.
pub fn pegging_points(played: &[Card]) -> u32 {
    let total: u32 = played.iter().map(Card::cribbage_value).sum();
    let mut points = 0;
    if total == 15 {
        points += 2;
    }
    if total == 31 {
        points += 2;
    }
    points + trailing_pair_points(played) + trailing_run_points(played)
}

/// If the last k >= 2 cards share a rank, score k * (k - 1): 2 for a pair,
/// 6 for three of a kind, 12 for four.
fn trailing_pair_points(played: &[Card]) -> u32 {
    let last = match played.last() {
        Some(card) => card,
        None => return 0,
    };
    let k = played
        .iter()
        .rev()
        .take_while(|card| card.rank == last.rank)
        .count() as u32;
    if k >= 2 {
        k * (k - 1)
    } else {
        0
    }
}

/// Largest k >= 3 such that the last k cards are k distinct consecutive
/// ranks in any order. A window with a duplicate rank never forms a run.
fn trailing_run_points(played: &[Card]) -> u32 {
    let n = played.len();
    for k in (3..=n).rev() {
        let mut ranks: Vec<u8> = played[n - k..].iter().map(|card| card.rank).collect();
        ranks.sort_unstable();
        if ranks.windows(2).all(|pair| pair[1] == pair[0] + 1) {
            return k as u32;
        }
    }
    0
}

/// Show scoring for a 4-card hand (or crib) plus the starter.
///
/// Fifteens are enumerated over all subsets of the five cards. The crib only
/// scores a flush when all five cards share a suit.
pub fn show_points(hand: &[Card], starter: Card, is_crib: bool) -> u32 {
    let mut bundle: Vec<Card> = hand.to_vec();
    bundle.push(starter);
    fifteen_points(&bundle)
        + pair_points(&bundle)
        + run_points(&bundle)
        + flush_points(hand, starter, is_crib)
        + nobs_points(hand, starter)
}

/// 2 points for each distinct subset summing to 15.
fn fifteen_points(cards: &[Card]) -> u32 {
    let mut points = 0;
    for mask in 1u32..(1 << cards.len()) {
        let sum: u32 = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, card)| card.cribbage_value())
            .sum();
        if sum == 15 {
            points += 2;
        }
    }
    points
}

/// 2 points per unordered pair of equal ranks: n of a rank is n * (n - 1).
fn pair_points(cards: &[Card]) -> u32 {
    rank_counts(cards)
        .iter()
        .map(|&n| n * n.saturating_sub(1))
        .sum()
}

/// Longest chains of consecutive ranks (length >= 3) score their length
/// multiplied by the product of rank multiplicities, so a double run of
/// three is worth 6.
fn run_points(cards: &[Card]) -> u32 {
    let counts = rank_counts(cards);
    let mut points = 0;
    let mut rank = 1;
    while rank <= 13 {
        if counts[rank] == 0 {
            rank += 1;
            continue;
        }
        let mut length = 0u32;
        let mut multiplicity = 1u32;
        while rank <= 13 && counts[rank] > 0 {
            length += 1;
            multiplicity *= counts[rank];
            rank += 1;
        }
        if length >= 3 {
            points += length * multiplicity;
        }
    }
    points
}

fn flush_points(hand: &[Card], starter: Card, is_crib: bool) -> u32 {
    let suit = match hand.first() {
        Some(card) => card.suit,
        None => return 0,
    };
    if !hand.iter().all(|card| card.suit == suit) {
        return 0;
    }
    let with_starter = starter.suit == suit;
    match (is_crib, with_starter) {
        (_, true) => 5,
        (false, false) => 4,
        (true, false) => 0,
    }
}

/// 1 point for holding the jack of the starter's suit.
fn nobs_points(hand: &[Card], starter: Card) -> u32 {
    u32::from(
        hand.iter()
            .any(|card| card.rank == JACK && card.suit == starter.suit),
    )
}

fn rank_counts(cards: &[Card]) -> [u32; 14] {
    let mut counts = [0u32; 14];
    for card in cards {
        counts[card.rank as usize] += 1;
    }
    counts
}
