use rand::rngs::StdRng;
use rand::SeedableRng;
use uno_duel::game::deck::{Deck, CARDS_PER_HAND, INITIAL_DECK_COUNT};
use uno_duel::game::*;

fn deck() -> Deck {
    Deck::new(StdRng::seed_from_u64(7), 10)
}

/// R0 Y0 G0 B0 R1 R1 Y1 ... with action and wild cards last, top first.
fn numbers_first() -> Vec<UnoCard> {
    let mut order = new_deck();
    order.sort_by_key(|c| {
        let rank = c.get_number().map_or(10, |n| n.to_u8());
        (rank, c.color().map_or(4, |c| c.to_u8()))
    });
    order.reverse();
    order
}

#[cfg(test)]
mod deck_test {
    use super::*;

    #[test]
    fn test_ordered_deal() {
        let mut deck = deck();
        let deal = deck.start_game_with(numbers_first());

        assert_eq!(deal.player.len(), CARDS_PER_HAND);
        assert_eq!(deal.opponent.len(), CARDS_PER_HAND);
        assert_eq!(deck.len(), 108 - 15);
        assert_eq!(deck.len(), INITIAL_DECK_COUNT);
        assert_eq!(deal.player[0], UnoCard::NumberCard(Color::RED, Number::ZERO));
        assert_eq!(deal.opponent[0], UnoCard::NumberCard(Color::YELLOW, Number::ZERO));
        assert_eq!(deal.player[1], UnoCard::NumberCard(Color::GREEN, Number::ZERO));
        assert_eq!(deal.opponent[1], UnoCard::NumberCard(Color::BLUE, Number::ZERO));
        assert_eq!(deal.top, UnoCard::NumberCard(Color::YELLOW, Number::TWO));
        assert_eq!(
            deck.len() + deal.player.len() + deal.opponent.len() + 1,
            CARDS_PER_DECK
        );
    }

    #[test]
    fn test_opening_discard_skips_action_cards() {
        let mut order = numbers_first();
        // put two action cards and a wild on top of the pile after the deal
        let rest: Vec<UnoCard> = order.drain(order.len() - 14..).collect();
        order.push(UnoCard::WildCard(None, WildType::WILD));
        order.push(UnoCard::ActionCard(Color::RED, Action::SKIP));
        order.push(UnoCard::ActionCard(Color::BLUE, Action::DRAWTWO));
        order.extend(rest);

        let mut deck = deck();
        let deal = deck.start_game_with(order);
        assert!(deal.top.is_numeric());
        let top_three = &deck.cards()[deck.len() - 3..];
        assert!(top_three.iter().all(|c| !c.is_numeric()));
    }

    #[test]
    fn test_deal_balances_power() {
        let draw_four = UnoCard::WildCard(None, WildType::DRAWFOUR);
        let mut top = Vec::new();
        for color in Color::ALL {
            top.push(draw_four);
            top.push(UnoCard::NumberCard(color, Number::ONE));
        }
        let mut order: Vec<UnoCard> = new_deck();
        for card in &top {
            let idx = order.iter().position(|c| c == card).unwrap();
            order.remove(idx);
        }
        order.extend(top.into_iter().rev());

        let mut deck = deck();
        let deal = deck.start_game_with(order);
        let fours = |hand: &[UnoCard]| hand.iter().filter(|c| **c == draw_four).count();
        assert_eq!(fours(&deal.player), 2);
        assert_eq!(fours(&deal.opponent), 2);
    }

    #[test]
    fn test_reshuffle_clears_wild_colors() {
        let mut deck = deck();
        deck.restore(Vec::new());
        let mut discard = vec![
            UnoCard::WildCard(Some(Color::RED), WildType::WILD),
            UnoCard::WildCard(Some(Color::BLUE), WildType::DRAWFOUR),
            UnoCard::WildCard(Some(Color::GREEN), WildType::WILD),
        ];
        for number in 0..9 {
            discard.push(UnoCard::NumberCard(Color::YELLOW, Number::from_u8(number).unwrap()));
        }
        assert_eq!(discard.len(), 12);

        let drawn = deck.draw(&mut discard);

        assert!(discard.is_empty());
        assert_eq!(deck.len(), 11);
        let mut all: Vec<UnoCard> = deck.cards().to_vec();
        all.push(drawn);
        assert!(all.iter().filter(|c| c.is_wild()).all(|c| c.color().is_none()));
        assert_eq!(all.iter().filter(|c| c.is_wild()).count(), 3);
    }

    #[test]
    fn test_draw_from_empty_piles() {
        let mut deck = deck();
        let mut discard = Vec::new();
        let card = deck.draw(&mut discard);
        assert!(card.is_numeric());
        assert!(card.get_value() <= 2);
    }

    #[test]
    fn test_shuffled_deal_is_seeded() {
        let a = Deck::new(StdRng::seed_from_u64(42), 10).start_game();
        let b = Deck::new(StdRng::seed_from_u64(42), 10).start_game();
        assert_eq!(a, b);
        let mut deck = deck();
        let deal = deck.start_game();
        assert_eq!(deck.len(), INITIAL_DECK_COUNT);
        assert!(deal.top.is_numeric());
    }
}
