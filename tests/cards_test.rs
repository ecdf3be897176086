use uno_duel::game::*;
use uno_duel::CardError;

#[cfg(test)]
mod card_tests {
    use super::*;

    #[test]
    fn test_encode_round_trip() {
        let mut deck = new_deck();
        deck.push(UnoCard::WildCard(Some(Color::BLUE), WildType::WILD));
        deck.push(UnoCard::WildCard(Some(Color::GREEN), WildType::DRAWFOUR));
        for card in deck {
            let code = card.encode();
            assert_eq!(code.len(), 2);
            assert_eq!(UnoCard::decode(&code), Ok(card));
        }
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(
            UnoCard::decode("5r"),
            Ok(UnoCard::NumberCard(Color::RED, Number::FIVE))
        );
        assert_eq!(
            UnoCard::decode("Dr"),
            Ok(UnoCard::WildCard(Some(Color::RED), WildType::DRAWFOUR))
        );
        assert_eq!(
            UnoCard::decode("W?"),
            Ok(UnoCard::WildCard(None, WildType::WILD))
        );
        assert_eq!(
            UnoCard::decode("sy"),
            Ok(UnoCard::ActionCard(Color::YELLOW, Action::SKIP))
        );
        assert_eq!(UnoCard::ActionCard(Color::GREEN, Action::DRAWTWO).encode(), "dg");
    }

    #[test]
    fn test_malformed_cards() {
        for bad in ["", "5", "5rr", "5x", "xr", "5?", "s?"] {
            assert_eq!(
                UnoCard::decode(bad),
                Err(CardError::Malformed(bad.to_string())),
                "{:?} should not decode",
                bad
            );
        }
        assert!(decode_cards("5r 6g zz").is_err());
        assert!(decode_cards("").unwrap().is_empty());
    }

    #[test]
    fn test_new_deck() {
        let deck = new_deck();
        assert_eq!(deck.len(), CARDS_PER_DECK);
        assert_eq!(deck.iter().filter(|c| c.is_wild()).count(), 8);
        for color in Color::ALL {
            let of_color = deck
                .iter()
                .filter(|c| !c.is_wild() && c.color() == Some(color))
                .count();
            assert_eq!(of_color, 25);
        }
        assert!(deck.iter().all(|c| !c.is_wild() || c.color().is_none()));
    }

    #[test]
    fn test_can_become() {
        let red5 = UnoCard::NumberCard(Color::RED, Number::FIVE);
        let wild = UnoCard::WildCard(None, WildType::WILD);
        let draw_four = UnoCard::WildCard(None, WildType::DRAWFOUR);
        let red_draw_four = UnoCard::WildCard(Some(Color::RED), WildType::DRAWFOUR);

        for card in new_deck().into_iter().filter(|c| !c.is_wild()) {
            assert!(card.can_become(&card));
        }
        assert!(draw_four.can_become(&red_draw_four));
        assert!(red_draw_four.can_become(&red_draw_four));
        assert!(!red_draw_four.can_become(&draw_four.with_color(Color::BLUE)));
        assert!(!wild.can_become(&red_draw_four));
        assert!(!wild.can_become(&red5));
        assert!(!red5.can_become(&wild));
        assert!(!red5.can_become(&UnoCard::NumberCard(Color::RED, Number::SIX)));
        assert!(!red5.can_become(&UnoCard::NumberCard(Color::BLUE, Number::FIVE)));
    }

    #[test]
    fn test_can_play_on() {
        let top = UnoCard::NumberCard(Color::RED, Number::FIVE);
        assert!(UnoCard::NumberCard(Color::RED, Number::THREE).can_play_on(&top));
        assert!(UnoCard::NumberCard(Color::BLUE, Number::FIVE).can_play_on(&top));
        assert!(UnoCard::ActionCard(Color::RED, Action::SKIP).can_play_on(&top));
        assert!(UnoCard::WildCard(None, WildType::WILD).can_play_on(&top));
        assert!(!UnoCard::NumberCard(Color::BLUE, Number::SIX).can_play_on(&top));
        assert!(!UnoCard::ActionCard(Color::GREEN, Action::REVERSE).can_play_on(&top));

        let skip = UnoCard::ActionCard(Color::YELLOW, Action::SKIP);
        assert!(UnoCard::ActionCard(Color::BLUE, Action::SKIP).can_play_on(&skip));
        let chosen = UnoCard::WildCard(Some(Color::GREEN), WildType::DRAWFOUR);
        assert!(UnoCard::NumberCard(Color::GREEN, Number::ONE).can_play_on(&chosen));
        assert!(!UnoCard::NumberCard(Color::RED, Number::ONE).can_play_on(&chosen));
    }

    #[test]
    fn test_skip_class_and_draws() {
        assert!(UnoCard::ActionCard(Color::RED, Action::REVERSE).is_skip());
        assert!(UnoCard::WildCard(None, WildType::DRAWFOUR).is_skip());
        assert!(!UnoCard::WildCard(None, WildType::WILD).is_skip());
        assert!(!UnoCard::NumberCard(Color::RED, Number::NINE).is_skip());
        assert_eq!(UnoCard::ActionCard(Color::RED, Action::DRAWTWO).card_draws(), 2);
        assert_eq!(UnoCard::WildCard(None, WildType::DRAWFOUR).card_draws(), 4);
        assert_eq!(UnoCard::ActionCard(Color::RED, Action::SKIP).card_draws(), 0);
    }

    #[test]
    fn test_order_and_power_codes() {
        assert_eq!(UnoCard::NumberCard(Color::RED, Number::ZERO).order_code(), 10);
        assert_eq!(UnoCard::ActionCard(Color::YELLOW, Action::DRAWTWO).order_code(), 35);
        assert_eq!(UnoCard::WildCard(None, WildType::WILD).order_code(), 62);
        assert_eq!(UnoCard::WildCard(None, WildType::DRAWFOUR).order_code(), 63);
        let mut hand = vec![
            UnoCard::WildCard(None, WildType::WILD),
            UnoCard::NumberCard(Color::BLUE, Number::ONE),
            UnoCard::NumberCard(Color::RED, Number::NINE),
        ];
        hand.sort();
        assert_eq!(hand[0], UnoCard::NumberCard(Color::RED, Number::NINE));
        assert!(new_deck().iter().all(|c| (0..=16).contains(&c.power_code())));
    }

    #[test]
    fn test_wild_color() {
        let mut card = UnoCard::WildCard(None, WildType::WILD);
        assert_eq!(card.get_color(), Err(CardError::ColorNotSet));
        card.set_color(Color::GREEN);
        card.set_color(Color::GREEN);
        assert_eq!(card.color(), Some(Color::GREEN));
        assert_eq!(card.cleared(), UnoCard::WildCard(None, WildType::WILD));
    }
}
