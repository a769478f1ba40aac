//! Arithmetic of a single match.
//!
//! ## Buyer
//!
//! The buyer can take `intent = exchangeable / buy_price` secondary. The
//! match fills `limiting = min(intent, seller exchangeable)`. The buyer pays
//! `limiting * match_price` to the seller and is charged commission on that
//! payment, pro rata to its reserve. Whatever it set aside at its own price
//! but did not pay, plus the commission reserve it did not use, comes back
//! as change.
//!
//! A buyer whose intent is fully covered leaves the book and takes its
//! whole deposit with it, rounding dust included.
//!
//! ## Seller
//!
//! The seller delivers `limiting` secondary and is charged the commission
//! reserved for that portion. It receives the buyer's payment; under
//! [`SurplusPolicy::Retained`] only its own price is paid and the
//! difference stays with the exchange.

use crate::config::SurplusPolicy;
use crate::error::{DexResult, OrOverflow};
use crate::types::price::{base_to_secondary, mul_div, secondary_to_base};
use crate::types::{Amount, BuyerMatch, Order, Price, SellerMatch};

/// Volume of a match before prices other than the buyer's are involved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Secondary amount exchanged
    pub limiting: Amount,

    /// Base amount the buyer set aside for `limiting` at its own price
    pub buyer_expected: Amount,

    pub buyer_filled: bool,
    pub seller_filled: bool,
}

impl Quote {
    pub fn new(
        buy_remaining: Amount,
        buy_price: Price,
        sell_remaining: Amount,
        precision: u128,
    ) -> DexResult<Self> {
        // an intent past u128 exceeds any sell remainder
        let intent = base_to_secondary(buy_remaining, buy_price, precision).unwrap_or(u128::MAX);
        let limiting = intent.min(sell_remaining);
        let buyer_expected = secondary_to_base(limiting, buy_price, precision).or_overflow()?;
        Ok(Self {
            limiting,
            buyer_expected,
            buyer_filled: limiting == intent,
            seller_filled: limiting == sell_remaining,
        })
    }
}

/// Everything a match changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub buyer: BuyerMatch,
    pub seller: SellerMatch,

    /// Taken from the buy order's exchangeable amount
    pub buyer_consumed: Amount,
    /// Taken from the buy order's reserved commission
    pub buyer_released: Amount,

    pub seller_consumed: Amount,
    pub seller_released: Amount,

    /// Base kept by the exchange under `SurplusPolicy::Retained`
    pub retained_surplus: Amount,
}

/// Settle `buy` against `sell` at `match_price`
pub fn settle(
    buy: &Order,
    buy_price: Price,
    sell: &Order,
    sell_price: Price,
    match_price: Price,
    precision: u128,
    policy: SurplusPolicy,
) -> DexResult<Settlement> {
    let quote = Quote::new(buy.exchangeable_amount, buy_price, sell.exchangeable_amount, precision)?;
    let limiting = quote.limiting;
    let sent = secondary_to_base(limiting, match_price, precision).or_overflow()?;

    // buyer leg
    let (buyer_consumed, buyer_released) = if quote.buyer_filled {
        (buy.exchangeable_amount, buy.reserved_commission)
    } else {
        let released = mul_div(buy.reserved_commission, quote.buyer_expected, buy.exchangeable_amount)
            .or_overflow()?;
        (quote.buyer_expected, released)
    };
    let buyer_commission = mul_div(buy.reserved_commission, sent, buy.exchangeable_amount)
        .or_overflow()?
        .min(buyer_released);
    let change = buyer_consumed
        .checked_sub(sent)
        .and_then(|unspent| unspent.checked_add(buyer_released - buyer_commission))
        .or_overflow()?;

    // seller leg
    let seller_released = if quote.seller_filled {
        sell.reserved_commission
    } else {
        mul_div(sell.reserved_commission, limiting, sell.exchangeable_amount).or_overflow()?
    };
    let seller_expected = secondary_to_base(limiting, sell_price, precision).or_overflow()?;
    let surplus = sent.saturating_sub(seller_expected);
    let (seller_received, retained_surplus) = match policy {
        SurplusPolicy::ToSeller => (sent, 0),
        SurplusPolicy::Retained => (sent - surplus, surplus),
    };

    let buyer = BuyerMatch {
        order_id: buy.id,
        owner: buy.owner,
        amount_sent: sent,
        commission: buyer_commission,
        change,
        received: limiting,
        remaining_amount: buy.exchangeable_amount - buyer_consumed,
        match_price,
        filled: quote.buyer_filled,
    };
    let seller = SellerMatch {
        order_id: sell.id,
        owner: sell.owner,
        amount_sent: limiting,
        commission: seller_released,
        received: seller_received,
        surplus,
        remaining_amount: sell.exchangeable_amount - limiting,
        match_price,
        filled: quote.seller_filled,
    };

    Ok(Settlement {
        buyer,
        seller,
        buyer_consumed,
        buyer_released,
        seller_consumed: limiting,
        seller_released,
        retained_surplus,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::{to_fixed, WAD};
    use crate::types::Side;

    fn w(s: &str) -> u128 {
        to_fixed(s).unwrap()
    }

    /// Order as inserted with a 10% commission
    fn order(id: u64, side: Side, amount: &str, price: &str) -> Order {
        let amount = w(amount);
        let commission = amount / 10;
        Order::new_limit(id, id * 100, side, amount - commission, commission, w(price), 10)
    }

    #[test]
    fn test_full_fill_at_same_price() {
        let buy = order(1, Side::Buy, "10", "10");
        let sell = order(2, Side::Sell, "1", "10");
        let s = settle(&buy, w("10"), &sell, w("10"), w("10"), WAD, SurplusPolicy::ToSeller).unwrap();

        assert_eq!(s.buyer.amount_sent, w("9"));
        assert_eq!(s.buyer.received, w("0.9"));
        assert_eq!(s.buyer.commission, w("1"));
        assert_eq!(s.buyer.change, 0);
        assert!(s.buyer.filled);

        assert_eq!(s.seller.amount_sent, w("0.9"));
        assert_eq!(s.seller.received, w("9"));
        assert_eq!(s.seller.commission, w("0.1"));
        assert!(s.seller.filled);
    }

    #[test]
    fn test_partial_buyer_fill() {
        let buy = order(1, Side::Buy, "17", "1");
        let sell = order(2, Side::Sell, "12", "1");
        let s = settle(&buy, w("1"), &sell, w("1"), w("1"), WAD, SurplusPolicy::ToSeller).unwrap();

        assert!(!s.buyer.filled);
        assert!(s.seller.filled);
        assert_eq!(s.buyer.received, w("10.8"));
        assert_eq!(s.buyer.commission, w("1.2"));
        assert_eq!(s.buyer.change, 0);
        assert_eq!(s.buyer.remaining_amount, w("4.5"));
        assert_eq!(s.buyer_released, w("1.2"));
    }

    #[test]
    fn test_surplus_goes_to_seller_by_default() {
        let buy = order(1, Side::Buy, "60", "20");
        let sell = order(2, Side::Sell, "3", "10");
        let s = settle(&buy, w("20"), &sell, w("10"), w("15"), WAD, SurplusPolicy::ToSeller).unwrap();

        assert_eq!(s.buyer.amount_sent, w("40.5"));
        assert_eq!(s.buyer.received, w("2.7"));
        assert_eq!(s.buyer.commission, w("4.5"));
        assert_eq!(s.buyer.change, w("15"));
        assert_eq!(s.seller.received, w("40.5"));
        assert_eq!(s.seller.commission, w("0.3"));
        assert_eq!(s.seller.surplus, w("13.5"));
        assert_eq!(s.retained_surplus, 0);
    }

    #[test]
    fn test_retained_surplus_policy() {
        let buy = order(1, Side::Buy, "60", "20");
        let sell = order(2, Side::Sell, "3", "10");
        let s = settle(&buy, w("20"), &sell, w("10"), w("15"), WAD, SurplusPolicy::Retained).unwrap();

        assert_eq!(s.seller.received, w("27"));
        assert_eq!(s.retained_surplus, w("13.5"));
        assert_eq!(s.seller.received + s.retained_surplus, s.buyer.amount_sent);
    }

    #[test]
    fn test_buyer_side_conservation() {
        let buy = order(1, Side::Buy, "33.3", "7");
        let sell = order(2, Side::Sell, "2", "3");
        let s = settle(&buy, w("7"), &sell, w("3"), w("5"), WAD, SurplusPolicy::ToSeller).unwrap();

        assert_eq!(
            s.buyer.total_debited(),
            Some(s.buyer_consumed + s.buyer_released)
        );
        assert_eq!(s.seller_consumed + s.seller_released, s.seller.amount_sent + s.seller.commission);
    }

    #[test]
    fn test_quote_dust_buyer_is_filled() {
        // 5 raw base cannot buy anything at price 10
        let quote = Quote::new(5, 10 * WAD, WAD, WAD).unwrap();
        assert_eq!(quote.limiting, 0);
        assert!(quote.buyer_filled);
        assert!(!quote.seller_filled);
    }

    #[test]
    fn test_quote_saturates_unconvertible_intent() {
        // buying at one raw unit of price cannot be expressed in secondary
        let quote = Quote::new(u128::MAX / 2, 1, 3 * WAD, WAD).unwrap();
        assert_eq!(quote.limiting, 3 * WAD);
        assert_eq!(quote.buyer_expected, 3);
        assert!(!quote.buyer_filled);
        assert!(quote.seller_filled);
    }
}
