//! Per-order settlement records produced by the matching executor.
//!
//! Every executed match yields one [`BuyerMatch`] and one [`SellerMatch`].
//! Amounts are wad values; `match_price` uses the pair's price precision.
//!
//! ## SSZ Serialization
//!
//! Both records derive `SimpleSerialize` so a tick's settlements can be
//! encoded deterministically alongside the receipt.

use ssz_rs::prelude::*;

/// Buyer leg of a match.
///
/// The buyer deposited base token. Of the consumed deposit, `amount_sent`
/// went to the seller and `commission` to the exchange; `change` (unspent
/// price difference plus released commission) goes back to the buyer.
///
/// ## Example
///
/// ```
/// use tick_dex::types::BuyerMatch;
///
/// let m = BuyerMatch::default();
/// assert_eq!(m.total_debited(), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct BuyerMatch {
    pub order_id: u64,
    pub owner: u64,

    /// Base token paid to the seller
    pub amount_sent: u128,

    /// Base token charged as commission
    pub commission: u128,

    /// Base token returned to the buyer
    pub change: u128,

    /// Secondary token received
    pub received: u128,

    /// Exchangeable amount left on the order after the match
    pub remaining_amount: u128,

    pub match_price: u128,

    /// Whether the order left the book with this match
    pub filled: bool,
}

impl BuyerMatch {
    /// Base token debited from the buyer's deposit by this match
    pub fn total_debited(&self) -> Option<u128> {
        self.amount_sent
            .checked_add(self.commission)?
            .checked_add(self.change)
    }
}

/// Seller leg of a match.
///
/// The seller deposited secondary token and receives base token. `surplus`
/// is the part of `received` above the seller's own price.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct SellerMatch {
    pub order_id: u64,
    pub owner: u64,

    /// Secondary token delivered to the buyer
    pub amount_sent: u128,

    /// Secondary token charged as commission
    pub commission: u128,

    /// Base token received
    pub received: u128,

    /// Base token above `amount_sent * sell price`
    pub surplus: u128,

    pub remaining_amount: u128,

    pub match_price: u128,

    pub filled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_match_total_debited() {
        let m = BuyerMatch {
            amount_sent: 9,
            commission: 1,
            change: 2,
            ..Default::default()
        };
        assert_eq!(m.total_debited(), Some(12));

        let overflow = BuyerMatch {
            amount_sent: u128::MAX,
            commission: 1,
            ..Default::default()
        };
        assert_eq!(overflow.total_debited(), None);
    }

    #[test]
    fn test_seller_match_ssz_deterministic() {
        let m = SellerMatch {
            order_id: 2,
            owner: 7,
            amount_sent: 10,
            received: 90,
            filled: true,
            ..Default::default()
        };
        let bytes1 = ssz_rs::serialize(&m).expect("Failed to serialize");
        let bytes2 = ssz_rs::serialize(&m).expect("Failed to serialize");
        assert_eq!(bytes1, bytes2);

        let decoded: SellerMatch = ssz_rs::deserialize(&bytes1).expect("Failed to deserialize");
        assert_eq!(decoded, m);
    }
}
