//! Order insertion, cancellation and expiration.

use tracing::{debug, info};

use crate::engine::expiration;
use crate::error::{DexError, DexResult, OrOverflow};
use crate::events::DexEvent;
use crate::external::TokenLedger;
use crate::orderbook::{Hint, ListId};
use crate::types::price::{base_to_secondary, secondary_to_base};
use crate::types::{Amount, Order, OrderId, OrderKind, PairKey, Price, Side};

use super::{CallContext, Dex};

/// Everything needed to place an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub side: Side,
    pub kind: OrderKind,

    /// Deposit: base for buys, secondary for sells
    pub amount: Amount,

    /// Price for limit orders, multiply factor for market orders
    pub price_key: u128,

    /// Ticks the order stays live
    pub lifespan: u64,

    /// Position in the target list; scanned when absent
    pub hint: Option<Hint>,
}

impl OrderRequest {
    pub fn limit(side: Side, amount: Amount, price: Price, lifespan: u64) -> Self {
        Self {
            side,
            kind: OrderKind::Limit,
            amount,
            price_key: price,
            lifespan,
            hint: None,
        }
    }

    pub fn market(side: Side, amount: Amount, multiply_factor: u128, lifespan: u64) -> Self {
        Self {
            side,
            kind: OrderKind::Market,
            amount,
            price_key: multiply_factor,
            lifespan,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hint = Some(hint);
        self
    }
}

impl<L: TokenLedger> Dex<L> {
    pub fn insert_buy_limit_order(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        amount: Amount,
        price: Price,
        lifespan: u64,
    ) -> DexResult<OrderId> {
        self.insert_order(ctx, pair, OrderRequest::limit(Side::Buy, amount, price, lifespan))
    }

    pub fn insert_buy_limit_order_after(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        amount: Amount,
        price: Price,
        lifespan: u64,
        hint: Hint,
    ) -> DexResult<OrderId> {
        let request = OrderRequest::limit(Side::Buy, amount, price, lifespan).with_hint(hint);
        self.insert_order(ctx, pair, request)
    }

    pub fn insert_sell_limit_order(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        amount: Amount,
        price: Price,
        lifespan: u64,
    ) -> DexResult<OrderId> {
        self.insert_order(ctx, pair, OrderRequest::limit(Side::Sell, amount, price, lifespan))
    }

    pub fn insert_sell_limit_order_after(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        amount: Amount,
        price: Price,
        lifespan: u64,
        hint: Hint,
    ) -> DexResult<OrderId> {
        let request = OrderRequest::limit(Side::Sell, amount, price, lifespan).with_hint(hint);
        self.insert_order(ctx, pair, request)
    }

    pub fn insert_market_order(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        side: Side,
        amount: Amount,
        multiply_factor: u128,
        lifespan: u64,
    ) -> DexResult<OrderId> {
        self.insert_order(ctx, pair, OrderRequest::market(side, amount, multiply_factor, lifespan))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_market_order_after(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        side: Side,
        amount: Amount,
        multiply_factor: u128,
        lifespan: u64,
        hint: Hint,
    ) -> DexResult<OrderId> {
        let request = OrderRequest::market(side, amount, multiply_factor, lifespan).with_hint(hint);
        self.insert_order(ctx, pair, request)
    }

    /// Validate, take the deposit and place the order
    ///
    /// While the pair's tick runs the order waits in the pending queue and
    /// joins the book when the tick merges it.
    pub fn insert_order(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        request: OrderRequest,
    ) -> DexResult<OrderId> {
        self.ensure_not_paused()?;
        let (commission, exchangeable) = self.validate_order(key, &request)?;

        let pair = self.pair(key)?;
        let running = pair.tick.is_running();
        let list = if running {
            ListId::pending(request.side, request.kind)
        } else {
            ListId::main(request.side, request.kind)
        };
        if let Some(hint) = request.hint {
            pair.book.check_hint(list, request.price_key, hint)?;
        }
        let expires_in_tick = pair.tick.number.checked_add(request.lifespan).or_overflow()?;

        self.ledger
            .transfer_from(key.deposit_token(request.side), ctx.sender, request.amount)?;

        let id = self.next_order_id;
        let order = match request.kind {
            OrderKind::Limit => Order::new_limit(
                id,
                ctx.sender,
                request.side,
                exchangeable,
                commission,
                request.price_key,
                expires_in_tick,
            ),
            OrderKind::Market => Order::new_market(
                id,
                ctx.sender,
                request.side,
                exchangeable,
                commission,
                request.price_key,
                expires_in_tick,
            ),
        };
        let book = &mut self.pair_mut(key)?.book;
        match request.hint {
            Some(hint) => book.insert(list, order, hint)?,
            None => book.insert_sorted(list, order)?,
        }
        self.next_order_id += 1;

        debug!(
            "pair {}: {:?} {} order {} from {} for {} at {}",
            key, request.side, request.kind, id, ctx.sender, request.amount, request.price_key
        );
        self.events.push(DexEvent::NewOrderInserted {
            pair: key,
            order_id: id,
            owner: ctx.sender,
            side: request.side,
            kind: request.kind,
            exchangeable_amount: exchangeable,
            reserved_commission: commission,
            price_key: request.price_key,
            expires_in_tick,
        });
        if running {
            self.events.push(DexEvent::NewOrderAddedToPendingQueue {
                pair: key,
                order_id: id,
                side: request.side,
                kind: request.kind,
            });
        }
        Ok(id)
    }

    /// Returns `(reserved commission, exchangeable amount)`
    fn validate_order(&self, key: PairKey, request: &OrderRequest) -> DexResult<(Amount, Amount)> {
        let pair = self.pair(key)?;
        if pair.disabled {
            return Err(DexError::PairDisabled {
                base: key.base,
                secondary: key.secondary,
            });
        }

        let limits = &self.config.orders;
        if request.lifespan > limits.max_order_lifespan {
            return Err(DexError::LifespanTooHigh {
                lifespan: request.lifespan,
                max: limits.max_order_lifespan,
            });
        }
        match request.kind {
            OrderKind::Limit if request.price_key == 0 => return Err(DexError::ZeroPrice),
            OrderKind::Limit => {}
            OrderKind::Market => {
                let factor = request.price_key;
                if factor == 0 {
                    return Err(DexError::MultiplyFactorZero);
                }
                if factor < limits.min_multiply_factor {
                    return Err(DexError::LowMultiplyFactor(factor));
                }
                if factor > limits.max_multiply_factor {
                    return Err(DexError::HighMultiplyFactor(factor));
                }
            }
        }

        if request.amount == 0 {
            return Err(DexError::ZeroAmount);
        }
        let commission = self.commissions.calculate_initial_fee(request.amount)?;
        let exchangeable = request.amount - commission;
        if exchangeable == 0 {
            return Err(DexError::ZeroAmount);
        }

        // limit orders must be convertible at their own price
        if request.kind == OrderKind::Limit {
            let converted = match request.side {
                Side::Buy => base_to_secondary(exchangeable, request.price_key, pair.price_precision),
                Side::Sell => secondary_to_base(exchangeable, request.price_key, pair.price_precision),
            };
            if converted.is_none() {
                return Err(DexError::AmountTooHigh(request.amount));
            }
        }

        let base_amount = match request.side {
            Side::Buy => request.amount,
            Side::Sell => {
                secondary_to_base(request.amount, pair.last_closing_price, pair.price_precision)
                    .or_overflow()?
            }
        };
        let in_common = self
            .base_to_common(key.base, base_amount)
            .ok_or(DexError::InvalidPair(key.base))?;
        if in_common < limits.min_order_amount {
            return Err(DexError::AmountTooLow {
                amount: in_common,
                minimum: limits.min_order_amount,
            });
        }
        Ok((commission, exchangeable))
    }

    pub fn cancel_buy_order(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        order_id: OrderId,
        prev_hint: Option<OrderId>,
    ) -> DexResult<()> {
        self.cancel_order(ctx, pair, Side::Buy, order_id, prev_hint)
    }

    pub fn cancel_sell_order(
        &mut self,
        ctx: CallContext,
        pair: PairKey,
        order_id: OrderId,
        prev_hint: Option<OrderId>,
    ) -> DexResult<()> {
        self.cancel_order(ctx, pair, Side::Sell, order_id, prev_hint)
    }

    /// Remove a resting order and refund it minus the cancelation penalty
    ///
    /// The refund is `exchangeable + reserved - penalty`, where the penalty is
    /// a share of the reserved commission. A wrong `prev_hint` costs a scan.
    fn cancel_order(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        side: Side,
        order_id: OrderId,
        prev_hint: Option<OrderId>,
    ) -> DexResult<()> {
        self.ensure_not_paused()?;
        let pair = self.pair(key)?;
        pair.tick.ensure_idle()?;

        let in_side = pair
            .book
            .list_of(order_id)
            .is_some_and(|list| list == ListId::main(side, list.kind));
        let order = pair
            .book
            .get(order_id)
            .filter(|_| in_side)
            .ok_or(DexError::OrderNotFound(order_id))?;
        if order.owner != ctx.sender {
            return Err(DexError::NotOrderOwner {
                order_id,
                caller: ctx.sender,
            });
        }
        let (exchangeable, reserved) = (order.exchangeable_amount, order.reserved_commission);

        let token = key.deposit_token(side);
        let mut commissions = self.commissions.clone();
        let (penalty, returned_commission) =
            commissions.charge_cancelation_penalty(token, reserved)?;
        let refund = exchangeable.checked_add(returned_commission).or_overflow()?;

        self.ledger.transfer(token, ctx.sender, refund)?;
        self.pair_mut(key)?.book.remove(order_id, prev_hint)?;
        self.commissions = commissions;

        info!("pair {}: order {} cancelled, refunded {}", key, order_id, refund);
        self.events.push(DexEvent::OrderCancelled {
            pair: key,
            order_id,
            owner: ctx.sender,
            side,
            returned_amount: exchangeable,
            commission: penalty,
            returned_commission,
        });
        Ok(())
    }

    /// Remove expired orders of one list, visiting at most `steps` orders
    ///
    /// Anyone may call this. Each removed order is refunded its exchangeable
    /// amount plus its reserve minus the expiration penalty. Returns the ids
    /// of the removed orders.
    #[allow(clippy::too_many_arguments)]
    pub fn process_expired(
        &mut self,
        _ctx: CallContext,
        key: PairKey,
        side: Side,
        kind: OrderKind,
        start_from: Option<OrderId>,
        prev_hint: Option<OrderId>,
        steps: u64,
    ) -> DexResult<Vec<OrderId>> {
        self.ensure_not_paused()?;
        self.pair(key)?.tick.ensure_idle()?;

        let list = ListId::main(side, kind);
        let token = key.deposit_token(side);
        let removed = self.transact(key, |pair, commissions, effects| {
            let tick_number = pair.tick.number;
            let removed = expiration::process(
                &mut pair.book,
                list,
                start_from,
                prev_hint,
                steps,
                tick_number,
            )?;

            for order in &removed {
                let (penalty, returned_commission) =
                    commissions.charge_expiration_penalty(token, order.reserved_commission)?;
                let refund = order
                    .exchangeable_amount
                    .checked_add(returned_commission)
                    .or_overflow()?;
                effects.pay(token, order.owner, refund);
                effects.emit(DexEvent::ExpiredOrderProcessed {
                    pair: key,
                    order_id: order.id,
                    owner: order.owner,
                    side,
                    returned_amount: order.exchangeable_amount,
                    commission: penalty,
                    returned_commission,
                });
            }
            Ok(removed)
        })?;

        info!("pair {}: {} expired {} orders processed", key, removed.len(), kind);
        Ok(removed.iter().map(|order| order.id).collect())
    }
}
