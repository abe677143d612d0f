//! Cash settlement for a trade cycle
//!
//! Traders are in item-flow order: trader `i` receives the item of trader
//! `i-1` and hands its own item to trader `i+1`. Each trader's value delta is
//! `previous.price - current.price`; the cash flow below offsets every delta
//! so nobody in the cycle gains or loses value.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::market::{format_amount, Money, Trader, TraderId};

/// One step of the cycle, seen from `trader`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub trader: TraderId,
    /// Who hands `trader` the item it wants
    pub from: TraderId,
    /// Who receives `trader`'s item
    pub to: TraderId,
    pub item_received: String,
    pub item_given: String,
    /// `previous.price - current.price`. Positive: `trader` got the more
    /// valuable item and owes the difference; negative: `trader` is owed it.
    pub cash_amount: Money,
}

/// Net payment between one pair of traders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashFlow {
    pub from: TraderId,
    pub to: TraderId,
    pub amount: Money,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub trades: Vec<Trade>,
    pub cash_flow: Vec<CashFlow>,
}

impl Settlement {
    /// Cash received minus cash paid for `id`
    pub fn net_cash(&self, id: &TraderId) -> Money {
        self.cash_flow
            .iter()
            .map(|flow| {
                if &flow.to == id {
                    flow.amount
                } else if &flow.from == id {
                    -flow.amount
                } else {
                    0
                }
            })
            .sum()
    }

    /// Total cash changing hands
    pub fn total_cash(&self) -> Money {
        self.cash_flow.iter().map(|flow| flow.amount).sum()
    }
}

/// Running totals keyed by (payer, payee) id pair, opposite directions netted.
#[derive(Default)]
struct PairLedger {
    order: Vec<(TraderId, TraderId)>,
    totals: HashMap<(TraderId, TraderId), Money>,
}

impl PairLedger {
    fn add(&mut self, payer: &TraderId, payee: &TraderId, amount: Money) {
        if let Some(owed) = self.totals.get_mut(&(payee.clone(), payer.clone())) {
            *owed -= amount;
            return;
        }
        let key = (payer.clone(), payee.clone());
        if !self.totals.contains_key(&key) {
            self.order.push(key.clone());
        }
        *self.totals.entry(key).or_insert(0) += amount;
    }

    /// Non-zero net payments as (payer, payee, amount), first-seen order
    fn into_payments(self) -> Vec<(TraderId, TraderId, Money)> {
        let PairLedger { order, totals } = self;
        order
            .into_iter()
            .filter_map(|(payer, payee)| {
                let amount = totals.get(&(payer.clone(), payee.clone())).copied().unwrap_or(0);
                match amount {
                    0 => None,
                    a if a > 0 => Some((payer, payee, a)),
                    a => Some((payee, payer, -a)),
                }
            })
            .collect()
    }
}

/// Compute the trades and the netted cash flow for one cycle.
///
/// Every edge `previous → current` carries a payment from `current` to
/// `previous` of `previous.price - floor`, where `floor` is the cheapest item
/// in the cycle. A trader therefore pays for what it receives and is paid for
/// what it gives, both above the floor, which leaves each trader's cash
/// balance equal to minus its value delta. The cheapest item's edge carries
/// nothing, so at most `n - 1` payments remain; in a two-party swap only the
/// richer side of the difference is paid.
pub fn calculate_cash_flow(traders: &[Trader]) -> Settlement {
    let n = traders.len();
    if n < 2 {
        return Settlement::default();
    }

    let by_id: HashMap<&TraderId, &Trader> = traders.iter().map(|t| (t.id(), t)).collect();
    let Some(cheapest) = traders.iter().min_by_key(|t| t.price()) else {
        return Settlement::default();
    };
    let floor = cheapest.price();

    let mut trades = Vec::with_capacity(n);
    let mut ledger = PairLedger::default();

    for i in 0..n {
        let current = &traders[i];
        let previous = &traders[(i + n - 1) % n];
        let next = &traders[(i + 1) % n];

        let difference = previous.price() - current.price();
        trades.push(Trade {
            trader: current.id().clone(),
            from: previous.id().clone(),
            to: next.id().clone(),
            item_received: previous.has_item().to_string(),
            item_given: current.has_item().to_string(),
            cash_amount: difference,
        });

        let owed = previous.price() - floor;
        if owed > 0 {
            ledger.add(current.id(), previous.id(), owed);
        }
    }

    let cash_flow = ledger
        .into_payments()
        .into_iter()
        .map(|(payer, payee, amount)| {
            let reason = explain(&trades, &by_id, cheapest, &payer, &payee, amount);
            CashFlow { from: payer, to: payee, amount, reason }
        })
        .collect::<Vec<_>>();

    debug!(
        "Settled cycle of {}: {} trades, {} payments, floor {}",
        n,
        trades.len(),
        cash_flow.len(),
        format_amount(floor)
    );

    Settlement { trades, cash_flow }
}

fn explain(
    trades: &[Trade],
    by_id: &HashMap<&TraderId, &Trader>,
    cheapest: &Trader,
    payer: &TraderId,
    payee: &TraderId,
    amount: Money,
) -> String {
    let name = |id: &TraderId| by_id.get(id).map(|t| t.name().to_string()).unwrap_or_else(|| id.to_string());
    let price = |id: &TraderId| by_id.get(id).map(|t| t.price()).unwrap_or(0);

    let Some(trade) = trades.iter().find(|t| &t.trader == payer && &t.from == payee) else {
        return format!(
            "{} pays {} {} to settle the cycle.",
            name(payer),
            name(payee),
            format_amount(amount)
        );
    };

    let received = format!("{} ({})", trade.item_received, format_amount(price(payee)));
    let given = format!("{} ({})", trade.item_given, format_amount(price(payer)));

    if trade.cash_amount == amount {
        format!(
            "{} receives {} from {} and gives up {}. The {} is worth {} more than the {}, so {} pays {} {}.",
            name(payer),
            received,
            name(payee),
            given,
            trade.item_received,
            format_amount(amount),
            trade.item_given,
            name(payer),
            name(payee),
            format_amount(amount)
        )
    } else {
        // Payment for the received item above the cycle's cheapest item
        format!(
            "{} receives {} from {} and gives up {} (value difference {}). {} pays {} for the {} above the cheapest item in the cycle: {} minus {} ({}) = {}. Every trader pays this way for what it receives and is paid for what it gives, so all end even.",
            name(payer),
            received,
            name(payee),
            given,
            format_amount(trade.cash_amount),
            name(payer),
            name(payee),
            trade.item_received,
            received,
            cheapest.has_item(),
            format_amount(cheapest.price()),
            format_amount(amount)
        )
    }
}
