use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use smallvec::SmallVec;

// ── Data model ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSide {
    Call,
    Put,
}

/// A single contract listed at a strike. Provider may repeat strikes; the
/// first one seen wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeQuote {
    pub strike_price: Decimal,
    pub contract_symbol: String,
    pub side: OptionSide,
}

/// One expiration's chain, flattened per side in provider order.
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    pub call_strikes: Vec<StrikeQuote>,
    pub put_strikes: Vec<StrikeQuote>,
    /// Underlying price embedded in the chain snapshot, if the provider sent one.
    pub underlying_price: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    pub value: Decimal,
    pub source: PriceSource,
}

impl PriceSample {
    pub fn last(value: Decimal) -> Self {
        Self {
            value,
            source: PriceSource::Last,
        }
    }

    #[inline]
    pub fn is_usable(&self) -> bool {
        self.value > Decimal::ZERO
    }
}

/// Target strikes derived from the anchor. Calls at/below, puts above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    pub target_call_strikes: [i64; 2],
    pub target_put_strikes: [i64; 2],
}

impl SelectionWindow {
    /// `floor(reference)` anchors calls at `[f, f-1]` and puts at `[f+1, f+2]`.
    /// `None` when the anchor or a neighbour falls outside `i64`.
    pub fn around(reference_price: Decimal) -> Option<Self> {
        let anchor = reference_price.floor().to_i64()?;
        Some(Self {
            target_call_strikes: [anchor, anchor.checked_sub(1)?],
            target_put_strikes: [anchor.checked_add(1)?, anchor.checked_add(2)?],
        })
    }
}

/// Contracts chosen for one side, in target order.
pub type SidePicks = SmallVec<[(i64, String); 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeSelection {
    pub reference_price: Decimal,
    pub window: SelectionWindow,
    pub calls: SidePicks,
    pub puts: SidePicks,
}

impl StrikeSelection {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

// ── Selection ──

/// The settled sample wins; the chain's embedded price is only a fallback,
/// since it may predate the opening auction. Non-positive values are unusable.
pub fn resolve_reference_price(sample: Option<&PriceSample>, chain: &OptionChain) -> Option<Decimal> {
    sample
        .filter(|s| s.is_usable())
        .map(|s| s.value)
        .or_else(|| chain.underlying_price.filter(|p| *p > Decimal::ZERO))
}

/// Computes the target window and maps each surviving target to the first
/// contract listed at exactly that strike. Missing strikes are dropped,
/// never substituted. `None` only when no reference price is usable.
pub fn select_strikes(chain: &OptionChain, sample: Option<&PriceSample>) -> Option<StrikeSelection> {
    let reference_price = resolve_reference_price(sample, chain)?;
    let window = SelectionWindow::around(reference_price)?;

    Some(StrikeSelection {
        reference_price,
        window,
        calls: pick_side(&chain.call_strikes, OptionSide::Call, &window.target_call_strikes),
        puts: pick_side(&chain.put_strikes, OptionSide::Put, &window.target_put_strikes),
    })
}

fn pick_side(quotes: &[StrikeQuote], side: OptionSide, targets: &[i64]) -> SidePicks {
    targets
        .iter()
        .filter_map(|&target| {
            let strike = Decimal::from(target);
            quotes
                .iter()
                .find(|q| q.side == side && q.strike_price == strike)
                .map(|q| (target, q.contract_symbol.clone()))
        })
        .collect()
}
