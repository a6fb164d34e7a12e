//! Holdings program: custodian that sells the token to anyone for payment

use asc_core::{HoldingsState, Phase, ProgramKind, Rejection, SaleConfig, SubAction, TxnType};
use log::info;

use crate::context::CallContext;
use crate::custody::{issue, opt_in_to_asset, own_balance, recorded_asset, require_spendable};
use crate::host::Host;
use crate::outcome::Outcome;
use crate::program::Program;
use crate::security::{check, EntryPoint};

/// Operations accepted by the holdings program in a normal call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingsOp {
    AssetOptIn,
    SellTokens,
    UpdatePrice,
}

impl HoldingsOp {
    pub fn parse(name: &[u8]) -> Result<Self, Rejection> {
        match name {
            b"AssetOptIn" => Ok(HoldingsOp::AssetOptIn),
            b"SellTokens" => Ok(HoldingsOp::SellTokens),
            b"UpdatePrice" => Ok(HoldingsOp::UpdatePrice),
            other => Err(Rejection::UnknownOperation(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    pub fn entry_point(self) -> EntryPoint {
        match self {
            HoldingsOp::AssetOptIn => EntryPoint::HoldingsAssetOptIn,
            HoldingsOp::SellTokens => EntryPoint::HoldingsSellTokens,
            HoldingsOp::UpdatePrice => EntryPoint::HoldingsUpdatePrice,
        }
    }
}

/// Holdings authority
#[derive(Debug, Clone, Default)]
pub struct HoldingsProgram {
    sale: SaleConfig,
}

impl HoldingsProgram {
    pub fn new(sale: SaleConfig) -> Self {
        Self { sale }
    }

    /// Payment required for `units`: price per unit times units, plus the flat fee
    pub fn sale_payment(&self, price: u64, units: u64) -> Result<u64, Rejection> {
        price
            .checked_mul(units)
            .and_then(|subtotal| subtotal.checked_add(self.sale.fee))
            .ok_or(Rejection::Overflow("sale payment"))
    }

    fn no_op(
        &self,
        ctx: &CallContext<'_>,
        state: &mut HoldingsState,
        host: &mut dyn Host,
    ) -> Result<Option<SubAction>, Rejection> {
        let op = HoldingsOp::parse(ctx.arg(0)?)?;
        check(ctx, op.entry_point())?;

        match op {
            HoldingsOp::AssetOptIn => opt_in_to_asset(ctx, state.token_id, host),
            HoldingsOp::SellTokens => self.sell(ctx, state, host),
            HoldingsOp::UpdatePrice => Self::update_price(ctx, state),
        }
    }

    /// Sell units to the caller. The group must be exactly
    /// `[payment to this application, this call]`.
    fn sell(
        &self,
        ctx: &CallContext<'_>,
        state: &HoldingsState,
        host: &mut dyn Host,
    ) -> Result<Option<SubAction>, Rejection> {
        let payment = ctx.group_txn(0)?;
        if payment.txn_type() != TxnType::Payment {
            return Err(Rejection::GroupLayout("first transaction must be a payment".to_string()));
        }
        if ctx.group_index != 1 || ctx.group_txn(1)?.txn_type() != TxnType::ApplicationCall {
            return Err(Rejection::GroupLayout(
                "sale call must follow its payment".to_string(),
            ));
        }

        let units = ctx.arg_uint(1)?;
        let expected = self.sale_payment(state.price, units)?;
        if payment.amount() != expected {
            return Err(Rejection::PaymentAmount {
                expected,
                actual: payment.amount(),
            });
        }
        if payment.receiver() != ctx.app_address {
            return Err(Rejection::PaymentReceiver(payment.receiver()));
        }

        let asset = recorded_asset(ctx, state.token_id)?;
        if units >= self.sale.max_units_exclusive {
            return Err(Rejection::AmountOutOfBounds(units));
        }
        require_spendable(units, own_balance(ctx, host, asset))?;

        info!("Selling {} units of asset {} to {} for {}", units, asset, ctx.sender(), expected);
        issue(
            ctx,
            host,
            SubAction::AssetTransfer {
                asset,
                receiver: ctx.sender(),
                amount: units,
            },
        )
    }

    fn update_price(ctx: &CallContext<'_>, state: &mut HoldingsState) -> Result<Option<SubAction>, Rejection> {
        ctx.require_creator()?;
        let price = ctx.arg_uint(1)?;
        info!("Price updated from {} to {}", state.price, price);
        state.price = price;
        Ok(None)
    }

    fn opt_in(ctx: &CallContext<'_>, host: &dyn Host) -> Result<Option<SubAction>, Rejection> {
        check(ctx, EntryPoint::HoldingsOptIn)?;
        if !host.is_opted_in(&ctx.sender(), ctx.app_id) {
            return Err(Rejection::NotOptedIn(ctx.sender()));
        }
        Ok(None)
    }
}

impl Program for HoldingsProgram {
    type State = HoldingsState;

    fn kind(&self) -> ProgramKind {
        ProgramKind::Holdings
    }

    fn create(&self, ctx: &CallContext<'_>) -> Result<HoldingsState, Rejection> {
        Ok(HoldingsState {
            token_id: ctx.asset(0)?,
            price: self.sale.initial_price,
        })
    }

    fn evaluate(&self, ctx: &CallContext<'_>, state: &mut HoldingsState, host: &mut dyn Host) -> Outcome {
        match ctx.phase() {
            Phase::NoOp => Outcome::from_rule(self.no_op(ctx, state, host)),
            Phase::OptIn => Outcome::from_rule(Self::opt_in(ctx, host)),
            Phase::CloseOut => {
                Outcome::from_decision(check(ctx, EntryPoint::HoldingsCloseOut).map(|_| true))
            }
            Phase::Update => {
                Outcome::from_decision(check(ctx, EntryPoint::HoldingsUpdate).map(|_| false))
            }
            Phase::Delete => Outcome::from_decision(
                check(ctx, EntryPoint::HoldingsDelete).map(|_| ctx.is_creator()),
            ),
            Phase::Creation => Outcome::HardReject(Rejection::PhaseRejected("creation")),
        }
    }
}
