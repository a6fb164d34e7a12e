//! Mint program: creates the token and releases it to the two custodians

use asc_core::{MintState, Phase, ProgramKind, Rejection, SubAction, TokenConfig};
use log::info;

use crate::context::CallContext;
use crate::custody::{issue, own_balance, recorded_asset, require_spendable};
use crate::host::Host;
use crate::outcome::Outcome;
use crate::program::Program;
use crate::security::{check, EntryPoint};

/// Operations accepted by the mint program in a normal call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintOp {
    Mint,
    Transfer,
    Burn,
    SetAccount,
}

impl MintOp {
    pub fn parse(name: &[u8]) -> Result<Self, Rejection> {
        match name {
            b"Mint" => Ok(MintOp::Mint),
            b"Transfer" => Ok(MintOp::Transfer),
            b"Burn" => Ok(MintOp::Burn),
            b"SetAccount" => Ok(MintOp::SetAccount),
            other => Err(Rejection::UnknownOperation(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    pub fn entry_point(self) -> EntryPoint {
        match self {
            MintOp::Mint => EntryPoint::MintMint,
            MintOp::Transfer => EntryPoint::MintTransfer,
            MintOp::Burn => EntryPoint::MintBurn,
            MintOp::SetAccount => EntryPoint::MintSetAccount,
        }
    }
}

/// Custodian roles that may receive tokens from the mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodianRole {
    Holdings,
    Burn,
}

impl CustodianRole {
    pub fn parse(name: &[u8]) -> Result<Self, Rejection> {
        match name {
            b"Holdings" => Ok(CustodianRole::Holdings),
            b"Burn" => Ok(CustodianRole::Burn),
            other => Err(Rejection::UnknownRole(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Mint authority
#[derive(Debug, Clone, Default)]
pub struct MintProgram {
    token: TokenConfig,
}

impl MintProgram {
    pub fn new(token: TokenConfig) -> Self {
        Self { token }
    }

    fn no_op(
        &self,
        ctx: &CallContext<'_>,
        state: &mut MintState,
        host: &mut dyn Host,
    ) -> Result<Option<SubAction>, Rejection> {
        ctx.require_creator()?;
        let op = MintOp::parse(ctx.arg(0)?)?;
        check(ctx, op.entry_point())?;

        match op {
            MintOp::Mint => self.mint(ctx, state, host),
            MintOp::Transfer => Self::release(ctx, state, CustodianRole::Holdings, host),
            MintOp::Burn => Self::release(ctx, state, CustodianRole::Burn, host),
            MintOp::SetAccount => Self::set_account(ctx, state),
        }
    }

    fn mint(
        &self,
        ctx: &CallContext<'_>,
        state: &mut MintState,
        host: &mut dyn Host,
    ) -> Result<Option<SubAction>, Rejection> {
        if state.token_id != 0 {
            return Err(Rejection::AlreadyMinted(state.token_id));
        }

        let action = SubAction::AssetConfig {
            total: self.token.total,
            decimals: self.token.decimals,
            name: self.token.name.clone(),
            unit: self.token.unit.clone(),
        };
        let effect = host.submit(ctx.app_id, &action)?;
        state.token_id = effect
            .created_asset()
            .ok_or_else(|| Rejection::State("asset creation reported no asset id".to_string()))?;

        info!(
            "Minted {} {} as asset {}",
            self.token.total, self.token.unit, state.token_id
        );
        Ok(Some(action))
    }

    /// Move treasury units to the recorded custodian for `role`.
    ///
    /// For the burn role this only moves units into the burn custodian; the
    /// supply itself is not destroyed.
    fn release(
        ctx: &CallContext<'_>,
        state: &MintState,
        role: CustodianRole,
        host: &mut dyn Host,
    ) -> Result<Option<SubAction>, Rejection> {
        let recipient = ctx.account(1)?;
        let allowed = match role {
            CustodianRole::Holdings => state.holdings_addr,
            CustodianRole::Burn => state.burn_addr,
        };
        if allowed != Some(recipient) {
            return Err(Rejection::RecipientNotAllowed(recipient));
        }

        let asset = recorded_asset(ctx, state.token_id)?;
        let amount = ctx.arg_uint(1)?;
        require_spendable(amount, own_balance(ctx, host, asset))?;

        info!("Releasing {} units of asset {} to {:?} custodian {}", amount, asset, role, recipient);
        issue(
            ctx,
            host,
            SubAction::AssetTransfer {
                asset,
                receiver: recipient,
                amount,
            },
        )
    }

    fn set_account(ctx: &CallContext<'_>, state: &mut MintState) -> Result<Option<SubAction>, Rejection> {
        let role = CustodianRole::parse(ctx.arg(1)?)?;
        let account = ctx.account(1)?;
        match role {
            CustodianRole::Holdings => state.holdings_addr = Some(account),
            CustodianRole::Burn => state.burn_addr = Some(account),
        }
        info!("Recorded {:?} custodian {}", role, account);
        Ok(None)
    }

    fn opt_in(ctx: &CallContext<'_>, host: &dyn Host) -> Result<bool, Rejection> {
        check(ctx, EntryPoint::MintOptIn)?;
        if !host.is_opted_in(&ctx.sender(), ctx.app_id) {
            return Err(Rejection::NotOptedIn(ctx.sender()));
        }
        Ok(ctx.is_creator())
    }
}

impl Program for MintProgram {
    type State = MintState;

    fn kind(&self) -> ProgramKind {
        ProgramKind::Mint
    }

    fn create(&self, _ctx: &CallContext<'_>) -> Result<MintState, Rejection> {
        Ok(MintState::default())
    }

    fn evaluate(&self, ctx: &CallContext<'_>, state: &mut MintState, host: &mut dyn Host) -> Outcome {
        match ctx.phase() {
            Phase::NoOp => Outcome::from_rule(self.no_op(ctx, state, host)),
            Phase::OptIn => Outcome::from_decision(Self::opt_in(ctx, host)),
            Phase::CloseOut => Outcome::from_decision(check(ctx, EntryPoint::MintCloseOut).map(|_| true)),
            Phase::Update => {
                Outcome::from_decision(check(ctx, EntryPoint::MintUpdate).map(|_| ctx.is_creator()))
            }
            Phase::Delete => {
                Outcome::from_decision(check(ctx, EntryPoint::MintDelete).map(|_| ctx.is_creator()))
            }
            Phase::Creation => Outcome::HardReject(Rejection::PhaseRejected("creation")),
        }
    }
}
