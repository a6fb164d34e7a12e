use asc_core::{AscConfig, GlobalState, Phase, ProgramKind, Rejection, StateView};
use log::{debug, warn};

use crate::burn::BurnProgram;
use crate::context::CallContext;
use crate::holdings::HoldingsProgram;
use crate::host::Host;
use crate::mint::MintProgram;
use crate::outcome::Outcome;

/// An authorization program: a decision function over a call and the
/// application's state
pub trait Program {
    /// Typed view of the application's global state
    type State: StateView;

    fn kind(&self) -> ProgramKind;

    /// Initial state for the creation call
    fn create(&self, ctx: &CallContext<'_>) -> Result<Self::State, Rejection>;

    /// Judge a call to an existing application
    fn evaluate(
        &self,
        ctx: &CallContext<'_>,
        state: &mut Self::State,
        host: &mut dyn Host,
    ) -> Outcome;

    /// Evaluate a call against stored global state.
    ///
    /// The typed state is written back only when the call is approved.
    fn approve(&self, ctx: &CallContext<'_>, global: &mut GlobalState, host: &mut dyn Host) -> Outcome {
        let outcome = match ctx.phase() {
            Phase::Creation => match self.create(ctx) {
                Ok(state) => {
                    let mut fresh = GlobalState::new();
                    state.store(&mut fresh);
                    *global = fresh;
                    Outcome::Approve(None)
                }
                Err(rejection) => Outcome::HardReject(rejection),
            },
            _ => match Self::State::load(global) {
                Ok(mut state) => {
                    let outcome = self.evaluate(ctx, &mut state, host);
                    if outcome.is_approved() {
                        state.store(global);
                    }
                    outcome
                }
                Err(rejection) => Outcome::HardReject(rejection),
            },
        };

        match &outcome {
            Outcome::HardReject(rejection) => warn!(
                "{} application {} rejected {} call from {}: {}",
                self.kind(),
                ctx.app_id,
                ctx.phase().name(),
                ctx.sender(),
                rejection
            ),
            Outcome::SoftDecision(false) => debug!(
                "{} application {} declined {} call from {}",
                self.kind(),
                ctx.app_id,
                ctx.phase().name(),
                ctx.sender()
            ),
            _ => debug!(
                "{} application {} approved {} call from {}",
                self.kind(),
                ctx.app_id,
                ctx.phase().name(),
                ctx.sender()
            ),
        }
        outcome
    }
}

/// The three programs, configured once and dispatched by kind
#[derive(Debug, Clone, Default)]
pub struct Programs {
    pub mint: MintProgram,
    pub holdings: HoldingsProgram,
    pub burn: BurnProgram,
}

impl Programs {
    pub fn from_config(config: &AscConfig) -> Self {
        Self {
            mint: MintProgram::new(config.token.clone()),
            holdings: HoldingsProgram::new(config.sale.clone()),
            burn: BurnProgram::new(),
        }
    }

    pub fn approve(
        &self,
        kind: ProgramKind,
        ctx: &CallContext<'_>,
        global: &mut GlobalState,
        host: &mut dyn Host,
    ) -> Outcome {
        match kind {
            ProgramKind::Mint => self.mint.approve(ctx, global, host),
            ProgramKind::Holdings => self.holdings.approve(ctx, global, host),
            ProgramKind::Burn => self.burn.approve(ctx, global, host),
        }
    }
}
