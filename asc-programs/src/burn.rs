//! Burn program: custodian that receives tokens taken out of circulation

use asc_core::{BurnState, Phase, ProgramKind, Rejection, SubAction};

use crate::context::CallContext;
use crate::custody::opt_in_to_asset;
use crate::host::Host;
use crate::outcome::Outcome;
use crate::program::Program;
use crate::security::{check, EntryPoint};

/// Operations accepted by the burn program in a normal call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnOp {
    AssetOptIn,
}

impl BurnOp {
    pub fn parse(name: &[u8]) -> Result<Self, Rejection> {
        match name {
            b"AssetOptIn" => Ok(BurnOp::AssetOptIn),
            other => Err(Rejection::UnknownOperation(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Burn authority
#[derive(Debug, Clone, Default)]
pub struct BurnProgram;

impl BurnProgram {
    pub fn new() -> Self {
        BurnProgram
    }

    fn no_op(
        ctx: &CallContext<'_>,
        state: &BurnState,
        host: &mut dyn Host,
    ) -> Result<Option<SubAction>, Rejection> {
        check(ctx, EntryPoint::BurnNoOp)?;
        ctx.require_creator()?;

        match BurnOp::parse(ctx.arg(0)?)? {
            BurnOp::AssetOptIn => {
                check(ctx, EntryPoint::BurnAssetOptIn)?;
                opt_in_to_asset(ctx, state.token_id, host)
            }
        }
    }

    fn opt_in(ctx: &CallContext<'_>, host: &dyn Host) -> Result<bool, Rejection> {
        check(ctx, EntryPoint::BurnOptIn)?;
        if !host.is_opted_in(&ctx.sender(), ctx.app_id) {
            return Err(Rejection::NotOptedIn(ctx.sender()));
        }
        Ok(ctx.is_creator())
    }
}

impl Program for BurnProgram {
    type State = BurnState;

    fn kind(&self) -> ProgramKind {
        ProgramKind::Burn
    }

    fn create(&self, ctx: &CallContext<'_>) -> Result<BurnState, Rejection> {
        Ok(BurnState {
            token_id: ctx.asset(0)?,
        })
    }

    fn evaluate(&self, ctx: &CallContext<'_>, state: &mut BurnState, host: &mut dyn Host) -> Outcome {
        match ctx.phase() {
            Phase::NoOp => Outcome::from_rule(Self::no_op(ctx, state, host)),
            Phase::OptIn => Outcome::from_decision(Self::opt_in(ctx, host)),
            Phase::CloseOut => Outcome::from_decision(check(ctx, EntryPoint::BurnCloseOut).map(|_| true)),
            Phase::Update => Outcome::from_decision(check(ctx, EntryPoint::BurnUpdate).map(|_| false)),
            Phase::Delete => {
                Outcome::from_decision(check(ctx, EntryPoint::BurnDelete).map(|_| ctx.is_creator()))
            }
            Phase::Creation => Outcome::HardReject(Rejection::PhaseRejected("creation")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, APP_ID};
    use asc_core::{Address, OnCompletion, Transaction};

    const TOKEN: u64 = 5;

    #[test]
    fn test_creation_records_token() {
        let fx = Fixture::deploy(BurnProgram::new(), vec![TOKEN]);
        assert_eq!(fx.state::<BurnState>(), BurnState { token_id: TOKEN });
    }

    #[test]
    fn test_creation_requires_asset_reference() {
        let creator = Address::from_seed(b"creator");
        let group = vec![Transaction::create_application(creator, ProgramKind::Burn, vec![])];
        let ctx = CallContext::new(APP_ID, creator, &group, 0).unwrap();
        let mut global = asc_core::GlobalState::new();
        let mut host = crate::host::MockHost::new();

        let outcome = BurnProgram::new().approve(&ctx, &mut global, &mut host);
        assert_eq!(outcome, Outcome::HardReject(Rejection::MissingAsset(0)));
        assert!(global.is_empty());
    }

    #[test]
    fn test_asset_opt_in_once() {
        let mut fx = Fixture::deploy(BurnProgram::new(), vec![TOKEN]);
        let creator = fx.creator;

        assert!(fx
            .noop(creator, vec![b"AssetOptIn".to_vec()], vec![], vec![TOKEN])
            .is_approved());
        assert_eq!(fx.host.asset_holding(&fx.app_address(), TOKEN), Some(0));

        assert_eq!(
            fx.noop(creator, vec![b"AssetOptIn".to_vec()], vec![], vec![TOKEN]),
            Outcome::HardReject(Rejection::AlreadyOptedIn(TOKEN))
        );
        assert_eq!(fx.host.submitted().len(), 1);
    }

    #[test]
    fn test_asset_opt_in_guards() {
        let mut fx = Fixture::deploy(BurnProgram::new(), vec![TOKEN]);
        let creator = fx.creator;
        let outsider = Address::from_seed(b"outsider");

        assert_eq!(
            fx.noop(outsider, vec![b"AssetOptIn".to_vec()], vec![], vec![TOKEN]),
            Outcome::HardReject(Rejection::NotCreator(outsider))
        );
        assert!(matches!(
            fx.noop(creator, vec![b"AssetOptIn".to_vec()], vec![], vec![TOKEN + 1]),
            Outcome::HardReject(Rejection::AssetMismatch { .. })
        ));
        assert_eq!(
            fx.noop(creator, vec![b"SellTokens".to_vec()], vec![], vec![TOKEN]),
            Outcome::HardReject(Rejection::UnknownOperation("SellTokens".to_string()))
        );
        assert!(matches!(
            fx.noop(creator, vec![b"AssetOptIn".to_vec(), b"x".to_vec()], vec![], vec![TOKEN]),
            Outcome::HardReject(Rejection::ArgCount { .. })
        ));
        let rekeyed = Transaction::app_call(
            creator,
            APP_ID,
            OnCompletion::NoOp,
            vec![b"AssetOptIn".to_vec()],
            vec![],
            vec![TOKEN],
        )
        .rekeyed_to(outsider);
        assert!(fx.call(rekeyed).is_hard_reject());
        assert!(fx.host.submitted().is_empty());
    }

    #[test]
    fn test_lifecycle_mirrors_mint() {
        let mut fx = Fixture::deploy(BurnProgram::new(), vec![TOKEN]);
        let creator = fx.creator;
        let outsider = Address::from_seed(b"outsider");

        assert_eq!(fx.lifecycle(outsider, OnCompletion::CloseOut), Outcome::SoftDecision(true));
        assert_eq!(fx.lifecycle(creator, OnCompletion::DeleteApplication), Outcome::SoftDecision(true));
        assert_eq!(fx.lifecycle(outsider, OnCompletion::DeleteApplication), Outcome::SoftDecision(false));
        assert_eq!(fx.lifecycle(creator, OnCompletion::UpdateApplication), Outcome::SoftDecision(false));

        fx.host.opt_in_app(creator, APP_ID);
        fx.host.opt_in_app(outsider, APP_ID);
        assert_eq!(fx.lifecycle(creator, OnCompletion::OptIn), Outcome::SoftDecision(true));
        assert_eq!(fx.lifecycle(outsider, OnCompletion::OptIn), Outcome::SoftDecision(false));
    }

    #[test]
    fn test_security_gate_on_every_operation() {
        let mut fx = Fixture::deploy(BurnProgram::new(), vec![TOKEN]);
        let creator = fx.creator;
        fx.host.opt_in_app(creator, APP_ID);

        let calls = [
            Transaction::app_call(
                creator,
                APP_ID,
                OnCompletion::NoOp,
                vec![b"AssetOptIn".to_vec()],
                vec![],
                vec![TOKEN],
            ),
            fx.lifecycle_call(creator, OnCompletion::OptIn),
            fx.lifecycle_call(creator, OnCompletion::CloseOut),
            fx.lifecycle_call(creator, OnCompletion::UpdateApplication),
            fx.lifecycle_call(creator, OnCompletion::DeleteApplication),
        ];
        for call in calls {
            fx.assert_gated(&[call], 0);
        }

        // The gate held before the opt-in sub-action could be issued
        assert!(fx.host.submitted().is_empty());
        assert_eq!(fx.host.asset_holding(&fx.app_address(), TOKEN), None);
    }
}
