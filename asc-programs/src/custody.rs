//! Asset custody rules shared by the programs that hold the token

use asc_core::{AssetId, Rejection, SubAction};
use log::debug;

use crate::context::CallContext;
use crate::host::Host;

/// The first referenced asset, which must be the token this application recorded
pub fn recorded_asset(ctx: &CallContext<'_>, recorded: AssetId) -> Result<AssetId, Rejection> {
    let referenced = ctx.asset(0)?;
    if referenced != recorded {
        return Err(Rejection::AssetMismatch {
            recorded,
            referenced,
        });
    }
    Ok(referenced)
}

/// Units of `asset` held by this application; zero when it holds none
pub fn own_balance(ctx: &CallContext<'_>, host: &dyn Host, asset: AssetId) -> u64 {
    host.asset_holding(&ctx.app_address, asset).unwrap_or(0)
}

/// Fail unless `0 < amount <= available`
pub fn require_spendable(amount: u64, available: u64) -> Result<(), Rejection> {
    if amount == 0 {
        return Err(Rejection::AmountOutOfBounds(amount));
    }
    if amount > available {
        return Err(Rejection::InsufficientBalance {
            requested: amount,
            available,
        });
    }
    Ok(())
}

/// Submit `action` through the host and report it as the call's sub-action
pub fn issue(
    ctx: &CallContext<'_>,
    host: &mut dyn Host,
    action: SubAction,
) -> Result<Option<SubAction>, Rejection> {
    host.submit(ctx.app_id, &action)?;
    debug!("Application {} issued {:?}", ctx.app_id, action);
    Ok(Some(action))
}

/// Register this application as a holder of the recorded token.
///
/// Creator-only and one-time: the application must not already hold the
/// asset. Custody is registered with a zero-unit transfer to itself.
pub fn opt_in_to_asset(
    ctx: &CallContext<'_>,
    recorded: AssetId,
    host: &mut dyn Host,
) -> Result<Option<SubAction>, Rejection> {
    ctx.require_creator()?;
    let asset = recorded_asset(ctx, recorded)?;
    if host.asset_holding(&ctx.app_address, asset).is_some() {
        return Err(Rejection::AlreadyOptedIn(asset));
    }

    issue(
        ctx,
        host,
        SubAction::AssetTransfer {
            asset,
            receiver: ctx.app_address,
            amount: 0,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_spendable() {
        assert!(require_spendable(1, 1).is_ok());
        assert_eq!(require_spendable(0, 10), Err(Rejection::AmountOutOfBounds(0)));
        assert_eq!(
            require_spendable(11, 10),
            Err(Rejection::InsufficientBalance {
                requested: 11,
                available: 10
            })
        );
    }
}
