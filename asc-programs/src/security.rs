//! Structural safety checks shared by every entry point
//!
//! Each entry point of each program maps to one [`CallShape`] in a single
//! table, and one guard enforces it. Programs never spell out group sizes or
//! argument counts at the call site.

use asc_core::Rejection;
use log::debug;

use crate::context::CallContext;

/// Expected size of the atomic group and number of positional arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallShape {
    pub group_size: usize,
    pub arg_count: usize,
}

impl CallShape {
    pub const fn new(group_size: usize, arg_count: usize) -> Self {
        Self {
            group_size,
            arg_count,
        }
    }
}

/// Every guarded entry point across the three programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    MintMint,
    MintTransfer,
    MintBurn,
    MintSetAccount,
    MintOptIn,
    MintCloseOut,
    MintUpdate,
    MintDelete,
    HoldingsAssetOptIn,
    HoldingsSellTokens,
    HoldingsUpdatePrice,
    HoldingsOptIn,
    HoldingsCloseOut,
    HoldingsUpdate,
    HoldingsDelete,
    /// Checked before the burn program dispatches on the operation name
    BurnNoOp,
    BurnAssetOptIn,
    BurnOptIn,
    BurnCloseOut,
    BurnUpdate,
    BurnDelete,
}

impl EntryPoint {
    /// The dispatch table
    pub const fn shape(self) -> CallShape {
        match self {
            EntryPoint::MintMint => CallShape::new(1, 1),
            EntryPoint::MintTransfer | EntryPoint::MintBurn | EntryPoint::MintSetAccount => {
                CallShape::new(1, 2)
            }
            EntryPoint::MintOptIn
            | EntryPoint::MintCloseOut
            | EntryPoint::MintUpdate
            | EntryPoint::MintDelete => CallShape::new(1, 0),

            EntryPoint::HoldingsAssetOptIn => CallShape::new(1, 1),
            EntryPoint::HoldingsSellTokens => CallShape::new(2, 2),
            EntryPoint::HoldingsUpdatePrice => CallShape::new(1, 2),
            EntryPoint::HoldingsOptIn
            | EntryPoint::HoldingsCloseOut
            | EntryPoint::HoldingsUpdate
            | EntryPoint::HoldingsDelete => CallShape::new(1, 0),

            EntryPoint::BurnNoOp | EntryPoint::BurnAssetOptIn => CallShape::new(1, 1),
            EntryPoint::BurnOptIn
            | EntryPoint::BurnCloseOut
            | EntryPoint::BurnUpdate
            | EntryPoint::BurnDelete => CallShape::new(1, 0),
        }
    }
}

/// Reject a call unless it is structurally safe for `entry`.
///
/// The call must not rekey its sender, must not close out any remaining
/// balance or asset holding, and must arrive in a group of the expected size
/// with the expected number of arguments.
pub fn check(ctx: &CallContext<'_>, entry: EntryPoint) -> Result<(), Rejection> {
    check_shape(ctx, entry.shape()).map_err(|rejection| {
        debug!("Security check failed for {:?}: {}", entry, rejection);
        rejection
    })
}

/// Enforce an explicit shape. Prefer [`check`] so that shapes stay in the table.
pub fn check_shape(ctx: &CallContext<'_>, shape: CallShape) -> Result<(), Rejection> {
    let txn = ctx.txn();

    if !txn.rekey_to.is_zero() {
        return Err(Rejection::RekeyRequested(txn.rekey_to));
    }
    if !txn.close_remainder_to.is_zero() {
        return Err(Rejection::CloseRemainderRequested(txn.close_remainder_to));
    }
    if !txn.asset_close_to.is_zero() {
        return Err(Rejection::AssetCloseRequested(txn.asset_close_to));
    }
    if ctx.group.len() != shape.group_size {
        return Err(Rejection::GroupSize {
            expected: shape.group_size,
            actual: ctx.group.len(),
        });
    }
    if ctx.args().len() != shape.arg_count {
        return Err(Rejection::ArgCount {
            expected: shape.arg_count,
            actual: ctx.args().len(),
        });
    }
    Ok(())
}
