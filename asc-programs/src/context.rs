//! Read-only view of the call being evaluated

use asc_core::{Address, AppId, AssetId, OnCompletion, Phase, Rejection, Transaction, TxnKind};

/// Everything a program may inspect about the call it is evaluating.
///
/// Borrowed from the group submitted to the ledger; programs never own or
/// modify the transactions they judge.
#[derive(Debug, Clone)]
pub struct CallContext<'a> {
    /// Id of the application being evaluated (already assigned during creation)
    pub app_id: AppId,
    /// Account controlled by the application
    pub app_address: Address,
    /// Identity that created the application
    pub creator: Address,
    /// The atomic group containing this call, in submission order
    pub group: &'a [Transaction],
    /// Position of this call inside `group`
    pub group_index: usize,
    phase: Phase,
    args: &'a [Vec<u8>],
    accounts: &'a [Address],
    assets: &'a [AssetId],
}

impl<'a> CallContext<'a> {
    /// Build the context for the application call at `group_index`
    pub fn new(
        app_id: AppId,
        creator: Address,
        group: &'a [Transaction],
        group_index: usize,
    ) -> Result<Self, Rejection> {
        let txn = group
            .get(group_index)
            .ok_or(Rejection::MissingGroupTransaction(group_index))?;

        let TxnKind::ApplicationCall {
            app_id: called_id,
            on_completion,
            args,
            accounts,
            assets,
            ..
        } = &txn.kind
        else {
            return Err(Rejection::GroupLayout(format!(
                "transaction {} is not an application call",
                group_index
            )));
        };

        Ok(Self {
            app_id,
            app_address: Address::for_application(app_id),
            creator,
            group,
            group_index,
            phase: Phase::of(*called_id, *on_completion),
            args,
            accounts,
            assets,
        })
    }

    /// The transaction carrying this call
    pub fn txn(&self) -> &'a Transaction {
        &self.group[self.group_index]
    }

    pub fn sender(&self) -> Address {
        self.txn().sender
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn on_completion(&self) -> OnCompletion {
        match &self.txn().kind {
            TxnKind::ApplicationCall { on_completion, .. } => *on_completion,
            _ => OnCompletion::NoOp,
        }
    }

    pub fn is_creator(&self) -> bool {
        self.sender() == self.creator
    }

    /// Hard-reject unless the caller created the application
    pub fn require_creator(&self) -> Result<(), Rejection> {
        if !self.is_creator() {
            return Err(Rejection::NotCreator(self.sender()));
        }
        Ok(())
    }

    pub fn args(&self) -> &'a [Vec<u8>] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Result<&'a [u8], Rejection> {
        self.args
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Rejection::MissingArgument(index))
    }

    /// Interpret an argument as a big-endian unsigned integer of at most 8 bytes
    pub fn arg_uint(&self, index: usize) -> Result<u64, Rejection> {
        btoi(self.arg(index)?)
    }

    /// Referenced account. Index 0 is always the sender; referenced accounts
    /// start at index 1.
    pub fn account(&self, index: usize) -> Result<Address, Rejection> {
        if index == 0 {
            return Ok(self.sender());
        }
        self.accounts
            .get(index - 1)
            .copied()
            .ok_or(Rejection::MissingAccount(index))
    }

    pub fn asset(&self, index: usize) -> Result<AssetId, Rejection> {
        self.assets
            .get(index)
            .copied()
            .ok_or(Rejection::MissingAsset(index))
    }

    pub fn group_txn(&self, index: usize) -> Result<&'a Transaction, Rejection> {
        self.group
            .get(index)
            .ok_or(Rejection::MissingGroupTransaction(index))
    }
}

/// Decode a big-endian unsigned integer of at most 8 bytes. Empty is zero.
pub fn btoi(bytes: &[u8]) -> Result<u64, Rejection> {
    if bytes.len() > 8 {
        return Err(Rejection::IntegerTooLong(bytes.len()));
    }
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::itob;

    fn call(args: Vec<Vec<u8>>, accounts: Vec<Address>, assets: Vec<AssetId>) -> Transaction {
        Transaction::app_call(
            Address::from_seed(b"caller"),
            4,
            OnCompletion::NoOp,
            args,
            accounts,
            assets,
        )
    }

    #[test]
    fn test_btoi() {
        assert_eq!(btoi(&[]).unwrap(), 0);
        assert_eq!(btoi(&[1, 0]).unwrap(), 256);
        assert_eq!(btoi(&itob(15_001_000)).unwrap(), 15_001_000);
        assert_eq!(btoi(&[0xff; 8]).unwrap(), u64::MAX);
        assert_eq!(btoi(&[0; 9]), Err(Rejection::IntegerTooLong(9)));
    }

    #[test]
    fn test_account_zero_is_sender() {
        let other = Address::from_seed(b"other");
        let group = vec![call(vec![], vec![other], vec![])];
        let ctx = CallContext::new(4, Address::from_seed(b"creator"), &group, 0).unwrap();

        assert_eq!(ctx.account(0).unwrap(), Address::from_seed(b"caller"));
        assert_eq!(ctx.account(1).unwrap(), other);
        assert_eq!(ctx.account(2), Err(Rejection::MissingAccount(2)));
        assert!(!ctx.is_creator());
        assert!(ctx.require_creator().is_err());
    }

    #[test]
    fn test_arguments_and_assets() {
        let group = vec![call(vec![b"Transfer".to_vec(), itob(10)], vec![], vec![42])];
        let ctx = CallContext::new(4, Address::from_seed(b"caller"), &group, 0).unwrap();

        assert_eq!(ctx.arg(0).unwrap(), b"Transfer");
        assert_eq!(ctx.arg_uint(1).unwrap(), 10);
        assert_eq!(ctx.arg(2), Err(Rejection::MissingArgument(2)));
        assert_eq!(ctx.asset(0).unwrap(), 42);
        assert_eq!(ctx.asset(1), Err(Rejection::MissingAsset(1)));
        assert_eq!(ctx.phase(), Phase::NoOp);
        assert!(ctx.is_creator());
        assert_eq!(ctx.app_address, Address::for_application(4));
    }

    #[test]
    fn test_context_requires_application_call() {
        let alice = Address::from_seed(b"alice");
        let group = vec![Transaction::payment(alice, alice, 1)];
        assert!(matches!(
            CallContext::new(4, alice, &group, 0),
            Err(Rejection::GroupLayout(_))
        ));
        assert_eq!(
            CallContext::new(4, alice, &group, 3).unwrap_err(),
            Rejection::MissingGroupTransaction(3)
        );
    }
}
