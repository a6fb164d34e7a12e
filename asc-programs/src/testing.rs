//! Test fixture driving a single program against a mock host

use asc_core::{
    Address, AppId, AssetId, GlobalState, OnCompletion, Rejection, StateView, Transaction, TxnKind,
};

use crate::context::CallContext;
use crate::host::MockHost;
use crate::outcome::Outcome;
use crate::program::Program;

pub const APP_ID: AppId = 1;

pub struct Fixture<P: Program> {
    pub program: P,
    pub host: MockHost,
    pub global: GlobalState,
    pub creator: Address,
}

impl<P: Program> Fixture<P> {
    /// Run the creation call and keep the resulting state
    pub fn deploy(program: P, assets: Vec<AssetId>) -> Self {
        let creator = Address::from_seed(b"creator");
        let mut fx = Self {
            program,
            host: MockHost::new(),
            global: GlobalState::new(),
            creator,
        };
        let create = Transaction::create_application(creator, fx.program.kind(), assets);
        assert!(fx.call(create).is_approved());
        fx
    }

    pub fn app_address(&self) -> Address {
        Address::for_application(APP_ID)
    }

    pub fn state<S: StateView>(&self) -> S {
        S::load(&self.global).unwrap()
    }

    pub fn call(&mut self, txn: Transaction) -> Outcome {
        self.call_group(&[txn], 0)
    }

    pub fn call_group(&mut self, group: &[Transaction], index: usize) -> Outcome {
        let ctx = CallContext::new(APP_ID, self.creator, group, index).unwrap();
        self.program.approve(&ctx, &mut self.global, &mut self.host)
    }

    pub fn noop(
        &mut self,
        sender: Address,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        assets: Vec<AssetId>,
    ) -> Outcome {
        self.call(Transaction::app_call(sender, APP_ID, OnCompletion::NoOp, args, accounts, assets))
    }

    pub fn lifecycle(&mut self, sender: Address, on_completion: OnCompletion) -> Outcome {
        let txn = self.lifecycle_call(sender, on_completion);
        self.call(txn)
    }

    pub fn lifecycle_call(&self, sender: Address, on_completion: OnCompletion) -> Transaction {
        Transaction::app_call(sender, APP_ID, on_completion, vec![], vec![], vec![])
    }

    /// Assert that the call at `group[index]` is hard rejected when any
    /// safety field is set, when its group has the wrong size, or when it
    /// carries one argument too many. Global state must come out untouched.
    pub fn assert_gated(&mut self, group: &[Transaction], index: usize) {
        let thief = Address::from_seed(b"thief");
        let call = group[index].clone();
        let before = self.global.clone();

        let tampered = [
            call.clone().rekeyed_to(thief),
            call.clone().closing_remainder_to(thief),
            call.clone().closing_asset_to(thief),
        ];
        for txn in tampered {
            let mut bad = group.to_vec();
            bad[index] = txn;
            let outcome = self.call_group(&bad, index);
            assert!(outcome.is_hard_reject(), "{:?} for {:?}", outcome, bad[index]);
        }

        // A lone call where a pair is expected, otherwise one payment too many
        let outcome = if group.len() > 1 {
            self.call(call.clone())
        } else {
            let pay = Transaction::payment(call.sender, self.app_address(), 1);
            self.call_group(&[pay, call.clone()], 1)
        };
        assert!(
            matches!(outcome, Outcome::HardReject(Rejection::GroupSize { .. })),
            "{:?}",
            outcome
        );

        let mut padded = group.to_vec();
        if let TxnKind::ApplicationCall { args, .. } = &mut padded[index].kind {
            args.push(b"extra".to_vec());
        }
        let outcome = self.call_group(&padded, index);
        assert!(
            matches!(outcome, Outcome::HardReject(Rejection::ArgCount { .. })),
            "{:?}",
            outcome
        );

        assert_eq!(self.global, before);
    }
}
