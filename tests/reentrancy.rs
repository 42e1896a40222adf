//! Integration tests for reentrant dispatch.
//!
//! The dispatcher calls back into the wallet while an external call is
//! running, acting as the call's destination. A proposal must execute at most
//! once no matter what the callee does, and the callee can never act as the
//! wallet or as an owner it is not.

use concord::wallet::{DispatchError, Dispatcher, NoopDispatcher, OutboundCall};
use concord::{
    Address, ExecutionOutcome, ProposalId, Reentry, RequirementMode, Wallet, WalletError,
};

fn addr(label: &str) -> Address {
    Address::from_label(label)
}

fn two_of_three() -> Wallet {
    Wallet::with_policy(
        addr("wallet"),
        &[addr("alice"), addr("bob"), addr("carol")],
        2,
        RequirementMode::Under,
    )
    .unwrap()
}

/// What the callee tries while its call is in flight.
#[derive(Clone, Copy)]
enum Attack {
    Execute,
    Confirm,
    Revoke,
}

/// Calls back into the wallet once per dispatch and records what happened.
struct HostileCallee {
    attack: Attack,
    seen: Vec<Result<(), WalletError>>,
    calls: usize,
    fail_after_attack: bool,
}

impl HostileCallee {
    fn new(attack: Attack) -> Self {
        Self {
            attack,
            seen: Vec::new(),
            calls: 0,
            fail_after_attack: false,
        }
    }
}

impl Dispatcher for HostileCallee {
    fn dispatch(&mut self, mut wallet: Reentry<'_>, call: &OutboundCall) -> Result<(), DispatchError> {
        self.calls += 1;
        let mut inner = NoopDispatcher;
        let result = match self.attack {
            Attack::Execute => wallet
                .execute_transaction(call.proposal, &mut inner)
                .map(|_| ()),
            Attack::Confirm => wallet
                .confirm_transaction(call.proposal, &mut inner)
                .map(|_| ()),
            Attack::Revoke => wallet.revoke_confirmation(call.proposal),
        };
        self.seen.push(result);

        if self.fail_after_attack {
            Err(DispatchError::Rejected {
                destination: call.destination,
                reason: "callee reverted".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Pays carol, an owner, who attacks the proposal paying her.
fn run_attack(attack: Attack) -> (Wallet, HostileCallee, ProposalId) {
    let mut wallet = two_of_three();
    wallet.deposit(addr("donor"), 10).unwrap();
    let mut callee = HostileCallee::new(attack);

    let id = wallet
        .submit_transaction(&addr("alice"), addr("carol"), 10, vec![], &mut callee)
        .unwrap()
        .id;
    let confirmation = wallet
        .confirm_transaction(&addr("bob"), id, &mut callee)
        .unwrap();
    assert_eq!(confirmation.execution, Some(ExecutionOutcome::Executed));

    (wallet, callee, id)
}

#[test]
fn test_nested_execute_is_rejected() {
    let (wallet, callee, id) = run_attack(Attack::Execute);

    assert_eq!(callee.calls, 1);
    assert_eq!(callee.seen, vec![Err(WalletError::ExecutionInProgress(id))]);
    assert!(wallet.get_proposal(id).unwrap().executed);
    // Value left exactly once
    assert_eq!(wallet.balance(), 0);
}

#[test]
fn test_nested_confirm_is_rejected() {
    let (wallet, callee, id) = run_attack(Attack::Confirm);

    assert_eq!(callee.calls, 1);
    assert_eq!(callee.seen, vec![Err(WalletError::ExecutionInProgress(id))]);
    assert!(!wallet.confirmed_by_owner(id, &addr("carol")).unwrap());
}

#[test]
fn test_nested_revoke_is_rejected() {
    let (wallet, callee, id) = run_attack(Attack::Revoke);

    assert_eq!(callee.seen, vec![Err(WalletError::ExecutionInProgress(id))]);
    assert_eq!(wallet.confirmation_count(id).unwrap(), 2);
}

#[test]
fn test_nested_attempt_then_revert_leaves_proposal_retryable() {
    let mut wallet = two_of_three();
    wallet.deposit(addr("donor"), 10).unwrap();
    let mut callee = HostileCallee::new(Attack::Execute);
    callee.fail_after_attack = true;

    let id = wallet
        .submit_transaction(&addr("alice"), addr("carol"), 10, vec![], &mut callee)
        .unwrap()
        .id;
    let confirmation = wallet
        .confirm_transaction(&addr("bob"), id, &mut callee)
        .unwrap();

    assert!(matches!(
        confirmation.execution,
        Some(ExecutionOutcome::Failed(_))
    ));
    assert_eq!(callee.seen, vec![Err(WalletError::ExecutionInProgress(id))]);
    assert!(!wallet.get_proposal(id).unwrap().executed);
    assert_eq!(wallet.balance(), 10);

    // The guard is released once the outer attempt finishes
    let outcome = wallet
        .execute_transaction(&addr("carol"), id, &mut NoopDispatcher)
        .unwrap();
    assert_eq!(outcome, ExecutionOutcome::Executed);
    assert_eq!(wallet.balance(), 0);
}

/// An outsider that tries to rewrite the owner set and to act as an owner.
#[derive(Default)]
struct Usurper {
    caller: Option<Address>,
    governance: Vec<Result<(), WalletError>>,
    owner_actions: Vec<Result<(), WalletError>>,
}

impl Dispatcher for Usurper {
    fn dispatch(&mut self, mut wallet: Reentry<'_>, call: &OutboundCall) -> Result<(), DispatchError> {
        self.caller = Some(wallet.caller());
        let me = wallet.address();
        let mut inner = NoopDispatcher;

        self.governance = vec![
            wallet.add_owner(call.destination),
            wallet.remove_owner(addr("carol")),
            wallet.change_owner(addr("alice"), call.destination),
            wallet.change_requirement(RequirementMode::Under, 1),
        ];
        self.owner_actions = vec![
            wallet
                .submit_transaction(me, 0, vec![], &mut inner)
                .map(|_| ()),
            wallet
                .submit_transaction(call.destination, 0, vec![], &mut inner)
                .map(|_| ()),
            wallet.confirm_transaction(1, &mut inner).map(|_| ()),
            wallet.revoke_confirmation(1),
        ];
        Ok(())
    }
}

#[test]
fn test_callee_cannot_act_as_wallet_or_owner() {
    let mut wallet = two_of_three();
    wallet.deposit(addr("donor"), 100).unwrap();
    let pending = wallet
        .submit_transaction(&addr("alice"), addr("elsewhere"), 0, vec![], &mut NoopDispatcher)
        .unwrap()
        .id;

    let mallory = addr("mallory");
    let mut callee = Usurper::default();
    let id = wallet
        .submit_transaction(&addr("alice"), mallory, 1, vec![], &mut callee)
        .unwrap()
        .id;
    let confirmation = wallet
        .confirm_transaction(&addr("bob"), id, &mut callee)
        .unwrap();
    assert_eq!(confirmation.execution, Some(ExecutionOutcome::Executed));

    assert_eq!(callee.caller, Some(mallory));
    assert_eq!(callee.governance, vec![Err(WalletError::OnlyWallet); 4]);
    assert_eq!(callee.owner_actions, vec![Err(WalletError::OnlyOwner(mallory)); 4]);

    assert_eq!(wallet.owners(), &[addr("alice"), addr("bob"), addr("carol")]);
    assert_eq!(wallet.requirement(), 2);
    assert_eq!(wallet.proposal_count(), 2);
    assert_eq!(wallet.confirmation_count(pending).unwrap(), 1);
    assert_eq!(wallet.balance(), 99);
}

/// Drives a different proposal from inside a callback, as the owner it is.
struct ChainingCallee {
    driven: Option<ExecutionOutcome>,
}

impl Dispatcher for ChainingCallee {
    fn dispatch(&mut self, mut wallet: Reentry<'_>, call: &OutboundCall) -> Result<(), DispatchError> {
        if call.destination != addr("carol") {
            return Ok(());
        }
        let confirmation = wallet
            .confirm_transaction(1, &mut NoopDispatcher)
            .map_err(|_| DispatchError::Unreachable(call.destination))?;
        self.driven = confirmation.execution;
        Ok(())
    }
}

#[test]
fn test_owner_callee_can_drive_other_proposals() {
    let mut wallet = two_of_three();
    let mut callee = ChainingCallee { driven: None };

    let other = wallet
        .submit_transaction(&addr("alice"), addr("second"), 0, vec![], &mut callee)
        .unwrap()
        .id;
    let first = wallet
        .submit_transaction(&addr("alice"), addr("carol"), 0, vec![], &mut callee)
        .unwrap()
        .id;
    wallet
        .confirm_transaction(&addr("bob"), first, &mut callee)
        .unwrap();

    assert_eq!(other, 1);
    assert_eq!(callee.driven, Some(ExecutionOutcome::Executed));
    assert!(wallet.get_proposal(first).unwrap().executed);
    assert!(wallet.get_proposal(other).unwrap().executed);
    assert!(wallet.confirmed_by_owner(other, &addr("carol")).unwrap());
}
