//! Property-based tests for the wallet engine
//!
//! Random operation sequences (valid and invalid, from owners and
//! outsiders) are applied to a fresh wallet. After every step:
//! - Quorum: the policy is valid for the current owner count
//! - Ledger: ids are exactly 1..=count
//! - Executed flags never revert
//! - Balance: deposits minus value sent by executed external proposals
//! - Pagination: pure, and pending/executed partition the ledger

use super::mock::RecordingDispatcher;
use super::*;
use proptest::prelude::*;

const POOL: [&str; 6] = ["owner1", "owner2", "owner3", "owner4", "owner5", "outsider"];
const DESTINATIONS: [&str; 3] = ["alpha", "beta", "rejecting"];

/// Governance never names the last pool entry, so it stays an outsider.
const CANDIDATES: usize = POOL.len() - 1;

#[derive(Debug, Clone)]
enum Op {
    Deposit(u64),
    Transfer {
        actor: usize,
        destination: usize,
        value: u64,
    },
    Govern {
        actor: usize,
        op: GovernanceOp,
    },
    Confirm {
        actor: usize,
        id: ProposalId,
    },
    Revoke {
        actor: usize,
        id: ProposalId,
    },
    Execute {
        actor: usize,
        id: ProposalId,
    },
}

fn who(index: usize) -> Address {
    Address::from_label(POOL[index])
}

fn governance_op() -> impl Strategy<Value = GovernanceOp> {
    prop_oneof![
        (0..CANDIDATES).prop_map(|i| GovernanceOp::AddOwner { owner: who(i) }),
        (0..CANDIDATES).prop_map(|i| GovernanceOp::RemoveOwner { owner: who(i) }),
        (0..CANDIDATES, 0..CANDIDATES).prop_map(|(a, b)| GovernanceOp::ChangeOwner {
            old: who(a),
            new: who(b),
        }),
        (any::<bool>(), 0usize..7).prop_map(|(equal, requirement)| {
            GovernanceOp::SetRequirement {
                mode: if equal {
                    RequirementMode::Equal
                } else {
                    RequirementMode::Under
                },
                requirement,
            }
        }),
    ]
}

fn operation() -> impl Strategy<Value = Op> {
    let actor = 0..POOL.len();
    let id = 1u64..10;
    prop_oneof![
        (1u64..50).prop_map(Op::Deposit),
        (actor.clone(), 0..DESTINATIONS.len(), 0u64..40).prop_map(
            |(actor, destination, value)| Op::Transfer {
                actor,
                destination,
                value,
            }
        ),
        (actor.clone(), governance_op()).prop_map(|(actor, op)| Op::Govern { actor, op }),
        (actor.clone(), id.clone()).prop_map(|(actor, id)| Op::Confirm { actor, id }),
        (actor.clone(), id.clone()).prop_map(|(actor, id)| Op::Revoke { actor, id }),
        (actor, id).prop_map(|(actor, id)| Op::Execute { actor, id }),
    ]
}

fn fresh_wallet() -> (Wallet, RecordingDispatcher) {
    let owners: Vec<Address> = (0..4).map(who).collect();
    let wallet = Wallet::new(Address::from_label("wallet"), &owners).unwrap();
    let mut dispatcher = RecordingDispatcher::new();
    dispatcher.reject(Address::from_label("rejecting"));
    (wallet, dispatcher)
}

fn apply(wallet: &mut Wallet, dispatcher: &mut RecordingDispatcher, op: &Op) {
    // Errors are expected for a large share of random operations; the
    // invariants must hold either way.
    let _ = match op {
        Op::Deposit(amount) => wallet
            .deposit(Address::from_label("donor"), Amount::from(*amount))
            .map(|_| ()),
        Op::Transfer {
            actor,
            destination,
            value,
        } => wallet
            .submit_transaction(
                &who(*actor),
                Address::from_label(DESTINATIONS[*destination]),
                Amount::from(*value),
                vec![],
                dispatcher,
            )
            .map(|_| ()),
        Op::Govern { actor, op } => {
            let destination = wallet.address();
            wallet
                .submit_transaction(&who(*actor), destination, 0, op.encode().unwrap(), dispatcher)
                .map(|_| ())
        }
        Op::Confirm { actor, id } => wallet
            .confirm_transaction(&who(*actor), *id, dispatcher)
            .map(|_| ()),
        Op::Revoke { actor, id } => wallet.revoke_confirmation(&who(*actor), *id),
        Op::Execute { actor, id } => wallet
            .execute_transaction(&who(*actor), *id, dispatcher)
            .map(|_| ()),
    };
}

proptest! {
    /// Property: Invariants survive arbitrary operation sequences
    #[test]
    fn invariants_hold_for_random_sequences(
        ops in prop::collection::vec(operation(), 1..60),
    ) {
        let (mut wallet, mut dispatcher) = fresh_wallet();
        let mut deposited: Amount = 0;
        let mut executed_before: Vec<ProposalId> = Vec::new();

        for op in &ops {
            let balance_before = wallet.balance();
            apply(&mut wallet, &mut dispatcher, op);
            if let Op::Deposit(_) = op {
                deposited += wallet.balance() - balance_before;
            }

            prop_assert!(
                QuorumPolicy::validate(wallet.quorum_mode(), wallet.requirement(), wallet.owner_count()).is_ok(),
                "policy {} ({}) invalid for {} owners",
                wallet.requirement(),
                wallet.quorum_mode(),
                wallet.owner_count()
            );

            let all = wallet.list_by_filter(1, usize::MAX, TxFilter::ALL);
            let ids: Vec<ProposalId> = all.iter().map(|p| p.id).collect();
            let expected: Vec<ProposalId> = (1..=wallet.proposal_count() as u64).collect();
            prop_assert_eq!(ids, expected);

            for id in &executed_before {
                prop_assert!(wallet.get_proposal(*id).unwrap().executed, "proposal {} reverted", id);
            }
            executed_before = all.iter().filter(|p| p.executed).map(|p| p.id).collect();

            let sent: Amount = all
                .iter()
                .filter(|p| p.executed && p.destination != wallet.address())
                .map(|p| p.value)
                .sum();
            prop_assert_eq!(wallet.balance(), deposited - sent);
        }
    }

    /// Property: Pending and executed pages partition the ledger, and
    /// repeated queries agree
    #[test]
    fn pagination_partitions_and_is_pure(
        ops in prop::collection::vec(operation(), 1..60),
        offset in 0usize..12,
        limit in 0usize..12,
    ) {
        let (mut wallet, mut dispatcher) = fresh_wallet();
        for op in &ops {
            apply(&mut wallet, &mut dispatcher, op);
        }

        let pending = wallet.list_by_filter(1, usize::MAX, TxFilter::PENDING);
        let executed = wallet.list_by_filter(1, usize::MAX, TxFilter::EXECUTED);
        prop_assert_eq!(pending.len() + executed.len(), wallet.proposal_count());
        prop_assert!(pending.iter().all(|p| !p.executed));
        prop_assert!(executed.iter().all(|p| p.executed));

        let page = wallet.list_by_filter(offset, limit, TxFilter::PENDING);
        prop_assert_eq!(&page, &wallet.list_by_filter(offset, limit, TxFilter::PENDING));
        prop_assert!(page.len() <= limit);

        let start = offset.max(1) - 1;
        let expected: Vec<Proposal> = pending.iter().skip(start).take(limit).cloned().collect();
        prop_assert_eq!(page, expected);
    }

    /// Property: Approval counts never exceed the number of distinct
    /// addresses that ever owned the wallet
    #[test]
    fn approvals_are_distinct(
        ops in prop::collection::vec(operation(), 1..60),
    ) {
        let (mut wallet, mut dispatcher) = fresh_wallet();
        for op in &ops {
            apply(&mut wallet, &mut dispatcher, op);
        }

        for id in 1..=wallet.proposal_count() as u64 {
            let approvers = wallet.confirmers_of(id).unwrap();
            let mut distinct = approvers.to_vec();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(distinct.len(), approvers.len());
            prop_assert_eq!(wallet.confirmation_count(id).unwrap(), approvers.len());
            prop_assert!(!approvers.contains(&who(CANDIDATES)), "outsider approval recorded");
        }
    }
}
