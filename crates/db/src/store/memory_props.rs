//! Property tests for atomic commits in the in-memory store.

use proptest::prelude::*;
use tally_core::ledger::{Account, AccountType};

use super::{AccountStore, ChangeSet, InMemoryStore, UnitOfWork};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// A change set holding one stale entry writes nothing at all.
    #[test]
    fn prop_stale_entry_rejects_whole_commit(
        count in 2usize..8,
        stale_index in 0usize..8,
    ) {
        let stale_index = stale_index % count;
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryStore::new();
            let mut accounts: Vec<Account> = (0..count)
                .map(|i| {
                    Account::new(
                        format!("{}", 1000 + i),
                        format!("Account {i}"),
                        AccountType::Asset,
                        None,
                    )
                })
                .collect();

            let mut changes = ChangeSet::new();
            for account in &mut accounts {
                changes.put(account);
            }
            store.commit(changes).await.unwrap();

            let mut changes = ChangeSet::new();
            for (i, account) in accounts.iter_mut().enumerate() {
                account.name = format!("Renamed {i}");
                if i == stale_index {
                    account.version += 5;
                }
                changes.put(account);
            }
            prop_assert!(store.commit(changes).await.is_err());

            for stored in store.list_accounts().await.unwrap() {
                prop_assert!(stored.name.starts_with("Account "));
                prop_assert_eq!(stored.version, 1);
            }
            Ok(())
        })?;
    }

    /// Sequences hand out 1..=n without gaps or repeats.
    #[test]
    fn prop_sequences_are_dense(n in 1u64..50) {
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryStore::new();
            for expected in 1..=n {
                prop_assert_eq!(store.next_sequence("doc").await.unwrap(), expected);
            }
            Ok(())
        })?;
    }
}
