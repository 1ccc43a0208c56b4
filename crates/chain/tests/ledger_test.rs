use chrono::{TimeZone, Utc};
use ledgerchain_chain::{ChainStatus, Ledger, LedgerConfig, LedgerError};
use ledgerchain_core::{MerkleTree, Transaction, TransactionError, COINBASE_MARK};
use ledgerchain_storage::{ChainStore, Storage};
use std::time::Duration;

fn tx(student: &str, mark: f64) -> Transaction {
    let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    Transaction::new(student, "CS101", mark, ts, 1)
}

fn submit_batch(ledger: &mut Ledger<'_>, prefix: &str, count: usize) {
    for i in 0..count {
        ledger
            .submit_transaction(tx(&format!("{prefix}{i}"), 5.0 + i as f64))
            .unwrap();
    }
}

#[test]
fn test_open_creates_genesis() {
    let storage = Storage::open_temporary().unwrap();
    let ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();

    assert_eq!(ledger.blocks().len(), 1);
    assert_eq!(ledger.status(), ChainStatus::Ok);

    let genesis = ledger.block(0).unwrap();
    assert!(genesis.is_genesis());
    assert!(genesis.previous_block_hash().is_none());
    assert_eq!(genesis.transactions.len(), 1);
    assert_eq!(genesis.transactions[0].student_code(), "genesis");
    assert_eq!(genesis.transactions[0].mark(), COINBASE_MARK);

    assert_eq!(ledger.pending().block_number(), 1);
    assert_eq!(ChainStore::new(&storage).block_count().unwrap(), 1);
}

#[test]
fn test_commit_block() {
    let storage = Storage::open_temporary().unwrap();
    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
    submit_batch(&mut ledger, "ST", 4);

    let committed = ledger.commit_block().unwrap();
    assert_eq!(committed.block_number(), 1);
    assert_eq!(committed.tx_count(), 4);
    let genesis_hash = ledger.block(0).unwrap().block_hash();
    assert_eq!(ledger.block(1).unwrap().previous_block_hash(), genesis_hash);

    assert_eq!(ledger.blocks().len(), 2);
    assert_eq!(ledger.pending().block_number(), 2);
    assert_eq!(ledger.pending().tx_count(), 0);
    assert!(ledger.verify().unwrap());
    assert!(ChainStore::new(&storage).has_block(1).unwrap());
}

#[test]
fn test_commit_requires_enough_transactions() {
    let storage = Storage::open_temporary().unwrap();
    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
    submit_batch(&mut ledger, "ST", 3);

    let err = ledger.commit_block().unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotEnoughTransactions { have: 3, need: 4 }
    ));
    assert_eq!(ledger.blocks().len(), 1);
    assert_eq!(ledger.pending().tx_count(), 3);
}

#[test]
fn test_min_transactions_is_configurable() {
    let storage = Storage::open_temporary().unwrap();
    let config = LedgerConfig {
        min_transactions_per_block: 1,
        ..LedgerConfig::default()
    };
    let mut ledger = Ledger::open(&storage, config).unwrap();
    ledger.submit_transaction(tx("ST0", 7.0)).unwrap();

    assert_eq!(ledger.commit_block().unwrap().tx_count(), 1);
}

#[test]
fn test_invalid_transaction_rejected() {
    let storage = Storage::open_temporary().unwrap();
    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();

    let err = ledger.submit_transaction(tx("  ", 5.0)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Transaction(TransactionError::EmptyStudentCode)
    ));

    let err = ledger.submit_transaction(tx("ST0", -1.0)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Transaction(TransactionError::InvalidMark(_))
    ));
    assert_eq!(ledger.pending().tx_count(), 0);
}

#[test]
fn test_reopen_restores_chain_and_pending() {
    let dir = tempfile::tempdir().unwrap();
    let genesis_hash;

    {
        let storage = Storage::open(dir.path()).unwrap();
        let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
        genesis_hash = ledger.block(0).unwrap().block_hash();
        submit_batch(&mut ledger, "A", 4);
        ledger.commit_block().unwrap();
        submit_batch(&mut ledger, "B", 2);
    }

    let storage = Storage::open(dir.path()).unwrap();
    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();

    assert_eq!(ledger.status(), ChainStatus::Ok);
    assert_eq!(ledger.blocks().len(), 2);
    assert_eq!(ledger.block(0).unwrap().block_hash(), genesis_hash);
    assert_eq!(ledger.pending().block_number(), 2);
    assert_eq!(ledger.pending().tx_count(), 2);

    submit_batch(&mut ledger, "C", 2);
    assert_eq!(ledger.commit_block().unwrap().block_number(), 2);
    assert!(ledger.verify().unwrap());
}

#[test]
fn test_reopen_does_not_rewrite_pending() {
    let storage = Storage::open_temporary().unwrap();
    drop(Ledger::open(&storage, LedgerConfig::default()).unwrap());

    let mut events = storage.watch_prefix("chain:pending");
    let ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
    assert_eq!(ledger.status(), ChainStatus::Ok);
    assert!(events.next_timeout(Duration::from_millis(100)).is_err());
    drop(ledger);

    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
    ledger.submit_transaction(tx("ST0", 6.0)).unwrap();
    assert!(events.next_timeout(Duration::from_millis(100)).is_ok());
}

#[test]
fn test_tampered_storage_is_detected_on_open() {
    let dir = tempfile::tempdir().unwrap();

    {
        let storage = Storage::open(dir.path()).unwrap();
        let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
        submit_batch(&mut ledger, "A", 4);
        ledger.commit_block().unwrap();
        submit_batch(&mut ledger, "B", 4);
        ledger.commit_block().unwrap();

        // Rewrite a grade behind the ledger's back, keeping the stored hash.
        let store = ChainStore::new(&storage);
        let mut block = store.get_block(1).unwrap().unwrap();
        block.transactions[2] = tx("A2", 10.0);
        store.put_block(&block).unwrap();
        storage.flush().unwrap();
    }

    let storage = Storage::open(dir.path()).unwrap();
    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();

    assert_eq!(ledger.status(), ChainStatus::WrongBlock);
    assert_eq!(ledger.chain().wrong_block_numbers(), vec![1, 2]);
    assert_eq!(ledger.wrong_blocks().len(), 2);

    let err = ledger.submit_transaction(tx("C0", 5.0)).unwrap_err();
    assert!(matches!(err, LedgerError::CorruptChain(ref wrong) if wrong == &vec![1, 2]));
}

#[test]
fn test_audit_proof_for_committed_transaction() {
    let storage = Storage::open_temporary().unwrap();
    let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
    submit_batch(&mut ledger, "ST", 5);
    ledger.commit_block().unwrap();

    let leaf = ledger.block(1).unwrap().transactions[3].hash();
    let (root, proof) = ledger.audit_proof(1, 3).unwrap();
    assert!(MerkleTree::verify_audit(&root, &leaf, &proof).unwrap());

    let other = ledger.block(1).unwrap().transactions[0].hash();
    assert!(!MerkleTree::verify_audit(&root, &other, &proof).unwrap());

    assert!(matches!(
        ledger.audit_proof(7, 0),
        Err(LedgerError::BlockNotFound(7))
    ));
}
