mod common;

use std::sync::Arc;

use uuid::Uuid;

use common::{bill_fields, day, fixture};
use engine::{BillStatus, CloseBill, ClosedBy, EngineError, PendingBillsFilter};

#[tokio::test]
async fn close_bill_records_transaction_and_moves_bill() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 12_000))
        .await
        .unwrap();

    let closed = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)))
        .await
        .unwrap();

    assert_eq!(closed.id, bill.id);
    assert_eq!(closed.status, BillStatus::Closed);
    assert_eq!(closed.person_name, "Rossi Trasporti");
    let Some(ClosedBy::Transaction(tx_id)) = closed.closed_by else {
        panic!("expected a transaction link, got {:?}", closed.closed_by);
    };

    let tx = fx.engine.transaction(tx_id).await.unwrap();
    assert_eq!(tx.amount_minor, 12_000);
    assert_eq!(tx.date, day(5));
    assert_eq!(tx.description, "Milano - Torino");
    assert_eq!(tx.person_id, fx.person.id);

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 12_000);

    let fetched = fx.engine.bill(bill.id).await.unwrap();
    assert!(!fetched.is_pending());
}

#[tokio::test]
async fn fee_reduces_magnitude_and_keeps_sign() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, -1_000))
        .await
        .unwrap();

    let closed = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)).fee_minor(150))
        .await
        .unwrap();

    // The bill keeps its face value; only the money moved is net of the fee.
    assert_eq!(closed.amount_minor, -1_000);
    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, -850);
}

#[tokio::test]
async fn fully_offset_bill_still_records_a_transaction() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 500))
        .await
        .unwrap();

    let closed = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)).fee_minor(500))
        .await
        .unwrap();

    let tx_id = closed
        .closed_by
        .and_then(ClosedBy::transaction_id)
        .unwrap();
    let tx = fx.engine.transaction(tx_id).await.unwrap();
    assert_eq!(tx.amount_minor, 0);
    assert_eq!(tx.balance_minor, 0);
}

#[tokio::test]
async fn failed_close_leaves_bill_pending() {
    let fx = fixture().await;
    let usd = fx
        .engine
        .new_money_account("Dollar account", "", "USD")
        .await
        .unwrap();
    let other = fx.engine.new_person("Bianchi Logistica").await.unwrap();
    let foreign = fx
        .engine
        .new_person_account(other.id, "Operations")
        .await
        .unwrap();
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();

    let err = fx
        .engine
        .close_bill(bill.id, CloseBill::new(usd.id, day(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CurrencyMismatch(_)));

    let err = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)).fee_minor(1_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = fx
        .engine
        .close_bill(
            bill.id,
            CloseBill::new(fx.account.id, day(5)).person_account_id(foreign.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = fx
        .engine
        .close_bill(bill.id, CloseBill::new(Uuid::new_v4(), day(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let stored = fx.engine.bill(bill.id).await.unwrap();
    assert!(stored.is_pending());
    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 0);
    let err = fx.engine.last_transaction(fx.account.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn bill_closes_only_once() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();
    fx.engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)))
        .await
        .unwrap();

    let err = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(6)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::BillNotPending(bill.id.to_string()));

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 1_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_closes_settle_the_bill_once() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();
    let account_id = fx.account.id;
    let engine = Arc::new(fx.engine);

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .close_bill(bill.id, CloseBill::new(account_id, day(5 + i)))
                    .await
            })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let errors: Vec<_> = results.into_iter().filter_map(Result::err).collect();
    assert_eq!(errors, vec![EngineError::BillNotPending(bill.id.to_string())]);

    let last = engine.last_transaction(account_id).await.unwrap();
    assert_eq!(last.sequence, 1);
    assert_eq!(last.amount_minor, 1_000);
    let account = engine.money_account(account_id).await.unwrap();
    assert_eq!(account.balance, 1_000);
    let stored = engine.bill(bill.id).await.unwrap();
    assert_eq!(stored.closed_by, Some(ClosedBy::Transaction(last.id)));
}

#[tokio::test]
async fn close_with_own_person_account() {
    let fx = fixture().await;
    let own = fx
        .engine
        .new_person_account(fx.person.id, "Fleet")
        .await
        .unwrap();
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();

    let closed = fx
        .engine
        .close_bill(
            bill.id,
            CloseBill::new(fx.account.id, day(5)).person_account_id(own.id),
        )
        .await
        .unwrap();

    let tx_id = closed
        .closed_by
        .and_then(ClosedBy::transaction_id)
        .unwrap();
    let tx = fx.engine.transaction(tx_id).await.unwrap();
    assert_eq!(tx.person_account_id, Some(own.id));
}

#[tokio::test]
async fn deleting_settlement_reopens_the_bill() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();
    let closed = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)))
        .await
        .unwrap();
    fx.engine
        .set_closed_bill_notes(bill.id, Some("paid"))
        .await
        .unwrap();
    let tx_id = closed
        .closed_by
        .and_then(ClosedBy::transaction_id)
        .unwrap();

    fx.engine.delete_last_transaction(tx_id).await.unwrap();

    let reopened = fx.engine.bill(bill.id).await.unwrap();
    assert!(reopened.is_pending());
    assert_eq!(reopened.amount_minor, 1_000);
    assert_eq!(reopened.closed_by, None);
    assert_eq!(reopened.notes, None);

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 0);

    // It can be settled again.
    fx.engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(7)))
        .await
        .unwrap();
}

#[tokio::test]
async fn revert_closed_bill_opens_follow_up() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();
    let closed = fx
        .engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)).fee_minor(100))
        .await
        .unwrap();
    let tx_id = closed
        .closed_by
        .and_then(ClosedBy::transaction_id)
        .unwrap();

    let follow_up = fx
        .engine
        .revert_closed_bill(bill.id, day(8))
        .await
        .unwrap();

    assert_ne!(follow_up.id, bill.id);
    assert!(follow_up.is_pending());
    assert_eq!(follow_up.amount_minor, 1_000);
    assert_eq!(follow_up.parent_transaction_id, Some(tx_id));
    assert_eq!(follow_up.person_name, "Rossi Trasporti");

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 0);

    let inverse = fx.engine.last_transaction(fx.account.id).await.unwrap();
    assert_eq!(inverse.reverted_transaction_id, Some(tx_id));
    assert_eq!(inverse.amount_minor, -900);

    let original = fx.engine.bill(bill.id).await.unwrap();
    assert_eq!(original.status, BillStatus::Closed);

    let err = fx
        .engine
        .revert_closed_bill(bill.id, day(9))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotRevertible(_)));
}

#[tokio::test]
async fn reverting_a_pending_bill_is_rejected() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();

    let err = fx
        .engine
        .revert_closed_bill(bill.id, day(8))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn deleting_the_inverse_discards_follow_up_bill() {
    let fx = fixture().await;
    let bill = fx
        .engine
        .create_pending_bill(bill_fields(fx.person.id, 1_000))
        .await
        .unwrap();
    fx.engine
        .close_bill(bill.id, CloseBill::new(fx.account.id, day(5)))
        .await
        .unwrap();
    let follow_up = fx
        .engine
        .revert_closed_bill(bill.id, day(8))
        .await
        .unwrap();
    let inverse = fx.engine.last_transaction(fx.account.id).await.unwrap();

    fx.engine.delete_last_transaction(inverse.id).await.unwrap();

    let err = fx.engine.bill(follow_up.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let page = fx
        .engine
        .list_pending_bills(&PendingBillsFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 1_000);
}
