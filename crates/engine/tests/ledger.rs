mod common;

use uuid::Uuid;

use common::{day, fixture};
use engine::{EngineError, LedgerEntry, TransactionUpdate};

#[tokio::test]
async fn append_moves_balance_and_numbers_rows() {
    let fx = fixture().await;

    let first = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            10_000,
            "Advance",
        ))
        .await
        .unwrap();
    let second = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(2),
            -2_500,
            "Diesel",
        ))
        .await
        .unwrap();

    assert_eq!(first.sequence, 1);
    assert_eq!(first.balance_minor, 10_000);
    assert_eq!(second.sequence, 2);
    assert_eq!(second.balance_minor, 7_500);
    assert_eq!(second.person_name, "Rossi Trasporti");

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 7_500);

    let last = fx.engine.last_transaction(fx.account.id).await.unwrap();
    assert_eq!(last.id, second.id);

    let fetched = fx.engine.transaction(first.id).await.unwrap();
    assert_eq!(fetched.amount_minor, 10_000);
    assert_eq!(fetched.description, "Advance");
}

#[tokio::test]
async fn append_validates_entry() {
    let fx = fixture().await;

    let err = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            0,
            "Nothing",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = fx
        .engine
        .append_transaction(LedgerEntry::new(
            Uuid::new_v4(),
            fx.person.id,
            day(1),
            100,
            "Lost",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let other = fx.engine.new_person("Bianchi Logistica").await.unwrap();
    let foreign = fx
        .engine
        .new_person_account(other.id, "Operations")
        .await
        .unwrap();
    let err = fx
        .engine
        .append_transaction(
            LedgerEntry::new(fx.account.id, fx.person.id, day(1), 100, "Wrong sub-account")
                .person_account_id(foreign.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 0);
}

#[tokio::test]
async fn last_transaction_of_empty_account_is_not_found() {
    let fx = fixture().await;

    let err = fx.engine.last_transaction(fx.account.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn only_the_last_transaction_can_be_deleted() {
    let fx = fixture().await;
    let first = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            10_000,
            "Advance",
        ))
        .await
        .unwrap();
    let second = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(2),
            -2_500,
            "Diesel",
        ))
        .await
        .unwrap();

    let err = fx
        .engine
        .delete_last_transaction(first.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotLastTransaction(first.id.to_string()));

    fx.engine.delete_last_transaction(second.id).await.unwrap();
    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 10_000);

    // The previous row is the last one again.
    fx.engine.delete_last_transaction(first.id).await.unwrap();
    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 0);
}

#[tokio::test]
async fn update_last_transaction_shifts_balance_by_delta() {
    let fx = fixture().await;
    let first = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            10_000,
            "Advance",
        ))
        .await
        .unwrap();
    let second = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(2),
            -2_500,
            "Diesel",
        ))
        .await
        .unwrap();

    let updated = fx
        .engine
        .update_last_transaction(
            second.id,
            TransactionUpdate {
                date: day(3),
                amount_minor: -3_000,
                description: "Diesel and tolls".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, -3_000);
    assert_eq!(updated.balance_minor, 7_000);
    assert_eq!(updated.date, day(3));
    assert_eq!(updated.sequence, 2);

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 7_000);

    let err = fx
        .engine
        .update_last_transaction(
            first.id,
            TransactionUpdate {
                date: day(1),
                amount_minor: 1,
                description: "Too late".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotLastTransaction(first.id.to_string()));
}

#[tokio::test]
async fn revert_appends_inverse_once() {
    let fx = fixture().await;
    let original = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            10_000,
            "Advance",
        ))
        .await
        .unwrap();

    let inverse = fx
        .engine
        .revert_transaction(original.id, day(4))
        .await
        .unwrap();
    assert_eq!(inverse.amount_minor, -10_000);
    assert_eq!(inverse.balance_minor, 0);
    assert_eq!(inverse.reverted_transaction_id, Some(original.id));
    assert_eq!(inverse.date, day(4));
    assert_eq!(inverse.sequence, 2);

    let err = fx
        .engine
        .revert_transaction(original.id, day(5))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::NotRevertible(format!("{} already reverted", original.id))
    );

    let err = fx
        .engine
        .revert_transaction(inverse.id, day(5))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::NotRevertible(format!("{} is itself a revert", inverse.id))
    );

    // Original history is kept.
    let kept = fx.engine.transaction(original.id).await.unwrap();
    assert_eq!(kept.amount_minor, 10_000);
}

#[tokio::test]
async fn amount_of_a_revert_is_fixed() {
    let fx = fixture().await;
    let original = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            10_000,
            "Advance",
        ))
        .await
        .unwrap();
    let inverse = fx
        .engine
        .revert_transaction(original.id, day(2))
        .await
        .unwrap();

    let err = fx
        .engine
        .update_last_transaction(
            inverse.id,
            TransactionUpdate {
                date: day(2),
                amount_minor: -9_000,
                description: "Partial".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotRevertible(_)));
}

#[tokio::test]
async fn amounts_without_opposite_are_rejected() {
    let fx = fixture().await;

    let err = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            i64::MIN,
            "Overflow",
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("amount out of range".to_string()));
    let err = fx.engine.last_transaction(fx.account.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let tx = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            -5,
            "Parking",
        ))
        .await
        .unwrap();

    for amount_minor in [i64::MAX, i64::MIN] {
        let err = fx
            .engine
            .update_last_transaction(
                tx.id,
                TransactionUpdate {
                    date: day(2),
                    amount_minor,
                    description: "Parking".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::Validation("amount out of range".to_string()));
    }

    let stored = fx.engine.transaction(tx.id).await.unwrap();
    assert_eq!(stored.amount_minor, -5);
    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, -5);

    fx.engine.delete_last_transaction(tx.id).await.unwrap();
    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, 0);
}

#[tokio::test]
async fn balance_cannot_leave_the_i64_range() {
    let fx = fixture().await;
    let first = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(1),
            i64::MAX - 10,
            "Opening balance",
        ))
        .await
        .unwrap();

    let err = fx
        .engine
        .append_transaction(LedgerEntry::new(
            fx.account.id,
            fx.person.id,
            day(2),
            100,
            "Freight",
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("balance out of range".to_string()));

    let account = fx.engine.money_account(fx.account.id).await.unwrap();
    assert_eq!(account.balance, i64::MAX - 10);
    let last = fx.engine.last_transaction(fx.account.id).await.unwrap();
    assert_eq!(last.id, first.id);

    let inverse = fx.engine.revert_transaction(first.id, day(3)).await.unwrap();
    assert_eq!(inverse.amount_minor, -(i64::MAX - 10));
    assert_eq!(inverse.balance_minor, 0);
}
