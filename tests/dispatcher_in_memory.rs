use rust_decimal::Decimal;
use uuid::Uuid;

use ledger::cancel::CancellationToken;
use ledger::domain::account::{AccountAggregate, AccountCommand, AccountError};
use ledger::error::StoreError;
use ledger::manager::CommandDispatcher;
use ledger::store::InMemoryEventStore;
use ledger::types::Currency;

fn eur() -> Currency {
    Currency::new("EUR")
}

/// Sleeps a random handful of microseconds so concurrent dispatches don't interleave the
/// same way on every run, giving the version-conflict retry path a real chance to fire.
async fn jitter() {
    use rand::Rng;
    let micros = rand::thread_rng().gen_range(0..500);
    tokio::time::sleep(std::time::Duration::from_micros(micros)).await;
}

fn dispatcher() -> CommandDispatcher<AccountAggregate, InMemoryEventStore<AccountAggregate>> {
    CommandDispatcher::new(InMemoryEventStore::default())
}

#[tokio::test]
async fn negative_amount_is_rejected_without_appending_a_record() {
    let dispatcher = dispatcher();
    let id = Uuid::new_v4();

    dispatcher
        .handle_command(id, AccountCommand::Open { name: "B".into(), currency: eur() })
        .await
        .expect("operational success")
        .expect("domain success");

    let before = dispatcher.load(id).await.unwrap();

    let outcome = dispatcher
        .handle_command(id, AccountCommand::Withdraw { currency: eur(), amount: Decimal::NEGATIVE_ONE * Decimal::from(5), user: "u1".into() })
        .await
        .expect("operational success");

    assert_eq!(outcome, Err(AccountError::AmountNotPositive));

    let after = dispatcher.load(id).await.unwrap();
    assert_eq!(before.version(), after.version(), "rejected command must not advance the version");
}

#[tokio::test]
async fn concurrent_deposits_both_land_at_distinct_versions() {
    let dispatcher = std::sync::Arc::new(dispatcher());
    let id = Uuid::new_v4();

    dispatcher
        .handle_command(id, AccountCommand::Open { name: "C".into(), currency: eur() })
        .await
        .unwrap()
        .unwrap();

    let a = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            jitter().await;
            dispatcher
                .handle_command(id, AccountCommand::Deposit { currency: eur(), amount: Decimal::from(10), user: "u1".into() })
                .await
        })
    };
    let b = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            jitter().await;
            dispatcher
                .handle_command(id, AccountCommand::Deposit { currency: eur(), amount: Decimal::from(10), user: "u2".into() })
                .await
        })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a.is_ok() && b.is_ok(), "both deposits should eventually succeed via retry");

    let state = dispatcher.load(id).await.unwrap();
    assert_eq!(state.version(), 3); // Opened + two deposits
    assert_eq!(state.inner().balance(&eur()), Decimal::from(20));
}

#[tokio::test]
async fn hydration_is_deterministic() {
    let dispatcher = dispatcher();
    let id = Uuid::new_v4();

    dispatcher
        .handle_command(id, AccountCommand::Open { name: "H".into(), currency: eur() })
        .await
        .unwrap()
        .unwrap();
    for _ in 0..9 {
        dispatcher
            .handle_command(id, AccountCommand::Deposit { currency: eur(), amount: Decimal::from(1), user: "u1".into() })
            .await
            .unwrap()
            .unwrap();
    }

    let first = dispatcher.load(id).await.unwrap();
    let second = dispatcher.load(id).await.unwrap();

    assert_eq!(first.version(), second.version());
    assert_eq!(first.inner().balance(&eur()), second.inner().balance(&eur()));
}

#[tokio::test]
async fn pre_cancelled_token_aborts_before_appending() {
    let dispatcher = dispatcher();
    let id = Uuid::new_v4();

    dispatcher
        .handle_command(id, AccountCommand::Open { name: "D".into(), currency: eur() })
        .await
        .unwrap()
        .unwrap();
    let before = dispatcher.load(id).await.unwrap();

    let (tx, rx) = tokio::sync::watch::channel(false);
    tx.send(true).unwrap();
    let mut cancel = CancellationToken::new(rx);

    let outcome = dispatcher
        .handle_command_cancellable(
            id,
            AccountCommand::Deposit { currency: eur(), amount: Decimal::from(10), user: "u1".into() },
            &mut cancel,
        )
        .await;

    assert!(matches!(outcome, Err(StoreError::Cancelled)));
    let after = dispatcher.load(id).await.unwrap();
    assert_eq!(before.version(), after.version(), "a cancelled command must not append an event");
}

/// A `CancellationToken::never()` token must not fire on its own: `cancelled()` should stay
/// pending rather than resolving immediately, since nothing ever signals it.
#[tokio::test]
async fn never_token_does_not_resolve_on_its_own() {
    let mut token = CancellationToken::never();
    let raced = tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled()).await;
    assert!(raced.is_err(), "cancelled() on a never() token must not resolve");
}
