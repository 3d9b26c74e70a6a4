use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ledger::domain::account::{AccountAggregate, AccountCommand};
use ledger::domain::transaction::{TransactionAggregate, TransactionCommand};
use ledger::handler::EventHandler;
use ledger::manager::CommandDispatcher;
use ledger::policy::transfer_to_account::TransferToAccountPolicy;
use ledger::projection::accounts::AccountsProjection;
use ledger::store::PgEventStore;
use ledger::types::Currency;

fn eur() -> Currency {
    Currency::new("EUR")
}

fn usd() -> Currency {
    Currency::new("USD")
}

/// S1: opening an account and depositing into it lands the expected balance in the
/// `accounts_projection` read model once the events are relayed to the projection.
#[sqlx::test]
async fn opening_and_depositing_lands_the_expected_balance(pool: PgPool) {
    ledger::sql::migrations::run(&pool).await.expect("migrations");

    let accounts = CommandDispatcher::new(PgEventStore::<AccountAggregate>::new(pool.clone()));
    let projection = AccountsProjection::new(pool.clone());

    let account_id = Uuid::new_v4();
    accounts
        .handle_command(account_id, AccountCommand::Open { name: "Checking".into(), currency: eur() })
        .await
        .expect("operational success")
        .expect("domain success");

    let deposited = accounts
        .handle_command(
            account_id,
            AccountCommand::Deposit { currency: eur(), amount: Decimal::from(100), user: "alice".into() },
        )
        .await
        .expect("operational success")
        .expect("domain success");
    assert_eq!(deposited.balance(&eur()), Decimal::from(100));

    // Deliver both events to the projection directly, as the outbox relay would.
    let events = accounts.load(account_id).await.unwrap();
    assert_eq!(events.version(), 2);

    let store = PgEventStore::<AccountAggregate>::new(pool.clone());
    for event in ledger::store::EventStore::by_aggregate_id(&store, account_id).await.unwrap() {
        EventHandler::<AccountAggregate>::handle(&projection, &event).await.unwrap();
    }

    let snapshot = projection
        .snapshot_all()
        .await
        .unwrap()
        .into_iter()
        .find(|row| row.id == account_id)
        .expect("projected row");
    assert_eq!(snapshot.balance.get(&eur()).copied().unwrap_or_default(), Decimal::from(100));
    assert!(snapshot.created_at.is_some());
}

/// S4: a registered transfer's `MoneyTransfered` event drives the transfer-to-account policy,
/// which withdraws from the source and deposits into the destination. Redelivering the same
/// event a second time (simulating an at-least-once relay retry) must leave balances unchanged.
#[sqlx::test]
async fn transfer_policy_moves_money_and_is_idempotent_under_redelivery(pool: PgPool) {
    ledger::sql::migrations::run(&pool).await.expect("migrations");

    let accounts_store = PgEventStore::<AccountAggregate>::new(pool.clone());
    let accounts = CommandDispatcher::new(PgEventStore::<AccountAggregate>::new(pool.clone()));
    let transactions = CommandDispatcher::new(PgEventStore::<TransactionAggregate>::new(pool.clone()));
    let projection = AccountsProjection::new(pool.clone());
    let policy = TransferToAccountPolicy::new(pool.clone(), CommandDispatcher::new(PgEventStore::<AccountAggregate>::new(pool.clone())));

    let from_id = Uuid::new_v4();
    let to_id = Uuid::new_v4();
    accounts
        .handle_command(from_id, AccountCommand::Open { name: "From".into(), currency: eur() })
        .await
        .unwrap()
        .unwrap();
    accounts
        .handle_command(from_id, AccountCommand::Deposit { currency: eur(), amount: Decimal::from(200), user: "alice".into() })
        .await
        .unwrap()
        .unwrap();
    accounts
        .handle_command(to_id, AccountCommand::Open { name: "To".into(), currency: eur() })
        .await
        .unwrap()
        .unwrap();

    let transaction_id = Uuid::new_v4();
    transactions
        .handle_command(
            transaction_id,
            TransactionCommand::RegisterTransfer {
                from_account_id: from_id,
                from_currency: eur(),
                from_amount: Decimal::from(50),
                to_account_id: to_id,
                to_currency: eur(),
                to_amount: Decimal::from(50),
                category: "transfer".into(),
                description: "rent split".into(),
            },
        )
        .await
        .expect("operational success")
        .expect("domain success");

    let transaction_store = PgEventStore::<TransactionAggregate>::new(pool.clone());
    let transfer_event = ledger::store::EventStore::by_aggregate_id(&transaction_store, transaction_id)
        .await
        .unwrap()
        .into_iter()
        .next()
        .expect("one MoneyTransfered event");

    // First delivery: both legs apply.
    EventHandler::<TransactionAggregate>::handle(&policy, &transfer_event).await.unwrap();
    EventHandler::<TransactionAggregate>::handle(&projection, &transfer_event).await.unwrap();

    // Redelivery of the same record must be a no-op for both the policy and the projection.
    EventHandler::<TransactionAggregate>::handle(&policy, &transfer_event).await.unwrap();
    EventHandler::<TransactionAggregate>::handle(&projection, &transfer_event).await.unwrap();

    let from_state = accounts.load(from_id).await.unwrap();
    let to_state = accounts.load(to_id).await.unwrap();
    // 200 deposited, 50 withdrawn by the policy exactly once -> 150.
    assert_eq!(from_state.inner().balance(&eur()), Decimal::from(150));
    assert_eq!(to_state.inner().balance(&eur()), Decimal::from(50));

    let snapshots = projection.snapshot_all().await.unwrap();
    let from_row = snapshots.iter().find(|row| row.id == from_id).unwrap();
    let to_row = snapshots.iter().find(|row| row.id == to_id).unwrap();
    assert_eq!(from_row.balance.get(&eur()).copied().unwrap_or_default(), Decimal::from(150));
    assert_eq!(to_row.balance.get(&eur()).copied().unwrap_or_default(), Decimal::from(50));

    // Sanity: the policy only ever dispatched one withdraw and one deposit command.
    let from_history = ledger::store::EventStore::by_aggregate_id(&accounts_store, from_id).await.unwrap();
    assert_eq!(from_history.len(), 3); // Opened, Deposited, Withdrawn
}

/// S5: a cross-currency transfer moves a different amount out of the source currency than
/// lands in the destination currency — the aggregate allows it as long as both legs are
/// positive, and the projection tracks each currency independently.
#[sqlx::test]
async fn cross_currency_transfer_applies_each_leg_in_its_own_currency(pool: PgPool) {
    ledger::sql::migrations::run(&pool).await.expect("migrations");

    let accounts = CommandDispatcher::new(PgEventStore::<AccountAggregate>::new(pool.clone()));
    let transactions = CommandDispatcher::new(PgEventStore::<TransactionAggregate>::new(pool.clone()));
    let projection = AccountsProjection::new(pool.clone());
    let policy = TransferToAccountPolicy::new(pool.clone(), CommandDispatcher::new(PgEventStore::<AccountAggregate>::new(pool.clone())));

    let usd_account = Uuid::new_v4();
    let eur_account = Uuid::new_v4();
    accounts
        .handle_command(usd_account, AccountCommand::Open { name: "USD wallet".into(), currency: usd() })
        .await
        .unwrap()
        .unwrap();
    accounts
        .handle_command(usd_account, AccountCommand::Deposit { currency: usd(), amount: Decimal::from(300), user: "bob".into() })
        .await
        .unwrap()
        .unwrap();
    accounts
        .handle_command(eur_account, AccountCommand::Open { name: "EUR wallet".into(), currency: eur() })
        .await
        .unwrap()
        .unwrap();

    let transaction_id = Uuid::new_v4();
    transactions
        .handle_command(
            transaction_id,
            TransactionCommand::RegisterTransfer {
                from_account_id: usd_account,
                from_currency: usd(),
                from_amount: Decimal::from(100),
                to_account_id: eur_account,
                to_currency: eur(),
                to_amount: Decimal::from(92),
                category: "fx".into(),
                description: "currency exchange".into(),
            },
        )
        .await
        .expect("operational success")
        .expect("domain success");

    let transaction_store = PgEventStore::<TransactionAggregate>::new(pool.clone());
    let transfer_event = ledger::store::EventStore::by_aggregate_id(&transaction_store, transaction_id)
        .await
        .unwrap()
        .into_iter()
        .next()
        .expect("one MoneyTransfered event");

    EventHandler::<TransactionAggregate>::handle(&policy, &transfer_event).await.unwrap();
    EventHandler::<TransactionAggregate>::handle(&projection, &transfer_event).await.unwrap();

    let usd_state = accounts.load(usd_account).await.unwrap();
    let eur_state = accounts.load(eur_account).await.unwrap();
    assert_eq!(usd_state.inner().balance(&usd()), Decimal::from(200));
    assert_eq!(eur_state.inner().balance(&eur()), Decimal::from(92));

    let snapshots = projection.snapshot_all().await.unwrap();
    let usd_row = snapshots.iter().find(|row| row.id == usd_account).unwrap();
    let eur_row = snapshots.iter().find(|row| row.id == eur_account).unwrap();
    assert_eq!(usd_row.balance.get(&usd()).copied().unwrap_or_default(), Decimal::from(200));
    assert_eq!(eur_row.balance.get(&eur()).copied().unwrap_or_default(), Decimal::from(92));
}
