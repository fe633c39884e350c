//! Delta computation between tables.

use std::cell::{Cell, RefCell};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::{Arc, Weak};
use rtr_table::payload::bgpsec::KeyIdentifier;
use rtr_table::rtr::{
    compute_deltas, compute_deltas_into, Action, DeltaSink, Payload,
    RouteOrigin, RouterKey, Table,
};


//------------ Helpers -------------------------------------------------------

fn ski(s: &str) -> KeyIdentifier {
    KeyIdentifier::from_str(s).unwrap()
}

const K1: &str = "0101010101010101010101010101010101010101";
const K2: &str = "0202020202020202020202020202020202020202";

fn collect(table_old: &Table, table_new: &Table) -> Vec<(Payload, Action)> {
    compute_deltas(table_old, table_new).unwrap()
        .iter().map(|(payload, action)| (payload.clone(), action))
        .collect()
}


//------------ Scenarios -----------------------------------------------------

#[test]
fn one_new_origin() {
    let mut old = Table::new();
    old.add_roa_v4(64500.into(), Ipv4Addr::new(10, 0, 0, 0), 24, 24)
        .unwrap();

    let mut new = Table::new();
    new.add_roa_v4(64500.into(), Ipv4Addr::new(10, 0, 0, 0), 24, 24)
        .unwrap();
    new.add_roa_v4(64501.into(), Ipv4Addr::new(192, 0, 2, 0), 24, 24)
        .unwrap();

    let deltas = compute_deltas(&old, &new).unwrap();
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas.withdraw_count(), 0);
    let (origin, action) = deltas.origins().next().unwrap();
    assert_eq!(action, Action::Announce);
    assert_eq!(origin.asn, 64501.into());
    assert_eq!(origin.prefix.to_string(), "192.0.2.0/24");
    assert_eq!(origin.max_len, 24);

    // Diffing leaves both tables alone.
    assert_eq!(old.roa_count(), 1);
    assert_eq!(new.roa_count(), 2);
}

#[test]
fn router_key_withdrawn() {
    let mut old = Table::new();
    old.add_router_key(ski(K1), 64500.into(), b"P1").unwrap();
    let new = Table::new();

    assert_eq!(
        collect(&old, &new),
        vec![(
            Payload::router_key(ski(K1), 64500.into(), b"P1"[..].into()),
            Action::Withdraw
        )]
    );
}

#[test]
fn changed_max_len_is_withdraw_and_announce() {
    let mut old = Table::new();
    old.add_roa_v4(64500.into(), Ipv4Addr::new(10, 0, 0, 0), 16, 16)
        .unwrap();
    let mut new = Table::new();
    new.add_roa_v4(64500.into(), Ipv4Addr::new(10, 0, 0, 0), 16, 20)
        .unwrap();

    let deltas = collect(&old, &new);
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0].1, Action::Announce);
    assert_eq!(deltas[0].0.to_origin().unwrap().max_len, 20);
    assert_eq!(deltas[1].1, Action::Withdraw);
    assert_eq!(deltas[1].0.to_origin().unwrap().max_len, 16);
}

#[test]
fn same_content_different_instances() {
    let build = || {
        let mut table = Table::new();
        table.add_roa_v4(1.into(), Ipv4Addr::new(203, 0, 113, 0), 24, 24)
            .unwrap();
        table.add_roa_v6(1.into(), "2001:db8::".parse().unwrap(), 32, 48)
            .unwrap();
        table.add_router_key(ski(K2), 1.into(), b"spki").unwrap();
        table
    };
    assert!(compute_deltas(&build(), &build()).unwrap().is_empty());
    assert!(compute_deltas(&Table::new(), &Table::new()).unwrap().is_empty());
}

#[test]
fn deltas_outlive_tables() {
    let deltas = {
        let old = Table::new();
        let mut new = Table::new();
        new.add_router_key(ski(K1), 64500.into(), b"P1").unwrap();
        compute_deltas(&old, &new).unwrap()
    };
    let held = deltas.clone();
    drop(deltas);
    assert_eq!(held.strong_count(), 1);
    let (key, action) = held.router_keys().next().unwrap();
    assert_eq!(action, Action::Announce);
    assert_eq!(key.key_info.as_ref(), b"P1");
}

#[test]
fn apply_deltas() {
    let mut old = Table::new();
    old.add_roa_v4(1.into(), Ipv4Addr::new(10, 0, 0, 0), 8, 8).unwrap();
    old.add_router_key(ski(K1), 1.into(), b"a").unwrap();
    let mut new = Table::new();
    new.add_roa_v4(2.into(), Ipv4Addr::new(10, 0, 0, 0), 8, 8).unwrap();
    new.add_router_key(ski(K1), 1.into(), b"a").unwrap();
    new.add_router_key(ski(K2), 1.into(), b"b").unwrap();

    let deltas = compute_deltas(&old, &new).unwrap();
    let mut cache = old.clone();
    cache.apply(&deltas).unwrap();
    assert_eq!(cache, new);
}


//------------ Failing Sink --------------------------------------------------

thread_local! {
    /// How many more appends the next sink accepts.
    static REMAINING: Cell<usize> = Cell::new(0);

    /// The token of the most recently created sink.
    static LAST_SINK: RefCell<Weak<()>> = RefCell::new(Weak::new());
}

#[derive(Debug, Eq, PartialEq)]
struct SinkFull;

struct LimitedSink {
    token: Arc<()>,
    items: Vec<(Payload, Action)>,
}

impl LimitedSink {
    fn append(
        &mut self, payload: Payload, action: Action
    ) -> Result<(), SinkFull> {
        let remaining = REMAINING.with(Cell::get);
        if remaining == 0 {
            return Err(SinkFull)
        }
        REMAINING.with(|cell| cell.set(remaining - 1));
        self.items.push((payload, action));
        Ok(())
    }
}

impl DeltaSink for LimitedSink {
    type Error = SinkFull;

    fn create() -> Result<Self, Self::Error> {
        let token = Arc::new(());
        LAST_SINK.with(|last| *last.borrow_mut() = Arc::downgrade(&token));
        Ok(LimitedSink { token, items: Vec::new() })
    }

    fn append_origin(
        &mut self, origin: &RouteOrigin, action: Action
    ) -> Result<(), Self::Error> {
        self.append((*origin).into(), action)
    }

    fn append_router_key(
        &mut self, key: &RouterKey, action: Action
    ) -> Result<(), Self::Error> {
        self.append(key.clone().into(), action)
    }
}

fn sample_tables() -> (Table, Table) {
    let mut old = Table::new();
    old.add_roa_v4(1.into(), Ipv4Addr::new(10, 0, 0, 0), 8, 8).unwrap();
    old.add_router_key(ski(K1), 1.into(), b"a").unwrap();
    let mut new = Table::new();
    new.add_roa_v4(2.into(), Ipv4Addr::new(10, 0, 0, 0), 8, 8).unwrap();
    new.add_router_key(ski(K2), 1.into(), b"b").unwrap();
    (old, new)
}

#[test]
fn sink_failure_releases_sink() {
    let (old, new) = sample_tables();

    // One entry per pass. Let the third pass fail.
    REMAINING.with(|cell| cell.set(2));
    let res = compute_deltas_into::<LimitedSink>(&old, &new);
    assert!(matches!(res, Err(SinkFull)));
    assert!(LAST_SINK.with(|last| last.borrow().upgrade().is_none()));

    // Also when the very first append fails.
    REMAINING.with(|cell| cell.set(0));
    assert!(compute_deltas_into::<LimitedSink>(&old, &new).is_err());
    assert!(LAST_SINK.with(|last| last.borrow().upgrade().is_none()));
}

#[test]
fn sink_success_transfers_ownership() {
    let (old, new) = sample_tables();

    REMAINING.with(|cell| cell.set(4));
    let sink = match compute_deltas_into::<LimitedSink>(&old, &new) {
        Ok(sink) => sink,
        Err(_) => panic!("sink should have accepted all entries"),
    };
    assert_eq!(Arc::strong_count(&sink.token), 1);
    assert_eq!(
        sink.items.iter().map(|item| item.1).collect::<Vec<_>>(),
        vec![
            Action::Announce, Action::Withdraw,
            Action::Announce, Action::Withdraw
        ]
    );
    assert!(sink.items[0].0.to_origin().is_some());
    assert!(sink.items[2].0.as_router_key().is_some());
}
