//! Property tests for tables and deltas.

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};
use proptest::prelude::*;
use rtr_table::payload::addr::Prefix;
use rtr_table::rtr::{
    compute_deltas, Action, Deltas, RouteOrigin, RouterKey, Table,
};


//------------ Strategies ----------------------------------------------------

/// Route origins from a small domain so that tables overlap.
fn arb_origin() -> impl Strategy<Value = RouteOrigin> {
    prop_oneof![
        (0u8..4, 16u8..18, 0u32..3).prop_map(|(net, max_len, asn)| {
            RouteOrigin::new(
                Prefix::new_v4(Ipv4Addr::new(10, net, 0, 0), 16).unwrap(),
                max_len, asn.into()
            )
        }),
        (0u16..4, 32u8..34, 0u32..3).prop_map(|(net, max_len, asn)| {
            RouteOrigin::new(
                Prefix::new_v6(
                    Ipv6Addr::new(0x2001, 0xdb8 + net, 0, 0, 0, 0, 0, 0), 32
                ).unwrap(),
                max_len, asn.into()
            )
        }),
    ]
}

fn arb_router_key() -> impl Strategy<Value = RouterKey> {
    (0u8..4, 0u32..2, 0u8..2).prop_map(|(ski, asn, spki)| {
        RouterKey::new([ski; 20].into(), asn.into(), vec![spki].into())
    })
}

fn arb_table() -> impl Strategy<Value = Table> {
    (
        prop::collection::vec(arb_origin(), 0..12),
        prop::collection::vec(arb_router_key(), 0..6),
    ).prop_map(|(origins, keys)| {
        let mut res = Table::new();
        for item in origins {
            res.add_origin(item).unwrap();
        }
        for item in keys {
            res.add_router_key_value(item).unwrap();
        }
        res
    })
}


//------------ Helpers -------------------------------------------------------

fn origin_set(table: &Table) -> HashSet<RouteOrigin> {
    table.origins().iter().copied().collect()
}

fn key_set(table: &Table) -> HashSet<RouterKey> {
    table.router_keys().iter().cloned().collect()
}

fn delta_origins(deltas: &Deltas, action: Action) -> HashSet<RouteOrigin> {
    deltas.origins().filter(|item| item.1 == action).map(|item| item.0)
        .collect()
}

fn delta_keys(deltas: &Deltas, action: Action) -> HashSet<RouterKey> {
    deltas.router_keys().filter(|item| item.1 == action)
        .map(|item| item.0.clone())
        .collect()
}

/// The pass an entry belongs to.
fn pass(is_key: bool, action: Action) -> u8 {
    (if is_key { 2 } else { 0 }) + (if action.is_withdraw() { 1 } else { 0 })
}


//------------ Properties ----------------------------------------------------

proptest! {
    #[test]
    fn repeated_insert_keeps_one(item in arb_origin(), times in 1usize..10) {
        let mut table = Table::new();
        for _ in 0..times {
            table.add_origin(item).unwrap();
        }
        prop_assert_eq!(table.roa_count(), 1);
        prop_assert!(table.contains_roa(&item));
    }

    #[test]
    fn remove_absent_is_noop(mut table in arb_table(), item in arb_origin()) {
        let present = table.contains_roa(&item);
        let before = table.clone();
        prop_assert_eq!(table.remove_roa(&item), present);
        if present {
            prop_assert_eq!(table.roa_count() + 1, before.roa_count());
            prop_assert!(!table.contains_roa(&item));
            prop_assert!(!table.remove_roa(&item));
        }
        else {
            prop_assert_eq!(&table, &before);
        }
    }

    #[test]
    fn deltas_are_set_differences(old in arb_table(), new in arb_table()) {
        let deltas = compute_deltas(&old, &new).unwrap();

        let (old_o, new_o) = (origin_set(&old), origin_set(&new));
        prop_assert_eq!(
            delta_origins(&deltas, Action::Announce),
            new_o.difference(&old_o).copied().collect::<HashSet<_>>()
        );
        prop_assert_eq!(
            delta_origins(&deltas, Action::Withdraw),
            old_o.difference(&new_o).copied().collect::<HashSet<_>>()
        );

        let (old_k, new_k) = (key_set(&old), key_set(&new));
        prop_assert_eq!(
            delta_keys(&deltas, Action::Announce),
            new_k.difference(&old_k).cloned().collect::<HashSet<_>>()
        );
        prop_assert_eq!(
            delta_keys(&deltas, Action::Withdraw),
            old_k.difference(&new_k).cloned().collect::<HashSet<_>>()
        );

        // No entry appears twice.
        prop_assert_eq!(
            deltas.iter().collect::<HashSet<_>>().len(), deltas.len()
        );
    }

    #[test]
    fn deltas_follow_pass_order(old in arb_table(), new in arb_table()) {
        let deltas = compute_deltas(&old, &new).unwrap();
        let passes = deltas.iter().map(|(payload, action)| {
            pass(payload.as_router_key().is_some(), action)
        }).collect::<Vec<_>>();
        prop_assert!(passes.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn same_table_has_no_deltas(table in arb_table()) {
        let copy = table.clone();
        prop_assert!(compute_deltas(&table, &copy).unwrap().is_empty());
        prop_assert!(compute_deltas(&table, &table).unwrap().is_empty());
    }

    #[test]
    fn swapping_swaps_actions(old in arb_table(), new in arb_table()) {
        let forward = compute_deltas(&old, &new).unwrap();
        let backward = compute_deltas(&new, &old).unwrap();
        prop_assert_eq!(forward.len(), backward.len());
        prop_assert_eq!(forward.announce_count(), backward.withdraw_count());
        prop_assert_eq!(
            forward.iter().map(|(payload, action)| {
                (payload.clone(), action.invert())
            }).collect::<HashSet<_>>(),
            backward.iter().map(|(payload, action)| {
                (payload.clone(), action)
            }).collect::<HashSet<_>>()
        );
    }

    #[test]
    fn applying_deltas_yields_new(old in arb_table(), new in arb_table()) {
        let deltas = compute_deltas(&old, &new).unwrap();
        let mut cache = old.clone();
        cache.apply(&deltas).unwrap();
        prop_assert_eq!(cache, new);
    }
}
