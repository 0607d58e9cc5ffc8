//! Readers racing tier transitions never observe a partial array.

use std::sync::Arc;
use std::thread;

use terrane_core::PropertyKind;
use terrane_store::{PropertyStore, SpillDir, StoreConfig, StoreError, SwapWorker};

const NODES: usize = 4096;

fn populated_store() -> PropertyStore {
    let spill = Arc::new(SpillDir::temporary().unwrap());
    let mut store = PropertyStore::new(NODES, spill, StoreConfig::default()).unwrap();
    let p = store.add("ramp", PropertyKind::Numeric).unwrap();
    p.replace_values((0..NODES).map(|i| i as f32).collect()).unwrap();
    store
}

#[test]
fn readers_see_whole_arrays_during_swaps() {
    let store = populated_store();
    let property = store.get("ramp").unwrap();
    let expected_sum: f64 = (0..NODES).map(|i| i as f64).sum();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let p = Arc::clone(&property);
            thread::spawn(move || {
                for _ in 0..50 {
                    let (len, sum) = p
                        .with_values(|v| (v.len(), v.iter().map(|&x| x as f64).sum::<f64>()))
                        .unwrap();
                    assert_eq!(len, NODES);
                    assert_eq!(sum, expected_sum);
                }
            })
        })
        .collect();

    for _ in 0..50 {
        store.swap_to_disk(&["ramp"]);
        store.swap_to_ram(&["ramp"]);
    }
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn background_swap_then_fault_in_on_read() {
    let store = populated_store();
    let worker = SwapWorker::spawn().unwrap();
    let report = worker
        .submit_to_disk(&store, &["ramp"])
        .unwrap()
        .wait()
        .unwrap();
    assert!(report.is_clean());

    // No explicit swap_to_ram: reading faults the array back in.
    let last = store.with_values("ramp", |v| v[NODES - 1]).unwrap();
    assert_eq!(last, (NODES - 1) as f32);
    assert!(store.get("ramp").unwrap().is_resident().unwrap());
}

#[test]
fn dropping_store_cleans_spill_directory() {
    let spill = Arc::new(SpillDir::temporary().unwrap());
    let root = spill.path().to_path_buf();
    {
        let mut store = PropertyStore::new(16, Arc::clone(&spill), StoreConfig::default()).unwrap();
        store.add("a", PropertyKind::Numeric).unwrap();
        store.add("b", PropertyKind::Numeric).unwrap();
        store.swap_to_disk(&["a", "b"]);
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 2);
    }
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
}

#[test]
fn removal_reaches_handles_held_by_other_threads() {
    let mut store = populated_store();
    store.swap_to_disk(&["ramp"]);
    let property = store.get("ramp").unwrap();
    let page = store.spill_dir().page_path(property.id());

    let reader = {
        let p = Arc::clone(&property);
        thread::spawn(move || loop {
            match p.with_values(|v| v.len()) {
                Ok(len) => assert_eq!(len, NODES),
                Err(e) => return e,
            }
        })
    };
    store.remove("ramp").unwrap();
    let err = reader.join().unwrap();
    assert!(matches!(err, StoreError::Deleted { .. }));
    assert!(!page.exists());
    assert!(property.is_deleted());
}
