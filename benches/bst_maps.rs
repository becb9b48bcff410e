use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ordered_tree::red_black_tree::{OrderedTree, RedBlackMap};
use rand::Rng;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 1000;

fn random_keys() -> Vec<u32> {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    (0..NUM_OF_OPERATIONS).map(|_| rng.next_u32()).collect()
}

fn bench_btreemap_insert(c: &mut Criterion) {
    let keys = random_keys();
    c.bench_function("bench btreemap insert", move |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for key in &keys {
                map.insert(*key, *key);
            }
        })
    });
}

fn bench_btreemap_get(c: &mut Criterion) {
    let keys = random_keys();
    let map: BTreeMap<u32, u32> = keys.iter().map(|key| (*key, *key)).collect();
    c.bench_function("bench btreemap get", move |b| {
        b.iter(|| {
            for key in &keys {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_red_black_map_insert(c: &mut Criterion) {
    let keys = random_keys();
    c.bench_function("bench red_black_map insert", move |b| {
        b.iter(|| {
            let mut map = RedBlackMap::new();
            for key in &keys {
                map.insert(*key, *key);
            }
        })
    });
}

fn bench_red_black_map_get(c: &mut Criterion) {
    let keys = random_keys();
    let mut map = RedBlackMap::new();
    for key in &keys {
        map.insert(*key, *key);
    }
    c.bench_function("bench red_black_map get", move |b| {
        b.iter(|| {
            for key in &keys {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_ordered_tree_insert_delete(c: &mut Criterion) {
    let keys = random_keys();
    c.bench_function("bench ordered_tree insert delete", move |b| {
        b.iter(|| {
            let mut tree = OrderedTree::new();
            for key in &keys {
                tree.insert(*key);
            }
            for key in &keys {
                black_box(tree.delete(key));
            }
        })
    });
}

fn bench_ordered_tree_successor(c: &mut Criterion) {
    let keys = random_keys();
    let mut tree = OrderedTree::new();
    for key in &keys {
        tree.insert(*key);
    }
    c.bench_function("bench ordered_tree successor", move |b| {
        b.iter(|| {
            for key in &keys {
                black_box(tree.successor(key));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_btreemap_get,
    bench_btreemap_insert,
    bench_red_black_map_get,
    bench_red_black_map_insert,
    bench_ordered_tree_insert_delete,
    bench_ordered_tree_successor,
);
criterion_main!(benches);
