#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use fxe_observe::Sequence;
use libfuzzer_sys::fuzz_target;

const POOL: usize = 8;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert { pos: u8, item: u8 },
    Erase(u8),
    Remove(u8),
    Clear,
    Reconcile(Vec<u8>),
}

fuzz_target!(|ops: Vec<Op>| {
    let pool: Vec<Rc<usize>> = (0..POOL).map(Rc::new).collect();
    let sequence: Sequence<usize> = Sequence::new();
    let mut model: Vec<usize> = Vec::new();

    for op in ops.iter().take(256) {
        match op {
            Op::Insert { pos, item } => {
                let item = usize::from(*item) % POOL;
                let at = sequence.insert(usize::from(*pos), Rc::clone(&pool[item]));
                if let Some(existing) = model.iter().position(|i| *i == item) {
                    assert_eq!(at, existing);
                } else {
                    model.insert(usize::from(*pos).min(model.len()), item);
                }
            }
            Op::Erase(pos) => {
                let pos = usize::from(*pos);
                let erased = sequence.erase(pos).map(|i| *i);
                let expected = (pos < model.len()).then(|| model.remove(pos));
                assert_eq!(erased, expected);
            }
            Op::Remove(item) => {
                let item = usize::from(*item) % POOL;
                sequence.remove(&pool[item]);
                model.retain(|i| *i != item);
            }
            Op::Clear => {
                sequence.clear();
                model.clear();
            }
            Op::Reconcile(items) => {
                let mut target: Vec<usize> = Vec::new();
                for item in items.iter().map(|i| usize::from(*i) % POOL) {
                    if !target.contains(&item) {
                        target.push(item);
                    }
                }
                let rcs: Vec<Rc<usize>> = target.iter().map(|i| Rc::clone(&pool[*i])).collect();
                sequence.reconcile(&rcs);
                model = target;
            }
        }
        let actual: Vec<usize> = sequence.to_vec().iter().map(|i| **i).collect();
        assert_eq!(actual, model);
    }
});
