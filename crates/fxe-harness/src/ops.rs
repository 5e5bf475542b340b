//! Property-based workloads for observable collections.
//!
//! [`SeqOp`] scripts drive a [`Sequence`] over a fixed pool of items while a
//! plain `Vec` model tracks the expected contents.

use std::rc::Rc;

use fxe_observe::Sequence;
use proptest::prelude::*;
use proptest::sample::subsequence;

/// Item stored in scripted sequences; identity is the `Rc` allocation.
#[derive(Debug, PartialEq, Eq)]
pub struct Token(pub usize);

/// One scripted sequence operation. Items are indices into the pool.
#[derive(Debug, Clone)]
pub enum SeqOp {
    Insert { pos: usize, item: usize },
    PushBack(usize),
    Erase(usize),
    Remove(usize),
    Clear,
    Reconcile(Vec<usize>),
}

/// Operations over a pool of `pool` items.
pub fn seq_op(pool: usize) -> impl Strategy<Value = SeqOp> {
    let item = 0..pool;
    prop_oneof![
        4 => (0..pool + 2, item.clone()).prop_map(|(pos, item)| SeqOp::Insert { pos, item }),
        3 => item.clone().prop_map(SeqOp::PushBack),
        3 => (0..pool + 2).prop_map(SeqOp::Erase),
        2 => item.prop_map(SeqOp::Remove),
        1 => Just(SeqOp::Clear),
        2 => subsequence((0..pool).collect::<Vec<_>>(), 0..=pool)
            .prop_shuffle()
            .prop_map(SeqOp::Reconcile),
    ]
}

#[must_use]
pub fn token_pool(n: usize) -> Vec<Rc<Token>> {
    (0..n).map(|i| Rc::new(Token(i))).collect()
}

/// Apply `op` to `sequence`, resolving item indices through `pool`.
pub fn apply(sequence: &Sequence<Token>, pool: &[Rc<Token>], op: &SeqOp) {
    match op {
        SeqOp::Insert { pos, item } => {
            sequence.insert(*pos, Rc::clone(&pool[*item]));
        }
        SeqOp::PushBack(item) => {
            sequence.push_back(Rc::clone(&pool[*item]));
        }
        SeqOp::Erase(pos) => {
            sequence.erase(*pos);
        }
        SeqOp::Remove(item) => {
            sequence.remove(&pool[*item]);
        }
        SeqOp::Clear => sequence.clear(),
        SeqOp::Reconcile(items) => {
            let target: Vec<_> = items.iter().map(|i| Rc::clone(&pool[*i])).collect();
            sequence.reconcile(&target);
        }
    }
}

/// Expected contents of a scripted sequence, as pool indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeqModel(pub Vec<usize>);

impl SeqModel {
    pub fn apply(&mut self, op: &SeqOp) {
        let items = &mut self.0;
        match op {
            SeqOp::Insert { pos, item } => {
                if !items.contains(item) {
                    items.insert((*pos).min(items.len()), *item);
                }
            }
            SeqOp::PushBack(item) => {
                if !items.contains(item) {
                    items.push(*item);
                }
            }
            SeqOp::Erase(pos) => {
                if *pos < items.len() {
                    items.remove(*pos);
                }
            }
            SeqOp::Remove(item) => items.retain(|i| i != item),
            SeqOp::Clear => items.clear(),
            SeqOp::Reconcile(target) => items.clone_from(target),
        }
    }

    /// Whether `sequence` holds exactly the modelled pool items, in order.
    #[must_use]
    pub fn matches(&self, sequence: &Sequence<Token>) -> bool {
        let actual: Vec<usize> = sequence.to_vec().iter().map(|t| t.0).collect();
        actual == self.0
    }
}
