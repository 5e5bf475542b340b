#![no_main]

use arbitrary::Arbitrary;
use fxe_graph::{File, FileConfig};
use fxe_native::{BlockData, BlockType, Link, NativeBlock, NativeRef, NativeScene, WeakLink};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Graph {
    types: Vec<u8>,
    /// (from, to, weak)
    edges: Vec<(u8, u8, bool)>,
    pin_weak_targets: bool,
}

fn wire(from: &NativeRef, to: &NativeRef, weak: bool) {
    let mut data = from.data_mut();
    if weak {
        if let Some(modifier) = data.modifier_mut() {
            modifier.target = WeakLink::to(to);
        } else if let Some(sequence) = data.sequence_mut() {
            sequence.manager = WeakLink::to(to);
        }
        return;
    }
    if let Some(node) = data.node_mut() {
        node.children.push(Link::to(to));
    } else if let Some(particles) = data.particles_mut() {
        particles.modifiers.push(Link::to(to));
    } else if let Some(manager) = data.manager_mut() {
        manager.sequences.push(Link::to(to));
    }
}

fuzz_target!(|graph: Graph| {
    let blocks: Vec<NativeRef> = graph
        .types
        .iter()
        .take(32)
        .map(|t| NativeBlock::with_default(BlockType::ALL[usize::from(*t) % BlockType::ALL.len()]))
        .collect();
    if blocks.is_empty() {
        return;
    }
    // Owning edges only point forward, so the owned graph stays acyclic.
    for (from, to, weak) in graph.edges.iter().take(128) {
        let (from, to) = (usize::from(*from) % blocks.len(), usize::from(*to) % blocks.len());
        if *weak || from < to {
            wire(&blocks[from], &blocks[to], *weak);
        }
    }

    let scene = NativeScene::from_roots(vec![blocks[0].clone()]);
    let config = FileConfig::default().with_pin_weak_targets(graph.pin_weak_targets);
    let Ok(file) = File::load(&scene, config.clone()) else {
        return;
    };
    let Ok(saved) = file.save() else {
        return;
    };
    let first: Vec<BlockData> = saved.blocks().iter().map(|b| b.snapshot()).collect();

    // The first file stays open: weak-only targets stay anchored in it.
    let Ok(reloaded) = File::load(&saved, config) else {
        return;
    };
    let Ok(again) = reloaded.save() else {
        return;
    };
    let second: Vec<BlockData> = again.blocks().iter().map(|b| b.snapshot()).collect();
    assert_eq!(first, second);
});
