#![forbid(unsafe_code)]

//! Integration tests: read and write synchronization.

use std::rc::Rc;

use fxe_graph::{
    AvFlags, AvObject, BillboardMode, BillboardNode, ColorKey, ColorModifier, File, FileConfig,
    Node, Object, ParticleSystem,
};
use fxe_harness::{Event, Recorder, sample_scene};
use fxe_native::{BlockData, Link};
use fxe_observe::{PropertyListener, SequenceListener};

#[test]
fn load_then_save_reproduces_native_data() {
    let sample = sample_scene();
    let before: Vec<BlockData> = sample.blocks().iter().map(|b| b.snapshot()).collect();

    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let saved = file.save().expect("save");

    assert_eq!(saved.block_count(), before.len());
    let after: Vec<BlockData> = sample.blocks().iter().map(|b| b.snapshot()).collect();
    assert_eq!(before, after);
}

#[test]
fn wrapper_edits_reach_native_blocks_on_save() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");

    let sparks = file
        .get::<ParticleSystem>(&sample.sparks)
        .expect("get")
        .expect("sparks");
    sparks.particles.max_particles.set(512);
    sparks.av.flags.raise(AvFlags::HIDDEN);

    let tint = file
        .get::<ColorModifier>(&sample.tint)
        .expect("get")
        .expect("tint");
    tint.color.keys.push_back(ColorKey::default());
    if let Some(key) = tint.color.keys.at(2) {
        key.time.set(2.0);
    }

    file.save().expect("save");
    let data = sample.sparks.snapshot();
    assert_eq!(data.particles().map(|p| p.max_particles), Some(512));
    assert_eq!(data.av().map(|a| a.flags), Some(0x1));
    let keys = sample.tint.snapshot().color().map(|c| c.keys.clone()).unwrap_or_default();
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[2].time, 2.0);
}

#[test]
fn read_sync_updates_wrappers_in_place() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let sprite = file
        .get::<BillboardNode>(&sample.sprite)
        .expect("get")
        .expect("sprite");
    let recorder = Recorder::new();
    sprite
        .net
        .name
        .add_listener(Rc::clone(&recorder) as Rc<dyn PropertyListener<String>>);

    if let BlockData::BillboardNode { net, .. } = &mut *sample.sprite.data_mut() {
        net.name = "Halo".into();
    }
    let root = file.roots().remove(0);
    file.read_sync(&root).expect("read sync");

    assert_eq!(sprite.net.name.get(), "Halo");
    assert_eq!(recorder.take(), vec![Event::Set("\"Halo\"".into())]);
    let again = file
        .get::<BillboardNode>(&sample.sprite)
        .expect("get")
        .expect("sprite");
    assert!(Rc::ptr_eq(&sprite, &again));
}

#[test]
fn base_levels_sync_before_derived_ones() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let sprite = file
        .get::<BillboardNode>(&sample.sprite)
        .expect("get")
        .expect("sprite");
    let recorder = Recorder::new();
    sprite
        .billboard
        .mode
        .add_listener(Rc::clone(&recorder) as Rc<dyn PropertyListener<BillboardMode>>);
    sprite
        .net
        .name
        .add_listener(Rc::clone(&recorder) as Rc<dyn PropertyListener<String>>);

    if let BlockData::BillboardNode { net, billboard, .. } = &mut *sample.sprite.data_mut() {
        net.name = "Halo".into();
        billboard.mode = 1;
    }
    file.read_sync(&Rc::clone(&sprite).to_any()).expect("read sync");

    assert_eq!(
        recorder.events(),
        vec![
            Event::Set("\"Halo\"".into()),
            Event::Set("RotateAboutUp".into())
        ]
    );
}

#[test]
fn reordered_children_reconcile_with_minimal_events() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let root = file.get::<Node>(&sample.root).expect("get").expect("root");
    let sparks_id = root.node.children.at(1).map(|c| c.id()).expect("sparks");
    let recorder = Recorder::new();
    root.node
        .children
        .add_listener(Rc::clone(&recorder) as Rc<dyn SequenceListener<dyn AvObject>>);

    if let Some(node) = sample.root.data_mut().node_mut() {
        node.children = vec![Link::to(&sample.sparks), Link::to(&sample.sprite)];
    }
    file.read_sync(&Rc::clone(&root).to_any()).expect("read sync");

    assert_eq!(recorder.events(), vec![Event::Erase(1), Event::Insert(0)]);
    assert_eq!(root.node.children.at(0).map(|c| c.id()), Some(sparks_id));
}

#[test]
fn back_references_resolve_to_loaded_wrappers() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let sparks = file
        .get::<ParticleSystem>(&sample.sparks)
        .expect("get")
        .expect("sparks");
    for modifier in sparks.particles.modifiers.to_vec() {
        let target = modifier.modifier().target.assigned().expect("target");
        assert!(Rc::ptr_eq(&target, &sparks));
    }
    assert_eq!(file.pin_count(&sparks), 0);
}
