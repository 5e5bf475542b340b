#![forbid(unsafe_code)]

//! Integration tests: one live wrapper per native block.

use std::rc::Rc;

use fxe_graph::{AvObject, File, FileConfig, Node, Object, ParticleSystem, PointLight};
use fxe_harness::sample_scene;
use fxe_native::{BlockType, NativeBlock};

#[test]
fn get_twice_returns_the_same_wrapper() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let concrete = file
        .get::<ParticleSystem>(&sample.sparks)
        .expect("get")
        .expect("particle system");
    let viewed = file
        .get::<dyn AvObject>(&sample.sparks)
        .expect("get")
        .expect("av object");
    assert_eq!(concrete.id(), viewed.id());

    let again = file
        .get::<ParticleSystem>(&sample.sparks)
        .expect("get")
        .expect("particle system");
    assert!(Rc::ptr_eq(&concrete, &again));
}

#[test]
fn load_maps_every_owned_block() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    assert_eq!(file.len(), sample.blocks().len());
    for block in sample.blocks() {
        assert!(file.contains_native(block.id()), "{block:?} not mapped");
    }
}

#[test]
fn get_native_returns_the_backing_block() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    for block in sample.blocks() {
        let object = file.get::<dyn Object>(block).expect("get").expect("object");
        let native = file.get_native(&object).expect("native");
        assert!(Rc::ptr_eq(&native, block));
    }
}

#[test]
fn create_never_returns_an_existing_wrapper() {
    let file = File::new();
    let a = file.create::<Node>().expect("create");
    let b = file.create::<Node>().expect("create");
    assert_ne!(a.id(), b.id());
    assert!(!Rc::ptr_eq(
        &file.get_native(&a).expect("native"),
        &file.get_native(&b).expect("native")
    ));
    assert_eq!(file.len(), 2);
}

#[test]
fn keep_alive_survives_losing_every_owner() {
    let file = File::new();
    let block = NativeBlock::with_default(BlockType::PointLight);
    let light = file.get::<PointLight>(&block).expect("get").expect("light");
    light.light.dimmer.set(0.25);
    file.keep_alive(&light);
    let id = light.id();
    drop(light);

    let again = file.get::<PointLight>(&block).expect("get").expect("light");
    assert_eq!(again.id(), id);
    assert_eq!(again.light.dimmer.get(), 0.25);

    assert!(file.unpin(&again));
    drop(again);
    assert!(!file.contains_native(block.id()));
    let fresh = file.get::<PointLight>(&block).expect("get").expect("light");
    assert_ne!(fresh.id(), id);
}

#[test]
fn dropping_an_owned_subtree_unmaps_it() {
    let sample = sample_scene();
    let file = File::load(&sample.scene, FileConfig::default()).expect("load");
    let root = file.get::<Node>(&sample.root).expect("get").expect("root");

    let sparks = root.node.children.erase(1).expect("sparks");
    assert!(file.contains_native(sample.gravity.id()));
    drop(sparks);

    for gone in [&sample.sparks, &sample.gravity, &sample.tint, &sample.emitter] {
        assert!(!file.contains_native(gone.id()), "{gone:?} still mapped");
    }
    assert_eq!(file.len(), sample.blocks().len() - 4);
}

#[test]
fn mismatched_class_builds_nothing() {
    let file = File::new();
    let block = NativeBlock::with_default(BlockType::ColorModifier);
    assert!(file.get::<dyn AvObject>(&block).expect("get").is_none());
    assert!(file.is_empty());
}
