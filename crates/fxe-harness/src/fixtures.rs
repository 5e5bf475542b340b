//! Reference native scenes.

use fxe_native::{
    AvFields, BillboardFields, BlockData, BlockType, BoxEmitterFields, ColorFields, ColorKeyValue,
    ControllerManagerFields, ControllerSequenceFields, ExtraFields, FloatInterpolatorFields,
    GravityFields, Link, ModifierFields, NativeBlock, NativeRef, NativeScene, NetFields,
    NodeFields, ParticleSystemFields, PointLightFields, StringFields, TextKeyValue, Transform,
    WeakLink,
};

fn fill(block: &NativeRef, data: BlockData) {
    debug_assert_eq!(block.block_type(), data.block_type());
    *block.data_mut() = data;
}

fn net(name: &str) -> NetFields {
    NetFields {
        name: name.into(),
        ..NetFields::default()
    }
}

fn placed(x: f32) -> AvFields {
    AvFields {
        flags: 0,
        transform: Transform {
            translation: [x, 0.0, 0.0],
            ..Transform::IDENTITY
        },
    }
}

/// One block of every type, wired the way an exported effect usually is.
///
/// ```text
/// root (Node) ─┬─ extra_data: note (StringData)
///              ├─ controller: manager ── sequences: idle ── interpolators: fade
///              ├─ children: sprite (BillboardNode), sparks (ParticleSystem)
///              └─ effects: light (PointLight)
/// sparks ── modifiers: gravity, tint (ColorModifier), emitter (BoxEmitter)
/// ```
///
/// Weak links: every modifier's target is `sparks`; `gravity` pulls towards
/// `root`; `emitter` emits from `sprite`; `idle` points back at `manager`.
#[derive(Debug, Clone)]
pub struct SampleScene {
    pub scene: NativeScene,
    pub root: NativeRef,
    pub note: NativeRef,
    pub manager: NativeRef,
    pub idle: NativeRef,
    pub fade: NativeRef,
    pub sprite: NativeRef,
    pub sparks: NativeRef,
    pub light: NativeRef,
    pub gravity: NativeRef,
    pub tint: NativeRef,
    pub emitter: NativeRef,
}

impl SampleScene {
    /// Every block of the scene, in field order.
    #[must_use]
    pub fn blocks(&self) -> [&NativeRef; 11] {
        [
            &self.root,
            &self.note,
            &self.manager,
            &self.idle,
            &self.fade,
            &self.sprite,
            &self.sparks,
            &self.light,
            &self.gravity,
            &self.tint,
            &self.emitter,
        ]
    }
}

#[must_use]
pub fn sample_scene() -> SampleScene {
    let root = NativeBlock::with_default(BlockType::Node);
    let note = NativeBlock::with_default(BlockType::StringData);
    let manager = NativeBlock::with_default(BlockType::ControllerManager);
    let idle = NativeBlock::with_default(BlockType::ControllerSequence);
    let fade = NativeBlock::with_default(BlockType::FloatInterpolator);
    let sprite = NativeBlock::with_default(BlockType::BillboardNode);
    let sparks = NativeBlock::with_default(BlockType::ParticleSystem);
    let light = NativeBlock::with_default(BlockType::PointLight);
    let gravity = NativeBlock::with_default(BlockType::GravityModifier);
    let tint = NativeBlock::with_default(BlockType::ColorModifier);
    let emitter = NativeBlock::with_default(BlockType::BoxEmitter);

    fill(
        &root,
        BlockData::Node {
            net: NetFields {
                name: "Scene Root".into(),
                extra_data: vec![Link::to(&note)],
                controller: Link::to(&manager),
            },
            av: AvFields {
                flags: 0x20,
                transform: Transform::IDENTITY,
            },
            node: NodeFields {
                children: vec![Link::to(&sprite), Link::to(&sparks)],
                effects: vec![Link::to(&light)],
            },
        },
    );
    fill(
        &note,
        BlockData::StringData {
            extra: ExtraFields {
                name: "UserPropBuffer".into(),
            },
            string: StringFields {
                value: "billboard = yes".into(),
            },
        },
    );
    fill(
        &manager,
        BlockData::ControllerManager {
            manager: ControllerManagerFields {
                cumulative: true,
                sequences: vec![Link::to(&idle)],
            },
        },
    );
    fill(
        &idle,
        BlockData::ControllerSequence {
            sequence: ControllerSequenceFields {
                name: "Idle".into(),
                frequency: 1.0,
                text_keys: vec![
                    TextKeyValue {
                        time: 0.0,
                        text: "start".into(),
                    },
                    TextKeyValue {
                        time: 2.5,
                        text: "end".into(),
                    },
                ],
                interpolators: vec![Link::to(&fade)],
                manager: WeakLink::to(&manager),
            },
        },
    );
    fill(
        &fade,
        BlockData::FloatInterpolator {
            interpolator: FloatInterpolatorFields { value: 0.75 },
        },
    );
    fill(
        &sprite,
        BlockData::BillboardNode {
            net: net("Sprite"),
            av: placed(1.0),
            node: NodeFields::default(),
            billboard: BillboardFields { mode: 2 },
        },
    );
    fill(
        &sparks,
        BlockData::ParticleSystem {
            net: net("Sparks"),
            av: placed(-1.0),
            particles: ParticleSystemFields {
                max_particles: 256,
                modifiers: vec![Link::to(&gravity), Link::to(&tint), Link::to(&emitter)],
            },
        },
    );
    fill(
        &light,
        BlockData::PointLight {
            net: net("Key Light"),
            av: placed(0.0),
            light: PointLightFields {
                dimmer: 0.8,
                diffuse: [1.0, 0.9, 0.7],
            },
        },
    );

    let modifier = |name: &str, order: u32| ModifierFields {
        name: name.into(),
        order,
        active: true,
        target: WeakLink::to(&sparks),
    };
    fill(
        &gravity,
        BlockData::GravityModifier {
            modifier: modifier("Gravity", 0),
            gravity: GravityFields {
                strength: 9.8,
                axis: [0.0, 0.0, -1.0],
                gravity_object: WeakLink::to(&root),
            },
        },
    );
    fill(
        &tint,
        BlockData::ColorModifier {
            modifier: modifier("Tint", 1),
            color: ColorFields {
                keys: vec![
                    ColorKeyValue {
                        time: 0.0,
                        color: [1.0, 1.0, 1.0, 1.0],
                    },
                    ColorKeyValue {
                        time: 1.0,
                        color: [1.0, 0.3, 0.0, 0.0],
                    },
                ],
            },
        },
    );
    fill(
        &emitter,
        BlockData::BoxEmitter {
            modifier: modifier("Emitter", 2),
            emitter: BoxEmitterFields {
                speed: 4.0,
                life_span: 1.5,
                emitter_object: WeakLink::to(&sprite),
                extent: [0.5, 0.5, 0.1],
            },
        },
    );

    SampleScene {
        scene: NativeScene::from_roots(vec![root.clone()]),
        root,
        note,
        manager,
        idle,
        fade,
        sprite,
        sparks,
        light,
        gravity,
        tint,
        emitter,
    }
}

/// A manager owning two sequences, the first of which points back at it.
#[derive(Debug, Clone)]
pub struct BackReferenceScene {
    pub scene: NativeScene,
    pub root: NativeRef,
    pub child_a: NativeRef,
    pub child_b: NativeRef,
}

#[must_use]
pub fn back_reference_scene() -> BackReferenceScene {
    let root = NativeBlock::with_default(BlockType::ControllerManager);
    let child_a = NativeBlock::with_default(BlockType::ControllerSequence);
    let child_b = NativeBlock::with_default(BlockType::ControllerSequence);
    fill(
        &root,
        BlockData::ControllerManager {
            manager: ControllerManagerFields {
                cumulative: false,
                sequences: vec![Link::to(&child_a), Link::to(&child_b)],
            },
        },
    );
    fill(
        &child_a,
        BlockData::ControllerSequence {
            sequence: ControllerSequenceFields {
                name: "ChildA".into(),
                manager: WeakLink::to(&root),
                ..ControllerSequenceFields::default()
            },
        },
    );
    fill(
        &child_b,
        BlockData::ControllerSequence {
            sequence: ControllerSequenceFields {
                name: "ChildB".into(),
                ..ControllerSequenceFields::default()
            },
        },
    );
    BackReferenceScene {
        scene: NativeScene::from_roots(vec![root.clone()]),
        root,
        child_a,
        child_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_scene_reaches_every_block_once() {
        let sample = sample_scene();
        assert_eq!(sample.scene.block_count(), sample.blocks().len());
        let mut types: Vec<_> = sample.blocks().iter().map(|b| b.block_type()).collect();
        types.sort_by_key(|t| t.name());
        types.dedup();
        assert_eq!(types.len(), BlockType::ALL.len());
    }

    #[test]
    fn back_reference_is_weak() {
        let scene = back_reference_scene();
        assert_eq!(scene.scene.block_count(), 3);
        let weak = scene.child_a.data().weak_links();
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].id(), Some(scene.root.id()));
    }
}
