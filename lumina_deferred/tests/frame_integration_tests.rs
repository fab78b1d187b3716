//! Integration tests for attachment lifetime across frames
//!
//! Covers resize invalidation of compiled graphs and the frames-in-flight
//! ring on the CPU backend.
//!
//! Run with: cargo test --test frame_integration_tests


use std::sync::Arc;
use cpu_test_utils::{float_config, read, surface, Pipeline};
use lumina_deferred::glam::Vec3;
use lumina_deferred::lumina::attachment::{AttachmentId, FrameRing, Resolution};
use lumina_deferred::lumina::render::{ExecutorState, LightDescriptor};
use lumina_deferred::lumina::Error;

// ============================================================================
// RESIZE
// ============================================================================

#[test]
fn test_resize_invalidates_graph() {
    let mut pipeline = Pipeline::new(float_config());
    let mut attachments = pipeline.attachments(2, 2);
    let graph = pipeline.graph(&attachments);
    let old_layout = attachments.layout_id();

    attachments.resize(Resolution::new(3, 5)).unwrap();
    assert_ne!(attachments.layout_id(), old_layout);
    assert!(!graph.is_compatible(&attachments));

    let ambient = [LightDescriptor::ambient(Vec3::ONE)];
    let result = pipeline.render(graph, attachments, surface(Vec3::ONE, Vec3::Z), &[&ambient]);
    assert!(matches!(result, Err(Error::StaleGraph { .. })));
    assert_eq!(pipeline.executor.state(), ExecutorState::Idle);

    // The set survives the failed begin and renders with a rebuilt graph
    let attachments = pipeline.executor.take_attachments().unwrap();
    let graph = pipeline.graph(&attachments);
    let attachments = pipeline
        .render(graph, attachments, surface(Vec3::splat(0.5), Vec3::Z), &[&ambient])
        .unwrap();

    assert_eq!(attachments.resolution(), Resolution::new(3, 5));
    let composite = attachments.get(AttachmentId::COMPOSITE).unwrap().texture().info().clone();
    assert_eq!((composite.width, composite.height), (3, 5));
    assert!(read(&attachments, AttachmentId::COMPOSITE, 2, 4).truncate().abs_diff_eq(Vec3::splat(0.5), 1e-5));
}

#[test]
fn test_failed_resize_keeps_set_usable() {
    let mut pipeline = Pipeline::new(float_config());
    let mut attachments = pipeline.attachments(2, 2);
    let graph = pipeline.graph(&attachments);

    assert!(matches!(
        attachments.resize(Resolution::new(0, 4)),
        Err(Error::InvalidResolution { width: 0, height: 4 })
    ));
    assert!(graph.is_compatible(&attachments));

    let ambient = [LightDescriptor::ambient(Vec3::ONE)];
    assert!(pipeline.render(graph, attachments, surface(Vec3::ONE, Vec3::Z), &[&ambient]).is_ok());
}

// ============================================================================
// FRAME RING
// ============================================================================

#[test]
fn test_frame_ring_alternates_sets() {
    let mut pipeline = Pipeline::new(float_config());
    let mut ring = FrameRing::new(pipeline.device.clone(), Resolution::new(2, 2), &pipeline.config).unwrap();
    assert_eq!(ring.len(), 2);

    let first = ring.acquire().unwrap();
    let graph = pipeline.graph(&first);
    let first_texture = first.get(AttachmentId::LIGHT).unwrap().texture().clone();

    // Siblings share a layout, so one graph serves every slot
    let ambient = [LightDescriptor::ambient(Vec3::splat(0.25))];
    let first = pipeline
        .render(graph.clone(), first, surface(Vec3::ONE, Vec3::Z), &[&ambient])
        .unwrap();
    ring.release(first).unwrap();
    ring.advance();

    let second = ring.acquire().unwrap();
    let second_texture = second.get(AttachmentId::LIGHT).unwrap().texture().clone();
    assert!(!Arc::ptr_eq(&first_texture, &second_texture));
    assert_eq!(second.frame_index(), 1);

    let second = pipeline
        .render(graph, second, surface(Vec3::ONE, Vec3::Z), &[&ambient])
        .unwrap();
    assert!(read(&second, AttachmentId::LIGHT, 0, 0).truncate().abs_diff_eq(Vec3::splat(0.25), 1e-6));
    ring.release(second).unwrap();
}

#[test]
fn test_frame_ring_rejects_double_acquire() {
    let pipeline = Pipeline::new(float_config());
    let mut ring = FrameRing::new(pipeline.device.clone(), Resolution::new(2, 2), &pipeline.config).unwrap();

    let set = ring.acquire().unwrap();
    assert!(matches!(ring.acquire(), Err(Error::InvalidState(_))));
    assert!(matches!(ring.resize(Resolution::new(4, 4)), Err(Error::InvalidState(_))));

    ring.release(set).unwrap();
    ring.resize(Resolution::new(4, 4)).unwrap();
    assert_eq!(ring.acquire().unwrap().resolution(), Resolution::new(4, 4));
}

#[test]
fn test_frame_ring_resize_needs_new_graph() {
    let mut pipeline = Pipeline::new(float_config());
    let mut ring = FrameRing::new(pipeline.device.clone(), Resolution::new(2, 2), &pipeline.config).unwrap();

    let set = ring.acquire().unwrap();
    let graph = pipeline.graph(&set);
    ring.release(set).unwrap();
    ring.resize(Resolution::new(3, 3)).unwrap();

    let set = ring.acquire().unwrap();
    assert!(!graph.is_compatible(&set));
    let graph = pipeline.graph(&set);
    let ambient = [LightDescriptor::ambient(Vec3::ONE)];
    let set = pipeline.render(graph, set, surface(Vec3::ONE, Vec3::Z), &[&ambient]).unwrap();
    ring.release(set).unwrap();
}

#[test]
fn test_foreign_set_release_rejected() {
    let pipeline = Pipeline::new(float_config());
    let mut ring = FrameRing::new(pipeline.device.clone(), Resolution::new(2, 2), &pipeline.config).unwrap();
    let _held = ring.acquire().unwrap();

    let stranger = pipeline.attachments(2, 2);
    assert!(matches!(ring.release(stranger), Err(Error::InvalidResource(_))));
}
