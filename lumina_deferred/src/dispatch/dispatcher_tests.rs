//! Unit tests for light validation, ParameterBlock layout and the dispatcher

use super::*;
use glam::Vec3;
use crate::attachment::{AttachmentSet, NormalEncoding, Resolution};
use crate::config::PipelineConfig;
use crate::executor::PipelineExecutor;
use crate::graphics_device::{ProgramDesc, Rect2D};
use crate::graphics_device::mock_graphics_device::{CommandLog, MockCommandList, MockGraphicsDevice, MockProgram};
use crate::render_graph::build_canonical_graph;

// ============================================================================
// Helpers
// ============================================================================

fn light_program(kind: LightKind) -> Arc<dyn Program> {
    let mut desc = ProgramDesc::fullscreen(&format!("light.{}", kind.name()), kind.name(), BlendMode::Additive)
        .with_push_constants(ParameterBlock::SIZE);
    desc.normal_encoding = kind.required_encoding();
    MockProgram::new(desc)
}

fn full_table() -> LightProgramTable {
    LightProgramTable::new(LightKind::ALL.iter().map(|&k| (k, light_program(k)))).unwrap()
}

/// Executor positioned on the first light pass
fn executor_on_light_pass(config: &PipelineConfig) -> (PipelineExecutor, CommandLog) {
    let set = AttachmentSet::create(Arc::new(MockGraphicsDevice::new()), Resolution::new(8, 8), config)
        .unwrap();
    let graph = Arc::new(build_canonical_graph(&set, config).unwrap());
    let (list, log) = MockCommandList::new();
    let mut executor = PipelineExecutor::new(Box::new(list));
    for name in ["geometry.flat", "compose", "tonemap.aces"] {
        executor.register_program(MockProgram::new(
            ProgramDesc::fullscreen(name, name, BlendMode::Replace).with_push_constants(ParameterBlock::SIZE)));
    }
    executor.begin(graph, set).unwrap();
    executor.advance().unwrap();
    log.lock().unwrap().clear();
    (executor, log)
}

fn draws(log: &CommandLog) -> usize {
    log.lock().unwrap().iter().filter(|c| c.starts_with("draw")).count()
}

// ============================================================================
// Tests: LightDescriptor / ParameterBlock
// ============================================================================

#[test]
fn test_light_intensity_defaults_to_one() {
    let light = LightDescriptor::ambient(Vec3::new(0.1, 0.2, 0.3));
    let block = ParameterBlock::from_light(&light);
    assert_eq!(block.color, [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(block.direction, [0.0; 4]);
}

#[test]
fn test_parameter_block_layout() {
    let light = LightDescriptor::directional(Vec3::ONE, Vec3::new(0.0, -1.0, 0.0)).with_intensity(2.5);
    let block = ParameterBlock::from_light(&light);

    assert_eq!(ParameterBlock::SIZE, 32);
    assert_eq!(block.as_bytes().len(), 32);
    assert_eq!(block.intensity(), 2.5);
    assert_eq!(block.direction(), Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(ParameterBlock::from_bytes(block.as_bytes()), Some(block));
    assert_eq!(ParameterBlock::from_bytes(&[0u8; 16]), None);
}

#[test]
fn test_surface_block_carries_depth() {
    let block = ParameterBlock::surface(Vec3::new(0.5, 0.2, 0.8), Vec3::Z, 0.25);
    assert_eq!(block.color, [0.5, 0.2, 0.8, 1.0]);
    assert_eq!(block.direction(), Vec3::Z);
    assert_eq!(block.depth(), 0.25);
}

#[test]
fn test_directional_light_requires_direction() {
    let light = LightDescriptor { direction: None, ..LightDescriptor::directional(Vec3::ONE, Vec3::Y) };
    assert!(matches!(light.validate(), Err(Error::InvalidParameter(_))));

    let zero = LightDescriptor::directional_decoded(Vec3::ONE, Vec3::ZERO);
    assert!(matches!(zero.validate(), Err(Error::InvalidParameter(_))));
}

#[test]
fn test_light_rejects_negative_or_nan_values() {
    assert!(LightDescriptor::ambient(Vec3::new(-0.1, 0.0, 0.0)).validate().is_err());
    assert!(LightDescriptor::ambient(Vec3::ONE).with_intensity(f32::NAN).validate().is_err());
    assert!(LightDescriptor::point_colored(Vec3::ONE).with_intensity(0.0).validate().is_ok());
}

#[test]
fn test_required_encodings() {
    assert_eq!(LightKind::Directional.required_encoding(), Some(NormalEncoding::Signed));
    assert_eq!(LightKind::DirectionalDecoded.required_encoding(), Some(NormalEncoding::Unsigned));
    assert_eq!(LightKind::Ambient.required_encoding(), None);
    assert_eq!(LightKind::PointColored.required_encoding(), None);
}

// ============================================================================
// Tests: LightProgramTable
// ============================================================================

#[test]
fn test_table_rejects_non_additive_program() {
    let replace = MockProgram::new(ProgramDesc::fullscreen("bad", "ambient", BlendMode::Replace));
    let result = LightProgramTable::new([(LightKind::Ambient, replace)]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// Tests: Dispatch
// ============================================================================

#[test]
fn test_dispatch_preserves_order_and_binds_on_change() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::default());
    let dispatcher = DrawBatchDispatcher::new(full_table());
    let lights = [
        LightDescriptor::ambient(Vec3::splat(0.1)),
        LightDescriptor::directional_decoded(Vec3::ONE, Vec3::NEG_Y),
        LightDescriptor::directional_decoded(Vec3::X, Vec3::NEG_X),
        LightDescriptor::ambient(Vec3::splat(0.2)),
    ];

    let stats = dispatcher.dispatch(&mut executor, &lights).unwrap();

    assert_eq!(stats, DispatchStats { draws: 4, program_binds: 3 });
    let binds: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with("bind_program"))
        .cloned()
        .collect();
    assert_eq!(
        binds,
        vec![
            "bind_program:light.ambient",
            "bind_program:light.directional_decoded",
            "bind_program:light.ambient",
        ]
    );
}

#[test]
fn test_dispatch_encoding_mismatch_submits_nothing() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::default());
    let dispatcher = DrawBatchDispatcher::new(full_table());
    let lights = [
        LightDescriptor::ambient(Vec3::ONE),
        LightDescriptor::directional(Vec3::ONE, Vec3::NEG_Y),
    ];

    let result = dispatcher.dispatch(&mut executor, &lights);

    assert!(matches!(
        result,
        Err(Error::EncodingMismatch { expected: NormalEncoding::Signed, actual: NormalEncoding::Unsigned, .. })
    ));
    assert_eq!(draws(&log), 0);
}

#[test]
fn test_dispatch_program_encoding_checked_before_any_draw() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::default());
    let signed_ambient = MockProgram::new(
        ProgramDesc::fullscreen("light.ambient", "ambient", BlendMode::Additive)
            .with_push_constants(ParameterBlock::SIZE)
            .with_normal_encoding(NormalEncoding::Signed),
    );
    let table = LightProgramTable::new([
        (LightKind::DirectionalDecoded, light_program(LightKind::DirectionalDecoded)),
        (LightKind::Ambient, signed_ambient),
    ])
    .unwrap();
    let dispatcher = DrawBatchDispatcher::new(table);
    let lights = [
        LightDescriptor::directional_decoded(Vec3::ONE, Vec3::NEG_Y),
        LightDescriptor::ambient(Vec3::ONE),
    ];

    let result = dispatcher.dispatch(&mut executor, &lights);

    assert!(matches!(
        result,
        Err(Error::EncodingMismatch { expected: NormalEncoding::Signed, actual: NormalEncoding::Unsigned, .. })
    ));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_dispatch_push_range_checked_before_any_draw() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::default());
    let narrow_point = MockProgram::new(
        ProgramDesc::fullscreen("light.point_colored", "point_colored", BlendMode::Additive)
            .with_push_constants(16),
    );
    let table = LightProgramTable::new([
        (LightKind::Ambient, light_program(LightKind::Ambient)),
        (LightKind::PointColored, narrow_point),
    ])
    .unwrap();
    let dispatcher = DrawBatchDispatcher::new(table);
    let lights = [LightDescriptor::ambient(Vec3::ONE), LightDescriptor::point_colored(Vec3::ONE)];

    let result = dispatcher.dispatch(&mut executor, &lights);

    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_dispatch_decoded_light_on_signed_set_fails() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::signed_normals());
    let dispatcher = DrawBatchDispatcher::new(full_table());
    let lights = [LightDescriptor::directional_decoded(Vec3::ONE, Vec3::NEG_Y)];

    assert!(matches!(dispatcher.dispatch(&mut executor, &lights), Err(Error::EncodingMismatch { .. })));
    assert_eq!(draws(&log), 0);

    let lights = [LightDescriptor::directional(Vec3::ONE, Vec3::NEG_Y)];
    assert!(dispatcher.dispatch(&mut executor, &lights).is_ok());
    assert_eq!(draws(&log), 1);
}

#[test]
fn test_dispatch_missing_program_fails() {
    let (mut executor, _) = executor_on_light_pass(&PipelineConfig::default());
    let table = LightProgramTable::new([(LightKind::Ambient, light_program(LightKind::Ambient))]).unwrap();
    let dispatcher = DrawBatchDispatcher::new(table);

    let result = dispatcher.dispatch(&mut executor, &[LightDescriptor::point_colored(Vec3::ONE)]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_dispatch_outside_lighting_pass_fails() {
    let (mut executor, _) = executor_on_light_pass(&PipelineConfig::default());
    executor.advance().unwrap(); // compose
    let dispatcher = DrawBatchDispatcher::new(full_table());

    let result = dispatcher.dispatch(&mut executor, &[LightDescriptor::ambient(Vec3::ONE)]);
    assert!(matches!(result, Err(Error::InvalidState(_))));
}

#[test]
fn test_dispatch_point_light_scopes_scissor() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::default());
    let dispatcher = DrawBatchDispatcher::new(full_table());
    let lights = [
        LightDescriptor::point_colored(Vec3::ONE).with_bounds(Rect2D { x: 2, y: 2, width: 10, height: 3 }),
        LightDescriptor::point_colored(Vec3::ONE).with_bounds(Rect2D { x: 20, y: 0, width: 2, height: 2 }),
    ];

    let stats = dispatcher.dispatch(&mut executor, &lights).unwrap();

    assert_eq!(stats.draws, 1);
    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            "bind_program:light.point_colored",
            "set_scissor:2,2,6,3",
            "push_constants:32",
            "draw:3",
            "set_scissor:0,0,8,8",
        ]
    );
}

#[test]
fn test_dispatch_empty_light_list() {
    let (mut executor, log) = executor_on_light_pass(&PipelineConfig::default());
    let dispatcher = DrawBatchDispatcher::new(full_table());
    assert_eq!(dispatcher.dispatch(&mut executor, &[]).unwrap(), DispatchStats::default());
    assert!(log.lock().unwrap().is_empty());
}
