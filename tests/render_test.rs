#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
async fn device() -> Option<wgpu::Device> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..wgpu::InstanceDescriptor::new_without_display_handle()
    });
    let Ok(adapter) = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
    else {
        log::warn!("no GPU adapter available, skipping");
        return None;
    };
    let (device, _queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("render test device"),
            required_features: wgpu::Features::empty(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .ok()?;
    Some(device)
}

#[test]
#[cfg(feature = "integration-tests")]
fn uploads_built_draw_commands() {
    use flow_tiles::{data_structures::scene_graph::Draw, render::GpuDraw};
    use serde_json::json;

    use crate::common::test_utils::{ModelFixture, build, init_logger, positions_primitive};

    init_logger();
    let Some(device) = futures::executor::block_on(device()) else {
        return;
    };

    let mut fixture = ModelFixture::new();
    let positions = fixture.triangle();
    let normals = fixture.accessor_f32(&[[0.0, 0.0, 1.0]; 3]);
    let indices = fixture.indices_u8(&[0, 1, 2]);
    fixture.add_mesh(vec![
        json!({
            "attributes": { "POSITION": positions, "NORMAL": normals },
            "indices": indices,
        }),
        positions_primitive(positions),
    ]);
    let root = build(&fixture.build());
    let draws = root.draw_commands();
    assert_eq!(draws.len(), 2);

    let indexed = GpuDraw::new(&device, draws[0]);
    assert_eq!(indexed.vertex_buffers.len(), draws[0].arrays.len());
    let (position_location, position_buffer) = &indexed.vertex_buffers[0];
    assert_eq!(*position_location, 0);
    assert_eq!(position_buffer.size(), 36);
    let (index_buffer, format, count) = indexed.index_buffer.as_ref().expect("indexed draw");
    // 8-bit indices are widened on upload
    assert_eq!(*format, wgpu::IndexFormat::Uint16);
    assert_eq!(*count, 3);
    assert!(index_buffer.size() >= 6);

    assert!(matches!(draws[1].draw, Draw::Vertices { vertex_count: 3 }));
    let plain = GpuDraw::new(&device, draws[1]);
    assert!(plain.index_buffer.is_none());
    assert_eq!(plain.vertex_count, 3);
    assert_eq!(plain.instance_count, 1);
}
