use flow_tiles::{
    data_structures::vertex::Indices,
    resources::accessor::{self, AccessorView, ComponentType, ElementType, MAX_ZERO_FILLED_COUNT},
};
use serde_json::json;

mod common;

use common::test_utils::ModelFixture;

#[test]
fn float_positions_are_read_as_is() {
    let mut fixture = ModelFixture::new();
    let positions = fixture.triangle();
    let model = fixture.build();

    let read = accessor::positions(&model, positions, None).expect("valid positions");
    assert_eq!(read, common::test_utils::TRIANGLE.to_vec());
}

#[test]
fn unsigned_colors_are_normalized() {
    let mut fixture = ModelFixture::new();
    let rgb = fixture.accessor_raw(&[255, 0, 51, 0, 255, 0], 5121, "VEC3", 2, true);
    let rgba16: Vec<u8> = [65535u16, 0, 0, 32768]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let rgba = fixture.accessor_raw(&rgba16, 5123, "VEC4", 1, true);
    let model = fixture.build();

    let colors = accessor::colors(&model, rgb, None).expect("u8 colors");
    assert_eq!(colors[0], [1.0, 0.0, 0.2, 1.0]);
    assert_eq!(colors[1], [0.0, 1.0, 0.0, 1.0]);

    let colors = accessor::colors(&model, rgba, None).expect("u16 colors");
    assert_eq!(colors[0][0], 1.0);
    assert!((colors[0][3] - 32768.0 / 65535.0).abs() < 1e-6);
}

#[test]
fn signed_normalized_values_clamp_at_minus_one() {
    let mut fixture = ModelFixture::new();
    let bytes: Vec<u8> = [-128i8, 127, 0].iter().map(|&v| v as u8).collect();
    let normals = fixture.accessor_raw(&bytes, 5120, "VEC3", 1, true);
    let model = fixture.build();

    let read = accessor::normals(&model, normals, None).expect("normalized bytes");
    assert_eq!(read[0], [-1.0, 1.0, 0.0]);
}

#[test]
fn integer_normals_need_the_normalized_flag() {
    let mut fixture = ModelFixture::new();
    let normals = fixture.accessor_raw(&[0, 1, 0], 5120, "VEC3", 1, false);
    let model = fixture.build();
    assert!(accessor::normals(&model, normals, None).is_none());
}

#[test]
fn mismatched_types_are_rejected() {
    let mut fixture = ModelFixture::new();
    let vec2 = fixture.accessor_f32(&[[0.0, 1.0]]);
    let scalar_float = fixture.accessor_f32(&[[1.0]]);
    let signed_uv = fixture.accessor_raw(&[1, 2], 5120, "VEC2", 1, true);
    let model = fixture.build();

    assert!(accessor::positions(&model, vec2, None).is_none());
    assert!(accessor::colors(&model, vec2, None).is_none());
    assert!(accessor::draw_indices(&model, scalar_float).is_none());
    assert!(accessor::tex_coords(&model, signed_uv, None).is_none());
    assert!(accessor::tex_coords(&model, vec2, None).is_some());
    assert!(accessor::positions(&model, 99, None).is_none());
}

#[test]
fn out_of_bounds_accessor_is_invalid() {
    let mut fixture = ModelFixture::new();
    let positions = fixture.triangle();
    fixture.json["accessors"][positions]["count"] = json!(4);
    let model = fixture.build();

    assert!(AccessorView::new(&model, positions).is_none());
    assert!(accessor::positions(&model, positions, None).is_none());
}

#[test]
fn accessor_without_view_reads_zeroes() {
    let mut fixture = ModelFixture::new();
    let accessor = fixture.push(
        "accessors",
        json!({ "componentType": 5126, "type": "VEC3", "count": 2 }),
    );
    let model = fixture.build();

    let read = accessor::positions(&model, accessor, None).expect("zero filled");
    assert_eq!(read, vec![[0.0; 3]; 2]);
}

#[test]
fn huge_accessor_without_view_is_invalid() {
    let mut fixture = ModelFixture::new();
    let huge = fixture.push(
        "accessors",
        json!({ "componentType": 5126, "type": "VEC3", "count": 1_000_000_000_000u64 }),
    );
    let limit = fixture.push(
        "accessors",
        json!({ "componentType": 5126, "type": "SCALAR", "count": MAX_ZERO_FILLED_COUNT }),
    );
    let model = fixture.build();

    assert!(AccessorView::new(&model, huge).is_none());
    assert!(accessor::positions(&model, huge, None).is_none());
    assert_eq!(AccessorView::new(&model, limit).map(|view| view.count), Some(MAX_ZERO_FILLED_COUNT));
}

#[test]
fn strided_views_are_respected() {
    let mut fixture = ModelFixture::new();
    // two interleaved vec2 elements with 4 bytes of padding each
    let bytes: Vec<u8> = [1.0f32, 2.0, -1.0, 3.0, 4.0, -1.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let view = fixture.add_view(&bytes, Some(12));
    let accessor = fixture.push(
        "accessors",
        json!({ "bufferView": view, "componentType": 5126, "type": "VEC2", "count": 2 }),
    );
    let model = fixture.build();

    let read = accessor::tex_coords(&model, accessor, None).expect("strided");
    assert_eq!(read, vec![[1.0, 2.0], [3.0, 4.0]]);
}

#[test]
fn draw_indices_keep_their_width() {
    let mut fixture = ModelFixture::new();
    let bytes = fixture.indices_u8(&[0, 1, 2]);
    let shorts = fixture.indices_u16(&[2, 1, 0]);
    let ints = fixture.indices_u32(&[70000, 0, 1]);
    let model = fixture.build();

    let bytes = accessor::draw_indices(&model, bytes).expect("u8");
    assert_eq!(bytes, Indices::U8(vec![0, 1, 2]));
    assert_eq!(bytes.index_format(), None);
    assert_eq!(
        bytes.widened().index_format(),
        Some(wgpu::IndexFormat::Uint16)
    );
    assert_eq!(
        accessor::draw_indices(&model, shorts),
        Some(Indices::U16(vec![2, 1, 0]))
    );
    assert_eq!(
        accessor::draw_indices(&model, ints),
        Some(Indices::U32(vec![70000, 0, 1]))
    );
}

#[test]
fn expansion_gathers_per_index() {
    let mut fixture = ModelFixture::new();
    let positions = fixture.triangle();
    let model = fixture.build();
    let indices = Indices::U16(vec![0, 2, 2, 1]);

    let read = accessor::positions(&model, positions, Some(&indices)).expect("expanded");
    assert_eq!(read.len(), 4);
    assert_eq!(read[1], read[2]);
    assert_eq!(read[3], [1.0, 0.0, 0.0]);

    let out_of_range = Indices::U8(vec![0, 3]);
    assert!(accessor::positions(&model, positions, Some(&out_of_range)).is_none());
}

#[test]
fn type_tags_parse() {
    assert_eq!(ComponentType::from_gl(5123), Some(ComponentType::U16));
    assert_eq!(ComponentType::from_gl(5124), None);
    assert_eq!(ComponentType::F32.size(), 4);
    assert_eq!(ElementType::from_name("MAT4").map(ElementType::components), Some(16));
    assert_eq!(ElementType::from_name("VEC5"), None);
}
