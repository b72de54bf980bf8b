use cgmath::{Matrix4, Quaternion, Vector3, Vector4};
use flow_tiles::{
    Node,
    data_structures::{
        document,
        transform::{Trs, is_gltf_identity, matrix_from_gltf, node_transform},
    },
};
use serde_json::json;

mod common;

use common::test_utils::{ModelFixture, build};

fn gltf_node(value: serde_json::Value) -> document::Node {
    serde_json::from_value(value).expect("valid node")
}

fn assert_matrix_eq(actual: Matrix4<f64>, expected: Matrix4<f64>) {
    let actual: [[f64; 4]; 4] = actual.into();
    let expected: [[f64; 4]; 4] = expected.into();
    for (a, e) in actual.iter().flatten().zip(expected.iter().flatten()) {
        assert!((a - e).abs() < 1e-12, "{:?} != {:?}", actual, expected);
    }
}

const IDENTITY: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

#[test]
fn identity_matrix_is_detected() {
    assert!(is_gltf_identity(&IDENTITY));
    let mut translated = IDENTITY;
    translated[12] = 5.0;
    assert!(!is_gltf_identity(&translated));
    assert!(!is_gltf_identity(&IDENTITY[..15]));
}

#[test]
fn identity_matrix_node_becomes_plain_group() {
    let mut fixture = ModelFixture::new();
    let node = fixture.add_node(json!({ "matrix": IDENTITY }));
    fixture.add_scene(&[node]);
    let root = build(&fixture.build());

    let children = root.get_children();
    assert_eq!(children.len(), 1);
    assert!(matches!(children[0], Node::Group { .. }));
}

#[test]
fn node_without_transform_has_none() {
    assert!(node_transform(&gltf_node(json!({}))).is_none());
    assert!(node_transform(&gltf_node(json!({ "matrix": IDENTITY }))).is_none());
}

#[test]
fn rotation_only_node_is_pure_rotation() {
    let half = std::f64::consts::FRAC_PI_4;
    let (s, c) = (half.sin(), half.cos());
    let node = gltf_node(json!({ "rotation": [0.0, 0.0, s, c] }));

    let matrix = node_transform(&node).expect("rotation is not identity");
    assert_matrix_eq(matrix, Matrix4::from(Quaternion::new(c, 0.0, 0.0, s)));

    // 90 degrees about z maps x onto y
    let rotated = matrix * Vector4::new(1.0, 0.0, 0.0, 1.0);
    assert!((rotated.x).abs() < 1e-12);
    assert!((rotated.y - 1.0).abs() < 1e-12);
}

#[test]
fn matrix_wins_over_trs() {
    let mut matrix = IDENTITY;
    matrix[12] = 2.0;
    let node = gltf_node(json!({
        "matrix": matrix,
        "translation": [10.0, 10.0, 10.0],
    }));
    assert_matrix_eq(
        node_transform(&node).expect("translated"),
        Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)),
    );
}

#[test]
fn matrix_is_column_major() {
    let mut matrix = IDENTITY;
    matrix[13] = 3.0;
    let converted = matrix_from_gltf(&matrix).expect("16 values");
    assert_eq!(converted.w.y, 3.0);
    assert!(matrix_from_gltf(&matrix[..9]).is_none());
}

#[test]
fn malformed_components_fall_back_to_identity() {
    let node = gltf_node(json!({
        "translation": [1.0, 2.0],
        "rotation": [0.0, 0.0, 1.0],
        "scale": [2.0, 2.0, 2.0, 2.0],
    }));
    assert!(Trs::from_node(&node).is_identity());
    assert!(node_transform(&node).is_none());

    // a malformed matrix is ignored in favour of TRS
    let node = gltf_node(json!({ "matrix": [1.0, 0.0], "scale": [2.0, 2.0, 2.0] }));
    assert_matrix_eq(
        node_transform(&node).expect("scaled"),
        Matrix4::from_scale(2.0),
    );
}

#[test]
fn trs_composes_translation_rotation_scale() {
    let half = std::f64::consts::FRAC_PI_4;
    let node = gltf_node(json!({
        "translation": [1.0, 0.0, 0.0],
        "rotation": [0.0, 0.0, half.sin(), half.cos()],
        "scale": [2.0, 2.0, 2.0],
    }));
    let point = node_transform(&node).expect("transformed") * Vector4::new(1.0, 0.0, 0.0, 1.0);
    // scaled to (2,0,0), rotated to (0,2,0), translated to (1,2,0)
    assert!((point.x - 1.0).abs() < 1e-12);
    assert!((point.y - 2.0).abs() < 1e-12);
    assert!(point.z.abs() < 1e-12);
}

#[test]
fn transformed_node_becomes_matrix_transform() {
    let mut fixture = ModelFixture::new();
    let child = fixture.add_node(json!({ "translation": [0.0, 5.0, 0.0] }));
    let parent = fixture.add_node(json!({ "children": [child] }));
    fixture.add_scene(&[parent]);
    let root = build(&fixture.build());

    let parent = &root.get_children()[0];
    assert!(matches!(parent, Node::Group { .. }));
    match &parent.get_children()[0] {
        Node::MatrixTransform { matrix, .. } => assert_eq!(matrix.w.y, 5.0),
        other => panic!("expected a transform, got {:?}", other),
    }
}
