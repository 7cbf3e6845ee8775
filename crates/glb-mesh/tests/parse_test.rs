//! End-to-end decoding of synthetic GLB containers.

mod common;

use common::{frame, GlbBuilder, CHUNK_BIN, CHUNK_JSON};
use glb_mesh::{
    parse, parse_with_options, AccessorData, ComponentPolicy, ComponentType, DecodeError,
    DecodeOptions, GlbReader, ImageFormat, Transform,
};
use serde_json::{json, Value};

const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
const PNG_BYTES: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

/// A skinned, textured triangle (mesh 0) and an untextured copy (mesh 1).
fn character() -> (GlbBuilder, Value) {
    let mut glb = GlbBuilder::new();
    let positions = glb.push_f32(&TRIANGLE);
    let uvs = glb.push_f32(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    let joints = glb.push_bytes(&[0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0]);
    let weights = glb.push_f32(&[
        1.0, 0.0, 0.0, 0.0, //
        0.5, 0.5, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0,
    ]);
    let indices = glb.push_u16(&[0, 1, 2]);
    let ibm: Vec<f32> = (0..32).map(|i| i as f32).collect();
    let ibm = glb.push_f32(&ibm);
    let image = glb.push_bytes(&PNG_BYTES);

    let view = |(offset, len): (usize, usize)| json!({"buffer": 0, "byteOffset": offset, "byteLength": len});

    let doc = json!({
        "asset": {"version": "2.0"},
        "buffers": [{"byteLength": glb.bin().len()}],
        "bufferViews": [
            view(positions), view(uvs), view(joints), view(weights),
            view(indices), view(ibm), view(image),
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
            {"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2"},
            {"bufferView": 2, "componentType": 5121, "count": 3, "type": "VEC4"},
            {"bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4"},
            {"bufferView": 4, "componentType": 5123, "count": 3, "type": "SCALAR"},
            {"bufferView": 5, "componentType": 5126, "count": 2, "type": "MAT4"},
        ],
        "images": [{"bufferView": 6, "mimeType": "image/png"}],
        "textures": [{"source": 0}],
        "materials": [{"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}}],
        "meshes": [
            {
                "name": "body",
                "primitives": [{
                    "attributes": {"POSITION": 0, "TEXCOORD_0": 1, "JOINTS_0": 2, "WEIGHTS_0": 3},
                    "indices": 4,
                    "material": 0,
                }],
            },
            {"name": "prop", "primitives": [{"attributes": {"POSITION": 0}}]},
        ],
        "nodes": [
            {"name": "root", "mesh": 0, "skin": 0, "translation": [1.0, 2.0, 3.0]},
            {"name": "prop", "mesh": 1, "scale": [0.5, 0.5, 0.5]},
            {"name": "hip", "children": [5]},
            {"name": "unused"},
            {"name": "spare"},
            {"name": "knee", "rotation": [0.0, 0.0, 0.0, 1.0]},
        ],
        "skins": [{"inverseBindMatrices": 5, "joints": [2, 5]}],
    });
    (glb, doc)
}

fn character_bytes() -> Vec<u8> {
    let (glb, doc) = character();
    glb.build(&doc)
}

#[test]
fn test_decodes_full_character() {
    common::init_tracing();
    let meshes = parse(&character_bytes()).unwrap();
    assert_eq!(meshes.len(), 2);

    let body = &meshes[0];
    assert_eq!(body.id, 0);
    assert_eq!(body.name.as_deref(), Some("body"));
    assert_eq!(body.attributes.position.as_f32().unwrap(), &TRIANGLE);
    assert_eq!(body.attributes.texcoord_0.len(), 6);
    assert_eq!(body.attributes.joints_0.as_u8().unwrap().len(), 12);
    assert_eq!(body.attributes.weights_0.as_f32().unwrap()[4..6], [0.5, 0.5]);
    assert_eq!(body.attributes.indices, AccessorData::U16(vec![0, 1, 2]));

    let albedo = body.textures.albedo.as_ref().unwrap();
    assert_eq!(albedo.format, ImageFormat::Png);
    assert_eq!(albedo.range.length, PNG_BYTES.len());
    assert!(body.textures.normal.is_none());

    let transform = body.transform.unwrap();
    assert_eq!(transform.translation, [1.0, 2.0, 3.0]);
    assert_eq!(transform.rotation, [0.0, 0.0, 0.0, 1.0]);

    let prop = &meshes[1];
    assert_eq!(prop.attributes.position.as_f32().unwrap(), &TRIANGLE);
    assert!(prop.attributes.indices.is_empty());
    assert_eq!(prop.textures.albedo, None);
    assert_eq!(prop.skin, None);
    assert_eq!(prop.transform.unwrap().scale, [0.5, 0.5, 0.5]);
}

#[test]
fn test_missing_normal_is_empty_not_error() {
    let meshes = parse(&character_bytes()).unwrap();
    for mesh in &meshes {
        assert!(mesh.attributes.normal.is_empty());
        assert_eq!(mesh.attributes.normal.component_type(), ComponentType::Float);
        assert!(mesh.attributes.tangent.is_empty());
    }
}

#[test]
fn test_skin_bones_follow_joint_order() {
    let meshes = parse(&character_bytes()).unwrap();
    let bones = meshes[0].skin.as_ref().unwrap();

    assert_eq!(bones.len(), 2);
    assert_eq!(bones[0].joint_id, 2);
    assert_eq!(bones[0].joint_index, 0);
    assert_eq!(bones[0].name.as_deref(), Some("hip"));
    assert_eq!(bones[0].children, Some(vec![5]));
    assert_eq!(bones[1].joint_id, 5);
    assert_eq!(bones[1].joint_index, 1);
    assert_eq!(bones[1].rotation, Some([0.0, 0.0, 0.0, 1.0]));

    for (i, bone) in bones.iter().enumerate() {
        let expected: Vec<f32> = (16 * i..16 * i + 16).map(|v| v as f32).collect();
        assert_eq!(bone.inverse_bind_matrix.to_vec(), expected);
    }
}

#[test]
fn test_texture_bytes_slice_the_bin_chunk() {
    let bytes = character_bytes();
    let reader = GlbReader::from_slice(&bytes).unwrap();
    assert_eq!(reader.num_meshes(), 2);
    assert_eq!(reader.document().node_count(), 6);
    let mesh = reader.mesh(0).unwrap();

    let albedo = mesh.textures.albedo.unwrap();
    assert_eq!(albedo.bytes(reader.binary_chunk()).unwrap(), &PNG_BYTES);

    let absolute = reader.container().binary_range().start + albedo.range.offset;
    assert_eq!(&bytes[absolute..absolute + PNG_BYTES.len()], &PNG_BYTES);
}

#[test]
fn test_reader_resolves_individual_accessors() {
    let bytes = character_bytes();
    let reader = GlbReader::from_slice(&bytes).unwrap();
    let accessors = reader.accessors();

    let ibm = accessors.view(5).unwrap();
    assert_eq!(ibm.count(), 2);
    assert_eq!(ibm.element_size(), 64);
    assert_eq!(accessors.resolve(4).unwrap(), AccessorData::U16(vec![0, 1, 2]));
}

#[test]
fn test_external_buffer_is_unsupported() {
    let (glb, mut doc) = character();
    doc["buffers"][0]["uri"] = json!("character.bin");

    let err = parse(&glb.build(&doc)).unwrap_err();
    assert!(matches!(err, DecodeError::Unsupported(_)));
}

#[test]
fn test_flipped_magic_bit_is_rejected() {
    let mut bytes = character_bytes();
    for bit in 0..32 {
        let (byte, mask) = (bit / 8, 1u8 << (bit % 8));
        bytes[byte] ^= mask;
        assert!(matches!(parse(&bytes), Err(DecodeError::InvalidMagic(_))));
        bytes[byte] ^= mask;
    }
    assert!(parse(&bytes).is_ok());
}

#[test]
fn test_accessor_count_past_view_is_out_of_bounds() {
    let (glb, mut doc) = character();
    doc["accessors"][0]["count"] = json!(4);

    let err = parse(&glb.build(&doc)).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::AccessorOutOfBounds { accessor: 0, required: 48, available: 36 }
    ));
}

#[test]
fn test_dangling_index_fails_whole_parse() {
    let (glb, mut doc) = character();
    // Mesh 0 is fine; mesh 1 points past the material array.
    doc["meshes"][1]["primitives"][0]["material"] = json!(3);

    let err = parse(&glb.build(&doc)).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::IndexOutOfRange { kind: "material", index: 3, len: 1 }
    ));
}

#[test]
fn test_component_policy_is_configurable() {
    let (glb, mut doc) = character();
    // u8 joints stored as indices.
    doc["meshes"][1]["primitives"][0]["indices"] = json!(2);
    let bytes = glb.build(&doc);

    let err = parse(&bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::ComponentTypeMismatch {
            slot: "indices",
            expected: ComponentType::UnsignedShort,
            found: ComponentType::UnsignedByte,
        }
    ));

    let options = DecodeOptions::new().with_component_policy(ComponentPolicy::Coerce);
    let meshes = parse_with_options(&bytes, &options).unwrap();
    assert_eq!(meshes[1].attributes.indices.as_u8().unwrap().len(), 12);
}

#[test]
fn test_unowned_mesh_has_no_transform_or_skin() {
    let (glb, mut doc) = character();
    doc["nodes"][1]["mesh"] = Value::Null;

    let meshes = parse(&glb.build(&doc)).unwrap();
    assert_eq!(meshes[1].transform, None);
    assert_eq!(meshes[1].skin, None);
    assert_eq!(meshes[0].transform.map(|t| t.scale), Some(Transform::default().scale));
}

#[test]
fn test_malformed_json_chunk_is_reported() {
    let bytes = frame(&[(CHUNK_JSON, b"{\"meshes\": [ "), (CHUNK_BIN, &[0; 4])]);
    assert!(matches!(parse(&bytes), Err(DecodeError::Json(_))));
}

#[test]
fn test_chunks_in_wrong_order_are_reported() {
    let bytes = frame(&[(CHUNK_BIN, &[0; 4]), (CHUNK_JSON, b"{}  ")]);
    assert!(matches!(parse(&bytes), Err(DecodeError::MissingJsonChunk)));

    let bytes = frame(&[(CHUNK_JSON, b"{}  ")]);
    assert!(matches!(parse(&bytes), Err(DecodeError::MissingBinaryChunk)));
}

#[test]
fn test_records_serialize_to_plain_json() {
    let meshes = parse(&character_bytes()).unwrap();
    let value = serde_json::to_value(&meshes).unwrap();

    let body = &value[0];
    assert_eq!(body["id"], json!(0));
    assert_eq!(body["attributes"]["indices"], json!([0, 1, 2]));
    assert_eq!(body["attributes"]["normal"], json!([]));
    assert_eq!(body["textures"]["albedo"]["format"], json!("png"));
    assert_eq!(body["textures"]["normal"], Value::Null);
    assert_eq!(body["transform"]["rotation"], json!([0.0, 0.0, 0.0, 1.0]));
    assert_eq!(body["skin"][1]["joint_id"], json!(5));
    assert_eq!(value[1]["skin"], Value::Null);
}
