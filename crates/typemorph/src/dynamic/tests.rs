// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptors and values working together.

use super::*;
use std::sync::Arc;

#[test]
fn test_record_survives_shape_check() {
    let account = Arc::new(
        TypeDescriptorBuilder::new("Account")
            .field("id", PrimitiveKind::U64)
            .field("balance", PrimitiveKind::F64)
            .field("active", PrimitiveKind::Bool)
            .string_field("owner")
            .build(),
    );

    let mut data = DynamicData::new(&account);
    data.set("id", 77u64).expect("set id");
    data.set("balance", -12.25f64).expect("set balance");
    data.set("active", true).expect("set active");
    data.set("owner", "ops").expect("set owner");

    assert_eq!(data.get::<u64>("id").unwrap(), 77);
    assert_eq!(data.get::<f64>("balance").unwrap(), -12.25);
    assert!(data.get::<bool>("active").unwrap());
    assert_eq!(data.get::<String>("owner").unwrap(), "ops");

    let rebuilt = DynamicData::from_value(&account, data.value().clone()).expect("conforms");
    assert_eq!(rebuilt, data);
}

#[test]
fn test_nested_record_zero_values() {
    let vector3_type = Arc::new(
        TypeDescriptorBuilder::new("Vector3")
            .field("x", PrimitiveKind::F64)
            .field("y", PrimitiveKind::F64)
            .field("z", PrimitiveKind::F64)
            .build(),
    );

    let pose_type = Arc::new(
        TypeDescriptorBuilder::new("Pose")
            .field_with_type("position", vector3_type.clone())
            .field_with_type("waypoints", sequence_of(vector3_type.clone()))
            .optional_field("label", TypeDescriptor::builtin(PrimitiveKind::String))
            .build(),
    );

    let mut pose = DynamicData::new(&pose_type);
    assert_eq!(
        pose.get_field("position").unwrap(),
        &DynamicValue::Struct(vec![0.0f64.into(), 0.0f64.into(), 0.0f64.into()])
    );
    assert!(pose.get_field("label").unwrap().is_null());

    let waypoint = DynamicValue::Struct(vec![1.0f64.into(), 2.0f64.into(), 3.0f64.into()]);
    if let DynamicValue::Sequence(items) = pose.get_field_mut("waypoints").unwrap() {
        items.push(waypoint.clone());
    }
    assert!(pose.value().conforms_to(&pose_type));
    assert_eq!(
        pose.get_field("waypoints").unwrap().as_slice(),
        Some(&[waypoint][..])
    );
}

#[test]
fn test_any_slot_holds_typed_value() {
    let slot_type = TypeDescriptor::any();
    let occupant = DynamicData::from_native(7i16);
    let data = DynamicData::from_value(
        &slot_type,
        DynamicValue::Any(Some(Box::new(occupant.clone()))),
    )
    .expect("any accepts any occupant");

    match data.value() {
        DynamicValue::Any(Some(inner)) => {
            assert_eq!(inner.descriptor().name(), "i16");
            assert_eq!(**inner, occupant);
        }
        other => panic!("unexpected value {:?}", other),
    }
}
