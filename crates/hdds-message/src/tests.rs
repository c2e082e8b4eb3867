// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Workflow tests across schema, storage and instances.

use super::*;
use std::sync::Arc;

fn point_pool() -> (SchemaPool, Arc<MessageSchema>) {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_message("Point")?
            .optional("x", FieldType::Int32, 1)?
            .optional("y", FieldType::Int32, 2)?;
        Ok(())
    })
    .expect("build Point");
    let point = pool.lookup_message("Point").expect("Point");
    (pool, point)
}

#[test]
fn test_point_workflow() {
    // 1. Layout
    let (_pool, point) = point_pool();
    assert_eq!(point.layout().size(), 8);
    assert_eq!(point.field("x").map(FieldSchema::offset), Some(0));
    assert_eq!(point.field("y").map(FieldSchema::offset), Some(4));

    // 2. Field access
    let mut p = Message::new(&point);
    p.set("x", 3).expect("set x");
    p.set("y", 4).expect("set y");
    assert_eq!(p.get("x").expect("get x"), Value::Int32(3));

    // 3. Duplicate is independent for scalars
    let mut copy = p.duplicate();
    assert!(copy.equals(&p));
    copy.set("y", 9).expect("set y on copy");
    assert_eq!(p.get_as::<i32>("y").expect("y"), 4);
    assert_eq!(copy.get_as::<i32>("y").expect("y"), 9);
    assert!(!copy.equals(&p));
}

#[test]
fn test_field_descriptor_access() {
    let (_pool, point) = point_pool();
    let mut p = point.new_message();
    let x = point.field_by_number(1).expect("field 1");
    x.set(&mut p, 11).expect("set through descriptor");
    assert_eq!(x.get(&p).expect("get"), Value::Int32(11));

    // A descriptor from another schema is rejected.
    let (_other_pool, other_point) = point_pool();
    let foreign = other_point.field("x").expect("x");
    assert!(matches!(
        foreign.get(&p),
        Err(Error::UnknownField { .. })
    ));
}

#[test]
fn test_shallow_vs_deep_copy_of_nested() {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_message("Inner")?.optional("v", FieldType::Int32, 1)?;
        b.add_message("Outer")?
            .optional_ref("inner", FieldType::Message, 1, "Inner")?
            .repeated("vals", FieldType::Int32, 2)?;
        Ok(())
    })
    .expect("build");
    let outer = pool.lookup_message("Outer").expect("Outer");
    let inner = pool.lookup_message("Inner").expect("Inner");

    let mut m = Message::new(&outer);
    m.set("inner", Message::with_values(&inner, [("v", 1)]).expect("inner"))
        .expect("set inner");
    m.set("vals", Value::list([1i32, 2])).expect("vals");

    // Deep copy: nested mutation stays local.
    let deep = m.deep_copy();
    let deep_inner: MessageRef = deep.get_as("inner").expect("inner");
    deep_inner.write().set("v", 100).expect("v");
    deep.repeated("vals").expect("vals").write().push(3).expect("push");
    let orig_inner: MessageRef = m.get_as("inner").expect("inner");
    assert_eq!(orig_inner.read().get_as::<i32>("v").expect("v"), 1);
    assert_eq!(m.repeated("vals").expect("vals").read().len(), 2);

    // Duplicate: nested message is shared.
    let dup = m.duplicate();
    let dup_inner: MessageRef = dup.get_as("inner").expect("inner");
    assert!(MessageRef::ptr_eq(&dup_inner, &orig_inner));
    dup_inner.write().set("v", 50).expect("v");
    assert_eq!(orig_inner.read().get_as::<i32>("v").expect("v"), 50);

    // Duplicate: repeated container is fresh.
    dup.repeated("vals").expect("vals").write().clear();
    assert_eq!(m.repeated("vals").expect("vals").read().len(), 2);
}

#[test]
fn test_repeated_container_scenario() {
    let mut ints = RepeatedField::new(FieldType::Int32).expect("int32");
    ints.push(1).expect("push");
    ints.push(2).expect("push");
    ints.push(3).expect("push");
    assert_eq!(ints.pop().expect("pop"), Value::Int32(3));
    assert_eq!(ints.len(), 2);
    assert_eq!(ints.get(0).expect("get"), Value::Int32(1));
}

#[test]
fn test_enum_scenario() {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_enum("Color")?.value("RED", 0)?.value("GREEN", 1)?;
        Ok(())
    })
    .expect("build");
    let color = pool.lookup_enum("Color").expect("Color");
    assert_eq!(color.lookup_value(1), Some("GREEN"));
    assert_eq!(color.lookup_name("RED"), Some(0));
    let pairs: Vec<(String, i32)> = color.each().map(|(n, v)| (n.to_string(), v)).collect();
    assert_eq!(pairs, vec![("RED".to_string(), 0), ("GREEN".to_string(), 1)]);
}

#[test]
fn test_forward_reference_in_batch() {
    let pool = SchemaPool::new();
    let committed = pool
        .build(|b| {
            b.add_message("A")?
                .optional_ref("b", FieldType::Message, 1, "B")?;
            b.add_message("B")?.optional("n", FieldType::Int64, 1)?;
            Ok(())
        })
        .expect("forward reference");
    assert_eq!(committed.len(), 2);

    let a = pool.lookup_message("A").expect("A");
    let b = pool.lookup_message("B").expect("B");
    let field = a.field("b").expect("b");
    let target = field.message_type().expect("resolved");
    assert!(Arc::ptr_eq(&target, &b));
}

#[test]
fn test_missing_reference_is_atomic() {
    let pool = SchemaPool::new();
    let result = pool.build(|b| {
        b.add_message("A")?
            .optional_ref("b", FieldType::Message, 1, "B")?;
        b.add_message("Other")?;
        Ok(())
    });
    assert!(matches!(result, Err(Error::UnresolvedReference { .. })));
    assert!(pool.lookup("A").is_none());
    assert!(pool.lookup("Other").is_none());
    assert!(pool.is_empty());
}

#[test]
fn test_reference_into_committed_pool() {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_enum("Status")?.value("OK", 0)?.value("ERR", 1)?;
        Ok(())
    })
    .expect("first batch");
    pool.build(|b| {
        b.add_message("Reply")?
            .optional_ref("status", FieldType::Enum, 1, "Status")?;
        Ok(())
    })
    .expect("second batch");

    let reply = pool.lookup_message("Reply").expect("Reply");
    let mut r = Message::new(&reply);
    r.set("status", "ERR").expect("status");
    assert_eq!(r.to_string(), "<Reply: status: :ERR>");
}

#[test]
fn test_self_referencing_schema() {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_message("Node")?
            .optional("value", FieldType::Int32, 1)?
            .optional_ref("next", FieldType::Message, 2, "Node")?;
        Ok(())
    })
    .expect("build");
    let node = pool.lookup_message("Node").expect("Node");

    let tail = Message::with_values(&node, [("value", 2)]).expect("tail");
    let mut head = Message::with_values(&node, [("value", 1)]).expect("head");
    head.set("next", tail).expect("next");
    assert_eq!(
        head.to_string(),
        "<Node: value: 1, next: <Node: value: 2, next: nil>>"
    );
}

#[test]
fn test_pool_config_capacity_flows_to_instances() {
    let pool = SchemaPool::with_config(config::PoolConfig {
        initial_repeated_capacity: 2,
        ..config::PoolConfig::default()
    });
    pool.build(|b| {
        b.add_message("Bag")?.repeated("items", FieldType::UInt32, 1)?;
        Ok(())
    })
    .expect("build");
    let bag = pool.lookup_message("Bag").expect("Bag");
    assert_eq!(bag.initial_repeated_capacity(), 2);

    let m = Message::new(&bag);
    let items = m.repeated("items").expect("items");
    items.write().push(1u32).expect("push");
    assert_eq!(items.read().capacity(), 2);
    items.write().push(2u32).expect("push");
    items.write().push(3u32).expect("push");
    assert_eq!(items.read().capacity(), 4);
}

#[test]
fn test_type_mismatch_keeps_prior_value() {
    let (_pool, point) = point_pool();
    let mut p = Message::with_values(&point, [("x", 5)]).expect("point");
    assert!(matches!(
        p.set("x", "five"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(p.set("x", i64::from(i32::MAX) + 1).is_err());
    assert_eq!(p.get_as::<i32>("x").expect("x"), 5);
}

fn line_pool() -> SchemaPool {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_message("Point")?
            .optional("x", FieldType::Int32, 1)?
            .optional("y", FieldType::Int32, 2)?;
        b.add_message("Line")?
            .optional_ref("from", FieldType::Message, 1, "Point")?
            .repeated_ref("via", FieldType::Message, 2, "Point")?;
        b.add_message("Other")?.optional("v", FieldType::Int32, 1)?;
        Ok(())
    })
    .expect("build Line");
    pool
}

#[test]
fn test_message_class_checked_by_identity() {
    let pool = line_pool();
    let line = pool.lookup_message("Line").expect("Line");
    let point = pool.lookup_message("Point").expect("Point");

    // Same name, different pool and different fields.
    let foreign = SchemaPool::new();
    foreign
        .build(|b| {
            b.add_message("Point")?.optional("name", FieldType::String, 7)?;
            Ok(())
        })
        .expect("foreign Point");
    let foreign_point = foreign.lookup_message("Point").expect("Point");

    let mut l = Message::new(&line);
    let origin = Message::with_values(&point, [("x", 1)]).expect("origin");
    l.set("from", origin).expect("same class");
    assert!(matches!(
        l.set("from", Message::new(&foreign_point)),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        l.repeated("via").expect("via").write().push(Message::new(&foreign_point)),
        Err(Error::TypeMismatch { .. })
    ));

    let from = l.get("from").expect("from");
    let kept = from.as_message().expect("still set");
    assert!(Arc::ptr_eq(kept.schema(), &point));
    assert_eq!(kept.read().get_as::<i32>("x").expect("x"), 1);
}

#[test]
fn test_class_check_survives_pool_drop() {
    let pool = line_pool();
    let line = pool.lookup_message("Line").expect("Line");
    let point = pool.lookup_message("Point").expect("Point");
    let other = pool.lookup_message("Other").expect("Other");
    drop(pool);

    let from = line.field("from").expect("from");
    assert!(from.message_type().is_some_and(|m| Arc::ptr_eq(&m, &point)));

    let mut l = Message::new(&line);
    l.set("from", Message::new(&point)).expect("Point into Point field");
    assert!(matches!(
        l.set("from", Message::new(&other)),
        Err(Error::TypeMismatch { .. })
    ));
    let via = l.repeated("via").expect("via");
    via.write().push(Message::new(&point)).expect("push Point");
    assert!(via.write().push(Message::new(&other)).is_err());
    assert_eq!(via.read().len(), 1);
}

#[test]
fn test_cyclic_field_fails_closed_after_pool_drop() {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_message("Node")?
            .optional_ref("next", FieldType::Message, 1, "Node")?;
        b.add_message("Other")?;
        Ok(())
    })
    .expect("build");
    let node = pool.lookup_message("Node").expect("Node");
    let other = pool.lookup_message("Other").expect("Other");
    drop(pool);

    // The self link is weak, so the class is gone with the pool.
    assert!(node.field("next").and_then(FieldSchema::subtype).is_none());
    let mut head = Message::new(&node);
    assert!(matches!(
        head.set("next", Message::new(&other)),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(head.set("next", Message::new(&node)).is_err());
    assert!(head.get("next").expect("next").is_null());
}

#[test]
fn test_repeated_classes_compared_by_identity() {
    let build = || {
        let pool = SchemaPool::new();
        pool.build(|b| {
            b.add_enum("Color")?.value("RED", 0)?.value("GREEN", 1)?;
            b.add_message("Palette")?
                .repeated_ref("colors", FieldType::Enum, 1, "Color")?;
            Ok(())
        })
        .expect("build Palette");
        pool
    };
    let (pool_a, pool_b) = (build(), build());
    let color_a = pool_a.lookup_enum("Color").expect("Color");
    let color_b = pool_b.lookup_enum("Color").expect("Color");

    let mut a = RepeatedField::with_element(ElementType::enumeration(&color_a), 4);
    let mut b = RepeatedField::with_element(ElementType::enumeration(&color_b), 4);
    a.push(Value::Enum(1)).expect("push");
    b.push(Value::Enum(1)).expect("push");
    assert!(!a.element().same_as(b.element()));
    assert!(!a.equals(&b));
    assert!(matches!(a.concat(&b), Err(Error::TypeMismatch { .. })));

    let mut same = RepeatedField::with_element(ElementType::enumeration(&color_a), 4);
    same.push("GREEN").expect("push by name");
    assert!(a.equals(&same));

    let palette_a = pool_a.lookup_message("Palette").expect("Palette");
    let mut p = Message::new(&palette_a);
    assert!(matches!(
        p.set("colors", b),
        Err(Error::TypeMismatch { .. })
    ));
    p.set("colors", RepeatedRef::new(same)).expect("same class");
    assert_eq!(p.repeated("colors").expect("colors").read().len(), 1);
}
