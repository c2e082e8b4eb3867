// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::redundant_closure_for_method_calls)] // Test code clarity
#![allow(clippy::needless_pass_by_value)] // Test functions

//! Public API tests for the message model: pool sharing across threads,
//! nested message handles, repeated containers held by messages.

use hdds_message::{
    Error, FieldType, Message, MessageRef, RefCounter, RefVisitor, RepeatedField, RepeatedRef,
    SchemaPool, Trace, Value,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn address_book(pool: &SchemaPool) {
    pool.build(|b| {
        b.add_enum("tutorial.PhoneType")?
            .value("MOBILE", 0)?
            .value("HOME", 1)?
            .value("WORK", 2)?;
        b.add_message("tutorial.Person")?
            .required("name", FieldType::String, 1)?
            .optional("id", FieldType::Int32, 2)?
            .optional("email", FieldType::String, 3)?
            .repeated_ref("phones", FieldType::Message, 4, "PhoneNumber")?;
        b.add_message("tutorial.Person.PhoneNumber")?
            .optional("number", FieldType::String, 1)?
            .optional_ref("type", FieldType::Enum, 2, "PhoneType")?;
        b.add_message("tutorial.AddressBook")?
            .repeated_ref("people", FieldType::Message, 1, "Person")?;
        Ok(())
    })
    .expect("address book schema");
}

#[test]
fn test_address_book_roundtrip() {
    let pool = SchemaPool::new();
    address_book(&pool);

    let person = pool.lookup_message("tutorial.Person").expect("Person");
    let phone = pool
        .lookup_message("tutorial.Person.PhoneNumber")
        .expect("PhoneNumber");
    let book = pool.lookup_message("tutorial.AddressBook").expect("AddressBook");

    assert_eq!(
        person.field("phones").and_then(|f| f.type_name()),
        Some("tutorial.Person.PhoneNumber")
    );
    assert_eq!(
        phone.field("type").and_then(|f| f.type_name()),
        Some("tutorial.PhoneType")
    );

    let mut alice = Message::with_values(
        &person,
        [
            ("name", Value::from("Alice")),
            ("id", Value::from(1234)),
            ("email", Value::from("alice@example.com")),
        ],
    )
    .expect("alice");
    let phones = alice.repeated("phones").expect("phones");
    phones
        .write()
        .push(Message::with_values(&phone, [("number", "555-4321"), ("type", "HOME")]).expect("phone"))
        .expect("push phone");

    // Wrong element class is rejected eagerly.
    let stranger = Message::new(&book);
    assert!(matches!(
        phones.write().push(stranger),
        Err(Error::TypeMismatch { .. })
    ));
    assert_eq!(phones.read().len(), 1);

    alice.set("id", 99).expect("id");
    let mut address_book = Message::new(&book);
    address_book
        .repeated("people")
        .expect("people")
        .write()
        .push(alice)
        .expect("push person");

    let people = address_book.repeated("people").expect("people");
    let first: MessageRef = match people.read().get(0).expect("person 0") {
        Value::Message(Some(m)) => m,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(first.read().get_as::<String>("name").expect("name"), "Alice");
    assert_eq!(first.read().get_as::<i32>("id").expect("id"), 99);

    let copy = address_book.deep_copy();
    assert_eq!(copy, address_book);
    assert_eq!(copy.hash_value(), address_book.hash_value());
    address_book.set("people", Value::list(Vec::<Value>::new())).expect("clear");
    assert_ne!(copy, address_book);
}

#[test]
fn test_concurrent_readers_during_commits() {
    let pool = Arc::new(SchemaPool::new());
    pool.build(|b| {
        b.add_message("Base")?.optional("v", FieldType::Int32, 1)?;
        Ok(())
    })
    .expect("base");

    let barrier = Arc::new(Barrier::new(5));
    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool = Arc::clone(&pool);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..1_000 {
                let base = pool.lookup_message("Base").expect("Base always present");
                let mut m = Message::new(&base);
                m.set("v", i).expect("set");
                assert_eq!(m.get_as::<i32>("v").expect("get"), i);
            }
        }));
    }

    barrier.wait();
    for batch in 0..20 {
        pool.build(|b| {
            b.add_message(format!("Extra{}", batch))?
                .optional_ref("base", FieldType::Message, 1, "Base")?;
            Ok(())
        })
        .expect("extra batch");
    }

    for handle in handles {
        handle.join().expect("reader thread should succeed");
    }
    assert_eq!(pool.len(), 21);
}

#[test]
fn test_concurrent_transactions_serialize() {
    let pool = Arc::new(SchemaPool::new());
    let mut handles = Vec::new();
    for t in 0..4 {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            // Every thread races to register the same shared name.
            let shared = pool.build(|b| {
                b.add_message("Shared")?;
                Ok(())
            });
            pool.build(|b| {
                b.add_message(format!("Own{}", t))?;
                Ok(())
            })
            .expect("own name");
            shared.is_ok()
        }));
    }
    let winners = handles
        .into_iter()
        .map(|h| h.join().expect("thread should succeed"))
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
    assert_eq!(pool.len(), 5);
}

#[derive(Default)]
struct NameCollector {
    strings: Vec<String>,
}

impl RefVisitor for NameCollector {
    fn visit_string(&mut self, value: &Arc<str>) {
        self.strings.push(value.to_string());
    }
}

#[test]
fn test_trace_visits_each_reference_once() {
    let pool = SchemaPool::new();
    address_book(&pool);
    let person = pool.lookup_message("tutorial.Person").expect("Person");
    let alice = Message::with_values(&person, [("name", "Alice"), ("email", "a@x")]).expect("alice");

    let mut names = NameCollector::default();
    alice.trace(&mut names);
    assert_eq!(names.strings, vec!["Alice".to_string(), "a@x".to_string()]);

    let mut counter = RefCounter::default();
    alice.trace(&mut counter);
    assert_eq!(counter.strings, 2);
    assert_eq!(counter.repeated, 1);
    assert_eq!(counter.messages, 0);

    let phones = alice.repeated("phones").expect("phones");
    let mut counter = RefCounter::default();
    phones.read().trace(&mut counter);
    assert_eq!(counter.total(), 0);
}

#[test]
fn test_repeated_ref_shared_between_messages() {
    let pool = SchemaPool::new();
    pool.build(|b| {
        b.add_message("Series")?.repeated("samples", FieldType::Double, 1)?;
        Ok(())
    })
    .expect("build");
    let series = pool.lookup_message("Series").expect("Series");

    let mut samples = RepeatedField::new(FieldType::Double).expect("double");
    samples.push(1.5).expect("push");
    let shared = RepeatedRef::new(samples);

    let mut a = Message::new(&series);
    let mut b = Message::new(&series);
    a.set("samples", shared.clone()).expect("a");
    b.set("samples", shared.clone()).expect("b");
    shared.write().push(2.5).expect("push");

    assert_eq!(a.repeated("samples").expect("a").read().len(), 2);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "<Series: samples: [1.5, 2.5]>");
}
