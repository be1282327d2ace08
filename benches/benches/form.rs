// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use serde_json::{Value, json};
use understory_form::{FieldDescriptor, FieldPath, Form, FormConfig, PatternRule, Status, path};

fn phones(len: usize) -> Value {
    let rows: Vec<Value> = (0..len).map(|_| json!({"number": "", "ext": ""})).collect();
    json!({ "phones": rows })
}

fn form_with_rows(len: usize) -> Form {
    let digits = PatternRule::new("^[0-9]*$", "Only Numbers", Status::Error).unwrap();
    let mut form = Form::controlled(phones(len), FormConfig::default(), ());
    for idx in 0..len {
        form.register(
            FieldDescriptor::parse(&format!("phones[{idx}].number"))
                .unwrap()
                .required()
                .rule(digits.clone()),
        );
        form.register(FieldDescriptor::parse(&format!("phones[{idx}].ext")).unwrap());
    }
    form
}

fn bench_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("form/path");
    let value = phones(64);
    let deep: FieldPath = "phones[63].number".parse().unwrap();

    group.bench_function("parse", |b| {
        b.iter(|| black_box(FieldPath::parse(black_box("phones[63].number"))));
    });
    group.bench_function("get", |b| {
        b.iter(|| black_box(path::get(black_box(&value), &deep)));
    });
    group.bench_function("set_in", |b| {
        b.iter_batched(
            || value.clone(),
            |mut v| {
                path::set_in(&mut v, &deep, json!("555").into());
                black_box(v);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("form/validate");

    // A full pass evaluates every mounted field; a change-mode mutation only
    // revisits touched fields and those already reporting.
    for rows in [8usize, 64, 512] {
        group.throughput(Throughput::Elements((rows * 2) as u64));

        group.bench_with_input(BenchmarkId::new("full_pass", rows), &rows, |b, &rows| {
            b.iter_batched(
                || form_with_rows(rows),
                |mut form| black_box(form.validate()),
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("mutate", rows), &rows, |b, &rows| {
            b.iter_batched(
                || form_with_rows(rows),
                |mut form| {
                    form.mutate("phones[0].number", json!("abc")).unwrap();
                    black_box(form);
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("form/registry");

    for rows in [64usize, 512] {
        let descriptors: Vec<FieldDescriptor> = (0..rows)
            .map(|idx| FieldDescriptor::parse(&format!("rows[{idx}]")).unwrap())
            .collect();
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(
            BenchmarkId::new("mount_unmount", rows),
            &descriptors,
            |b, descriptors| {
                b.iter_batched(
                    || Form::uncontrolled(FormConfig::default(), ()),
                    |mut form| {
                        let handles: Vec<_> = descriptors
                            .iter()
                            .cloned()
                            .map(|d| form.register(d))
                            .collect();
                        for handle in handles {
                            form.deregister(handle);
                        }
                        black_box(form);
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_path, bench_validation, bench_registration);
criterion_main!(benches);
