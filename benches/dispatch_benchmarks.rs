//! Performance benchmarks for proxy dispatch.
//!
//! Measures the per-call overhead of the dispatch table across strategies:
//! pass-through (original only), around-advice (interceptor plus proceed),
//! and fixed-result (no original), against a direct trampoline call as the
//! baseline.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use proxyforge::{
    AroundAdvice, CallError, Callback, ClassModel, CtorModel, FixedResult, Forward, MemberSig,
    MethodModel, MethodProxy, ProxyBuilder, ProxyInstance, Value, ValueKind,
};

struct Transparent;

impl AroundAdvice for Transparent {
    fn intercept(
        &self,
        _instance: &ProxyInstance,
        _member: &MemberSig,
        args: &[Value],
        proceed: &MethodProxy<'_>,
    ) -> Result<Value, CallError> {
        proceed.invoke(args)
    }
}

impl Callback for Transparent {
    fn as_around(&self) -> Option<&dyn AroundAdvice> {
        Some(self)
    }
}

struct ConstantInt(i64);

impl FixedResult for ConstantInt {
    fn fixed_value(&self) -> Result<Value, CallError> {
        Ok(Value::Int(self.0))
    }
}

impl Callback for ConstantInt {
    fn as_fixed(&self) -> Option<&dyn FixedResult> {
        Some(self)
    }
}

fn counter_model() -> Arc<ClassModel> {
    Arc::new(
        ClassModel::new("bench.Counter", "bench", || Box::new(7i64))
            .with_method(MethodModel::of::<i64, _>(
                MemberSig::new("get", vec![], ValueKind::Int),
                |state, _| Ok(Value::Int(*state)),
            ))
            .with_constructor(CtorModel::no_arg()),
    )
}

fn dispatch_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    let pass_through = ProxyBuilder::new()
        .superclass(counter_model())
        .callback(Arc::new(Forward))
        .create()
        .expect("pass-through proxy");
    group.bench_function("pass_through/get", |b| {
        b.iter(|| black_box(pass_through.invoke("get", &[])))
    });

    let around = ProxyBuilder::new()
        .superclass(counter_model())
        .callback(Arc::new(Transparent))
        .create()
        .expect("around proxy");
    group.bench_function("around_advice/get", |b| {
        b.iter(|| black_box(around.invoke("get", &[])))
    });

    let fixed = ProxyBuilder::new()
        .superclass(counter_model())
        .callback(Arc::new(ConstantInt(7)))
        .create()
        .expect("fixed proxy");
    group.bench_function("fixed_result/get", |b| {
        b.iter(|| black_box(fixed.invoke("get", &[])))
    });

    group.finish();
}

fn generation_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");

    // Cache-hit path: structurally identical configuration every iteration.
    group.bench_function("cached_class_lookup", |b| {
        b.iter(|| {
            let instance = ProxyBuilder::new()
                .superclass(counter_model())
                .callback(Arc::new(Forward))
                .create()
                .expect("proxy");
            black_box(instance)
        })
    });

    group.finish();
}

criterion_group!(benches, dispatch_benchmarks, generation_benchmarks);
criterion_main!(benches);
