//! Shared fixtures: base-type models and callback implementations.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use proxyforge::{
    AroundAdvice, CallError, Callback, CallbackFilter, ClassModel, CtorModel, FixedResult,
    InterfaceModel, LazyDelegate, ManualDispatch, MemberInfo, MemberSig, MethodModel, MethodProxy,
    ProxyInstance, Value, ValueKind,
};

/// Receiver state for the `Counter` fixture class.
#[derive(Debug, Default)]
pub struct CounterState {
    pub value: i64,
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, CallError> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| CallError::target(format!("argument {index} must be an int")))
}

/// A small base class with `get`, `set`, and `describe` members, a no-arg
/// constructor, and an int-arg constructor.
pub fn counter_class() -> Arc<ClassModel> {
    Arc::new(
        ClassModel::new("fixtures.Counter", "fixtures", || {
            Box::new(CounterState::default())
        })
        .with_method(MethodModel::of::<CounterState, _>(
            MemberSig::new("get", vec![], ValueKind::Int),
            |state, _| Ok(Value::Int(state.value)),
        ))
        .with_method(MethodModel::of::<CounterState, _>(
            MemberSig::new("set", vec![ValueKind::Int], ValueKind::Unit),
            |state, args| {
                state.value = int_arg(args, 0)?;
                Ok(Value::Unit)
            },
        ))
        .with_method(MethodModel::of::<CounterState, _>(
            MemberSig::new("describe", vec![], ValueKind::Str),
            |state, _| Ok(Value::Str(format!("count={}", state.value))),
        ))
        .with_constructor(CtorModel::no_arg())
        .with_constructor(CtorModel::new(vec![ValueKind::Int], |instance, args| {
            let start = int_arg(args, 0)?;
            instance.with_target_mut::<CounterState, _>(|state| state.value = start)?;
            Ok(())
        })),
    )
}

/// Receiver state for the `Greeter` fixture: its constructor calls the
/// overridable `greeting` member and stores what it observed.
#[derive(Debug)]
pub struct GreeterState {
    pub greeting: String,
    pub seen_in_ctor: String,
}

impl Default for GreeterState {
    fn default() -> Self {
        Self {
            greeting: "hello".to_string(),
            seen_in_ctor: String::new(),
        }
    }
}

/// A base class whose constructor invokes a member overridden by the proxy.
pub fn greeter_class() -> Arc<ClassModel> {
    Arc::new(
        ClassModel::new("fixtures.Greeter", "fixtures", || {
            Box::new(GreeterState::default())
        })
        .with_method(MethodModel::of::<GreeterState, _>(
            MemberSig::new("greeting", vec![], ValueKind::Str),
            |state, _| Ok(Value::Str(state.greeting.clone())),
        ))
        .with_constructor(CtorModel::new(vec![], |instance, _| {
            let seen = match instance.invoke("greeting", &[])? {
                Value::Str(s) => s,
                other => format!("{other:?}"),
            };
            instance.with_target_mut::<GreeterState, _>(|state| state.seen_in_ctor = seen)?;
            Ok(())
        })),
    )
}

/// A capability interface with a single `render` member.
pub fn renderable_interface() -> Arc<InterfaceModel> {
    Arc::new(
        InterfaceModel::new("fixtures.Renderable")
            .with_method(MemberSig::new("render", vec![], ValueKind::Str)),
    )
}

/// Around advice that records hook order and adds a fixed offset to integer
/// results.
pub struct Recorder {
    pub events: Arc<Mutex<Vec<String>>>,
    pub offset: i64,
}

impl Recorder {
    pub fn new(offset: i64) -> (Arc<Self>, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                events: Arc::clone(&events),
                offset,
            }),
            events,
        )
    }

    fn push(&self, event: impl Into<String>) {
        if let Ok(mut log) = self.events.lock() {
            log.push(event.into());
        }
    }
}

impl AroundAdvice for Recorder {
    fn intercept(
        &self,
        _instance: &ProxyInstance,
        member: &MemberSig,
        args: &[Value],
        proceed: &MethodProxy<'_>,
    ) -> Result<Value, CallError> {
        self.push(format!("before {}", member.name()));
        let result = proceed.invoke(args)?;
        self.push(format!("after {}", member.name()));
        match result {
            Value::Int(n) => Ok(Value::Int(n + self.offset)),
            other => Ok(other),
        }
    }
}

impl Callback for Recorder {
    fn as_around(&self) -> Option<&dyn AroundAdvice> {
        Some(self)
    }
}

/// Fixed-result callback returning a constant string.
pub struct FixedStr(pub &'static str);

impl FixedResult for FixedStr {
    fn fixed_value(&self) -> Result<Value, CallError> {
        Ok(Value::Str(self.0.to_string()))
    }
}

impl Callback for FixedStr {
    fn as_fixed(&self) -> Option<&dyn FixedResult> {
        Some(self)
    }
}

/// Lazy delegate resolving a counter state seeded with a fixed value, and
/// counting how many times resolution ran.
pub struct SeededDelegate {
    pub seed: i64,
    pub resolutions: Arc<Mutex<usize>>,
}

impl SeededDelegate {
    pub fn new(seed: i64) -> (Arc<Self>, Arc<Mutex<usize>>) {
        let resolutions = Arc::new(Mutex::new(0));
        (
            Arc::new(Self {
                seed,
                resolutions: Arc::clone(&resolutions),
            }),
            resolutions,
        )
    }
}

impl LazyDelegate for SeededDelegate {
    fn resolve(&self) -> Result<Box<dyn std::any::Any + Send + Sync>, CallError> {
        if let Ok(mut count) = self.resolutions.lock() {
            *count += 1;
        }
        Ok(Box::new(CounterState { value: self.seed }))
    }
}

impl Callback for SeededDelegate {
    fn as_lazy(&self) -> Option<&dyn LazyDelegate> {
        Some(self)
    }
}

/// Manual router answering `get` with a constant and rejecting the rest.
pub struct GetOnlyRouter(pub i64);

impl ManualDispatch for GetOnlyRouter {
    fn route(&self, member: &MemberSig, _args: &[Value]) -> Result<Value, CallError> {
        if member.name() == "get" {
            Ok(Value::Int(self.0))
        } else {
            Err(CallError::target(format!("unroutable member {}", member.name())))
        }
    }
}

impl Callback for GetOnlyRouter {
    fn as_manual(&self) -> Option<&dyn ManualDispatch> {
        Some(self)
    }
}

/// Filter routing members by name, with a fallback slot.
pub struct NameRouting {
    pub routes: Vec<(&'static str, usize)>,
    pub fallback: usize,
}

impl CallbackFilter for NameRouting {
    fn accept(&self, member: &MemberInfo, _all: &[MemberInfo]) -> usize {
        self.routes
            .iter()
            .find(|(name, _)| *name == member.sig.name())
            .map(|(_, slot)| *slot)
            .unwrap_or(self.fallback)
    }
}

/// Filter that always returns an out-of-range slot.
pub struct Wild(pub usize);

impl CallbackFilter for Wild {
    fn accept(&self, _member: &MemberInfo, _all: &[MemberInfo]) -> usize {
        self.0
    }
}
