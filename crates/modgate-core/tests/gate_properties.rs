//! Integration tests for the permission gate
//!
//! Exercises the public API the way a hook-installation host would: load a
//! configuration, ask for decisions from many threads, reload underneath.

use modgate_core::{
    CallbackNotifier, DecisionEvent, DeferredContext, GateError, GateResult, ModuleIdentity,
    PackageInspector, PermissionGate, PermissionRecord, PermissionStore, SchemaVersion, Verdict,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

const CONFIG: &str = r#"[{"name":"com.example.mod","packages":["com.target.app"]}]"#;

#[test]
fn test_internal_calls_ignore_store_contents() -> GateResult<()> {
    let gate = PermissionGate::builder().build();
    for target in ["com.target.app", "com.other.app", ""] {
        assert!(gate.check_permission(None, target));
    }

    gate.load_permissions("[]".as_bytes())?;
    assert!(gate.check_permission(None, "com.target.app"));
    Ok(())
}

#[test]
fn test_example_configuration() -> GateResult<()> {
    let gate = PermissionGate::builder().build();
    gate.load_permissions(CONFIG.as_bytes())?;

    let module = Some("/any/path/com.example.mod/base.apk");
    assert!(gate.check_permission(module, "com.target.app"));
    assert!(!gate.check_permission(module, "com.other.app"));
    Ok(())
}

#[test]
fn test_heuristic_example() {
    let gate = PermissionGate::builder().build();
    let decision = gate.evaluate(Some("/data/app/com.example.mod-1/base.apk"), "t");
    assert_eq!(
        decision.module_identity.as_ref().map(|id| id.as_str()),
        Some("com.example.mod")
    );
}

#[test]
fn test_reload_reflects_exact_grants() -> GateResult<()> {
    let gate = PermissionGate::builder().schema(SchemaVersion::V1).build();
    gate.load_permissions(
        r#"[
            {"name": "alpha", "packages": {"com.one": true, "com.two": false}},
            {"name": "beta", "packages": {}}
        ]"#
        .as_bytes(),
    )?;

    let table = gate.store().snapshot();
    let [alpha, beta, gamma] = ["alpha", "beta", "gamma"].map(ModuleIdentity::from);
    let (alpha, beta) = (Some(&alpha), Some(&beta));
    assert_eq!(table.lookup(alpha, "com.one"), Verdict::Allowed);
    assert_eq!(table.lookup(alpha, "com.two"), Verdict::Denied);
    assert_eq!(table.lookup(alpha, "com.three"), Verdict::Denied);
    assert_eq!(table.lookup(beta, "com.one"), Verdict::Denied);
    assert_eq!(table.lookup(Some(&gamma), "com.one"), Verdict::Unknown);
    Ok(())
}

#[test]
fn test_malformed_reload_reports_and_preserves() -> GateResult<()> {
    let gate = PermissionGate::builder().build();
    gate.load_permissions(CONFIG.as_bytes())?;
    let before = gate.store().snapshot();

    for bad in [
        r#"[{"packages":["com.target.app"]}]"#,
        r#"[{"name":"x","packages":"com.target.app"}]"#,
        r#"{"name":"x"}"#,
        "not json",
        "",
    ] {
        let err = gate.load_permissions(bad.as_bytes()).unwrap_err();
        assert!(
            matches!(err, GateError::MalformedConfig { .. }),
            "{:?} gave {:?}",
            bad,
            err
        );
    }

    let after = gate.store().snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    Ok(())
}

#[test]
fn test_resolution_is_idempotent() {
    struct Counting(AtomicUsize);
    impl PackageInspector for Counting {
        fn package_name(&self, _path: &str) -> Option<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some("com.example.mod".to_string())
        }
    }

    let inspector = Arc::new(Counting(AtomicUsize::new(0)));
    let gate = PermissionGate::builder().inspector(inspector.clone()).build();

    for _ in 0..10 {
        gate.check_permission(Some("/mnt/asec/whatever/pkg.apk"), "t");
    }
    assert_eq!(inspector.0.load(Ordering::SeqCst), 1);
    assert_eq!(gate.resolver().cached_len(), 1);
}

#[test]
fn test_late_host_context() -> GateResult<()> {
    let context = Arc::new(DeferredContext::new());
    let gate = PermissionGate::builder()
        .application_context(context.clone())
        .fallback(None)
        .build();
    gate.load_permissions(r#"[{"name":"com.real","packages":["t"]}]"#.as_bytes())?;

    let path = Some("/data/app/~~abc/base.apk");
    assert!(!gate.check_permission(path, "t"));

    context.install(Arc::new(|_: &str| Some("com.real".to_string())));
    assert!(gate.check_permission(path, "t"));
    Ok(())
}

#[test]
fn test_reload_atomic_under_concurrent_checks() {
    // Each generation grants every module exactly one shared target. A
    // reader that ever sees two modules disagree observed a torn table.
    let store = Arc::new(PermissionStore::new());
    let gate = PermissionGate::builder().store(Arc::clone(&store)).build();
    let modules = ["m0", "m1", "m2", "m3", "m4"];

    let generation_records = |i: usize| -> Vec<PermissionRecord> {
        modules
            .iter()
            .map(|m| PermissionRecord::allowing(*m, [format!("target-{}", i)]))
            .collect()
    };
    gate.install(generation_records(0));

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 1..=300 {
                gate.install(generation_records(i));
            }
        });

        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..1000 {
                    let table = store.snapshot();
                    let granted: Vec<_> = modules
                        .iter()
                        .map(|m| table.permissions(&(*m).into()).cloned())
                        .collect();
                    assert!(granted.windows(2).all(|w| w[0] == w[1]));
                }
            });
        }
    });
}

#[test]
fn test_notifier_sees_every_module_decision() -> GateResult<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let gate = PermissionGate::builder()
        .notifier(Arc::new(CallbackNotifier::new(move |e: &DecisionEvent| {
            sink.lock().push(e.verdict);
        })))
        .build();
    gate.load_permissions(CONFIG.as_bytes())?;

    gate.check_permission(None, "com.target.app");
    gate.check_permission(Some("/data/app/com.example.mod-1/base.apk"), "com.target.app");
    gate.check_permission(Some("/data/app/com.example.mod-1/base.apk"), "com.other.app");
    gate.check_permission(Some("/data/app/com.nobody-1/base.apk"), "com.target.app");

    assert_eq!(
        std::mem::take(&mut *seen.lock()),
        vec![Verdict::Allowed, Verdict::Denied, Verdict::Unknown]
    );
    Ok(())
}


/// Inspector that parks inside `package_name` for one path until released
struct ParkingInspector {
    parked_path: &'static str,
    barrier: Barrier,
}

impl PackageInspector for ParkingInspector {
    fn package_name(&self, path: &str) -> Option<String> {
        if path == self.parked_path {
            self.barrier.wait(); // entered
            self.barrier.wait(); // released
            return Some("com.parked".to_string());
        }
        Some("com.example.mod".to_string())
    }
}

#[test]
fn test_blocked_inspector_holds_no_locks() -> GateResult<()> {
    let inspector = Arc::new(ParkingInspector {
        parked_path: "/data/app/com.parked-1/base.apk",
        barrier: Barrier::new(2),
    });
    let gate = PermissionGate::builder().inspector(inspector.clone()).build();
    gate.load_permissions(CONFIG.as_bytes())?;

    let cached = "/data/app/com.example.mod-1/base.apk";
    assert!(gate.check_permission(Some(cached), "com.target.app"));

    std::thread::scope(|s| {
        let parked = s.spawn(|| gate.evaluate(Some(inspector.parked_path), "com.target.app"));
        inspector.barrier.wait();

        // The inspector call is in flight on the other thread
        assert!(gate.check_permission(Some(cached), "com.target.app"));
        assert!(gate.resolver().resolve("/data/app/com.fresh-1/base.apk").is_some());
        gate.store().reload(vec![
            PermissionRecord::allowing("com.example.mod", ["com.target.app"]),
            PermissionRecord::allowing("com.parked", ["com.target.app"]),
        ]);

        inspector.barrier.wait();
        let decision = parked.join().unwrap();
        assert_eq!(
            decision.module_identity,
            Some(ModuleIdentity::from("com.parked"))
        );
    });

    assert_eq!(gate.resolver().cached_len(), 3);
    Ok(())
}

#[test]
fn test_blocked_notifier_holds_no_locks() -> GateResult<()> {
    let barrier = Arc::new(Barrier::new(2));
    let parked = Arc::clone(&barrier);
    let gate = PermissionGate::builder()
        .notifier(Arc::new(CallbackNotifier::new(move |e: &DecisionEvent| {
            if e.target_package == "com.parked.app" {
                parked.wait(); // entered
                parked.wait(); // released
            }
        })))
        .build();
    gate.load_permissions(CONFIG.as_bytes())?;

    let module = Some("/data/app/com.example.mod-1/base.apk");
    assert!(gate.check_permission(module, "com.target.app"));

    std::thread::scope(|s| {
        let blocked = s.spawn(|| gate.check_permission(module, "com.parked.app"));
        barrier.wait();

        // The notifier call is in flight on the other thread
        assert!(gate.check_permission(module, "com.target.app"));
        assert!(gate.resolver().resolve("/data/app/com.fresh-1/base.apk").is_some());
        gate.store().reload(vec![PermissionRecord::allowing(
            "com.example.mod",
            ["com.target.app", "com.parked.app"],
        )]);

        barrier.wait();
        // Decided against the table read before notifying
        assert!(!blocked.join().unwrap());
    });

    assert!(gate.check_permission(module, "com.target.app"));
    Ok(())
}
