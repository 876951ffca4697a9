//! Concurrent reconfiguration while chains are being checked.

mod common;

use certpin::tls::{PinSet, PinStore, PinValidator, PinningConfig, PinningMode, Verdict};
use common::TestCert;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const ROUNDS: usize = 200;
const READERS: usize = 4;

#[test]
fn test_snapshots_stay_consistent_under_reconfiguration() {
    let a = TestCert::new("a.example.com");
    let b = TestCert::new("b.example.com");
    let c = TestCert::new("c.example.com");

    let by_cert = PinningConfig::new(PinningMode::Certificate, [a.base64()])
        .enabled_domains(["a.example.com"]);
    let by_hash =
        PinningConfig::new(PinningMode::Sha256, [b.sha256()]).enabled_domains(["b.example.com"]);

    let store = PinStore::new();
    store.configure(&by_cert).unwrap();
    let validator = PinValidator::new(store.clone());

    let both = [a.der(), b.der()];
    let neither = [c.der()];
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            for round in 0..ROUNDS {
                let config = if round % 2 == 0 { &by_hash } else { &by_cert };
                store.configure(config).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..READERS {
            s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let snapshot = store.snapshot();
                    match snapshot.pins() {
                        PinSet::Certificate(_) => {
                            assert_eq!(snapshot.enabled_domains(), ["a.example.com"]);
                        }
                        PinSet::Sha256(_) => {
                            assert_eq!(snapshot.enabled_domains(), ["b.example.com"]);
                        }
                        PinSet::PublicKey(_) => panic!("public key mode was never configured"),
                    }
                    assert_eq!(snapshot.pins().len(), 1);

                    // Each configuration pins one of the two certificates.
                    assert_eq!(validator.check_chain(&both), Verdict::Accept);
                    assert!(!validator.check_chain(&neither).is_accept());
                }
            });
        }
    });
}

#[test]
fn test_replace_pins_and_toggle_race() {
    let a = TestCert::new("a.example.com");
    let b = TestCert::new("b.example.com");

    let store = PinStore::new();
    store
        .configure(&PinningConfig::new(PinningMode::Certificate, [a.base64()]))
        .unwrap();

    let pins_a = [a.base64()];
    let pins_b = [b.base64()];
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            for round in 0..ROUNDS {
                let pins = if round % 2 == 0 { &pins_b } else { &pins_a };
                store.replace_pins(pins).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        s.spawn(|| {
            for round in 0..ROUNDS {
                store.set_enabled(round % 2 == 0);
            }
            store.set_enabled(true);
        });

        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                let snapshot = store.snapshot();
                assert_eq!(snapshot.mode(), PinningMode::Certificate);
                assert_eq!(snapshot.pins().len(), 1);
            }
        });
    });

    assert!(store.is_enabled());
    assert_eq!(store.mode(), PinningMode::Certificate);
    assert_eq!(
        PinValidator::new(store).check_chain(&[a.der()]),
        Verdict::Accept
    );
}
