use proptest::prelude::*;

use dctlint::lint::rules::placeholder::{Scan, scan};
use dctlint::lint::severity::combine_all;
use dctlint::lint::{LintEngine, Severity, Tolerance};
use dctlint::template::{Numeric, Record, Template, decode, to_canonical};

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Ok),
        Just(Severity::Debug),
        Just(Severity::Info),
        Just(Severity::Warn),
        Just(Severity::Error),
        Just(Severity::Fatal),
    ]
}

fn tolerance() -> impl Strategy<Value = Tolerance> {
    prop_oneof![
        Just(Tolerance::Any),
        Just(Tolerance::Error),
        Just(Tolerance::Warn),
        Just(Tolerance::Info),
        Just(Tolerance::Debug),
        Just(Tolerance::None),
    ]
}

fn numeric() -> impl Strategy<Value = Numeric> {
    prop_oneof![
        (0i64..=2_147_483_647).prop_map(Numeric::Concrete),
        "%[a-z]{1,8}%".prop_map(Numeric::Placeholder),
    ]
}

fn record() -> impl Strategy<Value = Record> {
    (
        prop_oneof![Just("A"), Just("CNAME"), Just("TXT"), Just("MX"), Just("SRV")],
        "[a-z@_%]{0,12}",
        "[a-z0-9.%]{0,16}",
        proptest::option::of(numeric()),
        proptest::option::of(numeric()),
    )
        .prop_map(|(kind, host, points_to, ttl, priority)| Record {
            record_type: kind.to_string(),
            host,
            points_to,
            ttl,
            priority,
            ..Default::default()
        })
}

fn template() -> impl Strategy<Value = Template> {
    (
        "[a-z]{1,10}\\.com",
        "[a-z]{1,10}",
        proptest::option::of(numeric()),
        any::<bool>(),
        any::<bool>(),
        proptest::collection::vec(record(), 0..6),
    )
        .prop_map(|(provider_id, service_id, version, shared, sync_block, records)| Template {
            provider_id,
            provider_name: "Provider".to_string(),
            service_id,
            service_name: "Service".to_string(),
            version,
            shared,
            sync_block,
            records,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn test_combine_commutative(a in severity(), b in severity()) {
        prop_assert_eq!(a.combine(b), b.combine(a));
    }

    #[test]
    fn test_combine_associative(a in severity(), b in severity(), c in severity()) {
        prop_assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
    }

    #[test]
    fn test_combine_identity(a in severity()) {
        prop_assert_eq!(Severity::Ok.combine(a), a);
        prop_assert_eq!(combine_all([a]), a);
    }

    #[test]
    fn test_exit_status_is_zero_or_combined(t in tolerance(), levels in proptest::collection::vec(severity(), 0..8)) {
        let combined = combine_all(levels);
        let status = t.exit_status(combined);
        prop_assert!(status == 0 || status == combined.exit_bits());
    }

    #[test]
    fn test_placeholder_scan_balanced(name in "[A-Za-z0-9_-]{1,16}", prefix in "[a-z.]{0,8}") {
        let value = format!("{prefix}%{name}%");
        prop_assert_eq!(scan(&value), Scan::Clean);
        prop_assert_eq!(scan(&format!("{prefix}%{name}")), Scan::Unterminated);
    }

    #[test]
    fn test_validation_deterministic(template in template()) {
        let run = |mut t: Template| {
            let mut engine = LintEngine::with_defaults();
            let report = engine.validate(&mut t, None);
            (report.severity(), report.diagnostics().to_vec())
        };
        prop_assert_eq!(run(template.clone()), run(template));
    }

    #[test]
    fn test_canonical_idempotent(template in template(), indent in 0usize..8) {
        let once = to_canonical(&template, indent).unwrap();
        let decoded = decode(once.as_bytes()).unwrap();
        prop_assert!(decoded.advisories.is_empty());
        let twice = to_canonical(&decoded.template, indent).unwrap();
        prop_assert_eq!(once, twice);
    }
}
