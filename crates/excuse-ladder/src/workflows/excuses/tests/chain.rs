use super::common::*;
use std::sync::Arc;
use std::thread;

use crate::workflows::excuses::{
    AuditRegistry, Capability, Category, ChainError, Disposition, EmployeeId, EscalationChain,
    HandlerKey, Mode, Rung,
};

fn key(value: &str) -> HandlerKey {
    HandlerKey::new(value)
}

#[test]
fn direct_ladder_routes_each_category_to_its_rung() {
    let cases: [(Category, &str, &[&str]); 5] = [
        (Category::Minor, "receptionist", &["Excuse accepted"]),
        (Category::ModerateElectrical, "supervisor", &["Power outage check"]),
        (Category::ModerateFamily, "supervisor", &["Family matter"]),
        (
            Category::Complex,
            "hr_manager",
            &["Excuse reviewed by human resources"],
        ),
        (
            Category::Implausible,
            "ceo",
            &["CEO response", "New dossier entry"],
        ),
    ];

    for (category, expected_key, expected_subjects) in cases {
        let (chain, notifier, _) = build_chain();
        let mut excuse = excuse(4100, category);

        let disposition = chain.dispose(&mut excuse).expect("disposition succeeds");

        assert_eq!(disposition.ruled_by(), Some(&key(expected_key)), "{category}");
        assert!(excuse.is_ruled());
        assert_eq!(notifier.subjects(), expected_subjects, "{category}");
    }
}

#[test]
fn ruling_names_the_handler() {
    let (chain, _, _) = build_chain();
    let mut excuse = excuse(4101, Category::Complex);

    let disposition = chain.dispose(&mut excuse).expect("disposition succeeds");

    assert_eq!(
        disposition,
        Disposition::Ruled {
            key: key("hr_manager"),
            name: roster().hr_manager.name,
        }
    );
}

#[test]
fn implausible_then_minor_for_same_employee_leaves_one_entry() {
    let (chain, _, registry) = build_chain();

    let mut implausible = excuse(2004, Category::Implausible);
    chain.dispose(&mut implausible).expect("implausible ruled");
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.entries()[0].employee_id(), EmployeeId(2004));

    let mut minor = excuse(2004, Category::Minor);
    chain.dispose(&mut minor).expect("minor ruled");
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.entries_for(EmployeeId(2004)).len(), 1);
}

#[test]
fn delegate_hands_case_to_next_capable_handler() {
    let notifier = Arc::new(MemoryNotifier::default());
    let (context, _) = context(notifier.clone());
    let staff = roster();
    let chain = EscalationChain::builder(context)
        .rung(Rung::Reception, &staff.receptionist)
        .ad_hoc("night_desk", &employee(2100), [Capability::Minor])
        .expect("ad-hoc handler accepted")
        .rung(Rung::AreaSupervision, &staff.supervisor)
        .build()
        .expect("chain builds");

    chain
        .set_mode(&key("receptionist"), Mode::Delegate)
        .expect("receptionist exists");
    let mut excuse = excuse(4102, Category::Minor);

    let disposition = chain.dispose(&mut excuse).expect("disposition succeeds");

    assert_eq!(disposition.ruled_by(), Some(&key("night_desk")));
    assert_eq!(notifier.subjects(), vec!["Excuse processed".to_string()]);
}

#[test]
fn delegate_without_a_later_capable_handler_drops_the_case() {
    let (chain, notifier, registry) = build_chain();
    chain
        .set_mode(&key("ceo"), Mode::Delegate)
        .expect("ceo exists");
    let mut excuse = excuse(4103, Category::Implausible);

    let disposition = chain.dispose(&mut excuse).expect("drop is not an error");

    assert_eq!(disposition, Disposition::Dropped);
    assert!(!excuse.is_ruled());
    assert!(notifier.notices().is_empty());
    assert!(registry.is_empty());
}

#[test]
fn delegate_ignores_categories_outside_authority() {
    let (chain, _, _) = build_chain();
    chain
        .set_mode(&key("receptionist"), Mode::Delegate)
        .expect("receptionist exists");
    let mut excuse = excuse(4104, Category::Complex);

    let disposition = chain.dispose(&mut excuse).expect("disposition succeeds");

    assert_eq!(disposition.ruled_by(), Some(&key("hr_manager")));
}

#[test]
fn mode_changes_apply_to_later_dispositions() {
    let (chain, _, _) = build_chain();
    chain
        .set_mode(&key("hr_manager"), Mode::Delegate)
        .expect("hr manager exists");
    let mut first = excuse(4105, Category::Complex);
    assert_eq!(
        chain.dispose(&mut first).expect("first"),
        Disposition::Dropped
    );

    chain
        .set_mode(&key("hr_manager"), Mode::Direct)
        .expect("hr manager exists");
    let mut second = excuse(4105, Category::Complex);
    assert_eq!(
        chain.dispose(&mut second).expect("second").ruled_by(),
        Some(&key("hr_manager"))
    );
}

#[test]
fn direct_with_notice_alerts_oversight_before_ruling() {
    let (chain, notifier, _) = build_chain();
    chain
        .set_mode(&key("receptionist"), Mode::DirectWithNotice)
        .expect("receptionist exists");
    let mut excuse = excuse(4106, Category::Minor);

    let disposition = chain.dispose(&mut excuse).expect("disposition succeeds");

    assert_eq!(disposition.ruled_by(), Some(&key("receptionist")));
    let notices = notifier.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].to, addresses().oversight_address);
    assert_eq!(notices[0].from, roster().receptionist.email);
    assert_eq!(notices[0].subject, "Ruling under oversight");
    assert!(notices[0].body.contains("Employee 4106"));
    assert_eq!(notices[1].subject, "Excuse accepted");
}

#[test]
fn ruled_excuse_cannot_be_resubmitted() {
    let (chain, _, registry) = build_chain();
    let mut excuse = excuse(4107, Category::Implausible);
    chain.dispose(&mut excuse).expect("first disposition");

    match chain.dispose(&mut excuse) {
        Err(ChainError::AlreadyRuled(EmployeeId(4107))) => {}
        other => panic!("expected already ruled error, got {other:?}"),
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn notification_failures_do_not_block_rulings() {
    let (context, registry) = context(Arc::new(FailingNotifier));
    let chain = EscalationChain::standard(context, &roster());
    chain
        .set_mode(&key("ceo"), Mode::DirectWithNotice)
        .expect("ceo exists");
    let mut excuse = excuse(4108, Category::Implausible);

    let disposition = chain.dispose(&mut excuse).expect("disposition succeeds");

    assert_eq!(disposition.ruled_by(), Some(&key("ceo")));
    assert_eq!(registry.len(), 1);
}

#[test]
fn ad_hoc_handler_requires_some_authority() {
    let (context, _) = context(Arc::new(MemoryNotifier::default()));

    let no_capabilities: Vec<Capability> = Vec::new();

    match EscalationChain::builder(context).ad_hoc("nobody", &employee(2200), no_capabilities) {
        Err(ChainError::EmptyAuthority(rejected)) => assert_eq!(rejected, key("nobody")),
        other => panic!("expected empty authority error, got {other:?}"),
    }
}

#[test]
fn builder_rejects_duplicate_keys() {
    let (context, registry) = context(Arc::new(MemoryNotifier::default()));
    let staff = roster();

    let result = EscalationChain::builder(context)
        .rung(Rung::Executive, &staff.ceo)
        .ad_hoc("ceo", &employee(2201), [Capability::Complex])
        .expect("ad-hoc handler accepted")
        .build();

    match result {
        Err(ChainError::DuplicateHandler(duplicate)) => assert_eq!(duplicate, key("ceo")),
        other => panic!("expected duplicate handler error, got {other:?}"),
    }
    assert_eq!(registry.subscriber_count(), 0);
}

#[test]
fn ad_hoc_handler_with_implausible_authority_is_archived() {
    let notifier = Arc::new(MemoryNotifier::default());
    let (context, registry) = context(notifier.clone());
    let staff = roster();
    let chain = EscalationChain::builder(context)
        .ad_hoc(
            "board",
            &employee(2300),
            [Capability::Complex, Capability::Implausible],
        )
        .expect("ad-hoc handler accepted")
        .rung(Rung::Executive, &staff.ceo)
        .build()
        .expect("chain builds");

    let mut implausible = excuse(4109, Category::Implausible);
    let disposition = chain.dispose(&mut implausible).expect("disposition succeeds");

    assert_eq!(disposition.ruled_by(), Some(&key("board")));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.subscriber_count(), 2);
    let relays = notifier.addressed_to(&addresses().executive_broadcast_address);
    assert_eq!(relays.len(), 2, "board and ceo both relay the entry");
}

#[test]
fn empty_builder_drops_everything() {
    let (context, _) = context(Arc::new(MemoryNotifier::default()));
    let chain = EscalationChain::builder(context)
        .build()
        .expect("empty chain builds");
    assert!(chain.is_empty());

    for category in Category::ordered() {
        let mut excuse = excuse(4110, category);
        assert_eq!(
            chain.dispose(&mut excuse).expect("drop is not an error"),
            Disposition::Dropped
        );
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn ladder_types_are_shareable_across_threads() {
    assert_send_sync::<EscalationChain>();
    assert_send_sync::<AuditRegistry>();

    let (chain, _, registry) = build_chain();
    let chain = &chain;
    thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..50 {
                let mode = if round % 2 == 0 {
                    Mode::Delegate
                } else {
                    Mode::Direct
                };
                chain.set_mode(&key("hr_manager"), mode).expect("hr manager exists");
            }
        });
        for id in 0..20 {
            scope.spawn(move || {
                let mut implausible = excuse(4200 + id, Category::Implausible);
                chain.dispose(&mut implausible).expect("implausible ruled");
                let mut complex = excuse(4200 + id, Category::Complex);
                chain.dispose(&mut complex).expect("complex disposed");
            });
        }
    });

    assert_eq!(registry.len(), 20);
}
