//! Integration tests for the public lookup path and administrative operations

mod common;

use chrono::{Duration, Utc};
use common::{capabilities, print_test_header, TestHelpdesk};
use helpdesk_service::contract::*;
use helpdesk_service::domain::{NotificationKind, SettingsRepository};
use serde_json::json;
use uuid::Uuid;

const CUSTOMER_EMAIL: &str = "wati@customer.test";

fn new_level(code: &str, sort_order: i32) -> NewSupportLevel {
    NewSupportLevel {
        code: code.to_string(),
        name: format!("Tier {}", code),
        sort_order,
        capabilities: capabilities(true, false),
    }
}

async fn resolve(hd: &TestHelpdesk, ticket_id: Uuid) -> Ticket {
    hd.service
        .update_ticket(
            &hd.admin,
            ticket_id,
            TicketUpdate {
                status: Some(TicketStatus::Resolved),
                ..TicketUpdate::default()
            },
        )
        .await
        .unwrap()
}

// ===== Public lookup =====

#[tokio::test]
async fn test_public_lookup_shows_only_customer_safe_data() {
    print_test_header(
        "test_public_lookup_shows_only_customer_safe_data",
        &[
            "Number and email must both match",
            "Notes and assignment activities stay internal",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Invoice missing").await;

    hd.service
        .add_note(&hd.admin, ticket.id, "customer is on the legacy plan".to_string(), vec![])
        .await
        .unwrap();
    hd.service
        .assign_ticket(&hd.carol, ticket.id, Some(hd.alice.id), None)
        .await
        .unwrap();
    hd.service
        .add_reply(&hd.alice, ticket.id, "We are looking into it".to_string(), vec![])
        .await
        .unwrap();

    let view = hd
        .service
        .public_lookup(&ticket.ticket_number, CUSTOMER_EMAIL)
        .await
        .unwrap();
    assert_eq!(view.ticket_number, ticket.ticket_number);
    assert_eq!(view.status, TicketStatus::InProgress);
    assert_eq!(view.level_code, "L1");
    assert_eq!(view.replies.len(), 1);
    assert!(!view.activities.is_empty());
    assert!(view.activities.iter().all(|a| a.activity_type.is_public()));
    assert!(view
        .activities
        .iter()
        .all(|a| a.activity_type != ActivityType::Assign && a.activity_type != ActivityType::Note));

    let err = hd
        .service
        .public_lookup(&ticket.ticket_number, "someone@else.test")
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));

    let err = hd
        .service
        .public_lookup("TKT-0000-9999", CUSTOMER_EMAIL)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

#[tokio::test]
async fn test_customer_reply_notifies_assignee() {
    print_test_header(
        "test_customer_reply_notifies_assignee",
        &["Customer replies carry no author and reach the assigned agent"],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Refund").await;
    hd.service
        .assign_ticket(&hd.admin, ticket.id, Some(hd.bob.id), None)
        .await
        .unwrap();

    let reply = hd
        .service
        .add_customer_reply(
            &ticket.ticket_number,
            CUSTOMER_EMAIL,
            "Any update?".to_string(),
            vec![common::attachment("receipt.pdf")],
        )
        .await
        .unwrap();
    assert!(reply.from_customer);
    assert!(reply.author_id.is_none());
    assert_eq!(reply.attachments.len(), 1);
    assert!(reply.attachments[0].uploaded_by_id.is_none());

    let to_bob = hd.notifications.to_agent(hd.bob.id);
    assert_eq!(
        to_bob.last().map(|i| i.kind),
        Some(NotificationKind::CustomerReply)
    );

    let last = hd.tickets.activities_of(ticket.id).pop().unwrap();
    assert_eq!(last.activity_type, ActivityType::CustomerReply);
    assert!(last.author_id.is_none());

    let err = hd
        .service
        .add_customer_reply(&ticket.ticket_number, "bob@helpdesk.test", "hi".to_string(), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

// ===== Auto-close =====

#[tokio::test]
async fn test_auto_close_closes_stale_resolved_tickets() {
    print_test_header(
        "test_auto_close_closes_stale_resolved_tickets",
        &[
            "Tickets resolved longer than auto_close_days ago are closed",
            "The window follows the stored setting",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let now = Utc::now();
    let stale = hd.open_ticket("Old issue").await;
    let recent = hd.open_ticket("Recent issue").await;
    let open = hd.open_ticket("Still open").await;
    resolve(&hd, stale.id).await;
    resolve(&hd, recent.id).await;
    hd.tickets.set_resolved_at(stale.id, now - Duration::days(8));
    hd.tickets.set_resolved_at(recent.id, now - Duration::days(2));

    let err = hd
        .service
        .close_stale_resolved(&hd.carol, now)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        HelpdeskError::PermissionDenied {
            action: DeniedAction::Administer
        }
    );

    let closed = hd.service.close_stale_resolved(&hd.admin, now).await.unwrap();
    assert_eq!(closed, 1);
    hd.tickets.print_state("after first auto-close");

    let stale_now = hd.tickets.get(stale.id).unwrap();
    assert_eq!(stale_now.status, TicketStatus::Closed);
    assert_eq!(stale_now.closed_at, Some(now));
    let closing = hd.tickets.activities_of(stale.id).pop().unwrap();
    assert_eq!(closing.activity_type, ActivityType::StatusChange);
    assert!(closing.author_id.is_none());
    assert_eq!(hd.tickets.get(recent.id).unwrap().status, TicketStatus::Resolved);

    hd.service
        .update_setting(&hd.admin, "auto_close_days", json!(1))
        .await
        .unwrap();
    let closed = hd.service.close_stale_resolved(&hd.admin, now).await.unwrap();
    assert_eq!(closed, 1);
    assert_eq!(hd.tickets.get(recent.id).unwrap().status, TicketStatus::Closed);
    assert_eq!(hd.tickets.get(open.id).unwrap().status, TicketStatus::Open);

    let closed = hd.service.close_stale_resolved(&hd.admin, now).await.unwrap();
    assert_eq!(closed, 0);
}

// ===== Settings =====

#[tokio::test]
async fn test_settings_are_versioned_and_validated() {
    print_test_header(
        "test_settings_are_versioned_and_validated",
        &["Admins update known keys; the prefix flows into new ticket numbers"],
    );
    let hd = TestHelpdesk::new().await;

    let first = hd
        .service
        .update_setting(&hd.admin, "ticket_prefix", json!("HD"))
        .await
        .unwrap();
    assert_eq!(first.version, 1);
    let second = hd
        .service
        .update_setting(&hd.admin, "ticket_prefix", json!("SUP"))
        .await
        .unwrap();
    assert_eq!(second.version, 2);
    assert_eq!(second.updated_by, Some(hd.admin.id));

    let ticket = hd.open_ticket("Prefixed").await;
    assert!(ticket.ticket_number.starts_with("SUP-"));
    assert!(ticket.ticket_number.ends_with("-0001"));

    let effective = hd.service.effective_settings().await.unwrap();
    assert_eq!(effective.ticket_prefix, "SUP");
    assert_eq!(effective.auto_close_days, 7);

    for (key, value) in [
        ("ticket_colour", json!("red")),
        ("auto_close_days", json!(0)),
        ("sla_fallback_hours", json!("two days")),
        ("ticket_prefix", json!("no spaces")),
    ] {
        let err = hd
            .service
            .update_setting(&hd.admin, key, value)
            .await
            .unwrap_err();
        assert!(
            matches!(err, HelpdeskError::Validation { .. }),
            "{} should be rejected, got {:?}",
            key,
            err
        );
    }

    let err = hd
        .service
        .update_setting(&hd.alice, "ticket_prefix", json!("X"))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::PermissionDenied { .. }));
    assert_eq!(hd.service.list_settings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversized_durations_are_rejected() {
    print_test_header(
        "test_oversized_durations_are_rejected",
        &[
            "auto_close_days and sla_fallback_hours have upper bounds",
            "Out-of-range rows already in storage fall back to the defaults",
        ],
    );
    let hd = TestHelpdesk::new().await;

    for (key, value) in [
        ("auto_close_days", json!(100_000_000)),
        ("auto_close_days", json!(3_651)),
        ("sla_fallback_hours", json!(i64::MAX / 2)),
        ("sla_fallback_hours", json!(8_761)),
    ] {
        let err = hd
            .service
            .update_setting(&hd.admin, key, value.clone())
            .await
            .unwrap_err();
        println!("   {} = {}: {}", key, value, err);
        assert!(matches!(err, HelpdeskError::Validation { .. }));
    }
    assert!(hd.service.list_settings().await.unwrap().is_empty());

    hd.service
        .update_setting(&hd.admin, "auto_close_days", json!(3_650))
        .await
        .unwrap();
    assert_eq!(hd.service.close_stale_resolved(&hd.admin, Utc::now()).await.unwrap(), 0);

    // Rows written before the bounds existed
    hd.settings
        .upsert("auto_close_days", &json!(100_000_000), None)
        .await
        .unwrap();
    hd.settings
        .upsert("sla_fallback_hours", &json!(i64::MAX / 2), None)
        .await
        .unwrap();
    let effective = hd.service.effective_settings().await.unwrap();
    assert_eq!(effective.auto_close_days, 7);
    assert_eq!(effective.sla_fallback_hours, 48);

    let ticket = hd
        .service
        .create_ticket(&hd.admin, hd.new_ticket("No SLA row", Some(Priority::Low)))
        .await
        .unwrap();
    assert!(ticket.due_date.is_none());
    let snapshot = hd
        .service
        .sla_status(&hd.admin, ticket.id, Utc::now())
        .await
        .unwrap();
    assert!(snapshot.fallback_target);
    assert_eq!(snapshot.target_minutes, 48 * 60);
    assert_eq!(hd.service.close_stale_resolved(&hd.admin, Utc::now()).await.unwrap(), 0);
}

// ===== Support levels =====

#[tokio::test]
async fn test_support_level_registry_rules() {
    print_test_header(
        "test_support_level_registry_rules",
        &[
            "Codes are unique and active sort orders do not collide",
            "Levels in use by active agents cannot be deactivated",
        ],
    );
    let hd = TestHelpdesk::new().await;

    let err = hd
        .service
        .create_support_level(&hd.admin, new_level("L1", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Conflict { .. }));

    let err = hd
        .service
        .create_support_level(&hd.admin, new_level("L4", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Conflict { .. }));

    let err = hd
        .service
        .create_support_level(&hd.admin, new_level("L 4", 4))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Validation { .. }));

    let err = hd
        .service
        .create_support_level(&hd.carol, new_level("L4", 4))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::PermissionDenied { .. }));

    let l4 = hd
        .service
        .create_support_level(&hd.admin, new_level("L4", 4))
        .await
        .unwrap();
    assert!(l4.is_active);

    let ticket = hd.open_ticket("Goes all the way up").await;
    for expected in ["L2", "L3", "L4"] {
        let t = hd
            .service
            .escalate_ticket(&hd.admin, ticket.id, None)
            .await
            .unwrap();
        assert_eq!(t.level.code, expected);
    }

    let err = hd
        .service
        .deactivate_support_level(&hd.admin, hd.l1.id)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Conflict { .. }));

    let retired = hd
        .service
        .deactivate_support_level(&hd.admin, l4.id)
        .await
        .unwrap();
    assert!(!retired.is_active);

    let renamed = hd
        .service
        .update_support_level(
            &hd.admin,
            hd.l2.id,
            SupportLevelUpdate {
                name: Some("  Specialists ".to_string()),
                ..SupportLevelUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Specialists");

    let err = hd
        .service
        .update_support_level(
            &hd.admin,
            hd.l2.id,
            SupportLevelUpdate {
                sort_order: Some(3),
                ..SupportLevelUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Conflict { .. }));

    let codes: Vec<String> = hd
        .service
        .list_support_levels()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect();
    assert_eq!(codes, vec!["L1", "L2", "L3", "L4"]);
}

// ===== SLA configs =====

#[tokio::test]
async fn test_sla_config_upsert() {
    print_test_header(
        "test_sla_config_upsert",
        &["One row per priority; new targets apply to tickets created afterwards"],
    );
    let hd = TestHelpdesk::new().await;
    let original_high = hd
        .service
        .list_sla_configs()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.priority == Priority::High)
        .unwrap();

    let err = hd
        .service
        .upsert_sla_config(&hd.admin, Priority::Low, 0, true)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Validation { .. }));

    let err = hd
        .service
        .upsert_sla_config(&hd.dave, Priority::Low, 72, true)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::PermissionDenied { .. }));

    let updated = hd
        .service
        .upsert_sla_config(&hd.admin, Priority::High, 12, true)
        .await
        .unwrap();
    assert_eq!(updated.id, original_high.id);
    assert_eq!(updated.created_at, original_high.created_at);
    assert_eq!(updated.duration_hrs, 12);

    hd.service
        .upsert_sla_config(&hd.admin, Priority::Low, 72, true)
        .await
        .unwrap();
    assert_eq!(hd.service.list_sla_configs().await.unwrap().len(), 3);

    let before = Utc::now();
    let ticket = hd
        .service
        .create_ticket(&hd.admin, hd.new_ticket("Font request", Some(Priority::Low)))
        .await
        .unwrap();
    let due = ticket.due_date.expect("low priority now has an SLA");
    assert!(due >= before + Duration::hours(72));
    assert!(due <= Utc::now() + Duration::hours(72));
}

// ===== Categories =====

#[tokio::test]
async fn test_categories() {
    print_test_header(
        "test_categories",
        &["Admins add categories; inactive categories cannot be used for new tickets"],
    );
    let hd = TestHelpdesk::new().await;

    let network = hd
        .service
        .create_category(&hd.admin, " Network ".to_string(), Some("LAN and VPN".to_string()))
        .await
        .unwrap();
    assert_eq!(network.name, "Network");
    assert_eq!(hd.service.list_categories().await.unwrap().len(), 2);

    let err = hd
        .service
        .create_category(&hd.admin, "   ".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Validation { .. }));

    let err = hd
        .service
        .create_category(&hd.bob, "Hardware".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::PermissionDenied { .. }));

    let mut retired = network.clone();
    retired.is_active = false;
    hd.categories.insert(retired);

    let mut input = hd.new_ticket("Switch down", None);
    input.category_id = Some(network.id);
    let err = hd
        .service
        .create_ticket(&hd.admin, input)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::Validation { .. }));

    let mut input = hd.new_ticket("Unknown category", None);
    input.category_id = Some(Uuid::new_v4());
    let err = hd
        .service
        .create_ticket(&hd.admin, input)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}
