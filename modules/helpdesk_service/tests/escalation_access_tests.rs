//! Integration tests for escalation, assignment and access control

mod common;

use common::{capabilities, level, print_test_header, TestHelpdesk};
use helpdesk_service::contract::*;
use helpdesk_service::domain::{NotificationKind, SupportLevelRepository};

fn denied(err: &HelpdeskError) -> Option<DeniedAction> {
    match err {
        HelpdeskError::PermissionDenied { action } => Some(*action),
        _ => None,
    }
}

#[tokio::test]
async fn test_escalation_walks_levels_until_terminal() {
    print_test_header(
        "test_escalation_walks_levels_until_terminal",
        &[
            "L1 -> L2 -> L3, each step clears the assignee",
            "Escalating past the highest active level is a TerminalState error",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Kernel panic").await;

    hd.service
        .assign_ticket(&hd.alice, ticket.id, Some(hd.alice.id), None)
        .await
        .unwrap();

    let at_l2 = hd
        .service
        .escalate_ticket(&hd.alice, ticket.id, Some("needs a specialist".to_string()))
        .await
        .unwrap();
    assert_eq!(at_l2.level.code, "L2");
    assert!(at_l2.assignee_id.is_none());

    let unassigned = hd.notifications.to_agent(hd.alice.id);
    assert_eq!(
        unassigned.last().map(|i| i.kind),
        Some(NotificationKind::Unassigned)
    );

    let at_l3 = hd
        .service
        .escalate_ticket(&hd.carol, ticket.id, None)
        .await
        .unwrap();
    assert_eq!(at_l3.level.code, "L3");
    assert!(at_l3.assignee_id.is_none());

    let err = hd
        .service
        .escalate_ticket(&hd.admin, ticket.id, None)
        .await
        .unwrap_err();
    println!("   Third escalation: {}", err);
    assert_eq!(
        err,
        HelpdeskError::TerminalState {
            level: "L3".to_string()
        }
    );

    let escalations: Vec<(Option<String>, Option<String>)> = hd
        .tickets
        .activities_of(ticket.id)
        .into_iter()
        .filter(|a| a.activity_type == ActivityType::Escalate)
        .map(|a| (a.old_value, a.new_value))
        .collect();
    assert_eq!(
        escalations,
        vec![
            (Some("L1".to_string()), Some("L2".to_string())),
            (Some("L2".to_string()), Some("L3".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_escalation_skips_inactive_levels() {
    print_test_header(
        "test_escalation_skips_inactive_levels",
        &["An inactive L2 is skipped, the ticket goes straight to L3"],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Disk failure").await;

    let mut retired = hd.l2.clone();
    retired.is_active = false;
    hd.levels.update(&retired).await.unwrap();

    let escalated = hd
        .service
        .escalate_ticket(&hd.admin, ticket.id, None)
        .await
        .unwrap();
    assert_eq!(escalated.level.code, "L3");
}

#[tokio::test]
async fn test_escalation_requires_capability() {
    print_test_header(
        "test_escalation_requires_capability",
        &[
            "L3 agents lack canEscalateTicket",
            "L1 agents cannot escalate tickets someone else is working on",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Escalation rights").await;

    let err = hd
        .service
        .escalate_ticket(&hd.dave, ticket.id, None)
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Escalate));

    hd.service
        .assign_ticket(&hd.admin, ticket.id, Some(hd.alice.id), None)
        .await
        .unwrap();
    let err = hd
        .service
        .escalate_ticket(&hd.bob, ticket.id, None)
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Escalate));
    assert_eq!(hd.tickets.get(ticket.id).unwrap().level.code, "L1");
}

#[tokio::test]
async fn test_visibility_follows_capabilities() {
    print_test_header(
        "test_visibility_follows_capabilities",
        &[
            "Own-only agents see tickets they created or are assigned to",
            "Team agents see tickets at or below their level, view-all sees everything",
            "A hidden ticket is reported as a View denial",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let mine = hd
        .service
        .create_ticket(&hd.alice, hd.new_ticket("VPN flaps", None))
        .await
        .unwrap();
    let other = hd.open_ticket("Mailbox full").await;
    let escalated = hd.open_ticket("Core switch").await;
    hd.service
        .escalate_ticket(&hd.admin, escalated.id, None)
        .await
        .unwrap();
    hd.service
        .escalate_ticket(&hd.admin, escalated.id, None)
        .await
        .unwrap();

    let everything = TicketFilter::default();
    let alice_sees = hd.service.list_tickets(&hd.alice, &everything).await.unwrap();
    assert_eq!(alice_sees.len(), 1);
    assert_eq!(alice_sees[0].id, mine.id);

    let carol_sees = hd.service.list_tickets(&hd.carol, &everything).await.unwrap();
    assert_eq!(carol_sees.len(), 2);
    assert!(carol_sees.iter().all(|t| t.id != escalated.id));

    let dave_sees = hd.service.list_tickets(&hd.dave, &everything).await.unwrap();
    assert_eq!(dave_sees.len(), 3);

    let err = hd.service.get_ticket(&hd.bob, other.id).await.unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::View));
    let err = hd
        .service
        .get_ticket(&hd.carol, escalated.id)
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::View));
    assert!(hd.service.get_ticket(&hd.dave, escalated.id).await.is_ok());

    let search = TicketFilter {
        search: Some("vpn".to_string()),
        ..TicketFilter::default()
    };
    let found = hd.service.list_tickets(&hd.admin, &search).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, mine.id);
}

#[tokio::test]
async fn test_assignment_rules_and_notifications() {
    print_test_header(
        "test_assignment_rules_and_notifications",
        &[
            "Agents without canAssignTicket may only claim unassigned tickets for themselves",
            "Reassignment notifies the new and the previous assignee",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Password reset").await;

    let err = hd
        .service
        .assign_ticket(&hd.bob, ticket.id, Some(hd.alice.id), None)
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Assign));

    let claimed = hd
        .service
        .assign_ticket(&hd.bob, ticket.id, Some(hd.bob.id), None)
        .await
        .unwrap();
    assert_eq!(claimed.assignee_id, Some(hd.bob.id));

    let err = hd
        .service
        .assign_ticket(&hd.alice, ticket.id, Some(hd.alice.id), None)
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Assign));

    hd.notifications.clear();
    let reassigned = hd
        .service
        .assign_ticket(
            &hd.carol,
            ticket.id,
            Some(hd.alice.id),
            Some("Bob is out today".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(reassigned.assignee_id, Some(hd.alice.id));

    let kinds_for = |id| {
        hd.notifications
            .to_agent(id)
            .iter()
            .map(|i| i.kind)
            .collect::<Vec<_>>()
    };
    assert_eq!(kinds_for(hd.alice.id), vec![NotificationKind::Assigned]);
    assert_eq!(kinds_for(hd.bob.id), vec![NotificationKind::Unassigned]);
    // The customer only hears about the first assignment
    assert_eq!(hd.notifications.of_kind(NotificationKind::Assigned).len(), 1);

    let last = hd.tickets.activities_of(ticket.id).pop().unwrap();
    assert_eq!(last.activity_type, ActivityType::Assign);
    assert_eq!(last.old_value.as_deref(), Some("Bob"));
    assert_eq!(last.new_value.as_deref(), Some("Alice"));
    assert!(last.description.contains("Bob is out today"));

    let same = hd
        .service
        .assign_ticket(&hd.carol, ticket.id, Some(hd.alice.id), None)
        .await
        .unwrap();
    assert_eq!(same.version, reassigned.version);
}

#[tokio::test]
async fn test_assign_to_inactive_actor_is_not_found() {
    print_test_header(
        "test_assign_to_inactive_actor_is_not_found",
        &["Inactive accounts cannot receive tickets or act"],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd.open_ticket("Offboarding").await;

    let mut gone = hd.add_actor("Gone", Role::Agent, &hd.l1);
    gone.is_active = false;
    hd.actors.insert(gone.clone());

    let err = hd
        .service
        .assign_ticket(&hd.admin, ticket.id, Some(gone.id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));

    let err = hd.service.resolve_actor(gone.id).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

#[tokio::test]
async fn test_mutation_and_creation_denials() {
    print_test_header(
        "test_mutation_and_creation_denials",
        &[
            "Only admins, assignees and creators mutate a ticket",
            "Levels without canCreateTicket cannot open tickets",
        ],
    );
    let hd = TestHelpdesk::new().await;
    let ticket = hd
        .service
        .create_ticket(&hd.alice, hd.new_ticket("Alice's ticket", None))
        .await
        .unwrap();

    let err = hd
        .service
        .update_ticket(
            &hd.bob,
            ticket.id,
            TicketUpdate {
                status: Some(TicketStatus::Resolved),
                ..TicketUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Mutate));

    let err = hd
        .service
        .add_note(&hd.bob, ticket.id, "sneaky".to_string(), vec![])
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Mutate));

    let updated = hd
        .service
        .update_ticket(
            &hd.alice,
            ticket.id,
            TicketUpdate {
                status: Some(TicketStatus::Pending),
                ..TicketUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TicketStatus::Pending);
    assert_eq!(
        hd.notifications.of_kind(NotificationKind::StatusChanged).len(),
        1
    );

    let mut read_only_caps = capabilities(false, false);
    read_only_caps.can_create_ticket = false;
    let read_only = level("RO", 90, read_only_caps);
    let viewer = hd.add_actor("Viewer", Role::Agent, &read_only);
    let err = hd
        .service
        .create_ticket(&viewer, hd.new_ticket("Not allowed", None))
        .await
        .unwrap_err();
    assert_eq!(denied(&err), Some(DeniedAction::Create));
}
