//! Associations, the position hierarchy and delete semantics

mod common;

use circulation_server::{error::AppError, models::position::UpdateEmployee};
use common::*;

async fn link_count(ctx: &TestContext, table: &str, item_id: i64) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE item_id = ?", table))
        .bind(item_id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_link_author_is_idempotent() {
    let ctx = setup().await;
    let dune = item(&ctx, "Dune").await;
    let herbert = author(&ctx, "Frank", "Herbert").await;

    ctx.services.catalog.link_author(dune.id, herbert.id).await.unwrap();
    ctx.services.catalog.link_author(dune.id, herbert.id).await.unwrap();

    assert_eq!(link_count(&ctx, "items_authors", dune.id).await, 1);
}

#[tokio::test]
async fn test_link_genre_is_idempotent() {
    let ctx = setup().await;
    let dune = item(&ctx, "Dune").await;
    let scifi = genre(&ctx, "Science fiction").await;

    ctx.services.catalog.link_genre(dune.id, scifi.id).await.unwrap();
    ctx.services.catalog.link_genre(dune.id, scifi.id).await.unwrap();

    assert_eq!(link_count(&ctx, "items_genres", dune.id).await, 1);
}

#[tokio::test]
async fn test_link_requires_both_endpoints() {
    let ctx = setup().await;
    let dune = item(&ctx, "Dune").await;
    let herbert = author(&ctx, "Frank", "Herbert").await;

    let err = ctx.services.catalog.link_author(dune.id, 999).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
    let err = ctx.services.catalog.link_author(999, herbert.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
    let err = ctx.services.catalog.link_genre(dune.id, 999).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
}

#[tokio::test]
async fn test_unlink_removes_only_the_link() {
    let ctx = setup().await;
    let dune = item(&ctx, "Dune").await;
    let herbert = author(&ctx, "Frank", "Herbert").await;
    ctx.services.catalog.link_author(dune.id, herbert.id).await.unwrap();

    ctx.services.catalog.unlink_author(dune.id, herbert.id).await.unwrap();
    assert_eq!(link_count(&ctx, "items_authors", dune.id).await, 0);
    assert!(ctx.services.catalog.get_item(dune.id).await.is_ok());
    assert!(ctx.services.catalog.get_author(herbert.id).await.is_ok());

    // Unlinking a missing pair is a no-op
    ctx.services.catalog.unlink_author(dune.id, herbert.id).await.unwrap();
    ctx.services.catalog.unlink_genre(dune.id, 5).await.unwrap();
}

#[tokio::test]
async fn test_item_details_keep_author_link_order() {
    let ctx = setup().await;
    let omens = item(&ctx, "Good Omens").await;
    let pratchett = author(&ctx, "Terry", "Pratchett").await;
    let gaiman = author(&ctx, "Neil", "Gaiman").await;

    ctx.services.catalog.link_author(omens.id, pratchett.id).await.unwrap();
    ctx.services.catalog.link_author(omens.id, gaiman.id).await.unwrap();
    label(&ctx, omens.id).await;

    let details = ctx.services.catalog.get_item_details(omens.id).await.unwrap();
    let names: Vec<&str> = details.authors.iter().map(|a| a.last_name.as_str()).collect();
    assert_eq!(names, vec!["Pratchett", "Gaiman"]);
    assert_eq!(details.labels.len(), 1);
    assert!(details.genres.is_empty());
}

#[tokio::test]
async fn test_delete_author_removes_links_not_items() {
    let ctx = setup().await;
    let dune = item(&ctx, "Dune").await;
    let herbert = author(&ctx, "Frank", "Herbert").await;
    ctx.services.catalog.link_author(dune.id, herbert.id).await.unwrap();

    ctx.services.catalog.delete_author(herbert.id).await.unwrap();

    assert_eq!(link_count(&ctx, "items_authors", dune.id).await, 0);
    assert!(ctx.services.catalog.get_item(dune.id).await.is_ok());
    let err = ctx.services.catalog.get_author(herbert.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_item_cascades_to_labels() {
    let ctx = setup().await;
    let dune = item(&ctx, "Dune").await;
    let first = label(&ctx, dune.id).await;
    label(&ctx, dune.id).await;
    let scifi = genre(&ctx, "Science fiction").await;
    ctx.services.catalog.link_genre(dune.id, scifi.id).await.unwrap();

    ctx.services.catalog.delete_item(dune.id).await.unwrap();

    let err = ctx.services.catalog.get_label(first.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(link_count(&ctx, "items_genres", dune.id).await, 0);
    assert!(ctx.services.catalog.get_genre(scifi.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_item_with_loan_history_fails() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;
    let loan = lend(&ctx, &c).await;
    ctx.services
        .loans
        .return_loan(loan.id, Some(date(2024, 3, 5)))
        .await
        .unwrap();

    let err = ctx.services.catalog.delete_item(c.item.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
    assert!(ctx.services.catalog.get_label(c.label.id).await.is_ok());
}

#[tokio::test]
async fn test_retire_label() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;
    let spare = label(&ctx, c.item.id).await;

    ctx.services.catalog.delete_label(spare.id).await.unwrap();
    assert!(ctx.services.catalog.get_label(spare.id).await.is_err());

    lend(&ctx, &c).await;
    let err = ctx.services.catalog.delete_label(c.label.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
}

#[tokio::test]
async fn test_delete_member_or_employee_with_loans_fails() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;
    lend(&ctx, &c).await;

    let err = ctx.services.members.delete_member(c.member.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
    let err = ctx.services.staff.delete_employee(c.employee.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    let idle = member(&ctx, None).await;
    ctx.services.members.delete_member(idle.id).await.unwrap();
    let err = ctx.services.members.delete_member(idle.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_position_requires_reassignment() {
    let ctx = setup().await;
    let head = position(&ctx, "Head Librarian", None).await;
    let clerk = position(&ctx, "Clerk", Some(head.id)).await;
    let employee = ctx
        .services
        .staff
        .create_employee(new_employee(clerk.id, None))
        .await
        .unwrap();

    // Subordinate position
    let err = ctx.services.staff.delete_position(head.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    // Held by an employee
    let err = ctx.services.staff.delete_position(clerk.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    let moved = ctx
        .services
        .staff
        .update_employee(
            employee.id,
            UpdateEmployee {
                position_id: Some(head.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.position_id, head.id);

    ctx.services.staff.delete_position(clerk.id).await.unwrap();
    let err = ctx.services.staff.get_position(clerk.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_manager_cycle_is_rejected() {
    let ctx = setup().await;
    let a = position(&ctx, "A", None).await;
    let b = position(&ctx, "B", None).await;

    ctx.services.staff.set_manager(a.id, Some(b.id)).await.unwrap();
    let err = ctx.services.staff.set_manager(b.id, Some(a.id)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::CycleDetected { position_id, manager_id } if position_id == b.id && manager_id == a.id
    ));

    // Nothing was written
    assert_eq!(ctx.services.staff.get_position(b.id).await.unwrap().manager_id, None);
}

#[tokio::test]
async fn test_manager_cycle_through_descendants_and_self() {
    let ctx = setup().await;
    let a = position(&ctx, "A", None).await;
    let b = position(&ctx, "B", Some(a.id)).await;
    let c = position(&ctx, "C", Some(b.id)).await;

    let err = ctx.services.staff.set_manager(a.id, Some(c.id)).await.unwrap_err();
    assert!(matches!(err, AppError::CycleDetected { .. }));

    let err = ctx.services.staff.set_manager(a.id, Some(a.id)).await.unwrap_err();
    assert!(matches!(err, AppError::CycleDetected { .. }));

    let err = ctx.services.staff.set_manager(a.id, Some(999)).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    // Clearing and re-pointing without a cycle is fine
    let cleared = ctx.services.staff.set_manager(c.id, None).await.unwrap();
    assert_eq!(cleared.manager_id, None);
    ctx.services.staff.set_manager(a.id, Some(c.id)).await.unwrap();
}

#[tokio::test]
async fn test_position_hierarchy() {
    let ctx = setup().await;
    let head = position(&ctx, "Head", None).await;
    let deputy = position(&ctx, "Deputy", Some(head.id)).await;
    let clerk = position(&ctx, "Clerk", Some(deputy.id)).await;
    let archivist = position(&ctx, "Archivist", Some(head.id)).await;
    let janitor = position(&ctx, "Janitor", None).await;

    let forest = ctx.services.staff.hierarchy().await.unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].position.id, head.id);
    assert_eq!(forest[1].position.id, janitor.id);

    let reports: Vec<i64> = forest[0].reports.iter().map(|n| n.position.id).collect();
    assert_eq!(reports, vec![deputy.id, archivist.id]);
    assert_eq!(forest[0].reports[0].reports[0].position.id, clerk.id);
}

#[tokio::test]
async fn test_stored_cycle_is_reported_by_hierarchy() {
    let ctx = setup().await;
    let a = position(&ctx, "A", None).await;
    let b = position(&ctx, "B", Some(a.id)).await;

    sqlx::query("UPDATE positions SET manager_id = ? WHERE id = ?")
        .bind(b.id)
        .bind(a.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let err = ctx.services.staff.hierarchy().await.unwrap_err();
    assert!(matches!(err, AppError::DataIntegrity(_)));
}
