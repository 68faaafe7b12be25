//! Rule engine behavior through the service layer

mod common;

use chrono::Duration;
use rust_decimal::Decimal;

use circulation_server::{
    error::AppError,
    models::{
        item::{CreateItem, LabelStatus, UpdateItem},
        loan::CreateLoan,
        member::UpdateMember,
        position::UpdateEmployee,
    },
    rules,
};
use common::*;

#[tokio::test]
async fn test_member_add_date_today_is_accepted() {
    let ctx = setup().await;
    let mut payload = new_member(None);
    payload.add_date = rules::today();

    let member = ctx.services.members.create_member(payload).await.unwrap();
    assert!(member.add_date <= rules::today());
}

#[tokio::test]
async fn test_member_add_date_in_future_fails() {
    let ctx = setup().await;
    let mut payload = new_member(None);
    payload.add_date = rules::today() + Duration::days(1);

    let err = ctx.services.members.create_member(payload).await.unwrap_err();
    assert_eq!(err.rule(), Some(rules::MEMBER_ADD_DATE_FUTURE));
    assert!(ctx.services.members.list_members().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_member_blank_name_fails() {
    let ctx = setup().await;
    let mut payload = new_member(None);
    payload.first_name = "  ".to_string();

    let err = ctx.services.members.create_member(payload).await.unwrap_err();
    assert_eq!(err.rule(), Some("member.first_name.required"));
}

#[tokio::test]
async fn test_member_invalid_email_fails() {
    let ctx = setup().await;
    let err = ctx
        .services
        .members
        .create_member(new_member(Some("not-an-email")))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("member.email.email"));
}

#[tokio::test]
async fn test_member_email_is_unique() {
    let ctx = setup().await;
    member(&ctx, Some("ada@example.org")).await;

    let err = ctx
        .services
        .members
        .create_member(new_member(Some("ada@example.org")))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::MEMBER_EMAIL_TAKEN));

    // Members without email never collide
    member(&ctx, None).await;
    member(&ctx, None).await;
}

#[tokio::test]
async fn test_member_update_rechecks_rules() {
    let ctx = setup().await;
    let ada = member(&ctx, Some("ada@example.org")).await;
    let other = member(&ctx, Some("other@example.org")).await;

    let err = ctx
        .services
        .members
        .update_member(
            other.id,
            UpdateMember {
                email: Some(Some("ada@example.org".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::MEMBER_EMAIL_TAKEN));

    let err = ctx
        .services
        .members
        .update_member(
            ada.id,
            UpdateMember {
                add_date: Some(rules::today() + Duration::days(3)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::MEMBER_ADD_DATE_FUTURE));

    // Keeping its own email is not a collision
    let updated = ctx
        .services
        .members
        .update_member(
            ada.id,
            UpdateMember {
                phone_number: Some("555-0101".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email.as_deref(), Some("ada@example.org"));
    assert_eq!(updated.phone_number, "555-0101");
}

#[tokio::test]
async fn test_released_email_can_be_taken() {
    let ctx = setup().await;
    let ada = member(&ctx, Some("ada@example.org")).await;
    let other = member(&ctx, None).await;

    let cleared = ctx
        .services
        .members
        .update_member(
            ada.id,
            UpdateMember {
                email: Some(None),
                contact_address: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.email, None);
    assert_eq!(cleared.contact_address, None);

    let moved = ctx
        .services
        .members
        .update_member(
            other.id,
            UpdateMember {
                email: Some(Some("ada@example.org".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.email.as_deref(), Some("ada@example.org"));
}

#[tokio::test]
async fn test_employee_contract_end_can_be_cleared() {
    let ctx = setup().await;
    let position = position(&ctx, "Librarian", None).await;
    let mut payload = new_employee(position.id, Some("melvil@example.org"));
    payload.hired_until = Some(date(2030, 6, 30));
    let employee = ctx.services.staff.create_employee(payload).await.unwrap();

    let updated = ctx
        .services
        .staff
        .update_employee(
            employee.id,
            UpdateEmployee {
                hired_until: Some(None),
                email: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.hired_until, None);
    assert_eq!(updated.email, None);
    assert_eq!(updated.contact_address, employee.contact_address);
}

#[tokio::test]
async fn test_update_missing_member_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .services
        .members
        .update_member(42, UpdateMember::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_employee_birthdate_must_be_past() {
    let ctx = setup().await;
    let position = position(&ctx, "Clerk", None).await;

    let mut today = new_employee(position.id, None);
    today.birthdate = rules::today();
    let err = ctx.services.staff.create_employee(today).await.unwrap_err();
    assert_eq!(err.rule(), Some(rules::EMPLOYEE_BIRTHDATE_NOT_PAST));

    let mut future = new_employee(position.id, None);
    future.birthdate = rules::today() + Duration::days(30);
    let err = ctx.services.staff.create_employee(future).await.unwrap_err();
    assert_eq!(err.rule(), Some(rules::EMPLOYEE_BIRTHDATE_NOT_PAST));

    let mut yesterday = new_employee(position.id, None);
    yesterday.birthdate = rules::today() - Duration::days(1);
    assert!(ctx.services.staff.create_employee(yesterday).await.is_ok());
}

#[tokio::test]
async fn test_employee_contract_end_before_hire_fails() {
    let ctx = setup().await;
    let position = position(&ctx, "Clerk", None).await;
    let mut payload = new_employee(position.id, None);
    payload.hired_until = Some(date(2019, 1, 1));

    let err = ctx.services.staff.create_employee(payload).await.unwrap_err();
    assert_eq!(err.rule(), Some(rules::EMPLOYEE_HIRED_UNTIL_BEFORE_HIRED));
}

#[tokio::test]
async fn test_employee_email_unique_and_position_required() {
    let ctx = setup().await;
    let position = position(&ctx, "Clerk", None).await;
    ctx.services
        .staff
        .create_employee(new_employee(position.id, Some("melvil@example.org")))
        .await
        .unwrap();

    let err = ctx
        .services
        .staff
        .create_employee(new_employee(position.id, Some("melvil@example.org")))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::EMPLOYEE_EMAIL_TAKEN));

    let err = ctx
        .services
        .staff
        .create_employee(new_employee(999, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
}

#[tokio::test]
async fn test_employee_update_rechecks_birthdate() {
    let ctx = setup().await;
    let employee = employee(&ctx).await;

    let err = ctx
        .services
        .staff
        .update_employee(
            employee.id,
            UpdateEmployee {
                birthdate: Some(rules::today()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::EMPLOYEE_BIRTHDATE_NOT_PAST));

    let stored = ctx.services.staff.get_employee(employee.id).await.unwrap();
    assert_eq!(stored.birthdate, employee.birthdate);
}

#[tokio::test]
async fn test_position_salary_rules() {
    let ctx = setup().await;
    let mut negative = new_position("Intern", None);
    negative.salary = Decimal::new(-1, 0);
    let err = ctx.services.staff.create_position(negative).await.unwrap_err();
    assert_eq!(err.rule(), Some(rules::POSITION_SALARY_NEGATIVE));

    let mut exact = new_position("Archivist", None);
    exact.salary = Decimal::new(123_456, 2);
    let stored = ctx.services.staff.create_position(exact).await.unwrap();
    assert_eq!(stored.salary, Decimal::new(123_456, 2));
    assert_eq!(
        ctx.services.staff.get_position(stored.id).await.unwrap().salary.to_string(),
        "1234.56"
    );
}

#[tokio::test]
async fn test_item_code_is_unique() {
    let ctx = setup().await;
    ctx.services
        .catalog
        .create_item(new_item("Dune", Some("D1")))
        .await
        .unwrap();

    let err = ctx
        .services
        .catalog
        .create_item(new_item("Dune Messiah", Some("D1")))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::ITEM_CODE_TAKEN));
}

#[tokio::test]
async fn test_item_field_rules() {
    let ctx = setup().await;

    let err = ctx
        .services
        .catalog
        .create_item(CreateItem {
            title: String::new(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("item.title.required"));

    let err = ctx
        .services
        .catalog
        .create_item(CreateItem {
            title: "Dune".to_string(),
            pages: Some(-3),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::ITEM_PAGES_NEGATIVE));

    let err = ctx
        .services
        .catalog
        .create_item(new_item("Dune", Some("CODE-LONGER-THAN-TWENTY")))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("item.code.length"));
}

#[tokio::test]
async fn test_item_update_code_collision() {
    let ctx = setup().await;
    ctx.services
        .catalog
        .create_item(new_item("Dune", Some("D1")))
        .await
        .unwrap();
    let other = ctx
        .services
        .catalog
        .create_item(new_item("Emma", Some("E1")))
        .await
        .unwrap();

    let err = ctx
        .services
        .catalog
        .update_item(
            other.id,
            UpdateItem {
                code: Some(Some("D1".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::ITEM_CODE_TAKEN));
}

#[tokio::test]
async fn test_loan_returned_before_loan_date_fails() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;

    let mut payload = new_loan(c.member.id, c.employee.id, c.label.id);
    payload.returned_date = Some(date(2024, 2, 28));
    let err = ctx.services.loans.create_loan(payload).await.unwrap_err();
    assert_eq!(err.rule(), Some(rules::LOAN_RETURNED_BEFORE_LOAN));

    let loan = lend(&ctx, &c).await;
    let err = ctx
        .services
        .loans
        .return_loan(loan.id, Some(date(2024, 2, 1)))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::LOAN_RETURNED_BEFORE_LOAN));

    // Failed return leaves the loan open and the label lent
    assert!(ctx.services.loans.get_loan(loan.id).await.unwrap().is_open());
    let label = ctx.services.catalog.get_label(c.label.id).await.unwrap();
    assert_eq!(label.status, LabelStatus::OnLoan);
}

#[tokio::test]
async fn test_loan_returned_same_day_and_late_are_legal() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;

    let loan = lend(&ctx, &c).await;
    let returned = ctx
        .services
        .loans
        .return_loan(loan.id, Some(date(2024, 6, 30)))
        .await
        .unwrap();
    assert!(returned.returned_date.unwrap() > returned.due_date);

    let mut same_day = new_loan(c.member.id, c.employee.id, c.label.id);
    same_day.loan_date = Some(date(2024, 7, 1));
    same_day.returned_date = Some(date(2024, 7, 1));
    let closed = ctx.services.loans.create_loan(same_day).await.unwrap();
    assert!(!closed.is_open());
}

#[tokio::test]
async fn test_loan_cannot_be_returned_twice() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;
    let loan = lend(&ctx, &c).await;

    ctx.services
        .loans
        .return_loan(loan.id, Some(date(2024, 3, 10)))
        .await
        .unwrap();
    let err = ctx
        .services
        .loans
        .return_loan(loan.id, Some(date(2024, 3, 11)))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::LOAN_ALREADY_RETURNED));
}

#[tokio::test]
async fn test_second_open_loan_on_label_fails() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;
    lend(&ctx, &c).await;

    let other = member(&ctx, Some("grace@example.org")).await;
    let err = ctx
        .services
        .loans
        .create_loan(new_loan(other.id, c.employee.id, c.label.id))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(rules::LOAN_LABEL_ON_LOAN));
}

#[tokio::test]
async fn test_open_loan_unique_index_backs_the_rule() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;
    lend(&ctx, &c).await;

    // Bypass the service to hit the partial unique index directly
    let err: AppError = sqlx::query(
        "INSERT INTO loans (member_id, employee_id, label_id, loan_date, due_date) VALUES (?, ?, ?, '2024-04-01', '2024-04-15')",
    )
    .bind(c.member.id)
    .bind(c.employee.id)
    .bind(c.label.id)
    .execute(&ctx.pool)
    .await
    .unwrap_err()
    .into();
    assert_eq!(err.rule(), Some(rules::LOAN_LABEL_ON_LOAN));
}

#[tokio::test]
async fn test_loan_references_must_exist() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;

    let cases = [
        new_loan(999, c.employee.id, c.label.id),
        new_loan(c.member.id, 999, c.label.id),
        new_loan(c.member.id, c.employee.id, 999),
    ];
    for payload in cases {
        let err = ctx.services.loans.create_loan(payload).await.unwrap_err();
        assert!(matches!(err, AppError::ReferentialIntegrity(_)), "{:?}", err);
    }
}

#[tokio::test]
async fn test_loan_date_defaults_to_today() {
    let ctx = setup().await;
    let c = circulation(&ctx).await;

    let loan = ctx
        .services
        .loans
        .create_loan(CreateLoan {
            loan_date: None,
            due_date: rules::today() + Duration::days(14),
            ..new_loan(c.member.id, c.employee.id, c.label.id)
        })
        .await
        .unwrap();
    assert_eq!(loan.loan_date, rules::today());
}

/// Split racing results into the winners and the rule names of the losers
fn tally<T>(results: Vec<Result<T, AppError>>) -> (usize, Vec<String>) {
    let mut won = 0;
    let mut lost = Vec::new();
    for result in results {
        match result {
            Ok(_) => won += 1,
            Err(AppError::ConstraintViolation { rule, .. }) => lost.push(rule),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    (won, lost)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_members_with_same_email() {
    let ctx = setup_on_disk(8).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let members = ctx.services.members.clone();
            tokio::spawn(async move { members.create_member(new_member(Some("ada@example.org"))).await })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let (won, lost) = tally(results);
    assert_eq!(won, 1);
    assert_eq!(lost.len(), 7);
    assert!(lost.iter().all(|rule| rule == rules::MEMBER_EMAIL_TAKEN));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loans_on_same_label() {
    let ctx = setup_on_disk(8).await;
    let c = circulation(&ctx).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loans = ctx.services.loans.clone();
            let payload = new_loan(c.member.id, c.employee.id, c.label.id);
            tokio::spawn(async move { loans.create_loan(payload).await })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let (won, lost) = tally(results);
    assert_eq!(won, 1);
    assert_eq!(lost.len(), 7);
    assert!(lost.iter().all(|rule| rule == rules::LOAN_LABEL_ON_LOAN));

    let label = ctx.services.catalog.get_label(c.label.id).await.unwrap();
    assert_eq!(label.status, LabelStatus::OnLoan);
    assert_eq!(ctx.services.loans.active_loans().await.unwrap().len(), 1);
}
