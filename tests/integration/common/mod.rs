//! Shared fixtures: a fresh in-memory database per test

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};
use tempfile::TempDir;

use circulation_server::{
    config::DatabaseConfig,
    db,
    models::{
        author::{Author, CreateAuthor, CreateGenre, Genre},
        item::{CreateItem, Item, Label},
        loan::{CreateLoan, Loan},
        member::{CreateMember, Member},
        position::{CreateEmployee, CreatePosition, Employee, Position},
    },
    repository::Repository,
    services::Services,
};

pub struct TestContext {
    pub pool: Pool<Sqlite>,
    pub services: Services,
    _dir: Option<TempDir>,
}

async fn open(config: &DatabaseConfig, dir: Option<TempDir>) -> TestContext {
    let pool = db::connect(config).await.unwrap();
    db::migrate(&pool).await.unwrap();
    let services = Services::new(Repository::new(pool.clone()));
    TestContext {
        pool,
        services,
        _dir: dir,
    }
}

pub async fn setup() -> TestContext {
    open(&DatabaseConfig::in_memory(), None).await
}

/// A database file in a fresh temp dir, shared by `connections` connections
pub async fn setup_on_disk(connections: u32) -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("circulation.db").display()),
        max_connections: connections,
        min_connections: 1,
        busy_timeout_secs: 30,
    };
    open(&config, Some(dir)).await
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Run raw SQL with foreign keys disabled, to plant inconsistent state
pub async fn raw_without_fk(pool: &Pool<Sqlite>, sql: &str) {
    sqlx::query("PRAGMA foreign_keys = OFF").execute(pool).await.unwrap();
    sqlx::query(sql).execute(pool).await.unwrap();
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await.unwrap();
}

pub fn new_member(email: Option<&str>) -> CreateMember {
    CreateMember {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.map(str::to_string),
        phone_number: "555-0100".to_string(),
        contact_address: Some("12 St James's Square".to_string()),
        add_date: date(2024, 1, 10),
    }
}

pub fn new_position(title: &str, manager_id: Option<i64>) -> CreatePosition {
    CreatePosition {
        title: title.to_string(),
        salary: Decimal::new(250_000, 2),
        manager_id,
    }
}

pub fn new_employee(position_id: i64, email: Option<&str>) -> CreateEmployee {
    CreateEmployee {
        position_id,
        first_name: "Melvil".to_string(),
        last_name: "Dewey".to_string(),
        birthdate: date(1990, 12, 10),
        email: email.map(str::to_string),
        phone_number: "555-0199".to_string(),
        contact_address: "1 Library Lane".to_string(),
        permanent_address: None,
        hired_date: date(2020, 9, 1),
        hired_until: None,
        insurance: Some(true),
    }
}

pub fn new_item(title: &str, code: Option<&str>) -> CreateItem {
    CreateItem {
        title: title.to_string(),
        item_type: Some("Book".to_string()),
        code: code.map(str::to_string),
        pages: Some(320),
        ..Default::default()
    }
}

pub async fn author(ctx: &TestContext, first: &str, last: &str) -> Author {
    ctx.services
        .catalog
        .create_author(CreateAuthor {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthdate: None,
            nationality: None,
        })
        .await
        .unwrap()
}

pub async fn genre(ctx: &TestContext, name: &str) -> Genre {
    ctx.services
        .catalog
        .create_genre(CreateGenre { name: name.to_string() })
        .await
        .unwrap()
}

pub async fn member(ctx: &TestContext, email: Option<&str>) -> Member {
    ctx.services.members.create_member(new_member(email)).await.unwrap()
}

pub async fn position(ctx: &TestContext, title: &str, manager_id: Option<i64>) -> Position {
    ctx.services
        .staff
        .create_position(new_position(title, manager_id))
        .await
        .unwrap()
}

pub async fn employee(ctx: &TestContext) -> Employee {
    let position = position(ctx, "Librarian", None).await;
    ctx.services
        .staff
        .create_employee(new_employee(position.id, None))
        .await
        .unwrap()
}

pub async fn item(ctx: &TestContext, title: &str) -> Item {
    ctx.services.catalog.create_item(new_item(title, None)).await.unwrap()
}

pub async fn label(ctx: &TestContext, item_id: i64) -> Label {
    ctx.services.catalog.create_label(item_id).await.unwrap()
}

pub fn new_loan(member_id: i64, employee_id: i64, label_id: i64) -> CreateLoan {
    CreateLoan {
        member_id,
        employee_id,
        label_id,
        loan_date: Some(date(2024, 3, 1)),
        due_date: date(2024, 3, 15),
        returned_date: None,
    }
}

/// Everything needed to lend one label
pub struct Circulation {
    pub member: Member,
    pub employee: Employee,
    pub item: Item,
    pub label: Label,
}

pub async fn circulation(ctx: &TestContext) -> Circulation {
    let member = member(ctx, Some("ada@example.org")).await;
    let employee = employee(ctx).await;
    let item = item(ctx, "Dune").await;
    let label = label(ctx, item.id).await;
    Circulation {
        member,
        employee,
        item,
        label,
    }
}

pub async fn lend(ctx: &TestContext, c: &Circulation) -> Loan {
    ctx.services
        .loans
        .create_loan(new_loan(c.member.id, c.employee.id, c.label.id))
        .await
        .unwrap()
}
