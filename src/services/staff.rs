//! Staff service: the position hierarchy and employees

use std::collections::{HashMap, HashSet};

use crate::{
    error::{AppError, AppResult},
    models::position::{CreateEmployee, CreatePosition, Employee, Position, PositionNode, UpdateEmployee},
    repository::Repository,
    services::catalog::warn_integrity,
};

#[derive(Clone)]
pub struct StaffService {
    repository: Repository,
}

impl StaffService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // POSITIONS
    // =========================================================================

    pub async fn create_position(&self, position: CreatePosition) -> AppResult<Position> {
        let created = self.repository.staff.create_position(&position).await?;
        tracing::info!("Created position {} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn get_position(&self, id: i64) -> AppResult<Position> {
        self.repository.staff.get_position(id).await
    }

    /// Set or clear the manager of a position
    pub async fn set_manager(&self, id: i64, manager_id: Option<i64>) -> AppResult<Position> {
        let updated = self
            .repository
            .staff
            .set_manager(id, manager_id)
            .await
            .inspect_err(|e| {
                if let AppError::CycleDetected { .. } = e {
                    tracing::warn!("{}", e);
                }
            })?;

        match manager_id {
            Some(manager_id) => tracing::info!("Position {} now reports to {}", id, manager_id),
            None => tracing::info!("Position {} no longer has a manager", id),
        }
        Ok(updated)
    }

    pub async fn delete_position(&self, id: i64) -> AppResult<()> {
        self.repository.staff.delete_position(id).await?;
        tracing::info!("Deleted position {}", id);
        Ok(())
    }

    /// Every position arranged under its manager
    pub async fn hierarchy(&self) -> AppResult<Vec<PositionNode>> {
        let positions = self.repository.staff.list_positions().await?;
        build_forest(positions).inspect_err(warn_integrity)
    }

    // =========================================================================
    // EMPLOYEES
    // =========================================================================

    pub async fn create_employee(&self, employee: CreateEmployee) -> AppResult<Employee> {
        let created = self.repository.staff.create_employee(&employee).await?;
        tracing::info!(
            "Created employee {} in position {}",
            created.id,
            created.position_id
        );
        Ok(created)
    }

    pub async fn get_employee(&self, id: i64) -> AppResult<Employee> {
        self.repository.staff.get_employee(id).await
    }

    pub async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        self.repository.staff.list_employees().await
    }

    pub async fn update_employee(&self, id: i64, changes: UpdateEmployee) -> AppResult<Employee> {
        let updated = self.repository.staff.update_employee(id, changes).await?;
        tracing::info!("Updated employee {}", id);
        Ok(updated)
    }

    pub async fn delete_employee(&self, id: i64) -> AppResult<()> {
        self.repository.staff.delete_employee(id).await?;
        tracing::info!("Deleted employee {}", id);
        Ok(())
    }
}

/// Arrange positions into trees rooted at positions without a manager.
/// Children are ordered by id. A dangling manager reference or a position
/// unreachable from any root (a stored cycle) is a data integrity error.
pub fn build_forest(positions: Vec<Position>) -> AppResult<Vec<PositionNode>> {
    let ids: HashSet<i64> = positions.iter().map(|p| p.id).collect();
    let total = positions.len();

    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<Position>> = HashMap::new();
    for position in positions {
        match position.manager_id {
            None => roots.push(position),
            Some(manager_id) if ids.contains(&manager_id) => {
                children.entry(manager_id).or_default().push(position)
            }
            Some(manager_id) => {
                return Err(AppError::DataIntegrity(format!(
                    "Position {} reports to missing position {}",
                    position.id, manager_id
                )));
            }
        }
    }

    roots.sort_by_key(|p| p.id);
    for reports in children.values_mut() {
        reports.sort_by_key(|p| p.id);
    }

    let mut placed = 0;
    let forest: Vec<PositionNode> = roots
        .into_iter()
        .map(|root| attach(root, &mut children, &mut placed))
        .collect();

    if placed != total {
        return Err(AppError::DataIntegrity(format!(
            "{} position(s) are part of a management cycle",
            total - placed
        )));
    }

    Ok(forest)
}

fn attach(position: Position, children: &mut HashMap<i64, Vec<Position>>, placed: &mut usize) -> PositionNode {
    *placed += 1;
    let reports = children
        .remove(&position.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, children, placed))
        .collect();

    PositionNode { position, reports }
}
