//! Members service

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member, UpdateMember},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_member(&self, member: CreateMember) -> AppResult<Member> {
        let created = self.repository.members.create(&member).await?;
        tracing::info!("Created member {} ({})", created.id, created.full_name());
        Ok(created)
    }

    pub async fn get_member(&self, id: i64) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    pub async fn update_member(&self, id: i64, changes: UpdateMember) -> AppResult<Member> {
        let updated = self.repository.members.update(id, changes).await?;
        tracing::info!("Updated member {}", id);
        Ok(updated)
    }

    /// Delete a member. Members with loan history cannot be deleted.
    pub async fn delete_member(&self, id: i64) -> AppResult<()> {
        self.repository.members.delete(id).await?;
        tracing::info!("Deleted member {}", id);
        Ok(())
    }
}
