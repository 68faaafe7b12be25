//! Loan management service

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::loan::{ActiveLoan, CreateLoan, Loan},
    repository::Repository,
    rules,
    services::catalog::warn_integrity,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new loan (check a label out)
    pub async fn create_loan(&self, loan: CreateLoan) -> AppResult<Loan> {
        let created = self.repository.loans.create(&loan).await?;
        tracing::info!(
            "Loan {} created: label {} to member {} (due {})",
            created.id,
            created.label_id,
            created.member_id,
            created.due_date
        );
        Ok(created)
    }

    pub async fn get_loan(&self, id: i64) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Return a borrowed label; the return date defaults to today
    pub async fn return_loan(&self, id: i64, returned_date: Option<NaiveDate>) -> AppResult<Loan> {
        let returned_date = returned_date.unwrap_or_else(rules::today);
        let loan = self.repository.loans.return_loan(id, returned_date).await?;
        if loan.returned_date.is_some_and(|d| d > loan.due_date) {
            tracing::info!("Loan {} returned late on {}", id, returned_date);
        } else {
            tracing::info!("Loan {} returned on {}", id, returned_date);
        }
        Ok(loan)
    }

    /// Every open loan with item title and member name
    pub async fn active_loans(&self) -> AppResult<Vec<ActiveLoan>> {
        let loans = self.repository.loans.get_active().await.inspect_err(warn_integrity)?;
        tracing::debug!("{} active loan(s)", loans.len());
        Ok(loans)
    }

    pub async fn loan_history(&self, label_id: i64) -> AppResult<Vec<Loan>> {
        self.repository.items.get_label(label_id).await?;
        self.repository.loans.get_label_loans(label_id).await
    }
}
