//! Explicit application context.
//!
//! The context carries the state the rendering and reporting layers need on
//! every call: the signed-in principal, the category lookup lists, the
//! compliance cycle and the threshold policy. It is loaded once at start,
//! refreshed after administrative edits, and cleared on logout; nothing in
//! the crate reads this state from module-level globals.

use crate::error::CmeResult;
use crate::model::{ComplianceCycle, CompliancePolicy, Department, Title, User};
use crate::report::{ReportContext, TimeFilter};
use crate::repository::{CategoryRepository, SettingsRepository};
use crate::storage::DocumentStore;
use chrono::NaiveDate;
use log::{debug, info};

/// Per-session application state.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    principal: Option<User>,
    departments: Vec<Department>,
    titles: Vec<Title>,
    cycle: ComplianceCycle,
    policy: CompliancePolicy,
}

impl AppContext {
    /// Fetch lookup lists and settings from the store. No principal is
    /// signed in yet.
    pub async fn load<S: DocumentStore>(
        categories: &CategoryRepository<S>,
        settings: &SettingsRepository<S>,
    ) -> CmeResult<Self> {
        let departments = categories.list_departments().await?;
        let titles = categories.list_titles().await?;
        let cycle = settings.cycle().await?;
        debug!(
            "context loaded: {} departments, {} titles, cycle {}-{}",
            departments.len(),
            titles.len(),
            cycle.start_year,
            cycle.end_year
        );
        Ok(Self {
            principal: None,
            departments,
            titles,
            cycle,
            policy: CompliancePolicy::default(),
        })
    }

    /// Re-fetch lookup lists and settings after an administrative edit,
    /// keeping the signed-in principal.
    pub async fn refresh<S: DocumentStore>(
        &mut self,
        categories: &CategoryRepository<S>,
        settings: &SettingsRepository<S>,
    ) -> CmeResult<()> {
        self.departments = categories.list_departments().await?;
        self.titles = categories.list_titles().await?;
        self.cycle = settings.cycle().await?;
        Ok(())
    }

    /// Record a successful sign-in.
    pub fn sign_in(&mut self, user: User) {
        info!("session started for '{}'", user.username);
        self.principal = Some(user);
    }

    /// Drop the principal and cached lookups. The next session starts from
    /// a fresh [`AppContext::load`].
    pub fn clear(&mut self) {
        if let Some(user) = self.principal.take() {
            info!("session ended for '{}'", user.username);
        }
        self.departments.clear();
        self.titles.clear();
        self.cycle = ComplianceCycle::default();
    }

    /// The signed-in principal, if any.
    pub fn principal(&self) -> Option<&User> {
        self.principal.as_ref()
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn cycle(&self) -> ComplianceCycle {
        self.cycle
    }

    pub fn policy(&self) -> &CompliancePolicy {
        &self.policy
    }

    /// Resolve a department id to its display name.
    pub fn department_name(&self, id: &str) -> Option<&str> {
        self.departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.as_str())
    }

    /// Resolve a title id to its display name.
    pub fn title_name(&self, id: &str) -> Option<&str> {
        self.titles
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    /// Borrow the lookup lists and policy for materialization.
    pub fn report_context(&self) -> ReportContext<'_> {
        ReportContext {
            departments: &self.departments,
            titles: &self.titles,
            policy: &self.policy,
        }
    }

    /// The time window covering the whole compliance cycle.
    pub fn cycle_filter(&self) -> TimeFilter {
        TimeFilter::Range {
            start: NaiveDate::from_ymd_opt(self.cycle.start_year, 1, 1),
            end: NaiveDate::from_ymd_opt(self.cycle.end_year, 12, 31),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, Role};
    use crate::storage::InMemoryStore;

    #[tokio::test]
    async fn test_load_refresh_clear_lifecycle() {
        let store = InMemoryStore::new();
        let categories = CategoryRepository::new(store.clone());
        let settings = SettingsRepository::new(store.clone());

        let mut context = AppContext::load(&categories, &settings).await.unwrap();
        assert!(context.principal().is_none());
        assert!(context.departments().is_empty());
        assert_eq!(context.cycle(), ComplianceCycle::default());

        categories
            .save_department(&Department::new("Khoa Nội"))
            .await
            .unwrap();
        context.refresh(&categories, &settings).await.unwrap();
        assert_eq!(context.departments().len(), 1);

        let user = User::new(
            NewUser {
                username: "an".into(),
                display_name: "Nguyễn Văn An".into(),
                password: "unused".into(),
                role: Role::Staff,
                department_id: None,
                title_id: None,
            },
            "hash".into(),
        );
        context.sign_in(user);
        assert!(context.principal().is_some());

        context.clear();
        assert!(context.principal().is_none());
        assert!(context.departments().is_empty());
    }

    #[tokio::test]
    async fn test_name_resolution() {
        let store = InMemoryStore::new();
        let categories = CategoryRepository::new(store.clone());
        let settings = SettingsRepository::new(store.clone());
        let department = Department::new("Khoa Dược");
        categories.save_department(&department).await.unwrap();

        let context = AppContext::load(&categories, &settings).await.unwrap();
        assert_eq!(context.department_name(&department.id), Some("Khoa Dược"));
        assert_eq!(context.department_name("missing"), None);
    }

    #[tokio::test]
    async fn test_cycle_filter_covers_whole_years() {
        let store = InMemoryStore::new();
        let categories = CategoryRepository::new(store.clone());
        let settings = SettingsRepository::new(store.clone());
        settings
            .set_cycle(ComplianceCycle {
                start_year: 2022,
                end_year: 2023,
            })
            .await
            .unwrap();

        let context = AppContext::load(&categories, &settings).await.unwrap();
        assert_eq!(
            context.cycle_filter(),
            TimeFilter::Range {
                start: NaiveDate::from_ymd_opt(2022, 1, 1),
                end: NaiveDate::from_ymd_opt(2023, 12, 31),
            }
        );
    }
}
