use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use datamesh_core::{AccountId, AppError, AppResult, SessionCredentials};
use datamesh_domain::{
    AssumeRoleDocument, DATA_MESH_IAM_PATH, SubscriptionRecord, SubscriptionRequest,
};

use crate::{
    CallerIdentity, CreateOutcome, IamGateway, IdentityGateway, NewGroup, NewPolicy, NewRole,
    NewUser, PolicyTemplateRenderer, RoleRecord, SubscriptionTracker, SubscriptionTrackerFactory,
    TemplateConfig, TrackerSession,
};

pub(crate) fn account(value: &str) -> AccountId {
    match AccountId::new(value) {
        Ok(account) => account,
        Err(error) => panic!("fixture account id rejected: {error}"),
    }
}

#[derive(Default)]
pub(crate) struct FakeIamState {
    pub(crate) roles: HashMap<String, RoleRecord>,
    pub(crate) users: HashMap<String, String>,
    pub(crate) groups: HashMap<String, String>,
    pub(crate) group_members: Vec<(String, String)>,
    pub(crate) policies: HashMap<String, (String, NewPolicy)>,
    pub(crate) role_policies: Vec<(String, String)>,
    pub(crate) group_policies: Vec<(String, String)>,
    pub(crate) trust_updates: u32,
    pub(crate) user_reads: u32,
    pub(crate) hidden_user_reads: u32,
}

pub(crate) struct FakeIamGateway {
    account_id: String,
    pub(crate) state: Mutex<FakeIamState>,
}

impl FakeIamGateway {
    pub(crate) fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_owned(),
            state: Mutex::new(FakeIamState::default()),
        }
    }

    /// New users stay invisible for the first `reads` lookups.
    pub(crate) async fn hide_new_users_for(&self, reads: u32) {
        self.state.lock().await.hidden_user_reads = reads;
    }

    pub(crate) async fn insert_role(&self, role_name: &str, trust_document: &str) {
        let arn = self.arn("role", role_name);
        self.state.lock().await.roles.insert(
            role_name.to_owned(),
            RoleRecord {
                role_name: role_name.to_owned(),
                arn,
                assume_role_policy_document: trust_document.to_owned(),
            },
        );
    }

    fn arn(&self, resource_type: &str, name: &str) -> String {
        format!(
            "arn:aws:iam::{}:{resource_type}{DATA_MESH_IAM_PATH}{name}",
            self.account_id
        )
    }
}

#[async_trait]
impl IamGateway for FakeIamGateway {
    async fn get_role(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.state.lock().await.roles.get(role_name).cloned())
    }

    async fn user_exists(&self, user_name: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        state.user_reads = state.user_reads.saturating_add(1);
        if state.hidden_user_reads > 0 {
            state.hidden_user_reads -= 1;
            return Ok(false);
        }
        Ok(state.users.contains_key(user_name))
    }

    async fn create_policy(&self, policy: NewPolicy) -> AppResult<CreateOutcome> {
        let arn = self.arn("policy", policy.name.as_str());
        let mut state = self.state.lock().await;
        if state.policies.contains_key(policy.name.as_str()) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        state
            .policies
            .insert(policy.name.clone(), (arn.clone(), policy));
        Ok(CreateOutcome::Created { arn })
    }

    async fn create_user(&self, user: NewUser) -> AppResult<CreateOutcome> {
        let arn = self.arn("user", user.name.as_str());
        let mut state = self.state.lock().await;
        if state.users.contains_key(user.name.as_str()) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        state.users.insert(user.name, arn.clone());
        Ok(CreateOutcome::Created { arn })
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<CreateOutcome> {
        let arn = self.arn("group", group.name.as_str());
        let mut state = self.state.lock().await;
        if state.groups.contains_key(group.name.as_str()) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        state.groups.insert(group.name, arn.clone());
        Ok(CreateOutcome::Created { arn })
    }

    async fn add_user_to_group(&self, group_name: &str, user_name: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.groups.contains_key(group_name) || !state.users.contains_key(user_name) {
            return Err(AppError::NotFound(format!(
                "cannot add '{user_name}' to '{group_name}'"
            )));
        }
        let membership = (group_name.to_owned(), user_name.to_owned());
        if !state.group_members.contains(&membership) {
            state.group_members.push(membership);
        }
        Ok(())
    }

    async fn create_role(&self, role: NewRole) -> AppResult<CreateOutcome> {
        let arn = self.arn("role", role.name.as_str());
        let document = role.assume_role_policy_document.to_json()?;
        let mut state = self.state.lock().await;
        if state.roles.contains_key(role.name.as_str()) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        state.roles.insert(
            role.name.clone(),
            RoleRecord {
                role_name: role.name,
                arn: arn.clone(),
                assume_role_policy_document: document,
            },
        );
        Ok(CreateOutcome::Created { arn })
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let attachment = (role_name.to_owned(), policy_arn.to_owned());
        if !state.role_policies.contains(&attachment) {
            state.role_policies.push(attachment);
        }
        Ok(())
    }

    async fn attach_group_policy(&self, group_name: &str, policy_arn: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let attachment = (group_name.to_owned(), policy_arn.to_owned());
        if !state.group_policies.contains(&attachment) {
            state.group_policies.push(attachment);
        }
        Ok(())
    }

    async fn update_assume_role_policy(
        &self,
        role_name: &str,
        document: &AssumeRoleDocument,
    ) -> AppResult<()> {
        let serialized = document.to_json()?;
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))?;
        role.assume_role_policy_document = serialized;
        state.trust_updates = state.trust_updates.saturating_add(1);
        Ok(())
    }
}

/// Renders templates by substituting `{{key}}` from a fixed in-memory set.
#[derive(Default)]
pub(crate) struct FakeTemplateRenderer {
    templates: HashMap<String, String>,
}

impl FakeTemplateRenderer {
    pub(crate) fn with_template(mut self, name: &str, body: &str) -> Self {
        self.templates.insert(name.to_owned(), body.to_owned());
        self
    }
}

impl PolicyTemplateRenderer for FakeTemplateRenderer {
    fn render(&self, template_file: &str, config: &TemplateConfig) -> AppResult<String> {
        let template = self.templates.get(template_file).ok_or_else(|| {
            AppError::NotFound(format!("policy template '{template_file}' does not exist"))
        })?;

        Ok(config.iter().fold(template.clone(), |rendered, (key, value)| {
            rendered.replace(format!("{{{{{key}}}}}").as_str(), value.as_str())
        }))
    }
}

pub(crate) struct FakeIdentityGateway {
    identity: CallerIdentity,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeIdentityGateway {
    pub(crate) fn new(account_id: &str) -> Self {
        Self {
            identity: CallerIdentity {
                account_id: account(account_id),
                arn: format!("arn:aws:iam::{account_id}:user/admin"),
                user_id: "AIDAEXAMPLE".to_owned(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IdentityGateway for FakeIdentityGateway {
    async fn caller_identity(&self) -> AppResult<CallerIdentity> {
        self.calls.lock().await.push("get_caller_identity".to_owned());
        Ok(self.identity.clone())
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AppResult<SessionCredentials> {
        self.calls
            .lock()
            .await
            .push(format!("assume_role:{role_arn}:{session_name}"));
        SessionCredentials::new("ASIAEXAMPLE", "secret", Some("session-token".to_owned()))
    }
}

#[derive(Default)]
pub(crate) struct FakeSubscriptionTracker {
    records: Mutex<HashMap<String, SubscriptionRecord>>,
}

#[async_trait]
impl SubscriptionTracker for FakeSubscriptionTracker {
    async fn create_subscription_request(&self, request: SubscriptionRequest) -> AppResult<String> {
        let mut records = self.records.lock().await;
        let subscription_id = format!("sub-{}", records.len() + 1);
        records.insert(
            subscription_id.clone(),
            SubscriptionRecord::pending(subscription_id.as_str(), request, Utc::now()),
        );
        Ok(subscription_id)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        Ok(self.records.lock().await.get(subscription_id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct FakeSubscriptionTrackerFactory {
    tracker: Arc<FakeSubscriptionTracker>,
    pub(crate) sessions: Mutex<Vec<TrackerSession>>,
}

#[async_trait]
impl SubscriptionTrackerFactory for FakeSubscriptionTrackerFactory {
    async fn connect(&self, session: TrackerSession) -> AppResult<Arc<dyn SubscriptionTracker>> {
        self.sessions.lock().await.push(session);
        Ok(self.tracker.clone())
    }
}
