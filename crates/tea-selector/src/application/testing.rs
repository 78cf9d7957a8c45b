//! In-memory catalog service for view model tests

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    CatalogError, EntityId, Owner, OwnerTeas, Session, Tea, TeaOwners, TeaType, TypeTeas,
};
use crate::ports::CatalogApi;

pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "hunter2";

#[derive(Default)]
struct State {
    teas: Vec<Tea>,
    types: Vec<TeaType>,
    owners: Vec<Owner>,
    ownerships: Vec<OwnerTeas>,
    next_id: EntityId,
    calls: Vec<String>,
    fail_next: Option<CatalogError>,
    valid_token: Option<String>,
    password: String,
}

/// Behaves like the catalog service, including refusing to delete records
/// that are still referenced. Records every call it receives.
pub struct FakeCatalog {
    state: Mutex<State>,
}

fn refused(message: &str) -> CatalogError {
    CatalogError::Server {
        status: 500,
        body: serde_json::json!({ "error": message }).to_string(),
    }
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                password: TEST_PASSWORD.to_string(),
                ..State::default()
            }),
        }
    }

    pub fn with_teas(self, teas: Vec<Tea>) -> Self {
        self.lock().teas = teas;
        self
    }

    pub fn with_types(self, types: Vec<TeaType>) -> Self {
        self.lock().types = types;
        self
    }

    pub fn with_owners(self, owners: Vec<Owner>) -> Self {
        self.lock().owners = owners;
        self
    }

    pub fn with_ownerships(self, ownerships: Vec<OwnerTeas>) -> Self {
        {
            let mut state = self.lock();
            for o in &ownerships {
                if !state.owners.contains(&o.owner) {
                    state.owners.push(o.owner.clone());
                }
            }
            state.ownerships = ownerships;
        }
        self
    }

    /// Only this token passes `verify_session`; without it every token does
    pub fn with_valid_token(self, token: &str) -> Self {
        self.lock().valid_token = Some(token.to_string());
        self
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: CatalogError) {
        self.lock().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn password(&self) -> String {
        self.lock().password.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Record the call and hand back the state, or the injected failure
    fn begin(&self, call: &str) -> Result<MutexGuard<'_, State>, CatalogError> {
        let mut state = self.lock();
        state.calls.push(call.to_string());
        match state.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(state),
        }
    }
}

impl State {
    fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_teas(&self) -> Result<Vec<Tea>, CatalogError> {
        Ok(self.begin("list_teas")?.teas.clone())
    }

    async fn list_types(&self) -> Result<Vec<TeaType>, CatalogError> {
        Ok(self.begin("list_types")?.types.clone())
    }

    async fn list_owners(&self) -> Result<Vec<Owner>, CatalogError> {
        Ok(self.begin("list_owners")?.owners.clone())
    }

    async fn list_ownerships(&self) -> Result<Vec<OwnerTeas>, CatalogError> {
        let state = self.begin("list_ownerships")?;
        Ok(state
            .owners
            .iter()
            .map(|owner| {
                state
                    .ownerships
                    .iter()
                    .find(|o| o.owner.id == owner.id)
                    .cloned()
                    .unwrap_or_else(|| OwnerTeas::new(owner.clone(), Vec::new()))
            })
            .collect())
    }

    async fn list_types_with_teas(&self) -> Result<Vec<TypeTeas>, CatalogError> {
        let state = self.begin("list_types_with_teas")?;
        Ok(state
            .types
            .iter()
            .map(|t| TypeTeas {
                tea_type: t.clone(),
                teas: state
                    .teas
                    .iter()
                    .filter(|tea| tea.tea_type.id == t.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn list_teas_with_owners(&self) -> Result<Vec<TeaOwners>, CatalogError> {
        let state = self.begin("list_teas_with_owners")?;
        Ok(state
            .teas
            .iter()
            .map(|tea| TeaOwners {
                tea: tea.clone(),
                owners: state
                    .ownerships
                    .iter()
                    .filter(|o| o.teas.iter().any(|t| t.id == tea.id))
                    .map(|o| o.owner.clone())
                    .collect(),
            })
            .collect())
    }

    async fn create_tea(&self, name: &str, type_id: EntityId) -> Result<Tea, CatalogError> {
        let mut state = self.begin("create_tea")?;
        let tea_type = state
            .types
            .iter()
            .find(|t| t.id == type_id)
            .cloned()
            .ok_or_else(|| refused("Tea type does not exist or is missing"))?;
        let tea = Tea::new(state.next_id(), name, tea_type);
        state.teas.push(tea.clone());
        Ok(tea)
    }

    async fn delete_tea(&self, id: EntityId) -> Result<(), CatalogError> {
        let mut state = self.begin("delete_tea")?;
        if state
            .ownerships
            .iter()
            .any(|o| o.teas.iter().any(|t| t.id == id))
        {
            return Err(refused("FOREIGN KEY constraint failed"));
        }
        state.teas.retain(|t| t.id != id);
        Ok(())
    }

    async fn create_type(&self, name: &str) -> Result<TeaType, CatalogError> {
        let mut state = self.begin("create_type")?;
        let tea_type = TeaType::new(state.next_id(), name);
        state.types.push(tea_type.clone());
        Ok(tea_type)
    }

    async fn delete_type(&self, id: EntityId) -> Result<(), CatalogError> {
        let mut state = self.begin("delete_type")?;
        if state.teas.iter().any(|t| t.tea_type.id == id) {
            return Err(refused("FOREIGN KEY constraint failed"));
        }
        state.types.retain(|t| t.id != id);
        Ok(())
    }

    async fn create_owner(&self, name: &str) -> Result<Owner, CatalogError> {
        let mut state = self.begin("create_owner")?;
        let owner = Owner::new(state.next_id(), name);
        state.owners.push(owner.clone());
        Ok(owner)
    }

    async fn delete_owner(&self, id: EntityId) -> Result<(), CatalogError> {
        let mut state = self.begin("delete_owner")?;
        if state
            .ownerships
            .iter()
            .any(|o| o.owner.id == id && !o.teas.is_empty())
        {
            return Err(refused("FOREIGN KEY constraint failed"));
        }
        state.owners.retain(|o| o.id != id);
        state.ownerships.retain(|o| o.owner.id != id);
        Ok(())
    }

    async fn add_ownership(
        &self,
        tea_id: EntityId,
        owner_id: EntityId,
    ) -> Result<Tea, CatalogError> {
        let mut state = self.begin("add_ownership")?;
        let tea = state.teas.iter().find(|t| t.id == tea_id).cloned();
        let owner = state.owners.iter().find(|o| o.id == owner_id).cloned();
        let (Some(tea), Some(owner)) = (tea, owner) else {
            return Err(refused(
                "Either the tea or owner ID do not exist in the database",
            ));
        };

        let index = match state.ownerships.iter().position(|o| o.owner.id == owner_id) {
            Some(index) => index,
            None => {
                state.ownerships.push(OwnerTeas::new(owner, Vec::new()));
                state.ownerships.len() - 1
            }
        };
        let entry = &mut state.ownerships[index];
        if entry.teas.iter().any(|t| t.id == tea_id) {
            return Err(refused("This relationship already exists"));
        }
        entry.teas.push(tea.clone());
        Ok(tea)
    }

    async fn remove_ownership(
        &self,
        tea_id: EntityId,
        owner_id: EntityId,
    ) -> Result<(), CatalogError> {
        let mut state = self.begin("remove_ownership")?;
        for o in state.ownerships.iter_mut().filter(|o| o.owner.id == owner_id) {
            o.teas.retain(|t| t.id != tea_id);
        }
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, CatalogError> {
        let state = self.begin("login")?;
        if username != TEST_USER {
            return Err(refused_bad_request("User doesn't exist"));
        }
        if password != state.password {
            return Err(refused_bad_request("Incorrect password"));
        }
        Ok(Session::new(
            state
                .valid_token
                .clone()
                .unwrap_or_else(|| format!("token-{username}")),
        ))
    }

    async fn change_password(&self, old: &str, new: &str) -> Result<(), CatalogError> {
        let mut state = self.begin("change_password")?;
        if old != state.password {
            return Err(refused_bad_request("Incorrect password"));
        }
        state.password = new.to_string();
        Ok(())
    }

    async fn verify_session(&self, session: &Session) -> Result<(), CatalogError> {
        let state = self.begin("verify_session")?;
        match &state.valid_token {
            Some(token) if token != session.token() => {
                Err(refused_bad_request("Not Authorized"))
            }
            _ => Ok(()),
        }
    }
}

fn refused_bad_request(message: &str) -> CatalogError {
    CatalogError::Server {
        status: 400,
        body: serde_json::json!({ "error": message }).to_string(),
    }
}
