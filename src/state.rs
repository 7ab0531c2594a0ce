use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::db;
use crate::services::admin::HolidayAdmin;
use crate::services::ai::{self, LlmProvider};
use crate::services::announcement::AnnouncementStore;
use crate::services::backend::ServiceCenter;
use crate::services::lookup::Suggestions;
use crate::services::payment::{PaymentGateway, SimulatedPayment};
use crate::services::session::SessionStore;
use crate::services::workflow::BookingWorkflow;

pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub announcements: AnnouncementStore,
    pub payment: Arc<dyn PaymentGateway>,
    pub llm: Box<dyn LlmProvider>,
}

impl AppState {
    /// Open the session database, restore any stored sign-in and build the
    /// backend client.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let conn = db::init_db(&config.session_db)?;
        let db = Arc::new(Mutex::new(conn));

        let api = Arc::new(
            ApiClient::new(config.api_base_url.clone(), config.request_timeout)
                .context("failed to build HTTP client")?,
        );
        let backend: Arc<dyn ServiceCenter> = api.clone();
        let session = Arc::new(SessionStore::new(backend, db));
        session.restore();

        let llm = ai::provider_from_config(&config)?;

        Ok(Self {
            api,
            session,
            announcements: AnnouncementStore::new(),
            payment: Arc::new(SimulatedPayment::default()),
            llm,
            config,
        })
    }

    pub fn backend(&self) -> Arc<dyn ServiceCenter> {
        self.api.clone()
    }

    pub fn workflow(&self) -> BookingWorkflow {
        BookingWorkflow::new(
            self.backend(),
            Arc::clone(&self.session),
            Arc::clone(&self.payment),
            self.announcements.clone(),
            &self.config,
        )
    }

    pub fn suggestions(&self) -> Suggestions {
        Suggestions::new(self.backend(), self.config.suggestion_debounce)
    }

    pub fn holiday_admin(&self) -> HolidayAdmin {
        HolidayAdmin::new(Arc::clone(&self.api), Arc::clone(&self.session))
    }
}
