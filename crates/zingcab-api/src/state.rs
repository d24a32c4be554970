//! Services shared by every worker

use std::sync::Arc;
use zingcab_services::{
    AccountService, BackOfficeService, BookingOrchestrator, DispatchManager, StatusSynchronizer,
};

/// Registered once as `web::Data<AppState>`; cloning only bumps reference counts
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub dispatch: Arc<DispatchManager>,
    pub sync: Arc<StatusSynchronizer>,
    pub accounts: Arc<AccountService>,
    pub backoffice: Arc<BackOfficeService>,
}

impl AppState {
    pub fn new(
        orchestrator: BookingOrchestrator,
        dispatch: DispatchManager,
        sync: StatusSynchronizer,
        accounts: AccountService,
        backoffice: BackOfficeService,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            dispatch: Arc::new(dispatch),
            sync: Arc::new(sync),
            accounts: Arc::new(accounts),
            backoffice: Arc::new(backoffice),
        }
    }
}
