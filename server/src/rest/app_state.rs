// server/src/rest/app_state.rs

use std::convert::Infallible;
use std::sync::Arc;

use lib::config::PublicClientConfig;
use lib::identity::Authenticator;
use lib::Database;
use patient_directory::PatientDirectory;
use warp::Filter;

/// Everything a request handler may need, cloned into each route.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub authenticator: Arc<Authenticator>,
    pub directory: Arc<dyn PatientDirectory>,
    pub public_client: Arc<PublicClientConfig>,
}

impl AppState {
    pub fn new(
        db: Database,
        authenticator: Authenticator,
        directory: Arc<dyn PatientDirectory>,
        public_client: PublicClientConfig,
    ) -> Self {
        AppState {
            db,
            authenticator: Arc::new(authenticator),
            directory,
            public_client: Arc::new(public_client),
        }
    }
}

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
