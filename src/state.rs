use std::sync::Arc;

use crate::auth::verifier::TokenVerifier;
use crate::config::Config;
use crate::service::EndpointService;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub verifier: Arc<dyn TokenVerifier>,
    pub endpoints: EndpointService,
}
