use salvo::async_trait;

use crate::error::AppResult;
use stayline_core::error::CoreError;
use stayline_service::engine::Engine;

/// Injects the engine services into every request's depot.
pub struct EngineHandler {
    pub engine: Engine,
}

#[async_trait]
impl salvo::Handler for EngineHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.engine.clone());
    }
}

/// ## Summary
/// Retrieves the engine from the depot.
///
/// ## Errors
/// Returns an error if the engine is not found in the depot.
pub fn get_engine_from_depot(depot: &salvo::Depot) -> AppResult<Engine> {
    depot
        .obtain::<Engine>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Engine not found in depot").into())
}
