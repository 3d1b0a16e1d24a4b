pub mod framework;
mod path_crypto;
mod path_keys;

use tracing::{debug, error, warn};

use crate::config::app_config::AppConfig;
use crate::core::context::RequestContext;
use crate::core::errors::{PgpVaultError, Result};
use framework::{FieldData, PathDef, Request, Response};

/// The secrets engine as the host sees it: a set of routable paths.
///
/// Holds only immutable configuration and path definitions, so one
/// instance serves concurrent requests.
pub struct Backend {
    config: AppConfig,
    paths: Vec<PathDef>,
}

impl Backend {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut paths = path_keys::paths()?;
        paths.extend(path_crypto::paths()?);
        Ok(Self { config, paths })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Route one request and turn the outcome into a `Response`.
    pub fn handle_request(&self, ctx: &RequestContext<'_>, request: Request) -> Response {
        let path = request.path.clone();
        let operation = request.operation;

        match self.dispatch(ctx, request) {
            Ok(data) => Response::ok(data),
            Err(e) if e.is_user_error() => {
                debug!(%path, %operation, error = %e, "request rejected");
                Response::from_error(&e)
            }
            Err(e) => {
                error!(%path, %operation, error = %e, "request failed");
                Response::from_error(&e)
            }
        }
    }

    fn dispatch(
        &self,
        ctx: &RequestContext<'_>,
        request: Request,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let (path, captures) = self
            .paths
            .iter()
            .find_map(|p| p.captures(&request.path).map(|caps| (p, caps)))
            .ok_or_else(|| PgpVaultError::UnsupportedPath {
                path: request.path.clone(),
            })?;

        let handler = path.handler(request.operation).ok_or_else(|| {
            warn!(path = %request.path, operation = %request.operation, "operation not supported");
            PgpVaultError::UnsupportedOperation {
                operation: request.operation.to_string(),
                path: request.path.clone(),
            }
        })?;

        let data = FieldData::new(request.data, captures, &path.fields);
        handler(self, ctx, &data)
    }
}
