//! `GET /api/pets/{id}`: a pet with its owner, or `null`.

use crate::dispatcher::HandlerRequest;
use crate::model::PetWithOwner;
use crate::store::PetRepository;
use crate::typed::{Handler, HandlerError, TypedHandlerRequest};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Request {
    pub id: i64,
}

impl TryFrom<HandlerRequest> for Request {
    type Error = anyhow::Error;

    fn try_from(req: HandlerRequest) -> Result<Self, Self::Error> {
        let raw = req
            .get_path_param("id")
            .ok_or_else(|| anyhow::anyhow!("missing path parameter `id`"))?;
        let id = raw
            .parse::<i64>()
            .with_context(|| format!("path parameter `id` must be an integer, got `{raw}`"))?;
        Ok(Request { id })
    }
}

/// Response envelope. `pet` serializes as `null` when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Response {
    pub pet: Option<PetWithOwner>,
}

/// Looks pets up through the injected repository.
pub struct GetPetController {
    store: Arc<dyn PetRepository>,
}

impl GetPetController {
    #[must_use]
    pub fn new(store: Arc<dyn PetRepository>) -> Self {
        Self { store }
    }
}

impl Handler for GetPetController {
    type Request = Request;
    type Response = Response;

    fn handle(&self, req: TypedHandlerRequest<Request>) -> Result<Response, HandlerError> {
        let id = req.data.id;
        match self.store.find_pet_with_owner(id) {
            Ok(pet) => {
                info!(
                    request_id = %req.request_id,
                    pet_id = id,
                    found = pet.is_some(),
                    "Pet lookup complete"
                );
                Ok(Response { pet })
            }
            Err(err) => {
                error!(
                    request_id = %req.request_id,
                    pet_id = id,
                    error = %err,
                    "Pet lookup failed"
                );
                Err(HandlerError::Internal("Failed to load pet".to_string()))
            }
        }
    }
}
