//! Handler registry: binds every route's handler name to its controller.

use crate::dispatcher::Dispatcher;
use crate::handlers::get_pet::GetPetController;
use crate::routes::GET_PET;
use crate::store::PetRepository;
use std::io;
use std::sync::Arc;

/// Register all handlers on `dispatcher`, each in its own coroutine.
///
/// # Safety
///
/// Spawns `may` coroutines; see [`Dispatcher::register_handler`].
///
/// # Errors
///
/// Returns the first coroutine spawn failure.
pub unsafe fn register_all(
    dispatcher: &mut Dispatcher,
    store: Arc<dyn PetRepository>,
    stack_size: usize,
) -> io::Result<()> {
    // SAFETY: forwarded to the caller.
    unsafe { dispatcher.register_typed(GET_PET, stack_size, GetPetController::new(store)) }
}
