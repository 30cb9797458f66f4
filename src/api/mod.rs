//! # Módulo API
//!
//! Todo lo que habla HTTP: el cliente de la API del hotel y el panel que lo
//! expone.
//!
//! ## Módulos principales
//!
//! - [`transport`] - URL base, credenciales y envío de peticiones
//! - [`envelope`] - Sobre `{status, data, message, errors}` de la API
//! - [`controller`] - Controlador CRUD genérico y estado de formulario
//! - [`cotizador`] - Cálculo del monto de una reserva a partir de sus fechas
//! - [`reservas`] - Pantalla de reservas con selectores dependientes
//! - [`panel`] - Rutas del panel de administración
//! - [`errors`] - Manejo de errores de la aplicación

pub mod controller;
pub mod cotizador;
pub mod envelope;
pub mod errors;
pub mod panel;
pub mod reservas;
pub mod transport;
mod middleware;
#[cfg(test)]
pub(crate) mod mock;

// Re-exportar tipos comunes para facilitar su uso
pub use controller::{DeleteOutcome, Formulario, ResourceController};
pub use cotizador::Cotizador;
pub use errors::{AppError, AppResult, ErrorResponse, ResultExt};
pub use panel::Panel;
pub use transport::{HttpTransport, Transporte};

use actix_web::web;

/// Configura todas las rutas del panel
///
/// Las rutas propias de la pantalla de reservas van primero porque
/// `/panel/reservas/{id}` también las cubriría.
///
/// # Ejemplo
///
/// ```no_run
/// use actix_web::App;
/// use hotel_reservas_admin::api;
///
/// let app = App::new()
///     .configure(api::init_routes);
/// ```
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    reservas::routes(cfg);
    panel::routes(cfg);
}
