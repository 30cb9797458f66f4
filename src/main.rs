//! # Hotel Reservas Admin
//!
//! Panel de administración para el sistema de reservas de un hotel,
//! construido con Rust y Actix Web sobre la API REST del hotel.
//!
//! ## Características principales
//!
//! - **Personas**: alta, edición y baja de huéspedes
//! - **Habitaciones**: gestión de pisos, números, camas y equipamiento
//! - **Reservas**: gestión de reservas con monto cotizado según las fechas
//!
//! ## Configuración
//!
//! El panel se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # API del hotel (requeridas)
//! HOTEL_API_URL=http://localhost:3000
//! HOTEL_API_USERNAME=admin
//! HOTEL_API_PASSWORD=secreto
//!
//! # Panel
//! BIND_ADDRESS=0.0.0.0:8080
//!
//! # Logging
//! RUST_LOG=debug,reqwest=info
//! ```
//!
//! ## Arquitectura
//!
//! ```text
//! Panel (Actix Web, JSON)
//!     ↓ ResourceController / Cotizador
//! Transporte (reqwest, Basic auth)
//!     ↓ HTTP/JSON
//! API del hotel
//! ```

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use hotel_reservas_admin::api::{self, HttpTransport, Panel, Transporte};
use hotel_reservas_admin::config::Config;

/// Función principal que inicia el panel
///
/// # Funcionalidad
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Valida la configuración; si falta algo no arranca
/// 4. Carga las listas iniciales de las tres pantallas
/// 5. Inicia el servidor HTTP en la dirección especificada
///
/// # Errores
///
/// Retorna `std::io::Error` si:
/// - Falta alguna variable requerida o tiene un valor inválido
/// - No se puede bindear al puerto especificado
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Configurar sistema de logging con tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hotel_reservas_admin=debug".parse().unwrap())
                .add_directive("reqwest=info".parse().unwrap()),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Configuración inválida: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    tracing::info!(config = ?config, "Iniciando Hotel Reservas Admin");

    let transporte: Arc<dyn Transporte> = Arc::new(HttpTransport::new(&config).map_err(|e| {
        tracing::error!("No se pudo crear el transporte: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?);

    let panel = web::Data::new(Panel::new(transporte));
    panel.montar().await;

    tracing::info!("Panel escuchando en {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(panel.clone())
            .wrap(Logger::default())
            .configure(api::init_routes)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
