//! # Manejo de errores
//!
//! Todos los errores se resuelven en la acción del usuario que los provocó
//! (cargar, guardar, eliminar, cotizar). [`AppError::user_message`] da el texto
//! que se le muestra; el panel HTTP los convierte en el mismo sobre
//! `{status: "error", message}` que usa la API del hotel.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::error::Error;
use thiserror::Error;

/// Mensaje genérico para fallos que no traen explicación del servidor.
pub const MENSAJE_GENERICO: &str = "Ocurrió un error inesperado. Inténtalo nuevamente.";

/// Tipos de error de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuración ausente o inválida al arrancar
    #[error("Error de configuración: {0}")]
    Config(String),

    /// Fallo de red o timeout hablando con la API
    #[error("Error de red en operación '{operation}': {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// La API rechazó la operación, con sobre de error o estado HTTP no 2xx
    #[error("La API respondió {status}: {message}")]
    Api { status: u16, message: String },

    /// Respuesta exitosa cuyo contenido no tiene la forma esperada
    #[error("Respuesta inesperada: {0}")]
    Decode(String),

    /// Error de validación con campo específico
    #[error("Error de validación en campo '{field}': {message}")]
    ValidationWithField { field: String, message: String },

    /// Error de validación general
    #[error("Error de validación: {0}")]
    Validation(String),

    /// Error de no encontrado simple
    #[error("No encontrado: {0}")]
    NotFound(String),

    /// Error interno simple
    #[error("Error interno: {0}")]
    Internal(String),
}

impl AppError {
    /// Crea un error de red con contexto de operación
    pub fn transport(operation: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            operation: operation.to_string(),
            source,
        }
    }

    /// Crea un error de validación con campo específico
    pub fn validation_field(field: &str, message: &str) -> Self {
        Self::ValidationWithField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Texto para el usuario. Los fallos de red e internos no exponen detalles.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Validation(message) | Self::NotFound(message) => message.clone(),
            Self::ValidationWithField { field, message } => {
                format!("Campo '{}': {}", field, message)
            }
            Self::Config(_) | Self::Transport { .. } | Self::Decode(_) | Self::Internal(_) => {
                MENSAJE_GENERICO.to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::ValidationWithField { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api { .. } | Self::Transport { .. } | Self::Decode(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Transport { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Upstream transport error"
                );
            }
            Self::Api { status, message } => {
                tracing::warn!(status = status, message = %message, "Upstream API rejected request");
            }
            Self::ValidationWithField { field, message } => {
                tracing::warn!(field = %field, message = %message, "Validation error");
            }
            error => {
                tracing::error!(error = %error, "General error");
            }
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            status: "error".to_string(),
            message: self.user_message(),
        })
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

pub type AppResult<T> = Result<T, AppError>;

pub trait ResultExt<T> {
    fn map_err_decode(self, message: &str) -> AppResult<T>;
    fn map_err_internal(self, message: &str) -> AppResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + 'static,
{
    fn map_err_decode(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Decode(format!("{}: {}", message, e)))
    }

    fn map_err_internal(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Internal(format!("{}: {}", message, e)))
    }
}
