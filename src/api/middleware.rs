//! # Utilidades de logging para errores
//!
//! Recorren la cadena `source()` de un error para que el log muestre la causa
//! real (por ejemplo el `reqwest::Error` debajo de un fallo de transporte).

use std::error::Error as StdError;

fn cadena<E>(error: &E) -> Vec<String>
where
    E: StdError + 'static,
{
    let mut error_chain = Vec::new();
    let mut current_error: Option<&dyn StdError> = Some(error);

    while let Some(err) = current_error {
        error_chain.push(err.to_string());
        current_error = err.source();
    }
    error_chain
}

/// Registra la cadena completa de errores
///
/// # Ejemplo
/// ```ignore
/// if let Err(e) = controlador.load().await {
///     log_error_chain(&e, Some("al cargar personas"));
/// }
/// ```
pub fn log_error_chain<E>(error: &E, context: Option<&str>)
where
    E: StdError + 'static,
{
    let error_chain = cadena(error);

    if let Some(ctx) = context {
        tracing::error!(
            context = %ctx,
            error_chain = ?error_chain,
            "Error with full chain (with context)"
        );
    } else {
        tracing::error!(error_chain = ?error_chain, "Error with full chain");
    }
}

/// Extension trait para Results que añade logging de la cadena de errores
pub trait ErrorLogExt<T, E> {
    /// Loggea la cadena de errores con contexto adicional
    fn log_error_context(self, context: &str) -> Result<T, E>;

    /// Loggea como advertencia; para fallos que no interrumpen la pantalla
    fn log_warn_context(self, context: &str) -> Result<T, E>;
}

impl<T, E> ErrorLogExt<T, E> for Result<T, E>
where
    E: StdError + 'static,
{
    fn log_error_context(self, context: &str) -> Result<T, E> {
        if let Err(ref error) = self {
            log_error_chain(error, Some(context));
        }
        self
    }

    fn log_warn_context(self, context: &str) -> Result<T, E> {
        if let Err(ref error) = self {
            tracing::warn!(
                context = %context,
                error_chain = ?cadena(error),
                "Warning with error chain"
            );
        }
        self
    }
}
