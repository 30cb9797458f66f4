//! # Pantalla de reservas
//!
//! Combina la lista de reservas con los dos selectores dependientes (personas
//! y habitaciones, cargados una sola vez al montar) y el formulario cuyo
//! `monto` se cotiza al cambiar las fechas.
//!
//! Rutas HTTP propias de la pantalla:
//! - `GET /panel/reservas/opciones` - opciones de los selectores
//! - `GET /panel/reservas/formulario` - borrador actual
//! - `PATCH /panel/reservas/formulario` - cambia campos; las fechas disparan la cotización
//! - `POST /panel/reservas/formulario` - guarda (alta o actualización)
//! - `DELETE /panel/reservas/formulario` - descarta el borrador
//! - `POST /panel/reservas/{id}/editar` - copia una reserva de la lista al formulario

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::controller::{Formulario, ResourceController};
use super::cotizador::{Cotizador, Presupuesto, Solicitud};
use super::panel::{exito, Panel};
use super::transport::Transporte;
use super::{AppError, AppResult};
use crate::modelos::{Habitacion, Persona, Recurso, RecursoId, Reserva};

/// Opción de un selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opcion {
    pub id: RecursoId,
    pub etiqueta: String,
}

/// Cambios parciales sobre el borrador de reserva.
#[derive(Debug, Default, Deserialize)]
pub struct CambioFormulario {
    pub fechaentrada: Option<NaiveDate>,
    pub fechasalida: Option<NaiveDate>,
    pub habitacionid: Option<RecursoId>,
    pub personaid: Option<RecursoId>,
}

pub struct PanelReservas {
    reservas: ResourceController<Reserva>,
    personas: ResourceController<Persona>,
    habitaciones: ResourceController<Habitacion>,
    formulario: Formulario<Reserva>,
    cotizador: Arc<Cotizador>,
}

fn opciones<R: Recurso>(items: &[R], etiqueta: impl Fn(&R) -> String) -> Vec<Opcion> {
    items
        .iter()
        .filter_map(|item| {
            item.id().map(|id| Opcion {
                id: id.clone(),
                etiqueta: etiqueta(item),
            })
        })
        .collect()
}

impl PanelReservas {
    pub fn new(transporte: Arc<dyn Transporte>) -> Self {
        Self {
            reservas: ResourceController::new(transporte.clone()),
            personas: ResourceController::new(transporte.clone()),
            habitaciones: ResourceController::new(transporte.clone()),
            formulario: Formulario::nuevo(),
            cotizador: Arc::new(Cotizador::new(transporte)),
        }
    }

    /// Carga reservas, personas y habitaciones a la vez.
    pub async fn montar(&mut self) {
        tokio::join!(
            self.reservas.load(),
            self.personas.load(),
            self.habitaciones.load()
        );
    }

    pub fn reservas(&self) -> &ResourceController<Reserva> {
        &self.reservas
    }

    pub fn reservas_mut(&mut self) -> &mut ResourceController<Reserva> {
        &mut self.reservas
    }

    pub fn formulario(&self) -> &Formulario<Reserva> {
        &self.formulario
    }

    pub fn opciones_personas(&self) -> Vec<Opcion> {
        opciones(self.personas.items(), |p| p.nombrecompleto.clone())
    }

    pub fn opciones_habitaciones(&self) -> Vec<Opcion> {
        opciones(self.habitaciones.items(), Habitacion::etiqueta)
    }

    fn persona_listada(&self, id: &RecursoId) -> AppResult<()> {
        if self.personas.items().iter().any(|p| p.id() == Some(id)) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Persona con ID '{}'", id)))
        }
    }

    fn habitacion_listada(&self, id: &RecursoId) -> AppResult<()> {
        if self.habitaciones.items().iter().any(|h| h.id() == Some(id)) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Habitacion con ID '{}'", id)))
        }
    }

    /// Fija la persona del borrador. No dispara ningún cálculo.
    pub fn seleccionar_persona(&mut self, id: RecursoId) -> AppResult<()> {
        self.persona_listada(&id)?;
        let borrador = self.formulario.borrador_mut();
        borrador.personaid = Some(id);
        borrador.persona = None;
        Ok(())
    }

    /// Fija la habitación del borrador. No dispara ningún cálculo.
    pub fn seleccionar_habitacion(&mut self, id: RecursoId) -> AppResult<()> {
        self.habitacion_listada(&id)?;
        self.formulario.borrador_mut().habitacionid = Some(id);
        Ok(())
    }

    /// Aplica los cambios al borrador. Si cambió alguna fecha devuelve la
    /// solicitud de cotización a consultar.
    ///
    /// # Errores
    /// - `NotFound`: persona o habitación que no está entre las opciones; el
    ///   borrador no cambia
    /// - `ValidationWithField`: fechas invertidas (los cambios ya quedaron aplicados)
    pub fn cambiar(&mut self, cambio: CambioFormulario) -> AppResult<Option<Solicitud>> {
        if let Some(id) = &cambio.personaid {
            self.persona_listada(id)?;
        }
        if let Some(id) = &cambio.habitacionid {
            self.habitacion_listada(id)?;
        }

        let cambian_fechas = cambio.fechaentrada.is_some() || cambio.fechasalida.is_some();
        let borrador = self.formulario.borrador_mut();
        if let Some(id) = cambio.personaid {
            borrador.personaid = Some(id);
            borrador.persona = None;
        }
        if let Some(id) = cambio.habitacionid {
            borrador.habitacionid = Some(id);
        }
        if let Some(fecha) = cambio.fechaentrada {
            borrador.fechaentrada = Some(fecha);
        }
        if let Some(fecha) = cambio.fechasalida {
            borrador.fechasalida = Some(fecha);
        }

        if !cambian_fechas {
            return Ok(None);
        }
        self.cotizador.preparar(self.formulario.borrador())
    }

    pub fn cotizador(&self) -> Arc<Cotizador> {
        self.cotizador.clone()
    }

    pub fn aplicar_cotizacion(&mut self, presupuesto: &Presupuesto) -> bool {
        self.cotizador
            .aplicar(self.formulario.borrador_mut(), presupuesto)
    }

    /// [`PanelReservas::cambiar`] seguido de la consulta y aplicación del monto.
    pub async fn cambiar_y_cotizar(&mut self, cambio: CambioFormulario) -> AppResult<Option<f64>> {
        let Some(solicitud) = self.cambiar(cambio)? else {
            return Ok(None);
        };
        let cotizador = self.cotizador();
        let presupuesto = cotizador.consultar(&solicitud).await?;
        Ok(self
            .aplicar_cotizacion(&presupuesto)
            .then_some(presupuesto.monto))
    }

    /// Copia al formulario la reserva `id` de la lista.
    pub fn editar(&mut self, id: &RecursoId) -> AppResult<()> {
        let reserva = self
            .reservas
            .items()
            .iter()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Reserva con ID '{}'", id)))?;

        let mut formulario = self.reservas.edit(reserva);
        let borrador = formulario.borrador_mut();
        if borrador.personaid.is_none() {
            borrador.personaid = borrador.persona.as_ref().map(|p| p.id.clone());
        }
        borrador.persona = None;
        self.formulario = formulario;
        self.cotizador.invalidar();
        Ok(())
    }

    pub fn cancelar(&mut self) {
        self.formulario.cancelar();
        self.cotizador.invalidar();
    }

    /// Guarda el borrador; si sale bien el formulario queda en blanco.
    pub async fn guardar(&mut self) -> AppResult<String> {
        let mensaje = self.reservas.submit(&mut self.formulario).await?;
        self.cotizador.invalidar();
        Ok(mensaje)
    }
}

#[derive(Serialize)]
struct OpcionesReserva {
    personas: Vec<Opcion>,
    habitaciones: Vec<Opcion>,
}

#[get("/panel/reservas/opciones")]
async fn get_opciones(panel: web::Data<Panel>) -> AppResult<HttpResponse> {
    let pantalla = panel.pantalla_reservas().await;
    Ok(exito(
        None,
        OpcionesReserva {
            personas: pantalla.opciones_personas(),
            habitaciones: pantalla.opciones_habitaciones(),
        },
    ))
}

#[get("/panel/reservas/formulario")]
async fn get_formulario(panel: web::Data<Panel>) -> AppResult<HttpResponse> {
    let pantalla = panel.pantalla_reservas().await;
    Ok(exito(None, pantalla.formulario()))
}

/// Aplica los cambios y, si cambió alguna fecha, cotiza sin retener la
/// pantalla durante la llamada. Otra petición puede adelantarse mientras
/// tanto; en ese caso este monto ya no se aplica.
#[patch("/panel/reservas/formulario")]
async fn patch_formulario(
    panel: web::Data<Panel>,
    cambio: web::Json<CambioFormulario>,
) -> AppResult<HttpResponse> {
    let (solicitud, cotizador) = {
        let mut pantalla = panel.pantalla_reservas().await;
        (pantalla.cambiar(cambio.into_inner())?, pantalla.cotizador())
    };

    let mut aplicada = true;
    if let Some(solicitud) = solicitud {
        match cotizador.consultar(&solicitud).await {
            Ok(presupuesto) => {
                aplicada = panel.pantalla_reservas().await.aplicar_cotizacion(&presupuesto);
            }
            Err(e) if cotizador.es_vigente(solicitud.token) => return Err(e),
            Err(_) => aplicada = false,
        }
    }

    let message = (!aplicada).then(|| "Cotización reemplazada por una más reciente".to_string());
    let pantalla = panel.pantalla_reservas().await;
    Ok(exito(message, pantalla.formulario()))
}

#[post("/panel/reservas/formulario")]
async fn post_formulario(panel: web::Data<Panel>) -> AppResult<HttpResponse> {
    let mut pantalla = panel.pantalla_reservas().await;
    let message = pantalla.guardar().await?;
    Ok(exito(Some(message), pantalla.reservas().items()))
}

#[delete("/panel/reservas/formulario")]
async fn delete_formulario(panel: web::Data<Panel>) -> AppResult<HttpResponse> {
    let mut pantalla = panel.pantalla_reservas().await;
    pantalla.cancelar();
    Ok(exito(None, pantalla.formulario()))
}

#[post("/panel/reservas/{id}/editar")]
async fn post_editar(panel: web::Data<Panel>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = RecursoId::from_path(&path.into_inner());
    let mut pantalla = panel.pantalla_reservas().await;
    pantalla.editar(&id)?;
    Ok(exito(None, pantalla.formulario()))
}

/// Rutas propias de la pantalla de reservas. Deben registrarse antes que las
/// genéricas de `/panel/reservas/{id}`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_opciones);
    cfg.service(get_formulario);
    cfg.service(patch_formulario);
    cfg.service(post_formulario);
    cfg.service(delete_formulario);
    cfg.service(post_editar);
}
