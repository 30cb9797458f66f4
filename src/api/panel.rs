//! # Panel de administración
//!
//! Capa HTTP delgada sobre los controladores: cada pantalla (personas,
//! habitaciones, reservas) expone las mismas rutas CRUD, respondiendo con el
//! mismo sobre `{status, data, message}` que la API del hotel.
//!
//! ## Rutas por recurso (`{recurso}` = `personas` | `habitaciones` | `reservas`)
//!
//! - `GET /panel/{recurso}` - lista en memoria
//! - `POST /panel/{recurso}/cargar` - recarga desde la API (en reservas, también los selectores)
//! - `POST /panel/{recurso}` - alta
//! - `GET /panel/{recurso}/{id}` - lectura remota de un registro
//! - `PUT /panel/{recurso}/{id}` - actualización
//! - `DELETE /panel/{recurso}/{id}?confirmar=true` - eliminación confirmada
//!
//! Cada controlador está detrás de su propio `Mutex`, así las operaciones
//! que modifican un mismo recurso se ejecutan de a una.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::controller::{DeleteOutcome, ResourceController};
use super::errors::ErrorResponse;
use super::reservas::PanelReservas;
use super::transport::Transporte;
use super::AppResult;
use crate::modelos::{Habitacion, Persona, Recurso, RecursoId, Reserva};

pub struct Panel {
    personas: Mutex<ResourceController<Persona>>,
    habitaciones: Mutex<ResourceController<Habitacion>>,
    reservas: Mutex<PanelReservas>,
}

impl Panel {
    pub fn new(transporte: Arc<dyn Transporte>) -> Self {
        Self {
            personas: Mutex::new(ResourceController::new(transporte.clone())),
            habitaciones: Mutex::new(ResourceController::new(transporte.clone())),
            reservas: Mutex::new(PanelReservas::new(transporte)),
        }
    }

    /// Carga inicial de todas las pantallas.
    pub async fn montar(&self) {
        tokio::join!(
            async {
                let mut personas = self.personas.lock().await;
                personas.load().await;
            },
            async {
                let mut habitaciones = self.habitaciones.lock().await;
                habitaciones.load().await;
            },
            async {
                let mut reservas = self.reservas.lock().await;
                reservas.montar().await;
            },
        );
        tracing::info!("Panel montado");
    }

    pub async fn pantalla_reservas(&self) -> MutexGuard<'_, PanelReservas> {
        self.reservas.lock().await
    }
}

/// Recurso con pantalla propia en el panel.
#[async_trait]
pub trait EnPanel: Recurso {
    /// Segmento de ruta bajo `/panel`
    const SEGMENTO: &'static str;

    async fn controlador<'a>(panel: &'a Panel) -> MappedMutexGuard<'a, ResourceController<Self>>;

    /// Recarga la pantalla desde la API y devuelve la lista resultante.
    async fn recargar(panel: &Panel) -> Vec<Self>;
}

#[async_trait]
impl EnPanel for Persona {
    const SEGMENTO: &'static str = "personas";

    async fn controlador<'a>(panel: &'a Panel) -> MappedMutexGuard<'a, ResourceController<Self>> {
        MutexGuard::map(panel.personas.lock().await, |c| c)
    }

    async fn recargar(panel: &Panel) -> Vec<Self> {
        let mut personas = panel.personas.lock().await;
        personas.load().await.to_vec()
    }
}

#[async_trait]
impl EnPanel for Habitacion {
    const SEGMENTO: &'static str = "habitaciones";

    async fn controlador<'a>(panel: &'a Panel) -> MappedMutexGuard<'a, ResourceController<Self>> {
        MutexGuard::map(panel.habitaciones.lock().await, |c| c)
    }

    async fn recargar(panel: &Panel) -> Vec<Self> {
        let mut habitaciones = panel.habitaciones.lock().await;
        habitaciones.load().await.to_vec()
    }
}

#[async_trait]
impl EnPanel for Reserva {
    const SEGMENTO: &'static str = "reservas";

    async fn controlador<'a>(panel: &'a Panel) -> MappedMutexGuard<'a, ResourceController<Self>> {
        MutexGuard::map(panel.reservas.lock().await, |p| p.reservas_mut())
    }

    /// La pantalla de reservas vuelve a cargar también los selectores, así
    /// aparecen las personas y habitaciones dadas de alta desde sus pantallas.
    async fn recargar(panel: &Panel) -> Vec<Self> {
        let mut pantalla = panel.reservas.lock().await;
        pantalla.montar().await;
        pantalla.reservas().items().to_vec()
    }
}

#[derive(Serialize)]
struct RespuestaPanel<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    data: T,
}

pub(crate) fn exito<T: Serialize>(message: Option<String>, data: T) -> HttpResponse {
    HttpResponse::Ok().json(RespuestaPanel {
        status: "success",
        message,
        data,
    })
}

#[derive(Deserialize)]
struct Confirmacion {
    #[serde(default)]
    confirmar: bool,
}

async fn listar<R: EnPanel>(panel: web::Data<Panel>) -> AppResult<HttpResponse> {
    let controlador = R::controlador(&panel).await;
    Ok(exito(None, controlador.items()))
}

async fn cargar<R: EnPanel>(panel: web::Data<Panel>) -> AppResult<HttpResponse> {
    let items = R::recargar(&panel).await;
    Ok(exito(None, items))
}

async fn obtener<R: EnPanel>(
    panel: web::Data<Panel>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = RecursoId::from_path(&path.into_inner());
    let controlador = R::controlador(&panel).await;
    let registro = controlador.get(&id).await?;
    Ok(exito(None, registro))
}

async fn crear<R: EnPanel>(
    panel: web::Data<Panel>,
    borrador: web::Json<R>,
) -> AppResult<HttpResponse> {
    let mut controlador = R::controlador(&panel).await;
    let message = controlador.create(&borrador).await?;
    Ok(exito(Some(message), controlador.items().last()))
}

async fn actualizar<R: EnPanel>(
    panel: web::Data<Panel>,
    path: web::Path<String>,
    borrador: web::Json<R>,
) -> AppResult<HttpResponse> {
    let id = RecursoId::from_path(&path.into_inner());
    let mut controlador = R::controlador(&panel).await;
    let message = controlador.update(&id, &borrador).await?;
    let registro = controlador.items().iter().find(|r| r.id() == Some(&id));
    Ok(exito(Some(message), registro))
}

async fn eliminar<R: EnPanel>(
    panel: web::Data<Panel>,
    path: web::Path<String>,
    query: web::Query<Confirmacion>,
) -> AppResult<HttpResponse> {
    let id = RecursoId::from_path(&path.into_inner());
    let mut controlador = R::controlador(&panel).await;

    let mut pregunta = String::new();
    let outcome = controlador
        .delete(&id, |texto| {
            pregunta = texto.to_string();
            query.confirmar
        })
        .await?;

    match outcome {
        DeleteOutcome::Deleted { message } => Ok(exito(Some(message), controlador.items())),
        DeleteOutcome::Declined => Ok(HttpResponse::build(StatusCode::PRECONDITION_REQUIRED)
            .json(ErrorResponse {
                status: "error".to_string(),
                message: format!("{} Confirme con ?confirmar=true", pregunta),
            })),
    }
}

fn rutas_de<R: EnPanel>(cfg: &mut web::ServiceConfig) {
    let base = format!("/panel/{}", R::SEGMENTO);
    cfg.service(
        web::resource(format!("{}/cargar", base)).route(web::post().to(cargar::<R>)),
    );
    cfg.service(
        web::resource(base.clone())
            .route(web::get().to(listar::<R>))
            .route(web::post().to(crear::<R>)),
    );
    cfg.service(
        web::resource(format!("{}/{{id}}", base))
            .route(web::get().to(obtener::<R>))
            .route(web::put().to(actualizar::<R>))
            .route(web::delete().to(eliminar::<R>)),
    );
}

/// Configura las rutas CRUD de las tres pantallas
pub fn routes(cfg: &mut web::ServiceConfig) {
    rutas_de::<Persona>(cfg);
    rutas_de::<Habitacion>(cfg);
    rutas_de::<Reserva>(cfg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::init_routes;
    use crate::api::mock::TransporteSimulado;
    use crate::api::transport::Metodo;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn persona(id: i64, nombre: &str) -> Value {
        json!({
            "id": id, "nombrecompleto": nombre, "nrodocumento": format!("{}", id),
            "correo": "x@hotel.com", "telefono": "1"
        })
    }

    async fn panel_con_personas(transporte: &Arc<TransporteSimulado>) -> web::Data<Panel> {
        transporte.responder(
            Metodo::Get,
            "/api/persona",
            200,
            json!({ "status": "success", "data": [persona(1, "Ana"), persona(2, "Luis")] }),
        );
        let panel = web::Data::new(Panel::new(transporte.clone()));
        Persona::controlador(&panel).await.load().await;
        panel
    }

    #[actix_web::test]
    async fn lists_cached_people() {
        let transporte = Arc::new(TransporteSimulado::new());
        let panel = panel_con_personas(&transporte).await;
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/panel/personas").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["data"][1]["nombrecompleto"], "Luis");
    }

    #[actix_web::test]
    async fn creates_room_through_the_panel() {
        let transporte = Arc::new(TransporteSimulado::new());
        transporte.responder(
            Metodo::Post,
            "/api/habitacion",
            200,
            json!({ "status": "success", "data": {
                "id": 7, "habitacionpiso": 3, "habitacionnro": 12, "cantcamas": 2,
                "tienetelevision": true, "tienefrigobar": false
            } }),
        );
        let panel = web::Data::new(Panel::new(transporte.clone()));
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/panel/habitaciones")
            .set_json(json!({
                "id": null, "habitacionpiso": 3, "habitacionnro": 12, "cantcamas": 2,
                "tienetelevision": true, "tienefrigobar": false
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["message"], "Habitacion creada exitosamente");
        assert_eq!(body["data"]["id"], 7);
    }

    #[actix_web::test]
    async fn invalid_room_is_a_bad_request() {
        let transporte = Arc::new(TransporteSimulado::new());
        let panel = web::Data::new(Panel::new(transporte.clone()));
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/panel/habitaciones")
            .set_json(json!({ "habitacionpiso": 11, "habitacionnro": 1, "cantcamas": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(transporte.peticiones().is_empty());
    }

    #[actix_web::test]
    async fn delete_without_confirmation_sends_nothing() {
        let transporte = Arc::new(TransporteSimulado::new());
        let panel = panel_con_personas(&transporte).await;
        let app = test::init_service(App::new().app_data(panel.clone()).configure(init_routes)).await;

        let req = test::TestRequest::delete().uri("/panel/personas/1").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);
        assert_eq!(transporte.enviadas(Metodo::Delete), 0);
        assert_eq!(Persona::controlador(&panel).await.items().len(), 2);
    }

    #[actix_web::test]
    async fn confirmed_delete_removes_the_person() {
        let transporte = Arc::new(TransporteSimulado::new());
        let panel = panel_con_personas(&transporte).await;
        transporte.responder(
            Metodo::Delete,
            "/api/persona/1",
            200,
            json!({ "status": "success", "message": "Persona eliminada" }),
        );
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::delete()
            .uri("/panel/personas/1?confirmar=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["message"], "Persona eliminada");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], 2);
    }

    #[actix_web::test]
    async fn upstream_rejection_keeps_server_message() {
        let transporte = Arc::new(TransporteSimulado::new());
        let panel = panel_con_personas(&transporte).await;
        transporte.responder(
            Metodo::Put,
            "/api/persona/2",
            400,
            json!({ "status": "error", "message": "El correo ya está registrado" }),
        );
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::put()
            .uri("/panel/personas/2")
            .set_json(persona(2, "Luis"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "El correo ya está registrado");
    }

    #[actix_web::test]
    async fn reservation_form_prices_date_changes() {
        let transporte = Arc::new(TransporteSimulado::new());
        transporte.responder(
            Metodo::Get,
            "/api/reserva/calcular-monto?fechaentrada=2024-05-01&fechasalida=2024-05-03",
            200,
            json!({ "status": "success", "data": { "monto": 240 } }),
        );
        let panel = web::Data::new(Panel::new(transporte.clone()));
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::patch()
            .uri("/panel/reservas/formulario")
            .set_json(json!({ "fechaentrada": "2024-05-01", "fechasalida": "2024-05-03" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["borrador"]["monto"], 240.0);
        assert_eq!(body["data"]["editando"], false);
    }

    #[actix_web::test]
    async fn reservation_form_rejects_inverted_dates() {
        let transporte = Arc::new(TransporteSimulado::new());
        let panel = web::Data::new(Panel::new(transporte.clone()));
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let req = test::TestRequest::patch()
            .uri("/panel/reservas/formulario")
            .set_json(json!({ "fechaentrada": "2024-05-10", "fechasalida": "2024-05-01" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(transporte.peticiones().is_empty());
    }

    #[actix_web::test]
    async fn reloading_reservations_refreshes_the_selects() {
        let transporte = Arc::new(TransporteSimulado::new());
        transporte
            .responder(
                Metodo::Post,
                "/api/persona",
                200,
                json!({ "status": "success", "data": persona(5, "Eva") }),
            )
            .responder(Metodo::Get, "/api/reserva", 200, json!({ "status": "success", "data": [] }))
            .responder(
                Metodo::Get,
                "/api/persona",
                200,
                json!({ "status": "success", "data": [persona(5, "Eva")] }),
            )
            .responder(Metodo::Get, "/api/habitacion", 200, json!({ "status": "success", "data": [] }));
        let panel = web::Data::new(Panel::new(transporte.clone()));
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let alta = test::TestRequest::post()
            .uri("/panel/personas")
            .set_json(json!({
                "nombrecompleto": "Eva", "nrodocumento": "5",
                "correo": "eva@hotel.com", "telefono": "1"
            }))
            .to_request();
        assert!(test::call_service(&app, alta).await.status().is_success());

        let recarga = test::TestRequest::post().uri("/panel/reservas/cargar").to_request();
        assert!(test::call_service(&app, recarga).await.status().is_success());

        let req = test::TestRequest::get().uri("/panel/reservas/opciones").to_request();
        let opciones: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(opciones["data"]["personas"][0]["etiqueta"], "Eva");

        let req = test::TestRequest::patch()
            .uri("/panel/reservas/formulario")
            .set_json(json!({ "personaid": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["borrador"]["personaid"], 5);
    }

    #[actix_web::test]
    async fn overlapping_date_changes_keep_the_latest_quote() {
        let corta = "/api/reserva/calcular-monto?fechaentrada=2024-05-01&fechasalida=2024-05-03";
        let larga = "/api/reserva/calcular-monto?fechaentrada=2024-05-01&fechasalida=2024-05-05";
        let transporte = Arc::new(TransporteSimulado::new());
        transporte
            .responder(Metodo::Get, corta, 200, json!({ "status": "success", "data": { "monto": 240 } }))
            .responder(Metodo::Get, larga, 200, json!({ "status": "success", "data": { "monto": 480 } }));
        let aviso = transporte.retener(Metodo::Get, corta);
        let panel = web::Data::new(Panel::new(transporte.clone()));
        let app = test::init_service(App::new().app_data(panel).configure(init_routes)).await;

        let primera = test::TestRequest::patch()
            .uri("/panel/reservas/formulario")
            .set_json(json!({ "fechaentrada": "2024-05-01", "fechasalida": "2024-05-03" }))
            .to_request();
        let segunda = test::TestRequest::patch()
            .uri("/panel/reservas/formulario")
            .set_json(json!({ "fechasalida": "2024-05-05" }))
            .to_request();

        // La segunda entra cuando la primera ya espera su cotización
        let (lenta, rapida) = tokio::join!(
            async {
                let cuerpo: Value = test::call_and_read_body_json(&app, primera).await;
                cuerpo
            },
            async {
                while transporte.enviadas(Metodo::Get) == 0 {
                    tokio::task::yield_now().await;
                }
                let cuerpo: Value = test::call_and_read_body_json(&app, segunda).await;
                aviso.notify_one();
                cuerpo
            }
        );

        assert_eq!(rapida["data"]["borrador"]["monto"], 480.0);
        assert!(rapida.get("message").is_none());
        assert_eq!(lenta["message"], "Cotización reemplazada por una más reciente");
        assert_eq!(lenta["data"]["borrador"]["monto"], 480.0);

        let req = test::TestRequest::get().uri("/panel/reservas/formulario").to_request();
        let formulario: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(formulario["data"]["borrador"]["monto"], 480.0);
        assert_eq!(formulario["data"]["borrador"]["fechasalida"], "2024-05-05");
    }
}
