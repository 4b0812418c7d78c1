use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::{
    CONTROLS, ControlSpec, DEFAULT_HORIZON_MONTHS, DerivedRates, ParameterKey, Params, Projection,
    ProjectionSummary, steps,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const BOOTSTRAP_PLACEHOLDER: &str = "{{BOOTSTRAP_JSON}}";

/// Upper bound on the horizon accepted over HTTP (100 years).
pub const MAX_HORIZON_MONTHS: u32 = 1200;

#[derive(Copy, Clone, Debug)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    home_price: Option<f64>,
    rent: Option<f64>,
    income: Option<f64>,
    down_payment_pct: Option<f64>,
    interest_rate: Option<f64>,
    appreciation_rate: Option<f64>,
    investment_return: Option<f64>,
    maintenance_rate: Option<f64>,
    horizon_months: Option<i64>,
}

impl ProjectPayload {
    fn values(&self) -> [(ParameterKey, Option<f64>); 8] {
        [
            (ParameterKey::HomePrice, self.home_price),
            (ParameterKey::Rent, self.rent),
            (ParameterKey::Income, self.income),
            (ParameterKey::DownPaymentPct, self.down_payment_pct),
            (ParameterKey::InterestRate, self.interest_rate),
            (ParameterKey::AppreciationRate, self.appreciation_rate),
            (ParameterKey::InvestmentReturn, self.investment_return),
            (ParameterKey::MaintenanceRate, self.maintenance_rate),
        ]
    }
}

#[derive(Debug)]
struct ProjectRequest {
    params: Params,
    horizon_months: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    horizon_months: u32,
    params: Params,
    derived: DerivedRates,
    months: Vec<u32>,
    series: Projection,
    summary: Option<ProjectionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ControlsResponse {
    default_horizon_months: u32,
    max_horizon_months: u32,
    controls: &'static [ControlSpec],
}

/// Everything the page needs for its first paint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Bootstrap {
    controls: ControlsResponse,
    projection: ProjectResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/controls", get(controls_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("rent vs. buy calculator listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, router()).await
}

async fn index_handler() -> Response {
    match render_index() {
        Ok(html) => with_cache_control(Html(html)),
        Err(msg) => {
            tracing::error!("failed to render index page: {msg}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg)
        }
    }
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn controls_handler() -> Response {
    json_response(StatusCode::OK, controls_response())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(payload: Result<Query<ProjectPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match project_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            tracing::debug!("rejected projection request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match build_project_response(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn render_index() -> Result<String, String> {
    let request = ProjectRequest {
        params: Params::default(),
        horizon_months: DEFAULT_HORIZON_MONTHS,
    };
    let bootstrap = Bootstrap {
        controls: controls_response(),
        projection: build_project_response(&request)?,
    };
    let json = serde_json::to_string(&bootstrap)
        .map_err(|e| format!("failed to serialize page data: {e}"))?;
    // The JSON sits inside a <script> element.
    let json = json.replace("</", "<\\/");
    Ok(INDEX_HTML.replace(BOOTSTRAP_PLACEHOLDER, &json))
}

fn controls_response() -> ControlsResponse {
    ControlsResponse {
        default_horizon_months: DEFAULT_HORIZON_MONTHS,
        max_horizon_months: MAX_HORIZON_MONTHS,
        controls: &CONTROLS,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn project_request_from_json(json: &str) -> Result<ProjectRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    project_request_from_payload(payload)
}

fn project_request_from_payload(payload: ProjectPayload) -> Result<ProjectRequest, String> {
    let mut params = Params::default();
    for (key, value) in payload.values() {
        if let Some(v) = value {
            check_control(ControlSpec::for_key(key), v)?;
            params.set(key, v);
        }
    }

    let horizon_months = match payload.horizon_months {
        None => DEFAULT_HORIZON_MONTHS,
        Some(h) if h < 1 => return Err("horizonMonths must be >= 1".to_string()),
        Some(h) if h > i64::from(MAX_HORIZON_MONTHS) => {
            return Err(format!("horizonMonths must be <= {MAX_HORIZON_MONTHS}"));
        }
        Some(h) => h as u32,
    };

    Ok(ProjectRequest {
        params,
        horizon_months,
    })
}

fn check_control(control: &ControlSpec, value: f64) -> Result<(), String> {
    let name = control.key.api_name();
    if !value.is_finite() {
        return Err(format!("{name} must be a finite number"));
    }
    if !control.contains(value) {
        return Err(format!(
            "{name} must be between {} and {}",
            control.min, control.max
        ));
    }
    Ok(())
}

fn build_project_response(request: &ProjectRequest) -> Result<ProjectResponse, String> {
    let months = steps(&request.params, request.horizon_months).map_err(|e| e.to_string())?;
    let derived = *months.derived();
    let series: Projection = months.collect();
    let summary = series.summary();
    tracing::debug!(
        horizon_months = request.horizon_months,
        buyer_advantage = summary.map(|s| s.buyer_advantage),
        "projection computed"
    );

    Ok(ProjectResponse {
        horizon_months: request.horizon_months,
        params: request.params,
        derived,
        months: (0..request.horizon_months).collect(),
        series,
        summary,
    })
}
