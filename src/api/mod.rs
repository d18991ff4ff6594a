use axum::{
    Router,
    body::Bytes,
    extract::{Json, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::calculators::{
    Annuity, BuyVsRent, CapitalGains, Emi, Endowment, EquityReturns, FdSustainability, Fire,
    FirstCrore, HourlyRate, Insurance, MbaRoi, MfVsNps, Sip, TaxDeferral,
};
use crate::core::{CalcError, Calculator, FieldErrors};

pub mod cli;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorKind {
    Sip,
    Emi,
    CapitalGains,
    FdSustainability,
    Fire,
    Insurance,
    BuyVsRent,
    Annuity,
    Endowment,
    MbaRoi,
    HourlyRate,
    FirstCrore,
    EquityReturns,
    MfVsNps,
    TaxDeferral,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 15] = [
        CalculatorKind::Sip,
        CalculatorKind::Emi,
        CalculatorKind::CapitalGains,
        CalculatorKind::FdSustainability,
        CalculatorKind::Fire,
        CalculatorKind::Insurance,
        CalculatorKind::BuyVsRent,
        CalculatorKind::Annuity,
        CalculatorKind::Endowment,
        CalculatorKind::MbaRoi,
        CalculatorKind::HourlyRate,
        CalculatorKind::FirstCrore,
        CalculatorKind::EquityReturns,
        CalculatorKind::MfVsNps,
        CalculatorKind::TaxDeferral,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalculatorKind::Sip => Sip::NAME,
            CalculatorKind::Emi => Emi::NAME,
            CalculatorKind::CapitalGains => CapitalGains::NAME,
            CalculatorKind::FdSustainability => FdSustainability::NAME,
            CalculatorKind::Fire => Fire::NAME,
            CalculatorKind::Insurance => Insurance::NAME,
            CalculatorKind::BuyVsRent => BuyVsRent::NAME,
            CalculatorKind::Annuity => Annuity::NAME,
            CalculatorKind::Endowment => Endowment::NAME,
            CalculatorKind::MbaRoi => MbaRoi::NAME,
            CalculatorKind::HourlyRate => HourlyRate::NAME,
            CalculatorKind::FirstCrore => FirstCrore::NAME,
            CalculatorKind::EquityReturns => EquityReturns::NAME,
            CalculatorKind::MfVsNps => MfVsNps::NAME,
            CalculatorKind::TaxDeferral => TaxDeferral::NAME,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CalculatorKind::Sip => Sip::TITLE,
            CalculatorKind::Emi => Emi::TITLE,
            CalculatorKind::CapitalGains => CapitalGains::TITLE,
            CalculatorKind::FdSustainability => FdSustainability::TITLE,
            CalculatorKind::Fire => Fire::TITLE,
            CalculatorKind::Insurance => Insurance::TITLE,
            CalculatorKind::BuyVsRent => BuyVsRent::TITLE,
            CalculatorKind::Annuity => Annuity::TITLE,
            CalculatorKind::Endowment => Endowment::TITLE,
            CalculatorKind::MbaRoi => MbaRoi::TITLE,
            CalculatorKind::HourlyRate => HourlyRate::TITLE,
            CalculatorKind::FirstCrore => FirstCrore::TITLE,
            CalculatorKind::EquityReturns => EquityReturns::TITLE,
            CalculatorKind::MfVsNps => MfVsNps::TITLE,
            CalculatorKind::TaxDeferral => TaxDeferral::TITLE,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CalcError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| CalcError::UnknownCalculator(name.to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct CalculatorInfo {
    pub name: &'static str,
    pub title: &'static str,
}

pub fn calculators() -> Vec<CalculatorInfo> {
    CalculatorKind::ALL
        .into_iter()
        .map(|kind| CalculatorInfo {
            name: kind.name(),
            title: kind.title(),
        })
        .collect()
}

/// Decodes `payload` as the calculator's input, runs it, and encodes the report.
pub fn calculate(kind: CalculatorKind, mut payload: Value) -> Result<Value, CalcError> {
    match kind {
        CalculatorKind::Sip => run_json::<Sip>(payload),
        CalculatorKind::Emi => run_json::<Emi>(payload),
        CalculatorKind::CapitalGains => run_json::<CapitalGains>(payload),
        CalculatorKind::FdSustainability => run_json::<FdSustainability>(payload),
        CalculatorKind::Fire => run_json::<Fire>(payload),
        CalculatorKind::Insurance => run_json::<Insurance>(payload),
        CalculatorKind::BuyVsRent => run_json::<BuyVsRent>(payload),
        CalculatorKind::Annuity => run_json::<Annuity>(payload),
        CalculatorKind::Endowment => run_json::<Endowment>(payload),
        CalculatorKind::MbaRoi => run_json::<MbaRoi>(payload),
        CalculatorKind::HourlyRate => run_json::<HourlyRate>(payload),
        CalculatorKind::FirstCrore => run_json::<FirstCrore>(payload),
        CalculatorKind::EquityReturns => {
            fill_valuation_date(&mut payload);
            run_json::<EquityReturns>(payload)
        }
        CalculatorKind::MfVsNps => run_json::<MfVsNps>(payload),
        CalculatorKind::TaxDeferral => run_json::<TaxDeferral>(payload),
    }
}

fn run_json<C: Calculator>(payload: Value) -> Result<Value, CalcError> {
    let input = serde_json::from_value::<C::Input>(payload)
        .map_err(|e| CalcError::Payload(format!("{} input: {e}", C::NAME)))?;
    let report = C::run(&input)?;
    serde_json::to_value(report).map_err(|e| CalcError::Encoding(e.to_string()))
}

fn fill_valuation_date(payload: &mut Value) {
    if let Value::Object(fields) = payload {
        let missing = fields.get("asOf").is_none_or(Value::is_null);
        if missing {
            let today = Local::now().date_naive();
            fields.insert("asOf".to_string(), Value::String(today.to_string()));
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/calculators", get(list_handler))
        .route("/api/calculate/:name", post(calculate_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, calculators = CalculatorKind::ALL.len(), "fincalc HTTP API listening");
    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    with_cache_control("ok")
}

async fn list_handler() -> Response {
    json_response(StatusCode::OK, calculators())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_handler(Path(name): Path<String>, body: Bytes) -> Response {
    let result = CalculatorKind::from_name(&name).and_then(|kind| {
        let payload = serde_json::from_slice::<Value>(&body)
            .map_err(|e| CalcError::Payload(format!("Invalid JSON body: {e}")))?;
        calculate(kind, payload)
    });

    match result {
        Ok(report) => {
            tracing::info!(calculator = %name, "calculated");
            json_response(StatusCode::OK, report)
        }
        Err(err) => {
            tracing::warn!(calculator = %name, error = %err, "calculation rejected");
            calc_error_response(err)
        }
    }
}

fn calc_error_response(err: CalcError) -> Response {
    let status = match &err {
        CalcError::Validation(_) | CalcError::Payload(_) => StatusCode::BAD_REQUEST,
        CalcError::UnknownCalculator(_) => StatusCode::NOT_FOUND,
        CalcError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = err.to_string();
    let fields = match err {
        CalcError::Validation(fields) => Some(fields),
        _ => None,
    };
    json_response(
        status,
        ErrorResponse {
            error: message,
            fields,
        },
    )
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
            fields: None,
        },
    )
}
