use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    ForecastInputs, JobType, Strategy, classify_income, income_axis_max, run_projection,
};
use crate::quotes::{PriceTable, QuoteConfig, resolve_prices};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Tortoise,
    Hare,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Tortoise => Strategy::Tortoise,
            CliStrategy::Hare => Strategy::Hare,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliJobType {
    WhiteCollar,
    BlueCollar,
}

impl From<CliJobType> for JobType {
    fn from(value: CliJobType) -> Self {
        match value {
            CliJobType::WhiteCollar => JobType::WhiteCollar,
            CliJobType::BlueCollar => JobType::BlueCollar,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "conservative", alias = "slow-and-safe")]
    Tortoise,
    #[serde(alias = "aggressive", alias = "swift-and-aggressive")]
    Hare,
}

impl From<ApiStrategy> for CliStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Tortoise => CliStrategy::Tortoise,
            ApiStrategy::Hare => CliStrategy::Hare,
        }
    }
}

impl From<Strategy> for ApiStrategy {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::Tortoise => ApiStrategy::Tortoise,
            Strategy::Hare => ApiStrategy::Hare,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiJobType {
    #[serde(alias = "white", alias = "whiteCollar", alias = "white_collar")]
    WhiteCollar,
    #[serde(alias = "blue", alias = "blueCollar", alias = "blue_collar")]
    BlueCollar,
}

impl From<ApiJobType> for CliJobType {
    fn from(value: ApiJobType) -> Self {
        match value {
            ApiJobType::WhiteCollar => CliJobType::WhiteCollar,
            ApiJobType::BlueCollar => CliJobType::BlueCollar,
        }
    }
}

impl From<JobType> for ApiJobType {
    fn from(value: JobType) -> Self {
        match value {
            JobType::WhiteCollar => ApiJobType::WhiteCollar,
            JobType::BlueCollar => ApiJobType::BlueCollar,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ForecastPayload {
    starting_capital: Option<f64>,
    symbol: Option<String>,
    strategy: Option<ApiStrategy>,
    job_type: Option<ApiJobType>,
    months: Option<u32>,
    anchor_date: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
#[command(
    name = "tradfiwife",
    about = "Options income forecast (live quote resolution + compounding monthly projection)"
)]
struct Cli {
    #[arg(
        long,
        default_value_t = 25_000.0,
        help = "Starting capital; the displayed $25,000 minimum is advisory and never enforced"
    )]
    starting_capital: f64,
    #[arg(long, default_value = "NVDA")]
    symbol: String,
    #[arg(long, value_enum, default_value_t = CliStrategy::Tortoise)]
    strategy: CliStrategy,
    #[arg(long, value_enum, default_value_t = CliJobType::WhiteCollar)]
    job_type: CliJobType,
    #[arg(
        long,
        default_value_t = 36,
        help = "Projection horizon in months; the output holds months + 1 points"
    )]
    months: u32,
    #[arg(long, help = "Anchor date (YYYY-MM-DD) for point dates; defaults to today")]
    anchor_date: Option<NaiveDate>,
}

#[derive(Debug)]
struct ForecastParams {
    starting_capital: f64,
    symbol: String,
    strategy: Strategy,
    job_type: JobType,
    months: u32,
    anchor_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPointView {
    month: u32,
    income: f64,
    capital: f64,
    contracts: u64,
    date: NaiveDate,
    surviving: bool,
    thriving: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastResponse {
    symbol: String,
    share_price: f64,
    strategy: ApiStrategy,
    job_type: ApiJobType,
    months: u32,
    anchor_date: NaiveDate,
    survival_threshold: f64,
    thriving_threshold: f64,
    chart_max_income: f64,
    points: Vec<ForecastPointView>,
}

#[derive(Debug, Serialize)]
struct PricesResponse {
    prices: PriceTable,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_params(cli: Cli) -> Result<ForecastParams, String> {
    if !cli.starting_capital.is_finite() {
        return Err("--starting-capital must be a finite number".to_string());
    }

    let symbol = cli.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err("--symbol must not be empty".to_string());
    }

    if cli.months > 600 {
        return Err("--months must be <= 600".to_string());
    }

    Ok(ForecastParams {
        starting_capital: cli.starting_capital,
        symbol,
        strategy: cli.strategy.into(),
        job_type: cli.job_type.into(),
        months: cli.months,
        anchor_date: cli.anchor_date,
    })
}

pub async fn run_http_server(port: u16, config: QuoteConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/prices", get(prices_handler))
        .route(
            "/api/forecast",
            get(forecast_get_handler).post(forecast_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(Arc::new(config));

    let listener = TcpListener::bind(addr).await?;
    println!("TradFiWife HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
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

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn prices_handler(State(config): State<Arc<QuoteConfig>>) -> Response {
    let prices = resolve_prices(&config).await;
    json_response(StatusCode::OK, PricesResponse { prices })
}

async fn forecast_get_handler(
    State(config): State<Arc<QuoteConfig>>,
    Query(payload): Query<ForecastPayload>,
) -> Response {
    forecast_handler_impl(config, payload).await
}

async fn forecast_post_handler(
    State(config): State<Arc<QuoteConfig>>,
    Json(payload): Json<ForecastPayload>,
) -> Response {
    forecast_handler_impl(config, payload).await
}

async fn forecast_handler_impl(config: Arc<QuoteConfig>, payload: ForecastPayload) -> Response {
    let params = match params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let prices = resolve_prices(&config).await;
    // Unknown symbols project as a flat zero-income sequence rather than
    // rejecting the selection.
    let share_price = prices.get(&params.symbol).copied().unwrap_or(0.0);
    let anchor_date = params
        .anchor_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let response = build_forecast_response(&params, share_price, anchor_date);
    json_response(StatusCode::OK, response)
}

fn build_forecast_response(
    params: &ForecastParams,
    share_price: f64,
    anchor_date: NaiveDate,
) -> ForecastResponse {
    let inputs = ForecastInputs {
        starting_capital: params.starting_capital,
        share_price,
        strategy: params.strategy,
        months: params.months,
        anchor_date,
    };
    let points = run_projection(&inputs);
    let thresholds = params.job_type.thresholds();
    let chart_max_income = income_axis_max(&points, thresholds);

    let points = points
        .into_iter()
        .map(|point| {
            let status = classify_income(point.income, thresholds);
            ForecastPointView {
                month: point.month,
                income: point.income,
                capital: point.capital,
                contracts: point.contracts,
                date: point.date,
                surviving: status.surviving,
                thriving: status.thriving,
            }
        })
        .collect();

    ForecastResponse {
        symbol: params.symbol.clone(),
        share_price,
        strategy: params.strategy.into(),
        job_type: params.job_type.into(),
        months: params.months,
        anchor_date,
        survival_threshold: thresholds.survival,
        thriving_threshold: thresholds.thriving,
        chart_max_income,
        points,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
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
fn params_from_json(json: &str) -> Result<ForecastParams, String> {
    let payload = serde_json::from_str::<ForecastPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    params_from_payload(payload)
}

fn params_from_payload(payload: ForecastPayload) -> Result<ForecastParams, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.starting_capital {
        cli.starting_capital = v;
    }
    if let Some(v) = payload.symbol {
        cli.symbol = v;
    }
    if let Some(v) = payload.strategy {
        cli.strategy = v.into();
    }
    if let Some(v) = payload.job_type {
        cli.job_type = v.into();
    }
    if let Some(v) = payload.months {
        cli.months = v;
    }
    if let Some(v) = payload.anchor_date {
        cli.anchor_date = Some(v);
    }

    build_params(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        starting_capital: 25_000.0,
        symbol: "NVDA".to_string(),
        strategy: CliStrategy::Tortoise,
        job_type: CliJobType::WhiteCollar,
        months: 36,
        anchor_date: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    fn fixed_anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[test]
    fn build_params_uppercases_and_trims_symbol() {
        let mut cli = sample_cli();
        cli.symbol = "  nvda ".to_string();
        let params = build_params(cli).expect("valid params");
        assert_eq!(params.symbol, "NVDA");
    }

    #[test]
    fn build_params_rejects_non_finite_capital() {
        let mut cli = sample_cli();
        cli.starting_capital = f64::NAN;
        let err = build_params(cli).expect_err("must reject NaN capital");
        assert!(err.contains("--starting-capital"));
    }

    #[test]
    fn build_params_accepts_capital_below_the_advisory_minimum() {
        let mut cli = sample_cli();
        cli.starting_capital = 500.0;
        let params = build_params(cli).expect("advisory floor is not enforced");
        assert_approx(params.starting_capital, 500.0);
    }

    #[test]
    fn build_params_rejects_empty_symbol() {
        let mut cli = sample_cli();
        cli.symbol = "   ".to_string();
        let err = build_params(cli).expect_err("must reject empty symbol");
        assert!(err.contains("--symbol"));
    }

    #[test]
    fn build_params_rejects_oversized_horizon() {
        let mut cli = sample_cli();
        cli.months = 601;
        let err = build_params(cli).expect_err("must reject oversized horizon");
        assert!(err.contains("--months"));
    }

    #[test]
    fn params_from_json_parses_web_keys_and_aliases() {
        let json = r#"{
          "startingCapital": 50000,
          "symbol": "TSLA",
          "strategy": "conservative",
          "jobType": "white",
          "months": 24,
          "anchorDate": "2025-06-01"
        }"#;
        let params = params_from_json(json).expect("json should parse");

        assert_approx(params.starting_capital, 50_000.0);
        assert_eq!(params.symbol, "TSLA");
        assert_eq!(params.strategy, Strategy::Tortoise);
        assert_eq!(params.job_type, JobType::WhiteCollar);
        assert_eq!(params.months, 24);
        assert_eq!(params.anchor_date, Some(fixed_anchor()));
    }

    #[test]
    fn params_from_json_parses_original_strategy_names() {
        let params = params_from_json(r#"{"strategy": "hare", "jobType": "blue-collar"}"#)
            .expect("json should parse");
        assert_eq!(params.strategy, Strategy::Hare);
        assert_eq!(params.job_type, JobType::BlueCollar);
    }

    #[test]
    fn empty_payload_uses_documented_defaults() {
        let params = params_from_json("{}").expect("defaults should apply");
        assert_approx(params.starting_capital, 25_000.0);
        assert_eq!(params.symbol, "NVDA");
        assert_eq!(params.strategy, Strategy::Tortoise);
        assert_eq!(params.job_type, JobType::WhiteCollar);
        assert_eq!(params.months, 36);
        assert_eq!(params.anchor_date, None);
    }

    #[test]
    fn forecast_response_serialization_contains_expected_fields() {
        let params = params_from_json("{}").expect("defaults should apply");
        let response = build_forecast_response(&params, 788.17, fixed_anchor());
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"sharePrice\""));
        assert!(json.contains("\"survivalThreshold\""));
        assert!(json.contains("\"thrivingThreshold\""));
        assert!(json.contains("\"chartMaxIncome\""));
        assert!(json.contains("\"points\""));
        assert!(json.contains("\"surviving\""));
        assert_eq!(response.points.len(), 37);
    }

    #[test]
    fn unresolved_price_produces_flat_zero_forecast() {
        let params = params_from_json(r#"{"symbol": "UNKNOWN"}"#).expect("valid params");
        let response = build_forecast_response(&params, 0.0, fixed_anchor());

        assert_approx(response.share_price, 0.0);
        assert_approx(response.chart_max_income, 20_000.0);
        for point in &response.points {
            assert_eq!(point.contracts, 0);
            assert_approx(point.income, 0.0);
            assert!(!point.surviving);
            assert!(!point.thriving);
        }
    }

    #[test]
    fn thriving_points_are_also_surviving_points() {
        let params = params_from_json(r#"{"startingCapital": 10000000, "strategy": "hare"}"#)
            .expect("valid params");
        let response = build_forecast_response(&params, 788.17, fixed_anchor());

        let last = response.points.last().expect("non-empty");
        assert!(last.thriving);
        assert!(last.surviving);
        for point in &response.points {
            if point.thriving {
                assert!(point.surviving);
            }
        }
    }
}
