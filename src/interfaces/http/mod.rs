use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::application::use_cases::input_normalizer::{ArchiveEntry, RequirementInput};
use crate::application::GenerationUseCase;
use crate::domain::error::AppError;
use crate::domain::task::TaskKind;
use crate::domain::test_case::TestType;
use crate::infrastructure::config::ServerSettings;
use crate::infrastructure::figma::{extract_file_key, FigmaClient};

#[derive(Clone)]
pub struct AppState {
    pub generation_use_case: Arc<GenerationUseCase>,
    pub figma_client: Arc<FigmaClient>,
}

const DEFAULT_PROJECT: &str = "default";

#[derive(Deserialize, Validate)]
pub struct SuggestFromTextRequest {
    #[validate(length(min = 1))]
    pub requirements: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SuggestFromFileRequest {
    #[validate(length(min = 1))]
    pub file_name: String,
    pub extracted_text: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ScreenshotUpload {
    pub file_name: String,
    pub data_base64: String,
}

#[derive(Deserialize, Validate)]
pub struct SuggestFromScreenshotsRequest {
    #[validate(length(min = 1))]
    pub archive_name: String,
    pub images: Vec<ScreenshotUpload>,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SuggestFromFigmaRequest {
    #[validate(length(min = 1))]
    pub figma_url: String,
    #[validate(length(min = 1))]
    pub figma_token: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct AnalyzeDefectRequest {
    #[validate(length(min = 1))]
    pub failed_test: String,
    #[validate(length(min = 1))]
    pub error_logs: String,
    #[serde(default)]
    pub steps_reproduced: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct RecommendAutomationRequest {
    #[validate(length(min = 1))]
    pub test_case_description: String,
    #[validate(length(min = 1))]
    pub execution_frequency: String,
    #[validate(length(min = 1))]
    pub stability: String,
    #[validate(range(min = 1))]
    pub manual_time_mins: u32,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct CodeImpactRequest {
    #[validate(length(min = 1))]
    pub code_change_description: String,
    #[validate(length(min = 1))]
    pub test_case_description: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Lenient batch element. Callers send whatever fields their test
/// management tool exports; missing ones fall back to defaults instead
/// of rejecting the whole batch.
#[derive(Deserialize, serde::Serialize)]
pub struct BatchCaseUpload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(rename = "type", default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub test_steps: Vec<String>,
}

#[derive(Deserialize, Validate)]
pub struct AutomationBatchRequest {
    #[validate(length(min = 1))]
    pub test_cases: Vec<BatchCaseUpload>,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn project_of(project_id: &Option<String>) -> &str {
    project_id
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_PROJECT)
}

fn error_response(err: AppError) -> HttpResponse {
    error!(error = %err, "Request failed");
    let body = json!({ "error": err.to_string() });
    if err.is_input_error() {
        return HttpResponse::BadRequest().json(body);
    }
    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::GenerationUnavailable(_) => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn validation_failure(err: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": err.to_string() }))
}

async fn run_generation(
    data: &web::Data<AppState>,
    project_id: &str,
    task_kind: TaskKind,
    input: RequirementInput,
) -> HttpResponse {
    match data
        .generation_use_case
        .execute(project_id, task_kind, input)
        .await
    {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(err) => error_response(err),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "Backend is running" }))
}

#[post("/suggest-test-cases")]
async fn suggest_test_cases(
    data: web::Data<AppState>,
    req: web::Json<SuggestFromTextRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!("Suggesting test cases from text input");
    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::GenerateTestCases,
        RequirementInput::Text(req.requirements.clone()),
    )
    .await
}

#[post("/suggest-test-cases-from-file")]
async fn suggest_test_cases_from_file(
    data: web::Data<AppState>,
    req: web::Json<SuggestFromFileRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!(file = %req.file_name, "Suggesting test cases from document text");
    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::GenerateTestCases,
        RequirementInput::Document {
            file_name: req.file_name.clone(),
            text: req.extracted_text.clone(),
        },
    )
    .await
}

#[post("/suggest-test-cases-from-screenshots")]
async fn suggest_test_cases_from_screenshots(
    data: web::Data<AppState>,
    req: web::Json<SuggestFromScreenshotsRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!(archive = %req.archive_name, count = req.images.len(), "Suggesting test cases from screenshots");

    let mut entries = Vec::with_capacity(req.images.len());
    for image in &req.images {
        match STANDARD.decode(image.data_base64.as_bytes()) {
            Ok(data) => entries.push(ArchiveEntry {
                file_name: image.file_name.clone(),
                data,
            }),
            Err(_) => {
                return HttpResponse::BadRequest().json(json!({
                    "error": format!("Image '{}' is not valid base64.", image.file_name)
                }))
            }
        }
    }

    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::GenerateTestCases,
        RequirementInput::Screenshots {
            archive_name: req.archive_name.clone(),
            entries,
        },
    )
    .await
}

#[post("/suggest-test-cases-from-figma")]
async fn suggest_test_cases_from_figma(
    data: web::Data<AppState>,
    req: web::Json<SuggestFromFigmaRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }

    let Some(file_key) = extract_file_key(&req.figma_url) else {
        return HttpResponse::BadRequest().json(json!({
            "error": "Could not extract a file key from the provided Figma URL."
        }));
    };
    info!(file_key = %file_key, "Suggesting test cases from Figma file");

    let file = match data.figma_client.fetch_file(&file_key, &req.figma_token).await {
        Ok(file) => file,
        Err(err) => return error_response(err),
    };

    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::GenerateTestCases,
        RequirementInput::Figma(file),
    )
    .await
}

#[post("/analyze-defect")]
async fn analyze_defect(
    data: web::Data<AppState>,
    req: web::Json<AnalyzeDefectRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!(failed_test = %req.failed_test, "Analyzing defect");

    let mut body = String::new();
    body.push_str(&format!("Failed Test Case: {}\n", req.failed_test));
    body.push_str(&format!("Error Logs:\n{}\n", req.error_logs));
    body.push_str(&format!(
        "Steps to Reproduce: {}\n",
        optional_field(&req.steps_reproduced)
    ));
    body.push_str(&format!(
        "Additional Context: {}\n",
        optional_field(&req.context)
    ));

    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::AnalyzeDefect,
        RequirementInput::Text(body),
    )
    .await
}

#[post("/recommend-automation")]
async fn recommend_automation(
    data: web::Data<AppState>,
    req: web::Json<RecommendAutomationRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!("Evaluating automation suitability");

    let mut body = String::new();
    body.push_str(&format!("Description: {}\n", req.test_case_description));
    body.push_str(&format!("Execution Frequency: {}\n", req.execution_frequency));
    body.push_str(&format!("Feature Stability: {}\n", req.stability));
    body.push_str(&format!(
        "Estimated Manual Execution Time (minutes): {}\n",
        req.manual_time_mins
    ));

    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::RecommendAutomation,
        RequirementInput::Text(body),
    )
    .await
}

#[post("/analyze-code-change-impact")]
async fn analyze_code_change_impact(
    data: web::Data<AppState>,
    req: web::Json<CodeImpactRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!("Analyzing code change impact");

    let body = format!(
        "Code Change Description:\n{}\n\nTest Case Description:\n{}\n",
        req.code_change_description, req.test_case_description
    );

    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::AnalyzeCodeChangeImpact,
        RequirementInput::Text(body),
    )
    .await
}

#[post("/analyze-for-automation-batch")]
async fn analyze_for_automation_batch(
    data: web::Data<AppState>,
    req: web::Json<AutomationBatchRequest>,
) -> impl Responder {
    if let Err(err) = req.validate() {
        return validation_failure(err);
    }
    info!(count = req.test_cases.len(), "Scoring test case batch for automation");

    let mut body = String::new();
    for case in &req.test_cases {
        body.push_str(&format!(
            "{} | [{:?}] {} | {} | steps: {}\n",
            case.id,
            TestType::normalize(case.case_type.as_deref()),
            case.scenario,
            case.summary,
            case.test_steps.len()
        ));
    }

    run_generation(
        &data,
        project_of(&req.project_id),
        TaskKind::AnalyzeForAutomationBatch,
        RequirementInput::Text(body),
    )
    .await
}

#[get("/generations/{project_id}")]
async fn list_generations(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match data.generation_use_case.history(&path.into_inner()).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(err) => error_response(err),
    }
}

pub fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .service(health)
        .service(suggest_test_cases)
        .service(suggest_test_cases_from_file)
        .service(suggest_test_cases_from_screenshots)
        .service(suggest_test_cases_from_figma)
        .service(analyze_defect)
        .service(recommend_automation)
        .service(analyze_code_change_impact)
        .service(analyze_for_automation_batch)
        .service(list_generations)
}

pub fn run_server(settings: &ServerSettings, state: AppState) -> std::io::Result<Server> {
    let data = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .service(api_scope())
    })
    .bind((settings.host.as_str(), settings.port))?
    .run();
    Ok(server)
}

fn optional_field(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("Not provided")
}
