use migration::{Migrator, MigratorTrait};
use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};

use carmeet_backend::api::{AuthApi, HealthApi};
use carmeet_backend::app_data::AppData;
use carmeet_backend::config::{self, ApplicationSettings};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    config::init_logging().expect("Failed to initialize logging");

    let settings = ApplicationSettings::from_env();

    // Connect to database and bring the schema up to date
    let db: DatabaseConnection = Database::connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database: {}", settings.database_url);

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Database migrations completed");

    let bind_address = settings.bind_address.clone();
    let base_url = settings.base_url.clone();

    let app_data = AppData::init(db, settings).expect("Failed to initialize application data");

    let auth_api = AuthApi::new(
        app_data.identity_service.clone(),
        app_data.token_service.clone(),
    );

    let api_service = OpenApiService::new((HealthApi, auth_api), "Car Meet API", "1.0.0")
        .server(format!("{}/api", base_url.trim_end_matches('/')));

    let ui = api_service.swagger_ui();

    // Compose routes: API under /api, Swagger UI under /swagger
    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    tracing::info!("Starting server on http://{}", bind_address);
    tracing::info!("Swagger UI available at {}/swagger", base_url);

    Server::new(TcpListener::bind(bind_address)).run(app).await
}
