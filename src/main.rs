use dotenvy::dotenv;

use scolara::cli;
use scolara::logging::init_tracing;
use scolara::router::init_router;
use scolara::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "create-super" {
        handle_create_super(args).await;
        return;
    }

    init_tracing();

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to 0.0.0.0:3000");
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    axum::serve(listener, app)
        .await
        .expect("Server exited with an error");
}

async fn handle_create_super(args: Vec<String>) {
    if args.len() != 7 {
        eprintln!(
            "Usage: {} create-super <first_name> <last_name> <username> <email> <password>",
            args[0]
        );
        std::process::exit(1);
    }

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    match cli::create_super_admin(&pool, &args[2], &args[3], &args[4], &args[5], &args[6]).await {
        Ok(_) => {
            println!("✅ Super administrator created successfully!");
            println!("   Username: {}", args[4]);
        }
        Err(e) => {
            eprintln!("❌ Error creating super administrator: {}", e);
            std::process::exit(1);
        }
    }
}
