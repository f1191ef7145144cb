use agency_backend::ai::{GeminiClient, VertexImagenClient};
use agency_backend::build_runtime;
use agency_backend::config::Config;
use agency_backend::session::{Event, SessionRuntime};
use dotenv::dotenv;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const SAMPLE_SCENARIOS: [&str; 4] = [
    "I need a domain name for my new coffee shop, Brew & Bean",
    "Find a domain and build a website for my eco-friendly startup, EcoTech Solutions",
    "Help me create a marketing strategy to promote my bakery, Sweet Crumbs",
    "Design a logo for my fitness app, FitTracker",
];

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!(
        "Starting agency backend (model={}, image_model={})",
        config.model,
        config.image_model
    );

    let model = match GeminiClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to initialize Gemini client: {}", e);
            std::process::exit(1);
        }
    };
    let images = match VertexImagenClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to initialize Imagen client: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = build_runtime(model, images, &config);
    let session = runtime.create_session("marketing_agency", "local");

    if std::env::args().any(|arg| arg == "--interactive") {
        interactive_loop(&runtime, &session.id).await;
        return;
    }

    println!("Marketing agency scenarios:");
    for (i, scenario) in SAMPLE_SCENARIOS.iter().enumerate() {
        println!("  {}. {}", i + 1, scenario);
    }
    println!("  5. Custom request");
    println!("  6. Interactive mode");
    print!("Choose [1-6]: ");
    let _ = io::stdout().flush();

    let choice = read_line();
    match choice.trim() {
        "1" | "2" | "3" | "4" => {
            let index = choice.trim().parse::<usize>().unwrap_or(1) - 1;
            run_turn(&runtime, &session.id, SAMPLE_SCENARIOS[index]).await;
        }
        "5" => {
            print!("Your request: ");
            let _ = io::stdout().flush();
            let request = read_line();
            if request.trim().is_empty() {
                eprintln!("Empty request, nothing to do");
                std::process::exit(1);
            }
            run_turn(&runtime, &session.id, request.trim()).await;
        }
        "6" => interactive_loop(&runtime, &session.id).await,
        other => {
            eprintln!("Unknown choice: {}", other);
            std::process::exit(1);
        }
    }
}

async fn interactive_loop(runtime: &SessionRuntime, session_id: &str) {
    println!("Interactive mode. Type 'quit' or 'exit' to leave.");
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = read_line();
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }
        run_turn(runtime, session_id, message).await;
    }
}

/// Run one turn and print events as they stream in. Tool events render as
/// progress lines; the final coordinator text is the reply.
async fn run_turn(runtime: &SessionRuntime, session_id: &str, message: &str) {
    let mut stream = match runtime.run(session_id, message) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Failed to run turn: {}", e);
            std::process::exit(1);
        }
    };

    let mut final_text = String::new();
    while let Some(event) = stream.next_event().await {
        match event {
            Event::ToolCallRequest { author, tool, .. } => {
                println!("[{}] calling {} ...", author, tool);
            }
            Event::ToolCallResult { tool, result, .. } => {
                if result.success {
                    println!("[{}] done", tool);
                } else {
                    println!("[{}] failed: {}", tool, result.error_message());
                }
            }
            Event::Text { content, .. } => {
                final_text = content;
            }
        }
    }

    if final_text.is_empty() {
        eprintln!("The turn produced no reply");
        std::process::exit(1);
    }
    println!("\n{}\n", final_text);
}

fn read_line() -> String {
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    line
}
