#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use cpm_engine::{ProjectPlan, http_api, load_plan_from_json, logging};

    logging::init_logging("info");

    let addr: SocketAddr = std::env::var(http_api::HTTP_ADDR_ENV_VAR)
        .unwrap_or_else(|_| http_api::DEFAULT_HTTP_ADDR.to_string())
        .parse()?;

    // Optional seed plan: `http <plan.json>`
    let plan = match std::env::args().nth(1) {
        Some(path) => load_plan_from_json(&path)?,
        None => ProjectPlan::default(),
    };

    http_api::serve(addr, plan).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
