use claimflow_server::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("claimflow-server: {err}");
        std::process::exit(1);
    }
}
