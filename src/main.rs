use anyhow::Context;
use poem::{listener::TcpListener, Server};

use catalog::configuration::get_configuration;
use catalog::context::StateContext;
use catalog::idempotency_cleanup_worker::run_worker_until_stopped;
use catalog::routes::default_route;
use catalog::setup_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let conf = get_configuration().context("fail to read configuration")?;
    setup_logger(conf.log_level.as_deref().unwrap_or("info"))
        .context("fail to set up tracing subscriber")?;

    let context = StateContext::new(&conf).await?;
    let worker = tokio::spawn(run_worker_until_stopped(
        context.idempotency.clone(),
        conf.idempotency.cleanup_interval(),
    ));

    let address = format!("{}:{}", conf.host, conf.app_port);
    let route = default_route(&conf, context);
    let served = Server::new(TcpListener::bind(address)).run(route).await;
    worker.abort();
    served.context("server stopped unexpectedly")
}
