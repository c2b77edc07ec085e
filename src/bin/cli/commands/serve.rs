use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use vocab_swipe_lib::server::start_server;

use crate::app::App;

pub fn run(app: &App, addr: Option<&str>) -> Result<()> {
    let addr = addr.map(str::to_string).unwrap_or_else(|| app.config.server_addr());
    let store = Arc::clone(&app.store);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let mut server = start_server(&addr, store)
            .await
            .map_err(|e| anyhow!("Failed to start server on {}: {}", addr, e))?;

        println!("Serving {}/api (Ctrl+C to stop)", server.base_url());
        tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;
        server.stop();
        Ok(())
    })
}
