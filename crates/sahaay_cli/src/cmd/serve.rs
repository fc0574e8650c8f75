use sahaay_config::{Config, KvAssignment};
use sahaay_relay::{AppState, Upstream};
use tokio::net::TcpListener;

use super::Success;
use crate::{Result, ctx::Ctx, signals};

#[derive(Debug, clap::Args)]
pub(crate) struct Serve {
    /// Address to listen on, overrides `relay.bind`.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

impl Serve {
    pub(crate) fn apply_cli_config(&self, config: &mut Config) -> Result<()> {
        if let Some(bind) = &self.bind {
            config.assign(&KvAssignment::new("relay.bind", bind))?;
        }

        Ok(())
    }

    /// Serve until SIGINT or SIGTERM.
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let config = &ctx.config.relay;

        let upstream = Upstream::new(config.api_key.clone())
            .with_url(&config.upstream_url)
            .with_model(&config.model);
        let state = AppState::new(upstream).with_client_key(config.client_key.clone());

        let listener = TcpListener::bind(&config.bind).await?;
        sahaay_relay::serve(listener, state, signals::shutdown()).await?;

        Ok(Success::Ok)
    }
}
