use clap::Args;

use crate::config::{AppConfig, DatabaseBackend, TenantAccess};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port (overrides TENANCY_API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Use the in-memory store instead of PostgreSQL")]
    pub memory: bool,

    #[arg(long, value_parser = parse_access, help = "Tenant visibility: global or scoped")]
    pub tenant_access: Option<TenantAccess>,
}

fn parse_access(value: &str) -> Result<TenantAccess, String> {
    value.parse()
}

impl ServeArgs {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.memory {
            config.database.backend = DatabaseBackend::Memory;
        }
        if let Some(access) = self.tenant_access {
            config.tenancy.tenant_access = access;
        }
        config
    }
}

pub async fn handle(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    crate::server::run(args.apply(config)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = ServeArgs {
            host: Some("0.0.0.0".into()),
            port: Some(9000),
            memory: true,
            tenant_access: Some(TenantAccess::Scoped),
        };
        let config = args.apply(AppConfig::production());
        assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.tenancy.tenant_access, TenantAccess::Scoped);
    }
}
