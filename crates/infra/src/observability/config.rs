use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

impl ServiceContext {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::resolve(
            component,
            env_string("SERVICE_NAME"),
            env_string("STAGE"),
        )
    }

    fn resolve(
        component: &str,
        service_name: Option<String>,
        environment: Option<String>,
    ) -> Self {
        let component = component.trim().to_string();

        let service_name = service_name
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = environment
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "local".to_string());

        Self {
            service_name,
            environment,
            component,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}
