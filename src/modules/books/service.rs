use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One deployable slice of the books API.
///
/// `All` serves everything from a single process; the others serve a single
/// operation (or the HTML pages) each, on their own default port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Service {
    #[default]
    All,
    List,
    Create,
    Update,
    Delete,
    Web,
}

#[derive(Error, Debug)]
#[error("unknown service '{0}'; expected one of all, list, create, update, delete, web")]
pub struct ParseServiceError(String);

impl Service {
    pub const ALL: [Service; 6] = [
        Service::All,
        Service::List,
        Service::Create,
        Service::Update,
        Service::Delete,
        Service::Web,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::All => "all",
            Service::List => "list",
            Service::Create => "create",
            Service::Update => "update",
            Service::Delete => "delete",
            Service::Web => "web",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Service::All => 3030,
            Service::List => 8080,
            Service::Create => 8081,
            Service::Update => 8082,
            Service::Delete => 8083,
            Service::Web => 8084,
        }
    }

    pub fn serves_list(self) -> bool {
        matches!(self, Service::All | Service::List)
    }

    pub fn serves_create(self) -> bool {
        matches!(self, Service::All | Service::Create)
    }

    pub fn serves_update(self) -> bool {
        matches!(self, Service::All | Service::Update)
    }

    pub fn serves_delete(self) -> bool {
        matches!(self, Service::All | Service::Delete)
    }

    pub fn serves_views(self) -> bool {
        matches!(self, Service::All | Service::Web)
    }

    /// Only the all-in-one process seeds the collection at startup.
    pub fn seeds_on_start(self) -> bool {
        self == Service::All
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Service {
    type Err = ParseServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseServiceError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for service in Service::ALL {
            assert_eq!(service.name().parse::<Service>().unwrap(), service);
        }
        assert_eq!("DELETE".parse::<Service>().unwrap(), Service::Delete);
    }

    #[test]
    fn unknown_service_is_rejected() {
        let err = "archive".parse::<Service>().unwrap_err();
        assert!(err.to_string().contains("unknown service 'archive'"));
    }

    #[test]
    fn each_service_has_its_own_port() {
        let mut ports: Vec<u16> = Service::ALL.iter().map(|s| s.default_port()).collect();
        ports.sort_unstable();
        ports.dedup();
        assert_eq!(ports.len(), Service::ALL.len());
    }

    #[test]
    fn single_operation_services_serve_one_route() {
        assert!(Service::List.serves_list());
        assert!(!Service::List.serves_create());
        assert!(!Service::Delete.serves_views());
        assert!(Service::Web.serves_views());
        assert!(!Service::Web.serves_update());
        assert!(Service::All.seeds_on_start());
        assert!(!Service::Create.seeds_on_start());
    }
}
