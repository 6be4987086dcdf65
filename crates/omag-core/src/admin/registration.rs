//! Catalogue of the services this platform can run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    AccessService,
    ViewService,
    EngineService,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredService {
    pub service_id: u32,
    pub service_name: String,
    pub service_full_name: String,
    pub service_url_marker: String,
    pub service_description: String,
    pub service_wiki: String,
    pub kind: ServiceKind,
}

pub const DATA_MANAGER_URL_MARKER: &str = "data-manager";

const WIKI_ROOT: &str = "https://egeria-project.org/services";

// (id, name, url marker, description)
const ACCESS_SERVICES: &[(u32, &str, &str, &str)] = &[
    (200, "Asset Catalog", "asset-catalog", "Search and understand your assets"),
    (201, "Asset Consumer", "asset-consumer", "Access assets through connectors"),
    (202, "Asset Owner", "asset-owner", "Manage an asset"),
    (203, "Community Profile", "community-profile", "Define personal profile and collaborate"),
    (204, "Data Engine", "data-engine", "Exchange process models and lineage with a data engine"),
    (
        205,
        "Data Manager",
        DATA_MANAGER_URL_MARKER,
        "Capture changes to the data stores and data set managed by a data manager such as \
         a database server, content manager or file system",
    ),
    (206, "Data Science", "data-science", "Create and manage data science definitions and models"),
    (
        207,
        "Digital Architecture",
        "digital-architecture",
        "Design of the digital services for an organization",
    ),
    (208, "Governance Engine", "governance-engine", "Set up an operational governance engine"),
    (
        209,
        "IT Infrastructure",
        "it-infrastructure",
        "Manage information about the deployed IT infrastructure",
    ),
    (210, "Project Management", "project-management", "Manage data projects"),
    (
        211,
        "Security Manager",
        "security-manager",
        "Manage exchange of security information with security managers",
    ),
    (
        212,
        "Stewardship Action",
        "stewardship-action",
        "Manage exceptions and actions from open governance",
    ),
];

const VIEW_SERVICES: &[(u32, &str, &str, &str)] = &[
    (800, "Glossary Author", "glossary-author", "Author glossaries"),
    (801, "Repository Explorer", "rex", "Explore open metadata instances"),
    (802, "Type Explorer", "tex", "Explore the open metadata types in a repository or cohort"),
    (
        803,
        "Dynamic Infrastructure and Operations",
        "dino",
        "Explore and operate an open metadata ecosystem",
    ),
    (804, "Server Author", "server-author", "Author servers"),
];

const ENGINE_SERVICES: &[(u32, &str, &str, &str)] = &[
    (600, "Asset Analysis", "asset-analysis", "Analyse the content of an asset"),
    (601, "Governance Action", "governance-action", "Execute requested governance action services"),
    (
        602,
        "Repository Governance",
        "repository-governance",
        "Dynamically govern open metadata repositories",
    ),
];

fn build(entries: &[(u32, &str, &str, &str)], kind: ServiceKind) -> Vec<RegisteredService> {
    let suffix = match kind {
        ServiceKind::AccessService => "OMAS",
        ServiceKind::ViewService => "OMVS",
        ServiceKind::EngineService => "OMES",
    };
    let section = match kind {
        ServiceKind::AccessService => "omas",
        ServiceKind::ViewService => "omvs",
        ServiceKind::EngineService => "omes",
    };
    entries
        .iter()
        .map(|(id, name, marker, description)| RegisteredService {
            service_id: *id,
            service_name: name.to_string(),
            service_full_name: format!("{name} {suffix}"),
            service_url_marker: marker.to_string(),
            service_description: description.to_string(),
            service_wiki: format!("{WIKI_ROOT}/{section}/{marker}/overview"),
            kind,
        })
        .collect()
}

pub fn access_services() -> Vec<RegisteredService> {
    build(ACCESS_SERVICES, ServiceKind::AccessService)
}

pub fn view_services() -> Vec<RegisteredService> {
    build(VIEW_SERVICES, ServiceKind::ViewService)
}

pub fn engine_services() -> Vec<RegisteredService> {
    build(ENGINE_SERVICES, ServiceKind::EngineService)
}

pub fn find_access_service(url_marker: &str) -> Option<RegisteredService> {
    access_services()
        .into_iter()
        .find(|s| s.service_url_marker == url_marker)
}

pub fn find_view_service(url_marker: &str) -> Option<RegisteredService> {
    view_services()
        .into_iter()
        .find(|s| s.service_url_marker == url_marker)
}

pub fn find_engine_service(url_marker: &str) -> Option<RegisteredService> {
    engine_services()
        .into_iter()
        .find(|s| s.service_url_marker == url_marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_url_marker;

    #[test]
    fn test_data_manager_registered() {
        let service = find_access_service("data-manager").unwrap();
        assert_eq!(service.service_full_name, "Data Manager OMAS");
        assert_eq!(service.kind, ServiceKind::AccessService);
        assert!(find_access_service("rex").is_none());
        assert!(find_view_service("rex").is_some());
    }

    #[test]
    fn test_catalogue_is_consistent() {
        let all: Vec<_> = access_services()
            .into_iter()
            .chain(view_services())
            .chain(engine_services())
            .collect();
        let mut ids: Vec<_> = all.iter().map(|s| s.service_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
        for service in &all {
            assert!(validate_url_marker(&service.service_url_marker).is_ok());
        }
    }
}
