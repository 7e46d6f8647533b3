use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub store: String,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok".into(), store: "ok".into() }
    }

    /// Service is up but the backing store reported `store` instead of `ok`.
    pub fn degraded(store: impl Into<String>) -> Self {
        Self { status: "degraded".into(), store: store.into() }
    }
}

/// Body of `GET /`: name, version and a human readable route map.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: String,
    pub version: String,
    pub status: String,
    pub routes: RouteMap,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RouteMap {
    pub save: String,
    pub data: String,
    pub get_by_id: String,
    pub upload: String,
    pub file: String,
    pub health: String,
}

impl ServiceDescriptor {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            status: "ok".to_string(),
            routes: RouteMap {
                save: "POST /save".into(),
                data: "GET /data".into(),
                get_by_id: "GET /data/:id".into(),
                upload: "POST /upload (multipart/form-data, field='file')".into(),
                file: "GET /uploads/<filename>".into(),
                health: "GET /health".into(),
            },
        }
    }
}
