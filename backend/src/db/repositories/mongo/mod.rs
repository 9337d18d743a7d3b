//! MongoDB repository implementation.
//!
//! Documents live in four collections (`stops`, `buses`, `routes`,
//! `busroutes`) of a single database.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `MONGODB_URI` or `DATABASE_URL`: Connection string (required)
//! - `MONGODB_DATABASE`: Database name (default: the one named in the URI, else `bus_tracker`)
//! - `MONGO_POOL_MAX`: Maximum pool size (default: 10)
//! - `MONGO_POOL_MIN`: Minimum pool size (default: 0)
//! - `MONGO_CONN_TIMEOUT_SEC`: Connect timeout in seconds (default: 10)
//! - `MONGO_SERVER_SELECTION_TIMEOUT_SEC`: Server selection timeout in seconds (default: 30)

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection as MongoCollection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::db::repository::{
    BusRepository, BusRouteRepository, ConnectionRepository, ErrorContext, RepositoryError,
    RepositoryResult, RouteRepository, StopRepository,
};
use crate::models::{
    Bus, BusId, BusRoute, BusRouteId, Collection, Location, Route, RouteId, RouteSnapshot, Stop,
    StopId,
};

mod models;

use models::*;

const DEFAULT_DATABASE: &str = "bus_tracker";
const APP_NAME: &str = "bus-tracker";

/// Configuration for connecting to MongoDB.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string
    pub connection_uri: String,
    /// Database name; falls back to the URI's default database
    pub database: Option<String>,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connect timeout in seconds
    pub connect_timeout_sec: u64,
    /// Server selection timeout in seconds
    pub server_selection_timeout_sec: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            connection_uri: String::new(),
            database: None,
            max_pool_size: 10,
            min_pool_size: 0,
            connect_timeout_sec: 10,
            server_selection_timeout_sec: 30,
        }
    }
}

impl MongoConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let connection_uri = std::env::var("MONGODB_URI")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| "MONGODB_URI or DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        let parse_u32 = |key: &str, default: u32| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(default)
        };
        let parse_u64 = |key: &str, default: u64| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            connection_uri,
            database: std::env::var("MONGODB_DATABASE").ok().filter(|s| !s.is_empty()),
            max_pool_size: parse_u32("MONGO_POOL_MAX", defaults.max_pool_size),
            min_pool_size: parse_u32("MONGO_POOL_MIN", defaults.min_pool_size),
            connect_timeout_sec: parse_u64("MONGO_CONN_TIMEOUT_SEC", defaults.connect_timeout_sec),
            server_selection_timeout_sec: parse_u64(
                "MONGO_SERVER_SELECTION_TIMEOUT_SEC",
                defaults.server_selection_timeout_sec,
            ),
        })
    }
}

/// Repository backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoRepository {
    client: Client,
    database: Database,
    stops: MongoCollection<StopDoc>,
    buses: MongoCollection<BusDoc>,
    routes: MongoCollection<RouteDoc>,
    bus_routes: MongoCollection<BusRouteDoc>,
}

impl MongoRepository {
    /// Connect and verify the server answers a ping.
    pub async fn new(config: MongoConfig) -> RepositoryResult<Self> {
        if config.connection_uri.is_empty() {
            return Err(RepositoryError::configuration(
                "MongoDB repository requires a connection URI",
            ));
        }

        let mut options = ClientOptions::parse(&config.connection_uri)
            .await
            .map_err(|e| {
                RepositoryError::from(e).with_operation("parse_connection_uri")
            })?;
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.min_pool_size = Some(config.min_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_sec));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_sec));

        let client = Client::with_options(options)?;
        let database = match config.database {
            Some(name) => client.database(&name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("connect"))?;
        info!(database = database.name(), "Connected to MongoDB");

        Ok(Self {
            stops: database.collection(Collection::Stops.name()),
            buses: database.collection(Collection::Buses.name()),
            routes: database.collection(Collection::Routes.name()),
            bus_routes: database.collection(Collection::BusRoutes.name()),
            client,
            database,
        })
    }

    /// Drop the whole database. Used to clean up after integration tests.
    pub async fn drop_database(&self) -> RepositoryResult<()> {
        self.database
            .drop()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("drop_database"))
    }
}

fn parse_object_id(id: &str, collection: Collection, operation: &str) -> RepositoryResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| {
        RepositoryError::validation_with_context(
            format!("Cast to ObjectId failed for value \"{}\"", id),
            ErrorContext::new(operation)
                .with_entity(collection.entity())
                .with_entity_id(id)
                .with_details(e.to_string()),
        )
    })
}

fn to_document_value<T: Serialize>(value: &T, operation: &str) -> RepositoryResult<mongodb::bson::Bson> {
    mongodb::bson::to_bson(value).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Failed to encode document: {}", e),
            ErrorContext::new(operation),
        )
    })
}

async fn insert<T>(
    collection: &MongoCollection<T>,
    mut doc: T,
    set_id: impl FnOnce(&mut T, ObjectId),
    entity: Collection,
    operation: &str,
) -> RepositoryResult<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    let result = collection
        .insert_one(&doc)
        .await
        .map_err(|e| RepositoryError::from(e).with_operation(operation).with_entity(entity.entity()))?;
    let id = result.inserted_id.as_object_id().ok_or_else(|| {
        RepositoryError::internal_with_context(
            "Inserted document has no ObjectId",
            ErrorContext::new(operation).with_entity(entity.entity()),
        )
    })?;
    set_id(&mut doc, id);
    Ok(doc)
}

async fn find_all<T>(
    collection: &MongoCollection<T>,
    filter: Document,
    entity: Collection,
    operation: &str,
) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let wrap = |e: mongodb::error::Error| {
        RepositoryError::from(e).with_operation(operation).with_entity(entity.entity())
    };
    let cursor = collection.find(filter).await.map_err(wrap)?;
    let docs: Vec<T> = cursor.try_collect().await.map_err(wrap)?;
    debug!(collection = entity.name(), count = docs.len(), "Fetched documents");
    Ok(docs)
}

async fn delete_by_id<T>(
    collection: &MongoCollection<T>,
    id: &str,
    entity: Collection,
    operation: &str,
) -> RepositoryResult<bool>
where
    T: Send + Sync,
{
    let oid = parse_object_id(id, entity, operation)?;
    let result = collection
        .delete_one(doc! { "_id": oid })
        .await
        .map_err(|e| RepositoryError::from(e).with_operation(operation).with_entity(entity.entity()))?;
    Ok(result.deleted_count > 0)
}

#[async_trait]
impl ConnectionRepository for MongoRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("health_check"))?;
        Ok(true)
    }

    async fn close(&self) -> RepositoryResult<()> {
        info!("Shutting down MongoDB client");
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[async_trait]
impl StopRepository for MongoRepository {
    async fn insert_stop(&self, stop: &Stop) -> RepositoryResult<Stop> {
        let doc = insert(
            &self.stops,
            StopDoc::from(stop),
            |d, id| d.id = Some(id),
            Collection::Stops,
            "insert_stop",
        )
        .await?;
        Ok(doc.into())
    }

    async fn delete_stop(&self, id: &StopId) -> RepositoryResult<bool> {
        delete_by_id(&self.stops, id.as_str(), Collection::Stops, "delete_stop").await
    }

    async fn list_stops(&self) -> RepositoryResult<Vec<Stop>> {
        let docs = find_all(&self.stops, doc! {}, Collection::Stops, "list_stops").await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RouteRepository for MongoRepository {
    async fn insert_route(&self, route: &Route) -> RepositoryResult<Route> {
        let doc = insert(
            &self.routes,
            RouteDoc::from(route),
            |d, id| d.id = Some(id),
            Collection::Routes,
            "insert_route",
        )
        .await?;
        Ok(doc.into())
    }

    async fn get_route(&self, id: &RouteId) -> RepositoryResult<Option<Route>> {
        let oid = parse_object_id(id.as_str(), Collection::Routes, "get_route")?;
        let doc = self
            .routes
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("get_route").with_entity("route"))?;
        Ok(doc.map(Into::into))
    }

    async fn list_routes(&self) -> RepositoryResult<Vec<Route>> {
        let docs = find_all(&self.routes, doc! {}, Collection::Routes, "list_routes").await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl BusRepository for MongoRepository {
    async fn insert_bus(&self, bus: &Bus) -> RepositoryResult<Bus> {
        let doc = insert(
            &self.buses,
            BusDoc::from(bus),
            |d, id| d.id = Some(id),
            Collection::Buses,
            "insert_bus",
        )
        .await?;
        Ok(doc.into())
    }

    async fn delete_bus(&self, id: &BusId) -> RepositoryResult<bool> {
        delete_by_id(&self.buses, id.as_str(), Collection::Buses, "delete_bus").await
    }

    async fn list_buses(&self) -> RepositoryResult<Vec<Bus>> {
        let docs = find_all(&self.buses, doc! {}, Collection::Buses, "list_buses").await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }

    async fn find_bus_by_name(&self, name: &str) -> RepositoryResult<Option<Bus>> {
        let doc = self
            .buses
            .find_one(doc! { "name": name })
            .await
            .map_err(|e| {
                RepositoryError::from(e)
                    .with_operation("find_bus_by_name")
                    .with_entity("bus")
            })?;
        Ok(doc.map(Into::into))
    }

    async fn update_bus_location(
        &self,
        name: &str,
        location: Location,
    ) -> RepositoryResult<Option<Bus>> {
        let location = to_document_value(&location, "update_bus_location")?;
        let doc = self
            .buses
            .find_one_and_update(doc! { "name": name }, doc! { "$set": { "location": location } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                RepositoryError::from(e)
                    .with_operation("update_bus_location")
                    .with_entity("bus")
            })?;
        Ok(doc.map(Into::into))
    }
}

#[async_trait]
impl BusRouteRepository for MongoRepository {
    async fn insert_bus_route(&self, bus_route: &BusRoute) -> RepositoryResult<BusRoute> {
        let doc = insert(
            &self.bus_routes,
            BusRouteDoc::from(bus_route),
            |d, id| d.id = Some(id),
            Collection::BusRoutes,
            "insert_bus_route",
        )
        .await?;
        Ok(doc.into())
    }

    async fn find_bus_routes_with_stops(
        &self,
        stop_names: &[String],
    ) -> RepositoryResult<Vec<BusRoute>> {
        let filter = doc! { "route.stops.name": { "$all": stop_names.to_vec() } };
        let docs = find_all(
            &self.bus_routes,
            filter,
            Collection::BusRoutes,
            "find_bus_routes_with_stops",
        )
        .await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }

    async fn find_bus_routes_by_bus(&self, bus_name: &str) -> RepositoryResult<Vec<BusRoute>> {
        let docs = find_all(
            &self.bus_routes,
            doc! { "busName": bus_name },
            Collection::BusRoutes,
            "find_bus_routes_by_bus",
        )
        .await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }

    async fn replace_route_snapshot(
        &self,
        id: &BusRouteId,
        snapshot: &RouteSnapshot,
    ) -> RepositoryResult<Option<BusRoute>> {
        let oid = parse_object_id(id.as_str(), Collection::BusRoutes, "replace_route_snapshot")?;
        let route = to_document_value(snapshot, "replace_route_snapshot")?;
        let doc = self
            .bus_routes
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": { "route": route } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                RepositoryError::from(e)
                    .with_operation("replace_route_snapshot")
                    .with_entity("bus_route")
            })?;
        Ok(doc.map(Into::into))
    }
}
