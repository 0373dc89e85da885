//! Graph schema bootstrap.
//!
//! Runs once at process startup, before the listener binds. Checks for the
//! versioned `:Schema` marker node and, when absent, applies the constraint
//! and index declarations followed by the marker — in two separate write
//! transactions, because Neo4j forbids mixing schema-definition and
//! data-write statements in one transaction.
//!
//! Multiple workers starting concurrently may all observe "marker absent"
//! and race to create the schema. Every write is therefore self-guarding:
//! each declaration is `IF NOT EXISTS`-guarded and the marker is written
//! with `MERGE`, so a second creation attempt is a no-op rather than an
//! error and exactly one marker exists per version afterwards. The
//! marker-exists check is only a fast path.

use neo4rs::{query, Graph};
use std::fmt;
use tracing::{debug, error, info};

use crate::config::GraphStoreConfig;

/// Version tag carried by the schema marker node.
pub const SCHEMA_VERSION: &str = "v1";

/// Property names the schema governs, recorded on the marker.
pub const SCHEMA_PROPERTIES: [&str; 3] = ["embedding", "user_id", "content"];

/// Constraint and index declarations, applied in order. Every statement is
/// self-guarded so re-issuing it against an existing object is a no-op.
pub const DECLARATIONS: [&str; 8] = [
    // Memory nodes
    "CREATE CONSTRAINT memory_id IF NOT EXISTS FOR (m:Memory) REQUIRE m.id IS UNIQUE",
    "CREATE CONSTRAINT memory_user_id IF NOT EXISTS FOR (m:Memory) REQUIRE m.user_id IS NOT NULL",
    "CREATE INDEX memory_embedding_idx IF NOT EXISTS FOR (n:Memory) ON (n.embedding)",
    "CREATE INDEX memory_user_id_idx IF NOT EXISTS FOR (n:Memory) ON (n.user_id)",
    // Relational entity nodes
    "CREATE CONSTRAINT entity_name IF NOT EXISTS FOR (e:entity) REQUIRE e.name IS UNIQUE",
    "CREATE CONSTRAINT entity_user_id IF NOT EXISTS FOR (e:entity) REQUIRE e.user_id IS NOT NULL",
    "CREATE INDEX entity_name_idx IF NOT EXISTS FOR (n:entity) ON (n.name)",
    "CREATE INDEX entity_user_id_idx IF NOT EXISTS FOR (n:entity) ON (n.user_id)",
];

/// Marker write. MERGE on the version key so that concurrent workers racing
/// past the existence check converge on a single node; ON CREATE keeps the
/// original timestamp when the node already exists.
const MARKER_STATEMENT: &str = "MERGE (schema:Schema {version: $version}) \
     ON CREATE SET schema.created_at = datetime(), schema.properties = $properties";

/// Outcome of a successful bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Fresh database: declarations applied, marker created.
    Initialized,
    /// Marker already present: nothing to do.
    AlreadyInitialized,
}

/// Operator-facing classification of a bootstrap connection failure.
/// All kinds are equally fatal; the split exists for diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailureKind {
    Dns,
    Auth,
    Unavailable,
    Other,
}

impl ConnectFailureKind {
    /// Classify a driver error from its message text.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("resolution") {
            Self::Dns
        } else if lower.contains("auth") || lower.contains("unauthorized") {
            Self::Auth
        } else if lower.contains("unavailable")
            || lower.contains("refused")
            || lower.contains("timed out")
            || lower.contains("timeout")
        {
            Self::Unavailable
        } else {
            Self::Other
        }
    }

    /// Operator hint, logged alongside the raw error.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Dns => "DNS resolution failed - check if the Neo4j URI is correct",
            Self::Auth => "Authentication failed - check username and password",
            Self::Unavailable => "Neo4j service unavailable - check if database is running",
            Self::Other => "Unclassified Neo4j failure - see the raw error",
        }
    }
}

/// Error raised by the bootstrap. Fatal: the caller must refuse to start
/// the HTTP listener.
#[derive(Debug)]
pub enum BootstrapError {
    /// Connecting or authenticating to the graph store failed.
    Connect {
        kind: ConnectFailureKind,
        message: String,
    },
    /// A schema query failed after connectivity was established.
    Query { message: String },
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { kind, message } => {
                write!(f, "graph store connection failed ({kind:?}): {message}")
            }
            Self::Query { message } => write!(f, "schema bootstrap query failed: {message}"),
        }
    }
}

impl std::error::Error for BootstrapError {}

impl BootstrapError {
    fn connect(err: &neo4rs::Error) -> Self {
        let message = err.to_string();
        Self::Connect {
            kind: ConnectFailureKind::classify(&message),
            message,
        }
    }

    fn query(err: impl fmt::Display) -> Self {
        Self::Query {
            message: err.to_string(),
        }
    }
}

/// Initialize the graph schema. Called exactly once per process lifetime;
/// the connection is scoped to this call.
pub async fn initialize(config: &GraphStoreConfig) -> Result<SchemaStatus, BootstrapError> {
    info!("Attempting Neo4j connection to: {}", config.uri);

    let graph = Graph::new(&config.uri, &config.username, &config.password)
        .await
        .map_err(|e| {
            let err = BootstrapError::connect(&e);
            if let BootstrapError::Connect { kind, .. } = &err {
                error!("{}", kind.hint());
            }
            err
        })?;

    // Connectivity check before any schema work; driver construction alone
    // does not guarantee a reachable server.
    graph
        .run(query("RETURN 1"))
        .await
        .map_err(|e| {
            let err = BootstrapError::connect(&e);
            if let BootstrapError::Connect { kind, .. } = &err {
                error!("{}", kind.hint());
            }
            err
        })?;
    info!("Successfully connected to Neo4j database");

    if marker_exists(&graph).await? {
        info!("Neo4j schema already exists, skipping initialization");
        return Ok(SchemaStatus::AlreadyInitialized);
    }

    info!("Initializing Neo4j schema for first time setup...");
    apply_declarations(&graph).await?;
    create_marker(&graph).await?;
    info!("Neo4j schema initialized successfully");

    Ok(SchemaStatus::Initialized)
}

/// Read transaction: does the marker for the current version exist?
async fn marker_exists(graph: &Graph) -> Result<bool, BootstrapError> {
    debug!("Checking if schema marker exists");

    let mut result = graph
        .execute(
            query("MATCH (schema:Schema {version: $version}) RETURN COUNT(schema) > 0 AS exists")
                .param("version", SCHEMA_VERSION),
        )
        .await
        .map_err(BootstrapError::query)?;

    let exists = match result.next().await.map_err(BootstrapError::query)? {
        Some(row) => row.get::<bool>("exists").map_err(BootstrapError::query)?,
        None => false,
    };

    debug!("Schema marker exists: {}", exists);
    Ok(exists)
}

/// First write transaction: every constraint/index declaration. A
/// concurrent worker may have created any of these already; each statement
/// tolerates that.
async fn apply_declarations(graph: &Graph) -> Result<(), BootstrapError> {
    info!("Initializing Neo4j constraints and indexes");

    let mut txn = graph.start_txn().await.map_err(BootstrapError::query)?;
    txn.run_queries(DECLARATIONS.iter().map(|stmt| query(stmt)))
        .await
        .map_err(BootstrapError::query)?;
    txn.commit().await.map_err(BootstrapError::query)?;

    Ok(())
}

/// Second write transaction: the marker node. Separate from the
/// declarations because schema and data statements cannot share a
/// transaction. Uses MERGE, not CREATE: two workers can both reach this
/// point, and the database must still end with one marker per version.
async fn create_marker(graph: &Graph) -> Result<(), BootstrapError> {
    info!("Creating schema marker node");

    let properties: Vec<String> = SCHEMA_PROPERTIES.iter().map(|s| s.to_string()).collect();

    let mut txn = graph.start_txn().await.map_err(BootstrapError::query)?;
    txn.run(
        query(MARKER_STATEMENT)
            .param("version", SCHEMA_VERSION)
            .param("properties", properties),
    )
    .await
    .map_err(BootstrapError::query)?;
    txn.commit().await.map_err(BootstrapError::query)?;

    Ok(())
}
