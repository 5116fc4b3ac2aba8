use super::{StoreConnector, StoreError, StoreHandle, StoreObservers, UserRepository};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::event::EventHandler;
use mongodb::event::sdam::SdamEvent;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database, ServerType};

/// Database used when the connection string does not name one
pub const DEFAULT_DATABASE: &str = "test";

/// Connects to MongoDB through the official driver
///
/// Pooling, server selection and reconnection stay with the driver; this
/// connector only wires the observers in, checks the server answers and
/// makes sure the collections' indexes exist.
#[derive(Debug, Clone, Default)]
pub struct MongoConnector {
    app_name: Option<String>,
}

impl MongoConnector {
    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
        }
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    type Handle = MongoHandle;

    async fn connect(
        &self,
        uri: &str,
        observers: StoreObservers,
    ) -> Result<MongoHandle, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        if options.app_name.is_none() {
            options.app_name = self.app_name.clone();
        }

        options.sdam_event_handler = Some(EventHandler::callback(move |event: SdamEvent| {
            forward_event(&observers, event);
        }));

        let host = options
            .hosts
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_owned());
        let name = options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_owned());

        let client = Client::with_options(options)?;
        let database = client.database(&name);

        // the driver connects lazily; make the first round trip here
        database.run_command(doc! { "ping": 1 }).await?;
        prepare_collections(&database).await;

        Ok(MongoHandle {
            client,
            database,
            host,
        })
    }
}

/// Map driver topology events onto the store observers
///
/// A standalone server going down only shows up as its description turning
/// `Unknown`; `ServerClosed` is reserved for servers leaving the topology.
fn forward_event(observers: &StoreObservers, event: SdamEvent) {
    match event {
        SdamEvent::ServerDescriptionChanged(event)
            if lost_server(
                event.previous_description.server_type(),
                event.new_description.server_type(),
            ) =>
        {
            observers.notify_disconnect(&event.address.to_string());
        }
        SdamEvent::ServerClosed(event) => {
            observers.notify_disconnect(&event.address.to_string());
        }
        SdamEvent::ServerHeartbeatFailed(event) => {
            observers.notify_error(&event.server_address.to_string(), &event.failure.to_string());
        }
        _ => {}
    }
}

fn lost_server(previous: ServerType, new: ServerType) -> bool {
    previous != ServerType::Unknown && new == ServerType::Unknown
}

/// Create collection indexes; failures are logged, the store stays usable
async fn prepare_collections(database: &Database) -> bool {
    match UserRepository::new(database).ensure_indexes().await {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(database = %database.name(), "Failed to create indexes: {}", err);
            false
        }
    }
}

/// Live MongoDB connection; cheap to clone
#[derive(Debug, Clone)]
pub struct MongoHandle {
    client: Client,
    database: Database,
    host: String,
}

impl MongoHandle {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(&self.database)
    }
}

#[async_trait]
impl StoreHandle for MongoHandle {
    fn host(&self) -> String {
        self.host.clone()
    }

    fn name(&self) -> String {
        self.database.name().to_owned()
    }

    async fn close(self) -> Result<(), StoreError> {
        self.client.shutdown().await;
        Ok(())
    }
}
