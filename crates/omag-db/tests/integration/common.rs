use omag_db::{Database, DatabaseConfig};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const CONNECT_ATTEMPTS: u32 = 30;

/// Starts PostgreSQL in a container and returns a migrated [`Database`].
///
/// Hold on to the container handle: the database goes away when it is dropped.
pub async fn setup_test_db() -> (Database, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "omag")
        .with_env_var("POSTGRES_DB", "open_metadata")
        .start()
        .await
        .expect("postgres container should start");

    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("mapped postgres port");
    let config = DatabaseConfig::new(format!(
        "postgresql://postgres:omag@{host}:{port}/open_metadata"
    ));

    // Postgres restarts once after initdb, so early connections can be refused.
    let mut attempt = 0;
    let database = loop {
        attempt += 1;
        match Database::connect(&config).await {
            Ok(database) => break database,
            Err(e) if attempt >= CONNECT_ATTEMPTS => {
                panic!("no connection after {CONNECT_ATTEMPTS} attempts: {e}")
            }
            Err(_) => tokio::time::sleep(std::time::Duration::from_millis(100)).await,
        }
    };
    database.migrate().await.expect("migrations should apply");

    (database, container)
}
