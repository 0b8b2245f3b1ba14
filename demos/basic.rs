/* demos/basic.rs */

use livehold::adapters::log::{LoggerConfig, logger_container};
use livehold::controller::Conf;
use livehold::lifecycle::Shutdown;
use livehold::loader::{Scan, Schema};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Server {
	name: String,
	port: u16,
}

impl Scan for Server {
	fn schema() -> Schema<Self> {
		Schema::new()
			.required("APP_NAME", |c: &mut Self, v| c.name = v)
			.required("APP_PORT", |c: &mut Self, v| c.port = v)
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	// 0. Prepare a real file
	let config_path = "example.env";
	fs::write(
		config_path,
		"APP_NAME=livehold-demo\nAPP_PORT=8080\nAPP_LOG_LEVEL=info\nAPP_LOG_OUTPUT=stdout\n",
	)?;
	println!("Created {}", config_path);

	// 1. Load the store
	let conf = Arc::new(Conf::new(config_path)?);
	conf.load()?;
	println!("Initial server config: {:?}", conf.scan::<Server>()?);

	// 2. A logger that follows APP_LOG_LEVEL / APP_LOG_OUTPUT
	let reader = Arc::downgrade(&conf);
	let logger = Arc::new(logger_container("logger", move || {
		let conf = reader.upgrade().ok_or("config store dropped")?;
		let mut config = LoggerConfig::default();
		conf.scan_with(&LoggerConfig::schema("APP"), &mut config)?;
		Ok::<_, livehold::BoxError>(config)
	})?);
	conf.push_updater(logger.clone());

	// 3. Teardown, newest first: the logger closes before the watch stops
	let shutdown = Arc::new(Shutdown::new());
	let watched = conf.clone();
	shutdown.push("config", move || watched.close());
	let closing = logger.clone();
	shutdown.push("logger", move || closing.close());
	let _signals = shutdown.listen();

	// 4. Start watching
	conf.watch()?;
	println!(
		"Watching {}... (try APP_LOG_LEVEL=debug, Ctrl-C to quit)",
		config_path
	);

	for tick in 0..10 {
		tokio::time::sleep(Duration::from_secs(2)).await;
		logger.debug("debug tick", json!({ "tick": tick }));
		logger.info("info tick", json!({ "tick": tick, "server": conf.get("APP_NAME")? }));
	}

	// Cleanup
	let failed = shutdown.run();
	fs::remove_file(config_path)?;
	println!("Done ({} teardown failures).", failed);
	Ok(())
}
