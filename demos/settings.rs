use serde::{Deserialize, Serialize};
use serde_json::json;
use settings_store::config::KeyValues;
use settings_store::{AppContext, Service};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WindowState {
    width: u32,
    height: u32,
    maximized: bool,
}

fn main() -> Result<(), settings_store::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ctx = Service::register(AppContext::builder())?.build()?;
    let config = ctx.config();

    config.set("language", "fr")?;
    let mut language = String::new();
    config.get("language", &mut language)?;
    println!("Language: {language}");
    println!("Settings file: {}", config.config_path().display());

    let mut window = WindowState::default();
    config.load_struct("window", &mut window)?;
    println!("Previous window: {window:?}");
    config.save_struct(
        "window",
        &WindowState {
            width: 1280,
            height: 800,
            maximized: false,
        },
    )?;

    let database = KeyValues::from([
        ("database.host".to_string(), json!("localhost")),
        ("database.port".to_string(), json!(5432)),
    ]);
    config.save_key_values("database.ini", &database)?;
    println!("Database: {:?}", config.load_key_values("database.ini")?);

    Ok(())
}
