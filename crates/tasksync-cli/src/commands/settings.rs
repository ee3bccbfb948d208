use clap::Subcommand;
use tasksync_core::{Session, SettingsProvider};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "taskWebhookUrl", "chatWebhookUrl")
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting in the local settings file
    Set {
        /// Setting key
        key: String,
        /// New value (empty string removes it)
        value: String,
    },
}

pub async fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    match action {
        SettingsAction::Get { key } => match session.settings.get(&key).await? {
            Some(value) => println!("{value}"),
            None => return Err(format!("setting '{key}' is not set").into()),
        },
        SettingsAction::Set { key, value } => {
            session.settings.set(&key, &value).await?;
            println!("ok");
        }
    }
    Ok(())
}
