use clap::Args;
use tasksync_core::Session;

#[derive(Args)]
pub struct ChatArgs {
    /// Message text
    pub message: String,
    /// Sender id included in the payload
    #[arg(long, default_value_t = 1)]
    pub user_id: i64,
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    match session.chat.send(&args.message, args.user_id).await? {
        Some(reply) => println!("{reply}"),
        None => println!("(no reply)"),
    }
    Ok(())
}
