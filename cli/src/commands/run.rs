use anyhow::Result;
use zia_application::{NoAgentProgress, RunAgentInput};
use zia_domain::Conversation;

use crate::cli::{Cli, RunArgs};
use crate::commands::ctrl_c_token;
use crate::image;
use crate::progress::ConsoleProgress;
use crate::runtime::{Runtime, load_config, system_prompt};

/// Single turn: print the answer, exit non-zero on failure.
pub async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = load_config(cli)?;

    let mut input = RunAgentInput::new(&args.message);
    if let Some(path) = &args.image {
        let attachment = image::load(path)?;
        input = input.with_image(attachment.media_type, attachment.data);
    }
    if let Some(prompt) = system_prompt(&config, &args.agent) {
        input = input.with_system_prompt(prompt);
    }

    let runtime = Runtime::start(cli, &config, &args.agent).await?;
    let token = ctrl_c_token();
    let agent = runtime.agent.clone().with_cancellation(token.clone());
    let mut conversation = Conversation::new();

    let result = if args.agent.quiet {
        agent
            .execute_with_progress(&mut conversation, input, &NoAgentProgress)
            .await
    } else {
        agent
            .execute_with_progress(&mut conversation, input, &ConsoleProgress)
            .await
    };
    token.cancel();
    runtime.shutdown().await;

    let output = result?;
    println!("{}", output.display_text());
    Ok(())
}
