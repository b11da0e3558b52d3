//! Terminal front end for the voxchat assistant core.
//!
//! Reads typed utterances from stdin, routes them through the interaction
//! controller, and prints replies and notifications. Voice capture needs a
//! host speech capability; none exists in a bare terminal, so the voice
//! command exercises the unsupported path.

use anyhow::Result;
use clap::Parser;
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::panic;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use voxchat::config::AppConfig;
use voxchat::controller::InteractionController;
use voxchat::pipeline::ChatTurnPipeline;
use voxchat::responder::HttpResponder;
use voxchat::transcript::{Turn, TurnId};
use voxchat::{init_logging, log_debug, log_panic, telemetry, Severity};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    config.validate()?;
    init_logging(&config);
    telemetry::init_tracing(&config);
    panic::set_hook(Box::new(|info| log_panic(info)));

    let responder = Arc::new(HttpResponder::new(config.endpoint.clone())?);
    let mut controller = InteractionController::new(responder, None, config.quick_options());
    log_debug(&format!("voxchat started, endpoint {}", config.endpoint));

    println!("{} (lang {})", "VoxChat assistant".bold(), config.lang);
    println!("Type a message, /1../{} for quick options, /voice, /quit", controller.quick_options().len());
    for (index, option) in controller.quick_options().iter().enumerate() {
        println!("  /{} {}", index + 1, option);
    }

    let mut printer = NotificationPrinter::default();
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let submitted = match line.trim() {
            "/quit" | "/q" => break,
            "/voice" => {
                if config.no_voice {
                    println!("voice capture disabled by --no-voice");
                } else {
                    controller.toggle_voice(Instant::now());
                    printer.flush(&controller);
                }
                None
            }
            command if command.starts_with('/') => {
                match command[1..].parse::<usize>() {
                    Ok(number) if number >= 1 => controller.select_quick_option(number - 1),
                    _ => {
                        println!("unknown command: {command}");
                        None
                    }
                }
            }
            text => {
                controller.set_input(text);
                controller.submit_input()
            }
        };
        if let Some(id) = submitted {
            wait_for_reply(&mut controller, &mut printer, id);
        }
    }
    Ok(())
}

/// Pump the controller until the turn settles, then print its reply.
fn wait_for_reply(
    controller: &mut InteractionController,
    printer: &mut NotificationPrinter,
    id: TurnId,
) {
    println!("{} {}", "you".bold(), controller.transcript().turn(id).map(|t| t.utterance.as_str()).unwrap_or_default());
    print!("{} ", "...".dim());
    let _ = io::stdout().flush();
    loop {
        controller.tick(Instant::now());
        printer.flush(controller);
        let settled = controller.transcript().turn(id).is_some_and(Turn::is_settled);
        if settled {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    println!();
    if let Some(reply) = controller
        .transcript()
        .turn(id)
        .and_then(ChatTurnPipeline::display_reply)
    {
        println!("{} {}", "bot".bold(), reply);
    }
}

/// Prints each notification once as it appears.
#[derive(Default)]
struct NotificationPrinter {
    last_shown: Option<Instant>,
}

impl NotificationPrinter {
    fn flush(&mut self, controller: &InteractionController) {
        let Some(notification) = controller.notifications().visible() else {
            return;
        };
        if self.last_shown == Some(notification.created_at) {
            return;
        }
        self.last_shown = Some(notification.created_at);
        let label = match notification.severity {
            Severity::Info => "info".blue(),
            Severity::Success => "success".green(),
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        println!("[{label}] {}", notification.message);
    }
}
