//! Terminal chat: command parsing and the interactive loop.

use std::io::Write;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use supportbot_chat::{Conversation, SupportBot};

const RULE_WIDTH: usize = 50;

/// Format hint shown for a malformed `add faq` command.
pub const ADD_FAQ_USAGE: &str = "Error: Format should be 'add faq <keyword> <response>'";

/// One line of terminal input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Help,
    AddFaq { keyword: String, response: String },
    MalformedAddFaq,
    Message(String),
}

/// Classify a line of input. Surrounding whitespace is ignored.
pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    let lower = line.to_lowercase();

    if matches!(lower.as_str(), "exit" | "quit" | "bye") {
        return ReplCommand::Exit;
    }
    if lower == "help" {
        return ReplCommand::Help;
    }
    if lower.starts_with("add faq ") {
        let rest = line["add faq ".len()..].trim();
        return match rest.split_once(' ') {
            Some((keyword, response)) if !response.trim().is_empty() => ReplCommand::AddFaq {
                keyword: keyword.to_lowercase(),
                response: response.trim().to_string(),
            },
            _ => ReplCommand::MalformedAddFaq,
        };
    }
    ReplCommand::Message(line.to_string())
}

pub fn print_banner() {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", rule.blue().bold());
    println!("{}", "Welcome to the Support Bot CLI".green().bold());
    println!(
        "{}",
        "Type 'exit', 'quit', or 'bye' to end the conversation".yellow().bold()
    );
    println!("{}", "Type 'help' to see available commands".yellow().bold());
    println!("{}", rule.blue().bold());
}

pub fn print_help() {
    println!("{}", "Available commands:".yellow().bold());
    println!("{}", "  help - Show this help message".yellow().bold());
    println!(
        "{}",
        "  add faq <keyword> <response> - Add a new FAQ response".yellow().bold()
    );
    println!("{}", "  exit/quit/bye - End the conversation".yellow().bold());
}

fn print_bot(text: &str) {
    println!("{}", format!("Bot: {}", text).cyan().bold());
}

fn print_error(text: &str) {
    println!("{}", text.red().bold());
}

/// Run the interactive loop until an exit word or end of input.
pub async fn run(bot: &SupportBot) -> std::io::Result<()> {
    let mut conv = Conversation::new();

    print_banner();
    let greeting = bot.respond(&mut conv, "hello").await;
    print_bot(&greeting);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_line(&line) {
            ReplCommand::Exit => {
                let farewell = bot.respond(&mut conv, "goodbye").await;
                print_bot(&farewell);
                break;
            }
            ReplCommand::Help => print_help(),
            ReplCommand::MalformedAddFaq => print_error(ADD_FAQ_USAGE),
            ReplCommand::AddFaq { keyword, response } => {
                match bot.add_faq(&keyword, &response) {
                    Ok(message) => print_bot(&message),
                    Err(e) => print_error(&format!("Error: {}", e)),
                }
            }
            ReplCommand::Message(text) => {
                let reply = bot.respond(&mut conv, &text).await;
                print_bot(&reply);
                bot.log_exchange(&mut conv, &text, &reply);
            }
        }
    }

    tracing::debug!(
        conversation = %conv.id,
        messages = conv.message_count,
        "Terminal chat ended"
    );
    Ok(())
}

/// Answer `messages` in one conversation, printing each exchange.
pub async fn ask(bot: &SupportBot, messages: &[String]) {
    let mut conv = Conversation::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("You: {}", message);
        let reply = bot.respond(&mut conv, message).await;
        print_bot(&reply);
        bot.log_exchange(&mut conv, message, &reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        for word in ["exit", "QUIT", "  bye  ", "Bye"] {
            assert_eq!(parse_line(word), ReplCommand::Exit);
        }
    }

    #[test]
    fn test_goodbye_sentence_is_a_message() {
        assert_eq!(
            parse_line("bye for now"),
            ReplCommand::Message("bye for now".to_string())
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_line("Help"), ReplCommand::Help);
    }

    #[test]
    fn test_add_faq() {
        assert_eq!(
            parse_line("add faq Warranty All products carry a two year warranty."),
            ReplCommand::AddFaq {
                keyword: "warranty".to_string(),
                response: "All products carry a two year warranty.".to_string(),
            }
        );
    }

    #[test]
    fn test_add_faq_case_insensitive_prefix() {
        assert!(matches!(
            parse_line("ADD FAQ parking Free parking behind the store."),
            ReplCommand::AddFaq { .. }
        ));
    }

    #[test]
    fn test_add_faq_missing_response() {
        assert_eq!(parse_line("add faq warranty"), ReplCommand::MalformedAddFaq);
        assert_eq!(parse_line("add faq warranty   "), ReplCommand::MalformedAddFaq);
    }

    #[test]
    fn test_add_faq_requires_trailing_space() {
        // "add faq" alone is an ordinary message.
        assert_eq!(
            parse_line("add faq"),
            ReplCommand::Message("add faq".to_string())
        );
    }

    #[test]
    fn test_plain_message_trimmed() {
        assert_eq!(
            parse_line("  What are your hours?  "),
            ReplCommand::Message("What are your hours?".to_string())
        );
    }
}
